//! # Torus Knot Demo
//!
//! Builds a (2,3) torus knot, derives tangents, then runs the buffer
//! lifecycle against the headless backend: init, a full upload, a few
//! frames of vertex animation with incremental re-uploads, and teardown.
//!
//! Run with `RUST_LOG=debug cargo run --example torus_knot` to see the
//! per-chunk logging.

use anyhow::Result;
use log::info;

use facet3d::prelude::*;

fn main() -> Result<()> {
    env_logger::init();

    let mut geometry = generate_torus_knot(10.0, 3.0, 128, 12, 2, 3, 1.0)?;
    geometry.compute_tangents()?;
    geometry.set_dynamic(true);
    info!(
        "torus knot: {} vertices, {} faces",
        geometry.vertices().len(),
        geometry.faces().len()
    );

    let material = Material::new("knot")
        .with_color(Color::from_hex(0xCC7733))
        .with_vertex_colors(VertexColors::Face)
        .with_capabilities(MaterialCapabilities {
            map: true,
            normal_map: true,
            ..Default::default()
        });
    let mut mesh = Mesh::new(geometry, MeshMaterial::Single(material));

    let mut backend = HeadlessBackend::new();
    let mut render_info = RenderInfo::new();
    mesh.init_buffers(&mut backend, &mut render_info)?;

    let report = mesh.set_buffers(&mut backend)?;
    info!(
        "initial sync: {} chunks, {} uploads, {} bytes",
        report.chunks, report.uploads, report.bytes
    );

    let rest: Vec<Vec3> = mesh.geometry().vertices().to_vec();
    for frame in 1..=3 {
        let pulse = 1.0 + 0.05 * (frame as f64).sin();
        for (v, base) in mesh.geometry_mut().vertices_mut().iter_mut().zip(&rest) {
            *v = *base * pulse;
        }

        let report = mesh.set_buffers(&mut backend)?;
        render_info.reset_render();
        let commands = mesh.render(&mut render_info)?;
        info!(
            "frame {}: {} uploads ({} bytes), {} draw calls, {}",
            frame,
            report.uploads,
            report.bytes,
            commands.len(),
            render_info.summary()
        );
    }

    mesh.delete_buffers(&mut backend, &mut render_info);
    info!("teardown: {} live buffers left", backend.live_buffers());

    Ok(())
}
