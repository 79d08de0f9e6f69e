//! # Mesh
//!
//! A [`Mesh`] pairs a [`Geometry`] with its material and drives the chunk
//! lifecycle: partition and buffer creation on first use, per-frame
//! synchronization of dirty attributes, draw command generation and buffer
//! teardown.

use std::collections::HashMap;

use crate::error::{GeometryError, Result};
use crate::gfx::geometry::{DirtyFlags, Geometry, GeometryGroup, GroupBuffers};
use crate::gfx::rendering::backend::{BufferUsage, GpuBufferBackend};
use crate::gfx::rendering::buffer_sync::{
    init_group_arrays, relevant_categories, sync_group, SyncOutcome, SyncReport,
};
use crate::gfx::rendering::draw::DrawCommand;
use crate::gfx::resources::Material;
use crate::performance::RenderInfo;

/// Where a mesh takes its chunk materials from.
#[derive(Debug, Clone, PartialEq)]
pub enum MeshMaterial {
    /// One material for every chunk.
    Single(Material),
    /// Each chunk uses `geometry.materials()[chunk.material_index]`.
    PerFace,
}

/// Morph animation state, present when the geometry has morph targets.
#[derive(Debug, Clone, PartialEq)]
pub struct MorphState {
    /// Target used as the rest pose, if any.
    pub base: Option<usize>,
    /// One weight per target, all starting at zero.
    pub influences: Vec<f64>,
    /// Targets to blend in this order instead of by weight.
    pub forced_order: Vec<usize>,
    dictionary: HashMap<String, usize>,
}

#[derive(Debug)]
pub struct Mesh {
    geometry: Geometry,
    material: MeshMaterial,
    bound_radius: f64,
    morph: Option<MorphState>,
}

impl Mesh {
    pub fn new(mut geometry: Geometry, material: MeshMaterial) -> Self {
        if geometry.bounding_sphere().is_none() {
            geometry.compute_bounding_sphere();
        }
        let bound_radius = geometry.bounding_sphere().map_or(0.0, |s| s.radius);

        let morph = (!geometry.morph_targets().is_empty()).then(|| MorphState {
            base: None,
            influences: vec![0.0; geometry.morph_targets().len()],
            forced_order: Vec::new(),
            dictionary: geometry
                .morph_targets()
                .iter()
                .enumerate()
                .map(|(i, target)| (target.name.clone(), i))
                .collect(),
        });

        Self {
            geometry,
            material,
            bound_radius,
            morph,
        }
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn geometry_mut(&mut self) -> &mut Geometry {
        &mut self.geometry
    }

    pub fn material(&self) -> &MeshMaterial {
        &self.material
    }

    /// Swap the material. Categories the new material needs are uploaded on
    /// the next [`set_buffers`](Self::set_buffers) if they are still pending.
    pub fn set_material(&mut self, material: MeshMaterial) {
        self.material = material;
    }

    /// Bounding sphere radius captured at construction.
    pub fn bound_radius(&self) -> f64 {
        self.bound_radius
    }

    pub fn morph(&self) -> Option<&MorphState> {
        self.morph.as_ref()
    }

    pub fn morph_mut(&mut self) -> Option<&mut MorphState> {
        self.morph.as_mut()
    }

    /// Index of the morph target called `name`, or 0 when there is none.
    pub fn morph_target_index_by_name(&self, name: &str) -> usize {
        if let Some(&index) = self.morph.as_ref().and_then(|m| m.dictionary.get(name)) {
            return index;
        }
        log::debug!("Morph target {} does not exist, returning 0", name);
        0
    }

    /// Material used to draw `group`.
    pub fn resolve_material(&self, group: &GeometryGroup) -> Result<&Material> {
        resolve(&self.material, &self.geometry, group)
    }

    /// Create GPU buffers and arrays for every chunk that has none yet.
    ///
    /// Partitions the geometry on first use. Each new chunk bumps
    /// `info.memory.geometries` and marks every attribute category dirty.
    pub fn init_buffers(&mut self, backend: &mut dyn GpuBufferBackend, info: &mut RenderInfo) -> Result<()> {
        self.delete_retired_buffers(backend, info);
        if self.geometry.groups().is_none() {
            self.geometry.partition();
        }

        let mut groups = self.geometry.take_groups().unwrap_or_default();
        let created = init_chunks(&mut groups, &self.material, &self.geometry, backend);
        self.geometry.restore_groups(groups);
        let created = created?;

        if created > 0 {
            info.memory.geometries += created as u64;
            self.geometry.dirty_mut().merge(DirtyFlags::all());
            log::debug!("Created buffers for {} chunks", created);
        }
        Ok(())
    }

    /// Upload every dirty attribute category to the chunk buffers.
    ///
    /// The geometry's dirty flags move onto each chunk and are cleared on the
    /// geometry. Chunks with nothing relevant pending are skipped.
    pub fn set_buffers(&mut self, backend: &mut dyn GpuBufferBackend) -> Result<SyncReport> {
        let mut groups = self
            .geometry
            .take_groups()
            .ok_or(GeometryError::GroupsNotPartitioned)?;

        let flags = *self.geometry.dirty();
        self.geometry.dirty_mut().clear();
        for group in &mut groups {
            group.pending.merge(flags);
        }

        let result = sync_chunks(&mut groups, &self.material, &self.geometry, backend);
        self.geometry.restore_groups(groups);
        result
    }

    /// Draw command for chunk `group_index`, counted in `info.render`.
    pub fn render_buffer(&self, group_index: usize, info: &mut RenderInfo) -> Result<DrawCommand> {
        let group = self
            .geometry
            .groups()
            .and_then(|groups| groups.get(group_index))
            .ok_or(GeometryError::GroupsNotPartitioned)?;
        let buffers = group.buffers().ok_or(GeometryError::GroupsNotPartitioned)?;
        let material = self.resolve_material(group)?;

        let command = if material.wireframe {
            DrawCommand::lines(buffers.line, group.line_index_count())
        } else {
            DrawCommand::triangles(buffers.face, group.face_index_count())
        };

        info.record_draw(group.face_index_count());
        Ok(command)
    }

    /// Draw commands for every chunk, in chunk order.
    pub fn render(&self, info: &mut RenderInfo) -> Result<Vec<DrawCommand>> {
        let count = self.geometry.groups().map_or(0, <[_]>::len);
        (0..count).map(|i| self.render_buffer(i, info)).collect()
    }

    /// Delete every chunk buffer and release the chunk arrays.
    ///
    /// Buffers retired by a re-partition are deleted too.
    pub fn delete_buffers(&mut self, backend: &mut dyn GpuBufferBackend, info: &mut RenderInfo) {
        self.delete_retired_buffers(backend, info);
        let Some(groups) = self.geometry.groups_mut() else {
            return;
        };

        let mut deleted = 0u64;
        for group in groups.iter_mut() {
            if let Some(buffers) = group.buffers.take() {
                buffers.delete(backend);
                deleted += 1;
            }
            group.release_arrays();
        }

        info.memory.geometries = info.memory.geometries.saturating_sub(deleted);
        log::debug!("Deleted buffers for {} chunks", deleted);
    }

    fn delete_retired_buffers(&mut self, backend: &mut dyn GpuBufferBackend, info: &mut RenderInfo) {
        let retired = self.geometry.take_retired_buffers();
        if retired.is_empty() {
            return;
        }

        let count = retired.len() as u64;
        for buffers in retired {
            buffers.delete(backend);
        }
        info.memory.geometries = info.memory.geometries.saturating_sub(count);
        log::debug!("Deleted buffers for {} retired chunks", count);
    }
}

fn resolve<'a>(material: &'a MeshMaterial, geometry: &'a Geometry, group: &GeometryGroup) -> Result<&'a Material> {
    match material {
        MeshMaterial::Single(material) => Ok(material),
        MeshMaterial::PerFace => group
            .material_index
            .and_then(|i| geometry.materials().get(i))
            .ok_or(GeometryError::MissingMaterial {
                material_index: group.material_index,
            }),
    }
}

fn init_chunks(
    groups: &mut [GeometryGroup],
    material: &MeshMaterial,
    geometry: &Geometry,
    backend: &mut dyn GpuBufferBackend,
) -> Result<usize> {
    let mut created = 0;
    for group in groups.iter_mut().filter(|g| g.buffers.is_none()) {
        let material = resolve(material, geometry, group)?;
        group.buffers = Some(GroupBuffers::create(
            backend,
            group.num_morph_targets,
            group.num_morph_normals,
        ));
        init_group_arrays(group, geometry, material);
        created += 1;
    }
    Ok(created)
}

fn sync_chunks(
    groups: &mut [GeometryGroup],
    material: &MeshMaterial,
    geometry: &Geometry,
    backend: &mut dyn GpuBufferBackend,
) -> Result<SyncReport> {
    let usage = if geometry.is_dynamic() {
        BufferUsage::DynamicDraw
    } else {
        BufferUsage::StaticDraw
    };

    let mut report = SyncReport::default();
    for group in groups.iter_mut() {
        let material = resolve(material, geometry, group)?;
        let todo = group
            .pending
            .intersection(&relevant_categories(group, geometry, material));
        if !todo.any() {
            continue;
        }

        if !group.is_array_initialized() {
            init_group_arrays(group, geometry, material);
        }

        match sync_group(group, geometry, material, backend, usage)? {
            SyncOutcome::Synced(chunk) => report.merge(&chunk),
            SyncOutcome::NotInitialized => {
                log::warn!(
                    "Chunk (material {:?}) has no buffers, call init_buffers first",
                    group.material_index
                );
            }
        }
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::geometry::{Face, GeometryConfig};
    use crate::gfx::rendering::backend::HeadlessBackend;
    use crate::gfx::rendering::draw::DrawMode;
    use crate::gfx::resources::{Shading, VertexColors};
    use crate::math::Vec3;

    fn quad_geometry() -> Geometry {
        let mut g = Geometry::new();
        for (x, y) in [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)] {
            g.push_vertex(Vec3::new(x, y, 0.0));
        }
        g.push_face(Face::quad(0, 1, 2, 3).with_material(0));
        g.compute_face_normals(false).unwrap();
        g.compute_vertex_normals().unwrap();
        g
    }

    #[test]
    fn test_new_computes_bound_radius() {
        let mesh = Mesh::new(quad_geometry(), MeshMaterial::Single(Material::default()));
        assert!((mesh.bound_radius() - 2.0f64.sqrt()).abs() < 1e-12);
        assert!(mesh.morph().is_none());
        assert!(mesh.geometry().bounding_sphere().is_some());
    }

    #[test]
    fn test_morph_dictionary_lookup() {
        let mut g = quad_geometry();
        let verts = g.vertices().to_vec();
        g.add_morph_target("open", verts.clone()).unwrap();
        g.add_morph_target("closed", verts).unwrap();

        let mesh = Mesh::new(g, MeshMaterial::Single(Material::default()));
        let morph = mesh.morph().unwrap();
        assert_eq!(morph.influences, vec![0.0, 0.0]);
        assert!(morph.forced_order.is_empty());
        assert_eq!(morph.base, None);

        assert_eq!(mesh.morph_target_index_by_name("closed"), 1);
        assert_eq!(mesh.morph_target_index_by_name("missing"), 0);
    }

    #[test]
    fn test_resolve_per_face_material() {
        let mut g = quad_geometry();
        g.push_material(Material::new("first"));
        g.partition();
        let mesh = Mesh::new(g, MeshMaterial::PerFace);

        let group = &mesh.geometry().groups().unwrap()[0];
        assert_eq!(mesh.resolve_material(group).unwrap().name, "first");

        let orphan = GeometryGroup::new(None, 0, 0);
        assert_eq!(
            mesh.resolve_material(&orphan).unwrap_err(),
            GeometryError::MissingMaterial { material_index: None }
        );
    }

    #[test]
    fn test_buffer_lifecycle() {
        let mut backend = HeadlessBackend::new();
        let mut info = RenderInfo::new();
        let mut mesh = Mesh::new(quad_geometry(), MeshMaterial::Single(Material::default()));

        mesh.init_buffers(&mut backend, &mut info).unwrap();
        assert_eq!(info.memory.geometries, 1);
        assert_eq!(backend.live_buffers(), 10);

        // A second call finds every chunk initialized.
        mesh.init_buffers(&mut backend, &mut info).unwrap();
        assert_eq!(info.memory.geometries, 1);

        let report = mesh.set_buffers(&mut backend).unwrap();
        assert_eq!(report.chunks, 1);
        assert_eq!(report.uploads, 4);
        assert_eq!(report.released, 1);
        assert!(!mesh.geometry().dirty().any());

        // Nothing pending: the next pass does no work.
        let report = mesh.set_buffers(&mut backend).unwrap();
        assert_eq!(report, SyncReport::default());

        let command = mesh.render_buffer(0, &mut info).unwrap();
        assert_eq!(command.mode, DrawMode::Triangles);
        assert_eq!(command.index_count, 6);
        assert_eq!(info.render.calls, 1);
        assert_eq!(info.render.vertices, 6);
        assert_eq!(info.render.faces, 2);

        mesh.delete_buffers(&mut backend, &mut info);
        assert_eq!(info.memory.geometries, 0);
        assert_eq!(backend.live_buffers(), 0);
    }

    #[test]
    fn test_repartition_retires_live_buffers() {
        let mut backend = HeadlessBackend::new();
        let mut info = RenderInfo::new();
        let mut mesh = Mesh::new(quad_geometry(), MeshMaterial::Single(Material::default()));

        mesh.init_buffers(&mut backend, &mut info).unwrap();
        mesh.geometry_mut().partition();
        assert_eq!(mesh.geometry().retired_buffers().len(), 1);
        assert_eq!(backend.live_buffers(), 10);

        // The replaced chunk's buffers go before the new chunk gets its own.
        mesh.init_buffers(&mut backend, &mut info).unwrap();
        assert!(mesh.geometry().retired_buffers().is_empty());
        assert_eq!(info.memory.geometries, 1);
        assert_eq!(backend.live_buffers(), 10);

        mesh.geometry_mut().partition();
        mesh.delete_buffers(&mut backend, &mut info);
        assert_eq!(info.memory.geometries, 0);
        assert_eq!(backend.live_buffers(), 0);
    }

    #[test]
    fn test_wireframe_draws_lines() {
        let mut backend = HeadlessBackend::new();
        let mut info = RenderInfo::new();
        let material = Material::default().with_wireframe(true);
        let mut mesh = Mesh::new(quad_geometry(), MeshMaterial::Single(material));

        mesh.init_buffers(&mut backend, &mut info).unwrap();
        mesh.set_buffers(&mut backend).unwrap();

        let command = mesh.render_buffer(0, &mut info).unwrap();
        assert_eq!(command.mode, DrawMode::Lines);
        assert_eq!(command.index_count, 8);
        assert_eq!(backend.read_u16(command.index_buffer).unwrap(), vec![0, 1, 0, 3, 1, 2, 2, 3]);
        // Stats count the triangle indices.
        assert_eq!(info.render.vertices, 6);
    }

    #[test]
    fn test_set_buffers_requires_partition() {
        let mut backend = HeadlessBackend::new();
        let mut mesh = Mesh::new(quad_geometry(), MeshMaterial::Single(Material::default()));
        assert_eq!(
            mesh.set_buffers(&mut backend).unwrap_err(),
            GeometryError::GroupsNotPartitioned
        );
    }

    #[test]
    fn test_material_change_uploads_pending_category() {
        let mut backend = HeadlessBackend::new();
        let mut info = RenderInfo::new();
        let mut g = quad_geometry();
        g.set_dynamic(true);
        let mut mesh = Mesh::new(g, MeshMaterial::Single(Material::default()));

        mesh.init_buffers(&mut backend, &mut info).unwrap();
        mesh.set_buffers(&mut backend).unwrap();
        assert!(mesh.geometry().groups().unwrap()[0].pending().colors);

        let colored = Material::default()
            .with_shading(Shading::Flat)
            .with_vertex_colors(VertexColors::Face);
        mesh.set_material(MeshMaterial::Single(colored));
        let report = mesh.set_buffers(&mut backend).unwrap();
        assert_eq!(report.uploads, 1);

        let group = &mesh.geometry().groups().unwrap()[0];
        assert!(!group.pending().colors);
        let colors = backend.read_f32(group.buffers().unwrap().color).unwrap();
        assert_eq!(colors, vec![1.0; 12]);
    }

    #[test]
    fn test_static_geometry_reinitializes_arrays() {
        let mut backend = HeadlessBackend::new();
        let mut info = RenderInfo::new();
        let g = Geometry::with_config(GeometryConfig::default());
        let mut mesh = Mesh::new(g, MeshMaterial::Single(Material::default()));
        mesh.geometry_mut().push_vertex(Vec3::new(0.0, 0.0, 0.0));
        mesh.geometry_mut().push_vertex(Vec3::new(1.0, 0.0, 0.0));
        mesh.geometry_mut().push_vertex(Vec3::new(0.0, 1.0, 0.0));
        mesh.geometry_mut().push_face(Face::triangle(0, 1, 2));

        mesh.init_buffers(&mut backend, &mut info).unwrap();
        mesh.set_buffers(&mut backend).unwrap();
        assert!(!mesh.geometry().groups().unwrap()[0].is_array_initialized());

        mesh.geometry_mut().vertices_mut()[2] = Vec3::new(0.0, 2.0, 0.0);
        let report = mesh.set_buffers(&mut backend).unwrap();
        assert_eq!(report.uploads, 1);

        let group = &mesh.geometry().groups().unwrap()[0];
        let positions = backend.read_f32(group.buffers().unwrap().vertex).unwrap();
        assert_eq!(positions[7], 2.0);
    }
}
