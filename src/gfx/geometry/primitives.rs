//! # Primitive Shape Generation
//!
//! This module contains functions to generate common 3D primitive shapes as
//! [`Geometry`] values. Every shape comes with UV layer 0 filled, centroids,
//! face normals and vertex normals computed.

use std::f64::consts::PI;

use cgmath::InnerSpace;

use super::{Face, Geometry};
use crate::error::Result;
use crate::math::{Vec2, Vec3};

fn finish(mut geometry: Geometry) -> Result<Geometry> {
    geometry.compute_centroids()?;
    geometry.compute_face_normals(false)?;
    geometry.compute_vertex_normals()?;
    Ok(geometry)
}

/// Generate a cube centered at the origin
///
/// Each side is a quad with its own four vertices, so vertex normals stay
/// flat. UVs run from 0 to 1 on every side.
pub fn generate_cube(size: f64) -> Result<Geometry> {
    let h = size * 0.5;

    // Four corners per side, counter-clockwise seen from outside.
    let sides: [[[f64; 3]; 4]; 6] = [
        // Front (+Z)
        [[-h, -h, h], [h, -h, h], [h, h, h], [-h, h, h]],
        // Back (-Z)
        [[-h, -h, -h], [-h, h, -h], [h, h, -h], [h, -h, -h]],
        // Left (-X)
        [[-h, -h, -h], [-h, -h, h], [-h, h, h], [-h, h, -h]],
        // Right (+X)
        [[h, -h, h], [h, -h, -h], [h, h, -h], [h, h, h]],
        // Top (+Y)
        [[-h, h, h], [h, h, h], [h, h, -h], [-h, h, -h]],
        // Bottom (-Y)
        [[-h, -h, -h], [h, -h, -h], [h, -h, h], [-h, -h, h]],
    ];

    let tex_coords: [[[f64; 2]; 4]; 6] = [
        [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]],
        [[1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.0, 0.0]],
        [[1.0, 0.0], [0.0, 0.0], [0.0, 1.0], [1.0, 1.0]],
        [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]],
        [[0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]],
        [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]],
    ];

    let mut geometry = Geometry::new();
    for (corners, uvs) in sides.iter().zip(&tex_coords) {
        let base = geometry.vertices().len();
        for &[x, y, z] in corners {
            geometry.push_vertex(Vec3::new(x, y, z));
        }
        geometry.push_face_with_uvs(
            Face::quad(base, base + 1, base + 2, base + 3),
            uvs.iter().map(|&[u, v]| Vec2::new(u, v)).collect(),
        );
    }

    finish(geometry)
}

/// Generate a plane in the XY plane, facing +Z
///
/// # Arguments
/// * `width` - Width of the plane (X direction)
/// * `height` - Height of the plane (Y direction)
/// * `width_segments` - Number of subdivisions along width
/// * `height_segments` - Number of subdivisions along height
pub fn generate_plane(width: f64, height: f64, width_segments: usize, height_segments: usize) -> Result<Geometry> {
    let w_segs = width_segments.max(1);
    let h_segs = height_segments.max(1);
    let mut geometry = Geometry::new();

    for y in 0..=h_segs {
        let v = y as f64 / h_segs as f64;
        for x in 0..=w_segs {
            let u = x as f64 / w_segs as f64;
            geometry.push_vertex(Vec3::new((u - 0.5) * width, (v - 0.5) * height, 0.0));
        }
    }

    let uv = |x: usize, y: usize| Vec2::new(x as f64 / w_segs as f64, y as f64 / h_segs as f64);
    for y in 0..h_segs {
        for x in 0..w_segs {
            let i = y * (w_segs + 1) + x;
            let next_row = i + w_segs + 1;
            geometry.push_face_with_uvs(
                Face::quad(i, i + 1, next_row + 1, next_row),
                vec![uv(x, y), uv(x + 1, y), uv(x + 1, y + 1), uv(x, y + 1)],
            );
        }
    }

    finish(geometry)
}

/// Generate a UV sphere with specified resolution
///
/// # Arguments
/// * `radius` - Sphere radius
/// * `longitude_segments` - Number of vertical segments (at least 3)
/// * `latitude_segments` - Number of horizontal segments (at least 2)
///
/// Rows touching a pole are triangles, the rest are quads.
pub fn generate_sphere(radius: f64, longitude_segments: usize, latitude_segments: usize) -> Result<Geometry> {
    let long_segs = longitude_segments.max(3);
    let lat_segs = latitude_segments.max(2);
    let mut geometry = Geometry::new();

    for lat in 0..=lat_segs {
        let theta = lat as f64 * PI / lat_segs as f64;
        for long in 0..=long_segs {
            let phi = long as f64 * 2.0 * PI / long_segs as f64;
            geometry.push_vertex(Vec3::new(
                radius * theta.sin() * phi.cos(),
                radius * theta.cos(),
                radius * theta.sin() * phi.sin(),
            ));
        }
    }

    let uv = |long: usize, lat: usize| Vec2::new(long as f64 / long_segs as f64, lat as f64 / lat_segs as f64);
    for lat in 0..lat_segs {
        for long in 0..long_segs {
            let first = lat * (long_segs + 1) + long;
            let second = first + long_segs + 1;

            if lat == 0 {
                geometry.push_face_with_uvs(
                    Face::triangle(first, second + 1, second),
                    vec![uv(long, lat), uv(long + 1, lat + 1), uv(long, lat + 1)],
                );
            } else if lat == lat_segs - 1 {
                geometry.push_face_with_uvs(
                    Face::triangle(first, first + 1, second),
                    vec![uv(long, lat), uv(long + 1, lat), uv(long, lat + 1)],
                );
            } else {
                geometry.push_face_with_uvs(
                    Face::quad(first, first + 1, second + 1, second),
                    vec![
                        uv(long, lat),
                        uv(long + 1, lat),
                        uv(long + 1, lat + 1),
                        uv(long, lat + 1),
                    ],
                );
            }
        }
    }

    finish(geometry)
}

/// Point on the (p, q) torus knot curve at parameter `u`.
fn knot_point(u: f64, p: u32, q: u32, radius: f64, height_scale: f64) -> Vec3 {
    let q_over_p = q as f64 / p as f64 * u;
    let cs = q_over_p.cos();
    Vec3::new(
        radius * (2.0 + cs) * u.cos() * 0.5,
        radius * (2.0 + cs) * u.sin() * 0.5,
        height_scale * radius * q_over_p.sin() * 0.5,
    )
}

/// Generate a tube swept along a (p, q) torus knot
///
/// # Arguments
/// * `radius` - Radius of the knot curve
/// * `tube` - Radius of the swept tube
/// * `segments_r` - Segments along the curve (at least 3)
/// * `segments_t` - Segments around the tube (at least 3)
/// * `p`, `q` - Winding numbers of the knot (`p` at least 1)
/// * `height_scale` - Stretch along Z
///
/// The result is `segments_r * segments_t` vertices joined by quads that
/// wrap around in both directions.
pub fn generate_torus_knot(
    radius: f64,
    tube: f64,
    segments_r: usize,
    segments_t: usize,
    p: u32,
    q: u32,
    height_scale: f64,
) -> Result<Geometry> {
    let segments_r = segments_r.max(3);
    let segments_t = segments_t.max(3);
    let p = p.max(1);
    let mut geometry = Geometry::new();

    for i in 0..segments_r {
        for j in 0..segments_t {
            let u = i as f64 / segments_r as f64 * 2.0 * p as f64 * PI;
            let v = j as f64 / segments_t as f64 * 2.0 * PI;

            let p1 = knot_point(u, p, q, radius, height_scale);
            let p2 = knot_point(u + 0.01, p, q, radius, height_scale);

            // Frame around the curve: tangent, then two axes across it.
            let tangent = p2 - p1;
            let bitangent = tangent.cross(p2 + p1);
            let normal = bitangent.cross(tangent).normalize();
            let bitangent = bitangent.normalize();

            // Negated so the tube faces outwards.
            let cx = -tube * v.cos();
            let cy = tube * v.sin();

            geometry.push_vertex(p1 + normal * cx + bitangent * cy);
        }
    }

    let grid = |i: usize, j: usize| i * segments_t + j;
    let uv = |i: usize, j: usize| Vec2::new(i as f64 / segments_r as f64, j as f64 / segments_t as f64);
    for i in 0..segments_r {
        for j in 0..segments_t {
            let ip = (i + 1) % segments_r;
            let jp = (j + 1) % segments_t;

            geometry.push_face_with_uvs(
                Face::quad(grid(i, j), grid(ip, j), grid(ip, jp), grid(i, jp)),
                vec![uv(i, j), uv(i + 1, j), uv(i + 1, j + 1), uv(i, j + 1)],
            );
        }
    }

    finish(geometry)
}
