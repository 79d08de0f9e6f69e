//! Per-corner tangents from UV layer 0.
//!
//! Tangent and bitangent directions are solved per triangle in UV space and
//! summed per vertex. Each corner then orthogonalizes the summed tangent
//! against its vertex normal and records the handedness in `w`.

use cgmath::{InnerSpace, Zero};

use super::{FaceKind, Geometry};
use crate::error::{GeometryError, Result};
use crate::math::{normalize_or_zero, Vec2, Vec3, Vec4};

impl Geometry {
    /// Compute vertex tangents. Needs vertex normals and UV layer 0.
    pub fn compute_tangents(&mut self) -> Result<()> {
        self.check_face_indices()?;

        let uvs = match self.face_vertex_uvs.first() {
            Some(layer) if !layer.is_empty() => layer,
            _ => return Err(GeometryError::MissingUvLayer),
        };
        self.check_uv_layer(0)?;

        for (index, face) in self.faces.iter().enumerate() {
            if face.vertex_normals.len() != face.arity() {
                return Err(GeometryError::MissingVertexNormals { face: index });
            }
        }

        let mut tan1 = vec![Vec3::zero(); self.vertices.len()];
        let mut tan2 = vec![Vec3::zero(); self.vertices.len()];

        for (face, uv) in self.faces.iter().zip(uvs) {
            match face.kind {
                FaceKind::Triangle([a, b, c]) => {
                    accumulate(&self.vertices, [a, b, c], [uv[0], uv[1], uv[2]], &mut tan1, &mut tan2);
                }
                FaceKind::Quad([a, b, c, d]) => {
                    accumulate(&self.vertices, [a, b, c], [uv[0], uv[1], uv[2]], &mut tan1, &mut tan2);
                    accumulate(&self.vertices, [a, b, d], [uv[0], uv[1], uv[3]], &mut tan1, &mut tan2);
                }
            }
        }

        for face in &mut self.faces {
            face.vertex_tangents.clear();

            for (corner, &vertex) in face.kind.corners().iter().enumerate() {
                let n = face.vertex_normals[corner];
                let t = tan1[vertex];

                let tangent = normalize_or_zero(t - n * n.dot(t));
                let w = if n.cross(t).dot(tan2[vertex]) < 0.0 { -1.0 } else { 1.0 };

                face.vertex_tangents
                    .push(Vec4::new(tangent.x, tangent.y, tangent.z, w));
            }
        }

        self.has_tangents = true;
        self.dirty.tangents = true;
        Ok(())
    }
}

fn accumulate(
    vertices: &[Vec3],
    [a, b, c]: [usize; 3],
    [uv_a, uv_b, uv_c]: [Vec2; 3],
    tan1: &mut [Vec3],
    tan2: &mut [Vec3],
) {
    let e1 = vertices[b] - vertices[a];
    let e2 = vertices[c] - vertices[a];

    let s1 = uv_b.x - uv_a.x;
    let s2 = uv_c.x - uv_a.x;
    let t1 = uv_b.y - uv_a.y;
    let t2 = uv_c.y - uv_a.y;

    // Zero UV area leaves the directions undefined; such a triangle adds nothing.
    let det = s1 * t2 - s2 * t1;
    if det == 0.0 {
        return;
    }
    let r = 1.0 / det;

    let sdir = (e1 * t2 - e2 * t1) * r;
    let tdir = (e2 * s1 - e1 * s2) * r;

    for i in [a, b, c] {
        tan1[i] += sdir;
        tan2[i] += tdir;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::geometry::Face;

    const EPS: f64 = 1e-12;

    fn uv_quad() -> Geometry {
        let mut g = Geometry::new();
        g.push_vertex(Vec3::new(0.0, 0.0, 0.0));
        g.push_vertex(Vec3::new(1.0, 0.0, 0.0));
        g.push_vertex(Vec3::new(1.0, 1.0, 0.0));
        g.push_vertex(Vec3::new(0.0, 1.0, 0.0));
        g.push_face_with_uvs(
            Face::quad(0, 1, 2, 3),
            vec![
                Vec2::new(0.0, 0.0),
                Vec2::new(1.0, 0.0),
                Vec2::new(1.0, 1.0),
                Vec2::new(0.0, 1.0),
            ],
        );
        g.compute_face_normals(false).unwrap();
        g.compute_vertex_normals().unwrap();
        g
    }

    #[test]
    fn test_tangents_follow_u_axis() {
        let mut g = uv_quad();
        g.compute_tangents().unwrap();
        assert!(g.has_tangents());

        let face = &g.faces()[0];
        assert_eq!(face.vertex_tangents.len(), 4);
        for t in &face.vertex_tangents {
            assert!((t.truncate() - Vec3::unit_x()).magnitude() < EPS);
            assert_eq!(t.w, 1.0);
        }
    }

    #[test]
    fn test_mirrored_uvs_flip_handedness() {
        let mut g = uv_quad();
        for uv in &mut g.face_vertex_uvs_mut()[0][0] {
            uv.y = 1.0 - uv.y;
        }
        g.compute_tangents().unwrap();
        for t in &g.faces()[0].vertex_tangents {
            assert_eq!(t.w, -1.0);
        }
    }

    #[test]
    fn test_handedness_tie_is_positive() {
        let mut g = Geometry::new();
        g.push_vertex(Vec3::new(0.0, 0.0, 0.0));
        g.push_vertex(Vec3::new(1.0, 0.0, 0.0));
        g.push_vertex(Vec3::new(0.0, 1.0, 0.0));
        g.push_face_with_uvs(
            Face::triangle(0, 1, 2),
            vec![Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), Vec2::new(0.0, 1.0)],
        );
        g.compute_face_normals(false).unwrap();
        g.compute_vertex_normals().unwrap();

        // A normal lying in the tangent plane makes the handedness test exactly zero.
        g.faces_mut()[0].vertex_normals = vec![Vec3::unit_y(); 3];
        g.compute_tangents().unwrap();
        for t in &g.faces()[0].vertex_tangents {
            assert_eq!(t.w, 1.0);
        }
    }

    #[test]
    fn test_missing_uv_layer() {
        let mut g = Geometry::new();
        g.push_vertex(Vec3::new(0.0, 0.0, 0.0));
        g.push_vertex(Vec3::new(1.0, 0.0, 0.0));
        g.push_vertex(Vec3::new(0.0, 1.0, 0.0));
        g.push_face(Face::triangle(0, 1, 2));
        assert_eq!(g.compute_tangents(), Err(GeometryError::MissingUvLayer));
    }

    #[test]
    fn test_missing_vertex_normals() {
        let mut g = uv_quad();
        g.faces_mut()[0].vertex_normals.clear();
        assert_eq!(
            g.compute_tangents(),
            Err(GeometryError::MissingVertexNormals { face: 0 })
        );
    }

    #[test]
    fn test_collapsed_uvs_give_zero_tangent() {
        let mut g = uv_quad();
        for uv in &mut g.face_vertex_uvs_mut()[0][0] {
            *uv = Vec2::new(0.5, 0.5);
        }
        g.compute_tangents().unwrap();

        for t in &g.faces()[0].vertex_tangents {
            assert_eq!(*t, Vec4::new(0.0, 0.0, 0.0, 1.0));
        }
    }
}
