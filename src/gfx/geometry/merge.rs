//! Vertex welding.

use std::collections::HashMap;

use super::{Face, FaceKind, Geometry};
use crate::error::Result;

impl Geometry {
    /// Weld vertices that coincide at the configured decimal precision.
    ///
    /// The first vertex seen at a position is kept and later duplicates are
    /// remapped onto it. A quad left with a repeated corner collapses into a
    /// triangle that keeps its normal, color and material. Morph targets and
    /// skin arrays keep the entries of the surviving vertices. Returns the
    /// number of vertices removed.
    pub fn merge_vertices(&mut self) -> Result<usize> {
        self.check_face_indices()?;

        let precision = 10f64.powi(self.config.merge_precision_points);
        let round = |c: f64| (c * precision + 0.5).floor() as i64;

        let mut first_index: HashMap<(i64, i64, i64), usize> = HashMap::new();
        let mut unique = Vec::with_capacity(self.vertices.len());
        let mut changes = Vec::with_capacity(self.vertices.len());
        let mut survivors = Vec::with_capacity(self.vertices.len());

        for (i, v) in self.vertices.iter().enumerate() {
            let key = (round(v.x), round(v.y), round(v.z));
            match first_index.get(&key) {
                Some(&first) => changes.push(changes[first]),
                None => {
                    first_index.insert(key, i);
                    unique.push(*v);
                    survivors.push(i);
                    changes.push(unique.len() - 1);
                }
            }
        }

        let mut collapsed = 0;
        for (face_index, face) in self.faces.iter_mut().enumerate() {
            for corner in face.kind.corners_mut() {
                *corner = changes[*corner];
            }

            let FaceKind::Quad(corners) = face.kind else {
                continue;
            };

            let Some(k) = (1..4)
                .rev()
                .find(|&k| corners.iter().position(|&c| c == corners[k]) != Some(k))
            else {
                continue;
            };

            let mut kept = corners.to_vec();
            kept.remove(k);

            let mut vertex_colors = std::mem::take(&mut face.vertex_colors);
            if k < vertex_colors.len() {
                vertex_colors.remove(k);
            }

            let mut triangle = Face::triangle(kept[0], kept[1], kept[2])
                .with_normal(face.normal)
                .with_color(face.color)
                .with_vertex_colors(vertex_colors);
            triangle.material_index = face.material_index;
            *face = triangle;

            for layer in &mut self.face_vertex_uvs {
                if let Some(uvs) = layer.get_mut(face_index) {
                    if k < uvs.len() {
                        uvs.remove(k);
                    }
                }
            }
            collapsed += 1;
        }

        let old_count = self.vertices.len();
        let removed = old_count - unique.len();
        self.vertices = unique;

        for target in &mut self.morph_targets {
            keep_survivors(&mut target.vertices, &survivors, old_count);
        }
        keep_survivors(&mut self.skin_weights, &survivors, old_count);
        keep_survivors(&mut self.skin_indices, &survivors, old_count);
        if !self.morph_targets.is_empty() {
            self.dirty.morph_targets = true;
        }
        self.structure_changed();
        self.dirty.elements = true;

        log::debug!(
            "Merged vertices: {} removed, {} quads collapsed",
            removed,
            collapsed
        );
        Ok(removed)
    }
}

/// Per-vertex data of the wrong length is left for `validate` to report.
fn keep_survivors<T: Copy>(values: &mut Vec<T>, survivors: &[usize], old_count: usize) {
    if values.len() == old_count {
        *values = survivors.iter().map(|&i| values[i]).collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::geometry::GeometryConfig;
    use crate::math::{Color, Vec2, Vec3, Vec4};

    #[test]
    fn test_duplicate_vertex_is_removed() {
        let mut g = Geometry::new();
        g.push_vertex(Vec3::new(0.0, 0.0, 0.0));
        g.push_vertex(Vec3::new(1.0, 0.0, 0.0));
        g.push_vertex(Vec3::new(1.00001, 0.0, 0.0));
        g.push_vertex(Vec3::new(0.0, 1.0, 0.0));
        g.push_face(Face::triangle(0, 2, 3));

        assert_eq!(g.merge_vertices().unwrap(), 1);
        assert_eq!(g.vertices().len(), 3);
        assert_eq!(g.faces()[0].corners(), &[0, 1, 2]);
    }

    #[test]
    fn test_morph_and_skin_data_follow_surviving_vertices() {
        let mut g = Geometry::new();
        g.push_vertex(Vec3::new(0.0, 0.0, 0.0));
        g.push_vertex(Vec3::new(1.0, 0.0, 0.0));
        g.push_vertex(Vec3::new(1.00001, 0.0, 0.0));
        g.push_vertex(Vec3::new(0.0, 1.0, 0.0));
        g.push_face(Face::triangle(0, 2, 3));

        let lifted = (0..4).map(|i| Vec3::new(0.0, 0.0, i as f64)).collect();
        g.add_morph_target("lift", lifted).unwrap();
        let bones: Vec<Vec4> = (0..4).map(|i| Vec4::new(i as f64, 0.0, 0.0, 0.0)).collect();
        g.set_skinning(vec![Vec4::new(1.0, 0.0, 0.0, 0.0); 4], bones).unwrap();

        assert_eq!(g.merge_vertices().unwrap(), 1);
        g.validate().unwrap();

        let z: Vec<f64> = g.morph_targets()[0].vertices.iter().map(|v| v.z).collect();
        assert_eq!(z, vec![0.0, 1.0, 3.0]);
        let bone: Vec<f64> = g.skin_indices().iter().map(|v| v.x).collect();
        assert_eq!(bone, vec![0.0, 1.0, 3.0]);
        assert!(g.dirty().morph_targets);
    }

    #[test]
    fn test_merge_is_idempotent() {
        let mut g = Geometry::new();
        for _ in 0..3 {
            g.push_vertex(Vec3::new(0.5, 0.5, 0.5));
        }
        g.push_vertex(Vec3::new(2.0, 0.0, 0.0));

        assert_eq!(g.merge_vertices().unwrap(), 2);
        assert_eq!(g.merge_vertices().unwrap(), 0);
    }

    #[test]
    fn test_duplicates_chain_to_first_occurrence() {
        let mut g = Geometry::new();
        g.push_vertex(Vec3::new(9.0, 9.0, 9.0));
        g.push_vertex(Vec3::new(1.0, 1.0, 1.0));
        g.push_vertex(Vec3::new(9.0, 9.0, 9.0));
        g.push_vertex(Vec3::new(1.0, 1.0, 1.0));
        g.push_face(Face::triangle(3, 2, 1));

        g.merge_vertices().unwrap();
        assert_eq!(g.faces()[0].corners(), &[1, 0, 1]);
    }

    #[test]
    fn test_degenerate_quad_collapses_to_triangle() {
        let mut g = Geometry::new();
        g.push_vertex(Vec3::new(0.0, 0.0, 0.0));
        g.push_vertex(Vec3::new(1.0, 0.0, 0.0));
        g.push_vertex(Vec3::new(1.0, 1.0, 0.0));
        g.push_vertex(Vec3::new(1.0, 1.0, 0.0));

        let colors = vec![
            Color::from_hex(0x110000),
            Color::from_hex(0x002200),
            Color::from_hex(0x000033),
            Color::from_hex(0x444444),
        ];
        g.push_face_with_uvs(
            Face::quad(0, 1, 2, 3)
                .with_material(3)
                .with_color(Color::from_hex(0xABCDEF))
                .with_vertex_colors(colors.clone()),
            vec![
                Vec2::new(0.0, 0.0),
                Vec2::new(1.0, 0.0),
                Vec2::new(1.0, 1.0),
                Vec2::new(0.5, 0.5),
            ],
        );

        assert_eq!(g.merge_vertices().unwrap(), 1);

        let face = &g.faces()[0];
        assert!(!face.is_quad());
        assert_eq!(face.corners(), &[0, 1, 2]);
        assert_eq!(face.material_index, Some(3));
        assert_eq!(face.color.hex(), 0xABCDEF);
        assert_eq!(face.vertex_colors, colors[..3].to_vec());
        assert_eq!(
            g.face_vertex_uvs()[0][0],
            vec![Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), Vec2::new(1.0, 1.0)]
        );
        g.validate().unwrap();
    }

    #[test]
    fn test_collapse_removes_middle_corner() {
        let mut g = Geometry::new();
        g.push_vertex(Vec3::new(0.0, 0.0, 0.0));
        g.push_vertex(Vec3::new(1.0, 0.0, 0.0));
        g.push_vertex(Vec3::new(0.0, 0.0, 0.0));
        g.push_vertex(Vec3::new(0.0, 1.0, 0.0));
        g.push_face(Face::quad(0, 1, 2, 3));

        g.merge_vertices().unwrap();
        assert_eq!(g.faces()[0].corners(), &[0, 1, 2]);
    }

    #[test]
    fn test_precision_is_configurable() {
        let config = GeometryConfig::default().with_merge_precision_points(1);
        let mut g = Geometry::with_config(config);
        g.push_vertex(Vec3::new(0.0, 0.0, 0.0));
        g.push_vertex(Vec3::new(0.01, 0.0, 0.0));
        assert_eq!(g.merge_vertices().unwrap(), 1);
    }
}
