//! Face partitioning into material chunks.
//!
//! Faces are visited in order and appended to the current chunk of their
//! material. When a face would push that chunk past the vertex ceiling the
//! material moves on to its next chunk. Face order inside each material is
//! preserved across its chunks.

use std::collections::HashMap;
use std::fmt;

use super::{Face, Geometry, GeometryGroup};

/// Identifies a chunk as `material_ordinal`, with `-1` for faces without a material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkKey {
    pub material_index: Option<usize>,
    pub ordinal: usize,
}

impl fmt::Display for ChunkKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.material_index {
            Some(m) => write!(f, "{}_{}", m, self.ordinal),
            None => write!(f, "-1_{}", self.ordinal),
        }
    }
}

/// Split `faces` into chunks of at most `max_vertices` corners.
///
/// Returns the chunks in creation order and the key of each chunk.
pub fn partition_faces(
    faces: &[Face],
    max_vertices: usize,
    num_morph_targets: usize,
    num_morph_normals: usize,
) -> (Vec<GeometryGroup>, HashMap<ChunkKey, usize>) {
    let mut ordinals: HashMap<Option<usize>, usize> = HashMap::new();
    let mut index: HashMap<ChunkKey, usize> = HashMap::new();
    let mut groups: Vec<GeometryGroup> = Vec::new();

    for (f, face) in faces.iter().enumerate() {
        let material_index = face.material_index;
        let ordinal = ordinals.entry(material_index).or_insert(0);
        let arity = face.arity();

        let mut key = ChunkKey {
            material_index,
            ordinal: *ordinal,
        };
        let mut slot = chunk_slot(key, &mut groups, &mut index, num_morph_targets, num_morph_normals);

        if groups[slot].vertices + arity > max_vertices {
            *ordinal += 1;
            key.ordinal = *ordinal;
            slot = chunk_slot(key, &mut groups, &mut index, num_morph_targets, num_morph_normals);
        }

        let group = &mut groups[slot];
        if face.is_quad() {
            group.faces4.push(f);
        } else {
            group.faces3.push(f);
        }
        group.vertices += arity;
    }

    (groups, index)
}

/// Position of the chunk for `key`, created on first use.
fn chunk_slot(
    key: ChunkKey,
    groups: &mut Vec<GeometryGroup>,
    index: &mut HashMap<ChunkKey, usize>,
    num_morph_targets: usize,
    num_morph_normals: usize,
) -> usize {
    *index.entry(key).or_insert_with(|| {
        groups.push(GeometryGroup::new(
            key.material_index,
            num_morph_targets,
            num_morph_normals,
        ));
        groups.len() - 1
    })
}

impl Geometry {
    /// Partition faces into chunks by material. Replaces any existing chunks.
    ///
    /// Buffers held by the replaced chunks move to
    /// [`retired_buffers`](Self::retired_buffers) until a mesh deletes them.
    pub fn partition(&mut self) {
        if let Some(old) = self.groups.take() {
            let before = self.retired_buffers.len();
            self.retired_buffers
                .extend(old.into_iter().filter_map(|group| group.buffers));
            let retired = self.retired_buffers.len() - before;
            if retired > 0 {
                log::debug!("Retired buffers of {} replaced chunks", retired);
            }
        }

        let (groups, cache) = partition_faces(
            &self.faces,
            self.config.max_chunk_vertices,
            self.morph_targets.len(),
            self.morph_normals.len(),
        );

        log::debug!(
            "Partitioned {} faces into {} chunks",
            self.faces.len(),
            groups.len()
        );

        self.groups = Some(groups);
        self.groups_cache = cache;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::geometry::GeometryConfig;
    use crate::math::Vec3;

    fn faces(materials: &[Option<usize>], quads: bool) -> Vec<Face> {
        materials
            .iter()
            .map(|&m| {
                let mut face = if quads {
                    Face::quad(0, 1, 2, 3)
                } else {
                    Face::triangle(0, 1, 2)
                };
                face.material_index = m;
                face
            })
            .collect()
    }

    #[test]
    fn test_chunk_key_display() {
        let key = ChunkKey {
            material_index: Some(3),
            ordinal: 1,
        };
        assert_eq!(key.to_string(), "3_1");

        let key = ChunkKey {
            material_index: None,
            ordinal: 0,
        };
        assert_eq!(key.to_string(), "-1_0");
    }

    #[test]
    fn test_faces_grouped_by_material_in_creation_order() {
        let faces = faces(&[Some(1), None, Some(0), Some(1), None], false);
        let (groups, index) = partition_faces(&faces, 65535, 0, 0);

        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0].material_index, Some(1));
        assert_eq!(groups[0].faces3, vec![0, 3]);
        assert_eq!(groups[1].material_index, None);
        assert_eq!(groups[1].faces3, vec![1, 4]);
        assert_eq!(groups[2].faces3, vec![2]);

        let key = ChunkKey {
            material_index: None,
            ordinal: 0,
        };
        assert_eq!(index[&key], 1);
    }

    #[test]
    fn test_ceiling_starts_new_chunk() {
        let faces = faces(&[Some(0); 5], true);
        let (groups, index) = partition_faces(&faces, 8, 2, 1);

        assert_eq!(groups.len(), 3);
        assert_eq!(groups[0].faces4, vec![0, 1]);
        assert_eq!(groups[1].faces4, vec![2, 3]);
        assert_eq!(groups[2].faces4, vec![4]);
        assert!(groups.iter().all(|g| g.vertices <= 8));
        assert!(groups.iter().all(|g| g.num_morph_targets == 2 && g.num_morph_normals == 1));
        assert_eq!(
            index[&ChunkKey {
                material_index: Some(0),
                ordinal: 2
            }],
            2
        );
    }

    #[test]
    fn test_mixed_arity_fills_exactly() {
        let mut faces = faces(&[Some(0); 2], false);
        faces.push(Face::quad(0, 1, 2, 3).with_material(0));
        let (groups, _) = partition_faces(&faces, 10, 0, 0);

        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].vertices, 10);
        assert_eq!(groups[0].expanded_vertex_count(), 10);
    }

    #[test]
    fn test_geometry_partition_uses_config() {
        let mut g = Geometry::with_config(GeometryConfig::default().with_max_chunk_vertices(6));
        for i in 0..3 {
            g.push_vertex(Vec3::new(i as f64, 0.0, 0.0));
        }
        for _ in 0..3 {
            g.push_face(Face::triangle(0, 1, 2));
        }
        g.partition();

        let groups = g.groups().unwrap();
        assert_eq!(groups.len(), 2);
        let second = ChunkKey {
            material_index: None,
            ordinal: 1,
        };
        assert_eq!(g.group_by_key(&second).map(|c| c.faces3.clone()), Some(vec![2]));
    }
}
