//! # Polygon Mesh Geometry
//!
//! [`Geometry`] is the editable mesh: a flat vertex list, triangle and quad
//! faces that reference vertices by index, per-face UV layers, morph targets
//! and skinning data. Derived attributes (centroids, normals, tangents,
//! bounds) are computed on demand and cached on the faces.
//!
//! ## Pipeline
//!
//! Derived attributes have to be computed in dependency order:
//!
//! 1. [`Geometry::compute_centroids`] and [`Geometry::compute_face_normals`]
//! 2. [`Geometry::compute_vertex_normals`]
//! 3. [`Geometry::compute_tangents`] (needs UV layer 0)
//! 4. [`Geometry::partition`] splits faces into [`GeometryGroup`] chunks
//!
//! ## Usage
//!
//! ```rust
//! use facet3d::gfx::geometry::{Face, Geometry};
//! use facet3d::math::Vec3;
//!
//! let mut geometry = Geometry::new();
//! geometry.push_vertex(Vec3::new(0.0, 0.0, 0.0));
//! geometry.push_vertex(Vec3::new(1.0, 0.0, 0.0));
//! geometry.push_vertex(Vec3::new(1.0, 1.0, 0.0));
//! geometry.push_vertex(Vec3::new(0.0, 1.0, 0.0));
//! geometry.push_face(Face::quad(0, 1, 2, 3).with_material(0));
//!
//! geometry.compute_face_normals(false).unwrap();
//! geometry.compute_vertex_normals().unwrap();
//! geometry.partition();
//!
//! let groups = geometry.groups().unwrap();
//! assert_eq!(groups.len(), 1);
//! assert_eq!(groups[0].vertices, 4);
//! ```

pub mod bounds;
pub mod face;
pub mod group;
pub mod merge;
pub mod normals;
pub mod partition;
pub mod primitives;
pub mod tangents;

pub use bounds::{BoundingBox, BoundingSphere};
pub use face::{Face, FaceKind};
pub use group::{GeometryGroup, GroupArrays, GroupBuffers};
pub use partition::{partition_faces, ChunkKey};
pub use primitives::*;

use std::collections::HashMap;

use crate::error::{GeometryError, Result};
use crate::gfx::resources::Material;
use crate::math::{extract_rotation, transform_point, Color, Mat4, Vec2, Vec3, Vec4};

/// Largest vertex count a chunk may reach with 16-bit element indices.
pub const MAX_CHUNK_VERTICES: usize = 65535;

/// Tunables for welding and partitioning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeometryConfig {
    /// Decimal digits kept when welding vertices.
    pub merge_precision_points: i32,
    /// Vertex ceiling per chunk.
    pub max_chunk_vertices: usize,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            merge_precision_points: 4,
            max_chunk_vertices: MAX_CHUNK_VERTICES,
        }
    }
}

impl GeometryConfig {
    pub fn with_merge_precision_points(mut self, points: i32) -> Self {
        self.merge_precision_points = points;
        self
    }

    /// Set the chunk ceiling. Never below 4 so a single quad always fits,
    /// never above the 16-bit index limit.
    pub fn with_max_chunk_vertices(mut self, max: usize) -> Self {
        self.max_chunk_vertices = max.clamp(4, MAX_CHUNK_VERTICES);
        self
    }
}

/// One flag per attribute category whose GPU copy is stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirtyFlags {
    pub vertices: bool,
    pub elements: bool,
    pub uvs: bool,
    pub normals: bool,
    pub colors: bool,
    pub tangents: bool,
    pub morph_targets: bool,
}

impl Default for DirtyFlags {
    fn default() -> Self {
        Self::all()
    }
}

impl DirtyFlags {
    pub fn all() -> Self {
        Self {
            vertices: true,
            elements: true,
            uvs: true,
            normals: true,
            colors: true,
            tangents: true,
            morph_targets: true,
        }
    }

    pub fn none() -> Self {
        Self {
            vertices: false,
            elements: false,
            uvs: false,
            normals: false,
            colors: false,
            tangents: false,
            morph_targets: false,
        }
    }

    pub fn any(&self) -> bool {
        self.vertices
            || self.elements
            || self.uvs
            || self.normals
            || self.colors
            || self.tangents
            || self.morph_targets
    }

    /// Union with another set.
    pub fn merge(&mut self, other: DirtyFlags) {
        self.vertices |= other.vertices;
        self.elements |= other.elements;
        self.uvs |= other.uvs;
        self.normals |= other.normals;
        self.colors |= other.colors;
        self.tangents |= other.tangents;
        self.morph_targets |= other.morph_targets;
    }

    /// Categories set in both.
    pub fn intersection(&self, other: &DirtyFlags) -> DirtyFlags {
        DirtyFlags {
            vertices: self.vertices && other.vertices,
            elements: self.elements && other.elements,
            uvs: self.uvs && other.uvs,
            normals: self.normals && other.normals,
            colors: self.colors && other.colors,
            tangents: self.tangents && other.tangents,
            morph_targets: self.morph_targets && other.morph_targets,
        }
    }

    pub fn clear(&mut self) {
        *self = Self::none();
    }
}

/// Named alternate vertex positions for blend animation.
#[derive(Debug, Clone, PartialEq)]
pub struct MorphTarget {
    pub name: String,
    pub vertices: Vec<Vec3>,
}

/// Face and vertex normals computed for one morph target.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MorphNormals {
    pub face_normals: Vec<Vec3>,
    /// Up to four corner normals per face.
    pub vertex_normals: Vec<Vec<Vec3>>,
}

/// Per-vertex accumulator reused by vertex normal computation.
#[derive(Debug, Default)]
struct NormalScratch {
    version: u64,
    sums: Vec<Vec3>,
}

/// Editable polygon mesh.
#[derive(Debug)]
pub struct Geometry {
    vertices: Vec<Vec3>,
    faces: Vec<Face>,
    face_vertex_uvs: Vec<Vec<Vec<Vec2>>>,
    colors: Vec<Color>,
    materials: Vec<Material>,
    morph_targets: Vec<MorphTarget>,
    morph_normals: Vec<MorphNormals>,
    skin_weights: Vec<Vec4>,
    skin_indices: Vec<Vec4>,

    bounding_box: Option<BoundingBox>,
    bounding_sphere: Option<BoundingSphere>,
    has_tangents: bool,
    dynamic: bool,
    dirty: DirtyFlags,

    groups: Option<Vec<GeometryGroup>>,
    groups_cache: HashMap<ChunkKey, usize>,
    /// Buffers of chunks replaced by a later partition, awaiting deletion.
    retired_buffers: Vec<GroupBuffers>,

    config: GeometryConfig,
    structure_version: u64,
    normal_scratch: NormalScratch,
}

impl Default for Geometry {
    fn default() -> Self {
        Self::new()
    }
}

impl Geometry {
    pub fn new() -> Self {
        Self::with_config(GeometryConfig::default())
    }

    pub fn with_config(config: GeometryConfig) -> Self {
        Self {
            vertices: Vec::new(),
            faces: Vec::new(),
            face_vertex_uvs: vec![Vec::new()],
            colors: Vec::new(),
            materials: Vec::new(),
            morph_targets: Vec::new(),
            morph_normals: Vec::new(),
            skin_weights: Vec::new(),
            skin_indices: Vec::new(),
            bounding_box: None,
            bounding_sphere: None,
            has_tangents: false,
            dynamic: false,
            dirty: DirtyFlags::all(),
            groups: None,
            groups_cache: HashMap::new(),
            retired_buffers: Vec::new(),
            config,
            structure_version: 0,
            normal_scratch: NormalScratch::default(),
        }
    }

    pub fn config(&self) -> &GeometryConfig {
        &self.config
    }

    // Vertices

    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    /// Edit vertex positions in place. Marks vertices dirty.
    pub fn vertices_mut(&mut self) -> &mut [Vec3] {
        self.dirty.vertices = true;
        &mut self.vertices
    }

    /// Append a vertex and return its index.
    pub fn push_vertex(&mut self, v: Vec3) -> usize {
        self.vertices.push(v);
        self.structure_changed();
        self.vertices.len() - 1
    }

    /// Replace the whole vertex list.
    pub fn set_vertices(&mut self, vertices: Vec<Vec3>) {
        self.vertices = vertices;
        self.structure_changed();
    }

    /// Incremented whenever the vertex list changes length.
    pub fn structure_version(&self) -> u64 {
        self.structure_version
    }

    fn structure_changed(&mut self) {
        self.structure_version = self.structure_version.wrapping_add(1);
        self.dirty.vertices = true;
    }

    // Faces

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    /// Edit faces in place. Marks vertices, normals, colors and tangents
    /// dirty, since any per-corner attribute may change.
    ///
    /// Changing a face's arity or material index also needs a fresh
    /// [`partition`](Self::partition).
    pub fn faces_mut(&mut self) -> &mut [Face] {
        self.dirty.vertices = true;
        self.dirty.normals = true;
        self.dirty.colors = true;
        self.dirty.tangents = true;
        &mut self.faces
    }

    /// Append a face and return its index. Marks elements dirty.
    pub fn push_face(&mut self, face: Face) -> usize {
        self.faces.push(face);
        self.dirty.elements = true;
        self.faces.len() - 1
    }

    /// Append a face together with its layer-0 UVs.
    pub fn push_face_with_uvs(&mut self, face: Face, uvs: Vec<Vec2>) -> usize {
        self.face_vertex_uvs[0].push(uvs);
        self.dirty.uvs = true;
        self.push_face(face)
    }

    // UVs, colors, materials

    /// UV layers, each parallel to the face list.
    pub fn face_vertex_uvs(&self) -> &[Vec<Vec<Vec2>>] {
        &self.face_vertex_uvs
    }

    /// Mutable UV layers. Marks uvs dirty.
    pub fn face_vertex_uvs_mut(&mut self) -> &mut Vec<Vec<Vec<Vec2>>> {
        self.dirty.uvs = true;
        &mut self.face_vertex_uvs
    }

    /// Per-vertex colors, used by point and line renderables.
    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    pub fn colors_mut(&mut self) -> &mut Vec<Color> {
        self.dirty.colors = true;
        &mut self.colors
    }

    pub fn materials(&self) -> &[Material] {
        &self.materials
    }

    pub fn push_material(&mut self, material: Material) -> usize {
        self.materials.push(material);
        self.materials.len() - 1
    }

    // Morph and skin data

    pub fn morph_targets(&self) -> &[MorphTarget] {
        &self.morph_targets
    }

    /// Add a morph target. It must have one position per vertex.
    pub fn add_morph_target(&mut self, name: &str, vertices: Vec<Vec3>) -> Result<usize> {
        if vertices.len() != self.vertices.len() {
            return Err(GeometryError::MorphTargetLength {
                name: name.to_string(),
                expected: self.vertices.len(),
                actual: vertices.len(),
            });
        }

        self.morph_targets.push(MorphTarget {
            name: name.to_string(),
            vertices,
        });
        self.dirty.morph_targets = true;
        Ok(self.morph_targets.len() - 1)
    }

    pub fn morph_normals(&self) -> &[MorphNormals] {
        &self.morph_normals
    }

    pub fn skin_weights(&self) -> &[Vec4] {
        &self.skin_weights
    }

    pub fn skin_indices(&self) -> &[Vec4] {
        &self.skin_indices
    }

    pub fn has_skinning(&self) -> bool {
        !self.skin_weights.is_empty() && !self.skin_indices.is_empty()
    }

    /// Set per-vertex bone weights and indices.
    pub fn set_skinning(&mut self, weights: Vec<Vec4>, indices: Vec<Vec4>) -> Result<()> {
        let expected = self.vertices.len();
        if weights.len() != expected || indices.len() != expected {
            return Err(GeometryError::SkinDataLength {
                expected,
                weights: weights.len(),
                indices: indices.len(),
            });
        }

        self.skin_weights = weights;
        self.skin_indices = indices;
        Ok(())
    }

    // Flags and cached state

    pub fn bounding_box(&self) -> Option<&BoundingBox> {
        self.bounding_box.as_ref()
    }

    pub fn bounding_sphere(&self) -> Option<&BoundingSphere> {
        self.bounding_sphere.as_ref()
    }

    pub fn has_tangents(&self) -> bool {
        self.has_tangents
    }

    /// Dynamic geometry keeps its chunk arrays between synchronization passes.
    pub fn is_dynamic(&self) -> bool {
        self.dynamic
    }

    pub fn set_dynamic(&mut self, dynamic: bool) {
        self.dynamic = dynamic;
    }

    pub fn dirty(&self) -> &DirtyFlags {
        &self.dirty
    }

    pub fn dirty_mut(&mut self) -> &mut DirtyFlags {
        &mut self.dirty
    }

    /// Chunks, once [`partition`](Self::partition) has run.
    pub fn groups(&self) -> Option<&[GeometryGroup]> {
        self.groups.as_deref()
    }

    pub(crate) fn groups_mut(&mut self) -> Option<&mut Vec<GeometryGroup>> {
        self.groups.as_mut()
    }

    pub(crate) fn take_groups(&mut self) -> Option<Vec<GeometryGroup>> {
        self.groups.take()
    }

    pub(crate) fn restore_groups(&mut self, groups: Vec<GeometryGroup>) {
        self.groups = Some(groups);
    }

    /// Buffer sets still owned by chunks that re-partitioning replaced.
    pub fn retired_buffers(&self) -> &[GroupBuffers] {
        &self.retired_buffers
    }

    pub(crate) fn take_retired_buffers(&mut self) -> Vec<GroupBuffers> {
        std::mem::take(&mut self.retired_buffers)
    }

    /// Chunk lookup by key, valid after partitioning.
    pub fn group_by_key(&self, key: &ChunkKey) -> Option<&GeometryGroup> {
        let index = *self.groups_cache.get(key)?;
        self.groups.as_ref()?.get(index)
    }

    // Contract checks

    /// Check every face index, UV layer, morph target and skin array.
    pub fn validate(&self) -> Result<()> {
        self.check_face_indices()?;

        for layer in 0..self.face_vertex_uvs.len() {
            self.check_uv_layer(layer)?;
        }

        self.check_morph_targets()?;
        self.check_skin_data()?;
        Ok(())
    }

    /// Every morph target needs one position per vertex.
    pub(crate) fn check_morph_targets(&self) -> Result<()> {
        for target in &self.morph_targets {
            if target.vertices.len() != self.vertices.len() {
                return Err(GeometryError::MorphTargetLength {
                    name: target.name.clone(),
                    expected: self.vertices.len(),
                    actual: target.vertices.len(),
                });
            }
        }
        Ok(())
    }

    /// Skin arrays are either both empty or one entry per vertex.
    pub(crate) fn check_skin_data(&self) -> Result<()> {
        let expected = self.vertices.len();
        let (weights, indices) = (self.skin_weights.len(), self.skin_indices.len());
        if (weights > 0 || indices > 0) && (weights != expected || indices != expected) {
            return Err(GeometryError::SkinDataLength {
                expected,
                weights,
                indices,
            });
        }
        Ok(())
    }

    pub(crate) fn check_face_indices(&self) -> Result<()> {
        let vertex_count = self.vertices.len();
        for (face_index, face) in self.faces.iter().enumerate() {
            if let Some(&index) = face.corners().iter().find(|&&i| i >= vertex_count) {
                return Err(GeometryError::FaceIndexOutOfBounds {
                    face: face_index,
                    index,
                    vertex_count,
                });
            }
        }
        Ok(())
    }

    /// An empty layer is allowed. Otherwise it needs one UV list per face,
    /// each with one coordinate per corner.
    pub(crate) fn check_uv_layer(&self, layer: usize) -> Result<()> {
        let Some(uvs) = self.face_vertex_uvs.get(layer) else {
            return Ok(());
        };
        if uvs.is_empty() {
            return Ok(());
        }

        if uvs.len() != self.faces.len() {
            return Err(GeometryError::UvLayerLength {
                layer,
                faces: self.faces.len(),
                uvs: uvs.len(),
            });
        }

        for (face_index, (face, corners)) in self.faces.iter().zip(uvs).enumerate() {
            if corners.len() != face.arity() {
                return Err(GeometryError::UvCornerCount {
                    layer,
                    face: face_index,
                    expected: face.arity(),
                    actual: corners.len(),
                });
            }
        }
        Ok(())
    }

    // Transform

    /// Bake a transform into the vertex positions.
    ///
    /// Normals get the rotation part only. Centroids get the full matrix.
    pub fn apply_matrix(&mut self, matrix: &Mat4) {
        let rotation = extract_rotation(matrix);

        for v in &mut self.vertices {
            *v = transform_point(matrix, *v);
        }

        for face in &mut self.faces {
            face.normal = transform_point(&rotation, face.normal);
            for n in &mut face.vertex_normals {
                *n = transform_point(&rotation, *n);
            }
            face.centroid = transform_point(matrix, face.centroid);
        }

        self.dirty.vertices = true;
        self.dirty.normals = true;
    }
}

/// Copies vertices, faces, UV layer 0 and materials. Derived caches,
/// morph and skin data and chunks are not carried over.
impl Clone for Geometry {
    fn clone(&self) -> Self {
        let mut copy = Geometry::with_config(self.config);
        copy.vertices = self.vertices.clone();
        copy.faces = self.faces.clone();
        copy.face_vertex_uvs = vec![self.face_vertex_uvs.first().cloned().unwrap_or_default()];
        copy.materials = self.materials.clone();
        copy
    }
}
