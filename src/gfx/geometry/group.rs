//! # Geometry Chunks
//!
//! A [`GeometryGroup`] is a slice of a geometry's faces that share one
//! material and fit under the 16-bit index ceiling. Besides the face lists it
//! owns the flat per-corner arrays built during buffer synchronization and
//! the GPU buffer handles they are uploaded to.

use super::DirtyFlags;
use crate::gfx::rendering::backend::{BufferHandle, GpuBufferBackend};

/// Flat per-corner attribute arrays for one chunk.
///
/// Corners are laid out triangles first, then quads, each in face order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupArrays {
    pub vertex: Vec<f32>,
    pub normal: Option<Vec<f32>>,
    pub tangent: Option<Vec<f32>>,
    pub color: Option<Vec<f32>>,
    pub uv: Option<Vec<f32>>,
    pub uv2: Option<Vec<f32>>,
    pub skin_index: Option<Vec<f32>>,
    pub skin_weight: Option<Vec<f32>>,
    pub face: Vec<u16>,
    pub line: Vec<u16>,
    pub morph_targets: Vec<Vec<f32>>,
    pub morph_normals: Vec<Vec<f32>>,
}

/// GPU buffer handles for one chunk.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupBuffers {
    pub vertex: BufferHandle,
    pub normal: BufferHandle,
    pub tangent: BufferHandle,
    pub color: BufferHandle,
    pub uv: BufferHandle,
    pub uv2: BufferHandle,
    pub skin_index: BufferHandle,
    pub skin_weight: BufferHandle,
    pub face: BufferHandle,
    pub line: BufferHandle,
    pub morph_targets: Vec<BufferHandle>,
    pub morph_normals: Vec<BufferHandle>,
}

impl GroupBuffers {
    /// Create every buffer a chunk may upload to.
    pub fn create(
        backend: &mut dyn GpuBufferBackend,
        num_morph_targets: usize,
        num_morph_normals: usize,
    ) -> Self {
        Self {
            vertex: backend.create_buffer("chunk vertex"),
            normal: backend.create_buffer("chunk normal"),
            tangent: backend.create_buffer("chunk tangent"),
            color: backend.create_buffer("chunk color"),
            uv: backend.create_buffer("chunk uv"),
            uv2: backend.create_buffer("chunk uv2"),
            skin_index: backend.create_buffer("chunk skin index"),
            skin_weight: backend.create_buffer("chunk skin weight"),
            face: backend.create_buffer("chunk face index"),
            line: backend.create_buffer("chunk line index"),
            morph_targets: (0..num_morph_targets)
                .map(|_| backend.create_buffer("chunk morph target"))
                .collect(),
            morph_normals: (0..num_morph_normals)
                .map(|_| backend.create_buffer("chunk morph normal"))
                .collect(),
        }
    }

    pub fn handles(&self) -> impl Iterator<Item = BufferHandle> + '_ {
        [
            self.vertex,
            self.normal,
            self.tangent,
            self.color,
            self.uv,
            self.uv2,
            self.skin_index,
            self.skin_weight,
            self.face,
            self.line,
        ]
        .into_iter()
        .chain(self.morph_targets.iter().copied())
        .chain(self.morph_normals.iter().copied())
    }

    pub fn delete(self, backend: &mut dyn GpuBufferBackend) {
        for handle in self.handles() {
            backend.delete_buffer(handle);
        }
    }
}

/// One renderable chunk of a geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryGroup {
    pub material_index: Option<usize>,
    /// Indices of triangle faces in the parent geometry.
    pub faces3: Vec<usize>,
    /// Indices of quad faces in the parent geometry.
    pub faces4: Vec<usize>,
    /// Running corner count, bounded by the chunk ceiling.
    pub vertices: usize,
    pub num_morph_targets: usize,
    pub num_morph_normals: usize,

    pub(crate) arrays: Option<GroupArrays>,
    pub(crate) buffers: Option<GroupBuffers>,
    pub(crate) pending: DirtyFlags,
}

impl GeometryGroup {
    pub fn new(material_index: Option<usize>, num_morph_targets: usize, num_morph_normals: usize) -> Self {
        Self {
            material_index,
            faces3: Vec::new(),
            faces4: Vec::new(),
            vertices: 0,
            num_morph_targets,
            num_morph_normals,
            arrays: None,
            buffers: None,
            pending: DirtyFlags::none(),
        }
    }

    /// Corners once every face is expanded.
    pub fn expanded_vertex_count(&self) -> usize {
        self.faces3.len() * 3 + self.faces4.len() * 4
    }

    /// Triangles after splitting quads.
    pub fn triangle_count(&self) -> usize {
        self.faces3.len() + self.faces4.len() * 2
    }

    /// Entries in the triangle index array.
    pub fn face_index_count(&self) -> usize {
        self.triangle_count() * 3
    }

    /// Entries in the wireframe index array.
    pub fn line_index_count(&self) -> usize {
        self.expanded_vertex_count() * 2
    }

    pub fn arrays(&self) -> Option<&GroupArrays> {
        self.arrays.as_ref()
    }

    pub fn buffers(&self) -> Option<&GroupBuffers> {
        self.buffers.as_ref()
    }

    /// Categories still waiting to be synchronized on this chunk.
    pub fn pending(&self) -> &DirtyFlags {
        &self.pending
    }

    pub fn is_array_initialized(&self) -> bool {
        self.arrays.is_some()
    }

    /// Drop the per-corner arrays. They must be rebuilt before the next pass.
    pub fn release_arrays(&mut self) {
        self.arrays = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::rendering::backend::HeadlessBackend;

    #[test]
    fn test_group_counts() {
        let mut group = GeometryGroup::new(Some(1), 0, 0);
        group.faces3.extend([0, 1]);
        group.faces4.push(2);

        assert_eq!(group.expanded_vertex_count(), 10);
        assert_eq!(group.triangle_count(), 4);
        assert_eq!(group.face_index_count(), 12);
        assert_eq!(group.line_index_count(), 20);
        assert!(!group.is_array_initialized());
    }

    #[test]
    fn test_buffers_create_and_delete() {
        let mut backend = HeadlessBackend::new();
        let buffers = GroupBuffers::create(&mut backend, 2, 1);
        assert_eq!(buffers.handles().count(), 13);
        assert_eq!(backend.live_buffers(), 13);

        buffers.delete(&mut backend);
        assert_eq!(backend.live_buffers(), 0);
    }
}
