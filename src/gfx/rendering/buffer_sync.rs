//! # Buffer Synchronization
//!
//! Expands a chunk's faces into flat per-corner arrays and uploads the
//! categories that are both pending on the chunk and relevant to its
//! material. Corners are emitted triangles first, then quads, each in face
//! order, so attribute `i` of every array belongs to the same corner.
//!
//! A category the material does not use (colors without a vertex-color mode,
//! normals on an unlit material) stays pending on the chunk until a material
//! that needs it is synchronized.

use crate::error::{GeometryError, Result};
use crate::gfx::geometry::{DirtyFlags, Face, Geometry, GeometryGroup, GroupArrays, GroupBuffers};
use crate::gfx::resources::{Material, Shading, VertexColors};
use crate::math::{Vec2, Vec3, Vec4};

use super::backend::{BufferHandle, BufferTarget, BufferUsage, GpuBufferBackend};

/// Totals of one or more synchronization passes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Chunks that ran a pass.
    pub chunks: usize,
    /// Upload calls issued.
    pub uploads: usize,
    /// Bytes handed to the backend.
    pub bytes: usize,
    /// Chunks whose arrays were released afterwards.
    pub released: usize,
}

impl SyncReport {
    pub fn merge(&mut self, other: &SyncReport) {
        self.chunks += other.chunks;
        self.uploads += other.uploads;
        self.bytes += other.bytes;
        self.released += other.released;
    }
}

/// Result of [`sync_group`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    Synced(SyncReport),
    /// The chunk has no arrays or no buffers; run [`init_group_arrays`] first.
    NotInitialized,
}

/// Categories `material` and `geometry` give a meaning to on this chunk.
pub fn relevant_categories(group: &GeometryGroup, geometry: &Geometry, material: &Material) -> DirtyFlags {
    DirtyFlags {
        vertices: true,
        elements: true,
        uvs: material.uv_type() && has_uv_layer(geometry, 0),
        normals: material.normal_type().is_some(),
        colors: material.vertex_color_type().is_some(),
        tangents: geometry.has_tangents(),
        morph_targets: group.num_morph_targets > 0,
    }
}

fn has_uv_layer(geometry: &Geometry, layer: usize) -> bool {
    geometry
        .face_vertex_uvs()
        .get(layer)
        .is_some_and(|uvs| !uvs.is_empty())
}

/// Allocate the per-corner arrays of `group`, sized to its expanded vertex count.
pub fn init_group_arrays(group: &mut GeometryGroup, geometry: &Geometry, material: &Material) {
    let corners = group.expanded_vertex_count();
    let float_array = |per_corner: usize| vec![0.0f32; corners * per_corner];
    let uv_type = material.uv_type();

    let arrays = GroupArrays {
        vertex: float_array(3),
        normal: material.normal_type().map(|_| float_array(3)),
        tangent: geometry.has_tangents().then(|| float_array(4)),
        color: material.vertex_color_type().map(|_| float_array(3)),
        uv: (uv_type && has_uv_layer(geometry, 0)).then(|| float_array(2)),
        uv2: (uv_type && has_uv_layer(geometry, 1)).then(|| float_array(2)),
        skin_index: geometry.has_skinning().then(|| float_array(4)),
        skin_weight: geometry.has_skinning().then(|| float_array(4)),
        face: vec![0u16; group.face_index_count()],
        line: vec![0u16; group.line_index_count()],
        morph_targets: (0..group.num_morph_targets).map(|_| float_array(3)).collect(),
        morph_normals: (0..group.num_morph_normals).map(|_| float_array(3)).collect(),
    };

    log::debug!(
        "Initialized arrays for chunk (material {:?}, {} corners)",
        group.material_index,
        corners
    );
    group.arrays = Some(arrays);
}

/// Face lists of a chunk, borrowed apart from its arrays.
#[derive(Clone, Copy)]
struct ChunkOrder<'a> {
    faces3: &'a [usize],
    faces4: &'a [usize],
}

impl<'a> ChunkOrder<'a> {
    fn of(group: &'a GeometryGroup) -> Self {
        Self {
            faces3: &group.faces3,
            faces4: &group.faces4,
        }
    }

    /// Face indices in upload order.
    fn indices(self) -> impl Iterator<Item = usize> + 'a {
        self.faces3.iter().chain(self.faces4.iter()).copied()
    }

    /// Faces in upload order, with their index in the geometry.
    fn faces(self, faces: &'a [Face]) -> impl Iterator<Item = (usize, &'a Face)> + 'a {
        self.indices().map(move |f| (f, &faces[f]))
    }
}

fn check_chunk(group: &GeometryGroup, geometry: &Geometry) -> Result<()> {
    let face_count = geometry.faces().len();
    let vertex_count = geometry.vertices().len();

    for f in ChunkOrder::of(group).indices() {
        // A chunk pointing past the face list means faces were removed after partitioning.
        let face = geometry.faces().get(f).ok_or(GeometryError::FaceIndexOutOfBounds {
            face: f,
            index: f,
            vertex_count: face_count,
        })?;
        if let Some(&index) = face.corners().iter().find(|&&i| i >= vertex_count) {
            return Err(GeometryError::FaceIndexOutOfBounds {
                face: f,
                index,
                vertex_count,
            });
        }
    }
    Ok(())
}

fn push_vec3(out: &mut Vec<f32>, v: Vec3) {
    out.extend_from_slice(&[v.x as f32, v.y as f32, v.z as f32]);
}

fn push_vec4(out: &mut Vec<f32>, v: Vec4) {
    out.extend_from_slice(&[v.x as f32, v.y as f32, v.z as f32, v.w as f32]);
}

struct Uploader<'a> {
    backend: &'a mut dyn GpuBufferBackend,
    usage: BufferUsage,
    report: SyncReport,
}

impl Uploader<'_> {
    fn floats(&mut self, handle: BufferHandle, data: &[f32]) {
        self.backend
            .upload(handle, BufferTarget::Array, bytemuck::cast_slice(data), self.usage);
        self.report.uploads += 1;
        self.report.bytes += std::mem::size_of_val(data);
    }

    fn indices(&mut self, handle: BufferHandle, data: &[u16]) {
        self.backend
            .upload(handle, BufferTarget::ElementArray, bytemuck::cast_slice(data), self.usage);
        self.report.uploads += 1;
        self.report.bytes += std::mem::size_of_val(data);
    }
}

/// Run one synchronization pass over `group`.
///
/// Pending categories that were uploaded are cleared on the chunk. For
/// static geometry the arrays are released afterwards.
pub fn sync_group(
    group: &mut GeometryGroup,
    geometry: &Geometry,
    material: &Material,
    backend: &mut dyn GpuBufferBackend,
    usage: BufferUsage,
) -> Result<SyncOutcome> {
    if group.arrays.is_none() || group.buffers.is_none() {
        return Ok(SyncOutcome::NotInitialized);
    }
    check_chunk(group, geometry)?;
    if geometry.has_skinning() {
        geometry.check_skin_data()?;
    }

    let todo = group
        .pending
        .intersection(&relevant_categories(group, geometry, material));
    let corners = group.expanded_vertex_count();

    let mut up = Uploader {
        backend,
        usage,
        report: SyncReport {
            chunks: 1,
            ..Default::default()
        },
    };

    let order = ChunkOrder {
        faces3: &group.faces3,
        faces4: &group.faces4,
    };
    let (Some(arrays), Some(buffers)) = (group.arrays.as_mut(), group.buffers.as_ref()) else {
        return Ok(SyncOutcome::NotInitialized);
    };
    let faces = geometry.faces();
    let vertices = geometry.vertices();

    if todo.vertices {
        arrays.vertex.clear();
        for (_, face) in order.faces(faces) {
            for &i in face.corners() {
                push_vec3(&mut arrays.vertex, vertices[i]);
            }
        }
        up.floats(buffers.vertex, &arrays.vertex);
    }

    if todo.morph_targets {
        sync_morph_targets(order, arrays, buffers, geometry, material, &mut up)?;
    }

    if geometry.has_skinning() {
        let weights = geometry.skin_weights();
        let indices = geometry.skin_indices();
        let skin_weight = arrays.skin_weight.get_or_insert_with(Vec::new);
        let skin_index = arrays.skin_index.get_or_insert_with(Vec::new);
        skin_weight.clear();
        skin_index.clear();
        for (_, face) in order.faces(faces) {
            for &i in face.corners() {
                push_vec4(skin_weight, weights[i]);
                push_vec4(skin_index, indices[i]);
            }
        }
        up.floats(buffers.skin_index, skin_index);
        up.floats(buffers.skin_weight, skin_weight);
    }

    if todo.colors {
        let per_vertex = material.vertex_color_type() == Some(VertexColors::Vertex);
        let colors = arrays.color.get_or_insert_with(Vec::new);
        colors.clear();
        for (_, face) in order.faces(faces) {
            let arity = face.arity();
            let use_vertex = per_vertex && face.vertex_colors.len() == arity;
            for corner in 0..arity {
                let c = if use_vertex {
                    &face.vertex_colors[corner]
                } else {
                    &face.color
                };
                colors.extend_from_slice(&c.to_array());
            }
        }
        if !colors.is_empty() {
            up.floats(buffers.color, colors);
        }
    }

    if todo.tangents {
        let tangents = arrays.tangent.get_or_insert_with(Vec::new);
        tangents.clear();
        for (f, face) in order.faces(faces) {
            if face.vertex_tangents.len() != face.arity() {
                return Err(GeometryError::MissingTangents { face: f });
            }
            for &t in &face.vertex_tangents {
                push_vec4(tangents, t);
            }
        }
        up.floats(buffers.tangent, tangents);
    }

    if todo.normals {
        let smooth = material.normal_type() == Some(Shading::Smooth);
        let normals = arrays.normal.get_or_insert_with(Vec::new);
        normals.clear();
        for (_, face) in order.faces(faces) {
            let arity = face.arity();
            if smooth && face.vertex_normals.len() == arity {
                for &n in &face.vertex_normals {
                    push_vec3(normals, n);
                }
            } else {
                for _ in 0..arity {
                    push_vec3(normals, face.normal);
                }
            }
        }
        up.floats(buffers.normal, normals);
    }

    if todo.uvs {
        geometry.check_uv_layer(0)?;
        let layer = &geometry.face_vertex_uvs()[0];
        let uvs = arrays.uv.get_or_insert_with(Vec::new);
        fill_uvs(uvs, order, layer);
        if !uvs.is_empty() {
            up.floats(buffers.uv, uvs);
        }

        if has_uv_layer(geometry, 1) {
            geometry.check_uv_layer(1)?;
            let layer = &geometry.face_vertex_uvs()[1];
            let uv2 = arrays.uv2.get_or_insert_with(Vec::new);
            fill_uvs(uv2, order, layer);
            if !uv2.is_empty() {
                up.floats(buffers.uv2, uv2);
            }
        }
    }

    if todo.elements {
        fill_indices(arrays, order);
        up.indices(buffers.face, &arrays.face);
        up.indices(buffers.line, &arrays.line);
    }

    debug_assert_eq!(arrays.vertex.len(), corners * 3);

    let mut report = up.report;
    group.pending = DirtyFlags {
        vertices: group.pending.vertices && !todo.vertices,
        elements: group.pending.elements && !todo.elements,
        uvs: group.pending.uvs && !todo.uvs,
        normals: group.pending.normals && !todo.normals,
        colors: group.pending.colors && !todo.colors,
        tangents: group.pending.tangents && !todo.tangents,
        morph_targets: group.pending.morph_targets && !todo.morph_targets,
    };

    if !geometry.is_dynamic() {
        group.release_arrays();
        report.released = 1;
    }

    log::debug!(
        "Synced chunk (material {:?}): {} uploads, {} bytes",
        group.material_index,
        report.uploads,
        report.bytes
    );
    Ok(SyncOutcome::Synced(report))
}

fn sync_morph_targets(
    order: ChunkOrder<'_>,
    arrays: &mut GroupArrays,
    buffers: &GroupBuffers,
    geometry: &Geometry,
    material: &Material,
    up: &mut Uploader<'_>,
) -> Result<()> {
    let faces = geometry.faces();
    let with_normals = material.needs_morph_normals();
    let smooth = material.normal_type() == Some(Shading::Smooth);

    for (t, target) in geometry
        .morph_targets()
        .iter()
        .enumerate()
        .take(arrays.morph_targets.len())
    {
        let positions = &mut arrays.morph_targets[t];
        positions.clear();
        for (_, face) in order.faces(faces) {
            for &i in face.corners() {
                let v = target.vertices.get(i).ok_or(GeometryError::MorphTargetLength {
                    name: target.name.clone(),
                    expected: geometry.vertices().len(),
                    actual: target.vertices.len(),
                })?;
                push_vec3(positions, *v);
            }
        }
        up.floats(buffers.morph_targets[t], positions);

        if !with_normals {
            continue;
        }

        let missing = GeometryError::MissingMorphNormals { target: t };
        let morph = geometry.morph_normals().get(t).ok_or(missing.clone())?;
        let out = arrays.morph_normals.get_mut(t).ok_or(missing.clone())?;
        let handle = *buffers.morph_normals.get(t).ok_or(missing.clone())?;

        out.clear();
        for (f, face) in order.faces(faces) {
            let arity = face.arity();
            if smooth {
                let corner_normals = morph
                    .vertex_normals
                    .get(f)
                    .filter(|n| n.len() >= arity)
                    .ok_or(missing.clone())?;
                for &n in &corner_normals[..arity] {
                    push_vec3(out, n);
                }
            } else {
                let n = *morph.face_normals.get(f).ok_or(missing.clone())?;
                for _ in 0..arity {
                    push_vec3(out, n);
                }
            }
        }
        up.floats(handle, out);
    }
    Ok(())
}

fn fill_uvs(out: &mut Vec<f32>, order: ChunkOrder<'_>, layer: &[Vec<Vec2>]) {
    out.clear();
    for f in order.indices() {
        for uv in &layer[f] {
            out.extend_from_slice(&[uv.x as f32, uv.y as f32]);
        }
    }
}

/// Triangle and wireframe indices over the expanded corners.
///
/// Quads split into `(0,1,3)(1,2,3)`. Wireframe edges are `(0,1)(0,2)(1,2)`
/// for triangles and `(0,1)(0,3)(1,2)(2,3)` for quads.
fn fill_indices(arrays: &mut GroupArrays, order: ChunkOrder<'_>) {
    let face = &mut arrays.face;
    let line = &mut arrays.line;
    face.clear();
    line.clear();

    let mut v: u16 = 0;
    for _ in order.faces3 {
        face.extend_from_slice(&[v, v + 1, v + 2]);
        line.extend_from_slice(&[v, v + 1, v, v + 2, v + 1, v + 2]);
        v = v.wrapping_add(3);
    }
    for _ in order.faces4 {
        face.extend_from_slice(&[v, v + 1, v + 3, v + 1, v + 2, v + 3]);
        line.extend_from_slice(&[v, v + 1, v, v + 3, v + 1, v + 2, v + 2, v + 3]);
        v = v.wrapping_add(4);
    }
}
