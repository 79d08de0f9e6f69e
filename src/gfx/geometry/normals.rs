//! Centroids, face normals, vertex normals and morph normals.

use cgmath::{InnerSpace, Zero};

use super::{Face, Geometry, MorphNormals};
use crate::error::Result;
use crate::math::{normalize_or_zero, Vec3};

impl Geometry {
    /// Set each face centroid to the mean of its corners.
    pub fn compute_centroids(&mut self) -> Result<()> {
        self.check_face_indices()?;

        for face in &mut self.faces {
            let sum = face
                .corners()
                .iter()
                .fold(Vec3::zero(), |acc, &i| acc + self.vertices[i]);
            face.centroid = sum / face.arity() as f64;
        }
        Ok(())
    }

    /// Compute one normal per face from its first three corners.
    ///
    /// With `use_vertex_normals`, faces that already carry vertex normals
    /// average those instead. Degenerate faces get the zero vector.
    pub fn compute_face_normals(&mut self, use_vertex_normals: bool) -> Result<()> {
        self.check_face_indices()?;
        face_normals_into(&self.vertices, &mut self.faces, use_vertex_normals);
        self.dirty.normals = true;
        Ok(())
    }

    /// Average face normals into per-corner vertex normals.
    ///
    /// Face normals must be computed first. The per-vertex accumulator is
    /// kept on the geometry and reused while the vertex count is unchanged.
    pub fn compute_vertex_normals(&mut self) -> Result<()> {
        self.check_face_indices()?;

        let scratch = &mut self.normal_scratch;
        if scratch.version != self.structure_version || scratch.sums.len() != self.vertices.len() {
            scratch.sums = vec![Vec3::zero(); self.vertices.len()];
            scratch.version = self.structure_version;
        }

        vertex_normals_into(&mut scratch.sums, &mut self.faces);
        self.dirty.normals = true;
        Ok(())
    }

    /// Compute face and vertex normals for every morph target.
    ///
    /// The live normals are restored afterwards. Caches grow on demand and
    /// are reused by later calls.
    pub fn compute_morph_normals(&mut self) -> Result<()> {
        self.check_face_indices()?;
        self.check_morph_targets()?;
        let face_count = self.faces.len();

        for face in &mut self.faces {
            face.original_normal = face.normal;
            copy_grow(&mut face.original_vertex_normals, &face.vertex_normals);
        }

        let mut sums = vec![Vec3::zero(); self.vertices.len()];

        for (j, target) in self.morph_targets.iter().enumerate() {
            if self.morph_normals.len() <= j {
                self.morph_normals.push(MorphNormals::default());
            }

            face_normals_into(&target.vertices, &mut self.faces, false);
            vertex_normals_into(&mut sums, &mut self.faces);

            let cache = &mut self.morph_normals[j];
            cache.face_normals.resize(face_count, Vec3::zero());
            cache.vertex_normals.resize_with(face_count, Vec::new);

            for (f, face) in self.faces.iter().enumerate() {
                cache.face_normals[f] = face.normal;
                copy_grow(&mut cache.vertex_normals[f], &face.vertex_normals);
            }
        }

        for face in &mut self.faces {
            face.normal = face.original_normal;
            face.vertex_normals.clone_from(&face.original_vertex_normals);
        }

        log::debug!(
            "Computed morph normals for {} targets over {} faces",
            self.morph_targets.len(),
            face_count
        );
        Ok(())
    }
}

/// Overwrite `dst` with `src`, growing it only when it is too short.
fn copy_grow(dst: &mut Vec<Vec3>, src: &[Vec3]) {
    if dst.len() < src.len() {
        dst.resize(src.len(), Vec3::zero());
    }
    dst[..src.len()].copy_from_slice(src);
    dst.truncate(src.len());
}

pub(crate) fn face_normals_into(vertices: &[Vec3], faces: &mut [Face], use_vertex_normals: bool) {
    for face in faces {
        if use_vertex_normals && !face.vertex_normals.is_empty() {
            let sum = face
                .vertex_normals
                .iter()
                .fold(Vec3::zero(), |acc, n| acc + *n);
            face.normal = normalize_or_zero(sum / 3.0);
        } else {
            let [a, b, c] = face.abc();
            let cb = vertices[c] - vertices[b];
            let ab = vertices[a] - vertices[b];
            face.normal = normalize_or_zero(cb.cross(ab));
        }
    }
}

/// `sums` must have one slot per vertex.
pub(crate) fn vertex_normals_into(sums: &mut [Vec3], faces: &mut [Face]) {
    sums.iter_mut().for_each(|s| *s = Vec3::zero());

    for face in faces.iter() {
        for &i in face.corners() {
            sums[i] += face.normal;
        }
    }

    for s in sums.iter_mut() {
        *s = normalize_or_zero(*s);
    }

    for face in faces.iter_mut() {
        let Face {
            kind,
            vertex_normals,
            ..
        } = face;
        vertex_normals.clear();
        vertex_normals.extend(kind.corners().iter().map(|&i| sums[i]));
    }
}
