//! # Faces
//!
//! A face is a triangle or a quad referencing vertices by index into the
//! owning [`Geometry`](super::Geometry). Per-corner data (vertex normals,
//! tangents, colors) is stored in corner order alongside the indices.

use crate::math::{Color, Vec3, Vec4};
use cgmath::Zero;

/// Corner indices of a face.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaceKind {
    Triangle([usize; 3]),
    Quad([usize; 4]),
}

impl FaceKind {
    pub fn corners(&self) -> &[usize] {
        match self {
            FaceKind::Triangle(c) => c,
            FaceKind::Quad(c) => c,
        }
    }

    pub fn corners_mut(&mut self) -> &mut [usize] {
        match self {
            FaceKind::Triangle(c) => c,
            FaceKind::Quad(c) => c,
        }
    }
}

/// A polygonal face with its shading attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct Face {
    pub kind: FaceKind,
    pub normal: Vec3,
    /// One normal per corner once vertex normals are computed.
    pub vertex_normals: Vec<Vec3>,
    /// One tangent per corner; `w` is the handedness sign.
    pub vertex_tangents: Vec<Vec4>,
    pub color: Color,
    pub vertex_colors: Vec<Color>,
    pub material_index: Option<usize>,
    pub centroid: Vec3,
    pub(crate) original_normal: Vec3,
    pub(crate) original_vertex_normals: Vec<Vec3>,
}

impl Face {
    fn with_kind(kind: FaceKind) -> Self {
        Self {
            kind,
            normal: Vec3::zero(),
            vertex_normals: Vec::new(),
            vertex_tangents: Vec::new(),
            color: Color::default(),
            vertex_colors: Vec::new(),
            material_index: None,
            centroid: Vec3::zero(),
            original_normal: Vec3::zero(),
            original_vertex_normals: Vec::new(),
        }
    }

    pub fn triangle(a: usize, b: usize, c: usize) -> Self {
        Self::with_kind(FaceKind::Triangle([a, b, c]))
    }

    pub fn quad(a: usize, b: usize, c: usize, d: usize) -> Self {
        Self::with_kind(FaceKind::Quad([a, b, c, d]))
    }

    pub fn with_material(mut self, material_index: usize) -> Self {
        self.material_index = Some(material_index);
        self
    }

    pub fn with_normal(mut self, normal: Vec3) -> Self {
        self.normal = normal;
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_vertex_normals(mut self, normals: Vec<Vec3>) -> Self {
        self.vertex_normals = normals;
        self
    }

    pub fn with_vertex_colors(mut self, colors: Vec<Color>) -> Self {
        self.vertex_colors = colors;
        self
    }

    pub fn corners(&self) -> &[usize] {
        self.kind.corners()
    }

    /// Number of corners: 3 or 4.
    pub fn arity(&self) -> usize {
        self.corners().len()
    }

    pub fn is_quad(&self) -> bool {
        matches!(self.kind, FaceKind::Quad(_))
    }

    /// First three corners, used for the face plane.
    pub(crate) fn abc(&self) -> [usize; 3] {
        match self.kind {
            FaceKind::Triangle(c) => c,
            FaceKind::Quad([a, b, c, _]) => [a, b, c],
        }
    }
}
