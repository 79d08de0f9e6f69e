//! # facet3d Prelude
//!
//! This module provides a convenient way to import commonly used types.
//!
//! ## Usage
//!
//! ```rust
//! use facet3d::prelude::*;
//!
//! let geometry = generate_torus_knot(10.0, 3.0, 32, 6, 2, 3, 1.0).unwrap();
//! let mut mesh = Mesh::new(geometry, MeshMaterial::Single(Material::default()));
//!
//! let mut backend = HeadlessBackend::new();
//! let mut info = RenderInfo::new();
//! mesh.init_buffers(&mut backend, &mut info).unwrap();
//! mesh.set_buffers(&mut backend).unwrap();
//! ```

// Errors
pub use crate::error::GeometryError;

// Math types
pub use crate::math::{Color, EulerOrder, Mat4, Quaternion, Vec2, Vec3, Vec4};

// Geometry
pub use crate::gfx::geometry::{
    generate_cube, generate_plane, generate_sphere, generate_torus_knot, DirtyFlags, Face, FaceKind, Geometry,
    GeometryConfig, GeometryGroup,
};

// Materials, buffers and meshes
pub use crate::gfx::rendering::{
    BufferHandle, BufferTarget, BufferUsage, DrawCommand, DrawMode, GpuBufferBackend, HeadlessBackend, SyncReport,
};
pub use crate::gfx::resources::{Material, MaterialCapabilities, Shading, VertexColors};
pub use crate::gfx::scene::{Mesh, MeshMaterial};

// Statistics
pub use crate::performance::RenderInfo;

pub use crate::wgpu_utils::WgpuBufferBackend;
