//! # Graphics Module
//!
//! The mesh side of facet3d: editable geometry, materials, the GPU buffer
//! boundary and the mesh object that ties them together.
//!
//! ## Architecture Overview
//!
//! - **Geometry** ([`geometry`]) - Vertices, faces, derived attributes and chunk partitioning
//! - **Resources** ([`resources`]) - Materials and their capability flags
//! - **Rendering** ([`rendering`]) - Buffer backends, per-chunk synchronization, draw commands
//! - **Scene** ([`scene`]) - [`Mesh`](scene::Mesh) objects driving the buffer lifecycle

pub mod geometry;
pub mod rendering;
pub mod resources;
pub mod scene;

// Re-export commonly used types
pub use geometry::{Face, Geometry, GeometryConfig};
pub use rendering::{GpuBufferBackend, HeadlessBackend};
pub use resources::Material;
pub use scene::{Mesh, MeshMaterial};
