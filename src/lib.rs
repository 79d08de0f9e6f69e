// src/lib.rs
//! facet3d
//!
//! Geometry processing and GPU buffer partitioning for polygon meshes:
//! derived normals and tangents, vertex welding, material chunking under a
//! 16-bit index ceiling and dirty-tracked buffer synchronization, with a
//! wgpu backend.

pub mod error;
pub mod gfx;
pub mod math;
pub mod performance;
pub mod prelude;
pub mod wgpu_utils;

// Re-export main types for convenience
pub use error::{GeometryError, Result};
