// src/wgpu_utils/mod.rs
//! WGPU utility functions and helpers
//!
//! Binds the geometry core's buffer boundary to a real wgpu device.

pub mod geometry_buffer;

// Re-export main types
pub use geometry_buffer::{buffer_usages, WgpuBufferBackend};
