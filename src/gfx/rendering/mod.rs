// src/gfx/rendering/mod.rs
//! Core rendering functionality
//!
//! The GPU buffer boundary, per-chunk buffer synchronization and the draw
//! commands a mesh hands to the caller.

pub mod backend;
pub mod buffer_sync;
pub mod draw;

// Re-export main types
pub use backend::{BufferHandle, BufferTarget, BufferUsage, GpuBufferBackend, HeadlessBackend, HeadlessBuffer};
pub use buffer_sync::{init_group_arrays, relevant_categories, sync_group, SyncOutcome, SyncReport};
pub use draw::{DrawCommand, DrawMode};
