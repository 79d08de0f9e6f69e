//! # Render Statistics
//!
//! Counters the mesh pipeline bumps as it works: draw calls, vertices and
//! faces submitted this frame, and geometry chunks currently resident on
//! the GPU.
//!
//! ## Usage
//!
//! ```rust
//! use facet3d::performance::RenderInfo;
//!
//! let mut info = RenderInfo::default();
//!
//! // In your main loop
//! info.reset_render();
//! // ... render meshes ...
//! println!("{}", info.summary());
//! ```

/// Per-frame draw counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Number of draw calls issued
    pub calls: u64,
    /// Number of vertices submitted
    pub vertices: u64,
    /// Number of triangles submitted
    pub faces: u64,
}

/// Long-lived resource counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryStats {
    /// Chunks with live GPU buffers
    pub geometries: u64,
}

/// Render statistics shared by every mesh drawn through one renderer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderInfo {
    pub render: RenderStats,
    pub memory: MemoryStats,
}

impl RenderInfo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear the per-frame counters. Memory counters are kept.
    pub fn reset_render(&mut self) {
        self.render = RenderStats::default();
    }

    /// Record one indexed draw of `index_count` indices.
    pub fn record_draw(&mut self, index_count: usize) {
        self.render.calls += 1;
        self.render.vertices += index_count as u64;
        self.render.faces += (index_count / 3) as u64;
    }

    pub fn summary(&self) -> String {
        format!(
            "calls: {}, vertices: {}, faces: {}, geometries: {}",
            self.render.calls, self.render.vertices, self.render.faces, self.memory.geometries
        )
    }
}
