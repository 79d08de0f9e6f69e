//! Draw commands produced for mesh chunks.

use super::backend::BufferHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawMode {
    Triangles,
    Lines,
}

/// Indexed draw of one chunk. Indices are always `u16`.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCommand {
    pub mode: DrawMode,
    pub index_buffer: BufferHandle,
    pub index_count: usize,
    pub index_format: wgpu::IndexFormat,
}

impl DrawCommand {
    pub fn triangles(index_buffer: BufferHandle, index_count: usize) -> Self {
        Self {
            mode: DrawMode::Triangles,
            index_buffer,
            index_count,
            index_format: wgpu::IndexFormat::Uint16,
        }
    }

    pub fn lines(index_buffer: BufferHandle, index_count: usize) -> Self {
        Self {
            mode: DrawMode::Lines,
            index_buffer,
            index_count,
            index_format: wgpu::IndexFormat::Uint16,
        }
    }

    /// Matching primitive topology for a wgpu pipeline.
    pub fn topology(&self) -> wgpu::PrimitiveTopology {
        match self.mode {
            DrawMode::Triangles => wgpu::PrimitiveTopology::TriangleList,
            DrawMode::Lines => wgpu::PrimitiveTopology::LineList,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draw_topology() {
        let tri = DrawCommand::triangles(BufferHandle(1), 6);
        assert_eq!(tri.topology(), wgpu::PrimitiveTopology::TriangleList);
        assert_eq!(tri.index_format, wgpu::IndexFormat::Uint16);

        let lines = DrawCommand::lines(BufferHandle(2), 8);
        assert_eq!(lines.mode, DrawMode::Lines);
        assert_eq!(lines.topology(), wgpu::PrimitiveTopology::LineList);
    }
}
