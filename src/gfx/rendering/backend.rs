//! GPU buffer boundary
//!
//! The geometry core only needs three buffer operations: create a handle,
//! upload bytes into it and delete it. [`GpuBufferBackend`] captures those;
//! [`HeadlessBackend`] keeps everything in memory for tests and tools, and
//! `wgpu_utils::WgpuBufferBackend` talks to a real device.

use std::collections::HashMap;

/// Opaque buffer identifier handed out by a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferHandle(pub u64);

/// What a buffer is bound as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferTarget {
    /// Vertex attributes.
    Array,
    /// Element indices.
    ElementArray,
}

/// Upload frequency hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferUsage {
    StaticDraw,
    DynamicDraw,
}

pub trait GpuBufferBackend {
    fn create_buffer(&mut self, label: &str) -> BufferHandle;

    /// Replace the contents of `handle` with `bytes`.
    fn upload(&mut self, handle: BufferHandle, target: BufferTarget, bytes: &[u8], usage: BufferUsage);

    fn delete_buffer(&mut self, handle: BufferHandle);
}

/// Contents of one in-memory buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessBuffer {
    pub label: String,
    pub target: Option<BufferTarget>,
    pub usage: Option<BufferUsage>,
    pub data: Vec<u8>,
    pub upload_count: usize,
}

/// In-memory backend that records every upload.
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    next_id: u64,
    buffers: HashMap<BufferHandle, HeadlessBuffer>,
    uploads: Vec<BufferHandle>,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn buffer(&self, handle: BufferHandle) -> Option<&HeadlessBuffer> {
        self.buffers.get(&handle)
    }

    /// Buffers created and not yet deleted.
    pub fn live_buffers(&self) -> usize {
        self.buffers.len()
    }

    /// Handles in upload order since the last [`clear_upload_log`](Self::clear_upload_log).
    pub fn upload_log(&self) -> &[BufferHandle] {
        &self.uploads
    }

    pub fn clear_upload_log(&mut self) {
        self.uploads.clear();
    }

    /// Uploaded contents reinterpreted as `f32`.
    pub fn read_f32(&self, handle: BufferHandle) -> Option<Vec<f32>> {
        self.buffers
            .get(&handle)
            .map(|b| bytemuck::pod_collect_to_vec(&b.data))
    }

    /// Uploaded contents reinterpreted as `u16`.
    pub fn read_u16(&self, handle: BufferHandle) -> Option<Vec<u16>> {
        self.buffers
            .get(&handle)
            .map(|b| bytemuck::pod_collect_to_vec(&b.data))
    }
}

impl GpuBufferBackend for HeadlessBackend {
    fn create_buffer(&mut self, label: &str) -> BufferHandle {
        let handle = BufferHandle(self.next_id);
        self.next_id += 1;
        self.buffers.insert(
            handle,
            HeadlessBuffer {
                label: label.to_string(),
                target: None,
                usage: None,
                data: Vec::new(),
                upload_count: 0,
            },
        );
        handle
    }

    fn upload(&mut self, handle: BufferHandle, target: BufferTarget, bytes: &[u8], usage: BufferUsage) {
        match self.buffers.get_mut(&handle) {
            Some(buffer) => {
                buffer.target = Some(target);
                buffer.usage = Some(usage);
                buffer.data.clear();
                buffer.data.extend_from_slice(bytes);
                buffer.upload_count += 1;
                self.uploads.push(handle);
            }
            None => log::warn!("Upload to unknown buffer {:?} ignored", handle),
        }
    }

    fn delete_buffer(&mut self, handle: BufferHandle) {
        if self.buffers.remove(&handle).is_none() {
            log::warn!("Delete of unknown buffer {:?} ignored", handle);
        }
    }
}
