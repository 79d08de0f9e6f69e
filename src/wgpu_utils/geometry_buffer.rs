// src/wgpu_utils/geometry_buffer.rs
//! [`GpuBufferBackend`] over a wgpu device.
//!
//! Chunk buffers are created with their contents on first upload. Later
//! uploads of the same size are written in place through the queue; a size
//! change recreates the buffer.

use std::collections::HashMap;

use wgpu::util::DeviceExt;

use crate::gfx::rendering::backend::{BufferHandle, BufferTarget, BufferUsage, GpuBufferBackend};

struct Slot {
    label: String,
    buffer: Option<wgpu::Buffer>,
    target: Option<BufferTarget>,
    len: usize,
}

/// Vertex and index buffers owned on behalf of mesh chunks.
pub struct WgpuBufferBackend {
    device: wgpu::Device,
    queue: wgpu::Queue,
    next_id: u64,
    slots: HashMap<BufferHandle, Slot>,
}

/// wgpu usage flags for a buffer bound as `target`.
///
/// wgpu has no draw frequency hint, so static and dynamic uploads share
/// the same flags.
pub fn buffer_usages(target: BufferTarget) -> wgpu::BufferUsages {
    match target {
        BufferTarget::Array => wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        BufferTarget::ElementArray => wgpu::BufferUsages::INDEX | wgpu::BufferUsages::COPY_DST,
    }
}

/// Whether an upload of `len` bytes can overwrite a buffer last filled with `previous` bytes.
fn can_write_in_place(previous: usize, len: usize) -> bool {
    previous == len && len > 0 && len as u64 % wgpu::COPY_BUFFER_ALIGNMENT == 0
}

impl WgpuBufferBackend {
    pub fn new(device: wgpu::Device, queue: wgpu::Queue) -> Self {
        Self {
            device,
            queue,
            next_id: 0,
            slots: HashMap::new(),
        }
    }

    /// The wgpu buffer behind `handle`, once something has been uploaded.
    pub fn buffer(&self, handle: BufferHandle) -> Option<&wgpu::Buffer> {
        self.slots.get(&handle)?.buffer.as_ref()
    }

    pub fn live_buffers(&self) -> usize {
        self.slots.len()
    }
}

impl GpuBufferBackend for WgpuBufferBackend {
    fn create_buffer(&mut self, label: &str) -> BufferHandle {
        let handle = BufferHandle(self.next_id);
        self.next_id += 1;
        self.slots.insert(
            handle,
            Slot {
                label: label.to_string(),
                buffer: None,
                target: None,
                len: 0,
            },
        );
        handle
    }

    fn upload(&mut self, handle: BufferHandle, target: BufferTarget, bytes: &[u8], usage: BufferUsage) {
        let Some(slot) = self.slots.get_mut(&handle) else {
            log::warn!("Upload to unknown buffer {:?} ignored", handle);
            return;
        };

        if let Some(buffer) = &slot.buffer {
            if slot.target == Some(target) && can_write_in_place(slot.len, bytes.len()) {
                self.queue.write_buffer(buffer, 0, bytes);
                return;
            }
        }

        if let Some(old) = slot.buffer.take() {
            old.destroy();
        }

        log::trace!(
            "Creating {} ({} bytes, {:?})",
            slot.label,
            bytes.len(),
            usage
        );
        slot.buffer = Some(self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&slot.label),
            contents: bytes,
            usage: buffer_usages(target),
        }));
        slot.target = Some(target);
        slot.len = bytes.len();
    }

    fn delete_buffer(&mut self, handle: BufferHandle) {
        match self.slots.remove(&handle) {
            Some(slot) => {
                if let Some(buffer) = slot.buffer {
                    buffer.destroy();
                }
            }
            None => log::warn!("Delete of unknown buffer {:?} ignored", handle),
        }
    }
}
