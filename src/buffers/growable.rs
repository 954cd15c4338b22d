use std::{mem::size_of, ops::Range};

use bytemuck::Pod;

use super::grown_capacity;
use crate::device::{BufferRole, DeviceBuffer, GraphicsDevice};

/// A device block that only ever grows, and only when asked to.
pub struct GrowableBuffer<D: GraphicsDevice> {
    device: D,
    raw: D::Buffer,
    capacity: u64,
    role: BufferRole,
    label: String,
    generation: u64,
}

impl<D: GraphicsDevice> GrowableBuffer<D> {
    pub fn new(device: D, capacity: u64, role: BufferRole, label: &str) -> Self {
        let raw = device.create_buffer(capacity, role, label);
        Self {
            device,
            raw,
            capacity,
            role,
            label: label.to_string(),
            generation: 0,
        }
    }

    /// Make sure the block holds at least `required` bytes.
    ///
    /// This is the expensive path: when the block is too small the device
    /// is drained so no in-flight frame still reads the old block, then a
    /// block of doubled capacity replaces it. The old contents are NOT
    /// carried over; owners re-upload what they need. Returns whether a
    /// reallocation happened.
    pub fn reserve(&mut self, required: u64) -> bool {
        let Some(capacity) = grown_capacity(self.capacity, required) else {
            return false;
        };
        log::info!(
            "Growing {} buffer {} -> {}",
            self.label,
            self.capacity,
            capacity
        );
        self.device.drain();
        self.raw = self.device.create_buffer(capacity, self.role, &self.label);
        self.capacity = capacity;
        self.generation += 1;
        true
    }

    /// Copy `data` to `offset`. Never grows; writing past the capacity is a
    /// caller bug.
    pub fn write(&mut self, data: &[u8], offset: u64) {
        let end = offset + data.len() as u64;
        crate::require!(
            end <= self.capacity,
            "write of {} bytes at {} overflows {} buffer of {} bytes",
            data.len(),
            offset,
            self.label,
            self.capacity
        );
        self.raw.write(data, offset);
    }

    /// Capacity in bytes.
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Bumped on every reallocation, so cached bindings can tell when the
    /// underlying device buffer changed.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn raw(&self) -> &D::Buffer {
        &self.raw
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

/// A CPU array mirrored into a growable device block.
///
/// The CPU side is authoritative. Appends upload only the new tail, unless
/// the block had to grow, in which case the whole array is uploaded again
/// so previously written content survives the reallocation.
pub struct MirroredBuffer<T: Pod, D: GraphicsDevice> {
    items: Vec<T>,
    buffer: GrowableBuffer<D>,
}

impl<T: Pod, D: GraphicsDevice> MirroredBuffer<T, D> {
    /// An empty mirror whose block starts with room for one element.
    pub fn new(device: D, role: BufferRole, label: &str) -> Self {
        let initial = size_of::<T>().max(1) as u64;
        Self {
            items: Vec::new(),
            buffer: GrowableBuffer::new(device, initial, role, label),
        }
    }

    /// Append `items`, returning their element range.
    pub fn append(&mut self, items: &[T]) -> Range<usize> {
        let start = self.items.len();
        self.items.extend_from_slice(items);
        let end = self.items.len();
        if items.is_empty() {
            return start..end;
        }

        if self.buffer.reserve(Self::byte_len(end)) {
            self.buffer.write(bytemuck::cast_slice(&self.items), 0);
        } else {
            self.buffer
                .write(bytemuck::cast_slice(items), Self::byte_len(start));
        }
        start..end
    }

    /// Replace the whole mirror and upload it.
    pub fn replace(&mut self, items: Vec<T>) {
        self.items = items;
        self.buffer.reserve(Self::byte_len(self.items.len()));
        if !self.items.is_empty() {
            self.buffer.write(bytemuck::cast_slice(&self.items), 0);
        }
    }

    /// Overwrite element `index` and upload just that element.
    pub fn set(&mut self, index: usize, item: T) {
        crate::require!(
            index < self.items.len(),
            "{}: element {index} out of range ({} elements)",
            self.buffer.label(),
            self.items.len()
        );
        self.items[index] = item;
        self.buffer
            .write(bytemuck::bytes_of(&item), Self::byte_len(index));
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn buffer(&self) -> &GrowableBuffer<D> {
        &self.buffer
    }

    fn byte_len(count: usize) -> u64 {
        (count * size_of::<T>()) as u64
    }
}
