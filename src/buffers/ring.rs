use super::{GrowableBuffer, align_up, grown_capacity};
use crate::device::{BufferRole, GraphicsDevice};

/// A growable block split into `frame_count` equally sized slots.
///
/// Slot `i` starts at `i * slot_size`. Every write lands in the current
/// slot, and [`FrameRing::advance`] moves to the next one once the frame's
/// draws were issued. As long as `frame_count` covers the number of frames
/// the device can have in flight, the CPU never touches a slot a pending
/// frame still reads.
pub struct FrameRing<D: GraphicsDevice> {
    buffer: GrowableBuffer<D>,
    slot_size: u64,
    frame_count: usize,
    current_slot: usize,
}

impl<D: GraphicsDevice> FrameRing<D> {
    pub fn new(
        device: D,
        slot_size: u64,
        frame_count: usize,
        role: BufferRole,
        label: &str,
    ) -> Self {
        crate::require!(frame_count > 0, "{label} ring needs at least one frame slot");
        let slot_size = align_up(slot_size.max(1), device.offset_alignment());
        let buffer = GrowableBuffer::new(device, slot_size * frame_count as u64, role, label);
        Self {
            buffer,
            slot_size,
            frame_count,
            current_slot: 0,
        }
    }

    /// Write `data` at `offset` within the current slot.
    pub fn write(&mut self, data: &[u8], offset: u64) {
        let end = offset + data.len() as u64;
        crate::require!(
            end <= self.slot_size,
            "write of {} bytes at {} overflows {} ring slot of {} bytes",
            data.len(),
            offset,
            self.buffer.label(),
            self.slot_size
        );
        self.buffer.write(data, self.offset_bytes() + offset);
    }

    /// Grow every slot to hold at least `required` bytes.
    ///
    /// Goes through [`GrowableBuffer::reserve`], so the device is drained
    /// first. The slot index is kept; slot contents are not, callers write
    /// the current frame's data after reserving.
    pub fn reserve_slot(&mut self, required: u64) -> bool {
        let Some(slot_size) = grown_capacity(self.slot_size, required) else {
            return false;
        };
        let slot_size = align_up(slot_size, self.buffer.device().offset_alignment());
        self.buffer.reserve(slot_size * self.frame_count as u64);
        self.slot_size = slot_size;
        true
    }

    /// Rotate to the next slot. Call once per frame, after the draws that
    /// read the current slot were issued.
    pub fn advance(&mut self) {
        self.current_slot = (self.current_slot + 1) % self.frame_count;
    }

    /// Byte offset of the current slot.
    pub fn offset_bytes(&self) -> u64 {
        self.current_slot as u64 * self.slot_size
    }

    pub fn current_slot(&self) -> usize {
        self.current_slot
    }

    pub fn slot_size(&self) -> u64 {
        self.slot_size
    }

    pub fn frame_count(&self) -> usize {
        self.frame_count
    }

    pub fn raw(&self) -> &D::Buffer {
        self.buffer.raw()
    }

    pub fn buffer(&self) -> &GrowableBuffer<D> {
        &self.buffer
    }
}
