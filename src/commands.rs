//! Indirect draw command generation.
//!
//! [`IndirectCommandBuilder`] turns entities into packed
//! [`DrawIndexedIndirect`] records inside a frame ring. The renderer then
//! issues a single multi-draw over the current slot.

use std::mem::size_of;

use crate::{
    buffers::FrameRing,
    data_structures::scene::Entity,
    device::{BufferRole, GraphicsDevice},
    tables::MeshView,
};

/// One indexed indirect draw, in the layout the device consumes.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct DrawIndexedIndirect {
    pub index_count: u32,
    pub instance_count: u32,
    pub first_index: u32,
    pub base_vertex: i32,
    pub first_instance: u32,
}

impl DrawIndexedIndirect {
    pub const SIZE: u64 = size_of::<DrawIndexedIndirect>() as u64;

    /// Draw `view` once. `first_instance` is the instance index the shader
    /// sees, which the renderer uses to find the per-object record.
    pub fn for_view(view: MeshView, first_instance: u32) -> Self {
        Self {
            index_count: view.index_count,
            instance_count: 1,
            first_index: view.index_offset,
            base_vertex: view.vertex_offset as i32,
            first_instance,
        }
    }
}

pub struct IndirectCommandBuilder<D: GraphicsDevice> {
    ring: FrameRing<D>,
    commands: Vec<DrawIndexedIndirect>,
    pending: bool,
}

impl<D: GraphicsDevice> IndirectCommandBuilder<D> {
    pub fn new(device: D, frame_count: usize, label: &str) -> Self {
        Self {
            ring: FrameRing::new(
                device,
                DrawIndexedIndirect::SIZE,
                frame_count,
                BufferRole::Indirect,
                label,
            ),
            commands: Vec::new(),
            pending: false,
        }
    }

    /// Write one draw per entity into the current slot and return the draw
    /// count.
    ///
    /// The n-th draw gets `first_instance = n`, so draw n reads object
    /// record n. Growing the slot drains the device.
    pub fn build(&mut self, entities: &[Entity]) -> u32 {
        self.begin();
        self.commands.clear();
        self.commands.extend(
            entities
                .iter()
                .enumerate()
                .map(|(n, e)| DrawIndexedIndirect::for_view(e.mesh, n as u32)),
        );
        self.upload()
    }

    /// Single draw for fixed one-draw passes such as full-screen quads.
    pub fn build_single(&mut self, entity: &Entity) -> u32 {
        self.begin();
        self.commands.clear();
        self.commands
            .push(DrawIndexedIndirect::for_view(entity.mesh, 0));
        self.upload()
    }

    /// Rotate to the next slot. Call after the draw reading the commands
    /// was issued.
    pub fn advance(&mut self) {
        self.pending = false;
        self.ring.advance();
    }

    /// Byte offset of the commands built this frame.
    pub fn offset_bytes(&self) -> u64 {
        self.ring.offset_bytes()
    }

    /// Commands of the last build.
    pub fn commands(&self) -> &[DrawIndexedIndirect] {
        &self.commands
    }

    pub fn ring(&self) -> &FrameRing<D> {
        &self.ring
    }

    fn begin(&mut self) {
        crate::require!(
            !self.pending,
            "{} built twice without advancing",
            self.ring.buffer().label()
        );
        self.pending = true;
    }

    fn upload(&mut self) -> u32 {
        let bytes: &[u8] = bytemuck::cast_slice(&self.commands);
        self.ring.reserve_slot(bytes.len() as u64);
        self.ring.write(bytes, 0);
        self.commands.len() as u32
    }
}

impl<D: GraphicsDevice> std::fmt::Display for IndirectCommandBuilder<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Command buffer {} size",
            self.ring.buffer().capacity()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn descriptor_matches_device_layout() {
        assert_eq!(DrawIndexedIndirect::SIZE, 20);
    }

    #[test]
    fn view_maps_onto_descriptor() {
        let view = MeshView {
            index_offset: 6,
            index_count: 3,
            vertex_offset: 4,
            vertex_count: 3,
        };
        let cmd = DrawIndexedIndirect::for_view(view, 2);
        assert_eq!(cmd.first_index, 6);
        assert_eq!(cmd.index_count, 3);
        assert_eq!(cmd.base_vertex, 4);
        assert_eq!(cmd.instance_count, 1);
        assert_eq!(cmd.first_instance, 2);
    }
}
