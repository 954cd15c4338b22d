use defer_ngin::{
    buffers::FrameRing,
    config::FRAMES_IN_FLIGHT,
    device::{BufferRole, HostDevice},
};

use crate::common::test_utils::{init_logger, read_u32s};
mod common;

#[test]
fn frame_writes_land_in_their_own_slot() {
    init_logger();
    let mut ring = FrameRing::new(
        HostDevice::new(),
        16,
        FRAMES_IN_FLIGHT,
        BufferRole::Storage,
        "frames",
    );
    let slot = ring.slot_size();

    for frame in 0..7u32 {
        assert_eq!(ring.offset_bytes(), (frame as u64 % 3) * slot);
        ring.write(bytemuck::cast_slice(&[frame, frame, frame, frame]), 0);
        ring.advance();
    }

    // Slots 0, 1, 2 were last written by frames 6, 4, 5.
    assert_eq!(read_u32s(ring.raw(), 0, 1), vec![6]);
    assert_eq!(read_u32s(ring.raw(), slot, 1), vec![4]);
    assert_eq!(read_u32s(ring.raw(), 2 * slot, 1), vec![5]);
}

#[test]
fn slots_are_aligned_to_the_device() {
    init_logger();
    let ring = FrameRing::new(
        HostDevice::with_alignment(256),
        144,
        3,
        BufferRole::Storage,
        "camera",
    );
    assert_eq!(ring.slot_size(), 256);
    assert_eq!(ring.buffer().capacity(), 768);
}

#[test]
fn growth_keeps_the_current_slot() {
    init_logger();
    let device = HostDevice::with_alignment(64);
    let mut ring = FrameRing::new(device.clone(), 64, 3, BufferRole::Indirect, "commands");
    ring.advance();
    ring.advance();
    assert_eq!(ring.current_slot(), 2);

    assert!(ring.reserve_slot(100));
    assert_eq!(ring.slot_size(), 128);
    assert_eq!(ring.current_slot(), 2);
    assert_eq!(ring.offset_bytes(), 256);
    assert_eq!(device.stats().drains, 1);

    assert!(!ring.reserve_slot(128));
    ring.advance();
    assert_eq!(ring.offset_bytes(), 0);
}

#[test]
#[should_panic(expected = "overflows")]
fn writes_cannot_spill_into_the_next_slot() {
    init_logger();
    let mut ring = FrameRing::new(HostDevice::new(), 8, 3, BufferRole::Storage, "tiny");
    ring.write(&[0; 12], 0);
}

#[test]
#[should_panic(expected = "at least one frame slot")]
fn rings_need_a_slot() {
    init_logger();
    FrameRing::new(HostDevice::new(), 8, 0, BufferRole::Storage, "none");
}
