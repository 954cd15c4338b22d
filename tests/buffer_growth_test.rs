use defer_ngin::{
    buffers::{GrowableBuffer, MirroredBuffer},
    device::{BufferRole, DeviceBuffer, HostDevice},
};

use crate::common::test_utils::{init_logger, read_u32s};
mod common;

/// Smallest `initial * 2^k` that holds `size`.
fn expected_capacity(initial: u64, size: u64) -> u64 {
    let mut capacity = initial;
    while capacity < size {
        capacity *= 2;
    }
    capacity
}

#[test]
fn capacity_tracks_cumulative_size() {
    init_logger();
    let device = HostDevice::new();
    let mut mirror: MirroredBuffer<u32, _> =
        MirroredBuffer::new(device.clone(), BufferRole::Storage, "growth");
    assert_eq!(mirror.buffer().capacity(), 4);

    let mut next = 0u32;
    for batch in [1usize, 1, 3, 7, 2, 20, 1] {
        let items: Vec<u32> = (next..next + batch as u32).collect();
        next += batch as u32;
        mirror.append(&items);

        let size = mirror.len() as u64 * 4;
        assert_eq!(mirror.buffer().capacity(), expected_capacity(4, size));
    }

    // Content written before each reallocation survived it.
    let expected: Vec<u32> = (0..next).collect();
    assert_eq!(read_u32s(mirror.buffer().raw(), 0, expected.len()), expected);
    assert_eq!(mirror.as_slice(), expected.as_slice());
}

#[test]
fn appends_without_growth_upload_only_the_tail() {
    init_logger();
    let device = HostDevice::new();
    let mut mirror: MirroredBuffer<u32, _> =
        MirroredBuffer::new(device.clone(), BufferRole::Storage, "tail");
    mirror.append(&[1, 2, 3, 4]);
    let before = device.stats();

    // 4 elements live in a 16 byte block; growing to 32 re-uploads all 5.
    mirror.append(&[5]);
    let grown = device.stats();
    assert_eq!(grown.bytes_written - before.bytes_written, 20);
    assert_eq!(grown.drains, before.drains + 1);

    // Room for 8 now: the next append writes 4 bytes.
    mirror.append(&[6]);
    let after = device.stats();
    assert_eq!(after.bytes_written - grown.bytes_written, 4);
    assert_eq!(after.drains, grown.drains);
}

#[test]
fn reserve_drains_before_reallocating() {
    init_logger();
    let device = HostDevice::new();
    let mut buffer = GrowableBuffer::new(device.clone(), 16, BufferRole::Vertex, "vertices");

    assert!(!buffer.reserve(16));
    assert_eq!(device.stats().drains, 0);
    assert_eq!(buffer.generation(), 0);

    assert!(buffer.reserve(100));
    assert_eq!(buffer.capacity(), 128);
    assert_eq!(buffer.raw().size(), 128);
    assert_eq!(buffer.generation(), 1);
    assert_eq!(device.stats().drains, 1);
    assert_eq!(device.stats().buffers_created, 2);
}

#[test]
fn replace_uploads_the_whole_mirror() {
    init_logger();
    let device = HostDevice::new();
    let mut mirror: MirroredBuffer<u32, _> =
        MirroredBuffer::new(device, BufferRole::Storage, "replace");
    mirror.append(&[9, 9, 9]);
    mirror.replace(vec![1, 2]);
    assert_eq!(mirror.len(), 2);
    assert_eq!(read_u32s(mirror.buffer().raw(), 0, 2), vec![1, 2]);
}

#[test]
#[should_panic(expected = "overflows")]
fn writing_past_capacity_is_fatal() {
    init_logger();
    let mut buffer = GrowableBuffer::new(HostDevice::new(), 8, BufferRole::Storage, "small");
    buffer.write(&[0; 12], 0);
}
