//! Device memory arenas.
//!
//! - [`GrowableBuffer`]: a device block that grows by doubling. Growth is
//!   an explicit call ([`GrowableBuffer::reserve`]) that drains the device
//!   first, a plain write never reallocates.
//! - [`MirroredBuffer`]: a CPU-side `Vec<T>` kept in sync with a growable
//!   block. This is what the resource tables store their records in.
//! - [`FrameRing`]: a growable block split into one slot per frame in
//!   flight. Writes go to the current slot, [`FrameRing::advance`] rotates.

mod growable;
mod ring;

pub use growable::{GrowableBuffer, MirroredBuffer};
pub use ring::FrameRing;

/// Capacity after growing `current` until it holds `required` bytes.
///
/// Returns `None` when no growth is needed. Otherwise the capacity doubles,
/// starting from `current` (or one byte for an empty block), until it is at
/// least `required`.
pub fn grown_capacity(current: u64, required: u64) -> Option<u64> {
    if required <= current {
        return None;
    }
    let mut capacity = current.max(1);
    while capacity < required {
        capacity = match capacity.checked_mul(2) {
            Some(doubled) => doubled,
            None => crate::fatal::die(format_args!(
                "cannot grow a {current} byte buffer to {required} bytes"
            )),
        };
    }
    Some(capacity)
}

/// Round `value` up to the next multiple of `alignment`.
pub fn align_up(value: u64, alignment: u64) -> u64 {
    value.next_multiple_of(alignment.max(1))
}
