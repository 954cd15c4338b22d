//! Fatal precondition handling.
//!
//! Precondition violations (writing past a buffer's capacity, looking up a
//! removed material, building commands twice in one frame, ...) are caller
//! bugs. They are logged together with the call site and a backtrace and
//! then terminate the frame loop. Release builds are compiled with
//! `panic = "abort"`, so the process exits right there.

use std::{backtrace::Backtrace, fmt, panic::Location};

/// Terminate with a diagnostic when `$cond` does not hold.
///
/// ```should_panic
/// let capacity = 16;
/// defer_ngin::require!(capacity >= 32, "buffer is too small: {} bytes", capacity);
/// ```
#[macro_export]
macro_rules! require {
    ($cond:expr, $($arg:tt)+) => {
        if !$cond {
            $crate::fatal::die(format_args!($($arg)+))
        }
    };
}

#[cold]
#[track_caller]
pub fn die(message: fmt::Arguments<'_>) -> ! {
    let location = Location::caller();
    log::error!("{message} (at {location})");
    log::error!("{}", Backtrace::force_capture());
    panic!("{message}");
}
