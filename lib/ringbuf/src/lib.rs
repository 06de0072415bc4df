// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Ring buffer for debugging drivers.
//!
//! This contains an implementation of a fixed-size ring buffer designed to
//! instrument arbitrary contexts. While there is nothing to prevent these
//! ring buffers from being left in production code, the design center is
//! primarily around debugging in development: a crate declares an enum of
//! interesting events, drops a `ringbuf!` at module scope, and records
//! entries at the points of interest. The ring can then be inspected from a
//! test, a debugger, or a post-mortem dump.
//!
//! ## Constraints
//!
//! The entry type must implement [`Copy`] and [`PartialEq`]. `PartialEq` is
//! used for entry de-duplication: when the same value is recorded multiple
//! times in a row, the repeat is recorded by incrementing a counter in the
//! existing entry rather than consuming another slot, so a busy loop does
//! not immediately erase the history before it.
//!
//! ## Creating a ring buffer
//!
//! ```
//! ringbuf!(Trace, 16, Trace::None);
//!
//! // ...
//!
//! ringbuf_entry!(Trace::Read(addr, val));
//! ```
//!
//! You can also provide a name for the ring buffer, to distinguish between
//! them if you have more than one per module:
//!
//! ```
//! ringbuf!(CMD_RINGBUF, Trace, 32, Trace::None);
//! ringbuf_entry!(CMD_RINGBUF, Trace::Command(op));
//! ```

#![cfg_attr(not(test), no_std)]

/// Re-export so that code generated by the macros is guaranteed to be able
/// to find the lock type.
pub use spin::Mutex;

/// Declares a ringbuffer in the current module or context.
///
/// `ringbuf!(NAME, Type, N, expr)` makes a ringbuffer named `NAME`,
/// containing entries of type `Type`, with room for `N` such entries, all
/// of which are initialized to `expr`.
///
/// The resulting ringbuffer will be static, so `NAME` should be uppercase.
/// The actual type of `NAME` will be `Mutex<Ringbuf<Type, N>>`.
///
/// To support the common case of having one quickly-installed ringbuffer
/// per module, if you omit the name, it will default to `__RINGBUF`.
#[macro_export]
macro_rules! ringbuf {
    ($name:ident, $t:ty, $n:expr, $init:expr) => {
        static $name: $crate::Mutex<$crate::Ringbuf<$t, $n>> =
            $crate::Mutex::new($crate::Ringbuf::new($init));
    };
    ($t:ty, $n:expr, $init:expr) => {
        $crate::ringbuf!(__RINGBUF, $t, $n, $init);
    };
}

/// Records an entry in a ringbuffer declared with `ringbuf!`.
///
/// `ringbuf_entry!(NAME, expr)` records `expr` into the ringbuffer `NAME`;
/// with the name omitted it records into the module's `__RINGBUF`.
#[macro_export]
macro_rules! ringbuf_entry {
    ($name:ident, $payload:expr) => {{
        $name.lock().entry($payload, line!() as u16);
    }};
    ($payload:expr) => {
        $crate::ringbuf_entry!(__RINGBUF, $payload);
    };
}

/// One slot of a [`Ringbuf`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct RingbufEntry<T: Copy + PartialEq> {
    /// Source line that recorded this entry, 0 if never written.
    pub line: u16,
    /// How many times the buffer has wrapped when this entry was written.
    pub generation: u16,
    /// Number of consecutive repeats folded into this entry.
    pub count: u32,
    pub payload: T,
}

/// A fixed-size ring of the last `N` recorded entries.
#[derive(Debug)]
pub struct Ringbuf<T: Copy + PartialEq, const N: usize> {
    last: Option<usize>,
    buffer: [RingbufEntry<T>; N],
}

impl<T: Copy + PartialEq, const N: usize> Ringbuf<T, N> {
    pub const fn new(initial: T) -> Self {
        Self {
            last: None,
            buffer: [RingbufEntry {
                line: 0,
                generation: 0,
                count: 0,
                payload: initial,
            }; N],
        }
    }

    /// Records `payload`. A repeat of the most recent entry from the same
    /// line bumps that entry's count instead of taking a new slot.
    pub fn entry(&mut self, payload: T, line: u16) {
        // If this matches the most recent entry, attempt to bump the count.
        if let Some(last) = self.last {
            let ent = &mut self.buffer[last];
            if ent.line == line && ent.payload == payload {
                if let Some(count) = ent.count.checked_add(1) {
                    ent.count = count;
                    return;
                }
                // Counter saturated; fall through and burn a slot.
            }
        }

        let ndx = match self.last {
            None => 0,
            Some(last) if last + 1 >= self.buffer.len() => 0,
            Some(last) => last + 1,
        };

        let ent = &mut self.buffer[ndx];
        *ent = RingbufEntry {
            line,
            payload,
            count: 1,
            generation: ent.generation.wrapping_add(1),
        };

        self.last = Some(ndx);
    }

    /// The most recently written entry, if anything has been recorded.
    pub fn last_entry(&self) -> Option<&RingbufEntry<T>> {
        self.last.map(|ndx| &self.buffer[ndx])
    }

    /// Iterates over all entries that have ever been written, oldest slot
    /// first. Order within the buffer is positional, not chronological.
    pub fn entries(&self) -> impl Iterator<Item = &RingbufEntry<T>> {
        self.buffer.iter().filter(|e| e.count != 0)
    }

    /// Total number of recorded events still visible in the ring, with
    /// folded repeats counted individually.
    pub fn total_count(&self) -> u64 {
        self.entries().map(|e| u64::from(e.count)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty() {
        let buf = Ringbuf::<u32, 4>::new(0);
        assert!(buf.last_entry().is_none());
        assert_eq!(buf.entries().count(), 0);
    }

    #[test]
    fn records_in_order() {
        let mut buf = Ringbuf::<u32, 4>::new(0);
        buf.entry(10, 1);
        buf.entry(20, 2);

        let last = buf.last_entry().unwrap();
        assert_eq!(last.payload, 20);
        assert_eq!(last.count, 1);
        assert_eq!(buf.entries().count(), 2);
    }

    #[test]
    fn dedups_repeats_from_same_line() {
        let mut buf = Ringbuf::<u32, 4>::new(0);
        buf.entry(7, 11);
        buf.entry(7, 11);
        buf.entry(7, 11);

        assert_eq!(buf.entries().count(), 1);
        assert_eq!(buf.last_entry().unwrap().count, 3);

        // Same value from a different line is a distinct entry.
        buf.entry(7, 12);
        assert_eq!(buf.entries().count(), 2);
    }

    #[test]
    fn wraps_and_bumps_generation() {
        let mut buf = Ringbuf::<u32, 2>::new(0);
        for i in 0..5 {
            buf.entry(i, 1 + i as u16);
        }
        // 5 distinct entries through a 2-deep ring: slot 0 written 3 times.
        assert_eq!(buf.last_entry().unwrap().payload, 4);
        assert_eq!(buf.last_entry().unwrap().generation, 3);
        assert_eq!(buf.total_count(), 2);
    }

    #[test]
    fn macro_surface() {
        ringbuf!(TEST_RINGBUF, u32, 8, 0);
        ringbuf_entry!(TEST_RINGBUF, 42);
        ringbuf_entry!(TEST_RINGBUF, 42);
        assert_eq!(TEST_RINGBUF.lock().last_entry().unwrap().count, 2);
    }
}
