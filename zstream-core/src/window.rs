//! Sliding window ring buffer for DEFLATE decompression.
//!
//! The window plays two roles at once. It is the LZ77 dictionary that
//! back-references copy from, and it is the staging area holding decoded
//! bytes until the caller has room for them. Three positions describe it:
//!
//! - `write`: where the next decoded byte lands,
//! - `read`: the next byte still owed to the caller,
//! - `total`: how many bytes were ever written, which bounds how far back a
//!   reference may legally reach before the window has filled once.
//!
//! The bytes from `read` up to `write` (circularly) are pending. Bytes behind
//! `read` have been flushed but stay available as history until they are
//! overwritten. Only [`Window::write_literal`], [`Window::copy_back`] and
//! [`Window::drain`] mutate the contents.

use crate::error::{Result, ZStreamError};

/// Window size for a full DEFLATE stream (32 KB).
pub const DEFLATE_WINDOW: usize = 32768;

/// Circular history and pending-output buffer.
#[derive(Debug, Clone)]
pub struct Window {
    buffer: Vec<u8>,
    /// Capacity - 1; capacity is a power of two.
    mask: usize,
    read: usize,
    write: usize,
    /// Bytes between `read` and `write` not yet drained.
    pending: usize,
    /// Bytes ever written since the last reset.
    total: u64,
}

impl Window {
    /// Allocate a window of `capacity` bytes.
    ///
    /// `capacity` must be a non-zero power of two. Allocation failure is
    /// reported as [`ZStreamError::Memory`] rather than aborting.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 || !capacity.is_power_of_two() {
            return Err(ZStreamError::invalid_parameter(
                "window capacity",
                capacity as i64,
            ));
        }

        let mut buffer = Vec::new();
        buffer
            .try_reserve_exact(capacity)
            .map_err(|_| ZStreamError::memory(capacity))?;
        buffer.resize(capacity, 0);

        Ok(Self {
            buffer,
            mask: capacity - 1,
            read: 0,
            write: 0,
            pending: 0,
            total: 0,
        })
    }

    /// Window capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Next position to flush to the caller.
    pub fn read_pos(&self) -> usize {
        self.read
    }

    /// Next position to fill.
    pub fn write_pos(&self) -> usize {
        self.write
    }

    /// Bytes written but not yet drained.
    pub fn pending(&self) -> usize {
        self.pending
    }

    /// Bytes that can be written before the window must be drained.
    pub fn free(&self) -> usize {
        self.capacity() - self.pending
    }

    /// Whether every slot holds an undrained byte.
    pub fn is_full(&self) -> bool {
        self.pending == self.capacity()
    }

    /// Total bytes written since the last reset.
    pub fn total_written(&self) -> u64 {
        self.total
    }

    /// How far back a reference may currently reach.
    pub fn history(&self) -> usize {
        self.total.min(self.capacity() as u64) as usize
    }

    /// Forget all contents and positions, keeping the allocation.
    pub fn reset(&mut self) {
        self.read = 0;
        self.write = 0;
        self.pending = 0;
        self.total = 0;
    }

    /// Append one byte. Returns `false` if the window is full.
    #[inline]
    pub fn write_literal(&mut self, byte: u8) -> bool {
        if self.is_full() {
            return false;
        }
        self.buffer[self.write] = byte;
        self.advance_write(1);
        true
    }

    /// Copy up to `length` bytes starting `distance` bytes behind the write
    /// position, stopping early when the window fills.
    ///
    /// Returns how many bytes were copied; the caller resumes the remainder
    /// later with the same distance, since the source is always relative to
    /// the write position. Overlapping copies (`length > distance`) repeat
    /// the pattern, as LZ77 requires.
    pub fn copy_back(&mut self, distance: usize, length: usize) -> Result<usize> {
        if distance == 0 || distance > self.history() {
            return Err(ZStreamError::invalid_distance(distance, self.history()));
        }

        let count = length.min(self.free());
        let capacity = self.capacity();
        let src = self.write.wrapping_sub(distance) & self.mask;

        if distance >= count && src + count <= capacity && self.write + count <= capacity {
            self.buffer.copy_within(src..src + count, self.write);
        } else {
            let mut from = src;
            let mut to = self.write;
            for _ in 0..count {
                self.buffer[to] = self.buffer[from];
                from = (from + 1) & self.mask;
                to = (to + 1) & self.mask;
            }
        }

        self.advance_write(count);
        Ok(count)
    }

    /// Take the next contiguous run of pending bytes, at most `max` long.
    ///
    /// A pending region that wraps past the end of the buffer comes out in
    /// two runs; call again for the second. Returns an empty slice when
    /// nothing is pending.
    pub fn drain(&mut self, max: usize) -> &[u8] {
        let run = self.pending.min(self.capacity() - self.read).min(max);
        let start = self.read;
        self.read = (self.read + run) & self.mask;
        self.pending -= run;
        &self.buffer[start..start + run]
    }

    #[inline]
    fn advance_write(&mut self, count: usize) {
        self.write = (self.write + count) & self.mask;
        self.pending += count;
        self.total += count as u64;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain_all(window: &mut Window) -> Vec<u8> {
        let mut out = Vec::new();
        loop {
            let run = window.drain(usize::MAX);
            if run.is_empty() {
                break;
            }
            out.extend_from_slice(run);
        }
        out
    }

    #[test]
    fn test_window_basic() {
        let mut window = Window::new(8).unwrap();
        for &b in b"Hello" {
            assert!(window.write_literal(b));
        }

        assert_eq!(window.pending(), 5);
        assert_eq!(window.history(), 5);
        assert_eq!(drain_all(&mut window), b"Hello");
        assert_eq!(window.pending(), 0);
        assert_eq!(window.read_pos(), window.write_pos());
    }

    #[test]
    fn test_window_full_rejects_writes() {
        let mut window = Window::new(4).unwrap();
        for &b in b"ABCD" {
            assert!(window.write_literal(b));
        }
        assert!(window.is_full());
        assert!(!window.write_literal(b'E'));

        assert_eq!(window.drain(1), b"A");
        assert!(window.write_literal(b'E'));
        assert_eq!(drain_all(&mut window), b"BCDE");
    }

    #[test]
    fn test_drain_wraps_in_two_runs() {
        let mut window = Window::new(4).unwrap();
        for &b in b"ABC" {
            window.write_literal(b);
        }
        assert_eq!(window.drain(3), b"ABC");
        for &b in b"DEF" {
            window.write_literal(b);
        }

        assert_eq!(window.drain(10), b"D");
        assert_eq!(window.drain(10), b"EF");
        assert!(window.drain(10).is_empty());
    }

    #[test]
    fn test_copy_back_overlap() {
        // "AB" then distance=2, length=6 -> "ABABAB"
        let mut window = Window::new(32).unwrap();
        window.write_literal(b'A');
        window.write_literal(b'B');
        assert_eq!(window.copy_back(2, 6).unwrap(), 6);
        assert_eq!(drain_all(&mut window), b"ABABABAB");
    }

    #[test]
    fn test_copy_back_single_byte_repeat() {
        let mut window = Window::new(32).unwrap();
        window.write_literal(b'X');
        assert_eq!(window.copy_back(1, 5).unwrap(), 5);
        assert_eq!(drain_all(&mut window), b"XXXXXX");
    }

    #[test]
    fn test_copy_back_partial_then_resume() {
        let mut window = Window::new(8).unwrap();
        for &b in b"abcd" {
            window.write_literal(b);
        }

        // Only 4 free slots: the copy stops early.
        assert_eq!(window.copy_back(4, 6).unwrap(), 4);
        assert_eq!(drain_all(&mut window), b"abcdabcd");

        // Same distance, remaining length: continues the pattern.
        assert_eq!(window.copy_back(4, 2).unwrap(), 2);
        assert_eq!(drain_all(&mut window), b"ab");
    }

    #[test]
    fn test_copy_back_from_flushed_history() {
        let mut window = Window::new(16).unwrap();
        for &b in b"Hello" {
            window.write_literal(b);
        }
        assert_eq!(drain_all(&mut window), b"Hello");

        // History survives the flush.
        assert_eq!(window.copy_back(5, 5).unwrap(), 5);
        assert_eq!(drain_all(&mut window), b"Hello");
    }

    #[test]
    fn test_copy_back_across_wrap() {
        let mut window = Window::new(8).unwrap();
        for &b in b"0123456" {
            window.write_literal(b);
        }
        drain_all(&mut window);
        window.write_literal(b'7');
        drain_all(&mut window);

        // Write position is 0; the source "5670" region wraps.
        assert_eq!(window.copy_back(3, 3).unwrap(), 3);
        assert_eq!(drain_all(&mut window), b"567");
        assert_eq!(window.total_written(), 11);
    }

    #[test]
    fn test_copy_back_invalid_distance() {
        let mut window = Window::new(32).unwrap();
        assert!(window.copy_back(1, 1).is_err());

        window.write_literal(b'a');
        window.write_literal(b'b');
        assert!(window.copy_back(0, 1).is_err());
        assert!(window.copy_back(3, 1).is_err());
        assert!(matches!(
            window.copy_back(3, 1),
            Err(ZStreamError::InvalidDistance {
                distance: 3,
                history_size: 2
            })
        ));
    }

    #[test]
    fn test_distance_equal_to_capacity() {
        let mut window = Window::new(4).unwrap();
        for &b in b"WXYZ" {
            window.write_literal(b);
        }
        drain_all(&mut window);

        assert_eq!(window.copy_back(4, 4).unwrap(), 4);
        assert_eq!(drain_all(&mut window), b"WXYZ");
    }

    #[test]
    fn test_non_power_of_two_rejected() {
        assert!(Window::new(100).is_err());
        assert!(Window::new(0).is_err());
    }

    #[test]
    fn test_reset() {
        let mut window = Window::new(8).unwrap();
        window.write_literal(1);
        window.reset();
        assert_eq!(window.pending(), 0);
        assert_eq!(window.history(), 0);
        assert!(window.copy_back(1, 1).is_err());
    }
}
