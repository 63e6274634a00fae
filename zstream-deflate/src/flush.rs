//! Output adapter between the decoder window and the caller's buffer.

use zstream_core::checksum::Checksum;
use zstream_core::window::Window;

/// Result of a flush attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushStatus {
    /// Every pending window byte reached the caller.
    Drained,
    /// The caller's buffer filled first; the rest stays pending.
    BufferFull,
}

impl FlushStatus {
    /// Whether nothing is left pending.
    pub fn is_drained(self) -> bool {
        self == Self::Drained
    }
}

/// The caller's output buffer for one call, plus the running checksum.
///
/// Bytes only ever reach the caller through [`OutputSink::flush`], which
/// folds exactly those bytes, in order, into the checksum.
#[derive(Debug)]
pub struct OutputSink<'o, 'c> {
    output: &'o mut [u8],
    written: usize,
    checksum: &'c mut Checksum,
}

impl<'o, 'c> OutputSink<'o, 'c> {
    /// Wrap `output`, starting empty.
    pub fn new(output: &'o mut [u8], checksum: &'c mut Checksum) -> Self {
        Self {
            output,
            written: 0,
            checksum,
        }
    }

    /// Bytes delivered so far in this call.
    pub fn written(&self) -> usize {
        self.written
    }

    /// Space left in the caller's buffer.
    pub fn remaining(&self) -> usize {
        self.output.len() - self.written
    }

    /// Copy pending window bytes into the caller's buffer.
    ///
    /// Drains in up to two contiguous runs when the pending region wraps.
    /// Running out of space is backpressure, not an error.
    pub fn flush(&mut self, window: &mut Window) -> FlushStatus {
        while window.pending() > 0 && self.remaining() > 0 {
            let run = window.drain(self.remaining());
            let end = self.written + run.len();
            self.output[self.written..end].copy_from_slice(run);
            self.checksum.update(run);
            self.written = end;
        }

        if window.pending() == 0 {
            FlushStatus::Drained
        } else {
            FlushStatus::BufferFull
        }
    }
}
