//! Bit-level input and output for DEFLATE streams.
//!
//! DEFLATE packs bits least-significant-bit first within each byte. The
//! decoder side is [`BitInput`], a resumable cursor over the caller's input
//! slice: its accumulator is saved into a [`BitState`] when a call returns
//! and restored on the next call, so a symbol whose bits straddle two calls
//! decodes exactly as if the input had arrived in one piece. The encoder side
//! is [`BitWriter`], which packs bits into any `Write` sink.
//!
//! # Example
//!
//! ```
//! use zstream_core::bitstream::{BitInput, BitState, BitWriter};
//!
//! let mut output = Vec::new();
//! {
//!     let mut writer = BitWriter::new(&mut output);
//!     writer.write_bits(0b101, 3).unwrap();
//!     writer.write_bits(0b1100, 4).unwrap();
//!     writer.flush().unwrap();
//! }
//!
//! let mut input = BitInput::resume(&output, BitState::default(), 0);
//! assert!(input.ensure(7));
//! assert_eq!(input.take(3), 0b101);
//! assert_eq!(input.take(4), 0b1100);
//! ```

use crate::error::Result;
use std::io::Write;

/// Largest request `BitInput::ensure` accepts.
pub const MAX_ENSURE_BITS: u8 = 56;

/// Accumulator contents carried between calls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BitState {
    hold: u64,
    bits: u8,
}

impl BitState {
    /// Number of valid bits held.
    pub fn bits(&self) -> u8 {
        self.bits
    }

    /// Discard everything held.
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// A resumable LSB-first bit cursor over one call's worth of input.
#[derive(Debug)]
pub struct BitInput<'a> {
    input: &'a [u8],
    /// Next unread byte of `input`.
    pos: usize,
    /// Bit accumulator (LSB-first).
    hold: u64,
    /// Number of valid bits in `hold`.
    bits: u8,
    /// Bytes moved from `input` into `hold` during this call.
    pulled: usize,
    /// Stream offset of `input[0]`, for error reporting.
    base_offset: u64,
}

impl<'a> BitInput<'a> {
    /// Start a call over `input`, continuing from a saved accumulator.
    ///
    /// `base_offset` is the number of compressed bytes consumed by earlier
    /// calls; it is only used to report error positions.
    pub fn resume(input: &'a [u8], state: BitState, base_offset: u64) -> Self {
        Self {
            input,
            pos: 0,
            hold: state.hold,
            bits: state.bits,
            pulled: 0,
            base_offset,
        }
    }

    /// Bytes of input not yet pulled into the accumulator.
    #[inline]
    pub fn avail_in(&self) -> usize {
        self.input.len() - self.pos
    }

    /// Number of valid bits currently held.
    #[inline]
    pub fn bits_available(&self) -> u8 {
        self.bits
    }

    /// Stream offset of the next unread input byte.
    pub fn offset(&self) -> u64 {
        self.base_offset + self.pos as u64
    }

    /// Move one more input byte into the accumulator.
    ///
    /// Returns `false` when the input is exhausted.
    #[inline]
    pub fn pull_byte(&mut self) -> bool {
        debug_assert!(self.bits <= MAX_ENSURE_BITS);
        match self.input.get(self.pos) {
            Some(&byte) => {
                self.hold |= (byte as u64) << self.bits;
                self.bits += 8;
                self.pos += 1;
                self.pulled += 1;
                true
            }
            None => false,
        }
    }

    /// Guarantee at least `n` valid bits, pulling input bytes as needed.
    ///
    /// Returns `false` if the input runs out first. Nothing is consumed
    /// either way: bytes already pulled stay in the accumulator.
    #[inline]
    pub fn ensure(&mut self, n: u8) -> bool {
        debug_assert!(n <= MAX_ENSURE_BITS, "cannot ensure more than 56 bits");
        while self.bits < n {
            if !self.pull_byte() {
                return false;
            }
        }
        true
    }

    /// The low `n` bits of the accumulator without consuming them.
    ///
    /// Bits beyond those available read as zero.
    #[inline]
    pub fn peek(&self, n: u8) -> u32 {
        debug_assert!(n <= 32);
        (self.hold & ((1u64 << n) - 1)) as u32
    }

    /// Discard the low `n` bits after they have been read.
    #[inline]
    pub fn consume(&mut self, n: u8) {
        debug_assert!(n <= self.bits, "consuming bits that were never ensured");
        self.hold >>= n;
        self.bits -= n;
    }

    /// Read and consume `n` bits that are already available.
    #[inline]
    pub fn take(&mut self, n: u8) -> u32 {
        let value = self.peek(n);
        self.consume(n);
        value
    }

    /// Drop bits up to the next byte boundary.
    pub fn align_to_byte(&mut self) {
        let remainder = self.bits % 8;
        self.consume(remainder);
    }

    /// Take the next whole byte when byte-aligned.
    ///
    /// Bytes still in the accumulator come first, then unread input.
    pub fn take_aligned_byte(&mut self) -> Option<u8> {
        debug_assert!(self.bits % 8 == 0, "stream is not byte-aligned");
        if self.bits >= 8 {
            return Some(self.take(8) as u8);
        }
        let byte = *self.input.get(self.pos)?;
        self.pos += 1;
        Some(byte)
    }

    /// Hand whole unconsumed bytes pulled during this call back to the input.
    ///
    /// The input cursor moves backward by that many bytes, so a later call
    /// sees them again. Bytes carried over from earlier calls stay held.
    pub fn restore_unused_input(&mut self) {
        let whole = (self.bits / 8) as usize;
        let give_back = whole.min(self.pulled);
        if give_back == 0 {
            return;
        }
        self.pos -= give_back;
        self.pulled -= give_back;
        self.bits -= (give_back * 8) as u8;
        self.hold &= (1u64 << self.bits) - 1;
    }

    /// Finish the call: returns the number of input bytes consumed and the
    /// accumulator to resume from next time.
    pub fn suspend(self) -> (usize, BitState) {
        (
            self.pos,
            BitState {
                hold: self.hold,
                bits: self.bits,
            },
        )
    }
}

/// A bit-level writer that wraps any `Write` implementation.
///
/// `BitWriter` accumulates bits in an internal buffer and flushes complete
/// bytes to the underlying writer. Call `flush()` when done to write any
/// remaining partial byte.
#[derive(Debug)]
pub struct BitWriter<W: Write> {
    /// Underlying writer.
    writer: W,
    /// Bit buffer (LSB-first).
    buffer: u64,
    /// Number of bits in buffer.
    bits_in_buffer: u8,
    /// Total bits written.
    total_bits_written: u64,
}

impl<W: Write> BitWriter<W> {
    /// Create a new `BitWriter` wrapping the given writer.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            buffer: 0,
            bits_in_buffer: 0,
            total_bits_written: 0,
        }
    }

    /// Get a reference to the underlying writer.
    pub fn get_ref(&self) -> &W {
        &self.writer
    }

    /// Get a mutable reference to the underlying writer.
    ///
    /// Only whole bytes have reached it; up to 7 bits may still be buffered.
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.writer
    }

    /// Flush any partial byte and return the underlying writer.
    pub fn into_inner(mut self) -> Result<W> {
        self.flush()?;
        Ok(self.writer)
    }

    /// Get the total number of bits written so far.
    pub fn bits_written(&self) -> u64 {
        self.total_bits_written
    }

    /// Bits buffered that do not yet form a whole byte.
    pub fn pending_bits(&self) -> u8 {
        self.bits_in_buffer
    }

    #[inline]
    fn flush_bytes(&mut self) -> Result<()> {
        if self.bits_in_buffer >= 32 {
            let bytes = (self.buffer as u32).to_le_bytes();
            self.writer.write_all(&bytes)?;
            self.buffer >>= 32;
            self.bits_in_buffer -= 32;
        }

        while self.bits_in_buffer >= 8 {
            self.writer.write_all(&[self.buffer as u8])?;
            self.buffer >>= 8;
            self.bits_in_buffer -= 8;
        }
        Ok(())
    }

    /// Write up to 32 bits to the stream, LSB-first.
    #[inline]
    pub fn write_bits(&mut self, value: u32, count: u8) -> Result<()> {
        debug_assert!(count <= 32, "Cannot write more than 32 bits at once");

        if count == 0 {
            return Ok(());
        }

        let mask = if count == 32 {
            u32::MAX
        } else {
            (1u32 << count).wrapping_sub(1)
        };

        self.buffer |= ((value & mask) as u64) << self.bits_in_buffer;
        self.bits_in_buffer += count;
        self.total_bits_written += count as u64;

        self.flush_bytes()
    }

    /// Write a single bit.
    #[inline(always)]
    pub fn write_bit(&mut self, bit: bool) -> Result<()> {
        self.write_bits(bit as u32, 1)
    }

    /// Pad to byte boundary with zeros.
    pub fn align_to_byte(&mut self) -> Result<()> {
        if self.bits_in_buffer % 8 != 0 {
            let padding = 8 - (self.bits_in_buffer % 8);
            self.write_bits(0, padding)?;
        }
        Ok(())
    }

    /// Pad the final partial byte with zeros and flush the underlying writer.
    pub fn flush(&mut self) -> Result<()> {
        self.align_to_byte()?;
        self.flush_bytes()?;
        self.writer.flush()?;
        Ok(())
    }

    /// Write bytes directly to the stream.
    pub fn write_bytes(&mut self, buf: &[u8]) -> Result<()> {
        self.flush_bytes()?;

        if self.bits_in_buffer > 0 {
            for &byte in buf {
                self.write_bits(byte as u32, 8)?;
            }
        } else {
            self.writer.write_all(buf)?;
            self.total_bits_written += buf.len() as u64 * 8;
        }

        Ok(())
    }
}
