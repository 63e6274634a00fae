//! Status codes, flush modes and the streaming codec traits.
//!
//! The traits describe a slice-in / slice-out engine that reports how much
//! of each buffer it used. Engines keep all their progress internally, so a
//! caller can feed input and drain output in chunks of any size.

use crate::error::{Result, ZStreamError};

/// Status code returned across the stream boundary.
///
/// The numeric values are the conventional zlib ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum Status {
    /// Progress was made; call again to continue.
    Ok = 0,
    /// The end of the compressed stream was reached and all output delivered.
    StreamEnd = 1,
    /// A preset dictionary is required (never produced by raw streams).
    NeedDict = 2,
    /// An I/O error occurred outside the codec.
    ErrNo = -1,
    /// The stream was misused or its parameters are invalid.
    StreamError = -2,
    /// The compressed data is corrupt.
    DataError = -3,
    /// Internal buffers could not be allocated.
    MemError = -4,
    /// No progress was possible; supply more input or output space.
    BufError = -5,
    /// Incompatible library version.
    VersionError = -6,
}

impl Status {
    /// The raw integer code.
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Whether this status is one of the negative error codes.
    pub fn is_error(self) -> bool {
        self.code() < 0
    }

    /// Whether this status is terminal for the stream that returned it.
    ///
    /// `BufError` is not: it only asks for more buffer space.
    pub fn is_fatal(self) -> bool {
        self.is_error() && self != Self::BufError
    }
}

impl TryFrom<i32> for Status {
    type Error = ZStreamError;

    fn try_from(value: i32) -> Result<Self> {
        Ok(match value {
            0 => Self::Ok,
            1 => Self::StreamEnd,
            2 => Self::NeedDict,
            -1 => Self::ErrNo,
            -2 => Self::StreamError,
            -3 => Self::DataError,
            -4 => Self::MemError,
            -5 => Self::BufError,
            -6 => Self::VersionError,
            other => return Err(ZStreamError::invalid_parameter("status", other)),
        })
    }
}

/// Status of a streaming decompression operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecompressStatus {
    /// More input is needed to continue decompression.
    NeedsInput,
    /// More output buffer space is needed.
    NeedsOutput,
    /// Decompression is complete.
    Done,
    /// A non-final block boundary was reached. Only reported by
    /// decompressors asked to stop at block boundaries; callers resume by
    /// calling again with the remaining input.
    BlockEnd,
}

/// Status of a streaming compression operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressStatus {
    /// More input data can be accepted.
    NeedsInput,
    /// More output buffer space is needed.
    NeedsOutput,
    /// Compression is complete.
    Done,
}

/// Flush mode for compression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, PartialOrd, Ord)]
pub enum FlushMode {
    /// Buffer data for best compression.
    #[default]
    NoFlush,
    /// Emit all complete blocks plus an empty fixed block.
    PartialFlush,
    /// Emit all pending output and align to a byte boundary.
    SyncFlush,
    /// As `SyncFlush`, and drop match history.
    FullFlush,
    /// Complete the stream.
    Finish,
}

/// A streaming decompressor (decoder).
pub trait Decompressor {
    /// Decompress data from input to output.
    ///
    /// # Returns
    ///
    /// A tuple of (bytes consumed from input, bytes written to output, status)
    fn decompress(
        &mut self,
        input: &[u8],
        output: &mut [u8],
    ) -> Result<(usize, usize, DecompressStatus)>;

    /// Reset the decompressor to its initial state.
    fn reset(&mut self);

    /// Check if the decompressor has finished.
    fn is_finished(&self) -> bool;

    /// Decompress all data at once (convenience method).
    ///
    /// Fails with [`ZStreamError::UnexpectedEof`] when `input` ends before
    /// the compressed stream does.
    fn decompress_all(&mut self, input: &[u8]) -> Result<Vec<u8>> {
        let mut output = Vec::new();
        let mut input_pos = 0;
        let mut buffer = vec![0u8; 32768];

        loop {
            let (consumed, produced, status) = self.decompress(&input[input_pos..], &mut buffer)?;

            input_pos += consumed;
            output.extend_from_slice(&buffer[..produced]);

            match status {
                DecompressStatus::Done => break,
                DecompressStatus::NeedsInput if input_pos >= input.len() => {
                    return Err(ZStreamError::unexpected_eof(input_pos as u64));
                }
                DecompressStatus::NeedsOutput
                | DecompressStatus::NeedsInput
                | DecompressStatus::BlockEnd => continue,
            }
        }

        Ok(output)
    }
}

/// A streaming compressor (encoder).
pub trait Compressor {
    /// Compress data from input to output.
    ///
    /// # Returns
    ///
    /// A tuple of (bytes consumed from input, bytes written to output, status)
    fn compress(
        &mut self,
        input: &[u8],
        output: &mut [u8],
        flush: FlushMode,
    ) -> Result<(usize, usize, CompressStatus)>;

    /// Reset the compressor to its initial state.
    fn reset(&mut self);

    /// Check if the compressor has finished.
    fn is_finished(&self) -> bool;

    /// Compress all data at once (convenience method).
    fn compress_all(&mut self, input: &[u8]) -> Result<Vec<u8>> {
        let mut output = Vec::new();
        let mut input_pos = 0;
        let mut buffer = vec![0u8; 32768];

        loop {
            let (consumed, produced, status) =
                self.compress(&input[input_pos..], &mut buffer, FlushMode::Finish)?;

            input_pos += consumed;
            output.extend_from_slice(&buffer[..produced]);

            if status == CompressStatus::Done {
                break;
            }
        }

        Ok(output)
    }
}

/// Compression level (0-9).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressionLevel(u8);

impl CompressionLevel {
    /// No compression (store only).
    pub const NONE: Self = Self(0);
    /// Fastest compression.
    pub const FAST: Self = Self(1);
    /// Default compression (balanced).
    pub const DEFAULT: Self = Self(6);
    /// Best compression (slowest).
    pub const BEST: Self = Self(9);

    /// Create a custom compression level (0-9).
    pub fn new(level: u8) -> Self {
        Self(level.min(9))
    }

    /// Interpret a signed zlib-style level, where `-1` selects the default.
    pub fn from_signed(level: i32) -> Result<Self> {
        match level {
            -1 => Ok(Self::DEFAULT),
            0..=9 => Ok(Self(level as u8)),
            other => Err(ZStreamError::invalid_parameter("level", other)),
        }
    }

    /// Get the level value.
    pub fn level(&self) -> u8 {
        self.0
    }
}

impl Default for CompressionLevel {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<u8> for CompressionLevel {
    fn from(level: u8) -> Self {
        Self::new(level)
    }
}
