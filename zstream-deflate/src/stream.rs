//! Caller-visible session object.
//!
//! A [`Stream`] goes through `init → process* → end`. Each processing call
//! takes a [`StreamIo`] holding the caller's input and output slices,
//! advances both past whatever it used, and returns a [`Status`] code.
//! Errors never escape as panics or `Err` values here: every failure becomes
//! a status code, with its description left in [`Stream::msg`].
//!
//! ```
//! use zstream_core::traits::{FlushMode, Status};
//! use zstream_deflate::stream::{Stream, StreamIo};
//!
//! let mut compressed = vec![0u8; 64];
//! let mut stream = Stream::new();
//! assert_eq!(stream.deflate_init(0), Status::Ok);
//! let mut io = StreamIo::new(b"AAAAAAAAAA", &mut compressed);
//! assert_eq!(stream.deflate(&mut io, FlushMode::Finish), Status::StreamEnd);
//! let len = stream.total_out() as usize;
//! stream.end();
//!
//! let mut output = [0u8; 16];
//! assert_eq!(stream.inflate_init(), Status::Ok);
//! let mut io = StreamIo::new(&compressed[..len], &mut output);
//! assert_eq!(stream.inflate(&mut io), Status::StreamEnd);
//! assert_eq!(stream.total_out(), 10);
//! ```

use crate::config::{DeflateConfig, InflateConfig, Strategy};
use crate::deflate::{Deflater, deflate_bound};
use crate::inflate::Inflater;
use zstream_core::error::{Result, ZStreamError};
use zstream_core::traits::{
    CompressStatus, CompressionLevel, Compressor, DecompressStatus, Decompressor, FlushMode,
    Status,
};

/// The caller's buffers for one processing call.
///
/// After the call `next_in` and `next_out` start just past the bytes that
/// were consumed and produced.
#[derive(Debug)]
pub struct StreamIo<'i, 'o> {
    /// Input not yet consumed.
    pub next_in: &'i [u8],
    /// Output space not yet filled.
    pub next_out: &'o mut [u8],
}

impl<'i, 'o> StreamIo<'i, 'o> {
    /// Wrap an input and an output buffer.
    pub fn new(next_in: &'i [u8], next_out: &'o mut [u8]) -> Self {
        Self { next_in, next_out }
    }

    /// Input bytes still available.
    pub fn avail_in(&self) -> usize {
        self.next_in.len()
    }

    /// Output space still available.
    pub fn avail_out(&self) -> usize {
        self.next_out.len()
    }

    /// Step past `consumed` input bytes and `produced` output bytes.
    fn advance(&mut self, consumed: usize, produced: usize) {
        self.next_in = &self.next_in[consumed..];
        let out = std::mem::take(&mut self.next_out);
        self.next_out = &mut out[produced..];
    }
}

/// Direction a stream was initialized for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Decompressing.
    Inflate,
    /// Compressing.
    Deflate,
}

#[derive(Debug, Default)]
enum Codec {
    #[default]
    Idle,
    Inflate(Box<Inflater>),
    Deflate(Box<Deflater>),
}

/// A compression or decompression session.
#[derive(Debug, Default)]
pub struct Stream {
    codec: Codec,
    msg: Option<String>,
}

impl Stream {
    /// Create an uninitialized stream.
    pub fn new() -> Self {
        Self::default()
    }

    /// Direction the stream is initialized for, if any.
    pub fn direction(&self) -> Option<Direction> {
        match self.codec {
            Codec::Idle => None,
            Codec::Inflate(_) => Some(Direction::Inflate),
            Codec::Deflate(_) => Some(Direction::Deflate),
        }
    }

    /// Total input bytes consumed since the last init or reset.
    pub fn total_in(&self) -> u64 {
        match &self.codec {
            Codec::Idle => 0,
            Codec::Inflate(inflater) => inflater.total_in(),
            Codec::Deflate(deflater) => deflater.total_in(),
        }
    }

    /// Total output bytes produced since the last init or reset.
    pub fn total_out(&self) -> u64 {
        match &self.codec {
            Codec::Idle => 0,
            Codec::Inflate(inflater) => inflater.total_out(),
            Codec::Deflate(deflater) => deflater.total_out(),
        }
    }

    /// Description of the last error, if any.
    pub fn msg(&self) -> Option<&str> {
        self.msg.as_deref()
    }

    /// Running checksum of the uncompressed bytes.
    pub fn checksum(&self) -> Option<u32> {
        match &self.codec {
            Codec::Idle => None,
            Codec::Inflate(inflater) => Some(inflater.checksum()),
            Codec::Deflate(deflater) => Some(deflater.checksum()),
        }
    }

    /// Upper bound on the compressed size of `len` input bytes.
    pub fn deflate_bound(&self, len: usize) -> usize {
        deflate_bound(len)
    }

    /// Record `result`'s error, if any, as a status code.
    fn settle(&mut self, result: Result<Status>) -> Status {
        match result {
            Ok(status) => status,
            Err(err) => {
                let status = err.status();
                self.msg = Some(err.to_string());
                status
            }
        }
    }

    /// Start decompressing with a 32 KB window.
    pub fn inflate_init(&mut self) -> Status {
        self.inflate_init_with(InflateConfig::DEFAULT)
    }

    /// Start decompressing with a window of `1 << window_bits` bytes (8-15).
    pub fn inflate_init2(&mut self, window_bits: i32) -> Status {
        let result = u8::try_from(window_bits)
            .map_err(|_| ZStreamError::invalid_parameter("window_bits", window_bits))
            .map(InflateConfig::new);
        match result {
            Ok(config) => self.inflate_init_with(config),
            Err(err) => self.settle(Err(err)),
        }
    }

    /// Start decompressing with the given configuration.
    pub fn inflate_init_with(&mut self, config: InflateConfig) -> Status {
        self.msg = None;
        let result = Inflater::with_config(config).map(|inflater| {
            self.codec = Codec::Inflate(Box::new(inflater));
            Status::Ok
        });
        self.settle(result)
    }

    /// Start compressing at `level` (0-9, or -1 for the default).
    pub fn deflate_init(&mut self, level: i32) -> Status {
        let result = CompressionLevel::from_signed(level).map(DeflateConfig::new);
        match result {
            Ok(config) => self.deflate_init_with(config),
            Err(err) => self.settle(Err(err)),
        }
    }

    /// Start compressing with every parameter spelled out.
    pub fn deflate_init2(
        &mut self,
        level: i32,
        method: i32,
        window_bits: i32,
        mem_level: i32,
        strategy: i32,
    ) -> Status {
        let config = deflate_config(level, method, window_bits, mem_level, strategy);
        match config {
            Ok(config) => self.deflate_init_with(config),
            Err(err) => self.settle(Err(err)),
        }
    }

    /// Start compressing with the given configuration.
    pub fn deflate_init_with(&mut self, config: DeflateConfig) -> Status {
        self.msg = None;
        let result = Deflater::with_config(config).map(|deflater| {
            self.codec = Codec::Deflate(Box::new(deflater));
            Status::Ok
        });
        self.settle(result)
    }

    /// Decompress as much as the buffers allow.
    ///
    /// Returns `StreamEnd` once the final block has been decoded and all of
    /// its output delivered, `Ok` after any progress, and `BufError` when no
    /// progress was possible.
    pub fn inflate(&mut self, io: &mut StreamIo<'_, '_>) -> Status {
        let Codec::Inflate(inflater) = &mut self.codec else {
            return self.settle(Err(ZStreamError::stream_misuse(
                "stream is not initialized for decompression",
            )));
        };

        let (in_before, out_before) = (inflater.total_in(), inflater.total_out());
        let result = inflater.decompress(io.next_in, io.next_out);
        let consumed = (inflater.total_in() - in_before) as usize;
        let produced = (inflater.total_out() - out_before) as usize;
        io.advance(consumed, produced);

        let result = result.map(|(_, _, status)| match status {
            DecompressStatus::Done => Status::StreamEnd,
            _ if consumed > 0 || produced > 0 => Status::Ok,
            _ => Status::BufError,
        });
        self.settle(result)
    }

    /// Compress as much as the buffers allow, honouring `flush`.
    ///
    /// Returns `StreamEnd` once `Finish` has been honoured and all output
    /// delivered, `Ok` after any progress, and `BufError` when no progress
    /// was possible.
    pub fn deflate(&mut self, io: &mut StreamIo<'_, '_>, flush: FlushMode) -> Status {
        let Codec::Deflate(deflater) = &mut self.codec else {
            return self.settle(Err(ZStreamError::stream_misuse(
                "stream is not initialized for compression",
            )));
        };

        let result = deflater
            .compress(io.next_in, io.next_out, flush)
            .map(|(consumed, produced, status)| {
                io.advance(consumed, produced);
                match status {
                    CompressStatus::Done => Status::StreamEnd,
                    _ if consumed > 0 || produced > 0 => Status::Ok,
                    _ => Status::BufError,
                }
            });
        self.settle(result)
    }

    /// Run whichever direction the stream was initialized for.
    ///
    /// `flush` only affects compression.
    pub fn process(&mut self, io: &mut StreamIo<'_, '_>, flush: FlushMode) -> Status {
        match self.direction() {
            Some(Direction::Inflate) => self.inflate(io),
            Some(Direction::Deflate) => self.deflate(io, flush),
            None => self.settle(Err(ZStreamError::stream_misuse(
                "stream is not initialized",
            ))),
        }
    }

    /// Restart decompression from the first block header, keeping the
    /// allocated window.
    pub fn inflate_reset(&mut self) -> Status {
        match &mut self.codec {
            Codec::Inflate(inflater) => {
                inflater.reset();
                self.msg = None;
                Status::Ok
            }
            _ => self.settle(Err(ZStreamError::stream_misuse(
                "stream is not initialized for decompression",
            ))),
        }
    }

    /// Restart compression with the same parameters.
    pub fn deflate_reset(&mut self) -> Status {
        match &mut self.codec {
            Codec::Deflate(deflater) => {
                deflater.reset();
                self.msg = None;
                Status::Ok
            }
            _ => self.settle(Err(ZStreamError::stream_misuse(
                "stream is not initialized for compression",
            ))),
        }
    }

    /// Release the codec state. The stream must be initialized again
    /// before further use.
    pub fn end(&mut self) -> Status {
        match std::mem::take(&mut self.codec) {
            Codec::Idle => self.settle(Err(ZStreamError::stream_misuse(
                "stream is not initialized",
            ))),
            _ => {
                self.msg = None;
                Status::Ok
            }
        }
    }
}

/// Check and narrow the integer parameters of [`Stream::deflate_init2`].
fn deflate_config(
    level: i32,
    method: i32,
    window_bits: i32,
    mem_level: i32,
    strategy: i32,
) -> Result<DeflateConfig> {
    let small = |name: &'static str, value: i32| {
        u8::try_from(value).map_err(|_| ZStreamError::invalid_parameter(name, value))
    };
    Ok(DeflateConfig {
        level: CompressionLevel::from_signed(level)?,
        method: small("method", method)?,
        window_bits: small("window_bits", window_bits)?,
        mem_level: small("mem_level", mem_level)?,
        strategy: Strategy::from_code(strategy)?,
        ..DeflateConfig::DEFAULT
    })
}
