//! # ZStream Core
//!
//! Core components for the ZStream DEFLATE codec.
//!
//! This crate provides the building blocks the codec engines share:
//!
//! - [`bitstream`]: Resumable bit input and packed bit output
//! - [`window`]: Sliding window that doubles as the pending-output buffer
//! - [`crc`]: CRC-32 over the uncompressed stream
//! - [`checksum`]: Adler-32 and the selectable running checksum
//! - [`traits`]: Status codes, flush modes, codec traits
//! - [`error`]: Error types
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ L3: Stream session                                      │
//! │     init / process / end, totals, status codes          │
//! ├─────────────────────────────────────────────────────────┤
//! │ L2: Codec                                               │
//! │     Inflater (block driver + codes engine), Deflater    │
//! ├─────────────────────────────────────────────────────────┤
//! │ L1: Primitives (this crate)                             │
//! │     BitInput/BitWriter, Window, CRC-32, Adler-32        │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use zstream_core::bitstream::{BitInput, BitState};
//! use zstream_core::crc::Crc32;
//!
//! // Read bits from data
//! let data = [0xAB, 0xCD];
//! let mut input = BitInput::resume(&data, BitState::default(), 0);
//! assert!(input.ensure(12));
//! assert_eq!(input.take(12), 0xDAB);
//!
//! // Compute CRC-32
//! let crc = Crc32::compute(b"Hello, World!");
//! assert_eq!(crc, 0xEC4AC3D0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod bitstream;
pub mod checksum;
pub mod crc;
pub mod error;
pub mod traits;
pub mod window;

// Re-exports for convenience
pub use bitstream::{BitInput, BitState, BitWriter};
pub use checksum::{Adler32, Checksum, ChecksumKind};
pub use crc::Crc32;
pub use error::{Result, ZStreamError};
pub use traits::{
    CompressStatus, CompressionLevel, Compressor, DecompressStatus, Decompressor, FlushMode,
    Status,
};
pub use window::{DEFLATE_WINDOW, Window};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::checksum::{Checksum, ChecksumKind};
    pub use crate::crc::Crc32;
    pub use crate::error::{Result, ZStreamError};
    pub use crate::traits::{CompressionLevel, Compressor, Decompressor, FlushMode, Status};
    pub use crate::window::Window;
}
