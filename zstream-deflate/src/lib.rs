//! # zstream Deflate
//!
//! Pure Rust streaming implementation of raw DEFLATE (RFC 1951).
//!
//! Decompression is a resumable state machine: input can arrive and output
//! can be drained in pieces of any size, down to one byte, and the result is
//! byte-identical to decoding in a single call.
//!
//! ## Features
//!
//! - **Decompression**: all DEFLATE block types
//!   - Stored (uncompressed) blocks
//!   - Fixed Huffman codes
//!   - Dynamic Huffman codes, decoded through two-level lookup tables
//! - **Compression**: LZ77 + Huffman encoding
//!   - Levels 0-9 and the default, filtered, Huffman-only, RLE and fixed
//!     strategies
//!   - Per-block choice of the smallest block type
//!   - Partial, sync and full flushes
//! - **Sessions**: [`Stream`] with `init → process* → end` and zlib-style
//!   status codes
//! - Window sizes from 256 bytes to 32 KB, CRC-32 or Adler-32 running
//!   checksums
//!
//! ## Example
//!
//! ```rust
//! use zstream_deflate::{deflate, inflate};
//!
//! // Compress data
//! let original = b"Hello, World! Hello, World!";
//! let compressed = deflate(original, 6).unwrap();
//!
//! // Decompress data
//! let decompressed = inflate(&compressed).unwrap();
//! assert_eq!(&decompressed, original);
//! ```
//!
//! ## Compression Levels
//!
//! - Level 0: No compression (stored blocks)
//! - Level 1-3: Fast matching
//! - Level 4-6: Lazy matching (default is 6)
//! - Level 7-9: Best compression (slower)

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod codes;
pub mod config;
pub mod deflate;
pub mod flush;
pub mod huffman;
pub mod inflate;
pub mod lz77;
pub mod stream;
pub mod tables;

// Re-exports
pub use codes::{CodesEngine, CodesOutcome, CodesState};
pub use config::{DeflateConfig, InflateConfig, Strategy};
pub use deflate::{Deflater, deflate, deflate_bound, deflate_with};
pub use flush::{FlushStatus, OutputSink};
pub use huffman::{DecodeTable, HuffmanBuilder, HuffmanCode, TableKind};
pub use inflate::{Inflater, inflate, inflate_with};
pub use lz77::{Lz77Encoder, Lz77Token};
pub use stream::{Direction, Stream, StreamIo};
