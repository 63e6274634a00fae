//! Stream configuration for the decompressor and compressor.

use zstream_core::checksum::ChecksumKind;
use zstream_core::error::{Result, ZStreamError};
use zstream_core::traits::CompressionLevel;

/// The only compression method DEFLATE defines.
pub const DEFLATED: u8 = 8;

/// Smallest accepted `window_bits`.
pub const MIN_WINDOW_BITS: u8 = 8;

/// Largest accepted `window_bits` (32 KB window).
pub const MAX_WINDOW_BITS: u8 = 15;

/// Largest accepted `mem_level`.
pub const MAX_MEM_LEVEL: u8 = 9;

/// Compression strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    /// Normal LZ77 matching.
    #[default]
    Default,
    /// For data with small random variations: short matches are dropped.
    Filtered,
    /// No matching; Huffman coding of literals only.
    HuffmanOnly,
    /// Matches of distance 1 only (run-length encoding).
    Rle,
    /// Never emit dynamic Huffman blocks.
    Fixed,
}

impl Strategy {
    /// Map a zlib-style strategy number (0-4).
    pub fn from_code(code: i32) -> Result<Self> {
        match code {
            0 => Ok(Self::Default),
            1 => Ok(Self::Filtered),
            2 => Ok(Self::HuffmanOnly),
            3 => Ok(Self::Rle),
            4 => Ok(Self::Fixed),
            other => Err(ZStreamError::invalid_parameter("strategy", other)),
        }
    }
}

/// Decompressor parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InflateConfig {
    /// Base-two logarithm of the window size (8-15).
    pub window_bits: u8,
    /// Running checksum kept over the decompressed bytes.
    pub checksum: ChecksumKind,
}

impl InflateConfig {
    /// 32 KB window, CRC-32.
    pub const DEFAULT: Self = Self {
        window_bits: MAX_WINDOW_BITS,
        checksum: ChecksumKind::Crc32,
    };

    /// Create a configuration with the given window size.
    pub fn new(window_bits: u8) -> Self {
        Self {
            window_bits,
            ..Self::DEFAULT
        }
    }

    /// Set the window size.
    pub fn with_window_bits(mut self, window_bits: u8) -> Self {
        self.window_bits = window_bits;
        self
    }

    /// Set the running checksum.
    pub fn with_checksum(mut self, checksum: ChecksumKind) -> Self {
        self.checksum = checksum;
        self
    }

    /// Window size in bytes.
    pub fn window_size(&self) -> usize {
        1 << self.window_bits
    }

    /// Check every parameter is in range.
    pub fn validate(&self) -> Result<()> {
        if !(MIN_WINDOW_BITS..=MAX_WINDOW_BITS).contains(&self.window_bits) {
            return Err(ZStreamError::invalid_parameter(
                "window_bits",
                self.window_bits,
            ));
        }
        Ok(())
    }
}

impl Default for InflateConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Compressor parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeflateConfig {
    /// Compression level (0 stores, 9 searches hardest).
    pub level: CompressionLevel,
    /// Compression method; must be [`DEFLATED`].
    pub method: u8,
    /// Base-two logarithm of the window size (8-15; 8 is treated as 9).
    pub window_bits: u8,
    /// Memory/speed trade-off (1-9); sets the input block size.
    pub mem_level: u8,
    /// Matching strategy.
    pub strategy: Strategy,
    /// Running checksum kept over the uncompressed bytes.
    pub checksum: ChecksumKind,
}

impl DeflateConfig {
    /// Level 6, 32 KB window, memory level 8.
    pub const DEFAULT: Self = Self {
        level: CompressionLevel::DEFAULT,
        method: DEFLATED,
        window_bits: MAX_WINDOW_BITS,
        mem_level: 8,
        strategy: Strategy::Default,
        checksum: ChecksumKind::Crc32,
    };

    /// Fastest matching.
    pub const FAST: Self = Self {
        level: CompressionLevel::FAST,
        ..Self::DEFAULT
    };

    /// Strongest matching.
    pub const BEST: Self = Self {
        level: CompressionLevel::BEST,
        ..Self::DEFAULT
    };

    /// Stored blocks only.
    pub const STORE: Self = Self {
        level: CompressionLevel::NONE,
        ..Self::DEFAULT
    };

    /// Create a configuration with the given level and default parameters.
    pub fn new(level: CompressionLevel) -> Self {
        Self {
            level,
            ..Self::DEFAULT
        }
    }

    /// Set the compression level.
    pub fn with_level(mut self, level: CompressionLevel) -> Self {
        self.level = level;
        self
    }

    /// Set the window size.
    pub fn with_window_bits(mut self, window_bits: u8) -> Self {
        self.window_bits = window_bits;
        self
    }

    /// Set the memory level.
    pub fn with_mem_level(mut self, mem_level: u8) -> Self {
        self.mem_level = mem_level;
        self
    }

    /// Set the matching strategy.
    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Set the running checksum.
    pub fn with_checksum(mut self, checksum: ChecksumKind) -> Self {
        self.checksum = checksum;
        self
    }

    /// Window bits actually used: a 256-byte window is promoted to 512.
    pub fn effective_window_bits(&self) -> u8 {
        self.window_bits.max(MIN_WINDOW_BITS + 1)
    }

    /// Window size in bytes.
    pub fn window_size(&self) -> usize {
        1 << self.effective_window_bits()
    }

    /// Input bytes gathered before a block is emitted.
    pub fn block_size(&self) -> usize {
        1 << (self.mem_level + 7)
    }

    /// Check every parameter is in range.
    pub fn validate(&self) -> Result<()> {
        if self.method != DEFLATED {
            return Err(ZStreamError::invalid_parameter("method", self.method));
        }
        if !(MIN_WINDOW_BITS..=MAX_WINDOW_BITS).contains(&self.window_bits) {
            return Err(ZStreamError::invalid_parameter(
                "window_bits",
                self.window_bits,
            ));
        }
        if !(1..=MAX_MEM_LEVEL).contains(&self.mem_level) {
            return Err(ZStreamError::invalid_parameter("mem_level", self.mem_level));
        }
        Ok(())
    }
}

impl Default for DeflateConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
