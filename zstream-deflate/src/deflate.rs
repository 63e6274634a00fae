//! DEFLATE compression.
//!
//! This module implements DEFLATE compression as specified in RFC 1951.
//! Every block is written as whichever of the three block types is
//! smallest for its contents:
//! - Stored blocks (no compression)
//! - Fixed Huffman codes
//! - Dynamic Huffman codes
//!
//! [`Deflater`] is streaming: input is gathered into blocks of
//! `1 << (mem_level + 7)` bytes, each full block is tokenized and encoded,
//! and the encoded bytes wait in a pending buffer until the caller offers
//! output space.

use crate::config::{DeflateConfig, Strategy};
use crate::huffman::{
    CODELEN_ALPHABET_SIZE, DISTANCE_ALPHABET_SIZE, END_OF_BLOCK, HuffmanBuilder, HuffmanCode,
    LITLEN_ALPHABET_SIZE, MAX_CODELEN_LENGTH, MAX_CODE_LENGTH,
};
use crate::lz77::{Lz77Encoder, Lz77Token};
use crate::tables::{
    CODE_LENGTH_ORDER, distance_to_code, fixed_distance_code, fixed_litlen_code, length_to_code,
};
use zstream_core::bitstream::BitWriter;
use zstream_core::checksum::Checksum;
use zstream_core::error::Result;
use zstream_core::traits::{CompressStatus, CompressionLevel, Compressor, FlushMode};

/// Largest payload of one stored block.
pub const MAX_STORED_BLOCK: usize = 65535;

/// Block type field values.
const BTYPE_STORED: u32 = 0b00;
const BTYPE_FIXED: u32 = 0b01;
const BTYPE_DYNAMIC: u32 = 0b10;

/// One code length alphabet symbol with its extra bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CodeLengthSymbol {
    symbol: u8,
    extra_bits: u8,
    extra: u8,
}

impl CodeLengthSymbol {
    fn plain(symbol: u8) -> Self {
        Self {
            symbol,
            extra_bits: 0,
            extra: 0,
        }
    }

    fn repeat(symbol: u8, extra_bits: u8, extra: usize) -> Self {
        Self {
            symbol,
            extra_bits,
            extra: extra as u8,
        }
    }
}

/// Run-length encode code lengths with symbols 16 (repeat previous
/// 3-6 times), 17 (3-10 zeros) and 18 (11-138 zeros).
fn rle_encode_lengths(lengths: &[u8]) -> Vec<CodeLengthSymbol> {
    let mut symbols = Vec::with_capacity(lengths.len());
    let mut i = 0;

    while i < lengths.len() {
        let len = lengths[i];
        let run = lengths[i..].iter().take_while(|&&l| l == len).count();
        i += run;

        if len == 0 {
            let mut left = run;
            while left >= 11 {
                let chunk = left.min(138);
                symbols.push(CodeLengthSymbol::repeat(18, 7, chunk - 11));
                left -= chunk;
            }
            if left >= 3 {
                symbols.push(CodeLengthSymbol::repeat(17, 3, left - 3));
                left = 0;
            }
            symbols.extend(std::iter::repeat_n(CodeLengthSymbol::plain(0), left));
        } else {
            symbols.push(CodeLengthSymbol::plain(len));
            let mut left = run - 1;
            while left >= 3 {
                let chunk = left.min(6);
                symbols.push(CodeLengthSymbol::repeat(16, 2, chunk - 3));
                left -= chunk;
            }
            symbols.extend(std::iter::repeat_n(CodeLengthSymbol::plain(len), left));
        }
    }

    symbols
}

/// Number of leading entries to transmit: up to the last non-zero one, but
/// never fewer than `min`.
fn trimmed_len(lengths: &[u8], min: usize) -> usize {
    lengths
        .iter()
        .rposition(|&len| len != 0)
        .map_or(min, |last| (last + 1).max(min))
}

/// Symbol statistics of one block.
struct BlockStats {
    litlen: [u32; LITLEN_ALPHABET_SIZE],
    distance: [u32; DISTANCE_ALPHABET_SIZE],
    /// Length and distance extra bits, the same under every code.
    extra_bits: u64,
}

impl BlockStats {
    fn gather(tokens: &[Lz77Token]) -> Self {
        let mut stats = Self {
            litlen: [0; LITLEN_ALPHABET_SIZE],
            distance: [0; DISTANCE_ALPHABET_SIZE],
            extra_bits: 0,
        };
        for token in tokens {
            match *token {
                Lz77Token::Literal(byte) => stats.litlen[byte as usize] += 1,
                Lz77Token::Match { length, distance } => {
                    let (code, bits, _) = length_to_code(length);
                    stats.litlen[code as usize] += 1;
                    let (code, dist_bits, _) = distance_to_code(distance);
                    stats.distance[code as usize] += 1;
                    stats.extra_bits += bits as u64 + dist_bits as u64;
                }
            }
        }
        stats.litlen[END_OF_BLOCK as usize] += 1;
        stats
    }
}

/// A fully planned dynamic block header.
struct DynamicCodes {
    litlen: HuffmanCode,
    distance: HuffmanCode,
    codelen: HuffmanCode,
    hlit: usize,
    hdist: usize,
    hclen: usize,
    rle: Vec<CodeLengthSymbol>,
}

impl DynamicCodes {
    fn plan(stats: &BlockStats) -> Self {
        let mut litlen_builder = HuffmanBuilder::new(LITLEN_ALPHABET_SIZE, MAX_CODE_LENGTH as u8);
        for (symbol, &count) in stats.litlen.iter().enumerate() {
            litlen_builder.add_count(symbol as u16, count);
        }
        let litlen_lengths = litlen_builder.build_lengths();

        let mut dist_builder = HuffmanBuilder::new(DISTANCE_ALPHABET_SIZE, MAX_CODE_LENGTH as u8);
        for (symbol, &count) in stats.distance.iter().enumerate() {
            dist_builder.add_count(symbol as u16, count);
        }
        let dist_lengths = dist_builder.build_lengths();

        let hlit = trimmed_len(&litlen_lengths, 257);
        let hdist = trimmed_len(&dist_lengths, 1);

        let mut combined = Vec::with_capacity(hlit + hdist);
        combined.extend_from_slice(&litlen_lengths[..hlit]);
        combined.extend_from_slice(&dist_lengths[..hdist]);
        let rle = rle_encode_lengths(&combined);

        let mut codelen_builder = HuffmanBuilder::new(CODELEN_ALPHABET_SIZE, MAX_CODELEN_LENGTH);
        for entry in &rle {
            codelen_builder.add(entry.symbol as u16);
        }
        let codelen_lengths = codelen_builder.build_lengths();

        let in_order: Vec<u8> = CODE_LENGTH_ORDER
            .iter()
            .map(|&symbol| codelen_lengths[symbol])
            .collect();
        let hclen = trimmed_len(&in_order, 4);

        Self {
            litlen: HuffmanCode::from_lengths(&litlen_lengths),
            distance: HuffmanCode::from_lengths(&dist_lengths),
            codelen: HuffmanCode::from_lengths(&codelen_lengths),
            hlit,
            hdist,
            hclen,
            rle,
        }
    }

    /// Exact size in bits of the header and data, including the block header.
    fn cost(&self, stats: &BlockStats) -> u64 {
        let rle_bits: u64 = self
            .rle
            .iter()
            .map(|entry| {
                self.codelen.length(entry.symbol as usize) as u64 + entry.extra_bits as u64
            })
            .sum();
        3 + 5 + 5 + 4
            + 3 * self.hclen as u64
            + rle_bits
            + self.litlen.cost(&stats.litlen)
            + self.distance.cost(&stats.distance)
            + stats.extra_bits
    }
}

/// Exact size in bits of the fixed-code encoding, including the block header.
fn fixed_cost(stats: &BlockStats) -> u64 {
    3 + fixed_litlen_code().cost(&stats.litlen)
        + fixed_distance_code().cost(&stats.distance)
        + stats.extra_bits
}

/// Exact size in bits of `len` bytes as stored blocks, starting with
/// `pending_bits` bits already in the current byte.
fn stored_cost(len: usize, pending_bits: u8) -> u64 {
    let pieces = len.div_ceil(MAX_STORED_BLOCK).max(1) as u64;
    let first_pad = (8 - (pending_bits as u64 + 3) % 8) % 8;
    // Later pieces start byte-aligned: 3 header bits plus 5 of padding.
    pieces * (3 + 32) + first_pad + (pieces - 1) * 5 + 8 * len as u64
}

/// Compressor lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeflateState {
    /// Accepting input.
    Running,
    /// Final block written; draining pending output.
    Finished,
}

/// DEFLATE compressor.
#[derive(Debug)]
pub struct Deflater {
    config: DeflateConfig,
    /// LZ77 encoder, holding match history across blocks.
    lz77: Lz77Encoder,
    /// Input gathered for the next block.
    block: Vec<u8>,
    /// Encoded output; whole bytes wait in the inner buffer.
    writer: BitWriter<Vec<u8>>,
    /// Bytes of the inner buffer already handed to the caller.
    delivered: usize,
    /// Running checksum of the uncompressed input.
    checksum: Checksum,
    /// Input accepted since the last block or flush marker.
    dirty: bool,
    state: DeflateState,
    total_in: u64,
    total_out: u64,
}

impl Deflater {
    /// Create a new DEFLATE compressor with the specified level (0-9).
    pub fn new(level: u8) -> Result<Self> {
        Self::with_config(DeflateConfig::new(CompressionLevel::new(level)))
    }

    /// Create a compressor with the given configuration.
    pub fn with_config(config: DeflateConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            lz77: Lz77Encoder::with_params(
                config.window_size(),
                config.level.level(),
                config.strategy,
            ),
            block: Vec::with_capacity(config.block_size()),
            writer: BitWriter::new(Vec::new()),
            delivered: 0,
            checksum: Checksum::new(config.checksum),
            dirty: false,
            state: DeflateState::Running,
            total_in: 0,
            total_out: 0,
            config,
        })
    }

    /// Configuration in use.
    pub fn config(&self) -> &DeflateConfig {
        &self.config
    }

    /// Uncompressed bytes accepted since creation or reset.
    pub fn total_in(&self) -> u64 {
        self.total_in
    }

    /// Compressed bytes delivered since creation or reset.
    pub fn total_out(&self) -> u64 {
        self.total_out
    }

    /// Running checksum of the accepted input.
    pub fn checksum(&self) -> u32 {
        self.checksum.value()
    }

    /// Encoded bytes waiting for output space.
    pub fn pending(&self) -> usize {
        self.writer.get_ref().len() - self.delivered
    }

    /// Reset the compressor.
    pub fn reset(&mut self) {
        self.lz77.reset();
        self.block.clear();
        self.writer = BitWriter::new(Vec::new());
        self.delivered = 0;
        self.checksum.reset();
        self.dirty = false;
        self.state = DeflateState::Running;
        self.total_in = 0;
        self.total_out = 0;
    }

    /// Copy pending bytes into `output`, returning how many were copied.
    fn drain_pending(&mut self, output: &mut [u8]) -> usize {
        let buffer = self.writer.get_mut();
        let n = (buffer.len() - self.delivered).min(output.len());
        output[..n].copy_from_slice(&buffer[self.delivered..self.delivered + n]);
        self.delivered += n;
        if self.delivered == buffer.len() {
            buffer.clear();
            self.delivered = 0;
        }
        n
    }

    /// Encode the gathered input as one or more blocks.
    fn emit_block(&mut self, is_final: bool) -> Result<()> {
        let data = std::mem::take(&mut self.block);

        if self.config.level.level() == 0 {
            self.write_stored_blocks(&data, is_final)?;
        } else {
            let tokens = self.lz77.compress(&data);
            let stats = BlockStats::gather(&tokens);

            let stored = stored_cost(data.len(), self.writer.pending_bits());
            let fixed = fixed_cost(&stats);
            let dynamic = (self.config.strategy != Strategy::Fixed).then(|| {
                let codes = DynamicCodes::plan(&stats);
                let cost = codes.cost(&stats);
                (codes, cost)
            });

            match dynamic {
                Some((codes, cost)) if cost < fixed && cost < stored => {
                    self.write_dynamic_block(&tokens, &codes, is_final)?;
                }
                _ if stored < fixed => self.write_stored_blocks(&data, is_final)?,
                _ => self.write_fixed_block(&tokens, is_final)?,
            }
        }

        self.block = data;
        self.block.clear();
        Ok(())
    }

    /// Write stored (uncompressed) blocks; an empty final block when there
    /// is no data.
    fn write_stored_blocks(&mut self, data: &[u8], is_final: bool) -> Result<()> {
        if data.is_empty() {
            if is_final {
                self.write_stored_header(0, true)?;
            }
            return Ok(());
        }

        let mut chunks = data.chunks(MAX_STORED_BLOCK).peekable();
        while let Some(chunk) = chunks.next() {
            let last = is_final && chunks.peek().is_none();
            self.write_stored_header(chunk.len(), last)?;
            self.writer.write_bytes(chunk)?;
        }
        Ok(())
    }

    fn write_stored_header(&mut self, len: usize, is_final: bool) -> Result<()> {
        let len = len as u16;
        self.writer.write_bit(is_final)?;
        self.writer.write_bits(BTYPE_STORED, 2)?;
        self.writer.align_to_byte()?;
        self.writer.write_bits(len as u32, 16)?;
        self.writer.write_bits(!len as u32, 16)
    }

    /// Write a block using fixed Huffman codes.
    fn write_fixed_block(&mut self, tokens: &[Lz77Token], is_final: bool) -> Result<()> {
        self.writer.write_bit(is_final)?;
        self.writer.write_bits(BTYPE_FIXED, 2)?;
        write_tokens(
            &mut self.writer,
            tokens,
            fixed_litlen_code(),
            fixed_distance_code(),
        )
    }

    /// Write a block using dynamic Huffman codes.
    fn write_dynamic_block(
        &mut self,
        tokens: &[Lz77Token],
        codes: &DynamicCodes,
        is_final: bool,
    ) -> Result<()> {
        let writer = &mut self.writer;
        writer.write_bit(is_final)?;
        writer.write_bits(BTYPE_DYNAMIC, 2)?;
        writer.write_bits((codes.hlit - 257) as u32, 5)?;
        writer.write_bits((codes.hdist - 1) as u32, 5)?;
        writer.write_bits((codes.hclen - 4) as u32, 4)?;

        for &symbol in &CODE_LENGTH_ORDER[..codes.hclen] {
            writer.write_bits(codes.codelen.length(symbol) as u32, 3)?;
        }
        for entry in &codes.rle {
            codes.codelen.write_symbol(writer, entry.symbol as usize)?;
            writer.write_bits(entry.extra as u32, entry.extra_bits)?;
        }

        write_tokens(writer, tokens, &codes.litlen, &codes.distance)
    }

    /// An empty fixed block: 10 bits that push the previous block's last
    /// code out to whole bytes.
    fn write_partial_flush(&mut self) -> Result<()> {
        self.writer.write_bit(false)?;
        self.writer.write_bits(BTYPE_FIXED, 2)?;
        fixed_litlen_code().write_symbol(&mut self.writer, END_OF_BLOCK as usize)
    }

    /// Act on `flush` once all input of this call is buffered.
    fn apply_flush(&mut self, flush: FlushMode) -> Result<()> {
        match flush {
            FlushMode::NoFlush => {}
            FlushMode::PartialFlush | FlushMode::SyncFlush | FlushMode::FullFlush => {
                if !self.dirty {
                    return Ok(());
                }
                if !self.block.is_empty() {
                    self.emit_block(false)?;
                }
                if flush == FlushMode::PartialFlush {
                    self.write_partial_flush()?;
                } else {
                    self.write_stored_header(0, false)?;
                }
                if flush == FlushMode::FullFlush {
                    self.lz77.reset_history();
                }
                self.dirty = false;
            }
            FlushMode::Finish => {
                self.emit_block(true)?;
                self.writer.flush()?;
                self.state = DeflateState::Finished;
            }
        }
        Ok(())
    }
}

/// Write literal/length and distance symbols for `tokens`, then
/// end-of-block.
fn write_tokens(
    writer: &mut BitWriter<Vec<u8>>,
    tokens: &[Lz77Token],
    litlen: &HuffmanCode,
    distance: &HuffmanCode,
) -> Result<()> {
    for token in tokens {
        match *token {
            Lz77Token::Literal(byte) => litlen.write_symbol(writer, byte as usize)?,
            Lz77Token::Match {
                length,
                distance: dist,
            } => {
                let (code, bits, extra) = length_to_code(length);
                litlen.write_symbol(writer, code as usize)?;
                writer.write_bits(extra as u32, bits)?;

                let (code, bits, extra) = distance_to_code(dist);
                distance.write_symbol(writer, code as usize)?;
                writer.write_bits(extra as u32, bits)?;
            }
        }
    }
    litlen.write_symbol(writer, END_OF_BLOCK as usize)
}

impl Compressor for Deflater {
    fn compress(
        &mut self,
        input: &[u8],
        output: &mut [u8],
        flush: FlushMode,
    ) -> Result<(usize, usize, CompressStatus)> {
        let mut consumed = 0;
        let mut produced = self.drain_pending(output);

        if self.state == DeflateState::Running {
            let block_size = self.config.block_size();
            while consumed < input.len() && self.pending() == 0 {
                let take = (block_size - self.block.len()).min(input.len() - consumed);
                let chunk = &input[consumed..consumed + take];
                self.block.extend_from_slice(chunk);
                self.checksum.update(chunk);
                consumed += take;
                self.dirty = true;

                if self.block.len() == block_size {
                    self.emit_block(false)?;
                }
                produced += self.drain_pending(&mut output[produced..]);
            }

            if consumed == input.len() {
                self.apply_flush(flush)?;
                produced += self.drain_pending(&mut output[produced..]);
            }
        }

        self.total_in += consumed as u64;
        self.total_out += produced as u64;

        let status = if self.pending() > 0 {
            CompressStatus::NeedsOutput
        } else if self.state == DeflateState::Finished {
            CompressStatus::Done
        } else {
            CompressStatus::NeedsInput
        };
        Ok((consumed, produced, status))
    }

    fn reset(&mut self) {
        Deflater::reset(self);
    }

    fn is_finished(&self) -> bool {
        self.state == DeflateState::Finished && self.pending() == 0
    }
}

/// Compress data using DEFLATE at the given level.
pub fn deflate(data: &[u8], level: u8) -> Result<Vec<u8>> {
    let mut deflater = Deflater::new(level)?;
    deflater.compress_all(data)
}

/// Compress data using DEFLATE with a custom configuration.
pub fn deflate_with(data: &[u8], config: DeflateConfig) -> Result<Vec<u8>> {
    let mut deflater = Deflater::with_config(config)?;
    deflater.compress_all(data)
}

/// Upper bound on the compressed size of `len` bytes under any
/// configuration.
///
/// Covers the worst case of stored blocks of the smallest block size plus
/// the final empty block and marker bytes.
pub fn deflate_bound(len: usize) -> usize {
    let min_block = 1 << 8;
    len + 5 * len.div_ceil(min_block).max(1) + 16
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InflateConfig;
    use crate::inflate::{Inflater, inflate, inflate_with};
    use zstream_core::crc::Crc32;
    use zstream_core::traits::Decompressor;

    fn lcg_text(len: usize) -> Vec<u8> {
        let words: [&[u8]; 8] = [
            b"stream ", b"window ", b"block ", b"huffman ", b"code ", b"length ", b"bits ",
            b"\n",
        ];
        let mut state = 42u32;
        let mut out = Vec::with_capacity(len);
        while out.len() < len {
            state = state.wrapping_mul(1103515245).wrapping_add(12345);
            out.extend_from_slice(words[(state >> 16) as usize % words.len()]);
        }
        out.truncate(len);
        out
    }

    #[test]
    fn test_deflate_stored() {
        let compressed = deflate(b"AAAAAAAAAA", 0).unwrap();
        assert_eq!(&compressed[..5], &[0x01, 0x0A, 0x00, 0xF5, 0xFF]);
        assert_eq!(&compressed[5..], b"AAAAAAAAAA");
        assert_eq!(inflate(&compressed).unwrap(), b"AAAAAAAAAA");
    }

    #[test]
    fn test_deflate_empty() {
        assert_eq!(deflate(b"", 0).unwrap(), vec![0x01, 0x00, 0x00, 0xFF, 0xFF]);
        assert_eq!(deflate(b"", 6).unwrap(), vec![0x03, 0x00]);
        assert!(inflate(&deflate(b"", 9).unwrap()).unwrap().is_empty());
    }

    #[test]
    fn test_deflate_single_literal_matches_reference() {
        assert_eq!(deflate(b"a", 6).unwrap(), vec![0x4B, 0x04, 0x00]);
    }

    #[test]
    fn test_deflate_compressed() {
        let input = b"AAAAAAAAAABBBBBBBBBBCCCCCCCCCC";
        let compressed = deflate(input, 6).unwrap();
        assert!(
            compressed.len() < input.len(),
            "Compressed {} bytes to {} bytes",
            input.len(),
            compressed.len()
        );
        assert_eq!(inflate(&compressed).unwrap(), input);
    }

    #[test]
    fn test_deflate_roundtrip_levels() {
        let inputs = [
            b"Hello".to_vec(),
            b"The quick brown fox jumps over the lazy dog".to_vec(),
            vec![0u8; 1000],
            (0..=255).collect::<Vec<u8>>(),
            lcg_text(100_000),
        ];

        for input in &inputs {
            for level in 0..=9 {
                let compressed = deflate(input, level).unwrap();
                let decompressed = inflate(&compressed).unwrap();
                assert_eq!(
                    &decompressed,
                    input,
                    "Roundtrip failed for level {} with {} bytes",
                    level,
                    input.len()
                );
            }
        }
    }

    #[test]
    fn test_dynamic_beats_fixed_on_text() {
        let input = lcg_text(20_000);
        let dynamic = deflate(&input, 9).unwrap();
        let fixed = deflate_with(
            &input,
            DeflateConfig::BEST.with_strategy(Strategy::Fixed),
        )
        .unwrap();
        assert!(dynamic.len() < fixed.len());
        assert_eq!(inflate(&fixed).unwrap(), input);
    }

    #[test]
    fn test_fixed_strategy_block_type() {
        let compressed = deflate_with(
            b"fixed codes only, fixed codes only",
            DeflateConfig::DEFAULT.with_strategy(Strategy::Fixed),
        )
        .unwrap();
        // BFINAL=1, BTYPE=01
        assert_eq!(compressed[0] & 0b111, 0b011);
    }

    #[test]
    fn test_incompressible_data_is_stored() {
        let mut state = 7u32;
        let input: Vec<u8> = (0..4096)
            .map(|_| {
                state = state.wrapping_mul(1664525).wrapping_add(1013904223);
                (state >> 24) as u8
            })
            .collect();
        let compressed = deflate(&input, 6).unwrap();
        assert!(compressed.len() <= input.len() + 5);
        assert_eq!(inflate(&compressed).unwrap(), input);
    }

    #[test]
    fn test_window_sizes() {
        let input = lcg_text(50_000);
        for bits in [9u8, 12, 15] {
            let config = DeflateConfig::DEFAULT.with_window_bits(bits);
            let compressed = deflate_with(&input, config).unwrap();
            let decompressed = inflate_with(&compressed, InflateConfig::new(bits)).unwrap();
            assert_eq!(decompressed, input, "window bits {}", bits);
        }
    }

    #[test]
    fn test_rle_lengths_long_runs() {
        let mut lengths = vec![0u8; 200];
        lengths.extend(std::iter::repeat_n(5u8, 20));
        lengths.push(3);

        let rle = rle_encode_lengths(&lengths);
        let mut expanded = Vec::new();
        for entry in &rle {
            match entry.symbol {
                16 => {
                    let prev = *expanded.last().unwrap();
                    expanded.extend(std::iter::repeat_n(prev, 3 + entry.extra as usize));
                }
                17 => expanded.extend(std::iter::repeat_n(0, 3 + entry.extra as usize)),
                18 => expanded.extend(std::iter::repeat_n(0, 11 + entry.extra as usize)),
                len => expanded.push(len),
            }
        }
        assert_eq!(expanded, lengths);
    }

    #[test]
    fn test_stored_cost() {
        assert_eq!(stored_cost(0, 0), 40);
        assert_eq!(stored_cost(10, 0), 40 + 80);
        assert_eq!(stored_cost(10, 6), 3 + 7 + 32 + 80);
        assert_eq!(
            stored_cost(MAX_STORED_BLOCK + 1, 0),
            2 * 40 + 8 * (MAX_STORED_BLOCK as u64 + 1)
        );
    }

    #[test]
    fn test_streaming_small_buffers() {
        let input = lcg_text(30_000);
        let config = DeflateConfig::DEFAULT.with_mem_level(1);
        let mut deflater = Deflater::with_config(config).unwrap();
        let mut compressed = Vec::new();
        let mut pos = 0;

        loop {
            let end = (pos + 100).min(input.len());
            let flush = if end == input.len() {
                FlushMode::Finish
            } else {
                FlushMode::NoFlush
            };
            let mut out = [0u8; 7];
            let (consumed, produced, status) =
                deflater.compress(&input[pos..end], &mut out, flush).unwrap();
            pos += consumed;
            compressed.extend_from_slice(&out[..produced]);
            if status == CompressStatus::Done {
                break;
            }
        }

        assert!(deflater.is_finished());
        assert_eq!(deflater.total_in(), input.len() as u64);
        assert_eq!(deflater.total_out(), compressed.len() as u64);
        assert_eq!(deflater.checksum(), Crc32::compute(&input));
        assert_eq!(inflate(&compressed).unwrap(), input);
    }

    #[test]
    fn test_sync_flush_marker() {
        let mut deflater = Deflater::new(6).unwrap();
        let mut out = vec![0u8; 1024];
        let (consumed, produced, status) = deflater
            .compress(b"hello hello hello", &mut out, FlushMode::SyncFlush)
            .unwrap();
        assert_eq!(consumed, 17);
        assert_eq!(status, CompressStatus::NeedsInput);
        assert_eq!(&out[produced - 4..produced], &[0x00, 0x00, 0xFF, 0xFF]);

        // Everything so far decodes without the end of the stream.
        let mut inflater = Inflater::new().unwrap();
        let mut decoded = [0u8; 64];
        let (_, n, _) = inflater.decompress(&out[..produced], &mut decoded).unwrap();
        assert_eq!(&decoded[..n], b"hello hello hello");

        // A repeated flush with no new input adds nothing.
        let (_, again, _) = deflater
            .compress(b"", &mut out, FlushMode::SyncFlush)
            .unwrap();
        assert_eq!(again, 0);
    }

    #[test]
    fn test_full_flush_allows_restart() {
        let mut deflater = Deflater::new(6).unwrap();
        let mut first = vec![0u8; 1024];
        let (_, n1, _) = deflater
            .compress(b"abcdefgh abcdefgh", &mut first, FlushMode::FullFlush)
            .unwrap();
        let mut second = vec![0u8; 1024];
        let (_, n2, status) = deflater
            .compress(b"abcdefgh abcdefgh", &mut second, FlushMode::Finish)
            .unwrap();
        assert_eq!(status, CompressStatus::Done);

        // The part after the marker decodes on its own.
        assert_eq!(inflate(&second[..n2]).unwrap(), b"abcdefgh abcdefgh");

        let mut whole = first[..n1].to_vec();
        whole.extend_from_slice(&second[..n2]);
        assert_eq!(inflate(&whole).unwrap(), b"abcdefgh abcdefgh".repeat(2));
    }

    #[test]
    fn test_partial_flush() {
        let mut deflater = Deflater::new(6).unwrap();
        let mut out = vec![0u8; 1024];
        let (_, n1, _) = deflater
            .compress(b"partial", &mut out, FlushMode::PartialFlush)
            .unwrap();
        let (_, n2, _) = deflater
            .compress(b" flush", &mut out[n1..], FlushMode::Finish)
            .unwrap();
        assert_eq!(inflate(&out[..n1 + n2]).unwrap(), b"partial flush");
    }

    #[test]
    fn test_done_is_sticky() {
        let mut deflater = Deflater::new(1).unwrap();
        let compressed = deflater.compress_all(b"data").unwrap();
        let mut out = [0u8; 16];
        let (consumed, produced, status) =
            deflater.compress(b"more", &mut out, FlushMode::Finish).unwrap();
        assert_eq!((consumed, produced, status), (0, 0, CompressStatus::Done));

        deflater.reset();
        assert_eq!(deflater.compress_all(b"data").unwrap(), compressed);
    }

    #[test]
    fn test_deflate_bound() {
        for len in [0usize, 1, 255, 256, 10_000] {
            let data = vec![0xA5u8; len];
            assert!(deflate(&data, 0).unwrap().len() <= deflate_bound(len));
        }
    }
}
