//! DEFLATE decompression (inflate).
//!
//! This module implements the DEFLATE decompression algorithm as specified
//! in RFC 1951. It supports all three block types:
//! - Type 0: Stored (uncompressed)
//! - Type 1: Fixed Huffman codes
//! - Type 2: Dynamic Huffman codes
//!
//! [`Inflater`] is fully incremental. Each call to
//! [`Decompressor::decompress`] runs the block state machine until it needs
//! more input or more output space, then returns. Input may arrive one byte
//! at a time and output may be drained one byte at a time; the decoded bytes
//! are identical either way.

use crate::codes::{CodesEngine, CodesOutcome, make_room};
use crate::config::InflateConfig;
use crate::flush::OutputSink;
use crate::huffman::{
    CODELEN_ALPHABET_SIZE, DISTANCE_ALPHABET_SIZE, DecodeTable, END_OF_BLOCK,
    LITLEN_ALPHABET_SIZE, Op, TableKind,
};
use crate::tables::CODE_LENGTH_ORDER;
use zstream_core::bitstream::{BitInput, BitState};
use zstream_core::checksum::Checksum;
use zstream_core::error::{Result, ZStreamError};
use zstream_core::traits::{DecompressStatus, Decompressor};
use zstream_core::window::Window;

/// Position within the block structure of the stream.
#[derive(Debug)]
enum BlockState {
    /// Reading the 3-bit block header.
    Type,
    /// Reading LEN/NLEN of a stored block.
    StoredLens,
    /// Copying a stored block.
    Stored { remaining: usize },
    /// Reading HLIT/HDIST/HCLEN of a dynamic block.
    Table,
    /// Reading the 3-bit code length code lengths.
    BitLengths { index: usize },
    /// Decoding the literal/length and distance code lengths.
    CodeLengths { index: usize, table: DecodeTable },
    /// Decoding a Huffman-coded block.
    Codes(CodesEngine),
    /// Final block done; draining the window.
    Dry,
    /// Stream complete.
    Done,
    /// Corrupt stream; every further call fails.
    Bad { offset: u64, message: String },
}

/// Dynamic block header fields, kept across suspensions.
#[derive(Debug)]
struct DynamicHeader {
    hlit: usize,
    hdist: usize,
    hclen: usize,
    code_lengths: [u8; CODELEN_ALPHABET_SIZE],
    lengths: [u8; LITLEN_ALPHABET_SIZE + DISTANCE_ALPHABET_SIZE],
}

impl DynamicHeader {
    fn new() -> Self {
        Self {
            hlit: 0,
            hdist: 0,
            hclen: 0,
            code_lengths: [0; CODELEN_ALPHABET_SIZE],
            lengths: [0; LITLEN_ALPHABET_SIZE + DISTANCE_ALPHABET_SIZE],
        }
    }
}

/// Block-level state machine.
#[derive(Debug)]
struct BlockDriver {
    state: BlockState,
    /// The block being decoded carries the final-block flag.
    last: bool,
    blocks: u64,
    /// Return at every non-final block boundary.
    stop_at_block: bool,
    header: DynamicHeader,
}

impl BlockDriver {
    fn new() -> Self {
        Self {
            state: BlockState::Type,
            last: false,
            blocks: 0,
            stop_at_block: false,
            header: DynamicHeader::new(),
        }
    }

    fn reset(&mut self) {
        self.state = BlockState::Type;
        self.last = false;
        self.blocks = 0;
    }

    /// Enter the failed state, remembering why.
    fn fail(&mut self, offset: u64, error: ZStreamError) -> ZStreamError {
        let message = match &error {
            ZStreamError::CorruptedData { message, .. } => message.clone(),
            other => other.to_string(),
        };
        self.state = BlockState::Bad { offset, message };
        error
    }

    fn corrupt(&mut self, input: &BitInput<'_>, message: &str) -> ZStreamError {
        let offset = input.offset();
        self.fail(offset, ZStreamError::corrupted(offset, message))
    }

    /// Move past a finished block. Returns `true` when the caller asked to
    /// stop at this boundary.
    fn end_block(&mut self) -> bool {
        self.blocks += 1;
        if self.last {
            self.state = BlockState::Dry;
            return false;
        }
        self.state = BlockState::Type;
        self.stop_at_block
    }

    /// Run until done or out of input or output space.
    fn step(
        &mut self,
        input: &mut BitInput<'_>,
        window: &mut Window,
        sink: &mut OutputSink<'_, '_>,
    ) -> Result<DecompressStatus> {
        loop {
            match &mut self.state {
                BlockState::Type => {
                    if !input.ensure(3) {
                        return Ok(DecompressStatus::NeedsInput);
                    }
                    self.last = input.take(1) == 1;
                    self.state = match input.take(2) {
                        0 => {
                            input.align_to_byte();
                            BlockState::StoredLens
                        }
                        1 => BlockState::Codes(CodesEngine::fixed()?),
                        2 => BlockState::Table,
                        _ => return Err(self.corrupt(input, "invalid block type")),
                    };
                }

                BlockState::StoredLens => {
                    if !input.ensure(32) {
                        return Ok(DecompressStatus::NeedsInput);
                    }
                    let len = input.take(16);
                    let nlen = input.take(16);
                    if len != !nlen & 0xFFFF {
                        return Err(self.corrupt(input, "invalid stored block lengths"));
                    }
                    self.state = BlockState::Stored {
                        remaining: len as usize,
                    };
                }

                BlockState::Stored { remaining } => {
                    while *remaining > 0 {
                        if !make_room(window, sink) {
                            return Ok(DecompressStatus::NeedsOutput);
                        }
                        let Some(byte) = input.take_aligned_byte() else {
                            return Ok(DecompressStatus::NeedsInput);
                        };
                        window.write_literal(byte);
                        *remaining -= 1;
                    }
                    if self.end_block() {
                        return Ok(DecompressStatus::BlockEnd);
                    }
                }

                BlockState::Table => {
                    if !input.ensure(14) {
                        return Ok(DecompressStatus::NeedsInput);
                    }
                    let header = &mut self.header;
                    header.hlit = input.take(5) as usize + 257;
                    header.hdist = input.take(5) as usize + 1;
                    header.hclen = input.take(4) as usize + 4;
                    if header.hlit > LITLEN_ALPHABET_SIZE || header.hdist > DISTANCE_ALPHABET_SIZE {
                        return Err(self.corrupt(input, "too many length or distance symbols"));
                    }
                    header.code_lengths = [0; CODELEN_ALPHABET_SIZE];
                    self.state = BlockState::BitLengths { index: 0 };
                }

                BlockState::BitLengths { index } => {
                    while *index < self.header.hclen {
                        if !input.ensure(3) {
                            return Ok(DecompressStatus::NeedsInput);
                        }
                        self.header.code_lengths[CODE_LENGTH_ORDER[*index]] = input.take(3) as u8;
                        *index += 1;
                    }
                    let table =
                        match DecodeTable::build(&self.header.code_lengths, TableKind::CodeLengths) {
                            Ok(table) => table,
                            Err(err) => return Err(self.fail(input.offset(), err)),
                        };
                    self.state = BlockState::CodeLengths { index: 0, table };
                }

                BlockState::CodeLengths { index, table } => {
                    let total = self.header.hlit + self.header.hdist;
                    while *index < total {
                        // A repeat code is taken only together with its extra bits.
                        let root = table.root();
                        let entry = table.entry(root, input.peek(root.bits));
                        let extra = match entry.op {
                            Op::Symbol(16) => 2,
                            Op::Symbol(17) => 3,
                            Op::Symbol(18) => 7,
                            _ => 0,
                        };
                        if entry.bits + extra > input.bits_available() {
                            if input.pull_byte() {
                                continue;
                            }
                            return Ok(DecompressStatus::NeedsInput);
                        }
                        input.consume(entry.bits);

                        let Op::Symbol(symbol) = entry.op else {
                            return Err(self.corrupt(input, "invalid code lengths set"));
                        };
                        let lengths = &mut self.header.lengths;
                        if symbol < 16 {
                            lengths[*index] = symbol as u8;
                            *index += 1;
                            continue;
                        }

                        let (value, repeat) = match symbol {
                            16 => {
                                if *index == 0 {
                                    return Err(self.corrupt(input, "invalid bit length repeat"));
                                }
                                (lengths[*index - 1], 3 + input.take(2) as usize)
                            }
                            17 => (0, 3 + input.take(3) as usize),
                            _ => (0, 11 + input.take(7) as usize),
                        };
                        if *index + repeat > total {
                            return Err(self.corrupt(input, "invalid bit length repeat"));
                        }
                        lengths[*index..*index + repeat].fill(value);
                        *index += repeat;
                    }

                    let hlit = self.header.hlit;
                    if self.header.lengths[END_OF_BLOCK as usize] == 0 {
                        return Err(self.corrupt(input, "invalid code -- missing end-of-block"));
                    }
                    let (litlen, distance) = self.header.lengths[..total].split_at(hlit);
                    let tables = DecodeTable::build(litlen, TableKind::LitLen).and_then(|litlen| {
                        Ok((litlen, DecodeTable::build(distance, TableKind::Distance)?))
                    });
                    match tables {
                        Ok((litlen, distance)) => {
                            self.state = BlockState::Codes(CodesEngine::dynamic(litlen, distance));
                        }
                        Err(err) => return Err(self.fail(input.offset(), err)),
                    }
                }

                BlockState::Codes(engine) => match engine.run(input, window, sink) {
                    Ok(CodesOutcome::NeedsInput) => return Ok(DecompressStatus::NeedsInput),
                    Ok(CodesOutcome::NeedsOutput) => return Ok(DecompressStatus::NeedsOutput),
                    Ok(CodesOutcome::BlockEnd) => {
                        if self.end_block() {
                            return Ok(DecompressStatus::BlockEnd);
                        }
                    }
                    Err(err) => return Err(self.fail(input.offset(), err)),
                },

                BlockState::Dry => {
                    if !sink.flush(window).is_drained() {
                        return Ok(DecompressStatus::NeedsOutput);
                    }
                    self.state = BlockState::Done;
                }

                BlockState::Done => return Ok(DecompressStatus::Done),

                BlockState::Bad { offset, message } => {
                    return Err(ZStreamError::corrupted(*offset, message.clone()));
                }
            }
        }
    }
}

/// DEFLATE decompressor.
#[derive(Debug)]
pub struct Inflater {
    driver: BlockDriver,
    /// History and pending output.
    window: Window,
    /// Running checksum of everything handed to the caller.
    checksum: Checksum,
    /// Accumulator carried between calls.
    bits: BitState,
    total_in: u64,
    total_out: u64,
}

impl Inflater {
    /// Create a decompressor with a 32 KB window and CRC-32.
    pub fn new() -> Result<Self> {
        Self::with_config(InflateConfig::DEFAULT)
    }

    /// Create a decompressor with the given configuration.
    pub fn with_config(config: InflateConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            driver: BlockDriver::new(),
            window: Window::new(config.window_size())?,
            checksum: Checksum::new(config.checksum),
            bits: BitState::default(),
            total_in: 0,
            total_out: 0,
        })
    }

    /// Number of blocks fully decoded so far.
    pub fn blocks_decoded(&self) -> u64 {
        self.driver.blocks
    }

    /// Make each call return [`DecompressStatus::BlockEnd`] as soon as a
    /// non-final block has been decoded. Kept across [`Decompressor::reset`].
    pub fn stop_at_block_end(&mut self, enabled: bool) {
        self.driver.stop_at_block = enabled;
    }

    /// Compressed bytes consumed since creation or reset.
    pub fn total_in(&self) -> u64 {
        self.total_in
    }

    /// Decompressed bytes delivered since creation or reset.
    pub fn total_out(&self) -> u64 {
        self.total_out
    }

    /// Running checksum of the delivered bytes.
    pub fn checksum(&self) -> u32 {
        self.checksum.value()
    }

    /// Window size in bytes.
    pub fn window_size(&self) -> usize {
        self.window.capacity()
    }
}

impl Decompressor for Inflater {
    fn decompress(
        &mut self,
        input: &[u8],
        output: &mut [u8],
    ) -> Result<(usize, usize, DecompressStatus)> {
        let mut bits = BitInput::resume(input, self.bits, self.total_in);
        let mut sink = OutputSink::new(output, &mut self.checksum);

        let result = self.driver.step(&mut bits, &mut self.window, &mut sink);
        if result.is_ok() {
            sink.flush(&mut self.window);
        }
        let produced = sink.written();

        let status = match result {
            Ok(DecompressStatus::NeedsInput) if self.window.pending() > 0 => {
                DecompressStatus::NeedsOutput
            }
            Ok(status) => status,
            Err(err) => {
                let (consumed, state) = bits.suspend();
                self.bits = state;
                self.total_in += consumed as u64;
                self.total_out += produced as u64;
                return Err(err);
            }
        };

        // Whole bytes still held go back to the caller once this call can no
        // longer use them; bits waiting for more input stay held.
        if matches!(
            status,
            DecompressStatus::NeedsOutput | DecompressStatus::Done
        ) {
            bits.restore_unused_input();
        }

        let (consumed, state) = bits.suspend();
        self.bits = state;
        self.total_in += consumed as u64;
        self.total_out += produced as u64;

        Ok((consumed, produced, status))
    }

    fn reset(&mut self) {
        self.driver.reset();
        self.window.reset();
        self.checksum.reset();
        self.bits.clear();
        self.total_in = 0;
        self.total_out = 0;
    }

    fn is_finished(&self) -> bool {
        matches!(self.driver.state, BlockState::Done)
    }
}

/// Decompress raw DEFLATE data in one call.
pub fn inflate(data: &[u8]) -> Result<Vec<u8>> {
    inflate_with(data, InflateConfig::DEFAULT)
}

/// Decompress raw DEFLATE data in one call with a custom configuration.
pub fn inflate_with(data: &[u8], config: InflateConfig) -> Result<Vec<u8>> {
    let mut inflater = Inflater::with_config(config)?;
    inflater.decompress_all(data)
}
