//! Huffman coding for DEFLATE.
//!
//! DEFLATE uses canonical Huffman codes: given only the code length of each
//! symbol, codes are assigned in order of (length, symbol), so the lengths
//! alone describe the code.
//!
//! # Decoding
//!
//! [`DecodeTable`] is a two-level lookup table stored in one arena `Vec`.
//! The root table is indexed by the next `root` bits of input. Codes no
//! longer than `root` are replicated across every root slot they prefix;
//! longer codes share a root slot holding a [`Op::Link`] to a sub-table,
//! which is indexed by the bits that follow. Sub-tables are addressed by
//! `(offset, bits)` pairs into the arena.
//!
//! # Alphabets
//!
//! - **Literal/Length**: 0-285 (0-255 literals, 256 EOB, 257-285 lengths)
//! - **Distance**: 0-29 (back-reference distances)
//! - **Code Length**: 0-18 (for encoding dynamic Huffman trees)

use crate::tables::{DISTANCE_BASE, DISTANCE_EXTRA_BITS, LENGTH_BASE, LENGTH_EXTRA_BITS};
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::io::Write;
#[cfg(test)]
use zstream_core::bitstream::BitInput;
use zstream_core::bitstream::BitWriter;
use zstream_core::error::{Result, ZStreamError};

/// Maximum code length in DEFLATE (15 bits).
pub const MAX_CODE_LENGTH: usize = 15;

/// Maximum code length for the code length alphabet (7 bits).
pub const MAX_CODELEN_LENGTH: u8 = 7;

/// Size of the literal/length alphabet (0-285).
pub const LITLEN_ALPHABET_SIZE: usize = 286;

/// Size of the distance alphabet (0-29).
pub const DISTANCE_ALPHABET_SIZE: usize = 30;

/// Size of the code length alphabet (0-18).
pub const CODELEN_ALPHABET_SIZE: usize = 19;

/// End of block symbol.
pub const END_OF_BLOCK: u16 = 256;

/// Which alphabet a decode table serves; decides what each symbol means.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    /// Code length alphabet of a dynamic block header.
    CodeLengths,
    /// Literal/length alphabet.
    LitLen,
    /// Distance alphabet.
    Distance,
}

impl TableKind {
    /// Preferred root table width.
    pub fn root_bits(self) -> u8 {
        match self {
            Self::CodeLengths => 7,
            Self::LitLen => 9,
            Self::Distance => 6,
        }
    }

    /// Message used when a set of lengths for this alphabet is rejected.
    pub fn error_message(self) -> &'static str {
        match self {
            Self::CodeLengths => "invalid code lengths set",
            Self::LitLen => "invalid literal/lengths set",
            Self::Distance => "invalid distances set",
        }
    }

    fn op_for(self, symbol: u16) -> Op {
        match self {
            Self::CodeLengths => Op::Symbol(symbol),
            Self::LitLen => match symbol {
                0..=255 => Op::Literal(symbol as u8),
                END_OF_BLOCK => Op::EndOfBlock,
                257..=285 => {
                    let index = (symbol - 257) as usize;
                    Op::Base {
                        base: LENGTH_BASE[index],
                        extra: LENGTH_EXTRA_BITS[index],
                    }
                }
                _ => Op::Invalid,
            },
            Self::Distance => match symbol {
                0..=29 => Op::Base {
                    base: DISTANCE_BASE[symbol as usize],
                    extra: DISTANCE_EXTRA_BITS[symbol as usize],
                },
                _ => Op::Invalid,
            },
        }
    }
}

/// What a table entry decodes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    /// A literal byte.
    Literal(u8),
    /// A raw symbol (code length alphabet).
    Symbol(u16),
    /// A length or distance base value followed by `extra` extra bits.
    Base {
        /// Base value.
        base: u16,
        /// Number of extra bits to read and add.
        extra: u8,
    },
    /// End of the current block.
    EndOfBlock,
    /// Continue in the sub-table at `offset`, indexed by the next `bits` bits.
    Link {
        /// Arena index of the sub-table.
        offset: u16,
        /// Index width of the sub-table.
        bits: u8,
    },
    /// No valid code has this prefix.
    Invalid,
}

/// One decode table slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entry {
    /// Bits this entry consumes at its own table level.
    pub bits: u8,
    /// What the bits decode to.
    pub op: Op,
}

/// A table region inside the arena: where it starts and how wide its index is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lookup {
    /// Arena index of slot 0.
    pub offset: u16,
    /// Index width in bits.
    pub bits: u8,
}

/// Multi-level canonical Huffman decode table.
#[derive(Debug, Clone)]
pub struct DecodeTable {
    entries: Vec<Entry>,
    root: Lookup,
    kind: TableKind,
}

impl DecodeTable {
    /// Build a decode table from per-symbol code lengths.
    ///
    /// Over-subscribed lengths are always rejected. Incomplete codes are
    /// rejected too, except for a literal/length or distance code made of a
    /// single one-bit code; the unused code then decodes as [`Op::Invalid`].
    /// A literal/length or distance set with no codes at all builds a table
    /// where every lookup is invalid.
    pub fn build(lengths: &[u8], kind: TableKind) -> Result<Self> {
        let invalid = || ZStreamError::invalid_code_lengths(kind.error_message());

        let mut count = [0u16; MAX_CODE_LENGTH + 1];
        for &len in lengths {
            if len as usize > MAX_CODE_LENGTH {
                return Err(invalid());
            }
            count[len as usize] += 1;
        }
        count[0] = 0;

        let max = (1..=MAX_CODE_LENGTH).rev().find(|&len| count[len] != 0);
        let Some(max) = max else {
            if kind == TableKind::CodeLengths {
                return Err(invalid());
            }
            let empty = Entry {
                bits: 1,
                op: Op::Invalid,
            };
            return Ok(Self {
                entries: vec![empty; 2],
                root: Lookup { offset: 0, bits: 1 },
                kind,
            });
        };
        let min = (1..=max).find(|&len| count[len] != 0).unwrap_or(max);

        let mut left: i32 = 1;
        for &n in &count[1..] {
            left <<= 1;
            left -= n as i32;
            if left < 0 {
                return Err(invalid());
            }
        }
        if left > 0 && (kind == TableKind::CodeLengths || max != 1) {
            return Err(invalid());
        }

        let root_bits = kind.root_bits().clamp(min as u8, max as u8);
        let root_size = 1usize << root_bits;
        let root_mask = root_size - 1;

        let mut next_code = [0u32; MAX_CODE_LENGTH + 1];
        let mut code = 0u32;
        for len in 1..=MAX_CODE_LENGTH {
            code = (code + count[len - 1] as u32) << 1;
            next_code[len] = code;
        }

        // Assign codes; note how wide each root slot's sub-table must be.
        let mut codes = Vec::with_capacity(lengths.len());
        let mut sub_bits = vec![0u8; root_size];
        for (symbol, &len) in lengths.iter().enumerate() {
            if len == 0 {
                continue;
            }
            let reversed = reverse_bits(next_code[len as usize] as u16, len) as usize;
            next_code[len as usize] += 1;
            if len > root_bits {
                let slot = reversed & root_mask;
                sub_bits[slot] = sub_bits[slot].max(len - root_bits);
            }
            codes.push((symbol as u16, len, reversed));
        }

        let mut entries = vec![
            Entry {
                bits: root_bits,
                op: Op::Invalid,
            };
            root_size
        ];
        let mut sub_offset = vec![0usize; root_size];
        for (slot, &bits) in sub_bits.iter().enumerate() {
            if bits == 0 {
                continue;
            }
            let offset = entries.len();
            entries.resize(offset + (1 << bits), Entry { bits, op: Op::Invalid });
            entries[slot] = Entry {
                bits: root_bits,
                op: Op::Link {
                    offset: offset as u16,
                    bits,
                },
            };
            sub_offset[slot] = offset;
        }

        for (symbol, len, reversed) in codes {
            let op = kind.op_for(symbol);
            if len <= root_bits {
                let mut index = reversed;
                while index < root_size {
                    entries[index] = Entry { bits: len, op };
                    index += 1 << len;
                }
            } else {
                let slot = reversed & root_mask;
                let drop = len - root_bits;
                let base = sub_offset[slot];
                let size = 1usize << sub_bits[slot];
                let mut index = reversed >> root_bits;
                while index < size {
                    entries[base + index] = Entry { bits: drop, op };
                    index += 1 << drop;
                }
            }
        }

        Ok(Self {
            entries,
            root: Lookup {
                offset: 0,
                bits: root_bits,
            },
            kind,
        })
    }

    /// The root table region.
    pub fn root(&self) -> Lookup {
        self.root
    }

    /// The alphabet this table decodes.
    pub fn kind(&self) -> TableKind {
        self.kind
    }

    /// Total number of slots across all levels.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table has no slots (never true for a built table).
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The slot of `lookup` selected by the low bits of `bits`.
    #[inline]
    pub fn entry(&self, lookup: Lookup, bits: u32) -> Entry {
        let index = bits as usize & ((1usize << lookup.bits) - 1);
        self.entries[lookup.offset as usize + index]
    }

    /// Decode one complete code, following a link if needed.
    ///
    /// Returns `None` without consuming anything if the input runs out
    /// first. Never returns a [`Op::Link`] entry. The inflate loop walks
    /// tables through [`DecodeTable::entry`] directly.
    #[cfg(test)]
    pub fn decode(&self, input: &mut BitInput<'_>) -> Option<Entry> {
        let root = self.root;
        let entry = loop {
            let entry = self.entry(root, input.peek(root.bits));
            if entry.bits <= input.bits_available() {
                break entry;
            }
            if !input.pull_byte() {
                return None;
            }
        };

        let Op::Link { offset, bits } = entry.op else {
            input.consume(entry.bits);
            return Some(entry);
        };

        let skip = entry.bits;
        let sub = Lookup { offset, bits };
        let entry = loop {
            let entry = self.entry(sub, input.peek(skip + bits) >> skip);
            if skip + entry.bits <= input.bits_available() {
                break entry;
            }
            if !input.pull_byte() {
                return None;
            }
        };
        input.consume(skip + entry.bits);
        Some(entry)
    }
}

/// Reverse the low `length` bits of `code`.
pub fn reverse_bits(code: u16, length: u8) -> u16 {
    if length == 0 {
        return 0;
    }
    code.reverse_bits() >> (16 - length)
}

/// Canonical encoder codes, bit-reversed for LSB-first output.
#[derive(Debug, Clone)]
pub struct HuffmanCode {
    codes: Vec<u16>,
    lengths: Vec<u8>,
}

impl HuffmanCode {
    /// Assign canonical codes to the given lengths.
    pub fn from_lengths(lengths: &[u8]) -> Self {
        let mut count = [0u16; MAX_CODE_LENGTH + 1];
        for &len in lengths {
            count[len as usize] += 1;
        }
        count[0] = 0;

        let mut next_code = [0u16; MAX_CODE_LENGTH + 1];
        let mut code = 0u16;
        for len in 1..=MAX_CODE_LENGTH {
            code = (code + count[len - 1]) << 1;
            next_code[len] = code;
        }

        let codes = lengths
            .iter()
            .map(|&len| {
                if len == 0 {
                    return 0;
                }
                let code = next_code[len as usize];
                next_code[len as usize] += 1;
                reverse_bits(code, len)
            })
            .collect();

        Self {
            codes,
            lengths: lengths.to_vec(),
        }
    }

    /// Bit-reversed code of `symbol`.
    #[inline]
    pub fn code(&self, symbol: usize) -> u16 {
        self.codes[symbol]
    }

    /// Code length of `symbol` (0 if unused).
    #[inline]
    pub fn length(&self, symbol: usize) -> u8 {
        self.lengths[symbol]
    }

    /// All code lengths.
    pub fn lengths(&self) -> &[u8] {
        &self.lengths
    }

    /// Sum of `freq * length` over all symbols.
    pub fn cost(&self, frequencies: &[u32]) -> u64 {
        frequencies
            .iter()
            .zip(&self.lengths)
            .map(|(&freq, &len)| freq as u64 * len as u64)
            .sum()
    }

    /// Emit the code for `symbol`.
    #[inline]
    pub fn write_symbol<W: Write>(&self, writer: &mut BitWriter<W>, symbol: usize) -> Result<()> {
        debug_assert!(self.lengths[symbol] > 0, "symbol {} has no code", symbol);
        writer.write_bits(self.codes[symbol] as u32, self.lengths[symbol])
    }
}

/// Builder for length-limited Huffman code lengths from frequencies.
#[derive(Debug, Clone)]
pub struct HuffmanBuilder {
    frequencies: Vec<u32>,
    max_length: u8,
}

impl HuffmanBuilder {
    /// Create a new Huffman builder.
    pub fn new(alphabet_size: usize, max_length: u8) -> Self {
        Self {
            frequencies: vec![0; alphabet_size],
            max_length,
        }
    }

    /// Add a symbol occurrence.
    #[inline]
    pub fn add(&mut self, symbol: u16) {
        self.frequencies[symbol as usize] += 1;
    }

    /// Add multiple occurrences of a symbol.
    pub fn add_count(&mut self, symbol: u16, count: u32) {
        self.frequencies[symbol as usize] += count;
    }

    /// Symbol frequencies gathered so far.
    pub fn frequencies(&self) -> &[u32] {
        &self.frequencies
    }

    /// Zero all frequencies.
    pub fn clear(&mut self) {
        self.frequencies.fill(0);
    }

    /// Build code lengths from frequencies.
    ///
    /// The result is always a complete code no longer than the limit, with
    /// at least two symbols coded: unused symbols 0 and 1 are pulled in when
    /// fewer than two symbols occur.
    pub fn build_lengths(&self) -> Vec<u8> {
        let n = self.frequencies.len();
        let max_len = self.max_length as usize;
        let mut lengths = vec![0u8; n];

        let mut symbols: Vec<(u32, usize)> = self
            .frequencies
            .iter()
            .enumerate()
            .filter(|&(_, &f)| f > 0)
            .map(|(i, &f)| (f, i))
            .collect();

        let mut filler = 0;
        while symbols.len() < 2 {
            if !symbols.iter().any(|&(_, s)| s == filler) {
                symbols.push((0, filler));
            }
            filler += 1;
        }

        // Plain Huffman merge; node weights break ties on creation order.
        let leaves = symbols.len();
        let mut parent = vec![0usize; 2 * leaves - 1];
        let mut heap: BinaryHeap<Reverse<(u64, usize)>> = symbols
            .iter()
            .enumerate()
            .map(|(node, &(freq, _))| Reverse((freq as u64, node)))
            .collect();
        let mut next = leaves;
        while let (Some(Reverse((wa, a))), Some(Reverse((wb, b)))) = (heap.pop(), heap.pop()) {
            parent[a] = next;
            parent[b] = next;
            heap.push(Reverse((wa + wb, next)));
            next += 1;
        }
        let root = next - 1;

        // Count leaves per depth, folding anything too deep into max_len.
        let mut bl_count = vec![0u32; max_len + 1];
        for leaf in 0..leaves {
            let mut depth = 0;
            let mut node = leaf;
            while node != root {
                node = parent[node];
                depth += 1;
            }
            bl_count[depth.min(max_len)] += 1;
        }

        let mut total: u64 = (1..=max_len)
            .map(|len| (bl_count[len] as u64) << (max_len - len))
            .sum();
        while total > 1u64 << max_len {
            bl_count[max_len] -= 1;
            for len in (1..max_len).rev() {
                if bl_count[len] > 0 {
                    bl_count[len] -= 1;
                    bl_count[len + 1] += 2;
                    break;
                }
            }
            total -= 1;
        }

        // Most frequent symbols take the shortest codes.
        symbols.sort_by_key(|&(freq, symbol)| (Reverse(freq), symbol));
        let mut ranked = symbols.iter();
        for (len, &count) in bl_count.iter().enumerate().skip(1) {
            for _ in 0..count {
                if let Some(&(_, symbol)) = ranked.next() {
                    lengths[symbol] = len as u8;
                }
            }
        }

        lengths
    }
}
