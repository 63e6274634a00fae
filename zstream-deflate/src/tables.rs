//! Constant tables for DEFLATE (RFC 1951).
//!
//! Length and distance base/extra-bit tables, the code length transmission
//! order, and the fixed Huffman codes. The fixed decode tables and encoder
//! codes are built on first use and shared read-only by every stream.

use crate::huffman::{DecodeTable, HuffmanCode, TableKind};
use std::sync::OnceLock;
use zstream_core::error::Result;

/// Number of literal/length symbols in the fixed code (286 and 287 are
/// assigned codes but never valid).
pub const FIXED_LITLEN_SYMBOLS: usize = 288;

/// Number of distance symbols in the fixed code (30 and 31 never valid).
pub const FIXED_DISTANCE_SYMBOLS: usize = 32;

/// Fixed literal/length code lengths (RFC 1951 Section 3.2.6).
///
/// - Symbols 0-143: 8 bits
/// - Symbols 144-255: 9 bits
/// - Symbols 256-279: 7 bits
/// - Symbols 280-287: 8 bits
pub fn fixed_litlen_lengths() -> [u8; FIXED_LITLEN_SYMBOLS] {
    let mut lengths = [8u8; FIXED_LITLEN_SYMBOLS];
    lengths[144..256].fill(9);
    lengths[256..280].fill(7);
    lengths
}

/// Fixed distance code lengths: every code is 5 bits.
pub fn fixed_distance_lengths() -> [u8; FIXED_DISTANCE_SYMBOLS] {
    [5u8; FIXED_DISTANCE_SYMBOLS]
}

/// The fixed literal/length decode table, built once.
pub fn fixed_litlen_table() -> Result<&'static DecodeTable> {
    static TABLE: OnceLock<DecodeTable> = OnceLock::new();

    if let Some(table) = TABLE.get() {
        return Ok(table);
    }
    let table = DecodeTable::build(&fixed_litlen_lengths(), TableKind::LitLen)?;
    Ok(TABLE.get_or_init(|| table))
}

/// The fixed distance decode table, built once.
pub fn fixed_distance_table() -> Result<&'static DecodeTable> {
    static TABLE: OnceLock<DecodeTable> = OnceLock::new();

    if let Some(table) = TABLE.get() {
        return Ok(table);
    }
    let table = DecodeTable::build(&fixed_distance_lengths(), TableKind::Distance)?;
    Ok(TABLE.get_or_init(|| table))
}

/// Encoder codes for the fixed literal/length alphabet.
pub fn fixed_litlen_code() -> &'static HuffmanCode {
    static CODE: OnceLock<HuffmanCode> = OnceLock::new();
    CODE.get_or_init(|| HuffmanCode::from_lengths(&fixed_litlen_lengths()))
}

/// Encoder codes for the fixed distance alphabet.
pub fn fixed_distance_code() -> &'static HuffmanCode {
    static CODE: OnceLock<HuffmanCode> = OnceLock::new();
    CODE.get_or_init(|| HuffmanCode::from_lengths(&fixed_distance_lengths()))
}

/// Length code base values (RFC 1951 Section 3.2.5).
///
/// For length codes 257-285, this gives the base length value.
/// Extra bits are added to get the final length.
pub const LENGTH_BASE: [u16; 29] = [
    3, 4, 5, 6, 7, 8, 9, 10, // 257-264: 0 extra bits
    11, 13, 15, 17, // 265-268: 1 extra bit
    19, 23, 27, 31, // 269-272: 2 extra bits
    35, 43, 51, 59, // 273-276: 3 extra bits
    67, 83, 99, 115, // 277-280: 4 extra bits
    131, 163, 195, 227, // 281-284: 5 extra bits
    258, // 285: 0 extra bits (special case)
];

/// Number of extra bits for length codes 257-285.
pub const LENGTH_EXTRA_BITS: [u8; 29] = [
    0, 0, 0, 0, 0, 0, 0, 0, // 257-264
    1, 1, 1, 1, // 265-268
    2, 2, 2, 2, // 269-272
    3, 3, 3, 3, // 273-276
    4, 4, 4, 4, // 277-280
    5, 5, 5, 5, // 281-284
    0, // 285
];

/// Distance code base values (RFC 1951 Section 3.2.5).
pub const DISTANCE_BASE: [u16; 30] = [
    1, 2, 3, 4, // 0-3: 0 extra bits
    5, 7, // 4-5: 1 extra bit
    9, 13, // 6-7: 2 extra bits
    17, 25, // 8-9: 3 extra bits
    33, 49, // 10-11: 4 extra bits
    65, 97, // 12-13: 5 extra bits
    129, 193, // 14-15: 6 extra bits
    257, 385, // 16-17: 7 extra bits
    513, 769, // 18-19: 8 extra bits
    1025, 1537, // 20-21: 9 extra bits
    2049, 3073, // 22-23: 10 extra bits
    4097, 6145, // 24-25: 11 extra bits
    8193, 12289, // 26-27: 12 extra bits
    16385, 24577, // 28-29: 13 extra bits
];

/// Number of extra bits for distance codes 0-29.
pub const DISTANCE_EXTRA_BITS: [u8; 30] = [
    0, 0, 0, 0, // 0-3
    1, 1, // 4-5
    2, 2, // 6-7
    3, 3, // 8-9
    4, 4, // 10-11
    5, 5, // 12-13
    6, 6, // 14-15
    7, 7, // 16-17
    8, 8, // 18-19
    9, 9, // 20-21
    10, 10, // 22-23
    11, 11, // 24-25
    12, 12, // 26-27
    13, 13, // 28-29
];

/// Order of code length codes in a dynamic block header (RFC 1951 Section 3.2.7).
pub const CODE_LENGTH_ORDER: [usize; 19] = [
    16, 17, 18, 0, 8, 7, 9, 6, 10, 5, 11, 4, 12, 3, 13, 2, 14, 1, 15,
];

/// Convert a match length (3-258) to `(code, extra_bits, extra_value)`.
pub fn length_to_code(length: u16) -> (u16, u8, u16) {
    debug_assert!((3..=258).contains(&length), "length out of range: {}", length);

    let length = length as usize;
    let code = match length {
        3..=10 => length - 3 + 257,
        11..=18 => (length - 11) / 2 + 265,
        19..=34 => (length - 19) / 4 + 269,
        35..=66 => (length - 35) / 8 + 273,
        67..=130 => (length - 67) / 16 + 277,
        131..=257 => (length - 131) / 32 + 281,
        _ => 285,
    };

    let base = LENGTH_BASE[code - 257] as usize;
    let extra_bits = LENGTH_EXTRA_BITS[code - 257];

    (code as u16, extra_bits, (length - base) as u16)
}

/// Convert a match distance (1-32768) to `(code, extra_bits, extra_value)`.
pub fn distance_to_code(distance: u16) -> (u16, u8, u16) {
    debug_assert!(
        (1..=32768).contains(&distance),
        "distance out of range: {}",
        distance
    );

    // Codes come in pairs per extra-bit count: the position of the highest
    // set bit of (distance - 1) selects the pair, the next bit the member.
    let d = (distance - 1) as u32;
    let code = if d < 4 {
        d as usize
    } else {
        let top = 31 - d.leading_zeros();
        (2 * top + ((d >> (top - 1)) & 1)) as usize
    };

    let base = DISTANCE_BASE[code];
    let extra_bits = DISTANCE_EXTRA_BITS[code];

    (code as u16, extra_bits, distance - base)
}
