//! LZ77 match finder for DEFLATE compression.
//!
//! LZ77 finds repeated sequences in the input and replaces them with
//! back-references (length, distance pairs).
//!
//! # Algorithm
//!
//! The encoder keeps the last `W` bytes it has seen (the configured window)
//! in a buffer of `2 * W` bytes, indexed by hash chains over 3-byte
//! prefixes. When the buffer fills, the upper half slides down and the
//! chains are rebased. For each position it either:
//! - emits a literal byte if no acceptable match is found, or
//! - emits a (length, distance) pair for a match of 3 to 258 bytes.
//!
//! Levels 4 and above use lazy evaluation: a match is deferred by one byte
//! when the next position holds a longer one.

use crate::config::Strategy;

/// Minimum match length.
pub const MIN_MATCH: usize = 3;

/// Maximum match length.
pub const MAX_MATCH: usize = 258;

/// Matches shorter than this are dropped under [`Strategy::Filtered`].
const FILTERED_MIN_MATCH: usize = 6;

/// Hash table size (power of 2).
const HASH_BITS: u32 = 15;
const HASH_SIZE: usize = 1 << HASH_BITS;
const HASH_MASK: usize = HASH_SIZE - 1;

/// Empty hash slot. Slots hold a buffer position plus one.
const NIL: u32 = 0;

/// A token produced by LZ77 compression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lz77Token {
    /// A literal byte.
    Literal(u8),
    /// A back-reference to previously seen data.
    Match {
        /// Number of bytes to copy (3-258).
        length: u16,
        /// Distance back into the window (1 to the window size).
        distance: u16,
    },
}

impl Lz77Token {
    /// Number of input bytes this token stands for.
    pub fn len(&self) -> usize {
        match *self {
            Self::Literal(_) => 1,
            Self::Match { length, .. } => length as usize,
        }
    }

    /// Tokens always stand for at least one byte.
    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Search parameters for one compression level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelParams {
    /// Once the current match is this long, search less for a better one.
    pub good: u16,
    /// Lazy evaluation is skipped for matches at least this long.
    pub lazy: u16,
    /// Stop searching once a match this long is found.
    pub nice: u16,
    /// Maximum hash chain entries examined per search.
    pub chain: u16,
    /// Whether to use lazy evaluation.
    pub lazy_eval: bool,
}

impl LevelParams {
    /// Parameters for a level 0-9 (higher levels clamp to 9).
    pub fn for_level(level: u8) -> Self {
        let (good, lazy, nice, chain, lazy_eval) = match level {
            0 => (0, 0, 0, 0, false),
            1 => (4, 4, 8, 4, false),
            2 => (4, 5, 16, 8, false),
            3 => (4, 6, 32, 32, false),
            4 => (4, 4, 16, 16, true),
            5 => (8, 16, 32, 32, true),
            6 => (8, 16, 128, 128, true),
            7 => (8, 32, 128, 256, true),
            8 => (32, 128, 258, 1024, true),
            _ => (32, 258, 258, 4096, true),
        };
        Self {
            good,
            lazy,
            nice,
            chain,
            lazy_eval,
        }
    }
}

/// LZ77 encoder for DEFLATE compression.
#[derive(Debug)]
pub struct Lz77Encoder {
    /// Window size `W`; no distance ever exceeds it.
    window_size: usize,
    /// History plus lookahead, `2 * W` bytes.
    buffer: Vec<u8>,
    /// Valid bytes in `buffer`.
    end: usize,
    /// Earliest buffer position a match may refer to.
    history_start: usize,
    /// Positions below this are in the hash chains.
    inserted: usize,
    /// Hash of 3-byte prefix -> most recent position + 1.
    head: Vec<u32>,
    /// Position & (W - 1) -> previous position + 1 with the same hash.
    prev: Vec<u32>,
    params: LevelParams,
    strategy: Strategy,
}

impl Lz77Encoder {
    /// Create an encoder for a 32 KB window at the default level.
    pub fn new() -> Self {
        Self::with_level(6)
    }

    /// Create an encoder for a 32 KB window at the given level (0-9).
    pub fn with_level(level: u8) -> Self {
        Self::with_params(32768, level, Strategy::Default)
    }

    /// Create an encoder with an explicit window size (a power of two).
    pub fn with_params(window_size: usize, level: u8, strategy: Strategy) -> Self {
        debug_assert!(window_size.is_power_of_two());
        Self {
            window_size,
            buffer: vec![0; window_size * 2],
            end: 0,
            history_start: 0,
            inserted: 0,
            head: vec![NIL; HASH_SIZE],
            prev: vec![NIL; window_size],
            params: LevelParams::for_level(level),
            strategy,
        }
    }

    /// Window size in bytes.
    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Search parameters in use.
    pub fn params(&self) -> LevelParams {
        self.params
    }

    /// Reset the encoder state.
    pub fn reset(&mut self) {
        self.end = 0;
        self.history_start = 0;
        self.inserted = 0;
        self.head.fill(NIL);
        self.prev.fill(NIL);
    }

    /// Forget everything seen so far: later matches only refer to data
    /// passed after this call.
    pub fn reset_history(&mut self) {
        self.head.fill(NIL);
        self.history_start = self.end;
        self.inserted = self.end;
    }

    /// Compute hash for 3 bytes.
    #[inline(always)]
    fn hash(b0: u8, b1: u8, b2: u8) -> usize {
        let h = ((b0 as usize).wrapping_mul(506832829))
            ^ ((b1 as usize).wrapping_mul(2654435761) << 8)
            ^ ((b2 as usize).wrapping_mul(374761393) << 16);
        (h ^ (h >> 15)) & HASH_MASK
    }

    #[inline]
    fn hash_at(&self, pos: usize) -> usize {
        Self::hash(self.buffer[pos], self.buffer[pos + 1], self.buffer[pos + 2])
    }

    /// Add every position below `target` to the hash chains, once each.
    ///
    /// A position needs its 3-byte prefix in the buffer; the last two bytes
    /// are inserted when more data arrives.
    fn insert_until(&mut self, target: usize) {
        let limit = target.min((self.end + 1).saturating_sub(MIN_MATCH));
        while self.inserted < limit {
            let pos = self.inserted;
            let h = self.hash_at(pos);
            self.prev[pos & (self.window_size - 1)] = self.head[h];
            self.head[h] = pos as u32 + 1;
            self.inserted += 1;
        }
    }

    /// Longest earlier match for the bytes at `pos`, not extending past
    /// `limit`.
    fn find_match(&self, pos: usize, limit: usize, mut chain: u16) -> Option<(usize, usize)> {
        let max_len = (limit - pos).min(MAX_MATCH);
        if max_len < MIN_MATCH || pos + MIN_MATCH > self.end {
            return None;
        }

        let min_pos = pos.saturating_sub(self.window_size).max(self.history_start);
        let nice = (self.params.nice as usize).min(max_len);
        let mut best_len = MIN_MATCH - 1;
        let mut best_dist = 0;

        let mut candidate = self.head[self.hash_at(pos)];
        while candidate != NIL && chain > 0 {
            let at = candidate as usize - 1;
            if at >= pos || at < min_pos {
                break;
            }

            // Cheap rejection on the byte that would make this match longer.
            if self.buffer[at + best_len] == self.buffer[pos + best_len] {
                let len = self.buffer[at..at + max_len]
                    .iter()
                    .zip(&self.buffer[pos..pos + max_len])
                    .take_while(|(a, b)| a == b)
                    .count();
                if len > best_len {
                    best_len = len;
                    best_dist = pos - at;
                    if len >= nice {
                        break;
                    }
                }
            }

            let next = self.prev[at & (self.window_size - 1)];
            // Chains only run backwards; anything else is a recycled slot.
            if next as usize > at {
                break;
            }
            candidate = next;
            chain -= 1;
        }

        (best_len >= MIN_MATCH).then_some((best_len, best_dist))
    }

    /// Run of bytes equal to the previous one, starting at `pos`.
    fn find_run(&self, pos: usize, limit: usize) -> Option<(usize, usize)> {
        if pos == 0 || pos <= self.history_start {
            return None;
        }
        let max_len = (limit - pos).min(MAX_MATCH);
        let byte = self.buffer[pos - 1];
        let len = self.buffer[pos..pos + max_len]
            .iter()
            .take_while(|&&b| b == byte)
            .count();
        (len >= MIN_MATCH).then_some((len, 1))
    }

    /// Match at `pos` subject to the strategy.
    fn best_match(&self, pos: usize, limit: usize, chain: u16) -> Option<(usize, usize)> {
        match self.strategy {
            Strategy::HuffmanOnly => None,
            Strategy::Rle => self.find_run(pos, limit),
            Strategy::Filtered => self
                .find_match(pos, limit, chain)
                .filter(|&(len, _)| len >= FILTERED_MIN_MATCH),
            Strategy::Default | Strategy::Fixed => self.find_match(pos, limit, chain),
        }
    }

    /// Move the upper half of the buffer down and rebase the chains.
    fn slide(&mut self) {
        let w = self.window_size;
        self.buffer.copy_within(w..self.end, 0);
        self.end -= w;
        self.history_start = self.history_start.saturating_sub(w);
        self.inserted = self.inserted.saturating_sub(w);

        let rebase = |slot: &mut u32| {
            *slot = slot.saturating_sub(w as u32);
        };
        self.head.iter_mut().for_each(rebase);
        self.prev.iter_mut().for_each(rebase);
    }

    /// Tokenize `input`, continuing from the history of earlier calls.
    ///
    /// The tokens cover `input` exactly; matches never extend past its end.
    pub fn compress(&mut self, input: &[u8]) -> Vec<Lz77Token> {
        let mut tokens = Vec::with_capacity(input.len() / 2 + 1);
        let mut input_pos = 0;

        while input_pos < input.len() {
            if self.end == self.buffer.len() {
                self.slide();
            }

            let chunk = (self.buffer.len() - self.end).min(input.len() - input_pos);
            let start = self.end;
            self.buffer[start..start + chunk].copy_from_slice(&input[input_pos..input_pos + chunk]);
            self.end += chunk;
            input_pos += chunk;

            let limit = self.end;
            let mut pos = start;
            while pos < limit {
                self.insert_until(pos);

                let Some((length, distance)) = self.best_match(pos, limit, self.params.chain) else {
                    tokens.push(Lz77Token::Literal(self.buffer[pos]));
                    pos += 1;
                    continue;
                };

                if self.params.lazy_eval
                    && length < self.params.lazy as usize
                    && pos + 1 < limit
                {
                    self.insert_until(pos + 1);
                    let chain = if length >= self.params.good as usize {
                        self.params.chain >> 2
                    } else {
                        self.params.chain
                    };
                    if let Some((next_len, _)) = self.best_match(pos + 1, limit, chain) {
                        if next_len > length {
                            tokens.push(Lz77Token::Literal(self.buffer[pos]));
                            pos += 1;
                            continue;
                        }
                    }
                }

                tokens.push(Lz77Token::Match {
                    length: length as u16,
                    distance: distance as u16,
                });
                pos += length;
            }
        }

        tokens
    }

    /// Compress all data at once (convenience method).
    pub fn compress_all(input: &[u8], level: u8) -> Vec<Lz77Token> {
        let mut encoder = Self::with_level(level);
        encoder.compress(input)
    }
}

impl Default for Lz77Encoder {
    fn default() -> Self {
        Self::new()
    }
}
