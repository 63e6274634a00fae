//! Symbol decoder for Huffman-coded blocks.
//!
//! [`CodesEngine`] turns bits into literals and back-references for one
//! fixed or dynamic block, writing straight into the sliding window. It is a
//! state machine with a single entry point, [`CodesEngine::run`]: whenever
//! input or output space runs out it returns, leaving the state tag and any
//! partially decoded length or distance in place, and the next call picks up
//! exactly where this one stopped.

use crate::flush::OutputSink;
use crate::huffman::{DecodeTable, Lookup, Op};
use crate::tables::{fixed_distance_table, fixed_litlen_table};
use std::borrow::Cow;
use zstream_core::bitstream::BitInput;
use zstream_core::error::{Result, ZStreamError};
use zstream_core::window::Window;

/// Where the engine is within the current symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodesState {
    /// About to decode a literal/length symbol.
    Start,
    /// Looking up a literal/length code in the given table region.
    Len(Lookup),
    /// Reading the extra bits of a length.
    LenExt {
        /// Length base value.
        base: u16,
        /// Extra bits to read.
        extra: u8,
    },
    /// Looking up a distance code for a match of `length`.
    Dist {
        /// Match length.
        length: u16,
        /// Table region to look in.
        lookup: Lookup,
    },
    /// Reading the extra bits of a distance.
    DistExt {
        /// Match length.
        length: u16,
        /// Distance base value.
        base: u16,
        /// Extra bits to read.
        extra: u8,
    },
    /// Copying `length` more bytes from `distance` back.
    Copy {
        /// Bytes still to copy.
        length: u16,
        /// Distance back from the write position.
        distance: u16,
    },
    /// Writing one literal byte.
    Lit(u8),
    /// End of block seen; draining the window.
    Wash,
    /// Block finished.
    End,
    /// An invalid code was found.
    BadCode(&'static str),
}

/// What made [`CodesEngine::run`] return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodesOutcome {
    /// Input ran out mid-symbol.
    NeedsInput,
    /// The window is full and the caller's buffer too.
    NeedsOutput,
    /// The block's end-of-block code was decoded and the window drained.
    BlockEnd,
}

/// Decoder for the symbols of one Huffman-coded block.
#[derive(Debug, Clone)]
pub struct CodesEngine {
    litlen: Cow<'static, DecodeTable>,
    distance: Cow<'static, DecodeTable>,
    state: CodesState,
}

impl CodesEngine {
    /// Engine for a fixed-Huffman block, sharing the static tables.
    pub fn fixed() -> Result<Self> {
        Ok(Self {
            litlen: Cow::Borrowed(fixed_litlen_table()?),
            distance: Cow::Borrowed(fixed_distance_table()?),
            state: CodesState::Start,
        })
    }

    /// Engine for a dynamic block with freshly built tables.
    pub fn dynamic(litlen: DecodeTable, distance: DecodeTable) -> Self {
        Self {
            litlen: Cow::Owned(litlen),
            distance: Cow::Owned(distance),
            state: CodesState::Start,
        }
    }

    /// Current state.
    pub fn state(&self) -> CodesState {
        self.state
    }

    /// Decode until the block ends or input or output space runs out.
    pub fn run(
        &mut self,
        input: &mut BitInput<'_>,
        window: &mut Window,
        sink: &mut OutputSink<'_, '_>,
    ) -> Result<CodesOutcome> {
        loop {
            match self.state {
                CodesState::Start => {
                    self.state = CodesState::Len(self.litlen.root());
                }

                CodesState::Len(lookup) => {
                    let entry = self.litlen.entry(lookup, input.peek(lookup.bits));
                    if entry.bits > input.bits_available() {
                        if input.pull_byte() {
                            continue;
                        }
                        return Ok(CodesOutcome::NeedsInput);
                    }
                    input.consume(entry.bits);

                    self.state = match entry.op {
                        Op::Literal(byte) => CodesState::Lit(byte),
                        Op::Base { base, extra } => CodesState::LenExt { base, extra },
                        Op::EndOfBlock => CodesState::Wash,
                        Op::Link { offset, bits } => CodesState::Len(Lookup { offset, bits }),
                        Op::Invalid => CodesState::BadCode("invalid literal/length code"),
                        Op::Symbol(_) => CodesState::BadCode("invalid code supplied"),
                    };
                }

                CodesState::LenExt { base, extra } => {
                    if !input.ensure(extra) {
                        return Ok(CodesOutcome::NeedsInput);
                    }
                    let length = base + input.take(extra) as u16;
                    self.state = CodesState::Dist {
                        length,
                        lookup: self.distance.root(),
                    };
                }

                CodesState::Dist { length, lookup } => {
                    let entry = self.distance.entry(lookup, input.peek(lookup.bits));
                    if entry.bits > input.bits_available() {
                        if input.pull_byte() {
                            continue;
                        }
                        return Ok(CodesOutcome::NeedsInput);
                    }
                    input.consume(entry.bits);

                    self.state = match entry.op {
                        Op::Base { base, extra } => CodesState::DistExt {
                            length,
                            base,
                            extra,
                        },
                        Op::Link { offset, bits } => CodesState::Dist {
                            length,
                            lookup: Lookup { offset, bits },
                        },
                        _ => CodesState::BadCode("invalid distance code"),
                    };
                }

                CodesState::DistExt {
                    length,
                    base,
                    extra,
                } => {
                    if !input.ensure(extra) {
                        return Ok(CodesOutcome::NeedsInput);
                    }
                    let distance = base as usize + input.take(extra) as usize;
                    if distance > window.history() {
                        self.state = CodesState::BadCode("invalid distance too far back");
                        return Err(ZStreamError::invalid_distance(distance, window.history()));
                    }
                    self.state = CodesState::Copy {
                        length,
                        distance: distance as u16,
                    };
                }

                CodesState::Copy { length, distance } => {
                    if !make_room(window, sink) {
                        return Ok(CodesOutcome::NeedsOutput);
                    }
                    let copied = window.copy_back(distance as usize, length as usize)? as u16;
                    self.state = if copied == length {
                        CodesState::Start
                    } else {
                        CodesState::Copy {
                            length: length - copied,
                            distance,
                        }
                    };
                }

                CodesState::Lit(byte) => {
                    if !make_room(window, sink) {
                        return Ok(CodesOutcome::NeedsOutput);
                    }
                    window.write_literal(byte);
                    self.state = CodesState::Start;
                }

                CodesState::Wash => {
                    if !sink.flush(window).is_drained() {
                        return Ok(CodesOutcome::NeedsOutput);
                    }
                    self.state = CodesState::End;
                }

                CodesState::End => return Ok(CodesOutcome::BlockEnd),

                CodesState::BadCode(message) => {
                    return Err(ZStreamError::corrupted(input.offset(), message));
                }
            }
        }
    }
}

/// Make sure the window has a free slot, flushing to the caller if needed.
#[inline]
pub(crate) fn make_room(window: &mut Window, sink: &mut OutputSink<'_, '_>) -> bool {
    if window.is_full() {
        sink.flush(window);
    }
    !window.is_full()
}
