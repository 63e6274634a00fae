//! Running checksums over the uncompressed byte stream.
//!
//! A stream carries one [`Checksum`], chosen by [`ChecksumKind`] at init
//! time. The decoder updates it with exactly the bytes it hands to the
//! caller, in the order it produced them; the encoder updates it with the
//! bytes it accepts.

use crate::crc::Crc32;

/// Largest prime smaller than 65536.
const ADLER_MOD: u32 = 65521;

/// Number of bytes that can be summed before `b` may overflow a `u32`.
const NMAX: usize = 5552;

/// Adler-32 checksum calculator.
///
/// # Example
///
/// ```
/// use zstream_core::checksum::Adler32;
///
/// assert_eq!(Adler32::checksum(b"Wikipedia"), 0x11E60398);
/// ```
#[derive(Clone, Debug)]
pub struct Adler32 {
    a: u32,
    b: u32,
}

impl Adler32 {
    /// Create a new Adler-32 calculator.
    pub fn new() -> Self {
        Self { a: 1, b: 0 }
    }

    /// Update the checksum with more data.
    pub fn update(&mut self, data: &[u8]) {
        let mut a = self.a;
        let mut b = self.b;

        for chunk in data.chunks(NMAX) {
            for &byte in chunk {
                a += byte as u32;
                b += a;
            }
            a %= ADLER_MOD;
            b %= ADLER_MOD;
        }

        self.a = a;
        self.b = b;
    }

    /// Current checksum value.
    pub fn value(&self) -> u32 {
        (self.b << 16) | self.a
    }

    /// Compute Adler-32 checksum of data in one shot.
    pub fn checksum(data: &[u8]) -> u32 {
        let mut adler = Self::new();
        adler.update(data);
        adler.value()
    }
}

impl Default for Adler32 {
    fn default() -> Self {
        Self::new()
    }
}

/// Which running checksum a stream maintains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChecksumKind {
    /// CRC-32 (ISO 3309).
    #[default]
    Crc32,
    /// Adler-32.
    Adler32,
    /// No checksum; the reported value stays 0.
    None,
}

/// A running checksum of one of the supported kinds.
#[derive(Debug, Clone)]
pub enum Checksum {
    /// CRC-32 state.
    Crc32(Crc32),
    /// Adler-32 state.
    Adler32(Adler32),
    /// Checksumming disabled.
    None,
}

impl Checksum {
    /// Create a fresh checksum of the given kind.
    pub fn new(kind: ChecksumKind) -> Self {
        match kind {
            ChecksumKind::Crc32 => Self::Crc32(Crc32::new()),
            ChecksumKind::Adler32 => Self::Adler32(Adler32::new()),
            ChecksumKind::None => Self::None,
        }
    }

    /// The kind of this checksum.
    pub fn kind(&self) -> ChecksumKind {
        match self {
            Self::Crc32(_) => ChecksumKind::Crc32,
            Self::Adler32(_) => ChecksumKind::Adler32,
            Self::None => ChecksumKind::None,
        }
    }

    /// Fold `data` into the running value.
    #[inline]
    pub fn update(&mut self, data: &[u8]) {
        match self {
            Self::Crc32(crc) => crc.update(data),
            Self::Adler32(adler) => adler.update(data),
            Self::None => {}
        }
    }

    /// Current value.
    pub fn value(&self) -> u32 {
        match self {
            Self::Crc32(crc) => crc.value(),
            Self::Adler32(adler) => adler.value(),
            Self::None => 0,
        }
    }

    /// Restart from the initial value, keeping the kind.
    pub fn reset(&mut self) {
        *self = Self::new(self.kind());
    }
}

impl Default for Checksum {
    fn default() -> Self {
        Self::new(ChecksumKind::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adler32_known_values() {
        assert_eq!(Adler32::checksum(b""), 1);
        assert_eq!(Adler32::checksum(b"a"), 0x00620062);
        assert_eq!(Adler32::checksum(b"Wikipedia"), 0x11E60398);
    }

    #[test]
    fn test_adler32_large_input() {
        // Exercises the modulo reduction across several NMAX chunks.
        let data = vec![0xFFu8; NMAX * 3 + 17];
        let mut split = Adler32::new();
        for part in data.chunks(1000) {
            split.update(part);
        }
        assert_eq!(split.value(), Adler32::checksum(&data));
    }

    #[test]
    fn test_checksum_kinds() {
        let mut crc = Checksum::new(ChecksumKind::Crc32);
        crc.update(b"123456789");
        assert_eq!(crc.value(), 0xCBF43926);

        let mut adler = Checksum::new(ChecksumKind::Adler32);
        adler.update(b"Wikipedia");
        assert_eq!(adler.value(), 0x11E60398);

        let mut none = Checksum::new(ChecksumKind::None);
        none.update(b"anything");
        assert_eq!(none.value(), 0);
    }

    #[test]
    fn test_checksum_reset_keeps_kind() {
        let mut adler = Checksum::new(ChecksumKind::Adler32);
        adler.update(b"data");
        adler.reset();
        assert_eq!(adler.kind(), ChecksumKind::Adler32);
        assert_eq!(adler.value(), 1);
    }
}
