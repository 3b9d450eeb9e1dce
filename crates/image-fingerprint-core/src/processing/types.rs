//! PerceptualHash type and core methods

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// A perceptual hash of `grid_size * grid_size` bits.
///
/// Bits are stored row-major, bit `i` at word `i / 64`, position `i % 64`.
/// Bits past `len` in the last word are always zero.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PerceptualHash {
    len: usize,
    words: Vec<u64>,
}

impl PerceptualHash {
    /// Build a hash from bits in row-major order
    pub fn from_bits<I: IntoIterator<Item = bool>>(bits: I) -> Self {
        let mut words = Vec::new();
        let mut len = 0;

        for bit in bits {
            if len % 64 == 0 {
                words.push(0);
            }
            if bit {
                words[len / 64] |= 1u64 << (len % 64);
            }
            len += 1;
        }

        Self { len, words }
    }

    /// Number of bits
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Grid side length, if the bit count is a perfect square
    pub fn grid_size(&self) -> Option<u32> {
        let side = (self.len as f64).sqrt().round() as usize;
        (side * side == self.len).then_some(side as u32)
    }

    /// Value of bit `index`
    pub fn bit(&self, index: usize) -> bool {
        assert!(index < self.len, "bit index {} out of range", index);
        (self.words[index / 64] >> (index % 64)) & 1 == 1
    }

    /// Iterate bits in row-major order
    pub fn bits(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.len).map(move |i| self.bit(i))
    }

    pub fn count_ones(&self) -> u32 {
        self.words.iter().map(|w| w.count_ones()).sum()
    }

    /// Calculate the Hamming distance between two perceptual hashes
    pub fn distance(&self, other: &PerceptualHash) -> Result<u32> {
        if self.len != other.len {
            return Err(Error::HashLengthMismatch {
                left: self.len,
                right: other.len,
            });
        }

        Ok(self
            .words
            .iter()
            .zip(&other.words)
            .map(|(a, b)| (a ^ b).count_ones())
            .sum())
    }

    /// Lowercase hex, four bits per digit, first bit as the high bit of the first digit.
    ///
    /// A trailing partial nibble is padded with zero bits.
    pub fn to_hex(&self) -> String {
        let mut hex = String::with_capacity(self.len.div_ceil(4));
        for start in (0..self.len).step_by(4) {
            let nibble = (0..4).fold(0u32, |acc, offset| {
                let i = start + offset;
                (acc << 1) | (i < self.len && self.bit(i)) as u32
            });
            hex.push(char::from_digit(nibble, 16).unwrap_or('0'));
        }
        hex
    }

    /// Parse the output of [`PerceptualHash::to_hex`] back into a hash of `bits` bits
    pub fn from_hex(hex: &str, bits: usize) -> Result<Self> {
        if !hex.is_ascii() {
            return Err(Error::InvalidHash(format!("invalid hex hash '{}'", hex)));
        }
        if hex.len() != bits.div_ceil(4) {
            return Err(Error::InvalidHash(format!(
                "hex hash has {} digits, {} bits need {}",
                hex.len(),
                bits,
                bits.div_ceil(4)
            )));
        }

        let mut values = Vec::with_capacity(hex.len() * 4);
        for c in hex.chars() {
            let nibble = c
                .to_digit(16)
                .ok_or_else(|| Error::InvalidHash(format!("invalid hex digit '{}'", c)))?;
            values.extend((0..4).rev().map(|shift| (nibble >> shift) & 1 == 1));
        }

        if values[bits..].iter().any(|&b| b) {
            return Err(Error::InvalidHash(
                "hex hash has non-zero padding bits".to_string(),
            ));
        }
        values.truncate(bits);

        Ok(Self::from_bits(values))
    }
}

impl fmt::Display for PerceptualHash {
    /// Canonical form: one '0' or '1' per bit, bit 0 first
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for bit in self.bits() {
            f.write_str(if bit { "1" } else { "0" })?;
        }
        Ok(())
    }
}

impl FromStr for PerceptualHash {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let bits = s
            .chars()
            .map(|c| match c {
                '0' => Ok(false),
                '1' => Ok(true),
                other => Err(Error::InvalidHash(format!(
                    "invalid character '{}' in bit string",
                    other
                ))),
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self::from_bits(bits))
    }
}

impl Serialize for PerceptualHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for PerceptualHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
