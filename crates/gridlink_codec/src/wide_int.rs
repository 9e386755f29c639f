//! 256-bit integers stored as 4 little-endian 64-bit limbs.
//!
//! These exist so that 256-bit table columns round-trip byte-exactly through
//! the wire format. Arithmetic is out of scope; only construction, comparison,
//! and the little-endian byte conversions the codec needs are provided.

use std::cmp::Ordering;
use std::fmt;

/// An unsigned 256-bit integer.
#[allow(non_camel_case_types)]
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct u256 {
    /// Limbs in little-endian order: `limbs[0]` is least significant.
    limbs: [u64; 4],
}

impl u256 {
    /// The value zero.
    pub const ZERO: Self = Self { limbs: [0; 4] };

    /// Builds a value from little-endian limbs.
    pub const fn from_limbs(limbs: [u64; 4]) -> Self {
        Self { limbs }
    }

    /// Widens a `u128` into the low half.
    pub const fn from_u128(v: u128) -> Self {
        Self {
            limbs: [v as u64, (v >> 64) as u64, 0, 0],
        }
    }

    /// Returns the little-endian byte representation.
    pub fn to_le_bytes(self) -> [u8; 32] {
        let mut out = [0u8; 32];
        for (i, limb) in self.limbs.iter().enumerate() {
            out[i * 8..(i + 1) * 8].copy_from_slice(&limb.to_le_bytes());
        }
        out
    }

    /// Builds a value from little-endian bytes.
    pub fn from_le_bytes(bytes: [u8; 32]) -> Self {
        let mut limbs = [0u64; 4];
        for (i, limb) in limbs.iter_mut().enumerate() {
            let mut chunk = [0u8; 8];
            chunk.copy_from_slice(&bytes[i * 8..(i + 1) * 8]);
            *limb = u64::from_le_bytes(chunk);
        }
        Self { limbs }
    }
}

impl Ord for u256 {
    fn cmp(&self, other: &Self) -> Ordering {
        // Most significant limb decides first.
        self.limbs.iter().rev().cmp(other.limbs.iter().rev())
    }
}

impl PartialOrd for u256 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl From<u128> for u256 {
    fn from(v: u128) -> Self {
        Self::from_u128(v)
    }
}

impl fmt::Debug for u256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "u256(0x{:016x}{:016x}{:016x}{:016x})",
            self.limbs[3], self.limbs[2], self.limbs[1], self.limbs[0]
        )
    }
}

/// A signed 256-bit integer in two's complement.
#[allow(non_camel_case_types)]
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct i256 {
    /// Limbs in little-endian order: `limbs[0]` is least significant.
    limbs: [u64; 4],
}

impl i256 {
    /// The value zero.
    pub const ZERO: Self = Self { limbs: [0; 4] };

    /// Builds a value from little-endian limbs.
    pub const fn from_limbs(limbs: [u64; 4]) -> Self {
        Self { limbs }
    }

    /// Sign-extends an `i128` into 256 bits.
    pub const fn from_i128(v: i128) -> Self {
        let ext = if v < 0 { u64::MAX } else { 0 };
        Self {
            limbs: [v as u64, (v >> 64) as u64, ext, ext],
        }
    }

    /// Returns true if the value is negative.
    pub const fn is_negative(self) -> bool {
        self.limbs[3] >> 63 == 1
    }

    /// Returns the little-endian byte representation.
    pub fn to_le_bytes(self) -> [u8; 32] {
        u256 { limbs: self.limbs }.to_le_bytes()
    }

    /// Builds a value from little-endian bytes.
    pub fn from_le_bytes(bytes: [u8; 32]) -> Self {
        Self {
            limbs: u256::from_le_bytes(bytes).limbs,
        }
    }
}

impl Ord for i256 {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.is_negative(), other.is_negative()) {
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            // Same sign: two's complement magnitude order matches unsigned order.
            _ => self.limbs.iter().rev().cmp(other.limbs.iter().rev()),
        }
    }
}

impl PartialOrd for i256 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl From<i128> for i256 {
    fn from(v: i128) -> Self {
        Self::from_i128(v)
    }
}

impl fmt::Debug for i256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "i256(0x{:016x}{:016x}{:016x}{:016x})",
            self.limbs[3], self.limbs[2], self.limbs[1], self.limbs[0]
        )
    }
}
