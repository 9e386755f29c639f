//! BSATN encoder.
//!
//! Encoding rules, bit-exact:
//! - bool: one byte, 0 or 1
//! - integers: fixed-width little-endian (128- and 256-bit included)
//! - floats: raw IEEE754 bit pattern, little-endian
//! - string: u32 LE byte length, then UTF-8 bytes
//! - array: u32 LE element count, then each element's encoding
//! - product: element encodings concatenated in declared order; names carry
//!   no bytes
//! - sum: one u8 tag (the variant's index), then the variant payload

use crate::value::AlgebraicValue;

/// Encodes a value to BSATN bytes.
pub fn to_bsatn(value: &AlgebraicValue) -> Vec<u8> {
    let mut encoder = BsatnEncoder::new();
    encoder.encode(value);
    encoder.into_bytes()
}

/// A BSATN encoder accumulating into a byte buffer.
pub struct BsatnEncoder {
    buffer: Vec<u8>,
}

impl BsatnEncoder {
    /// Creates a new encoder.
    pub fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    /// Creates a new encoder with the specified capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
        }
    }

    /// Encodes a value, appending to the buffer.
    pub fn encode(&mut self, value: &AlgebraicValue) {
        match value {
            AlgebraicValue::Sum(v) => {
                self.buffer.push(v.tag);
                self.encode(&v.value);
            }
            AlgebraicValue::Product(v) => {
                for elem in &v.elements {
                    self.encode(elem);
                }
            }
            AlgebraicValue::Array(v) => {
                self.put_len(v.elements.len());
                for elem in &v.elements {
                    self.encode(elem);
                }
            }
            AlgebraicValue::Bool(b) => self.buffer.push(u8::from(*b)),
            AlgebraicValue::I8(n) => self.buffer.extend_from_slice(&n.to_le_bytes()),
            AlgebraicValue::U8(n) => self.buffer.push(*n),
            AlgebraicValue::I16(n) => self.buffer.extend_from_slice(&n.to_le_bytes()),
            AlgebraicValue::U16(n) => self.buffer.extend_from_slice(&n.to_le_bytes()),
            AlgebraicValue::I32(n) => self.buffer.extend_from_slice(&n.to_le_bytes()),
            AlgebraicValue::U32(n) => self.buffer.extend_from_slice(&n.to_le_bytes()),
            AlgebraicValue::I64(n) => self.buffer.extend_from_slice(&n.to_le_bytes()),
            AlgebraicValue::U64(n) => self.buffer.extend_from_slice(&n.to_le_bytes()),
            AlgebraicValue::I128(n) => self.buffer.extend_from_slice(&n.to_le_bytes()),
            AlgebraicValue::U128(n) => self.buffer.extend_from_slice(&n.to_le_bytes()),
            AlgebraicValue::I256(n) => self.buffer.extend_from_slice(&n.to_le_bytes()),
            AlgebraicValue::U256(n) => self.buffer.extend_from_slice(&n.to_le_bytes()),
            // Raw bit pattern: lossless, no rounding.
            AlgebraicValue::F32(f) => self.buffer.extend_from_slice(&f.to_bits().to_le_bytes()),
            AlgebraicValue::F64(f) => self.buffer.extend_from_slice(&f.to_bits().to_le_bytes()),
            AlgebraicValue::String(s) => {
                self.put_len(s.len());
                self.buffer.extend_from_slice(s.as_bytes());
            }
        }
    }

    /// Consumes this encoder and returns the encoded bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }

    /// Gets a reference to the encoded bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    fn put_len(&mut self, len: usize) {
        self.buffer.extend_from_slice(&(len as u32).to_le_bytes());
    }
}

impl Default for BsatnEncoder {
    fn default() -> Self {
        Self::new()
    }
}
