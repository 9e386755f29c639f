//! BSATN decoder.
//!
//! Decoding is type-driven: the caller supplies the [`AlgebraicType`] the
//! bytes claim to encode, and the decoder consumes exactly the bytes that
//! type prescribes. Short input fails with `TruncatedInput`; an out-of-range
//! sum tag fails with `InvalidTag`.

use crate::error::{CodecError, CodecResult};
use crate::wide_int::{i256, u256};
use crate::source::{ByteSource, SliceSource};
use crate::types::{AlgebraicType, Typespace};
use crate::value::{AlgebraicValue, ArrayValue, ProductValue, SumValue};

/// Decodes a value of type `ty` from `bytes`.
///
/// The whole input must be consumed; leftover bytes fail with
/// `TrailingBytes`, since row payloads are exactly delimited by their
/// containing frame.
///
/// # Errors
///
/// Returns an error if the bytes are truncated, malformed, or do not fully
/// encode a value of `ty`.
pub fn from_bsatn(
    ty: &AlgebraicType,
    typespace: &Typespace,
    bytes: &[u8],
) -> CodecResult<AlgebraicValue> {
    let mut source = SliceSource::new(bytes);
    let value = BsatnDecoder::new(&mut source, typespace).decode(ty)?;
    if !source.is_empty() {
        return Err(CodecError::TrailingBytes {
            len: source.remaining(),
        });
    }
    Ok(value)
}

/// A type-driven BSATN decoder over any [`ByteSource`].
pub struct BsatnDecoder<'a, S> {
    source: &'a mut S,
    typespace: &'a Typespace,
}

impl<'a, S: ByteSource> BsatnDecoder<'a, S> {
    /// Creates a decoder reading from `source`, resolving refs in `typespace`.
    pub fn new(source: &'a mut S, typespace: &'a Typespace) -> Self {
        Self { source, typespace }
    }

    /// Decodes one value of type `ty`.
    pub fn decode(&mut self, ty: &AlgebraicType) -> CodecResult<AlgebraicValue> {
        match ty {
            AlgebraicType::Ref(r) => {
                let resolved = self.typespace.resolve(*r)?.clone();
                self.decode(&resolved)
            }
            AlgebraicType::Sum(sum) => {
                let tag = self.read_u8()?;
                let Some(variant) = sum.variants.get(tag as usize) else {
                    return Err(CodecError::InvalidTag {
                        tag,
                        variant_count: sum.variants.len(),
                    });
                };
                let value = self.decode(&variant.ty)?;
                Ok(AlgebraicValue::Sum(SumValue {
                    tag,
                    value: Box::new(value),
                }))
            }
            AlgebraicType::Product(product) => {
                let mut elements = Vec::with_capacity(product.elements.len());
                for elem in &product.elements {
                    elements.push(self.decode(&elem.ty)?);
                }
                Ok(AlgebraicValue::Product(ProductValue { elements }))
            }
            AlgebraicType::Array(elem_ty) => {
                let count = self.read_u32()? as usize;
                let mut elements = Vec::new();
                for _ in 0..count {
                    elements.push(self.decode(elem_ty)?);
                }
                Ok(AlgebraicValue::Array(ArrayValue { elements }))
            }
            AlgebraicType::Bool => match self.read_u8()? {
                0 => Ok(AlgebraicValue::Bool(false)),
                1 => Ok(AlgebraicValue::Bool(true)),
                other => Err(CodecError::InvalidBool(other)),
            },
            AlgebraicType::I8 => Ok(AlgebraicValue::I8(self.read_u8()? as i8)),
            AlgebraicType::U8 => Ok(AlgebraicValue::U8(self.read_u8()?)),
            AlgebraicType::I16 => {
                Ok(AlgebraicValue::I16(i16::from_le_bytes(self.read_array()?)))
            }
            AlgebraicType::U16 => {
                Ok(AlgebraicValue::U16(u16::from_le_bytes(self.read_array()?)))
            }
            AlgebraicType::I32 => {
                Ok(AlgebraicValue::I32(i32::from_le_bytes(self.read_array()?)))
            }
            AlgebraicType::U32 => Ok(AlgebraicValue::U32(self.read_u32()?)),
            AlgebraicType::I64 => {
                Ok(AlgebraicValue::I64(i64::from_le_bytes(self.read_array()?)))
            }
            AlgebraicType::U64 => {
                Ok(AlgebraicValue::U64(u64::from_le_bytes(self.read_array()?)))
            }
            AlgebraicType::I128 => {
                Ok(AlgebraicValue::I128(i128::from_le_bytes(self.read_array()?)))
            }
            AlgebraicType::U128 => {
                Ok(AlgebraicValue::U128(u128::from_le_bytes(self.read_array()?)))
            }
            AlgebraicType::I256 => {
                Ok(AlgebraicValue::I256(i256::from_le_bytes(self.read_array()?)))
            }
            AlgebraicType::U256 => {
                Ok(AlgebraicValue::U256(u256::from_le_bytes(self.read_array()?)))
            }
            AlgebraicType::F32 => Ok(AlgebraicValue::F32(f32::from_bits(u32::from_le_bytes(
                self.read_array()?,
            )))),
            AlgebraicType::F64 => Ok(AlgebraicValue::F64(f64::from_bits(u64::from_le_bytes(
                self.read_array()?,
            )))),
            AlgebraicType::String => {
                let len = self.read_u32()? as usize;
                let mut bytes = vec![0u8; len];
                self.source.read_exact(&mut bytes)?;
                let s = String::from_utf8(bytes).map_err(|_| CodecError::InvalidUtf8)?;
                Ok(AlgebraicValue::String(s))
            }
        }
    }

    fn read_u8(&mut self) -> CodecResult<u8> {
        let mut buf = [0u8; 1];
        self.source.read_exact(&mut buf)?;
        Ok(buf[0])
    }

    fn read_u32(&mut self) -> CodecResult<u32> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    fn read_array<const N: usize>(&mut self) -> CodecResult<[u8; N]> {
        let mut buf = [0u8; N];
        self.source.read_exact(&mut buf)?;
        Ok(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::to_bsatn;
    use crate::source::ChunkSource;
    use crate::types::{ProductTypeElement, SumTypeVariant, TypeRef};

    fn shape_type() -> AlgebraicType {
        AlgebraicType::sum(vec![
            SumTypeVariant::new("circle", AlgebraicType::I32),
            SumTypeVariant::new(
                "rectangle",
                AlgebraicType::product(vec![
                    ProductTypeElement::new("w", AlgebraicType::I32),
                    ProductTypeElement::new("h", AlgebraicType::I32),
                ]),
            ),
        ])
    }

    #[test]
    fn decode_rectangle_example() {
        let ts = Typespace::new();
        let bytes = [1, 4, 0, 0, 0, 6, 0, 0, 0];
        let value = from_bsatn(&shape_type(), &ts, &bytes).unwrap();
        assert_eq!(
            value,
            AlgebraicValue::sum(
                1,
                AlgebraicValue::product(vec![AlgebraicValue::I32(4), AlgebraicValue::I32(6)])
            )
        );
    }

    #[test]
    fn decode_invalid_tag() {
        let ts = Typespace::new();
        let err = from_bsatn(&shape_type(), &ts, &[2, 0, 0, 0, 0]).unwrap_err();
        assert_eq!(
            err,
            CodecError::InvalidTag {
                tag: 2,
                variant_count: 2
            }
        );
    }

    #[test]
    fn decode_invalid_bool() {
        let ts = Typespace::new();
        let err = from_bsatn(&AlgebraicType::Bool, &ts, &[3]).unwrap_err();
        assert_eq!(err, CodecError::InvalidBool(3));
    }

    #[test]
    fn decode_invalid_utf8() {
        let ts = Typespace::new();
        let err = from_bsatn(&AlgebraicType::String, &ts, &[2, 0, 0, 0, 0xff, 0xfe]).unwrap_err();
        assert_eq!(err, CodecError::InvalidUtf8);
    }

    #[test]
    fn decode_truncated_never_partial() {
        let ts = Typespace::new();
        let row_ty = AlgebraicType::product(vec![
            ProductTypeElement::new("id", AlgebraicType::U32),
            ProductTypeElement::new("name", AlgebraicType::String),
        ]);
        let full = to_bsatn(&AlgebraicValue::product(vec![
            AlgebraicValue::U32(1),
            AlgebraicValue::from("abc"),
        ]));

        // Every strict prefix fails with TruncatedInput.
        for cut in 0..full.len() {
            let err = from_bsatn(&row_ty, &ts, &full[..cut]).unwrap_err();
            assert!(
                matches!(err, CodecError::TruncatedInput { .. }),
                "prefix of {cut} bytes gave {err:?}"
            );
        }
    }

    #[test]
    fn decode_trailing_bytes_rejected() {
        let ts = Typespace::new();
        let err = from_bsatn(&AlgebraicType::U8, &ts, &[1, 2]).unwrap_err();
        assert_eq!(err, CodecError::TrailingBytes { len: 1 });
    }

    #[test]
    fn decode_through_typespace_ref() {
        let mut ts = Typespace::new();
        let r = ts.add(AlgebraicType::U16);
        let value = from_bsatn(&AlgebraicType::Ref(r), &ts, &[0x34, 0x12]).unwrap();
        assert_eq!(value, AlgebraicValue::U16(0x1234));
    }

    #[test]
    fn decode_unresolved_ref() {
        let ts = Typespace::new();
        let err = from_bsatn(&AlgebraicType::Ref(TypeRef(3)), &ts, &[0]).unwrap_err();
        assert_eq!(err, CodecError::UnresolvedRef(3));
    }

    #[test]
    fn decode_from_chunked_source() {
        let ts = Typespace::new();
        let row_ty = AlgebraicType::product(vec![
            ProductTypeElement::new("id", AlgebraicType::U64),
            ProductTypeElement::new("name", AlgebraicType::String),
        ]);
        let value = AlgebraicValue::product(vec![
            AlgebraicValue::U64(0x0102030405060708),
            AlgebraicValue::from("chunked"),
        ]);
        let bytes = to_bsatn(&value);

        // Deliver one byte at a time: primitives straddle every boundary.
        let mut source = ChunkSource::new();
        for b in &bytes {
            source.push(vec![*b]);
        }
        let decoded = BsatnDecoder::new(&mut source, &ts).decode(&row_ty).unwrap();
        assert_eq!(decoded, value);
    }

    #[test]
    fn chunked_source_short_read_is_truncated() {
        let ts = Typespace::new();
        let mut source = ChunkSource::new();
        source.push(vec![0x01u8, 0x02]);
        let err = BsatnDecoder::new(&mut source, &ts)
            .decode(&AlgebraicType::U32)
            .unwrap_err();
        assert!(matches!(err, CodecError::TruncatedInput { .. }));
    }

    #[test]
    fn roundtrip_wide_integers() {
        let ts = Typespace::new();
        for value in [
            AlgebraicValue::I128(i128::MIN),
            AlgebraicValue::U128(u128::MAX),
            AlgebraicValue::I256(i256::from_i128(-42)),
            AlgebraicValue::U256(u256::from_limbs([1, 2, 3, 4])),
        ] {
            let ty = match &value {
                AlgebraicValue::I128(_) => AlgebraicType::I128,
                AlgebraicValue::U128(_) => AlgebraicType::U128,
                AlgebraicValue::I256(_) => AlgebraicType::I256,
                _ => AlgebraicType::U256,
            };
            let bytes = to_bsatn(&value);
            assert_eq!(from_bsatn(&ty, &ts, &bytes).unwrap(), value);
        }
    }
}
