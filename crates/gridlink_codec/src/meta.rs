//! Wire encoding of type descriptions themselves.
//!
//! An [`AlgebraicType`] is just another sum, so it travels under the same
//! rules as any value: one u8 tag per variant, u32 LE length prefixes,
//! little-endian fields. Schema publication and the snapshot frame's table
//! descriptors use this.

use crate::error::{CodecError, CodecResult};
use crate::source::{ByteSource, SliceSource};
use crate::types::{
    AlgebraicType, ProductTypeElement, SumTypeVariant, TypeRef,
};

/// Number of variants in the `AlgebraicType` meta-sum.
const TYPE_VARIANT_COUNT: usize = 20;

/// Appends the wire encoding of `ty` to `buf`.
pub fn put_type(ty: &AlgebraicType, buf: &mut Vec<u8>) {
    match ty {
        AlgebraicType::Ref(r) => {
            buf.push(0);
            buf.extend_from_slice(&r.0.to_le_bytes());
        }
        AlgebraicType::Sum(sum) => {
            buf.push(1);
            buf.extend_from_slice(&(sum.variants.len() as u32).to_le_bytes());
            for variant in &sum.variants {
                put_str(&variant.name, buf);
                put_type(&variant.ty, buf);
            }
        }
        AlgebraicType::Product(product) => {
            buf.push(2);
            buf.extend_from_slice(&(product.elements.len() as u32).to_le_bytes());
            for elem in &product.elements {
                put_str(&elem.name, buf);
                put_type(&elem.ty, buf);
            }
        }
        AlgebraicType::Array(elem) => {
            buf.push(3);
            put_type(elem, buf);
        }
        AlgebraicType::Bool => buf.push(4),
        AlgebraicType::I8 => buf.push(5),
        AlgebraicType::U8 => buf.push(6),
        AlgebraicType::I16 => buf.push(7),
        AlgebraicType::U16 => buf.push(8),
        AlgebraicType::I32 => buf.push(9),
        AlgebraicType::U32 => buf.push(10),
        AlgebraicType::I64 => buf.push(11),
        AlgebraicType::U64 => buf.push(12),
        AlgebraicType::I128 => buf.push(13),
        AlgebraicType::U128 => buf.push(14),
        AlgebraicType::I256 => buf.push(15),
        AlgebraicType::U256 => buf.push(16),
        AlgebraicType::F32 => buf.push(17),
        AlgebraicType::F64 => buf.push(18),
        AlgebraicType::String => buf.push(19),
    }
}

/// Reads one wire-encoded type from `source`.
///
/// # Errors
///
/// Fails with `TruncatedInput` on short input, `InvalidTag` on an unknown
/// type tag, and `InvalidUtf8` on a malformed name.
pub fn get_type<S: ByteSource>(source: &mut S) -> CodecResult<AlgebraicType> {
    let tag = read_u8(source)?;
    Ok(match tag {
        0 => AlgebraicType::Ref(TypeRef(read_u32(source)?)),
        1 => {
            let count = read_u32(source)? as usize;
            let mut variants = Vec::new();
            for _ in 0..count {
                let name = get_str(source)?;
                let ty = get_type(source)?;
                variants.push(SumTypeVariant::new(name, ty));
            }
            AlgebraicType::sum(variants)
        }
        2 => {
            let count = read_u32(source)? as usize;
            let mut elements = Vec::new();
            for _ in 0..count {
                let name = get_str(source)?;
                let ty = get_type(source)?;
                elements.push(ProductTypeElement::new(name, ty));
            }
            AlgebraicType::product(elements)
        }
        3 => AlgebraicType::array(get_type(source)?),
        4 => AlgebraicType::Bool,
        5 => AlgebraicType::I8,
        6 => AlgebraicType::U8,
        7 => AlgebraicType::I16,
        8 => AlgebraicType::U16,
        9 => AlgebraicType::I32,
        10 => AlgebraicType::U32,
        11 => AlgebraicType::I64,
        12 => AlgebraicType::U64,
        13 => AlgebraicType::I128,
        14 => AlgebraicType::U128,
        15 => AlgebraicType::I256,
        16 => AlgebraicType::U256,
        17 => AlgebraicType::F32,
        18 => AlgebraicType::F64,
        19 => AlgebraicType::String,
        other => {
            return Err(CodecError::InvalidTag {
                tag: other,
                variant_count: TYPE_VARIANT_COUNT,
            })
        }
    })
}

/// Encodes a type to its own byte buffer.
pub fn type_to_bytes(ty: &AlgebraicType) -> Vec<u8> {
    let mut buf = Vec::new();
    put_type(ty, &mut buf);
    buf
}

/// Decodes a type from a complete byte buffer.
///
/// # Errors
///
/// As [`get_type`], plus `TrailingBytes` if input remains after the type.
pub fn type_from_bytes(bytes: &[u8]) -> CodecResult<AlgebraicType> {
    let mut source = SliceSource::new(bytes);
    let ty = get_type(&mut source)?;
    if !source.is_empty() {
        return Err(CodecError::TrailingBytes {
            len: source.remaining(),
        });
    }
    Ok(ty)
}

/// Appends a u32-length-prefixed UTF-8 string.
pub fn put_str(s: &str, buf: &mut Vec<u8>) {
    buf.extend_from_slice(&(s.len() as u32).to_le_bytes());
    buf.extend_from_slice(s.as_bytes());
}

/// Reads a u32-length-prefixed UTF-8 string.
///
/// # Errors
///
/// Fails with `TruncatedInput` on short input or `InvalidUtf8`.
pub fn get_str<S: ByteSource>(source: &mut S) -> CodecResult<String> {
    let len = read_u32(source)? as usize;
    let mut bytes = vec![0u8; len];
    source.read_exact(&mut bytes)?;
    String::from_utf8(bytes).map_err(|_| CodecError::InvalidUtf8)
}

fn read_u8<S: ByteSource>(source: &mut S) -> CodecResult<u8> {
    let mut buf = [0u8; 1];
    source.read_exact(&mut buf)?;
    Ok(buf[0])
}

fn read_u32<S: ByteSource>(source: &mut S) -> CodecResult<u32> {
    let mut buf = [0u8; 4];
    source.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}
