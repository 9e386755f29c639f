//! # GridLink Codec
//!
//! The algebraic type system and BSATN binary codec for GridLink.
//!
//! This crate provides:
//! - [`AlgebraicType`] / [`AlgebraicValue`]: a structural, self-describing
//!   type system of sums, products, arrays, and primitives
//! - [`Typespace`]: a shared registry enabling recursive type references
//! - BSATN encoding/decoding ([`to_bsatn`] / [`from_bsatn`]): fixed-width
//!   little-endian, length-prefixed, tag-dispatched — and byte-exact
//! - Chunked, push-style decoding via [`ByteSource`]
//!
//! ## Round-trip law
//!
//! For every value `v` conforming to type `t`,
//! `from_bsatn(&t, &ts, &to_bsatn(&v)) == Ok(v)`.
//!
//! ```
//! use gridlink_codec::{from_bsatn, to_bsatn, AlgebraicType, AlgebraicValue, Typespace};
//!
//! let ts = Typespace::new();
//! let value = AlgebraicValue::U32(42);
//! let bytes = to_bsatn(&value);
//! assert_eq!(from_bsatn(&AlgebraicType::U32, &ts, &bytes).unwrap(), value);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod decoder;
mod encoder;
mod error;
pub mod meta;
mod source;
mod types;
mod value;
mod wide_int;

pub use decoder::{from_bsatn, BsatnDecoder};
pub use encoder::{to_bsatn, BsatnEncoder};
pub use error::{CodecError, CodecResult};
pub use wide_int::{i256, u256};
pub use source::{ByteSource, ChunkSource, SliceSource};
pub use types::{
    AlgebraicType, ProductType, ProductTypeElement, SumType, SumTypeVariant, TypeRef, Typespace,
};
pub use value::{AlgebraicValue, ArrayValue, ProductValue, SumValue};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_row() {
        let ts = Typespace::new();
        let ty = AlgebraicType::product(vec![
            ProductTypeElement::new("id", AlgebraicType::U32),
            ProductTypeElement::new("name", AlgebraicType::String),
            ProductTypeElement::new("scores", AlgebraicType::array(AlgebraicType::F64)),
        ]);
        let value = AlgebraicValue::product(vec![
            AlgebraicValue::U32(1),
            AlgebraicValue::from("alice"),
            AlgebraicValue::array(vec![AlgebraicValue::F64(0.5), AlgebraicValue::F64(-2.0)]),
        ]);

        ty.check(&value, &ts).unwrap();
        let bytes = to_bsatn(&value);
        let decoded = from_bsatn(&ty, &ts, &bytes).unwrap();
        assert_eq!(decoded, value);
    }

    #[test]
    fn wide_integers_roundtrip_via_reexports() {
        let ts = Typespace::new();
        let value = AlgebraicValue::I256(i256::from_i128(-42));
        let bytes = to_bsatn(&value);
        assert_eq!(from_bsatn(&AlgebraicType::I256, &ts, &bytes).unwrap(), value);

        let value = AlgebraicValue::U256(u256::from_u128(1u128 << 70));
        let bytes = to_bsatn(&value);
        assert_eq!(from_bsatn(&AlgebraicType::U256, &ts, &bytes).unwrap(), value);
    }

    #[test]
    fn reencoding_is_idempotent() {
        let ts = Typespace::new();
        let ty = AlgebraicType::sum(vec![
            SumTypeVariant::unit("none"),
            SumTypeVariant::new("some", AlgebraicType::String),
        ]);
        let value = AlgebraicValue::sum(1, AlgebraicValue::from("payload"));

        let bytes = to_bsatn(&value);
        let decoded = from_bsatn(&ty, &ts, &bytes).unwrap();
        assert_eq!(to_bsatn(&decoded), bytes);
    }
}
