//! Algebraic values.
//!
//! An [`AlgebraicValue`] conforms to exactly one
//! [`AlgebraicType`](crate::AlgebraicType) and mirrors its variants. Values
//! are immutable once constructed and own their children exclusively.

use crate::error::CodecResult;
use crate::wide_int::{i256, u256};
use crate::types::{ProductType, SumType, Typespace};
use crate::AlgebraicType;

/// A sum value: a variant tag plus the variant's payload.
#[derive(Debug, Clone, PartialEq)]
pub struct SumValue {
    /// Zero-based index into the sum type's variant list.
    pub tag: u8,
    /// Payload conforming to the tagged variant's type.
    pub value: Box<AlgebraicValue>,
}

impl SumValue {
    /// Creates a sum value after checking it against `ty`.
    ///
    /// # Errors
    ///
    /// Fails with `InvalidTag` if the tag is out of range and `TypeMismatch`
    /// if the payload does not conform to the tagged variant's type.
    pub fn checked(
        ty: &SumType,
        tag: u8,
        value: AlgebraicValue,
        typespace: &Typespace,
    ) -> CodecResult<Self> {
        let candidate = Self {
            tag,
            value: Box::new(value),
        };
        AlgebraicType::Sum(ty.clone()).check(&AlgebraicValue::Sum(candidate.clone()), typespace)?;
        Ok(candidate)
    }
}

/// A product value: ordered elements.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProductValue {
    /// Elements in declared order.
    pub elements: Vec<AlgebraicValue>,
}

impl ProductValue {
    /// Creates a product value after checking it against `ty`.
    ///
    /// # Errors
    ///
    /// Fails with `TypeMismatch` (carrying the offending field path) if the
    /// element count or any element type does not match.
    pub fn checked(
        ty: &ProductType,
        elements: Vec<AlgebraicValue>,
        typespace: &Typespace,
    ) -> CodecResult<Self> {
        let candidate = Self { elements };
        AlgebraicType::Product(ty.clone())
            .check(&AlgebraicValue::Product(candidate.clone()), typespace)?;
        Ok(candidate)
    }
}

/// An array value: ordered elements of a single element type.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ArrayValue {
    /// Elements in order.
    pub elements: Vec<AlgebraicValue>,
}

/// A value conforming to some [`AlgebraicType`](crate::AlgebraicType).
#[derive(Debug, Clone, PartialEq)]
pub enum AlgebraicValue {
    /// A sum value.
    Sum(SumValue),
    /// A product value.
    Product(ProductValue),
    /// An array value.
    Array(ArrayValue),
    /// Boolean.
    Bool(bool),
    /// Signed 8-bit integer.
    I8(i8),
    /// Unsigned 8-bit integer.
    U8(u8),
    /// Signed 16-bit integer.
    I16(i16),
    /// Unsigned 16-bit integer.
    U16(u16),
    /// Signed 32-bit integer.
    I32(i32),
    /// Unsigned 32-bit integer.
    U32(u32),
    /// Signed 64-bit integer.
    I64(i64),
    /// Unsigned 64-bit integer.
    U64(u64),
    /// Signed 128-bit integer.
    I128(i128),
    /// Unsigned 128-bit integer.
    U128(u128),
    /// Signed 256-bit integer.
    I256(i256),
    /// Unsigned 256-bit integer.
    U256(u256),
    /// IEEE754 single-precision float.
    F32(f32),
    /// IEEE754 double-precision float.
    F64(f64),
    /// UTF-8 string.
    String(String),
}

impl AlgebraicValue {
    /// The unit value: a product with no elements.
    pub fn unit() -> Self {
        Self::Product(ProductValue::default())
    }

    /// Creates a sum value without checking it against a type.
    pub fn sum(tag: u8, value: AlgebraicValue) -> Self {
        Self::Sum(SumValue {
            tag,
            value: Box::new(value),
        })
    }

    /// Creates a product value without checking it against a type.
    pub fn product(elements: Vec<AlgebraicValue>) -> Self {
        Self::Product(ProductValue { elements })
    }

    /// Creates an array value without checking it against a type.
    pub fn array(elements: Vec<AlgebraicValue>) -> Self {
        Self::Array(ArrayValue { elements })
    }

    /// Short description of the value's shape, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Sum(_) => "sum",
            Self::Product(_) => "product",
            Self::Array(_) => "array",
            Self::Bool(_) => "Bool",
            Self::I8(_) => "I8",
            Self::U8(_) => "U8",
            Self::I16(_) => "I16",
            Self::U16(_) => "U16",
            Self::I32(_) => "I32",
            Self::U32(_) => "U32",
            Self::I64(_) => "I64",
            Self::U64(_) => "U64",
            Self::I128(_) => "I128",
            Self::U128(_) => "U128",
            Self::I256(_) => "I256",
            Self::U256(_) => "U256",
            Self::F32(_) => "F32",
            Self::F64(_) => "F64",
            Self::String(_) => "String",
        }
    }

    /// Gets this value as a sum, if it is one.
    pub fn as_sum(&self) -> Option<&SumValue> {
        match self {
            Self::Sum(v) => Some(v),
            _ => None,
        }
    }

    /// Gets this value as a product, if it is one.
    pub fn as_product(&self) -> Option<&ProductValue> {
        match self {
            Self::Product(v) => Some(v),
            _ => None,
        }
    }

    /// Gets this value as an array, if it is one.
    pub fn as_array(&self) -> Option<&[AlgebraicValue]> {
        match self {
            Self::Array(v) => Some(&v.elements),
            _ => None,
        }
    }

    /// Gets this value as a bool, if it is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Gets this value as a `u32`, if it is one.
    pub fn as_u32(&self) -> Option<u32> {
        match self {
            Self::U32(n) => Some(*n),
            _ => None,
        }
    }

    /// Gets this value as a `u64`, if it is one.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::U64(n) => Some(*n),
            _ => None,
        }
    }

    /// Gets this value as a string slice, if it is a string.
    pub fn as_string(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<bool> for AlgebraicValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

macro_rules! impl_from_primitive {
    ($($prim:ty => $variant:ident),* $(,)?) => {
        $(impl From<$prim> for AlgebraicValue {
            fn from(v: $prim) -> Self {
                Self::$variant(v)
            }
        })*
    };
}

impl_from_primitive! {
    i8 => I8, u8 => U8, i16 => I16, u16 => U16, i32 => I32, u32 => U32,
    i64 => I64, u64 => U64, i128 => I128, u128 => U128,
    i256 => I256, u256 => U256, f32 => F32, f64 => F64,
}

impl From<String> for AlgebraicValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for AlgebraicValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ProductTypeElement, SumTypeVariant};

    #[test]
    fn accessors() {
        assert_eq!(AlgebraicValue::Bool(true).as_bool(), Some(true));
        assert_eq!(AlgebraicValue::U32(4).as_u32(), Some(4));
        assert_eq!(AlgebraicValue::U32(4).as_bool(), None);
        assert_eq!(AlgebraicValue::from("hi").as_string(), Some("hi"));
        assert!(AlgebraicValue::unit().as_product().is_some());
    }

    #[test]
    fn from_impls() {
        assert_eq!(AlgebraicValue::from(5u8), AlgebraicValue::U8(5));
        assert_eq!(AlgebraicValue::from(-5i64), AlgebraicValue::I64(-5));
        assert_eq!(AlgebraicValue::from(1.5f32), AlgebraicValue::F32(1.5));
        assert_eq!(
            AlgebraicValue::from(u256::from_u128(9)),
            AlgebraicValue::U256(u256::from_u128(9))
        );
    }

    #[test]
    fn checked_product_rejects_mismatch() {
        let ts = Typespace::new();
        let ty = ProductType::new(vec![
            ProductTypeElement::new("id", AlgebraicType::U32),
            ProductTypeElement::new("name", AlgebraicType::String),
        ]);

        let ok = ProductValue::checked(
            &ty,
            vec![AlgebraicValue::U32(1), AlgebraicValue::from("a")],
            &ts,
        );
        assert!(ok.is_ok());

        let bad = ProductValue::checked(
            &ty,
            vec![AlgebraicValue::U32(1), AlgebraicValue::U32(2)],
            &ts,
        );
        assert!(bad.is_err());
    }

    #[test]
    fn checked_sum_rejects_bad_tag() {
        let ts = Typespace::new();
        let ty = SumType {
            variants: vec![
                SumTypeVariant::unit("none"),
                SumTypeVariant::new("some", AlgebraicType::U32),
            ],
        };

        assert!(SumValue::checked(&ty, 1, AlgebraicValue::U32(3), &ts).is_ok());
        assert!(SumValue::checked(&ty, 5, AlgebraicValue::unit(), &ts).is_err());
        assert!(SumValue::checked(&ty, 1, AlgebraicValue::Bool(false), &ts).is_err());
    }
}
