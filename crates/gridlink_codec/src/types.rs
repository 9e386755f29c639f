//! The algebraic type system.
//!
//! Every value GridLink moves over the wire is described by an
//! [`AlgebraicType`]: a closed, structural description built from sums,
//! products, arrays, and primitive scalars. Type descriptions may refer to
//! other types indirectly through a [`Typespace`], which is how recursive
//! schemas are expressed without infinite expansion.

use crate::error::{CodecError, CodecResult};
use crate::value::AlgebraicValue;
use std::fmt::Write as _;

/// An index into a [`Typespace`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeRef(pub u32);

/// A named variant of a [`SumType`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SumTypeVariant {
    /// Variant name. Metadata only; never encoded.
    pub name: String,
    /// Payload type of the variant.
    pub ty: AlgebraicType,
}

impl SumTypeVariant {
    /// Creates a variant with a payload type.
    pub fn new(name: impl Into<String>, ty: AlgebraicType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }

    /// Creates a variant with no payload (unit product).
    pub fn unit(name: impl Into<String>) -> Self {
        Self::new(name, AlgebraicType::unit())
    }
}

/// A tagged union: an ordered list of named variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SumType {
    /// Ordered variants. A value's tag byte indexes into this list.
    pub variants: Vec<SumTypeVariant>,
}

/// A named element of a [`ProductType`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductTypeElement {
    /// Element name. Metadata only; never encoded.
    pub name: String,
    /// Type of the element.
    pub ty: AlgebraicType,
}

impl ProductTypeElement {
    /// Creates a named element.
    pub fn new(name: impl Into<String>, ty: AlgebraicType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// A struct: an ordered list of named, typed elements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductType {
    /// Ordered elements.
    pub elements: Vec<ProductTypeElement>,
}

impl ProductType {
    /// Creates a product type from elements.
    pub fn new(elements: Vec<ProductTypeElement>) -> Self {
        Self { elements }
    }
}

/// A closed, recursive description of a value's shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlgebraicType {
    /// An indirect reference resolved through a [`Typespace`].
    Ref(TypeRef),
    /// A tagged union.
    Sum(SumType),
    /// A struct.
    Product(ProductType),
    /// A homogeneous, length-prefixed sequence.
    Array(Box<AlgebraicType>),
    /// Boolean.
    Bool,
    /// Signed 8-bit integer.
    I8,
    /// Unsigned 8-bit integer.
    U8,
    /// Signed 16-bit integer.
    I16,
    /// Unsigned 16-bit integer.
    U16,
    /// Signed 32-bit integer.
    I32,
    /// Unsigned 32-bit integer.
    U32,
    /// Signed 64-bit integer.
    I64,
    /// Unsigned 64-bit integer.
    U64,
    /// Signed 128-bit integer.
    I128,
    /// Unsigned 128-bit integer.
    U128,
    /// Signed 256-bit integer.
    I256,
    /// Unsigned 256-bit integer.
    U256,
    /// IEEE754 single-precision float.
    F32,
    /// IEEE754 double-precision float.
    F64,
    /// UTF-8 string.
    String,
}

impl AlgebraicType {
    /// The unit type: a product with no elements. Encodes to zero bytes.
    pub fn unit() -> Self {
        Self::Product(ProductType::new(Vec::new()))
    }

    /// Creates a sum type from variants.
    pub fn sum(variants: Vec<SumTypeVariant>) -> Self {
        Self::Sum(SumType { variants })
    }

    /// Creates a product type from elements.
    pub fn product(elements: Vec<ProductTypeElement>) -> Self {
        Self::Product(ProductType::new(elements))
    }

    /// Creates an array type with the given element type.
    pub fn array(elem: AlgebraicType) -> Self {
        Self::Array(Box::new(elem))
    }

    /// Returns true for the integer primitives, any width.
    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            Self::I8
                | Self::U8
                | Self::I16
                | Self::U16
                | Self::I32
                | Self::U32
                | Self::I64
                | Self::U64
                | Self::I128
                | Self::U128
                | Self::I256
                | Self::U256
        )
    }

    /// Checks that `value` conforms to this type.
    ///
    /// Walks both structures recursively. A mismatch is reported as
    /// [`CodecError::TypeMismatch`] carrying the path to the offending field,
    /// e.g. `.pos.coords[1]`.
    pub fn check(&self, value: &AlgebraicValue, typespace: &Typespace) -> CodecResult<()> {
        self.check_at(value, typespace, String::new())
    }

    fn check_at(
        &self,
        value: &AlgebraicValue,
        typespace: &Typespace,
        path: String,
    ) -> CodecResult<()> {
        let mismatch = |found: &AlgebraicValue| {
            Err(CodecError::type_mismatch(
                if path.is_empty() { "." } else { &path },
                format!("{self:?}"),
                found.kind(),
            ))
        };

        match (self, value) {
            (Self::Ref(r), _) => typespace.resolve(*r)?.check_at(value, typespace, path),
            (Self::Sum(sum), AlgebraicValue::Sum(v)) => {
                let Some(variant) = sum.variants.get(v.tag as usize) else {
                    return Err(CodecError::InvalidTag {
                        tag: v.tag,
                        variant_count: sum.variants.len(),
                    });
                };
                let mut sub = path;
                let _ = write!(sub, ".{}", variant.name);
                variant.ty.check_at(&v.value, typespace, sub)
            }
            (Self::Product(product), AlgebraicValue::Product(v)) => {
                if product.elements.len() != v.elements.len() {
                    return Err(CodecError::type_mismatch(
                        if path.is_empty() { "." } else { &path },
                        format!("product with {} elements", product.elements.len()),
                        format!("product with {} elements", v.elements.len()),
                    ));
                }
                for (elem_ty, elem) in product.elements.iter().zip(&v.elements) {
                    let mut sub = path.clone();
                    let _ = write!(sub, ".{}", elem_ty.name);
                    elem_ty.ty.check_at(elem, typespace, sub)?;
                }
                Ok(())
            }
            (Self::Array(elem_ty), AlgebraicValue::Array(v)) => {
                for (i, elem) in v.elements.iter().enumerate() {
                    let mut sub = path.clone();
                    let _ = write!(sub, "[{i}]");
                    elem_ty.check_at(elem, typespace, sub)?;
                }
                Ok(())
            }
            (Self::Bool, AlgebraicValue::Bool(_))
            | (Self::I8, AlgebraicValue::I8(_))
            | (Self::U8, AlgebraicValue::U8(_))
            | (Self::I16, AlgebraicValue::I16(_))
            | (Self::U16, AlgebraicValue::U16(_))
            | (Self::I32, AlgebraicValue::I32(_))
            | (Self::U32, AlgebraicValue::U32(_))
            | (Self::I64, AlgebraicValue::I64(_))
            | (Self::U64, AlgebraicValue::U64(_))
            | (Self::I128, AlgebraicValue::I128(_))
            | (Self::U128, AlgebraicValue::U128(_))
            | (Self::I256, AlgebraicValue::I256(_))
            | (Self::U256, AlgebraicValue::U256(_))
            | (Self::F32, AlgebraicValue::F32(_))
            | (Self::F64, AlgebraicValue::F64(_))
            | (Self::String, AlgebraicValue::String(_)) => Ok(()),
            (_, found) => mismatch(found),
        }
    }
}

/// A shared registry of type definitions, indexed by [`TypeRef`].
///
/// Recursive or mutually-recursive schemas reference each other through the
/// typespace instead of expanding inline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Typespace {
    types: Vec<AlgebraicType>,
}

impl Typespace {
    /// Creates an empty typespace.
    pub const fn new() -> Self {
        Self { types: Vec::new() }
    }

    /// Adds a type and returns its reference.
    pub fn add(&mut self, ty: AlgebraicType) -> TypeRef {
        let r = TypeRef(self.types.len() as u32);
        self.types.push(ty);
        r
    }

    /// Resolves a reference to its type definition.
    pub fn resolve(&self, r: TypeRef) -> CodecResult<&AlgebraicType> {
        self.types
            .get(r.0 as usize)
            .ok_or(CodecError::UnresolvedRef(r.0))
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns true if no types are registered.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{ProductValue, SumValue};

    fn point_type() -> AlgebraicType {
        AlgebraicType::product(vec![
            ProductTypeElement::new("x", AlgebraicType::I32),
            ProductTypeElement::new("y", AlgebraicType::I32),
        ])
    }

    #[test]
    fn primitive_check() {
        let ts = Typespace::new();
        assert!(AlgebraicType::U32.check(&AlgebraicValue::U32(7), &ts).is_ok());
        assert!(AlgebraicType::U32.check(&AlgebraicValue::I32(7), &ts).is_err());
    }

    #[test]
    fn product_check_reports_path() {
        let ts = Typespace::new();
        let ty = point_type();
        let bad = AlgebraicValue::Product(ProductValue {
            elements: vec![AlgebraicValue::I32(1), AlgebraicValue::String("no".into())],
        });
        let err = ty.check(&bad, &ts).unwrap_err();
        match err {
            CodecError::TypeMismatch { path, .. } => assert_eq!(path, ".y"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn product_arity_mismatch() {
        let ts = Typespace::new();
        let ty = point_type();
        let bad = AlgebraicValue::Product(ProductValue {
            elements: vec![AlgebraicValue::I32(1)],
        });
        assert!(matches!(
            ty.check(&bad, &ts),
            Err(CodecError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn array_check_reports_index() {
        let ts = Typespace::new();
        let ty = AlgebraicType::array(AlgebraicType::U8);
        let bad = AlgebraicValue::array(vec![
            AlgebraicValue::U8(1),
            AlgebraicValue::Bool(true),
        ]);
        let err = ty.check(&bad, &ts).unwrap_err();
        match err {
            CodecError::TypeMismatch { path, .. } => assert_eq!(path, "[1]"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn sum_tag_bounds() {
        let ts = Typespace::new();
        let ty = AlgebraicType::sum(vec![
            SumTypeVariant::new("circle", AlgebraicType::I32),
            SumTypeVariant::new("rectangle", point_type()),
        ]);
        let bad = AlgebraicValue::Sum(SumValue {
            tag: 2,
            value: Box::new(AlgebraicValue::unit()),
        });
        assert!(matches!(
            ty.check(&bad, &ts),
            Err(CodecError::InvalidTag {
                tag: 2,
                variant_count: 2
            })
        ));
    }

    #[test]
    fn check_through_typespace_ref() {
        let mut ts = Typespace::new();
        let point_ref = ts.add(point_type());
        let ty = AlgebraicType::array(AlgebraicType::Ref(point_ref));
        let good = AlgebraicValue::array(vec![AlgebraicValue::product(vec![
            AlgebraicValue::I32(1),
            AlgebraicValue::I32(2),
        ])]);
        assert!(ty.check(&good, &ts).is_ok());
    }

    #[test]
    fn unresolved_ref() {
        let ts = Typespace::new();
        let ty = AlgebraicType::Ref(TypeRef(9));
        let err = ty.check(&AlgebraicValue::unit(), &ts).unwrap_err();
        assert_eq!(err, CodecError::UnresolvedRef(9));
    }
}
