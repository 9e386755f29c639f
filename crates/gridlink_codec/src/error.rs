//! Error types for the codec crate.

use thiserror::Error;

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur during type checking, encoding, or decoding.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The input ended before the type's full encoding was read.
    #[error("input truncated: needed {needed} bytes, {available} available")]
    TruncatedInput {
        /// Number of bytes the decoder asked for.
        needed: usize,
        /// Number of bytes that were actually available.
        available: usize,
    },

    /// A sum tag byte was out of range for the type's variant list.
    #[error("invalid sum tag {tag} (type has {variant_count} variants)")]
    InvalidTag {
        /// The tag byte read from the input.
        tag: u8,
        /// Number of variants the sum type declares.
        variant_count: usize,
    },

    /// A bool byte was neither 0 nor 1.
    #[error("byte {0} is not a valid bool (must be 0 or 1)")]
    InvalidBool(u8),

    /// A string payload was not valid UTF-8.
    #[error("invalid UTF-8 string")]
    InvalidUtf8,

    /// A type reference pointed outside the typespace.
    #[error("unresolved type ref &{0}")]
    UnresolvedRef(u32),

    /// A top-level decode left bytes unconsumed.
    #[error("{len} trailing bytes after decoded value")]
    TrailingBytes {
        /// Number of unconsumed bytes.
        len: usize,
    },

    /// A value does not conform to its declared type.
    #[error("type mismatch at `{path}`: expected {expected}, found {found}")]
    TypeMismatch {
        /// Path to the offending field, e.g. `.pos.coords[1]`.
        path: String,
        /// Description of the expected type.
        expected: String,
        /// Description of the value that was found.
        found: String,
    },
}

impl CodecError {
    /// Create a type mismatch error at the given field path.
    pub fn type_mismatch(
        path: impl Into<String>,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        Self::TypeMismatch {
            path: path.into(),
            expected: expected.into(),
            found: found.into(),
        }
    }
}
