//! Error types for the protocol crate.

use gridlink_codec::CodecError;
use thiserror::Error;

/// Result type for protocol operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;

/// Errors that can occur while encoding or decoding protocol frames.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// A payload failed to decode.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// The frame tag byte is not a known frame kind.
    #[error("unknown frame tag {tag}")]
    UnknownFrame {
        /// The unrecognized tag byte.
        tag: u8,
    },

    /// A field carried a byte outside its legal range.
    #[error("invalid {field} byte {value}")]
    InvalidField {
        /// Name of the field.
        field: &'static str,
        /// The out-of-range byte.
        value: u8,
    },
}
