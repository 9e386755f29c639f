//! Error types for the client crate.

use gridlink_codec::CodecError;
use gridlink_protocol::ProtocolError;
use gridlink_schema::SchemaError;
use thiserror::Error;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur while driving a connection.
///
/// A rejected reducer call is not an error: it arrives as a normal
/// call outcome. These variants cover transport failures, protocol
/// defects, and misuse of the connection API.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClientError {
    /// A row payload failed to decode or a value failed type checking.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// A frame failed to decode.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// A snapshot carried an invalid table descriptor.
    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Network or transport failure.
    #[error("transport error: {message}")]
    Transport {
        /// Error message.
        message: String,
    },

    /// The connection is closed; no further frames will arrive.
    #[error("connection closed")]
    ConnectionClosed,

    /// The requested operation is not legal in the current state.
    #[error("invalid state transition from {from} to {to}")]
    InvalidStateTransition {
        /// Current state.
        from: String,
        /// Attempted target state.
        to: String,
    },

    /// A delta referenced a table id no snapshot has registered.
    #[error("unknown table id {table_id}")]
    UnknownTable {
        /// The unregistered table id.
        table_id: u32,
    },
}

impl ClientError {
    /// Creates a transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        assert_eq!(
            ClientError::ConnectionClosed.to_string(),
            "connection closed"
        );
        assert_eq!(
            ClientError::transport("socket reset").to_string(),
            "transport error: socket reset"
        );
        let err = ClientError::UnknownTable { table_id: 9 };
        assert!(err.to_string().contains('9'));
    }
}
