//! # GridLink Protocol
//!
//! Protocol frame types and byte codecs for GridLink.
//!
//! This crate provides:
//! - [`ClientFrame`] / [`ServerFrame`]: the frames exchanged over the
//!   transport (subscribe, reducer calls, snapshots, transaction updates)
//! - Wire codecs for table descriptors ([`put_table`] / [`get_table`]),
//!   the schema registration surface
//!
//! This is a pure protocol crate with no I/O operations. Row payloads inside
//! frames are exactly the BSATN encoding of the table's row product type,
//! with no per-row framing beyond the frame's own length prefixes.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod frames;

pub use error::{ProtocolError, ProtocolResult};
pub use frames::{
    get_table, put_table, CallReducer, CallResult, CallStatus, ClientFrame, InitialSnapshot,
    ServerFrame, Subscribe, TableDelta, TableSnapshot, TransactionUpdate, Unsubscribe,
};
