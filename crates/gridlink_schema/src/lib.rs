//! # GridLink Schema
//!
//! Declarative table and column builders for GridLink schemas.
//!
//! This crate provides:
//! - [`ColumnBuilder`] / [`TableBuilder`]: fluent, immutable construction of
//!   table descriptors with constraint annotations (primary key, unique,
//!   auto-increment, index, schedule-at)
//! - [`TableDef`]: the frozen descriptor, with registration-time validation
//!   of constraint combinations
//!
//! Builders never cross-validate: a nonsensical combination (say,
//! auto-increment on a string column) builds fine and is rejected by
//! [`TableDef::validate`] when the schema is registered.
//!
//! ```
//! use gridlink_codec::AlgebraicType;
//! use gridlink_schema::{ColumnBuilder, TableBuilder};
//!
//! let users = TableBuilder::new("users")
//!     .public()
//!     .column(ColumnBuilder::new("id", AlgebraicType::U32).primary_key().auto_inc())
//!     .column(ColumnBuilder::new("name", AlgebraicType::String))
//!     .build();
//! users.validate().unwrap();
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod builder;
mod error;
mod table;

pub use builder::{ColumnBuilder, TableBuilder};
pub use error::{SchemaError, SchemaResult};
pub use table::{schedule_at_type, ColumnDef, IndexAlgorithm, IndexDef, TableDef};
