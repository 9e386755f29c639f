//! Error types for schema validation.

use thiserror::Error;

/// Result type for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Errors reported when a completed schema is registered.
///
/// The builders themselves never cross-validate constraints; conflicts
/// surface here, at registration time, and are never silently accepted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// More than one column is marked primary key.
    #[error("table `{table}` declares multiple primary keys: `{first}` and `{second}`")]
    MultiplePrimaryKeys {
        /// Table name.
        table: String,
        /// First primary-key column.
        first: String,
        /// Conflicting primary-key column.
        second: String,
    },

    /// Auto-increment on a column whose type is not an integer.
    #[error("auto-increment column `{column}` in table `{table}` is not integer-typed")]
    AutoIncNotInteger {
        /// Table name.
        table: String,
        /// Offending column.
        column: String,
    },

    /// A schedule-at column whose type is not the schedule sum.
    #[error("schedule-at column `{column}` in table `{table}` does not have the schedule sum type")]
    ScheduleAtWrongType {
        /// Table name.
        table: String,
        /// Offending column.
        column: String,
    },

    /// An index references a column the table does not declare.
    #[error("index `{index}` in table `{table}` references unknown column `{column}`")]
    IndexUnknownColumn {
        /// Table name.
        table: String,
        /// Index name.
        index: String,
        /// Missing column name.
        column: String,
    },

    /// A scheduled reducer binding without a schedule-at column.
    #[error("table `{table}` binds scheduled reducer `{reducer}` but has no schedule-at column")]
    ScheduledReducerWithoutColumn {
        /// Table name.
        table: String,
        /// Bound reducer name.
        reducer: String,
    },

    /// Two columns share a name.
    #[error("table `{table}` declares column `{column}` more than once")]
    DuplicateColumn {
        /// Table name.
        table: String,
        /// Duplicated column name.
        column: String,
    },
}
