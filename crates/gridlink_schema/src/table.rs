//! Frozen table descriptors.
//!
//! A [`TableDef`] is constructed once at schema-definition time (usually via
//! the builders in [`crate::builder`]) and is immutable for the lifetime of a
//! schema version. Constraint conflicts are surfaced by
//! [`TableDef::validate`], never by the builders.

use crate::error::{SchemaError, SchemaResult};
use gridlink_codec::{AlgebraicType, ProductType, ProductTypeElement, SumTypeVariant};

/// Index algorithm tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexAlgorithm {
    /// Ordered index.
    BTree,
    /// Hash index.
    Hash,
}

/// A table column: a named type plus constraint metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    /// Column name.
    pub name: String,
    /// Column type.
    pub ty: AlgebraicType,
    /// Whether this column is the table's primary key.
    pub is_primary_key: bool,
    /// Whether values in this column must be unique.
    pub is_unique: bool,
    /// Whether the server assigns increasing values on insert.
    pub is_auto_inc: bool,
    /// Single-column index, if any.
    pub index: Option<IndexAlgorithm>,
    /// Whether this column holds the row's schedule.
    pub is_schedule_at: bool,
}

/// A named multi-column index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexDef {
    /// Index name.
    pub name: String,
    /// Index algorithm.
    pub algorithm: IndexAlgorithm,
    /// Ordered column names.
    pub columns: Vec<String>,
}

/// An immutable table descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct TableDef {
    /// Table name.
    pub name: String,
    /// Whether the table is visible to clients.
    pub is_public: bool,
    /// Ordered columns.
    pub columns: Vec<ColumnDef>,
    /// Named indexes.
    pub indexes: Vec<IndexDef>,
    /// Reducer invoked when a scheduled row's due time arrives.
    pub scheduled_reducer: Option<String>,
}

/// The built-in schedule sum type: `{ interval: I64 | time: I64 }`.
///
/// Both payloads are microseconds — a duration for `interval` (tag 0) and an
/// epoch timestamp for `time` (tag 1).
pub fn schedule_at_type() -> AlgebraicType {
    AlgebraicType::sum(vec![
        SumTypeVariant::new("interval", AlgebraicType::I64),
        SumTypeVariant::new("time", AlgebraicType::I64),
    ])
}

impl TableDef {
    /// The row type: a product of the columns, in declared order.
    pub fn row_type(&self) -> ProductType {
        ProductType::new(
            self.columns
                .iter()
                .map(|c| ProductTypeElement::new(c.name.clone(), c.ty.clone()))
                .collect(),
        )
    }

    /// Position of the primary-key column, if one is declared.
    pub fn primary_key_index(&self) -> Option<usize> {
        self.columns.iter().position(|c| c.is_primary_key)
    }

    /// Looks up a column by name.
    pub fn column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Validates constraint combinations at registration time.
    ///
    /// # Errors
    ///
    /// Reports the first conflict found: multiple primary keys,
    /// auto-increment on a non-integer column, a schedule-at column whose
    /// type is not the schedule sum, an index naming an unknown column, a
    /// scheduled reducer binding without a schedule-at column, or duplicate
    /// column names.
    pub fn validate(&self) -> SchemaResult<()> {
        let mut primary_key: Option<&str> = None;
        for (i, col) in self.columns.iter().enumerate() {
            if self.columns[..i].iter().any(|c| c.name == col.name) {
                return Err(SchemaError::DuplicateColumn {
                    table: self.name.clone(),
                    column: col.name.clone(),
                });
            }
            if col.is_primary_key {
                if let Some(first) = primary_key {
                    return Err(SchemaError::MultiplePrimaryKeys {
                        table: self.name.clone(),
                        first: first.to_string(),
                        second: col.name.clone(),
                    });
                }
                primary_key = Some(&col.name);
            }
            if col.is_auto_inc && !col.ty.is_integer() {
                return Err(SchemaError::AutoIncNotInteger {
                    table: self.name.clone(),
                    column: col.name.clone(),
                });
            }
            if col.is_schedule_at && col.ty != schedule_at_type() {
                return Err(SchemaError::ScheduleAtWrongType {
                    table: self.name.clone(),
                    column: col.name.clone(),
                });
            }
        }
        for index in &self.indexes {
            for col_name in &index.columns {
                if self.column(col_name).is_none() {
                    return Err(SchemaError::IndexUnknownColumn {
                        table: self.name.clone(),
                        index: index.name.clone(),
                        column: col_name.clone(),
                    });
                }
            }
        }
        if let Some(reducer) = &self.scheduled_reducer {
            if !self.columns.iter().any(|c| c.is_schedule_at) {
                return Err(SchemaError::ScheduledReducerWithoutColumn {
                    table: self.name.clone(),
                    reducer: reducer.clone(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{ColumnBuilder, TableBuilder};

    fn users() -> TableDef {
        TableBuilder::new("users")
            .public()
            .column(ColumnBuilder::new("id", AlgebraicType::U32).primary_key())
            .column(ColumnBuilder::new("name", AlgebraicType::String))
            .build()
    }

    #[test]
    fn row_type_matches_columns() {
        let table = users();
        let row = table.row_type();
        assert_eq!(row.elements.len(), 2);
        assert_eq!(row.elements[0].name, "id");
        assert_eq!(row.elements[0].ty, AlgebraicType::U32);
        assert_eq!(row.elements[1].ty, AlgebraicType::String);
    }

    #[test]
    fn valid_table_passes() {
        assert!(users().validate().is_ok());
        assert_eq!(users().primary_key_index(), Some(0));
    }

    #[test]
    fn multiple_primary_keys_rejected() {
        let table = TableBuilder::new("bad")
            .column(ColumnBuilder::new("a", AlgebraicType::U32).primary_key())
            .column(ColumnBuilder::new("b", AlgebraicType::U32).primary_key())
            .build();
        assert!(matches!(
            table.validate(),
            Err(SchemaError::MultiplePrimaryKeys { .. })
        ));
    }

    #[test]
    fn auto_inc_requires_integer() {
        let table = TableBuilder::new("bad")
            .column(ColumnBuilder::new("name", AlgebraicType::String).auto_inc())
            .build();
        assert!(matches!(
            table.validate(),
            Err(SchemaError::AutoIncNotInteger { .. })
        ));

        let wide = TableBuilder::new("ok")
            .column(ColumnBuilder::new("id", AlgebraicType::U256).auto_inc())
            .build();
        assert!(wide.validate().is_ok());
    }

    #[test]
    fn index_must_reference_known_columns() {
        let table = TableBuilder::new("bad")
            .column(ColumnBuilder::new("a", AlgebraicType::U32))
            .index("by_missing", IndexAlgorithm::BTree, vec!["missing"])
            .build();
        assert!(matches!(
            table.validate(),
            Err(SchemaError::IndexUnknownColumn { .. })
        ));
    }

    #[test]
    fn scheduled_reducer_needs_schedule_column() {
        let table = TableBuilder::new("jobs")
            .column(ColumnBuilder::new("id", AlgebraicType::U64).primary_key())
            .scheduled("run_job")
            .build();
        assert!(matches!(
            table.validate(),
            Err(SchemaError::ScheduledReducerWithoutColumn { .. })
        ));

        let ok = TableBuilder::new("jobs")
            .column(ColumnBuilder::new("id", AlgebraicType::U64).primary_key())
            .column(ColumnBuilder::new("at", AlgebraicType::Bool).schedule_at())
            .scheduled("run_job")
            .build();
        // schedule_at() replaced the declared type with the schedule sum.
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn duplicate_columns_rejected() {
        let table = TableBuilder::new("bad")
            .column(ColumnBuilder::new("a", AlgebraicType::U32))
            .column(ColumnBuilder::new("a", AlgebraicType::U64))
            .build();
        assert!(matches!(
            table.validate(),
            Err(SchemaError::DuplicateColumn { .. })
        ));
    }
}
