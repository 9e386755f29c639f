//! Fluent, immutable schema builders.
//!
//! Every chain step takes `&self` and returns a fresh builder carrying the
//! accumulated metadata, so a partially-configured builder can be shared and
//! reused without aliasing surprises. Constraint combinations are not
//! cross-validated here; see [`TableDef::validate`].

use crate::table::{schedule_at_type, ColumnDef, IndexAlgorithm, IndexDef, TableDef};
use gridlink_codec::AlgebraicType;

/// Builder for a single column.
#[derive(Debug, Clone)]
pub struct ColumnBuilder {
    def: ColumnDef,
}

impl ColumnBuilder {
    /// Starts a column with a name and type and no constraints.
    pub fn new(name: impl Into<String>, ty: AlgebraicType) -> Self {
        Self {
            def: ColumnDef {
                name: name.into(),
                ty,
                is_primary_key: false,
                is_unique: false,
                is_auto_inc: false,
                index: None,
                is_schedule_at: false,
            },
        }
    }

    /// Marks the column as the table's primary key.
    pub fn primary_key(&self) -> Self {
        let mut next = self.clone();
        next.def.is_primary_key = true;
        next
    }

    /// Requires values in the column to be unique.
    pub fn unique(&self) -> Self {
        let mut next = self.clone();
        next.def.is_unique = true;
        next
    }

    /// Lets the server assign increasing values on insert.
    pub fn auto_inc(&self) -> Self {
        let mut next = self.clone();
        next.def.is_auto_inc = true;
        next
    }

    /// Adds a single-column index.
    pub fn index(&self, algorithm: IndexAlgorithm) -> Self {
        let mut next = self.clone();
        next.def.index = Some(algorithm);
        next
    }

    /// Marks the column as the row's schedule.
    ///
    /// This fixes the column's type to the two-variant schedule sum
    /// `{ interval | time }`, regardless of the type it was declared with.
    pub fn schedule_at(&self) -> Self {
        let mut next = self.clone();
        next.def.is_schedule_at = true;
        next.def.ty = schedule_at_type();
        next
    }

    /// Freezes the column descriptor.
    pub fn build(&self) -> ColumnDef {
        self.def.clone()
    }
}

/// Builder for a table descriptor.
#[derive(Debug, Clone)]
pub struct TableBuilder {
    def: TableDef,
}

impl TableBuilder {
    /// Starts a private table with no columns.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            def: TableDef {
                name: name.into(),
                is_public: false,
                columns: Vec::new(),
                indexes: Vec::new(),
                scheduled_reducer: None,
            },
        }
    }

    /// Makes the table visible to clients.
    pub fn public(&self) -> Self {
        let mut next = self.clone();
        next.def.is_public = true;
        next
    }

    /// Appends a column.
    pub fn column(&self, column: ColumnBuilder) -> Self {
        let mut next = self.clone();
        next.def.columns.push(column.build());
        next
    }

    /// Appends a named multi-column index.
    pub fn index(
        &self,
        name: impl Into<String>,
        algorithm: IndexAlgorithm,
        columns: Vec<&str>,
    ) -> Self {
        let mut next = self.clone();
        next.def.indexes.push(IndexDef {
            name: name.into(),
            algorithm,
            columns: columns.into_iter().map(str::to_string).collect(),
        });
        next
    }

    /// Binds the reducer invoked when a scheduled row's due time arrives.
    pub fn scheduled(&self, reducer: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.def.scheduled_reducer = Some(reducer.into());
        next
    }

    /// Freezes the table descriptor.
    pub fn build(&self) -> TableDef {
        self.def.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chaining_accumulates_metadata() {
        let col = ColumnBuilder::new("id", AlgebraicType::U64)
            .primary_key()
            .unique()
            .auto_inc()
            .build();
        assert!(col.is_primary_key);
        assert!(col.is_unique);
        assert!(col.is_auto_inc);
        assert_eq!(col.ty, AlgebraicType::U64);
    }

    #[test]
    fn chaining_never_mutates_earlier_builders() {
        let base = ColumnBuilder::new("email", AlgebraicType::String);
        let keyed = base.primary_key();
        let indexed = base.index(IndexAlgorithm::Hash);

        // `base` is untouched; the two derived builders diverge independently.
        assert!(!base.build().is_primary_key);
        assert!(base.build().index.is_none());
        assert!(keyed.build().is_primary_key);
        assert!(keyed.build().index.is_none());
        assert!(!indexed.build().is_primary_key);
        assert_eq!(indexed.build().index, Some(IndexAlgorithm::Hash));
    }

    #[test]
    fn schedule_at_fixes_column_type() {
        let col = ColumnBuilder::new("at", AlgebraicType::U32).schedule_at().build();
        assert!(col.is_schedule_at);
        assert_eq!(col.ty, schedule_at_type());
    }

    #[test]
    fn table_builder_is_immutable_per_step() {
        let base = TableBuilder::new("users")
            .column(ColumnBuilder::new("id", AlgebraicType::U32).primary_key());
        let with_name = base.column(ColumnBuilder::new("name", AlgebraicType::String));
        let public = base.public();

        assert_eq!(base.build().columns.len(), 1);
        assert!(!base.build().is_public);
        assert_eq!(with_name.build().columns.len(), 2);
        assert!(public.build().is_public);
        assert_eq!(public.build().columns.len(), 1);
    }

    #[test]
    fn builder_does_not_cross_validate() {
        // Nothing stops an auto-inc string at build time; validate() catches it.
        let table = TableBuilder::new("t")
            .column(ColumnBuilder::new("s", AlgebraicType::String).auto_inc())
            .build();
        assert!(table.validate().is_err());
    }
}
