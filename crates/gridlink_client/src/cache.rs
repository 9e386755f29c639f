//! Client-side row cache.
//!
//! One [`TableCache`] mirrors the server's visible rows for one table.
//! Rows are keyed by their primary-key bytes when the table declares a
//! primary key, and by their full row encoding otherwise. Each entry is
//! reference counted: overlapping subscriptions may deliver the same row
//! more than once, and the row stays visible until every delivery has
//! been matched by a delete.

use gridlink_codec::{to_bsatn, ProductValue};
use gridlink_schema::TableDef;
use std::collections::HashMap;

/// Computes the cache key for a row.
///
/// The BSATN encoding of the primary-key column if the table declares one,
/// otherwise the full row encoding. Byte-exact encoding makes equal values
/// produce equal keys.
pub fn row_key(table: &TableDef, row: &ProductValue, bsatn: &[u8]) -> Vec<u8> {
    match table.primary_key_index() {
        Some(i) => to_bsatn(&row.elements[i]),
        None => bsatn.to_vec(),
    }
}

/// Outcome of applying an insert to the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The row was not present and is now visible.
    Added,
    /// The row was already visible; its reference count was bumped.
    Duplicate,
}

/// Outcome of applying a delete to the cache.
#[derive(Debug, PartialEq)]
pub enum DeleteOutcome {
    /// The last reference was released; the row is no longer visible.
    Removed(ProductValue),
    /// Other references remain; the row stays visible.
    Retained,
    /// No such row was cached.
    Missing,
}

#[derive(Debug)]
struct CachedRow {
    row: ProductValue,
    bsatn: Vec<u8>,
    refs: u32,
}

/// The materialized rows of one table.
#[derive(Debug, Default)]
pub struct TableCache {
    rows: HashMap<Vec<u8>, CachedRow>,
}

impl TableCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of visible rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if no rows are visible.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Looks up a row by its cache key.
    pub fn get(&self, key: &[u8]) -> Option<&ProductValue> {
        self.rows.get(key).map(|entry| &entry.row)
    }

    /// Iterates over all visible rows, in no particular order.
    pub fn rows(&self) -> impl Iterator<Item = &ProductValue> {
        self.rows.values().map(|entry| &entry.row)
    }

    /// Replaces the entire contents with a snapshot's rows.
    ///
    /// Every row starts with a reference count of one; a row delivered more
    /// than once within the snapshot is counted per delivery.
    pub fn replace_all(&mut self, rows: impl IntoIterator<Item = (Vec<u8>, ProductValue, Vec<u8>)>) {
        self.rows.clear();
        for (key, row, bsatn) in rows {
            self.insert(key, row, bsatn);
        }
    }

    /// Applies an insert.
    pub fn insert(&mut self, key: Vec<u8>, row: ProductValue, bsatn: Vec<u8>) -> InsertOutcome {
        match self.rows.entry(key) {
            std::collections::hash_map::Entry::Occupied(mut slot) => {
                slot.get_mut().refs += 1;
                InsertOutcome::Duplicate
            }
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(CachedRow {
                    row,
                    bsatn,
                    refs: 1,
                });
                InsertOutcome::Added
            }
        }
    }

    /// Applies a delete, releasing one reference.
    pub fn delete(&mut self, key: &[u8]) -> DeleteOutcome {
        let Some(entry) = self.rows.get_mut(key) else {
            return DeleteOutcome::Missing;
        };
        if entry.refs > 1 {
            entry.refs -= 1;
            return DeleteOutcome::Retained;
        }
        match self.rows.remove(key) {
            Some(entry) => DeleteOutcome::Removed(entry.row),
            None => DeleteOutcome::Missing,
        }
    }

    /// Replaces the value stored under `key`, preserving its reference
    /// count. Returns the previous row, or `None` if no row was cached.
    pub fn update(
        &mut self,
        key: &[u8],
        row: ProductValue,
        bsatn: Vec<u8>,
    ) -> Option<ProductValue> {
        let entry = self.rows.get_mut(key)?;
        let old = std::mem::replace(&mut entry.row, row);
        entry.bsatn = bsatn;
        Some(old)
    }
}
