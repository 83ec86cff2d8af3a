use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use super::row::Row;
use crate::types::SqlValue;

/// A client-buffered query result with a forward-only cursor.
///
/// The adapter reads every row of the native result into one of these, so
/// the native handle is released as soon as the query returns. The total row
/// count stays available after rows have been consumed, which is what the
/// count-then-iterate callers rely on.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    column_names: Arc<Vec<String>>,
    column_index_cache: Arc<HashMap<String, usize>>,
    rows: VecDeque<Vec<SqlValue>>,
    total_rows: usize,
}

impl ResultSet {
    /// Create an empty result set for the given header.
    #[must_use]
    pub fn new(column_names: Arc<Vec<String>>) -> Self {
        Self::with_capacity(column_names, 0)
    }

    /// Create a result set with preallocated row capacity.
    #[must_use]
    pub fn with_capacity(column_names: Arc<Vec<String>>, capacity: usize) -> Self {
        // One lookup cache per result set, shared by every row it produces
        let cache = Arc::new(
            column_names
                .iter()
                .enumerate()
                .map(|(i, name)| (name.clone(), i))
                .collect::<HashMap<_, _>>(),
        );

        Self {
            column_names,
            column_index_cache: cache,
            rows: VecDeque::with_capacity(capacity),
            total_rows: 0,
        }
    }

    /// A result set with no columns and no rows.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Append a row of values in column order.
    pub fn add_row_values(&mut self, values: Vec<SqlValue>) {
        self.rows.push_back(values);
        self.total_rows += 1;
    }

    /// Column names shared by all rows.
    #[must_use]
    pub fn column_names(&self) -> &Arc<Vec<String>> {
        &self.column_names
    }

    /// Total number of rows the query produced, regardless of how many have
    /// been consumed since.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.total_rows
    }

    /// Rows not yet consumed by the cursor.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.rows.len()
    }

    /// Advance the cursor and return the next row, or None when exhausted.
    pub fn next_row(&mut self) -> Option<Row> {
        let values = self.rows.pop_front()?;
        Some(Row {
            column_names: Arc::clone(&self.column_names),
            values,
            column_index_cache: Arc::clone(&self.column_index_cache),
        })
    }

    /// Advance the cursor and return the next row's positional values.
    pub fn next_values(&mut self) -> Option<Vec<SqlValue>> {
        self.rows.pop_front()
    }

    /// Advance the cursor and return the first cell of the next row.
    pub fn next_value(&mut self) -> Option<SqlValue> {
        self.next_values()
            .map(|values| values.into_iter().next().unwrap_or(SqlValue::Null))
    }

    /// Drain every remaining row.
    pub fn drain_rows(&mut self) -> Vec<Row> {
        let mut out = Vec::with_capacity(self.rows.len());
        while let Some(row) = self.next_row() {
            out.push(row);
        }
        out
    }
}
