use std::fmt;

use crate::results::{Row, Rows};

/// Builds a domain value from a result row.
///
/// `Args` carries caller-supplied constructor arguments; the iterating forms
/// hand them to every row. Implementations read columns by name and decide
/// what a missing column means, so result shapes narrower than the target
/// type are acceptable.
pub trait FromRow: Sized {
    type Args: Clone;

    fn from_row(row: &Row, args: &Self::Args) -> Self;
}

/// Iterator adapter that hydrates each row into a `T`.
pub struct ObjectRows<T: FromRow> {
    rows: Rows,
    args: T::Args,
}

impl<T: FromRow> ObjectRows<T> {
    pub(crate) fn new(rows: Rows, args: T::Args) -> Self {
        Self { rows, args }
    }

    /// True when no rows remain to hydrate.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Total number of rows the originating query produced.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.row_count()
    }
}

impl<T: FromRow> Iterator for ObjectRows<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        let row = self.rows.next()?;
        Some(T::from_row(&row, &self.args))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.rows.size_hint()
    }
}

impl<T: FromRow> ExactSizeIterator for ObjectRows<T> {}

impl<T: FromRow> fmt::Debug for ObjectRows<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectRows")
            .field("remaining", &self.rows.len())
            .finish()
    }
}

impl Rows {
    /// Turn the remaining rows into hydrated values of `T`.
    #[must_use]
    pub fn hydrate<T: FromRow>(self, args: T::Args) -> ObjectRows<T> {
        ObjectRows::new(self, args)
    }
}
