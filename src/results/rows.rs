use super::result_set::ResultSet;
use super::row::Row;

/// Owning iterator over a buffered result set.
///
/// Taking one of these out of an adapter detaches the result, so issuing
/// another query on the same connection cannot invalidate rows still being
/// consumed. Forward-only and not restartable.
#[derive(Debug, Default)]
pub struct Rows {
    set: Option<ResultSet>,
}

impl Rows {
    pub(crate) fn from_set(set: ResultSet) -> Self {
        Self { set: Some(set) }
    }

    /// An iterator over no rows at all.
    ///
    /// Distinct from a lazy handle that happens to produce nothing: callers
    /// can test emptiness before consuming anything.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// True when no rows remain.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.set.as_ref().is_none_or(|s| s.remaining() == 0)
    }

    /// Total number of rows the originating query produced.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.set.as_ref().map_or(0, ResultSet::row_count)
    }
}

impl Iterator for Rows {
    type Item = Row;

    fn next(&mut self) -> Option<Row> {
        self.set.as_mut().and_then(ResultSet::next_row)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.set.as_ref().map_or(0, ResultSet::remaining);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Rows {}
