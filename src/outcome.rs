/// Outcome of a write-path execution.
///
/// Write paths report, in order: the auto-generated insert id when the
/// statement produced one, else the affected-row count, else plain success.
/// `Failed` is the no-panic sentinel for executing a closed statement.
///
/// `DriverAdapter::exec` never reports `Done`; zero affected rows come back
/// as `Affected(0)`. `Statement::execute` reports `Done` in that case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecOutcome {
    /// The statement generated a new insert id.
    Inserted(i64),
    /// No insert id was generated; this many rows were affected.
    Affected(u64),
    /// The statement ran without inserting or changing anything.
    Done,
    /// The statement could not run (closed statement handle).
    Failed,
}

impl ExecOutcome {
    #[must_use]
    pub fn succeeded(&self) -> bool {
        !matches!(self, Self::Failed)
    }

    #[must_use]
    pub fn insert_id(&self) -> Option<i64> {
        if let Self::Inserted(id) = self {
            Some(*id)
        } else {
            None
        }
    }

    #[must_use]
    pub fn rows_affected(&self) -> Option<u64> {
        if let Self::Affected(n) = self {
            Some(*n)
        } else {
            None
        }
    }
}
