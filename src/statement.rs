use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::SqlFacadeError;
use crate::outcome::ExecOutcome;
use crate::results::ResultSet;
use crate::types::SqlValue;

/// Strings longer than this many bytes bind as blobs.
pub(crate) const BLOB_BIND_THRESHOLD: usize = 1_048_576;

/// Wire kind inferred for one input slot, following the classic client
/// binding codes: integer, double, string, blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Int,
    Double,
    Str,
    Blob,
}

/// Infer the binding kind from a value. Integral values (booleans included)
/// bind as integers, floats as doubles, oversized text and binary data as
/// blobs, everything else as strings.
#[must_use]
pub fn infer_kind(value: &SqlValue) -> ParamKind {
    match value {
        SqlValue::Int(_) | SqlValue::UInt(_) | SqlValue::Bool(_) => ParamKind::Int,
        SqlValue::Float(_) => ParamKind::Double,
        SqlValue::Blob(_) => ParamKind::Blob,
        SqlValue::Text(s) if s.len() > BLOB_BIND_THRESHOLD => ParamKind::Blob,
        _ => ParamKind::Str,
    }
}

/// One bound input slot: the value and its inferred wire kind.
pub(crate) type BoundParam = (ParamKind, SqlValue);

/// What one execution hands back from the backend.
pub(crate) struct DriverExec {
    pub insert_id: i64,
    pub affected: u64,
    /// Buffered rows when the statement produced columns, None for pure
    /// write statements.
    pub rows: Option<ResultSet>,
}

/// Backend half of a prepared statement: runs the compiled statement with
/// the current input slots. The shared state machine in [`Statement`] does
/// everything else.
pub(crate) trait StatementDriver: Send {
    fn execute(&mut self, params: &[BoundParam]) -> Result<DriverExec, SqlFacadeError>;
}

/// Caller-visible output slots of a prepared statement.
///
/// Bound once via [`Statement::bind_out`]; each successful
/// [`Statement::next`] overwrites the slots with the fetched row's values
/// in column order. Clones share the same buffer.
#[derive(Debug, Clone, Default)]
pub struct OutputRow {
    slots: Arc<Mutex<Vec<SqlValue>>>,
}

impl OutputRow {
    /// Value of one slot, cloned out. None when the index is out of range
    /// or no row has been fetched yet.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<SqlValue> {
        lock_recovering(&self.slots).get(index).cloned()
    }

    /// Snapshot of every slot.
    #[must_use]
    pub fn values(&self) -> Vec<SqlValue> {
        lock_recovering(&self.slots).clone()
    }

    fn store(&self, values: Vec<SqlValue>) {
        *lock_recovering(&self.slots) = values;
    }
}

struct StatementState {
    driver: Option<Box<dyn StatementDriver>>,
    in_slots: Vec<BoundParam>,
    out_row: Option<OutputRow>,
    pending: Option<ResultSet>,
}

/// A re-executable prepared statement.
///
/// The handle is cloneable and every clone shares the same state, so the
/// facade's statement cache and the caller can hold the same statement;
/// closing through any clone closes them all. Operations on a closed
/// statement are inert: they report failure through their ordinary return
/// shape instead of panicking.
#[derive(Clone)]
pub struct Statement {
    sql: Arc<String>,
    inner: Arc<Mutex<StatementState>>,
}

impl Statement {
    pub(crate) fn new(sql: Arc<String>, driver: Box<dyn StatementDriver>) -> Self {
        Self {
            sql,
            inner: Arc::new(Mutex::new(StatementState {
                driver: Some(driver),
                in_slots: Vec::new(),
                out_row: None,
                pending: None,
            })),
        }
    }

    /// The query text this statement was compiled from.
    #[must_use]
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Bind the full input slot list, inferring each slot's wire kind from
    /// its value. Replaces any previous bindings.
    ///
    /// Returns false when the statement is closed.
    pub fn bind_in(&self, values: Vec<SqlValue>) -> bool {
        let mut state = lock_recovering(&self.inner);
        if state.driver.is_none() {
            return false;
        }
        state.in_slots = values
            .into_iter()
            .map(|value| (infer_kind(&value), value))
            .collect();
        true
    }

    /// Rewrite one input slot in place, re-inferring its kind. The next
    /// `execute` sends the updated value; no re-binding needed.
    ///
    /// Returns false when the statement is closed or the slot does not
    /// exist.
    pub fn set_in(&self, slot: usize, value: SqlValue) -> bool {
        let mut state = lock_recovering(&self.inner);
        if state.driver.is_none() {
            return false;
        }
        match state.in_slots.get_mut(slot) {
            Some(entry) => {
                *entry = (infer_kind(&value), value);
                true
            }
            None => false,
        }
    }

    /// Bind the positional output buffer. The same buffer is returned on
    /// repeat calls.
    ///
    /// # Errors
    ///
    /// Returns `SqlFacadeError::StatementClosed` when the statement has
    /// been closed.
    pub fn bind_out(&self) -> Result<OutputRow, SqlFacadeError> {
        let mut state = lock_recovering(&self.inner);
        if state.driver.is_none() {
            return Err(SqlFacadeError::StatementClosed);
        }
        Ok(state.out_row.get_or_insert_with(OutputRow::default).clone())
    }

    /// Run the statement with the current input slots.
    ///
    /// Reports the auto-generated insert id when there is one, else the
    /// affected-row count when positive, else plain success. A closed
    /// statement reports `ExecOutcome::Failed` without running anything.
    /// Rows produced by the statement are buffered for [`Statement::next`].
    ///
    /// # Errors
    ///
    /// Native driver errors pass through.
    pub fn execute(&self) -> Result<ExecOutcome, SqlFacadeError> {
        let mut guard = lock_recovering(&self.inner);
        let state = &mut *guard;
        let Some(driver) = state.driver.as_mut() else {
            return Ok(ExecOutcome::Failed);
        };

        let run = driver.execute(&state.in_slots)?;
        state.pending = run.rows;

        Ok(if run.insert_id != 0 {
            ExecOutcome::Inserted(run.insert_id)
        } else if run.affected > 0 {
            ExecOutcome::Affected(run.affected)
        } else {
            ExecOutcome::Done
        })
    }

    /// Advance to the next buffered row, refreshing the output buffer when
    /// one is bound. False when exhausted or when the statement is closed.
    pub fn next(&self) -> bool {
        let mut state = lock_recovering(&self.inner);
        if state.driver.is_none() {
            return false;
        }
        let Some(values) = state.pending.as_mut().and_then(ResultSet::next_values) else {
            return false;
        };
        if let Some(out_row) = &state.out_row {
            out_row.store(values);
        }
        true
    }

    /// Close the statement. Idempotent; clones of this handle observe the
    /// closed state as well.
    pub fn close(&self) {
        let mut state = lock_recovering(&self.inner);
        state.driver = None;
        state.pending = None;
        state.in_slots.clear();
    }

    /// Whether the native statement handle is still live.
    #[must_use]
    pub fn is_open(&self) -> bool {
        lock_recovering(&self.inner).driver.is_some()
    }
}

impl fmt::Debug for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Statement")
            .field("sql", &self.sql)
            .field("open", &self.is_open())
            .finish()
    }
}

// A poisoned lock only means another thread panicked mid-operation; the
// guarded state itself stays coherent, so recover and carry on.
pub(crate) fn lock_recovering<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    // Records every execution's parameters and plays back canned results.
    struct FakeDriver {
        seen: Arc<Mutex<Vec<Vec<BoundParam>>>>,
        insert_id: i64,
        affected: u64,
        rows: Option<(Vec<String>, Vec<Vec<SqlValue>>)>,
    }

    impl StatementDriver for FakeDriver {
        fn execute(&mut self, params: &[BoundParam]) -> Result<DriverExec, SqlFacadeError> {
            self.seen.lock().unwrap().push(params.to_vec());
            let rows = self.rows.as_ref().map(|(names, rows)| {
                let mut set = ResultSet::new(Arc::new(names.clone()));
                for row in rows {
                    set.add_row_values(row.clone());
                }
                set
            });
            Ok(DriverExec {
                insert_id: self.insert_id,
                affected: self.affected,
                rows,
            })
        }
    }

    fn fake_statement(driver: FakeDriver) -> Statement {
        Statement::new(Arc::new("SELECT 1".to_string()), Box::new(driver))
    }

    fn recording_driver(seen: &Arc<Mutex<Vec<Vec<BoundParam>>>>) -> FakeDriver {
        FakeDriver {
            seen: Arc::clone(seen),
            insert_id: 0,
            affected: 0,
            rows: None,
        }
    }

    #[test]
    fn kind_inference_covers_each_class() {
        assert_eq!(infer_kind(&SqlValue::Int(5)), ParamKind::Int);
        assert_eq!(infer_kind(&SqlValue::UInt(5)), ParamKind::Int);
        assert_eq!(infer_kind(&SqlValue::Bool(true)), ParamKind::Int);
        assert_eq!(infer_kind(&SqlValue::Float(1.5)), ParamKind::Double);
        assert_eq!(infer_kind(&SqlValue::Text("abc".into())), ParamKind::Str);
        assert_eq!(infer_kind(&SqlValue::Null), ParamKind::Str);
        assert_eq!(infer_kind(&SqlValue::Blob(vec![1, 2])), ParamKind::Blob);
    }

    #[test]
    fn oversized_text_binds_as_blob() {
        let at_limit = SqlValue::Text("x".repeat(BLOB_BIND_THRESHOLD));
        let over_limit = SqlValue::Text("x".repeat(BLOB_BIND_THRESHOLD + 1));
        assert_eq!(infer_kind(&at_limit), ParamKind::Str);
        assert_eq!(infer_kind(&over_limit), ParamKind::Blob);
    }

    #[test]
    fn set_in_rewrites_one_slot_between_executions() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let stmt = fake_statement(recording_driver(&seen));

        assert!(stmt.bind_in(vec![SqlValue::Int(1), SqlValue::Text("a".into())]));
        assert_eq!(stmt.execute().unwrap(), ExecOutcome::Done);

        assert!(stmt.set_in(0, SqlValue::Int(2)));
        assert_eq!(stmt.execute().unwrap(), ExecOutcome::Done);

        let seen = seen.lock().unwrap();
        assert_eq!(seen[0][0].1, SqlValue::Int(1));
        assert_eq!(seen[1][0].1, SqlValue::Int(2));
        // The untouched slot rides along unchanged
        assert_eq!(seen[1][1].1, SqlValue::Text("a".into()));
        assert!(!stmt.set_in(5, SqlValue::Null));
    }

    #[test]
    fn execute_reports_insert_id_then_affected_then_done() {
        let seen = Arc::new(Mutex::new(Vec::new()));

        let mut driver = recording_driver(&seen);
        driver.insert_id = 42;
        driver.affected = 3;
        assert_eq!(
            fake_statement(driver).execute().unwrap(),
            ExecOutcome::Inserted(42)
        );

        let mut driver = recording_driver(&seen);
        driver.affected = 3;
        assert_eq!(
            fake_statement(driver).execute().unwrap(),
            ExecOutcome::Affected(3)
        );

        assert_eq!(
            fake_statement(recording_driver(&seen)).execute().unwrap(),
            ExecOutcome::Done
        );
    }

    #[test]
    fn next_refreshes_the_output_buffer() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut driver = recording_driver(&seen);
        driver.rows = Some((
            vec!["id".into(), "name".into()],
            vec![
                vec![SqlValue::Int(1), SqlValue::Text("a".into())],
                vec![SqlValue::Int(2), SqlValue::Text("b".into())],
            ],
        ));
        let stmt = fake_statement(driver);
        let out = stmt.bind_out().unwrap();

        assert_eq!(stmt.execute().unwrap(), ExecOutcome::Done);
        assert!(stmt.next());
        assert_eq!(out.get(0), Some(SqlValue::Int(1)));
        assert_eq!(out.get(1), Some(SqlValue::Text("a".into())));
        assert!(stmt.next());
        assert_eq!(out.get(0), Some(SqlValue::Int(2)));
        assert!(!stmt.next());
        // The last row stays visible after exhaustion
        assert_eq!(out.get(1), Some(SqlValue::Text("b".into())));
    }

    #[test]
    fn closed_statement_is_inert() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let stmt = fake_statement(recording_driver(&seen));

        stmt.close();
        stmt.close();
        assert!(!stmt.is_open());
        assert!(!stmt.bind_in(vec![SqlValue::Int(1)]));
        assert!(!stmt.set_in(0, SqlValue::Int(1)));
        assert_eq!(stmt.execute().unwrap(), ExecOutcome::Failed);
        assert!(!stmt.next());
        assert!(matches!(
            stmt.bind_out(),
            Err(SqlFacadeError::StatementClosed)
        ));
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn clones_share_the_closed_state() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let stmt = fake_statement(recording_driver(&seen));
        let clone = stmt.clone();

        clone.close();
        assert!(!stmt.is_open());
        assert_eq!(stmt.execute().unwrap(), ExecOutcome::Failed);
    }
}
