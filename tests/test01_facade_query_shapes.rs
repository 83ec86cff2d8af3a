#![cfg(feature = "sqlite")]

use sql_facade::prelude::*;
use tempfile::tempdir;

fn unique_db_path(prefix: &str) -> String {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join(format!("{prefix}.db"));
    // Leak the tempdir so the file persists for the duration of the test binary.
    std::mem::forget(dir);
    path.to_string_lossy().into_owned()
}

fn seeded_facade() -> Result<DbFacade, SqlFacadeError> {
    let mut db = DbFacade::new_sqlite(SqliteOptions::in_memory());
    db.exec(
        "CREATE TABLE player (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            score INTEGER NOT NULL,
            notes TEXT
        )",
        &[],
    )?;
    db.exec(
        "INSERT INTO player (name, score, notes) VALUES ('ann', 10, NULL)",
        &[],
    )?;
    db.exec(
        "INSERT INTO player (name, score, notes) VALUES ('bob', 0, 'benched')",
        &[],
    )?;
    db.exec(
        "INSERT INTO player (name, score, notes) VALUES ('cay', 7, NULL)",
        &[],
    )?;
    Ok(db)
}

#[test]
fn exec_reports_insert_ids_then_affected_counts() -> Result<(), Box<dyn std::error::Error>> {
    let mut db = DbFacade::new_sqlite(SqliteOptions::new(unique_db_path("exec_shapes")));

    let ddl = db.exec(
        "CREATE TABLE t (id INTEGER PRIMARY KEY AUTOINCREMENT, v TEXT)",
        &[],
    )?;
    assert_eq!(ddl, ExecOutcome::Affected(0));

    assert_eq!(
        db.exec("INSERT INTO t (v) VALUES ('a')", &[])?,
        ExecOutcome::Inserted(1)
    );
    assert_eq!(
        db.exec("INSERT INTO t (v) VALUES (%s)", &[QueryArg::str("'b'")])?,
        ExecOutcome::Inserted(2)
    );

    assert_eq!(db.exec("UPDATE t SET v = 'z'", &[])?, ExecOutcome::Affected(2));
    assert_eq!(
        db.exec("UPDATE t SET v = 'y' WHERE id = %d", &[QueryArg::int(99)])?,
        ExecOutcome::Affected(0)
    );
    assert_eq!(db.exec("DELETE FROM t", &[])?, ExecOutcome::Affected(2));

    Ok(())
}

#[test]
fn value_shapes_keep_nulls_and_zeroes() -> Result<(), Box<dyn std::error::Error>> {
    let mut db = seeded_facade()?;

    let top = db.query_value("SELECT name FROM player ORDER BY score DESC LIMIT 1", &[])?;
    assert_eq!(top, Some(SqlValue::Text("ann".to_string())));

    let missing = db.query_value(
        "SELECT name FROM player WHERE score > %d",
        &[QueryArg::int(99)],
    )?;
    assert_eq!(missing, None);

    // A zero in the column must not end the list early
    let scores = db.query_values("SELECT score FROM player ORDER BY id", &[])?;
    assert_eq!(
        scores,
        vec![SqlValue::Int(10), SqlValue::Int(0), SqlValue::Int(7)]
    );

    // Neither must a NULL
    let notes = db.query_values("SELECT notes FROM player ORDER BY id", &[])?;
    assert_eq!(
        notes,
        vec![
            SqlValue::Null,
            SqlValue::Text("benched".to_string()),
            SqlValue::Null
        ]
    );

    Ok(())
}

#[test]
fn row_shapes_address_by_name_and_position() -> Result<(), Box<dyn std::error::Error>> {
    let mut db = seeded_facade()?;

    let row = db
        .query_row("SELECT name, score FROM player WHERE id = %d", &[QueryArg::int(2)])?
        .expect("row for id 2");
    assert_eq!(row.get("name"), Some(&SqlValue::Text("bob".to_string())));
    assert_eq!(row.get("score"), Some(&SqlValue::Int(0)));
    assert_eq!(row.get("absent"), None);

    let positional = db
        .query_indexed_row("SELECT name, score FROM player WHERE id = %d", &[QueryArg::int(3)])?
        .expect("row for id 3");
    assert_eq!(
        positional,
        vec![SqlValue::Text("cay".to_string()), SqlValue::Int(7)]
    );

    let rows = db.query_rows("SELECT name FROM player ORDER BY id", &[])?;
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].get("name"), Some(&SqlValue::Text("ann".to_string())));

    Ok(())
}

#[test]
fn mapped_rows_collapse_to_scalar_with_two_columns() -> Result<(), Box<dyn std::error::Error>> {
    let mut db = seeded_facade()?;

    let by_name = db.query_mapped_rows("SELECT name, score FROM player ORDER BY id", "name", &[])?;
    assert_eq!(by_name.len(), 3);
    assert_eq!(by_name.get("ann"), Some(&MappedRow::Scalar(SqlValue::Int(10))));
    assert_eq!(by_name.get("bob"), Some(&MappedRow::Scalar(SqlValue::Int(0))));

    // Insertion order follows the result order
    let keys: Vec<&String> = by_name.keys().collect();
    assert_eq!(keys, vec!["ann", "bob", "cay"]);

    Ok(())
}

#[test]
fn mapped_rows_keep_remaining_columns_as_a_map() -> Result<(), Box<dyn std::error::Error>> {
    let mut db = seeded_facade()?;

    let by_name =
        db.query_mapped_rows("SELECT name, score, notes FROM player ORDER BY id", "name", &[])?;
    match by_name.get("bob") {
        Some(MappedRow::Row(rest)) => {
            assert_eq!(rest.get("score"), Some(&SqlValue::Int(0)));
            assert_eq!(rest.get("notes"), Some(&SqlValue::Text("benched".to_string())));
            assert!(!rest.contains_key("name"));
        }
        other => panic!("expected a row value, got {other:?}"),
    }

    Ok(())
}

#[test]
fn mapped_rows_duplicate_keys_take_the_last_row() -> Result<(), Box<dyn std::error::Error>> {
    let mut db = seeded_facade()?;
    db.exec("INSERT INTO player (name, score) VALUES ('ann', 99)", &[])?;

    let by_name = db.query_mapped_rows("SELECT name, score FROM player ORDER BY id", "name", &[])?;
    assert_eq!(by_name.len(), 3);
    assert_eq!(by_name.get("ann"), Some(&MappedRow::Scalar(SqlValue::Int(99))));
    // The duplicate keeps its first position
    let keys: Vec<&String> = by_name.keys().collect();
    assert_eq!(keys, vec!["ann", "bob", "cay"]);

    Ok(())
}

#[test]
fn mapped_rows_reject_an_absent_key_column() -> Result<(), Box<dyn std::error::Error>> {
    let mut db = seeded_facade()?;

    let result = db.query_mapped_rows("SELECT name, score FROM player", "player_id", &[]);
    match result {
        Err(SqlFacadeError::InvalidColumn(column)) => assert_eq!(column, "player_id"),
        other => panic!("expected InvalidColumn, got {other:?}"),
    }

    Ok(())
}

#[test]
fn exists_updates_the_latest_count() -> Result<(), Box<dyn std::error::Error>> {
    let mut db = seeded_facade()?;
    assert_eq!(db.latest_count(), 0);

    let n = db.exists("SELECT * FROM player WHERE score > %d", &[QueryArg::int(0)])?;
    assert_eq!(n, 2);
    assert_eq!(db.latest_count(), 2);

    // The plain query shapes leave the count alone
    db.query_rows("SELECT * FROM player", &[])?;
    assert_eq!(db.latest_count(), 2);

    Ok(())
}

#[test]
fn escaped_text_survives_the_round_trip() -> Result<(), Box<dyn std::error::Error>> {
    let mut db = seeded_facade()?;

    let name = db.esc(&SqlValue::Text("o'brien".to_string()))?;
    db.exec(
        "INSERT INTO player (name, score) VALUES (%s, %d)",
        &[name.clone(), QueryArg::int(3)],
    )?;

    let found = db.query_value("SELECT score FROM player WHERE name = %s", &[name])?;
    assert_eq!(found, Some(SqlValue::Int(3)));

    // Native numbers pass through without quoting
    assert_eq!(db.esc(&SqlValue::Int(-5))?, QueryArg::Int(-5));
    assert_eq!(db.esc(&SqlValue::Float(2.5))?, QueryArg::Float(2.5));

    Ok(())
}

#[test]
fn typed_directives_render_into_the_template() -> Result<(), Box<dyn std::error::Error>> {
    let mut db = seeded_facade()?;

    let value = db.query_value(
        "SELECT name FROM player WHERE score = %d AND %f < 1.0 AND id < %u",
        &[QueryArg::int(7), QueryArg::float(0.5), QueryArg::uint(10)],
    )?;
    assert_eq!(value, Some(SqlValue::Text("cay".to_string())));

    // A template mismatch surfaces before anything reaches the driver
    let result = db.query_value(
        "SELECT * FROM player WHERE id = %d AND score = %d",
        &[QueryArg::int(1)],
    );
    assert!(matches!(result, Err(SqlFacadeError::FormatError(_))));

    // An empty argument list never interprets the template
    let literal = db.query_value("SELECT '100%' FROM player LIMIT 1", &[])?;
    assert_eq!(literal, Some(SqlValue::Text("100%".to_string())));

    Ok(())
}
