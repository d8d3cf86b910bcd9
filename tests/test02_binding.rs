use sql_stmt::prelude::*;
use sql_stmt::test_utils::RecordingDriver;

#[test]
fn bind_value_freezes_at_bind_time() -> Result<(), StmtError> {
    let driver = RecordingDriver::new();
    let mut stmt = PreparedStatement::prepare(
        &driver,
        "SELECT * FROM t WHERE x = :x",
        StatementOptions::default(),
    )?;

    let mut x = 5;
    stmt.bind_value(":x", x, ParamType::Integer)?;
    x += 1;
    assert_eq!(x, 6);
    stmt.execute()?;

    assert_eq!(driver.last_call().unwrap().values, vec![TypedValue::Int(5)]);
    Ok(())
}

#[test]
fn bind_param_reads_at_execute_time() -> Result<(), StmtError> {
    let driver = RecordingDriver::new();
    let mut stmt = PreparedStatement::prepare(
        &driver,
        "SELECT * FROM t WHERE x = :x",
        StatementOptions::default(),
    )?;

    let handle = ParamCell::new(5);
    stmt.bind_param(":x", &handle, ParamType::Integer)?;
    handle.set(6);
    stmt.execute()?;
    handle.set(7);
    stmt.execute()?;

    let sent: Vec<Vec<TypedValue>> = driver.calls().into_iter().map(|c| c.values).collect();
    assert_eq!(sent, vec![vec![TypedValue::Int(6)], vec![TypedValue::Int(7)]]);
    Ok(())
}

#[test]
fn repeated_named_placeholder_repeats_value() -> Result<(), StmtError> {
    let driver = RecordingDriver::new();
    let sql = "SELECT * FROM orders WHERE customer = :cid OR referrer = :cid AND status = :status";
    let mut stmt = PreparedStatement::prepare(&driver, sql, StatementOptions::default())?;
    stmt.bind_value("cid", 42, ParamType::Integer)?
        .bind_value("status", "open", ParamType::String)?;
    stmt.execute()?;

    let call = driver.last_call().unwrap();
    assert_eq!(call.sql, sql);
    assert_eq!(
        call.values,
        vec![
            TypedValue::Int(42),
            TypedValue::Int(42),
            TypedValue::Text("open".into())
        ]
    );
    Ok(())
}

#[test]
fn re_execution_yields_independent_results() -> Result<(), StmtError> {
    let driver = RecordingDriver::echo();
    let mut stmt = PreparedStatement::prepare(&driver, "SELECT ?", StatementOptions::default())?;

    stmt.bind_value(0usize, 1, ParamType::Integer)?;
    let first = stmt.execute()?;
    let first_rows = first.fetch_all(FetchStyle::Positional)?;

    stmt.bind_value(0usize, 2, ParamType::Integer)?;
    let second = stmt.execute()?;
    let second_rows = second.fetch_all(FetchStyle::Positional)?;

    assert_eq!(first_rows, vec![FetchedRow::Positional(vec![TypedValue::Int(1)])]);
    assert_eq!(second_rows, vec![FetchedRow::Positional(vec![TypedValue::Int(2)])]);
    assert_eq!(first.generation(), 1);
    assert_eq!(second.generation(), 2);
    assert_eq!(stmt.executions(), 2);
    Ok(())
}

#[test]
fn execute_args_bind_by_ordinal_in_one_step() -> Result<(), StmtError> {
    let driver = RecordingDriver::new();
    let mut stmt = PreparedStatement::prepare(
        &driver,
        "INSERT INTO users (name, age) VALUES (?, ?)",
        StatementOptions::default(),
    )?;
    stmt.execute_with(&["Ann".into(), TypedValue::Int(33)])?;
    stmt.execute_with(&["Bob".into(), TypedValue::Null])?;

    let sent: Vec<Vec<TypedValue>> = driver.calls().into_iter().map(|c| c.values).collect();
    assert_eq!(
        sent,
        vec![
            vec![TypedValue::Text("Ann".into()), TypedValue::Int(33)],
            vec![TypedValue::Text("Bob".into()), TypedValue::Null],
        ]
    );
    Ok(())
}

#[test]
fn execute_args_conflict_with_explicit_bindings() -> Result<(), StmtError> {
    let driver = RecordingDriver::new();
    let mut stmt = PreparedStatement::prepare(&driver, "SELECT ?", StatementOptions::default())?;
    stmt.bind_value(0usize, 1, ParamType::Integer)?;
    let err = stmt.execute_with(&[TypedValue::Int(2)]).unwrap_err();
    assert!(matches!(
        err,
        StmtError::Binding(BindingError::ConflictingBinding)
    ));

    stmt.clear_bindings();
    stmt.execute_with(&[TypedValue::Int(2)])?;
    assert_eq!(driver.calls().len(), 1);
    Ok(())
}

#[test]
fn binding_failures_never_reach_the_driver() -> Result<(), StmtError> {
    let driver = RecordingDriver::new();
    let mut stmt = PreparedStatement::prepare(
        &driver,
        "SELECT :a, :b",
        StatementOptions::default(),
    )?;

    assert!(matches!(
        stmt.bind_value("c", 1, ParamType::Integer),
        Err(StmtError::Binding(BindingError::UnknownPlaceholder(_)))
    ));
    stmt.bind_value("a", 1, ParamType::Integer)?;
    assert!(matches!(
        stmt.execute(),
        Err(StmtError::Binding(BindingError::UnboundPlaceholder(ref name))) if name == ":b"
    ));
    assert!(matches!(
        stmt.execute_with(&[TypedValue::Int(1)]),
        Err(StmtError::Binding(BindingError::ConflictingBinding))
    ));
    assert!(driver.calls().is_empty());
    Ok(())
}

#[test]
fn lenient_policy_ignores_unknown_names() -> Result<(), StmtError> {
    let driver = RecordingDriver::new();
    let options = StatementOptions::default().with_unknown_placeholder(UnknownPlaceholderPolicy::Ignore);
    let mut stmt = PreparedStatement::prepare(&driver, "SELECT :a", options)?;
    stmt.bind_value("a", 1, ParamType::Integer)?
        .bind_value("not_there", 2, ParamType::Integer)?;
    stmt.execute()?;
    assert_eq!(driver.last_call().unwrap().values, vec![TypedValue::Int(1)]);
    Ok(())
}

#[test]
fn declared_types_coerce_values() -> Result<(), StmtError> {
    let driver = RecordingDriver::new();
    let mut stmt = PreparedStatement::prepare(&driver, "SELECT ?, ?", StatementOptions::default())?;
    stmt.bind_value(0usize, "17", ParamType::Integer)?
        .bind_value(1usize, 17, ParamType::String)?;
    stmt.execute()?;
    assert_eq!(
        driver.last_call().unwrap().values,
        vec![TypedValue::Int(17), TypedValue::Text("17".into())]
    );

    stmt.bind_value(0usize, "seventeen", ParamType::Integer)?;
    assert!(matches!(
        stmt.execute(),
        Err(StmtError::Binding(BindingError::TypeMismatch { .. }))
    ));
    Ok(())
}

#[test]
fn driver_errors_pass_through_untouched() -> Result<(), StmtError> {
    let driver = RecordingDriver::new();
    driver.push_rows(vec![Row::from_pairs([("n", TypedValue::Int(1))])]);
    driver.push_error("ERROR 1146: table missing");

    let mut stmt = PreparedStatement::prepare(&driver, "SELECT n FROM t", StatementOptions::default())?;
    let first = stmt.execute()?;

    let err = stmt.execute().unwrap_err();
    match err {
        StmtError::Driver(inner) => assert!(inner.to_string().contains("ERROR 1146")),
        other => panic!("unexpected error: {other:?}"),
    }
    // The failed run leaves the earlier result readable.
    assert!(!first.is_stale());
    assert_eq!(stmt.row_count(), 1);
    Ok(())
}

#[test]
fn debug_dump_lists_bindings() -> Result<(), StmtError> {
    let driver = RecordingDriver::new();
    let mut stmt = PreparedStatement::prepare(&driver, "SELECT :a, :b", StatementOptions::default())?;
    let cell = ParamCell::new("x");
    stmt.bind_param("b", &cell, ParamType::String)?;
    let dump = stmt.debug_dump_params();
    assert!(dump.starts_with("SQL: [13] SELECT :a, :b"));
    assert!(dump.contains("Key: :a unbound"));
    assert!(dump.contains("Key: :b by reference type=string current='x'"));
    Ok(())
}
