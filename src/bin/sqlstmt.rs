use std::path::PathBuf;

use clap::Parser;
use sql_stmt::prelude::*;
use tracing::Level;

#[derive(Parser, Debug)]
#[command(author, version, about = "Run one prepared statement against a SQLite database")]
struct Args {
    /// Database file; an in-memory database when omitted
    #[arg(long)]
    db: Option<PathBuf>,
    /// Statements run before the prepared one (schema, seed data)
    #[arg(long)]
    setup: Option<String>,
    /// SQL template with `?` or `:name` placeholders
    sql: String,
    /// Positional argument, in order; `null` and integers are recognized
    #[arg(long = "arg")]
    args: Vec<String>,
    /// Named binding as `name=value`
    #[arg(long = "bind", value_parser = parse_binding)]
    bindings: Vec<(String, String)>,
    #[arg(long, value_enum, default_value = "both")]
    style: FetchStyle,
    #[arg(long, short)]
    verbose: bool,
}

fn parse_binding(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected name=value, got `{raw}`"))
}

fn parse_value(raw: &str) -> TypedValue {
    if raw.eq_ignore_ascii_case("null") {
        TypedValue::Null
    } else if let Ok(i) = raw.parse::<i64>() {
        TypedValue::Int(i)
    } else {
        TypedValue::Text(raw.to_string())
    }
}

fn run(args: Args) -> Result<String, Box<dyn std::error::Error>> {
    let driver = match &args.db {
        Some(path) => SqliteDriver::open(path)?,
        None => SqliteDriver::open_in_memory()?,
    };
    if let Some(setup) = &args.setup {
        driver.execute_batch(setup)?;
    }

    let conn = Connection::with_options(
        driver,
        StatementOptions::default().with_default_fetch_style(args.style),
    );
    let mut stmt = conn.prepare(args.sql.as_str())?;
    for (name, raw) in &args.bindings {
        let value = parse_value(raw);
        let declared = value.natural_type();
        stmt.bind_value(name.as_str(), value, declared)?;
    }
    let positional: Vec<TypedValue> = args.args.iter().map(|raw| parse_value(raw)).collect();

    let result = stmt.execute_with(&positional)?;
    tracing::info!(rows = result.len(), columns = result.column_names().len(), "query finished");
    Ok(serde_json::to_string_pretty(&result.fetch_all(None)?)?)
}

fn main() {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_max_level(if args.verbose { Level::DEBUG } else { Level::WARN })
        .init();

    match run(args) {
        Ok(json) => println!("{json}"),
        Err(err) => {
            eprintln!("sqlstmt: {err}");
            std::process::exit(1);
        }
    }
}
