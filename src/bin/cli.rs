//! sqlbridge - CLI Client
//!
//! Usage: sqlbridge-cli [DB_PATH] [SQL] [PARAM...]

use std::env;

use anyhow::Context;
use sqlbridge::{Connection, ResultSet, Value};
use tracing::warn;
use tracing_subscriber::EnvFilter;

const DEFAULT_DB_PATH: &str = "test.db";
const DEFAULT_SQL: &str = "select * from users;";

/// Integers bind as INTEGER, anything else as TEXT
fn parse_param(arg: &str) -> Value {
    match arg.parse::<i64>() {
        Ok(i) => Value::Integer(i),
        Err(_) => Value::Text(arg.to_string()),
    }
}

/// Format query results with a row count footer
fn format_results(result: &ResultSet) -> String {
    if result.columns.is_empty() {
        format!("{} row(s) affected", result.affected_rows)
    } else {
        format!("{}\n{} row(s) returned", result, result.rows.len())
    }
}

fn run(args: &[String]) -> anyhow::Result<()> {
    let path = args.first().map(String::as_str).unwrap_or(DEFAULT_DB_PATH);
    let sql = args.get(1).map(String::as_str).unwrap_or(DEFAULT_SQL);
    let params: Vec<Value> = args.iter().skip(2).map(|a| parse_param(a)).collect();

    let conn = Connection::connect(path).with_context(|| format!("opening {}", path))?;

    let outcome = conn.execute(sql, &params);
    let closed = conn.close();

    let result = finish(sql, outcome, closed)?;
    println!("{}", format_results(&result));

    Ok(())
}

/// Merge the statement outcome with the close status, losing neither error
fn finish(
    sql: &str,
    outcome: sqlbridge::Result<ResultSet>,
    closed: sqlbridge::Result<()>,
) -> anyhow::Result<ResultSet> {
    match (outcome, closed) {
        (Ok(result), Ok(())) => Ok(result),
        (Ok(_), Err(e)) => Err(e).context("closing database"),
        (Err(e), Ok(())) => Err(e).with_context(|| format!("executing `{}`", sql)),
        (Err(e), Err(close_err)) => {
            warn!(error = %close_err, "failed to close database after a failed statement");
            Err(e).with_context(|| {
                format!(
                    "executing `{}` (closing the database also failed: {})",
                    sql, close_err
                )
            })
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    if let Err(e) = run(&args) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_param() {
        assert_eq!(parse_param("42"), Value::Integer(42));
        assert_eq!(parse_param("-7"), Value::Integer(-7));
        assert_eq!(parse_param("floyd"), Value::Text("floyd".to_string()));
        assert_eq!(parse_param("4.5"), Value::Text("4.5".to_string()));
    }

    fn close_error() -> sqlbridge::Error {
        sqlbridge::Error::Close {
            code: 5,
            message: "unable to close due to unfinalized statements".to_string(),
        }
    }

    #[test]
    fn test_finish_reports_close_failure_after_failed_statement() {
        let outcome = Err(sqlbridge::Error::Prepare {
            code: 1,
            message: "near \"selec\": syntax error".to_string(),
        });
        let err = finish("selec 1", outcome, Err(close_error())).unwrap_err();
        let rendered = format!("{:#}", err);
        assert!(rendered.contains("syntax error"));
        assert!(rendered.contains("unfinalized statements"));
    }

    #[test]
    fn test_finish_success_and_close_failure() {
        let result = finish("select 1", Ok(ResultSet::empty()), Ok(())).unwrap();
        assert_eq!(result, ResultSet::empty());

        let err = finish("select 1", Ok(ResultSet::empty()), Err(close_error())).unwrap_err();
        assert!(format!("{:#}", err).starts_with("closing database"));
    }

    #[test]
    fn test_format_results() {
        let mut result = ResultSet::empty();
        result.affected_rows = 3;
        assert_eq!(format_results(&result), "3 row(s) affected");

        let result = ResultSet::new(vec!["id".to_string()], vec![]);
        assert_eq!(format_results(&result), "Empty Result Set\n0 row(s) returned");
    }
}
