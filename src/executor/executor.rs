//! Statement executor for sqlbridge
//!
//! Runs one SQL statement against a connection:
//! prepare → bind → column discovery → step loop → finalize.
//!
//! The prepared statement lives only inside [`Executor::execute`]. Every
//! early return drops it, which finalizes it; the success path finalizes it
//! explicitly so a release failure can be reported on its own.

use tracing::{debug, trace, warn};

use super::ResultSet;
use crate::engine::{ColumnType, RawConnection, RawStatement, StepResult};
use crate::error::{Error, Result};
use crate::types::{Row, Value};

/// Execution engine bound to one open connection
pub struct Executor<'conn> {
    conn: &'conn RawConnection,
}

impl<'conn> Executor<'conn> {
    pub fn new(conn: &'conn RawConnection) -> Self {
        Self { conn }
    }

    /// Execute `sql` with positional `params`
    pub fn execute(&self, sql: &str, params: &[Value]) -> Result<ResultSet> {
        let changes_before = self.conn.total_changes();

        let Some(mut stmt) = RawStatement::prepare(self.conn, sql)? else {
            debug!("statement is empty, nothing to execute");
            return Ok(ResultSet::empty());
        };

        Self::bind_params(&mut stmt, params)?;

        let columns = Self::column_names(&stmt)?;

        let mut rows = Vec::new();
        loop {
            match stmt.step()? {
                StepResult::Row => {
                    let row = Self::decode_row(&stmt, columns.len())?;
                    trace!(index = rows.len(), "decoded row");
                    rows.push(row);
                }
                StepResult::Done => break,
            }
        }

        stmt.finalize()?;

        let mut result = ResultSet::new(columns, rows);
        result.affected_rows = self.conn.total_changes().saturating_sub(changes_before);
        debug!(
            rows = result.rows.len(),
            affected_rows = result.affected_rows,
            "statement executed"
        );
        Ok(result)
    }

    /// Bind `params` to the statement's placeholders in order
    fn bind_params(stmt: &mut RawStatement<'_>, params: &[Value]) -> Result<()> {
        let expected = stmt.parameter_count();
        if expected < params.len() {
            warn!(
                expected,
                supplied = params.len(),
                "ignoring surplus parameters"
            );
        }
        if expected == 0 {
            return Ok(());
        }
        if expected > params.len() {
            return Err(Error::ParameterCount {
                expected,
                supplied: params.len(),
            });
        }

        for (i, param) in params[..expected].iter().enumerate() {
            let position = i + 1;
            match param {
                Value::Integer(v) => stmt.bind_int64(position, *v)?,
                Value::Real(v) => stmt.bind_double(position, *v)?,
                Value::Text(v) => stmt.bind_text(position, v)?,
                Value::Blob(v) => stmt.bind_blob(position, v)?,
                Value::Null => {
                    return Err(Error::UnsupportedParameterType {
                        position,
                        type_name: param.type_name(),
                    })
                }
            }
        }
        Ok(())
    }

    fn column_names(stmt: &RawStatement<'_>) -> Result<Vec<String>> {
        (0..stmt.column_count())
            .map(|i| stmt.column_name(i))
            .collect()
    }

    /// Decode the current row; every column yields exactly one value
    fn decode_row(stmt: &RawStatement<'_>, column_count: usize) -> Result<Row> {
        let mut values = Vec::with_capacity(column_count);
        for i in 0..column_count {
            let value = match stmt.column_type(i)? {
                ColumnType::Integer => Value::Integer(stmt.column_int64(i)?),
                ColumnType::Float => Value::Real(stmt.column_double(i)?),
                ColumnType::Text => Value::Text(stmt.column_text(i)?),
                ColumnType::Blob => Value::Blob(stmt.column_blob(i)?),
                ColumnType::Null => Value::Null,
                ColumnType::Unknown(tag) => {
                    warn!(column = i, tag, "unknown column type, decoding as null");
                    Value::Null
                }
            };
            values.push(value);
        }
        Ok(Row::new(values))
    }
}
