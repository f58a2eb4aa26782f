//! Prepared statement handle
//!
//! Wraps a `sqlite3_stmt*` obtained from `sqlite3_prepare_v2`. Positions
//! passed to the bind methods are 1-based, column indexes are 0-based,
//! following the engine's conventions.

use std::mem::ManuallyDrop;
use std::os::raw::{c_char, c_int, c_void};
use std::ptr::{self, NonNull};
use std::slice;

use rusqlite::ffi;
use tracing::{debug, trace};

use super::{engine_string, errstr, RawConnection};
use crate::error::{Error, Result};

/// Outcome of one `sqlite3_step` call that did not fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepResult {
    /// A result row is available for decoding
    Row,
    /// The statement has run to completion
    Done,
}

/// Runtime storage class of a column in the current row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Float,
    Text,
    Blob,
    Null,
    /// A tag this driver does not know about
    Unknown(c_int),
}

impl From<c_int> for ColumnType {
    fn from(tag: c_int) -> Self {
        match tag {
            ffi::SQLITE_INTEGER => ColumnType::Integer,
            ffi::SQLITE_FLOAT => ColumnType::Float,
            ffi::SQLITE_TEXT => ColumnType::Text,
            ffi::SQLITE_BLOB => ColumnType::Blob,
            ffi::SQLITE_NULL => ColumnType::Null,
            other => ColumnType::Unknown(other),
        }
    }
}

/// Owned prepared statement handle
///
/// Borrows the connection that prepared it, so it cannot outlive it. The
/// handle is finalized exactly once, through [`RawStatement::finalize`] or
/// on drop.
#[derive(Debug)]
pub struct RawStatement<'conn> {
    stmt: NonNull<ffi::sqlite3_stmt>,
    conn: &'conn RawConnection,
    /// Set while the last `step` returned a row
    on_row: bool,
}

impl<'conn> RawStatement<'conn> {
    /// Compile `sql` into a statement
    ///
    /// Returns `Ok(None)` when `sql` holds no statement (only whitespace or
    /// comments). Text after the first statement must be blank too, otherwise
    /// nothing is run and `Error::Prepare` is returned.
    pub fn prepare(conn: &'conn RawConnection, sql: &str) -> Result<Option<Self>> {
        let len = c_int::try_from(sql.len()).map_err(|_| Error::Prepare {
            code: ffi::SQLITE_TOOBIG,
            message: errstr(ffi::SQLITE_TOOBIG),
        })?;

        let mut stmt: *mut ffi::sqlite3_stmt = ptr::null_mut();
        let mut tail: *const c_char = ptr::null();
        let rc = unsafe {
            ffi::sqlite3_prepare_v2(
                conn.as_ptr(),
                sql.as_ptr() as *const c_char,
                len,
                &mut stmt,
                &mut tail,
            )
        };

        if rc != ffi::SQLITE_OK {
            // On failure the engine leaves `stmt` null, there is nothing to finalize
            return Err(Error::Prepare {
                code: rc,
                message: conn.errmsg(),
            });
        }

        let prepared = NonNull::new(stmt).map(|stmt| Self {
            stmt,
            conn,
            on_row: false,
        });

        let consumed = if tail.is_null() {
            sql.len()
        } else {
            (tail as usize)
                .saturating_sub(sql.as_ptr() as usize)
                .min(sql.len())
        };
        if !is_blank_sql(&sql.as_bytes()[consumed..]) {
            // Dropping `prepared` finalizes the first statement unexecuted
            drop(prepared);
            return Err(Error::Prepare {
                code: ffi::SQLITE_ERROR,
                message: "multiple statements are not supported".to_string(),
            });
        }

        debug!(sql, "prepared statement");
        Ok(prepared)
    }

    fn as_ptr(&self) -> *mut ffi::sqlite3_stmt {
        self.stmt.as_ptr()
    }

    /// Number of bindable placeholders the statement declares
    pub fn parameter_count(&self) -> usize {
        let count = unsafe { ffi::sqlite3_bind_parameter_count(self.as_ptr()) };
        count.max(0) as usize
    }

    fn check_bind(&self, position: usize, rc: c_int) -> Result<()> {
        if rc == ffi::SQLITE_OK {
            trace!(position, "bound parameter");
            Ok(())
        } else {
            Err(Error::Bind {
                position,
                code: rc,
                message: self.conn.errmsg(),
            })
        }
    }

    fn bind_index(position: usize) -> Result<c_int> {
        c_int::try_from(position).map_err(|_| Error::Bind {
            position,
            code: ffi::SQLITE_RANGE,
            message: errstr(ffi::SQLITE_RANGE),
        })
    }

    fn bind_len(position: usize, len: usize) -> Result<c_int> {
        c_int::try_from(len).map_err(|_| Error::Bind {
            position,
            code: ffi::SQLITE_TOOBIG,
            message: errstr(ffi::SQLITE_TOOBIG),
        })
    }

    pub fn bind_int64(&mut self, position: usize, value: i64) -> Result<()> {
        let index = Self::bind_index(position)?;
        let rc = unsafe { ffi::sqlite3_bind_int64(self.as_ptr(), index, value) };
        self.check_bind(position, rc)
    }

    pub fn bind_double(&mut self, position: usize, value: f64) -> Result<()> {
        let index = Self::bind_index(position)?;
        let rc = unsafe { ffi::sqlite3_bind_double(self.as_ptr(), index, value) };
        self.check_bind(position, rc)
    }

    /// Bind UTF-8 text
    ///
    /// The engine copies the bytes before returning (`SQLITE_TRANSIENT`), so
    /// `value` only has to live for the duration of this call.
    pub fn bind_text(&mut self, position: usize, value: &str) -> Result<()> {
        let index = Self::bind_index(position)?;
        let len = Self::bind_len(position, value.len())?;
        let rc = unsafe {
            ffi::sqlite3_bind_text(
                self.as_ptr(),
                index,
                value.as_ptr() as *const c_char,
                len,
                ffi::SQLITE_TRANSIENT(),
            )
        };
        self.check_bind(position, rc)
    }

    /// Bind a blob, copied by the engine like [`RawStatement::bind_text`]
    pub fn bind_blob(&mut self, position: usize, value: &[u8]) -> Result<()> {
        let index = Self::bind_index(position)?;
        let len = Self::bind_len(position, value.len())?;
        let rc = if value.is_empty() {
            // A null data pointer would bind NULL instead of an empty blob
            unsafe { ffi::sqlite3_bind_zeroblob(self.as_ptr(), index, 0) }
        } else {
            unsafe {
                ffi::sqlite3_bind_blob(
                    self.as_ptr(),
                    index,
                    value.as_ptr() as *const c_void,
                    len,
                    ffi::SQLITE_TRANSIENT(),
                )
            }
        };
        self.check_bind(position, rc)
    }

    pub fn column_count(&self) -> usize {
        let count = unsafe { ffi::sqlite3_column_count(self.as_ptr()) };
        count.max(0) as usize
    }

    /// Declared name of the column at `index`
    pub fn column_name(&self, index: usize) -> Result<String> {
        let ptr = unsafe { ffi::sqlite3_column_name(self.as_ptr(), index as c_int) };
        unsafe { engine_string(ptr) }.ok_or_else(|| Error::Step {
            code: ffi::SQLITE_NOMEM,
            message: format!("no name available for column {}", index),
        })
    }

    /// Advance to the next row
    pub fn step(&mut self) -> Result<StepResult> {
        let rc = unsafe { ffi::sqlite3_step(self.as_ptr()) };
        self.on_row = rc == ffi::SQLITE_ROW;
        match rc {
            ffi::SQLITE_ROW => Ok(StepResult::Row),
            ffi::SQLITE_DONE => Ok(StepResult::Done),
            rc => Err(Error::Step {
                code: rc,
                message: self.conn.errmsg(),
            }),
        }
    }

    /// Column values may only be read while a row is current
    fn current_column(&self, index: usize) -> Result<c_int> {
        if !self.on_row {
            return Err(Error::Step {
                code: ffi::SQLITE_MISUSE,
                message: "no current row".to_string(),
            });
        }
        if index >= self.column_count() {
            return Err(Error::Step {
                code: ffi::SQLITE_RANGE,
                message: format!("column index {} out of range", index),
            });
        }
        Ok(index as c_int)
    }

    pub fn column_type(&self, index: usize) -> Result<ColumnType> {
        let index = self.current_column(index)?;
        Ok(ColumnType::from(unsafe {
            ffi::sqlite3_column_type(self.as_ptr(), index)
        }))
    }

    pub fn column_int64(&self, index: usize) -> Result<i64> {
        let index = self.current_column(index)?;
        Ok(unsafe { ffi::sqlite3_column_int64(self.as_ptr(), index) })
    }

    pub fn column_double(&self, index: usize) -> Result<f64> {
        let index = self.current_column(index)?;
        Ok(unsafe { ffi::sqlite3_column_double(self.as_ptr(), index) })
    }

    /// Text of the column at `index`, replacing invalid UTF-8 sequences
    pub fn column_text(&self, index: usize) -> Result<String> {
        let index = self.current_column(index)?;
        // The pointer must be fetched before the byte count
        let ptr = unsafe { ffi::sqlite3_column_text(self.as_ptr(), index) };
        if ptr.is_null() {
            return Err(Error::Step {
                code: ffi::SQLITE_NOMEM,
                message: format!("failed to read text of column {}", index),
            });
        }
        let len = unsafe { ffi::sqlite3_column_bytes(self.as_ptr(), index) };
        let bytes = unsafe { slice::from_raw_parts(ptr, len.max(0) as usize) };
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }

    pub fn column_blob(&self, index: usize) -> Result<Vec<u8>> {
        let index = self.current_column(index)?;
        let ptr = unsafe { ffi::sqlite3_column_blob(self.as_ptr(), index) };
        let len = unsafe { ffi::sqlite3_column_bytes(self.as_ptr(), index) };
        if ptr.is_null() || len <= 0 {
            return Ok(Vec::new());
        }
        Ok(unsafe { slice::from_raw_parts(ptr as *const u8, len as usize) }.to_vec())
    }

    /// Release the handle, reporting the engine's status
    pub fn finalize(self) -> Result<()> {
        let this = ManuallyDrop::new(self);
        let rc = unsafe { ffi::sqlite3_finalize(this.as_ptr()) };
        if rc == ffi::SQLITE_OK {
            debug!("finalized statement");
            Ok(())
        } else {
            Err(Error::Finalize {
                code: rc,
                message: this.conn.errmsg(),
            })
        }
    }
}

impl Drop for RawStatement<'_> {
    fn drop(&mut self) {
        // A failing status here repeats the error that caused the early exit
        let rc = unsafe { ffi::sqlite3_finalize(self.as_ptr()) };
        debug!(code = rc, "finalized statement on drop");
    }
}

/// True when `sql` holds only whitespace, `;` and comments
fn is_blank_sql(sql: &[u8]) -> bool {
    let mut i = 0;
    while i < sql.len() {
        match sql[i] {
            b';' => i += 1,
            c if c.is_ascii_whitespace() => i += 1,
            b'-' if sql.get(i + 1) == Some(&b'-') => {
                i = sql[i..]
                    .iter()
                    .position(|&c| c == b'\n')
                    .map_or(sql.len(), |p| i + p + 1);
            }
            b'/' if sql.get(i + 1) == Some(&b'*') => {
                // An unterminated block comment runs to the end of input
                i = sql[i + 2..]
                    .windows(2)
                    .position(|w| w == b"*/")
                    .map_or(sql.len(), |p| i + 2 + p + 2);
            }
            _ => return false,
        }
    }
    true
}
