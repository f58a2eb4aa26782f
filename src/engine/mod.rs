//! Native engine binding
//!
//! Owning wrappers over the SQLite handle ABI:
//! - `RawConnection` owns one `sqlite3*` and closes it exactly once
//! - `RawStatement` owns one `sqlite3_stmt*`, borrows the connection that
//!   prepared it, and finalizes it exactly once
//!
//! Status codes never leave this module; each call site maps them to an
//! [`Error`](crate::Error) variant.

pub mod connection;
pub mod statement;

pub use connection::RawConnection;
pub use statement::{ColumnType, RawStatement, StepResult};

use std::ffi::CStr;
use std::os::raw::{c_char, c_int};

use rusqlite::ffi;

/// Copy a NUL-terminated string owned by the engine
///
/// # Safety
/// `ptr` must be null or point to a valid NUL-terminated string.
unsafe fn engine_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        None
    } else {
        Some(CStr::from_ptr(ptr).to_string_lossy().into_owned())
    }
}

/// Generic English description of a status code
fn errstr(code: c_int) -> String {
    unsafe { engine_string(ffi::sqlite3_errstr(code)) }
        .unwrap_or_else(|| format!("unknown error code {}", code))
}
