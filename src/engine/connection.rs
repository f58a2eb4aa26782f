//! Connection handle
//!
//! Wraps a `sqlite3*` obtained from `sqlite3_open_v2`.

use std::ffi::CString;
use std::mem::ManuallyDrop;
use std::os::raw::c_int;
use std::ptr::{self, NonNull};

use rusqlite::ffi;
use tracing::{debug, warn};

use super::{engine_string, errstr};
use crate::error::{Error, Result};

/// Owned engine connection handle
///
/// Not `Clone`: the handle is released by exactly one owner, either through
/// [`RawConnection::close`] or on drop.
#[derive(Debug)]
pub struct RawConnection {
    db: NonNull<ffi::sqlite3>,
}

// The bundled engine is built in serialized threading mode, so the handle may
// move between threads. It is not `Sync`; sharing requires outside locking.
unsafe impl Send for RawConnection {}

impl RawConnection {
    /// Open the database at `path` with the given `SQLITE_OPEN_*` flags
    pub fn open(path: &str, flags: c_int) -> Result<Self> {
        let c_path = CString::new(path).map_err(|_| Error::Connection {
            path: path.to_string(),
            code: ffi::SQLITE_MISUSE,
            message: "path contains an interior NUL byte".to_string(),
        })?;

        let mut db: *mut ffi::sqlite3 = ptr::null_mut();
        let rc = unsafe { ffi::sqlite3_open_v2(c_path.as_ptr(), &mut db, flags, ptr::null()) };

        if rc != ffi::SQLITE_OK {
            let message = if db.is_null() {
                errstr(rc)
            } else {
                unsafe { engine_string(ffi::sqlite3_errmsg(db)) }.unwrap_or_else(|| errstr(rc))
            };
            // The engine usually hands back a handle even when opening fails
            unsafe { ffi::sqlite3_close(db) };
            return Err(Error::Connection {
                path: path.to_string(),
                code: rc,
                message,
            });
        }

        let db = NonNull::new(db).ok_or_else(|| Error::Connection {
            path: path.to_string(),
            code: ffi::SQLITE_NOMEM,
            message: errstr(ffi::SQLITE_NOMEM),
        })?;

        debug!(path, flags, "opened database");
        Ok(Self { db })
    }

    pub(crate) fn as_ptr(&self) -> *mut ffi::sqlite3 {
        self.db.as_ptr()
    }

    /// Most recent error message reported on this connection
    pub fn errmsg(&self) -> String {
        unsafe { engine_string(ffi::sqlite3_errmsg(self.as_ptr())) }
            .unwrap_or_else(|| errstr(self.errcode()))
    }

    pub fn errcode(&self) -> c_int {
        unsafe { ffi::sqlite3_errcode(self.as_ptr()) }
    }

    /// Rows changed by INSERT, UPDATE and DELETE since the connection opened
    pub fn total_changes(&self) -> u64 {
        let total = unsafe { ffi::sqlite3_total_changes64(self.as_ptr()) };
        total.max(0) as u64
    }

    /// Close the handle, reporting the engine's status
    ///
    /// If the engine refuses to close, the handle is passed to
    /// `sqlite3_close_v2`, which releases it once it becomes idle. Either way
    /// the handle is never touched again by this process.
    pub fn close(self) -> Result<()> {
        let this = ManuallyDrop::new(self);
        let db = this.as_ptr();

        let rc = unsafe { ffi::sqlite3_close(db) };
        if rc == ffi::SQLITE_OK {
            debug!("closed database");
            return Ok(());
        }

        let message = this.errmsg();
        unsafe { ffi::sqlite3_close_v2(db) };
        Err(Error::Close { code: rc, message })
    }
}

impl Drop for RawConnection {
    fn drop(&mut self) {
        let rc = unsafe { ffi::sqlite3_close_v2(self.as_ptr()) };
        if rc != ffi::SQLITE_OK {
            warn!(code = rc, "failed to close database on drop");
        } else {
            debug!("closed database on drop");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const READ_WRITE_CREATE: c_int = ffi::SQLITE_OPEN_READWRITE | ffi::SQLITE_OPEN_CREATE;

    #[test]
    fn test_open_and_close_memory() {
        let conn = RawConnection::open(":memory:", READ_WRITE_CREATE).unwrap();
        assert_eq!(conn.total_changes(), 0);
        conn.close().unwrap();
    }

    #[test]
    fn test_total_changes_counts_every_row() {
        let conn = RawConnection::open(":memory:", READ_WRITE_CREATE).unwrap();
        for sql in [
            "CREATE TABLE t(n INTEGER)",
            "WITH RECURSIVE c(n) AS (SELECT 1 UNION ALL SELECT n + 1 FROM c WHERE n < 5000) \
             INSERT INTO t SELECT n FROM c",
            "UPDATE t SET n = n * 2 WHERE n <= 100",
        ] {
            let mut stmt = crate::engine::RawStatement::prepare(&conn, sql).unwrap().unwrap();
            while stmt.step().unwrap() == crate::engine::StepResult::Row {}
            stmt.finalize().unwrap();
        }
        assert_eq!(conn.total_changes(), 5100);
        conn.close().unwrap();
    }

    #[test]
    fn test_open_missing_directory() {
        let result = RawConnection::open("/nonexistent-sqlbridge-dir/sub/test.db", READ_WRITE_CREATE);
        match result {
            Err(Error::Connection { code, path, .. }) => {
                assert_eq!(code, ffi::SQLITE_CANTOPEN);
                assert!(path.ends_with("test.db"));
            }
            other => panic!("expected connection error, got {:?}", other),
        }
    }

    #[test]
    fn test_open_path_with_nul() {
        let result = RawConnection::open("bad\0path.db", READ_WRITE_CREATE);
        assert!(matches!(result, Err(Error::Connection { .. })));
    }
}
