//! Database connections
//!
//! A [`Connection`] owns one engine connection handle for its whole life.
//! Statements prepared through it borrow it, so it cannot be closed while a
//! statement is alive, and [`Connection::close`] consumes it, so it cannot be
//! used afterwards:
//!
//! ```compile_fail
//! use sqlbridge::Connection;
//!
//! let conn = Connection::connect(":memory:").unwrap();
//! conn.close().unwrap();
//! conn.execute("SELECT 1", &[]).unwrap();
//! ```

pub mod config;

pub use config::ConnectionConfig;

use tracing::info;

use crate::engine::RawConnection;
use crate::error::Result;
use crate::executor::{Executor, ResultSet};
use crate::types::Value;

/// An open database connection
#[derive(Debug)]
pub struct Connection {
    raw: RawConnection,
    path: String,
}

impl Connection {
    /// Open the database file at `path`, creating it if it does not exist
    pub fn connect(path: &str) -> Result<Self> {
        Self::open_with(&ConnectionConfig::new(path))
    }

    /// Open a database with explicit options
    pub fn open_with(config: &ConnectionConfig) -> Result<Self> {
        let raw = RawConnection::open(&config.path, config.flags())?;
        info!(path = %config.path, read_only = config.read_only, "connected");
        Ok(Self {
            raw,
            path: config.path.clone(),
        })
    }

    /// Path this connection was opened with
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Execute one SQL statement with positional parameters
    ///
    /// Placeholders are bound from `params` in order. Parameters beyond the
    /// number of placeholders are ignored; too few is an error.
    ///
    /// `sql` must hold a single statement. Anything after it other than
    /// whitespace, semicolons and comments fails with [`Error::Prepare`]
    /// and nothing is executed.
    pub fn execute(&self, sql: &str, params: &[Value]) -> Result<ResultSet> {
        Executor::new(&self.raw).execute(sql, params)
    }

    /// Close the connection
    ///
    /// The connection is consumed whether or not the engine reports success.
    pub fn close(self) -> Result<()> {
        info!(path = %self.path, "closing connection");
        self.raw.close()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn test_connect_execute_close() {
        let conn = Connection::connect(":memory:").unwrap();
        assert_eq!(conn.path(), ":memory:");

        conn.execute("CREATE TABLE users (id INTEGER, name TEXT)", &[])
            .unwrap();
        conn.execute(
            "INSERT INTO users (id, name) VALUES (?, ?)",
            &[Value::Integer(42), Value::from("floyd")],
        )
        .unwrap();

        let result = conn.execute("SELECT id, name FROM users", &[]).unwrap();
        assert_eq!(result.columns, vec!["id", "name"]);
        assert_eq!(
            result.rows[0].values(),
            &[Value::Integer(42), Value::Text("floyd".to_string())]
        );

        conn.close().unwrap();
    }

    #[test]
    fn test_connection_survives_prepare_error() {
        let conn = Connection::connect(":memory:").unwrap();
        let err = conn.execute("SELECT FROM WHERE", &[]).unwrap_err();
        assert!(matches!(err, Error::Prepare { .. }));

        let result = conn.execute("SELECT 'still open'", &[]).unwrap();
        assert_eq!(result.get(0, 0), Some(&Value::Text("still open".to_string())));
        conn.close().unwrap();
    }

    #[test]
    fn test_read_only_rejects_writes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ro.db");
        let path = path.to_str().unwrap();

        let conn = Connection::connect(path).unwrap();
        conn.execute("CREATE TABLE t (x INTEGER)", &[]).unwrap();
        conn.close().unwrap();

        let conn = Connection::open_with(&ConnectionConfig::new(path).read_only(true)).unwrap();
        let err = conn
            .execute("INSERT INTO t VALUES (?)", &[Value::Integer(1)])
            .unwrap_err();
        assert!(matches!(err, Error::Step { .. }));
        conn.close().unwrap();
    }

    #[test]
    fn test_missing_file_without_create() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.db");
        let config = ConnectionConfig::new(path.to_str().unwrap()).create_if_missing(false);

        let err = Connection::open_with(&config).unwrap_err();
        assert!(matches!(err, Error::Connection { .. }));
        assert!(!path.exists());
    }
}
