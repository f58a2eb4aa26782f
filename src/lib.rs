//! sqlbridge - A minimal typed driver over the embedded SQLite engine
//!
//! This library provides:
//! - Owning wrappers over the engine's connection and statement handles
//! - Statement execution with typed parameter binding and row decoding
//! - A tagged value model and result sets that render as text tables
//!
//! ```
//! use sqlbridge::{Connection, Value};
//!
//! let conn = Connection::connect(":memory:")?;
//! conn.execute("CREATE TABLE users (id INTEGER, name TEXT)", &[])?;
//! conn.execute(
//!     "INSERT INTO users (id, name) VALUES (?, ?)",
//!     &[Value::Integer(42), Value::from("floyd")],
//! )?;
//! let result = conn.execute("SELECT * FROM users", &[])?;
//! assert_eq!(result.rows[0].values(), &[Value::Integer(42), Value::from("floyd")]);
//! conn.close()?;
//! # Ok::<(), sqlbridge::Error>(())
//! ```

pub mod connection;
pub mod engine;
pub mod error;
pub mod executor;
pub mod types;

pub use connection::{Connection, ConnectionConfig};
pub use error::{Error, Result};
pub use executor::ResultSet;
pub use types::{Row, Value};
