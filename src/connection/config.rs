//! Connection configuration

use std::os::raw::c_int;

use rusqlite::ffi;

/// Options for opening a database file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    /// Database file path (`:memory:` for a private in-memory database)
    pub path: String,
    /// Open without write access
    pub read_only: bool,
    /// Create the file if it does not exist (ignored when read-only)
    pub create_if_missing: bool,
}

impl ConnectionConfig {
    /// Create a read-write config that creates the file if needed
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            read_only: false,
            create_if_missing: true,
        }
    }

    /// Set read-only mode
    pub fn read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// Set whether a missing file is created
    pub fn create_if_missing(mut self, create: bool) -> Self {
        self.create_if_missing = create;
        self
    }

    /// The `SQLITE_OPEN_*` flags for `sqlite3_open_v2`
    pub fn flags(&self) -> c_int {
        if self.read_only {
            ffi::SQLITE_OPEN_READONLY
        } else if self.create_if_missing {
            ffi::SQLITE_OPEN_READWRITE | ffi::SQLITE_OPEN_CREATE
        } else {
            ffi::SQLITE_OPEN_READWRITE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_flags_match_sqlite3_open() {
        let config = ConnectionConfig::new("test.db");
        assert_eq!(config.path, "test.db");
        assert_eq!(
            config.flags(),
            ffi::SQLITE_OPEN_READWRITE | ffi::SQLITE_OPEN_CREATE
        );
    }

    #[test]
    fn test_builder() {
        let config = ConnectionConfig::new("a.db").create_if_missing(false);
        assert_eq!(config.flags(), ffi::SQLITE_OPEN_READWRITE);

        let config = ConnectionConfig::new("a.db").read_only(true);
        assert_eq!(config.flags(), ffi::SQLITE_OPEN_READONLY);
    }
}
