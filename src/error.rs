//! Error types for sqlbridge
//!
//! Every status code returned by the engine is mapped to one of these
//! variants at the call site that produced it.

use std::os::raw::c_int;

use thiserror::Error;

/// The main error type for sqlbridge
#[derive(Error, Debug)]
pub enum Error {
    // ========== Connection Errors ==========
    #[error("Connection error: failed to open database '{path}': {message}")]
    Connection {
        path: String,
        code: c_int,
        message: String,
    },

    #[error("Close error: {message} (code {code})")]
    Close { code: c_int, message: String },

    // ========== Statement Errors ==========
    #[error("Prepare error: {message} (code {code})")]
    Prepare { code: c_int, message: String },

    #[error("Parameter error: statement expects {expected} parameter(s), {supplied} supplied")]
    ParameterCount { expected: usize, supplied: usize },

    #[error("Parameter error: {type_name} parameter at position {position} is not supported")]
    UnsupportedParameterType {
        position: usize,
        type_name: &'static str,
    },

    #[error("Bind error: parameter {position}: {message} (code {code})")]
    Bind {
        position: usize,
        code: c_int,
        message: String,
    },

    // ========== Execution Errors ==========
    #[error("Step error: {message} (code {code})")]
    Step { code: c_int, message: String },

    #[error("Finalize error: {message} (code {code})")]
    Finalize { code: c_int, message: String },
}

impl Error {
    /// The engine status code behind this error, if one was reported
    pub fn code(&self) -> Option<c_int> {
        match self {
            Error::Connection { code, .. }
            | Error::Close { code, .. }
            | Error::Prepare { code, .. }
            | Error::Bind { code, .. }
            | Error::Step { code, .. }
            | Error::Finalize { code, .. } => Some(*code),
            Error::ParameterCount { .. } | Error::UnsupportedParameterType { .. } => None,
        }
    }
}

/// Result type alias for sqlbridge operations
pub type Result<T> = std::result::Result<T, Error>;
