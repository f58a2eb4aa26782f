//! Statement execution module
//!
//! This module contains the statement executor and the result sets it
//! produces.

pub mod executor;
pub mod result;

pub use executor::Executor;
pub use result::{ResultSet, EMPTY_RESULT_SET};
