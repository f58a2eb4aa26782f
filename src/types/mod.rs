//! Data types module
//!
//! The tagged value representation shared by the bind and decode sides
//! of the driver, and the row type built from it.

pub mod row;
pub mod value;

pub use row::Row;
pub use value::Value;
