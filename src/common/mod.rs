//! Common utilities and error handling for heapstore

pub mod error;
pub mod logging;

pub mod test_utils;

pub use error::{Error, Result};
