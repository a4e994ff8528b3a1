//! Heapstore - slotted pages for heap-file storage engines
//!
//! A heap page packs variable-length records into one fixed-size buffer:
//! - a slot directory growing up from the header, records growing down from
//!   the end of the buffer
//! - tombstoned slots reused by later inserts
//! - optional byte compaction on delete, explicit slot directory compaction
//! - space accounting that never overcommits the buffer
//!
//! Persistence, pinning and page chains belong to the buffer manager and heap
//! file built on top of this crate.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

// Core modules
pub mod common;
pub mod storage;

// Re-exports for convenience
pub use common::{Error, Result};
pub use storage::{DeletePolicy, HeapPage, HeapPageConfig, InsertOutcome, RecordId};

// Used by the logging macros so callers need no direct `log` dependency
#[doc(hidden)]
pub use log as __log;

/// Version string
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
