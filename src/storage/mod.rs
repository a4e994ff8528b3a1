//! Storage layer implementation

pub mod config;
pub mod heap_page;
pub mod page;
pub mod page_constants;
pub mod page_header;
pub mod record_id;
pub mod slot;

pub use config::{DeletePolicy, HeapPageConfig};
pub use heap_page::{HeapPage, InsertOutcome, Records};
pub use record_id::RecordId;
