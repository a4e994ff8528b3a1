//! Record identifiers

use std::fmt;

use crate::storage::page_constants::{PageId, SlotIndex};

/// Identifies a record by page and slot directory index.
///
/// Stable while other records on the page are inserted or deleted, but not
/// across a slot directory compaction of its page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId {
    /// Page holding the record
    pub page_id: PageId,
    /// Index into the page's slot directory
    pub slot: SlotIndex,
}

impl RecordId {
    /// Create a record id
    pub fn new(page_id: PageId, slot: SlotIndex) -> Self {
        Self { page_id, slot }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.page_id, self.slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering_follows_page_then_slot() {
        assert!(RecordId::new(1, 9) < RecordId::new(2, 0));
        assert!(RecordId::new(2, 0) < RecordId::new(2, 1));
    }

    #[test]
    fn test_display() {
        assert_eq!(RecordId::new(5, 12).to_string(), "(5, 12)");
    }
}
