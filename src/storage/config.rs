//! Runtime configuration for heap pages

use serde::{Deserialize, Serialize};

/// What happens to a deleted record's bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DeletePolicy {
    /// Shift lower records up over the freed bytes and return them to free
    /// space. Delete costs O(page size), the data area never fragments.
    #[default]
    Compact,
    /// Leave the freed bytes in place as an unreachable hole. Delete is O(1),
    /// the space is not reclaimed.
    LeaveHole,
}

/// Heap page configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HeapPageConfig {
    /// Delete behaviour
    #[serde(default)]
    pub delete_policy: DeletePolicy,
}

impl HeapPageConfig {
    /// Set the delete policy
    #[must_use]
    pub fn with_delete_policy(mut self, delete_policy: DeletePolicy) -> Self {
        self.delete_policy = delete_policy;
        self
    }

    /// Whether deletes compact the data area
    pub fn compacts_on_delete(&self) -> bool {
        self.delete_policy == DeletePolicy::Compact
    }
}
