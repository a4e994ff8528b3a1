//! Page buffer - a 4KB aligned byte array as pinned by a buffer manager

use crate::storage::page_constants::PAGE_SIZE;

/// Page - 4KB aligned byte array
///
/// This is the unit of memory a buffer manager hands out. It has no layout of
/// its own; wrap it in a [`HeapPage`](crate::storage::heap_page::HeapPage) to
/// store records in it.
#[repr(C, align(4096))]
pub struct Page {
    buffer: [u8; PAGE_SIZE],
}

impl Page {
    /// Create a new zero-initialized page
    pub fn new() -> Self {
        Self {
            buffer: [0; PAGE_SIZE],
        }
    }

    /// Create a page from a full page image
    pub fn from_bytes(bytes: &[u8; PAGE_SIZE]) -> Self {
        Self { buffer: *bytes }
    }

    /// Get raw page buffer (read-only)
    pub fn raw(&self) -> &[u8] {
        &self.buffer
    }

    /// Get raw page buffer (mutable)
    pub fn raw_mut(&mut self) -> &mut [u8] {
        &mut self.buffer
    }

    /// Page size in bytes
    pub fn size(&self) -> usize {
        PAGE_SIZE
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new()
    }
}

impl AsRef<[u8]> for Page {
    fn as_ref(&self) -> &[u8] {
        &self.buffer
    }
}

impl AsMut<[u8]> for Page {
    fn as_mut(&mut self) -> &mut [u8] {
        &mut self.buffer
    }
}
