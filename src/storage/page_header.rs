//! Heap page header - exactly 20 bytes at the beginning of each heap page
//!
//! | offset | size | field        |
//! |--------|------|--------------|
//! | 0      | 4    | `page_id`    |
//! | 4      | 4    | `prev_page`  |
//! | 8      | 4    | `next_page`  |
//! | 12     | 2    | `free_space` |
//! | 14     | 2    | `num_slots`  |
//! | 16     | 2    | `fill_ptr`   |
//! | 18     | 2    | reserved (0) |

use crate::storage::page_constants::{PageId, HEAP_PAGE_HEADER_SIZE, INVALID_PAGE_ID};
use bytemuck::{Pod, Zeroable};

/// Heap page header
///
/// The header is decoded from and encoded to the front of the page buffer
/// explicitly; it is never borrowed in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
#[repr(C)]
pub struct HeapPageHeader {
    /// Page number (4 bytes)
    pub page_id: u32,
    /// Previous page in the heap file chain (4 bytes)
    pub prev_page: u32,
    /// Next page in the heap file chain (4 bytes)
    pub next_page: u32,
    /// Bytes available between the slot directory and the fill pointer (2 bytes)
    pub free_space: u16,
    /// Slot directory entries, live and tombstoned (2 bytes)
    pub num_slots: u16,
    /// Data-area offset of the lowest stored record byte (2 bytes)
    pub fill_ptr: u16,
    reserved: u16,
}

impl HeapPageHeader {
    /// Header of an empty page whose data area holds `data_size` bytes
    pub fn empty(page_id: PageId, data_size: u16) -> Self {
        Self {
            page_id,
            prev_page: INVALID_PAGE_ID,
            next_page: INVALID_PAGE_ID,
            free_space: data_size,
            num_slots: 0,
            fill_ptr: data_size,
            reserved: 0,
        }
    }

    /// Decode the header from the first `HEAP_PAGE_HEADER_SIZE` bytes of `bytes`
    ///
    /// # Panics
    ///
    /// Panics if `bytes` is shorter than the header.
    pub fn read_from(bytes: &[u8]) -> Self {
        bytemuck::pod_read_unaligned(&bytes[..HEAP_PAGE_HEADER_SIZE])
    }

    /// Encode the header into the first `HEAP_PAGE_HEADER_SIZE` bytes of `bytes`
    ///
    /// # Panics
    ///
    /// Panics if `bytes` is shorter than the header.
    pub fn write_to(&self, bytes: &mut [u8]) {
        bytes[..HEAP_PAGE_HEADER_SIZE].copy_from_slice(bytemuck::bytes_of(self));
    }

    /// Whether the page has a successor in its chain
    pub fn has_next(&self) -> bool {
        self.next_page != INVALID_PAGE_ID
    }

    /// Whether the page has a predecessor in its chain
    pub fn has_prev(&self) -> bool {
        self.prev_page != INVALID_PAGE_ID
    }
}
