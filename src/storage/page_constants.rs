//! Page constants and fundamental types for the storage layer

/// Page size in bytes handed out by the buffer manager - must be power of 2 and >= 4KB
pub const PAGE_SIZE: usize = 4096;

/// Heap page header size in bytes
pub const HEAP_PAGE_HEADER_SIZE: usize = 20;

/// Size of one slot directory entry in bytes
pub const SLOT_SIZE: usize = 4;

/// Data area of a `PAGE_SIZE` heap page: slot directory, free space and records
pub const HEAP_PAGE_DATA_SIZE: usize = PAGE_SIZE - HEAP_PAGE_HEADER_SIZE;

/// Largest data area addressable by the 16-bit offsets of the page format
pub const MAX_DATA_SIZE: usize = u16::MAX as usize;

/// Smallest data area that can hold one slot and a one-byte record
pub const MIN_DATA_SIZE: usize = SLOT_SIZE + 1;

/// Page ID type
pub type PageId = u32;

/// Invalid page ID sentinel value, terminates page chains
pub const INVALID_PAGE_ID: PageId = 0;

/// Maximum valid page ID
pub const MAX_PAGE_ID: PageId = u32::MAX;

/// Index of an entry in a page's slot directory
pub type SlotIndex = u16;
