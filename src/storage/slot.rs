//! Slot directory entry

use bytemuck::{Pod, Zeroable};

use crate::storage::page_constants::SLOT_SIZE;

/// Slot directory entry describing one record's byte range in the data area.
///
/// A zero `length` marks a tombstone: the index stays reserved but names no
/// record, and the next insert on the page may reuse it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Pod, Zeroable)]
#[repr(C)]
pub struct Slot {
    /// Data-area offset of the first record byte
    pub offset: u16,
    /// Record length in bytes, 0 for a tombstone
    pub length: u16,
}

impl Slot {
    /// Slot pointing at `length` bytes starting at `offset`
    pub fn new(offset: u16, length: u16) -> Self {
        Self { offset, length }
    }

    /// Whether this slot is a tombstone
    pub fn is_tombstone(&self) -> bool {
        self.length == 0
    }

    /// Whether this slot names a live record
    pub fn is_live(&self) -> bool {
        self.length != 0
    }

    /// Data-area offset one past the last record byte
    pub fn end(&self) -> usize {
        usize::from(self.offset) + usize::from(self.length)
    }

    pub(crate) fn read_from(bytes: &[u8]) -> Self {
        bytemuck::pod_read_unaligned(&bytes[..SLOT_SIZE])
    }

    pub(crate) fn write_to(self, bytes: &mut [u8]) {
        bytes[..SLOT_SIZE].copy_from_slice(bytemuck::bytes_of(&self));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_size() {
        assert_eq!(std::mem::size_of::<Slot>(), SLOT_SIZE);
    }

    #[test]
    fn test_tombstone() {
        assert!(Slot::default().is_tombstone());
        let slot = Slot::new(1019, 5);
        assert!(slot.is_live());
        assert_eq!(slot.end(), 1024);
    }

    #[test]
    fn test_slot_bytes() {
        let mut bytes = [0u8; SLOT_SIZE + 2];
        Slot::new(300, 17).write_to(&mut bytes[2..]);
        assert_eq!(Slot::read_from(&bytes[2..]), Slot::new(300, 17));
    }
}
