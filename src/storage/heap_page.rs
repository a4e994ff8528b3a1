//! Slotted heap page - variable-length records packed into one fixed-size buffer
//!
//! ```text
//! 0          20                      20+4n           20+fill_ptr        len
//! +----------+------------------------+---------------+------------------+
//! |  header  | slot 0 | slot 1 | ...  |  free space   | records ...      |
//! +----------+------------------------+---------------+------------------+
//!            |<---------------------- data area (C bytes) -------------->|
//! ```
//!
//! The slot directory grows up from the start of the data area, records grow
//! down from its end. Offsets stored in the header and in slots are relative
//! to the data area. A slot of length zero is a tombstone whose index is
//! reused by the next insert.
//!
//! ```
//! use heapstore::storage::heap_page::HeapPage;
//!
//! let mut page = HeapPage::new(1);
//! let rid = page.insert_record(b"alpha").unwrap().record_id().unwrap();
//! assert_eq!(page.return_record(rid).unwrap(), b"alpha");
//! page.delete_record(rid).unwrap();
//! assert!(page.is_empty());
//! ```

use std::fmt;

use crate::common::error::{Error, Result};
use crate::common::logging::Timer;
use crate::storage::config::HeapPageConfig;
use crate::storage::page::Page;
use crate::storage::page_constants::{
    PageId, HEAP_PAGE_HEADER_SIZE, MAX_DATA_SIZE, MIN_DATA_SIZE, SLOT_SIZE,
};
use crate::storage::page_header::HeapPageHeader;
use crate::storage::record_id::RecordId;
use crate::storage::slot::Slot;
use crate::{heapstore_debug, heapstore_error, heapstore_trace};

/// Result of [`HeapPage::insert_record`]
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The record was stored under this id
    Inserted(RecordId),
    /// The record does not fit given the page's current occupancy. The page is
    /// unchanged; try another page.
    InsufficientSpace,
}

impl InsertOutcome {
    /// Id of the inserted record, if any
    pub fn record_id(self) -> Option<RecordId> {
        match self {
            InsertOutcome::Inserted(rid) => Some(rid),
            InsertOutcome::InsufficientSpace => None,
        }
    }

    /// Whether the record was stored
    pub fn is_inserted(&self) -> bool {
        matches!(self, InsertOutcome::Inserted(_))
    }
}

/// A heap page laid over a caller-supplied buffer.
///
/// The buffer is typically a [`Page`] pinned by a buffer manager, but any
/// `AsRef<[u8]>` works; mutation additionally needs `AsMut<[u8]>`. The page
/// assumes exclusive access to the buffer for as long as it holds it.
pub struct HeapPage<B = Page> {
    buf: B,
    config: HeapPageConfig,
}

impl HeapPage<Page> {
    /// Create an empty heap page in a fresh 4KB page buffer
    pub fn new(page_id: PageId) -> Self {
        Self::with_config(page_id, HeapPageConfig::default())
    }

    /// Create an empty heap page in a fresh 4KB page buffer with `config`
    pub fn with_config(page_id: PageId, config: HeapPageConfig) -> Self {
        let mut page = Self {
            buf: Page::new(),
            config,
        };
        page.init(page_id);
        page
    }
}

impl<B: AsRef<[u8]>> HeapPage<B> {
    /// Adopt a buffer that already holds a heap page, e.g. one just read back
    /// by the buffer manager.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` if the buffer length cannot host a heap
    /// page, and `Error::Corruption` if the header or slot directory are
    /// inconsistent.
    pub fn open(buf: B, config: HeapPageConfig) -> Result<Self> {
        check_buffer_len(buf.as_ref().len())?;
        let page = Self { buf, config };
        if let Err(err) = page.check_invariants() {
            heapstore_error!("Refusing to open heap page: {}", err);
            return Err(err);
        }
        Ok(page)
    }

    /// Page id
    pub fn page_id(&self) -> PageId {
        self.header().page_id
    }

    /// Previous page in the heap file chain, `INVALID_PAGE_ID` if none
    pub fn prev_page(&self) -> PageId {
        self.header().prev_page
    }

    /// Next page in the heap file chain, `INVALID_PAGE_ID` if none
    pub fn next_page(&self) -> PageId {
        self.header().next_page
    }

    /// Whether the page links to a predecessor
    pub fn has_prev_page(&self) -> bool {
        self.header().has_prev()
    }

    /// Whether the page links to a successor
    pub fn has_next_page(&self) -> bool {
        self.header().has_next()
    }

    /// Bytes between the slot directory and the fill pointer
    pub fn free_space(&self) -> usize {
        usize::from(self.header().free_space)
    }

    /// Slot directory entries, tombstones included
    pub fn num_slots(&self) -> usize {
        usize::from(self.header().num_slots)
    }

    /// Data-area offset of the lowest stored record byte
    pub fn fill_ptr(&self) -> usize {
        usize::from(self.header().fill_ptr)
    }

    /// Size of the data area in bytes
    pub fn capacity(&self) -> usize {
        self.buf.as_ref().len() - HEAP_PAGE_HEADER_SIZE
    }

    /// Longest record this page could ever hold, i.e. when empty
    pub fn max_record_len(&self) -> usize {
        self.capacity() - SLOT_SIZE
    }

    /// Configuration this page was opened with
    pub fn config(&self) -> &HeapPageConfig {
        &self.config
    }

    /// Raw page image, header included
    pub fn as_bytes(&self) -> &[u8] {
        self.buf.as_ref()
    }

    /// Give the buffer back, e.g. to unpin it
    pub fn into_inner(self) -> B {
        self.buf
    }

    /// Slot directory entry at `slot`, tombstones included
    pub fn slot_at(&self, slot: u16) -> Option<Slot> {
        (slot < self.header().num_slots).then(|| self.slot(usize::from(slot)))
    }

    /// Copy the record `rid` into `dst` and return its length.
    ///
    /// # Errors
    ///
    /// Returns `Error::RecordNotFound` if `rid` does not name a live record on
    /// this page, and `Error::InvalidInput` if `dst` is too short.
    pub fn get_record(&self, rid: RecordId, dst: &mut [u8]) -> Result<usize> {
        let record = self.return_record(rid)?;
        let available = dst.len();
        let dst = dst.get_mut(..record.len()).ok_or_else(|| {
            Error::invalid_input(format!(
                "record {rid} is {} bytes, destination holds {available}",
                record.len()
            ))
        })?;
        dst.copy_from_slice(record);
        Ok(record.len())
    }

    /// Borrow the bytes of record `rid` straight out of the page buffer.
    ///
    /// The view borrows the page, so no insert, delete or compaction can run
    /// while it is alive.
    ///
    /// # Errors
    ///
    /// Returns `Error::RecordNotFound` if `rid` does not name a live record on
    /// this page.
    pub fn return_record(&self, rid: RecordId) -> Result<&[u8]> {
        let slot = self.live_slot(rid)?;
        Ok(&self.data()[usize::from(slot.offset)..slot.end()])
    }

    /// Lowest-indexed live record, `None` if the page holds none
    pub fn first_record(&self) -> Option<RecordId> {
        let header = self.header();
        self.slots(header.num_slots)
            .position(|slot| slot.is_live())
            .map(|index| RecordId::new(header.page_id, slot_index(index)))
    }

    /// Next live record after `current` in slot order, `None` at the end of
    /// the page.
    ///
    /// # Errors
    ///
    /// Returns `Error::RecordNotFound` if `current` is not a live record.
    pub fn next_record(&self, current: RecordId) -> Result<Option<RecordId>> {
        self.live_slot(current)?;
        let header = self.header();
        let start = usize::from(current.slot) + 1;
        Ok(self
            .slots(header.num_slots)
            .enumerate()
            .skip(start)
            .find(|(_, slot)| slot.is_live())
            .map(|(index, _)| RecordId::new(header.page_id, slot_index(index))))
    }

    /// Iterate over live records in slot order
    pub fn records(&self) -> Records<'_, B> {
        Records {
            page: self,
            cursor: self.first_record(),
        }
    }

    /// Largest record length guaranteed to be accepted by the next insert
    pub fn available_space(&self) -> usize {
        let header = self.header();
        let free_space = usize::from(header.free_space);
        if self.slots(header.num_slots).any(|slot| slot.is_tombstone()) {
            free_space
        } else {
            free_space.saturating_sub(SLOT_SIZE)
        }
    }

    /// Whether the page holds no live record
    pub fn is_empty(&self) -> bool {
        self.slots(self.header().num_slots)
            .all(|slot| slot.is_tombstone())
    }

    /// Number of live records
    pub fn num_records(&self) -> usize {
        self.slots(self.header().num_slots)
            .filter(Slot::is_live)
            .count()
    }

    /// Verify the page layout invariants.
    ///
    /// # Errors
    ///
    /// Returns `Error::Corruption` describing the first violation found.
    pub fn check_invariants(&self) -> Result<()> {
        let header = self.header();
        let capacity = self.capacity();
        let fill_ptr = usize::from(header.fill_ptr);
        let directory_end = usize::from(header.num_slots) * SLOT_SIZE;

        if fill_ptr > capacity {
            return Err(Error::corruption(format!(
                "fill pointer {fill_ptr} past data area of {capacity} bytes"
            )));
        }
        if directory_end > fill_ptr {
            return Err(Error::corruption(format!(
                "slot directory ends at {directory_end}, beyond fill pointer {fill_ptr}"
            )));
        }
        if usize::from(header.free_space) != fill_ptr - directory_end {
            return Err(Error::corruption(format!(
                "free space is {} but {} bytes lie between directory and fill pointer",
                header.free_space,
                fill_ptr - directory_end
            )));
        }

        let mut live: Vec<(usize, Slot)> = self
            .slots(header.num_slots)
            .enumerate()
            .filter(|(_, slot)| slot.is_live())
            .collect();
        for &(index, slot) in &live {
            if usize::from(slot.offset) < fill_ptr || slot.end() > capacity {
                return Err(Error::corruption(format!(
                    "slot {index} spans {}..{}, outside record area {fill_ptr}..{capacity}",
                    slot.offset,
                    slot.end()
                )));
            }
        }
        live.sort_unstable_by_key(|&(_, slot)| slot.offset);
        for pair in live.windows(2) {
            let (lower_index, lower) = pair[0];
            let (upper_index, upper) = pair[1];
            if lower.end() > usize::from(upper.offset) {
                return Err(Error::corruption(format!(
                    "slots {lower_index} and {upper_index} overlap"
                )));
            }
        }
        Ok(())
    }

    fn header(&self) -> HeapPageHeader {
        HeapPageHeader::read_from(self.buf.as_ref())
    }

    fn data(&self) -> &[u8] {
        &self.buf.as_ref()[HEAP_PAGE_HEADER_SIZE..]
    }

    fn slot(&self, index: usize) -> Slot {
        Slot::read_from(&self.data()[index * SLOT_SIZE..])
    }

    fn slots(&self, num_slots: u16) -> impl Iterator<Item = Slot> + '_ {
        self.data()[..usize::from(num_slots) * SLOT_SIZE]
            .chunks_exact(SLOT_SIZE)
            .map(Slot::read_from)
    }

    fn live_slot(&self, rid: RecordId) -> Result<Slot> {
        let header = self.header();
        if rid.page_id != header.page_id || rid.slot >= header.num_slots {
            heapstore_debug!(
                "No slot {} on page {} ({} slots)",
                rid,
                header.page_id,
                header.num_slots
            );
            return Err(Error::RecordNotFound(rid));
        }
        let slot = self.slot(usize::from(rid.slot));
        if slot.is_tombstone() {
            heapstore_debug!("Slot {} is a tombstone", rid);
            return Err(Error::RecordNotFound(rid));
        }
        Ok(slot)
    }
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> HeapPage<B> {
    /// Lay an empty heap page over `buf`.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` if the buffer length cannot host a heap
    /// page.
    pub fn create(buf: B, page_id: PageId, config: HeapPageConfig) -> Result<Self> {
        check_buffer_len(buf.as_ref().len())?;
        let mut page = Self { buf, config };
        page.init(page_id);
        Ok(page)
    }

    /// Reset the page to the empty state under `page_id`
    pub fn init(&mut self, page_id: PageId) {
        let capacity = data_offset(self.capacity());
        self.write_header(&HeapPageHeader::empty(page_id, capacity));
        heapstore_debug!("Initialized heap page {} ({} data bytes)", page_id, capacity);
    }

    /// Link the page to its predecessor in the heap file chain
    pub fn set_prev_page(&mut self, page_id: PageId) {
        let mut header = self.header();
        header.prev_page = page_id;
        self.write_header(&header);
    }

    /// Link the page to its successor in the heap file chain
    pub fn set_next_page(&mut self, page_id: PageId) {
        let mut header = self.header();
        header.next_page = page_id;
        self.write_header(&header);
    }

    /// Store `record` on the page.
    ///
    /// The first tombstoned slot is reused if there is one, otherwise the
    /// slot directory grows by one entry. Running out of room is reported as
    /// [`InsertOutcome::InsufficientSpace`] and leaves the page untouched.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` for an empty record or one longer than
    /// [`max_record_len`](Self::max_record_len).
    pub fn insert_record(&mut self, record: &[u8]) -> Result<InsertOutcome> {
        let length = record.len();
        if length == 0 {
            return Err(Error::invalid_input("records must be at least one byte"));
        }
        if length > self.max_record_len() {
            return Err(Error::invalid_input(format!(
                "record of {length} bytes exceeds the {} byte maximum of this page",
                self.max_record_len()
            )));
        }

        let mut header = self.header();
        let tombstone = self
            .slots(header.num_slots)
            .position(|slot| slot.is_tombstone());
        let required = match tombstone {
            Some(_) => length,
            None => length + SLOT_SIZE,
        };
        if required > usize::from(header.free_space) {
            heapstore_trace!(
                "Page {}: {} bytes needed, {} free",
                header.page_id,
                required,
                header.free_space
            );
            return Ok(InsertOutcome::InsufficientSpace);
        }

        let index = match tombstone {
            Some(index) => slot_index(index),
            None => {
                header.num_slots += 1;
                header.num_slots - 1
            }
        };
        header.free_space -= data_offset(required);
        header.fill_ptr -= data_offset(length);

        let slot = Slot::new(header.fill_ptr, data_offset(length));
        self.data_mut()[usize::from(slot.offset)..slot.end()].copy_from_slice(record);
        self.write_slot(usize::from(index), slot);
        self.write_header(&header);

        let rid = RecordId::new(header.page_id, index);
        heapstore_trace!("Inserted {} bytes as {}", length, rid);
        Ok(InsertOutcome::Inserted(rid))
    }

    /// Delete record `rid`, leaving a tombstone in its slot.
    ///
    /// Under [`DeletePolicy::Compact`](crate::storage::config::DeletePolicy)
    /// the records below the deleted one are shifted up over it and its bytes
    /// return to free space. Under `LeaveHole` the bytes stay where they are.
    ///
    /// # Errors
    ///
    /// Returns `Error::RecordNotFound` if `rid` does not name a live record on
    /// this page.
    pub fn delete_record(&mut self, rid: RecordId) -> Result<()> {
        let deleted = self.live_slot(rid)?;
        let mut header = self.header();

        if self.config.compacts_on_delete() {
            let fill_ptr = usize::from(header.fill_ptr);
            let offset = usize::from(deleted.offset);
            if offset != fill_ptr {
                let shift = usize::from(deleted.length);
                self.data_mut()
                    .copy_within(fill_ptr..offset, fill_ptr + shift);
                for index in 0..usize::from(header.num_slots) {
                    let mut slot = self.slot(index);
                    if slot.offset < deleted.offset {
                        slot.offset += deleted.length;
                        self.write_slot(index, slot);
                    }
                }
            }
            header.fill_ptr += deleted.length;
            header.free_space += deleted.length;
        }

        self.write_slot(usize::from(rid.slot), Slot::new(deleted.offset, 0));
        self.write_header(&header);
        heapstore_trace!(
            "Deleted {} ({} bytes, {:?})",
            rid,
            deleted.length,
            self.config.delete_policy
        );
        Ok(())
    }

    /// Drop tombstones from the slot directory and return how many went.
    ///
    /// Surviving slots keep their relative order but move down to fill the
    /// gaps, so every `RecordId` at or after the first removed slot now names
    /// a different record or none at all. Only call this when nobody holds
    /// record ids for this page.
    pub fn compact_slot_dir(&mut self) -> usize {
        let timer = Timer::start("compact_slot_dir");
        let mut header = self.header();
        let num_slots = usize::from(header.num_slots);

        let mut kept = 0;
        for index in 0..num_slots {
            let slot = self.slot(index);
            if slot.is_live() {
                if kept != index {
                    self.write_slot(kept, slot);
                }
                kept += 1;
            }
        }
        self.data_mut()[kept * SLOT_SIZE..num_slots * SLOT_SIZE].fill(0);

        let removed = num_slots - kept;
        header.num_slots = slot_index(kept);
        header.free_space += data_offset(removed * SLOT_SIZE);
        self.write_header(&header);

        if removed > 0 {
            heapstore_debug!(
                "Compacted slot directory of page {}: {} slots removed, {} left",
                header.page_id,
                removed,
                kept
            );
        }
        timer.stop();
        removed
    }

    fn write_header(&mut self, header: &HeapPageHeader) {
        header.write_to(self.buf.as_mut());
    }

    fn data_mut(&mut self) -> &mut [u8] {
        &mut self.buf.as_mut()[HEAP_PAGE_HEADER_SIZE..]
    }

    fn write_slot(&mut self, index: usize, slot: Slot) {
        slot.write_to(&mut self.data_mut()[index * SLOT_SIZE..]);
    }
}

impl<B: AsRef<[u8]>> fmt::Debug for HeapPage<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HeapPage")
            .field("header", &self.header())
            .field("capacity", &self.capacity())
            .field("config", &self.config)
            .finish()
    }
}

/// Forward iterator over the live records of one page, in slot order
pub struct Records<'a, B> {
    page: &'a HeapPage<B>,
    cursor: Option<RecordId>,
}

impl<'a, B: AsRef<[u8]>> Iterator for Records<'a, B> {
    type Item = (RecordId, &'a [u8]);

    fn next(&mut self) -> Option<Self::Item> {
        let rid = self.cursor?;
        self.cursor = self.page.next_record(rid).ok().flatten();
        let record = self.page.return_record(rid).ok()?;
        Some((rid, record))
    }
}

fn check_buffer_len(len: usize) -> Result<()> {
    let data_size = len.saturating_sub(HEAP_PAGE_HEADER_SIZE);
    if !(MIN_DATA_SIZE..=MAX_DATA_SIZE).contains(&data_size) {
        return Err(Error::invalid_input(format!(
            "a heap page needs {}..={} buffer bytes, got {len}",
            HEAP_PAGE_HEADER_SIZE + MIN_DATA_SIZE,
            HEAP_PAGE_HEADER_SIZE + MAX_DATA_SIZE
        )));
    }
    Ok(())
}

// Data-area offsets and lengths are bounded by MAX_DATA_SIZE once the buffer
// length has been checked.
#[allow(clippy::cast_possible_truncation)]
fn data_offset(value: usize) -> u16 {
    debug_assert!(value <= MAX_DATA_SIZE);
    value as u16
}

#[allow(clippy::cast_possible_truncation)]
fn slot_index(index: usize) -> u16 {
    debug_assert!(index <= MAX_DATA_SIZE / SLOT_SIZE);
    index as u16
}
