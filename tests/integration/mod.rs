//! Integration test framework for heapstore
//!
//! Provides a minimal in-memory heap file that drives heap pages the way a
//! real heap file layer would: allocating and chaining pages, choosing an
//! insertion target by available space, and compacting slot directories only
//! when no record ids are outstanding.

use heapstore::common::test_utils::init_test_logging;
use heapstore::common::{Error, Result};
use heapstore::storage::page::Page;
use heapstore::storage::page_constants::{PageId, INVALID_PAGE_ID};
use heapstore::{HeapPage, HeapPageConfig, InsertOutcome, RecordId};
use std::collections::BTreeMap;

/// Integration test environment
pub struct TestEnvironment {
    /// Configuration handed to every page
    pub config: HeapPageConfig,
}

impl TestEnvironment {
    /// Create a new test environment
    pub fn new() -> Self {
        Self::with_config(HeapPageConfig::default())
    }

    /// Create a test environment with a specific page configuration
    pub fn with_config(config: HeapPageConfig) -> Self {
        init_test_logging();
        Self { config }
    }

    /// Create an empty heap file
    pub fn heap_file(&self) -> TestHeapFile {
        TestHeapFile::new(self.config)
    }
}

impl Default for TestEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

/// In-memory heap file: a doubly linked chain of heap pages
pub struct TestHeapFile {
    config: HeapPageConfig,
    pages: BTreeMap<PageId, HeapPage<Page>>,
    first_page: PageId,
    last_page: PageId,
    next_page_id: PageId,
}

impl TestHeapFile {
    fn new(config: HeapPageConfig) -> Self {
        Self {
            config,
            pages: BTreeMap::new(),
            first_page: INVALID_PAGE_ID,
            last_page: INVALID_PAGE_ID,
            next_page_id: 1,
        }
    }

    /// Number of pages in the chain
    pub fn num_pages(&self) -> usize {
        self.pages.len()
    }

    /// Borrow a page
    pub fn page(&self, page_id: PageId) -> Option<&HeapPage<Page>> {
        self.pages.get(&page_id)
    }

    /// Page ids in chain order
    pub fn chain(&self) -> Vec<PageId> {
        let mut ids = Vec::new();
        if self.pages.is_empty() {
            return ids;
        }
        let mut page = &self.pages[&self.first_page];
        assert!(!page.has_prev_page(), "chain head {} has a predecessor", page.page_id());
        ids.push(page.page_id());
        while page.has_next_page() {
            page = &self.pages[&page.next_page()];
            ids.push(page.page_id());
        }
        ids
    }

    /// Insert into the first page reporting enough space, growing the chain if
    /// none does
    ///
    /// Panics if a page refuses a record it reported room for.
    pub fn insert(&mut self, record: &[u8]) -> Result<RecordId> {
        let target = self
            .chain()
            .into_iter()
            .find(|id| self.pages[id].available_space() >= record.len());
        let page_id = match target {
            Some(page_id) => page_id,
            None => self.allocate_page(),
        };

        match self.page_mut(page_id)?.insert_record(record)? {
            InsertOutcome::Inserted(rid) => Ok(rid),
            InsertOutcome::InsufficientSpace => panic!(
                "page {page_id} reported room for {} bytes but refused them",
                record.len()
            ),
        }
    }

    /// Delete a record
    pub fn delete(&mut self, rid: RecordId) -> Result<()> {
        self.page_mut(rid.page_id)?.delete_record(rid)
    }

    /// Copy a record out
    pub fn get(&self, rid: RecordId) -> Result<Vec<u8>> {
        let page = self
            .pages
            .get(&rid.page_id)
            .ok_or(Error::RecordNotFound(rid))?;
        let mut buf = vec![0u8; page.max_record_len()];
        let len = page.get_record(rid, &mut buf)?;
        buf.truncate(len);
        Ok(buf)
    }

    /// All live records, page by page in chain order
    pub fn scan(&self) -> Result<Vec<(RecordId, Vec<u8>)>> {
        let mut records = Vec::new();
        for page_id in self.chain() {
            let page = &self.pages[&page_id];
            let mut cursor = page.first_record();
            while let Some(rid) = cursor {
                records.push((rid, page.return_record(rid)?.to_vec()));
                cursor = page.next_record(rid)?;
            }
        }
        Ok(records)
    }

    /// Compact every slot directory; all previously issued ids become stale
    pub fn vacuum(&mut self) -> usize {
        self.pages
            .values_mut()
            .map(HeapPage::compact_slot_dir)
            .sum()
    }

    fn page_mut(&mut self, page_id: PageId) -> Result<&mut HeapPage<Page>> {
        self.pages
            .get_mut(&page_id)
            .ok_or_else(|| Error::invalid_input(format!("no page {page_id}")))
    }

    fn allocate_page(&mut self) -> PageId {
        let page_id = self.next_page_id;
        self.next_page_id += 1;

        let mut page = HeapPage::with_config(page_id, self.config);
        page.set_prev_page(self.last_page);
        if let Some(last) = self.pages.get_mut(&self.last_page) {
            last.set_next_page(page_id);
        } else {
            self.first_page = page_id;
        }
        self.last_page = page_id;
        self.pages.insert(page_id, page);
        page_id
    }
}

/// Helper for testing error conditions
pub struct ErrorTester;

impl ErrorTester {
    /// Test that a function returns a specific error type
    pub fn assert_error_type<T: std::fmt::Debug, F>(func: F, expected_predicate: fn(&Error) -> bool)
    where
        F: FnOnce() -> Result<T>,
    {
        let result = func();
        assert!(result.is_err(), "Expected error, got success");

        let error = result.unwrap_err();
        assert!(
            expected_predicate(&error),
            "Error type mismatch. Got: {:?}",
            error
        );
    }

    /// Test that a function reports a missing record
    pub fn assert_not_found<T: std::fmt::Debug, F>(func: F)
    where
        F: FnOnce() -> Result<T>,
    {
        Self::assert_error_type(func, Error::is_not_found);
    }

    /// Test that a function rejects its input
    pub fn assert_invalid_input<T: std::fmt::Debug, F>(func: F)
    where
        F: FnOnce() -> Result<T>,
    {
        Self::assert_error_type(func, Error::is_invalid_input);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocation_links_pages() {
        let env = TestEnvironment::new();
        let mut file = env.heap_file();
        assert!(file.chain().is_empty());
        file.allocate_page();
        file.allocate_page();
        file.allocate_page();

        assert_eq!(file.chain(), vec![1, 2, 3]);
        assert_eq!(file.page(1).unwrap().prev_page(), INVALID_PAGE_ID);
        assert_eq!(file.page(2).unwrap().prev_page(), 1);
        assert_eq!(file.page(2).unwrap().next_page(), 3);
        assert_eq!(file.page(3).unwrap().next_page(), INVALID_PAGE_ID);
    }

    #[test]
    fn test_error_tester() {
        ErrorTester::assert_not_found(|| -> Result<()> {
            Err(Error::RecordNotFound(RecordId::new(1, 1)))
        });
        ErrorTester::assert_invalid_input(|| -> Result<()> {
            Err(Error::invalid_input("empty record"))
        });
    }
}
