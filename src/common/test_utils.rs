//! Test utilities for heapstore

use crate::common::logging;

/// Initialize logging for tests, with heapstore records shown down to `Debug`
pub fn init_test_logging() {
    logging::init_for_tests(log::LevelFilter::Debug);
}

/// Performance assertion helper
pub struct PerformanceAssertion {
    max_duration: std::time::Duration,
    operation: String,
    start: std::time::Instant,
}

impl PerformanceAssertion {
    /// Create a new performance assertion
    pub fn new<S: Into<String>>(operation: S, max_duration: std::time::Duration) -> Self {
        Self {
            max_duration,
            operation: operation.into(),
            start: std::time::Instant::now(),
        }
    }

    /// Assert that the operation completed within the time limit
    ///
    /// # Panics
    ///
    /// Panics if the operation took longer than the specified maximum duration.
    pub fn assert_completed(self) {
        let elapsed = self.start.elapsed();
        assert!(
            elapsed <= self.max_duration,
            "Operation '{}' took {:?}, expected <= {:?}",
            self.operation,
            elapsed,
            self.max_duration
        );
    }
}

/// Generate a record of `size` bytes with a repeating `0..=255` pattern
#[allow(clippy::cast_possible_truncation)]
pub fn generate_test_data(size: usize) -> Vec<u8> {
    (0..size).map(|i| (i % 256) as u8).collect()
}

/// Generate a record whose bytes identify `tag`, so records stay distinguishable
/// after they have been moved around a page
#[allow(clippy::cast_possible_truncation)]
pub fn generate_tagged_record(tag: u32, size: usize) -> Vec<u8> {
    let seed = tag.to_le_bytes();
    (0..size)
        .map(|i| seed[i % seed.len()].wrapping_add((i / seed.len()) as u8))
        .collect()
}

/// Assert that two byte slices are equal with better error messages
///
/// # Panics
///
/// Panics if the byte slices differ in length or content.
pub fn assert_bytes_equal(actual: &[u8], expected: &[u8], context: &str) {
    assert!(
        actual.len() == expected.len(),
        "{context}: Length mismatch - actual: {}, expected: {}",
        actual.len(),
        expected.len()
    );

    for (i, (a, e)) in actual.iter().zip(expected.iter()).enumerate() {
        assert!(
            a == e,
            "{context}: Byte mismatch at index {i}: actual 0x{a:02x}, expected 0x{e:02x}"
        );
    }
}
