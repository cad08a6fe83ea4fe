//! Batch source: lazily chunks an ordered input into fixed-size batches.

use crate::error::{PipelineError, Result};
use crate::types::{Batch, Item};

/// Lazily slices an ordered collection of items into batches.
///
/// Covers the input exactly once, in input order; the final batch may be
/// shorter than `batch_size`. Not restartable: create a fresh source for a
/// new pass.
///
/// The iterator yields `Result<Batch>` so consumers are written against the
/// general contract of a source that can fail mid-iteration; this in-memory
/// source itself never does.
#[derive(Debug)]
pub struct BatchSource {
    items: std::vec::IntoIter<Item>,
    batch_size: usize,
    next_index: usize,
}

impl BatchSource {
    /// Creates a batch source over the given items.
    ///
    /// # Errors
    /// Returns `PipelineError::InvalidConfiguration` if `batch_size` is zero.
    pub fn new(items: Vec<Item>, batch_size: usize) -> Result<Self> {
        if batch_size == 0 {
            return Err(PipelineError::InvalidConfiguration(
                "batch_size must be greater than zero".to_string(),
            ));
        }
        Ok(Self { items: items.into_iter(), batch_size, next_index: 0 })
    }

    /// Number of batches a source over `len` items will produce.
    #[must_use]
    pub fn expected_batches(len: usize, batch_size: usize) -> usize {
        len.div_ceil(batch_size)
    }
}

impl Iterator for BatchSource {
    type Item = Result<Batch>;

    fn next(&mut self) -> Option<Self::Item> {
        let items: Vec<Item> = self.items.by_ref().take(self.batch_size).collect();
        if items.is_empty() {
            return None;
        }
        let batch = Batch { index: self.next_index, items };
        self.next_index += 1;
        Some(Ok(batch))
    }
}
