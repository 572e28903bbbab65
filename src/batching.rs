//! Splitting the population into contiguous batches.
//!
//! Each batch is handled by its own worker during a generation phase.

use std::ops::Range;

use serde::{Deserialize, Serialize};

/// A half-open `[start, end)` range of population indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BatchRange {
    /// First index of the batch (inclusive).
    pub start: usize,
    /// One past the last index of the batch (exclusive).
    pub end: usize,
}

impl BatchRange {
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.end - self.start
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// The indices covered by this batch.
    #[must_use]
    pub const fn indices(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// Split `n_elements` into `n_batches` contiguous ranges.
///
/// Every batch gets `n_elements / n_batches` elements except the last one,
/// which also takes the remainder. The caller clamps `n_batches` to
/// `[1, n_elements]`; an empty list is returned when `n_elements` is 0.
#[must_use]
pub fn build_batches(n_elements: usize, n_batches: usize) -> Vec<BatchRange> {
    if n_elements == 0 || n_batches == 0 {
        return Vec::new();
    }

    let batch_size = n_elements / n_batches;
    let mut batches: Vec<BatchRange> = (0..n_batches)
        .map(|i| {
            let start = (i * batch_size).min(n_elements);
            let end = ((i + 1) * batch_size).min(n_elements);
            BatchRange::new(start, end)
        })
        .collect();

    if let Some(last) = batches.last_mut() {
        last.end = n_elements;
    }
    batches
}

/// Hand out one disjoint mutable sub-slice per batch.
///
/// `batches` must be contiguous and sorted, as produced by [`build_batches`];
/// the returned slices are in batch order.
#[must_use]
pub fn split_batches_mut<'a, T>(mut items: &'a mut [T], batches: &[BatchRange]) -> Vec<&'a mut [T]> {
    let mut chunks = Vec::with_capacity(batches.len());
    let mut offset = 0;
    for batch in batches {
        let (chunk, rest) = std::mem::take(&mut items).split_at_mut(batch.end - offset);
        chunks.push(chunk);
        items = rest;
        offset = batch.end;
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_uneven_split_goes_to_last_batch() {
        assert_eq!(
            build_batches(10, 3),
            vec![
                BatchRange::new(0, 3),
                BatchRange::new(3, 6),
                BatchRange::new(6, 10)
            ]
        );
    }

    #[test]
    fn test_even_split() {
        assert_eq!(
            build_batches(8, 4),
            vec![
                BatchRange::new(0, 2),
                BatchRange::new(2, 4),
                BatchRange::new(4, 6),
                BatchRange::new(6, 8)
            ]
        );
    }

    #[test]
    fn test_single_batch_and_one_per_element() {
        assert_eq!(build_batches(5, 1), vec![BatchRange::new(0, 5)]);
        let singles = build_batches(3, 3);
        assert!(singles.iter().all(|b| b.len() == 1));
    }

    #[test]
    fn test_empty_input() {
        assert!(build_batches(0, 1).is_empty());
    }

    #[test]
    fn test_split_batches_mut_matches_ranges() {
        let mut values: Vec<usize> = (0..10).collect();
        let batches = build_batches(values.len(), 3);
        let chunks = split_batches_mut(&mut values, &batches);

        assert_eq!(chunks.len(), 3);
        for (chunk, batch) in chunks.iter().zip(&batches) {
            assert_eq!(chunk.len(), batch.len());
            assert_eq!(chunk[0], batch.start);
        }
    }

    proptest! {
        #[test]
        fn prop_batches_partition_elements(n_elements in 1usize..500, n_batches in 1usize..64) {
            let n_batches = n_batches.min(n_elements);
            let batches = build_batches(n_elements, n_batches);

            prop_assert_eq!(batches.len(), n_batches);
            prop_assert_eq!(batches[0].start, 0);
            prop_assert_eq!(batches[batches.len() - 1].end, n_elements);
            for pair in batches.windows(2) {
                prop_assert_eq!(pair[0].end, pair[1].start);
            }
            let covered: usize = batches.iter().map(BatchRange::len).sum();
            prop_assert_eq!(covered, n_elements);
        }
    }
}
