//! Partition planning
//!
//! Splits the encoded weight text into `partition_count` equal slices of
//! `floor(len / partition_count)` characters, plus one trailing slot
//! (index `partition_count`) that carries the remainder.
//!
//! ```text
//! len = 1005, partition_count = 100, chunk = 10
//! [0..10) [10..20) ... [990..1000) [1000..1005)
//!   #0      #1          #99          #100
//! ```
//!
//! When `len` is an exact multiple of `partition_count` the trailing slot
//! is empty and the layout matches the plain equal-slice scheme byte for
//! byte. Text shorter than `partition_count` lands entirely in the
//! trailing slot.

use std::ops::Range;

/// Byte ranges of every partition for one encoded text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartitionPlan {
    text_len: usize,
    partition_count: usize,
    chunk_size: usize,
}

impl PartitionPlan {
    /// `partition_count` must be non-zero (enforced by `Config::validate`)
    pub fn new(text_len: usize, partition_count: usize) -> Self {
        let chunk_size = text_len.checked_div(partition_count).unwrap_or(0);
        Self {
            text_len,
            partition_count,
            chunk_size,
        }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Number of slots, `partition_count + 1`
    pub fn slot_count(&self) -> usize {
        self.partition_count + 1
    }

    /// Range covered by slot `index`; None when the slot is empty
    pub fn range(&self, index: usize) -> Option<Range<usize>> {
        if index > self.partition_count {
            return None;
        }

        let start = index * self.chunk_size;
        let end = if index == self.partition_count {
            self.text_len
        } else {
            start + self.chunk_size
        };

        (start < end).then_some(start..end)
    }

    /// Every slot in ascending order
    pub fn slots(&self) -> impl Iterator<Item = (usize, Option<Range<usize>>)> + '_ {
        (0..self.slot_count()).map(move |index| (index, self.range(index)))
    }

    /// Number of slots that hold data
    pub fn non_empty_count(&self) -> usize {
        self.slots().filter(|(_, range)| range.is_some()).count()
    }
}
