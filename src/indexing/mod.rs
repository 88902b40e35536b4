// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Index allocation for tile identifiers.
//!
//! [`IndexingTiler`] wraps any [`Tiler`] and turns its 64-bit identifiers into
//! small integers `offset, offset + 1, ...` in order of first appearance,
//! suitable as sparse one-hot indices into a weight table.
//!
//! # Overflow
//!
//! With a [`Capacity::Limited`] bound, once `capacity` distinct identifiers
//! have been seen the allocation cursor wraps back to `offset`. New
//! identifiers then reuse index values that earlier identifiers still map to.
//! Old entries are never evicted, so from that point several identifiers
//! share an index. This is raised as a sticky [`IndexOverflow`] through
//! [`IndexingTiler::check_error`]; `tile` itself never fails.
//!
//! # Example
//!
//! ```
//! use tile_coding::{HashTiler, IndexingTiler, UNLIMITED_INDICES};
//!
//! let indexing = IndexingTiler::new(HashTiler::new(1).unwrap(), UNLIMITED_INDICES).unwrap();
//! assert_eq!(indexing.tile(&[4.5]), vec![0]);
//! assert_eq!(indexing.tile(&[5.5]), vec![1]);
//! assert_eq!(indexing.tile(&[4.2]), vec![0]);
//! assert!(indexing.check_error().is_ok());
//! ```

use crate::errors::{IndexOverflow, Result, TilingError};
use crate::tiler::Tiler;
use ahash::AHashMap;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Bound on the number of distinct indices an [`IndexingTiler`] hands out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capacity {
    /// At most this many indices; further identifiers wrap around and alias.
    Limited(usize),
    /// No bound short of the `usize` range: indices run from the offset up
    /// to `usize::MAX - 1` and only wrap once that range is exhausted.
    Unlimited,
}

/// Capacity bounded only by the `usize` range.
pub const UNLIMITED_INDICES: Capacity = Capacity::Unlimited;

impl From<usize> for Capacity {
    fn from(capacity: usize) -> Self {
        Capacity::Limited(capacity)
    }
}

impl From<Option<usize>> for Capacity {
    fn from(capacity: Option<usize>) -> Self {
        capacity.map_or(Capacity::Unlimited, Capacity::Limited)
    }
}

/// Mutable allocation state, guarded by the tiler's mutex.
#[derive(Debug, Default)]
struct Allocations {
    /// Index assigned to each identifier seen so far.
    indices: AHashMap<u64, usize>,
    /// Next index to hand out.
    cursor: usize,
    /// Set the first time the cursor wraps; never cleared.
    overflowed: bool,
}

/// Tiler returning bounded integer indices instead of hashes.
///
/// All calls on one instance are serialized by an internal mutex, so an
/// `IndexingTiler` may be shared between threads. Each call takes the lock
/// once for its whole batch of identifiers.
pub struct IndexingTiler<T = Box<dyn Tiler>> {
    tiler: T,
    capacity: Capacity,
    offset: usize,
    /// One past the last index; `usize::MAX` for unlimited capacities.
    end: usize,
    allocations: Mutex<Allocations>,
}

impl<T: Tiler> IndexingTiler<T> {
    /// Wrap `tiler`, handing out indices from 0.
    pub fn new(tiler: T, capacity: impl Into<Capacity>) -> Result<Self> {
        Self::with_offset(tiler, 0, capacity)
    }

    /// Wrap `tiler`, handing out indices from `offset`.
    ///
    /// Fails when a limited capacity is zero, or when the index range
    /// `offset..offset + capacity` does not fit in `usize`. An unlimited
    /// capacity needs `offset < usize::MAX`.
    pub fn with_offset(tiler: T, offset: usize, capacity: impl Into<Capacity>) -> Result<Self> {
        let capacity = capacity.into();
        let end = match capacity {
            Capacity::Limited(0) => return Err(TilingError::InvalidCapacity),
            Capacity::Limited(limit) => offset.checked_add(limit).ok_or(
                TilingError::IndexRangeOverflow {
                    offset,
                    capacity: limit,
                },
            )?,
            Capacity::Unlimited if offset == usize::MAX => {
                return Err(TilingError::IndexRangeOverflow {
                    offset,
                    capacity: 1,
                })
            }
            Capacity::Unlimited => usize::MAX,
        };

        tracing::debug!(
            num_tiles = tiler.num_tiles(),
            ?capacity,
            offset,
            "created indexing tiler"
        );

        Ok(Self {
            tiler,
            capacity,
            offset,
            end,
            allocations: Mutex::new(Allocations {
                cursor: offset,
                ..Allocations::default()
            }),
        })
    }

    /// Return one index per identifier of the wrapped tiler, in order.
    pub fn tile(&self, data: &[f64]) -> Vec<usize> {
        let hashes = self.tiler.tile(data);

        let mut allocations = self.allocations.lock();
        hashes
            .into_iter()
            .map(|hash| self.index_for(&mut allocations, hash))
            .collect()
    }

    fn index_for(&self, allocations: &mut Allocations, hash: u64) -> usize {
        if let Some(&index) = allocations.indices.get(&hash) {
            return index;
        }

        if allocations.cursor >= self.end {
            if allocations.overflowed {
                tracing::trace!(offset = self.offset, "index cursor wrapped again");
            } else {
                tracing::warn!(
                    capacity = self.end - self.offset,
                    offset = self.offset,
                    "too many tile indices were used, so indices are being reused"
                );
            }
            allocations.overflowed = true;
            allocations.cursor = self.offset;
        }

        let index = allocations.cursor;
        allocations.indices.insert(hash, index);
        allocations.cursor += 1;
        index
    }

    /// Report whether indices have started to alias.
    ///
    /// The condition is sticky: once the capacity has been exceeded this
    /// keeps returning the error. The tiler itself stays usable. With
    /// [`Capacity::Unlimited`] it is only raised once every index up to
    /// `usize::MAX - 1` has been handed out.
    pub fn check_error(&self) -> std::result::Result<(), IndexOverflow> {
        if self.allocations.lock().overflowed {
            return Err(IndexOverflow {
                capacity: self.end - self.offset,
                offset: self.offset,
            });
        }
        Ok(())
    }

    /// Number of identifiers each call returns indices for.
    pub fn num_tiles(&self) -> usize {
        self.tiler.num_tiles()
    }

    /// Number of distinct identifiers seen so far.
    ///
    /// After an overflow this exceeds the capacity, since aliased identifiers
    /// keep their entries.
    pub fn len(&self) -> usize {
        self.allocations.lock().indices.len()
    }

    /// True until the first call to [`IndexingTiler::tile`] with a non-empty result.
    pub fn is_empty(&self) -> bool {
        self.allocations.lock().indices.is_empty()
    }

    /// The configured capacity.
    pub fn capacity(&self) -> Capacity {
        self.capacity
    }

    /// The first index value handed out.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// The wrapped tiler.
    pub fn tiler(&self) -> &T {
        &self.tiler
    }
}

impl<T: Tiler> fmt::Debug for IndexingTiler<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let allocations = self.allocations.lock();
        f.debug_struct("IndexingTiler")
            .field("tiler", &self.tiler)
            .field("capacity", &self.capacity)
            .field("offset", &self.offset)
            .field("allocated", &allocations.indices.len())
            .field("overflowed", &allocations.overflowed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};

    /// Returns the integer part of each component as its identifier.
    #[derive(Debug)]
    struct FloorTiler;

    impl Tiler for FloorTiler {
        fn tile(&self, data: &[f64]) -> Vec<u64> {
            data.iter().map(|v| v.floor() as u64).collect()
        }

        fn num_tiles(&self) -> usize {
            1
        }
    }

    /// Returns a fresh identifier on every call.
    #[derive(Debug, Default)]
    struct CountingTiler(AtomicU64);

    impl Tiler for CountingTiler {
        fn tile(&self, _data: &[f64]) -> Vec<u64> {
            vec![self.0.fetch_add(1, Ordering::Relaxed)]
        }

        fn num_tiles(&self) -> usize {
            1
        }
    }

    #[test]
    fn test_first_appearance_order() {
        let indexing = IndexingTiler::new(FloorTiler, UNLIMITED_INDICES).unwrap();
        assert_eq!(indexing.tile(&[7.0, 3.0, 7.5]), vec![0, 1, 0]);
        assert_eq!(indexing.tile(&[3.2, 9.0]), vec![1, 2]);
        assert_eq!(indexing.len(), 3);
        assert!(indexing.check_error().is_ok());
    }

    #[test]
    fn test_offset_shifts_indices() {
        let indexing = IndexingTiler::with_offset(FloorTiler, 15, UNLIMITED_INDICES).unwrap();
        assert_eq!(indexing.tile(&[7.0, 3.0, 7.5]), vec![15, 16, 15]);
        assert_eq!(indexing.offset(), 15);
    }

    #[test]
    fn test_capacity_not_exceeded() {
        let indexing = IndexingTiler::new(FloorTiler, 3).unwrap();
        assert_eq!(indexing.tile(&[1.0, 2.0, 3.0, 1.0]), vec![0, 1, 2, 0]);
        assert!(indexing.check_error().is_ok());
    }

    #[test]
    fn test_overflow_wraps_and_is_sticky() {
        let indexing = IndexingTiler::with_offset(FloorTiler, 10, 2).unwrap();
        assert_eq!(indexing.tile(&[1.0, 2.0]), vec![10, 11]);
        assert!(indexing.check_error().is_ok());

        // Third distinct identifier wraps onto 10, aliasing with identifier 1
        assert_eq!(indexing.tile(&[3.0]), vec![10]);
        assert_eq!(
            indexing.check_error(),
            Err(IndexOverflow {
                capacity: 2,
                offset: 10
            })
        );
        // Old mappings survive; the next new identifier continues from 11
        assert_eq!(indexing.tile(&[1.0, 2.0, 4.0]), vec![10, 11, 11]);
        assert_eq!(indexing.len(), 4);

        // Repeated identifiers do not clear the condition
        indexing.tile(&[1.0]);
        assert!(indexing.check_error().is_err());
    }

    #[test]
    fn test_capacity_one_collapses_everything() {
        let indexing = IndexingTiler::with_offset(FloorTiler, 4, 1).unwrap();
        assert_eq!(indexing.tile(&[1.0]), vec![4]);
        assert!(indexing.check_error().is_ok());
        assert_eq!(indexing.tile(&[2.0, 3.0, 1.0]), vec![4, 4, 4]);
        assert!(indexing.check_error().is_err());
    }

    #[test]
    fn test_rejects_zero_capacity() {
        assert_eq!(
            IndexingTiler::new(FloorTiler, 0).unwrap_err(),
            TilingError::InvalidCapacity
        );
    }

    #[test]
    fn test_rejects_unrepresentable_range() {
        assert_eq!(
            IndexingTiler::with_offset(FloorTiler, usize::MAX, 2).unwrap_err(),
            TilingError::IndexRangeOverflow {
                offset: usize::MAX,
                capacity: 2
            }
        );
        // Unlimited capacity still needs one representable index
        assert!(IndexingTiler::with_offset(FloorTiler, usize::MAX - 1, UNLIMITED_INDICES).is_ok());
        assert_eq!(
            IndexingTiler::with_offset(FloorTiler, usize::MAX, UNLIMITED_INDICES).unwrap_err(),
            TilingError::IndexRangeOverflow {
                offset: usize::MAX,
                capacity: 1
            }
        );
    }

    #[test]
    fn test_unlimited_capacity_wraps_at_end_of_range() {
        let offset = usize::MAX - 1;
        let indexing = IndexingTiler::with_offset(FloorTiler, offset, UNLIMITED_INDICES).unwrap();

        assert_eq!(indexing.tile(&[0.0]), vec![offset]);
        assert!(indexing.check_error().is_ok());

        // The range holds one index, so later identifiers alias onto it
        assert_eq!(indexing.tile(&[1.0, 2.0]), vec![offset, offset]);
        assert_eq!(indexing.tile(&[0.0]), vec![offset]);
        assert_eq!(
            indexing.check_error(),
            Err(IndexOverflow {
                capacity: 1,
                offset
            })
        );
    }

    #[test]
    fn test_capacity_conversions() {
        assert_eq!(Capacity::from(8), Capacity::Limited(8));
        assert_eq!(Capacity::from(Some(8)), Capacity::Limited(8));
        assert_eq!(Capacity::from(None), Capacity::Unlimited);
    }

    #[test]
    fn test_concurrent_calls_allocate_each_index_once() {
        let indexing = IndexingTiler::new(CountingTiler::default(), UNLIMITED_INDICES).unwrap();

        let mut seen: Vec<usize> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    scope.spawn(|| {
                        (0..100)
                            .flat_map(|_| indexing.tile(&[0.0]))
                            .collect::<Vec<_>>()
                    })
                })
                .collect();
            handles
                .into_iter()
                .flat_map(|h| h.join().unwrap())
                .collect()
        });

        seen.sort_unstable();
        assert_eq!(seen, (0..800).collect::<Vec<usize>>());
    }

    #[test]
    fn test_debug_summarizes_state() {
        let indexing = IndexingTiler::new(FloorTiler, 5).unwrap();
        indexing.tile(&[1.0, 2.0]);
        let debug = format!("{:?}", indexing);
        assert!(debug.contains("allocated: 2"));
        assert!(debug.contains("overflowed: false"));
    }
}
