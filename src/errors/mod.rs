// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Error types for tiler construction and index allocation.
//!
//! Two kinds of failure exist:
//! - [`TilingError`]: construction-time validation. Construction fails and
//!   nothing is returned.
//! - [`IndexOverflow`]: run-time, sticky and non-fatal. An
//!   [`IndexingTiler`](crate::IndexingTiler) keeps working after it is raised.

use thiserror::Error;

/// Why a tiling count was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidTilingReason {
    /// Fewer than one tiling.
    TooSmall,
    /// Power-of-two tiling was requested, but the count is not one.
    NotPowerOfTwo,
}

impl std::fmt::Display for InvalidTilingReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvalidTilingReason::TooSmall => write!(f, "must be at least 1"),
            InvalidTilingReason::NotPowerOfTwo => write!(f, "must be a power of two"),
        }
    }
}

/// Errors raised while building a tiler.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TilingError {
    /// The number of tilings cannot be used.
    #[error("invalid tiling count {count}: {reason}")]
    InvalidTilingCount {
        count: usize,
        reason: InvalidTilingReason,
    },

    /// A limited index capacity of zero can never hold an index.
    #[error("index capacity must be at least 1")]
    InvalidCapacity,

    /// The last index, `offset + capacity - 1`, is not representable.
    #[error("index range starting at {offset} with capacity {capacity} overflows usize")]
    IndexRangeOverflow { offset: usize, capacity: usize },

    /// An adapter refers to an input dimension the layout does not have.
    #[error("dimension {dimension} is out of range for {num_dims} input dimensions")]
    DimensionOutOfRange { dimension: usize, num_dims: usize },

    /// The configured layout yields no tilers at all.
    #[error("layout {layout} over {num_dims} dimensions produces no tilers")]
    EmptyLayout { layout: String, num_dims: usize },
}

/// Sticky overflow condition of an [`IndexingTiler`](crate::IndexingTiler).
///
/// Once raised, identifiers alias onto index values that were handed out
/// earlier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("too many tile indices were used for capacity {capacity} at offset {offset}, so indices are being reused")]
pub struct IndexOverflow {
    pub capacity: usize,
    pub offset: usize,
}

/// Result alias for tiler construction.
pub type Result<T> = std::result::Result<T, TilingError>;
