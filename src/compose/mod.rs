// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Composition of tilers.
//!
//! [`AggregateTiler`] concatenates the identifiers of an ordered list of child
//! tilers. Together with the dimension-subset adapters in [`subset`] it builds
//! the usual CMAC feature layouts: every dimension on its own, every pair of
//! dimensions, or both.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use tile_coding::{compose, AggregateTiler, HashTiler, Tiler};
//!
//! let singles = compose::singles(4, 2).unwrap();
//! let pairs = compose::pairs(4, 2).unwrap();
//! assert_eq!(singles.num_tiles(), 4 * 2);
//! assert_eq!(pairs.num_tiles(), 6 * 2);
//!
//! let all = AggregateTiler::new(vec![Arc::new(singles), Arc::new(pairs)]);
//! assert_eq!(all.tile(&[1.0, 2.0, 3.0, 4.0]).len(), 20);
//! ```

pub mod subset;

pub use subset::{pairs, pairs_with_seed, singles, singles_with_seed, PairTiler, SingleTiler};

use crate::tiler::Tiler;
use std::sync::Arc;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// How children are driven by [`AggregateTiler::tile`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dispatch {
    Sequential,
    #[cfg(feature = "parallel")]
    Parallel,
}

/// Tiler returning the identifiers of all its children, in child order.
///
/// Children are shared (`Arc`), so the same tiler may appear in several
/// aggregates. The output length is the sum of the children's output lengths;
/// children are not checked for consistent lengths.
#[derive(Debug, Clone)]
pub struct AggregateTiler {
    tilers: Vec<Arc<dyn Tiler>>,
    num_tiles: usize,
    dispatch: Dispatch,
}

impl AggregateTiler {
    /// Combine `tilers`, calling them one after another.
    pub fn new(tilers: Vec<Arc<dyn Tiler>>) -> Self {
        Self::with_dispatch(tilers, Dispatch::Sequential)
    }

    /// Combine `tilers`, calling them concurrently on the rayon pool.
    ///
    /// The output is identical to [`AggregateTiler::new`]: identifiers are
    /// assembled in child order whatever order the children finish in.
    #[cfg(feature = "parallel")]
    pub fn parallel(tilers: Vec<Arc<dyn Tiler>>) -> Self {
        Self::with_dispatch(tilers, Dispatch::Parallel)
    }

    fn with_dispatch(tilers: Vec<Arc<dyn Tiler>>, dispatch: Dispatch) -> Self {
        let num_tiles = tilers.iter().map(|t| t.num_tiles()).sum();
        tracing::debug!(
            children = tilers.len(),
            num_tiles,
            ?dispatch,
            "created aggregate tiler"
        );
        Self {
            tilers,
            num_tiles,
            dispatch,
        }
    }

    /// The child tilers, in output order.
    pub fn tilers(&self) -> &[Arc<dyn Tiler>] {
        &self.tilers
    }

    /// Number of children.
    pub fn len(&self) -> usize {
        self.tilers.len()
    }

    /// True when there are no children.
    pub fn is_empty(&self) -> bool {
        self.tilers.is_empty()
    }

    /// True when children run on the rayon pool.
    pub fn is_parallel(&self) -> bool {
        self.dispatch != Dispatch::Sequential
    }
}

impl Tiler for AggregateTiler {
    fn tile(&self, data: &[f64]) -> Vec<u64> {
        match self.dispatch {
            Dispatch::Sequential => {
                let mut output = Vec::with_capacity(self.num_tiles);
                for tiler in &self.tilers {
                    output.extend(tiler.tile(data));
                }
                output
            }
            #[cfg(feature = "parallel")]
            Dispatch::Parallel => {
                let parts: Vec<Vec<u64>> =
                    self.tilers.par_iter().map(|tiler| tiler.tile(data)).collect();
                parts.concat()
            }
        }
    }

    fn num_tiles(&self) -> usize {
        self.num_tiles
    }
}
