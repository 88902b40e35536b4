// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Dimension-subset adapters.
//!
//! A [`SingleTiler`] tiles one component of the input, a [`PairTiler`] two.
//! Each owns its own, independently seeded [`HashTiler`]. The builders
//! [`singles`] and [`pairs`] create one adapter per dimension or per
//! unordered pair of dimensions and aggregate them.

use super::AggregateTiler;
use crate::errors::Result;
use crate::hashing::{HashTiler, SeedSource};
use crate::tiler::Tiler;
use std::sync::Arc;

/// Tiles a single input dimension.
#[derive(Debug, Clone)]
pub struct SingleTiler {
    dimension: usize,
    tiler: HashTiler,
}

impl SingleTiler {
    /// Tile `dimension` with a new hash tiler of `num_tilings` tilings.
    pub fn new(dimension: usize, num_tilings: usize) -> Result<Self> {
        Ok(Self::with_tiler(dimension, HashTiler::new(num_tilings)?))
    }

    /// Tile `dimension` with an existing hash tiler.
    pub fn with_tiler(dimension: usize, tiler: HashTiler) -> Self {
        Self { dimension, tiler }
    }

    /// The input dimension this adapter reads.
    pub fn dimension(&self) -> usize {
        self.dimension
    }
}

impl Tiler for SingleTiler {
    /// # Panics
    ///
    /// Panics if `data` has no component at this adapter's dimension.
    fn tile(&self, data: &[f64]) -> Vec<u64> {
        self.tiler.tile(&[component(data, self.dimension)])
    }

    fn num_tiles(&self) -> usize {
        self.tiler.num_tilings()
    }
}

/// Tiles two input dimensions jointly.
#[derive(Debug, Clone)]
pub struct PairTiler {
    dimensions: (usize, usize),
    tiler: HashTiler,
}

impl PairTiler {
    /// Tile dimensions `first` and `second` with a new hash tiler.
    pub fn new(first: usize, second: usize, num_tilings: usize) -> Result<Self> {
        Ok(Self::with_tiler(first, second, HashTiler::new(num_tilings)?))
    }

    /// Tile dimensions `first` and `second` with an existing hash tiler.
    pub fn with_tiler(first: usize, second: usize, tiler: HashTiler) -> Self {
        Self {
            dimensions: (first, second),
            tiler,
        }
    }

    /// The input dimensions this adapter reads, in the order they are tiled.
    pub fn dimensions(&self) -> (usize, usize) {
        self.dimensions
    }
}

impl Tiler for PairTiler {
    /// # Panics
    ///
    /// Panics if `data` lacks either of this adapter's dimensions.
    fn tile(&self, data: &[f64]) -> Vec<u64> {
        let (first, second) = self.dimensions;
        self.tiler
            .tile(&[component(data, first), component(data, second)])
    }

    fn num_tiles(&self) -> usize {
        self.tiler.num_tilings()
    }
}

fn component(data: &[f64], dimension: usize) -> f64 {
    match data.get(dimension) {
        Some(&value) => value,
        None => panic!(
            "input has {} dimensions but dimension {} was selected",
            data.len(),
            dimension
        ),
    }
}

/// Aggregate of one [`SingleTiler`] per dimension `0..num_dims`.
pub fn singles(num_dims: usize, num_tilings: usize) -> Result<AggregateTiler> {
    let tilers = single_tilers(num_dims, num_tilings, false, &mut SeedSource::new(None))?;
    Ok(AggregateTiler::new(tilers))
}

/// Like [`singles`], with every child seed derived from `seed`.
pub fn singles_with_seed(num_dims: usize, num_tilings: usize, seed: u64) -> Result<AggregateTiler> {
    let tilers = single_tilers(num_dims, num_tilings, false, &mut SeedSource::new(Some(seed)))?;
    Ok(AggregateTiler::new(tilers))
}

/// Aggregate of one [`PairTiler`] per unordered pair of dimensions.
///
/// Pairs `(i, j)` with `i < j` are visited in lexicographic order, giving
/// `num_dims * (num_dims - 1) / 2` children.
pub fn pairs(num_dims: usize, num_tilings: usize) -> Result<AggregateTiler> {
    let tilers = pair_tilers(num_dims, num_tilings, false, &mut SeedSource::new(None))?;
    Ok(AggregateTiler::new(tilers))
}

/// Like [`pairs`], with every child seed derived from `seed`.
pub fn pairs_with_seed(num_dims: usize, num_tilings: usize, seed: u64) -> Result<AggregateTiler> {
    let tilers = pair_tilers(num_dims, num_tilings, false, &mut SeedSource::new(Some(seed)))?;
    Ok(AggregateTiler::new(tilers))
}

pub(crate) fn single_tilers(
    num_dims: usize,
    num_tilings: usize,
    power_of_two: bool,
    seeds: &mut SeedSource,
) -> Result<Vec<Arc<dyn Tiler>>> {
    (0..num_dims)
        .map(|dimension| -> Result<Arc<dyn Tiler>> {
            let tiler = hash_tiler(num_tilings, power_of_two, seeds)?;
            Ok(Arc::new(SingleTiler::with_tiler(dimension, tiler)))
        })
        .collect()
}

pub(crate) fn pair_tilers(
    num_dims: usize,
    num_tilings: usize,
    power_of_two: bool,
    seeds: &mut SeedSource,
) -> Result<Vec<Arc<dyn Tiler>>> {
    let mut tilers: Vec<Arc<dyn Tiler>> = Vec::with_capacity(pair_count(num_dims));
    for first in 0..num_dims {
        for second in first + 1..num_dims {
            let tiler = hash_tiler(num_tilings, power_of_two, seeds)?;
            tilers.push(Arc::new(PairTiler::with_tiler(first, second, tiler)));
        }
    }
    Ok(tilers)
}

/// Number of unordered pairs of `num_dims` dimensions, saturating at
/// `usize::MAX`.
pub(crate) fn pair_count(num_dims: usize) -> usize {
    let others = num_dims.saturating_sub(1);
    if num_dims % 2 == 0 {
        (num_dims / 2).saturating_mul(others)
    } else {
        num_dims.saturating_mul(others / 2)
    }
}

pub(crate) fn hash_tiler(
    num_tilings: usize,
    power_of_two: bool,
    seeds: &mut SeedSource,
) -> Result<HashTiler> {
    HashTiler::builder(num_tilings)
        .power_of_two(power_of_two)
        .maybe_seed(seeds.next_seed())
        .build()
}
