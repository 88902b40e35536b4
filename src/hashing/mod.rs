// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Hash tiling engine.
//!
//! [`HashTiler`] quantizes its input onto `T` offset tilings (see [`lattice`])
//! and hashes each activated tile's coordinate tuple, with the tiling number
//! appended, into a 64-bit identifier.
//!
//! # Hashing
//!
//! The tuple is serialized as little-endian `u64` words (negative cell
//! coordinates as two's complement) and fed to an `ahash` hasher keyed by the
//! instance's seed. Every instance draws a fresh random seed unless one is
//! given, so identifiers are only comparable within one instance.
//!
//! Collisions between distinct tuples are not detected. With 64-bit
//! identifiers they are negligible for any realistic feature table.
//!
//! # Scratch space
//!
//! [`Tiler::tile`] allocates its scratch space per call, so one `HashTiler`
//! can be shared between threads. For single-threaded hot loops,
//! [`HashTiler::tile_with`] reuses a caller-owned [`TileScratch`].
//!
//! # Example
//!
//! ```
//! use tile_coding::{HashTiler, TileScratch, Tiler};
//!
//! let tiler = HashTiler::with_seed(8, 42).unwrap();
//! let mut scratch = TileScratch::new();
//!
//! let ids = tiler.tile_with(&[0.25, -1.5], &mut scratch).to_vec();
//! assert_eq!(ids, tiler.tile(&[0.25, -1.5]));
//! ```

pub mod lattice;

use crate::errors::{InvalidTilingReason, Result, TilingError};
use crate::tiler::Tiler;
use ahash::RandomState;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt;
use std::hash::{BuildHasher, Hasher};

/// Reusable working buffers for [`HashTiler::tile_with`].
///
/// A scratch value may be used with any number of tilers, one call at a time.
#[derive(Debug, Default, Clone)]
pub struct TileScratch {
    work: Workspace,
    tiles: Vec<u64>,
}

impl TileScratch {
    /// Create empty scratch space. Buffers grow on first use.
    pub fn new() -> Self {
        Self::default()
    }
}

#[derive(Debug, Default, Clone)]
struct Workspace {
    /// Quantized input, one entry per dimension.
    quantized: Vec<i64>,
    /// Running origin of the current tiling, one entry per dimension.
    origins: Vec<i64>,
    /// Serialized coordinate tuple of the current tile.
    bytes: Vec<u8>,
}

/// Tile coder hashing offset-lattice cells into 64-bit identifiers.
///
/// Immutable after construction and `Send + Sync`.
#[derive(Clone)]
pub struct HashTiler {
    num_tilings: usize,
    seed: u64,
    state: RandomState,
}

impl HashTiler {
    /// Create a tiler with `num_tilings` tilings and a random seed.
    ///
    /// Any count of at least 1 is accepted.
    pub fn new(num_tilings: usize) -> Result<Self> {
        Self::builder(num_tilings).build()
    }

    /// Create a tiler whose tiling count must be a power of two.
    pub fn power_of_two(num_tilings: usize) -> Result<Self> {
        Self::builder(num_tilings).power_of_two(true).build()
    }

    /// Create a tiler with a fixed seed.
    ///
    /// Two tilers built with the same count and seed produce the same
    /// identifiers, on the same build of this crate.
    pub fn with_seed(num_tilings: usize, seed: u64) -> Result<Self> {
        Self::builder(num_tilings).seed(seed).build()
    }

    /// Start building a tiler with `num_tilings` tilings.
    pub fn builder(num_tilings: usize) -> HashTilerBuilder {
        HashTilerBuilder {
            num_tilings,
            power_of_two: false,
            seed: None,
        }
    }

    /// Number of tilings, which is also the number of identifiers per call.
    pub fn num_tilings(&self) -> usize {
        self.num_tilings
    }

    /// Seed this instance's hasher was keyed from.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Tile `data` using caller-owned scratch space.
    ///
    /// Returns a view into `scratch` holding `num_tilings()` identifiers,
    /// valid until the scratch is used again.
    pub fn tile_with<'s>(&self, data: &[f64], scratch: &'s mut TileScratch) -> &'s [u64] {
        scratch.tiles.resize(self.num_tilings, 0);
        self.compute(data, &mut scratch.work, &mut scratch.tiles);
        &scratch.tiles
    }

    /// Tile `data` into a caller-supplied output slice.
    ///
    /// # Panics
    ///
    /// Panics if `out.len()` differs from `num_tilings()`.
    pub fn tile_into(&self, data: &[f64], out: &mut [u64]) {
        assert_eq!(
            out.len(),
            self.num_tilings,
            "output buffer holds {} tiles but the tiler produces {}",
            out.len(),
            self.num_tilings
        );
        self.compute(data, &mut Workspace::default(), out);
    }

    fn compute(&self, data: &[f64], work: &mut Workspace, out: &mut [u64]) {
        let num_tilings = self.num_tilings as i64;

        work.quantized.clear();
        work.quantized
            .extend(data.iter().map(|&v| lattice::quantize(v, self.num_tilings)));
        work.origins.clear();
        work.origins.resize(data.len(), 0);

        for (tiling, slot) in out.iter_mut().enumerate() {
            work.bytes.clear();
            for (dimension, (&q, origin)) in work
                .quantized
                .iter()
                .zip(work.origins.iter_mut())
                .enumerate()
            {
                let cell = lattice::snap(q, *origin, num_tilings);
                work.bytes.extend_from_slice(&(cell as u64).to_le_bytes());
                *origin += lattice::displacement(dimension);
            }
            // Same cell in different tilings must hash differently
            work.bytes.extend_from_slice(&(tiling as u64).to_le_bytes());

            let mut hasher = self.state.build_hasher();
            hasher.write(&work.bytes);
            *slot = hasher.finish();
        }
    }
}

impl Tiler for HashTiler {
    fn tile(&self, data: &[f64]) -> Vec<u64> {
        let mut tiles = vec![0; self.num_tilings];
        self.compute(data, &mut Workspace::default(), &mut tiles);
        tiles
    }

    fn num_tiles(&self) -> usize {
        self.num_tilings
    }
}

impl fmt::Debug for HashTiler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashTiler")
            .field("num_tilings", &self.num_tilings)
            .field("seed", &self.seed)
            .finish()
    }
}

/// Builder for [`HashTiler`].
///
/// ```
/// use tile_coding::HashTiler;
///
/// let tiler = HashTiler::builder(16).power_of_two(true).seed(7).build().unwrap();
/// assert_eq!(tiler.num_tilings(), 16);
/// assert_eq!(tiler.seed(), 7);
/// ```
#[derive(Debug, Clone)]
pub struct HashTilerBuilder {
    num_tilings: usize,
    power_of_two: bool,
    seed: Option<u64>,
}

impl HashTilerBuilder {
    /// Reject tiling counts that are not a power of two.
    pub fn power_of_two(mut self, required: bool) -> Self {
        self.power_of_two = required;
        self
    }

    /// Key the hasher from `seed` instead of a random value.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Key the hasher from `seed` when given, from a random value otherwise.
    pub fn maybe_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// Validate the tiling count and build the tiler.
    pub fn build(self) -> Result<HashTiler> {
        let count = self.num_tilings;
        if count < 1 {
            return Err(TilingError::InvalidTilingCount {
                count,
                reason: InvalidTilingReason::TooSmall,
            });
        }
        if self.power_of_two && !count.is_power_of_two() {
            return Err(TilingError::InvalidTilingCount {
                count,
                reason: InvalidTilingReason::NotPowerOfTwo,
            });
        }

        let seed = self.seed.unwrap_or_else(|| rand::thread_rng().gen());
        let mut rng = StdRng::seed_from_u64(seed);
        let state = RandomState::with_seeds(rng.gen(), rng.gen(), rng.gen(), rng.gen());

        tracing::debug!(num_tilings = count, seed, "created hash tiler");

        Ok(HashTiler {
            num_tilings: count,
            seed,
            state,
        })
    }
}

/// Source of per-tiler seeds for tilers built in bulk.
///
/// Unseeded sources leave every tiler to draw its own random seed. Seeded
/// sources derive a reproducible sequence of child seeds from one root.
#[derive(Debug)]
pub(crate) enum SeedSource {
    Random,
    Derived(StdRng),
}

impl SeedSource {
    pub(crate) fn new(root: Option<u64>) -> Self {
        match root {
            Some(seed) => SeedSource::Derived(StdRng::seed_from_u64(seed)),
            None => SeedSource::Random,
        }
    }

    pub(crate) fn next_seed(&mut self) -> Option<u64> {
        match self {
            SeedSource::Random => None,
            SeedSource::Derived(rng) => Some(rng.gen()),
        }
    }
}
