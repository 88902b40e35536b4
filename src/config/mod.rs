// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Declarative tiler configuration.
//!
//! [`TilingConfig`] describes a complete feature layout (which dimensions are
//! tiled together, how many tilings, index capacity and offset) and can be
//! deserialized with serde from any self-describing format.
//!
//! # Example
//!
//! ```
//! use tile_coding::config::{Layout, TilingConfig};
//!
//! let config = TilingConfig {
//!     num_dims: 3,
//!     num_tilings: 4,
//!     layout: Layout::SinglesAndPairs,
//!     capacity: Some(4096),
//!     seed: Some(1),
//!     ..TilingConfig::default()
//! };
//!
//! let indexing = config.build().unwrap();
//! assert_eq!(indexing.tile(&[0.5, 1.5, 2.5]).len(), config.num_tiles());
//! assert_eq!(config.num_tiles(), (3 + 3) * 4);
//! ```

use crate::capacity;
use crate::compose::subset::{hash_tiler, pair_count, pair_tilers, single_tilers};
use crate::compose::{AggregateTiler, PairTiler, SingleTiler};
use crate::errors::{Result, TilingError};
use crate::hashing::SeedSource;
use crate::indexing::{Capacity, IndexingTiler};
use crate::tiler::Tiler;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Which groups of input dimensions are tiled together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    /// One hash tiler over all dimensions jointly.
    Full,
    /// One tiler per dimension.
    Singles,
    /// One tiler per unordered pair of dimensions.
    Pairs,
    /// Every single dimension followed by every pair.
    SinglesAndPairs,
    /// Explicitly chosen dimensions and pairs, singles first.
    Selected {
        #[serde(default)]
        singles: Vec<usize>,
        #[serde(default)]
        pairs: Vec<(usize, usize)>,
    },
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Layout::Full => write!(f, "full"),
            Layout::Singles => write!(f, "singles"),
            Layout::Pairs => write!(f, "pairs"),
            Layout::SinglesAndPairs => write!(f, "singles_and_pairs"),
            Layout::Selected { singles, pairs } => {
                write!(f, "selected({} singles, {} pairs)", singles.len(), pairs.len())
            }
        }
    }
}

/// Complete description of a tile-coding feature layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TilingConfig {
    /// Length of the input vectors.
    pub num_dims: usize,
    /// Tilings per hash tiler.
    pub num_tilings: usize,
    pub layout: Layout,
    /// Index capacity; `None` for unlimited.
    pub capacity: Option<usize>,
    /// First index value.
    pub offset: usize,
    /// Reject tiling counts that are not a power of two.
    pub require_power_of_two: bool,
    /// Root seed. Each hash tiler derives its own seed from it, so the same
    /// configuration reproduces the same identifiers. Random when `None`.
    pub seed: Option<u64>,
    /// Run the children of the layout concurrently.
    pub parallel: bool,
}

impl Default for TilingConfig {
    fn default() -> Self {
        Self {
            num_dims: 1,
            num_tilings: 8,
            layout: Layout::Full,
            capacity: None,
            offset: 0,
            require_power_of_two: false,
            seed: None,
            parallel: false,
        }
    }
}

impl TilingConfig {
    /// Build the layout's tiler, producing identifiers.
    pub fn build_tiler(&self) -> Result<Box<dyn Tiler>> {
        let mut seeds = SeedSource::new(self.seed);
        let (num_dims, num_tilings, pow2) =
            (self.num_dims, self.num_tilings, self.require_power_of_two);

        let tilers = match &self.layout {
            Layout::Full => {
                let tiler = hash_tiler(num_tilings, pow2, &mut seeds)?;
                return Ok(Box::new(tiler));
            }
            Layout::Singles => single_tilers(num_dims, num_tilings, pow2, &mut seeds)?,
            Layout::Pairs => pair_tilers(num_dims, num_tilings, pow2, &mut seeds)?,
            Layout::SinglesAndPairs => {
                let mut tilers = single_tilers(num_dims, num_tilings, pow2, &mut seeds)?;
                tilers.extend(pair_tilers(num_dims, num_tilings, pow2, &mut seeds)?);
                tilers
            }
            Layout::Selected { singles, pairs } => {
                let mut tilers: Vec<Arc<dyn Tiler>> = Vec::with_capacity(singles.len() + pairs.len());
                for &dimension in singles {
                    self.check_dimension(dimension)?;
                    let tiler = hash_tiler(num_tilings, pow2, &mut seeds)?;
                    tilers.push(Arc::new(SingleTiler::with_tiler(dimension, tiler)));
                }
                for &(first, second) in pairs {
                    self.check_dimension(first)?;
                    self.check_dimension(second)?;
                    let tiler = hash_tiler(num_tilings, pow2, &mut seeds)?;
                    tilers.push(Arc::new(PairTiler::with_tiler(first, second, tiler)));
                }
                tilers
            }
        };

        if tilers.is_empty() {
            return Err(TilingError::EmptyLayout {
                layout: self.layout.to_string(),
                num_dims,
            });
        }
        Ok(Box::new(aggregate(self.parallel, tilers)))
    }

    /// Build the layout's tiler wrapped in an [`IndexingTiler`].
    pub fn build(&self) -> Result<IndexingTiler> {
        IndexingTiler::with_offset(self.build_tiler()?, self.offset, Capacity::from(self.capacity))
    }

    /// Number of identifiers (or indices) produced per input.
    pub fn num_tiles(&self) -> usize {
        let (singles, pairs) = self.group_counts();
        match self.layout {
            Layout::Full => self.num_tilings,
            _ => singles.saturating_add(pairs).saturating_mul(self.num_tilings),
        }
    }

    /// Upper bound on the distinct indices for inputs in `[0, max_range]`
    /// along every dimension.
    ///
    /// A capacity of at least this value never overflows for such inputs.
    pub fn max_indices(&self, max_range: usize) -> usize {
        if self.layout == Layout::Full {
            return capacity::max_indices(max_range, self.num_dims, self.num_tilings);
        }
        let (singles, pairs) = self.group_counts();
        let per_single = capacity::max_indices(max_range, 1, self.num_tilings);
        let per_pair = capacity::max_indices(max_range, 2, self.num_tilings);
        singles
            .saturating_mul(per_single)
            .saturating_add(pairs.saturating_mul(per_pair))
    }

    /// Number of single and pair tilers in the layout.
    fn group_counts(&self) -> (usize, usize) {
        match &self.layout {
            Layout::Full => (0, 0),
            Layout::Singles => (self.num_dims, 0),
            Layout::Pairs => (0, pair_count(self.num_dims)),
            Layout::SinglesAndPairs => (self.num_dims, pair_count(self.num_dims)),
            Layout::Selected { singles, pairs } => (singles.len(), pairs.len()),
        }
    }

    fn check_dimension(&self, dimension: usize) -> Result<()> {
        if dimension < self.num_dims {
            Ok(())
        } else {
            Err(TilingError::DimensionOutOfRange {
                dimension,
                num_dims: self.num_dims,
            })
        }
    }
}

#[cfg(feature = "parallel")]
fn aggregate(parallel: bool, tilers: Vec<Arc<dyn Tiler>>) -> AggregateTiler {
    if parallel {
        AggregateTiler::parallel(tilers)
    } else {
        AggregateTiler::new(tilers)
    }
}

#[cfg(not(feature = "parallel"))]
fn aggregate(parallel: bool, tilers: Vec<Arc<dyn Tiler>>) -> AggregateTiler {
    if parallel {
        tracing::warn!("parallel dispatch requested without the `parallel` feature; running sequentially");
    }
    AggregateTiler::new(tilers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::InvalidTilingReason;

    fn config(layout: Layout) -> TilingConfig {
        TilingConfig {
            num_dims: 4,
            num_tilings: 2,
            layout,
            seed: Some(3),
            ..TilingConfig::default()
        }
    }

    #[test]
    fn test_num_tiles_per_layout() {
        assert_eq!(config(Layout::Full).num_tiles(), 2);
        assert_eq!(config(Layout::Singles).num_tiles(), 8);
        assert_eq!(config(Layout::Pairs).num_tiles(), 12);
        assert_eq!(config(Layout::SinglesAndPairs).num_tiles(), 20);
        let selected = Layout::Selected {
            singles: vec![0],
            pairs: vec![(1, 3), (0, 2)],
        };
        assert_eq!(config(selected).num_tiles(), 6);
    }

    #[test]
    fn test_built_tiler_matches_num_tiles() {
        let data = [0.1, 0.2, 0.3, 0.4];
        for layout in [
            Layout::Full,
            Layout::Singles,
            Layout::Pairs,
            Layout::SinglesAndPairs,
            Layout::Selected {
                singles: vec![3, 1],
                pairs: vec![(0, 1)],
            },
        ] {
            let config = config(layout);
            let tiler = config.build_tiler().unwrap();
            assert_eq!(tiler.num_tiles(), config.num_tiles(), "{}", config.layout);
            assert_eq!(tiler.tile(&data).len(), config.num_tiles(), "{}", config.layout);
        }
    }

    #[test]
    fn test_seeded_config_is_reproducible() {
        let config = config(Layout::SinglesAndPairs);
        let data = [1.5, -0.5, 2.25, 9.0];
        assert_eq!(
            config.build_tiler().unwrap().tile(&data),
            config.build_tiler().unwrap().tile(&data)
        );
    }

    #[test]
    fn test_invalid_tilings_rejected() {
        let config = TilingConfig {
            num_tilings: 6,
            require_power_of_two: true,
            ..config(Layout::Pairs)
        };
        assert!(matches!(
            config.build_tiler(),
            Err(TilingError::InvalidTilingCount {
                count: 6,
                reason: InvalidTilingReason::NotPowerOfTwo
            })
        ));
    }

    #[test]
    fn test_empty_layout_rejected() {
        let config = TilingConfig {
            num_dims: 1,
            ..config(Layout::Pairs)
        };
        assert_eq!(
            config.build_tiler().unwrap_err(),
            TilingError::EmptyLayout {
                layout: "pairs".to_string(),
                num_dims: 1
            }
        );
    }

    #[test]
    fn test_selected_dimension_out_of_range() {
        let config = config(Layout::Selected {
            singles: vec![0],
            pairs: vec![(2, 4)],
        });
        assert_eq!(
            config.build_tiler().unwrap_err(),
            TilingError::DimensionOutOfRange {
                dimension: 4,
                num_dims: 4
            }
        );
    }

    #[test]
    fn test_build_applies_capacity_and_offset() {
        let config = TilingConfig {
            capacity: Some(1),
            offset: 7,
            ..config(Layout::Singles)
        };
        let indexing = config.build().unwrap();
        assert_eq!(indexing.capacity(), Capacity::Limited(1));
        assert_eq!(indexing.tile(&[0.0, 1.0, 2.0, 3.0]), vec![7; 8]);
        assert!(indexing.check_error().is_err());
    }

    #[test]
    fn test_sizes_saturate_for_huge_dimension_counts() {
        let huge = |layout| TilingConfig {
            num_dims: usize::MAX,
            ..config(layout)
        };
        assert_eq!(huge(Layout::Full).num_tiles(), 2);
        assert_eq!(huge(Layout::Singles).num_tiles(), usize::MAX);
        assert_eq!(huge(Layout::Pairs).num_tiles(), usize::MAX);
        assert_eq!(huge(Layout::SinglesAndPairs).num_tiles(), usize::MAX);
        assert_eq!(huge(Layout::SinglesAndPairs).max_indices(2), usize::MAX);
        assert_eq!(huge(Layout::Full).max_indices(2), usize::MAX);
        assert_eq!(huge(Layout::Full).max_indices(0), 2);
    }

    #[test]
    fn test_max_indices_per_layout() {
        // Full: 2 * 3^4
        assert_eq!(config(Layout::Full).max_indices(2), 162);
        // Singles: 4 * (2 * 3)
        assert_eq!(config(Layout::Singles).max_indices(2), 24);
        // Pairs: 6 * (2 * 9)
        assert_eq!(config(Layout::Pairs).max_indices(2), 108);
        assert_eq!(config(Layout::SinglesAndPairs).max_indices(2), 132);
    }
}
