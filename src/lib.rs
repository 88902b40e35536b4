// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Tile coding (CMAC-style coarse coding) for linear function approximation.
//!
//! A continuous input vector is covered by several overlapping grids
//! ("tilings"), each offset from the previous one. The tile the input falls
//! into on each tiling becomes one active feature. This crate produces those
//! features; it does not learn or store weights.
//!
//! # Architecture
//!
//! Every component implements the [`Tiler`] trait, mapping `&[f64]` to a
//! fixed number of 64-bit tile identifiers:
//!
//! - [`HashTiler`]: quantizes the input onto `T` offset tilings and hashes
//!   each activated tile into an identifier. The engine everything else
//!   builds on.
//! - [`SingleTiler`] / [`PairTiler`]: run a private `HashTiler` over one or
//!   two chosen input dimensions.
//! - [`AggregateTiler`]: concatenates the identifiers of an ordered list of
//!   tilers.
//!
//! On top of any tiler:
//!
//! - [`IndexingTiler`]: maps identifiers to small integers in order of first
//!   appearance, within a bounded [`Capacity`], reporting overflow through a
//!   sticky, non-fatal [`IndexOverflow`].
//! - [`capacity`]: upper bounds on the number of indices a layout produces.
//! - [`config::TilingConfig`]: serde-friendly description of a whole layout.
//!
//! # Tiling scheme
//!
//! With `T` tilings, input component `v_i` is quantized to `floor(v_i * T)`,
//! so tiles are one input unit wide and consecutive tilings are `1/T` apart.
//! Along dimension `i` each tiling's origin moves by `1 + 2i` quantized units,
//! which staggers the tilings asymmetrically across dimensions. The cell
//! coordinates of the active tile, followed by the tiling number, are hashed
//! with a per-instance random seed.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use tile_coding::{AggregateTiler, HashTiler, IndexingTiler, Tiler, UNLIMITED_INDICES};
//!
//! let tiler = AggregateTiler::new(vec![
//!     Arc::new(HashTiler::new(3).unwrap()),
//!     Arc::new(HashTiler::new(2).unwrap()),
//! ]);
//! let indexing = IndexingTiler::new(tiler, UNLIMITED_INDICES).unwrap();
//!
//! assert_eq!(indexing.tile(&[3.0, 4.0]), vec![0, 1, 2, 3, 4]);
//! assert_eq!(indexing.tile(&[3.35, 4.0]), vec![0, 5, 2, 3, 4]);
//! ```
//!
//! # References
//!
//! - Sutton, R. S. and Barto, A. G. (2018). "Reinforcement Learning: An
//!   Introduction", section 9.5.4, Tile Coding.
//! - Albus, J. S. (1975). "A New Approach to Manipulator Control: The
//!   Cerebellar Model Articulation Controller (CMAC)".

pub mod capacity;
pub mod compose;
pub mod config;
pub mod errors;
pub mod hashing;
pub mod indexing;
pub mod tiler;

// Re-export commonly used types
pub use compose::{AggregateTiler, PairTiler, SingleTiler};
pub use config::{Layout, TilingConfig};
pub use errors::{IndexOverflow, InvalidTilingReason, TilingError};
pub use hashing::{HashTiler, HashTilerBuilder, TileScratch};
pub use indexing::{Capacity, IndexingTiler, UNLIMITED_INDICES};
pub use tiler::Tiler;
