// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! The Tiler trait: the capability every tile coder in this crate provides.
//!
//! A tiler maps a real-valued input vector to a fixed-length sequence of
//! 64-bit tile identifiers. Hash tilers, dimension-subset adapters and the
//! aggregate composer all implement it independently; there is no base type.
//!
//! # Example
//!
//! ```
//! use tile_coding::{HashTiler, Tiler};
//!
//! let tiler = HashTiler::new(4).unwrap();
//! let ids = tiler.tile(&[0.3, 1.7]);
//! assert_eq!(ids.len(), tiler.num_tiles());
//! assert_eq!(ids, tiler.tile(&[0.3, 1.7]));
//! ```

use std::fmt::Debug;
use std::sync::Arc;

/// Produces tile identifiers for a real-valued input.
///
/// # Contract
///
/// - `tile` always returns exactly `num_tiles()` identifiers.
/// - For a fixed instance, equal inputs give bit-for-bit equal outputs.
/// - The input length is not checked. Callers are expected to pass the same
///   length on every call to the same instance.
///
/// Identifiers are only meaningful within one instance: two instances with
/// the same configuration are not guaranteed to agree.
pub trait Tiler: Send + Sync + Debug {
    /// Return the tile identifiers describing `data`.
    fn tile(&self, data: &[f64]) -> Vec<u64>;

    /// Number of identifiers returned by each call to `tile`.
    fn num_tiles(&self) -> usize;
}

impl<T: Tiler + ?Sized> Tiler for &T {
    fn tile(&self, data: &[f64]) -> Vec<u64> {
        (**self).tile(data)
    }

    fn num_tiles(&self) -> usize {
        (**self).num_tiles()
    }
}

impl<T: Tiler + ?Sized> Tiler for Box<T> {
    fn tile(&self, data: &[f64]) -> Vec<u64> {
        (**self).tile(data)
    }

    fn num_tiles(&self) -> usize {
        (**self).num_tiles()
    }
}

impl<T: Tiler + ?Sized> Tiler for Arc<T> {
    fn tile(&self, data: &[f64]) -> Vec<u64> {
        (**self).tile(data)
    }

    fn num_tiles(&self) -> usize {
        (**self).num_tiles()
    }
}
