// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Integer lattice arithmetic for offset tilings.
//!
//! With `T` tilings, every input component is scaled by `T` and floored, so one
//! quantized unit is `1/T` of a tile. Each tiling is a grid of tiles `T` units
//! wide, whose origin along dimension `i` moves by `1 + 2i` units from one
//! tiling to the next. This is the asymmetric odd-displacement CMAC lattice.

/// Quantize one input component for `num_tilings` tilings: `floor(value * T)`.
///
/// Out-of-range and NaN values follow `as` cast saturation (NaN becomes 0).
#[inline]
pub fn quantize(value: f64, num_tilings: usize) -> i64 {
    (value * num_tilings as f64).floor() as i64
}

/// Snap a quantized coordinate to the tile containing it.
///
/// Returns the greatest `c <= quantized` with `c ≡ origin (mod num_tilings)`.
/// The remainder is taken with floor semantics, so coordinates below the
/// origin (including all negative inputs) land in the same lattice as those
/// above it. Truncating `%` would shift them by one tile.
#[inline]
pub fn snap(quantized: i64, origin: i64, num_tilings: i64) -> i64 {
    quantized.wrapping_sub(quantized.wrapping_sub(origin).rem_euclid(num_tilings))
}

/// How far the origin of `dimension` moves between consecutive tilings.
#[inline]
pub fn displacement(dimension: usize) -> i64 {
    1 + 2 * dimension as i64
}
