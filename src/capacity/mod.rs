// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Upper bounds on the number of indices a tiling can produce.
//!
//! Use these to size the `capacity` of an
//! [`IndexingTiler`](crate::IndexingTiler) so it never overflows for inputs
//! inside a known range.

/// Maximum number of distinct tiles for inputs in `[0, ranges[i]]` per
/// dimension: `num_tilings * Π (ranges[i] + 1)`.
///
/// The `+ 1` counts the tiles that straddle the edge of the range, since
/// every tiling but the first is offset from the origin. The result
/// saturates at `usize::MAX`.
///
/// ```
/// use tile_coding::capacity::max_indices_for_ranges;
///
/// assert_eq!(max_indices_for_ranges(&[4, 4], 8), 200);
/// assert_eq!(max_indices_for_ranges(&[4, 2], 16), 240);
/// ```
pub fn max_indices_for_ranges(ranges: &[usize], num_tilings: usize) -> usize {
    ranges.iter().fold(num_tilings, |total, &range| {
        total.saturating_mul(range.saturating_add(1))
    })
}

/// [`max_indices_for_ranges`] with the same range in every dimension.
pub fn max_indices(max_range: usize, num_dims: usize, num_tilings: usize) -> usize {
    let base = max_range.saturating_add(1);
    let per_tiling = match u32::try_from(num_dims) {
        Ok(exponent) => base.saturating_pow(exponent),
        Err(_) if base == 1 => 1,
        Err(_) => usize::MAX,
    };
    num_tilings.saturating_mul(per_tiling)
}
