// Copyright (C) 2025 Jeremy J. Carroll. See LICENSE for details.

//! Common test utilities shared across integration tests.

#![allow(dead_code)]

/// Number of positions at which two equal-length tile vectors differ.
pub fn count_changed<T: PartialEq>(a: &[T], b: &[T]) -> usize {
    assert_eq!(a.len(), b.len(), "tile vectors differ in length");
    a.iter().zip(b).filter(|(x, y)| x != y).count()
}

/// Check a row (or column) of a unit grid sampled at every tiling offset.
///
/// Walking one quantized step at a time should retire exactly one tile per
/// step: for each box, exactly one of its tiles is shared with the last box
/// of the row. Removing that tile from every later box must leave the last
/// box with a single tile of its own.
pub fn verify_grid_slice<T: PartialEq + Copy + std::fmt::Debug>(mut grid: Vec<Vec<T>>) {
    let last = grid.len() - 1;
    let last_tiles = grid[last].clone();

    for i in 0..last {
        let common: Vec<T> = grid[i]
            .iter()
            .copied()
            .filter(|tile| last_tiles.contains(tile))
            .collect();
        assert_eq!(
            common.len(),
            1,
            "box {} should share exactly one tile with the last box, shared {:?}",
            i,
            common
        );

        for tiles in grid.iter_mut().skip(i) {
            tiles.retain(|tile| *tile != common[0]);
        }
    }

    assert_eq!(grid[last].len(), 1, "final box should have one unique tile");
}

/// Sample a `num x num` unit grid at spacing `1/num`, returning rows (fixed x)
/// or columns (fixed y) of tiles.
pub fn unit_grid<T>(num: usize, by_rows: bool, mut tile: impl FnMut(&[f64]) -> Vec<T>) -> Vec<Vec<Vec<T>>> {
    let step = 1.0 / num as f64;
    (0..num)
        .map(|i| {
            (0..num)
                .map(|j| {
                    let (fixed, moving) = (i as f64 * step, j as f64 * step);
                    if by_rows {
                        tile(&[fixed, moving])
                    } else {
                        tile(&[moving, fixed])
                    }
                })
                .collect()
        })
        .collect()
}
