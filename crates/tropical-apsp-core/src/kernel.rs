//! Tile update rules.
//!
//! Every rule relaxes a destination tile through intermediate offsets
//! `kk` of the pivot block. `len` is the valid length of the pivot block;
//! cells beyond the matrix edge hold `UNREACHABLE` and never improve, so the
//! rules run over the whole `B`×`B` tile without bounds checks. The `_full`
//! variants are the same rules with `len == B` fixed at compile time.

use tropical_apsp_types::Distance;

use crate::tiling::Tile;

/// Pivot tile `(k, k)`: `t[r][c] = min(t[r][c], t[r][kk] + t[kk][c])`.
///
/// Each `kk` step completes before the next starts.
#[inline]
pub fn pivot_update<D: Distance, const B: usize>(tile: &mut Tile<D, B>, len: usize) {
    debug_assert!(len <= B);
    for kk in 0..len {
        let through = *tile.row(kk);
        for r in 0..len {
            let left = tile.get(r, kk);
            let row = tile.row_mut(r);
            for c in 0..len {
                row[c] = row[c].better(left.combine(through[c]));
            }
        }
    }
}

#[inline]
pub fn pivot_update_full<D: Distance, const B: usize>(tile: &mut Tile<D, B>) {
    for kk in 0..B {
        let through = *tile.row(kk);
        for r in 0..B {
            let left = tile.get(r, kk);
            let row = tile.row_mut(r);
            for c in 0..B {
                row[c] = row[c].better(left.combine(through[c]));
            }
        }
    }
}

/// Row tile `(k, j)`: `t[r][c] = min(t[r][c], pivot[r][kk] + t[kk][c])`.
#[inline]
pub fn row_update<D: Distance, const B: usize>(
    pivot: &Tile<D, B>,
    tile: &mut Tile<D, B>,
    len: usize,
) {
    debug_assert!(len <= B);
    for kk in 0..len {
        let through = *tile.row(kk);
        for r in 0..len {
            let left = pivot.get(r, kk);
            let row = tile.row_mut(r);
            for c in 0..B {
                row[c] = row[c].better(left.combine(through[c]));
            }
        }
    }
}

#[inline]
pub fn row_update_full<D: Distance, const B: usize>(pivot: &Tile<D, B>, tile: &mut Tile<D, B>) {
    for kk in 0..B {
        let through = *tile.row(kk);
        for r in 0..B {
            let left = pivot.get(r, kk);
            let row = tile.row_mut(r);
            for c in 0..B {
                row[c] = row[c].better(left.combine(through[c]));
            }
        }
    }
}

/// Column tile `(i, k)`: `t[r][c] = min(t[r][c], t[r][kk] + pivot[kk][c])`.
#[inline]
pub fn column_update<D: Distance, const B: usize>(
    pivot: &Tile<D, B>,
    tile: &mut Tile<D, B>,
    len: usize,
) {
    debug_assert!(len <= B);
    for kk in 0..len {
        let through = pivot.row(kk);
        for r in 0..B {
            let left = tile.get(r, kk);
            let row = tile.row_mut(r);
            for c in 0..len {
                row[c] = row[c].better(left.combine(through[c]));
            }
        }
    }
}

#[inline]
pub fn column_update_full<D: Distance, const B: usize>(
    pivot: &Tile<D, B>,
    tile: &mut Tile<D, B>,
) {
    for kk in 0..B {
        let through = pivot.row(kk);
        for r in 0..B {
            let left = tile.get(r, kk);
            let row = tile.row_mut(r);
            for c in 0..B {
                row[c] = row[c].better(left.combine(through[c]));
            }
        }
    }
}

/// Remainder tile `(i, j)`, one destination cell per worker:
/// `t[r][c] = min(t[r][c], row_src[r][kk] + col_src[kk][c])`.
///
/// The sources are read-only, so each cell runs its whole `kk` loop
/// before a single write.
#[inline]
pub fn remainder_update<D: Distance, const B: usize>(
    row_src: &Tile<D, B>,
    col_src: &Tile<D, B>,
    tile: &mut Tile<D, B>,
    len: usize,
) {
    debug_assert!(len <= B);
    for r in 0..B {
        let left = row_src.row(r);
        for c in 0..B {
            let mut acc = tile.get(r, c);
            for kk in 0..len {
                acc = acc.better(left[kk].combine(col_src.get(kk, c)));
            }
            tile.set(r, c, acc);
        }
    }
}

/// Full-tile remainder update (`len == B`).
///
/// Implementations must give results bit-identical to [`remainder_update`].
pub trait RemainderKernel<D: Distance, const B: usize>: Sync {
    fn execute(&self, row_src: &Tile<D, B>, col_src: &Tile<D, B>, tile: &mut Tile<D, B>);
}

/// Portable micro-tiled remainder kernel: each worker owns two adjacent
/// destination columns and shares one `row_src` load between them.
#[derive(Default, Clone, Copy, Debug)]
pub struct MicroTiledKernel;

impl<D: Distance, const B: usize> RemainderKernel<D, B> for MicroTiledKernel {
    #[inline]
    fn execute(&self, row_src: &Tile<D, B>, col_src: &Tile<D, B>, tile: &mut Tile<D, B>) {
        for r in 0..B {
            let left = row_src.row(r);
            for c in (0..B).step_by(2) {
                let mut acc0 = tile.get(r, c);
                let mut acc1 = tile.get(r, c + 1);
                for kk in 0..B {
                    let a = left[kk];
                    let through = col_src.row(kk);
                    acc0 = acc0.better(a.combine(through[c]));
                    acc1 = acc1.better(a.combine(through[c + 1]));
                }
                tile.set(r, c, acc0);
                tile.set(r, c + 1, acc1);
            }
        }
    }
}
