//! Per-tile tasks of the blocked algorithm and a single-threaded driver.
//!
//! Each task loads its tiles from a [`SharedMatrix`], applies one update rule
//! and stores the destination tile back. A task picks the `_full` rule when
//! the pivot block is full; that branch is taken once per tile, never per
//! cell. Concurrent schedulers call the same tasks from several threads.

use tropical_apsp_types::Distance;

use crate::kernel::{
    column_update, column_update_full, pivot_update, pivot_update_full, remainder_update,
    row_update, row_update_full, RemainderKernel,
};
use crate::matrix::{DistanceMatrix, SharedMatrix};
use crate::tiling::{Tile, TileGeometry, TileIndex};

/// Update the pivot tile `(k, k)`.
///
/// # Safety
/// No other thread may access tile `(k, k)` during the call.
pub unsafe fn update_pivot_tile<D: Distance, const B: usize>(
    matrix: SharedMatrix<'_, D>,
    geometry: &TileGeometry,
    k: usize,
) {
    debug_assert_eq!(geometry.tile_size, B);
    let at = TileIndex::new(k, k);
    let mut tile = Tile::<D, B>::unreachable();
    matrix.load_tile(at, &mut tile);
    if geometry.is_full(k) {
        pivot_update_full(&mut tile);
    } else {
        pivot_update(&mut tile, geometry.tile_len(k));
    }
    matrix.store_tile(at, &tile);
}

/// Update row tile `(k, j)` against the finalized pivot.
///
/// # Safety
/// The pivot tile of iteration `k` must be final and not written during the
/// call, and no other thread may access tile `(k, j)`.
pub unsafe fn update_row_tile<D: Distance, const B: usize>(
    matrix: SharedMatrix<'_, D>,
    geometry: &TileGeometry,
    k: usize,
    j: usize,
) {
    debug_assert_ne!(j, k);
    let mut pivot = Tile::<D, B>::unreachable();
    let mut tile = Tile::<D, B>::unreachable();
    matrix.load_tile(TileIndex::new(k, k), &mut pivot);
    matrix.load_tile(TileIndex::new(k, j), &mut tile);
    if geometry.is_full(k) {
        row_update_full(&pivot, &mut tile);
    } else {
        row_update(&pivot, &mut tile, geometry.tile_len(k));
    }
    matrix.store_tile(TileIndex::new(k, j), &tile);
}

/// Update column tile `(i, k)` against the finalized pivot.
///
/// # Safety
/// Same contract as [`update_row_tile`] for tile `(i, k)`.
pub unsafe fn update_column_tile<D: Distance, const B: usize>(
    matrix: SharedMatrix<'_, D>,
    geometry: &TileGeometry,
    k: usize,
    i: usize,
) {
    debug_assert_ne!(i, k);
    let mut pivot = Tile::<D, B>::unreachable();
    let mut tile = Tile::<D, B>::unreachable();
    matrix.load_tile(TileIndex::new(k, k), &mut pivot);
    matrix.load_tile(TileIndex::new(i, k), &mut tile);
    if geometry.is_full(k) {
        column_update_full(&pivot, &mut tile);
    } else {
        column_update(&pivot, &mut tile, geometry.tile_len(k));
    }
    matrix.store_tile(TileIndex::new(i, k), &tile);
}

/// Update a remainder tile through the general boundary-safe rule.
///
/// # Safety
/// Row and column tiles of iteration `k` must be final and not written
/// during the call, and no other thread may access tile `at`.
pub unsafe fn update_remainder_tile<D: Distance, const B: usize>(
    matrix: SharedMatrix<'_, D>,
    geometry: &TileGeometry,
    k: usize,
    at: TileIndex,
) {
    let (row_src, col_src, mut tile) = load_remainder_operands::<D, B>(matrix, k, at);
    remainder_update(&row_src, &col_src, &mut tile, geometry.tile_len(k));
    matrix.store_tile(at, &tile);
}

/// Update an interior remainder tile with a full-tile kernel.
///
/// # Safety
/// Same contract as [`update_remainder_tile`]; additionally tile `at` and
/// the pivot block `k` must lie entirely inside the matrix.
pub unsafe fn update_remainder_tile_full<D, K, const B: usize>(
    matrix: SharedMatrix<'_, D>,
    kernel: &K,
    k: usize,
    at: TileIndex,
) where
    D: Distance,
    K: RemainderKernel<D, B> + ?Sized,
{
    let (row_src, col_src, mut tile) = load_remainder_operands::<D, B>(matrix, k, at);
    kernel.execute(&row_src, &col_src, &mut tile);
    matrix.store_tile(at, &tile);
}

#[inline(always)]
unsafe fn load_remainder_operands<D: Distance, const B: usize>(
    matrix: SharedMatrix<'_, D>,
    k: usize,
    at: TileIndex,
) -> (Tile<D, B>, Tile<D, B>, Tile<D, B>) {
    debug_assert!(at.row != k && at.col != k);
    let mut row_src = Tile::unreachable();
    let mut col_src = Tile::unreachable();
    let mut tile = Tile::unreachable();
    matrix.load_tile(TileIndex::new(at.row, k), &mut row_src);
    matrix.load_tile(TileIndex::new(k, at.col), &mut col_src);
    matrix.load_tile(at, &mut tile);
    (row_src, col_src, tile)
}

/// Run the blocked algorithm on the calling thread.
///
/// Produces the same matrix as [`floyd_warshall_serial`](crate::floyd_warshall_serial).
///
/// ```
/// use tropical_apsp_core::{blocked_floyd_warshall, DistanceMatrix, MicroTiledKernel};
///
/// let mut m = DistanceMatrix::<i32>::new(3);
/// m.add_edge(0, 1, 5);
/// m.add_edge(1, 2, 3);
/// m.add_edge(0, 2, 100);
/// blocked_floyd_warshall::<_, _, 2>(&mut m, &MicroTiledKernel);
/// assert_eq!(m.row(0), &[0, 5, 8]);
/// ```
pub fn blocked_floyd_warshall<D, K, const B: usize>(matrix: &mut DistanceMatrix<D>, kernel: &K)
where
    D: Distance,
    K: RemainderKernel<D, B> + ?Sized,
{
    let geometry = TileGeometry::new(matrix.vertex_count(), B);
    let shared = matrix.as_shared();

    for k in 0..geometry.block_count() {
        // SAFETY: single thread, each task runs to completion before the next.
        unsafe {
            update_pivot_tile::<D, B>(shared, &geometry, k);
            for at in geometry.row_tiles(k) {
                update_row_tile::<D, B>(shared, &geometry, k, at.col);
            }
            for at in geometry.column_tiles(k) {
                update_column_tile::<D, B>(shared, &geometry, k, at.row);
            }
            let plan = geometry.remainder_plan(k);
            for &at in &plan.micro_tiled {
                update_remainder_tile_full::<D, K, B>(shared, kernel, k, at);
            }
            for &at in &plan.general {
                update_remainder_tile::<D, B>(shared, &geometry, k, at);
            }
        }
    }
}
