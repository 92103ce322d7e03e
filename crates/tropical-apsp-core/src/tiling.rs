use tropical_apsp_types::Distance;

/// Default tile edge length. Matches the CUDA kernels' shared-memory tiles.
pub const TILE_SIZE: usize = 32;

struct TileSizeCheck<const B: usize>;

impl<const B: usize> TileSizeCheck<B> {
    // Micro-tiled kernels process column pairs.
    const OK: () = assert!(B > 0 && B % 2 == 0, "tile size must be a positive even number");
}

/// Fixed-capacity `B`×`B` working copy of one tile.
///
/// Lives on the stack for the duration of one tile update.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Tile<D, const B: usize> {
    cells: [[D; B]; B],
}

impl<D: Distance, const B: usize> Tile<D, B> {
    /// Tile with every cell unreachable.
    #[inline]
    pub fn unreachable() -> Self {
        #[allow(clippy::let_unit_value)]
        let () = TileSizeCheck::<B>::OK;
        Self {
            cells: [[D::UNREACHABLE; B]; B],
        }
    }

    #[inline(always)]
    pub fn get(&self, r: usize, c: usize) -> D {
        self.cells[r][c]
    }

    #[inline(always)]
    pub fn set(&mut self, r: usize, c: usize, value: D) {
        self.cells[r][c] = value;
    }

    #[inline(always)]
    pub fn row(&self, r: usize) -> &[D; B] {
        &self.cells[r]
    }

    #[inline(always)]
    pub fn row_mut(&mut self, r: usize) -> &mut [D; B] {
        &mut self.cells[r]
    }
}

impl<D: Distance, const B: usize> std::fmt::Debug for Tile<D, B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.cells.iter()).finish()
    }
}

/// Position of a tile in block coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileIndex {
    pub row: usize,
    pub col: usize,
}

impl TileIndex {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// How a V×V matrix is cut into `tile_size`×`tile_size` tiles.
///
/// ```
/// use tropical_apsp_core::TileGeometry;
///
/// let g = TileGeometry::new(33, 32);
/// assert_eq!(g.block_count(), 2);
/// assert_eq!(g.full_blocks(), 1);
/// assert_eq!(g.tile_len(0), 32);
/// assert_eq!(g.tile_len(1), 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileGeometry {
    /// Number of vertices V.
    pub vertex_count: usize,
    /// Tile edge length B.
    pub tile_size: usize,
}

impl TileGeometry {
    pub const fn new(vertex_count: usize, tile_size: usize) -> Self {
        Self {
            vertex_count,
            tile_size,
        }
    }

    /// nB = ceil(V / B): the number of outer iterations.
    #[inline]
    pub fn block_count(&self) -> usize {
        self.vertex_count.div_ceil(self.tile_size)
    }

    /// Number of tiles along an axis that are not partial.
    #[inline]
    pub fn full_blocks(&self) -> usize {
        self.vertex_count / self.tile_size
    }

    /// Valid rows of the last block, or 0 when V is a multiple of B.
    #[inline]
    pub fn remainder(&self) -> usize {
        self.vertex_count % self.tile_size
    }

    /// Valid length of block `k`: `min(B, V - k*B)`.
    #[inline]
    pub fn tile_len(&self, k: usize) -> usize {
        debug_assert!(k < self.block_count());
        (self.vertex_count - k * self.tile_size).min(self.tile_size)
    }

    #[inline]
    pub fn is_full(&self, k: usize) -> bool {
        k < self.full_blocks()
    }

    /// Row tiles `(k, j)`, `j != k`.
    pub fn row_tiles(&self, k: usize) -> impl Iterator<Item = TileIndex> {
        (0..self.block_count())
            .filter(move |&j| j != k)
            .map(move |j| TileIndex::new(k, j))
    }

    /// Column tiles `(i, k)`, `i != k`.
    pub fn column_tiles(&self, k: usize) -> impl Iterator<Item = TileIndex> {
        (0..self.block_count())
            .filter(move |&i| i != k)
            .map(move |i| TileIndex::new(i, k))
    }

    /// Remainder tiles of iteration `k`, split between the full-tile fast
    /// path and the general boundary-safe path. Every tile `(i, j)` with
    /// `i != k` and `j != k` appears in exactly one of the two lists.
    pub fn remainder_plan(&self, k: usize) -> RemainderPlan {
        let nb = self.block_count();
        let full = self.full_blocks();
        let pivot_full = self.is_full(k);
        let mut plan = RemainderPlan::default();

        for i in (0..nb).filter(|&i| i != k) {
            for j in (0..nb).filter(|&j| j != k) {
                let at = TileIndex::new(i, j);
                if pivot_full && i < full && j < full {
                    plan.micro_tiled.push(at);
                } else {
                    plan.general.push(at);
                }
            }
        }
        plan
    }
}

/// Remainder tiles of one iteration, by update path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemainderPlan {
    /// Interior tiles with a full pivot.
    pub micro_tiled: Vec<TileIndex>,
    /// Tiles touching a boundary row/column, or all tiles under a partial pivot.
    pub general: Vec<TileIndex>,
}

impl RemainderPlan {
    pub fn len(&self) -> usize {
        self.micro_tiled.len() + self.general.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_geometry_counts() {
        let exact = TileGeometry::new(64, 32);
        assert_eq!(exact.block_count(), 2);
        assert_eq!(exact.full_blocks(), 2);
        assert_eq!(exact.remainder(), 0);

        let partial = TileGeometry::new(65, 32);
        assert_eq!(partial.block_count(), 3);
        assert_eq!(partial.full_blocks(), 2);
        assert_eq!(partial.remainder(), 1);
        assert_eq!(partial.tile_len(2), 1);
        assert!(!partial.is_full(2));

        let tiny = TileGeometry::new(1, 32);
        assert_eq!(tiny.block_count(), 1);
        assert_eq!(tiny.full_blocks(), 0);
        assert_eq!(tiny.tile_len(0), 1);
    }

    #[test]
    fn test_edge_tiles_skip_pivot() {
        let g = TileGeometry::new(100, 32);
        let rows: Vec<_> = g.row_tiles(1).collect();
        assert_eq!(
            rows,
            vec![TileIndex::new(1, 0), TileIndex::new(1, 2), TileIndex::new(1, 3)]
        );
        assert!(g.column_tiles(3).all(|t| t.col == 3 && t.row != 3));
        assert_eq!(g.column_tiles(3).count(), 3);
    }

    #[test]
    fn test_remainder_plan_partitions_tiles() {
        for v in [1, 31, 32, 33, 63, 64, 65, 200] {
            let g = TileGeometry::new(v, 32);
            let nb = g.block_count();
            for k in 0..nb {
                let plan = g.remainder_plan(k);
                let micro: HashSet<_> = plan.micro_tiled.iter().copied().collect();
                let general: HashSet<_> = plan.general.iter().copied().collect();

                assert!(micro.is_disjoint(&general), "V={v} k={k}");
                assert_eq!(micro.len() + general.len(), plan.len());
                assert_eq!(plan.len(), (nb - 1) * (nb - 1), "V={v} k={k}");
                assert!(micro.iter().chain(&general).all(|t| t.row != k && t.col != k));
            }
        }
    }

    #[test]
    fn test_remainder_plan_dispatch() {
        // 65 vertices: blocks 0, 1 full, block 2 holds one vertex
        let g = TileGeometry::new(65, 32);

        let plan = g.remainder_plan(0);
        assert_eq!(plan.micro_tiled, vec![TileIndex::new(1, 1)]);
        assert_eq!(
            plan.general,
            vec![TileIndex::new(1, 2), TileIndex::new(2, 1), TileIndex::new(2, 2)]
        );

        // Partial pivot sends everything down the general path
        let plan = g.remainder_plan(2);
        assert!(plan.micro_tiled.is_empty());
        assert_eq!(plan.general.len(), 4);
    }

    #[test]
    fn test_tile_accessors() {
        let mut tile = Tile::<i32, 4>::unreachable();
        assert_eq!(tile.get(3, 3), i32::UNREACHABLE);
        tile.set(1, 2, 7);
        assert_eq!(tile.row(1)[2], 7);
        tile.row_mut(0)[0] = 0;
        assert_eq!(tile.get(0, 0), 0);
    }
}
