use std::marker::PhantomData;
use std::ops::{Index, IndexMut};

use tropical_apsp_types::Distance;

use crate::tiling::{Tile, TileIndex};

/// Dense V×V distance matrix in row-major order.
///
/// Entry `(i, j)` holds the best known path length from vertex `i` to
/// vertex `j`. A freshly initialized matrix has zeros on the diagonal and
/// [`Distance::UNREACHABLE`] everywhere else.
///
/// ```
/// use tropical_apsp_core::DistanceMatrix;
/// use tropical_apsp_types::Distance;
///
/// let mut m = DistanceMatrix::<i32>::new(3);
/// m.add_edge(0, 1, 5);
/// assert_eq!(m[(0, 1)], 5);
/// assert_eq!(m[(1, 1)], 0);
/// assert_eq!(m[(1, 0)], i32::UNREACHABLE);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistanceMatrix<D: Distance> {
    data: Vec<D>,
    n: usize,
}

impl<D: Distance> DistanceMatrix<D> {
    /// Create an edgeless graph on `n` vertices.
    pub fn new(n: usize) -> Self {
        let mut matrix = Self::unreachable(n);
        for i in 0..n {
            matrix.data[i * n + i] = D::ZERO;
        }
        matrix
    }

    /// Create a matrix with every entry (diagonal included) unreachable.
    pub fn unreachable(n: usize) -> Self {
        Self {
            data: vec![D::UNREACHABLE; n * n],
            n,
        }
    }

    /// Create a matrix from a function of `(row, col)`.
    pub fn from_fn<F>(n: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> D,
    {
        let data = (0..n * n)
            .map(|idx| f(idx / n, idx % n).clamp_to_domain())
            .collect();
        Self { data, n }
    }

    /// Wrap row-major data.
    ///
    /// Values above `UNREACHABLE` are folded onto the sentinel.
    ///
    /// # Panics
    /// If `data.len() != n * n` or any entry is negative.
    pub fn from_vec(mut data: Vec<D>, n: usize) -> Self {
        assert_eq!(
            data.len(),
            n * n,
            "data length {} != {} * {}",
            data.len(),
            n,
            n
        );
        for (idx, value) in data.iter_mut().enumerate() {
            assert!(
                !value.is_negative(),
                "negative distance {} at ({}, {})",
                value,
                idx / n,
                idx % n
            );
            *value = value.clamp_to_domain();
        }
        Self { data, n }
    }

    /// Number of vertices V.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.n
    }

    /// Whether the matrix has no vertices.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// Row-major view of all entries.
    #[inline]
    pub fn as_slice(&self) -> &[D] {
        &self.data
    }

    /// Mutable row-major view of all entries.
    ///
    /// Entries must stay in `0..=UNREACHABLE`. The solvers reject negative
    /// entries and fold larger ones onto `UNREACHABLE` before running.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [D] {
        &mut self.data
    }

    /// Fold entries above `UNREACHABLE` onto the sentinel, returning how
    /// many changed.
    pub fn clamp_to_domain(&mut self) -> usize {
        let mut folded = 0;
        for value in &mut self.data {
            if *value > D::UNREACHABLE {
                *value = D::UNREACHABLE;
                folded += 1;
            }
        }
        folded
    }

    /// Consume the matrix, returning the row-major buffer.
    pub fn into_vec(self) -> Vec<D> {
        self.data
    }

    /// Row `i` as a slice.
    #[inline]
    pub fn row(&self, i: usize) -> &[D] {
        &self.data[i * self.n..(i + 1) * self.n]
    }

    /// Iterate over rows.
    pub fn rows(&self) -> impl Iterator<Item = &[D]> {
        // chunks_exact panics on a zero chunk size
        self.data.chunks_exact(self.n.max(1))
    }

    /// Set the direct edge `src -> dst`. A later call for the same pair
    /// overwrites the earlier one.
    #[inline]
    pub fn add_edge(&mut self, src: usize, dst: usize, weight: D) {
        debug_assert!(!weight.is_negative());
        let n = self.n;
        self.data[src * n + dst] = weight.clamp_to_domain();
    }

    /// Read `(i, j)`, or `UNREACHABLE` when outside the matrix.
    #[inline(always)]
    pub fn load_or_unreachable(&self, i: usize, j: usize) -> D {
        if i < self.n && j < self.n {
            self.data[i * self.n + j]
        } else {
            D::UNREACHABLE
        }
    }

    /// Write `(i, j)`; positions outside the matrix are dropped.
    #[inline(always)]
    pub fn store_if_valid(&mut self, i: usize, j: usize, value: D) {
        if i < self.n && j < self.n {
            self.data[i * self.n + j] = value;
        }
    }

    /// Embed into a larger matrix whose extra rows and columns are
    /// entirely unreachable (diagonal included).
    pub fn padded(&self, n: usize) -> Self {
        assert!(n >= self.n, "cannot pad {} vertices down to {}", self.n, n);
        let mut out = Self::unreachable(n);
        for i in 0..self.n {
            out.data[i * n..i * n + self.n].copy_from_slice(self.row(i));
        }
        out
    }

    /// Top-left `n`×`n` block.
    pub fn truncated(&self, n: usize) -> Self {
        assert!(n <= self.n, "cannot truncate {} vertices up to {}", self.n, n);
        let mut data = Vec::with_capacity(n * n);
        for i in 0..n {
            data.extend_from_slice(&self.row(i)[..n]);
        }
        Self { data, n }
    }

    /// Shared view for tile-partitioned concurrent updates.
    pub fn as_shared(&mut self) -> SharedMatrix<'_, D> {
        SharedMatrix {
            ptr: self.data.as_mut_ptr(),
            n: self.n,
            _marker: PhantomData,
        }
    }
}

impl<D: Distance> Index<(usize, usize)> for DistanceMatrix<D> {
    type Output = D;

    #[inline]
    fn index(&self, (i, j): (usize, usize)) -> &D {
        assert!(i < self.n && j < self.n, "index ({i}, {j}) out of bounds");
        &self.data[i * self.n + j]
    }
}

impl<D: Distance> IndexMut<(usize, usize)> for DistanceMatrix<D> {
    #[inline]
    fn index_mut(&mut self, (i, j): (usize, usize)) -> &mut D {
        assert!(i < self.n && j < self.n, "index ({i}, {j}) out of bounds");
        &mut self.data[i * self.n + j]
    }
}

/// Aliasing view of a [`DistanceMatrix`] used while the phases of the
/// blocked algorithm run on several threads at once.
///
/// The view is `Copy` and `Sync`; it carries no synchronization of its own.
/// Soundness relies on the phase discipline: within a phase every tile is
/// written by at most one task, and tiles read by a phase are not written by
/// any task running concurrently with it.
pub struct SharedMatrix<'a, D> {
    ptr: *mut D,
    n: usize,
    _marker: PhantomData<&'a mut [D]>,
}

impl<D> Clone for SharedMatrix<'_, D> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<D> Copy for SharedMatrix<'_, D> {}

unsafe impl<D: Send> Send for SharedMatrix<'_, D> {}
unsafe impl<D: Send + Sync> Sync for SharedMatrix<'_, D> {}

impl<'a, D: Distance> SharedMatrix<'a, D> {
    /// Number of vertices V.
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.n
    }

    /// Read `(i, j)`, or `UNREACHABLE` when outside the matrix.
    ///
    /// # Safety
    /// No other thread may be writing `(i, j)`.
    #[inline(always)]
    pub unsafe fn load_or_unreachable(&self, i: usize, j: usize) -> D {
        if i < self.n && j < self.n {
            *self.ptr.add(i * self.n + j)
        } else {
            D::UNREACHABLE
        }
    }

    /// Write `(i, j)`; positions outside the matrix are dropped.
    ///
    /// # Safety
    /// No other thread may be reading or writing `(i, j)`.
    #[inline(always)]
    pub unsafe fn store_if_valid(&self, i: usize, j: usize, value: D) {
        if i < self.n && j < self.n {
            *self.ptr.add(i * self.n + j) = value;
        }
    }

    /// Copy tile `at` into `tile`, padding out-of-range cells with
    /// `UNREACHABLE`.
    ///
    /// # Safety
    /// No other thread may be writing any cell of tile `at`.
    pub unsafe fn load_tile<const B: usize>(&self, at: TileIndex, tile: &mut Tile<D, B>) {
        let (row0, col0) = (at.row * B, at.col * B);
        for r in 0..B {
            let dst = tile.row_mut(r);
            for (c, cell) in dst.iter_mut().enumerate() {
                *cell = self.load_or_unreachable(row0 + r, col0 + c);
            }
        }
    }

    /// Write `tile` back to tile `at`, dropping out-of-range cells.
    ///
    /// # Safety
    /// No other thread may be reading or writing any cell of tile `at`.
    pub unsafe fn store_tile<const B: usize>(&self, at: TileIndex, tile: &Tile<D, B>) {
        let (row0, col0) = (at.row * B, at.col * B);
        for r in 0..B {
            for (c, &value) in tile.row(r).iter().enumerate() {
                self.store_if_valid(row0 + r, col0 + c, value);
            }
        }
    }

    /// Row-major view of the whole matrix.
    ///
    /// # Safety
    /// No thread may write the matrix while the returned slice is alive.
    pub unsafe fn snapshot(&self) -> &[D] {
        std::slice::from_raw_parts(self.ptr, self.n * self.n)
    }
}
