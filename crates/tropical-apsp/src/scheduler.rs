//! Phase scheduler for the blocked algorithm on the CPU.
//!
//! Four lanes run on their own threads, one per phase kind:
//!
//! ```text
//! pivot(k)      waits remainder_done(k-1)
//! row(k)        waits pivot_done(k)
//! col(k)        waits pivot_done(k)
//! remainder(k)  waits row_done(k) and col_done(k)
//! ```
//!
//! Lanes hand off through [`CompletionEvent`](crate::event::CompletionEvent)s
//! rather than a global barrier. Row and column lanes of the same iteration
//! run concurrently. Inside a lane, independent tiles are spread over a rayon
//! pool.

use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::prelude::*;
use tracing::{debug, info};
use tropical_apsp_core::{
    update_column_tile, update_pivot_tile, update_remainder_tile, update_remainder_tile_full,
    update_row_tile, DistanceMatrix, SharedMatrix, TileGeometry, TILE_SIZE,
};
use tropical_apsp_simd::{DispatchKernel, KernelDispatch};

use crate::error::{ApspError, Result};
use crate::event::{Aborted, PhaseEvents};

/// Outcome of one tiled solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TiledRun {
    /// Outer iterations executed (nB).
    pub iterations: usize,
    /// Wall time of the phase graph.
    pub elapsed: Duration,
}

/// Blocked Floyd-Warshall engine with `B`×`B` tiles.
///
/// ```
/// use tropical_apsp::{DistanceMatrix, TiledEngine};
///
/// let mut m = DistanceMatrix::<i32>::new(3);
/// m.add_edge(0, 1, 5);
/// m.add_edge(1, 2, 3);
/// m.add_edge(0, 2, 100);
///
/// TiledEngine::new().solve(&mut m);
/// assert_eq!(m.row(0), &[0, 5, 8]);
/// ```
#[derive(Debug, Clone)]
pub struct TiledEngine<const B: usize = TILE_SIZE> {
    pool: Option<Arc<rayon::ThreadPool>>,
}

impl TiledEngine {
    /// Engine with the default tile size, running on the global rayon pool.
    pub fn new() -> Self {
        Self { pool: None }
    }
}

impl<const B: usize> Default for TiledEngine<B> {
    fn default() -> Self {
        Self { pool: None }
    }
}

impl<const B: usize> TiledEngine<B> {
    /// Run tile work on a dedicated pool with `threads` workers.
    pub fn threads(self, threads: usize) -> Result<Self> {
        if threads == 0 {
            return Err(ApspError::InvalidConfig("thread count must be non-zero"));
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("apsp-worker-{i}"))
            .build()?;
        Ok(self.pool(Arc::new(pool)))
    }

    /// Run tile work on an existing pool.
    pub fn pool(mut self, pool: Arc<rayon::ThreadPool>) -> Self {
        self.pool = Some(pool);
        self
    }

    pub fn tile_size(&self) -> usize {
        B
    }

    /// Solve in place.
    ///
    /// Entries must be non-negative.
    pub fn solve<D: KernelDispatch>(&self, matrix: &mut DistanceMatrix<D>) -> TiledRun {
        self.solve_observed(matrix, |_, _| {})
    }

    /// Solve in place, calling `observer(k, dist)` after the remainder phase
    /// of every iteration `k`. No tile is being written while the observer
    /// runs.
    pub fn solve_observed<D, F>(&self, matrix: &mut DistanceMatrix<D>, observer: F) -> TiledRun
    where
        D: KernelDispatch,
        F: FnMut(usize, &[D]),
    {
        let geometry = TileGeometry::new(matrix.vertex_count(), B);
        let iterations = geometry.block_count();
        let start = Instant::now();

        if iterations > 0 {
            let shared = matrix.as_shared();
            let events = PhaseEvents::new();
            std::thread::scope(|s| {
                s.spawn(|| self.pivot_lane::<D>(shared, &geometry, &events));
                s.spawn(|| self.row_lane::<D>(shared, &geometry, &events));
                s.spawn(|| self.column_lane::<D>(shared, &geometry, &events));
                // Aborted only when another lane panicked; the scope re-raises it.
                let _ = self.remainder_lane::<D, F>(shared, &geometry, &events, observer);
            });
        }

        let elapsed = start.elapsed();
        info!(
            vertices = geometry.vertex_count,
            tile_size = B,
            iterations,
            elapsed_ms = elapsed.as_secs_f64() * 1e3,
            "tiled APSP finished"
        );
        TiledRun {
            iterations,
            elapsed,
        }
    }

    fn install<R: Send>(&self, work: impl FnOnce() -> R + Send) -> R {
        match &self.pool {
            Some(pool) => pool.install(work),
            None => work(),
        }
    }

    fn pivot_lane<D: KernelDispatch>(
        &self,
        shared: SharedMatrix<'_, D>,
        geometry: &TileGeometry,
        events: &PhaseEvents,
    ) -> std::result::Result<(), Aborted> {
        let _guard = events.abort_on_panic();
        for k in 0..geometry.block_count() {
            if k > 0 {
                events.remainder_done.wait(k - 1, events.abort_flag())?;
            }
            // SAFETY: every other lane is parked on an event until pivot_done(k).
            self.install(|| unsafe { update_pivot_tile::<D, B>(shared, geometry, k) });
            events.pivot_done.record(k);
        }
        Ok(())
    }

    fn row_lane<D: KernelDispatch>(
        &self,
        shared: SharedMatrix<'_, D>,
        geometry: &TileGeometry,
        events: &PhaseEvents,
    ) -> std::result::Result<(), Aborted> {
        let _guard = events.abort_on_panic();
        for k in 0..geometry.block_count() {
            events.pivot_done.wait(k, events.abort_flag())?;
            self.install(|| {
                (0..geometry.block_count())
                    .into_par_iter()
                    .filter(|&j| j != k)
                    // SAFETY: each task owns tile (k, j); the pivot is final and the
                    // column lane writes only tiles (i, k) with i != k.
                    .for_each(|j| unsafe { update_row_tile::<D, B>(shared, geometry, k, j) });
            });
            events.row_done.record(k);
        }
        Ok(())
    }

    fn column_lane<D: KernelDispatch>(
        &self,
        shared: SharedMatrix<'_, D>,
        geometry: &TileGeometry,
        events: &PhaseEvents,
    ) -> std::result::Result<(), Aborted> {
        let _guard = events.abort_on_panic();
        for k in 0..geometry.block_count() {
            events.pivot_done.wait(k, events.abort_flag())?;
            self.install(|| {
                (0..geometry.block_count())
                    .into_par_iter()
                    .filter(|&i| i != k)
                    // SAFETY: each task owns tile (i, k); see row_lane.
                    .for_each(|i| unsafe { update_column_tile::<D, B>(shared, geometry, k, i) });
            });
            events.col_done.record(k);
        }
        Ok(())
    }

    fn remainder_lane<D, F>(
        &self,
        shared: SharedMatrix<'_, D>,
        geometry: &TileGeometry,
        events: &PhaseEvents,
        mut observer: F,
    ) -> std::result::Result<(), Aborted>
    where
        D: KernelDispatch,
        F: FnMut(usize, &[D]),
    {
        let _guard = events.abort_on_panic();
        for k in 0..geometry.block_count() {
            events.row_done.wait(k, events.abort_flag())?;
            events.col_done.wait(k, events.abort_flag())?;

            let plan = geometry.remainder_plan(k);
            self.install(|| {
                // SAFETY: row and column tiles of k are final; every remainder
                // tile appears once across both lists.
                plan.micro_tiled.par_iter().for_each(|&at| unsafe {
                    update_remainder_tile_full::<D, DispatchKernel, B>(
                        shared,
                        &DispatchKernel,
                        k,
                        at,
                    )
                });
                plan.general
                    .par_iter()
                    .for_each(|&at| unsafe { update_remainder_tile::<D, B>(shared, geometry, k, at) });
            });

            debug!(
                k,
                pivot_len = geometry.tile_len(k),
                micro_tiled = plan.micro_tiled.len(),
                general = plan.general.len(),
                "iteration complete"
            );

            // SAFETY: the pivot lane is parked until remainder_done(k).
            observer(k, unsafe { shared.snapshot() });
            events.remainder_done.record(k);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use tropical_apsp_core::floyd_warshall_serial;
    use tropical_apsp_types::Distance;

    fn random_graph<D: Distance>(v: usize, seed: u64) -> DistanceMatrix<D> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut m = DistanceMatrix::new(v);
        for _ in 0..v * 4 {
            let (s, d) = (rng.gen_range(0..v), rng.gen_range(0..v));
            if s != d {
                m.add_edge(s, d, D::from_weight(rng.gen_range(0..1000)));
            }
        }
        m
    }

    #[test]
    fn test_small_tiles_match_oracle() {
        for v in [1, 3, 4, 9, 16, 23] {
            let input = random_graph::<i32>(v, v as u64);
            let mut expected = input.clone();
            floyd_warshall_serial(&mut expected);

            let mut actual = input;
            let run = TiledEngine::<4>::default().solve(&mut actual);
            assert_eq!(actual, expected, "V={v}");
            assert_eq!(run.iterations, v.div_ceil(4));
        }
    }

    #[test]
    fn test_default_tiles_all_domains() {
        let engine = TiledEngine::new();
        for v in [33, 70] {
            let input = random_graph::<u64>(v, 7);
            let mut expected = input.clone();
            floyd_warshall_serial(&mut expected);
            let mut actual = input;
            engine.solve(&mut actual);
            assert_eq!(actual, expected);

            let input = random_graph::<i64>(v, 8);
            let mut expected = input.clone();
            floyd_warshall_serial(&mut expected);
            let mut actual = input;
            engine.solve(&mut actual);
            assert_eq!(actual, expected);
        }
    }

    #[test]
    fn test_dedicated_pool() {
        let engine = TiledEngine::<8>::default().threads(2).unwrap();
        let input = random_graph::<u32>(40, 3);
        let mut expected = input.clone();
        floyd_warshall_serial(&mut expected);
        let mut actual = input;
        engine.solve(&mut actual);
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_zero_threads_rejected() {
        assert!(matches!(
            TiledEngine::new().threads(0),
            Err(ApspError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_observer_sees_every_iteration() {
        let mut m = random_graph::<i32>(20, 5);
        let mut seen = Vec::new();
        let run = TiledEngine::<8>::default().solve_observed(&mut m, |k, dist| {
            assert_eq!(dist.len(), 400);
            seen.push(k);
        });
        assert_eq!(seen, vec![0, 1, 2]);
        assert_eq!(run.iterations, 3);
    }

    #[test]
    fn test_empty_graph() {
        let mut m = DistanceMatrix::<i32>::new(0);
        let run = TiledEngine::new().solve(&mut m);
        assert_eq!(run.iterations, 0);
    }
}
