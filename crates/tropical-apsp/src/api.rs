use std::sync::Arc;
use std::time::{Duration, Instant};

use once_cell::sync::OnceCell;
use tracing::{info, warn};
use tropical_apsp_core::{floyd_warshall_serial, DistanceMatrix};
use tropical_apsp_simd::KernelDispatch;
use tropical_apsp_types::Distance;

use crate::backend::Backend;
use crate::error::{ApspError, Result};
use crate::scheduler::TiledEngine;

/// Solver settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolverConfig {
    /// Execution strategy.
    pub backend: Backend,
    /// Largest vertex count that [`Backend::Auto`] solves serially.
    pub serial_threshold: usize,
    /// Worker count for tiled solves; `None` uses the global rayon pool.
    pub threads: Option<usize>,
}

impl SolverConfig {
    pub const DEFAULT_SERIAL_THRESHOLD: usize = 64;

    pub fn validate(&self) -> Result<()> {
        if self.threads == Some(0) {
            return Err(ApspError::InvalidConfig("thread count must be non-zero"));
        }
        Ok(())
    }
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            backend: Backend::Auto,
            serial_threshold: Self::DEFAULT_SERIAL_THRESHOLD,
            threads: None,
        }
    }
}

/// What a solve did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolveReport {
    /// Backend that actually ran (never `Auto`).
    pub backend: Backend,
    /// Number of vertices V.
    pub vertex_count: usize,
    /// Outer iterations: V for serial, ceil(V / B) for tiled.
    pub iterations: usize,
    /// Wall time of the solve.
    pub elapsed: Duration,
}

/// Builder for configuring all-pairs shortest-path solves.
///
/// # Example
///
/// ```
/// use tropical_apsp::{Backend, DistanceMatrix, Solver};
///
/// let mut m = DistanceMatrix::<i32>::new(4);
/// for i in 0..4 {
///     m.add_edge(i, (i + 1) % 4, 1);
/// }
///
/// let report = Solver::new()
///     .backend(Backend::Tiled)
///     .solve_with_report(&mut m)
///     .unwrap();
///
/// assert_eq!(report.backend, Backend::Tiled);
/// assert_eq!(m[(0, 3)], 3);
/// assert_eq!(m[(3, 0)], 1);
/// ```
#[derive(Debug, Default)]
pub struct Solver {
    config: SolverConfig,
    pool: OnceCell<Arc<rayon::ThreadPool>>,
}

impl Solver {
    /// Create a solver with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: SolverConfig) -> Self {
        Self {
            config,
            pool: OnceCell::new(),
        }
    }

    /// Select the execution strategy.
    pub fn backend(mut self, backend: Backend) -> Self {
        self.config.backend = backend;
        self
    }

    /// Set the largest vertex count solved serially under `Auto`.
    pub fn serial_threshold(mut self, vertices: usize) -> Self {
        self.config.serial_threshold = vertices;
        self
    }

    /// Use a dedicated pool of `threads` workers for tiled solves.
    pub fn threads(mut self, threads: usize) -> Self {
        self.config.threads = Some(threads);
        self.pool = OnceCell::new();
        self
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Solve in place.
    pub fn solve<D: KernelDispatch>(&self, matrix: &mut DistanceMatrix<D>) -> Result<()> {
        self.solve_with_report(matrix).map(|_| ())
    }

    /// Solve in place and report which backend ran and for how long.
    ///
    /// Fails without touching the matrix if the configuration is invalid or
    /// an entry is negative. Entries above `UNREACHABLE` are folded onto the
    /// sentinel first, so every backend sees the same input.
    pub fn solve_with_report<D: KernelDispatch>(
        &self,
        matrix: &mut DistanceMatrix<D>,
    ) -> Result<SolveReport> {
        self.config.validate()?;
        check_non_negative(matrix)?;
        let folded = matrix.clamp_to_domain();
        if folded > 0 {
            warn!(entries = folded, "entries above the unreachable sentinel were clamped");
        }

        let vertex_count = matrix.vertex_count();
        let backend = self
            .config
            .backend
            .resolve(vertex_count, self.config.serial_threshold);

        let (iterations, elapsed) = if backend == Backend::Tiled {
            let run = self.engine()?.solve(matrix);
            (run.iterations, run.elapsed)
        } else {
            let start = Instant::now();
            floyd_warshall_serial(matrix);
            let elapsed = start.elapsed();
            info!(
                vertices = vertex_count,
                elapsed_ms = elapsed.as_secs_f64() * 1e3,
                "serial APSP finished"
            );
            (vertex_count, elapsed)
        };

        Ok(SolveReport {
            backend,
            vertex_count,
            iterations,
            elapsed,
        })
    }

    fn engine(&self) -> Result<TiledEngine> {
        match self.config.threads {
            None => Ok(TiledEngine::new()),
            Some(threads) => {
                let pool = self.pool.get_or_try_init(|| {
                    rayon::ThreadPoolBuilder::new()
                        .num_threads(threads)
                        .thread_name(|i| format!("apsp-worker-{i}"))
                        .build()
                        .map(Arc::new)
                })?;
                Ok(TiledEngine::new().pool(Arc::clone(pool)))
            }
        }
    }
}

fn check_non_negative<D: Distance>(matrix: &DistanceMatrix<D>) -> Result<()> {
    let n = matrix.vertex_count();
    match matrix.as_slice().iter().position(|v| v.is_negative()) {
        Some(idx) => Err(ApspError::NegativeDistance {
            row: idx / n,
            col: idx % n,
            value: matrix.as_slice()[idx].to_string(),
        }),
        None => Ok(()),
    }
}

/// Shortest distances for a row-major V×V matrix of direct edge weights.
///
/// Entries above `UNREACHABLE` are treated as unreachable.
///
/// # Example
///
/// ```
/// use tropical_apsp::{all_pairs_shortest_paths, Distance};
///
/// const U: i32 = i32::UNREACHABLE;
/// let dist = vec![
///     0, 5, 100,
///     U, 0, 3,
///     U, U, 0,
/// ];
/// let out = all_pairs_shortest_paths(&dist, 3).unwrap();
/// assert_eq!(&out[..3], &[0, 5, 8]);
/// ```
pub fn all_pairs_shortest_paths<D: KernelDispatch>(dist: &[D], n: usize) -> Result<Vec<D>> {
    if dist.len() != n * n {
        return Err(ApspError::DimensionMismatch(format!(
            "expected {} entries for {} vertices, got {}",
            n * n,
            n,
            dist.len()
        )));
    }
    if let Some(idx) = dist.iter().position(|v| v.is_negative()) {
        return Err(ApspError::NegativeDistance {
            row: idx / n,
            col: idx % n,
            value: dist[idx].to_string(),
        });
    }

    let mut matrix = DistanceMatrix::from_vec(dist.to_vec(), n);
    Solver::new().solve(&mut matrix)?;
    Ok(matrix.into_vec())
}
