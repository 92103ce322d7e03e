//! CUDA backend for blocked Floyd-Warshall.
//!
//! The same three-phase tile graph as the CPU engine, expressed as eight
//! NVRTC-compiled kernels on four streams joined by events. Distances are
//! `i32` with `UNREACHABLE = 2^30 - 1`.
//!
//! # Quick Start
//!
//! ```ignore
//! use tropical_apsp::{load_matrix, LoadOptions};
//! use tropical_apsp_cuda::all_pairs_shortest_paths_gpu;
//!
//! let mut dist = load_matrix::<i32, _>(file, &LoadOptions::default())?;
//! let run = all_pairs_shortest_paths_gpu(&mut dist)?;
//! println!("{} iterations in {:?}", run.iterations, run.elapsed);
//! ```
//!
//! # Persistent Context
//!
//! ```ignore
//! use tropical_apsp_cuda::{solve_with_context, CudaContext};
//!
//! let ctx = CudaContext::new_on_device(1)?;
//! solve_with_context(&ctx, &mut dist)?;
//! ```
//!
//! # Performance
//!
//! [`all_pairs_shortest_paths_gpu`] uses a lazily-initialized global context
//! that persists across calls, so NVRTC compilation happens once per process.

mod context;
mod error;
mod kernels;
mod memory;
mod scheduler;

use once_cell::sync::OnceCell;
use tracing::{debug, warn};
use tropical_apsp_core::DistanceMatrix;

pub use context::CudaContext;
pub use error::{CudaError, Result};
pub use kernels::{
    launch_col, launch_pivot, launch_remainder, launch_row, micro_tile_block_dims,
    tile_block_dims, BLOCK_SIZE, MICRO_TILE_WIDTH,
};
pub use memory::DeviceMatrix;
pub use scheduler::{GpuRun, StreamScheduler};

/// Global CUDA context for convenience functions.
/// Lazily initialized on first use, persists for process lifetime.
static GLOBAL_CONTEXT: OnceCell<CudaContext> = OnceCell::new();

/// Get or initialize the global CUDA context on device 0.
///
/// # Errors
///
/// Returns an error if CUDA initialization fails (no device, driver issues, etc.)
pub fn get_global_context() -> Result<&'static CudaContext> {
    GLOBAL_CONTEXT.get_or_try_init(CudaContext::new)
}

fn check_non_negative(matrix: &DistanceMatrix<i32>) -> Result<()> {
    let n = matrix.vertex_count();
    match matrix.as_slice().iter().position(|&v| v < 0) {
        Some(idx) => Err(CudaError::NegativeDistance {
            row: idx / n,
            col: idx % n,
            value: matrix.as_slice()[idx],
        }),
        None => Ok(()),
    }
}

/// Solve `matrix` in place on the device behind `ctx`.
///
/// Entries above `UNREACHABLE` are folded onto the sentinel before upload.
/// A negative entry fails the call without touching the matrix.
pub fn solve_with_context(ctx: &CudaContext, matrix: &mut DistanceMatrix<i32>) -> Result<GpuRun> {
    check_non_negative(matrix)?;
    let folded = matrix.clamp_to_domain();
    if folded > 0 {
        warn!(entries = folded, "entries above the unreachable sentinel were clamped");
    }
    if matrix.is_empty() {
        return Ok(GpuRun {
            iterations: 0,
            elapsed: std::time::Duration::ZERO,
        });
    }

    let scheduler = StreamScheduler::new(ctx)?;
    let mut device = DeviceMatrix::from_host(scheduler.upload_stream(), matrix)?;
    debug!(
        device = %ctx.device_name(),
        vertices = matrix.vertex_count(),
        "matrix uploaded"
    );

    let run = scheduler.run(&mut device)?;
    device.copy_to_host(scheduler.download_stream(), matrix)?;
    Ok(run)
}

/// One-shot APSP on the GPU using the cached global context.
///
/// # Example
///
/// ```ignore
/// use tropical_apsp_core::DistanceMatrix;
/// use tropical_apsp_cuda::all_pairs_shortest_paths_gpu;
///
/// let mut m = DistanceMatrix::<i32>::new(3);
/// m.add_edge(0, 1, 5);
/// m.add_edge(1, 2, 3);
/// m.add_edge(0, 2, 100);
///
/// all_pairs_shortest_paths_gpu(&mut m)?;
/// assert_eq!(m.row(0), &[0, 5, 8]);
/// ```
pub fn all_pairs_shortest_paths_gpu(matrix: &mut DistanceMatrix<i32>) -> Result<GpuRun> {
    let ctx = get_global_context()?;
    solve_with_context(ctx, matrix)
}
