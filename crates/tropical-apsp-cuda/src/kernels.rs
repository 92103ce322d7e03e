//! Launch helpers for the blocked Floyd-Warshall kernels.
//!
//! Each helper enqueues one phase of iteration `k` on the given stream and
//! returns immediately; ordering between phases is the scheduler's job.

use std::sync::Arc;

use cudarc::driver::{CudaStream, LaunchConfig, PushKernelArg};
use tropical_apsp_core::TileGeometry;

use crate::context::CudaContext;
use crate::error::{CudaError, Result};
use crate::memory::DeviceMatrix;

/// Tile edge of the device kernels; matches `B` in `blocked_fw.cu`.
pub const BLOCK_SIZE: u32 = 32;

/// Threads along x in the micro-tiled remainder kernel (two columns each).
pub const MICRO_TILE_WIDTH: u32 = BLOCK_SIZE / 2;

/// One thread per tile entry.
pub fn tile_block_dims() -> (u32, u32, u32) {
    (BLOCK_SIZE, BLOCK_SIZE, 1)
}

/// Half-width blocks for the micro-tiled kernel.
pub fn micro_tile_block_dims() -> (u32, u32, u32) {
    (MICRO_TILE_WIDTH, BLOCK_SIZE, 1)
}

fn config(grid: (u32, u32, u32), block: (u32, u32, u32)) -> LaunchConfig {
    LaunchConfig {
        grid_dim: grid,
        block_dim: block,
        shared_mem_bytes: 0,
    }
}

fn dim(value: usize, what: &'static str) -> Result<u32> {
    u32::try_from(value)
        .map_err(|_| CudaError::DimensionMismatch(format!("{what} {value} exceeds grid limits")))
}

fn launch(
    ctx: &CudaContext,
    stream: &Arc<CudaStream>,
    kernel: &'static str,
    dist: &mut DeviceMatrix,
    k: usize,
    cfg: LaunchConfig,
) -> Result<()> {
    let func = ctx.get_kernel(kernel)?;
    let v = i32::try_from(dist.vertex_count()).map_err(|_| {
        CudaError::DimensionMismatch(format!(
            "{} vertices exceed the device index range",
            dist.vertex_count()
        ))
    })?;
    let k = k as i32;

    let mut builder = stream.launch_builder(func);
    builder.arg(dist.as_slice_mut()).arg(&v).arg(&k);
    unsafe { builder.launch(cfg) }.map_err(CudaError::driver(kernel))?;
    Ok(())
}

/// Phase 1: the pivot tile `(k, k)`.
pub fn launch_pivot(
    ctx: &CudaContext,
    stream: &Arc<CudaStream>,
    dist: &mut DeviceMatrix,
    geometry: &TileGeometry,
    k: usize,
) -> Result<()> {
    let kernel = if geometry.is_full(k) {
        "apsp_pivot_full"
    } else {
        "apsp_pivot"
    };
    launch(ctx, stream, kernel, dist, k, config((1, 1, 1), tile_block_dims()))
}

/// Phase 2: row tiles `(k, j)`. The block at `j == k` exits immediately.
pub fn launch_row(
    ctx: &CudaContext,
    stream: &Arc<CudaStream>,
    dist: &mut DeviceMatrix,
    geometry: &TileGeometry,
    k: usize,
) -> Result<()> {
    let kernel = if geometry.is_full(k) {
        "apsp_row_full"
    } else {
        "apsp_row"
    };
    let grid = (dim(geometry.block_count(), "block count")?, 1, 1);
    launch(ctx, stream, kernel, dist, k, config(grid, tile_block_dims()))
}

/// Phase 2: column tiles `(i, k)`. The block at `i == k` exits immediately.
pub fn launch_col(
    ctx: &CudaContext,
    stream: &Arc<CudaStream>,
    dist: &mut DeviceMatrix,
    geometry: &TileGeometry,
    k: usize,
) -> Result<()> {
    let kernel = if geometry.is_full(k) {
        "apsp_col_full"
    } else {
        "apsp_col"
    };
    let grid = (dim(geometry.block_count(), "block count")?, 1, 1);
    launch(ctx, stream, kernel, dist, k, config(grid, tile_block_dims()))
}

/// Phase 3: every remainder tile, split between the micro-tiled interior
/// launch and the general boundary launch so no tile is computed twice.
///
/// Returns the number of kernels enqueued.
pub fn launch_remainder(
    ctx: &CudaContext,
    stream: &Arc<CudaStream>,
    dist: &mut DeviceMatrix,
    geometry: &TileGeometry,
    k: usize,
) -> Result<usize> {
    let blocks = geometry.block_count();
    if blocks < 2 {
        return Ok(0);
    }

    let full = geometry.full_blocks();
    let pivot_full = geometry.is_full(k);
    let mut launched = 0;

    if pivot_full && full >= 2 {
        let side = dim(full - 1, "interior tiles")?;
        let cfg = config((side, side, 1), micro_tile_block_dims());
        launch(ctx, stream, "apsp_remainder_full_microtiled", dist, k, cfg)?;
        launched += 1;
    }

    if geometry.remainder() > 0 || !pivot_full {
        let side = dim(blocks - 1, "remainder tiles")?;
        let cfg = config((side, side, 1), tile_block_dims());
        launch(ctx, stream, "apsp_remainder", dist, k, cfg)?;
        launched += 1;
    }

    Ok(launched)
}
