//! Four-stream phase graph for the blocked algorithm.
//!
//! ```text
//! pivot stream      waits remainder_done(k-1), runs pivot(k),     records pivot_done
//! row stream        waits pivot_done,          runs row(k),       records row_done
//! col stream        waits pivot_done,          runs col(k),       records col_done
//! remainder stream  waits row_done, col_done,  runs remainder(k), records remainder_done
//! ```
//!
//! The host only enqueues; it blocks once, on the last `remainder_done`.

use std::sync::Arc;
use std::time::{Duration, Instant};

use cudarc::driver::{CudaEvent, CudaStream};
use tracing::{debug, info};
use tropical_apsp_core::{TileGeometry, TILE_SIZE};

use crate::context::CudaContext;
use crate::error::{CudaError, Result};
use crate::kernels::{launch_col, launch_pivot, launch_remainder, launch_row};
use crate::memory::DeviceMatrix;

/// Outcome of one device solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GpuRun {
    /// Outer iterations executed (nB).
    pub iterations: usize,
    /// Host wall time from the first launch to the final event.
    pub elapsed: Duration,
}

/// Streams for the four phase kinds of one solve.
pub struct StreamScheduler<'a> {
    ctx: &'a CudaContext,
    pivot: Arc<CudaStream>,
    row: Arc<CudaStream>,
    col: Arc<CudaStream>,
    remainder: Arc<CudaStream>,
}

fn record(stream: &CudaStream, op: &'static str) -> Result<CudaEvent> {
    stream.record_event(None).map_err(CudaError::driver(op))
}

fn wait(stream: &CudaStream, event: &CudaEvent, op: &'static str) -> Result<()> {
    stream.wait(event).map_err(CudaError::driver(op))
}

impl<'a> StreamScheduler<'a> {
    pub fn new(ctx: &'a CudaContext) -> Result<Self> {
        Ok(Self {
            ctx,
            pivot: ctx.new_stream()?,
            row: ctx.new_stream()?,
            col: ctx.new_stream()?,
            remainder: ctx.new_stream()?,
        })
    }

    /// Stream that uploads run on, ahead of the first pivot.
    pub fn upload_stream(&self) -> &Arc<CudaStream> {
        &self.pivot
    }

    /// Stream that downloads run on, behind the last remainder phase.
    pub fn download_stream(&self) -> &Arc<CudaStream> {
        &self.remainder
    }

    /// Enqueue every iteration and wait for the last one to finish.
    pub fn run(&self, dist: &mut DeviceMatrix) -> Result<GpuRun> {
        let geometry = TileGeometry::new(dist.vertex_count(), TILE_SIZE);
        let iterations = geometry.block_count();
        let start = Instant::now();

        let mut remainder_done: Option<CudaEvent> = None;
        for k in 0..iterations {
            if let Some(prev) = &remainder_done {
                wait(&self.pivot, prev, "pivot wait on remainder")?;
            }
            launch_pivot(self.ctx, &self.pivot, dist, &geometry, k)?;
            let pivot_done = record(&self.pivot, "record pivot done")?;

            wait(&self.row, &pivot_done, "row wait on pivot")?;
            wait(&self.col, &pivot_done, "col wait on pivot")?;
            launch_row(self.ctx, &self.row, dist, &geometry, k)?;
            launch_col(self.ctx, &self.col, dist, &geometry, k)?;
            let row_done = record(&self.row, "record row done")?;
            let col_done = record(&self.col, "record col done")?;

            wait(&self.remainder, &row_done, "remainder wait on row")?;
            wait(&self.remainder, &col_done, "remainder wait on col")?;
            let launched = launch_remainder(self.ctx, &self.remainder, dist, &geometry, k)?;
            remainder_done = Some(record(&self.remainder, "record remainder done")?);

            debug!(k, full = geometry.is_full(k), remainder_launches = launched, "iteration enqueued");
        }

        if let Some(last) = remainder_done {
            last.synchronize()
                .map_err(CudaError::driver("final synchronize"))?;
        }

        let elapsed = start.elapsed();
        info!(
            vertices = dist.vertex_count(),
            iterations,
            elapsed_ms = elapsed.as_secs_f64() * 1e3,
            "GPU APSP finished"
        );
        Ok(GpuRun {
            iterations,
            elapsed,
        })
    }
}
