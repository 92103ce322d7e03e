//! Error types for CUDA operations.

use cudarc::driver::DriverError;
use cudarc::nvrtc::CompileError;
use thiserror::Error;

/// Errors that can occur during CUDA operations.
#[derive(Debug, Error)]
pub enum CudaError {
    /// CUDA driver error, tagged with the operation that raised it.
    #[error("CUDA driver error during {op}: {source}")]
    Driver {
        op: &'static str,
        #[source]
        source: DriverError,
    },

    /// CUDA kernel compilation error.
    #[error("CUDA compilation error: {0}")]
    Compile(#[from] CompileError),

    /// No CUDA device available.
    #[error("No CUDA device available")]
    NoDevice,

    /// Kernel not found.
    #[error("Kernel not found: {0}")]
    KernelNotFound(String),

    /// Dimension mismatch.
    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// The device kernels assume non-negative weights.
    #[error("negative distance {value} at ({row}, {col})")]
    NegativeDistance { row: usize, col: usize, value: i32 },
}

impl CudaError {
    /// Adapter for `map_err` that records the failing operation.
    pub(crate) fn driver(op: &'static str) -> impl FnOnce(DriverError) -> CudaError {
        move |source| CudaError::Driver { op, source }
    }

    /// Name of the driver operation that failed, if any.
    pub fn operation(&self) -> Option<&'static str> {
        match self {
            CudaError::Driver { op, .. } => Some(op),
            _ => None,
        }
    }
}

/// Result type for CUDA operations.
pub type Result<T> = std::result::Result<T, CudaError>;
