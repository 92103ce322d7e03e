//! CUDA context and kernel management.

use std::collections::HashMap;
use std::sync::Arc;

use cudarc::driver::{CudaContext as DriverContext, CudaFunction, CudaStream};
use tracing::debug;

use crate::error::{CudaError, Result};

/// CUDA kernel source code.
const KERNEL_SOURCE: &str = include_str!("../kernels/blocked_fw.cu");

/// Kernel function names.
pub(crate) const KERNEL_NAMES: &[&str] = &[
    "apsp_pivot",
    "apsp_pivot_full",
    "apsp_row",
    "apsp_row_full",
    "apsp_col",
    "apsp_col_full",
    "apsp_remainder",
    "apsp_remainder_full_microtiled",
];

/// CUDA context for blocked APSP.
///
/// Owns the driver context and the NVRTC-compiled kernels.
pub struct CudaContext {
    driver: Arc<DriverContext>,
    kernels: HashMap<&'static str, CudaFunction>,
}

impl CudaContext {
    /// Create a new CUDA context on the default device (device 0).
    pub fn new() -> Result<Self> {
        Self::new_on_device(0)
    }

    /// Create a new CUDA context on a specific device.
    pub fn new_on_device(device_id: usize) -> Result<Self> {
        let count = DriverContext::device_count().map_err(CudaError::driver("device count"))?;
        if device_id >= usize::try_from(count).unwrap_or(0) {
            return Err(CudaError::NoDevice);
        }
        let driver = DriverContext::new(device_id).map_err(CudaError::driver("context create"))?;
        Self::from_driver(driver)
    }

    /// Create a context from an existing driver context.
    ///
    /// Turns off cudarc's per-slice event tracking on `driver`. The phase
    /// scheduler orders every access to the distance buffer with its own
    /// events, and tracking would serialize the row and column streams on
    /// the shared slice.
    pub fn from_driver(driver: Arc<DriverContext>) -> Result<Self> {
        // SAFETY: all kernels touching a `DeviceMatrix` are enqueued by
        // `StreamScheduler`, which records and waits on explicit events
        // between every dependent phase, and host copies run on the stream
        // that last wrote or will first read the buffer.
        unsafe { driver.disable_event_tracking() };

        let ptx = cudarc::nvrtc::compile_ptx(KERNEL_SOURCE)?;
        let module = driver
            .load_module(ptx)
            .map_err(CudaError::driver("module load"))?;

        let mut kernels = HashMap::new();
        for name in KERNEL_NAMES {
            let func = module
                .load_function(name)
                .map_err(|_| CudaError::KernelNotFound(name.to_string()))?;
            kernels.insert(*name, func);
        }
        debug!(device = driver.ordinal(), kernels = kernels.len(), "APSP kernels loaded");

        Ok(Self { driver, kernels })
    }

    /// Get the underlying driver context.
    pub fn driver(&self) -> &Arc<DriverContext> {
        &self.driver
    }

    /// The context's default stream, used for host transfers.
    pub fn default_stream(&self) -> Arc<CudaStream> {
        self.driver.default_stream()
    }

    /// Create a fresh non-default stream.
    pub fn new_stream(&self) -> Result<Arc<CudaStream>> {
        self.driver
            .new_stream()
            .map_err(CudaError::driver("stream create"))
    }

    /// Get a kernel function by name.
    pub fn get_kernel(&self, name: &'static str) -> Result<&CudaFunction> {
        self.kernels
            .get(name)
            .ok_or_else(|| CudaError::KernelNotFound(name.to_string()))
    }

    /// Whether cudarc adds implicit cross-stream waits on buffer access.
    pub fn tracks_events(&self) -> bool {
        self.driver.is_event_tracking()
    }

    /// Get GPU device name.
    pub fn device_name(&self) -> String {
        format!("CUDA Device {}", self.driver.ordinal())
    }
}

impl std::fmt::Debug for CudaContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CudaContext")
            .field("device", &self.driver.ordinal())
            .field("kernels", &self.kernels.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kernel_source_exports_every_kernel() {
        for name in KERNEL_NAMES {
            assert!(
                KERNEL_SOURCE.contains(&format!("void {name}(")),
                "missing kernel {name}"
            );
        }
    }

    #[test]
    fn test_device_offsets_are_64_bit() {
        // 46341 * 46341 overflows a 32-bit int.
        assert!(KERNEL_SOURCE.contains("(size_t)i * (size_t)V + (size_t)j"));
        assert!(!KERNEL_SOURCE.contains("i * V + j"));
    }
}
