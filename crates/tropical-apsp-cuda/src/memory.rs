//! Device storage for distance matrices.

use std::sync::Arc;

use cudarc::driver::{CudaSlice, CudaStream};
use tropical_apsp_core::DistanceMatrix;

use crate::error::{CudaError, Result};

/// A row-major `i32` distance matrix in GPU memory.
pub struct DeviceMatrix {
    data: CudaSlice<i32>,
    vertex_count: usize,
}

impl DeviceMatrix {
    /// Upload `matrix` through `stream`.
    pub fn from_host(stream: &Arc<CudaStream>, matrix: &DistanceMatrix<i32>) -> Result<Self> {
        Self::from_slice(stream, matrix.as_slice(), matrix.vertex_count())
    }

    /// Upload a flat row-major buffer of `vertex_count`² entries.
    pub fn from_slice(stream: &Arc<CudaStream>, data: &[i32], vertex_count: usize) -> Result<Self> {
        if data.len() != vertex_count * vertex_count {
            return Err(CudaError::DimensionMismatch(format!(
                "expected {} entries for {} vertices, got {}",
                vertex_count * vertex_count,
                vertex_count,
                data.len()
            )));
        }
        let data = stream
            .memcpy_stod(data)
            .map_err(CudaError::driver("host to device copy"))?;
        Ok(Self { data, vertex_count })
    }

    /// Download over an existing host matrix of the same size.
    pub fn copy_to_host(
        &self,
        stream: &Arc<CudaStream>,
        matrix: &mut DistanceMatrix<i32>,
    ) -> Result<()> {
        if matrix.vertex_count() != self.vertex_count {
            return Err(CudaError::DimensionMismatch(format!(
                "device matrix has {} vertices, host matrix {}",
                self.vertex_count,
                matrix.vertex_count()
            )));
        }
        stream
            .memcpy_dtoh(&self.data, matrix.as_mut_slice())
            .map_err(CudaError::driver("device to host copy"))
    }

    pub fn vertex_count(&self) -> usize {
        self.vertex_count
    }

    pub(crate) fn as_slice_mut(&mut self) -> &mut CudaSlice<i32> {
        &mut self.data
    }
}
