use crate::detect::simd_level;
use crate::kernels::{PortableKernel, WideRemainderKernel};
use tropical_apsp_core::{blocked_floyd_warshall, DistanceMatrix, RemainderKernel, Tile};
use tropical_apsp_types::Distance;

/// Distance types that can select a remainder kernel for the current CPU.
pub trait KernelDispatch: Distance {
    /// Run the best available full-tile remainder kernel.
    fn dispatch_remainder<const B: usize>(
        row_src: &Tile<Self, B>,
        col_src: &Tile<Self, B>,
        tile: &mut Tile<Self, B>,
    );
}

impl KernelDispatch for i32 {
    #[inline]
    fn dispatch_remainder<const B: usize>(
        row_src: &Tile<i32, B>,
        col_src: &Tile<i32, B>,
        tile: &mut Tile<i32, B>,
    ) {
        if simd_level().is_vectorized() {
            WideRemainderKernel.execute(row_src, col_src, tile);
        } else {
            PortableKernel.execute(row_src, col_src, tile);
        }
    }
}

macro_rules! impl_portable_dispatch {
    ($($t:ty),*) => {
        $(
            impl KernelDispatch for $t {
                #[inline]
                fn dispatch_remainder<const B: usize>(
                    row_src: &Tile<$t, B>,
                    col_src: &Tile<$t, B>,
                    tile: &mut Tile<$t, B>,
                ) {
                    PortableKernel.execute(row_src, col_src, tile);
                }
            }
        )*
    };
}

impl_portable_dispatch!(u32, i64, u64);

/// Remainder kernel that defers to [`KernelDispatch`] for its distance type.
#[derive(Default, Clone, Copy, Debug)]
pub struct DispatchKernel;

impl<D: KernelDispatch, const B: usize> RemainderKernel<D, B> for DispatchKernel {
    #[inline]
    fn execute(&self, row_src: &Tile<D, B>, col_src: &Tile<D, B>, tile: &mut Tile<D, B>) {
        D::dispatch_remainder(row_src, col_src, tile);
    }
}

/// Single-threaded blocked Floyd-Warshall with the runtime-selected kernel.
///
/// Matrix entries must be non-negative.
pub fn blocked_floyd_warshall_dispatch<D: KernelDispatch, const B: usize>(
    matrix: &mut DistanceMatrix<D>,
) {
    blocked_floyd_warshall::<D, DispatchKernel, B>(matrix, &DispatchKernel);
}
