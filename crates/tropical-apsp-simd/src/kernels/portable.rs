use tropical_apsp_core::{MicroTiledKernel, RemainderKernel, Tile};
use tropical_apsp_types::Distance;

/// Portable remainder kernel for domains without a vectorized path.
///
/// Delegates to the core micro-tiled kernel.
#[derive(Default, Clone, Copy, Debug)]
pub struct PortableKernel;

impl<D: Distance, const B: usize> RemainderKernel<D, B> for PortableKernel {
    #[inline]
    fn execute(&self, row_src: &Tile<D, B>, col_src: &Tile<D, B>, tile: &mut Tile<D, B>) {
        MicroTiledKernel.execute(row_src, col_src, tile);
    }
}
