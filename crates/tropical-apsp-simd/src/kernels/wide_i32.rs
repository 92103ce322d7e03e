use tropical_apsp_core::{MicroTiledKernel, RemainderKernel, Tile};
use tropical_apsp_types::Distance;
use wide::i32x8;

const LANES: usize = 8;

/// Vectorized remainder kernel for `i32` distances.
///
/// Processes eight destination columns per step with `i32x8` lanes. Saturation
/// is `min(a + b, UNREACHABLE)`, which matches [`Distance::combine`] for
/// operands in `[0, UNREACHABLE]`: the sum stays below `i32::MAX`.
/// Tile widths that are not a multiple of eight fall back to the portable
/// micro-tiled kernel.
#[derive(Default, Clone, Copy, Debug)]
pub struct WideRemainderKernel;

#[inline(always)]
fn load(cells: &[i32]) -> i32x8 {
    let mut lanes = [0i32; LANES];
    lanes.copy_from_slice(&cells[..LANES]);
    i32x8::from(lanes)
}

impl<const B: usize> RemainderKernel<i32, B> for WideRemainderKernel {
    fn execute(&self, row_src: &Tile<i32, B>, col_src: &Tile<i32, B>, tile: &mut Tile<i32, B>) {
        if B % LANES != 0 {
            MicroTiledKernel.execute(row_src, col_src, tile);
            return;
        }

        let cap = i32x8::splat(i32::UNREACHABLE);
        for r in 0..B {
            let left = row_src.row(r);
            let dst = tile.row_mut(r);
            for c0 in (0..B).step_by(LANES) {
                let mut acc = load(&dst[c0..]);
                for kk in 0..B {
                    let a = i32x8::splat(left[kk]);
                    let b = load(&col_src.row(kk)[c0..]);
                    acc = acc.min((a + b).min(cap));
                }
                let out: [i32; LANES] = acc.into();
                dst[c0..c0 + LANES].copy_from_slice(&out);
            }
        }
    }
}
