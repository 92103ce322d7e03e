//! SIMD remainder kernels for tropical all-pairs shortest paths.
//!
//! The remainder phase dominates the blocked algorithm: it touches
//! (nB−1)² tiles per iteration against 2(nB−1)+1 for the other phases. This
//! crate vectorizes its full-tile path.
//!
//! # Supported Domains
//!
//! - **`i32`**: `wide::i32x8` kernel (SSE2/AVX2/NEON via `wide`)
//! - **`u32`, `i64`, `u64`**: portable micro-tiled fallback
//!
//! # Runtime Dispatch
//!
//! [`KernelDispatch`] picks the kernel for the current CPU based on the
//! cached [`simd_level`].
//!
//! # Example
//!
//! ```
//! use tropical_apsp_core::{DistanceMatrix, TILE_SIZE};
//! use tropical_apsp_simd::{blocked_floyd_warshall_dispatch, simd_level};
//!
//! println!("Detected SIMD level: {:?}", simd_level());
//!
//! let mut m = DistanceMatrix::<i32>::new(64);
//! for i in 0..63 {
//!     m.add_edge(i, i + 1, 2);
//! }
//! blocked_floyd_warshall_dispatch::<i32, TILE_SIZE>(&mut m);
//! assert_eq!(m[(0, 63)], 126);
//! ```

mod detect;
pub mod dispatch;
pub mod kernels;

pub use detect::{simd_level, SimdLevel};
pub use dispatch::{blocked_floyd_warshall_dispatch, DispatchKernel, KernelDispatch};
pub use kernels::*;
