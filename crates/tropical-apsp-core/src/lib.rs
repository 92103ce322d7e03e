//! Core blocked Floyd-Warshall algorithms.
//!
//! This crate provides the portable building blocks of the tiled
//! all-pairs shortest-path engine: the dense distance matrix, the tile
//! decomposition, the four tile update rules and the serial oracle.
//!
//! # Features
//!
//! - Boundary-safe tile loads/stores for vertex counts that are not a
//!   multiple of the tile size
//! - General and fully unrolled variants of every update rule
//! - Pluggable remainder kernel (`RemainderKernel`) for SIMD backends
//! - Per-tile tasks usable from concurrent schedulers
//!
//! # Example
//!
//! ```
//! use tropical_apsp_core::{
//!     blocked_floyd_warshall, floyd_warshall_serial, DistanceMatrix, MicroTiledKernel, TILE_SIZE,
//! };
//!
//! let mut m = DistanceMatrix::<i32>::new(40);
//! for i in 0..39 {
//!     m.add_edge(i, i + 1, 1);
//! }
//!
//! let mut reference = m.clone();
//! floyd_warshall_serial(&mut reference);
//!
//! blocked_floyd_warshall::<_, _, TILE_SIZE>(&mut m, &MicroTiledKernel);
//! assert_eq!(m, reference);
//! assert_eq!(m[(0, 39)], 39);
//! ```

mod blocked;
mod kernel;
mod matrix;
mod oracle;
mod tiling;

pub use blocked::{
    blocked_floyd_warshall, update_column_tile, update_pivot_tile, update_remainder_tile,
    update_remainder_tile_full, update_row_tile,
};
pub use kernel::{
    column_update, column_update_full, pivot_update, pivot_update_full, remainder_update,
    row_update, row_update_full, MicroTiledKernel, RemainderKernel,
};
pub use matrix::{DistanceMatrix, SharedMatrix};
pub use oracle::floyd_warshall_serial;
pub use tiling::{RemainderPlan, Tile, TileGeometry, TileIndex, TILE_SIZE};
