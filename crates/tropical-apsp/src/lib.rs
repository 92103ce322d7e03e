//! All-pairs shortest paths with a blocked, parallel Floyd-Warshall.
//!
//! Distances live in the tropical min-plus semiring with a saturating
//! "unreachable" sentinel (see [`Distance`]). The matrix is cut into
//! 32×32 tiles and every outer iteration `k` runs three dependent phases:
//!
//! 1. the pivot tile `(k, k)`;
//! 2. row tiles `(k, j)` and column tiles `(i, k)`, concurrently;
//! 3. every remaining tile `(i, j)`.
//!
//! Phases hand off through completion events, and tiles inside a phase run
//! on a rayon pool.
//!
//! # GPU Acceleration
//!
//! The `tropical-apsp-cuda` crate runs the same phase graph on CUDA streams:
//!
//! ```ignore
//! use tropical_apsp_cuda::all_pairs_shortest_paths_gpu;
//!
//! all_pairs_shortest_paths_gpu(&mut matrix)?;
//! ```
//!
//! # Quick Start
//!
//! ```
//! use tropical_apsp::{load_matrix, write_matrix, LoadOptions, Solver};
//!
//! let input = "3 3\n0 1 5\n1 2 3\n0 2 100\n";
//! let mut dist = load_matrix::<i32, _>(input.as_bytes(), &LoadOptions::default()).unwrap();
//!
//! Solver::new().solve(&mut dist).unwrap();
//!
//! let mut out = Vec::new();
//! write_matrix(&dist, &mut out).unwrap();
//! assert_eq!(
//!     String::from_utf8(out).unwrap(),
//!     "0 5 8\n1073741823 0 3\n1073741823 1073741823 0\n"
//! );
//! ```
//!
//! # Backends
//!
//! | Backend | Algorithm |
//! |---------|-----------|
//! | [`Backend::Serial`] | triple loop, also the reference result |
//! | [`Backend::Tiled`] | blocked phases on the CPU ([`TiledEngine`]) |
//! | [`Backend::Auto`] | serial up to `serial_threshold` vertices, tiled above |
//!
//! ```
//! use tropical_apsp::Backend;
//!
//! println!("Using: {}", Backend::description());
//! ```

mod api;
mod backend;
mod error;
mod event;
mod io;
mod scheduler;

pub use api::{all_pairs_shortest_paths, SolveReport, Solver, SolverConfig};
pub use backend::{version_info, Backend};
pub use error::{ApspError, InputError, Result};
pub use io::{
    load_matrix, parse_edge_list, read_edge_list, write_matrix, Edge, EdgeList, LoadOptions,
    SelfLoopPolicy,
};
pub use scheduler::{TiledEngine, TiledRun};

pub use tropical_apsp_core::{floyd_warshall_serial, DistanceMatrix, TileGeometry, TILE_SIZE};
pub use tropical_apsp_simd::{simd_level, KernelDispatch, SimdLevel};
pub use tropical_apsp_types::{Distance, OUTPUT_UNREACHABLE};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use super::{
        all_pairs_shortest_paths, load_matrix, write_matrix, Backend, Distance, DistanceMatrix,
        LoadOptions, SelfLoopPolicy, SolveReport, Solver, SolverConfig, TiledEngine,
    };
}
