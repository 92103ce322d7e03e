//! Distance types for tropical all-pairs shortest paths.
//!
//! Shortest paths live in the min-plus (tropical) semiring: path
//! concatenation is `+` and choosing between paths is `min`. This crate
//! fixes the integer domains used by the solvers and gives them saturating
//! semantics, so that "unreachable" is a finite sentinel that no amount of
//! arithmetic can escape.
//!
//! | Type | UNREACHABLE | Notes |
//! |------|-------------|-------|
//! | `i32` | 2^30 - 1 | GPU-compatible, default domain |
//! | `u32` | 2^30 - 1 | |
//! | `i64` | 2^62 - 1 | |
//! | `u64` | 2^62 - 1 | |
//!
//! # Example
//!
//! ```
//! use tropical_apsp_types::Distance;
//!
//! // Path 3 then path 5
//! assert_eq!(3i32.combine(5), 8);
//!
//! // Unreachable absorbs everything
//! assert_eq!(i32::UNREACHABLE.combine(1), i32::UNREACHABLE);
//!
//! // Overflow saturates instead of wrapping
//! assert_eq!(i32::MAX_FINITE.combine(i32::MAX_FINITE), i32::UNREACHABLE);
//!
//! // Pick the shorter candidate
//! assert_eq!(8i32.better(i32::UNREACHABLE), 8);
//! ```

mod distance;

pub use distance::{Distance, OUTPUT_UNREACHABLE};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use super::{Distance, OUTPUT_UNREACHABLE};
}
