//! Error types for loading graphs and solving.

use thiserror::Error;

/// Malformed or unreadable edge-list input.
#[derive(Debug, Error)]
pub enum InputError {
    /// The input stream could not be read.
    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),

    /// The input ended before a required value.
    #[error("unexpected end of input, expected {expected}")]
    UnexpectedEof { expected: &'static str },

    /// A token is not a non-negative integer.
    #[error("invalid {expected}: `{token}`")]
    InvalidToken { token: String, expected: &'static str },

    /// An edge endpoint is not a vertex of the graph.
    #[error("vertex {vertex} out of range for a graph with {vertex_count} vertices")]
    VertexOutOfRange { vertex: u64, vertex_count: usize },

    /// A self-loop under [`SelfLoopPolicy::Reject`](crate::SelfLoopPolicy::Reject).
    #[error("self-loop on vertex {vertex}")]
    SelfLoop { vertex: usize },

    /// Tokens remain after the declared number of edges.
    #[error("unexpected data after {edges} edges")]
    TrailingData { edges: usize },
}

/// Errors reported by the solver API.
#[derive(Debug, Error)]
pub enum ApspError {
    /// Graph input error; the solve was not attempted.
    #[error("input error: {0}")]
    Input(#[from] InputError),

    /// A buffer does not hold V² entries.
    #[error("dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// A distance below zero was handed to the solver.
    #[error("negative distance {value} at ({row}, {col})")]
    NegativeDistance {
        row: usize,
        col: usize,
        value: String,
    },

    /// Solver configuration rejected.
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),

    /// The worker pool could not be created.
    #[error("failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Result type for solver operations.
pub type Result<T> = std::result::Result<T, ApspError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_input_error_display() {
        let err = InputError::VertexOutOfRange {
            vertex: 7,
            vertex_count: 3,
        };
        assert_eq!(
            err.to_string(),
            "vertex 7 out of range for a graph with 3 vertices"
        );

        let err = InputError::InvalidToken {
            token: "-4".into(),
            expected: "edge weight",
        };
        assert_eq!(err.to_string(), "invalid edge weight: `-4`");
    }

    #[test]
    fn test_input_error_converts() {
        let err: ApspError = InputError::SelfLoop { vertex: 2 }.into();
        assert!(matches!(err, ApspError::Input(InputError::SelfLoop { vertex: 2 })));
        assert!(err.to_string().contains("self-loop on vertex 2"));
    }
}
