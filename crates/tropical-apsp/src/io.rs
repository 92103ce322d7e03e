//! Edge-list loader and distance-matrix writer.
//!
//! Input is whitespace-separated text: the vertex count `V`, the edge count
//! `E`, then `E` triples `src dst weight`, all non-negative integers.
//!
//! ```text
//! 3 3
//! 0 1 5
//! 1 2 3
//! 0 2 100
//! ```
//!
//! Output is `V` lines of `V` space-separated distances, with unreachable
//! pairs written as `1073741823`.

use std::io::{Read, Write};

use tracing::warn;
use tropical_apsp_core::DistanceMatrix;
use tropical_apsp_types::{Distance, OUTPUT_UNREACHABLE};

use crate::error::InputError;

/// One directed edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub src: usize,
    pub dst: usize,
    pub weight: u64,
}

/// A parsed graph, before it is turned into a distance matrix.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EdgeList {
    pub vertex_count: usize,
    pub edges: Vec<Edge>,
}

/// What to do with an edge from a vertex to itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SelfLoopPolicy {
    /// Write the weight onto the diagonal, replacing the zero.
    #[default]
    Honor,
    /// Drop the edge and keep the zero diagonal.
    Ignore,
    /// Fail with [`InputError::SelfLoop`].
    Reject,
}

/// Options for turning an edge list into a matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadOptions {
    pub self_loops: SelfLoopPolicy,
}

struct Tokens<'a> {
    inner: std::str::SplitAsciiWhitespace<'a>,
}

impl<'a> Tokens<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            inner: input.split_ascii_whitespace(),
        }
    }

    fn next_u64(&mut self, expected: &'static str) -> Result<u64, InputError> {
        let token = self
            .inner
            .next()
            .ok_or(InputError::UnexpectedEof { expected })?;
        token.parse::<u64>().map_err(|_| InputError::InvalidToken {
            token: token.to_string(),
            expected,
        })
    }

    fn next_usize(&mut self, expected: &'static str) -> Result<usize, InputError> {
        let value = self.next_u64(expected)?;
        usize::try_from(value).map_err(|_| InputError::InvalidToken {
            token: value.to_string(),
            expected,
        })
    }

    fn next_vertex_count(&mut self) -> Result<usize, InputError> {
        let vertex_count = self.next_usize("vertex count")?;
        check_vertex_count(vertex_count)?;
        Ok(vertex_count)
    }

    fn next_vertex(&mut self, vertex_count: usize) -> Result<usize, InputError> {
        let vertex = self.next_u64("vertex id")?;
        match usize::try_from(vertex) {
            Ok(v) if v < vertex_count => Ok(v),
            _ => Err(InputError::VertexOutOfRange {
                vertex,
                vertex_count,
            }),
        }
    }
}

/// The V×V matrix must be addressable for the widest distance type.
fn check_vertex_count(vertex_count: usize) -> Result<(), InputError> {
    let bytes = vertex_count
        .checked_mul(vertex_count)
        .and_then(|cells| cells.checked_mul(std::mem::size_of::<u64>()));
    match bytes {
        Some(bytes) if bytes <= isize::MAX as usize => Ok(()),
        _ => Err(InputError::InvalidToken {
            token: vertex_count.to_string(),
            expected: "vertex count",
        }),
    }
}

/// Parse the edge-list text format.
pub fn parse_edge_list(input: &str) -> Result<EdgeList, InputError> {
    let mut tokens = Tokens::new(input);
    let vertex_count = tokens.next_vertex_count()?;
    let edge_count = tokens.next_usize("edge count")?;

    // Guard the preallocation against absurd headers.
    let mut edges = Vec::with_capacity(edge_count.min(1 << 20));
    for _ in 0..edge_count {
        let src = tokens.next_vertex(vertex_count)?;
        let dst = tokens.next_vertex(vertex_count)?;
        let weight = tokens.next_u64("edge weight")?;
        edges.push(Edge { src, dst, weight });
    }

    if tokens.inner.next().is_some() {
        return Err(InputError::TrailingData { edges: edge_count });
    }

    Ok(EdgeList {
        vertex_count,
        edges,
    })
}

/// Read and parse an edge list from a stream.
pub fn read_edge_list<R: Read>(mut reader: R) -> Result<EdgeList, InputError> {
    let mut input = String::new();
    reader.read_to_string(&mut input)?;
    parse_edge_list(&input)
}

impl EdgeList {
    /// Build the initial distance matrix: zero diagonal, edge weights, and
    /// `UNREACHABLE` everywhere else. Later duplicates overwrite earlier ones.
    pub fn to_matrix<D: Distance>(
        &self,
        options: &LoadOptions,
    ) -> Result<DistanceMatrix<D>, InputError> {
        check_vertex_count(self.vertex_count)?;
        let mut matrix = DistanceMatrix::new(self.vertex_count);
        let mut clamped = 0usize;

        for edge in &self.edges {
            if edge.src == edge.dst {
                match options.self_loops {
                    SelfLoopPolicy::Honor => {
                        warn!(
                            vertex = edge.src,
                            weight = edge.weight,
                            "self-loop replaces zero diagonal"
                        );
                    }
                    SelfLoopPolicy::Ignore => continue,
                    SelfLoopPolicy::Reject => {
                        return Err(InputError::SelfLoop { vertex: edge.src });
                    }
                }
            }

            let weight = D::from_weight(edge.weight);
            if !weight.is_reachable() {
                clamped += 1;
            }
            matrix.add_edge(edge.src, edge.dst, weight);
        }

        if clamped > 0 {
            warn!(
                edges = clamped,
                limit = %D::UNREACHABLE,
                "edge weights at or above the unreachable sentinel were clamped"
            );
        }
        Ok(matrix)
    }
}

/// Read an edge list and build its distance matrix.
pub fn load_matrix<D: Distance, R: Read>(
    reader: R,
    options: &LoadOptions,
) -> Result<DistanceMatrix<D>, InputError> {
    read_edge_list(reader)?.to_matrix(options)
}

/// Write `matrix` as `V` lines of space-separated distances.
pub fn write_matrix<D: Distance, W: Write>(
    matrix: &DistanceMatrix<D>,
    mut writer: W,
) -> std::io::Result<()> {
    for row in matrix.rows() {
        for (j, &value) in row.iter().enumerate() {
            if j > 0 {
                writer.write_all(b" ")?;
            }
            if value.is_reachable() {
                write!(writer, "{value}")?;
            } else {
                write!(writer, "{OUTPUT_UNREACHABLE}")?;
            }
        }
        writer.write_all(b"\n")?;
    }
    writer.flush()
}

#[cfg(test)]
mod tests {
    use super::*;

    const U: i32 = i32::UNREACHABLE;

    fn render<D: Distance>(matrix: &DistanceMatrix<D>) -> String {
        let mut out = Vec::new();
        write_matrix(matrix, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_parse_edge_list() {
        let list = parse_edge_list("3 2\n0 1 5\n1 2 3\n").unwrap();
        assert_eq!(list.vertex_count, 3);
        assert_eq!(
            list.edges,
            vec![
                Edge { src: 0, dst: 1, weight: 5 },
                Edge { src: 1, dst: 2, weight: 3 },
            ]
        );
    }

    #[test]
    fn test_oversized_vertex_count_is_an_input_error() {
        for header in ["4294967296 0", "18446744073709551615 0"] {
            assert!(
                matches!(
                    load_matrix::<i32, _>(header.as_bytes(), &LoadOptions::default()),
                    Err(InputError::InvalidToken { expected: "vertex count", .. })
                ),
                "{header}"
            );
        }

        let list = EdgeList {
            vertex_count: usize::MAX,
            edges: Vec::new(),
        };
        assert!(matches!(
            list.to_matrix::<u64>(&LoadOptions::default()),
            Err(InputError::InvalidToken { expected: "vertex count", .. })
        ));
    }

    #[test]
    fn test_parse_is_whitespace_agnostic() {
        let list = parse_edge_list("  2\t1 0   1\n\n 7").unwrap();
        assert_eq!(list.edges, vec![Edge { src: 0, dst: 1, weight: 7 }]);
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            parse_edge_list(""),
            Err(InputError::UnexpectedEof { expected: "vertex count" })
        ));
        assert!(matches!(
            parse_edge_list("3 2\n0 1 5\n"),
            Err(InputError::UnexpectedEof { expected: "vertex id" })
        ));
        assert!(matches!(
            parse_edge_list("3 1\n0 1 -5\n"),
            Err(InputError::InvalidToken { expected: "edge weight", .. })
        ));
        assert!(matches!(
            parse_edge_list("x 1"),
            Err(InputError::InvalidToken { expected: "vertex count", .. })
        ));
        assert!(matches!(
            parse_edge_list("3 1\n0 3 1\n"),
            Err(InputError::VertexOutOfRange { vertex: 3, vertex_count: 3 })
        ));
        assert!(matches!(
            parse_edge_list("3 1\n0 1 1\n2"),
            Err(InputError::TrailingData { edges: 1 })
        ));
    }

    #[test]
    fn test_duplicate_edges_last_write_wins() {
        let list = parse_edge_list("2 2\n0 1 9\n0 1 4\n").unwrap();
        let m = list.to_matrix::<i32>(&LoadOptions::default()).unwrap();
        assert_eq!(m[(0, 1)], 4);
    }

    #[test]
    fn test_self_loop_policies() {
        let list = parse_edge_list("2 1\n1 1 6\n").unwrap();

        let honor = list.to_matrix::<i32>(&LoadOptions::default()).unwrap();
        assert_eq!(honor[(1, 1)], 6);

        let ignore = list
            .to_matrix::<i32>(&LoadOptions {
                self_loops: SelfLoopPolicy::Ignore,
            })
            .unwrap();
        assert_eq!(ignore[(1, 1)], 0);

        let reject = list.to_matrix::<i32>(&LoadOptions {
            self_loops: SelfLoopPolicy::Reject,
        });
        assert!(matches!(reject, Err(InputError::SelfLoop { vertex: 1 })));
    }

    #[test]
    fn test_oversized_weight_clamped() {
        let list = parse_edge_list("2 1\n0 1 99999999999\n").unwrap();
        let m = list.to_matrix::<i32>(&LoadOptions::default()).unwrap();
        assert_eq!(m[(0, 1)], U);

        let wide = list.to_matrix::<i64>(&LoadOptions::default()).unwrap();
        assert_eq!(wide[(0, 1)], 99_999_999_999);
    }

    #[test]
    fn test_write_matrix_format() {
        let m = DistanceMatrix::<i32>::new(2);
        assert_eq!(render(&m), "0 1073741823\n1073741823 0\n");
    }

    #[test]
    fn test_write_matrix_renders_wide_sentinel() {
        let m = DistanceMatrix::<u64>::new(2);
        assert_eq!(render(&m), "0 1073741823\n1073741823 0\n");
    }

    #[test]
    fn test_load_matrix_from_reader() {
        let input = b"3 3\n0 1 5\n1 2 3\n0 2 100\n";
        let m = load_matrix::<u32, _>(&input[..], &LoadOptions::default()).unwrap();
        assert_eq!(m.row(0), &[0, 5, 100]);
    }

    #[test]
    fn test_empty_graph() {
        let m = load_matrix::<i32, _>(&b"0 0"[..], &LoadOptions::default()).unwrap();
        assert!(m.is_empty());
        assert_eq!(render(&m), "");
    }
}
