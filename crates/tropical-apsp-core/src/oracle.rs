use tropical_apsp_types::Distance;

use crate::matrix::DistanceMatrix;

/// Triple-loop Floyd-Warshall.
///
/// Reference for the tiled engines and the execution path for small graphs.
///
/// ```
/// use tropical_apsp_core::{floyd_warshall_serial, DistanceMatrix};
///
/// let mut m = DistanceMatrix::<i32>::new(4);
/// for i in 0..4 {
///     m.add_edge(i, (i + 1) % 4, 1);
/// }
/// floyd_warshall_serial(&mut m);
/// assert_eq!(m[(0, 3)], 3);
/// assert_eq!(m[(3, 0)], 1);
/// assert_eq!(m[(0, 0)], 0);
/// ```
pub fn floyd_warshall_serial<D: Distance>(matrix: &mut DistanceMatrix<D>) {
    let n = matrix.vertex_count();
    let dist = matrix.as_mut_slice();

    for k in 0..n {
        for i in 0..n {
            let via_ik = dist[i * n + k];
            if !via_ik.is_reachable() {
                continue;
            }
            for j in 0..n {
                let via_kj = dist[k * n + j];
                if via_kj.is_reachable() {
                    let cell = &mut dist[i * n + j];
                    *cell = cell.better(via_ik.combine(via_kj));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const U: i32 = i32::UNREACHABLE;

    #[test]
    fn test_shortcut_beats_direct_edge() {
        let mut m = DistanceMatrix::<i32>::new(3);
        m.add_edge(0, 1, 5);
        m.add_edge(1, 2, 3);
        m.add_edge(0, 2, 100);
        floyd_warshall_serial(&mut m);
        assert_eq!(m.row(0), &[0, 5, 8]);
        assert_eq!(m.row(2), &[U, U, 0]);
    }

    #[test]
    fn test_no_edges() {
        let mut m = DistanceMatrix::<i32>::new(2);
        floyd_warshall_serial(&mut m);
        assert_eq!(m.as_slice(), &[0, U, U, 0]);
    }

    #[test]
    fn test_overflow_saturates() {
        let mut m = DistanceMatrix::<i32>::new(3);
        m.add_edge(0, 1, i32::MAX_FINITE);
        m.add_edge(1, 2, i32::MAX_FINITE);
        floyd_warshall_serial(&mut m);
        assert_eq!(m[(0, 2)], U);
        assert_eq!(m[(0, 1)], i32::MAX_FINITE);
    }

    #[test]
    fn test_honored_self_loop_can_shrink_through_cycle() {
        let mut m = DistanceMatrix::<u64>::new(2);
        m.add_edge(0, 0, 50);
        m.add_edge(0, 1, 2);
        m.add_edge(1, 0, 3);
        floyd_warshall_serial(&mut m);
        assert_eq!(m[(0, 0)], 5);
        assert_eq!(m[(1, 1)], 0);
    }

    #[test]
    fn test_single_vertex() {
        let mut m = DistanceMatrix::<i64>::new(1);
        floyd_warshall_serial(&mut m);
        assert_eq!(m.as_slice(), &[0]);
    }
}
