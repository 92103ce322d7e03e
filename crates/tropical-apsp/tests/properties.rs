use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tropical_apsp::prelude::*;
use tropical_apsp::{
    floyd_warshall_serial, parse_edge_list, Edge, EdgeList, KernelDispatch, OUTPUT_UNREACHABLE,
    TILE_SIZE,
};

const SIZES: [usize; 9] = [1, 2, 31, 32, 33, 63, 64, 65, 200];

fn random_edges(v: usize, density: f64, max_weight: u64, seed: u64) -> EdgeList {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut edges = Vec::new();
    for src in 0..v {
        for dst in 0..v {
            if src != dst && rng.gen_bool(density) {
                edges.push(Edge {
                    src,
                    dst,
                    weight: rng.gen_range(0..=max_weight),
                });
            }
        }
    }
    EdgeList {
        vertex_count: v,
        edges,
    }
}

fn oracle<D: Distance>(input: &DistanceMatrix<D>) -> DistanceMatrix<D> {
    let mut out = input.clone();
    floyd_warshall_serial(&mut out);
    out
}

fn tiled<D: KernelDispatch>(input: &DistanceMatrix<D>) -> DistanceMatrix<D> {
    let mut out = input.clone();
    TiledEngine::new().solve(&mut out);
    out
}

fn reachable_from(list: &EdgeList, source: usize) -> Vec<bool> {
    let mut adjacency = vec![Vec::new(); list.vertex_count];
    for edge in &list.edges {
        adjacency[edge.src].push(edge.dst);
    }
    let mut seen = vec![false; list.vertex_count];
    let mut queue = VecDeque::from([source]);
    seen[source] = true;
    while let Some(v) = queue.pop_front() {
        for &w in &adjacency[v] {
            if !seen[w] {
                seen[w] = true;
                queue.push_back(w);
            }
        }
    }
    seen
}

fn render(matrix: &DistanceMatrix<i32>) -> String {
    let mut out = Vec::new();
    write_matrix(matrix, &mut out).unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn tiled_matches_oracle() {
    for (seed, &v) in SIZES.iter().enumerate() {
        for density in [0.02, 0.2] {
            let list = random_edges(v, density, 1000, seed as u64);
            let input: DistanceMatrix<i32> = list.to_matrix(&LoadOptions::default()).unwrap();
            assert_eq!(tiled(&input), oracle(&input), "V={v} density={density}");
        }
    }
}

#[test]
fn tiled_matches_oracle_with_honored_self_loops() {
    for (seed, &v) in [31usize, 33, 64, 70].iter().enumerate() {
        let mut list = random_edges(v, 0.1, 1000, 40 + seed as u64);
        let mut rng = StdRng::seed_from_u64(seed as u64);
        for vertex in 0..v {
            if rng.gen_bool(0.25) {
                list.edges.push(Edge {
                    src: vertex,
                    dst: vertex,
                    weight: rng.gen_range(1..=50),
                });
            }
        }

        let input: DistanceMatrix<i32> = list.to_matrix(&LoadOptions::default()).unwrap();
        assert!((0..v).any(|i| input[(i, i)] > 0), "V={v}");

        let expected = oracle(&input);
        assert_eq!(tiled(&input), expected, "V={v}");
        // A shorter cycle may replace a self-loop, never the other way round.
        for i in 0..v {
            assert!(expected[(i, i)] <= input[(i, i)], "V={v} vertex {i}");
        }
    }
}

#[test]
fn tiled_matches_oracle_near_saturation() {
    for &v in &[33, 65] {
        let list = random_edges(v, 0.3, (1 << 29) + (1 << 28), 99);
        let input: DistanceMatrix<i32> = list.to_matrix(&LoadOptions::default()).unwrap();
        assert_eq!(tiled(&input), oracle(&input), "V={v}");
    }
}

#[test]
fn tiled_matches_oracle_wide_domains() {
    for &v in &[33, 64, 65] {
        let list = random_edges(v, 0.1, 1 << 40, v as u64);
        let input: DistanceMatrix<u64> = list.to_matrix(&LoadOptions::default()).unwrap();
        assert_eq!(tiled(&input), oracle(&input), "u64 V={v}");

        let input: DistanceMatrix<u32> = list.to_matrix(&LoadOptions::default()).unwrap();
        assert_eq!(tiled(&input), oracle(&input), "u32 V={v}");
    }
}

#[test]
fn solving_twice_changes_nothing() {
    for &v in &[2, 33, 65] {
        let list = random_edges(v, 0.1, 500, 7);
        let input: DistanceMatrix<i32> = list.to_matrix(&LoadOptions::default()).unwrap();
        let once = oracle(&input);
        assert_eq!(oracle(&once), once);
        assert_eq!(tiled(&once), once);
    }
}

#[test]
fn unreachable_means_no_path() {
    for &v in &[31, 33, 65] {
        let list = random_edges(v, 0.03, 100, 11);
        let input: DistanceMatrix<i32> = list.to_matrix(&LoadOptions::default()).unwrap();
        let dist = tiled(&input);
        for i in 0..v {
            let seen = reachable_from(&list, i);
            for (j, &reachable) in seen.iter().enumerate() {
                assert_eq!(
                    dist[(i, j)].is_reachable(),
                    reachable,
                    "V={v} ({i}, {j})"
                );
            }
        }
    }
}

#[test]
fn cells_never_increase_across_iterations() {
    let list = random_edges(100, 0.05, 1000, 13);
    let mut dist: DistanceMatrix<i32> = list.to_matrix(&LoadOptions::default()).unwrap();
    let mut previous = dist.as_slice().to_vec();
    let mut iterations = 0;

    TiledEngine::new().solve_observed(&mut dist, |k, current| {
        for (idx, (&now, &before)) in current.iter().zip(&previous).enumerate() {
            assert!(now <= before, "cell {idx} grew in iteration {k}");
        }
        previous.copy_from_slice(current);
        iterations += 1;
    });
    assert_eq!(iterations, 4);
}

#[test]
fn partial_tiles_match_padded_graph() {
    for &v in &[33, 65, 100] {
        let list = random_edges(v, 0.1, 1000, 17);
        let input: DistanceMatrix<i32> = list.to_matrix(&LoadOptions::default()).unwrap();
        let padded = input.padded(v.next_multiple_of(TILE_SIZE));

        assert_eq!(tiled(&padded).truncated(v), tiled(&input), "V={v}");
    }
}

#[test]
fn solver_backends_agree() {
    let list = random_edges(200, 0.05, 1000, 19);
    let input: DistanceMatrix<i32> = list.to_matrix(&LoadOptions::default()).unwrap();

    let mut serial = input.clone();
    let report = Solver::new()
        .backend(Backend::Serial)
        .solve_with_report(&mut serial)
        .unwrap();
    assert_eq!(report.iterations, 200);

    let mut parallel = input;
    let report = Solver::new()
        .threads(3)
        .solve_with_report(&mut parallel)
        .unwrap();
    assert_eq!(report.backend, Backend::Tiled);
    assert_eq!(report.iterations, 7);

    assert_eq!(serial, parallel);
}

#[test]
fn scenario_shortcut_through_middle_vertex() {
    let list = parse_edge_list("3 3\n0 1 5\n1 2 3\n0 2 100\n").unwrap();
    let mut dist = list.to_matrix::<i32>(&LoadOptions::default()).unwrap();
    Solver::new().backend(Backend::Tiled).solve(&mut dist).unwrap();
    assert_eq!(render(&dist).lines().next(), Some("0 5 8"));
}

#[test]
fn scenario_no_edges() {
    let list = parse_edge_list("2 0").unwrap();
    let mut dist = list.to_matrix::<i32>(&LoadOptions::default()).unwrap();
    Solver::new().backend(Backend::Tiled).solve(&mut dist).unwrap();
    assert_eq!(render(&dist), "0 1073741823\n1073741823 0\n");
    assert_eq!(i32::UNREACHABLE as u64, OUTPUT_UNREACHABLE);
}

#[test]
fn scenario_four_cycle() {
    let list = parse_edge_list("4 4  0 1 1  1 2 1  2 3 1  3 0 1").unwrap();
    for backend in [Backend::Serial, Backend::Tiled] {
        let mut dist = list.to_matrix::<i32>(&LoadOptions::default()).unwrap();
        Solver::new().backend(backend).solve(&mut dist).unwrap();
        assert_eq!(dist[(0, 3)], 3);
        assert_eq!(dist[(3, 0)], 1);
        assert_eq!(dist[(0, 0)], 0);
    }
}
