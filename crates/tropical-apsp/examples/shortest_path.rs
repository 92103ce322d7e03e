//! All-pairs shortest paths on a small road network.
//!
//! Solves the same graph serially and with the tiled engine and prints the
//! resulting distance matrix.

use tropical_apsp::prelude::*;

fn main() {
    println!("All-Pairs Shortest Path with blocked Floyd-Warshall\n");
    println!("{}\n", tropical_apsp::version_info());

    let input = "\
5 7
0 1 3
0 3 7
1 2 2
2 3 1
2 4 5
3 4 2
4 0 1
";
    let graph = tropical_apsp::parse_edge_list(input).expect("valid edge list");
    let initial = graph
        .to_matrix::<i32>(&LoadOptions::default())
        .expect("edges in range");

    println!("Initial distance matrix (direct edges):");
    print_matrix(&initial);

    let mut serial = initial.clone();
    let report = Solver::new()
        .backend(Backend::Serial)
        .solve_with_report(&mut serial)
        .expect("non-negative weights");
    println!(
        "\nSerial: {} iterations in {:?}",
        report.iterations, report.elapsed
    );

    let mut tiled = initial;
    let run = TiledEngine::new().solve(&mut tiled);
    println!("Tiled:  {} iterations in {:?}", run.iterations, run.elapsed);

    assert_eq!(serial, tiled);

    println!("\nShortest distances:");
    print_matrix(&tiled);

    println!("\n  0 -> 4: {} (path: 0->1->2->3->4 = 3+2+1+2)", tiled[(0, 4)]);
    println!("  4 -> 3: {} (path: 4->0->1->2->3 = 1+3+2+1)", tiled[(4, 3)]);
}

fn print_matrix(m: &DistanceMatrix<i32>) {
    for row in m.rows() {
        let cells: Vec<String> = row
            .iter()
            .map(|&d| {
                if d.is_reachable() {
                    format!("{d:>4}")
                } else {
                    "   ∞".to_string()
                }
            })
            .collect();
        println!("  [{}]", cells.join(","));
    }
}
