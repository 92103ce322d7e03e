//! Benchmark comparing the CUDA and CPU backends
//!
//! Run with: cargo run --release --example bench_cuda_vs_cpu -p tropical-apsp-cuda

use std::time::Instant;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tropical_apsp::{Backend, DistanceMatrix, Solver};
use tropical_apsp_cuda::{all_pairs_shortest_paths_gpu, get_global_context, CudaError};

const SIZES: &[usize] = &[256, 512, 1024, 2048];
const BENCH_ITERS: usize = 3;

fn random_graph(v: usize, seed: u64) -> DistanceMatrix<i32> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut m = DistanceMatrix::new(v);
    for i in 0..v {
        for j in 0..v {
            if i != j && rng.gen_bool(0.05) {
                m.add_edge(i, j, rng.gen_range(1..1000));
            }
        }
    }
    m
}

fn best_of<F: FnMut() -> f64>(mut run: F) -> f64 {
    (0..BENCH_ITERS).map(|_| run()).fold(f64::INFINITY, f64::min)
}

fn main() -> Result<(), CudaError> {
    // Pays the NVRTC compile up front.
    let ctx = get_global_context()?;
    println!("Device: {}", ctx.device_name());
    println!("{:>6} {:>12} {:>12} {:>8}", "V", "CPU (ms)", "GPU (ms)", "speedup");

    for &v in SIZES {
        let input = random_graph(v, v as u64);

        let cpu = best_of(|| {
            let mut m = input.clone();
            let start = Instant::now();
            Solver::new()
                .backend(Backend::Tiled)
                .solve(&mut m)
                .expect("tiled solve");
            start.elapsed().as_secs_f64() * 1e3
        });

        let mut gpu = f64::INFINITY;
        let mut gpu_result = input.clone();
        for _ in 0..BENCH_ITERS {
            let mut m = input.clone();
            let start = Instant::now();
            all_pairs_shortest_paths_gpu(&mut m)?;
            gpu = gpu.min(start.elapsed().as_secs_f64() * 1e3);
            gpu_result = m;
        }

        let mut expected = input;
        Solver::new().solve(&mut expected).expect("reference solve");
        assert_eq!(gpu_result, expected, "GPU result differs at V={v}");

        println!("{:>6} {:>12.3} {:>12.3} {:>7.2}x", v, cpu, gpu, cpu / gpu);
    }
    Ok(())
}
