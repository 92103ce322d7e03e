//! `apsp`: read an edge list, print the all-pairs shortest-path matrix.
//!
//! ```text
//! apsp graph.txt > distances.txt
//! apsp --backend tiled --threads 8 -v graph.txt
//! ```
//!
//! Diagnostics go to stderr through `tracing`; stdout carries only the matrix.

use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use thiserror::Error;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use tropical_apsp::{
    load_matrix, version_info, write_matrix, ApspError, Backend, DistanceMatrix, InputError,
    LoadOptions, SelfLoopPolicy, Solver,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum BackendArg {
    /// Serial for small graphs, tiled above `--serial-threshold`
    Auto,
    /// Triple-loop reference
    Serial,
    /// Blocked phases on the CPU
    Tiled,
    /// Blocked phases on a CUDA device
    Cuda,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SelfLoopArg {
    Honor,
    Ignore,
    Reject,
}

impl From<SelfLoopArg> for SelfLoopPolicy {
    fn from(arg: SelfLoopArg) -> Self {
        match arg {
            SelfLoopArg::Honor => SelfLoopPolicy::Honor,
            SelfLoopArg::Ignore => SelfLoopPolicy::Ignore,
            SelfLoopArg::Reject => SelfLoopPolicy::Reject,
        }
    }
}

/// All-pairs shortest paths with a blocked Floyd-Warshall.
#[derive(Debug, Parser)]
#[command(name = "apsp", version, about)]
struct Cli {
    /// Edge-list file: `V E` followed by E lines of `src dst weight`
    #[arg(required_unless_present = "info")]
    input: Option<PathBuf>,

    /// Execution backend
    #[arg(long, value_enum, default_value_t = BackendArg::Auto)]
    backend: BackendArg,

    /// Largest vertex count solved serially by `auto`
    #[arg(long, default_value_t = 64)]
    serial_threshold: usize,

    /// Worker threads for the tiled backend (default: all cores)
    #[arg(long)]
    threads: Option<usize>,

    /// How to treat edges from a vertex to itself
    #[arg(long, value_enum, default_value_t = SelfLoopArg::Honor)]
    self_loops: SelfLoopArg,

    /// CUDA device ordinal for `--backend cuda`
    #[arg(long, default_value_t = 0)]
    device: usize,

    /// More logging on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Print build and SIMD information to stderr
    #[arg(long)]
    info: bool,
}

#[derive(Debug, Error)]
enum CliError {
    #[error("cannot open {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid input: {0}")]
    Input(#[from] InputError),

    #[error(transparent)]
    Solve(#[from] ApspError),

    #[cfg(feature = "cuda")]
    #[error(transparent)]
    Cuda(#[from] tropical_apsp_cuda::CudaError),

    #[cfg(not(feature = "cuda"))]
    #[error("this build has no CUDA support; rebuild with `--features cuda`")]
    CudaUnavailable,

    #[error("failed to write output: {0}")]
    Output(#[source] io::Error),
}

impl CliError {
    fn exit_code(&self) -> u8 {
        match self {
            CliError::Open { .. } | CliError::Input(_) => 1,
            CliError::Solve(ApspError::Input(_)) => 1,
            _ => 2,
        }
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}

fn solve(cli: &Cli, matrix: &mut DistanceMatrix<i32>) -> Result<(), CliError> {
    let backend = match cli.backend {
        BackendArg::Auto => Backend::Auto,
        BackendArg::Serial => Backend::Serial,
        BackendArg::Tiled => Backend::Tiled,
        BackendArg::Cuda => return solve_cuda(cli, matrix),
    };

    let mut solver = Solver::new()
        .backend(backend)
        .serial_threshold(cli.serial_threshold);
    if let Some(threads) = cli.threads {
        solver = solver.threads(threads);
    }

    let report = solver.solve_with_report(matrix)?;
    info!(
        backend = %report.backend,
        vertices = report.vertex_count,
        iterations = report.iterations,
        elapsed_ms = report.elapsed.as_secs_f64() * 1e3,
        "APSP elapsed"
    );
    Ok(())
}

#[cfg(feature = "cuda")]
fn solve_cuda(cli: &Cli, matrix: &mut DistanceMatrix<i32>) -> Result<(), CliError> {
    use tropical_apsp_cuda::{all_pairs_shortest_paths_gpu, solve_with_context, CudaContext};

    let run = if cli.device == 0 {
        all_pairs_shortest_paths_gpu(matrix)?
    } else {
        let ctx = CudaContext::new_on_device(cli.device)?;
        solve_with_context(&ctx, matrix)?
    };
    info!(
        device = cli.device,
        iterations = run.iterations,
        elapsed_ms = run.elapsed.as_secs_f64() * 1e3,
        "[GPU] APSP elapsed"
    );
    Ok(())
}

#[cfg(not(feature = "cuda"))]
fn solve_cuda(_cli: &Cli, _matrix: &mut DistanceMatrix<i32>) -> Result<(), CliError> {
    Err(CliError::CudaUnavailable)
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let Some(path) = cli.input.as_ref() else {
        return Ok(());
    };

    let file = File::open(path).map_err(|source| CliError::Open {
        path: path.clone(),
        source,
    })?;
    let options = LoadOptions {
        self_loops: cli.self_loops.into(),
    };
    let mut matrix = load_matrix::<i32, _>(BufReader::new(file), &options)?;

    solve(cli, &mut matrix)?;

    let stdout = io::stdout();
    write_matrix(&matrix, BufWriter::new(stdout.lock())).map_err(CliError::Output)
}

fn report(err: &CliError) {
    match err {
        #[cfg(feature = "cuda")]
        CliError::Cuda(cuda) => {
            let operation = cuda.operation().unwrap_or("setup");
            error!(operation, error = %cuda, "CUDA backend failed");
            eprintln!("apsp: CUDA error during {operation}: {cuda}");
        }
        other => {
            error!(error = %other, "apsp failed");
            eprintln!("apsp: {other}");
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.info {
        eprintln!("{}", version_info());
        if cli.input.is_none() {
            return ExitCode::SUCCESS;
        }
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report(&err);
            ExitCode::from(err.exit_code())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["apsp", "graph.txt"]).unwrap();
        assert_eq!(cli.input, Some(PathBuf::from("graph.txt")));
        assert_eq!(cli.backend, BackendArg::Auto);
        assert_eq!(cli.serial_threshold, 64);
        assert_eq!(cli.threads, None);
        assert_eq!(cli.self_loops, SelfLoopArg::Honor);
        assert_eq!(cli.device, 0);
        assert_eq!(cli.verbose, 0);
    }

    #[test]
    fn test_flags() {
        let cli = Cli::try_parse_from([
            "apsp",
            "--backend",
            "tiled",
            "--threads",
            "4",
            "--self-loops",
            "reject",
            "-vv",
            "g.txt",
        ])
        .unwrap();
        assert_eq!(cli.backend, BackendArg::Tiled);
        assert_eq!(cli.threads, Some(4));
        assert_eq!(SelfLoopPolicy::from(cli.self_loops), SelfLoopPolicy::Reject);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn test_input_required_without_info() {
        assert!(Cli::try_parse_from(["apsp"]).is_err());
        assert!(Cli::try_parse_from(["apsp", "--info"]).is_ok());
        assert!(Cli::try_parse_from(["apsp", "--backend", "gpu", "g.txt"]).is_err());
    }

    #[test]
    fn test_exit_codes() {
        let input = CliError::Input(InputError::SelfLoop { vertex: 0 });
        assert_eq!(input.exit_code(), 1);

        let config = CliError::Solve(ApspError::InvalidConfig("thread count must be non-zero"));
        assert_eq!(config.exit_code(), 2);
    }
}
