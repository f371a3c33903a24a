//! docbench command-line interface.
//!
//! Wires configuration to adapters, runs the selected workloads, and renders
//! the report.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use docbench_core::{create_adapter, BackendKind, ConnectionConfig};
use docbench_harness::{render_csv, render_json, render_text, run_workload, BenchmarkResult, BenchmarkRunner, Scale, Workload};

/// Which backends to benchmark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum BackendArg {
    Mongo,
    Postgres,
    All,
}

impl BackendArg {
    fn kinds(&self) -> Vec<BackendKind> {
        match self {
            BackendArg::Mongo => vec![BackendKind::Mongo],
            BackendArg::Postgres => vec![BackendKind::Postgres],
            BackendArg::All => vec![BackendKind::Mongo, BackendKind::Postgres],
        }
    }
}

/// Report output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    Csv,
}

/// Cross-backend document CRUD benchmarks
#[derive(Parser, Debug)]
#[command(name = "docbench")]
#[command(version, about = "Cross-backend document CRUD benchmarks")]
struct Args {
    /// Backend(s) to benchmark
    #[arg(short, long, default_value = "all", value_enum)]
    backend: BackendArg,

    /// Workloads to run (default: all); repeatable
    #[arg(short, long)]
    workload: Vec<String>,

    /// Seeded data scale (tiny|small|medium|large)
    #[arg(short, long, default_value = "small")]
    scale: String,

    /// Measured iterations per workload
    #[arg(short, long, default_value_t = docbench_harness::runner::DEFAULT_ITERATIONS)]
    iterations: usize,

    /// Unmeasured warmup iterations per workload
    #[arg(long, default_value_t = docbench_harness::runner::DEFAULT_WARMUP)]
    warmup: usize,

    /// Report format
    #[arg(long, default_value = "text", value_enum)]
    format: OutputFormat,

    /// Write the report to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("docbench=info".parse().unwrap()),
        )
        .init();

    let args = Args::parse();

    if let Err(e) = run(args).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let scale: Scale = args.scale.parse()?;
    let workloads = if args.workload.is_empty() {
        Workload::all()
    } else {
        args.workload
            .iter()
            .map(|w| w.parse::<Workload>())
            .collect::<Result<Vec<_>, _>>()?
    };
    let runner = BenchmarkRunner::new()
        .with_warmup(args.warmup)
        .with_iterations(args.iterations);

    let mut results: Vec<BenchmarkResult> = Vec::new();
    for kind in args.backend.kinds() {
        // Connection parameters come from the DOCBENCH_* environment, with
        // documented defaults for anything unset.
        let config = ConnectionConfig::from_env(kind);
        let adapter = create_adapter(kind, config);
        adapter.connect().await?;

        for workload in &workloads {
            let result = run_workload(&adapter, *workload, scale, &runner).await?;
            results.push(result);
        }

        adapter.disconnect().await?;
    }

    let rendered = match args.format {
        OutputFormat::Text => render_text(&results),
        OutputFormat::Json => render_json(&results),
        OutputFormat::Csv => render_csv(&results),
    };

    match &args.output {
        Some(path) => std::fs::write(path, rendered)?,
        None => print!("{}", rendered),
    }
    Ok(())
}
