//! Command-line driver for the comparison-count experiments
//!
//! ```bash
//! # five runs at n = 500, one CSV per run
//! binomial-experiment --seed 7 --out-dir results single --n 500 --runs 5
//!
//! # complexity sweep over n = 100..=10000
//! RUST_LOG=debug binomial-experiment sweep
//! ```

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::{ensure, Context};
use binomial_lab::binomial::BinomialHeap;
use binomial_lab::compare::ComparisonCounter;
use binomial_lab::experiment::{self, ExperimentConfig, OperationKind, TrialSummary};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help(true))]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Seed for key generation; omitted means a fresh random seed
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Directory for CSV output
    #[arg(long, global = true, default_value = ".")]
    out_dir: PathBuf,

    /// Smallest generated key
    #[arg(long, global = true, default_value_t = 1)]
    key_min: i32,

    /// Largest generated key
    #[arg(long, global = true, default_value_t = 100_000)]
    key_max: i32,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Insert 10, 5, 15, 3, 8 and drain, printing the root list and costs
    Demo,
    /// Scripted runs, one `experiment_<run>_n<n>.csv` per run
    Single {
        #[arg(short, long, default_value_t = 500)]
        n: usize,
        #[arg(short, long, default_value_t = 5)]
        runs: usize,
    },
    /// One run per size, written to `complexity_analysis.csv`
    Sweep,
    /// Repeated runs at one size, summarized
    Trials {
        #[arg(short, long, default_value_t = 500)]
        n: usize,
        #[arg(short, long, default_value_t = 10)]
        runs: usize,
    },
    /// Costs of ascending inserts followed by extractions
    Profile {
        #[arg(long, default_value_t = 16)]
        inserts: u32,
        #[arg(long, default_value_t = 8)]
        extracts: usize,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn create_csv(dir: &Path, name: &str) -> anyhow::Result<(PathBuf, BufWriter<File>)> {
    let path = dir.join(name);
    let file = File::create(&path).with_context(|| format!("creating {}", path.display()))?;
    Ok((path, BufWriter::new(file)))
}

fn demo() {
    let counter = ComparisonCounter::new();
    let mut heap = BinomialHeap::with_comparator(counter.clone());
    for key in [10, 5, 15, 3, 8] {
        heap.insert(key);
    }
    println!("inserted 10, 5, 15, 3, 8 with {} comparisons", counter.get());
    println!("root list: {heap}");

    counter.reset();
    while !heap.is_empty() {
        let (min, cost) = counter.measure(|| heap.extract_min());
        if let Some(min) = min {
            println!("  min {min} ({cost} comparisons)");
        }
    }
}

fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    ensure!(
        cli.key_min <= cli.key_max,
        "--key-min {} is larger than --key-max {}",
        cli.key_min,
        cli.key_max
    );

    let mut config = ExperimentConfig {
        seed: cli.seed,
        key_min: cli.key_min,
        key_max: cli.key_max,
        ..ExperimentConfig::default()
    };

    match cli.command {
        Command::Demo => demo(),
        Command::Single { n, runs } => {
            config.n = n;
            config.runs = runs;
            let mut rng = config.rng();
            for run in 1..=config.runs {
                let record = experiment::run_single(config.n, config.key_range(), &mut rng)
                    .with_context(|| format!("run {run} with n={}", config.n))?;
                let (path, out) =
                    create_csv(&cli.out_dir, &format!("experiment_{run}_n{}.csv", config.n))?;
                experiment::write_operation_costs(out, &record.costs)?;
                info!(
                    run,
                    total = record.total_comparisons(),
                    max_insert = ?record.max_cost(OperationKind::Insert),
                    max_extract = ?record.max_cost(OperationKind::ExtractMin),
                    path = %path.display(),
                    "run written"
                );
            }
        }
        Command::Sweep => {
            let mut rng = config.rng();
            let rows = experiment::run_sweep(
                &experiment::default_sweep_sizes(),
                config.key_range(),
                &mut rng,
            )?;
            let (path, out) = create_csv(&cli.out_dir, "complexity_analysis.csv")?;
            experiment::write_sweep(out, &rows)?;
            info!(rows = rows.len(), path = %path.display(), "sweep written");
        }
        Command::Trials { n, runs } => {
            config.n = n;
            config.runs = runs;
            let mut rng = config.rng();
            let summary: Option<TrialSummary> =
                experiment::run_trials(config.n, config.runs, config.key_range(), &mut rng)?;
            match summary {
                Some(summary) => println!(
                    "{} trials at n={}: mean {:.2}, min {}, max {}, spread {:.1}%",
                    summary.trials,
                    config.n,
                    summary.mean,
                    summary.min,
                    summary.max,
                    summary.spread_percent()
                ),
                None => println!("no trials run"),
            }
        }
        Command::Profile { inserts, extracts } => {
            let profile = experiment::operation_profile(inserts, extracts);
            for (i, cost) in profile.insert_costs.iter().enumerate() {
                println!("insert {}: {cost} comparisons", i + 1);
            }
            for (i, cost) in profile.extract_costs.iter().enumerate() {
                println!("extract {}: {cost} comparisons", i + 1);
            }
        }
    }
    Ok(())
}
