//! BandTrade CLI: run, prepare and sweep commands.
//!
//! Commands:
//! - `run`: backtest the quote file named in a TOML config
//! - `prepare`: write the quote file with indicator columns added
//! - `sweep`: grid search over channel period, trend period and multiplier

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use bandtrade_runner::export::{save_artifacts, write_file};
use bandtrade_runner::{
    dataset_hash, export_annotated_csv, export_quotes_csv, export_summary_json,
    export_trades_csv, load_quotes, prepare_table, run_backtest, BacktestConfig, BacktestResult,
    ParamGrid, ParamSweep,
};

#[derive(Parser)]
#[command(
    name = "bandtrade",
    about = "BandTrade CLI: intraday band strategy backtester"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a backtest from a TOML config file.
    Run {
        /// Path to a TOML config file.
        #[arg(long)]
        config: PathBuf,

        /// Write the annotated series as CSV.
        #[arg(long)]
        out: Option<PathBuf>,

        /// Write the trade tape as CSV.
        #[arg(long)]
        trades: Option<PathBuf>,

        /// Write the run summary as JSON.
        #[arg(long)]
        summary: Option<PathBuf>,

        /// Save the full artifact set under this directory.
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Add indicator columns to the configured quote file.
    Prepare {
        /// Path to a TOML config file.
        #[arg(long)]
        config: PathBuf,

        /// Output CSV path.
        #[arg(long)]
        out: PathBuf,
    },
    /// Sweep indicator parameters over the configured quote file.
    Sweep {
        /// Path to a TOML config file (session, commission, data).
        #[arg(long)]
        config: PathBuf,

        /// Price channel periods, comma separated.
        #[arg(long, value_delimiter = ',', required = true)]
        pc_periods: Vec<usize>,

        /// Super trend periods, comma separated.
        #[arg(long, value_delimiter = ',', required = true)]
        st_periods: Vec<usize>,

        /// Super trend multipliers, comma separated.
        #[arg(long, value_delimiter = ',', required = true)]
        multipliers: Vec<f64>,

        /// Number of results to print.
        #[arg(long, default_value_t = 10)]
        top: usize,

        /// Run grid points one after another.
        #[arg(long, default_value_t = false)]
        sequential: bool,
    },
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            out,
            trades,
            summary,
            output_dir,
        } => run_cmd(&config, out, trades, summary, output_dir),
        Commands::Prepare { config, out } => prepare_cmd(&config, &out),
        Commands::Sweep {
            config,
            pc_periods,
            st_periods,
            multipliers,
            top,
            sequential,
        } => {
            let grid = ParamGrid {
                pc_periods,
                st_periods,
                st_multipliers: multipliers,
            };
            sweep_cmd(&config, &grid, top, sequential)
        }
    }
}

/// Log to stderr; `RUST_LOG` overrides the default `info` level.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: &Path) -> Result<BacktestConfig> {
    BacktestConfig::from_file(path).with_context(|| format!("failed to load {}", path.display()))
}

fn run_cmd(
    config_path: &Path,
    out: Option<PathBuf>,
    trades: Option<PathBuf>,
    summary: Option<PathBuf>,
    output_dir: Option<PathBuf>,
) -> Result<()> {
    let config = load_config(config_path)?;
    let result = run_backtest(&config)?;

    print_summary(&result);

    if let Some(path) = out {
        write_file(&path, &export_annotated_csv(&result.table, &result.run.annotations)?)?;
        println!("Annotated series saved to: {}", path.display());
    }
    if let Some(path) = trades {
        write_file(&path, &export_trades_csv(&result.trades)?)?;
        println!("Trades saved to: {}", path.display());
    }
    if let Some(path) = summary {
        write_file(&path, &export_summary_json(&result)?)?;
        println!("Summary saved to: {}", path.display());
    }
    if let Some(dir) = output_dir {
        let run_dir = save_artifacts(&result, &dir)?;
        println!("Artifacts saved to: {}", run_dir.display());
    }
    Ok(())
}

fn prepare_cmd(config_path: &Path, out: &Path) -> Result<()> {
    let mut config = load_config(config_path)?;
    if !config.prepare {
        tracing::warn!("config has prepare = false; preparing anyway");
        config.prepare = true;
    }
    let raw = load_quotes(&config.data)
        .with_context(|| format!("failed to load quotes from {}", config.data.display()))?;
    let prepared = prepare_table(&config, &raw)?;
    write_file(out, &export_quotes_csv(&prepared)?)?;
    println!(
        "Prepared {} of {} rows into: {}",
        prepared.len(),
        raw.len(),
        out.display()
    );
    Ok(())
}

fn sweep_cmd(config_path: &Path, grid: &ParamGrid, top: usize, sequential: bool) -> Result<()> {
    if grid.size() == 0 {
        bail!("empty parameter grid");
    }
    let base = load_config(config_path)?;
    let raw = load_quotes(&base.data)
        .with_context(|| format!("failed to load quotes from {}", base.data.display()))?;
    let hash = dataset_hash(&raw);

    let results = ParamSweep::new()
        .with_parallelism(!sequential)
        .sweep(grid, &base, &raw, &hash)?;

    println!();
    println!("=== Sweep: {} points ===", results.len());
    print!("{}", results.render(top));
    Ok(())
}

fn print_summary(result: &BacktestResult) {
    println!();
    println!("Run:            {}", result.run_id);
    println!("Data:           {}", result.config.data.display());
    print!("{}", result.summary.render());
}
