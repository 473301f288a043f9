//! CLI entry point for the rebalancer.

use std::path::PathBuf;
use std::process;

use clap::Parser;
use clap::error::ErrorKind;

use rebalance_cli::config::Config;
use rebalance_cli::execution::{self, Outcome, RunOptions};

#[derive(Parser)]
#[command(name = "rebalancer")]
#[command(about = "Portfolio rebalancer: holdings + model weights -> target quantities")]
#[command(version)]
struct Cli {
    /// Path to an optional rebalancer.toml
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the plan without writing the report
    #[arg(long)]
    dry_run: bool,

    /// Current holdings: security,price,quantity
    portfolio: PathBuf,

    /// Target model: security,percent (first line is a header)
    model: PathBuf,

    /// Report to write
    output: PathBuf,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => process::exit(0),
                _ => process::exit(1),
            }
        }
    };

    let config = match &cli.config {
        Some(path) => match Config::load(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error: {e}");
                process::exit(2);
            }
        },
        None => Config::default(),
    };

    let opts = RunOptions {
        portfolio: cli.portfolio,
        model: cli.model,
        output: cli.output,
        dry_run: cli.dry_run,
    };

    match execution::run(&config, &opts) {
        Ok(Outcome::Written(path)) => {
            println!("Rebalance completed. Output written to: {}", path.display());
        }
        Ok(Outcome::DryRun) => {}
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(2);
        }
    }
}
