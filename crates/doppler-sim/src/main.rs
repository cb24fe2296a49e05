use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::prelude::*;

use doppler_sim::{create_example_config, run_rebalance, run_vesting, SimConfig, SimResult};

#[derive(Parser, Debug)]
#[command(name = "doppler-sim")]
#[command(about = "Offline runner for the Doppler fee rebalance solver and vesting ledger")]
struct Args {
    /// Path to scenario configuration file
    #[arg(short, long, default_value = "doppler-sim.toml")]
    config: String,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Split the collected fees and plan the LP rebalance swap
    Rebalance,
    /// Build the vesting ledger and replay the configured releases
    Vesting,
    /// Write an example configuration to the config path
    InitConfig,
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Err(e) = run(&args) {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> SimResult<()> {
    match args.command {
        Command::InitConfig => {
            create_example_config(&args.config)?;
            info!("Wrote example configuration to {}", args.config);
            Ok(())
        }
        Command::Rebalance => {
            let config = SimConfig::load(&args.config)?;
            print_json(&run_rebalance(&config)?)
        }
        Command::Vesting => {
            let config = SimConfig::load(&args.config)?;
            print_json(&run_vesting(&config)?)
        }
    }
}

fn print_json<T: Serialize>(report: &T) -> SimResult<()> {
    println!("{}", serde_json::to_string_pretty(report)?);
    Ok(())
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("doppler_sim={0},doppler_core={0}", default_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
