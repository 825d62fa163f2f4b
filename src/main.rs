extern crate flightsurety_core;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use colored::*;
use env_logger::Builder;
use log::{error, info, LevelFilter};
use thiserror::Error;

use flightsurety_core::config::{self, ConfigError, SuretyConfig};
use flightsurety_core::consensus::ReportMode;
use flightsurety_core::simulation::{self, SimulationError, SimulationReport};

#[derive(Parser)]
#[clap(author, version, about)]
/// FlightSurety ledger node: runs the insurance scheme against an in-process oracle swarm
struct Cli {
    /// TOML configuration file; FLIGHTSURETY__* environment variables override it
    #[clap(short, long)]
    config: Option<PathBuf>,

    /// Log level for output (overridden by RUST_LOG)
    #[clap(short, long, default_value = "info")]
    log_level: String,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run an end-to-end insurance scenario
    #[clap(alias = "sim")]
    Simulate {
        /// Number of oracles in the swarm
        #[clap(long)]
        oracles: Option<usize>,

        /// Number of airlines to admit, founder included
        #[clap(long)]
        airlines: Option<usize>,

        /// Number of insured passengers
        #[clap(long)]
        passengers: Option<usize>,

        /// Flight code to insure and query
        #[clap(long)]
        flight: Option<String>,

        /// What the oracles report
        #[clap(long, value_enum)]
        status: Option<ReportMode>,

        /// Print the full report, events included, as JSON
        #[clap(long)]
        json: bool,
    },

    /// Print the effective configuration as TOML
    Config,
}

#[derive(Debug, Error)]
enum NodeError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Simulation(#[from] SimulationError),

    #[error("Failed to render report: {0}")]
    Json(#[from] serde_json::Error),
}

fn init_logging(level: &str) {
    let level = match level.to_lowercase().as_str() {
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "info" => LevelFilter::Info,
        "warn" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        _ => LevelFilter::Info,
    };

    Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp_millis()
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    if let Err(e) = run(cli).await {
        error!("{}", e);
        eprintln!("{} {}", "error:".red().bold(), e);
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), NodeError> {
    let mut config = config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Simulate {
            oracles,
            airlines,
            passengers,
            flight,
            status,
            json,
        } => {
            let sim = &mut config.simulation;
            if let Some(oracles) = oracles {
                sim.oracles = oracles;
            }
            if let Some(airlines) = airlines {
                sim.airlines = airlines;
            }
            if let Some(passengers) = passengers {
                sim.passengers = passengers;
            }
            if let Some(flight) = flight {
                sim.flight = flight;
            }
            if let Some(status) = status {
                sim.report_mode = status;
            }

            info!("Starting FlightSurety simulation");
            let report = simulation::run(config).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print_report(&report);
            }
        }
        Commands::Config => print_config(&config)?,
    }
    Ok(())
}

fn print_config(config: &SuretyConfig) -> Result<(), NodeError> {
    print!("{}", config::to_toml_string(config)?);
    Ok(())
}

fn print_report(report: &SimulationReport) {
    println!("{}", "FlightSurety Simulation".green().bold());
    println!("Flight:     {} ({})", report.flight, report.airline);
    println!("Airlines:   {} registered", report.airlines_registered);
    println!(
        "Oracles:    {} registered, {} hold index {}",
        report.oracles, report.responders, report.request.index
    );

    let status = report.status.to_string();
    if report.status.triggers_settlement() {
        println!("Status:     {}", status.red().bold());
    } else {
        println!("Status:     {}", status.cyan());
    }

    let accepted: usize = report.workers.iter().map(|w| w.accepted).sum();
    let late: usize = report.workers.iter().map(|w| w.late).sum();
    println!("Responses:  {} accepted, {} after finalization", accepted, late);

    println!("\n{}", "Passengers".yellow().bold());
    for outcome in &report.passengers {
        println!(
            "  {}  insured {}  paid {}  balance {}",
            outcome.passenger, outcome.insured, outcome.paid, outcome.balance
        );
    }

    println!("\nEscrow:     {}", report.escrow);
    println!("Reserve:    {}", report.reserve);
    if report.solvent {
        println!("Solvency:   {}", "ok".green());
    } else {
        println!("Solvency:   {}", "MISMATCH".red().bold());
    }
}
