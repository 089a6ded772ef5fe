mod commands;
mod config;
mod input;
mod logging;
mod output;
mod store;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::evaluate::EvaluateArgs;
use commands::scenario::ScenarioArgs;
use commands::sensitivity::SensitivityArgs;

/// Financial-statement impact of a supply chain finance program
#[derive(Parser)]
#[command(
    name = "scfi",
    version,
    about = "Supply chain finance impact scenarios",
    long_about = "Estimate the P&L, balance-sheet and ratio impact of a supply chain \
                  finance program: early-payment discounts, extended DPO and \
                  operational efficiency gains, with decimal precision."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Path to YAML config (store path, division policy, default scenario)
    #[arg(long, global = true)]
    config: Option<String>,

    /// Enable debug logging on stderr (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a scenario: benefits, adjusted statements and ratios
    Evaluate(EvaluateArgs),
    /// Sweep one or two inputs and report an output metric
    Sensitivity(SensitivityArgs),
    /// Show, save or reset the stored scenario
    Scenario(ScenarioArgs),
    /// Print the default scenario record
    Defaults,
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let settings = match config::load(cli.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    };

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Evaluate(args) => commands::evaluate::run_evaluate(args, &settings),
        Commands::Sensitivity(args) => commands::sensitivity::run_sensitivity(args, &settings),
        Commands::Scenario(args) => commands::scenario::run_scenario(args, &settings),
        Commands::Defaults => serde_json::to_value(&settings.defaults).map_err(Into::into),
        Commands::Version => {
            println!("scfi {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
