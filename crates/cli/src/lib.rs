pub mod commands;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "pricewire",
    about = "Pricewire operator CLI",
    long_about = "Inspect pricewire configuration, check deployment readiness, and run one-off price lookups.",
    after_help = "Examples:\n  pricewire doctor --json\n  pricewire config\n  pricewire quote EUR/USD"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
    #[command(about = "Validate config, WhatsApp credential shape, and listener availability")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Look up one symbol and print the reply the bot would send")]
    Quote {
        #[arg(help = "Ticker or currency pair, e.g. EUR/USD or AAPL")]
        symbol: String,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => {
            commands::CommandResult { exit_code: 0, output: commands::doctor::run(json) }
        }
        Command::Quote { symbol } => commands::quote::run(&symbol),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
