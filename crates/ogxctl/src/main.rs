//! ogxctl - inspect and replay Xbox controller traffic through the adapter
//! engine without hardware.

#![deny(static_mut_refs)]
#![deny(unused_must_use)]
#![deny(clippy::unwrap_used)]

mod capture;
mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::commands::{FamilyArg, Format};

#[derive(Parser)]
#[command(name = "ogxctl")]
#[command(about = "Decode, replay and configure the Xbox controller adapter engine")]
#[command(version)]
struct Cli {
    /// Verbose logging
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = Format::Text)]
    format: Format,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode one raw controller report
    Decode {
        /// Controller family that sent the report
        #[arg(long, value_enum, default_value_t = FamilyArg::Xbox360Wired)]
        family: FamilyArg,
        /// Report bytes in hex, e.g. "00 14 10 00 ..."
        hex: String,
    },
    /// Replay a JSON capture file through a simulated master board
    Replay {
        /// Capture file
        path: PathBuf,
        /// Controller family of the captured device
        #[arg(long, value_enum, default_value_t = FamilyArg::Xbox360Wired)]
        family: FamilyArg,
        /// Engine configuration file (defaults apply when omitted)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Engine configuration helpers
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Print the default configuration as JSON
    Default,
    /// Load and validate a configuration file
    Validate {
        /// Configuration file
        path: PathBuf,
    },
}

fn init_logging(verbose: u8) {
    let log_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("ogxctl={log_level},ogx_bridge={log_level}").into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
}

fn execute(cli: &Cli) -> Result<()> {
    match &cli.command {
        Commands::Decode { family, hex } => {
            commands::decode::run((*family).into(), hex, cli.format)
        }
        Commands::Replay {
            path,
            family,
            config,
        } => commands::replay::run(path, (*family).into(), config.as_deref(), cli.format),
        Commands::Config(ConfigCommands::Default) => commands::config::print_default(),
        Commands::Config(ConfigCommands::Validate { path }) => {
            let config = commands::config::validate(path)?;
            match cli.format {
                Format::Json => println!("{}", serde_json::to_string_pretty(&config)?),
                Format::Text => println!("'{}' is valid", path.display()),
            }
            Ok(())
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    execute(&cli)
}
