//! chanlist-check: validate a configured chanlist and print its exports
//!
//! Loads a chanlist configuration, checks the stored chanlist against the
//! configured subdevice, and prints the arrays a transport layer consumes.
//!
//! ```bash
//! chanlist-check --config config/chanlist.toml validate
//! chanlist-check --config config/chanlist.toml export --json
//! DAQ_CHANLIST_STREAM__CHANNELS="0-0-0-0-0,2-0-0-0-0" chanlist-check -c config/chanlist.toml export
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use daq_chanlist::{logging, CapabilityValidator, ChanlistConfig, ChannelList};
use serde::Serialize;
use tracing::info;

#[derive(Parser)]
#[command(name = "chanlist-check")]
#[command(about = "Validate a DAQ chanlist against subdevice capabilities", long_about = None)]
struct Cli {
    /// Path to the chanlist configuration file
    #[arg(short, long, default_value = "config/chanlist.toml")]
    config: PathBuf,

    /// Override the configured chanlist text
    #[arg(long)]
    channels: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check the chanlist and report the first problem found
    Validate,

    /// Print the transport arrays for a valid chanlist
    Export {
        /// Emit JSON instead of plain text
        #[arg(long)]
        json: bool,
    },

    /// Print the effective configuration as TOML
    ShowConfig,
}

#[derive(Serialize)]
struct Exports {
    device: String,
    channels: Vec<u32>,
    directions: Vec<daq_chanlist::DirectionCode>,
    chanspecs: Vec<u32>,
    vendor: String,
    text: String,
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let mut config = ChanlistConfig::load_from(&cli.config)
        .with_context(|| format!("Failed to load {}", cli.config.display()))?;
    if let Some(channels) = cli.channels {
        config.stream.channels = channels;
    }

    logging::init_from_config(&config).context("Failed to initialize logging")?;
    config.validate().context("Invalid configuration")?;

    match cli.command {
        Commands::Validate => {
            let list = checked_list(&config)?;
            println!(
                "OK: {} I/O channel(s), {} special entr{} on {}",
                list.io_count(),
                list.len() - list.io_count(),
                if list.len() - list.io_count() == 1 { "y" } else { "ies" },
                config.subdevice.class
            );
        }
        Commands::Export { json } => {
            let list = checked_list(&config)?;
            let exports = Exports {
                device: config.stream.device.clone(),
                channels: list.to_channel_numbers(),
                directions: list.to_direction_codes(),
                chanspecs: list.to_chanspecs(),
                vendor: list.to_vendor_channel_string(&config.stream.device)?,
                text: list.to_text(),
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&exports)?);
            } else {
                print_exports(&exports);
            }
        }
        Commands::ShowConfig => {
            print!("{}", config.to_toml()?);
        }
    }

    Ok(())
}

fn checked_list(config: &ChanlistConfig) -> Result<ChannelList> {
    let list = config.channel_list()?;
    CapabilityValidator::validate(&list, &config.subdevice)
        .with_context(|| format!("Chanlist does not fit {}", config.subdevice.class))?;
    info!(
        io_count = list.io_count(),
        device = %config.stream.device,
        "Chanlist validated"
    );
    Ok(list)
}

fn print_exports(exports: &Exports) {
    let join = |values: &[u32]| {
        values
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(",")
    };
    let directions = exports
        .directions
        .iter()
        .map(|d| d.as_str())
        .collect::<Vec<_>>()
        .join(",");

    println!("device:     {}", exports.device);
    println!("channels:   {}", join(&exports.channels));
    println!("directions: {}", directions);
    println!("chanspecs:  {}", join(&exports.chanspecs));
    println!("vendor:     {}", exports.vendor);
    println!("text:       {}", exports.text);
}
