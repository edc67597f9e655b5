// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand};
use morsecam::constants::pacing;
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "morsecam")]
#[command(about = "Blinking-light Morse transceiver core")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify a still image as a lit or unlit signal frame
    Analyze {
        /// Path to the image file
        image: PathBuf,

        /// Detection config JSON file (defaults are used when omitted)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Print histogram and spot diagnostics
        #[arg(short, long)]
        verbose: bool,
    },

    /// Print the capture frame rate derived from a Morse unit
    Rate {
        /// Morse unit duration in seconds
        #[arg(short, long, default_value_t = pacing::DEFAULT_UNIT_SECS)]
        unit: f64,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    // Set RUST_LOG environment variable to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=morsecam=trace, RUST_LOG=info
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(true)
        .with_level(true)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            image,
            config,
            verbose,
        } => cli::analyze_image(image, config, verbose),
        Commands::Rate { unit } => cli::print_rate(unit),
    }
}
