//! Offline checker for captured battery monitor telemetry.

mod check;

use std::fs::File;
use std::io::{self, BufReader};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;

use crate::check::check_log;

/// Recomputes the CRC-8 of every line of a telemetry capture
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Captured telemetry, one frame per line, header first
    input: PathBuf,

    /// Enable debug logging
    #[arg(short = 'd', long)]
    debug: bool,
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();

    if args.debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::from_default_env()
                    .add_directive("frame_check=debug".parse()?),
            )
            .with_writer(io::stderr)
            .init();
    }

    let file = File::open(&args.input)
        .with_context(|| format!("Failed to open telemetry capture: {:?}", args.input))?;

    println!("======================================");
    println!("| SLA Battery Monitor Data CRC Check |");
    println!("======================================");
    println!();
    println!("Battery Data file: {}", args.input.display());
    println!();

    let stdout = io::stdout();
    let summary = check_log(BufReader::new(file), &mut stdout.lock())?;

    println!();
    println!("Number of CRCs checked : {}", summary.checked);
    println!("  Number of failed CRCs: {}", summary.failed);
    if summary.malformed > 0 {
        println!("   Number of bad lines : {}", summary.malformed);
    }
    println!();

    Ok(if summary.is_clean() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
