// PinLab - GPIO Pin-State Matrix
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use anyhow::Context;
use clap::{Parser, Subcommand};
use pinlab_config::BoardManifest;
use pinlab_core::{destroy, PinFunction, PinMatrix, PinState, Port};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::str::FromStr;
use tracing::{error, info};

const EXIT_PASS: u8 = 0;
const EXIT_CONFIG_ERROR: u8 = 2;
const EXIT_RUNTIME_ERROR: u8 = 3;

/// One cell write requested on the command line.
#[derive(Debug, Clone, PartialEq)]
struct SetSpec {
    port: Port,
    pin: usize,
    function: PinFunction,
    state: PinState,
}

fn parse_set_spec(s: &str) -> Result<SetSpec, String> {
    let (addr, state) = s
        .split_once('=')
        .ok_or_else(|| format!("Invalid cell spec '{}'; expected PORT:PIN:FUNCTION=STATE", s))?;

    let mut parts = addr.split(':');
    let (Some(port), Some(pin), Some(function), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(format!(
            "Invalid cell address '{}'; expected PORT:PIN:FUNCTION",
            addr
        ));
    };

    Ok(SetSpec {
        port: Port::from_str(port)?,
        pin: pin
            .trim()
            .parse::<usize>()
            .map_err(|e| format!("Invalid pin index '{}': {}", pin, e))?,
        function: PinFunction::from_str(function)?,
        state: PinState::from_str(state)?,
    })
}

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "PinLab pin-state matrix driver",
    long_about = None
)]
struct Cli {
    /// Path to a board manifest (YAML)
    #[arg(short, long)]
    board: Option<PathBuf>,

    /// Pins per port when no board manifest is given
    #[arg(short, long, default_value = "16")]
    pins: usize,

    /// Cell write to apply, PORT:PIN:FUNCTION=STATE (repeatable)
    #[arg(long = "set", value_parser = parse_set_spec)]
    set: Vec<SetSpec>,

    /// Write the state snapshot (JSON) to this path instead of stdout
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Enable debug-level tracing
    #[arg(short, long, global = true)]
    trace: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate a board manifest without building a matrix.
    Check(CheckArgs),
}

#[derive(Parser, Debug)]
struct CheckArgs {
    /// Path to the board manifest (YAML)
    #[arg(short, long)]
    board: PathBuf,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing with appropriate level based on --trace flag
    if cli.trace {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .init();
    }

    match cli.command {
        Some(Commands::Check(args)) => run_check(args),
        None => run_matrix(cli),
    }
}

fn run_check(args: CheckArgs) -> ExitCode {
    match BoardManifest::from_file(&args.board) {
        Ok(manifest) => {
            info!(
                "Board '{}' is valid ({} bindings, {} pins per port)",
                manifest.name,
                manifest.bindings.len(),
                manifest.pin_count
            );
            ExitCode::from(EXIT_PASS)
        }
        Err(e) => {
            error!("{:#}", e);
            ExitCode::from(EXIT_CONFIG_ERROR)
        }
    }
}

fn run_matrix(cli: Cli) -> ExitCode {
    let manifest = match &cli.board {
        Some(path) => match BoardManifest::from_file(path) {
            Ok(manifest) => Some(manifest),
            Err(e) => {
                error!("{:#}", e);
                return ExitCode::from(EXIT_CONFIG_ERROR);
            }
        },
        None => None,
    };

    let pin_count = manifest.as_ref().map(|m| m.pin_count).unwrap_or(cli.pins);

    let mut matrix = match PinMatrix::create(pin_count) {
        Ok(matrix) => matrix,
        Err(e) => {
            error!("Failed to create pin matrix: {}", e);
            return ExitCode::from(EXIT_RUNTIME_ERROR);
        }
    };
    info!(
        "Pin matrix ready: {} ports x {} pins x {} functions",
        Port::COUNT,
        pin_count,
        PinFunction::COUNT
    );

    if let Some(manifest) = &manifest {
        if let Err(e) = apply_board(manifest, &mut matrix) {
            error!("{:#}", e);
            return ExitCode::from(EXIT_CONFIG_ERROR);
        }
        info!(
            "Applied board '{}' ({} bindings)",
            manifest.name,
            manifest.bindings.len()
        );
    }

    for spec in &cli.set {
        if let Err(e) = matrix.set(spec.port, spec.pin, spec.function, spec.state) {
            error!(
                "Failed to write cell {:?}:{}:{:?}: {}",
                spec.port, spec.pin, spec.function, e
            );
            return ExitCode::from(EXIT_RUNTIME_ERROR);
        }
    }

    let snapshot = matrix.snapshot();
    if let Some(code) = write_snapshot(&snapshot, cli.snapshot.as_deref()) {
        return code;
    }

    match destroy(Some(matrix)) {
        Ok(()) => {
            info!("Pin matrix destroyed");
            ExitCode::from(EXIT_PASS)
        }
        Err(e) => {
            error!("Destroy failed: {}", e);
            ExitCode::from(EXIT_RUNTIME_ERROR)
        }
    }
}

fn apply_board(manifest: &BoardManifest, matrix: &mut PinMatrix) -> anyhow::Result<()> {
    for binding in &manifest.bindings {
        matrix
            .set(binding.port, binding.pin, binding.function, binding.state)
            .with_context(|| format!("Failed to apply binding '{}'", binding.id))?;
    }
    Ok(())
}

fn write_snapshot(snapshot: &serde_json::Value, path: Option<&Path>) -> Option<ExitCode> {
    match path {
        Some(path) => match std::fs::File::create(path) {
            Ok(f) => {
                if let Err(e) = serde_json::to_writer_pretty(f, snapshot) {
                    error!("Failed to write snapshot {:?}: {}", path, e);
                    return Some(ExitCode::from(EXIT_RUNTIME_ERROR));
                }
                info!("Snapshot written to {:?}", path);
            }
            Err(e) => {
                error!("Failed to create snapshot {:?}: {}", path, e);
                return Some(ExitCode::from(EXIT_RUNTIME_ERROR));
            }
        },
        None => match serde_json::to_string_pretty(snapshot) {
            Ok(rendered) => println!("{}", rendered),
            Err(e) => {
                error!("Failed to render snapshot: {}", e);
                return Some(ExitCode::from(EXIT_RUNTIME_ERROR));
            }
        },
    }
    None
}
