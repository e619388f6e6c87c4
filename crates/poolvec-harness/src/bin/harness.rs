//! CLI entrypoint for the poolvec conformance harness.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use poolvec_harness::{OpScript, ScriptRunner, push_workload};
use poolvec_pool::{PoolConfig, PoolLogLevel};

/// Conformance tooling for poolvec.
#[derive(Debug, Parser)]
#[command(name = "poolvec-harness")]
#[command(about = "Replay and generate DynamicArray operation scripts")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Replay a script against DynamicArray and a Vec reference.
    Replay {
        /// Script JSON path.
        #[arg(long)]
        script: PathBuf,
        /// Output report path (if omitted, prints to stdout).
        #[arg(long)]
        output: Option<PathBuf>,
        /// Objects carved per refill for the replay pool.
        #[arg(long)]
        refill_objects: Option<usize>,
    },
    /// Generate a deterministic in-bounds script.
    Generate {
        /// Root seed (decimal or 0x...).
        #[arg(long, default_value = "0xDEAD_BEEF")]
        seed: String,
        /// Number of ops to generate.
        #[arg(long, default_value_t = 1_000)]
        steps: usize,
        /// Output path for the script JSON.
        #[arg(long)]
        output: PathBuf,
    },
    /// Push values into a fresh array and print pool statistics.
    Stats {
        /// Number of values to push.
        #[arg(long, default_value_t = 1_000)]
        pushes: usize,
        /// Lifecycle log threshold (`trace`, `debug`, `info`, `warn`, `error`, `off`).
        #[arg(long, default_value = "debug")]
        log_level: String,
        /// Output path (if omitted, prints to stdout).
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Replay {
            script,
            output,
            refill_objects,
        } => {
            eprintln!("Replaying {}", script.display());
            let script = OpScript::from_file(&script)?;
            let mut config = PoolConfig::from_env();
            if let Some(objects) = refill_objects {
                config = config.with_refill_objects(objects);
            }
            let report = ScriptRunner::new(config).run(&script)?;
            emit(&report.to_json()?, output.as_deref())?;
            if let Some(divergence) = &report.divergence {
                eprintln!(
                    "FAIL {} at step {} ({}): {}",
                    report.script, divergence.step, divergence.op, divergence.reason
                );
            } else {
                eprintln!("PASS {} ({} steps)", report.script, report.steps_run);
            }
            report.into_result()?;
        }
        Command::Generate {
            seed,
            steps,
            output,
        } => {
            let seed = parse_seed(&seed)?;
            let script = OpScript::generate(seed, steps);
            script.write_file(&output)?;
            eprintln!("Wrote {} ops to {}", script.ops.len(), output.display());
        }
        Command::Stats {
            pushes,
            log_level,
            output,
        } => {
            let config =
                PoolConfig::from_env().with_log_level(PoolLogLevel::from_str_loose(&log_level));
            let report = push_workload(config, pushes)?;
            emit(&report.to_json()?, output.as_deref())?;
        }
    }

    Ok(())
}

fn emit(json: &str, output: Option<&Path>) -> std::io::Result<()> {
    match output {
        Some(path) => std::fs::write(path, json),
        None => {
            println!("{json}");
            Ok(())
        }
    }
}

fn parse_seed(raw: &str) -> Result<u64, std::num::ParseIntError> {
    let raw = raw.trim().replace('_', "");
    match raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => raw.parse(),
    }
}
