//! Headless grid-chase roguelike simulation.

mod ai;
mod config;
mod data;
mod ecs;
mod error;
mod map;
mod scripted_input;
mod sim;

use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use config::SimConfig;
use scripted_input::ScriptedInput;
use sim::Scheduler;

/// Run monsters against a scripted player on a generated level
#[derive(Parser)]
#[command(name = "grimstep")]
#[command(version)]
struct Cli {
    /// JSON config file; defaults are used for anything it omits
    #[arg(long)]
    config: Option<PathBuf>,

    /// Player command script (w/a/s/d, h/j/k/l, '.' to wait)
    #[arg(long)]
    script: Option<PathBuf>,

    /// Override the configured tick limit
    #[arg(long)]
    ticks: Option<u64>,

    /// Override the configured level seed
    #[arg(long)]
    seed: Option<u64>,

    /// Write the run report here instead of stdout
    #[arg(long)]
    report: Option<PathBuf>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => SimConfig::load(path)?,
        None => SimConfig::default(),
    };
    if let Some(ticks) = cli.ticks {
        config.max_ticks = ticks;
    }
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    config.validate()?;

    let script = cli
        .script
        .as_deref()
        .map(ScriptedInput::from_file)
        .transpose()?;
    if let Some(script) = &script {
        info!(commands = script.remaining(), "player script loaded");
    }

    let report = Scheduler::new(config, script).run();
    let json = serde_json::to_string_pretty(&report)?;
    match cli.report {
        Some(path) => {
            fs::write(&path, json)
                .with_context(|| format!("failed to write report to {}", path.display()))?;
            info!(path = %path.display(), "report written");
        }
        None => println!("{json}"),
    }

    Ok(())
}
