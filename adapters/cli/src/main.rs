#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs Realm Defence headlessly.

mod build_order;
mod runner;

use std::{fs, path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use realm_defence_core::{GameConfig, PathLayout};
use realm_defence_world::World;

use crate::{
    build_order::BuildOrder,
    runner::{run, RunOptions},
};

/// Runs a Realm Defence campaign without a window and prints a summary.
#[derive(Debug, Parser)]
#[command(name = "realm-defence", version, about)]
struct Args {
    /// TOML file overriding the built-in tuning tables.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Seed for every random roll made during the run.
    #[arg(long)]
    seed: Option<u64>,

    /// Game speed multiplier applied to every tick.
    #[arg(long)]
    speed: Option<f32>,

    /// Tower to build as `kind@column,row`; may be repeated.
    #[arg(long = "build", value_name = "KIND@COL,ROW")]
    builds: Vec<BuildOrder>,

    /// Real time advanced per tick, in milliseconds.
    #[arg(long, default_value_t = 50, value_parser = clap::value_parser!(u64).range(1..))]
    step_ms: u64,

    /// Real time after which the run is stopped, in seconds.
    #[arg(long, default_value_t = 900)]
    max_seconds: u64,

    /// Path layout to use instead of the configured one.
    #[arg(long, value_enum)]
    layout: Option<LayoutChoice>,

    /// Skips every preparation countdown.
    #[arg(long)]
    auto_skip: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum LayoutChoice {
    /// Fixed winding path; towers go beside it.
    Zigzag,
    /// Free placement as long as a route remains.
    Open,
}

/// Entry point for the Realm Defence command-line interface.
fn main() -> Result<()> {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .try_init();

    let args = Args::parse();
    let config = load_config(&args)?;
    let mut world = World::with_config(config).context("invalid game configuration")?;

    let options = RunOptions {
        step: Duration::from_millis(args.step_ms),
        max_time: Duration::from_secs(args.max_seconds),
        auto_skip: args.auto_skip,
        speed: args.speed,
        orders: args.builds,
    };
    let summary = run(&mut world, &options)?;
    println!("{summary}");
    Ok(())
}

fn load_config(args: &Args) -> Result<GameConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            toml::from_str(&text)
                .with_context(|| format!("failed to parse config {}", path.display()))?
        }
        None => GameConfig::default(),
    };

    if let Some(seed) = args.seed {
        config.rng_seed = seed;
    }
    if let Some(layout) = args.layout {
        config.grid.layout = apply_layout(&config.grid.layout, layout);
    }
    Ok(config)
}

/// Switches layouts while keeping the configured entrance and exit.
fn apply_layout(current: &PathLayout, choice: LayoutChoice) -> PathLayout {
    match (current, choice) {
        (PathLayout::Zigzag { corners }, LayoutChoice::Open) => {
            match (corners.first(), corners.last()) {
                (Some(spawn), Some(exit)) => PathLayout::Open {
                    spawn: *spawn,
                    exit: *exit,
                },
                _ => current.clone(),
            }
        }
        (PathLayout::Open { .. }, LayoutChoice::Zigzag) => PathLayout::default(),
        _ => current.clone(),
    }
}
