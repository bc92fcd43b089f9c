mod app;
mod components;
mod config;
mod engine;
mod fsm;
mod recording;
mod scene;
mod systems;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use app::Simulation;
use config::Tuning;
use engine::input::InputScript;
use engine::time::{FrameTimer, FIXED_DT};
use recording::Recorder;

#[derive(Parser)]
#[command(name = "mechanorot", about = "Headless platformer actor simulation")]
struct Args {
    /// TOML tuning file; built-in defaults when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Seed for patrol waypoints and attack variants
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Simulated seconds to run
    #[arg(long, default_value_t = 10.0)]
    seconds: f32,

    /// Scripted player input: idle, assault or parkour
    #[arg(long, default_value = "assault")]
    script: String,

    /// Write per-tick actor snapshots as JSON lines to this file
    #[arg(long)]
    record: Option<PathBuf>,

    /// Pace ticks against the wall clock instead of running flat out
    #[arg(long)]
    realtime: bool,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&args.log_level))
        .context("invalid log filter")?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let tuning = match &args.config {
        Some(path) => Tuning::load(path)
            .with_context(|| format!("loading tuning from {}", path.display()))?,
        None => Tuning::default(),
    };

    let script = match InputScript::builtin(&args.script) {
        Some(script) => script,
        None => {
            warn!(
                script = %args.script,
                known = ?InputScript::BUILTINS,
                "unknown input script, running without input"
            );
            InputScript::default()
        }
    };

    let mut sim = Simulation::new(tuning, args.seed, script);
    if let Some(path) = &args.record {
        let recorder = Recorder::create(path)?;
        info!(path = %path.display(), "recording snapshots");
        sim = sim.with_recorder(recorder);
    }

    if args.realtime {
        let mut timer = FrameTimer::new();
        while sim.time() < args.seconds {
            std::thread::sleep(Duration::from_secs_f32(FIXED_DT));
            timer.tick();
            sim.advance(timer.dt)?;
        }
    } else {
        sim.run_for(args.seconds)?;
    }

    if let Some(lines) = sim.finish()? {
        info!(lines, "recording written");
    }
    println!("{}", sim.summary());
    Ok(())
}
