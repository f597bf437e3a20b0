//! tetrs-replay - run a command script through the engine headlessly
//!
//! Prints the final board and score, or the full snapshot as JSON.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tetrs_engine::{Engine, EngineConfig, Script};

/// Replay a command script against a seeded engine.
#[derive(Parser, Debug)]
#[command(name = "tetrs-replay", version, about, long_about = None)]
struct Args {
    /// Script file, one command per line (left, right, down, rotate, drop, pause, tick <ms>)
    script: PathBuf,
    /// Engine config file (defaults to the platform config dir)
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Override the piece generator seed
    #[arg(short, long)]
    seed: Option<u64>,
    /// Gravity step while waiting, in milliseconds
    #[arg(long, default_value_t = 16)]
    frame_ms: u64,
    /// Print the final snapshot as JSON
    #[arg(long)]
    json: bool,
}

/// Get the tetrs temp directory, creating it if needed
fn tetrs_temp_dir() -> PathBuf {
    let dir = std::env::temp_dir().join("tetrs");
    let _ = std::fs::create_dir_all(&dir);
    dir
}

fn main() -> Result<()> {
    let args = Args::parse();

    let run_id: u32 = rand::random();
    let log_dir = tetrs_temp_dir();
    let log_file = format!("replay-{:08x}.log", run_id);

    // Setup tracing to log file
    let file_appender = tracing_appender::rolling::never(&log_dir, &log_file);
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("tetrs_engine=debug".parse()?),
        )
        .with_ansi(false)
        .init();

    tracing::info!(
        "tetrs-replay starting, script={}, log={}",
        args.script.display(),
        log_dir.join(&log_file).display()
    );

    let mut config = match &args.config {
        Some(path) => EngineConfig::load_from(path)?,
        None => EngineConfig::load()?,
    };
    if args.seed.is_some() {
        config.seed = args.seed;
    }

    let text = std::fs::read_to_string(&args.script)
        .with_context(|| format!("failed to read script {}", args.script.display()))?;
    let script = Script::parse(&text)
        .with_context(|| format!("failed to parse script {}", args.script.display()))?;

    let mut engine = Engine::new(&config);
    tracing::info!(
        seed = engine.seed(),
        width = config.width,
        height = config.height,
        steps = script.steps.len(),
        "replaying"
    );
    let stats = script.run(&mut engine, Duration::from_millis(args.frame_ms));
    let snapshot = engine.snapshot();
    tracing::info!(
        accepted = stats.accepted,
        rejected = stats.rejected,
        score = snapshot.score,
        phase = ?snapshot.phase,
        "replay finished"
    );

    if args.json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        println!("{}", snapshot);
        println!(
            "seed {} | {} accepted, {} rejected | {:.3}s simulated",
            engine.seed(),
            stats.accepted,
            stats.rejected,
            stats.elapsed.as_secs_f64()
        );
    }
    Ok(())
}
