mod simulate;

use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context;
use clap::{Parser, Subcommand};
use defense_core::analysis::{extract_beats, load_beat_map, BeatJob, BeatTrack, SpectralFluxTracker};
use defense_core::config::GameConfig;
use defense_core::leaderboard::LeaderboardStore;
use log::{info, LevelFilter};

use crate::simulate::{run_simulation, SimulateOptions};

#[derive(Debug, Parser)]
#[command(name = "defense")]
#[command(about = "Beat defense toolkit: beat extraction, headless runs and leaderboard", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Extract beat timestamps from an Ogg Vorbis track.
    Beats {
        input: PathBuf,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Play a run headlessly with a scripted player.
    Simulate {
        /// Audio track or a `.beats.json` produced by `beats`.
        input: PathBuf,
        #[arg(long)]
        name: String,
        #[arg(long, default_value_t = 0)]
        seed: u64,
        /// Let every K-th enemy through.
        #[arg(long)]
        miss_every: Option<u32>,
        #[arg(long, default_value_t = 300)]
        max_seconds: u64,
        #[arg(long, default_value = ".")]
        store_dir: PathBuf,
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Print the best runs.
    Leaderboard {
        #[arg(long)]
        top: Option<usize>,
        #[arg(long, default_value = ".")]
        store_dir: PathBuf,
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(LevelFilter::Info)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Beats { input, output } => {
            let track = extract_beats(&input).with_context(|| format!("beat extraction failed: {}", input.display()))?;

            let json = serde_json::to_string_pretty(&track.to_beat_map()).context("failed to serialize beat map")?;
            let out_path = output.unwrap_or_else(|| default_output_path(&input));
            fs::write(&out_path, json).with_context(|| format!("failed to write: {}", out_path.display()))?;
            println!("{} beats -> {}", track.beats_ms.len(), out_path.display());
        }
        Command::Simulate {
            input,
            name,
            seed,
            miss_every,
            max_seconds,
            store_dir,
            config,
        } => {
            let config = load_config(config.as_deref())?;
            let track = load_track(&input)?;
            let options = SimulateOptions {
                seed,
                miss_every,
                max_seconds,
            };

            let record = run_simulation(&config, track, &input, &name, &options)?;
            if let Some(record) = record {
                let store = LeaderboardStore::new(&store_dir, &config);
                store
                    .record_run(&record)
                    .with_context(|| format!("failed to save run: {}", store_dir.display()))?;
                let json = serde_json::to_string_pretty(&record).context("failed to serialize run record")?;
                println!("{json}");
            }
        }
        Command::Leaderboard { top, store_dir, config } => {
            let config = load_config(config.as_deref())?;
            let store = LeaderboardStore::new(&store_dir, &config);
            let entries = store.top_entries(top.unwrap_or(config.leaderboard_size));
            if entries.is_empty() {
                println!("Leaderboard is empty.");
                return Ok(());
            }
            println!("Rank | Name       |   Score | Date                | Music");
            println!("-----|------------|---------|---------------------|------------------");
            for (rank, entry) in entries.iter().enumerate() {
                println!(
                    "{:>4} | {:<10} | {:>7} | {} | {}",
                    rank + 1,
                    entry.name,
                    entry.score,
                    entry.timestamp.format(defense_data::result::TIMESTAMP_FORMAT),
                    entry.track_name
                );
            }
        }
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> anyhow::Result<GameConfig> {
    match path {
        Some(path) => GameConfig::load(path),
        None => Ok(GameConfig::default()),
    }
}

/// Beat maps are read directly; anything else is analysed on a worker thread.
fn load_track(input: &Path) -> anyhow::Result<BeatTrack> {
    if input.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("json")) {
        let map = load_beat_map(input)?;
        return Ok(BeatTrack::from(map));
    }
    let job = BeatJob::spawn(input.to_path_buf(), Arc::new(SpectralFluxTracker::default()));
    info!("waiting for beat analysis of {}", job.path().display());
    job.wait()
        .with_context(|| format!("beat extraction failed: {}", input.display()))
}

fn default_output_path(input: &Path) -> PathBuf {
    let mut out = input.to_path_buf();
    out.set_extension("beats.json");
    out
}
