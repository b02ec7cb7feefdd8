use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
    thread,
};

use anyhow::Context;
use crossbeam_channel::{bounded, Receiver};
use defense_data::model::BeatMap;
use log::{info, warn};

use crate::analysis::tracker::{BeatTracker, SpectralFluxTracker, TrackedBeats};
use crate::audio::decode::decode_file;
use crate::error::AudioLoadError;

/// Beat timestamps of one track, owned by the run that plays it.
#[derive(Debug, Clone, PartialEq)]
pub struct BeatTrack {
    pub track_name: String,
    pub duration_ms: u64,
    pub tempo_bpm: Option<f64>,
    pub beats_ms: Vec<u64>,
}

impl BeatTrack {
    pub fn from_beats(track_name: impl Into<String>, duration_ms: u64, mut beats_ms: Vec<u64>) -> Self {
        beats_ms.sort_unstable();
        Self {
            track_name: track_name.into(),
            duration_ms,
            tempo_bpm: None,
            beats_ms,
        }
    }

    pub fn to_beat_map(&self) -> BeatMap {
        BeatMap {
            track_name: self.track_name.clone(),
            duration_ms: self.duration_ms,
            tempo_bpm: self.tempo_bpm,
            beats_ms: self.beats_ms.clone(),
        }
    }
}

impl From<BeatMap> for BeatTrack {
    fn from(map: BeatMap) -> Self {
        let mut track = BeatTrack::from_beats(map.track_name, map.duration_ms, map.beats_ms);
        track.tempo_bpm = map.tempo_bpm;
        track
    }
}

/// `round(position / sample_rate * 1000)` for every beat, kept non-decreasing.
pub fn beats_to_ms(beats: &TrackedBeats) -> Vec<u64> {
    if beats.sample_rate == 0 {
        return Vec::new();
    }
    let rate = beats.sample_rate as f64;
    let mut out: Vec<u64> = beats
        .positions
        .iter()
        .map(|&pos| (pos as f64 / rate * 1000.0).round() as u64)
        .collect();
    out.sort_unstable();
    out
}

pub fn track_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

pub fn extract_beats(path: &Path) -> Result<BeatTrack, AudioLoadError> {
    extract_beats_with(path, &SpectralFluxTracker::default())
}

pub fn extract_beats_with(path: &Path, tracker: &dyn BeatTracker) -> Result<BeatTrack, AudioLoadError> {
    info!("extracting beats from {}", path.display());
    let clip = decode_file(path)?;
    let tracked = tracker.track(&clip.to_mono(), clip.sample_rate());
    let beats_ms = beats_to_ms(&tracked);

    if beats_ms.is_empty() {
        warn!("no beats detected in {}", path.display());
    } else {
        info!(
            "{} beats detected in {} ({:.1} bpm)",
            beats_ms.len(),
            path.display(),
            tracked.tempo_bpm.unwrap_or_default()
        );
    }

    Ok(BeatTrack {
        track_name: track_name_of(path),
        duration_ms: clip.duration_ms(),
        tempo_bpm: tracked.tempo_bpm,
        beats_ms,
    })
}

pub fn load_beat_map(path: impl AsRef<Path>) -> anyhow::Result<BeatMap> {
    let path = path.as_ref();
    let bytes = fs::read(path).with_context(|| format!("failed to read beat map: {}", path.display()))?;
    let map: BeatMap = serde_json::from_slice(&bytes)
        .with_context(|| format!("failed to parse beat map json: {}", path.display()))?;
    if !map.is_sorted() {
        anyhow::bail!("beat map is not sorted: {}", path.display());
    }
    Ok(map)
}

/// Beat extraction running off the simulation thread. The run must call
/// [`BeatJob::wait`] before its first tick.
pub struct BeatJob {
    path: PathBuf,
    receiver: Receiver<Result<BeatTrack, AudioLoadError>>,
}

impl BeatJob {
    pub fn spawn(path: PathBuf, tracker: Arc<dyn BeatTracker>) -> Self {
        let (tx, rx) = bounded(1);
        let worker_path = path.clone();
        thread::spawn(move || {
            let result = extract_beats_with(&worker_path, tracker.as_ref());
            let _ = tx.send(result);
        });
        Self { path, receiver: rx }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn wait(self) -> Result<BeatTrack, AudioLoadError> {
        self.receiver.recv().unwrap_or(Err(AudioLoadError::WorkerLost))
    }
}
