use std::path::{Path, PathBuf};

use crate::time::PlaybackClock;

/// Deterministic playback for headless runs: the position only moves when
/// the caller advances it, and the track stops once it runs past its end.
#[derive(Debug, Clone)]
pub struct SimulatedPlayback {
    duration_ms: u64,
    position_ms: u64,
    playing: bool,
    loaded: Option<PathBuf>,
    plays: u32,
}

impl SimulatedPlayback {
    pub fn new(duration_ms: u64) -> Self {
        Self {
            duration_ms,
            position_ms: 0,
            playing: false,
            loaded: None,
            plays: 0,
        }
    }

    pub fn advance(&mut self, ms: u64) {
        if !self.playing {
            return;
        }
        self.position_ms = self.position_ms.saturating_add(ms);
        if self.position_ms >= self.duration_ms {
            self.position_ms = self.duration_ms;
            self.playing = false;
        }
    }

    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    pub fn loaded(&self) -> Option<&Path> {
        self.loaded.as_deref()
    }

    /// Number of times playback has been (re)started.
    pub fn plays(&self) -> u32 {
        self.plays
    }
}

impl PlaybackClock for SimulatedPlayback {
    fn current_position_ms(&self) -> u64 {
        self.position_ms
    }

    fn is_playing(&self) -> bool {
        self.playing
    }

    fn load(&mut self, path: &Path) {
        self.loaded = Some(path.to_path_buf());
        self.position_ms = 0;
        self.playing = false;
    }

    fn play(&mut self) {
        self.position_ms = 0;
        self.playing = self.duration_ms > 0;
        self.plays += 1;
    }
}
