use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use atomic_float::AtomicF64;
use crossbeam_channel::{unbounded, Receiver, Sender};

use crate::time::PlaybackClock;

/// Requests forwarded to whatever actually plays the audio.
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackCommand {
    Load(PathBuf),
    Play,
}

/// State the external audio service publishes for the conductor to read.
#[derive(Debug, Clone, Default)]
pub struct PlaybackShared {
    /// Position into the current track, in seconds.
    pub position: Arc<AtomicF64>,
    pub playing: Arc<AtomicBool>,
}

pub struct Conductor {
    command_tx: Sender<PlaybackCommand>,
    shared: PlaybackShared,
    last_audio_time: f64,
    /// System time at which `last_audio_time` was observed.
    last_update_time: Option<f64>,
    /// Latest system time passed to [`Conductor::update`].
    now: f64,
}

impl Conductor {
    /// Returns the conductor and the receiving end the audio service drains.
    pub fn new(shared: &PlaybackShared) -> (Self, Receiver<PlaybackCommand>) {
        let (tx, rx) = unbounded();
        (
            Self {
                command_tx: tx,
                shared: shared.clone(),
                last_audio_time: 0.0,
                last_update_time: None,
                now: 0.0,
            },
            rx,
        )
    }

    /// Samples the published audio position once per tick. The interpolation
    /// base only moves when the audio service publishes a new position, so
    /// the reported position keeps advancing between coarse buffer updates.
    pub fn update(&mut self, current_system_time: f64) {
        let audio_time = self.shared.position.load(Ordering::Acquire);
        if self.last_update_time.is_none() || audio_time != self.last_audio_time {
            self.last_audio_time = audio_time;
            self.last_update_time = Some(current_system_time);
        }
        self.now = current_system_time;
    }

    /// Audio time extrapolated from the last observed position. Does not
    /// advance while playback is stopped.
    pub fn get_time(&self, current_system_time: f64) -> f64 {
        let Some(base) = self.last_update_time else {
            return self.last_audio_time;
        };
        if !self.is_playing() {
            return self.last_audio_time;
        }
        self.last_audio_time + (current_system_time - base).max(0.0)
    }
}

impl PlaybackClock for Conductor {
    fn current_position_ms(&self) -> u64 {
        (self.get_time(self.now).max(0.0) * 1000.0) as u64
    }

    fn is_playing(&self) -> bool {
        self.shared.playing.load(Ordering::Acquire)
    }

    fn load(&mut self, path: &Path) {
        let _ = self.command_tx.send(PlaybackCommand::Load(path.to_path_buf()));
    }

    /// Marks playback as started from the top before the service has
    /// handled the command, so the finished state is never observed twice.
    fn play(&mut self) {
        self.shared.position.store(0.0, Ordering::Release);
        self.shared.playing.store(true, Ordering::Release);
        self.last_audio_time = 0.0;
        self.last_update_time = Some(self.now);
        let _ = self.command_tx.send(PlaybackCommand::Play);
    }
}
