pub mod conductor;
pub mod simulated;

use std::path::Path;

/// Playback service as seen by the simulation: a position into the current
/// track and whether it is still playing.
pub trait PlaybackClock {
    fn current_position_ms(&self) -> u64;
    fn is_playing(&self) -> bool;
    fn load(&mut self, path: &Path);
    fn play(&mut self);
}
