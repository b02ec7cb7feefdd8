pub mod extract;
pub mod tracker;

pub use extract::{BeatJob, BeatTrack, extract_beats, extract_beats_with, load_beat_map};
pub use tracker::{BeatTracker, SpectralFluxTracker, TrackedBeats};
