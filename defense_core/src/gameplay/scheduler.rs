use defense_data::model::Direction;
use rand::Rng;

/// Turns beat timestamps plus the playback position into spawn requests.
#[derive(Debug, Clone)]
pub struct SpawnScheduler {
    beats: Vec<u64>,
    /// Index of the first beat not yet emitted.
    pub next_beat_index: usize,
    pub loop_speed_multiplier: f32,
    loop_speed_increment: f32,
    loops: u32,
}

impl SpawnScheduler {
    pub fn new(beats: Vec<u64>, loop_speed_increment: f32) -> Self {
        Self {
            beats,
            next_beat_index: 0,
            loop_speed_multiplier: 1.0,
            loop_speed_increment,
            loops: 0,
        }
    }

    pub fn beats(&self) -> &[u64] {
        &self.beats
    }

    pub fn loops(&self) -> u32 {
        self.loops
    }

    /// Emits one random direction per beat at or before `playback_ms` that
    /// has not been emitted yet. After a stall several beats come out of a
    /// single call; none is dropped.
    pub fn poll<R: Rng + ?Sized>(&mut self, playback_ms: u64, rng: &mut R) -> Vec<Direction> {
        let mut spawned = Vec::new();
        while self.next_beat_index < self.beats.len() && playback_ms >= self.beats[self.next_beat_index] {
            spawned.push(Direction::ALL[rng.random_range(0..Direction::ALL.len())]);
            self.next_beat_index += 1;
        }
        spawned
    }

    /// The track finished and restarts: replay beats from the top, faster.
    pub fn on_track_loop(&mut self) {
        self.next_beat_index = 0;
        self.loop_speed_multiplier += self.loop_speed_increment;
        self.loops += 1;
    }

    pub fn remaining(&self) -> usize {
        self.beats.len() - self.next_beat_index
    }
}
