use chrono::NaiveDateTime;
use defense_data::model::{Direction, Tier};
use defense_data::profile::PlayerRunRecord;
use defense_data::result::{BlockCounts, DirectionCounts};

/// Per-run counters. `block_counts.total` always equals both the tier sum and
/// the per-direction sum because [`RunStatistics::record_block`] is the only
/// way to count a block.
#[derive(Debug, Clone, PartialEq)]
pub struct RunStatistics {
    pub score: u64,
    pub block_counts: BlockCounts,
    pub blocks_per_direction: DirectionCounts,
    pub reaction_times_ms: Vec<u64>,
    pub start_time: NaiveDateTime,
    pub end_time: Option<NaiveDateTime>,
}

impl RunStatistics {
    pub fn new(start_time: NaiveDateTime) -> Self {
        Self {
            score: 0,
            block_counts: BlockCounts::default(),
            blocks_per_direction: DirectionCounts::default(),
            reaction_times_ms: Vec::new(),
            start_time,
            end_time: None,
        }
    }

    pub fn record_block(&mut self, direction: Direction, tier: Tier, points: u64, reaction_time_ms: u64) {
        self.score += points;
        self.block_counts.record(tier);
        self.blocks_per_direction.record(direction);
        self.reaction_times_ms.push(reaction_time_ms);
    }

    pub fn add_bonus(&mut self, points: u64) {
        self.score += points;
    }

    /// 0 when nothing was blocked.
    pub fn average_reaction_time_ms(&self) -> f64 {
        if self.reaction_times_ms.is_empty() {
            return 0.0;
        }
        self.reaction_times_ms.iter().sum::<u64>() as f64 / self.reaction_times_ms.len() as f64
    }

    /// Seconds between start and end; 0 before the run has ended.
    pub fn duration_seconds(&self) -> f64 {
        self.end_time
            .map(|end| (end - self.start_time).num_milliseconds() as f64 / 1000.0)
            .unwrap_or(0.0)
    }

    pub fn is_finalized(&self) -> bool {
        self.end_time.is_some()
    }

    /// Sets the end time (never earlier than the start) and builds the record
    /// to persist. Later calls keep the first end time.
    pub fn finalize(&mut self, end_time: NaiveDateTime, name: &str, track_name: &str) -> PlayerRunRecord {
        let end_time = *self.end_time.get_or_insert(end_time.max(self.start_time));
        PlayerRunRecord {
            name: name.to_string(),
            score: self.score,
            total_blocks: self.block_counts.total,
            just_in_time: self.block_counts.just_in_time,
            normal: self.block_counts.normal,
            too_early: self.block_counts.too_early,
            up: self.blocks_per_direction.up,
            down: self.blocks_per_direction.down,
            left: self.blocks_per_direction.left,
            right: self.blocks_per_direction.right,
            start_time: self.start_time,
            end_time,
            duration_seconds: self.duration_seconds(),
            track_name: track_name.to_string(),
            average_reaction_time_ms: self.average_reaction_time_ms(),
        }
    }
}
