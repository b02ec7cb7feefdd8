use serde::{Deserialize, Serialize};
use chrono::NaiveDateTime;
use crate::result::{timestamp_format, BlockCounts, DirectionCounts, LeaderboardEntry};

/// Full summary of one finished run, stored in the player's own history file.
/// Column order matches the per-player CSV header.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerRunRecord {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Score")]
    pub score: u64,
    #[serde(rename = "Total Blocks")]
    pub total_blocks: u32,
    #[serde(rename = "Just in Time")]
    pub just_in_time: u32,
    #[serde(rename = "Normal")]
    pub normal: u32,
    #[serde(rename = "Too Early")]
    pub too_early: u32,
    #[serde(rename = "Up")]
    pub up: u32,
    #[serde(rename = "Down")]
    pub down: u32,
    #[serde(rename = "Left")]
    pub left: u32,
    #[serde(rename = "Right")]
    pub right: u32,
    #[serde(rename = "Start Time", with = "timestamp_format")]
    pub start_time: NaiveDateTime,
    #[serde(rename = "End Time", with = "timestamp_format")]
    pub end_time: NaiveDateTime,
    #[serde(rename = "Duration")]
    pub duration_seconds: f64,
    #[serde(rename = "Music")]
    pub track_name: String,
    #[serde(rename = "Average Reaction Time")]
    pub average_reaction_time_ms: f64,
}

impl PlayerRunRecord {
    pub fn block_counts(&self) -> BlockCounts {
        BlockCounts {
            total: self.total_blocks,
            just_in_time: self.just_in_time,
            normal: self.normal,
            too_early: self.too_early,
        }
    }

    pub fn direction_counts(&self) -> DirectionCounts {
        DirectionCounts {
            up: self.up,
            down: self.down,
            left: self.left,
            right: self.right,
        }
    }

    /// The global leaderboard row derived from this run, dated at its end.
    pub fn leaderboard_entry(&self) -> LeaderboardEntry {
        LeaderboardEntry {
            name: self.name.clone(),
            score: self.score,
            timestamp: self.end_time,
            track_name: self.track_name.clone(),
        }
    }
}
