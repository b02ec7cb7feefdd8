use serde::{Deserialize, Serialize};
use chrono::NaiveDateTime;
use crate::model::{Direction, Tier};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockCounts {
    pub total: u32,
    pub just_in_time: u32,
    pub normal: u32,
    pub too_early: u32,
}

impl BlockCounts {
    pub fn record(&mut self, tier: Tier) {
        self.total += 1;
        match tier {
            Tier::JustInTime => self.just_in_time += 1,
            Tier::Normal => self.normal += 1,
            Tier::TooEarly => self.too_early += 1,
        }
    }

    pub fn tier_sum(&self) -> u32 {
        self.just_in_time + self.normal + self.too_early
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectionCounts {
    pub up: u32,
    pub down: u32,
    pub left: u32,
    pub right: u32,
}

impl DirectionCounts {
    pub fn record(&mut self, direction: Direction) {
        *self.slot(direction) += 1;
    }

    pub fn get(&self, direction: Direction) -> u32 {
        match direction {
            Direction::Up => self.up,
            Direction::Down => self.down,
            Direction::Left => self.left,
            Direction::Right => self.right,
        }
    }

    pub fn sum(&self) -> u32 {
        self.up + self.down + self.left + self.right
    }

    fn slot(&mut self, direction: Direction) -> &mut u32 {
        match direction {
            Direction::Up => &mut self.up,
            Direction::Down => &mut self.down,
            Direction::Left => &mut self.left,
            Direction::Right => &mut self.right,
        }
    }
}

/// One row of the global leaderboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Score")]
    pub score: u64,
    #[serde(rename = "Date", with = "timestamp_format")]
    pub timestamp: NaiveDateTime,
    #[serde(rename = "Music")]
    pub track_name: String,
}

/// `YYYY-MM-DD HH:MM:SS` text form used in every persisted file.
pub mod timestamp_format {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::TIMESTAMP_FORMAT;

    pub fn serialize<S>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&value.format(TIMESTAMP_FORMAT))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(s.trim(), TIMESTAMP_FORMAT).map_err(serde::de::Error::custom)
    }
}
