use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Direction::Up, Direction::Down, Direction::Left, Direction::Right];

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }

    /// Parses a line sent by the external controller. Only the four literal
    /// tokens are accepted, in any case; surrounding whitespace is ignored.
    pub fn from_device_token(token: &str) -> Option<Direction> {
        let token = token.trim();
        Direction::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(token))
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Precision class of a successful block, from the enemy's distance to the
/// player at the moment of input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    JustInTime,
    Normal,
    TooEarly,
}

/// Offline beat analysis of one track, cached as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeatMap {
    pub track_name: String,
    pub duration_ms: u64,
    #[serde(default)]
    pub tempo_bpm: Option<f64>,
    pub beats_ms: Vec<u64>,
}

impl BeatMap {
    pub fn is_sorted(&self) -> bool {
        self.beats_ms.windows(2).all(|w| w[0] <= w[1])
    }
}
