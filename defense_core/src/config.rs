use std::{fs, path::Path};

use anyhow::Context;
use glam::Vec2;
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub screen_width: f32,
    pub screen_height: f32,
    /// Collision radius of the player in pixels.
    pub player_size: f32,
    /// Enemy speed in pixels per tick before the loop multiplier.
    pub enemy_speed: f32,
    pub block_radius: f32,
    pub just_in_time_radius: f32,
    pub normal_radius: f32,
    /// Distances below this are scored as if they were exactly this far.
    pub min_scoring_distance: f32,
    pub loop_speed_increment: f32,
    pub loop_bonus: u64,
    pub tick_rate: u32,
    pub leaderboard_size: usize,
    pub leaderboard_file: String,
    pub players_dir: String,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            screen_width: 800.0,
            screen_height: 600.0,
            player_size: 20.0,
            enemy_speed: 5.0,
            block_radius: 200.0,
            just_in_time_radius: 50.0,
            normal_radius: 125.0,
            min_scoring_distance: 1.0,
            loop_speed_increment: 0.2,
            loop_bonus: 1000,
            tick_rate: 60,
            leaderboard_size: 5,
            leaderboard_file: "leaderboard.csv".to_string(),
            players_dir: "players".to_string(),
        }
    }
}

impl GameConfig {
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).with_context(|| format!("failed to read config: {}", path.display()))?;
        let config: GameConfig = serde_json::from_slice(&bytes)
            .with_context(|| format!("failed to parse config json: {}", path.display()))?;
        Ok(config)
    }

    /// Screen centre, where the player stands.
    pub fn player_position(&self) -> Vec2 {
        Vec2::new(self.screen_width / 2.0, self.screen_height / 2.0)
    }

    pub fn tick_ms(&self) -> u64 {
        if self.tick_rate == 0 {
            return 0;
        }
        (1000.0 / self.tick_rate as f64).round() as u64
    }
}
