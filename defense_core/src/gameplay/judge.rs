use defense_data::model::{Direction, Tier};
use glam::Vec2;

use crate::config::GameConfig;
use crate::gameplay::enemy::Enemy;

const SCORE_NUMERATOR: f64 = 20.0;
const SCORE_DISTANCE_SCALE: f64 = 0.02;

/// One enemy neutralised by a defense input.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    /// Index into the enemy slice passed to [`DefenseJudge::judge`].
    pub enemy_index: usize,
    pub direction: Direction,
    pub position: Vec2,
    pub distance: f32,
    pub tier: Tier,
    pub points: u64,
    pub reaction_time_ms: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct JudgmentResult {
    pub direction: Direction,
    pub timestamp_ms: u64,
    pub blocks: Vec<Block>,
}

impl JudgmentResult {
    pub fn total_points(&self) -> u64 {
        self.blocks.iter().map(|b| b.points).sum()
    }
}

#[derive(Debug, Clone)]
pub struct DefenseJudge {
    pub block_radius: f32,
    pub just_in_time_radius: f32,
    pub normal_radius: f32,
    pub min_scoring_distance: f32,
}

impl Default for DefenseJudge {
    fn default() -> Self {
        Self::from_config(&GameConfig::default())
    }
}

impl DefenseJudge {
    pub fn from_config(config: &GameConfig) -> Self {
        Self {
            block_radius: config.block_radius,
            just_in_time_radius: config.just_in_time_radius,
            normal_radius: config.normal_radius,
            min_scoring_distance: config.min_scoring_distance,
        }
    }

    /// Blocks every active enemy coming from `direction` that is inside the
    /// block radius, in slice order. Several enemies can fall to one input.
    /// Returns `None` when nothing was blocked.
    pub fn judge(
        &self,
        direction: Direction,
        enemies: &mut [Enemy],
        player: Vec2,
        now_ms: u64,
    ) -> Option<JudgmentResult> {
        let mut blocks = Vec::new();

        for (enemy_index, enemy) in enemies.iter_mut().enumerate() {
            if !enemy.active || enemy.direction != direction {
                continue;
            }
            let distance = enemy.distance_to(player);
            let Some(tier) = self.classify(distance) else {
                continue;
            };

            enemy.active = false;
            blocks.push(Block {
                enemy_index,
                direction,
                position: enemy.position,
                distance,
                tier,
                points: self.points_for(distance),
                reaction_time_ms: now_ms.saturating_sub(enemy.spawn_time_ms),
            });
        }

        if blocks.is_empty() {
            return None;
        }
        Some(JudgmentResult {
            direction,
            timestamp_ms: now_ms,
            blocks,
        })
    }

    /// `[0, jit)` just in time, `[jit, normal)` normal, `[normal, block)`
    /// too early, anything farther is out of reach.
    pub fn classify(&self, distance: f32) -> Option<Tier> {
        if distance.is_nan() || distance >= self.block_radius {
            None
        } else if distance < self.just_in_time_radius {
            Some(Tier::JustInTime)
        } else if distance < self.normal_radius {
            Some(Tier::Normal)
        } else {
            Some(Tier::TooEarly)
        }
    }

    /// `floor(20 / (distance * 0.02))`, with the distance clamped from below
    /// so a block on top of the player scores the cap instead of dividing by 0.
    pub fn points_for(&self, distance: f32) -> u64 {
        let distance = distance.max(self.min_scoring_distance).max(f32::EPSILON) as f64;
        (SCORE_NUMERATOR / (distance * SCORE_DISTANCE_SCALE)).floor() as u64
    }
}
