use defense_data::model::Direction;
use glam::Vec2;

use crate::config::GameConfig;

/// Below this distance the heading towards the player is undefined.
pub const MIN_HEADING_DISTANCE: f32 = 1e-4;

#[derive(Debug, Clone, PartialEq)]
pub struct Enemy {
    pub direction: Direction,
    pub position: Vec2,
    pub speed: f32,
    pub active: bool,
    pub spawn_time_ms: u64,
}

impl Enemy {
    /// Spawns at the midpoint of the screen edge named by `direction`.
    pub fn spawn(direction: Direction, config: &GameConfig, spawn_time_ms: u64) -> Self {
        Self {
            direction,
            position: spawn_position(direction, config),
            speed: config.enemy_speed,
            active: true,
            spawn_time_ms,
        }
    }

    pub fn distance_to(&self, target: Vec2) -> f32 {
        self.position.distance(target)
    }

    /// Moves `speed * multiplier` pixels straight at `target`, never past it.
    /// An enemy already sitting on the target stays put.
    pub fn update(&mut self, target: Vec2, multiplier: f32) {
        let offset = target - self.position;
        let distance = offset.length();
        if distance <= MIN_HEADING_DISTANCE {
            return;
        }
        let step = (self.speed * multiplier).min(distance);
        self.position += offset / distance * step;
    }
}

pub fn spawn_position(direction: Direction, config: &GameConfig) -> Vec2 {
    let (w, h) = (config.screen_width, config.screen_height);
    match direction {
        Direction::Up => Vec2::new(w / 2.0, 0.0),
        Direction::Down => Vec2::new(w / 2.0, h),
        Direction::Left => Vec2::new(0.0, h / 2.0),
        Direction::Right => Vec2::new(w, h / 2.0),
    }
}
