use std::path::PathBuf;

use chrono::NaiveDateTime;
use defense_data::model::Direction;
use defense_data::profile::PlayerRunRecord;
use glam::Vec2;
use log::{debug, info};
use rand::rngs::StdRng;

use crate::analysis::BeatTrack;
use crate::config::GameConfig;
use crate::gameplay::enemy::Enemy;
use crate::gameplay::judge::{DefenseJudge, JudgmentResult};
use crate::gameplay::scheduler::SpawnScheduler;
use crate::gameplay::stats::RunStatistics;
use crate::input::events::InputEvent;
use crate::time::PlaybackClock;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
    Ended,
}

/// Fixed at the screen centre for the whole run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Player {
    pub position: Vec2,
    /// Collision radius.
    pub size: f32,
}

/// Where and when an enemy was blocked, for whoever draws the explosion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeathMark {
    pub position: Vec2,
    pub start_time_ms: u64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub spawned: Vec<Direction>,
    pub judgments: Vec<JudgmentResult>,
    pub death_marks: Vec<DeathMark>,
    pub looped: bool,
    /// Set only on the tick that ended the run.
    pub ended: bool,
}

/// One run from track start to game over. Owned by the caller and passed
/// into every tick; nothing here outlives the run.
pub struct GameSession {
    config: GameConfig,
    player: Player,
    judge: DefenseJudge,
    scheduler: SpawnScheduler,
    enemies: Vec<Enemy>,
    stats: Option<RunStatistics>,
    state: RunState,
    player_name: String,
    track_name: String,
    track_path: PathBuf,
    rng: StdRng,
}

impl GameSession {
    pub fn new(
        config: GameConfig,
        track: BeatTrack,
        track_path: impl Into<PathBuf>,
        player_name: impl Into<String>,
        rng: StdRng,
    ) -> Self {
        let player = Player {
            position: config.player_position(),
            size: config.player_size,
        };
        Self {
            judge: DefenseJudge::from_config(&config),
            scheduler: SpawnScheduler::new(track.beats_ms, config.loop_speed_increment),
            player,
            config,
            enemies: Vec::new(),
            stats: None,
            state: RunState::Idle,
            player_name: player_name.into(),
            track_name: track.track_name,
            track_path: track_path.into(),
            rng,
        }
    }

    /// Starts playback and the run clock. Only valid from `Idle`.
    pub fn start(&mut self, clock: &mut dyn PlaybackClock, now: NaiveDateTime) -> bool {
        if self.state != RunState::Idle {
            return false;
        }
        self.stats = Some(RunStatistics::new(now));
        self.state = RunState::Running;
        clock.load(&self.track_path);
        clock.play();
        info!(
            "run started: player={} track={} beats={}",
            self.player_name,
            self.track_name,
            self.scheduler.beats().len()
        );
        true
    }

    /// Advances the simulation by one tick: judge inputs in arrival order,
    /// spawn for crossed beats, restart the track if it finished, move
    /// enemies, then check for game over.
    pub fn tick(&mut self, clock: &mut dyn PlaybackClock, inputs: &[InputEvent], now_ms: u64) -> TickReport {
        let mut report = TickReport::default();
        if self.state != RunState::Running {
            return report;
        }

        for input in inputs {
            if let Some(result) = self.defend(input.direction, input.timestamp_ms) {
                report.death_marks.extend(result.blocks.iter().map(|b| DeathMark {
                    position: b.position,
                    start_time_ms: now_ms,
                }));
                report.judgments.push(result);
            }
        }

        report.spawned = self.scheduler.poll(clock.current_position_ms(), &mut self.rng);
        for &direction in &report.spawned {
            self.enemies.push(Enemy::spawn(direction, &self.config, now_ms));
        }

        if !clock.is_playing() {
            self.on_track_loop();
            clock.load(&self.track_path);
            clock.play();
            report.looped = true;
        }

        let multiplier = self.scheduler.loop_speed_multiplier;
        for enemy in self.enemies.iter_mut().filter(|e| e.active) {
            enemy.update(self.player.position, multiplier);
        }
        self.enemies.retain(|e| e.active);

        if self.player_hit() {
            self.state = RunState::Ended;
            report.ended = true;
            info!(
                "game over: player={} score={}",
                self.player_name,
                self.score()
            );
        }
        report
    }

    /// Judges one defense request against the current enemies and credits
    /// the run for every block.
    pub fn defend(&mut self, direction: Direction, now_ms: u64) -> Option<JudgmentResult> {
        let stats = self.stats.as_mut()?;
        let result = self
            .judge
            .judge(direction, &mut self.enemies, self.player.position, now_ms)?;
        for block in &result.blocks {
            stats.record_block(block.direction, block.tier, block.points, block.reaction_time_ms);
            debug!(
                "blocked {} at {:.1}px: {:?} +{}",
                block.direction, block.distance, block.tier, block.points
            );
        }
        Some(result)
    }

    /// Replays the beat list faster and awards the loop bonus.
    pub fn on_track_loop(&mut self) {
        self.scheduler.on_track_loop();
        if let Some(stats) = self.stats.as_mut() {
            stats.add_bonus(self.config.loop_bonus);
        }
        info!(
            "track looped: multiplier={:.1} score={}",
            self.scheduler.loop_speed_multiplier,
            self.score()
        );
    }

    fn player_hit(&self) -> bool {
        self.enemies
            .iter()
            .any(|e| e.active && e.distance_to(self.player.position) < self.player.size)
    }

    /// Finalizes the statistics of an ended run. `None` unless the run has
    /// reached `Ended`.
    pub fn finish(&mut self, end_time: NaiveDateTime) -> Option<PlayerRunRecord> {
        if self.state != RunState::Ended {
            return None;
        }
        let stats = self.stats.as_mut()?;
        Some(stats.finalize(end_time, &self.player_name, &self.track_name))
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn score(&self) -> u64 {
        self.stats.as_ref().map_or(0, |s| s.score)
    }

    pub fn stats(&self) -> Option<&RunStatistics> {
        self.stats.as_ref()
    }

    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    /// For scripted scenarios that place enemies directly.
    pub fn enemies_mut(&mut self) -> &mut Vec<Enemy> {
        &mut self.enemies
    }

    pub fn scheduler(&self) -> &SpawnScheduler {
        &self.scheduler
    }

    pub fn player(&self) -> Player {
        self.player
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn player_name(&self) -> &str {
        &self.player_name
    }

    pub fn track_name(&self) -> &str {
        &self.track_name
    }
}
