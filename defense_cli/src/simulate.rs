use std::{collections::HashSet, path::Path};

use anyhow::Context;
use chrono::{Local, TimeDelta};
use defense_core::analysis::BeatTrack;
use defense_core::config::GameConfig;
use defense_core::gameplay::session::{GameSession, TickReport};
use defense_core::input::events::InputEvent;
use defense_core::input::InputQueue;
use defense_core::time::simulated::SimulatedPlayback;
use defense_data::model::Direction;
use defense_data::profile::PlayerRunRecord;
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;

pub struct SimulateOptions {
    pub seed: u64,
    pub miss_every: Option<u32>,
    pub max_seconds: u64,
}

/// Presses the matching direction once an enemy reaches the just-in-time
/// ring, or is one step from the player. Enemies picked by `miss_every` are
/// left alone.
struct AutoPlayer {
    miss_every: Option<u32>,
    spawned: u32,
    let_through: HashSet<(u64, Direction)>,
}

impl AutoPlayer {
    fn new(miss_every: Option<u32>) -> Self {
        Self {
            miss_every,
            spawned: 0,
            let_through: HashSet::new(),
        }
    }

    fn on_spawned(&mut self, directions: &[Direction], now_ms: u64) {
        for &direction in directions {
            self.spawned += 1;
            if self.miss_every.is_some_and(|k| k > 0 && self.spawned % k == 0) {
                self.let_through.insert((now_ms, direction));
            }
        }
    }

    fn presses(&self, session: &GameSession) -> Vec<Direction> {
        let config = session.config();
        let player = session.player();
        let step = config.enemy_speed * session.scheduler().loop_speed_multiplier;

        let mut pressed = Vec::new();
        for enemy in session.enemies().iter().filter(|e| e.active) {
            if self.let_through.contains(&(enemy.spawn_time_ms, enemy.direction)) {
                continue;
            }
            let distance = enemy.distance_to(player.position);
            let due = distance < config.just_in_time_radius || distance - step < player.size;
            if due && !pressed.contains(&enemy.direction) {
                pressed.push(enemy.direction);
            }
        }
        pressed
    }
}

/// Plays `track` to game over or `max_seconds` of simulated time. Returns the
/// finalized record only when the run actually ended.
pub fn run_simulation(
    config: &GameConfig,
    track: BeatTrack,
    track_path: &Path,
    player_name: &str,
    options: &SimulateOptions,
) -> anyhow::Result<Option<PlayerRunRecord>> {
    let tick_ms = config.tick_ms();
    if tick_ms == 0 {
        anyhow::bail!("tick_rate must be positive");
    }
    if track.duration_ms == 0 {
        anyhow::bail!("track has no duration: {}", track_path.display());
    }

    let mut clock = SimulatedPlayback::new(track.duration_ms);
    let queue = InputQueue::new();
    let mut player = AutoPlayer::new(options.miss_every);

    println!(
        "Simulation Start: {} ({} beats, {} ms)",
        track.track_name,
        track.beats_ms.len(),
        track.duration_ms
    );
    println!("Time(ms) | Event");
    println!("---------|------------------");

    let started_at = Local::now().naive_local();
    let mut session = GameSession::new(
        config.clone(),
        track,
        track_path,
        player_name,
        StdRng::seed_from_u64(options.seed),
    );
    session.start(&mut clock, started_at);

    let max_ms = options.max_seconds.saturating_mul(1000);
    let mut now_ms = 0;
    loop {
        for direction in player.presses(&session) {
            queue.push(InputEvent::local(now_ms, direction));
        }

        let report = session.tick(&mut clock, &queue.drain(), now_ms);
        player.on_spawned(&report.spawned, now_ms);
        print_report(now_ms, &report, &session);

        if report.ended {
            break;
        }
        if now_ms >= max_ms {
            println!("Stopped after {} s without game over; run not saved.", options.max_seconds);
            info!("simulation aborted at {} ms, score={}", now_ms, session.score());
            return Ok(None);
        }

        clock.advance(tick_ms);
        now_ms += tick_ms;
    }

    let elapsed = TimeDelta::milliseconds(i64::try_from(now_ms).unwrap_or(i64::MAX));
    let ended_at = started_at.checked_add_signed(elapsed).unwrap_or(started_at);
    let record = session.finish(ended_at).context("ended run has no statistics")?;
    print_summary(&record);
    Ok(Some(record))
}

fn print_summary(record: &PlayerRunRecord) {
    let blocks = record.block_counts();
    let directions = record.direction_counts();
    println!(
        "blocks: {} (just in time {}, normal {}, too early {})",
        blocks.total, blocks.just_in_time, blocks.normal, blocks.too_early
    );
    let per_direction: Vec<String> = Direction::ALL
        .iter()
        .map(|&d| format!("{d} {}", directions.get(d)))
        .collect();
    println!("by direction: {}", per_direction.join(", "));
    println!(
        "score {} in {:.1} s, average reaction {:.0} ms",
        record.score, record.duration_seconds, record.average_reaction_time_ms
    );
}

fn print_report(now_ms: u64, report: &TickReport, session: &GameSession) {
    for direction in &report.spawned {
        println!("{now_ms:>8} | spawn {direction}");
    }
    for block in report.judgments.iter().flat_map(|j| &j.blocks) {
        println!(
            "{now_ms:>8} | block {} {:?} {:.1}px +{}",
            block.direction, block.tier, block.distance, block.points
        );
    }
    if report.looped {
        println!(
            "{now_ms:>8} | loop {} x{:.1} score={}",
            session.scheduler().loops(),
            session.scheduler().loop_speed_multiplier,
            session.score()
        );
    }
    if report.ended {
        println!("{now_ms:>8} | game over score={}", session.score());
    }
}
