use chrono::{NaiveDate, NaiveDateTime};
use defense_core::analysis::BeatTrack;
use defense_core::config::GameConfig;
use defense_core::gameplay::enemy::Enemy;
use defense_core::gameplay::session::{GameSession, RunState};
use defense_core::input::events::InputEvent;
use defense_core::time::conductor::{Conductor, PlaybackShared};
use defense_core::time::simulated::SimulatedPlayback;
use defense_core::time::PlaybackClock;
use defense_data::model::{Direction, Tier};
use glam::Vec2;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::atomic::Ordering;

const TICK_MS: u64 = 17;

fn start_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 5, 1).unwrap().and_hms_opt(20, 0, 0).unwrap()
}

fn session_with(beats: Vec<u64>, duration_ms: u64) -> (GameSession, SimulatedPlayback) {
    let track = BeatTrack::from_beats("song.ogg", duration_ms, beats);
    let session = GameSession::new(
        GameConfig::default(),
        track,
        "music/song.ogg",
        "ana",
        StdRng::seed_from_u64(11),
    );
    (session, SimulatedPlayback::new(duration_ms))
}

#[test]
fn test_start_loads_and_plays_track() {
    let (mut session, mut clock) = session_with(vec![0], 1000);
    assert_eq!(session.state(), RunState::Idle);

    assert!(session.start(&mut clock, start_time()));
    assert_eq!(session.state(), RunState::Running);
    assert!(clock.is_playing());
    assert_eq!(clock.plays(), 1);
    assert_eq!(clock.loaded().unwrap().to_str(), Some("music/song.ogg"));

    assert!(!session.start(&mut clock, start_time()));
}

#[test]
fn test_tick_before_start_does_nothing() {
    let (mut session, mut clock) = session_with(vec![0], 1000);
    let report = session.tick(&mut clock, &[], 0);

    assert!(report.spawned.is_empty());
    assert!(session.enemies().is_empty());
    assert_eq!(session.score(), 0);
}

#[test]
fn test_beats_spawn_enemies_from_screen_edges() {
    let (mut session, mut clock) = session_with(vec![0, 500, 1000], 5000);
    session.start(&mut clock, start_time());

    let report = session.tick(&mut clock, &[], 0);
    assert_eq!(report.spawned.len(), 1);
    assert_eq!(session.enemies().len(), 1);

    // Stall: 750 ms pass before the next tick.
    clock.advance(750);
    let report = session.tick(&mut clock, &[], 750);
    assert_eq!(report.spawned.len(), 1);
    assert_eq!(session.scheduler().next_beat_index, 2);
    assert_eq!(session.enemies()[1].spawn_time_ms, 750);
}

#[test]
fn test_matching_input_blocks_enemy() {
    let (mut session, mut clock) = session_with(Vec::new(), 5000);
    session.start(&mut clock, start_time());
    session.enemies_mut().push(Enemy {
        direction: Direction::Up,
        position: Vec2::new(400.0, 260.0),
        speed: 5.0,
        active: true,
        spawn_time_ms: 100,
    });

    let report = session.tick(&mut clock, &[InputEvent::local(600, Direction::Up)], 600);

    assert_eq!(report.judgments.len(), 1);
    assert_eq!(report.judgments[0].blocks[0].tier, Tier::JustInTime);
    assert_eq!(report.death_marks.len(), 1);
    assert_eq!(report.death_marks[0].position, Vec2::new(400.0, 260.0));
    assert!(session.enemies().is_empty());

    let stats = session.stats().unwrap();
    assert_eq!(stats.score, 25);
    assert_eq!(stats.block_counts.just_in_time, 1);
    assert_eq!(stats.blocks_per_direction.up, 1);
    assert_eq!(stats.reaction_times_ms, vec![500]);
}

#[test]
fn test_one_input_blocks_all_matching_enemies_in_reach() {
    let (mut session, mut clock) = session_with(Vec::new(), 5000);
    session.start(&mut clock, start_time());
    for y in [200.0, 260.0] {
        session.enemies_mut().push(Enemy {
            direction: Direction::Up,
            position: Vec2::new(400.0, y),
            speed: 5.0,
            active: true,
            spawn_time_ms: 0,
        });
    }

    let report = session.tick(&mut clock, &[InputEvent::device(10, Direction::Up)], 10);

    assert_eq!(report.judgments[0].blocks.len(), 2);
    let stats = session.stats().unwrap();
    assert_eq!(stats.block_counts.total, 2);
    assert_eq!(stats.block_counts.normal, 1);
    assert_eq!(stats.block_counts.just_in_time, 1);
    assert_eq!(stats.score, 10 + 25);
}

#[test]
fn test_unmatched_input_is_a_no_op() {
    let (mut session, mut clock) = session_with(Vec::new(), 5000);
    session.start(&mut clock, start_time());

    let report = session.tick(&mut clock, &[InputEvent::local(0, Direction::Left)], 0);
    assert!(report.judgments.is_empty());
    assert_eq!(session.score(), 0);
}

#[test]
fn test_track_finish_loops_once() {
    let (mut session, mut clock) = session_with(vec![100, 200], 300);
    session.start(&mut clock, start_time());

    let mut loops = 0;
    let mut now = 0;
    for _ in 0..20 {
        clock.advance(TICK_MS);
        now += TICK_MS;
        let report = session.tick(&mut clock, &[], now);
        assert!(!report.ended);
        if report.looped {
            loops += 1;
            assert_eq!(session.scheduler().next_beat_index, 0);
            assert!((session.scheduler().loop_speed_multiplier - 1.2).abs() < 1e-6);
            assert_eq!(session.score(), 1000);
            assert!(clock.is_playing());
            assert_eq!(clock.current_position_ms(), 0);
        }
    }
    assert_eq!(loops, 1);
    assert_eq!(clock.plays(), 2);
}

#[test]
fn test_collision_ends_run_once() {
    let (mut session, mut clock) = session_with(vec![0], 60_000);
    session.start(&mut clock, start_time());
    assert!(session.finish(start_time()).is_none());

    let mut endings = 0;
    let mut now = 0;
    for _ in 0..200 {
        let report = session.tick(&mut clock, &[], now);
        if report.ended {
            endings += 1;
        }
        clock.advance(TICK_MS);
        now += TICK_MS;
    }

    assert_eq!(endings, 1);
    assert_eq!(session.state(), RunState::Ended);

    let end = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap().and_hms_opt(20, 0, 5).unwrap();
    let record = session.finish(end).expect("Ended run should finalize");
    assert!(record.end_time >= record.start_time);
    assert_eq!(record.duration_seconds, 5.0);
    assert_eq!(record.name, "ana");
    assert_eq!(record.track_name, "song.ogg");
    assert_eq!(record.total_blocks, 0);
    assert_eq!(record.average_reaction_time_ms, 0.0);
}

#[test]
fn test_faster_after_loop() {
    let (mut session, mut clock) = session_with(Vec::new(), 100);
    session.start(&mut clock, start_time());
    session.on_track_loop();
    let enemy = Enemy::spawn(Direction::Left, session.config(), 0);
    session.enemies_mut().push(enemy);

    clock.advance(10);
    session.tick(&mut clock, &[], 10);
    assert!((session.enemies()[0].position.x - 6.0).abs() < 1e-4);
}

#[test]
fn test_track_end_loops_once_while_service_catches_up() {
    let track = BeatTrack::from_beats("song.ogg", 2000, vec![100, 600, 1100, 1600]);
    let mut session = GameSession::new(
        GameConfig::default(),
        track,
        "music/song.ogg",
        "ana",
        StdRng::seed_from_u64(3),
    );
    let shared = PlaybackShared::default();
    let (mut conductor, commands) = Conductor::new(&shared);
    conductor.update(0.0);
    session.start(&mut conductor, start_time());

    // The service reports the track finished and then stalls.
    shared.position.store(2.0, Ordering::SeqCst);
    shared.playing.store(false, Ordering::SeqCst);

    let mut loops = 0;
    let mut spawned = 0;
    for tick in 1..=3 {
        conductor.update(10.0 + tick as f64 * 0.016);
        let report = session.tick(&mut conductor, &[], tick * TICK_MS);
        spawned += report.spawned.len();
        if report.looped {
            loops += 1;
        }
    }

    assert_eq!(loops, 1);
    assert_eq!(spawned, 4);
    assert_eq!(session.score(), 1000);
    assert!((session.scheduler().loop_speed_multiplier - 1.2).abs() < 1e-6);
    assert_eq!(commands.try_iter().count(), 4);
}
