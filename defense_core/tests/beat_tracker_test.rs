use std::sync::Arc;

use defense_core::analysis::extract::beats_to_ms;
use defense_core::analysis::{load_beat_map, BeatJob, BeatTrack, BeatTracker, SpectralFluxTracker, TrackedBeats};
use defense_core::error::AudioLoadError;
use defense_data::model::BeatMap;

const SAMPLE_RATE: u32 = 22050;
const HOP: usize = 512;
/// 22 hops between clicks: about 117.5 bpm.
const CLICK_SPACING: usize = 22 * HOP;

fn click_track(seconds: f64, first_click: usize) -> Vec<f32> {
    let len = (seconds * SAMPLE_RATE as f64) as usize;
    let mut samples = vec![0.0f32; len];
    let mut start = first_click;
    while start < len {
        for i in 0..256.min(len - start) {
            let t = i as f32 / SAMPLE_RATE as f32;
            let decay = (-(i as f32) / 48.0).exp();
            samples[start + i] = 0.9 * decay * (2.0 * std::f32::consts::PI * 2000.0 * t).sin();
        }
        start += CLICK_SPACING;
    }
    samples
}

fn median(mut values: Vec<u64>) -> u64 {
    values.sort_unstable();
    values[values.len() / 2]
}

#[test]
fn test_click_track_tempo_and_spacing() {
    let tracker = SpectralFluxTracker::default();
    let samples = click_track(8.0, 4 * HOP);

    let tracked = tracker.track(&samples, SAMPLE_RATE);
    let beats = beats_to_ms(&tracked);

    let tempo = tracked.tempo_bpm.expect("tempo should be detected");
    assert!((105.0..130.0).contains(&tempo), "tempo {tempo}");

    assert!(beats.len() >= 10, "only {} beats", beats.len());
    assert!(beats.windows(2).all(|w| w[0] <= w[1]));

    let intervals: Vec<u64> = beats.windows(2).map(|w| w[1] - w[0]).collect();
    let spacing_ms = (CLICK_SPACING as f64 / SAMPLE_RATE as f64 * 1000.0) as u64;
    let med = median(intervals);
    assert!(med.abs_diff(spacing_ms) <= 30, "median interval {med} vs {spacing_ms}");
}

#[test]
fn test_silence_has_no_beats() {
    let tracker = SpectralFluxTracker::default();
    let tracked = tracker.track(&vec![0.0; SAMPLE_RATE as usize * 3], SAMPLE_RATE);

    assert!(tracked.positions.is_empty());
    assert!(tracked.tempo_bpm.is_none());
}

#[test]
fn test_empty_input_has_no_beats() {
    let tracker = SpectralFluxTracker::default();
    assert!(tracker.track(&[], SAMPLE_RATE).positions.is_empty());
    assert!(tracker.track(&[0.5; 100], 0).positions.is_empty());
}

#[test]
fn test_positions_convert_with_rounding() {
    let tracked = TrackedBeats {
        positions: vec![0, 11, 22050, 33076],
        sample_rate: SAMPLE_RATE,
        tempo_bpm: None,
    };
    // 11 / 22050 s = 0.4989 ms -> 0; 33076 / 22050 s = 1500.05 ms -> 1500
    assert_eq!(beats_to_ms(&tracked), vec![0, 0, 1000, 1500]);
}

#[test]
fn test_beat_track_from_beat_map_is_sorted() {
    let map = BeatMap {
        track_name: "song.ogg".to_string(),
        duration_ms: 2000,
        tempo_bpm: Some(120.0),
        beats_ms: vec![1000, 0, 500],
    };
    let track = BeatTrack::from(map);
    assert_eq!(track.beats_ms, vec![0, 500, 1000]);
    assert_eq!(track.to_beat_map().tempo_bpm, Some(120.0));
}

#[test]
fn test_background_job_reports_load_error() {
    let job = BeatJob::spawn(
        "/nonexistent/song.ogg".into(),
        Arc::new(SpectralFluxTracker::default()),
    );
    let err = job.wait().unwrap_err();
    assert!(matches!(err, AudioLoadError::Open { .. }));
}

#[test]
fn test_beat_map_cache_loads_and_rejects_unsorted() {
    let dir = tempfile::tempdir().unwrap();
    let good = dir.path().join("song.beats.json");
    let map = BeatMap {
        track_name: "song.ogg".to_string(),
        duration_ms: 3000,
        tempo_bpm: None,
        beats_ms: vec![0, 500, 1000],
    };
    std::fs::write(&good, serde_json::to_vec(&map).unwrap()).unwrap();
    assert_eq!(load_beat_map(&good).unwrap(), map);

    let bad = dir.path().join("bad.beats.json");
    std::fs::write(
        &bad,
        r#"{"track_name":"x","duration_ms":10,"beats_ms":[500,0]}"#,
    )
    .unwrap();
    assert!(load_beat_map(&bad).is_err());
}
