use std::{fs, process::Command};

fn norm_newlines(s: &str) -> String {
    s.replace("\r\n", "\n").replace('\r', "")
}

fn write_beat_map(dir: &std::path::Path) -> std::path::PathBuf {
    let path = dir.join("song.beats.json");
    fs::write(
        &path,
        r#"{"track_name":"song.ogg","duration_ms":3000,"tempo_bpm":120.0,"beats_ms":[0,500,1000]}"#,
    )
    .unwrap();
    path
}

#[test]
fn help_mentions_subcommands() {
    let exe = env!("CARGO_BIN_EXE_defense_cli");

    let output = Command::new(exe).arg("--help").output().unwrap();

    assert!(output.status.success());
    let stdout = norm_newlines(&String::from_utf8_lossy(&output.stdout));
    assert!(stdout.contains("beats"));
    assert!(stdout.contains("simulate"));
    assert!(stdout.contains("leaderboard"));
}

#[test]
fn empty_leaderboard_is_reported() {
    let exe = env!("CARGO_BIN_EXE_defense_cli");
    let dir = tempfile::tempdir().unwrap();

    let output = Command::new(exe)
        .args(["leaderboard", "--store-dir", dir.path().to_str().unwrap()])
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = norm_newlines(&String::from_utf8_lossy(&output.stdout));
    assert!(stdout.contains("Leaderboard is empty."));
}

#[test]
fn beats_on_missing_file_fails() {
    let exe = env!("CARGO_BIN_EXE_defense_cli");
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("missing.ogg");

    let output = Command::new(exe)
        .args(["beats", missing.to_str().unwrap()])
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert_eq!(output.status.code(), Some(1));

    let stderr = norm_newlines(&String::from_utf8_lossy(&output.stderr));
    assert!(stderr.contains("Error: beat extraction failed: "));
    assert!(stderr.contains("Caused by:"));
    assert!(stderr.contains("missing.ogg"));
}

#[test]
fn beats_rejects_non_ogg_input() {
    let exe = env!("CARGO_BIN_EXE_defense_cli");
    let dir = tempfile::tempdir().unwrap();
    let wav = dir.path().join("song.wav");
    fs::write(&wav, b"RIFF").unwrap();

    let output = Command::new(exe)
        .args(["beats", wav.to_str().unwrap()])
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(!dir.path().join("song.beats.json").exists());
}

#[test]
fn simulated_game_over_is_saved() {
    let exe = env!("CARGO_BIN_EXE_defense_cli");
    let dir = tempfile::tempdir().unwrap();
    let beats = write_beat_map(dir.path());

    let output = Command::new(exe)
        .args([
            "simulate",
            beats.to_str().unwrap(),
            "--name",
            "ana",
            "--seed",
            "7",
            "--miss-every",
            "1",
            "--max-seconds",
            "30",
            "--store-dir",
            dir.path().to_str().unwrap(),
        ])
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = norm_newlines(&String::from_utf8_lossy(&output.stdout));
    assert!(stdout.contains("Time(ms) | Event"));
    assert!(stdout.contains("game over"));
    assert!(stdout.contains("blocks: 0 (just in time 0, normal 0, too early 0)"));
    assert!(stdout.contains("by direction: up 0, down 0, left 0, right 0"));

    let csv = fs::read_to_string(dir.path().join("leaderboard.csv")).unwrap();
    assert_eq!(csv.lines().next(), Some("Name,Score,Date,Music"));
    assert!(csv.lines().nth(1).unwrap().starts_with("ana,0,"));
    assert!(dir.path().join("players").join("ana.csv").exists());

    let listing = Command::new(exe)
        .args(["leaderboard", "--store-dir", dir.path().to_str().unwrap()])
        .output()
        .unwrap();
    let stdout = norm_newlines(&String::from_utf8_lossy(&listing.stdout));
    assert!(stdout.contains("ana"));
    assert!(stdout.contains("song.ogg"));
}

#[test]
fn aborted_simulation_is_not_saved() {
    let exe = env!("CARGO_BIN_EXE_defense_cli");
    let dir = tempfile::tempdir().unwrap();
    let beats = write_beat_map(dir.path());

    let output = Command::new(exe)
        .args([
            "simulate",
            beats.to_str().unwrap(),
            "--name",
            "bob",
            "--max-seconds",
            "1",
            "--store-dir",
            dir.path().to_str().unwrap(),
        ])
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = norm_newlines(&String::from_utf8_lossy(&output.stdout));
    assert!(stdout.contains("run not saved"));
    assert!(!dir.path().join("leaderboard.csv").exists());
}
