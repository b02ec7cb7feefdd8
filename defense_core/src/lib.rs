pub mod analysis;
pub mod audio;
pub mod config;
pub mod error;
pub mod gameplay;
pub mod input;
pub mod leaderboard;
pub mod time;
