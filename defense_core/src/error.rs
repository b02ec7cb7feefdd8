use std::path::PathBuf;

use thiserror::Error;

/// The track could not be turned into beat data. Fatal to starting a run.
#[derive(Debug, Error)]
pub enum AudioLoadError {
    #[error("failed to open audio {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode audio {}: {message}", path.display())]
    Decode { path: PathBuf, message: String },

    #[error("unsupported audio format: {}", path.display())]
    Unsupported { path: PathBuf },

    #[error("audio contains no samples: {}", path.display())]
    Empty { path: PathBuf },

    #[error("beat extraction worker stopped before producing a result")]
    WorkerLost,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("leaderboard io error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("leaderboard csv error on {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}
