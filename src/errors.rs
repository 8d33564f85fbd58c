use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("Failed to launch capture program {program}: {reason}")]
    Launch { program: String, reason: String },

    #[error("No input device given - pass --input to start a recording")]
    MissingInput,

    #[error("Session storage failed at {path:?}: {source}")]
    Storage {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Session file at {path:?} is corrupt: {reason}")]
    CorruptState { path: PathBuf, reason: String },

    #[error("Process with PID {0} not found")]
    ProcessNotFound(u32),

    #[error("Failed to signal process {pid}: {source}")]
    Signal {
        pid: u32,
        #[source]
        source: io::Error,
    },

    #[error("Failed to look up running capture process: {0}")]
    Probe(String),

    #[error("Failed to convert audio: {0}")]
    Conversion(String),
}

impl CaptureError {
    pub fn storage(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Storage {
            path: path.into(),
            source,
        }
    }
}
