use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// What a running session remembers about itself. Written once when
/// capture starts, read once when it stops.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SessionRecord {
    pub pid: u32,
    pub file_name: String,
    pub destination: PathBuf,
    pub format: String,
}

impl SessionRecord {
    pub fn new(pid: u32, file_name: &str, destination: &Path, format: &str) -> Self {
        Self {
            pid,
            file_name: file_name.to_owned(),
            destination: destination.to_owned(),
            format: format.to_owned(),
        }
    }
}
