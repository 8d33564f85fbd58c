use clap::Parser;
use std::path::PathBuf;

use crate::capture_config::Overrides;

/// Capture audio in the background. Run once to start recording, run
/// again to stop and convert.
#[derive(Parser, Debug)]
#[clap(version, about)]
pub struct Opts {
    /// Output file name. Default audio_YYYY-MM-DD_HH-MM-SS.<format>
    #[clap(long = "file_name")]
    pub file_name: Option<String>,
    /// Destination folder. Default home directory
    #[clap(long)]
    pub destination: Option<PathBuf>,
    /// Output format. Default mp3
    #[clap(short, long)]
    pub format: Option<String>,
    /// Read settings from the environment file when starting
    #[clap(long)]
    pub env: bool,
    /// Environment file to read with --env
    #[clap(long = "env_file")]
    pub env_file: Option<PathBuf>,
    /// Input device. See `pactl list sources | grep -E "Name:|monitor"`
    #[clap(long)]
    pub input: Option<String>,
    /// Directory holding the session file and raw buffer
    #[clap(long = "state_dir")]
    pub state_dir: Option<PathBuf>,
    #[clap(short, long)]
    pub verbose: bool,
}

impl Opts {
    pub fn overrides(&self) -> Overrides {
        Overrides {
            file_name: self.file_name.clone(),
            destination: self.destination.clone(),
            format: self.format.clone(),
            input: self.input.clone(),
        }
    }
}
