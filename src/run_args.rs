use std::path::{Path, PathBuf};

use crate::config::{APP_NAME, CAPTURE_PROGRAM, ENCODER_PROGRAM};
use crate::errors::CaptureError;
use crate::path_utils;

/// Everything an invocation needs to know about where state lives and
/// which external programs to run.
#[derive(Clone, Debug)]
pub struct RunArgs {
    pub state_dir: PathBuf,
    pub capture_program: String,
    pub encoder_program: String,
}

impl RunArgs {
    pub fn new(state_dir: &Path) -> Self {
        Self {
            state_dir: state_dir.into(),
            capture_program: CAPTURE_PROGRAM.into(),
            encoder_program: ENCODER_PROGRAM.into(),
        }
    }

    /// Uses `$XDG_STATE_HOME/cap` unless a directory is given explicitly.
    pub fn from_state_dir(state_dir: Option<&Path>) -> Result<Self, CaptureError> {
        let state_dir = match state_dir {
            Some(dir) => path_utils::expanduser(dir),
            None => default_state_dir()?,
        };
        std::fs::create_dir_all(&state_dir)
            .map_err(|e| CaptureError::storage(&state_dir, e))?;
        Ok(Self::new(&state_dir))
    }

    pub fn get_yaml_file(&self) -> PathBuf {
        path_utils::get_yaml_file(&self.state_dir)
    }

    pub fn get_buffer_file(&self) -> PathBuf {
        path_utils::get_buffer_file(&self.state_dir)
    }

    pub fn get_lock_file(&self) -> PathBuf {
        path_utils::get_lock_file(&self.state_dir)
    }
}

fn default_state_dir() -> Result<PathBuf, CaptureError> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix(APP_NAME).map_err(|e| {
        CaptureError::storage(
            APP_NAME,
            std::io::Error::new(std::io::ErrorKind::NotFound, e.to_string()),
        )
    })?;
    Ok(xdg_dirs.get_state_home())
}
