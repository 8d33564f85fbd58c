use std::path::Path;
use std::path::PathBuf;

use crate::config::DEFAULT_BUFFER_FILE;
use crate::config::DEFAULT_LOCK_FILE;
use crate::config::DEFAULT_SESSION_FILE;

pub fn get_buffer_file(state_dir: &Path) -> PathBuf {
    state_dir.join(DEFAULT_BUFFER_FILE)
}

pub fn get_yaml_file(state_dir: &Path) -> PathBuf {
    state_dir.join(DEFAULT_SESSION_FILE)
}

pub fn get_lock_file(state_dir: &Path) -> PathBuf {
    state_dir.join(DEFAULT_LOCK_FILE)
}

/// Joins destination and file name, giving the file the format's
/// extension if it has none.
pub fn get_output_file(destination: &Path, file_name: &str, format: &str) -> PathBuf {
    let path = destination.join(file_name);
    if path.extension().is_some() {
        path
    } else {
        path.with_extension(format)
    }
}

pub fn expanduser(path: &Path) -> PathBuf {
    let expanded = shellexpand::tilde(&path.to_string_lossy()).into_owned();
    PathBuf::from(expanded)
}

pub fn home_dir() -> PathBuf {
    PathBuf::from(shellexpand::tilde("~").into_owned())
}
