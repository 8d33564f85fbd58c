use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use log::debug;

use crate::errors::CaptureError;
use crate::run_args::RunArgs;
use crate::session_record::SessionRecord;

/// The on-disk side of a session: the yaml record, the raw buffer the
/// capture process writes into and the lock file serialising invocations.
pub struct SessionStore {
    session_file: PathBuf,
    buffer_file: PathBuf,
    lock_file: PathBuf,
}

/// Held for as long as an invocation inspects or changes session state.
/// The lock is released when the file handle is dropped.
pub struct SessionLock {
    _file: File,
}

impl SessionStore {
    pub fn new(run_args: &RunArgs) -> Self {
        Self {
            session_file: run_args.get_yaml_file(),
            buffer_file: run_args.get_buffer_file(),
            lock_file: run_args.get_lock_file(),
        }
    }

    pub fn buffer_file(&self) -> &Path {
        &self.buffer_file
    }

    pub fn exists(&self) -> bool {
        self.session_file.is_file()
    }

    pub fn lock(&self) -> Result<SessionLock, CaptureError> {
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .open(&self.lock_file)
            .map_err(|e| CaptureError::storage(&self.lock_file, e))?;
        file.lock_exclusive()
            .map_err(|e| CaptureError::storage(&self.lock_file, e))?;
        debug!("Acquired session lock at {:?}", self.lock_file);
        Ok(SessionLock { _file: file })
    }

    pub fn save(&self, record: &SessionRecord) -> Result<(), CaptureError> {
        let data = serde_yaml::to_string(record).map_err(|e| {
            CaptureError::storage(
                &self.session_file,
                io::Error::new(io::ErrorKind::InvalidData, e),
            )
        })?;
        // Written next to the record and renamed over it so a reader never
        // sees a partial file.
        let tmp_file = self.session_file.with_extension("yaml.tmp");
        fs::write(&tmp_file, data).map_err(|e| CaptureError::storage(&tmp_file, e))?;
        fs::rename(&tmp_file, &self.session_file).map_err(|e| {
            let _ = fs::remove_file(&tmp_file);
            CaptureError::storage(&self.session_file, e)
        })
    }

    pub fn load(&self) -> Result<Option<SessionRecord>, CaptureError> {
        let data = match fs::read_to_string(&self.session_file) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(CaptureError::storage(&self.session_file, e)),
        };
        serde_yaml::from_str(&data)
            .map(Some)
            .map_err(|e| CaptureError::CorruptState {
                path: self.session_file.clone(),
                reason: e.to_string(),
            })
    }

    /// Removes the record and the raw buffer. Both removals are attempted
    /// even if one fails; files that are already gone are not an error.
    pub fn clear(&self) -> Result<(), CaptureError> {
        let buffer_result = remove_if_present(&self.buffer_file);
        let session_result = remove_if_present(&self.session_file);
        buffer_result.and(session_result)
    }
}

fn remove_if_present(path: &Path) -> Result<(), CaptureError> {
    match fs::remove_file(path) {
        Ok(()) => {
            debug!("Removed {:?}", path);
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(CaptureError::storage(path, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> SessionStore {
        SessionStore::new(&RunArgs::new(dir.path()))
    }

    fn record() -> SessionRecord {
        SessionRecord::new(4242, "talk.mp3", Path::new("/home/me/rec"), "mp3")
    }

    #[test]
    fn save_then_load_returns_record() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        assert!(!store.exists());
        store.save(&record()).unwrap();
        assert!(store.exists());
        assert_eq!(store.load().unwrap(), Some(record()));
    }

    #[test]
    fn load_without_record_is_none() {
        let dir = TempDir::new().unwrap();
        assert_eq!(store_in(&dir).load().unwrap(), None);
    }

    #[test]
    fn garbage_record_is_corrupt() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::write(dir.path().join("session.yaml"), "pid: [not a number").unwrap();
        assert!(matches!(
            store.load(),
            Err(CaptureError::CorruptState { .. })
        ));
    }

    #[test]
    fn record_missing_fields_is_corrupt() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::write(dir.path().join("session.yaml"), "pid: 12\n").unwrap();
        assert!(matches!(
            store.load(),
            Err(CaptureError::CorruptState { .. })
        ));
    }

    #[test]
    fn save_overwrites_previous_record() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.save(&record()).unwrap();
        let second = SessionRecord::new(7, "other.ogg", Path::new("/tmp"), "ogg");
        store.save(&second).unwrap();
        assert_eq!(store.load().unwrap(), Some(second));
        assert!(!dir.path().join("session.yaml.tmp").exists());
    }

    #[test]
    fn save_into_missing_dir_is_storage_error() {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::new(&RunArgs::new(&dir.path().join("missing")));
        assert!(matches!(
            store.save(&record()),
            Err(CaptureError::Storage { .. })
        ));
    }

    #[test]
    fn clear_removes_record_and_buffer() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.save(&record()).unwrap();
        fs::write(store.buffer_file(), [0u8; 16]).unwrap();
        store.clear().unwrap();
        assert!(!store.exists());
        assert!(!store.buffer_file().exists());
    }

    #[test]
    fn clear_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.save(&record()).unwrap();
        store.clear().unwrap();
        store.clear().unwrap();
        assert!(!store.exists());
    }

    #[test]
    fn clear_removes_record_when_buffer_is_missing() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.save(&record()).unwrap();
        store.clear().unwrap();
        assert!(!store.exists());
    }

    #[test]
    fn lock_excludes_other_holders() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let other = File::open(dir.path().join("session.lock"));
        assert!(other.is_err());

        let lock = store.lock().unwrap();
        let other = File::open(dir.path().join("session.lock")).unwrap();
        assert!(other.try_lock_exclusive().is_err());

        drop(lock);
        assert!(other.try_lock_exclusive().is_ok());
    }

    #[test]
    fn lock_can_be_reacquired_after_drop() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        {
            let _lock = store.lock().unwrap();
        }
        let _lock = store.lock().unwrap();
        assert!(dir.path().join("session.lock").exists());
    }
}
