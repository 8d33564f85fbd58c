use std::io;
use std::thread;
use std::time::{Duration, Instant};

use crate::config::STOP_POLL_INTERVAL;
use crate::errors::CaptureError;

/// A process this program launched (or found) but does not wait on.
/// Only the pid is owned; the process outlives the handle.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct DetachedProcess {
    pid: u32,
}

impl DetachedProcess {
    pub fn from_pid(pid: u32) -> Self {
        Self { pid }
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// Sends SIGTERM. A process that no longer exists is reported as
    /// `ProcessNotFound`.
    pub fn terminate(&self) -> Result<(), CaptureError> {
        self.send_signal(libc::SIGTERM)
    }

    pub fn is_running(&self) -> bool {
        match self.send_signal(0) {
            Ok(()) => true,
            Err(CaptureError::Signal { source, .. }) => {
                source.raw_os_error() == Some(libc::EPERM)
            }
            Err(_) => false,
        }
    }

    /// Polls until the process is gone or `timeout` passes. Returns whether
    /// the process exited.
    pub fn wait_for_exit(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            if !self.is_running() {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            thread::sleep(STOP_POLL_INTERVAL);
        }
    }

    fn send_signal(&self, signal: libc::c_int) -> Result<(), CaptureError> {
        let pid = libc::pid_t::try_from(self.pid).map_err(|_| CaptureError::Signal {
            pid: self.pid,
            source: io::Error::new(io::ErrorKind::InvalidInput, "pid out of range"),
        })?;
        if pid <= 0 {
            // kill(2) with 0 or negative pids addresses process groups
            return Err(CaptureError::Signal {
                pid: self.pid,
                source: io::Error::new(io::ErrorKind::InvalidInput, "not a single process"),
            });
        }
        let result = unsafe { libc::kill(pid, signal) };
        if result == 0 {
            return Ok(());
        }
        let err = io::Error::last_os_error();
        if err.raw_os_error() == Some(libc::ESRCH) {
            Err(CaptureError::ProcessNotFound(self.pid))
        } else {
            Err(CaptureError::Signal {
                pid: self.pid,
                source: err,
            })
        }
    }
}
