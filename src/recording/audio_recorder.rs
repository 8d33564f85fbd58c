use std::fs::File;
use std::path::Path;
use std::time::Duration;

use log::{debug, info, warn};
use subprocess::{Exec, NullFile, Redirection};

use crate::config::{
    NUM_CHANNELS, SAMPLE_FORMAT, SAMPLE_RATE, STARTUP_GRACE, STOP_SETTLE_TIMEOUT,
};
use crate::errors::CaptureError;
use crate::recording::DetachedProcess;

pub trait Recorder {
    /// Launches the capture process writing raw samples into `buffer_file`
    /// and returns without waiting for it.
    fn start(&self, input: &str, buffer_file: &Path) -> Result<DetachedProcess, CaptureError>;

    /// Asks the capture process to stop. A process that is already gone
    /// counts as stopped.
    fn stop(&self, process: &DetachedProcess) -> Result<(), CaptureError>;

    /// Terminates a process this invocation launched itself, without
    /// waiting for it. Used to undo a start that could not be recorded.
    fn abort(&self, process: &DetachedProcess) -> Result<(), CaptureError>;
}

pub struct ParecRecorder {
    program: String,
    startup_grace: Duration,
    settle_timeout: Duration,
}

impl ParecRecorder {
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_owned(),
            startup_grace: STARTUP_GRACE,
            settle_timeout: STOP_SETTLE_TIMEOUT,
        }
    }

    fn launch_error(&self, reason: impl ToString) -> CaptureError {
        CaptureError::Launch {
            program: self.program.clone(),
            reason: reason.to_string(),
        }
    }
}

impl Recorder for ParecRecorder {
    fn start(&self, input: &str, buffer_file: &Path) -> Result<DetachedProcess, CaptureError> {
        let buffer =
            File::create(buffer_file).map_err(|e| CaptureError::storage(buffer_file, e))?;
        let parec_cmd = Exec::cmd(&self.program)
            .arg("-d")
            .arg(input)
            .arg(format!("--format={}", SAMPLE_FORMAT))
            .arg(format!("--rate={}", SAMPLE_RATE))
            .arg(format!("--channels={}", NUM_CHANNELS))
            .stdin(NullFile)
            .stdout(Redirection::File(buffer))
            .stderr(NullFile);
        debug!("Running {}", parec_cmd.to_cmdline_lossy());
        let mut process = parec_cmd
            .popen()
            .map_err(|e| self.launch_error(format!("{} - is it installed?", e)))?;
        // parec rejects an unknown device by exiting right away
        match process.wait_timeout(self.startup_grace) {
            Ok(Some(status)) => {
                return Err(self.launch_error(format!("exited immediately ({:?})", status)))
            }
            Ok(None) => {}
            Err(e) => return Err(self.launch_error(e)),
        }
        let pid = process
            .pid()
            .ok_or_else(|| self.launch_error("no PID after launch"))?;
        // Dropping a non-detached Popen would wait for it to exit
        process.detach();
        info!("Recording started (PID {})", pid);
        Ok(DetachedProcess::from_pid(pid))
    }

    fn stop(&self, process: &DetachedProcess) -> Result<(), CaptureError> {
        match process.terminate() {
            Ok(()) => info!("Recording stopped (PID {})", process.pid()),
            Err(CaptureError::ProcessNotFound(pid)) => {
                warn!("Process with PID {} not found", pid);
                return Ok(());
            }
            Err(e) => return Err(e),
        }
        if !process.wait_for_exit(self.settle_timeout) {
            warn!(
                "PID {} still running {:?} after SIGTERM, converting anyway",
                process.pid(),
                self.settle_timeout
            );
        }
        Ok(())
    }

    fn abort(&self, process: &DetachedProcess) -> Result<(), CaptureError> {
        match process.terminate() {
            Ok(()) => {
                info!("Capture aborted (PID {})", process.pid());
                Ok(())
            }
            Err(CaptureError::ProcessNotFound(_)) => Ok(()),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_program_is_launch_error() {
        let dir = tempfile::tempdir().unwrap();
        let recorder = ParecRecorder::new("cap-test-missing-capture-binary");
        let result = recorder.start("mic0", &dir.path().join("raw_audio.raw"));
        assert!(matches!(result, Err(CaptureError::Launch { .. })));
    }

    #[test]
    fn program_exiting_at_once_is_launch_error() {
        let dir = tempfile::tempdir().unwrap();
        let recorder = ParecRecorder::new("false");
        let result = recorder.start("no-such-device", &dir.path().join("raw_audio.raw"));
        assert!(matches!(result, Err(CaptureError::Launch { .. })));
    }

    #[test]
    fn abort_does_not_wait_for_settle_timeout() {
        let mut child = std::process::Command::new("sleep").arg("30").spawn().unwrap();
        let recorder = ParecRecorder::new("parec");
        let started = std::time::Instant::now();
        recorder.abort(&DetachedProcess::from_pid(child.id())).unwrap();
        assert!(started.elapsed() < Duration::from_secs(1));
        child.wait().unwrap();
    }

    #[test]
    fn stopping_gone_process_succeeds() {
        let mut child = std::process::Command::new("true").spawn().unwrap();
        let pid = child.id();
        child.wait().unwrap();
        let recorder = ParecRecorder::new("parec");
        recorder.stop(&DetachedProcess::from_pid(pid)).unwrap();
    }
}
