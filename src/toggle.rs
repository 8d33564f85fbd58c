use std::path::PathBuf;

use log::{debug, error, info, warn};

use crate::capture_config::{CaptureConfig, Defaults, Overrides};
use crate::config::{
    NOTIFICATION_CONVERSION_FAILED_BODY, NOTIFICATION_STARTED_BODY, NOTIFICATION_STARTED_TITLE,
    NOTIFICATION_STOPPED_TITLE,
};
use crate::conversion::Encoder;
use crate::env_file;
use crate::errors::CaptureError;
use crate::notification::Notifier;
use crate::process_probe::ProcessProbe;
use crate::recording::{DetachedProcess, Recorder};
use crate::session_store::SessionStore;

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum SessionState {
    /// No capture process running.
    Idle,
    /// A capture process is running with the given pid.
    Capturing(u32),
}

/// The per-invocation inputs to the toggle.
#[derive(Clone, Debug)]
pub struct Request {
    pub cli: Overrides,
    /// Environment file to overlay; only read when starting.
    pub env_file: Option<PathBuf>,
    pub defaults: Defaults,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Outcome {
    Started { pid: u32 },
    Stopped { output: PathBuf },
    /// Capture was stopped and state cleared, but encoding failed.
    ConversionFailed { output: PathBuf },
}

pub struct Toggle<'a> {
    store: &'a SessionStore,
    probe: &'a dyn ProcessProbe,
    recorder: &'a dyn Recorder,
    encoder: &'a dyn Encoder,
    notifier: &'a dyn Notifier,
}

impl<'a> Toggle<'a> {
    pub fn new(
        store: &'a SessionStore,
        probe: &'a dyn ProcessProbe,
        recorder: &'a dyn Recorder,
        encoder: &'a dyn Encoder,
        notifier: &'a dyn Notifier,
    ) -> Self {
        Self {
            store,
            probe,
            recorder,
            encoder,
            notifier,
        }
    }

    pub fn state(&self) -> Result<SessionState, CaptureError> {
        Ok(match self.probe.find_capture_process()? {
            Some(pid) => SessionState::Capturing(pid),
            None => SessionState::Idle,
        })
    }

    /// Starts a session if none is running, otherwise stops the running one.
    /// The session lock is held for the whole call.
    pub fn run(&self, request: &Request) -> Result<Outcome, CaptureError> {
        let _lock = self.store.lock()?;
        match self.state()? {
            SessionState::Idle => self.start(request),
            SessionState::Capturing(pid) => self.stop(DetachedProcess::from_pid(pid), request),
        }
    }

    fn start(&self, request: &Request) -> Result<Outcome, CaptureError> {
        if self.store.exists() {
            warn!("Found session file but no running capture process, discarding it");
            self.discard_session();
        }
        let env = match &request.env_file {
            Some(path) => Overrides::from_pairs(env_file::read(path)?),
            None => Overrides::default(),
        };
        let config = CaptureConfig::resolve(&[&request.cli, &env], &request.defaults);
        let input = config.input.as_deref().ok_or(CaptureError::MissingInput)?;

        let process = match self.recorder.start(input, self.store.buffer_file()) {
            Ok(process) => process,
            Err(e) => {
                self.discard_session();
                return Err(e);
            }
        };
        if let Err(e) = self.store.save(&config.to_record(process.pid())) {
            error!("Failed to save session, stopping capture: {}", e);
            if let Err(stop_err) = self.recorder.abort(&process) {
                warn!("{}", stop_err);
            }
            self.discard_session();
            return Err(e);
        }
        debug!(
            "Saved session for PID {}: {:?}",
            process.pid(),
            config.output_file()
        );
        self.notifier
            .notify(NOTIFICATION_STARTED_TITLE, NOTIFICATION_STARTED_BODY);
        Ok(Outcome::Started { pid: process.pid() })
    }

    fn stop(&self, process: DetachedProcess, request: &Request) -> Result<Outcome, CaptureError> {
        // Hard errors are reported only after cleanup has run
        let mut failure = None;
        let persisted = match self.store.load() {
            Ok(Some(record)) => {
                if record.pid != process.pid() {
                    warn!(
                        "Session file names PID {} but PID {} is running, stopping the latter",
                        record.pid,
                        process.pid()
                    );
                }
                Overrides::from(&record)
            }
            Ok(None) => {
                warn!("No session file found, using default output settings");
                Overrides::default()
            }
            Err(e @ CaptureError::CorruptState { .. }) => {
                warn!("{}, using default output settings", e);
                Overrides::default()
            }
            Err(e) => {
                error!("{}", e);
                failure = Some(e);
                Overrides::default()
            }
        };
        let config = CaptureConfig::resolve(&[&request.cli, &persisted], &request.defaults);

        match self.recorder.stop(&process) {
            Ok(()) => {}
            Err(CaptureError::ProcessNotFound(pid)) => warn!("Process with PID {} not found", pid),
            Err(e) => {
                error!("{}", e);
                failure.get_or_insert(e);
            }
        }

        let output = config.output_file();
        let converted = self
            .encoder
            .convert(self.store.buffer_file(), &output, &config.format);
        match &converted {
            Ok(()) => {
                info!("Audio saved to {}", output.display());
                self.notifier.notify(
                    NOTIFICATION_STOPPED_TITLE,
                    &format!("Audio saved to {}", output.display()),
                );
            }
            Err(e) => {
                error!("{}", e);
                self.notifier.notify(
                    NOTIFICATION_STOPPED_TITLE,
                    NOTIFICATION_CONVERSION_FAILED_BODY,
                );
            }
        }

        self.discard_session();
        if let Some(e) = failure {
            return Err(e);
        }
        Ok(match converted {
            Ok(()) => Outcome::Stopped { output },
            Err(_) => Outcome::ConversionFailed { output },
        })
    }

    fn discard_session(&self) {
        if let Err(e) = self.store.clear() {
            warn!("Failed to clean session: {}", e);
        }
    }
}
