use log::debug;
use subprocess::{Exec, ExitStatus, NullFile, Redirection};

use crate::errors::CaptureError;

/// Answers whether the capture program is running right now. This, not
/// the session file, decides between starting and stopping.
pub trait ProcessProbe {
    fn find_capture_process(&self) -> Result<Option<u32>, CaptureError>;
}

pub struct PgrepProbe {
    program: String,
}

impl PgrepProbe {
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_owned(),
        }
    }
}

impl ProcessProbe for PgrepProbe {
    fn find_capture_process(&self) -> Result<Option<u32>, CaptureError> {
        let capture = Exec::cmd("pgrep")
            .arg("-x")
            .arg(&self.program)
            .stdin(NullFile)
            .stdout(Redirection::Pipe)
            .stderr(NullFile)
            .capture()
            .map_err(|e| CaptureError::Probe(format!("failed to run pgrep: {}", e)))?;
        match capture.exit_status {
            ExitStatus::Exited(0) => {
                let pid = parse_first_pid(&capture.stdout_str());
                debug!("pgrep found {} at {:?}", self.program, pid);
                Ok(pid)
            }
            // pgrep exits with 1 if nothing matched
            ExitStatus::Exited(1) => Ok(None),
            status => Err(CaptureError::Probe(format!(
                "pgrep exited with {:?}",
                status
            ))),
        }
    }
}

fn parse_first_pid(output: &str) -> Option<u32> {
    output
        .lines()
        .filter_map(|line| line.trim().parse::<u32>().ok())
        .next()
}
