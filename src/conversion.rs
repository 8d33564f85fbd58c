use std::fs::create_dir_all;
use std::path::Path;

use log::{debug, info};
use subprocess::{Exec, NullFile, Redirection};

use crate::config::{NUM_CHANNELS, SAMPLE_FORMAT, SAMPLE_RATE};
use crate::errors::CaptureError;

pub trait Encoder {
    /// Encodes the raw buffer into `output_file`. Blocks until done.
    fn convert(&self, buffer_file: &Path, output_file: &Path, format: &str)
        -> Result<(), CaptureError>;
}

pub struct FfmpegEncoder {
    program: String,
}

impl FfmpegEncoder {
    pub fn new(program: &str) -> Self {
        Self {
            program: program.to_owned(),
        }
    }
}

impl Encoder for FfmpegEncoder {
    fn convert(
        &self,
        buffer_file: &Path,
        output_file: &Path,
        format: &str,
    ) -> Result<(), CaptureError> {
        if let Some(dir) = output_file.parent() {
            create_dir_all(dir).map_err(|e| {
                CaptureError::Conversion(format!("cannot create {:?}: {}", dir, e))
            })?;
        }
        let ffmpeg_cmd = Exec::cmd(&self.program)
            .args(&["-hide_banner", "-loglevel", "error", "-nostdin", "-n"])
            .arg("-f")
            .arg(SAMPLE_FORMAT)
            .arg("-ar")
            .arg(SAMPLE_RATE.to_string())
            .arg("-ac")
            .arg(NUM_CHANNELS.to_string())
            .arg("-i")
            .arg(buffer_file)
            .arg("-f")
            .arg(muxer_for_format(format))
            .arg(output_file)
            .stdin(NullFile)
            .stdout(NullFile)
            .stderr(Redirection::Pipe);
        debug!("Running {}", ffmpeg_cmd.to_cmdline_lossy());
        let capture = ffmpeg_cmd.capture().map_err(|e| {
            CaptureError::Conversion(format!("failed to run {}: {}", self.program, e))
        })?;
        if capture.exit_status.success() {
            info!("Converted {:?} to {:?}", buffer_file, output_file);
            Ok(())
        } else {
            Err(CaptureError::Conversion(format!(
                "{} exited with {:?}: {}",
                self.program,
                capture.exit_status,
                capture.stderr_str().trim()
            )))
        }
    }
}

/// ffmpeg's muxer name for a file format where the two differ.
pub fn muxer_for_format(format: &str) -> &str {
    match format {
        "m4a" | "aac" => "ipod",
        "mka" => "matroska",
        "oga" => "ogg",
        other => other,
    }
}
