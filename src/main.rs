use std::path::PathBuf;

use anyhow::{Context, Result};
use cap::args::Opts;
use cap::capture_config::Defaults;
use cap::config::DEFAULT_ENV_FILE;
use cap::conversion::FfmpegEncoder;
use cap::logging;
use cap::notification::DesktopNotifier;
use cap::process_probe::PgrepProbe;
use cap::recording::ParecRecorder;
use cap::run_args::RunArgs;
use cap::session_store::SessionStore;
use cap::toggle::{Outcome, Request, Toggle};
use clap::Parser;
use log::info;

fn main() -> Result<()> {
    let args = Opts::parse();
    logging::init(args.verbose)?;
    let run_args = RunArgs::from_state_dir(args.state_dir.as_deref())?;
    run_cap(&args, &run_args)
}

fn run_cap(args: &Opts, run_args: &RunArgs) -> Result<()> {
    let request = Request {
        cli: args.overrides(),
        env_file: env_file_path(args),
        defaults: Defaults::current(),
    };
    let store = SessionStore::new(run_args);
    let probe = PgrepProbe::new(&run_args.capture_program);
    let recorder = ParecRecorder::new(&run_args.capture_program);
    let encoder = FfmpegEncoder::new(&run_args.encoder_program);
    let toggle = Toggle::new(&store, &probe, &recorder, &encoder, &DesktopNotifier);
    match toggle.run(&request).context("Recording toggle failed")? {
        Outcome::Started { pid } => info!("Capturing audio (PID {})", pid),
        Outcome::Stopped { output } => info!("Done: {}", output.display()),
        Outcome::ConversionFailed { output } => {
            info!("Session cleared without writing {}", output.display())
        }
    }
    Ok(())
}

fn env_file_path(args: &Opts) -> Option<PathBuf> {
    if !args.env {
        return None;
    }
    Some(
        args.env_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ENV_FILE)),
    )
}
