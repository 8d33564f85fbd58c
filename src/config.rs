use std::time::Duration;

pub static APP_NAME: &str = "cap";

pub static CAPTURE_PROGRAM: &str = "parec";
pub static ENCODER_PROGRAM: &str = "ffmpeg";

pub static DEFAULT_SESSION_FILE: &str = "session.yaml";
pub static DEFAULT_BUFFER_FILE: &str = "raw_audio.raw";
pub static DEFAULT_LOCK_FILE: &str = "session.lock";
pub static DEFAULT_ENV_FILE: &str = ".env";

pub static DEFAULT_FORMAT: &str = "mp3";
pub static DEFAULT_FILE_PREFIX: &str = "audio";
pub static FILE_NAME_TIME_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

// Raw buffer layout shared by parec and ffmpeg
pub static SAMPLE_FORMAT: &str = "s16le";
pub static SAMPLE_RATE: u32 = 48000;
pub static NUM_CHANNELS: u32 = 2;

pub static STARTUP_GRACE: Duration = Duration::from_millis(200);
pub static STOP_SETTLE_TIMEOUT: Duration = Duration::from_secs(2);
pub static STOP_POLL_INTERVAL: Duration = Duration::from_millis(50);

pub static NOTIFICATION_STARTED_TITLE: &str = "Recording Started";
pub static NOTIFICATION_STARTED_BODY: &str = "Capturing audio...";
pub static NOTIFICATION_STOPPED_TITLE: &str = "Recording stopped";
pub static NOTIFICATION_CONVERSION_FAILED_BODY: &str = "Failed to convert audio";
