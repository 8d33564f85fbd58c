pub mod args;
pub mod capture_config;
pub mod config;
pub mod conversion;
pub mod env_file;
pub mod errors;
pub mod logging;
pub mod notification;
pub mod path_utils;
pub mod process_probe;
pub mod recording;
pub mod run_args;
pub mod session_record;
pub mod session_store;
pub mod toggle;
