use std::path::PathBuf;
use std::str::FromStr;

use chrono::{DateTime, Local};
use log::debug;

use crate::config::{DEFAULT_FILE_PREFIX, DEFAULT_FORMAT, FILE_NAME_TIME_FORMAT};
use crate::path_utils;
use crate::session_record::SessionRecord;

/// The keys that loosely typed sources (environment file, session record)
/// are allowed to set. Anything else is ignored.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ConfigKey {
    FileName,
    Destination,
    Format,
    Input,
    /// Reserved for passing the capture pid along; never a setting.
    Pid,
}

impl FromStr for ConfigKey {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "file_name" => Ok(Self::FileName),
            "destination" => Ok(Self::Destination),
            "format" => Ok(Self::Format),
            "input" => Ok(Self::Input),
            "pid" => Ok(Self::Pid),
            _ => Err(()),
        }
    }
}

/// One layer of partially specified settings.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Overrides {
    pub file_name: Option<String>,
    pub destination: Option<PathBuf>,
    pub format: Option<String>,
    pub input: Option<String>,
}

impl Overrides {
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut overrides = Self::default();
        for (key, value) in pairs {
            let key = key.as_ref();
            let value = value.into();
            if value.is_empty() {
                continue;
            }
            match key.parse::<ConfigKey>() {
                Ok(ConfigKey::FileName) => overrides.file_name = Some(value),
                Ok(ConfigKey::Destination) => overrides.destination = Some(PathBuf::from(value)),
                Ok(ConfigKey::Format) => overrides.format = Some(value),
                Ok(ConfigKey::Input) => overrides.input = Some(value),
                Ok(ConfigKey::Pid) => debug!("Ignoring reserved key {}", key),
                Err(()) => debug!("Ignoring unknown configuration key {}", key),
            }
        }
        overrides
    }
}

impl From<&SessionRecord> for Overrides {
    fn from(record: &SessionRecord) -> Self {
        Self {
            file_name: Some(record.file_name.clone()),
            destination: Some(record.destination.clone()),
            format: Some(record.format.clone()),
            input: None,
        }
    }
}

/// Values used when no layer sets a field.
#[derive(Clone, Debug)]
pub struct Defaults {
    pub now: DateTime<Local>,
    pub home: PathBuf,
}

impl Defaults {
    pub fn current() -> Self {
        Self {
            now: Local::now(),
            home: path_utils::home_dir(),
        }
    }

    fn file_name(&self, format: &str) -> String {
        format!(
            "{}_{}.{}",
            DEFAULT_FILE_PREFIX,
            self.now.format(FILE_NAME_TIME_FORMAT),
            format
        )
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CaptureConfig {
    pub file_name: String,
    pub destination: PathBuf,
    pub format: String,
    pub input: Option<String>,
}

impl CaptureConfig {
    /// Merges the layers, earlier layers taking precedence, and fills the
    /// rest from `defaults`.
    pub fn resolve(layers: &[&Overrides], defaults: &Defaults) -> Self {
        let format = first(layers, |o| o.format.as_deref().map(str::to_ascii_lowercase))
            .unwrap_or_else(|| DEFAULT_FORMAT.into());
        let file_name =
            first(layers, |o| o.file_name.clone()).unwrap_or_else(|| defaults.file_name(&format));
        let destination = first(layers, |o| o.destination.clone())
            .map(|dir| path_utils::expanduser(&dir))
            .unwrap_or_else(|| defaults.home.clone());
        let input = first(layers, |o| o.input.clone());
        Self {
            file_name,
            destination,
            format,
            input,
        }
    }

    pub fn output_file(&self) -> PathBuf {
        path_utils::get_output_file(&self.destination, &self.file_name, &self.format)
    }

    pub fn to_record(&self, pid: u32) -> SessionRecord {
        SessionRecord::new(pid, &self.file_name, &self.destination, &self.format)
    }
}

fn first<T>(layers: &[&Overrides], get: impl Fn(&Overrides) -> Option<T>) -> Option<T> {
    layers.iter().find_map(|layer| get(*layer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::path::Path;

    fn defaults() -> Defaults {
        Defaults {
            now: Local.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap(),
            home: PathBuf::from("/home/me"),
        }
    }

    #[test]
    fn defaults_fill_everything() {
        let config = CaptureConfig::resolve(&[], &defaults());
        assert_eq!(config.file_name, "audio_2024-03-09_14-05-07.mp3");
        assert_eq!(config.destination, PathBuf::from("/home/me"));
        assert_eq!(config.format, "mp3");
        assert_eq!(config.input, None);
    }

    #[test]
    fn default_file_name_follows_format() {
        let cli = Overrides {
            format: Some("ogg".into()),
            ..Default::default()
        };
        let config = CaptureConfig::resolve(&[&cli], &defaults());
        assert_eq!(config.file_name, "audio_2024-03-09_14-05-07.ogg");
    }

    #[test]
    fn format_is_lowercased() {
        let env = Overrides::from_pairs(vec![("FORMAT", "MP3")]);
        let config = CaptureConfig::resolve(&[&Overrides::default(), &env], &defaults());
        assert_eq!(config.format, "mp3");
        assert_eq!(config.file_name, "audio_2024-03-09_14-05-07.mp3");
    }

    #[test]
    fn command_line_beats_session_record() {
        let cli = Overrides {
            file_name: Some("a.mp3".into()),
            ..Default::default()
        };
        let record = SessionRecord::new(1, "b.mp3", Path::new("/rec"), "mp3");
        let config = CaptureConfig::resolve(&[&cli, &Overrides::from(&record)], &defaults());
        assert_eq!(config.file_name, "a.mp3");
        assert_eq!(config.destination, PathBuf::from("/rec"));
    }

    #[test]
    fn session_record_used_when_flag_absent() {
        let record = SessionRecord::new(1, "b.mp3", Path::new("/rec"), "wav");
        let config = CaptureConfig::resolve(
            &[&Overrides::default(), &Overrides::from(&record)],
            &defaults(),
        );
        assert_eq!(config.file_name, "b.mp3");
        assert_eq!(config.format, "wav");
    }

    #[test]
    fn pairs_use_allow_list_case_insensitively() {
        let overrides = Overrides::from_pairs(vec![
            ("FILE_NAME", "env.mp3"),
            ("Destination", "/env"),
            ("PID", "99"),
            ("HOME", "/elsewhere"),
            ("format", ""),
            ("INPUT", "mic0"),
        ]);
        assert_eq!(
            overrides,
            Overrides {
                file_name: Some("env.mp3".into()),
                destination: Some(PathBuf::from("/env")),
                format: None,
                input: Some("mic0".into()),
            }
        );
    }

    #[test]
    fn tilde_destination_is_expanded() {
        let cli = Overrides {
            destination: Some(PathBuf::from("~/rec")),
            ..Default::default()
        };
        let config = CaptureConfig::resolve(&[&cli], &defaults());
        assert!(!config.destination.to_string_lossy().starts_with('~'));
        assert!(config.destination.ends_with("rec"));
    }

    #[test]
    fn record_keeps_resolved_values() {
        let cli = Overrides {
            file_name: Some("x".into()),
            format: Some("flac".into()),
            ..Default::default()
        };
        let config = CaptureConfig::resolve(&[&cli], &defaults());
        let record = config.to_record(31);
        assert_eq!(record, SessionRecord::new(31, "x", Path::new("/home/me"), "flac"));
        assert_eq!(config.output_file(), PathBuf::from("/home/me/x.flac"));
    }
}
