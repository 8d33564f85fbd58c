use std::fs;
use std::io;
use std::path::Path;

use log::{debug, warn};
use regex::Regex;

use crate::errors::CaptureError;

/// Reads `KEY=VALUE` pairs from a dotenv-style file. A missing file yields
/// no pairs.
pub fn read(path: &Path) -> Result<Vec<(String, String)>, CaptureError> {
    match fs::read_to_string(path) {
        Ok(contents) => {
            debug!("Reading environment file {:?}", path);
            Ok(parse(&contents))
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            warn!("Environment file {:?} not found, ignoring --env", path);
            Ok(vec![])
        }
        Err(e) => Err(CaptureError::storage(path, e)),
    }
}

pub fn parse(contents: &str) -> Vec<(String, String)> {
    let re = line_regex();
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            let capture = re.captures(line)?;
            let key = capture.get(1)?.as_str().to_owned();
            let value = unquote(capture.get(2).map_or("", |m| m.as_str()).trim());
            Some((key, value))
        })
        .collect()
}

fn line_regex() -> Regex {
    Regex::new(r"^(?:export\s+)?([A-Za-z_][A-Za-z0-9_]*)\s*=\s*(.*)$").unwrap()
}

fn unquote(value: &str) -> String {
    for quote in ['"', '\''] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return value[1..value.len() - 1].to_owned();
        }
    }
    match value.find(" #") {
        Some(index) => value[..index].trim_end().to_owned(),
        None => value.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair(key: &str, value: &str) -> (String, String) {
        (key.to_owned(), value.to_owned())
    }

    #[test]
    fn parses_plain_quoted_and_exported_lines() {
        let contents = "\
# recorder settings
FILE_NAME=meeting.mp3
export DESTINATION=\"~/My Recordings\"
format = 'ogg'

INPUT=alsa_input.usb # the headset
";
        assert_eq!(
            parse(contents),
            vec![
                pair("FILE_NAME", "meeting.mp3"),
                pair("DESTINATION", "~/My Recordings"),
                pair("format", "ogg"),
                pair("INPUT", "alsa_input.usb"),
            ]
        );
    }

    #[test]
    fn skips_malformed_lines() {
        let contents = "not a pair\n=missing_key\n1ABC=x\nOK=yes\n";
        assert_eq!(parse(contents), vec![pair("OK", "yes")]);
    }

    #[test]
    fn empty_value_is_kept() {
        assert_eq!(parse("INPUT=\n"), vec![pair("INPUT", "")]);
    }

    #[test]
    fn missing_file_yields_nothing() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read(&dir.path().join(".env")).unwrap().is_empty());
    }

    #[test]
    fn reads_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".env");
        fs::write(&path, "FORMAT=flac\n").unwrap();
        assert_eq!(read(&path).unwrap(), vec![pair("FORMAT", "flac")]);
    }
}
