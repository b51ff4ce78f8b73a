use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use tracing::debug;

use crate::error::{Result, ToolError};

pub const SFTP_HOST: &str = "SFTP_Host";
pub const SFTP_PORT: &str = "SFTP_Port";
pub const SFTP_USER: &str = "SFTP_User";
pub const SFTP_PASS: &str = "SFTP_Pass";
pub const INPUT_FOLDER: &str = "InputFolder";
pub const INPUT_PATTERN: &str = "InputPattern";
pub const OUTPUT_FOLDER: &str = "OutputFolder";
pub const OUTPUT_FILE: &str = "OutputFile";
pub const ON_FILE_ERROR: &str = "OnFileError";

const DEFAULT_SFTP_PORT: u16 = 22;

/// Connection details for the transfer endpoint.
#[derive(Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
}

impl std::fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Endpoint")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"***")
            .finish()
    }
}

/// What the pipeline does when a single input file cannot be processed.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Stop the run; nothing is published.
    #[default]
    Abort,
    /// Log the failure, leave the file unarchived and carry on.
    Skip,
}

impl FromStr for FailurePolicy {
    type Err = ();

    fn from_str(value: &str) -> std::result::Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "abort" => Ok(FailurePolicy::Abort),
            "skip" => Ok(FailurePolicy::Skip),
            _ => Err(()),
        }
    }
}

/// Immutable run configuration, built once at startup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    pub endpoint: Endpoint,
    pub input_folder: String,
    pub input_pattern: String,
    pub output_folder: String,
    pub output_file: String,
    pub on_file_error: FailurePolicy,
}

impl Settings {
    /// Reads a JSON object of string keys to string values.
    pub fn load(path: &Path) -> Result<Self> {
        let source = fs::read_to_string(path)?;
        let values: BTreeMap<String, String> = serde_json::from_str(&source)?;
        debug!(path = %path.display(), keys = values.len(), "configuration loaded");
        Self::from_map(&values)
    }

    /// Builds settings from a flat key/value mapping. Unknown keys are ignored.
    pub fn from_map(values: &BTreeMap<String, String>) -> Result<Self> {
        let port = match values.get(SFTP_PORT) {
            Some(raw) => raw.trim().parse().map_err(|_| invalid(SFTP_PORT, raw))?,
            None => DEFAULT_SFTP_PORT,
        };
        let on_file_error = match values.get(ON_FILE_ERROR) {
            Some(raw) => raw.parse().map_err(|_| invalid(ON_FILE_ERROR, raw))?,
            None => FailurePolicy::default(),
        };

        Ok(Self {
            endpoint: Endpoint {
                host: required(values, SFTP_HOST)?,
                port,
                user: required(values, SFTP_USER)?,
                password: required(values, SFTP_PASS)?,
            },
            input_folder: required(values, INPUT_FOLDER)?,
            input_pattern: required(values, INPUT_PATTERN)?,
            output_folder: required(values, OUTPUT_FOLDER)?,
            output_file: required(values, OUTPUT_FILE)?,
            on_file_error,
        })
    }

    /// Remote path of a listed input file.
    pub fn input_path(&self, name: &str) -> String {
        format!("{}/{}", self.input_folder, name)
    }

    /// Remote path a consumed input file is moved to.
    pub fn archived_input_path(&self, name: &str) -> String {
        format!("{}/archived/{}", self.input_folder, name)
    }

    /// Remote path of the published output. The folder and file name are
    /// concatenated as configured.
    pub fn output_path(&self) -> String {
        format!("{}{}", self.output_folder, self.output_file)
    }

    /// Remote path the previous output is renamed to before publishing.
    pub fn archived_output_path(&self) -> String {
        format!("{}/archived.bookings.csv", self.output_folder)
    }
}

fn required(values: &BTreeMap<String, String>, key: &str) -> Result<String> {
    values
        .get(key)
        .cloned()
        .ok_or_else(|| ToolError::MissingSetting(key.to_string()))
}

fn invalid(key: &str, value: &str) -> ToolError {
    ToolError::InvalidSetting {
        key: key.to_string(),
        value: value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> BTreeMap<String, String> {
        [
            (SFTP_HOST, "sftp.example.com"),
            (SFTP_USER, "bookings"),
            (SFTP_PASS, "secret"),
            (INPUT_FOLDER, "/in"),
            (INPUT_PATTERN, r"^export.*\.xlsx$"),
            (OUTPUT_FOLDER, "/out"),
            (OUTPUT_FILE, "/bookings.csv"),
        ]
        .into_iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
    }

    #[test]
    fn builds_settings_with_defaults() {
        let settings = Settings::from_map(&sample()).expect("settings parsed");
        assert_eq!(settings.endpoint.host, "sftp.example.com");
        assert_eq!(settings.endpoint.port, 22);
        assert_eq!(settings.on_file_error, FailurePolicy::Abort);
    }

    #[test]
    fn derives_remote_paths() {
        let settings = Settings::from_map(&sample()).expect("settings parsed");
        assert_eq!(settings.input_path("a.xlsx"), "/in/a.xlsx");
        assert_eq!(settings.archived_input_path("a.xlsx"), "/in/archived/a.xlsx");
        assert_eq!(settings.output_path(), "/out/bookings.csv");
        assert_eq!(settings.archived_output_path(), "/out/archived.bookings.csv");
    }

    #[test]
    fn missing_key_is_reported() {
        let mut values = sample();
        values.remove(INPUT_PATTERN);
        match Settings::from_map(&values) {
            Err(ToolError::MissingSetting(key)) => assert_eq!(key, INPUT_PATTERN),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn optional_keys_are_validated() {
        let mut values = sample();
        values.insert(SFTP_PORT.into(), "2222".into());
        values.insert(ON_FILE_ERROR.into(), "Skip".into());
        let settings = Settings::from_map(&values).expect("settings parsed");
        assert_eq!(settings.endpoint.port, 2222);
        assert_eq!(settings.on_file_error, FailurePolicy::Skip);

        values.insert(SFTP_PORT.into(), "ssh".into());
        assert!(matches!(
            Settings::from_map(&values),
            Err(ToolError::InvalidSetting { .. })
        ));
    }

    #[test]
    fn password_is_redacted_in_debug_output() {
        let settings = Settings::from_map(&sample()).expect("settings parsed");
        let rendered = format!("{:?}", settings.endpoint);
        assert!(!rendered.contains("secret"));
    }

    #[test]
    fn loads_json_file() {
        let dir = tempfile::tempdir().expect("temporary directory");
        let path = dir.path().join("bookings.json");
        fs::write(&path, serde_json::to_string(&sample()).unwrap()).expect("config written");
        let settings = Settings::load(&path).expect("settings loaded");
        assert_eq!(settings.output_file, "/bookings.csv");
    }
}
