//! Application Configuration
//! Optional JSON file overriding the fallback source, geometry path and export settings.

use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Configuration file looked up in the working directory.
pub const CONFIG_FILE: &str = "carto_maroc.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Runtime settings. Every field may be omitted from the file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Google Sheets document exported as CSV when no file is uploaded.
    pub sheet_id: String,
    pub geometry_path: PathBuf,
    pub fetch_timeout_secs: u64,
    pub currency_suffix: String,
    pub export_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            sheet_id: "TON_ID_SHEET".to_string(),
            geometry_path: PathBuf::from("regions_maroc.json"),
            fetch_timeout_secs: 30,
            currency_suffix: "DH".to_string(),
            export_dir: PathBuf::from("exports"),
        }
    }
}

impl AppConfig {
    /// Load from `path`; a missing file yields the defaults.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        match fs::read_to_string(path) {
            Ok(contents) => Self::from_json(&contents).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            }),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::debug!("No config at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    pub fn from_json(contents: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(contents)
    }

    /// CSV export URL of the fallback sheet.
    pub fn fallback_url(&self) -> String {
        format!(
            "https://docs.google.com/spreadsheets/d/{}/export?format=csv",
            self.sheet_id
        )
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_or_default(&dir.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn partial_file_overrides_only_given_fields() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "sheet_id": "abc123", "fetch_timeout_secs": 5 }}"#).unwrap();

        let config = AppConfig::load_or_default(file.path()).unwrap();
        assert_eq!(config.sheet_id, "abc123");
        assert_eq!(config.fetch_timeout(), Duration::from_secs(5));
        assert_eq!(config.geometry_path, PathBuf::from("regions_maroc.json"));
        assert_eq!(
            config.fallback_url(),
            "https://docs.google.com/spreadsheets/d/abc123/export?format=csv"
        );
    }

    #[test]
    fn malformed_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "sheet": 1 }}"#).unwrap();

        let err = AppConfig::load_or_default(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
