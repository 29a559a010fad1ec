//! Runtime configuration
//!
//! Everything has a default matching the published site, so a config file is
//! only needed when the dataset files or their column names change. CLI flags
//! override whatever the file sets.

use crate::error::{Error, Result};
use crate::record::DatasetKind;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Directory holding the three dataset files
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default)]
    pub files: DatasetFiles,
    /// Cell delimiter of the dataset files
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    #[serde(default)]
    pub fields: FieldNames,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_data_dir() -> PathBuf { PathBuf::from("static") }
fn default_delimiter() -> char { ',' }
fn default_port() -> u16 { 3001 }

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            files: DatasetFiles::default(),
            delimiter: default_delimiter(),
            fields: FieldNames::default(),
            port: default_port(),
        }
    }
}

impl Config {
    /// Read a JSON config file. Missing keys fall back to their defaults.
    /// An unreadable file is a [`Error::Config`], malformed JSON an
    /// [`Error::Json`].
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
        let config = serde_json::from_str(&text).map_err(|e| {
            tracing::warn!(path = %path.display(), error = %e, "Config file is not valid JSON");
            Error::Json(e)
        })?;
        Ok(config)
    }

    pub fn path_for(&self, kind: DatasetKind) -> PathBuf {
        self.data_dir.join(self.files.file_for(kind))
    }
}

/// File name of each dataset inside `data_dir`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DatasetFiles {
    pub pixels: String,
    pub durations: String,
    pub locations: String,
}

impl Default for DatasetFiles {
    fn default() -> Self {
        Self {
            pixels: "ledking.bg-led-pixels.csv".to_string(),
            durations: "ledking.bg-video-durations.csv".to_string(),
            locations: "ledking.bg-locations.csv".to_string(),
        }
    }
}

impl DatasetFiles {
    pub fn file_for(&self, kind: DatasetKind) -> &str {
        match kind {
            DatasetKind::Pixels => &self.pixels,
            DatasetKind::Durations => &self.durations,
            DatasetKind::Locations => &self.locations,
        }
    }
}

/// Column names the pipeline projects and filters on. These are the literal
/// header labels of the dataset files.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FieldNames {
    pub city: String,
    pub address: String,
    pub pixel_pitch: String,
    pub duration: String,
}

impl Default for FieldNames {
    fn default() -> Self {
        Self {
            city: "ГРАДОВЕ".to_string(),
            address: "АДРЕСИ".to_string(),
            pixel_pitch: "Разстояние между пикселите".to_string(),
            duration: "Продължителност на видео клип [сек]".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.port, 3001);
        assert_eq!(config.delimiter, ',');
        assert_eq!(
            config.path_for(DatasetKind::Locations),
            PathBuf::from("static").join("ledking.bg-locations.csv")
        );
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"port": 8080, "fields": {{"city": "city"}}}}"#).unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.fields.city, "city");
        assert_eq!(config.fields.address, "АДРЕСИ");
        assert_eq!(config.files.pixels, "ledking.bg-led-pixels.csv");
    }

    #[test]
    fn test_semicolon_delimiter() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"delimiter": ";"}}"#).unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.delimiter, ';');
    }

    #[test]
    fn test_invalid_file_is_json_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();

        match Config::load(file.path()) {
            Err(Error::Json(e)) => assert!(e.is_syntax()),
            other => panic!("expected json error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");

        match Config::load(&path) {
            Err(Error::Config(msg)) => assert!(msg.contains(&path.display().to_string())),
            other => panic!("expected config error, got {:?}", other),
        }
    }
}
