//! # Configuration Module
//!
//! Data directory discovery and runtime settings for Sonograph.
//!
//! ## Data Storage
//!
//! The catalog database and the optional `config.json` live in the
//! platform-standard data directory:
//! - Linux: `~/.local/share/sonograph/`
//! - macOS: `~/Library/Application Support/sonograph/`
//! - Windows: `%APPDATA%\sonograph\`
//!
//! ## `config.json`
//!
//! Every field is optional:
//!
//! ```json
//! {
//!   "db_path": "/srv/music/catalog.db",
//!   "engine": { "radio_length": 10, "discovery_limit": 15, "discovery_name": "Weekly Discovery" }
//! }
//! ```

use anyhow::{Context, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "sonograph";
const DB_FILE: &str = "catalog.db";
const CONFIG_FILE: &str = "config.json";

/// Returns the Sonograph data directory, creating it if needed.
///
/// # Errors
///
/// Fails when the platform has no data directory or it cannot be created.
pub fn get_data_dir() -> Result<PathBuf> {
    let data_dir = dirs::data_dir().ok_or_else(|| {
        anyhow::anyhow!(
            "Could not determine system data directory. Please ensure your platform supports standard data directories."
        )
    })?;

    let app_dir = data_dir.join(APP_DIR);
    fs::create_dir_all(&app_dir).with_context(|| {
        format!(
            "Failed to create Sonograph data directory at {}. Please check file permissions.",
            app_dir.display()
        )
    })?;

    Ok(app_dir)
}

/// Returns the default catalog database path inside [`get_data_dir`].
///
/// # Errors
///
/// See [`get_data_dir`].
pub fn get_db_path() -> Result<PathBuf> {
    Ok(get_data_dir()?.join(DB_FILE))
}

/// Tuning for the recommendation artifacts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Songs in a radio queue.
    pub radio_length: usize,
    /// Songs in a weekly discovery playlist.
    pub discovery_limit: usize,
    pub discovery_name: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            radio_length: 10,
            discovery_limit: 15,
            discovery_name: "Weekly Discovery".to_string(),
        }
    }
}

/// Configuration for runtime behavior
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Path to the database file
    pub db_path: PathBuf,
    #[serde(default)]
    pub engine: EngineConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            db_path: get_db_path().unwrap_or_else(|_| PathBuf::from(DB_FILE)),
            engine: EngineConfig::default(),
        }
    }
}

impl RuntimeConfig {
    /// Loads `config.json` from the data directory, falling back to defaults
    /// when it does not exist.
    ///
    /// # Errors
    ///
    /// Fails when the data directory is unavailable or the file is malformed.
    pub fn load() -> Result<Self> {
        let path = get_data_dir()?.join(CONFIG_FILE);
        if !path.exists() {
            debug!("No config at {}, using defaults", path.display());
            return Ok(Self {
                db_path: get_db_path()?,
                engine: EngineConfig::default(),
            });
        }
        Self::from_file(&path)
    }

    /// Reads a specific config file. A missing `db_path` falls back to the
    /// default location.
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be read or is not valid JSON.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_json(&raw).with_context(|| format!("Invalid config file {}", path.display()))
    }

    /// # Errors
    ///
    /// Fails when `raw` is not a valid configuration document.
    pub fn from_json(raw: &str) -> Result<Self> {
        #[derive(Deserialize)]
        struct Partial {
            db_path: Option<PathBuf>,
            #[serde(default)]
            engine: EngineConfig,
        }

        let partial: Partial = serde_json::from_str(raw).context("Malformed configuration JSON")?;
        let db_path = match partial.db_path {
            Some(path) => path,
            None => get_db_path().unwrap_or_else(|_| PathBuf::from(DB_FILE)),
        };
        Ok(Self {
            db_path,
            engine: partial.engine,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_db_path_structure() {
        let path = get_db_path().expect("Should get valid path");

        assert_eq!(path.file_name().unwrap(), DB_FILE);
        let parent = path.parent().expect("Should have parent directory");
        assert_eq!(parent.file_name().unwrap(), APP_DIR);
        assert!(parent.is_dir());
    }

    #[test]
    fn test_get_db_path_consistent_results() {
        let path1 = get_db_path().expect("First call should succeed");
        let path2 = get_db_path().expect("Second call should succeed");
        assert_eq!(path1, path2);
    }

    #[test]
    fn test_engine_defaults() {
        let engine = EngineConfig::default();
        assert_eq!(engine.radio_length, 10);
        assert_eq!(engine.discovery_limit, 15);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = RuntimeConfig::from_json(r#"{"engine": {"discovery_limit": 5}}"#)
            .expect("valid config");

        assert_eq!(config.engine.discovery_limit, 5);
        assert_eq!(config.engine.radio_length, 10);
        assert_eq!(config.db_path.file_name().unwrap(), DB_FILE);
    }

    #[test]
    fn test_explicit_db_path() {
        let config = RuntimeConfig::from_json(r#"{"db_path": "/tmp/other.db"}"#).expect("valid");
        assert_eq!(config.db_path, PathBuf::from("/tmp/other.db"));
        assert_eq!(config.engine, EngineConfig::default());
    }

    #[test]
    fn test_malformed_json_is_rejected() {
        assert!(RuntimeConfig::from_json("{ not json").is_err());
    }

    #[test]
    fn test_from_file_reads_disk() {
        let dir = tempfile::TempDir::new().expect("temp dir");
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, r#"{"engine": {"radio_length": 3}}"#).expect("write config");

        let config = RuntimeConfig::from_file(&path).expect("loads");
        assert_eq!(config.engine.radio_length, 3);
    }
}
