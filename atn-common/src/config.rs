//! Configuration loading and root folder resolution

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Database file name inside the root folder
pub const DATABASE_FILE: &str = "attendance.db";

/// Config file name inside the root folder
pub const CONFIG_FILE: &str = "config.toml";

/// Root folder resolution priority order:
/// 1. Command-line argument (highest priority)
/// 2. Environment variable
/// 3. OS-dependent compiled default (fallback)
pub fn resolve_root_folder(cli_arg: Option<&Path>, env_var_name: &str) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }

    if let Ok(path) = std::env::var(env_var_name) {
        return PathBuf::from(path);
    }

    default_root_folder()
}

/// Get OS-dependent default root folder path
fn default_root_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        // ~/.local/share/atn (or /var/lib/atn for system-wide)
        dirs::data_local_dir()
            .map(|d| d.join("atn"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/atn"))
    } else if cfg!(target_os = "macos") {
        dirs::data_dir()
            .map(|d| d.join("atn"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/atn"))
    } else if cfg!(target_os = "windows") {
        dirs::data_local_dir()
            .map(|d| d.join("atn"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\atn"))
    } else {
        PathBuf::from("./atn_data")
    }
}

/// Ensure the root folder exists and return the database path inside it
pub fn prepare_root_folder(root: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(root)?;
    Ok(root.join(DATABASE_FILE))
}

/// Engine tuning knobs.
///
/// Loaded from `config.toml` in the root folder when present; every field
/// has a serde default so a missing or partial file is fine.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Debounce window for near-duplicate punch suppression, in seconds
    pub debounce_window_secs: i64,

    /// Maximum width for zero-left-padded matricule variants
    pub matricule_pad_width: usize,

    /// Run the anomaly detector synchronously at ingestion time
    pub detect_on_ingest: bool,

    /// Port the ingestion service listens on
    pub bind_port: u16,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            debounce_window_secs: 5,
            matricule_pad_width: 10,
            detect_on_ingest: true,
            bind_port: 5730,
        }
    }
}

impl EngineConfig {
    /// Load configuration from `config.toml` in the root folder.
    ///
    /// A missing file yields the defaults; a malformed file is an error
    /// (silently ignoring a bad config hides operator mistakes).
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sane() {
        let config = EngineConfig::default();
        assert_eq!(config.debounce_window_secs, 5);
        assert_eq!(config.matricule_pad_width, 10);
        assert!(config.detect_on_ingest);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: EngineConfig = toml::from_str("debounce_window_secs = 3").unwrap();
        assert_eq!(config.debounce_window_secs, 3);
        assert_eq!(config.matricule_pad_width, 10);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = EngineConfig::load(dir.path()).unwrap();
        assert_eq!(config.bind_port, 5730);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "debounce_window_secs = \"nope").unwrap();
        assert!(EngineConfig::load(dir.path()).is_err());
    }
}
