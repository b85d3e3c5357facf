use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::{TrikeyError, TrikeyResult};

/// Top-level configuration (loaded from config.toml)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TrikeyConfig {
    pub crypto: CryptoConfig,
    pub search: SearchConfig,
    pub progress: ProgressConfig,
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CryptoConfig {
    /// Suffix appended to the ciphertext path to name the key file (default: .key.txt)
    pub sidecar_suffix: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Directory the name search starts from (default: /home)
    pub root: PathBuf,
}

/// Cosmetic progress bar shown after an encrypt/decrypt has finished
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressConfig {
    pub enabled: bool,
    /// Number of ticks (default: 100)
    pub steps: u64,
    /// Delay per tick in milliseconds (default: 15)
    pub step_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Log level (default: warn)
    pub level: String,
    /// Log format: "json" or "text"
    pub format: String,
}

impl Default for CryptoConfig {
    fn default() -> Self {
        Self {
            sidecar_suffix: ".key.txt".into(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("/home"),
        }
    }
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            steps: 100,
            step_delay_ms: 15,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "warn".into(),
            format: "text".into(),
        }
    }
}

impl TrikeyConfig {
    /// Load the config at `path`, falling back to defaults when the file does not exist.
    pub fn load(path: &Path) -> TrikeyResult<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)
            .map_err(|e| TrikeyError::Config(format!("parsing {}: {e}", path.display())))?;
        if config.crypto.sidecar_suffix.is_empty() {
            return Err(TrikeyError::Config(format!(
                "{}: crypto.sidecar_suffix must not be empty",
                path.display()
            )));
        }
        config.search.root = expand_tilde(&config.search.root);
        Ok(config)
    }
}

/// Expand `~` in path to the user's home directory
pub fn expand_tilde(path: &Path) -> PathBuf {
    let s = path.to_string_lossy();
    if let Some(rest) = s.strip_prefix("~/") {
        let home = std::env::var("HOME").unwrap_or_default();
        PathBuf::from(home).join(rest)
    } else {
        path.to_path_buf()
    }
}
