//! User configuration, read from `<data dir>/config.yaml`

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::constants::{
    CONFIG_FILE, DATA_DIR_ENV, DATA_DIR_NAME, DEFAULT_HISTORY_LIMIT, DEFAULT_SANDBOX_ORIGIN,
    DEFAULT_TIMEOUT_SECS,
};

/// Which transport executes requests
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TransportMode {
    /// Direct network access, no cross-origin policy
    #[default]
    Privileged,
    /// Browser-like: cross-origin policy enforced against `sandbox_origin`
    Sandboxed,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub history_limit: usize,
    pub transport: TransportMode,
    pub sandbox_origin: String,
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            history_limit: DEFAULT_HISTORY_LIMIT,
            transport: TransportMode::Privileged,
            sandbox_origin: DEFAULT_SANDBOX_ORIGIN.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Config {
    pub fn parse(content: &str) -> Result<Self> {
        let mut config: Config = serde_yaml::from_str(content)?;
        config.history_limit = config.history_limit.max(1);
        config.timeout_secs = config.timeout_secs.max(1);
        if !is_valid_origin(&config.sandbox_origin) {
            tracing::warn!(origin = %config.sandbox_origin, "Invalid sandbox_origin, using the default");
            config.sandbox_origin = DEFAULT_SANDBOX_ORIGIN.to_string();
        }
        Ok(config)
    }

    /// Load from a file; missing or broken files fall back to defaults
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Config::default();
        }
        match fs::read_to_string(path)
            .map_err(anyhow::Error::from)
            .and_then(|content| Config::parse(&content))
        {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Ignoring unreadable config");
                Config::default()
            }
        }
    }

    pub fn load() -> Self {
        Self::load_from(&data_dir().join(CONFIG_FILE))
    }
}

/// An absolute URL with a scheme/host/port origin
fn is_valid_origin(origin: &str) -> bool {
    reqwest::Url::parse(origin).is_ok_and(|url| url.origin().is_tuple())
}

/// `$HERMES_HOME`, else `~/.hermes`, else `./.hermes`
pub fn data_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os(DATA_DIR_ENV).filter(|v| !v.is_empty()) {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DATA_DIR_NAME)
}
