//! Runtime configuration for the panel.
//!
//! Everything has a default, so running without a config file is fine. A config file is a JSON
//! object with any subset of the fields below:
//!
//! ```json
//! {
//!   "hostAddr": "127.0.0.1:12136",
//!   "panelId": "livecast.panel",
//!   "serviceProvider": "Facebook Live",
//!   "logLevel": "debug",
//!   "qualityPresets": [
//!     { "id": "hd", "resolution": { "width": 1280, "height": 720 }, "fps": 30, "bitrateKbps": 3000 }
//!   ]
//! }
//! ```

use crate::quality::{QualityPreset, QualityPresetRegistry};
use eyre::Context;
use serde::Deserialize;
use std::ffi::OsString;
use std::path::Path;
use tracing::level_filters::LevelFilter;

/// Overrides the config file location when no path is given on the command line.
pub const CONFIG_PATH_ENV: &str = "LIVECAST_CONFIG";

/// Overrides `hostAddr` regardless of what the config file says.
pub const HOST_ADDR_ENV: &str = "LIVECAST_HOST_ADDR";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default, deny_unknown_fields)]
pub struct PanelConfig {
    pub host_addr: String,
    pub panel_id: String,
    /// Name of the streaming service, as passed to the host when a stream starts.
    pub service_provider: String,
    pub log_level: LogLevel,
    /// Replaces the built-in quality presets when set.
    pub quality_presets: Option<Vec<QualityPreset>>,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            host_addr: "127.0.0.1:12136".to_string(),
            panel_id: "livecast.panel".to_string(),
            service_provider: "Facebook Live".to_string(),
            log_level: LogLevel::default(),
            quality_presets: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

impl PanelConfig {
    pub fn from_json(json: &str) -> eyre::Result<Self> {
        serde_json::from_str(json).context("parse panel config")
    }

    pub fn from_file(path: &Path) -> eyre::Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("read panel config from {}", path.display()))?;
        Self::from_json(&json).with_context(|| format!("load {}", path.display()))
    }

    /// Load the config named by `path`, falling back to [`CONFIG_PATH_ENV`], falling back to
    /// defaults, then apply environment overrides.
    pub fn load(path: Option<&Path>) -> eyre::Result<Self> {
        Self::load_with_env(path, |key| std::env::var_os(key))
    }

    fn load_with_env<E>(path: Option<&Path>, env: E) -> eyre::Result<Self>
    where
        E: Fn(&str) -> Option<OsString>,
    {
        let from_env = env(CONFIG_PATH_ENV);
        let path = path.or(from_env.as_deref().map(Path::new));
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        if let Some(addr) = env(HOST_ADDR_ENV) {
            config.host_addr = addr
                .into_string()
                .map_err(|addr| eyre::eyre!("{HOST_ADDR_ENV} is not valid UTF-8: {addr:?}"))?;
        }
        Ok(config)
    }

    pub fn presets(&self) -> eyre::Result<QualityPresetRegistry> {
        match &self.quality_presets {
            Some(presets) => {
                QualityPresetRegistry::new(presets.iter().cloned()).context("load quality presets")
            }
            None => Ok(QualityPresetRegistry::default()),
        }
    }
}
