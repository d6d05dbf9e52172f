// TOML config adapter - Configuration file model and loading

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::adapters::process_tokio::DEFAULT_TICK_INTERVAL;
use crate::adapters::tracing_log::LogFormat;
use crate::error::{TrimXError, TrimXResult};

/// File looked up in the working directory when no `--config` is given
pub const DEFAULT_CONFIG_FILE: &str = "trimx.toml";

/// Application configuration
///
/// ```toml
/// [tools]
/// ffmpeg = "/opt/ffmpeg/bin/ffmpeg"
///
/// [engine]
/// tick_interval_ms = 100
///
/// [logging]
/// level = "debug"
/// format = "json"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub tools: ToolsConfig,
    pub engine: EngineSettings,
    pub logging: LoggingSettings,
}

/// Explicit tool locations; unset tools are looked up on PATH
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ffmpeg: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ffprobe: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineSettings {
    /// Interval between observer ticks while a tool runs
    pub tick_interval_ms: u64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            tick_interval_ms: DEFAULT_TICK_INTERVAL.as_millis() as u64,
        }
    }
}

impl EngineSettings {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingSettings {
    /// Level or full filter directive, e.g. `info` or `trimx_extract=debug`
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl AppConfig {
    pub fn from_toml_str(content: &str) -> TrimXResult<Self> {
        toml::from_str(content).map_err(|e| TrimXError::ConfigError {
            message: format!("failed to parse TOML config: {}", e),
        })
    }

    /// Load a config file. A missing file is an error here; callers decide
    /// whether a file is optional.
    pub fn load(path: &Path) -> TrimXResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| TrimXError::ConfigError {
            message: format!("failed to read config file {}: {}", path.display(), e),
        })?;
        Self::from_toml_str(&content).map_err(|e| match e {
            TrimXError::ConfigError { message } => TrimXError::ConfigError {
                message: format!("{}: {}", path.display(), message),
            },
            other => other,
        })
    }

    pub fn to_toml_string(&self) -> TrimXResult<String> {
        toml::to_string_pretty(self).map_err(|e| TrimXError::ConfigError {
            message: format!("failed to serialize config: {}", e),
        })
    }
}
