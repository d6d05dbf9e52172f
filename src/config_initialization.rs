//! Configuration initialization and hierarchy management

use std::path::{Path, PathBuf};

use tracing::info;

use crate::adapters::toml_config::{AppConfig, DEFAULT_CONFIG_FILE};
use crate::adapters::tracing_log::LogFormat;
use crate::cli::Cli;
use crate::error::{TrimXError, TrimXResult};

pub const ENV_FFMPEG: &str = "TRIMX_FFMPEG";
pub const ENV_FFPROBE: &str = "TRIMX_FFPROBE";
pub const ENV_LOG_LEVEL: &str = "TRIMX_LOG_LEVEL";
pub const ENV_LOG_FORMAT: &str = "TRIMX_LOG_FORMAT";
pub const ENV_TICK_INTERVAL_MS: &str = "TRIMX_TICK_INTERVAL_MS";

/// Effective configuration and where it came from
#[derive(Debug, Clone, Default)]
pub struct LoadedConfig {
    pub config: AppConfig,
    pub file: Option<PathBuf>,
    /// Names of the settings overridden by environment or flags
    pub overrides: Vec<String>,
}

impl LoadedConfig {
    /// Log the configuration origin. Called once the subscriber exists,
    /// since logging itself depends on the configuration.
    pub fn log_summary(&self) {
        match &self.file {
            Some(path) => info!("Loaded configuration from {}", path.display()),
            None => info!("No configuration file, using defaults"),
        }
        for key in &self.overrides {
            info!("Configuration override: {}", key);
        }
    }
}

/// Initialize configuration hierarchy following precedence: CLI > Env > File > Defaults
pub fn initialize_configuration_hierarchy(cli: &Cli) -> TrimXResult<LoadedConfig> {
    let mut loaded = load_config_file(cli.config.as_deref())?;
    apply_environment_overrides(&mut loaded, |key| std::env::var(key).ok())?;
    apply_cli_overrides(&mut loaded, cli)?;
    Ok(loaded)
}

/// An explicit `--config` must exist; the default file is optional
pub fn load_config_file(explicit: Option<&Path>) -> TrimXResult<LoadedConfig> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => {
            let default = PathBuf::from(DEFAULT_CONFIG_FILE);
            if !default.is_file() {
                return Ok(LoadedConfig::default());
            }
            default
        }
    };

    Ok(LoadedConfig {
        config: AppConfig::load(&path)?,
        file: Some(path),
        overrides: Vec::new(),
    })
}

/// Apply `TRIMX_*` variables. `lookup` is `std::env::var` outside of tests.
pub fn apply_environment_overrides<F>(loaded: &mut LoadedConfig, lookup: F) -> TrimXResult<()>
where
    F: Fn(&str) -> Option<String>,
{
    let value = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
    let config = &mut loaded.config;
    let mut applied = Vec::new();

    if let Some(path) = value(ENV_FFMPEG) {
        config.tools.ffmpeg = Some(PathBuf::from(path));
        applied.push(ENV_FFMPEG);
    }
    if let Some(path) = value(ENV_FFPROBE) {
        config.tools.ffprobe = Some(PathBuf::from(path));
        applied.push(ENV_FFPROBE);
    }
    if let Some(level) = value(ENV_LOG_LEVEL) {
        config.logging.level = level.trim().to_string();
        applied.push(ENV_LOG_LEVEL);
    }
    if let Some(format) = value(ENV_LOG_FORMAT) {
        config.logging.format = format.parse::<LogFormat>()?;
        applied.push(ENV_LOG_FORMAT);
    }
    if let Some(ms) = value(ENV_TICK_INTERVAL_MS) {
        config.engine.tick_interval_ms =
            ms.trim().parse().map_err(|_| TrimXError::ConfigError {
                message: format!(
                    "{} must be a whole number of milliseconds, got '{}'",
                    ENV_TICK_INTERVAL_MS, ms
                ),
            })?;
        applied.push(ENV_TICK_INTERVAL_MS);
    }

    loaded
        .overrides
        .extend(applied.into_iter().map(|key| format!("env {}", key)));
    Ok(())
}

/// Apply global command-line flags
pub fn apply_cli_overrides(loaded: &mut LoadedConfig, cli: &Cli) -> TrimXResult<()> {
    let config = &mut loaded.config;

    if let Some(path) = &cli.ffmpeg {
        config.tools.ffmpeg = Some(path.clone());
        loaded.overrides.push("--ffmpeg".to_string());
    }
    if let Some(path) = &cli.ffprobe {
        config.tools.ffprobe = Some(path.clone());
        loaded.overrides.push("--ffprobe".to_string());
    }
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
        loaded.overrides.push("--log-level".to_string());
    }
    if let Some(format) = &cli.log_format {
        config.logging.format = format.parse()?;
        loaded.overrides.push("--log-format".to_string());
    }

    Ok(())
}
