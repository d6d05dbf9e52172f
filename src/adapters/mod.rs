// Adapters - External system implementations

pub mod process_tokio;
pub mod scripted;
pub mod toml_config;
pub mod tracing_log;

// Re-export adapters
pub use process_tokio::{ProcessRunner, ToolPaths};
pub use scripted::{FfmpegScript, ScriptedProcess};
pub use toml_config::AppConfig;
pub use tracing_log::{init_tracing, LogFormat};
