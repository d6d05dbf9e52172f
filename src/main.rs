//! TrimX clip extractor
//!
//! Command-line front end of the `trimx_extract` engine.
//!
//! # Usage
//!
//! ```bash
//! trimx clip --input talk.mp4 --output intro.mp4 --start 00:10 --end 01:25
//! trimx clip -i talk.mp4 -o exact.mp4 -s 10.5 -e 12 --frame-perfect
//! trimx silence -i talk.mkv -s 42 -e 44
//! trimx keyframe -i talk.mp4 --at 01:00 --direction forward
//! trimx batch --jobs clips.json --skip 3
//! ```

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::watch;
use tracing::{info, warn};

use trimx_extract::adapters::tracing_log::init_tracing;
use trimx_extract::adapters::{ProcessRunner, ToolPaths};
use trimx_extract::cli::{commands, Cli};
use trimx_extract::config_initialization::initialize_configuration_hierarchy;
use trimx_extract::ports::ProcessPort;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let loaded = initialize_configuration_hierarchy(&cli).context("Failed to load configuration")?;
    init_tracing(&loaded.config.logging.level, loaded.config.logging.format)?;
    loaded.log_summary();

    let config = &loaded.config;
    let tools = ToolPaths::resolve(config.tools.ffmpeg.as_deref(), config.tools.ffprobe.as_deref())?;
    info!(
        "Using ffmpeg {} and ffprobe {}",
        tools.ffmpeg.display(),
        tools.ffprobe.display()
    );

    let (cancel_tx, cancel_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, stopping the running tool");
            let _ = cancel_tx.send(true);
        }
    });

    let runner = ProcessRunner::new(tools)
        .with_tick_interval(config.engine.tick_interval())
        .with_cancel(cancel_rx);
    let process: Arc<dyn ProcessPort> = Arc::new(runner);

    commands::run(cli.command, process).await
}
