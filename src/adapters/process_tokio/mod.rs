//! Child process runner built on tokio
//!
//! Runs one ffmpeg/ffprobe invocation at a time, captures both output streams
//! and hands control back to the caller through observer ticks while waiting.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::domain::model::{ProcessResult, ToolInvocation, ToolKind};
use crate::engine::progress::ExtractionObserver;
use crate::error::{TrimXError, TrimXResult};
use crate::ports::ProcessPort;

/// Default interval between observer ticks while a tool runs
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(50);

#[cfg(windows)]
const CREATE_NO_WINDOW: u32 = 0x0800_0000;

/// Resolved locations of the external tools
#[derive(Debug, Clone, PartialEq)]
pub struct ToolPaths {
    pub ffmpeg: PathBuf,
    pub ffprobe: PathBuf,
}

impl ToolPaths {
    /// Use the given paths without checking them
    pub fn new(ffmpeg: impl Into<PathBuf>, ffprobe: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            ffprobe: ffprobe.into(),
        }
    }

    /// Resolve both tools, falling back to a PATH lookup of the default names
    pub fn resolve(ffmpeg: Option<&Path>, ffprobe: Option<&Path>) -> TrimXResult<Self> {
        Ok(Self {
            ffmpeg: resolve_tool(ToolKind::Ffmpeg, ffmpeg)?,
            ffprobe: resolve_tool(ToolKind::Ffprobe, ffprobe)?,
        })
    }

    pub fn path_for(&self, tool: ToolKind) -> &Path {
        match tool {
            ToolKind::Ffmpeg => &self.ffmpeg,
            ToolKind::Ffprobe => &self.ffprobe,
        }
    }
}

fn resolve_tool(tool: ToolKind, configured: Option<&Path>) -> TrimXResult<PathBuf> {
    let candidate = configured
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(tool.binary_name()));

    let resolved = which::which(&candidate).map_err(|_| TrimXError::ToolNotFound {
        tool: tool.to_string(),
        searched: candidate.display().to_string(),
    })?;
    debug!("Resolved {} to {}", tool, resolved.display());
    Ok(resolved)
}

/// Runner for external tool invocations with tick callbacks and cancellation
pub struct ProcessRunner {
    tools: ToolPaths,
    tick_interval: Duration,
    cancel_rx: Option<watch::Receiver<bool>>,
}

impl ProcessRunner {
    pub fn new(tools: ToolPaths) -> Self {
        Self {
            tools,
            tick_interval: DEFAULT_TICK_INTERVAL,
            cancel_rx: None,
        }
    }

    /// Set how often `on_tick` fires while waiting
    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = interval.max(Duration::from_millis(1));
        self
    }

    /// Set cancellation signal. Sending `true` kills the running child.
    pub fn with_cancel(mut self, cancel_rx: watch::Receiver<bool>) -> Self {
        self.cancel_rx = Some(cancel_rx);
        self
    }

    pub fn tools(&self) -> &ToolPaths {
        &self.tools
    }

    fn spawn_error(&self, tool: ToolKind, err: std::io::Error) -> TrimXError {
        if err.kind() == std::io::ErrorKind::NotFound {
            TrimXError::ToolNotFound {
                tool: tool.to_string(),
                searched: self.tools.path_for(tool).display().to_string(),
            }
        } else {
            TrimXError::ToolSpawn {
                tool: tool.to_string(),
                source: err,
            }
        }
    }
}

#[async_trait]
impl ProcessPort for ProcessRunner {
    async fn run(
        &self,
        invocation: &ToolInvocation,
        observer: &dyn ExtractionObserver,
    ) -> TrimXResult<ProcessResult> {
        let program = self.tools.path_for(invocation.tool);
        debug!("Running {}", invocation.display_line());

        let mut command = Command::new(program);
        command
            .args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        #[cfg(windows)]
        command.creation_flags(CREATE_NO_WINDOW);

        let mut child = command
            .spawn()
            .map_err(|e| self.spawn_error(invocation.tool, e))?;

        let stdout_task = tokio::spawn(collect_lines(child.stdout.take()));
        let stderr_task = tokio::spawn(collect_lines(child.stderr.take()));

        let mut ticker = tokio::time::interval(self.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut cancel_rx = self.cancel_rx.clone();
        let mut cancelled = false;

        let status = loop {
            tokio::select! {
                status = child.wait() => break status?,
                _ = ticker.tick() => observer.on_tick(),
                _ = cancellation_requested(&mut cancel_rx), if !cancelled => {
                    info!("{} cancelled, killing process", invocation.tool);
                    cancelled = true;
                    if let Err(e) = child.start_kill() {
                        warn!("Failed to kill {}: {}", invocation.tool, e);
                    }
                }
            }
        };

        let stdout_lines = stdout_task.await.unwrap_or_default();
        let stderr_lines = stderr_task.await.unwrap_or_default();

        let result = ProcessResult {
            exit_code: status.code().unwrap_or(-1),
            stdout_lines,
            stderr_lines,
            succeeded: status.success() && !cancelled,
            cancelled,
        };

        if !result.succeeded && !cancelled {
            debug!(
                "{} exited with code {}: {}",
                invocation.tool,
                result.exit_code,
                result.stderr_tail(5)
            );
        }

        Ok(result)
    }
}

/// Resolves once the signal reads `true`; never resolves without a signal
async fn cancellation_requested(cancel_rx: &mut Option<watch::Receiver<bool>>) {
    let Some(rx) = cancel_rx else {
        return std::future::pending().await;
    };

    loop {
        if *rx.borrow_and_update() {
            return;
        }
        if rx.changed().await.is_err() {
            // Sender gone: cancellation can no longer be requested
            return std::future::pending().await;
        }
    }
}

/// Drain a pipe into lines. Bytes are decoded lossily so odd tool output never
/// stops the drain and blocks the child on a full pipe.
async fn collect_lines<R>(reader: Option<R>) -> Vec<String>
where
    R: AsyncRead + Unpin,
{
    let Some(reader) = reader else {
        return Vec::new();
    };

    let mut reader = BufReader::new(reader);
    let mut lines = Vec::new();
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                // ffmpeg redraws its stats with bare `\r`, so both end a line
                let text = String::from_utf8_lossy(&buf);
                let chunk = text.strip_suffix('\n').unwrap_or(&*text);
                let chunk = chunk.strip_suffix('\r').unwrap_or(chunk);
                lines.extend(
                    chunk
                        .split('\r')
                        .filter(|piece| !piece.is_empty())
                        .map(str::to_string),
                );
                if chunk.is_empty() {
                    lines.push(String::new());
                }
            }
            Err(e) => {
                warn!("Stopped reading tool output: {}", e);
                break;
            }
        }
    }
    lines
}
