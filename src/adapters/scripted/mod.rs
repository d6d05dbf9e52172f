// Scripted process adapter - Deterministic stand-in for ffmpeg/ffprobe
//
// Answers keyframe probes from an in-memory keyframe index and plays back a
// configured ffmpeg outcome. Every invocation is recorded for inspection.

use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::model::{ProcessResult, ToolInvocation, ToolKind};
use crate::engine::progress::ExtractionObserver;
use crate::error::TrimXResult;
use crate::ports::ProcessPort;

/// How scripted ffmpeg runs end
#[derive(Debug, Clone, PartialEq)]
pub enum FfmpegScript {
    /// Exit 0 and create the output file
    Succeed,
    /// Exit non-zero, optionally leaving a truncated output file behind
    Fail { write_partial: bool },
    /// Behave as if the run was cancelled mid-way
    Cancel { write_partial: bool },
}

/// In-memory process port
pub struct ScriptedProcess {
    keyframes: Vec<f64>,
    duration_seconds: Option<f64>,
    ffmpeg: FfmpegScript,
    ffmpeg_stderr: Vec<String>,
    probe_fails: bool,
    calls: Mutex<Vec<ToolInvocation>>,
}

impl Default for ScriptedProcess {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedProcess {
    pub fn new() -> Self {
        Self {
            keyframes: Vec::new(),
            duration_seconds: None,
            ffmpeg: FfmpegScript::Succeed,
            ffmpeg_stderr: Vec::new(),
            probe_fails: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Keyframe timestamps of the simulated source
    pub fn with_keyframes(mut self, mut keyframes: Vec<f64>) -> Self {
        keyframes.sort_by(|a, b| a.total_cmp(b));
        self.keyframes = keyframes;
        self
    }

    /// Answer for duration probes
    pub fn with_duration(mut self, seconds: f64) -> Self {
        self.duration_seconds = Some(seconds);
        self
    }

    pub fn with_ffmpeg(mut self, script: FfmpegScript) -> Self {
        self.ffmpeg = script;
        self
    }

    /// Lines ffmpeg writes to stderr, e.g. astats output
    pub fn with_ffmpeg_stderr<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ffmpeg_stderr = lines.into_iter().map(Into::into).collect();
        self
    }

    /// Make every ffprobe run exit with an error
    pub fn with_failing_probe(mut self) -> Self {
        self.probe_fails = true;
        self
    }

    /// Every invocation seen so far, in order
    pub fn calls(&self) -> Vec<ToolInvocation> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn calls_for(&self, tool: ToolKind) -> Vec<ToolInvocation> {
        self.calls()
            .into_iter()
            .filter(|call| call.tool == tool)
            .collect()
    }

    pub fn probe_count(&self) -> usize {
        self.calls_for(ToolKind::Ffprobe).len()
    }

    /// `-read_intervals` values of all keyframe probes, in order
    pub fn read_intervals(&self) -> Vec<String> {
        self.calls_for(ToolKind::Ffprobe)
            .iter()
            .filter_map(|call| arg_after(&call.args, "-read_intervals"))
            .collect()
    }

    fn answer_probe(&self, invocation: &ToolInvocation) -> ProcessResult {
        if self.probe_fails {
            return ProcessResult {
                exit_code: 1,
                stderr_lines: vec!["Invalid data found when processing input".to_string()],
                ..Default::default()
            };
        }

        let stdout_lines = match arg_after(&invocation.args, "-read_intervals") {
            Some(interval) => {
                let (from, to) = parse_interval(&interval);
                self.keyframes
                    .iter()
                    .filter(|t| **t >= from && **t <= to)
                    .map(|t| format!("{:.6}", t))
                    .collect()
            }
            None => self
                .duration_seconds
                .map(|d| vec![format!("{:.6}", d)])
                .unwrap_or_else(|| vec!["N/A".to_string()]),
        };

        ProcessResult {
            exit_code: 0,
            stdout_lines,
            succeeded: true,
            ..Default::default()
        }
    }

    async fn answer_ffmpeg(&self, invocation: &ToolInvocation) -> TrimXResult<ProcessResult> {
        let output = invocation
            .args
            .last()
            .filter(|arg| arg.as_str() != "-")
            .map(PathBuf::from);

        let (write, exit_code, cancelled) = match self.ffmpeg {
            FfmpegScript::Succeed => (true, 0, false),
            FfmpegScript::Fail { write_partial } => (write_partial, 1, false),
            FfmpegScript::Cancel { write_partial } => (write_partial, -1, true),
        };

        if let (true, Some(path)) = (write, output) {
            tokio::fs::write(&path, b"scripted media").await?;
        }

        Ok(ProcessResult {
            exit_code,
            stdout_lines: Vec::new(),
            stderr_lines: self.ffmpeg_stderr.clone(),
            succeeded: exit_code == 0 && !cancelled,
            cancelled,
        })
    }
}

#[async_trait]
impl ProcessPort for ScriptedProcess {
    async fn run(
        &self,
        invocation: &ToolInvocation,
        observer: &dyn ExtractionObserver,
    ) -> TrimXResult<ProcessResult> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(invocation.clone());
        }
        observer.on_tick();

        match invocation.tool {
            ToolKind::Ffprobe => Ok(self.answer_probe(invocation)),
            ToolKind::Ffmpeg => self.answer_ffmpeg(invocation).await,
        }
    }
}

fn arg_after(args: &[String], flag: &str) -> Option<String> {
    args.iter()
        .position(|arg| arg == flag)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn parse_interval(interval: &str) -> (f64, f64) {
    let (from, to) = interval.split_once('%').unwrap_or((interval, ""));
    (
        from.parse().unwrap_or(0.0),
        to.parse().unwrap_or(f64::INFINITY),
    )
}
