// Domain models - Core types and data structures

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{TrimXError, TrimXResult};

/// Width of the first keyframe probe window, and the step it slides by on a miss
pub const KEYFRAME_WINDOW_STEP_SECONDS: f64 = 5.0;

/// Time specification with precision - represents time in seconds with fractional precision
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct TimeSpec {
    pub seconds: f64,
}

impl TimeSpec {
    /// Create a new TimeSpec from seconds
    pub fn from_seconds(seconds: f64) -> Self {
        Self { seconds }
    }

    /// Create a new TimeSpec from hours, minutes, seconds, milliseconds
    pub fn from_components(hours: u32, minutes: u32, seconds: u32, milliseconds: u32) -> Self {
        let total_seconds = hours as f64 * 3600.0
            + minutes as f64 * 60.0
            + seconds as f64
            + milliseconds as f64 / 1000.0;
        Self { seconds: total_seconds }
    }

    /// Parse time string in seconds, MM:SS.ms or HH:MM:SS.ms
    pub fn parse(time_str: &str) -> TrimXResult<Self> {
        let trimmed = time_str.trim();
        let invalid = || TrimXError::InvalidTimeFormat {
            time: time_str.to_string(),
        };

        if let Ok(seconds) = trimmed.parse::<f64>() {
            if seconds < 0.0 || !seconds.is_finite() {
                return Err(invalid());
            }
            return Ok(Self::from_seconds(seconds));
        }

        let parts: Vec<&str> = trimmed.split(':').collect();
        match parts.as_slice() {
            [minutes, seconds] => {
                let minutes = minutes.parse::<u32>().map_err(|_| invalid())?;
                let seconds = seconds.parse::<f64>().map_err(|_| invalid())?;
                if !(0.0..60.0).contains(&seconds) {
                    return Err(invalid());
                }
                Ok(Self::from_seconds(minutes as f64 * 60.0 + seconds))
            }
            [hours, minutes, seconds] => {
                let hours = hours.parse::<u32>().map_err(|_| invalid())?;
                let minutes = minutes.parse::<u32>().map_err(|_| invalid())?;
                let seconds = seconds.parse::<f64>().map_err(|_| invalid())?;
                if minutes >= 60 || !(0.0..60.0).contains(&seconds) {
                    return Err(invalid());
                }
                Ok(Self::from_seconds(
                    hours as f64 * 3600.0 + minutes as f64 * 60.0 + seconds,
                ))
            }
            _ => Err(invalid()),
        }
    }

    /// Format as HH:MM:SS.ms
    pub fn format_hms(&self) -> String {
        let total_ms = (self.seconds * 1000.0).round() as u64;
        let hours = total_ms / 3_600_000;
        let minutes = (total_ms % 3_600_000) / 60_000;
        let seconds = (total_ms % 60_000) / 1000;
        let milliseconds = total_ms % 1000;

        if hours > 0 {
            format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, seconds, milliseconds)
        } else {
            format!("{:02}:{:02}.{:03}", minutes, seconds, milliseconds)
        }
    }
}

impl fmt::Display for TimeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_hms())
    }
}

/// A single clip to extract, fully resolved by the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClipRequest {
    pub source_path: PathBuf,
    pub output_path: PathBuf,
    pub start_seconds: f64,
    pub end_seconds: f64,
    #[serde(default)]
    pub frame_perfect: bool,
    /// Full length of the source media in milliseconds
    pub source_duration_ms: f64,
}

impl ClipRequest {
    pub fn new(
        source_path: impl Into<PathBuf>,
        output_path: impl Into<PathBuf>,
        start_seconds: f64,
        end_seconds: f64,
        frame_perfect: bool,
        source_duration_ms: f64,
    ) -> Self {
        Self {
            source_path: source_path.into(),
            output_path: output_path.into(),
            start_seconds,
            end_seconds,
            frame_perfect,
            source_duration_ms,
        }
    }

    /// Source duration in seconds
    pub fn source_duration_seconds(&self) -> f64 {
        self.source_duration_ms / 1000.0
    }

    /// Requested clip length in seconds
    pub fn clip_length_seconds(&self) -> f64 {
        self.end_seconds - self.start_seconds
    }
}

/// Which side of the target instant a keyframe search looks at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchDirection {
    /// Nearest keyframe at or before the target
    Backward,
    /// Nearest keyframe at or after the target
    Forward,
}

impl fmt::Display for SearchDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchDirection::Backward => write!(f, "backward"),
            SearchDirection::Forward => write!(f, "forward"),
        }
    }
}

/// Progress of one boundary search across successive probe windows
#[derive(Debug, Clone, PartialEq)]
pub struct KeyframeSearchState {
    pub target_seconds: f64,
    pub direction: SearchDirection,
    pub window_width_seconds: f64,
    pub resolved_seconds: Option<f64>,
    /// Set when the search ran into the media boundary without a candidate
    pub exhausted: bool,
}

impl KeyframeSearchState {
    pub fn new(target_seconds: f64, direction: SearchDirection) -> Self {
        Self {
            target_seconds,
            direction,
            window_width_seconds: KEYFRAME_WINDOW_STEP_SECONDS,
            resolved_seconds: None,
            exhausted: false,
        }
    }

    /// Current probe window `(from, to)`. `from` may be negative for backward searches.
    ///
    /// The window slides outward by one step per miss, so each probe covers
    /// only the newly added span instead of the whole distance to the target.
    pub fn window(&self) -> (f64, f64) {
        let inner = self.window_width_seconds - KEYFRAME_WINDOW_STEP_SECONDS;
        match self.direction {
            SearchDirection::Backward => (
                self.target_seconds - self.window_width_seconds,
                self.target_seconds - inner,
            ),
            SearchDirection::Forward => (
                self.target_seconds + inner,
                self.target_seconds + self.window_width_seconds,
            ),
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved_seconds.is_some()
    }

    /// Pick the best candidate among probed keyframe timestamps.
    /// Returns true once the search is resolved.
    pub fn absorb(&mut self, keyframes: &[f64]) -> bool {
        let target = self.target_seconds;
        let candidate = match self.direction {
            SearchDirection::Backward => keyframes
                .iter()
                .copied()
                .filter(|t| *t <= target)
                .fold(None, |best: Option<f64>, t| Some(best.map_or(t, |b| b.max(t)))),
            SearchDirection::Forward => keyframes
                .iter()
                .copied()
                .filter(|t| *t >= target)
                .fold(None, |best: Option<f64>, t| Some(best.map_or(t, |b| b.min(t)))),
        };

        if let Some(found) = candidate {
            self.resolved_seconds = Some(found);
        }
        self.is_resolved()
    }

    /// Move on after a probe without candidates: either fall back to the media
    /// boundary or slide the window one step further out.
    pub fn advance(&mut self, media_duration_seconds: f64) {
        let reached_boundary = match self.direction {
            SearchDirection::Backward => self.target_seconds - self.window_width_seconds <= 0.0,
            SearchDirection::Forward => {
                self.target_seconds + self.window_width_seconds >= media_duration_seconds
            }
        };

        if reached_boundary {
            self.exhausted = true;
            self.resolved_seconds = Some(match self.direction {
                SearchDirection::Backward => 0.0,
                SearchDirection::Forward => media_duration_seconds,
            });
        } else {
            self.window_width_seconds += KEYFRAME_WINDOW_STEP_SECONDS;
        }
    }
}

/// External tools the engine drives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    /// General purpose transcode/demux tool
    Ffmpeg,
    /// Metadata probe tool
    Ffprobe,
}

impl ToolKind {
    pub fn binary_name(&self) -> &'static str {
        match self {
            ToolKind::Ffmpeg => "ffmpeg",
            ToolKind::Ffprobe => "ffprobe",
        }
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.binary_name())
    }
}

/// One command line for an external tool
#[derive(Debug, Clone, PartialEq)]
pub struct ToolInvocation {
    pub tool: ToolKind,
    pub args: Vec<String>,
}

impl ToolInvocation {
    pub fn new(tool: ToolKind, args: Vec<String>) -> Self {
        Self { tool, args }
    }

    /// Render for logs
    pub fn display_line(&self) -> String {
        format!("{} {}", self.tool, self.args.join(" "))
    }
}

/// Captured result of a finished tool run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessResult {
    /// Exit code, or -1 when the process was terminated by a signal
    pub exit_code: i32,
    pub stdout_lines: Vec<String>,
    pub stderr_lines: Vec<String>,
    pub succeeded: bool,
    /// The run was stopped through the cancellation signal
    pub cancelled: bool,
}

impl ProcessResult {
    /// Last few stderr lines, for error reports
    pub fn stderr_tail(&self, lines: usize) -> String {
        let skip = self.stderr_lines.len().saturating_sub(lines);
        self.stderr_lines[skip..].join("\n")
    }
}

/// Terminal status of an extraction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExtractionStatus {
    Success,
    /// The output path was already taken; nothing was written
    AlreadyExists,
    ProcessFailure,
    Cancelled,
}

/// Result of one `extract` call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionOutcome {
    pub status: ExtractionStatus,
    pub output_path: PathBuf,
    /// A failed attempt left a file at `output_path` that the caller should clean up
    pub partial_file_left_behind: bool,
    /// The `[from, to]` range handed to the final ffmpeg run, when one was started
    pub extracted_range: Option<(f64, f64)>,
}

impl ExtractionOutcome {
    pub fn success(output_path: PathBuf, extracted_range: (f64, f64)) -> Self {
        Self {
            status: ExtractionStatus::Success,
            output_path,
            partial_file_left_behind: false,
            extracted_range: Some(extracted_range),
        }
    }

    pub fn already_exists(output_path: PathBuf) -> Self {
        Self {
            status: ExtractionStatus::AlreadyExists,
            output_path,
            partial_file_left_behind: false,
            extracted_range: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ExtractionStatus::Success
    }
}

#[cfg(test)]
mod tests;
