//! Command-line argument definitions

use std::path::PathBuf;

use clap::{Args, ValueEnum};

use crate::domain::model::SearchDirection;

/// Arguments for the clip command
#[derive(Args, Debug)]
pub struct ClipArgs {
    /// Input media file path
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output file path (must not exist yet)
    #[arg(short, long)]
    pub output: PathBuf,

    /// Start time (HH:MM:SS.ms, MM:SS.ms, or seconds)
    #[arg(short, long)]
    pub start: String,

    /// End time (HH:MM:SS.ms, MM:SS.ms, or seconds)
    #[arg(short, long)]
    pub end: String,

    /// Re-encode for frame-accurate edges instead of copying streams
    #[arg(long)]
    pub frame_perfect: bool,

    /// Source duration in milliseconds (probed with ffprobe when omitted)
    #[arg(long)]
    pub duration_ms: Option<f64>,
}

/// Arguments for the silence command
#[derive(Args, Debug)]
pub struct SilenceArgs {
    /// Input media file path
    #[arg(short, long)]
    pub input: PathBuf,

    /// Start time (HH:MM:SS.ms, MM:SS.ms, or seconds)
    #[arg(short, long)]
    pub start: String,

    /// End time (HH:MM:SS.ms, MM:SS.ms, or seconds)
    #[arg(short, long)]
    pub end: String,
}

/// Search direction as accepted on the command line
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectionArg {
    /// Last keyframe at or before the instant
    Backward,
    /// First keyframe at or after the instant
    Forward,
}

impl From<DirectionArg> for SearchDirection {
    fn from(direction: DirectionArg) -> Self {
        match direction {
            DirectionArg::Backward => SearchDirection::Backward,
            DirectionArg::Forward => SearchDirection::Forward,
        }
    }
}

/// Arguments for the keyframe command
#[derive(Args, Debug)]
pub struct KeyframeArgs {
    /// Input media file path
    #[arg(short, long)]
    pub input: PathBuf,

    /// Target instant (HH:MM:SS.ms, MM:SS.ms, or seconds)
    #[arg(long)]
    pub at: String,

    /// Which side of the instant to search
    #[arg(long, value_enum, default_value = "backward")]
    pub direction: DirectionArg,

    /// Source duration in milliseconds (probed with ffprobe when omitted)
    #[arg(long)]
    pub duration_ms: Option<f64>,
}

/// Arguments for the batch command
#[derive(Args, Debug)]
pub struct BatchArgs {
    /// JSON file with an array of clip jobs
    #[arg(short, long)]
    pub jobs: PathBuf,

    /// Number of leading jobs to skip, e.g. to resume after a failure
    #[arg(long, default_value_t = 0)]
    pub skip: usize,
}
