//! CLI module for TrimX
//!
//! This module handles command-line argument parsing and command execution.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub mod args;
pub mod commands;

/// TrimX clip extractor
///
/// Cuts clips out of media files with ffmpeg, either by keyframe-aligned
/// stream copy or by frame-perfect re-encoding.
#[derive(Parser, Debug)]
#[command(name = "trimx")]
#[command(about = "TrimX - keyframe-aware clip extraction with ffmpeg")]
#[command(version)]
#[command(long_about = None)]
pub struct Cli {
    /// Configuration file (default: ./trimx.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Logging level or filter directive
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log output format (pretty, compact, json)
    #[arg(long, global = true)]
    pub log_format: Option<String>,

    /// Path to the ffmpeg executable
    #[arg(long, global = true)]
    pub ffmpeg: Option<PathBuf>,

    /// Path to the ffprobe executable
    #[arg(long, global = true)]
    pub ffprobe: Option<PathBuf>,

    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract a segment from a media file
    Clip(args::ClipArgs),
    /// Check whether a range of a media file is silent
    Silence(args::SilenceArgs),
    /// Find the keyframe nearest to an instant
    Keyframe(args::KeyframeArgs),
    /// Extract a list of clips from a JSON job file, one at a time
    Batch(args::BatchArgs),
}
