//! ffmpeg and ffprobe command builders

use std::path::Path;

use crate::domain::model::{ToolInvocation, ToolKind};
use crate::utils::time::{format_read_interval, format_seconds};

/// Builder for ffmpeg command lines: `<input args> -i <input> <output args> <output>`
#[derive(Debug, Clone)]
pub struct FfmpegCommand {
    input: String,
    output: String,
    input_args: Vec<String>,
    output_args: Vec<String>,
    no_overwrite: bool,
}

impl FfmpegCommand {
    pub fn new(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Self {
        Self {
            input: input.as_ref().to_string_lossy().to_string(),
            output: output.as_ref().to_string_lossy().to_string(),
            input_args: Vec::new(),
            output_args: Vec::new(),
            no_overwrite: false,
        }
    }

    /// Command whose output is discarded through the null muxer
    pub fn to_null_sink(input: impl AsRef<Path>) -> Self {
        Self::new(input, "-")
    }

    /// Add input arguments (before -i).
    pub fn input_arg(mut self, arg: impl Into<String>) -> Self {
        self.input_args.push(arg.into());
        self
    }

    /// Add output arguments (after -i).
    pub fn output_arg(mut self, arg: impl Into<String>) -> Self {
        self.output_args.push(arg.into());
        self
    }

    /// Read only `[from, to]` of the input, seeking before decoding.
    pub fn range(self, from: f64, to: f64) -> Self {
        self.input_arg("-ss")
            .input_arg(format_seconds(from))
            .input_arg("-to")
            .input_arg(format_seconds(to))
    }

    pub fn video_codec(self, codec: impl Into<String>) -> Self {
        self.output_arg("-c:v").output_arg(codec)
    }

    pub fn audio_codec(self, codec: impl Into<String>) -> Self {
        self.output_arg("-c:a").output_arg(codec)
    }

    pub fn crf(self, crf: u8) -> Self {
        self.output_arg("-crf").output_arg(crf.to_string())
    }

    pub fn preset(self, preset: impl Into<String>) -> Self {
        self.output_arg("-preset").output_arg(preset)
    }

    pub fn threads(self, threads: usize) -> Self {
        self.output_arg("-threads").output_arg(threads.to_string())
    }

    pub fn audio_bitrate(self, bitrate: impl Into<String>) -> Self {
        self.output_arg("-b:a").output_arg(bitrate)
    }

    /// Copy every stream without re-encoding
    pub fn copy_all_streams(self) -> Self {
        self.output_arg("-c")
            .output_arg("copy")
            .output_arg("-map")
            .output_arg("0")
    }

    pub fn map(self, specifier: impl Into<String>) -> Self {
        self.output_arg("-map").output_arg(specifier)
    }

    pub fn audio_filter(self, filter: impl Into<String>) -> Self {
        self.output_arg("-af").output_arg(filter)
    }

    pub fn format(self, format: impl Into<String>) -> Self {
        self.output_arg("-f").output_arg(format)
    }

    /// Pass `-n` so ffmpeg exits instead of replacing an existing output
    pub fn no_overwrite(mut self) -> Self {
        self.no_overwrite = true;
        self
    }

    /// Build the command arguments.
    pub fn build_args(&self) -> Vec<String> {
        let mut args = Vec::with_capacity(self.input_args.len() + self.output_args.len() + 4);
        args.extend(self.input_args.iter().cloned());
        args.push("-i".to_string());
        args.push(self.input.clone());
        args.extend(self.output_args.iter().cloned());
        if self.no_overwrite {
            args.push("-n".to_string());
        }
        args.push(self.output.clone());
        args
    }

    pub fn into_invocation(self) -> ToolInvocation {
        ToolInvocation::new(ToolKind::Ffmpeg, self.build_args())
    }
}

/// Keyframe timestamps of the default video stream inside `[from, to]`
pub fn keyframe_probe(source: &Path, from: f64, to: f64) -> ToolInvocation {
    ToolInvocation::new(
        ToolKind::Ffprobe,
        vec![
            "-skip_frame".to_string(),
            "nokey".to_string(),
            "-select_streams".to_string(),
            "v:0".to_string(),
            "-show_entries".to_string(),
            "frame=pts_time".to_string(),
            "-of".to_string(),
            "csv=print_section=0".to_string(),
            "-read_intervals".to_string(),
            format_read_interval(from, to),
            source.to_string_lossy().to_string(),
        ],
    )
}

/// Container duration in seconds, printed as a bare number
pub fn duration_probe(source: &Path) -> ToolInvocation {
    ToolInvocation::new(
        ToolKind::Ffprobe,
        vec![
            "-v".to_string(),
            "error".to_string(),
            "-show_entries".to_string(),
            "format=duration".to_string(),
            "-of".to_string(),
            "default=noprint_wrappers=1:nokey=1".to_string(),
            source.to_string_lossy().to_string(),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_builder_order() {
        let args = FfmpegCommand::new("in.mp4", "out.mp4")
            .range(1.5, 3.0)
            .copy_all_streams()
            .build_args();

        assert_eq!(
            args,
            vec!["-ss", "1.500", "-to", "3.000", "-i", "in.mp4", "-c", "copy", "-map", "0", "out.mp4"]
        );
    }

    #[test]
    fn test_no_overwrite_precedes_output() {
        let args = FfmpegCommand::new("in.mp4", "out.mp4")
            .no_overwrite()
            .video_codec("libx264")
            .build_args();
        assert_eq!(args, vec!["-i", "in.mp4", "-c:v", "libx264", "-n", "out.mp4"]);
    }

    #[test]
    fn test_null_sink() {
        let args = FfmpegCommand::to_null_sink("in.mkv")
            .audio_filter("astats")
            .format("null")
            .build_args();
        assert_eq!(args, vec!["-i", "in.mkv", "-af", "astats", "-f", "null", "-"]);
    }

    #[test]
    fn test_keyframe_probe_args() {
        let invocation = keyframe_probe(Path::new("a.mp4"), -2.0, 3.0);
        assert_eq!(invocation.tool, ToolKind::Ffprobe);
        assert_eq!(
            invocation.args,
            vec![
                "-skip_frame",
                "nokey",
                "-select_streams",
                "v:0",
                "-show_entries",
                "frame=pts_time",
                "-of",
                "csv=print_section=0",
                "-read_intervals",
                "0.000%3.000",
                "a.mp4"
            ]
        );
    }

    #[test]
    fn test_duration_probe_targets_source() {
        let invocation = duration_probe(Path::new("movie.mkv"));
        assert_eq!(invocation.tool, ToolKind::Ffprobe);
        assert_eq!(invocation.args.last().map(String::as_str), Some("movie.mkv"));
    }
}
