//! Re-encoding clipping implementation for frame-accurate video clipping

use crate::domain::model::{ClipRequest, ToolInvocation};
use crate::domain::rules::{encode_thread_count, FRAME_PAD_SECONDS};
use crate::engine::command::FfmpegCommand;
use crate::planner::{ClippingStrategy, CutPlan};

/// Fixed encoder settings of the frame-perfect branch
#[derive(Debug, Clone, PartialEq)]
pub struct ReencodeProfile {
    pub video_codec: &'static str,
    /// Constant rate factor (0-51, lower is higher quality)
    pub crf: u8,
    pub preset: &'static str,
    pub audio_codec: &'static str,
    pub audio_bitrate: &'static str,
}

impl Default for ReencodeProfile {
    fn default() -> Self {
        Self {
            video_codec: "libx264",
            crf: 15,
            preset: "medium",
            audio_codec: "libmp3lame",
            audio_bitrate: "320k",
        }
    }
}

/// Re-encoding clipper. Cuts at arbitrary instants, so no keyframe search is needed.
#[derive(Debug, Clone)]
pub struct ReencodeClipper {
    profile: ReencodeProfile,
    threads: usize,
}

impl Default for ReencodeClipper {
    fn default() -> Self {
        Self::new()
    }
}

impl ReencodeClipper {
    /// Create a clipper using all but two logical processors
    pub fn new() -> Self {
        Self {
            profile: ReencodeProfile::default(),
            threads: encode_thread_count(num_cpus::get()),
        }
    }

    /// Pin the encoder thread count
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads.max(1);
        self
    }

    pub fn threads(&self) -> usize {
        self.threads
    }

    pub fn profile(&self) -> &ReencodeProfile {
        &self.profile
    }

    /// The exact requested range, padded so the final frame is kept
    pub fn plan(&self, request: &ClipRequest) -> CutPlan {
        CutPlan {
            strategy: ClippingStrategy::Reencode,
            extract_from: request.start_seconds,
            extract_to: request.end_seconds + FRAME_PAD_SECONDS,
            left: None,
            right: None,
        }
    }

    pub fn invocation(&self, request: &ClipRequest, plan: &CutPlan) -> ToolInvocation {
        FfmpegCommand::new(&request.source_path, &request.output_path)
            .range(plan.extract_from, plan.extract_to)
            .video_codec(self.profile.video_codec)
            .crf(self.profile.crf)
            .preset(self.profile.preset)
            .threads(self.threads)
            .audio_codec(self.profile.audio_codec)
            .audio_bitrate(self.profile.audio_bitrate)
            .no_overwrite()
            .into_invocation()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_thread_count_leaves_two_cores() {
        let clipper = ReencodeClipper::new();
        assert_eq!(clipper.threads(), encode_thread_count(num_cpus::get()));
        assert!(clipper.threads() >= 1);
    }

    #[test]
    fn test_with_threads_floor() {
        assert_eq!(ReencodeClipper::new().with_threads(0).threads(), 1);
    }

    #[test]
    fn test_plan_pads_end() {
        let request = ClipRequest::new("a.mp4", "out.mp4", 10.0, 20.0, true, 60000.0);
        let plan = ReencodeClipper::new().plan(&request);

        assert_eq!(plan.strategy, ClippingStrategy::Reencode);
        assert_eq!(plan.extract_from, 10.0);
        assert!((plan.extract_to - 20.016).abs() < 1e-9);
        assert!(plan.left.is_none() && plan.right.is_none());
    }

    #[test]
    fn test_invocation_args() {
        let request = ClipRequest::new("a.mp4", "out.mp4", 10.0, 20.0, true, 60000.0);
        let clipper = ReencodeClipper::new().with_threads(6);
        let plan = clipper.plan(&request);
        let invocation = clipper.invocation(&request, &plan);

        assert_eq!(
            invocation.args,
            vec![
                "-ss", "10.000", "-to", "20.016", "-i", "a.mp4", "-c:v", "libx264", "-crf", "15",
                "-preset", "medium", "-threads", "6", "-c:a", "libmp3lame", "-b:a", "320k", "-n",
                "out.mp4"
            ]
        );
    }
}
