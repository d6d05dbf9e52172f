//! Audio loudness check over a time range

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::model::ToolInvocation;
use crate::domain::rules::{is_silent_level, parse_rms_level, SILENCE_GUARD_SECONDS};
use crate::engine::command::FfmpegCommand;
use crate::engine::progress::{ExtractionObserver, NoopObserver};
use crate::error::{TrimXError, TrimXResult};
use crate::ports::ProcessPort;

/// Audio stream measured by the loudness probe. The trailing `?` makes a
/// missing stream non-fatal for ffmpeg.
pub const SILENCE_AUDIO_MAP: &str = "0:a:1?";

/// Classifies a range of a source as silent or not by its RMS level
#[derive(Clone)]
pub struct SilenceDetector {
    process: Arc<dyn ProcessPort>,
}

impl SilenceDetector {
    pub fn new(process: Arc<dyn ProcessPort>) -> Self {
        Self { process }
    }

    /// `true` only when astats reports an overall RMS level of `-inf`.
    ///
    /// A run that prints no RMS line (no matching audio stream, decode
    /// failure) is classified as not silent.
    pub async fn is_silent(&self, source: &Path, start: f64, end: f64) -> TrimXResult<bool> {
        self.is_silent_with(source, start, end, &NoopObserver).await
    }

    pub async fn is_silent_with(
        &self,
        source: &Path,
        start: f64,
        end: f64,
        observer: &dyn ExtractionObserver,
    ) -> TrimXResult<bool> {
        if !start.is_finite() || !end.is_finite() || start > end {
            return Err(TrimXError::invalid_request(format!(
                "invalid silence range [{}, {}]",
                start, end
            )));
        }

        let invocation = silence_probe(source, start, end);
        let result = self.process.run(&invocation, observer).await?;

        if result.cancelled {
            return Err(TrimXError::Cancelled);
        }
        if !result.succeeded {
            warn!(
                "Silence probe of {} exited with code {}: {}",
                source.display(),
                result.exit_code,
                result.stderr_tail(3)
            );
        }

        let level = parse_rms_level(&result.stderr_lines);
        debug!(
            "RMS level of {} over [{:.3}, {:.3}]: {}",
            source.display(),
            start,
            end,
            level.as_deref().unwrap_or("none")
        );

        Ok(is_silent_level(level.as_deref()))
    }
}

/// `ffmpeg -ss <start-1> -to <end+1> -i src -map 0:a:1? -af astats -f null -`
pub fn silence_probe(source: &Path, start: f64, end: f64) -> ToolInvocation {
    FfmpegCommand::to_null_sink(source)
        .range(
            (start - SILENCE_GUARD_SECONDS).max(0.0),
            end + SILENCE_GUARD_SECONDS,
        )
        .map(SILENCE_AUDIO_MAP)
        .audio_filter("astats")
        .format("null")
        .into_invocation()
}
