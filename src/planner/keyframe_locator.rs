//! Keyframe boundary search over the ffprobe frame index
//!
//! The index is queried through a short window next to the target instant.
//! When the window holds no usable keyframe it slides one step further out,
//! until a keyframe turns up or the media boundary is reached. Each probe only
//! decodes a few seconds of keyframes, and the number of probes is bounded by
//! the media duration.

use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::domain::model::{KeyframeSearchState, SearchDirection};
use crate::domain::rules::parse_keyframe_timestamps;
use crate::engine::command;
use crate::engine::progress::{report, ExtractionObserver, NoopObserver};
use crate::error::{TrimXError, TrimXResult};
use crate::planner::BoundaryResolution;
use crate::ports::ProcessPort;

/// Finds the nearest usable random-access point around an instant
#[derive(Clone)]
pub struct KeyframeLocator {
    process: Arc<dyn ProcessPort>,
}

impl KeyframeLocator {
    pub fn new(process: Arc<dyn ProcessPort>) -> Self {
        Self { process }
    }

    /// Resolve `target` to a keyframe time in `[0, media_duration_seconds]`.
    ///
    /// `Backward` never returns more than `target`, `Forward` never less
    /// (both after clamping `target` into the media range).
    pub async fn locate(
        &self,
        source: &Path,
        target: f64,
        direction: SearchDirection,
        media_duration_seconds: f64,
    ) -> TrimXResult<f64> {
        self.locate_with(source, target, direction, media_duration_seconds, &NoopObserver)
            .await
            .map(|resolution| resolution.resolved_seconds)
    }

    /// Same as [`locate`](Self::locate), reporting how the search went
    pub async fn locate_with(
        &self,
        source: &Path,
        target: f64,
        direction: SearchDirection,
        media_duration_seconds: f64,
        observer: &dyn ExtractionObserver,
    ) -> TrimXResult<BoundaryResolution> {
        if !media_duration_seconds.is_finite() || media_duration_seconds <= 0.0 {
            return Err(TrimXError::invalid_request(format!(
                "media duration must be positive, got {}s",
                media_duration_seconds
            )));
        }
        if !target.is_finite() {
            return Err(TrimXError::invalid_request(format!(
                "keyframe target must be finite, got {}",
                target
            )));
        }

        let target = target.clamp(0.0, media_duration_seconds);
        let mut state = KeyframeSearchState::new(target, direction);
        let mut probes = 0u32;

        let resolved = loop {
            if let Some(resolved) = state.resolved_seconds {
                break resolved;
            }

            let (from, to) = state.window();
            let invocation = command::keyframe_probe(source, from, to);
            let result = self.process.run(&invocation, observer).await?;
            probes += 1;

            if result.cancelled {
                return Err(TrimXError::Cancelled);
            }
            if !result.succeeded {
                return Err(TrimXError::ProbeError {
                    message: format!(
                        "keyframe probe of {} over [{:.3}, {:.3}] exited with code {}: {}",
                        source.display(),
                        from,
                        to,
                        result.exit_code,
                        result.stderr_tail(3)
                    ),
                });
            }

            let keyframes = parse_keyframe_timestamps(&result.stdout_lines);
            debug!(
                "Probe {} ({}) over [{:.3}, {:.3}] returned {} keyframes",
                probes,
                direction,
                from,
                to,
                keyframes.len()
            );

            if !state.absorb(&keyframes) {
                state.advance(media_duration_seconds);
            }
        };

        if state.exhausted {
            let line = format!(
                "No keyframe {} {:.3}s, using media boundary {:.3}s",
                match direction {
                    SearchDirection::Backward => "before",
                    SearchDirection::Forward => "after",
                },
                target,
                resolved
            );
            report(observer, line);
        }

        Ok(BoundaryResolution {
            direction,
            target_seconds: target,
            resolved_seconds: resolved.clamp(0.0, media_duration_seconds),
            fell_back_to_media_boundary: state.exhausted,
            probes,
        })
    }
}
