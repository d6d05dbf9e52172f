//! Stream copy implementation

use crate::domain::model::{ClipRequest, SearchDirection, ToolInvocation};
use crate::domain::rules::COPY_GUARD_SECONDS;
use crate::engine::command::FfmpegCommand;
use crate::engine::progress::{report, ExtractionObserver};
use crate::error::TrimXResult;
use crate::planner::{ClippingStrategy, CutPlan, KeyframeLocator};

/// Stream copy clipper for lossless operations
#[derive(Clone)]
pub struct StreamCopyClipper {
    locator: KeyframeLocator,
}

impl StreamCopyClipper {
    pub fn new(locator: KeyframeLocator) -> Self {
        Self { locator }
    }

    /// Snap both edges outward to keyframes and add the copy guard band.
    pub async fn plan(
        &self,
        request: &ClipRequest,
        observer: &dyn ExtractionObserver,
    ) -> TrimXResult<CutPlan> {
        let duration = request.source_duration_seconds();

        report(
            observer,
            format!("Resolving left boundary (keyframe at or before {:.3}s)", request.start_seconds),
        );
        let left = self
            .locator
            .locate_with(
                &request.source_path,
                request.start_seconds,
                SearchDirection::Backward,
                duration,
                observer,
            )
            .await?;
        report(observer, format!("Left boundary at {:.3}s", left.resolved_seconds));

        report(
            observer,
            format!("Resolving right boundary (keyframe at or after {:.3}s)", request.end_seconds),
        );
        let right = self
            .locator
            .locate_with(
                &request.source_path,
                request.end_seconds,
                SearchDirection::Forward,
                duration,
                observer,
            )
            .await?;
        report(observer, format!("Right boundary at {:.3}s", right.resolved_seconds));

        Ok(CutPlan {
            strategy: ClippingStrategy::StreamCopy,
            extract_from: (left.resolved_seconds - COPY_GUARD_SECONDS).max(0.0),
            extract_to: right.resolved_seconds + COPY_GUARD_SECONDS,
            left: Some(left),
            right: Some(right),
        })
    }

    pub fn invocation(&self, request: &ClipRequest, plan: &CutPlan) -> ToolInvocation {
        FfmpegCommand::new(&request.source_path, &request.output_path)
            .range(plan.extract_from, plan.extract_to)
            .copy_all_streams()
            .no_overwrite()
            .into_invocation()
    }
}
