//! Clip extraction orchestrator

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use tracing::{error, warn};

use crate::domain::model::{ClipRequest, ExtractionOutcome, ExtractionStatus, ProcessResult};
use crate::domain::rules::validate_clip_request;
use crate::engine::copy::StreamCopyClipper;
use crate::engine::progress::{report, ExtractionObserver};
use crate::engine::reencode::ReencodeClipper;
use crate::error::{TrimXError, TrimXResult};
use crate::planner::{ClippingStrategy, CutPlan, KeyframeLocator};
use crate::ports::ProcessPort;

/// What ffmpeg prints when `-n` stops it from replacing an existing output
const OUTPUT_EXISTS_MARKER: &str = "already exists. Exiting";

/// Top-level clip extraction engine
pub struct ClipExtractor {
    process: Arc<dyn ProcessPort>,
    copy_clipper: StreamCopyClipper,
    reencode_clipper: ReencodeClipper,
}

impl ClipExtractor {
    pub fn new(process: Arc<dyn ProcessPort>) -> Self {
        let locator = KeyframeLocator::new(Arc::clone(&process));
        Self {
            process,
            copy_clipper: StreamCopyClipper::new(locator),
            reencode_clipper: ReencodeClipper::new(),
        }
    }

    /// Replace the re-encoder, e.g. to pin its thread count
    pub fn with_reencoder(mut self, reencode_clipper: ReencodeClipper) -> Self {
        self.reencode_clipper = reencode_clipper;
        self
    }

    /// Extract `request` into its output path.
    ///
    /// Process failures and cancellation come back as an outcome. `Err` is
    /// returned only for an invalid request (before any process starts) and
    /// for fatal tool errors. The engine never overwrites or deletes files.
    pub async fn extract(
        &self,
        request: &ClipRequest,
        observer: &dyn ExtractionObserver,
    ) -> TrimXResult<ExtractionOutcome> {
        validate_clip_request(request)?;

        if output_exists(&request.output_path).await {
            report(
                observer,
                format!("Output already exists: {}", request.output_path.display()),
            );
            return Ok(ExtractionOutcome::already_exists(request.output_path.clone()));
        }

        let started = Instant::now();
        let plan = if request.frame_perfect {
            self.reencode_clipper.plan(request)
        } else {
            match self.copy_clipper.plan(request, observer).await {
                Ok(plan) => plan,
                Err(TrimXError::Cancelled) => {
                    report(observer, "Cancelled while resolving boundaries".to_string());
                    return Ok(self.failed_outcome(request, ExtractionStatus::Cancelled).await);
                }
                Err(TrimXError::ProbeError { message }) => {
                    error!("Keyframe search failed: {}", message);
                    observer.on_log(&format!("Keyframe search failed: {}", message));
                    return Ok(
                        self.failed_outcome(request, ExtractionStatus::ProcessFailure).await,
                    );
                }
                Err(e) => return Err(e),
            }
        };

        let invocation = match plan.strategy {
            ClippingStrategy::Reencode => {
                report(
                    observer,
                    format!(
                        "Re-encoding [{:.3}, {:.3}] with {} threads",
                        plan.extract_from,
                        plan.extract_to,
                        self.reencode_clipper.threads()
                    ),
                );
                self.reencode_clipper.invocation(request, &plan)
            }
            ClippingStrategy::StreamCopy => {
                report(
                    observer,
                    format!(
                        "Extracting [{:.3}, {:.3}] by stream copy",
                        plan.extract_from, plan.extract_to
                    ),
                );
                self.copy_clipper.invocation(request, &plan)
            }
        };

        // Another writer may have taken the path while boundaries were probed
        if output_exists(&request.output_path).await {
            report(
                observer,
                format!(
                    "Output appeared before extraction started: {}",
                    request.output_path.display()
                ),
            );
            return Ok(ExtractionOutcome::already_exists(request.output_path.clone()));
        }

        let result = self.process.run(&invocation, observer).await?;
        let outcome = self.finish(request, &plan, &result).await;

        match outcome.status {
            ExtractionStatus::Success => report(
                observer,
                format!(
                    "Extraction finished in {:.2}s: {}",
                    started.elapsed().as_secs_f64(),
                    request.output_path.display()
                ),
            ),
            ExtractionStatus::Cancelled => report(observer, "Extraction cancelled".to_string()),
            ExtractionStatus::AlreadyExists => report(
                observer,
                format!(
                    "ffmpeg refused to replace {}",
                    request.output_path.display()
                ),
            ),
            _ => {
                let line = format!(
                    "Extraction failed (exit code {}): {}",
                    result.exit_code,
                    result.stderr_tail(3)
                );
                error!("{}", line);
                observer.on_log(&line);
            }
        }

        Ok(outcome)
    }

    async fn finish(
        &self,
        request: &ClipRequest,
        plan: &CutPlan,
        result: &ProcessResult,
    ) -> ExtractionOutcome {
        if result.cancelled {
            return self.failed_outcome(request, ExtractionStatus::Cancelled).await;
        }

        if result.succeeded {
            if output_exists(&request.output_path).await {
                return ExtractionOutcome::success(request.output_path.clone(), plan.range());
            }
            warn!(
                "ffmpeg reported success but wrote no output to {}",
                request.output_path.display()
            );
        } else if result
            .stderr_lines
            .iter()
            .any(|line| line.contains(OUTPUT_EXISTS_MARKER))
        {
            // The file at the output path is not ours
            return ExtractionOutcome::already_exists(request.output_path.clone());
        }

        let mut outcome = self
            .failed_outcome(request, ExtractionStatus::ProcessFailure)
            .await;
        outcome.extracted_range = Some(plan.range());
        outcome
    }

    async fn failed_outcome(
        &self,
        request: &ClipRequest,
        status: ExtractionStatus,
    ) -> ExtractionOutcome {
        let partial_file_left_behind = output_exists(&request.output_path).await;
        if partial_file_left_behind {
            warn!(
                "Partial output left at {}",
                request.output_path.display()
            );
        }

        ExtractionOutcome {
            status,
            output_path: request.output_path.clone(),
            partial_file_left_behind,
            extracted_range: None,
        }
    }
}

async fn output_exists(path: &Path) -> bool {
    tokio::fs::try_exists(path).await.unwrap_or(false)
}
