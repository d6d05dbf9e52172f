//! Command implementations

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::cli::args::{BatchArgs, ClipArgs, KeyframeArgs, SilenceArgs};
use crate::cli::Commands;
use crate::domain::model::{ClipRequest, ExtractionOutcome, ExtractionStatus, SearchDirection, TimeSpec};
use crate::engine::{ClipExtractor, NoopObserver, RecordingObserver};
use crate::planner::KeyframeLocator;
use crate::ports::ProcessPort;
use crate::probe::{MediaDurationProbe, SilenceDetector};
use crate::utils::Utils;

/// Run a parsed subcommand against `process`
pub async fn run(command: Commands, process: Arc<dyn ProcessPort>) -> Result<()> {
    match command {
        Commands::Clip(args) => clip(args, process).await,
        Commands::Silence(args) => silence(args, process).await,
        Commands::Keyframe(args) => keyframe(args, process).await,
        Commands::Batch(args) => batch(args, process).await,
    }
}

/// Execute the clip command
pub async fn clip(args: ClipArgs, process: Arc<dyn ProcessPort>) -> Result<()> {
    let start = parse_time(&args.start, "start")?;
    let end = parse_time(&args.end, "end")?;
    let duration_ms = resolve_duration_ms(&process, &args.input, args.duration_ms).await?;

    info!(
        "Clipping {} [{} - {}] -> {}",
        args.input.display(),
        start,
        end,
        args.output.display()
    );

    let request = ClipRequest::new(
        args.input,
        args.output,
        start.seconds,
        end.seconds,
        args.frame_perfect,
        duration_ms,
    );

    let outcome = ClipExtractor::new(process)
        .extract(&request, &NoopObserver)
        .await
        .context("Failed to extract clip")?;

    match outcome.status {
        ExtractionStatus::Success => {
            println!("{}", outcome.output_path.display());
            Ok(())
        }
        ExtractionStatus::AlreadyExists => {
            warn!("Skipped, output already exists");
            println!("{} (already exists)", outcome.output_path.display());
            Ok(())
        }
        ExtractionStatus::ProcessFailure | ExtractionStatus::Cancelled => {
            bail!("{}", describe_failure(&outcome))
        }
    }
}

/// Execute the silence command
pub async fn silence(args: SilenceArgs, process: Arc<dyn ProcessPort>) -> Result<()> {
    let start = parse_time(&args.start, "start")?;
    let end = parse_time(&args.end, "end")?;

    let silent = SilenceDetector::new(process)
        .is_silent(&args.input, start.seconds, end.seconds)
        .await
        .context("Failed to measure loudness")?;

    println!("{}", if silent { "silent" } else { "audible" });
    Ok(())
}

/// Execute the keyframe command
pub async fn keyframe(args: KeyframeArgs, process: Arc<dyn ProcessPort>) -> Result<()> {
    let at = parse_time(&args.at, "target")?;
    let duration_ms = resolve_duration_ms(&process, &args.input, args.duration_ms).await?;
    let direction = SearchDirection::from(args.direction);

    let resolution = KeyframeLocator::new(process)
        .locate_with(
            &args.input,
            at.seconds,
            direction,
            duration_ms / 1000.0,
            &NoopObserver,
        )
        .await
        .context("Failed to locate keyframe")?;

    info!(
        "Resolved {} {} to {:.3}s after {} probe(s)",
        direction, at, resolution.resolved_seconds, resolution.probes
    );
    if resolution.fell_back_to_media_boundary {
        println!("{:.3} (media boundary)", resolution.resolved_seconds);
    } else {
        println!("{:.3}", resolution.resolved_seconds);
    }
    Ok(())
}

/// One entry of a batch job file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchJob {
    pub input: PathBuf,
    pub output: PathBuf,
    /// HH:MM:SS.ms, MM:SS.ms, or seconds
    pub start: String,
    pub end: String,
    #[serde(default)]
    pub frame_perfect: bool,
    /// Probed when absent
    #[serde(default)]
    pub duration_ms: Option<f64>,
}

/// Counts reported at the end of a batch
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    pub extracted: usize,
    pub already_existed: usize,
}

/// Read a job file: a JSON array of [`BatchJob`]
pub fn load_jobs(path: &Path) -> Result<Vec<BatchJob>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read job file {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse job file {}", path.display()))
}

/// Execute the batch command
pub async fn batch(args: BatchArgs, process: Arc<dyn ProcessPort>) -> Result<()> {
    let jobs = load_jobs(&args.jobs)?;
    let started = Instant::now();

    let summary = run_jobs(&jobs, args.skip, process).await?;

    println!(
        "{} extracted, {} already existed, {} skipped in {}",
        summary.extracted,
        summary.already_existed,
        args.skip.min(jobs.len()),
        Utils::format_duration(started.elapsed())
    );
    Ok(())
}

/// Run `jobs[skip..]` one at a time, stopping at the first failure.
///
/// A failed job's partial output is removed so that rerunning with
/// `--skip <index>` starts from a clean slate.
pub async fn run_jobs(
    jobs: &[BatchJob],
    skip: usize,
    process: Arc<dyn ProcessPort>,
) -> Result<BatchSummary> {
    if skip > jobs.len() {
        bail!("--skip {} is past the end of the {} job(s)", skip, jobs.len());
    }

    let extractor = ClipExtractor::new(Arc::clone(&process));
    let mut summary = BatchSummary::default();

    for (index, job) in jobs.iter().enumerate().skip(skip) {
        let request = job_request(&process, job)
            .await
            .with_context(|| resume_hint(index))?;

        info!(
            "Job {}/{}: {} -> {}",
            index + 1,
            jobs.len(),
            job.input.display(),
            job.output.display()
        );

        let observer = RecordingObserver::new();
        let outcome = extractor
            .extract(&request, &observer)
            .await
            .with_context(|| resume_hint(index))?;

        match outcome.status {
            ExtractionStatus::Success => {
                summary.extracted += 1;
                println!("[{}] {}", index, outcome.output_path.display());
            }
            ExtractionStatus::AlreadyExists => {
                summary.already_existed += 1;
                println!("[{}] {} (already exists, skipped)", index, outcome.output_path.display());
            }
            ExtractionStatus::ProcessFailure | ExtractionStatus::Cancelled => {
                if outcome.partial_file_left_behind {
                    match tokio::fs::remove_file(&outcome.output_path).await {
                        Ok(()) => info!("Removed partial output {}", outcome.output_path.display()),
                        Err(e) => warn!(
                            "Could not remove partial output {}: {}",
                            outcome.output_path.display(),
                            e
                        ),
                    }
                }
                eprintln!("{}", observer.transcript());
                bail!("{}; {}", describe_failure(&outcome), resume_hint(index));
            }
        }
    }

    Ok(summary)
}

async fn job_request(process: &Arc<dyn ProcessPort>, job: &BatchJob) -> Result<ClipRequest> {
    let start = parse_time(&job.start, "start")?;
    let end = parse_time(&job.end, "end")?;
    let duration_ms = resolve_duration_ms(process, &job.input, job.duration_ms).await?;

    Ok(ClipRequest::new(
        job.input.clone(),
        job.output.clone(),
        start.seconds,
        end.seconds,
        job.frame_perfect,
        duration_ms,
    ))
}

fn resume_hint(index: usize) -> String {
    format!("job {} failed, resume with --skip {}", index, index)
}

fn describe_failure(outcome: &ExtractionOutcome) -> String {
    let what = match outcome.status {
        ExtractionStatus::Cancelled => "Extraction cancelled",
        _ => "Extraction failed",
    };
    if outcome.partial_file_left_behind {
        format!(
            "{} (partial output at {})",
            what,
            outcome.output_path.display()
        )
    } else {
        what.to_string()
    }
}

fn parse_time(value: &str, label: &str) -> Result<TimeSpec> {
    TimeSpec::parse(value).with_context(|| format!("Invalid {} time '{}'", label, value))
}

async fn resolve_duration_ms(
    process: &Arc<dyn ProcessPort>,
    input: &Path,
    given: Option<f64>,
) -> Result<f64> {
    if let Some(ms) = given {
        return Ok(ms);
    }
    MediaDurationProbe::new(Arc::clone(process))
        .duration_ms(input)
        .await
        .with_context(|| format!("Failed to read duration of {}", input.display()))
}
