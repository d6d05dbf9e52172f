//! TrimX clip extraction library
//!
//! Cuts `[start, end]` out of a media file with ffmpeg. The default path snaps
//! both edges outward to keyframes, found through short ffprobe probes, and
//! copies streams without re-encoding. The frame-perfect path re-encodes the
//! exact range instead. A separate loudness probe tells whether a range is
//! silent.
//!
//! ```no_run
//! use std::sync::Arc;
//! use trimx_extract::{ClipExtractor, ClipRequest, NoopObserver, ProcessRunner, ToolPaths};
//!
//! # async fn demo() -> trimx_extract::TrimXResult<()> {
//! let runner = ProcessRunner::new(ToolPaths::resolve(None, None)?);
//! let extractor = ClipExtractor::new(Arc::new(runner));
//! let request = ClipRequest::new("in.mp4", "clip.mp4", 10.0, 20.0, false, 60_000.0);
//! let outcome = extractor.extract(&request, &NoopObserver).await?;
//! println!("{:?}", outcome.status);
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod cli;
pub mod config_initialization;
pub mod domain;
pub mod engine;
pub mod error;
pub mod planner;
pub mod ports;
pub mod probe;
pub mod utils;

// Re-export commonly used types
pub use adapters::{ProcessRunner, ScriptedProcess, ToolPaths};
pub use domain::model::{
    ClipRequest, ExtractionOutcome, ExtractionStatus, ProcessResult, SearchDirection, TimeSpec,
    ToolInvocation, ToolKind,
};
pub use engine::{ClipExtractor, ExtractionObserver, LogFn, NoopObserver, RecordingObserver};
pub use error::{TrimXError, TrimXResult};
pub use planner::KeyframeLocator;
pub use ports::ProcessPort;
pub use probe::{MediaDurationProbe, SilenceDetector};
