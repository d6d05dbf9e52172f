//! Container duration lookup

use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::engine::command::duration_probe;
use crate::engine::progress::NoopObserver;
use crate::error::{TrimXError, TrimXResult};
use crate::ports::ProcessPort;

/// Reads the container duration with ffprobe, for callers that do not
/// already know it
#[derive(Clone)]
pub struct MediaDurationProbe {
    process: Arc<dyn ProcessPort>,
}

impl MediaDurationProbe {
    pub fn new(process: Arc<dyn ProcessPort>) -> Self {
        Self { process }
    }

    /// Duration of `source` in milliseconds
    pub async fn duration_ms(&self, source: &Path) -> TrimXResult<f64> {
        let result = self
            .process
            .run(&duration_probe(source), &NoopObserver)
            .await?;

        if result.cancelled {
            return Err(TrimXError::Cancelled);
        }
        if !result.succeeded {
            return Err(TrimXError::ProbeError {
                message: format!(
                    "duration probe of {} exited with code {}: {}",
                    source.display(),
                    result.exit_code,
                    result.stderr_tail(3)
                ),
            });
        }

        let seconds = result
            .stdout_lines
            .iter()
            .find_map(|line| line.trim().parse::<f64>().ok())
            .filter(|s| s.is_finite() && *s > 0.0)
            .ok_or_else(|| TrimXError::ProbeError {
                message: format!("no usable duration reported for {}", source.display()),
            })?;

        debug!("Duration of {}: {:.3}s", source.display(), seconds);
        Ok(seconds * 1000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::scripted::ScriptedProcess;

    #[tokio::test]
    async fn test_duration_in_milliseconds() {
        let process = Arc::new(ScriptedProcess::new().with_duration(62.5));
        let probe = MediaDurationProbe::new(process.clone() as Arc<dyn ProcessPort>);

        let ms = probe.duration_ms(Path::new("a.mp4")).await.unwrap();
        assert!((ms - 62500.0).abs() < 1e-6);
        assert_eq!(process.probe_count(), 1);
    }

    #[tokio::test]
    async fn test_unknown_duration_is_probe_error() {
        let process = Arc::new(ScriptedProcess::new());
        let probe = MediaDurationProbe::new(process as Arc<dyn ProcessPort>);

        let err = probe.duration_ms(Path::new("a.mp4")).await.unwrap_err();
        assert!(matches!(err, TrimXError::ProbeError { .. }));
    }

    #[tokio::test]
    async fn test_failed_probe_is_probe_error() {
        let process = Arc::new(ScriptedProcess::new().with_failing_probe());
        let probe = MediaDurationProbe::new(process as Arc<dyn ProcessPort>);

        assert!(probe.duration_ms(Path::new("a.mp4")).await.is_err());
    }
}
