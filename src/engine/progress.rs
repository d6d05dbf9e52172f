//! Progress and log callbacks for UI integration

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use tracing::info;

/// Receives log lines and wait ticks while the engine works.
///
/// Both methods default to no-ops, so callers implement only what they need.
/// Neither has any effect on control flow.
pub trait ExtractionObserver: Send + Sync {
    /// Human-readable progress line ("resolving left boundary", ...)
    fn on_log(&self, _line: &str) {}

    /// Called periodically while an external tool is running
    fn on_tick(&self) {}
}

/// Log a progress line both to tracing and to the observer
pub(crate) fn report(observer: &dyn ExtractionObserver, line: String) {
    info!("{}", line);
    observer.on_log(&line);
}

/// Observer that ignores everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl ExtractionObserver for NoopObserver {}

/// Adapts a plain closure into a log-only observer
pub struct LogFn<F>(pub F);

impl<F> ExtractionObserver for LogFn<F>
where
    F: Fn(&str) + Send + Sync,
{
    fn on_log(&self, line: &str) {
        (self.0)(line)
    }
}

/// Observer that keeps every log line and counts ticks
#[derive(Debug, Default)]
pub struct RecordingObserver {
    lines: Mutex<Vec<String>>,
    ticks: AtomicUsize,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log lines received so far
    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .map(|lines| lines.clone())
            .unwrap_or_default()
    }

    /// All log lines joined, as shown to a user after a failure
    pub fn transcript(&self) -> String {
        self.lines().join("\n")
    }

    pub fn tick_count(&self) -> usize {
        self.ticks.load(Ordering::Relaxed)
    }
}

impl ExtractionObserver for RecordingObserver {
    fn on_log(&self, line: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(line.to_string());
        }
    }

    fn on_tick(&self) {
        self.ticks.fetch_add(1, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_observer_collects_lines_and_ticks() {
        let observer = RecordingObserver::new();
        observer.on_log("resolving left boundary");
        observer.on_tick();
        observer.on_tick();
        observer.on_log("extracting");

        assert_eq!(observer.lines(), vec!["resolving left boundary", "extracting"]);
        assert_eq!(observer.transcript(), "resolving left boundary\nextracting");
        assert_eq!(observer.tick_count(), 2);
    }

    #[test]
    fn test_log_fn_forwards_lines() {
        let seen = Mutex::new(Vec::new());
        let observer = LogFn(|line: &str| seen.lock().unwrap().push(line.to_string()));
        observer.on_log("hello");
        observer.on_tick();
        assert_eq!(seen.lock().unwrap().as_slice(), ["hello".to_string()]);
    }
}
