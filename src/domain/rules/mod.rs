// Business rules - Validation and parsing rules shared by the engine

use crate::domain::model::ClipRequest;
use crate::error::{TrimXError, TrimXResult};

/// Padding added past the requested end of a re-encode so the last frame survives
pub const FRAME_PAD_SECONDS: f64 = 0.016;

/// Guard band on each side of a keyframe-aligned stream copy
pub const COPY_GUARD_SECONDS: f64 = 0.1;

/// Guard band on each side of a loudness probe
pub const SILENCE_GUARD_SECONDS: f64 = 1.0;

/// Marker of the loudness line in astats output
pub const RMS_LEVEL_MARKER: &str = "RMS level dB";

/// Loudness value reported for digital silence
pub const SILENT_RMS_SENTINEL: &str = "-inf";

/// Reject requests that violate `0 <= start < end <= duration`
pub fn validate_clip_request(request: &ClipRequest) -> TrimXResult<()> {
    if request.source_path.as_os_str().is_empty() {
        return Err(TrimXError::invalid_request("source path is empty"));
    }
    if request.output_path.as_os_str().is_empty() {
        return Err(TrimXError::invalid_request("output path is empty"));
    }

    let start = request.start_seconds;
    let end = request.end_seconds;
    let duration_ms = request.source_duration_ms;

    if !start.is_finite() || !end.is_finite() || !duration_ms.is_finite() {
        return Err(TrimXError::invalid_request(format!(
            "times must be finite (start {}, end {}, duration {} ms)",
            start, end, duration_ms
        )));
    }
    if duration_ms <= 0.0 {
        return Err(TrimXError::invalid_request(format!(
            "source duration must be positive, got {} ms",
            duration_ms
        )));
    }
    if start < 0.0 {
        return Err(TrimXError::invalid_request(format!(
            "start ({:.3}s) cannot be negative",
            start
        )));
    }
    if start >= end {
        return Err(TrimXError::invalid_request(format!(
            "start ({:.3}s) must be less than end ({:.3}s)",
            start, end
        )));
    }
    if end > request.source_duration_seconds() {
        return Err(TrimXError::invalid_request(format!(
            "end ({:.3}s) is past the end of the source ({:.3}s)",
            end,
            request.source_duration_seconds()
        )));
    }

    Ok(())
}

/// Encoder threads for a machine with `logical_cpus` logical processors:
/// two are left for the host, never fewer than one is used.
pub fn encode_thread_count(logical_cpus: usize) -> usize {
    logical_cpus.saturating_sub(2).max(1)
}

/// Parse csv keyframe probe output. Only the first field of each line is used;
/// blank and unparseable lines (`N/A`) are skipped.
pub fn parse_keyframe_timestamps<S: AsRef<str>>(lines: &[S]) -> Vec<f64> {
    lines
        .iter()
        .filter_map(|line| {
            let field = line.as_ref().split(',').next()?.trim();
            if field.is_empty() {
                return None;
            }
            field.parse::<f64>().ok().filter(|t| t.is_finite())
        })
        .collect()
}

/// Extract the reported RMS level from astats output. When several lines carry
/// the marker (per channel, then overall) the last one wins.
pub fn parse_rms_level<S: AsRef<str>>(lines: &[S]) -> Option<String> {
    lines
        .iter()
        .rev()
        .map(AsRef::as_ref)
        .find(|line| line.contains(RMS_LEVEL_MARKER))
        .and_then(|line| {
            let (_, value) = line.split_once(RMS_LEVEL_MARKER)?;
            let value = value.trim_start_matches(':').trim();
            if value.is_empty() {
                None
            } else {
                Some(value.to_string())
            }
        })
}

/// Silence rule: only an explicit `-inf` level counts as silent
pub fn is_silent_level(level: Option<&str>) -> bool {
    level == Some(SILENT_RMS_SENTINEL)
}
