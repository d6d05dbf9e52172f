//! Time formatting for tool arguments

/// Render seconds for an ffmpeg/ffprobe time argument, millisecond precision
pub fn format_seconds(seconds: f64) -> String {
    let rendered = format!("{:.3}", seconds);
    // "-0.000" would be read as a negative position
    if rendered == "-0.000" {
        "0.000".to_string()
    } else {
        rendered
    }
}

/// Render an ffprobe `-read_intervals` value. The start is clamped to zero.
pub fn format_read_interval(from: f64, to: f64) -> String {
    format!("{}%{}", format_seconds(from.max(0.0)), format_seconds(to.max(0.0)))
}
