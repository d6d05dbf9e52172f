//! Engine tests through the public API, driven by the scripted process port

use std::path::Path;
use std::sync::Arc;

use tempfile::TempDir;
use trimx_extract::adapters::FfmpegScript;
use trimx_extract::engine::ReencodeClipper;
use trimx_extract::*;

fn extractor(process: &Arc<ScriptedProcess>) -> ClipExtractor {
    ClipExtractor::new(Arc::clone(process) as Arc<dyn ProcessPort>)
        .with_reencoder(ReencodeClipper::new().with_threads(2))
}

fn request(dir: &TempDir, start: f64, end: f64, frame_perfect: bool) -> ClipRequest {
    ClipRequest::new(
        "source.mp4",
        dir.path().join("clip.mp4"),
        start,
        end,
        frame_perfect,
        60_000.0,
    )
}

#[tokio::test]
async fn test_stream_copy_range_follows_keyframes() {
    let dir = TempDir::new().unwrap();
    let process = Arc::new(ScriptedProcess::new().with_keyframes(vec![0.0, 8.0, 21.0, 40.0]));
    let observer = RecordingObserver::new();

    let outcome = extractor(&process)
        .extract(&request(&dir, 10.0, 20.0, false), &observer)
        .await
        .unwrap();

    assert!(outcome.is_success());
    assert!(!outcome.partial_file_left_behind);
    let (from, to) = outcome.extracted_range.unwrap();
    assert!((from - 7.9).abs() < 1e-9);
    assert!((to - 21.1).abs() < 1e-9);
    assert!(observer.tick_count() > 0);
    assert!(!observer.lines().is_empty());

    let ffmpeg = process.calls_for(ToolKind::Ffmpeg);
    assert_eq!(ffmpeg.len(), 1);
    let args = &ffmpeg[0].args;
    assert_eq!(&args[..6], ["-ss", "7.900", "-to", "21.100", "-i", "source.mp4"]);
    assert!(args.windows(2).any(|w| w == ["-c", "copy"]));
    assert!(args.windows(2).any(|w| w == ["-map", "0"]));
}

#[tokio::test]
async fn test_frame_perfect_range_is_exact_plus_pad() {
    let dir = TempDir::new().unwrap();
    let process = Arc::new(ScriptedProcess::new());

    let outcome = extractor(&process)
        .extract(&request(&dir, 10.0, 20.0, true), &NoopObserver)
        .await
        .unwrap();

    assert_eq!(outcome.status, ExtractionStatus::Success);
    assert_eq!(process.probe_count(), 0);
    let args = &process.calls_for(ToolKind::Ffmpeg)[0].args;
    assert_eq!(&args[..4], ["-ss", "10.000", "-to", "20.016"]);
    for pair in [
        ["-c:v", "libx264"],
        ["-crf", "15"],
        ["-preset", "medium"],
        ["-threads", "2"],
        ["-c:a", "libmp3lame"],
        ["-b:a", "320k"],
    ] {
        assert!(args.windows(2).any(|w| w == pair), "missing {:?}", pair);
    }
}

#[tokio::test]
async fn test_clip_at_media_start_without_early_keyframe() {
    let dir = TempDir::new().unwrap();
    let process = Arc::new(ScriptedProcess::new().with_keyframes(vec![2.0, 12.0]));

    let outcome = extractor(&process)
        .extract(&request(&dir, 1.0, 3.0, false), &NoopObserver)
        .await
        .unwrap();

    let (from, to) = outcome.extracted_range.unwrap();
    assert_eq!(from, 0.0);
    assert!((to - 12.1).abs() < 1e-9);
}

#[tokio::test]
async fn test_clip_to_media_end_without_late_keyframe() {
    let dir = TempDir::new().unwrap();
    let process = Arc::new(ScriptedProcess::new().with_keyframes(vec![0.0, 50.0]));

    let outcome = extractor(&process)
        .extract(&request(&dir, 52.0, 58.0, false), &NoopObserver)
        .await
        .unwrap();

    let (from, to) = outcome.extracted_range.unwrap();
    assert!((from - 49.9).abs() < 1e-9);
    assert!((to - 60.1).abs() < 1e-9);
}

#[tokio::test]
async fn test_second_run_reports_already_exists() {
    let dir = TempDir::new().unwrap();
    let process = Arc::new(ScriptedProcess::new().with_keyframes(vec![0.0, 8.0, 21.0]));
    let extractor = extractor(&process);
    let req = request(&dir, 10.0, 20.0, false);

    assert!(extractor.extract(&req, &NoopObserver).await.unwrap().is_success());
    let calls_after_first = process.calls().len();

    let second = extractor.extract(&req, &NoopObserver).await.unwrap();
    assert_eq!(second.status, ExtractionStatus::AlreadyExists);
    assert_eq!(process.calls().len(), calls_after_first);
}

#[tokio::test]
async fn test_failed_tool_leaves_partial_file_for_caller() {
    let dir = TempDir::new().unwrap();
    let process = Arc::new(
        ScriptedProcess::new()
            .with_keyframes(vec![0.0, 8.0, 21.0])
            .with_ffmpeg(FfmpegScript::Fail { write_partial: true })
            .with_ffmpeg_stderr(["Conversion failed!"]),
    );
    let req = request(&dir, 10.0, 20.0, false);
    let observer = RecordingObserver::new();

    let outcome = extractor(&process).extract(&req, &observer).await.unwrap();

    assert_eq!(outcome.status, ExtractionStatus::ProcessFailure);
    assert!(outcome.partial_file_left_behind);
    assert!(req.output_path.exists());
    assert!(observer.transcript().contains("Conversion failed!"));
}

#[tokio::test]
async fn test_out_of_range_request_is_rejected() {
    let dir = TempDir::new().unwrap();
    let process = Arc::new(ScriptedProcess::new());
    let extractor = extractor(&process);

    for (start, end) in [(20.0, 10.0), (5.0, 5.0), (-1.0, 3.0), (50.0, 61.0)] {
        let err = extractor
            .extract(&request(&dir, start, end, false), &NoopObserver)
            .await
            .unwrap_err();
        assert!(matches!(err, TrimXError::InvalidRequest { .. }), "{} {}", start, end);
    }
    assert!(process.calls().is_empty());
}

#[tokio::test]
async fn test_locator_bounds_and_probe_windows() {
    let process = Arc::new(ScriptedProcess::new().with_keyframes(vec![0.0, 4.0, 17.0]));
    let locator = KeyframeLocator::new(Arc::clone(&process) as Arc<dyn ProcessPort>);
    let source = Path::new("source.mp4");

    let back = locator
        .locate(source, 12.0, SearchDirection::Backward, 30.0)
        .await
        .unwrap();
    let fwd = locator
        .locate(source, 12.0, SearchDirection::Forward, 30.0)
        .await
        .unwrap();

    assert_eq!(back, 4.0);
    assert_eq!(fwd, 17.0);
    assert_eq!(
        process.read_intervals(),
        vec!["7.000%12.000", "2.000%7.000", "12.000%17.000"]
    );
}

#[tokio::test]
async fn test_silence_detection_uses_overall_level() {
    let process = Arc::new(ScriptedProcess::new().with_ffmpeg_stderr([
        "[Parsed_astats_0 @ 0x55] Channel: 1",
        "[Parsed_astats_0 @ 0x55] RMS level dB: -inf",
        "[Parsed_astats_0 @ 0x55] Overall",
        "[Parsed_astats_0 @ 0x55] RMS level dB: -inf",
    ]));
    let detector = SilenceDetector::new(Arc::clone(&process) as Arc<dyn ProcessPort>);

    assert!(detector
        .is_silent(Path::new("source.mkv"), 30.0, 31.5)
        .await
        .unwrap());

    let args = &process.calls_for(ToolKind::Ffmpeg)[0].args;
    assert_eq!(
        args,
        &vec![
            "-ss", "29.000", "-to", "32.500", "-i", "source.mkv", "-map", "0:a:1?", "-af",
            "astats", "-f", "null", "-"
        ]
    );
}

#[tokio::test]
async fn test_silence_without_rms_line_is_false() {
    let process = Arc::new(ScriptedProcess::new());
    let detector = SilenceDetector::new(process as Arc<dyn ProcessPort>);

    assert!(!detector
        .is_silent(Path::new("source.mkv"), 0.0, 2.0)
        .await
        .unwrap());
}
