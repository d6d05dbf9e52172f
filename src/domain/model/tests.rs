// Unit tests for domain models

use super::*;

#[test]
fn test_time_spec_from_components() {
    let time = TimeSpec::from_components(1, 2, 3, 500);
    assert_eq!(time.seconds, 3723.5);
}

#[test]
fn test_time_spec_parse_seconds() {
    let time = TimeSpec::parse("123.456").unwrap();
    assert_eq!(time.seconds, 123.456);
}

#[test]
fn test_time_spec_parse_mm_ss() {
    let time = TimeSpec::parse("01:30.5").unwrap();
    assert_eq!(time.seconds, 90.5);
}

#[test]
fn test_time_spec_parse_hh_mm_ss() {
    let time = TimeSpec::parse("01:02:03.5").unwrap();
    assert_eq!(time.seconds, 3723.5);
}

#[test]
fn test_time_spec_parse_invalid() {
    assert!(TimeSpec::parse("invalid").is_err());
    assert!(TimeSpec::parse("00:60").is_err());
    assert!(TimeSpec::parse("01:60:00").is_err());
    assert!(TimeSpec::parse("-10").is_err());
    assert!(TimeSpec::parse("1:2:3:4").is_err());
}

#[test]
fn test_time_spec_display() {
    let time = TimeSpec::from_components(1, 2, 3, 456);
    assert_eq!(format!("{}", time), "01:02:03.456");

    let time_no_hours = TimeSpec::from_components(0, 2, 3, 456);
    assert_eq!(format!("{}", time_no_hours), "02:03.456");
}

#[test]
fn test_backward_windows_slide_outward() {
    let mut state = KeyframeSearchState::new(30.0, SearchDirection::Backward);
    assert_eq!(state.window(), (25.0, 30.0));

    state.advance(60.0);
    assert!(!state.is_resolved());
    assert_eq!(state.window_width_seconds, 10.0);
    assert_eq!(state.window(), (20.0, 25.0));

    state.advance(60.0);
    assert_eq!(state.window(), (15.0, 20.0));
}

#[test]
fn test_forward_windows_slide_outward() {
    let mut state = KeyframeSearchState::new(30.0, SearchDirection::Forward);
    assert_eq!(state.window(), (30.0, 35.0));

    state.advance(60.0);
    assert_eq!(state.window(), (35.0, 40.0));
}

#[test]
fn test_backward_absorb_keeps_latest_candidate_not_after_target() {
    let mut state = KeyframeSearchState::new(10.0, SearchDirection::Backward);
    assert!(state.absorb(&[6.0, 8.0, 10.5]));
    assert_eq!(state.resolved_seconds, Some(8.0));
    assert!(!state.exhausted);
}

#[test]
fn test_forward_absorb_keeps_earliest_candidate_not_before_target() {
    let mut state = KeyframeSearchState::new(20.0, SearchDirection::Forward);
    assert!(state.absorb(&[19.5, 23.0, 21.0]));
    assert_eq!(state.resolved_seconds, Some(21.0));
}

#[test]
fn test_absorb_target_itself_is_a_candidate() {
    let mut backward = KeyframeSearchState::new(12.0, SearchDirection::Backward);
    assert!(backward.absorb(&[12.0]));
    assert_eq!(backward.resolved_seconds, Some(12.0));

    let mut forward = KeyframeSearchState::new(12.0, SearchDirection::Forward);
    assert!(forward.absorb(&[12.0]));
    assert_eq!(forward.resolved_seconds, Some(12.0));
}

#[test]
fn test_absorb_without_candidates_leaves_state_open() {
    let mut state = KeyframeSearchState::new(10.0, SearchDirection::Forward);
    assert!(!state.absorb(&[]));
    assert!(!state.absorb(&[4.0, 9.9]));
    assert_eq!(state.resolved_seconds, None);
}

#[test]
fn test_backward_exhausts_to_zero() {
    let mut state = KeyframeSearchState::new(1.0, SearchDirection::Backward);
    state.advance(60.0);
    assert!(state.exhausted);
    assert_eq!(state.resolved_seconds, Some(0.0));
}

#[test]
fn test_forward_exhausts_to_duration() {
    let mut state = KeyframeSearchState::new(57.0, SearchDirection::Forward);
    state.advance(60.0);
    assert!(state.exhausted);
    assert_eq!(state.resolved_seconds, Some(60.0));
}

#[test]
fn test_process_result_stderr_tail() {
    let result = ProcessResult {
        stderr_lines: vec!["a".into(), "b".into(), "c".into()],
        ..Default::default()
    };
    assert_eq!(result.stderr_tail(2), "b\nc");
    assert_eq!(result.stderr_tail(10), "a\nb\nc");
}

#[test]
fn test_clip_request_deserializes_with_default_mode() {
    let request: ClipRequest = serde_json::from_str(
        r#"{"source_path":"a.mp4","output_path":"out.mp4","start_seconds":1.0,"end_seconds":2.0,"source_duration_ms":5000.0}"#,
    )
    .unwrap();
    assert!(!request.frame_perfect);
    assert_eq!(request.source_duration_seconds(), 5.0);
}
