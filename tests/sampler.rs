//! Frame sampler tests against a scripted video source.

mod common;

use common::ScriptedVideo;
use framesift::{FramesiftError, SegmentPlan, frame_interval, sample_segment};

fn sampled_indices(video: &mut ScriptedVideo, start: f64, end: f64, rate: f64) -> Vec<u64> {
    sample_segment(video, start, end, rate)
        .expect("Failed to start sampling")
        .map(|result| result.expect("Unexpected decode error").source_frame_index)
        .collect()
}

// ── frame interval ────────────────────────────────────────────────

#[test]
fn interval_is_native_rate_over_sample_rate() {
    assert_eq!(frame_interval(30.0, 2.0).unwrap(), 15);
    assert_eq!(frame_interval(30.0, 10.0).unwrap(), 3);
    assert_eq!(frame_interval(30.0, 15.0).unwrap(), 2);
}

#[test]
fn interval_floors_fractional_ratios() {
    assert_eq!(frame_interval(29.97, 2.0).unwrap(), 14);
    assert_eq!(frame_interval(25.0, 10.0).unwrap(), 2);
}

#[test]
fn interval_never_drops_below_one() {
    assert_eq!(frame_interval(30.0, 60.0).unwrap(), 1);
    assert_eq!(frame_interval(30.0, 30.0).unwrap(), 1);
}

#[test]
fn interval_rejects_invalid_inputs() {
    assert!(matches!(
        frame_interval(0.0, 2.0),
        Err(FramesiftError::InvalidVideoMetadata { .. })
    ));
    assert!(matches!(
        frame_interval(f64::NAN, 2.0),
        Err(FramesiftError::InvalidVideoMetadata { .. })
    ));
    assert!(matches!(
        frame_interval(30.0, 0.0),
        Err(FramesiftError::InvalidSegment { .. })
    ));
}

// ── plans ─────────────────────────────────────────────────────────

#[test]
fn plan_maps_seconds_to_frames() {
    let plan = SegmentPlan::new(5.0, 6.0, 2.0, 30.0).unwrap();
    assert_eq!(plan.start_frame, 150);
    assert_eq!(plan.end_frame, 180);
    assert_eq!(plan.frame_interval, 15);
    assert_eq!(plan.expected_samples(), 2);
    assert_eq!(plan.indices().collect::<Vec<_>>(), [150, 165]);
    assert!(plan.selects(165));
    assert!(!plan.selects(166));
    assert!(!plan.selects(180));
}

#[test]
fn plan_counts_partial_last_stride() {
    // 10 frames at interval 3 select 0, 3, 6, 9.
    let plan = SegmentPlan::new(0.0, 1.0, 3.0, 10.0).unwrap();
    assert_eq!(plan.frame_interval, 3);
    assert_eq!(plan.expected_samples(), 4);
}

#[test]
fn empty_plan() {
    let plan = SegmentPlan::new(6.0, 6.0, 2.0, 30.0).unwrap();
    assert!(plan.is_empty());
    assert_eq!(plan.expected_samples(), 0);
    assert_eq!(plan.indices().count(), 0);
}

// ── sampling ──────────────────────────────────────────────────────

#[test]
fn samples_one_second_at_two_hertz() {
    let mut video = ScriptedVideo::new(30.0, 600);
    assert_eq!(sampled_indices(&mut video, 5.0, 6.0, 2.0), [150, 165]);
    assert_eq!(video.seeks, [150]);
}

#[test]
fn rate_above_native_selects_every_frame_once() {
    let mut video = ScriptedVideo::new(30.0, 600);
    let indices = sampled_indices(&mut video, 5.0, 6.0, 60.0);
    assert_eq!(indices, (150..180).collect::<Vec<_>>());
}

#[test]
fn indices_are_strictly_ascending_and_bounded() {
    let mut video = ScriptedVideo::new(29.97, 30_000);
    let indices = sampled_indices(&mut video, 408.0, 422.0, 10.0);
    assert!(!indices.is_empty());
    assert!(indices.windows(2).all(|pair| pair[0] < pair[1]));

    let plan = SegmentPlan::new(408.0, 422.0, 10.0, 29.97).unwrap();
    assert_eq!(indices.first(), Some(&plan.start_frame));
    assert!(indices.iter().all(|&index| index < plan.end_frame));
    assert_eq!(indices.len() as u64, plan.expected_samples());
}

#[test]
fn seeks_once_then_reads_sequentially() {
    let mut video = ScriptedVideo::new(30.0, 600);
    let count = sampled_indices(&mut video, 5.0, 6.0, 2.0).len();
    assert_eq!(count, 2);
    assert_eq!(video.seeks.len(), 1);
    // Draining the iterator reads exactly 150..180.
    assert_eq!(video.reads, 30);
}

#[test]
fn empty_segment_yields_nothing_without_seeking() {
    let mut video = ScriptedVideo::new(30.0, 600);
    assert!(sampled_indices(&mut video, 6.0, 6.0, 2.0).is_empty());
    assert!(sampled_indices(&mut video, 7.0, 6.0, 2.0).is_empty());
    assert!(video.seeks.is_empty());
    assert_eq!(video.reads, 0);
}

#[test]
fn short_video_truncates_the_segment() {
    // 160 frames: the segment wants 150..180 but only 150..160 exist.
    let mut video = ScriptedVideo::new(30.0, 160);
    assert_eq!(sampled_indices(&mut video, 5.0, 6.0, 2.0), [150]);
}

#[test]
fn segment_past_the_end_is_empty() {
    let mut video = ScriptedVideo::new(30.0, 100);
    assert!(sampled_indices(&mut video, 10.0, 11.0, 2.0).is_empty());
}

#[test]
fn selected_decode_failure_reports_the_frame_index() {
    let mut video = ScriptedVideo::new(30.0, 600).with_failing_frames([165]);
    let results: Vec<_> = sample_segment(&mut video, 5.0, 6.0, 2.0).unwrap().collect();

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].as_ref().unwrap().source_frame_index, 150);
    assert!(matches!(
        results[1],
        Err(FramesiftError::FrameDecodeError {
            frame_index: 165,
            ..
        })
    ));
}

#[test]
fn unselected_decode_failure_is_ignored() {
    let mut video = ScriptedVideo::new(30.0, 600).with_failing_frames([151, 160]);
    assert_eq!(sampled_indices(&mut video, 5.0, 6.0, 2.0), [150, 165]);
}

#[test]
fn seek_failure_is_returned_before_any_read() {
    let mut video = ScriptedVideo::new(30.0, 600).with_failing_seeks();
    let result = sample_segment(&mut video, 5.0, 6.0, 2.0);
    assert!(matches!(
        result,
        Err(FramesiftError::SeekFailed {
            frame_index: 150,
            ..
        })
    ));
    assert_eq!(video.reads, 0);
}

#[test]
fn invalid_rate_is_rejected() {
    let mut video = ScriptedVideo::new(30.0, 600);
    assert!(matches!(
        sample_segment(&mut video, 5.0, 6.0, -1.0),
        Err(FramesiftError::InvalidSegment { .. })
    ));
}

#[test]
fn zero_frame_rate_is_rejected() {
    let mut video = ScriptedVideo::new(0.0, 600);
    assert!(matches!(
        sample_segment(&mut video, 5.0, 6.0, 2.0),
        Err(FramesiftError::InvalidVideoMetadata { .. })
    ));
}

#[test]
fn size_hint_bounds_remaining_samples() {
    let mut video = ScriptedVideo::new(30.0, 600);
    let mut frames = sample_segment(&mut video, 5.0, 6.0, 2.0).unwrap();
    assert_eq!(frames.size_hint(), (0, Some(2)));
    frames.next();
    assert_eq!(frames.size_hint(), (0, Some(1)));
    frames.next();
    assert_eq!(frames.size_hint(), (0, Some(0)));
    assert!(frames.next().is_none());
    assert!(frames.next().is_none());
}

#[test]
fn consecutive_segments_share_one_handle() {
    let mut video = ScriptedVideo::new(30.0, 1200);
    let first = sampled_indices(&mut video, 5.0, 6.0, 2.0);
    let second = sampled_indices(&mut video, 1.0, 2.0, 2.0);
    assert_eq!(first, [150, 165]);
    assert_eq!(second, [30, 45]);
    assert_eq!(video.seeks, [150, 30]);
}
