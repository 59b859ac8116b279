//! FFmpeg-backed video source tests.
//!
//! Tests require fixture files from `tests/fixtures/generate_fixtures.sh`.

mod common;

use std::{fs, path::Path};

use common::{RecordingFetcher, list_files};
use framesift::{
    ExtractOptions, Extraction, FramesiftError, Group, JpegWriter, Segment, SegmentRegistry,
    Stage, VideoFile, VideoSource, extract_uniform, sample_segment,
};

fn sample_video_path() -> &'static str {
    "tests/fixtures/sample_video.mp4"
}

fn sample_audio_only_path() -> &'static str {
    "tests/fixtures/sample_audio_only.m4a"
}

// ── opening ───────────────────────────────────────────────────────

#[test]
fn open_reports_stream_info() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let video = VideoFile::open(path).expect("Failed to open fixture");
    let info = video.info();
    assert_eq!(info.width, 320);
    assert_eq!(info.height, 240);
    assert!((info.frames_per_second - 30.0).abs() < 0.01);
    assert!(
        (295..=305).contains(&info.frame_count),
        "frame count {}",
        info.frame_count
    );
    assert_eq!(video.position(), 0);
    video.close();
}

#[test]
fn open_missing_file_is_unreadable() {
    let error = VideoFile::open("tests/fixtures/does_not_exist.mp4").unwrap_err();
    assert!(matches!(error, FramesiftError::UnreadableVideo { .. }));
    assert_eq!(error.stage(), Stage::Open);
}

#[test]
fn open_audio_only_has_no_video_stream() {
    let path = sample_audio_only_path();
    if !Path::new(path).exists() {
        return;
    }

    let error = VideoFile::open(path).unwrap_err();
    assert!(matches!(error, FramesiftError::NoVideoStream));
}

#[test]
fn open_garbage_file_is_unreadable() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("garbage.mp4");
    fs::write(&path, b"this is not a video").unwrap();

    assert!(matches!(
        VideoFile::open(&path),
        Err(FramesiftError::UnreadableVideo { .. })
    ));
}

// ── reading ───────────────────────────────────────────────────────

#[test]
fn sequential_reads_advance_the_cursor() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let mut video = VideoFile::open(path).expect("Failed to open fixture");
    for expected in 0..5 {
        assert_eq!(video.position(), expected);
        let frame = video
            .read_next()
            .expect("Unexpected end of stream")
            .expect("Decode error");
        assert_eq!(frame.width(), 320);
        assert_eq!(frame.height(), 240);
    }
    assert_eq!(video.position(), 5);
}

#[test]
fn seek_matches_sequential_read() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let mut sequential = VideoFile::open(path).expect("Failed to open fixture");
    let mut frame_45 = None;
    for _ in 0..=45 {
        frame_45 = Some(sequential.read_next().unwrap().unwrap());
    }

    let mut seeking = VideoFile::open(path).expect("Failed to open fixture");
    seeking.seek(45).expect("Failed to seek");
    assert_eq!(seeking.position(), 45);
    let sought = seeking.read_next().unwrap().unwrap();

    assert_eq!(
        sought.to_rgb8().as_raw(),
        frame_45.unwrap().to_rgb8().as_raw()
    );
}

#[test]
fn reads_end_at_end_of_stream() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let mut video = VideoFile::open(path).expect("Failed to open fixture");
    let frame_count = video.frame_count();
    video.seek(frame_count - 3).expect("Failed to seek");

    let mut remaining = 0;
    while let Some(frame) = video.read_next() {
        frame.expect("Decode error");
        remaining += 1;
        assert!(remaining <= 10, "too many frames past the end");
    }
    assert!(remaining >= 1);
    assert!(video.read_next().is_none());
}

// ── sampling ──────────────────────────────────────────────────────

#[test]
fn sample_segment_on_real_video() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let mut video = VideoFile::open(path).expect("Failed to open fixture");
    let indices: Vec<u64> = sample_segment(&mut video, 5.0, 6.0, 2.0)
        .expect("Failed to sample")
        .map(|result| result.expect("Decode error").source_frame_index)
        .collect();
    assert_eq!(indices, [150, 165]);
}

#[test]
fn segment_beyond_the_end_truncates() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let mut video = VideoFile::open(path).expect("Failed to open fixture");
    let count = sample_segment(&mut video, 9.5, 12.0, 2.0)
        .expect("Failed to sample")
        .filter_map(Result::ok)
        .count();
    assert_eq!(count, 1);
}

#[test]
fn uniform_extraction_on_real_video() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let dir = tempfile::tempdir().unwrap();
    let mut video = VideoFile::open(path).expect("Failed to open fixture");
    let summary = extract_uniform(&mut video, 1.0, dir.path(), "frame", &JpegWriter::default())
        .expect("Failed to extract");

    assert_eq!(summary.frames_written, 10);
    assert_eq!(list_files(dir.path()).len(), 10);
    let first = image::open(dir.path().join("frame_0000.jpg")).unwrap();
    assert_eq!(first.width(), 320);
}

#[test]
fn full_run_against_a_local_video() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let dir = tempfile::tempdir().unwrap();
    fs::copy(path, dir.path().join("video.mp4")).unwrap();

    let registry = SegmentRegistry::new(vec![
        Group::new("textbox", "", vec![Segment::new(5.0, 6.0, 2.0).unwrap()]).unwrap(),
        Group::new("choice", "", vec![Segment::new(1.0, 1.5, 10.0).unwrap()]).unwrap(),
    ])
    .unwrap();

    let fetcher = RecordingFetcher::new();
    let summary = Extraction::new(
        &registry,
        &fetcher,
        ExtractOptions::new().with_output_root(dir.path()),
    )
    .run(None)
    .expect("Run failed");

    assert!(fetcher.calls().is_empty());
    assert_eq!(summary.group("textbox").unwrap().frames_written, 2);
    assert_eq!(summary.group("choice").unwrap().frames_written, 5);
    assert_eq!(
        list_files(&dir.path().join("frames/choice")),
        [
            "choice_0000.jpg",
            "choice_0001.jpg",
            "choice_0002.jpg",
            "choice_0003.jpg",
            "choice_0004.jpg"
        ]
    );
}
