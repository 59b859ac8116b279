//! Error types for the `framesift` crate.
//!
//! This module defines [`FramesiftError`], the unified error type returned by
//! all fallible operations in the crate, and [`Stage`], the pipeline stage an
//! error belongs to. Configuration and setup errors abort a run; per-frame
//! errors are reported by [`FramesiftError::is_recoverable`] and skipped by
//! the orchestrator.

use std::{
    fmt::{Display, Formatter, Result as FmtResult},
    io::Error as IoError,
    path::PathBuf,
};

use ffmpeg_next::Error as FfmpegError;
use image::ImageError;
use serde_json::Error as JsonError;
use thiserror::Error;

/// The unified error type for all `framesift` operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FramesiftError {
    /// A timestamp string could not be parsed.
    #[error("Malformed timestamp {input:?}: {reason}")]
    MalformedTimestamp {
        /// The text that was passed to [`crate::parse_time`].
        input: String,
        /// Why parsing failed.
        reason: String,
    },

    /// A segment violates `0 <= start < end` or has a non-positive rate.
    #[error("Invalid segment ({start}s..{end}s @ {rate} Hz): {reason}")]
    InvalidSegment {
        /// Segment start in seconds.
        start: f64,
        /// Segment end in seconds.
        end: f64,
        /// Requested sample rate in hertz.
        rate: f64,
        /// Which constraint was violated.
        reason: String,
    },

    /// A group name cannot be used as a directory and file prefix.
    #[error("Invalid group name {0:?}")]
    InvalidGroupName(String),

    /// Two groups in the same registry share a name.
    #[error("Duplicate group name {0:?}")]
    DuplicateGroup(String),

    /// The segment manifest is not valid JSON or has the wrong shape.
    #[error("Invalid segment manifest: {0}")]
    ManifestError(String),

    /// The video reports a frame rate from which no interval can be computed.
    #[error("Invalid video metadata: frame rate {frames_per_second} is not positive")]
    InvalidVideoMetadata {
        /// The frame rate reported by the video source.
        frames_per_second: f64,
    },

    /// The source video could not be fetched.
    #[error("Failed to acquire video from {locator}: {reason}")]
    AcquisitionFailed {
        /// URL or locator handed to the fetcher.
        locator: String,
        /// Underlying reason the fetch failed.
        reason: String,
    },

    /// The fetched file could not be opened as a video.
    #[error("Failed to open video at {path}: {reason}")]
    UnreadableVideo {
        /// Path that was opened.
        path: PathBuf,
        /// Underlying reason the open failed.
        reason: String,
    },

    /// The file does not contain a video stream.
    #[error("No video stream found in file")]
    NoVideoStream,

    /// The decoder could not be repositioned.
    #[error("Failed to seek to frame {frame_index}: {reason}")]
    SeekFailed {
        /// Target frame index.
        frame_index: u64,
        /// Underlying FFmpeg message.
        reason: String,
    },

    /// A sampled frame could not be decoded.
    #[error("Failed to decode frame {frame_index}: {reason}")]
    FrameDecodeError {
        /// Absolute frame index in the source video.
        frame_index: u64,
        /// Underlying decoder message.
        reason: String,
    },

    /// Low-level decode failure before the frame index is known.
    #[error("Failed to decode video frame: {0}")]
    VideoDecodeError(String),

    /// A frame could not be encoded or written to disk.
    #[error("Failed to write frame to {path}: {reason}")]
    FrameEncodeError {
        /// Destination image path.
        path: PathBuf,
        /// Underlying encoder or I/O message.
        reason: String,
    },

    /// A group's output directory could not be created.
    #[error("Failed to prepare output directory {path}: {reason}")]
    OutputDirectoryFailed {
        /// Directory that was being created.
        path: PathBuf,
        /// Underlying I/O message.
        reason: String,
    },

    /// An error originating from the FFmpeg libraries.
    #[error("FFmpeg error: {0}")]
    FfmpegError(String),

    /// An I/O error occurred while reading or writing files.
    #[error("I/O error: {0}")]
    IoError(#[from] IoError),

    /// An error from the `image` crate.
    #[error("Image processing error: {0}")]
    ImageError(#[from] ImageError),
}

impl From<FfmpegError> for FramesiftError {
    fn from(error: FfmpegError) -> Self {
        FramesiftError::FfmpegError(error.to_string())
    }
}

impl From<JsonError> for FramesiftError {
    fn from(error: JsonError) -> Self {
        FramesiftError::ManifestError(error.to_string())
    }
}

/// The pipeline stage an error is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Loading the manifest and building the registry.
    Configure,
    /// Fetching the source video.
    Acquire,
    /// Opening the decode session.
    Open,
    /// Creating output directories.
    Prepare,
    /// Seeking and decoding frames.
    Sample,
    /// Encoding and persisting images.
    Write,
}

impl Display for Stage {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        let name = match self {
            Stage::Configure => "configure",
            Stage::Acquire => "acquire",
            Stage::Open => "open",
            Stage::Prepare => "prepare",
            Stage::Sample => "sample",
            Stage::Write => "write",
        };
        f.write_str(name)
    }
}

impl FramesiftError {
    /// The stage this error belongs to, for user-facing fatal messages.
    pub fn stage(&self) -> Stage {
        match self {
            FramesiftError::MalformedTimestamp { .. }
            | FramesiftError::InvalidSegment { .. }
            | FramesiftError::InvalidGroupName(_)
            | FramesiftError::DuplicateGroup(_)
            | FramesiftError::ManifestError(_) => Stage::Configure,
            FramesiftError::AcquisitionFailed { .. } => Stage::Acquire,
            FramesiftError::UnreadableVideo { .. }
            | FramesiftError::NoVideoStream
            | FramesiftError::InvalidVideoMetadata { .. } => Stage::Open,
            FramesiftError::OutputDirectoryFailed { .. } => Stage::Prepare,
            FramesiftError::SeekFailed { .. }
            | FramesiftError::FrameDecodeError { .. }
            | FramesiftError::VideoDecodeError(_)
            | FramesiftError::FfmpegError(_) => Stage::Sample,
            FramesiftError::FrameEncodeError { .. }
            | FramesiftError::IoError(_)
            | FramesiftError::ImageError(_) => Stage::Write,
        }
    }

    /// Returns `true` for failures isolated to one frame or one segment.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            FramesiftError::FrameDecodeError { .. }
                | FramesiftError::VideoDecodeError(_)
                | FramesiftError::FrameEncodeError { .. }
                | FramesiftError::SeekFailed { .. }
        )
    }
}
