//! Shared test doubles.
//!
//! [`ScriptedVideo`] is an in-memory [`VideoSource`] whose frame `i` is a
//! small solid image derived from `i`, so tests can tell frames apart after
//! a JPEG round trip. [`RecordingFetcher`] writes a placeholder file and
//! records what it was asked to fetch.

#![allow(dead_code)]

use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
};

use framesift::{DownloadRange, Fetcher, FramesiftError, VideoSource};
use image::{DynamicImage, Rgb, RgbImage};

pub const FRAME_WIDTH: u32 = 16;
pub const FRAME_HEIGHT: u32 = 8;

/// Deterministic content for frame `index`.
pub fn frame_image(index: u64) -> DynamicImage {
    let shade = (index % 200) as u8;
    DynamicImage::ImageRgb8(RgbImage::from_pixel(
        FRAME_WIDTH,
        FRAME_HEIGHT,
        Rgb([shade, 255 - shade, 64]),
    ))
}

/// An image the JPEG encoder rejects: baseline JPEG caps width at 65535.
pub fn unencodable_image() -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::new(70_000, 1))
}

/// Recover the index encoded by [`frame_image`] from a decoded JPEG pixel.
pub fn shade_of(image: &DynamicImage) -> u8 {
    image.to_rgb8().get_pixel(FRAME_WIDTH / 2, FRAME_HEIGHT / 2)[0]
}

#[derive(Debug)]
pub struct ScriptedVideo {
    frames_per_second: f64,
    frame_count: u64,
    position: u64,
    failing_frames: HashSet<u64>,
    unencodable_frames: HashSet<u64>,
    failing_seeks: bool,
    /// Every seek target, in call order.
    pub seeks: Vec<u64>,
    /// Number of `read_next` calls that returned a frame or an error.
    pub reads: u64,
}

impl ScriptedVideo {
    pub fn new(frames_per_second: f64, frame_count: u64) -> Self {
        Self {
            frames_per_second,
            frame_count,
            position: 0,
            failing_frames: HashSet::new(),
            unencodable_frames: HashSet::new(),
            failing_seeks: false,
            seeks: Vec::new(),
            reads: 0,
        }
    }

    pub fn with_failing_frames<I: IntoIterator<Item = u64>>(mut self, frames: I) -> Self {
        self.failing_frames.extend(frames);
        self
    }

    /// Frames that decode fine but cannot be written as JPEG.
    pub fn with_unencodable_frames<I: IntoIterator<Item = u64>>(mut self, frames: I) -> Self {
        self.unencodable_frames.extend(frames);
        self
    }

    pub fn with_failing_seeks(mut self) -> Self {
        self.failing_seeks = true;
        self
    }
}

impl VideoSource for ScriptedVideo {
    fn frames_per_second(&self) -> f64 {
        self.frames_per_second
    }

    fn frame_count(&self) -> u64 {
        self.frame_count
    }

    fn position(&self) -> u64 {
        self.position
    }

    fn seek(&mut self, frame_index: u64) -> Result<(), FramesiftError> {
        self.seeks.push(frame_index);
        if self.failing_seeks {
            return Err(FramesiftError::SeekFailed {
                frame_index,
                reason: "scripted seek failure".to_string(),
            });
        }
        self.position = frame_index.min(self.frame_count);
        Ok(())
    }

    fn read_next(&mut self) -> Option<Result<DynamicImage, FramesiftError>> {
        if self.position >= self.frame_count {
            return None;
        }
        let index = self.position;
        self.position += 1;
        self.reads += 1;

        if self.failing_frames.contains(&index) {
            return Some(Err(FramesiftError::VideoDecodeError(format!(
                "scripted decode failure at {index}"
            ))));
        }
        if self.unencodable_frames.contains(&index) {
            return Some(Ok(unencodable_image()));
        }
        Some(Ok(frame_image(index)))
    }
}

/// One recorded fetch call.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchCall {
    pub locator: String,
    pub ranges: Vec<DownloadRange>,
    pub destination: PathBuf,
}

/// Writes a placeholder file at the destination and records the call.
#[derive(Debug, Default)]
pub struct RecordingFetcher {
    calls: Mutex<Vec<FetchCall>>,
    leave_no_file: bool,
}

impl RecordingFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reports success without creating a file.
    pub fn leaving_no_file() -> Self {
        Self {
            leave_no_file: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<FetchCall> {
        self.calls.lock().expect("fetch log poisoned").clone()
    }
}

impl Fetcher for RecordingFetcher {
    fn fetch(
        &self,
        locator: &str,
        ranges: &[DownloadRange],
        destination: &Path,
    ) -> Result<(), FramesiftError> {
        self.calls
            .lock()
            .expect("fetch log poisoned")
            .push(FetchCall {
                locator: locator.to_string(),
                ranges: ranges.to_vec(),
                destination: destination.to_path_buf(),
            });

        if !self.leave_no_file {
            fs::write(destination, b"placeholder video")?;
        }
        Ok(())
    }
}

/// Sorted file names in `dir`.
pub fn list_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .expect("Failed to read output directory")
        .map(|entry| {
            entry
                .expect("Failed to read entry")
                .file_name()
                .to_string_lossy()
                .into_owned()
        })
        .collect();
    names.sort();
    names
}
