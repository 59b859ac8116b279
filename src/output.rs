//! Output naming and JPEG persistence.
//!
//! Every written image is named by a [`FrameSample`]:
//! `{group_name}_{sequence_number:04}.jpg`. Sequence numbers start at zero
//! for each group; values past `9999` simply widen the field.
//! [`JpegWriter`] encodes frames to disk with a fixed quality.

use std::{
    fs,
    path::{Path, PathBuf},
};

use image::{DynamicImage, codecs::jpeg::JpegEncoder};

use crate::error::FramesiftError;

/// The identity of one output image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameSample<'a> {
    pub group_name: &'a str,
    pub sequence_number: u64,
    pub source_frame_index: u64,
}

impl FrameSample<'_> {
    /// `{group_name}_{sequence_number:04}.jpg`
    pub fn file_name(&self) -> String {
        format!("{}_{:04}.jpg", self.group_name, self.sequence_number)
    }

    /// [`file_name`](FrameSample::file_name) joined onto `directory`.
    pub fn path_in(&self, directory: &Path) -> PathBuf {
        directory.join(self.file_name())
    }
}

/// Default JPEG quality, matching the common OpenCV/libjpeg default.
pub const DEFAULT_JPEG_QUALITY: u8 = 95;

/// Encodes frames as baseline JPEG files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JpegWriter {
    quality: u8,
}

impl Default for JpegWriter {
    fn default() -> Self {
        Self::new(DEFAULT_JPEG_QUALITY)
    }
}

impl JpegWriter {
    /// Create a writer. `quality` is clamped to `1..=100`.
    pub fn new(quality: u8) -> Self {
        Self {
            quality: quality.clamp(1, 100),
        }
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }

    /// Encode `image` to `path`, replacing any existing file.
    ///
    /// JPEG has no alpha channel, so non-RGB8 images are converted first.
    /// The image is encoded in memory before `path` is touched, and a
    /// partially written file is removed, so a failed write never leaves a
    /// file behind.
    ///
    /// # Errors
    ///
    /// Returns [`FramesiftError::FrameEncodeError`] if the encoder fails or
    /// the file cannot be written.
    pub fn write(&self, image: &DynamicImage, path: &Path) -> Result<(), FramesiftError> {
        let encode_error = |reason: String| FramesiftError::FrameEncodeError {
            path: path.to_path_buf(),
            reason,
        };

        let mut buffer = Vec::new();
        let result = {
            let mut encoder = JpegEncoder::new_with_quality(&mut buffer, self.quality);
            match image {
                DynamicImage::ImageRgb8(rgb) => encoder.encode_image(rgb),
                DynamicImage::ImageLuma8(gray) => encoder.encode_image(gray),
                other => encoder.encode_image(&other.to_rgb8()),
            }
        };
        result.map_err(|error| encode_error(error.to_string()))?;

        fs::write(path, &buffer).map_err(|error| {
            if path.is_file() {
                let _ = fs::remove_file(path);
            }
            encode_error(error.to_string())
        })
    }
}
