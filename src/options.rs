//! Extraction options.
//!
//! [`ExtractOptions`] is a builder that carries the output layout, JPEG
//! quality, and progress reporting into an
//! [`Extraction`](crate::Extraction) without widening its constructor.
//!
//! # Example
//!
//! ```
//! use framesift::ExtractOptions;
//!
//! let options = ExtractOptions::new()
//!     .with_output_root("dataset")
//!     .with_video_file_name("source.mp4")
//!     .with_jpeg_quality(90);
//!
//! assert_eq!(
//!     options.group_dir("choice_box"),
//!     std::path::Path::new("dataset/frames/choice_box"),
//! );
//! ```

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::{
    output::DEFAULT_JPEG_QUALITY,
    progress::{NoOpProgress, ProgressCallback},
};

/// Configuration for an extraction run.
#[derive(Clone)]
pub struct ExtractOptions {
    pub(crate) output_root: PathBuf,
    pub(crate) video_file_name: String,
    pub(crate) frames_dir_name: String,
    pub(crate) jpeg_quality: u8,
    pub(crate) progress: Arc<dyn ProgressCallback>,
    /// Fire the progress callback every N written frames.
    pub(crate) batch_size: u64,
}

impl Debug for ExtractOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("ExtractOptions")
            .field("output_root", &self.output_root)
            .field("video_file_name", &self.video_file_name)
            .field("frames_dir_name", &self.frames_dir_name)
            .field("jpeg_quality", &self.jpeg_quality)
            .field("batch_size", &self.batch_size)
            .finish_non_exhaustive()
    }
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractOptions {
    /// Defaults: root `output`, video `video.mp4`, images under `frames`,
    /// quality 95, no progress callback, batch size 1.
    pub fn new() -> Self {
        Self {
            output_root: PathBuf::from("output"),
            video_file_name: "video.mp4".to_string(),
            frames_dir_name: "frames".to_string(),
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            progress: Arc::new(NoOpProgress),
            batch_size: 1,
        }
    }

    /// Directory holding the fetched video and the `frames` tree.
    #[must_use]
    pub fn with_output_root<P: Into<PathBuf>>(mut self, root: P) -> Self {
        self.output_root = root.into();
        self
    }

    /// File name of the local source video inside the output root.
    #[must_use]
    pub fn with_video_file_name<S: Into<String>>(mut self, name: S) -> Self {
        self.video_file_name = name.into();
        self
    }

    /// Name of the directory, inside the output root, that holds one
    /// subdirectory per group.
    #[must_use]
    pub fn with_frames_dir_name<S: Into<String>>(mut self, name: S) -> Self {
        self.frames_dir_name = name.into();
        self
    }

    /// JPEG quality, clamped to `1..=100`.
    #[must_use]
    pub fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality.clamp(1, 100);
        self
    }

    /// Attach a progress callback.
    #[must_use]
    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = callback;
        self
    }

    /// Set how often the progress callback fires. Clamped to at least 1.
    #[must_use]
    pub fn with_batch_size(mut self, size: u64) -> Self {
        self.batch_size = size.max(1);
        self
    }

    pub fn output_root(&self) -> &Path {
        &self.output_root
    }

    pub fn jpeg_quality(&self) -> u8 {
        self.jpeg_quality
    }

    /// `{output_root}/{video_file_name}`
    pub fn video_path(&self) -> PathBuf {
        self.output_root.join(&self.video_file_name)
    }

    /// `{output_root}/{frames_dir_name}`
    pub fn frames_root(&self) -> PathBuf {
        self.output_root.join(&self.frames_dir_name)
    }

    /// `{output_root}/{frames_dir_name}/{group_name}`
    pub fn group_dir(&self, group_name: &str) -> PathBuf {
        self.frames_root().join(group_name)
    }
}
