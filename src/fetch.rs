//! Source video acquisition.
//!
//! A [`Fetcher`] turns a locator (usually a URL) and a list of
//! [`DownloadRange`]s into a local video file. [`YtDlpFetcher`] shells out
//! to [`yt-dlp`](https://github.com/yt-dlp/yt-dlp), requesting only the
//! configured sections with keyframe-aligned cuts so every section start
//! stays decodable. [`OfflineFetcher`] refuses to fetch and is used when
//! the video must already be present.

use std::{
    ffi::OsString,
    path::{Path, PathBuf},
    process::Command,
};

use crate::{error::FramesiftError, ranges::DownloadRange};

/// Makes a remote video available at a local path.
pub trait Fetcher {
    /// Fetch `locator` into `destination`.
    ///
    /// An empty `ranges` slice requests the whole video.
    ///
    /// # Errors
    ///
    /// Returns [`FramesiftError::AcquisitionFailed`] if the fetch fails.
    fn fetch(
        &self,
        locator: &str,
        ranges: &[DownloadRange],
        destination: &Path,
    ) -> Result<(), FramesiftError>;
}

impl<F: Fetcher + ?Sized> Fetcher for &F {
    fn fetch(
        &self,
        locator: &str,
        ranges: &[DownloadRange],
        destination: &Path,
    ) -> Result<(), FramesiftError> {
        (**self).fetch(locator, ranges, destination)
    }
}

/// Format selector preferring a single-file MP4.
pub const DEFAULT_FORMAT: &str = "best[ext=mp4]/best";

/// Fetches through the `yt-dlp` executable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YtDlpFetcher {
    program: PathBuf,
    format: String,
    force_keyframes_at_cuts: bool,
}

impl Default for YtDlpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl YtDlpFetcher {
    /// `yt-dlp` from `PATH`, MP4 preferred, keyframe-aligned cuts.
    pub fn new() -> Self {
        Self {
            program: PathBuf::from("yt-dlp"),
            format: DEFAULT_FORMAT.to_string(),
            force_keyframes_at_cuts: true,
        }
    }

    /// Use a specific `yt-dlp` executable.
    #[must_use]
    pub fn with_program<P: Into<PathBuf>>(mut self, program: P) -> Self {
        self.program = program.into();
        self
    }

    /// Override the `-f` format selector.
    #[must_use]
    pub fn with_format<S: Into<String>>(mut self, format: S) -> Self {
        self.format = format.into();
        self
    }

    /// Toggle `--force-keyframes-at-cuts`. Defaults to `true`.
    #[must_use]
    pub fn with_force_keyframes_at_cuts(mut self, enabled: bool) -> Self {
        self.force_keyframes_at_cuts = enabled;
        self
    }

    /// The argument list passed to the executable.
    pub fn command_args(
        &self,
        locator: &str,
        ranges: &[DownloadRange],
        destination: &Path,
    ) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec![
            "-f".into(),
            self.format.clone().into(),
            "-o".into(),
            destination.as_os_str().to_owned(),
        ];

        for range in ranges {
            args.push("--download-sections".into());
            args.push(range.to_section_spec().into());
        }
        if self.force_keyframes_at_cuts && !ranges.is_empty() {
            args.push("--force-keyframes-at-cuts".into());
        }

        args.push("--".into());
        args.push(locator.into());
        args
    }
}

impl Fetcher for YtDlpFetcher {
    fn fetch(
        &self,
        locator: &str,
        ranges: &[DownloadRange],
        destination: &Path,
    ) -> Result<(), FramesiftError> {
        let failed = |reason: String| FramesiftError::AcquisitionFailed {
            locator: locator.to_string(),
            reason,
        };

        log::info!(
            "Fetching {} section(s) of {locator} into {}",
            ranges.len(),
            destination.display()
        );

        let status = Command::new(&self.program)
            .args(self.command_args(locator, ranges, destination))
            .status()
            .map_err(|error| {
                failed(format!(
                    "could not run {}: {error}",
                    self.program.display()
                ))
            })?;

        if !status.success() {
            return Err(failed(format!(
                "{} exited with {status}",
                self.program.display()
            )));
        }
        Ok(())
    }
}

/// A fetcher that never fetches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OfflineFetcher;

impl Fetcher for OfflineFetcher {
    fn fetch(
        &self,
        locator: &str,
        _ranges: &[DownloadRange],
        destination: &Path,
    ) -> Result<(), FramesiftError> {
        Err(FramesiftError::AcquisitionFailed {
            locator: locator.to_string(),
            reason: format!(
                "offline mode and no video at {}",
                destination.display()
            ),
        })
    }
}
