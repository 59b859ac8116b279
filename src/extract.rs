//! Extraction orchestration.
//!
//! [`Extraction`] drives a full run against one [`SegmentRegistry`]:
//!
//! 1. **Acquire**: reuse `{output_root}/{video}` if present, otherwise hand
//!    the aggregated [`DownloadRange`](crate::DownloadRange)s to the
//!    [`Fetcher`].
//! 2. **Open**: open exactly one [`VideoSource`].
//! 3. **Per group**, in registry order: ensure
//!    `{output_root}/frames/{group}` exists and restart numbering at zero.
//! 4. **Per segment**: sample, then write each frame as
//!    `{group}_{NNNN}.jpg`. Frames that fail to decode or encode are
//!    logged and skipped without consuming a sequence number, so each
//!    group's files stay contiguous.
//! 5. **Close** the video and return a [`RunSummary`].
//!
//! # Example
//!
//! ```no_run
//! use framesift::{ExtractOptions, Extraction, Manifest, YtDlpFetcher};
//!
//! let manifest = Manifest::from_path("config/segments.json")?;
//! let registry = manifest.to_registry()?;
//! let extraction = Extraction::new(&registry, YtDlpFetcher::new(), ExtractOptions::new());
//!
//! let summary = extraction.run(manifest.source.as_deref())?;
//! println!("{} frames written", summary.total_frames());
//! # Ok::<(), framesift::FramesiftError>(())
//! ```

use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use serde::Serialize;

use crate::{
    error::FramesiftError,
    fetch::Fetcher,
    options::ExtractOptions,
    output::{FrameSample, JpegWriter},
    progress::{NoOpProgress, ProgressTracker},
    ranges::compute_download_ranges,
    registry::{Group, Segment, SegmentRegistry},
    sampler::{SegmentFrames, SegmentPlan, sample_segment},
    timestamp::format_time,
    video::{VideoFile, VideoSource},
};

/// Outcome of one segment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentSummary {
    pub start_seconds: f64,
    pub end_seconds: f64,
    pub sample_rate_hz: f64,
    pub frames_written: u64,
    pub frames_skipped: u64,
    /// `false` when the segment could not be positioned and was skipped.
    pub completed: bool,
}

/// Outcome of one group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSummary {
    pub name: String,
    pub description: String,
    pub output_dir: PathBuf,
    pub frames_written: u64,
    pub frames_skipped: u64,
    /// `true` when a numbered file past the last one written already
    /// existed, typically left by an earlier run that wrote more frames.
    pub leftover_files: bool,
    pub segments: Vec<SegmentSummary>,
}

/// Outcome of a full run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub video_path: PathBuf,
    pub frames_per_second: f64,
    pub frame_count: u64,
    pub groups: Vec<GroupSummary>,
}

impl RunSummary {
    /// Frames written across all groups.
    pub fn total_frames(&self) -> u64 {
        self.groups.iter().map(|group| group.frames_written).sum()
    }

    /// Frames skipped across all groups.
    pub fn total_skipped(&self) -> u64 {
        self.groups.iter().map(|group| group.frames_skipped).sum()
    }

    /// `true` if at least one frame was written.
    pub fn is_success(&self) -> bool {
        self.total_frames() > 0
    }

    pub fn group(&self, name: &str) -> Option<&GroupSummary> {
        self.groups.iter().find(|group| group.name == name)
    }
}

/// A configured extraction run.
///
/// Borrows the registry, owns the fetcher and options. The video handle is
/// created inside [`run`](Extraction::run) and never escapes it.
pub struct Extraction<'r, F: Fetcher> {
    registry: &'r SegmentRegistry,
    fetcher: F,
    options: ExtractOptions,
}

impl<'r, F: Fetcher> Extraction<'r, F> {
    pub fn new(registry: &'r SegmentRegistry, fetcher: F, options: ExtractOptions) -> Self {
        Self {
            registry,
            fetcher,
            options,
        }
    }

    pub fn options(&self) -> &ExtractOptions {
        &self.options
    }

    /// Make the source video available locally and return its path.
    ///
    /// Skips the fetch when the file already exists, so re-runs are
    /// idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`FramesiftError::AcquisitionFailed`] if the output root cannot
    /// be created, no locator is given for a missing video, the fetcher
    /// fails, or the fetcher leaves no file behind.
    pub fn acquire(&self, locator: Option<&str>) -> Result<PathBuf, FramesiftError> {
        let video_path = self.options.video_path();
        let failed = |locator: &str, reason: String| FramesiftError::AcquisitionFailed {
            locator: locator.to_string(),
            reason,
        };

        if video_path.is_file() {
            log::info!(
                "Video already present at {}, skipping fetch",
                video_path.display()
            );
            return Ok(video_path);
        }

        let locator = locator.ok_or_else(|| {
            failed(
                "<none>",
                format!("no source configured and no video at {}", video_path.display()),
            )
        })?;

        fs::create_dir_all(self.options.output_root()).map_err(|error| {
            failed(
                locator,
                format!(
                    "cannot create {}: {error}",
                    self.options.output_root().display()
                ),
            )
        })?;

        let ranges = compute_download_ranges(self.registry);
        self.fetcher
            .fetch(locator, &ranges, &video_path)
            .map_err(|error| match error {
                error @ FramesiftError::AcquisitionFailed { .. } => error,
                other => failed(locator, other.to_string()),
            })?;

        if !video_path.is_file() {
            return Err(failed(
                locator,
                format!("fetcher produced no file at {}", video_path.display()),
            ));
        }

        log::info!("Fetched video to {}", video_path.display());
        Ok(video_path)
    }

    /// Run the full pipeline with the FFmpeg-backed [`VideoFile`].
    ///
    /// # Errors
    ///
    /// See [`run_with`](Extraction::run_with).
    pub fn run(&self, locator: Option<&str>) -> Result<RunSummary, FramesiftError> {
        self.run_with(locator, |path| VideoFile::open(path))
    }

    /// Run the full pipeline, opening the video with `open`.
    ///
    /// # Errors
    ///
    /// Fatal errors abort the run: acquisition failures, open failures,
    /// [`FramesiftError::UnreadableVideo`] for a non-positive frame rate, and
    /// failures to create a group's output directory. Per-frame and per-seek
    /// failures are logged and counted in the summary instead.
    pub fn run_with<V, O>(
        &self,
        locator: Option<&str>,
        open: O,
    ) -> Result<RunSummary, FramesiftError>
    where
        V: VideoSource,
        O: FnOnce(&Path) -> Result<V, FramesiftError>,
    {
        let video_path = self.acquire(locator)?;

        let mut video = open(&video_path)?;
        let frames_per_second = video.frames_per_second();
        if !(frames_per_second.is_finite() && frames_per_second > 0.0) {
            return Err(FramesiftError::UnreadableVideo {
                path: video_path,
                reason: format!("invalid frame rate {frames_per_second}"),
            });
        }
        let frame_count = video.frame_count();

        log::info!(
            "Video {}: {frames_per_second:.3} fps, {frame_count} frames",
            video_path.display()
        );

        let groups = self.extract_groups(&mut video)?;

        drop(video);
        log::debug!("Released video handle for {}", video_path.display());

        let summary = RunSummary {
            video_path,
            frames_per_second,
            frame_count,
            groups,
        };
        log::info!(
            "Wrote {} frame(s) to {} ({} skipped)",
            summary.total_frames(),
            self.options.frames_root().display(),
            summary.total_skipped()
        );
        Ok(summary)
    }

    fn extract_groups<V: VideoSource>(
        &self,
        video: &mut V,
    ) -> Result<Vec<GroupSummary>, FramesiftError> {
        let frames_per_second = video.frames_per_second();
        let expected_total = self
            .registry
            .all_segments()
            .filter_map(|segment| plan_for(segment, frames_per_second).ok())
            .map(|plan| plan.expected_samples())
            .sum::<u64>();

        let writer = JpegWriter::new(self.options.jpeg_quality());
        let mut tracker = ProgressTracker::new(
            Arc::clone(&self.options.progress),
            Some(expected_total),
            self.options.batch_size,
        );

        let mut summaries = Vec::with_capacity(self.registry.len());
        for group in self.registry.all_groups() {
            summaries.push(self.extract_group(video, group, &writer, &mut tracker)?);
        }

        let last_group = summaries.last().map(|group| group.name.as_str()).unwrap_or("");
        tracker.finish(last_group);
        Ok(summaries)
    }

    fn extract_group<V: VideoSource>(
        &self,
        video: &mut V,
        group: &Group,
        writer: &JpegWriter,
        tracker: &mut ProgressTracker,
    ) -> Result<GroupSummary, FramesiftError> {
        let output_dir = self.options.group_dir(group.name());
        create_output_dir(&output_dir)?;

        log::info!(
            "Processing {} ({}) -> {}",
            group.name(),
            group.description(),
            output_dir.display()
        );

        let mut next_sequence = 0;
        let mut segments = Vec::with_capacity(group.segments().len());

        for segment in group.segments() {
            let label = segment_label(segment);
            let frames = match sample_segment(
                &mut *video,
                segment.start_seconds(),
                segment.end_seconds(),
                segment.sample_rate_hz(),
            ) {
                Ok(frames) => frames,
                Err(error) if error.is_recoverable() => {
                    log::warn!("[{}] {label}: skipping segment: {error}", group.name());
                    segments.push(SegmentSummary {
                        start_seconds: segment.start_seconds(),
                        end_seconds: segment.end_seconds(),
                        sample_rate_hz: segment.sample_rate_hz(),
                        frames_written: 0,
                        frames_skipped: 0,
                        completed: false,
                    });
                    continue;
                }
                Err(error) => return Err(error),
            };

            let (written, skipped) = write_frames(
                frames,
                group.name(),
                &label,
                &output_dir,
                writer,
                &mut next_sequence,
                tracker,
            );
            log::info!("  {label}: {written} frame(s)");

            segments.push(SegmentSummary {
                start_seconds: segment.start_seconds(),
                end_seconds: segment.end_seconds(),
                sample_rate_hz: segment.sample_rate_hz(),
                frames_written: written,
                frames_skipped: skipped,
                completed: true,
            });
        }

        let frames_written: u64 = segments.iter().map(|segment| segment.frames_written).sum();
        let frames_skipped: u64 = segments.iter().map(|segment| segment.frames_skipped).sum();
        log::info!("Total {}: {frames_written} frame(s)", group.name());
        let leftover_files = has_leftover_files(group.name(), &output_dir, next_sequence);

        Ok(GroupSummary {
            name: group.name().to_string(),
            description: group.description().to_string(),
            output_dir,
            frames_written,
            frames_skipped,
            leftover_files,
            segments,
        })
    }
}

/// Sample an entire video at `rate_hz` into `{output_dir}/{prefix}_{NNNN}.jpg`.
///
/// Reads until end of stream rather than trusting the reported frame count.
///
/// # Errors
///
/// - [`FramesiftError::InvalidGroupName`] if `prefix` is not a usable file
///   prefix.
/// - [`FramesiftError::OutputDirectoryFailed`] if `output_dir` cannot be
///   created.
/// - Any error from [`sample_segment`].
pub fn extract_uniform<V: VideoSource + ?Sized>(
    video: &mut V,
    rate_hz: f64,
    output_dir: &Path,
    prefix: &str,
    writer: &JpegWriter,
) -> Result<GroupSummary, FramesiftError> {
    let group = Group::new(prefix, "uniform sampling", Vec::new())?;
    create_output_dir(output_dir)?;

    let frames_per_second = video.frames_per_second();
    let frame_count = video.frame_count();
    log::info!(
        "Video: {frames_per_second:.3} fps, {frame_count} frames, {:.2}s; expecting ~{} image(s) at {rate_hz} Hz",
        frame_count as f64 / frames_per_second,
        (frame_count as f64 / frames_per_second * rate_hz) as u64,
    );

    let frames = sample_segment(&mut *video, 0.0, f64::INFINITY, rate_hz)?;
    let label = format!("00:00.000 - end @ {rate_hz} Hz");
    let mut tracker = ProgressTracker::new(Arc::new(NoOpProgress), None, 1);
    let mut next_sequence = 0;

    let (written, skipped) = write_frames(
        frames,
        group.name(),
        &label,
        output_dir,
        writer,
        &mut next_sequence,
        &mut tracker,
    );
    let end_seconds = video.position() as f64 / frames_per_second;
    let leftover_files = has_leftover_files(group.name(), output_dir, next_sequence);

    log::info!(
        "Extracted {written} image(s) into {}",
        output_dir.display()
    );

    Ok(GroupSummary {
        name: group.name().to_string(),
        description: group.description().to_string(),
        output_dir: output_dir.to_path_buf(),
        frames_written: written,
        frames_skipped: skipped,
        leftover_files,
        segments: vec![SegmentSummary {
            start_seconds: 0.0,
            end_seconds,
            sample_rate_hz: rate_hz,
            frames_written: written,
            frames_skipped: skipped,
            completed: true,
        }],
    })
}

/// Write every sampled frame, numbering from `next_sequence`.
///
/// The sequence number only advances after a successful write.
fn write_frames<V: VideoSource + ?Sized>(
    frames: SegmentFrames<'_, V>,
    group_name: &str,
    label: &str,
    output_dir: &Path,
    writer: &JpegWriter,
    next_sequence: &mut u64,
    tracker: &mut ProgressTracker,
) -> (u64, u64) {
    let mut written = 0;
    let mut skipped = 0;

    for result in frames {
        let frame = match result {
            Ok(frame) => frame,
            Err(error) => {
                log::warn!(
                    "[{group_name}] {label}: skipping frame (intended #{:04}): {error}",
                    *next_sequence
                );
                skipped += 1;
                continue;
            }
        };

        let sample = FrameSample {
            group_name,
            sequence_number: *next_sequence,
            source_frame_index: frame.source_frame_index,
        };
        let path = sample.path_in(output_dir);

        match writer.write(&frame.image, &path) {
            Ok(()) => {
                log::debug!(
                    "Saved frame {} -> {}",
                    sample.source_frame_index,
                    path.display()
                );
                *next_sequence += 1;
                written += 1;
                tracker.advance(group_name, sample.source_frame_index);
            }
            Err(error) => {
                log::warn!(
                    "[{group_name}] {label}: skipping frame {} (intended #{:04}): {error}",
                    sample.source_frame_index,
                    sample.sequence_number
                );
                skipped += 1;
            }
        }
    }

    (written, skipped)
}

/// Warn if `{group}_{next_sequence}.jpg` already exists after the last write.
fn has_leftover_files(group_name: &str, output_dir: &Path, next_sequence: u64) -> bool {
    let next = FrameSample {
        group_name,
        sequence_number: next_sequence,
        source_frame_index: 0,
    }
    .path_in(output_dir);

    let exists = next.exists();
    if exists {
        log::warn!(
            "[{group_name}] {} exists from an earlier run; files from #{next_sequence:04} on are stale",
            next.display()
        );
    }
    exists
}

fn create_output_dir(path: &Path) -> Result<(), FramesiftError> {
    fs::create_dir_all(path).map_err(|error| FramesiftError::OutputDirectoryFailed {
        path: path.to_path_buf(),
        reason: error.to_string(),
    })
}

fn plan_for(segment: &Segment, frames_per_second: f64) -> Result<SegmentPlan, FramesiftError> {
    SegmentPlan::new(
        segment.start_seconds(),
        segment.end_seconds(),
        segment.sample_rate_hz(),
        frames_per_second,
    )
}

fn segment_label(segment: &Segment) -> String {
    format!(
        "{} - {} @ {} Hz",
        format_time(segment.start_seconds()),
        format_time(segment.end_seconds()),
        segment.sample_rate_hz()
    )
}
