//! # framesift
//!
//! Turn one source video into labeled sets of still images for training
//! data, driven by named groups of time segments with a per-segment
//! sampling rate.
//!
//! `framesift` normalizes timestamp notations, maps each segment onto
//! frame indices of the video's native frame rate, fetches only the
//! configured sections of a remote video, and writes sampled frames as
//! `{group}_{NNNN}.jpg` with contiguous numbering per group. Decoding is
//! powered by FFmpeg via [`ffmpeg-next`](https://crates.io/crates/ffmpeg-next);
//! images are encoded with the [`image`](https://crates.io/crates/image)
//! crate.
//!
//! ## Quick Start
//!
//! ### Run a manifest
//!
//! ```no_run
//! use framesift::{ExtractOptions, Extraction, Manifest, YtDlpFetcher};
//!
//! let manifest = Manifest::from_path("config/segments.json")?;
//! let registry = manifest.to_registry()?;
//!
//! let options = ExtractOptions::new().with_output_root("output");
//! let summary = Extraction::new(&registry, YtDlpFetcher::new(), options)
//!     .run(manifest.source.as_deref())?;
//!
//! for group in &summary.groups {
//!     println!("{}: {} frames", group.name, group.frames_written);
//! }
//! # Ok::<(), framesift::FramesiftError>(())
//! ```
//!
//! ### Sample one segment by hand
//!
//! ```no_run
//! use framesift::{VideoFile, parse_time, sample_segment};
//!
//! let mut video = VideoFile::open("output/video.mp4")?;
//! let start = parse_time("00:05")?;
//! let end = parse_time("00:06")?;
//!
//! for sample in sample_segment(&mut video, start, end, 2.0)? {
//!     let sample = sample?;
//!     println!("frame {}", sample.source_frame_index);
//! }
//! # Ok::<(), framesift::FramesiftError>(())
//! ```
//!
//! ## Requirements
//!
//! FFmpeg development libraries must be installed to build, and the
//! `yt-dlp` executable must be on `PATH` to fetch remote videos.

pub mod error;
pub mod extract;
pub mod fetch;
pub mod ffmpeg;
pub mod manifest;
pub mod options;
pub mod output;
pub mod progress;
pub mod ranges;
pub mod registry;
pub mod sampler;
pub mod timestamp;
pub mod video;

pub use error::{FramesiftError, Stage};
pub use extract::{Extraction, GroupSummary, RunSummary, SegmentSummary, extract_uniform};
pub use fetch::{Fetcher, OfflineFetcher, YtDlpFetcher};
pub use ffmpeg::{FfmpegLogLevel, set_ffmpeg_log_level};
pub use manifest::{GroupSpec, Manifest, SegmentSpec, TimeSpec};
pub use options::ExtractOptions;
pub use output::{FrameSample, JpegWriter};
pub use progress::{ProgressCallback, ProgressInfo};
pub use ranges::{DownloadRange, compute_download_ranges};
pub use registry::{Group, Segment, SegmentRegistry};
pub use sampler::{SampledFrame, SegmentFrames, SegmentPlan, frame_interval, sample_segment};
pub use timestamp::{format_time, parse_time};
pub use video::{VideoFile, VideoInfo, VideoSource};
