//! Time-segment frame sampling.
//!
//! A [`SegmentPlan`] maps a `[start, end)` time range and a target sample
//! rate onto frame indices of a video with a given native frame rate:
//!
//! - `frame_interval = max(1, floor(native_fps / rate_hz))`
//! - `start_frame = floor(start_seconds * native_fps)`
//! - `end_frame = floor(end_seconds * native_fps)`
//!
//! A frame `i` in `[start_frame, end_frame)` is selected iff
//! `(i - start_frame) % frame_interval == 0`. Rates above the native rate
//! select every frame; frames are never duplicated.
//!
//! [`sample_segment`] binds a plan to a [`VideoSource`], seeks once, and
//! returns a lazy [`SegmentFrames`] iterator that reads sequentially.
//!
//! # Example
//!
//! ```no_run
//! use framesift::{VideoFile, sample_segment};
//!
//! let mut video = VideoFile::open("output/video.mp4")?;
//! for sample in sample_segment(&mut video, 5.0, 6.0, 2.0)? {
//!     let sample = sample?;
//!     sample.image.save(format!("frame_{}.png", sample.source_frame_index))?;
//! }
//! # Ok::<(), framesift::FramesiftError>(())
//! ```

use std::iter::FusedIterator;

use image::DynamicImage;

use crate::{error::FramesiftError, video::VideoSource};

/// Convert a sample rate into a stride over native frames.
///
/// # Errors
///
/// - [`FramesiftError::InvalidVideoMetadata`] if `native_fps` is not a
///   finite positive number.
/// - [`FramesiftError::InvalidSegment`] if `rate_hz` is not a finite
///   positive number.
pub fn frame_interval(native_fps: f64, rate_hz: f64) -> Result<u64, FramesiftError> {
    if !(native_fps.is_finite() && native_fps > 0.0) {
        return Err(FramesiftError::InvalidVideoMetadata {
            frames_per_second: native_fps,
        });
    }
    if !(rate_hz.is_finite() && rate_hz > 0.0) {
        return Err(FramesiftError::InvalidSegment {
            start: 0.0,
            end: 0.0,
            rate: rate_hz,
            reason: "sample rate must be positive".to_string(),
        });
    }

    Ok(((native_fps / rate_hz).floor() as u64).max(1))
}

/// Frame-index form of one segment against one frame rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentPlan {
    pub start_frame: u64,
    /// Exclusive upper bound.
    pub end_frame: u64,
    pub frame_interval: u64,
}

impl SegmentPlan {
    /// Compute the plan for `[start_seconds, end_seconds)` at `rate_hz`.
    ///
    /// # Errors
    ///
    /// Same as [`frame_interval`].
    pub fn new(
        start_seconds: f64,
        end_seconds: f64,
        rate_hz: f64,
        native_fps: f64,
    ) -> Result<Self, FramesiftError> {
        let frame_interval = frame_interval(native_fps, rate_hz)?;
        Ok(Self {
            start_frame: seconds_to_frame(start_seconds, native_fps),
            end_frame: seconds_to_frame(end_seconds, native_fps),
            frame_interval,
        })
    }

    /// `true` when no frame falls inside the range.
    pub fn is_empty(&self) -> bool {
        self.start_frame >= self.end_frame
    }

    /// Whether absolute frame `index` is sampled.
    pub fn selects(&self, index: u64) -> bool {
        index >= self.start_frame
            && index < self.end_frame
            && (index - self.start_frame) % self.frame_interval == 0
    }

    /// Number of frames the plan selects, assuming the video is long enough.
    pub fn expected_samples(&self) -> u64 {
        if self.is_empty() {
            0
        } else {
            (self.end_frame - self.start_frame).div_ceil(self.frame_interval)
        }
    }

    /// The selected indices, in ascending order.
    pub fn indices(&self) -> impl Iterator<Item = u64> {
        (self.start_frame..self.end_frame).step_by(self.frame_interval as usize)
    }
}

fn seconds_to_frame(seconds: f64, native_fps: f64) -> u64 {
    // Saturating cast: negative and NaN map to 0.
    (seconds * native_fps).floor() as u64
}

/// A frame selected by a [`SegmentPlan`].
#[derive(Debug, Clone)]
pub struct SampledFrame {
    /// Absolute index of the frame in the source video.
    pub source_frame_index: u64,
    pub image: DynamicImage,
}

/// Lazy, single-pass iterator over the selected frames of one segment.
///
/// Holds the video by exclusive borrow for its lifetime, so no other seek
/// can interleave. Yields frames in strictly ascending index order and
/// stops at `end_frame` or end of stream, whichever comes first.
pub struct SegmentFrames<'v, V: VideoSource + ?Sized> {
    video: &'v mut V,
    plan: SegmentPlan,
    next_index: u64,
    done: bool,
}

impl<'v, V: VideoSource + ?Sized> SegmentFrames<'v, V> {
    /// The plan being executed.
    pub fn plan(&self) -> &SegmentPlan {
        &self.plan
    }
}

impl<V: VideoSource + ?Sized> Iterator for SegmentFrames<'_, V> {
    type Item = Result<SampledFrame, FramesiftError>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            if self.next_index >= self.plan.end_frame {
                self.done = true;
                break;
            }

            let index = self.next_index;
            let Some(result) = self.video.read_next() else {
                log::debug!(
                    "End of stream at frame {index}, before segment end {}",
                    self.plan.end_frame
                );
                self.done = true;
                break;
            };
            self.next_index += 1;

            if !self.plan.selects(index) {
                if let Err(error) = result {
                    log::debug!("Ignoring undecodable unsampled frame {index}: {error}");
                }
                continue;
            }

            return Some(
                result
                    .map(|image| SampledFrame {
                        source_frame_index: index,
                        image,
                    })
                    .map_err(|error| FramesiftError::FrameDecodeError {
                        frame_index: index,
                        reason: error.to_string(),
                    }),
            );
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.done {
            return (0, Some(0));
        }
        let interval = self.plan.frame_interval;
        let steps = (self.next_index - self.plan.start_frame).div_ceil(interval);
        let next_selected = self.plan.start_frame + steps * interval;
        let upper = self.plan.end_frame.saturating_sub(next_selected).div_ceil(interval);
        // End of stream may cut the segment short.
        (0, Some(upper as usize))
    }
}

impl<V: VideoSource + ?Sized> FusedIterator for SegmentFrames<'_, V> {}

/// Plan a segment against `video`, seek to its first frame, and return
/// the lazy sample iterator.
///
/// An empty range (`start_frame >= end_frame`) yields nothing and does not
/// touch the video.
///
/// # Errors
///
/// - [`FramesiftError::InvalidVideoMetadata`] if the video's frame rate is
///   not positive.
/// - [`FramesiftError::InvalidSegment`] if `rate_hz` is not positive.
/// - [`FramesiftError::SeekFailed`] if the video cannot be positioned.
pub fn sample_segment<V: VideoSource + ?Sized>(
    video: &mut V,
    start_seconds: f64,
    end_seconds: f64,
    rate_hz: f64,
) -> Result<SegmentFrames<'_, V>, FramesiftError> {
    let plan = SegmentPlan::new(start_seconds, end_seconds, rate_hz, video.frames_per_second())?;

    let done = plan.is_empty();
    if !done {
        video.seek(plan.start_frame)?;
    }

    Ok(SegmentFrames {
        video,
        plan,
        next_index: plan.start_frame,
        done,
    })
}
