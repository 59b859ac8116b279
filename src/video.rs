//! Video sources.
//!
//! [`VideoSource`] is the decode-session contract the sampler works
//! against: a native frame rate, a frame count, a read cursor, explicit
//! seeking, and sequential reads. [`VideoFile`] implements it on top of
//! FFmpeg via [`ffmpeg-next`](https://crates.io/crates/ffmpeg-next),
//! decoding every frame to RGB8.
//!
//! # Example
//!
//! ```no_run
//! use framesift::{VideoFile, VideoSource};
//!
//! let mut video = VideoFile::open("output/video.mp4")?;
//! video.seek(150)?;
//! if let Some(frame) = video.read_next() {
//!     frame?.save("frame_150.png")?;
//! }
//! # Ok::<(), framesift::FramesiftError>(())
//! ```

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
    time::Duration,
};

use ffmpeg_next::{
    Error as FfmpegError, Packet, Rational,
    codec::context::Context as CodecContext,
    decoder::Video as VideoDecoder,
    format::{Pixel, context::Input},
    frame::Video as VideoFrame,
    media::Type,
    software::scaling::{Context as ScalingContext, Flags as ScalingFlags},
};
use image::{DynamicImage, RgbImage};
use serde::Serialize;

use crate::error::FramesiftError;

/// A seekable, sequentially readable decode session over one video.
///
/// Implementations own a single read cursor. [`seek`](VideoSource::seek)
/// positions it; each [`read_next`](VideoSource::read_next) returns the
/// frame at the cursor and advances it by one.
pub trait VideoSource {
    /// Native frame rate in frames per second.
    fn frames_per_second(&self) -> f64;

    /// Total number of frames (may be an estimate for some containers).
    fn frame_count(&self) -> u64;

    /// Index of the frame the next [`read_next`](VideoSource::read_next)
    /// will return.
    fn position(&self) -> u64;

    /// Move the cursor to `frame_index`.
    ///
    /// # Errors
    ///
    /// Returns [`FramesiftError::SeekFailed`] if the source cannot be
    /// repositioned.
    fn seek(&mut self, frame_index: u64) -> Result<(), FramesiftError>;

    /// Read the frame at the cursor and advance.
    ///
    /// Returns `None` at end of stream. `Some(Err(_))` reports a frame that
    /// failed to decode; the cursor still advances past it.
    fn read_next(&mut self) -> Option<Result<DynamicImage, FramesiftError>>;
}

/// Summary of an opened video stream.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VideoInfo {
    pub width: u32,
    pub height: u32,
    pub frames_per_second: f64,
    pub frame_count: u64,
    pub duration: Duration,
    pub codec: String,
}

/// An FFmpeg decode session over the best video stream of a file.
pub struct VideoFile {
    input_context: Input,
    decoder: VideoDecoder,
    scaler: ScalingContext,
    video_stream_index: usize,
    time_base: Rational,
    info: VideoInfo,
    path: PathBuf,
    position: u64,
    decoded_frame: VideoFrame,
    scaled_frame: VideoFrame,
    /// `decoded_frame` holds the frame at `position`, not yet returned.
    pending: bool,
    eof_sent: bool,
}

impl Debug for VideoFile {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("VideoFile")
            .field("path", &self.path)
            .field("info", &self.info)
            .field("video_stream_index", &self.video_stream_index)
            .field("position", &self.position)
            .finish_non_exhaustive()
    }
}

impl VideoFile {
    /// Open a video file and prepare an RGB8 decoder for its best video
    /// stream.
    ///
    /// # Errors
    ///
    /// - [`FramesiftError::UnreadableVideo`] if FFmpeg cannot open the file
    ///   or its decoder, or the stream reports no usable frame rate.
    /// - [`FramesiftError::NoVideoStream`] if the file has no video stream.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, FramesiftError> {
        let path = path.as_ref().to_path_buf();
        let unreadable = |reason: String| FramesiftError::UnreadableVideo {
            path: path.clone(),
            reason,
        };

        log::debug!("Opening video file: {}", path.display());

        ffmpeg_next::init()
            .map_err(|error| unreadable(format!("FFmpeg initialisation failed: {error}")))?;

        let input_context =
            ffmpeg_next::format::input(&path).map_err(|error| unreadable(error.to_string()))?;

        let duration_microseconds = input_context.duration();
        let duration = if duration_microseconds > 0 {
            Duration::from_micros(duration_microseconds as u64)
        } else {
            Duration::ZERO
        };

        let (video_stream_index, time_base, frames_per_second, reported_frames, decoder) = {
            let stream = input_context
                .streams()
                .best(Type::Video)
                .ok_or(FramesiftError::NoVideoStream)?;

            let frame_rate = stream.avg_frame_rate();
            let frames_per_second = if frame_rate.numerator() > 0 && frame_rate.denominator() > 0
            {
                frame_rate.numerator() as f64 / frame_rate.denominator() as f64
            } else {
                let rate = stream.rate();
                if rate.numerator() > 0 && rate.denominator() > 0 {
                    rate.numerator() as f64 / rate.denominator() as f64
                } else {
                    0.0
                }
            };

            let decoder_context = CodecContext::from_parameters(stream.parameters())
                .map_err(|error| unreadable(format!("Failed to read codec parameters: {error}")))?;
            let decoder = decoder_context
                .decoder()
                .video()
                .map_err(|error| unreadable(format!("Failed to create video decoder: {error}")))?;

            (
                stream.index(),
                stream.time_base(),
                frames_per_second,
                stream.frames(),
                decoder,
            )
        };

        if !(frames_per_second.is_finite() && frames_per_second > 0.0) {
            return Err(unreadable(format!(
                "stream reports invalid frame rate {frames_per_second}"
            )));
        }

        let frame_count = if reported_frames > 0 {
            reported_frames as u64
        } else {
            (duration.as_secs_f64() * frames_per_second) as u64
        };

        let width = decoder.width();
        let height = decoder.height();
        let scaler = ScalingContext::get(
            decoder.format(),
            width,
            height,
            Pixel::RGB24,
            width,
            height,
            ScalingFlags::BILINEAR,
        )
        .map_err(|error| unreadable(format!("Failed to create RGB converter: {error}")))?;

        let codec = decoder
            .codec()
            .map(|codec| codec.name().to_string())
            .unwrap_or_else(|| "unknown".to_string());

        let info = VideoInfo {
            width,
            height,
            frames_per_second,
            frame_count,
            duration,
            codec,
        };

        log::debug!(
            "Opened {}: {}x{} @ {:.3} fps, {} frames [{}]",
            path.display(),
            info.width,
            info.height,
            info.frames_per_second,
            info.frame_count,
            info.codec,
        );

        Ok(Self {
            input_context,
            decoder,
            scaler,
            video_stream_index,
            time_base,
            info,
            path,
            position: 0,
            decoded_frame: VideoFrame::empty(),
            scaled_frame: VideoFrame::empty(),
            pending: false,
            eof_sent: false,
        })
    }

    /// Stream summary captured at open time.
    pub fn info(&self) -> &VideoInfo {
        &self.info
    }

    /// Path this session was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Release the decode session.
    pub fn close(self) {
        log::debug!("Closing video file: {}", self.path.display());
    }

    /// Feed packets until the decoder yields a frame into `decoded_frame`.
    ///
    /// Returns `Ok(false)` once the decoder is fully drained.
    fn decode_next(&mut self) -> Result<bool, FramesiftError> {
        loop {
            if self.decoder.receive_frame(&mut self.decoded_frame).is_ok() {
                return Ok(true);
            }

            if self.eof_sent {
                return Ok(false);
            }

            let mut packet = Packet::empty();
            match packet.read(&mut self.input_context) {
                Ok(()) => {
                    if packet.stream() == self.video_stream_index {
                        self.decoder.send_packet(&packet).map_err(|error| {
                            FramesiftError::VideoDecodeError(error.to_string())
                        })?;
                    }
                }
                Err(FfmpegError::Eof) => {
                    self.decoder.send_eof()?;
                    self.eof_sent = true;
                }
                Err(_) => {
                    // Non-fatal read error, try the next packet.
                }
            }
        }
    }

    /// Frame number of the frame currently held in `decoded_frame`.
    fn decoded_frame_number(&self) -> u64 {
        let pts = self
            .decoded_frame
            .timestamp()
            .or_else(|| self.decoded_frame.pts())
            .unwrap_or(0);
        let seconds =
            pts as f64 * self.time_base.numerator() as f64 / self.time_base.denominator() as f64;
        (seconds * self.info.frames_per_second).round().max(0.0) as u64
    }

    fn convert_decoded_frame(&mut self) -> Result<DynamicImage, FramesiftError> {
        self.scaler
            .run(&self.decoded_frame, &mut self.scaled_frame)
            .map_err(|error| FramesiftError::VideoDecodeError(error.to_string()))?;

        let width = self.info.width;
        let height = self.info.height;
        let buffer = frame_to_rgb_buffer(&self.scaled_frame, width, height);
        let image = RgbImage::from_raw(width, height, buffer).ok_or_else(|| {
            FramesiftError::VideoDecodeError(
                "Failed to construct RGB image from decoded frame data".to_string(),
            )
        })?;
        Ok(DynamicImage::ImageRgb8(image))
    }
}

impl VideoSource for VideoFile {
    fn frames_per_second(&self) -> f64 {
        self.info.frames_per_second
    }

    fn frame_count(&self) -> u64 {
        self.info.frame_count
    }

    fn position(&self) -> u64 {
        self.position
    }

    /// Seek to the nearest keyframe at or before `frame_index`, then decode
    /// forward, discarding frames until the target is reached.
    fn seek(&mut self, frame_index: u64) -> Result<(), FramesiftError> {
        let seconds = frame_index as f64 / self.info.frames_per_second;
        let timestamp = (seconds * 1_000_000.0) as i64;

        self.input_context
            .seek(timestamp, ..timestamp)
            .map_err(|error| FramesiftError::SeekFailed {
                frame_index,
                reason: error.to_string(),
            })?;
        self.decoder.flush();
        self.eof_sent = false;
        self.pending = false;
        self.position = frame_index;

        loop {
            match self.decode_next() {
                Ok(true) => {
                    if self.decoded_frame_number() >= frame_index {
                        self.pending = true;
                        break;
                    }
                }
                Ok(false) => break,
                Err(error) => {
                    log::debug!("Skipping undecodable packet while seeking: {error}");
                }
            }
        }

        log::debug!(
            "Seeked to frame {frame_index} (landed on {})",
            if self.pending {
                self.decoded_frame_number().to_string()
            } else {
                "end of stream".to_string()
            }
        );
        Ok(())
    }

    fn read_next(&mut self) -> Option<Result<DynamicImage, FramesiftError>> {
        if !self.pending {
            match self.decode_next() {
                Ok(true) => {}
                Ok(false) => return None,
                Err(error) => {
                    self.position += 1;
                    return Some(Err(error));
                }
            }
        }

        self.pending = false;
        self.position += 1;
        Some(self.convert_decoded_frame())
    }
}

/// Copy an RGB24 frame into a tightly packed buffer, dropping row padding.
fn frame_to_rgb_buffer(video_frame: &VideoFrame, width: u32, height: u32) -> Vec<u8> {
    let stride = video_frame.stride(0);
    let row_bytes = (width as usize) * 3;
    let data = video_frame.data(0);

    if stride == row_bytes {
        data[..row_bytes * (height as usize)].to_vec()
    } else {
        let mut buffer = Vec::with_capacity(row_bytes * (height as usize));
        for row in 0..(height as usize) {
            let row_start = row * stride;
            buffer.extend_from_slice(&data[row_start..row_start + row_bytes]);
        }
        buffer
    }
}
