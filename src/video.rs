//! Timestamp-addressable frame access.
//!
//! [`VideoHandle`] opens a video file, caches its [`VideoMetadata`], and
//! decodes single frames by index or by time. The handle owns one FFmpeg
//! demuxer, decoder and scaler for its whole lifetime and keeps track of
//! where the decoder currently sits, so stepping forward one frame at a time
//! (the usual scrubbing pattern) never re-seeks.

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
};

use ffmpeg_next::{
    Error as FfmpegError, Rational,
    codec::context::Context as CodecContext,
    decoder::Video as VideoDecoder,
    format::{Pixel, context::Input},
    frame::Video as VideoFrame,
    media::Type,
    software::scaling::{Context as ScalingContext, Flags as ScalingFlags},
    util::error::EAGAIN,
};
use image::RgbImage;

use crate::{conversion, error::FrameGrabError, metadata::VideoMetadata};

/// An opened video file that can decode single frames on demand.
///
/// Each decode call moves the handle's internal read cursor, so the handle
/// takes `&mut self` and must not be shared between callers without external
/// synchronisation. Independent handles never share state.
///
/// # Example
///
/// ```no_run
/// use framegrab::VideoHandle;
///
/// let mut handle = VideoHandle::open("input.mp4")?;
/// println!("{:.2}s at {:.2} fps", handle.duration_seconds(), handle.frame_rate());
///
/// let first = handle.decode_at_frame_index(0)?;
/// let middle = handle.decode_at_time(handle.duration_seconds() / 2.0)?;
/// assert_eq!(first.dimensions(), middle.dimensions());
/// # Ok::<(), framegrab::FrameGrabError>(())
/// ```
pub struct VideoHandle {
    path: PathBuf,
    metadata: VideoMetadata,
    /// `None` once the decoder resource has been released.
    state: Option<DecoderState>,
}

/// The FFmpeg resources owned by an open handle.
struct DecoderState {
    input: Input,
    frames: FrameDecoder,
}

/// Decoder, scaler and cursor for the selected video stream.
struct FrameDecoder {
    decoder: VideoDecoder,
    /// Built lazily from the first decoded frame's pixel layout.
    scaler: Option<ScalingContext>,
    stream_index: usize,
    time_base: Rational,
    /// PTS of the first frame; frame indices and seeks are relative to it.
    start_pts: i64,
    frames_per_second: f64,
    width: u32,
    height: u32,
    /// Index of the frame the decoder yields next without a seek.
    cursor: Option<u64>,
}

impl Debug for VideoHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("VideoHandle")
            .field("path", &self.path)
            .field("metadata", &self.metadata)
            .field("released", &self.state.is_none())
            .field(
                "cursor",
                &self.state.as_ref().and_then(|state| state.frames.cursor),
            )
            .finish_non_exhaustive()
    }
}

impl VideoHandle {
    /// Open a video file.
    ///
    /// Initialises FFmpeg (idempotent), opens the container, selects the best
    /// video stream, and prepares a decoder for it.
    ///
    /// # Errors
    ///
    /// - [`FrameGrabError::FileOpen`] if the path does not exist, cannot be
    ///   read, the container or codec is rejected, or the stream reports no
    ///   usable frame rate, dimensions, or frame count.
    /// - [`FrameGrabError::NoVideoStream`] if the file has no video stream.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, FrameGrabError> {
        let path = path.as_ref().to_path_buf();
        let open_error = |reason: String| FrameGrabError::FileOpen {
            path: path.clone(),
            reason,
        };

        log::debug!("Opening video: {}", path.display());

        ffmpeg_next::init()
            .map_err(|error| open_error(format!("FFmpeg initialisation failed: {error}")))?;

        let input = ffmpeg_next::format::input(&path).map_err(|error| open_error(error.to_string()))?;

        let container_seconds = if input.duration() > 0 {
            input.duration() as f64 / 1_000_000.0
        } else {
            0.0
        };
        let format = input.format().name().to_string();

        let (
            stream_index,
            time_base,
            start_pts,
            frames_per_second,
            recorded_frames,
            stream_seconds,
            decoder,
        ) = {
            let stream = input
                .streams()
                .best(Type::Video)
                .ok_or_else(|| FrameGrabError::NoVideoStream { path: path.clone() })?;

            let time_base = stream.time_base();
            let start_pts = conversion::stream_start_pts(stream.start_time());

            // Prefer the average frame rate; fall back to the stream's base rate.
            let average = stream.avg_frame_rate();
            let base = stream.rate();
            let frames_per_second = if average.numerator() > 0 && average.denominator() > 0 {
                average.numerator() as f64 / average.denominator() as f64
            } else if base.numerator() > 0 && base.denominator() > 0 {
                base.numerator() as f64 / base.denominator() as f64
            } else {
                0.0
            };

            let stream_seconds = if stream.duration() > 0 {
                conversion::pts_to_seconds(stream.duration(), time_base)
            } else {
                0.0
            };

            let decoder = CodecContext::from_parameters(stream.parameters())
                .and_then(|context| context.decoder().video())
                .map_err(|error| {
                    open_error(format!(
                        "Failed to create video decoder for stream {}: {error}",
                        stream.index()
                    ))
                })?;

            (
                stream.index(),
                time_base,
                start_pts,
                frames_per_second,
                stream.frames(),
                stream_seconds,
                decoder,
            )
        };

        if !frames_per_second.is_finite() || frames_per_second <= 0.0 {
            return Err(open_error("video stream reports no frame rate".to_string()));
        }

        let width = decoder.width();
        let height = decoder.height();
        if width == 0 || height == 0 {
            return Err(open_error(format!(
                "video stream has invalid dimensions {width}x{height}"
            )));
        }

        let frame_count = if recorded_frames > 0 {
            recorded_frames as u64
        } else {
            let seconds = if stream_seconds > 0.0 {
                stream_seconds
            } else {
                container_seconds
            };
            let estimate = conversion::estimate_frame_count(seconds, frames_per_second);
            log::warn!(
                "{} does not record a frame count; estimated {estimate} frames from a {seconds:.3}s duration",
                path.display(),
            );
            estimate
        };
        if frame_count == 0 {
            return Err(open_error(
                "video stream has no frames and no usable duration".to_string(),
            ));
        }

        let codec = decoder
            .codec()
            .map(|codec| codec.name().to_string())
            .unwrap_or_else(|| "unknown".to_string());

        let metadata = VideoMetadata {
            width,
            height,
            frames_per_second,
            frame_count,
            codec,
            format,
        };

        log::info!(
            "Opened video: {} ({}x{}, {:.3} fps, {} frames, {:.2}s, codec={}, format={})",
            path.display(),
            metadata.width,
            metadata.height,
            metadata.frames_per_second,
            metadata.frame_count,
            metadata.duration_seconds(),
            metadata.codec,
            metadata.format,
        );

        Ok(Self {
            path,
            state: Some(DecoderState {
                input,
                frames: FrameDecoder {
                    decoder,
                    scaler: None,
                    stream_index,
                    time_base,
                    start_pts,
                    frames_per_second,
                    width,
                    height,
                    cursor: None,
                },
            }),
            metadata,
        })
    }

    /// Path the handle was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Cached video metadata.
    pub fn metadata(&self) -> &VideoMetadata {
        &self.metadata
    }

    /// Frames per second. Always positive.
    pub fn frame_rate(&self) -> f64 {
        self.metadata.frames_per_second
    }

    /// Total number of frames.
    pub fn frame_count(&self) -> u64 {
        self.metadata.frame_count
    }

    /// Duration in seconds (`frame_count / frame_rate`).
    pub fn duration_seconds(&self) -> f64 {
        self.metadata.duration_seconds()
    }

    /// Native frame size as `(width, height)`.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.metadata.width, self.metadata.height)
    }

    /// Returns `true` once [`release`](VideoHandle::release) has been called.
    pub fn is_released(&self) -> bool {
        self.state.is_none()
    }

    /// Decode the frame at a zero-based index.
    ///
    /// Seeks to the nearest keyframe before the target and decodes forward,
    /// unless the decoder already sits right before `frame_index`.
    ///
    /// # Errors
    ///
    /// - [`FrameGrabError::HandleReleased`] after [`release`](VideoHandle::release).
    /// - [`FrameGrabError::FrameOutOfRange`] if `frame_index < 0` or
    ///   `frame_index >= frame_count`.
    /// - [`FrameGrabError::VideoDecodeError`] or [`FrameGrabError::FfmpegError`]
    ///   if the frame cannot be read at that position.
    pub fn decode_at_frame_index(&mut self, frame_index: i64) -> Result<RgbImage, FrameGrabError> {
        if self.state.is_none() {
            return Err(FrameGrabError::HandleReleased);
        }

        let frame_count = self.metadata.frame_count;
        if frame_index < 0 || frame_index as u64 >= frame_count {
            return Err(FrameGrabError::FrameOutOfRange {
                frame_index,
                frame_count,
            });
        }

        self.seek_and_decode(frame_index as u64)
    }

    /// Decode the frame shown at `seconds`.
    ///
    /// Every time in `[0, duration_seconds]` is accepted; the end of the
    /// video maps to the last frame.
    ///
    /// # Errors
    ///
    /// - [`FrameGrabError::HandleReleased`] after [`release`](VideoHandle::release).
    /// - [`FrameGrabError::InvalidTimestamp`] if `seconds` is negative, not
    ///   finite, or greater than the duration.
    /// - Decode errors as for [`decode_at_frame_index`](VideoHandle::decode_at_frame_index).
    pub fn decode_at_time(&mut self, seconds: f64) -> Result<RgbImage, FrameGrabError> {
        if self.state.is_none() {
            return Err(FrameGrabError::HandleReleased);
        }

        let duration_seconds = self.duration_seconds();
        if !seconds.is_finite() || seconds < 0.0 || seconds > duration_seconds {
            return Err(FrameGrabError::InvalidTimestamp {
                seconds,
                duration_seconds,
            });
        }

        let frame_index = self.metadata.frame_at_time(seconds);
        self.seek_and_decode(frame_index)
    }

    /// Release the decoder resource.
    ///
    /// Metadata stays readable afterwards, but every decode call fails.
    /// Dropping a handle releases it implicitly.
    ///
    /// # Errors
    ///
    /// Returns [`FrameGrabError::HandleReleased`] if the handle was already
    /// released.
    pub fn release(&mut self) -> Result<(), FrameGrabError> {
        match self.state.take() {
            Some(state) => {
                drop(state);
                log::debug!("Released video: {}", self.path.display());
                Ok(())
            }
            None => Err(FrameGrabError::HandleReleased),
        }
    }

    fn seek_and_decode(&mut self, target: u64) -> Result<RgbImage, FrameGrabError> {
        let seek_seconds = self.metadata.time_of_frame(target);
        let path = &self.path;
        let DecoderState { input, frames } =
            self.state.as_mut().ok_or(FrameGrabError::HandleReleased)?;

        // The cursor is re-established only by a successful decode.
        if frames.cursor.take() == Some(target) {
            log::trace!("Frame {target} is next in the decoder; skipping seek");
        } else {
            // Container seeks take absolute timestamps.
            let start_seconds = conversion::pts_to_seconds(frames.start_pts, frames.time_base);
            let timestamp = conversion::seconds_to_seek_timestamp(start_seconds + seek_seconds);
            log::debug!(
                "Seeking {} to frame {target} ({seek_seconds:.3}s)",
                path.display()
            );
            input.seek(timestamp, ..timestamp)?;
            frames.decoder.flush();
        }

        // Frames still buffered from the previous request come first.
        if let Some(image) = frames.receive(target)? {
            return Ok(image);
        }

        for (stream, packet) in input.packets() {
            if stream.index() != frames.stream_index {
                continue;
            }

            frames.decoder.send_packet(&packet)?;
            if let Some(image) = frames.receive(target)? {
                return Ok(image);
            }
        }

        frames.decoder.send_eof()?;
        let image = frames.receive(target)?;
        // A drained decoder only accepts input again after a seek and flush.
        frames.cursor = None;

        image.ok_or_else(|| {
            FrameGrabError::VideoDecodeError(format!(
                "Could not locate frame {target} in {}",
                path.display()
            ))
        })
    }
}

impl FrameDecoder {
    /// Pull decoded frames until one at or past `target` shows up.
    fn receive(&mut self, target: u64) -> Result<Option<RgbImage>, FrameGrabError> {
        let mut decoded = VideoFrame::empty();

        while frame_received(self.decoder.receive_frame(&mut decoded))? {
            let pts = decoded.timestamp().or(decoded.pts()).unwrap_or(self.start_pts);
            let frame_index = conversion::pts_to_frame_index(
                pts,
                self.start_pts,
                self.time_base,
                self.frames_per_second,
            );
            log::trace!("Decoded frame {frame_index} (pts={pts})");

            if frame_index < target {
                continue;
            }

            let image = self.convert(&decoded)?;
            self.cursor = Some(frame_index + 1);
            return Ok(Some(image));
        }

        Ok(None)
    }

    /// Scale a decoded frame to packed RGB24 at the stream's native size.
    fn convert(&mut self, decoded: &VideoFrame) -> Result<RgbImage, FrameGrabError> {
        let reusable = self.scaler.take().filter(|scaler| {
            let input = scaler.input();
            input.format == decoded.format()
                && input.width == decoded.width()
                && input.height == decoded.height()
        });
        let scaler = match reusable {
            Some(scaler) => scaler,
            None => ScalingContext::get(
                decoded.format(),
                decoded.width(),
                decoded.height(),
                Pixel::RGB24,
                self.width,
                self.height,
                ScalingFlags::BILINEAR,
            )?,
        };
        let scaler = self.scaler.insert(scaler);

        let mut rgb_frame = VideoFrame::empty();
        scaler.run(decoded, &mut rgb_frame)?;

        let buffer = conversion::frame_to_buffer(&rgb_frame, self.width, self.height, 3);
        RgbImage::from_raw(self.width, self.height, buffer).ok_or_else(|| {
            FrameGrabError::VideoDecodeError(
                "Failed to construct RGB image from decoded frame data".to_string(),
            )
        })
    }
}

/// Classify a `receive_frame` result: `true` for a new frame, `false` when
/// the decoder needs more input or is drained. Anything else is a real
/// decode failure.
fn frame_received(result: Result<(), FfmpegError>) -> Result<bool, FfmpegError> {
    match result {
        Ok(()) => Ok(true),
        Err(FfmpegError::Other { errno }) if errno == EAGAIN => Ok(false),
        Err(FfmpegError::Eof) => Ok(false),
        Err(error) => Err(error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decoder_errors_are_not_mistaken_for_end_of_input() {
        assert!(matches!(frame_received(Ok(())), Ok(true)));
        assert!(matches!(
            frame_received(Err(FfmpegError::Other { errno: EAGAIN })),
            Ok(false)
        ));
        assert!(matches!(frame_received(Err(FfmpegError::Eof)), Ok(false)));
        assert!(matches!(
            frame_received(Err(FfmpegError::InvalidData)),
            Err(FfmpegError::InvalidData)
        ));

        let surfaced = FrameGrabError::from(FfmpegError::InvalidData);
        assert_eq!(surfaced.kind(), crate::ErrorKind::Decode);
    }
}
