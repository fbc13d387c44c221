//! Error types for the `framegrab` crate.
//!
//! [`FrameGrabError`] is returned by every fallible operation. Each variant
//! belongs to one of the broad classes in [`ErrorKind`], which is what
//! callers usually branch on when deciding how to present a failure.

use std::path::PathBuf;

use ffmpeg_next::Error as FfmpegError;
use thiserror::Error;

/// The unified error type for all `framegrab` operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FrameGrabError {
    /// The video file could not be opened or its container/codec was rejected.
    #[error("Failed to open video at {path}: {reason}")]
    FileOpen {
        /// Path that was passed to [`crate::VideoHandle::open`].
        path: PathBuf,
        /// Underlying reason the open failed.
        reason: String,
    },

    /// The file opened but does not contain a video stream.
    #[error("No video stream found in {path}")]
    NoVideoStream {
        /// Path of the offending file.
        path: PathBuf,
    },

    /// The requested frame index is negative or past the last frame.
    #[error("Frame {frame_index} is out of range (video has {frame_count} frames)")]
    FrameOutOfRange {
        /// The frame index that was requested.
        frame_index: i64,
        /// The total number of frames in the video.
        frame_count: u64,
    },

    /// The requested time is negative, not finite, or past the video duration.
    #[error("Timestamp {seconds}s is out of range (video lasts {duration_seconds}s)")]
    InvalidTimestamp {
        /// The requested time in seconds.
        seconds: f64,
        /// The duration of the video in seconds.
        duration_seconds: f64,
    },

    /// A frame could not be decoded at an otherwise valid position.
    #[error("Failed to decode video frame: {0}")]
    VideoDecodeError(String),

    /// An error reported by FFmpeg while seeking or decoding.
    #[error("FFmpeg error: {0}")]
    FfmpegError(String),

    /// The decoded frame could not be encoded or written to disk.
    #[error("Failed to write frame to {path}: {reason}")]
    FrameWrite {
        /// Destination the frame was meant for.
        path: PathBuf,
        /// Underlying reason the write failed.
        reason: String,
    },

    /// The handle was used after its decoder resource had been released.
    #[error("Video handle has already been released")]
    HandleReleased,
}

/// Broad classification of a [`FrameGrabError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// The video resource could not be opened.
    Open,
    /// A requested time or frame index lies outside the video.
    Range,
    /// Seeking or decoding failed.
    Decode,
    /// Encoding the image or writing it to disk failed.
    Write,
    /// The handle was used after release.
    Released,
}

impl FrameGrabError {
    /// The class this error belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            FrameGrabError::FileOpen { .. } | FrameGrabError::NoVideoStream { .. } => {
                ErrorKind::Open
            }
            FrameGrabError::FrameOutOfRange { .. } | FrameGrabError::InvalidTimestamp { .. } => {
                ErrorKind::Range
            }
            FrameGrabError::VideoDecodeError(_) | FrameGrabError::FfmpegError(_) => {
                ErrorKind::Decode
            }
            FrameGrabError::FrameWrite { .. } => ErrorKind::Write,
            FrameGrabError::HandleReleased => ErrorKind::Released,
        }
    }
}

impl From<FfmpegError> for FrameGrabError {
    fn from(error: FfmpegError) -> Self {
        FrameGrabError::FfmpegError(error.to_string())
    }
}
