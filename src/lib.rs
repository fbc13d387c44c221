//! # framegrab
//!
//! Scrub video files by frame index or timestamp and export single frames
//! as PNG, JPG, or BMP images, powered by FFmpeg via the
//! [`ffmpeg-next`](https://crates.io/crates/ffmpeg-next) crate.
//!
//! The crate has two moving parts:
//!
//! - [`VideoHandle`] opens a video, exposes its [`VideoMetadata`] (frame
//!   rate, frame count, duration, dimensions), and decodes single frames by
//!   index ([`decode_at_frame_index`](VideoHandle::decode_at_frame_index)) or
//!   by time ([`decode_at_time`](VideoHandle::decode_at_time)).
//! - [`FrameExporter`] decodes the frame for a [`FrameRequest`] and writes it
//!   to `{stem}_frame_{seconds:.2}sec.{ext}` in its output directory.
//!
//! Every fallible call returns a [`FrameGrabError`]; [`FrameGrabError::kind`]
//! sorts it into open, range, decode, or write failures.
//!
//! ## Quick Start
//!
//! ```no_run
//! use framegrab::{FrameExporter, FrameRequest, OutputFormat, VideoHandle};
//!
//! let mut handle = VideoHandle::open("input.mp4")?;
//!
//! // Preview the frame under a slider.
//! let preview = handle.decode_at_frame_index(120)?;
//! preview.save("preview.png").unwrap();
//!
//! // Export the frame at 5 seconds.
//! let exporter = FrameExporter::new("frames");
//! let written = exporter.export(&mut handle, &FrameRequest::new(5.0, OutputFormat::Jpg))?;
//! println!("{}", written.display());
//! # Ok::<(), framegrab::FrameGrabError>(())
//! ```
//!
//! ## Requirements
//!
//! FFmpeg development libraries must be installed on the build machine.

pub mod config;
mod conversion;
pub mod error;
pub mod export;
pub mod ffmpeg;
pub mod metadata;
pub mod video;

pub use config::ExportOptions;
pub use error::{ErrorKind, FrameGrabError};
pub use export::{ExportResult, FrameExporter, FrameRequest, OutputFormat, frame_file_name};
pub use ffmpeg::{FfmpegLogLevel, set_ffmpeg_log_level};
pub use metadata::VideoMetadata;
pub use video::VideoHandle;
