//! Single-frame export.
//!
//! [`FrameExporter`] turns one [`FrameRequest`] against one
//! [`VideoHandle`] into one image file named
//! `{stem}_frame_{seconds:.2}sec.{ext}`. It never retries and never batches;
//! iterating over several videos or timestamps is left to the caller, which
//! also decides whether a failure stops the run.

use std::{
    fmt,
    fs::{self, OpenOptions},
    io::{self, Cursor, Write},
    path::{Path, PathBuf},
    str::FromStr,
};

use image::{ImageFormat, RgbImage, codecs::jpeg::JpegEncoder};

use crate::{config::ExportOptions, conversion, error::FrameGrabError, video::VideoHandle};

/// Outcome of a single export: the written path, or why nothing was written.
pub type ExportResult = Result<PathBuf, FrameGrabError>;

/// Image format of an exported frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OutputFormat {
    /// Portable Network Graphics. The default.
    #[default]
    Png,
    /// JPEG, encoded at [`ExportOptions::jpeg_quality`].
    Jpg,
    /// Windows bitmap.
    Bmp,
}

impl OutputFormat {
    /// Every supported format, in menu order.
    pub const ALL: [OutputFormat; 3] = [OutputFormat::Png, OutputFormat::Jpg, OutputFormat::Bmp];

    /// File extension: the lowercase format name.
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Jpg => "jpg",
            OutputFormat::Bmp => "bmp",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OutputFormat::Png => "PNG",
            OutputFormat::Jpg => "JPG",
            OutputFormat::Bmp => "BMP",
        })
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().trim_start_matches('.').to_ascii_lowercase().as_str() {
            "png" => Ok(OutputFormat::Png),
            "jpg" | "jpeg" => Ok(OutputFormat::Jpg),
            "bmp" => Ok(OutputFormat::Bmp),
            other => Err(format!("unsupported image format `{other}` (expected png, jpg or bmp)")),
        }
    }
}

/// A request to export the frame at one point in time.
///
/// The time is rounded to hundredths of a second on construction, which is
/// the precision that ends up in the file name; the exported frame is the
/// one shown at the rounded time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameRequest {
    time_seconds: f64,
    format: OutputFormat,
}

impl FrameRequest {
    /// Create a request for the frame at `time_seconds`.
    ///
    /// Bounds are checked against the target video at export time.
    pub fn new(time_seconds: f64, format: OutputFormat) -> Self {
        Self {
            time_seconds: conversion::round_to_hundredths(time_seconds),
            format,
        }
    }

    /// Requested time in seconds, rounded to hundredths.
    pub fn time_seconds(&self) -> f64 {
        self.time_seconds
    }

    /// Requested output format.
    pub fn format(&self) -> OutputFormat {
        self.format
    }
}

/// File name for the frame of `stem` at `time_seconds`.
///
/// ```
/// use framegrab::{OutputFormat, frame_file_name};
///
/// assert_eq!(frame_file_name("clip", 5.0, OutputFormat::Png), "clip_frame_5.00sec.png");
/// ```
pub fn frame_file_name(stem: &str, time_seconds: f64, format: OutputFormat) -> String {
    format!("{stem}_frame_{time_seconds:.2}sec.{}", format.extension())
}

/// Writes single decoded frames into an output directory.
///
/// # Example
///
/// ```no_run
/// use framegrab::{FrameExporter, FrameRequest, OutputFormat, VideoHandle};
///
/// let mut handle = VideoHandle::open("input.mp4")?;
/// let exporter = FrameExporter::new("frames");
/// let path = exporter.export(&mut handle, &FrameRequest::new(5.0, OutputFormat::Png))?;
/// println!("wrote {}", path.display());
/// # Ok::<(), framegrab::FrameGrabError>(())
/// ```
#[derive(Debug, Clone)]
pub struct FrameExporter {
    output_directory: PathBuf,
    options: ExportOptions,
}

impl FrameExporter {
    /// Create an exporter writing into `output_directory` with default options.
    ///
    /// The directory is created on the first export if it does not exist.
    pub fn new<P: Into<PathBuf>>(output_directory: P) -> Self {
        Self {
            output_directory: output_directory.into(),
            options: ExportOptions::default(),
        }
    }

    /// Replace the export options.
    #[must_use]
    pub fn with_options(mut self, options: ExportOptions) -> Self {
        self.options = options;
        self
    }

    /// Directory frames are written into.
    pub fn output_directory(&self) -> &Path {
        &self.output_directory
    }

    /// The active export options.
    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    /// Path the frame for `request` would be written to.
    pub fn target_path(&self, handle: &VideoHandle, request: &FrameRequest) -> PathBuf {
        let stem = handle
            .path()
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .filter(|stem| !stem.is_empty())
            .unwrap_or_else(|| "video".to_string());
        self.output_directory
            .join(frame_file_name(&stem, request.time_seconds(), request.format()))
    }

    /// Decode the frame for `request` and write it to disk.
    ///
    /// Nothing is written unless every step succeeds.
    ///
    /// # Errors
    ///
    /// - [`FrameGrabError::InvalidTimestamp`] if the time lies outside the video.
    /// - Decode errors from [`VideoHandle::decode_at_time`].
    /// - [`FrameGrabError::FrameWrite`] if the directory cannot be created,
    ///   the image cannot be encoded, the file exists and overwriting is
    ///   disabled, or the write itself fails.
    pub fn export(&self, handle: &mut VideoHandle, request: &FrameRequest) -> ExportResult {
        let seconds = request.time_seconds();
        let duration_seconds = handle.duration_seconds();
        if !seconds.is_finite() || seconds < 0.0 || seconds > duration_seconds {
            log::debug!(
                "Rejecting export at {seconds:.2}s from {} ({duration_seconds:.2}s long)",
                handle.path().display()
            );
            return Err(FrameGrabError::InvalidTimestamp {
                seconds,
                duration_seconds,
            });
        }

        let image = handle.decode_at_time(seconds)?;
        let target = self.target_path(handle, request);

        let write_error = |reason: String| FrameGrabError::FrameWrite {
            path: target.clone(),
            reason,
        };

        fs::create_dir_all(&self.output_directory).map_err(|error| {
            write_error(format!(
                "could not create directory {}: {error}",
                self.output_directory.display()
            ))
        })?;

        let bytes = self.encode(&image, request.format()).map_err(write_error)?;
        write_file(&target, &bytes, self.options.overwrite()).map_err(|error| {
            if error.kind() == io::ErrorKind::AlreadyExists {
                write_error("file already exists".to_string())
            } else {
                write_error(error.to_string())
            }
        })?;

        log::info!(
            "Exported frame at {seconds:.2}s of {} to {}",
            handle.path().display(),
            target.display()
        );
        Ok(target)
    }

    /// Encode into memory so a failed encode leaves no partial file behind.
    fn encode(&self, image: &RgbImage, format: OutputFormat) -> Result<Vec<u8>, String> {
        let mut buffer = Cursor::new(Vec::new());
        match format {
            OutputFormat::Png => image
                .write_to(&mut buffer, ImageFormat::Png)
                .map_err(|error| error.to_string())?,
            OutputFormat::Bmp => image
                .write_to(&mut buffer, ImageFormat::Bmp)
                .map_err(|error| error.to_string())?,
            OutputFormat::Jpg => {
                let encoder =
                    JpegEncoder::new_with_quality(&mut buffer, self.options.jpeg_quality());
                image
                    .write_with_encoder(encoder)
                    .map_err(|error| error.to_string())?;
            }
        }
        Ok(buffer.into_inner())
    }
}

/// Write `bytes` to `path`. Without `overwrite` the file must not exist yet;
/// the check and the create are one filesystem operation.
fn write_file(path: &Path, bytes: &[u8], overwrite: bool) -> io::Result<()> {
    if overwrite {
        return fs::write(path, bytes);
    }
    let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;
    file.write_all(bytes)
}
