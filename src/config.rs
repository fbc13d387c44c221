//! Export configuration.
//!
//! [`ExportOptions`] is a small builder threaded into
//! [`FrameExporter`](crate::FrameExporter) so encoder and filesystem settings
//! do not leak into every call signature.
//!
//! ```
//! use framegrab::ExportOptions;
//!
//! let options = ExportOptions::new()
//!     .with_jpeg_quality(85)
//!     .with_overwrite(false);
//! assert_eq!(options.jpeg_quality(), 85);
//! assert!(!options.overwrite());
//! ```

/// JPEG quality used when none is configured.
pub const DEFAULT_JPEG_QUALITY: u8 = 95;

/// Settings for frame export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportOptions {
    jpeg_quality: u8,
    overwrite: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl ExportOptions {
    /// Create options with default settings.
    ///
    /// Defaults: JPEG quality 95, existing files are overwritten.
    pub fn new() -> Self {
        Self {
            jpeg_quality: DEFAULT_JPEG_QUALITY,
            overwrite: true,
        }
    }

    /// Set the JPEG quality. Clamped to `1..=100`; ignored for PNG and BMP.
    #[must_use]
    pub fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality.clamp(1, 100);
        self
    }

    /// Control whether an existing file at the target path is replaced.
    ///
    /// When `false`, exporting onto an existing file fails with
    /// [`FrameGrabError::FrameWrite`](crate::FrameGrabError::FrameWrite).
    #[must_use]
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// The configured JPEG quality.
    pub fn jpeg_quality(&self) -> u8 {
        self.jpeg_quality
    }

    /// Whether existing files are replaced.
    pub fn overwrite(&self) -> bool {
        self.overwrite
    }
}
