//! Video metadata.
//!
//! [`VideoMetadata`] is read once when a [`VideoHandle`](crate::VideoHandle)
//! is opened and never changes afterwards; seeking and decoding only move the
//! handle's internal cursor.

use std::time::Duration;

/// Metadata for the video stream of an opened file.
///
/// # Example
///
/// ```no_run
/// use framegrab::VideoHandle;
///
/// let handle = VideoHandle::open("input.mp4")?;
/// let metadata = handle.metadata();
/// println!(
///     "{}x{} @ {:.2} fps, {} frames, {:.2}s",
///     metadata.width,
///     metadata.height,
///     metadata.frames_per_second,
///     metadata.frame_count,
///     metadata.duration_seconds(),
/// );
/// # Ok::<(), framegrab::FrameGrabError>(())
/// ```
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub struct VideoMetadata {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Frames per second. Always positive for an opened handle.
    pub frames_per_second: f64,
    /// Total number of frames.
    ///
    /// Taken from the container when it records one, otherwise estimated
    /// from the stream duration and frame rate.
    pub frame_count: u64,
    /// Codec name (e.g. `"h264"`, `"vp9"`).
    pub codec: String,
    /// Container format name (e.g. `"mov,mp4,m4a,3gp,3g2,mj2"`, `"matroska,webm"`).
    pub format: String,
}

impl VideoMetadata {
    /// Duration in seconds, defined as `frame_count / frames_per_second`.
    pub fn duration_seconds(&self) -> f64 {
        if self.frames_per_second > 0.0 {
            self.frame_count as f64 / self.frames_per_second
        } else {
            0.0
        }
    }

    /// Duration as a [`Duration`].
    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.duration_seconds())
    }

    /// Presentation time of the frame at `frame_index`, in seconds.
    pub fn time_of_frame(&self, frame_index: u64) -> f64 {
        crate::conversion::frame_index_to_seconds(frame_index, self.frames_per_second)
    }

    /// Index of the frame shown at `seconds`, clamped to the last frame.
    ///
    /// Returns 0 for an empty video.
    pub fn frame_at_time(&self, seconds: f64) -> u64 {
        let index = crate::conversion::seconds_to_frame_index(seconds, self.frames_per_second);
        index.min(self.frame_count.saturating_sub(1))
    }
}

#[cfg(test)]
mod tests {
    use super::VideoMetadata;

    fn thirty_fps_ten_seconds() -> VideoMetadata {
        VideoMetadata {
            width: 320,
            height: 240,
            frames_per_second: 30.0,
            frame_count: 300,
            codec: "h264".to_string(),
            format: "mov,mp4,m4a,3gp,3g2,mj2".to_string(),
        }
    }

    #[test]
    fn duration_is_frame_count_over_rate() {
        let metadata = thirty_fps_ten_seconds();
        assert_eq!(metadata.duration_seconds(), 10.0);
        assert_eq!(metadata.duration().as_millis(), 10_000);

        let ntsc = VideoMetadata {
            frames_per_second: 30_000.0 / 1_001.0,
            frame_count: 1_798,
            ..thirty_fps_ten_seconds()
        };
        let expected = 1_798.0 * 1_001.0 / 30_000.0;
        assert!((ntsc.duration_seconds() - expected).abs() < 1e-9);
    }

    #[test]
    fn frame_time_mapping_clamps_to_last_frame() {
        let metadata = thirty_fps_ten_seconds();
        assert_eq!(metadata.frame_at_time(0.0), 0);
        assert_eq!(metadata.frame_at_time(5.0), 150);
        assert_eq!(metadata.frame_at_time(10.0), 299);
        assert_eq!(metadata.time_of_frame(150), 5.0);
    }
}
