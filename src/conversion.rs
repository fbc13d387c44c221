//! Internal conversion helpers.
//!
//! Pixel-plane packing and the arithmetic between seconds, frame indices,
//! stream PTS values, and container seek timestamps.

use ffmpeg_next::{Rational, ffi::AV_NOPTS_VALUE, frame::Video as VideoFrame};

/// Slack applied before flooring so that times such as `0.7 * 30.0`
/// (20.999999999999996) land on the frame they name.
const FRAME_EPSILON: f64 = 1e-6;

/// Copy pixel data from an FFmpeg video frame into a tightly-packed buffer.
///
/// FFmpeg frames frequently carry per-row padding (stride > width × bpp).
/// The padding is stripped so the result can go straight into
/// [`image::RgbImage::from_raw`].
pub fn frame_to_buffer(
    video_frame: &VideoFrame,
    width: u32,
    height: u32,
    bytes_per_pixel: usize,
) -> Vec<u8> {
    let stride = video_frame.stride(0);
    let expected_stride = (width as usize) * bytes_per_pixel;
    let data = video_frame.data(0);

    if stride == expected_stride {
        data[..expected_stride * (height as usize)].to_vec()
    } else {
        let mut buffer = Vec::with_capacity(expected_stride * (height as usize));
        for row in 0..(height as usize) {
            let row_start = row * stride;
            buffer.extend_from_slice(&data[row_start..row_start + expected_stride]);
        }
        buffer
    }
}

/// Presentation time of a frame index, in seconds.
pub fn frame_index_to_seconds(frame_index: u64, frames_per_second: f64) -> f64 {
    if frames_per_second <= 0.0 {
        return 0.0;
    }
    frame_index as f64 / frames_per_second
}

/// Index of the frame on screen at `seconds`.
///
/// Negative and non-finite inputs map to frame 0.
pub fn seconds_to_frame_index(seconds: f64, frames_per_second: f64) -> u64 {
    if !seconds.is_finite() || seconds <= 0.0 || frames_per_second <= 0.0 {
        return 0;
    }
    (seconds * frames_per_second + FRAME_EPSILON).floor() as u64
}

/// Convert seconds to a seek timestamp in AV_TIME_BASE (microseconds).
///
/// `Input::seek` without a stream index expects AV_TIME_BASE units, so the
/// stream time base is never involved here.
pub fn seconds_to_seek_timestamp(seconds: f64) -> i64 {
    (seconds.max(0.0) * 1_000_000.0).round() as i64
}

/// Rescale a PTS value from stream time base to seconds.
pub fn pts_to_seconds(pts: i64, time_base: Rational) -> f64 {
    if time_base.denominator() == 0 {
        return 0.0;
    }
    pts as f64 * time_base.numerator() as f64 / time_base.denominator() as f64
}

/// Start PTS of a stream, with an unset start time read as zero.
///
/// MPEG-TS streams typically start around 1.4 s and camera files often
/// carry an offset too.
pub fn stream_start_pts(start_time: i64) -> i64 {
    if start_time == AV_NOPTS_VALUE { 0 } else { start_time }
}

/// Rescale a PTS value to the index of the frame it presents.
///
/// `start_pts` is the stream's first timestamp, so the first frame is index
/// 0 whatever the container offset. Rounds to the nearest frame: decoded PTS
/// values sit on frame boundaries, and rounding absorbs the error of time
/// bases that are not multiples of the frame rate.
pub fn pts_to_frame_index(
    pts: i64,
    start_pts: i64,
    time_base: Rational,
    frames_per_second: f64,
) -> u64 {
    let frame = pts_to_seconds(pts.saturating_sub(start_pts), time_base) * frames_per_second;
    if frame <= 0.0 { 0 } else { frame.round() as u64 }
}

/// Frame count implied by a duration, for containers that do not record one.
pub fn estimate_frame_count(duration_seconds: f64, frames_per_second: f64) -> u64 {
    if !duration_seconds.is_finite() || duration_seconds <= 0.0 || frames_per_second <= 0.0 {
        return 0;
    }
    (duration_seconds * frames_per_second).round() as u64
}

/// Round a time to hundredths of a second.
///
/// Negative zero is folded into positive zero so it never formats as `-0.00`.
pub fn round_to_hundredths(seconds: f64) -> f64 {
    (seconds * 100.0).round() / 100.0 + 0.0
}

#[cfg(test)]
mod tests {
    use ffmpeg_next::Rational;

    use super::*;

    #[test]
    fn seconds_floor_to_frames() {
        assert_eq!(seconds_to_frame_index(0.0, 30.0), 0);
        assert_eq!(seconds_to_frame_index(0.7, 30.0), 21);
        assert_eq!(seconds_to_frame_index(5.0, 30.0), 150);
        assert_eq!(seconds_to_frame_index(5.02, 30.0), 150);
        assert_eq!(seconds_to_frame_index(-1.0, 30.0), 0);
        assert_eq!(seconds_to_frame_index(f64::NAN, 30.0), 0);
    }

    #[test]
    fn pts_rounds_to_nearest_frame() {
        let mp4_time_base = Rational::new(1, 15_360);
        // Frame 3 at 30 fps is 1536 ticks.
        assert_eq!(pts_to_frame_index(1_536, 0, mp4_time_base, 30.0), 3);
        assert_eq!(pts_to_frame_index(1_535, 0, mp4_time_base, 30.0), 3);

        let ntsc = Rational::new(1_001, 30_000);
        assert_eq!(pts_to_frame_index(42, 0, ntsc, 30_000.0 / 1_001.0), 42);
        assert_eq!(pts_to_frame_index(-512, 0, mp4_time_base, 30.0), 0);
    }

    #[test]
    fn frame_indices_are_relative_to_stream_start() {
        // MPEG-TS: 90 kHz clock, first frame at 1.4 s.
        let ts_time_base = Rational::new(1, 90_000);
        let start = 126_000;
        assert_eq!(pts_to_frame_index(start, start, ts_time_base, 30.0), 0);
        assert_eq!(pts_to_frame_index(start + 3_000, start, ts_time_base, 30.0), 1);
        assert_eq!(pts_to_frame_index(start + 450_000, start, ts_time_base, 30.0), 150);
        // Without the offset the first frame would read as frame 42.
        assert_eq!(pts_to_frame_index(start, 0, ts_time_base, 30.0), 42);
        assert_eq!(pts_to_frame_index(start - 3_000, start, ts_time_base, 30.0), 0);

        assert_eq!(stream_start_pts(AV_NOPTS_VALUE), 0);
        assert_eq!(stream_start_pts(start), start);
    }

    #[test]
    fn frame_count_estimates() {
        assert_eq!(estimate_frame_count(10.0, 30.0), 300);
        assert_eq!(estimate_frame_count(10.01, 30.0), 300);
        assert_eq!(estimate_frame_count(0.0, 30.0), 0);
        assert_eq!(estimate_frame_count(f64::NAN, 30.0), 0);
        assert_eq!(estimate_frame_count(-2.0, 30.0), 0);
    }

    #[test]
    fn seek_timestamps_are_microseconds() {
        assert_eq!(seconds_to_seek_timestamp(5.0), 5_000_000);
        assert_eq!(seconds_to_seek_timestamp(frame_index_to_seconds(1, 30.0)), 33_333);
        assert_eq!(seconds_to_seek_timestamp(-3.0), 0);
    }

    #[test]
    fn hundredths_rounding() {
        assert_eq!(round_to_hundredths(5.0), 5.0);
        assert_eq!(round_to_hundredths(4.996), 5.0);
        assert_eq!(round_to_hundredths(1.234), 1.23);
        assert_eq!(format!("{:.2}", round_to_hundredths(-0.0)), "0.00");
    }
}
