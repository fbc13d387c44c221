//! Frame export integration tests.
//!
//! Tests require fixture files from `tests/fixtures/generate_fixtures.sh`.

use std::path::Path;

use framegrab::{
    ErrorKind, ExportOptions, FrameExporter, FrameGrabError, FrameRequest, OutputFormat,
    VideoHandle,
};

const SAMPLE_VIDEO: &str = "tests/fixtures/sample_video.mp4";

fn open_sample() -> Option<VideoHandle> {
    if !Path::new(SAMPLE_VIDEO).exists() {
        return None;
    }
    Some(VideoHandle::open(SAMPLE_VIDEO).expect("Failed to open test video"))
}

#[test]
fn export_png_at_five_seconds() {
    let Some(mut handle) = open_sample() else {
        return;
    };
    let output = tempfile::tempdir().expect("Failed to create temp dir");

    let exporter = FrameExporter::new(output.path());
    let written = exporter
        .export(&mut handle, &FrameRequest::new(5.0, OutputFormat::Png))
        .expect("export at 5s");

    assert_eq!(written, output.path().join("sample_video_frame_5.00sec.png"));
    let image = image::open(&written).expect("exported PNG should load");
    assert_eq!((image.width(), image.height()), (320, 240));
}

#[test]
fn exported_pixels_match_the_decoded_frame() {
    let Some(mut handle) = open_sample() else {
        return;
    };
    let output = tempfile::tempdir().expect("Failed to create temp dir");

    let decoded = handle.decode_at_time(2.5).expect("decode at 2.5s");
    let written = FrameExporter::new(output.path())
        .export(&mut handle, &FrameRequest::new(2.5, OutputFormat::Png))
        .expect("export at 2.5s");

    let exported = image::open(&written).expect("load export").to_rgb8();
    assert_eq!(exported, decoded);
}

#[test]
fn jpg_and_bmp_keep_source_dimensions() {
    let Some(mut handle) = open_sample() else {
        return;
    };
    let output = tempfile::tempdir().expect("Failed to create temp dir");
    let exporter = FrameExporter::new(output.path())
        .with_options(ExportOptions::new().with_jpeg_quality(80));

    for format in [OutputFormat::Jpg, OutputFormat::Bmp] {
        let written = exporter
            .export(&mut handle, &FrameRequest::new(1.0, format))
            .unwrap_or_else(|error| panic!("{format} export failed: {error}"));
        assert_eq!(
            written.extension().and_then(|extension| extension.to_str()),
            Some(format.extension())
        );
        let image = image::open(&written).expect("exported image should load");
        assert_eq!((image.width(), image.height()), (320, 240), "{format}");
    }
}

#[test]
fn out_of_range_export_writes_nothing() {
    let Some(mut handle) = open_sample() else {
        return;
    };
    let output = tempfile::tempdir().expect("Failed to create temp dir");
    let nested = output.path().join("never").join("created");

    let exporter = FrameExporter::new(&nested);
    for seconds in [15.0, 10.01, -1.0] {
        let error = exporter
            .export(&mut handle, &FrameRequest::new(seconds, OutputFormat::Png))
            .expect_err("time outside the video must fail");
        assert_eq!(error.kind(), ErrorKind::Range, "{seconds}: {error}");
    }

    assert!(!nested.exists(), "no directory should be created on failure");
}

#[test]
fn export_at_exact_duration_succeeds() {
    let Some(mut handle) = open_sample() else {
        return;
    };
    let output = tempfile::tempdir().expect("Failed to create temp dir");

    let written = FrameExporter::new(output.path())
        .export(&mut handle, &FrameRequest::new(10.0, OutputFormat::Png))
        .expect("the end of the video is exportable");
    assert!(written.ends_with("sample_video_frame_10.00sec.png"));
}

#[test]
fn creates_nested_output_directory() {
    let Some(mut handle) = open_sample() else {
        return;
    };
    let output = tempfile::tempdir().expect("Failed to create temp dir");
    let nested = output.path().join("a").join("b");

    let written = FrameExporter::new(&nested)
        .export(&mut handle, &FrameRequest::new(0.0, OutputFormat::Png))
        .expect("export into a missing directory");
    assert!(nested.is_dir());
    assert!(written.starts_with(&nested));
    assert!(written.is_file());
}

#[test]
fn distinct_times_and_videos_get_distinct_files() {
    let Some(mut handle) = open_sample() else {
        return;
    };
    let output = tempfile::tempdir().expect("Failed to create temp dir");
    let copy_path = output.path().join("second_clip.mp4");
    std::fs::copy(SAMPLE_VIDEO, &copy_path).expect("copy fixture");
    let mut copy = VideoHandle::open(&copy_path).expect("open copied fixture");

    let exporter = FrameExporter::new(output.path().join("frames"));
    let request = FrameRequest::new(3.0, OutputFormat::Png);

    let first = exporter.export(&mut handle, &request).expect("first");
    let later = exporter
        .export(&mut handle, &FrameRequest::new(3.01, OutputFormat::Png))
        .expect("later");
    let other = exporter.export(&mut copy, &request).expect("other video");

    assert_ne!(first, later);
    assert_ne!(first, other);
    assert!(other.ends_with("second_clip_frame_3.00sec.png"));
    for path in [&first, &later, &other] {
        assert!(path.is_file(), "{} missing", path.display());
    }
}

#[test]
fn overwrite_disabled_rejects_existing_file() {
    let Some(mut handle) = open_sample() else {
        return;
    };
    let output = tempfile::tempdir().expect("Failed to create temp dir");
    let exporter = FrameExporter::new(output.path())
        .with_options(ExportOptions::new().with_overwrite(false));
    let request = FrameRequest::new(4.0, OutputFormat::Bmp);

    let written = exporter.export(&mut handle, &request).expect("first export");
    let error = exporter
        .export(&mut handle, &request)
        .expect_err("second export onto the same file must fail");

    assert_eq!(error.kind(), ErrorKind::Write);
    assert!(
        matches!(&error, FrameGrabError::FrameWrite { path, .. } if *path == written),
        "Unexpected error: {error:?}",
    );
}

#[test]
fn overwrite_enabled_replaces_existing_file() {
    let Some(mut handle) = open_sample() else {
        return;
    };
    let output = tempfile::tempdir().expect("Failed to create temp dir");
    let exporter = FrameExporter::new(output.path());
    let request = FrameRequest::new(4.0, OutputFormat::Png);

    let target = exporter.target_path(&handle, &request);
    std::fs::write(&target, b"stale").expect("seed stale file");

    exporter.export(&mut handle, &request).expect("overwrite");
    let image = image::open(&target).expect("stale bytes should be replaced");
    assert_eq!(image.width(), 320);
}

#[test]
fn unwritable_directory_is_a_write_failure() {
    let Some(mut handle) = open_sample() else {
        return;
    };
    let output = tempfile::tempdir().expect("Failed to create temp dir");
    let blocker = output.path().join("not_a_directory");
    std::fs::write(&blocker, b"file").expect("create blocking file");

    let error = FrameExporter::new(blocker.join("frames"))
        .export(&mut handle, &FrameRequest::new(1.0, OutputFormat::Png))
        .expect_err("directory under a regular file must fail");
    assert_eq!(error.kind(), ErrorKind::Write);
}

#[test]
fn export_from_released_handle_fails() {
    let Some(mut handle) = open_sample() else {
        return;
    };
    handle.release().expect("release");
    let output = tempfile::tempdir().expect("Failed to create temp dir");

    let error = FrameExporter::new(output.path())
        .export(&mut handle, &FrameRequest::new(1.0, OutputFormat::Png))
        .expect_err("released handle cannot export");
    assert_eq!(error.kind(), ErrorKind::Released);
}
