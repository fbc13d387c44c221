//! Benchmarks for opening, scrubbing, and exporting.
//!
//! Run with: cargo bench
//!
//! Requires fixture files from `tests/fixtures/generate_fixtures.sh`.

use std::{path::Path, time::Duration};

use criterion::Criterion;
use framegrab::{
    FfmpegLogLevel, FrameExporter, FrameRequest, OutputFormat, VideoHandle, set_ffmpeg_log_level,
};

const SAMPLE_VIDEO: &str = "tests/fixtures/sample_video.mp4";

fn fixture_present() -> bool {
    if Path::new(SAMPLE_VIDEO).exists() {
        true
    } else {
        eprintln!("Skipping benchmark: fixture not found");
        false
    }
}

fn benchmark_open(criterion: &mut Criterion) {
    set_ffmpeg_log_level(FfmpegLogLevel::Error);

    if !fixture_present() {
        return;
    }

    criterion.bench_function("open video", |bencher| {
        bencher.iter(|| {
            let _handle = VideoHandle::open(SAMPLE_VIDEO).unwrap();
        });
    });
}

fn benchmark_random_access(criterion: &mut Criterion) {
    if !fixture_present() {
        return;
    }

    criterion.bench_function("decode first frame", |bencher| {
        let mut handle = VideoHandle::open(SAMPLE_VIDEO).unwrap();
        bencher.iter(|| {
            let _frame = handle.decode_at_frame_index(0).unwrap();
        });
    });

    criterion.bench_function("decode mid-video (seek)", |bencher| {
        let mut handle = VideoHandle::open(SAMPLE_VIDEO).unwrap();
        bencher.iter(|| {
            let _frame = handle.decode_at_frame_index(165).unwrap();
        });
    });

    criterion.bench_function("decode at time 7.5s", |bencher| {
        let mut handle = VideoHandle::open(SAMPLE_VIDEO).unwrap();
        bencher.iter(|| {
            let _frame = handle.decode_at_time(7.5).unwrap();
        });
    });
}

fn benchmark_scrubbing(criterion: &mut Criterion) {
    if !fixture_present() {
        return;
    }

    let mut group = criterion.benchmark_group("scrubbing");
    group.measurement_time(Duration::from_secs(10));

    group.bench_function("step forward 30 frames", |bencher| {
        let mut handle = VideoHandle::open(SAMPLE_VIDEO).unwrap();
        bencher.iter(|| {
            for index in 60..90 {
                let _frame = handle.decode_at_frame_index(index).unwrap();
            }
        });
    });

    group.bench_function("jump across 30 frames", |bencher| {
        let mut handle = VideoHandle::open(SAMPLE_VIDEO).unwrap();
        bencher.iter(|| {
            for step in 0..30 {
                let _frame = handle.decode_at_frame_index((step * 97) % 300).unwrap();
            }
        });
    });

    group.finish();
}

fn benchmark_export(criterion: &mut Criterion) {
    if !fixture_present() {
        return;
    }

    let output = tempfile::tempdir().unwrap();
    let exporter = FrameExporter::new(output.path());
    let mut group = criterion.benchmark_group("export");

    for format in OutputFormat::ALL {
        group.bench_function(format.extension(), |bencher| {
            let mut handle = VideoHandle::open(SAMPLE_VIDEO).unwrap();
            let request = FrameRequest::new(5.0, format);
            bencher.iter(|| {
                let _path = exporter.export(&mut handle, &request).unwrap();
            });
        });
    }

    group.finish();
}

criterion::criterion_group!(
    benches,
    benchmark_open,
    benchmark_random_access,
    benchmark_scrubbing,
    benchmark_export,
);
criterion::criterion_main!(benches);
