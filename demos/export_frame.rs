//! Preview a few frames and export one frame from a video file.
//!
//! Usage:
//!   cargo run --example export_frame -- <input_file> [seconds] [png|jpg|bmp]

use std::error::Error;

use framegrab::{ExportOptions, FrameExporter, FrameRequest, OutputFormat, VideoHandle};

fn main() -> Result<(), Box<dyn Error>> {
    let mut args = std::env::args().skip(1);
    let input_path = args.next().unwrap_or_else(|| "input.mp4".to_string());
    let seconds: f64 = match args.next() {
        Some(value) => value.parse()?,
        None => 0.0,
    };
    let format: OutputFormat = match args.next() {
        Some(value) => value.parse()?,
        None => OutputFormat::Png,
    };

    println!("Opening {input_path}...");
    let mut handle = VideoHandle::open(&input_path)?;
    println!(
        "Video: {}x{}, {:.2} fps, {} frames",
        handle.dimensions().0,
        handle.dimensions().1,
        handle.frame_rate(),
        handle.frame_count(),
    );

    // Step through the first few frames the way a scrubber would.
    for index in 0..handle.frame_count().min(5) as i64 {
        let frame = handle.decode_at_frame_index(index)?;
        println!("Frame {index}: {}x{}", frame.width(), frame.height());
    }

    let exporter = FrameExporter::new("frames")
        .with_options(ExportOptions::new().with_jpeg_quality(90));
    let written = exporter.export(&mut handle, &FrameRequest::new(seconds, format))?;
    println!("Saved {}", written.display());

    handle.release()?;
    Ok(())
}
