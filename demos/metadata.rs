//! Display the frame-addressing metadata of a video file.
//!
//! Usage:
//!   cargo run --example metadata -- <input_file>

use std::error::Error;

use framegrab::VideoHandle;

fn main() -> Result<(), Box<dyn Error>> {
    let input_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "input.mp4".to_string());

    println!("Opening {input_path}...");
    let handle = VideoHandle::open(&input_path)?;
    let metadata = handle.metadata();

    println!();
    println!("=== Video Metadata ===");
    println!("Format:      {}", metadata.format);
    println!("Codec:       {}", metadata.codec);
    println!("Resolution:  {}x{}", metadata.width, metadata.height);
    println!("Frame rate:  {:.3} fps", metadata.frames_per_second);
    println!("Frame count: {}", metadata.frame_count);
    println!("Duration:    {:.2}s", metadata.duration_seconds());

    let last_frame = metadata.frame_count.saturating_sub(1);
    println!();
    println!("Last frame {last_frame} is shown at {:.3}s", metadata.time_of_frame(last_frame));

    Ok(())
}
