use std::{
    error::Error,
    fs,
    path::{Path, PathBuf},
};

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use framegrab::{
    ExportOptions, ExportResult, FfmpegLogLevel, FrameExporter, FrameRequest, OutputFormat,
    VideoHandle, config::DEFAULT_JPEG_QUALITY,
};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;

const CLI_AFTER_HELP: &str = "Examples:\n  framegrab info clip.mp4 --json\n  framegrab preview clip.mp4 --frame 120 --out preview.png\n  framegrab export clip.mp4 other.mov --at 1:30 --format jpg --out frames --progress\n  framegrab completions zsh > _framegrab";

#[derive(Debug, Parser)]
#[command(
    name = "framegrab",
    version,
    about = "Scrub videos and export single frames as PNG, JPG or BMP images",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOptions,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Parser, Clone)]
struct GlobalOptions {
    /// Show debug logging from framegrab.
    #[arg(long)]
    verbose: bool,

    /// FFmpeg console log level (quiet, fatal, error, warning, info, debug).
    #[arg(long, default_value = "error")]
    ffmpeg_log_level: FfmpegLogLevel,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print frame rate, frame count, duration and dimensions.
    #[command(
        about = "Print video metadata",
        visible_alias = "probe",
        after_help = "Examples:\n  framegrab info clip.mp4\n  framegrab info a.mp4 b.mkv --json"
    )]
    Info {
        /// Input video paths.
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output metadata as machine-readable JSON.
        #[arg(long)]
        json: bool,
    },

    /// Decode one frame and save it for inspection.
    #[command(
        about = "Save the frame at an index or time",
        after_help = "Examples:\n  framegrab preview clip.mp4 --frame 0 --out first.png\n  framegrab preview clip.mp4 --at 0:05.5 --out mid.png"
    )]
    Preview {
        /// Input video path.
        input: PathBuf,
        /// Zero-based frame index.
        #[arg(long, allow_negative_numbers = true, conflicts_with = "at")]
        frame: Option<i64>,
        /// Time as seconds (`75.5`) or a timecode (`1:15.5`, `0:01:15.5`).
        #[arg(long, required_unless_present = "frame")]
        at: Option<String>,
        /// Output image path; the format follows the extension.
        #[arg(long)]
        out: PathBuf,
    },

    /// Export the frame at one time from each input video.
    #[command(
        about = "Export frames from one or more videos",
        after_help = "Examples:\n  framegrab export clip.mp4 --at 5\n  framegrab export a.mp4 b.mp4 --at 1:30 --format bmp --out frames"
    )]
    Export {
        /// Input video paths. Each one is processed even if an earlier one fails.
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
        /// Time as seconds (`75.5`) or a timecode (`1:15.5`, `0:01:15.5`).
        #[arg(long)]
        at: String,
        /// Output directory. Defaults to the directory of the first input.
        #[arg(long)]
        out: Option<PathBuf>,
        /// Image format: png | jpg | bmp.
        #[arg(long, default_value = "png")]
        format: OutputFormat,
        /// JPEG quality (1-100).
        #[arg(long, default_value_t = DEFAULT_JPEG_QUALITY)]
        jpeg_quality: u8,
        /// Fail instead of replacing existing images.
        #[arg(long)]
        no_overwrite: bool,
        /// Show a progress bar over the input files.
        #[arg(long)]
        progress: bool,
    },

    /// Generate shell completion scripts.
    #[command(about = "Generate shell completions")]
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Parse `75`, `75.5`, `01:15` or `00:01:15.5` into seconds.
fn parse_timecode(value: &str) -> Result<f64, Box<dyn Error>> {
    let text = value.trim();
    if text.is_empty() {
        return Err("time cannot be empty".into());
    }

    // Rightmost field is seconds, then minutes, then hours.
    let mut fields = text.rsplit(':');
    let mut seconds = fields.next().unwrap_or_default().parse::<f64>()?;
    for (position, field) in fields.enumerate() {
        let multiplier = match position {
            0 => 60.0,
            1 => 3_600.0,
            _ => return Err(format!("too many `:` separators in `{text}`").into()),
        };
        seconds += field.parse::<u64>()? as f64 * multiplier;
    }

    if !seconds.is_finite() || seconds < 0.0 {
        return Err(format!("time must be a non-negative number of seconds: {text}").into());
    }
    Ok(seconds)
}

/// Render a duration as `{minutes}m {seconds}s`.
fn format_duration_label(seconds: f64) -> String {
    let whole = seconds.max(0.0) as u64;
    format!("{}m {}s", whole / 60, whole % 60)
}

/// Directory the first input lives in, or the working directory.
fn default_output_directory(first_input: &Path) -> PathBuf {
    first_input
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

fn init_logging(global: &GlobalOptions) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if global.verbose {
        builder.filter_module("framegrab", log::LevelFilter::Debug);
    }
    builder.format_timestamp(None).init();
}

fn export_one(exporter: &FrameExporter, input: &Path, request: &FrameRequest) -> ExportResult {
    let mut handle = VideoHandle::open(input)?;
    exporter.export(&mut handle, request)
}

fn run() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logging(&cli.global);
    framegrab::set_ffmpeg_log_level(cli.global.ffmpeg_log_level);

    match cli.command {
        Commands::Info { inputs, json } => {
            let mut entries = Vec::with_capacity(inputs.len());
            for input in &inputs {
                let handle = VideoHandle::open(input)?;
                let metadata = handle.metadata();
                if json {
                    entries.push(json!({
                        "path": input.display().to_string(),
                        "format": metadata.format,
                        "codec": metadata.codec,
                        "width": metadata.width,
                        "height": metadata.height,
                        "fps": metadata.frames_per_second,
                        "frame_count": metadata.frame_count,
                        "duration_seconds": metadata.duration_seconds(),
                    }));
                } else {
                    println!("{}", input.display().to_string().bold());
                    println!("  Format: {}", metadata.format);
                    println!(
                        "  Video: {}x{} @ {:.2} fps [{}]",
                        metadata.width, metadata.height, metadata.frames_per_second, metadata.codec,
                    );
                    println!("  Frames: {}", metadata.frame_count);
                    println!(
                        "  Duration: {} ({:.2}s)",
                        format_duration_label(metadata.duration_seconds()),
                        metadata.duration_seconds(),
                    );
                }
            }
            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            }
        }
        Commands::Preview {
            input,
            frame,
            at,
            out,
        } => {
            let mut handle = VideoHandle::open(&input)?;
            let (image, frame_index) = match (frame, at) {
                (Some(frame_index), _) => {
                    let image = handle.decode_at_frame_index(frame_index)?;
                    (image, frame_index as u64)
                }
                (None, Some(at)) => {
                    let seconds = parse_timecode(&at)?;
                    let image = handle.decode_at_time(seconds)?;
                    (image, handle.metadata().frame_at_time(seconds))
                }
                (None, None) => return Err("provide --frame or --at".into()),
            };

            if let Some(parent) = out.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)?;
                }
            }
            image.save(&out)?;
            handle.release()?;

            println!(
                "{} frame {} ({:.2}s) -> {}",
                "saved".green().bold(),
                frame_index,
                handle.metadata().time_of_frame(frame_index),
                out.display()
            );
        }
        Commands::Export {
            inputs,
            at,
            out,
            format,
            jpeg_quality,
            no_overwrite,
            progress,
        } => {
            let seconds = parse_timecode(&at)?;
            let request = FrameRequest::new(seconds, format);
            let output_directory = match out {
                Some(directory) => directory,
                None => default_output_directory(&inputs[0]),
            };
            let options = ExportOptions::new()
                .with_jpeg_quality(jpeg_quality)
                .with_overwrite(!no_overwrite);
            let exporter = FrameExporter::new(&output_directory).with_options(options);

            let progress_bar = if progress {
                let pb = ProgressBar::new(inputs.len() as u64);
                let style = ProgressStyle::with_template(
                    "{spinner:.green} {bar:40.cyan/blue} {pos}/{len} {msg}",
                )?;
                pb.set_style(style.progress_chars("##-"));
                Some(pb)
            } else {
                None
            };
            let report = |line: String| match &progress_bar {
                Some(pb) => pb.println(line),
                None => println!("{line}"),
            };

            let mut failures = 0_usize;
            for input in &inputs {
                match export_one(&exporter, input, &request) {
                    Ok(path) => report(format!(
                        "{} {}: extracted 1/1 frame(s) -> {}",
                        "ok".green().bold(),
                        input.display(),
                        path.display()
                    )),
                    Err(error) => {
                        failures += 1;
                        report(format!(
                            "{} {}: extracted 0/1 frame(s): {}",
                            "failed".red().bold(),
                            input.display(),
                            error.to_string().yellow()
                        ));
                    }
                }

                if let Some(pb) = &progress_bar {
                    pb.inc(1);
                }
            }

            if let Some(pb) = progress_bar {
                pb.finish_with_message("done");
            }

            println!(
                "{} {}",
                "finished:".green().bold(),
                format!(
                    "all files processed ({} succeeded, {failures} failed) in {}",
                    inputs.len() - failures,
                    output_directory.display()
                )
                .green()
            );

            if failures > 0 {
                return Err(format!("{failures} of {} export(s) failed", inputs.len()).into());
            }
        }
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(shell, &mut command, "framegrab", &mut std::io::stdout());
        }
    }

    Ok(())
}

fn main() {
    if let Err(error) = run() {
        eprintln!("{} {error}", "error:".red().bold());
        std::process::exit(1);
    }
}
