use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use framesift::{
    ExtractOptions, Extraction, FfmpegLogLevel, Fetcher, FramesiftError, JpegWriter, Manifest,
    OfflineFetcher, ProgressCallback, ProgressInfo, RunSummary, SegmentRegistry, VideoFile,
    YtDlpFetcher, compute_download_ranges, extract_uniform, format_time,
};
use indicatif::{ProgressBar, ProgressStyle};

const DEFAULT_MANIFEST: &str = "config/segments.json";

const CLI_AFTER_HELP: &str = "Examples:\n  framesift extract --segments config/segments.json --out output --progress\n  framesift extract --offline --out output --json\n  framesift ranges --json\n  framesift download https://youtu.be/R1-PWEqsS8c --dir output\n  framesift frames output/video.mp4 --out output/frames --fps 2\n  framesift completions zsh > _framesift";

#[derive(Debug, Parser)]
#[command(
    name = "framesift",
    version,
    about = "Sample labeled still-image datasets from named time segments of a video",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOptions,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Parser, Clone, Default)]
struct GlobalOptions {
    /// Show debug logging output.
    #[arg(long, global = true)]
    verbose: bool,

    /// Show a progress bar while writing frames.
    #[arg(long, global = true)]
    progress: bool,

    /// FFmpeg log level (quiet, panic, fatal, error, warning, info, verbose, debug, trace).
    #[arg(long, global = true)]
    log_level: Option<FfmpegLogLevel>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Fetch the configured sections and write every group's frames.
    #[command(
        about = "Run a segment manifest",
        after_help = "Examples:\n  framesift extract\n  framesift extract --segments my.json --source https://youtu.be/ID --out dataset"
    )]
    Extract {
        /// Segment manifest (JSON).
        #[arg(long, default_value = DEFAULT_MANIFEST)]
        segments: PathBuf,
        /// Source URL; overrides the manifest's `source`.
        #[arg(long)]
        source: Option<String>,
        /// Output root for the video and the `frames/` tree.
        #[arg(long, default_value = "output")]
        out: PathBuf,
        /// File name of the local video inside the output root.
        #[arg(long, default_value = "video.mp4")]
        video_name: String,
        /// JPEG quality (1-100).
        #[arg(long, default_value_t = 95)]
        quality: u8,
        /// Never fetch; require the video to be present already.
        #[arg(long)]
        offline: bool,
        /// Path to the yt-dlp executable.
        #[arg(long, default_value = "yt-dlp")]
        yt_dlp: PathBuf,
        /// Print the run summary as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Print the time ranges a run would fetch.
    #[command(about = "Show download ranges")]
    Ranges {
        #[arg(long, default_value = DEFAULT_MANIFEST)]
        segments: PathBuf,
        #[arg(long)]
        json: bool,
    },

    /// List the groups and segments of a manifest.
    #[command(about = "List groups")]
    Groups {
        #[arg(long, default_value = DEFAULT_MANIFEST)]
        segments: PathBuf,
    },

    /// Download a whole video.
    #[command(about = "Download a full video")]
    Download {
        /// Video URL.
        url: String,
        /// Output directory.
        #[arg(short = 'd', long, default_value = "output")]
        dir: PathBuf,
        /// Output file name.
        #[arg(short, long, default_value = "video.mp4")]
        output: String,
        #[arg(long, default_value = "yt-dlp")]
        yt_dlp: PathBuf,
    },

    /// Split a local video into images at a fixed rate.
    #[command(
        about = "Sample a whole video uniformly",
        after_help = "Examples:\n  framesift frames video.mp4\n  framesift frames video.mp4 --out images --fps 0.5"
    )]
    Frames {
        /// Local video path.
        video: PathBuf,
        /// Output directory.
        #[arg(short, long, default_value = "output/frames")]
        out: PathBuf,
        /// Images per second of video.
        #[arg(short, long, default_value_t = 1.0)]
        fps: f64,
        /// File name prefix.
        #[arg(long, default_value = "frame")]
        prefix: String,
        #[arg(long, default_value_t = 95)]
        quality: u8,
    },

    /// Generate shell completion scripts.
    #[command(about = "Generate shell completions")]
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

struct BarProgress {
    bar: ProgressBar,
}

impl BarProgress {
    fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let bar = ProgressBar::new(0);
        let style =
            ProgressStyle::with_template("{spinner:.green} {bar:40.cyan/blue} {pos}/{len} {msg}")?;
        bar.set_style(style.progress_chars("##-"));
        Ok(Self { bar })
    }
}

impl ProgressCallback for BarProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        if let Some(total) = info.total {
            self.bar.set_length(total);
        }
        self.bar.set_position(info.current);
        self.bar.set_message(info.group_name.clone());
    }
}

fn init_logging(global: &GlobalOptions) {
    let default_filter = if global.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();

    if let Some(level) = global.log_level {
        framesift::set_ffmpeg_log_level(level);
    }
}

fn load_manifest(path: &Path) -> Result<(Manifest, SegmentRegistry), FramesiftError> {
    let manifest = Manifest::from_path(path)?;
    let registry = manifest.to_registry()?;
    Ok((manifest, registry))
}

fn print_summary(summary: &RunSummary) {
    println!();
    for group in &summary.groups {
        println!(
            "{} {} ({})",
            "group".cyan().bold(),
            group.name,
            group.description
        );
        println!("  output: {}", group.output_dir.display());
        for segment in &group.segments {
            let status = if segment.completed {
                format!("{} frame(s)", segment.frames_written)
            } else {
                "skipped".yellow().to_string()
            };
            println!(
                "  {} - {}: {status}",
                format_time(segment.start_seconds),
                format_time(segment.end_seconds),
            );
        }
        println!(
            "  total {}: {} frame(s){}",
            group.name,
            group.frames_written,
            if group.frames_skipped > 0 {
                format!(", {} skipped", group.frames_skipped)
                    .yellow()
                    .to_string()
            } else {
                String::new()
            }
        );
        if group.leftover_files {
            println!(
                "  {} stale files from an earlier run remain, starting at {}_{:04}.jpg",
                "warning:".yellow().bold(),
                group.name,
                group.frames_written
            );
        }
    }

    let total = summary.total_frames();
    let line = format!("{total} frame(s) written from {}", summary.video_path.display());
    if summary.is_success() {
        println!("{} {}", "success:".green().bold(), line.green());
    } else {
        println!("{} {}", "failure:".red().bold(), line.red());
    }
}

/// Returns `Ok(false)` when the command ran but produced no frames.
fn run(cli: Cli) -> Result<bool, Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Extract {
            segments,
            source,
            out,
            video_name,
            quality,
            offline,
            yt_dlp,
            json,
        } => {
            let (manifest, registry) = load_manifest(&segments)?;
            let locator = source.or(manifest.source);

            let fetcher: Box<dyn Fetcher> = if offline {
                Box::new(OfflineFetcher)
            } else {
                Box::new(YtDlpFetcher::new().with_program(yt_dlp))
            };

            let mut options = ExtractOptions::new()
                .with_output_root(out)
                .with_video_file_name(video_name)
                .with_jpeg_quality(quality);

            let progress = if cli.global.progress {
                let progress = Arc::new(BarProgress::new()?);
                options = options.with_progress(progress.clone());
                Some(progress)
            } else {
                None
            };

            let summary =
                Extraction::new(&registry, fetcher.as_ref(), options).run(locator.as_deref())?;

            if let Some(progress) = progress {
                progress.bar.finish_with_message("done");
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                print_summary(&summary);
            }
            Ok(summary.is_success())
        }
        Commands::Ranges { segments, json } => {
            let (_, registry) = load_manifest(&segments)?;
            let ranges = compute_download_ranges(&registry);

            if json {
                println!("{}", serde_json::to_string_pretty(&ranges)?);
            } else {
                for (index, range) in ranges.iter().enumerate() {
                    println!(
                        "{:>3}. {} - {}  {}",
                        index + 1,
                        format_time(range.start_seconds),
                        format_time(range.end_seconds),
                        range.to_section_spec().dimmed()
                    );
                }
                println!("{} range(s)", ranges.len());
            }
            Ok(true)
        }
        Commands::Groups { segments } => {
            let (_, registry) = load_manifest(&segments)?;
            for group in registry.all_groups() {
                println!(
                    "{} {} ({} segment(s))",
                    group.name().cyan().bold(),
                    group.description(),
                    group.segments().len()
                );
                for segment in group.segments() {
                    println!(
                        "  {} - {} @ {} Hz",
                        format_time(segment.start_seconds()),
                        format_time(segment.end_seconds()),
                        segment.sample_rate_hz()
                    );
                }
            }
            Ok(true)
        }
        Commands::Download {
            url,
            dir,
            output,
            yt_dlp,
        } => {
            fs::create_dir_all(&dir)?;
            let destination = dir.join(output);
            YtDlpFetcher::new()
                .with_program(yt_dlp)
                .fetch(&url, &[], &destination)?;
            println!("{} {}", "saved".green().bold(), destination.display());
            Ok(true)
        }
        Commands::Frames {
            video,
            out,
            fps,
            prefix,
            quality,
        } => {
            let mut source = VideoFile::open(&video)?;
            let summary =
                extract_uniform(&mut source, fps, &out, &prefix, &JpegWriter::new(quality))?;
            source.close();

            let line = format!(
                "Extracted {} image(s) to {}",
                summary.frames_written,
                out.display()
            );
            println!("{} {}", "success:".green().bold(), line.green());
            Ok(summary.frames_written > 0)
        }
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(shell, &mut command, "framesift", &mut std::io::stdout());
            Ok(true)
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(&cli.global);

    match run(cli) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(error) => {
            match error.downcast_ref::<FramesiftError>() {
                Some(fatal) => eprintln!(
                    "{} [{}]: {fatal}",
                    "error".red().bold(),
                    fatal.stage()
                ),
                None => eprintln!("{} {error}", "error:".red().bold()),
            }
            std::process::exit(1);
        }
    }
}
