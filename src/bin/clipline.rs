use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "clipline", version)]
struct Cli {
    /// Log at DEBUG level.
    #[arg(long, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the resolved group at a frame as JSON.
    Frame(FrameArgs),
    /// Print the authored text of the workarea syllable starting at a frame.
    Text(TextArgs),
    /// Print cut points as JSON.
    Jumps(JumpsArgs),
    /// Lay the workarea group out with monospace metrics and print the pen tree as JSON.
    Layout(LayoutArgs),
    /// Print one resolved group per frame, one JSON object per line.
    Dump(DumpArgs),
}

/// Query time, as a frame index or in seconds.
#[derive(Args, Debug)]
struct FrameAt {
    /// Frame index (0-based).
    #[arg(long, required_unless_present = "secs", conflicts_with = "secs")]
    frame: Option<u64>,

    /// Time in seconds; floored to a frame at the sequence fps.
    #[arg(long)]
    secs: Option<f64>,
}

impl FrameAt {
    fn resolve(&self, seq: &clipline::Sequence) -> clipline::FrameIndex {
        match (self.frame, self.secs) {
            (Some(frame), _) => clipline::FrameIndex(frame),
            (None, Some(secs)) => seq.frame_at_secs(secs),
            (None, None) => clipline::FrameIndex(0),
        }
    }
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Input sequence JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    #[command(flatten)]
    at: FrameAt,

    /// Track to query.
    #[arg(long, default_value_t = 0)]
    track: usize,

    /// Style track indices, comma-separated.
    #[arg(long, value_delimiter = ',')]
    styles: Vec<usize>,

    /// Keep a group selected until the next one starts.
    #[arg(long, default_value_t = false)]
    open_ended: bool,
}

#[derive(Parser, Debug)]
struct TextArgs {
    /// Input sequence JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    #[command(flatten)]
    at: FrameAt,
}

#[derive(Parser, Debug)]
struct JumpsArgs {
    /// Input sequence JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Print cut points in seconds instead of frames.
    #[arg(long, default_value_t = false)]
    secs: bool,
}

#[derive(Parser, Debug)]
struct LayoutArgs {
    /// Input sequence JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    #[command(flatten)]
    at: FrameAt,

    /// Layout rectangle width.
    #[arg(long, default_value_t = 1080.0)]
    width: f64,

    /// Layout rectangle height.
    #[arg(long, default_value_t = 1080.0)]
    height: f64,

    /// Font size in pixels.
    #[arg(long, default_value_t = 48.0)]
    size: f32,

    /// Style track indices, comma-separated.
    #[arg(long, value_delimiter = ',')]
    styles: Vec<usize>,

    /// Drop clips that have not started yet.
    #[arg(long, default_value_t = false)]
    remove_futures: bool,
}

#[derive(Parser, Debug)]
struct DumpArgs {
    /// Input sequence JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// First frame (inclusive).
    #[arg(long, default_value_t = 0)]
    start: u64,

    /// Last frame (exclusive); defaults to the sequence duration.
    #[arg(long)]
    end: Option<u64>,

    /// Track to query.
    #[arg(long, default_value_t = 0)]
    track: usize,

    /// Style track indices, comma-separated.
    #[arg(long, value_delimiter = ',')]
    styles: Vec<usize>,

    /// Resolve frames in parallel.
    #[arg(long, default_value_t = false)]
    parallel: bool,

    /// Override rayon worker threads (parallel mode only).
    #[arg(long)]
    threads: Option<usize>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    FmtSubscriber::builder()
        .with_max_level(if cli.verbose {
            Level::DEBUG
        } else {
            Level::WARN
        })
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    match cli.cmd {
        Command::Frame(args) => cmd_frame(args),
        Command::Text(args) => cmd_text(args),
        Command::Jumps(args) => cmd_jumps(args),
        Command::Layout(args) => cmd_layout(args),
        Command::Dump(args) => cmd_dump(args),
    }
}

fn load(path: &std::path::Path) -> anyhow::Result<clipline::Sequence> {
    clipline::Sequence::from_path(path)
        .with_context(|| format!("load sequence '{}'", path.display()))
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let seq = load(&args.in_path)?;
    let frame = args.at.resolve(&seq);
    let snapshot = if args.open_ended {
        match seq.track_clip_group_for_frame(args.track, frame, &args.styles, false)? {
            Some(group) => group.snapshot(),
            None => seq
                .track(args.track)?
                .empty_group()
                .position(frame, &[])
                .snapshot(),
        }
    } else {
        seq.clip_group(args.track, frame, &args.styles)?.snapshot()
    };
    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}

fn cmd_text(args: TextArgs) -> anyhow::Result<()> {
    let seq = load(&args.in_path)?;
    if let Some(text) = seq.text_for_frame(args.at.resolve(&seq)) {
        println!("{text}");
    }
    Ok(())
}

fn cmd_jumps(args: JumpsArgs) -> anyhow::Result<()> {
    let seq = load(&args.in_path)?;
    let jumps = seq.jumps();
    if args.secs {
        let secs: Vec<f64> = jumps.iter().map(|&f| seq.secs_at(f)).collect();
        println!("{}", serde_json::to_string(&secs)?);
    } else {
        println!("{}", serde_json::to_string(&jumps)?);
    }
    Ok(())
}

fn cmd_layout(args: LayoutArgs) -> anyhow::Result<()> {
    let seq = load(&args.in_path)?;
    let frame = clipline::FrameContext::new(
        args.at.resolve(&seq),
        clipline::Rect::new(0.0, 0.0, args.width, args.height),
    );
    let group = seq.clip_group(seq.workarea_track(), frame.index, &args.styles)?;
    let style = clipline::TextStyle::new("monospace", args.size);
    let mut pens = group
        .pens(
            &frame,
            &mut clipline::MonospaceStyler::default(),
            &clipline::PensOpts::default(),
            |_, _, _, text| Ok((text.to_string(), style.clone())),
        )
        .with_context(|| format!("lay out frame {}", frame.index.0))?;
    if args.remove_futures {
        pens.remove_futures(true);
    }
    println!("{}", serde_json::to_string_pretty(&pens)?);
    Ok(())
}

fn cmd_dump(args: DumpArgs) -> anyhow::Result<()> {
    let seq = load(&args.in_path)?;
    let range = clipline::FrameRange::new(
        clipline::FrameIndex(args.start),
        clipline::FrameIndex(args.end.unwrap_or(seq.duration())),
    )?;
    let threading = clipline::QueryThreading {
        parallel: args.parallel,
        threads: args.threads,
    };
    let snapshots = seq.frame_snapshots(args.track, range, &args.styles, &threading)?;
    for snapshot in &snapshots {
        println!("{}", serde_json::to_string(snapshot)?);
    }
    Ok(())
}
