use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use framewise::{FrameIndex, FrameRange, Registry, RenderThreading};

#[derive(Parser, Debug)]
#[command(name = "framewise", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List registered compositions.
    List(ListArgs),
    /// Evaluate a single frame and print its output tree as JSON.
    Frame(FrameArgs),
    /// Print the audio layers active at a frame.
    Audio(FrameArgs),
    /// Evaluate a frame range and print one fingerprint per frame.
    Render(RenderArgs),
}

#[derive(Parser, Debug)]
struct ListArgs {
    /// Input registry JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Input registry JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Composition id.
    #[arg(long)]
    comp: String,

    /// Frame index (0-based).
    #[arg(long)]
    frame: u64,

    /// Print the painter-ordered leaf list instead of the tree.
    #[arg(long, default_value_t = false)]
    flatten: bool,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input registry JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Composition id.
    #[arg(long)]
    comp: String,

    /// First frame (inclusive).
    #[arg(long, default_value_t = 0)]
    start: u64,

    /// Last frame (exclusive); defaults to the composition duration.
    #[arg(long)]
    end: Option<u64>,

    /// Enable frame-level parallelism.
    #[arg(long, default_value_t = false)]
    parallel: bool,

    /// Override rayon worker threads (parallel mode only).
    #[arg(long)]
    threads: Option<usize>,

    /// Render chunk size (parallel mode only).
    #[arg(long, default_value_t = 64)]
    chunk_size: usize,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::List(args) => cmd_list(args),
        Command::Frame(args) => cmd_frame(args),
        Command::Audio(args) => cmd_audio(args),
        Command::Render(args) => cmd_render(args),
    }
}

fn load(path: &std::path::Path) -> anyhow::Result<Registry> {
    Registry::from_path(path).with_context(|| format!("load registry '{}'", path.display()))
}

fn print_json(value: &impl serde::Serialize) -> anyhow::Result<()> {
    let s = serde_json::to_string_pretty(value).context("encode json output")?;
    println!("{s}");
    Ok(())
}

#[derive(serde::Serialize)]
struct CompSummary<'a> {
    id: &'a str,
    duration_in_frames: u64,
    fps: framewise::Fps,
    canvas: framewise::Canvas,
    audio_tracks: usize,
}

fn cmd_list(args: ListArgs) -> anyhow::Result<()> {
    let reg = load(&args.in_path)?;
    let comps = reg
        .ids()
        .map(|id| reg.get(id))
        .collect::<Result<Vec<_>, _>>()?;
    let summaries: Vec<CompSummary<'_>> = comps
        .iter()
        .map(|c| CompSummary {
            id: &c.id,
            duration_in_frames: c.duration_in_frames,
            fps: c.fps,
            canvas: c.canvas,
            audio_tracks: c.audio.len(),
        })
        .collect();
    print_json(&summaries)
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let reg = load(&args.in_path)?;
    let out = reg.render_frame(&args.comp, FrameIndex(args.frame))?;
    if args.flatten {
        print_json(&out.flatten())
    } else {
        print_json(&out)
    }
}

fn cmd_audio(args: FrameArgs) -> anyhow::Result<()> {
    let reg = load(&args.in_path)?;
    let active = reg.active_audio_at(&args.comp, FrameIndex(args.frame))?;
    print_json(&active)
}

#[derive(serde::Serialize)]
struct FrameDigest {
    frame: u64,
    fingerprint: String,
    leaves: usize,
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let reg = load(&args.in_path)?;
    let comp = reg.get(&args.comp)?;
    let end = args.end.unwrap_or(comp.duration_in_frames);
    let range = FrameRange::new(FrameIndex(args.start), FrameIndex(end))?;
    let threading = RenderThreading {
        parallel: args.parallel,
        chunk_size: args.chunk_size,
        threads: args.threads,
    };

    let frames = framewise::render_frames(&comp, range, &threading)?;
    let digests = frames
        .iter()
        .map(|out| -> framewise::FramewiseResult<FrameDigest> {
            Ok(FrameDigest {
                frame: out.frame.0,
                fingerprint: format!("{:016x}", out.fingerprint()?),
                leaves: out.flatten().len(),
            })
        })
        .collect::<framewise::FramewiseResult<Vec<_>>>()?;
    print_json(&digests)?;

    eprintln!("rendered {} frames of '{}'", digests.len(), comp.id);
    Ok(())
}
