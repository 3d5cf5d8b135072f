use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "reelcast", version)]
struct Cli {
    /// Log filter used when `RUST_LOG` is unset.
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render one timeline to MP4 (requires `ffmpeg` and `ffprobe` on PATH).
    Render(RenderArgs),
    /// Print the composed layer plan as JSON without encoding.
    Plan(PlanArgs),
    /// Render many timelines on a worker pool.
    Batch(BatchArgs),
}

#[derive(Args, Debug)]
struct CompositionArgs {
    /// Directory relative asset paths resolve against. Defaults to the timeline's directory.
    #[arg(long)]
    assets_root: Option<PathBuf>,

    /// Fail on the first unusable asset instead of skipping the clip.
    #[arg(long)]
    strict: bool,

    /// Fade the mixed audio in and out.
    #[arg(long)]
    audio_fade: bool,
}

impl CompositionArgs {
    fn render_opts(&self, timeline_path: Option<&Path>) -> reelcast::RenderOpts {
        let assets_root = self
            .assets_root
            .clone()
            .or_else(|| timeline_path.and_then(Path::parent).map(Path::to_path_buf))
            .unwrap_or_else(|| PathBuf::from("."));
        reelcast::RenderOpts {
            strict_assets: self.strict,
            audio_fade: self.audio_fade,
            assets_root,
            ..reelcast::RenderOpts::default()
        }
    }
}

#[derive(Args, Debug)]
struct EncoderArgs {
    /// ffmpeg executable.
    #[arg(long, default_value = "ffmpeg")]
    ffmpeg: String,

    /// Kill the encoder after this many seconds.
    #[arg(long)]
    encode_timeout_secs: Option<u64>,
}

impl EncoderArgs {
    fn settings(&self) -> reelcast::EncodeSettings {
        reelcast::EncodeSettings {
            ffmpeg_bin: self.ffmpeg.clone(),
            timeout: self.encode_timeout_secs.map(Duration::from_secs),
            ..reelcast::EncodeSettings::default()
        }
    }
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Input timeline JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output MP4 path.
    #[arg(long)]
    out: PathBuf,

    #[command(flatten)]
    composition: CompositionArgs,

    #[command(flatten)]
    encoder: EncoderArgs,
}

#[derive(Parser, Debug)]
struct PlanArgs {
    /// Input timeline JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    #[command(flatten)]
    composition: CompositionArgs,
}

#[derive(Parser, Debug)]
struct BatchArgs {
    /// Directory receiving one `<timeline stem>.mp4` per input.
    #[arg(long)]
    out_dir: PathBuf,

    /// Worker count (defaults to available parallelism).
    #[arg(long)]
    workers: Option<usize>,

    /// Fail a job that runs longer than this many seconds.
    #[arg(long)]
    timeout_secs: Option<u64>,

    #[command(flatten)]
    composition: CompositionArgs,

    #[command(flatten)]
    encoder: EncoderArgs,

    /// Timeline JSON files.
    #[arg(required = true)]
    files: Vec<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    reelcast::init_logging(&reelcast::LoggingConfig {
        level: cli.log_level.clone(),
        json: cli.log_json,
    });
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Plan(args) => cmd_plan(args),
        Command::Batch(args) => cmd_batch(args),
    }
}

fn read_timeline(path: &Path) -> anyhow::Result<reelcast::Timeline> {
    let f = File::open(path).with_context(|| format!("open timeline '{}'", path.display()))?;
    let timeline = reelcast::Timeline::from_reader(BufReader::new(f))
        .with_context(|| format!("load timeline '{}'", path.display()))?;
    Ok(timeline)
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let timeline = read_timeline(&args.in_path)?;
    let pipeline = reelcast::RenderPipeline::with_ffmpeg(
        args.composition.render_opts(Some(&args.in_path)),
        args.encoder.settings(),
    );
    let report = pipeline.render(&timeline, &args.out)?;
    for skip in &report.skipped {
        eprintln!("skipped {}: {} ({})", skip.origin, skip.source, skip.reason);
    }
    println!(
        "wrote {} ({:.2}s, {} video / {} audio layers)",
        report.output.display(),
        report.duration,
        report.video_layers,
        report.audio_layers
    );
    Ok(())
}

fn cmd_plan(args: PlanArgs) -> anyhow::Result<()> {
    let timeline = read_timeline(&args.in_path)?;
    let opts = args.composition.render_opts(Some(&args.in_path));
    let composition = reelcast::compose(
        &timeline,
        &reelcast::MediaProbe::default(),
        &reelcast::EffectRegistry::standard(),
        &opts,
    )?;
    println!("{}", serde_json::to_string_pretty(&composition)?);
    Ok(())
}

fn cmd_batch(args: BatchArgs) -> anyhow::Result<()> {
    let pipeline = reelcast::RenderPipeline::with_ffmpeg(
        args.composition.render_opts(None),
        args.encoder.settings(),
    );
    let dispatcher = reelcast::Dispatcher::start(
        reelcast::DispatcherOpts {
            workers: args.workers,
            job_timeout: args.timeout_secs.map(Duration::from_secs),
            output_dir: args.out_dir.clone(),
        },
        Arc::new(pipeline),
    )?;

    let mut submitted = Vec::with_capacity(args.files.len());
    for path in &args.files {
        let doc = std::fs::read_to_string(path)
            .with_context(|| format!("read timeline '{}'", path.display()))?;
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "timeline".to_string());
        let out = args.out_dir.join(format!("{stem}.mp4"));
        let id = dispatcher.submit(reelcast::JobInput::Document(doc), Some(out))?;
        submitted.push((id, path.clone()));
    }

    dispatcher.wait_idle();
    let finished = dispatcher.take_finished();
    dispatcher.shutdown();

    let mut failed = 0usize;
    for (id, status) in &finished {
        let input = submitted
            .iter()
            .find(|(sid, _)| sid == id)
            .map(|(_, p)| p.display().to_string())
            .unwrap_or_default();
        match &status.error {
            Some(err) => {
                failed += 1;
                println!("{} {input}: {} ({err})", id.short(), status.state);
            }
            None => println!(
                "{} {input}: {} -> {}",
                id.short(),
                status.state,
                status.output.display()
            ),
        }
    }

    if failed > 0 {
        anyhow::bail!("{failed} of {} jobs failed", finished.len());
    }
    Ok(())
}
