use clap::Parser;
use fewbody::prelude::*;
use reel::gif_sink::{GifSink, SinkConfig};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Integrates a few-body system and renders it to an animated GIF
#[derive(Parser, Debug, Default, Clone)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// YAML run configuration
    #[arg(long, short, conflicts_with = "preset")]
    config: Option<PathBuf>,

    /// Built-in scenario: binary, triple-barycentric, triple-panel or kozai-lidov
    #[arg(long, short)]
    preset: Option<String>,

    /// Write the animation here instead of the configured path
    #[arg(long, short)]
    out: Option<PathBuf>,

    /// Override the configured frame rate
    #[arg(long)]
    fps: Option<u32>,

    /// Export the sampled history as CSV
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Render at most this many frames
    #[arg(long)]
    max_frames: Option<usize>,

    /// Print the resolved configuration and exit
    #[arg(long)]
    dump_config: bool,

    /// Log every frame
    #[arg(long, short)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn load(args: &Args) -> Result<RunConfig, Box<dyn std::error::Error>> {
    let mut config = match (&args.config, &args.preset) {
        (Some(path), _) => load_config_from_file(path)?,
        (None, Some(name)) => name.parse::<Preset>()?.config(),
        (None, None) => Preset::KozaiLidov.config(),
    };

    if let Some(out) = &args.out {
        config.output.path = out.clone();
    }
    if let Some(fps) = args.fps {
        config.output.fps = fps;
    }

    config.validate()?;
    Ok(config)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    init_logging(args.verbose);

    let config = load(&args)?;

    if args.dump_config {
        print!("{}", config.to_yaml()?);
        return Ok(());
    }

    let PreparedRun {
        mut driver,
        mut timeline,
        sampler,
    } = config.prepare()?;

    if let Some(n) = args.max_frames {
        timeline.truncate(n);
    }

    info!(
        bodies = config.bodies.len(),
        frames = timeline.len(),
        scheme = %config.integrator.scheme,
        out = %config.output.path.display(),
        "rendering"
    );

    let mut sink = GifSink::new(SinkConfig::from_run(&config, &timeline));

    let summary = AnimationDriver::new().run(&timeline, &mut driver, &sampler, &mut sink)?;

    if let Some(csv) = &args.csv {
        write_history_csv(csv, &summary.history)?;
        info!(path = %csv.display(), "wrote history");
    }

    println!(
        "{} frames to t = {:0.3} -> {}",
        summary.frames,
        summary.final_time,
        config.output.path.display()
    );

    Ok(())
}
