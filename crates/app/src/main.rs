mod decode;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use waveform_bars_core::{AppConfig, BarLayout, Precomputer, WaveformEngine};

fn main() -> waveform_bars_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Precompute {
            input,
            output,
            config,
            fps,
        } => run_precompute(&input, &output, config.as_deref(), fps),
        Commands::Inspect {
            input,
            seconds,
            config,
        } => run_inspect(&input, seconds, config.as_deref()),
    }
}

fn run_precompute(
    input: &Path,
    output: &Path,
    config: Option<&Path>,
    fps: Option<u32>,
) -> waveform_bars_core::Result<()> {
    let config = load_config(config)?;
    let fps = fps.unwrap_or(config.fps);
    tracing::info!(?input, ?output, fps, "running precompute pipeline");

    let buffer = decode::load_wav(input)?;
    let engine = WaveformEngine::new(buffer, config.render);
    let sequence = Precomputer::new(engine, fps).render_all();
    sequence.save(output)?;

    tracing::info!(frames = sequence.len(), bars = sequence.bar_count, "wrote frame cache");
    Ok(())
}

fn run_inspect(
    input: &Path,
    seconds: f64,
    config: Option<&Path>,
) -> waveform_bars_core::Result<()> {
    let config = load_config(config)?;
    let buffer = decode::load_wav(input)?;
    let layout = BarLayout::new(config.layout, config.render.center_peak_strength);
    let engine = WaveformEngine::new(buffer, config.render);

    let amplitudes = engine.frame_at(seconds);
    let bars = layout.bars(&amplitudes);
    tracing::info!(seconds, scale = engine.scale().value(), "inspecting frame");

    println!("bar  amplitude  height_px");
    for (i, (amplitude, bar)) in amplitudes.iter().zip(&bars).enumerate() {
        println!("{i:>3}  {amplitude:>9.4}  {:>9.2}", bar.height);
    }
    Ok(())
}

fn load_config(path: Option<&Path>) -> waveform_bars_core::Result<AppConfig> {
    match path {
        Some(path) => {
            tracing::info!(?path, "loading configuration");
            AppConfig::load(path)
        }
        None => Ok(AppConfig::default()),
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Animated audio waveform bars", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render bar amplitudes for every frame of a WAV file.
    Precompute {
        /// WAV file to analyse.
        input: PathBuf,
        /// Output path for the JSON frame cache.
        output: PathBuf,
        /// JSON configuration file.
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Frames per second; overrides the configuration.
        #[arg(long)]
        fps: Option<u32>,
    },
    /// Print the bars of a single frame.
    Inspect {
        /// WAV file to analyse.
        input: PathBuf,
        /// Playback position in seconds.
        #[arg(short, long, default_value_t = 0.0)]
        seconds: f64,
        /// JSON configuration file.
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}
