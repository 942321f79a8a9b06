//! emgscope - terminal scope for the synthetic EMG pipeline
//!
//! Run with: cargo run -- --preset emg-envelope

mod acquisition;
mod app;
mod ui;

use clap::{Parser, ValueEnum};
use color_eyre::eyre::{Result as EyreResult, WrapErr};
use emg_dsp::pipeline::{Preset, ProcessingPipeline, SimulationConfig};

use app::Scope;

#[derive(Parser)]
#[command(
    name = "emgscope",
    version,
    about = "Synthetic EMG through a biquad filter chain, drawn as three scrolling traces"
)]
struct Cli {
    /// Filter chain and signal settings to run
    #[arg(long, value_enum, default_value_t = PresetArg::EmgEnvelope)]
    preset: PresetArg,

    /// Seed for a reproducible signal (OS entropy when omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Samples kept per trace
    #[arg(long)]
    capacity: Option<usize>,

    /// Samples generated per acquisition step
    #[arg(long, default_value_t = 32)]
    block: usize,

    /// Print a summary for this many samples instead of opening the scope
    #[arg(long)]
    headless: Option<u64>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, ValueEnum)]
enum PresetArg {
    EmgEnvelope,
    EmgNotchEnvelope,
    BandpassNotch,
}

impl From<PresetArg> for Preset {
    fn from(arg: PresetArg) -> Self {
        match arg {
            PresetArg::EmgEnvelope => Preset::EmgEnvelope,
            PresetArg::EmgNotchEnvelope => Preset::EmgNotchEnvelope,
            PresetArg::BandpassNotch => Preset::BandpassNotch,
        }
    }
}

fn main() -> EyreResult<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(log_level)
        .format_timestamp(None)
        .init();

    let preset = Preset::from(cli.preset);
    let mut config: SimulationConfig = preset.config();
    if let Some(capacity) = cli.capacity {
        config.buffer_capacity = capacity;
    }

    let pipeline = match cli.seed {
        Some(seed) => ProcessingPipeline::seeded(&config, seed),
        None => ProcessingPipeline::new(&config),
    }
    .wrap_err_with(|| format!("failed to build the {} pipeline", preset))?;
    log::info!("running preset {} ({} stages)", preset, pipeline.stage_count());

    let scope = Scope::new(preset, config, pipeline).block(cli.block);
    match cli.headless {
        Some(samples) => scope.run_headless(samples),
        None => scope.run(),
    }
}
