//! Seminar CLI: renders the convolution, antialiasing and sampling demonstrations.
//!
//! This is the main entry point for the `seminar` tool.

mod config;
mod orchestrator;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use config::SeminarConfig;
use lib_anim::display::{self, DisplayMode};
use lib_types::units::{Hertz, Seconds};
use orchestrator::{Demo, Orchestrator};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "seminar")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Output format (overrides the config file)
    #[arg(short, long, global = true)]
    format: Option<OutputFormat>,

    /// Output directory for results
    #[arg(short, long, default_value = "output", global = true)]
    output: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
enum OutputFormat {
    /// Self-contained HTML player
    Html,
    /// One SVG file per frame
    Svg,
    /// Figure snapshots as JSON
    Json,
}

impl From<OutputFormat> for DisplayMode {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Html => DisplayMode::JsHtml,
            OutputFormat::Svg => DisplayMode::Svg,
            OutputFormat::Json => DisplayMode::Json,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Animate linear vs. circular convolution
    Convolution {
        /// Input pulse length
        #[arg(long, default_value = "10")]
        nx: usize,

        /// Kernel length
        #[arg(long, default_value = "10")]
        nh: usize,

        /// Circular buffer length N
        #[arg(long, default_value = "10")]
        buffer: usize,
    },

    /// Animate temporal aliasing of a rotating fan
    Antialiasing {
        /// Fan rotation rate (Hz)
        #[arg(long, default_value = "2.2")]
        f_sig: f64,

        /// Camera frame rate (FPS)
        #[arg(long, default_value = "2.0")]
        f_sample: f64,

        /// Animation length (s)
        #[arg(long, default_value = "10.0")]
        duration: f64,

        /// Animation frame rate
        #[arg(long, default_value = "60")]
        fps: f64,
    },

    /// Plot sinc reconstruction of a sampled pulse
    Sampling {
        /// Signal carrier frequency (Hz)
        #[arg(long, default_value = "3.0")]
        f_sig: f64,

        /// Sample rate (Hz)
        #[arg(long, default_value = "8.0")]
        f_sample: f64,

        /// View window (s)
        #[arg(long, default_value = "2.0")]
        t_view: f64,
    },

    /// Tabulate reconstruction error over several sample rates
    Sweep {
        /// Signal carrier frequency (Hz)
        #[arg(long)]
        f_sig: f64,

        /// Sample rates to compare (Hz)
        #[arg(long, num_args = 1.., value_delimiter = ',')]
        rates: Option<Vec<f64>>,
    },

    /// Run every demonstration from a configuration file
    All {
        /// Path to the configuration file (TOML or JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    let (mut config, demo) = match cli.command {
        Commands::Convolution { nx, nh, buffer } => {
            let mut config = SeminarConfig::default();
            config.convolution.nx = nx;
            config.convolution.nh = nh;
            config.convolution.buffer = buffer;
            (config, Demo::Convolution)
        }
        Commands::Antialiasing { f_sig, f_sample, duration, fps } => {
            let mut config = SeminarConfig::default();
            config.antialiasing.f_sig = Hertz(f_sig);
            config.antialiasing.f_sample = Hertz(f_sample);
            config.antialiasing.duration = Seconds(duration);
            config.antialiasing.fps = fps;
            (config, Demo::Antialiasing)
        }
        Commands::Sampling { f_sig, f_sample, t_view } => {
            let mut config = SeminarConfig::default();
            config.sampling.f_sig = Hertz(f_sig);
            config.sampling.f_sample = Hertz(f_sample);
            config.sampling.t_view = Seconds(t_view);
            (config, Demo::Sampling)
        }
        Commands::Sweep { f_sig, rates } => {
            let mut config = SeminarConfig::default();
            config.sweep.f_sig = Hertz(f_sig);
            if let Some(rates) = rates {
                config.sweep.rates = rates;
            }
            (config, Demo::Sweep)
        }
        Commands::All { config: config_path } => {
            let config = match config_path {
                Some(path) => {
                    tracing::info!("Loading configuration from {:?}", path);
                    config::load_config(&path)?
                }
                None => SeminarConfig::default(),
            };
            (config, Demo::All)
        }
    };

    if let Some(format) = cli.format {
        config.display.mode = format.into();
    }
    config::validate_config(&config)?;

    run(config, demo, &cli.output)
}

fn run(config: SeminarConfig, demo: Demo, output_dir: &Path) -> Result<()> {
    display::init(config.display)?;
    let mode = config.display.mode;

    let results = Orchestrator::new(config).run(demo)?;

    if !results.animations.is_empty() || results.sweep.is_some() {
        output::write_results(&results, output_dir, mode)?;
    }
    output::print_results(&results);

    tracing::info!("Done. Results written to {:?}", output_dir);
    Ok(())
}
