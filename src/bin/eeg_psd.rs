//! Command-line front end for PSD extraction, collation and normalization

use clap::{Args, Parser, Subcommand};
use eeg_psd::config::{ConfigLoader, PsdConfig, ScalerKind};
use eeg_psd::error::{PsdErrorBuilder, PsdResult};
use eeg_psd::io::discover_inputs;
use eeg_psd::normalization::NormalizationMode;
use eeg_psd::reporting::{ProgressReporter, RunReport, TracingLogSink};
use eeg_psd::runner::BatchRunner;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const FATAL: i32 = 1;
    pub const PARTIAL: i32 = 2;
}

#[derive(Parser)]
#[command(
    name = "eeg-psd",
    version,
    about = "Band PSD feature extraction and normalization for EEG recordings"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Configuration file layered over the defaults
    #[arg(short, long, global = true, env = "EEG_PSD_CONFIG")]
    config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Extract band PSD matrices and hemisphere summaries from recordings
    Extract(ExtractArgs),
    /// Reorganize stroke summaries into <severity>/<eyes>/<participant>.csv
    CollateStroke(CollateArgs),
    /// Fit a scaler on training summaries and write train_data.csv
    NormalizeTrain(TrainArgs),
    /// Scale held-out summaries with the training scaler
    NormalizeTest(TestArgs),
    /// Print the merged configuration
    ShowConfig,
}

#[derive(Args)]
struct InputArgs {
    /// Input files, in processing order
    files: Vec<PathBuf>,

    /// Directory to search for inputs
    #[arg(long)]
    input_dir: Option<PathBuf>,

    /// Glob pattern relative to --input-dir
    #[arg(long, default_value = "*.csv")]
    pattern: String,

    /// Output directory (created if absent)
    #[arg(short, long)]
    output: PathBuf,
}

#[derive(Args)]
struct ExtractArgs {
    #[command(flatten)]
    inputs: InputArgs,

    /// Keep recordings without an emotion class code (CLASS left empty)
    #[arg(long)]
    allow_unlabelled: bool,

    /// Process channels in parallel
    #[arg(long)]
    parallel: bool,
}

#[derive(Args)]
struct CollateArgs {
    #[command(flatten)]
    inputs: InputArgs,
}

#[derive(Args)]
struct TrainArgs {
    #[command(flatten)]
    inputs: InputArgs,

    /// Scaler variant (overrides the configuration)
    #[arg(long)]
    scaler: Option<ScalerKind>,
}

#[derive(Args)]
struct TestArgs {
    #[command(flatten)]
    inputs: InputArgs,

    /// Persisted training scaler (defaults to <output>/<context>_scaler.bin)
    #[arg(long)]
    scaler_file: Option<PathBuf>,

    /// Fit a separate scaler per test group instead of reusing the training scaler
    #[arg(long)]
    refit: bool,

    /// Scaler variant used with --refit
    #[arg(long)]
    scaler: Option<ScalerKind>,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let exit_code = match run(cli) {
        Ok(Some(report)) => {
            match serde_json::to_string_pretty(&report) {
                Ok(json) => println!("{}", json),
                Err(e) => tracing::error!(error = %e, "failed to serialize run report"),
            }
            if report.skipped.is_empty() && report.io_failures.is_empty() && !report.cancelled {
                exit_codes::SUCCESS
            } else {
                exit_codes::PARTIAL
            }
        }
        Ok(None) => exit_codes::SUCCESS,
        Err(e) => {
            tracing::error!("{}", e);
            eprintln!("Error: {}", e);
            exit_codes::FATAL
        }
    };

    std::process::exit(exit_code);
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "eeg_psd=info",
        1 => "eeg_psd=debug",
        _ => "eeg_psd=trace",
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_level.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_config(path: Option<&Path>) -> PsdResult<PsdConfig> {
    let config = match path {
        Some(path) => ConfigLoader::load_file(path)?,
        None => ConfigLoader::new().load()?,
    };
    tracing::debug!(summary = ?config.get_summary(), "configuration loaded");
    Ok(config)
}

fn resolve_inputs(args: &InputArgs) -> PsdResult<Vec<PathBuf>> {
    let mut inputs = Vec::new();
    if let Some(dir) = &args.input_dir {
        inputs.extend(discover_inputs(dir, &args.pattern)?);
    }
    inputs.extend(args.files.iter().cloned());
    if inputs.is_empty() {
        return Err(PsdErrorBuilder::new("cli").configuration("no input files given"));
    }
    Ok(inputs)
}

fn runner() -> BatchRunner<impl ProgressReporter, TracingLogSink> {
    let progress = |completed: usize, total: usize| {
        eprintln!("[{}/{}]", completed, total);
    };
    BatchRunner::new(progress, TracingLogSink)
}

fn run(cli: Cli) -> PsdResult<Option<RunReport>> {
    let mut config = load_config(cli.config.as_deref())?;

    let report = match cli.command {
        Command::Extract(args) => {
            if args.allow_unlabelled {
                config.extraction.require_class = false;
            }
            if args.parallel {
                config.extraction.parallel_channels = true;
            }
            let inputs = resolve_inputs(&args.inputs)?;
            runner().extract(&config.extraction, &inputs, &args.inputs.output)?
        }
        Command::CollateStroke(args) => {
            let inputs = resolve_inputs(&args.inputs)?;
            runner().collate_stroke(&inputs, &args.inputs.output)?
        }
        Command::NormalizeTrain(args) => {
            if let Some(kind) = args.scaler {
                config.normalization.scaler = kind;
            }
            let inputs = resolve_inputs(&args.inputs)?;
            runner().normalize(
                NormalizationMode::Fit,
                &config.normalization,
                &inputs,
                &args.inputs.output,
                None,
            )?
        }
        Command::NormalizeTest(args) => {
            if let Some(kind) = args.scaler {
                config.normalization.scaler = kind;
            }
            let mode = if args.refit {
                NormalizationMode::Refit
            } else {
                NormalizationMode::Apply
            };
            let inputs = resolve_inputs(&args.inputs)?;
            runner().normalize(
                mode,
                &config.normalization,
                &inputs,
                &args.inputs.output,
                args.scaler_file.as_deref(),
            )?
        }
        Command::ShowConfig => {
            let rendered = toml::to_string_pretty(&config).map_err(|e| {
                PsdErrorBuilder::new("cli").configuration(format!("cannot render configuration: {}", e))
            })?;
            println!("{}", rendered);
            return Ok(None);
        }
    };

    Ok(Some(report))
}
