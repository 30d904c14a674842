//! TGAM CLI - Command-line interface for TGAM Score
//!
//! Commands:
//! - score: Summarize a recorded session
//! - classify: Label every attention sample against the threshold
//! - plot: Print the summary and open an interactive chart
//! - validate: Check that a recording forms a valid session

use clap::{Args, Parser, Subcommand, ValueEnum};
use log::{info, warn};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use tgam_score::ingest::SessionReader;
use tgam_score::render::{ChartRenderer, RenderError};
use tgam_score::report::{render_text, ReportEncoder};
use tgam_score::{
    score_file, score_reader, ComputeError, EffectiveTimeMode, ScoredSession, ScorerConfig,
    Session, SCORE_VERSION,
};

/// TGAM - Score attention/meditation recordings from a TGAM headset
#[derive(Parser)]
#[command(name = "tgam")]
#[command(version = SCORE_VERSION)]
#[command(about = "Score TGAM attention/meditation sessions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize a recorded session
    Score {
        #[command(flatten)]
        session: SessionArgs,

        /// Output file path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,

        /// Output format
        #[arg(long, default_value = "text")]
        format: OutputFormat,

        /// Include per-sample labels in JSON output
        #[arg(long)]
        include_labels: bool,
    },

    /// Label every attention sample as above or below the threshold
    Classify {
        #[command(flatten)]
        session: SessionArgs,

        /// Output CSV path (use - for stdout)
        #[arg(short, long, default_value = "-")]
        output: PathBuf,
    },

    /// Print the summary and open an interactive chart
    Plot {
        #[command(flatten)]
        session: SessionArgs,

        /// Skip the text summary before the chart
        #[arg(long)]
        quiet: bool,
    },

    /// Check that a recording forms a valid session
    Validate {
        /// Input CSV path (use - for stdin)
        #[arg(short, long, env = "DATA_PATH")]
        input: PathBuf,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args)]
struct SessionArgs {
    /// Input CSV path with attention and meditation columns (use - for stdin)
    #[arg(short, long, env = "DATA_PATH")]
    input: PathBuf,

    /// Attention threshold for effective learning time [default: 70]
    #[arg(short, long, env = "TGAM_THRESHOLD", allow_negative_numbers = true)]
    threshold: Option<f64>,

    /// Effective learning aggregation: count or value_sum [default: count]
    #[arg(long, env = "TGAM_MODE")]
    mode: Option<String>,

    /// Load scorer configuration from a JSON file
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Human-readable summary
    Text,
    /// Compact JSON report
    Json,
    /// Pretty-printed JSON report
    JsonPretty,
}

fn main() -> ExitCode {
    // DATA_PATH and friends may come from a .env file next to the recording
    let env_file = load_env_file(None);
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    if let Some(path) = env_file {
        info!("loaded environment from {}", path.display());
    }

    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), TgamCliError> {
    match cli.command {
        Commands::Score {
            session,
            output,
            format,
            include_labels,
        } => cmd_score(&session, &output, format, include_labels),

        Commands::Classify { session, output } => cmd_classify(&session, &output),

        Commands::Plot { session, quiet } => cmd_plot(&session, quiet),

        Commands::Validate { input, json } => cmd_validate(&input, json),
    }
}

fn cmd_score(
    args: &SessionArgs,
    output: &Path,
    format: OutputFormat,
    include_labels: bool,
) -> Result<(), TgamCliError> {
    let scored = load_scored(args)?;
    let encoder = ReportEncoder::new();
    let report = scored.report(&encoder, &source_name(&args.input), include_labels);

    let output_data = match format {
        OutputFormat::Text => render_text(&report),
        OutputFormat::Json => serde_json::to_string(&report)? + "\n",
        OutputFormat::JsonPretty => serde_json::to_string_pretty(&report)? + "\n",
    };

    write_output(output, &output_data)
}

fn cmd_classify(args: &SessionArgs, output: &Path) -> Result<(), TgamCliError> {
    let scored = load_scored(args)?;

    let sink: Box<dyn Write> = if is_stdio(output) {
        Box::new(io::stdout())
    } else {
        Box::new(fs::File::create(output)?)
    };
    let mut wtr = csv::Writer::from_writer(sink);

    wtr.write_record(["index", "attention", "label"])?;
    for (index, (score, label)) in scored
        .session
        .attention()
        .iter()
        .zip(&scored.labels)
        .enumerate()
    {
        wtr.write_record([index.to_string(), score.to_string(), label.as_str().to_string()])?;
    }
    wtr.flush()?;

    Ok(())
}

fn cmd_plot(args: &SessionArgs, quiet: bool) -> Result<(), TgamCliError> {
    let scored = load_scored(args)?;

    if !quiet {
        let report = scored.report(&ReportEncoder::new(), &source_name(&args.input), false);
        print!("{}", render_text(&report));
        io::stdout().flush()?;
    }

    ChartRenderer::default().show(&scored.chart()).map_err(|e| {
        warn!("chart not shown: {e}");
        TgamCliError::Render(e)
    })
}

fn cmd_validate(input: &Path, json: bool) -> Result<(), TgamCliError> {
    let result = if is_stdio(input) {
        SessionReader::from_reader(io::stdin().lock())
    } else {
        SessionReader::from_path(input)
    };

    let report = ValidationReport {
        source: source_name(input),
        valid: result.is_ok(),
        samples: result.as_ref().map(Session::len).ok(),
        error: result.as_ref().err().map(ToString::to_string),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        println!("Source:  {}", report.source);
        match (&report.samples, &report.error) {
            (Some(samples), _) => println!("Status:  valid ({samples} samples)"),
            (None, Some(error)) => println!("Status:  invalid\nError:   {error}"),
            (None, None) => println!("Status:  invalid"),
        }
    }

    match result {
        Ok(_) => Ok(()),
        Err(e) => Err(TgamCliError::ValidationFailed(e.to_string())),
    }
}

// Helper functions

/// Load `.env` variables without overriding ones already set.
///
/// With no path, searches the current directory and its parents.
fn load_env_file(path: Option<&Path>) -> Option<PathBuf> {
    let loaded = match path {
        Some(path) => dotenvy::from_path(path).map(|()| path.to_path_buf()),
        None => dotenvy::dotenv(),
    };
    loaded.ok()
}

fn resolve_config(args: &SessionArgs) -> Result<ScorerConfig, TgamCliError> {
    let mut config = match &args.config {
        Some(path) => ScorerConfig::from_json(&fs::read_to_string(path)?)?,
        None => ScorerConfig::default(),
    };

    if let Some(threshold) = args.threshold {
        config.threshold = threshold;
    }
    if let Some(mode) = &args.mode {
        config.mode = mode.parse::<EffectiveTimeMode>()?;
    }

    config.validate()?;
    Ok(config)
}

fn load_scored(args: &SessionArgs) -> Result<ScoredSession, TgamCliError> {
    let config = resolve_config(args)?;
    info!(
        "scoring {} with threshold {} ({})",
        source_name(&args.input),
        config.threshold,
        config.mode
    );

    let scored = if is_stdio(&args.input) {
        score_reader(io::stdin().lock(), &config)?
    } else {
        score_file(&args.input, &config)?
    };
    Ok(scored)
}

fn is_stdio(path: &Path) -> bool {
    path.to_string_lossy() == "-"
}

fn source_name(path: &Path) -> String {
    if is_stdio(path) {
        "stdin".to_string()
    } else {
        path.display().to_string()
    }
}

fn write_output(output: &Path, data: &str) -> Result<(), TgamCliError> {
    if is_stdio(output) {
        print!("{}", data);
    } else {
        fs::write(output, data)?;
    }
    Ok(())
}

// Error types

#[derive(Debug)]
enum TgamCliError {
    Io(io::Error),
    Compute(ComputeError),
    Json(serde_json::Error),
    Csv(csv::Error),
    Render(RenderError),
    ValidationFailed(String),
}

impl From<io::Error> for TgamCliError {
    fn from(e: io::Error) -> Self {
        TgamCliError::Io(e)
    }
}

impl From<ComputeError> for TgamCliError {
    fn from(e: ComputeError) -> Self {
        TgamCliError::Compute(e)
    }
}

impl From<serde_json::Error> for TgamCliError {
    fn from(e: serde_json::Error) -> Self {
        TgamCliError::Json(e)
    }
}

impl From<csv::Error> for TgamCliError {
    fn from(e: csv::Error) -> Self {
        TgamCliError::Csv(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl CliError {
    fn new(code: &str, message: String, hint: &str) -> Self {
        CliError {
            code: code.to_string(),
            message,
            hint: Some(hint.to_string()),
        }
    }
}

impl From<TgamCliError> for CliError {
    fn from(e: TgamCliError) -> Self {
        match e {
            TgamCliError::Io(e) => {
                CliError::new("IO_ERROR", e.to_string(), "Check file paths and permissions")
            }
            TgamCliError::Compute(e) => compute_error(e),
            TgamCliError::Json(e) => CliError::new("JSON_ERROR", e.to_string(), "Check JSON syntax"),
            TgamCliError::Csv(e) => CliError::new(
                "CSV_ERROR",
                e.to_string(),
                "Check that every row has the same number of columns",
            ),
            TgamCliError::Render(e @ RenderError::NoDisplay) => CliError::new(
                "NO_DISPLAY",
                e.to_string(),
                "Run 'tgam plot' from an interactive terminal, or use 'tgam score'",
            ),
            TgamCliError::Render(e) => {
                CliError::new("RENDER_ERROR", e.to_string(), "The summary above is unaffected")
            }
            TgamCliError::ValidationFailed(msg) => CliError::new(
                "VALIDATION_FAILED",
                msg,
                "Fix the recording and run 'tgam validate' again",
            ),
        }
    }
}

fn compute_error(e: ComputeError) -> CliError {
    let message = e.to_string();
    match e {
        ComputeError::InvalidSession(_) => CliError::new(
            "INVALID_SESSION",
            message,
            "Attention and meditation must be non-empty, equal length and numeric",
        ),
        ComputeError::InvalidThreshold(_) => CliError::new(
            "INVALID_THRESHOLD",
            message,
            "Pass a finite number to --threshold or TGAM_THRESHOLD",
        ),
        ComputeError::MissingColumn(_) => CliError::new(
            "MISSING_COLUMN",
            message,
            "The CSV header must contain 'attention' and 'meditation'",
        ),
        ComputeError::ParseError(_) => {
            CliError::new("PARSE_ERROR", message, "Every score cell must be a number")
        }
        ComputeError::Csv(_) => CliError::new("CSV_ERROR", message, "Check CSV syntax"),
        ComputeError::Io(_) => {
            CliError::new("IO_ERROR", message, "Check file paths and permissions")
        }
        ComputeError::JsonError(_) => {
            CliError::new("JSON_ERROR", message, "Check the --config file syntax")
        }
        ComputeError::InvalidConfig(_) => {
            CliError::new(
                "INVALID_CONFIG",
                message,
                "Check --mode (count or value_sum) and the --config file values",
            )
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct ValidationReport {
    source: String,
    valid: bool,
    samples: Option<usize>,
    error: Option<String>,
}
