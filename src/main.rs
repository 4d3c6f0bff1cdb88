mod analysis;
mod common;
mod output;
mod parsing;
mod prompt;
mod report;
mod settings;

use analysis::compare::compare_decades;
use analysis::history::analyze_history;
use analysis::{AnalysisError, RunOutcome};
use argh::FromArgs;
use prompt::{AssumeYes, Confirm, LineConfirm};
use settings::{
    ReportInfo, Settings, DEFAULT_DATA_PATH, DEFAULT_IMAGE_ROOT, DEFAULT_REPORT_NAME,
    DEFAULT_RESULTS_DIR,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Statistical report generator comparing music tracks across decades
#[derive(FromArgs, Debug)]
pub struct Args {
    /// first decade token (20s 30s 40s 50s 60s 70s 80s 90s 00s 10s), or `all`
    #[argh(positional)]
    first: String,

    /// second decade token, or `decades` after `all`
    #[argh(positional)]
    second: String,

    /// report name without the .html extension (default: rep)
    #[argh(option, short = 'n', default = "DEFAULT_REPORT_NAME.to_string()")]
    name: String,

    /// path of the semicolon-delimited track dataset (default: ./data/new_dane.csv)
    #[argh(option, default = "PathBuf::from(DEFAULT_DATA_PATH)")]
    data: PathBuf,

    /// root directory for chart images (default: ./img)
    #[argh(option, default = "PathBuf::from(DEFAULT_IMAGE_ROOT)")]
    img_dir: PathBuf,

    /// directory for generated reports (default: ./results)
    #[argh(option, default = "PathBuf::from(DEFAULT_RESULTS_DIR)")]
    results_dir: PathBuf,

    /// path of a JSON file with the report author block
    #[argh(option)]
    info: Option<PathBuf>,

    /// overwrite existing outputs without asking
    #[argh(switch, short = 'y')]
    yes: bool,

    /// print debug logs
    #[argh(switch, short = 'v')]
    verbose: bool,
}

impl Args {
    /// Whether the positional pair requests the whole-history analysis
    fn is_history(&self) -> bool {
        self.first == "all" && self.second == "decades"
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    // Failing to install a subscriber only loses diagnostics
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .try_init();
}

fn run(args: &Args) -> Result<RunOutcome, AnalysisError> {
    let settings = Settings::new(
        args.data.clone(),
        args.img_dir.clone(),
        args.results_dir.clone(),
        args.name.clone(),
    )?;
    let info = ReportInfo::load(args.info.as_deref())?;
    debug!(?settings, "resolved settings");

    let mut confirm: Box<dyn Confirm> = if args.yes {
        Box::new(AssumeYes)
    } else {
        Box::new(LineConfirm::stdin())
    };

    if args.is_history() {
        analyze_history(&settings, &info, confirm.as_mut())
    } else {
        compare_decades(&args.first, &args.second, &settings, &info, confirm.as_mut())
    }
}

fn main() -> ExitCode {
    let args: Args = argh::from_env();
    init_logging(args.verbose);

    match run(&args) {
        Ok(outcome) => {
            debug!(?outcome, "run finished");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
