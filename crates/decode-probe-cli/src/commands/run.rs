//! Run command - probe the decoder from parallel rounds, then serially.

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use decode_probe_adapters::ImageCrateCodec;
use decode_probe_core::{ConcurrentDecodeProbe, DiagnosticSink, RunSettings, REFERENCE_IMAGE};
use tracing::{info, warn};

use super::ExitCode;
use crate::config::AppConfig;
use crate::output::{ConsoleProgress, LineDiagnostics, RunReport};

/// Output format for the final report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Progress lines only
    #[default]
    Text,
    /// JSON run report on stdout; progress moves to stderr
    Json,
}

/// Parse a worker thread count (at least 1).
fn parse_thread_count(s: &str) -> Result<usize, String> {
    let value: usize = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid thread count"))?;
    if value == 0 {
        return Err(String::from("at least one thread is required"));
    }
    Ok(value)
}

/// Parse `true`/`false`, ignoring case.
fn parse_serialize(s: &str) -> Result<bool, String> {
    if s.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if s.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err(format!("'{s}' is neither 'true' nor 'false'"))
    }
}

/// Arguments of a probe run.
#[derive(Args, Clone)]
pub struct RunArgs {
    /// Number of parallel threads
    #[arg(value_name = "N_THREADS", value_parser = parse_thread_count)]
    pub threads: usize,

    /// Number of rounds of parallel reading of the reference image
    #[arg(value_name = "N_ITERATIONS")]
    pub iterations: usize,

    /// Serialize every decode behind a single lock (true/false)
    #[arg(value_name = "SERIALIZE", value_parser = parse_serialize, action = clap::ArgAction::Set)]
    pub serialize: bool,

    /// Reference image to decode [default: testImage_sRGB.jpg]
    #[arg(long, value_name = "PATH")]
    pub image: Option<PathBuf>,

    /// Output format
    #[arg(long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Pretty-print the JSON report (only affects --format json)
    #[arg(long)]
    pub pretty: bool,

    /// Show a progress bar instead of per-probe lines
    #[arg(long)]
    pub progress: bool,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,
}

impl RunArgs {
    /// Apply configuration file values, respecting CLI precedence.
    ///
    /// Layering priority (lowest to highest):
    /// 1. Hardcoded defaults (in accessor methods)
    /// 2. Config file values (XDG, then project-local)
    /// 3. CLI arguments (already set on self)
    pub fn with_config(mut args: Self, config: &AppConfig) -> Self {
        if args.image.is_none() {
            args.image.clone_from(&config.reference.path);
        }

        if args.format.is_none() {
            args.format = config
                .output
                .format
                .as_deref()
                .and_then(|s| match s {
                    "text" => Some(OutputFormat::Text),
                    "json" => Some(OutputFormat::Json),
                    _ => None,
                });
        }

        if !args.pretty {
            args.pretty = config.output.pretty.unwrap_or(false);
        }
        if !args.progress {
            args.progress = config.output.progress.unwrap_or(false);
        }

        args
    }

    /// Reference image with fallback to the default location.
    fn image(&self) -> PathBuf {
        self.image
            .clone()
            .unwrap_or_else(|| PathBuf::from(REFERENCE_IMAGE))
    }

    /// Output format with fallback to text.
    fn format(&self) -> OutputFormat {
        self.format.unwrap_or_default()
    }
}

/// Result of a probe run.
pub struct RunResult {
    /// Exit code.
    pub exit_code: ExitCode,
}

/// Run the probe.
pub fn run(args: &RunArgs) -> Result<RunResult> {
    let settings = match RunSettings::new(args.threads, args.iterations, args.serialize) {
        Ok(settings) => settings,
        Err(e) => {
            return Ok(RunResult {
                exit_code: super::settings_error(&e),
            })
        }
    };
    let reference = args.image();
    if !reference.is_file() {
        warn!(
            "Reference image {} not found; every probe will fail",
            reference.display()
        );
    }

    let json = args.format() == OutputFormat::Json;
    let progress = if json {
        ConsoleProgress::stderr(settings.total_probes(), args.quiet, args.progress)
    } else {
        ConsoleProgress::stdout(settings.total_probes(), args.quiet, args.progress)
    };
    let diagnostics: Arc<dyn DiagnosticSink> = Arc::new(LineDiagnostics::stderr());

    let probe = ConcurrentDecodeProbe::new(
        Arc::new(ImageCrateCodec::new()),
        diagnostics,
        reference.clone(),
    );
    let summary = probe.run(settings, &progress)?;

    if json {
        let report = RunReport::new(&summary, &reference);
        let mut stdout = io::stdout().lock();
        report.write(&mut stdout, args.pretty)?;
        stdout.flush().context("Failed to flush report")?;
    }

    info!(success = summary.success, "Run complete");

    let exit_code = if summary.success {
        ExitCode::Success
    } else {
        ExitCode::ProbeFailed
    };
    Ok(RunResult { exit_code })
}
