//! CLI definition, exit codes and invocation errors.

pub mod run;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use decode_probe_core::SettingsError;

/// Long help appended after the generated option list.
const LONG_HELP: &str = "\
DESCRIPTION:
  Decodes the reference image from N_THREADS worker threads for N_ITERATIONS
  rounds. Each round submits one probe per thread; a probe decodes the image and
  checks the pixel at (0,0). Afterwards the image is decoded serially 10 more
  times, to find out whether the decoder recovers from a corrupt state.

EXAMPLES:
  Iterate 10 times reading the reference image with 5 parallel threads:

      $ decode-probe 5 10 false

  The same, with every decode serialized behind a single lock:

      $ decode-probe 5 10 true

EXIT STATUS:
  0  every probe matched
  1  at least one probe failed
  2  wrong invocation
  3  the harness itself failed";

/// Decode Probe - reproduce thread-safety defects in an image decoder
#[derive(Parser)]
#[command(name = "decode-probe")]
#[command(author, version, about, long_about = None, after_long_help = LONG_HELP)]
pub struct Cli {
    /// Run arguments (thread count, rounds, serialization, output).
    #[command(flatten)]
    pub run: run::RunArgs,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

/// Process exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Every probe matched.
    Success = 0,
    /// At least one probe failed.
    ProbeFailed = 1,
    /// Missing or malformed arguments.
    Usage = 2,
    /// The harness could not run.
    Error = 3,
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        Self::from(code as u8)
    }
}

/// Reports an argument parsing failure and picks the exit code.
///
/// `--help` and `--version` are printed as usual and exit successfully.
pub fn invocation_error(error: &clap::Error) -> ExitCode {
    if matches!(
        error.kind(),
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion
    ) {
        let _ = error.print();
        return ExitCode::Success;
    }

    eprintln!("Wrong invocation:");
    eprintln!("{}", error.render());
    eprintln!("{}", Cli::command().render_long_help());
    ExitCode::Usage
}

/// Reports run settings rejected after parsing; these are usage errors too.
pub fn settings_error(error: &SettingsError) -> ExitCode {
    eprintln!("Wrong invocation:");
    eprintln!("error: {error}");
    eprintln!("{}", Cli::command().render_long_help());
    ExitCode::Usage
}
