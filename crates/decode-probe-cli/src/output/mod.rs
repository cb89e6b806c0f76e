//! Output adapters for the CLI.

mod diagnostics;
mod progress;
mod report;

pub use diagnostics::LineDiagnostics;
pub use progress::ConsoleProgress;
pub use report::RunReport;
