//! Completion notification
//!
//! A summary is emitted at the end of every run, including runs interrupted
//! by a fatal error.

use colored::Colorize;
use serde::Serialize;
use std::io::{self, Write};

/// Counts reported when a run ends
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Repositories considered across all lists
    pub total: usize,
    /// Result documents present in the results directory
    pub analyzed: usize,
    /// Repositories neither analyzed nor errored
    pub missing: usize,
    /// Value of the contention/error counter
    pub errored: u64,
    /// Cause chain of the fatal error, if the run was interrupted
    pub failure: Option<String>,
}

impl RunSummary {
    /// Create a summary; `missing` saturates at zero
    pub fn new(total: usize, analyzed: usize, errored: u64) -> Self {
        let errored_rows = usize::try_from(errored).unwrap_or(usize::MAX);
        Self {
            total,
            analyzed,
            missing: total.saturating_sub(analyzed).saturating_sub(errored_rows),
            errored,
            failure: None,
        }
    }

    /// Mark the run as interrupted
    pub fn with_failure(mut self, failure: impl Into<String>) -> Self {
        self.failure = Some(failure.into());
        self
    }

    /// Returns true if the run finished without a fatal error
    pub fn is_completed(&self) -> bool {
        self.failure.is_none()
    }
}

/// Receives the end-of-run summary
pub trait Notifier: Send + Sync {
    /// Deliver the summary
    fn notify(&self, summary: &RunSummary) -> io::Result<()>;
}

/// Logs the summary and prints it to stdout
#[derive(Debug, Clone, Copy)]
pub struct ConsoleNotifier {
    color: bool,
}

impl Default for ConsoleNotifier {
    fn default() -> Self {
        Self { color: true }
    }
}

impl ConsoleNotifier {
    /// Create a notifier with color option
    pub fn with_color(color: bool) -> Self {
        Self { color }
    }

    /// Render the summary block
    pub fn render(&self, summary: &RunSummary, writer: &mut dyn Write) -> io::Result<()> {
        match &summary.failure {
            None => {
                let title = "Analysis completed";
                if self.color {
                    writeln!(writer, "{}", title.green().bold())?;
                } else {
                    writeln!(writer, "{}", title)?;
                }
            }
            Some(failure) => {
                let title = "Analysis interrupted";
                if self.color {
                    writeln!(writer, "{}: {}", title.red().bold(), failure)?;
                } else {
                    writeln!(writer, "{}: {}", title, failure)?;
                }
            }
        }

        writeln!(writer, "  - Analyzed projects: {}", summary.analyzed)?;
        writeln!(writer, "  - Missing projects: {}", summary.missing)?;
        let errored = summary.errored.to_string();
        if self.color && summary.errored > 0 {
            writeln!(writer, "  - Error projects: {}", errored.yellow())?;
        } else {
            writeln!(writer, "  - Error projects: {}", errored)?;
        }
        Ok(())
    }
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, summary: &RunSummary) -> io::Result<()> {
        tracing::info!(
            total = summary.total,
            analyzed = summary.analyzed,
            missing = summary.missing,
            errored = summary.errored,
            completed = summary.is_completed(),
            "Run finished"
        );
        let mut stdout = io::stdout().lock();
        self.render(summary, &mut stdout)?;
        stdout.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(summary: &RunSummary) -> String {
        let mut buffer = Vec::new();
        ConsoleNotifier::with_color(false)
            .render(summary, &mut buffer)
            .unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn test_missing_is_derived() {
        let summary = RunSummary::new(100, 70, 10);
        assert_eq!(summary.missing, 20);
        assert!(summary.is_completed());
    }

    #[test]
    fn test_missing_saturates() {
        // results from earlier runs can exceed this run's rows
        let summary = RunSummary::new(5, 8, 2);
        assert_eq!(summary.missing, 0);
    }

    #[test]
    fn test_render_completed() {
        let output = render(&RunSummary::new(3, 2, 1));
        assert_eq!(
            output,
            "Analysis completed\n  - Analyzed projects: 2\n  - Missing projects: 0\n  - Error projects: 1\n"
        );
    }

    #[test]
    fn test_render_interrupted() {
        let summary = RunSummary::new(10, 1, 0).with_failure("failed to read repository list");
        let output = render(&summary);
        assert!(output.starts_with("Analysis interrupted: failed to read repository list\n"));
        assert!(output.contains("Missing projects: 9"));
        assert!(!summary.is_completed());
    }
}
