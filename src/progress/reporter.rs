//! Progress and result reporting
//!
//! A [`ReportSink`] receives every plan line, every per-job outcome and the
//! final summary. Workers call it concurrently, so implementations must be
//! thread-safe. [`ConsoleReporter`] writes to the terminal, optionally
//! drawing an indicatif progress bar; [`RecordingReporter`] keeps the lines
//! in memory.

use crate::config::OutputFormat;
use crate::core::{CopyResult, PlannedOperation};
use crate::error::QcpError;
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::sync::Mutex;

/// Sink for plan lines, per-job outcomes and the run summary
pub trait ReportSink: Send + Sync {
    /// An operation was added to the plan
    fn planned(&self, op: &PlannedOperation);

    /// Execution of `jobs` operations is about to start
    fn started(&self, _jobs: usize) {}

    /// A job finished successfully
    fn job_succeeded(&self, op: &PlannedOperation, bytes: u64);

    /// A job failed
    fn job_failed(&self, op: &PlannedOperation, error: &QcpError);

    /// Every job has reported
    fn finished(&self, result: &CopyResult);
}

/// Plan line for an operation
pub fn plan_line(op: &PlannedOperation) -> String {
    format!("plan: {} -> {}", op.source().display(), op.destination().display())
}

/// Success line for a finished job
pub fn done_line(op: &PlannedOperation) -> String {
    format!("done: -> {}", op.destination().display())
}

/// Failure line for a failed job
pub fn error_line(error: &QcpError) -> String {
    format!("ERROR: {}", error)
}

/// Terminal reporter
pub struct ConsoleReporter {
    quiet: bool,
    format: OutputFormat,
    bar: Option<ProgressBar>,
}

impl ConsoleReporter {
    /// Create a console reporter
    pub fn new(quiet: bool, progress: bool, format: OutputFormat) -> Self {
        let bar = progress.then(|| {
            let bar = ProgressBar::new(0);
            bar.set_style(
                ProgressStyle::default_bar()
                    .template("{prefix:.bold.dim} [{bar:40.cyan/blue}] {pos}/{len} files ({percent}%) {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("=> "),
            );
            bar.set_prefix("Copy");
            bar
        });

        Self { quiet, format, bar }
    }

    fn out(&self, line: String) {
        self.suspended(|| write_line(io::stdout().lock(), &line));
    }

    fn err(&self, line: String) {
        self.suspended(|| write_line(io::stderr().lock(), &line));
    }

    fn suspended<F: FnOnce()>(&self, print: F) {
        match &self.bar {
            Some(bar) => bar.suspend(print),
            None => print(),
        }
    }
}

/// Write one line, dropping it if the stream is gone
///
/// A reader that stops early (`qcp ... | head`) must not end the run.
pub fn write_line<W: Write>(mut out: W, line: &str) {
    if let Err(e) = writeln!(out, "{}", line) {
        tracing::debug!("Dropped output line: {}", e);
    }
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::new(false, false, OutputFormat::Text)
    }
}

impl ReportSink for ConsoleReporter {
    fn planned(&self, op: &PlannedOperation) {
        if !self.quiet {
            self.out(plan_line(op));
        }
    }

    fn started(&self, jobs: usize) {
        if let Some(bar) = &self.bar {
            bar.set_length(jobs as u64);
        }
    }

    fn job_succeeded(&self, op: &PlannedOperation, _bytes: u64) {
        if !self.quiet {
            self.out(done_line(op));
        }
        if let Some(bar) = &self.bar {
            bar.inc(1);
        }
    }

    fn job_failed(&self, _op: &PlannedOperation, error: &QcpError) {
        self.err(error_line(error));
        if let Some(bar) = &self.bar {
            bar.inc(1);
        }
    }

    fn finished(&self, result: &CopyResult) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }

        match self.format {
            OutputFormat::Text => {
                self.out(result.summary_line());
                self.out(format!(
                    "{} files copied, {} failed in {:.2?}",
                    result.files_copied, result.files_failed, result.duration
                ));
            }
            OutputFormat::Json => match serde_json::to_string_pretty(&result.to_json()) {
                Ok(json) => self.out(json),
                Err(e) => tracing::error!("Failed to serialize summary: {}", e),
            },
        }
    }
}

/// Reporter that records every line in memory
#[derive(Debug, Default)]
pub struct RecordingReporter {
    lines: Mutex<Vec<String>>,
}

impl RecordingReporter {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the recorded lines
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }

    /// Recorded lines starting with `prefix`
    pub fn lines_starting_with(&self, prefix: &str) -> Vec<String> {
        self.lines()
            .into_iter()
            .filter(|l| l.starts_with(prefix))
            .collect()
    }

    fn push(&self, line: String) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(line);
        }
    }
}

impl ReportSink for RecordingReporter {
    fn planned(&self, op: &PlannedOperation) {
        self.push(plan_line(op));
    }

    fn job_succeeded(&self, op: &PlannedOperation, _bytes: u64) {
        self.push(done_line(op));
    }

    fn job_failed(&self, _op: &PlannedOperation, error: &QcpError) {
        self.push(error_line(error));
    }

    fn finished(&self, result: &CopyResult) {
        self.push(result.summary_line());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CopyStep;
    use std::path::Path;

    fn op() -> PlannedOperation {
        PlannedOperation::copy_file(Path::new("/src"), Path::new("/dst"), Path::new("/src/a/b.txt")).unwrap()
    }

    #[test]
    fn test_line_formats() {
        assert_eq!(plan_line(&op()), "plan: /src/a/b.txt -> /dst/a/b.txt");
        assert_eq!(done_line(&op()), "done: -> /dst/a/b.txt");

        let err = QcpError::job(
            CopyStep::Open,
            "/src/a/b.txt",
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "Permission denied"),
        );
        assert_eq!(error_line(&err), "ERROR: failed to open '/src/a/b.txt': Permission denied");
    }

    #[test]
    fn test_recording_reporter_keeps_order() {
        let reporter = RecordingReporter::new();
        reporter.planned(&op());
        reporter.job_succeeded(&op(), 3);

        assert_eq!(
            reporter.lines(),
            vec!["plan: /src/a/b.txt -> /dst/a/b.txt", "done: -> /dst/a/b.txt"]
        );
        assert_eq!(reporter.lines_starting_with("done:").len(), 1);
    }

    struct ClosedPipe;

    impl Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "Broken pipe"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_write_line_survives_closed_pipe() {
        write_line(ClosedPipe, "done: -> /dst/a/b.txt");

        let mut buf = Vec::new();
        write_line(&mut buf, "done: -> /dst/a/b.txt");
        assert_eq!(buf, b"done: -> /dst/a/b.txt\n");
    }

    #[test]
    fn test_console_reporter_with_progress_bar() {
        let reporter = ConsoleReporter::new(true, true, OutputFormat::Text);
        reporter.started(2);
        reporter.job_succeeded(&op(), 1);
        assert_eq!(reporter.bar.as_ref().map(|b| b.position()), Some(1));
    }
}
