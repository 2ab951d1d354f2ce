//! Main copy engine
//!
//! Plans a run by draining the tree walker into a list, then dispatches one
//! job per planned operation onto the worker pool. Each job is wrapped so
//! that its outcome is reported and, on success, its byte count is added to
//! the running total. The engine returns only after every job has reported.

use crate::config::CopyConfig;
use crate::core::{FileCopyExecutor, JobExecutor, PlannedOperation, WorkerPool};
use crate::error::Result;
use crate::fs::{walk, InclusionMatcher, PathMatcher, PlanStream, WalkOptions};
use crate::progress::{ConsoleReporter, ReportSink};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// A job that reported an error
#[derive(Debug, Clone, Serialize)]
pub struct FailedJob {
    /// Source path of the job
    pub source: PathBuf,
    /// Destination path of the job
    pub destination: PathBuf,
    /// Error message
    pub error: String,
}

/// Process-wide accumulator of job outcomes
///
/// Only successful jobs add bytes; the final value does not depend on the
/// order in which jobs complete.
#[derive(Debug, Default)]
pub struct RunningTotal {
    bytes: AtomicU64,
    files_copied: AtomicU64,
    files_failed: AtomicU64,
}

impl RunningTotal {
    /// Record a successful job
    pub fn record_success(&self, bytes: u64) {
        self.bytes.fetch_add(bytes, Ordering::Relaxed);
        self.files_copied.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a failed job
    pub fn record_failure(&self) {
        self.files_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Bytes copied by successful jobs
    pub fn bytes(&self) -> u64 {
        self.bytes.load(Ordering::Relaxed)
    }

    /// Number of successful jobs
    pub fn files_copied(&self) -> u64 {
        self.files_copied.load(Ordering::Relaxed)
    }

    /// Number of failed jobs
    pub fn files_failed(&self) -> u64 {
        self.files_failed.load(Ordering::Relaxed)
    }
}

/// Collects job outcomes from the workers
pub struct Aggregator {
    total: RunningTotal,
    failures: Mutex<Vec<FailedJob>>,
    reporter: Arc<dyn ReportSink>,
}

impl Aggregator {
    /// Create an aggregator reporting to `reporter`
    pub fn new(reporter: Arc<dyn ReportSink>) -> Self {
        Self {
            total: RunningTotal::default(),
            failures: Mutex::new(Vec::new()),
            reporter,
        }
    }

    /// Report one job outcome
    pub fn record(&self, op: &PlannedOperation, result: Result<u64>) {
        match result {
            Ok(bytes) => {
                self.reporter.job_succeeded(op, bytes);
                self.total.record_success(bytes);
            }
            Err(error) => {
                self.reporter.job_failed(op, &error);
                self.total.record_failure();
                if let Ok(mut failures) = self.failures.lock() {
                    failures.push(FailedJob {
                        source: op.source().to_path_buf(),
                        destination: op.destination().to_path_buf(),
                        error: error.to_string(),
                    });
                }
            }
        }
    }

    /// The running total
    pub fn total(&self) -> &RunningTotal {
        &self.total
    }

    /// Failed jobs recorded so far, in completion order
    pub fn failures(&self) -> Vec<FailedJob> {
        self.failures.lock().map(|f| f.clone()).unwrap_or_default()
    }
}

/// Copy operation result
#[derive(Debug, Clone)]
pub struct CopyResult {
    /// Source root
    pub source: PathBuf,
    /// Destination root
    pub destination: PathBuf,
    /// Files copied successfully
    pub files_copied: u64,
    /// Files whose job failed
    pub files_failed: u64,
    /// Bytes copied by successful jobs
    pub bytes_copied: u64,
    /// Wall time of the execution phase
    pub duration: Duration,
    /// Failed jobs
    pub failures: Vec<FailedJob>,
}

impl CopyResult {
    /// Check if every job succeeded
    pub fn is_success(&self) -> bool {
        self.files_failed == 0
    }

    /// One-line human-readable summary
    pub fn summary_line(&self) -> String {
        format!(
            "copied {} from {} to {}",
            humansize::format_size(self.bytes_copied, humansize::BINARY),
            self.source.display(),
            self.destination.display()
        )
    }

    /// Machine-readable summary
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "source": self.source,
            "destination": self.destination,
            "files_copied": self.files_copied,
            "files_failed": self.files_failed,
            "bytes_copied": self.bytes_copied,
            "duration_secs": self.duration.as_secs_f64(),
            "failures": self.failures,
        })
    }
}

/// Main copy engine
pub struct CopyEngine<E: JobExecutor = FileCopyExecutor> {
    config: CopyConfig,
    matcher: Arc<dyn PathMatcher>,
    executor: Arc<E>,
    reporter: Arc<dyn ReportSink>,
}

impl CopyEngine<FileCopyExecutor> {
    /// Create an engine performing real copies
    ///
    /// Compiles the inclusion patterns, so a malformed pattern fails here.
    pub fn new(config: CopyConfig) -> Result<Self> {
        let matcher = InclusionMatcher::from_config(&config)?;
        tracing::debug!(
            "Using {} {:?} patterns, ignoring {:?}",
            matcher.pattern_count(),
            config.match_style,
            config.ignore_suffixes
        );

        Ok(Self {
            config,
            matcher: Arc::new(matcher),
            executor: Arc::new(FileCopyExecutor),
            reporter: Arc::new(ConsoleReporter::default()),
        })
    }
}

impl<E: JobExecutor> CopyEngine<E> {
    /// Set the report sink
    pub fn with_reporter(mut self, reporter: Arc<dyn ReportSink>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Replace the inclusion predicate
    pub fn with_matcher(mut self, matcher: Arc<dyn PathMatcher>) -> Self {
        self.matcher = matcher;
        self
    }

    /// Replace the job executor
    pub fn with_executor<X: JobExecutor>(self, executor: X) -> CopyEngine<X> {
        CopyEngine {
            config: self.config,
            matcher: self.matcher,
            executor: Arc::new(executor),
            reporter: self.reporter,
        }
    }

    /// Configuration in use
    pub fn config(&self) -> &CopyConfig {
        &self.config
    }

    /// Start a fresh walk of the source root
    pub fn walk(&self) -> PlanStream {
        walk(
            &self.config.source,
            &self.config.destination,
            Arc::clone(&self.matcher),
            WalkOptions {
                follow_symlinks: self.config.follow_symlinks,
                on_error: self.config.on_walk_error,
            },
        )
    }

    /// Walk the source tree and collect the full plan, reporting each entry
    pub fn plan(&self) -> Result<Vec<PlannedOperation>> {
        let mut stream = self.walk();
        let mut plan = Vec::new();

        for op in stream.by_ref() {
            let op = op?;
            self.reporter.planned(&op);
            plan.push(op);
        }

        if stream.skipped_errors() > 0 {
            tracing::warn!("Skipped {} unreadable entries while planning", stream.skipped_errors());
        }
        tracing::info!("Planned {} files from {:?}", plan.len(), self.config.source);

        Ok(plan)
    }

    /// Dispatch every planned operation and wait for all of them to report
    ///
    /// Per-job failures are reported and counted; they never fail the run.
    pub fn execute(&self, plan: Vec<PlannedOperation>) -> Result<CopyResult> {
        let start_time = Instant::now();
        let pool = WorkerPool::new(self.config.threads)?;
        let aggregator = Arc::new(Aggregator::new(Arc::clone(&self.reporter)));

        tracing::info!("Copying {} files with {} workers", plan.len(), pool.threads());
        self.reporter.started(plan.len());

        for op in plan {
            let executor = Arc::clone(&self.executor);
            let aggregator = Arc::clone(&aggregator);
            pool.dispatch(move || {
                let result = op.run(executor.as_ref());
                aggregator.record(&op, result);
            });
        }

        pool.stop_and_wait();

        let total = aggregator.total();
        let result = CopyResult {
            source: self.config.source.clone(),
            destination: self.config.destination.clone(),
            files_copied: total.files_copied(),
            files_failed: total.files_failed(),
            bytes_copied: total.bytes(),
            duration: start_time.elapsed(),
            failures: aggregator.failures(),
        };

        tracing::info!(
            "Finished: {} copied, {} failed, {} bytes",
            result.files_copied,
            result.files_failed,
            result.bytes_copied
        );
        self.reporter.finished(&result);

        Ok(result)
    }

    /// Plan and execute without confirmation
    pub fn run(&self) -> Result<CopyResult> {
        let plan = self.plan()?;
        self.execute(plan)
    }
}

/// Copy everything under `source` matched by prefix `patterns` into `dest`
pub fn selective_copy(source: PathBuf, dest: PathBuf, patterns: Vec<String>) -> Result<CopyResult> {
    let config = CopyConfig {
        source,
        destination: dest,
        patterns,
        skip_confirmation: true,
        ..Default::default()
    };

    CopyEngine::new(config)?.run()
}
