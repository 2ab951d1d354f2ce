//! Tree walker producing planned operations
//!
//! A producer thread walks the source root depth-first (entries sorted by
//! file name within each directory) and sends one [`PlannedOperation`] per
//! matching non-directory entry over a channel of capacity 1, so the walk
//! never runs more than one operation ahead of its consumer. The resulting
//! [`PlanStream`] is single-pass; walking again re-reads the filesystem.

use crate::config::WalkErrorPolicy;
use crate::core::PlannedOperation;
use crate::error::{QcpError, Result};
use crate::fs::PathMatcher;
use crossbeam::channel::{bounded, Receiver};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use walkdir::WalkDir;

/// Capacity of the channel between walker and consumer
pub const PLAN_CHANNEL_CAPACITY: usize = 1;

/// Options controlling the walk
#[derive(Debug, Clone, Copy, Default)]
pub struct WalkOptions {
    /// Follow symbolic links into directories
    pub follow_symlinks: bool,
    /// What to do on a traversal error
    pub on_error: WalkErrorPolicy,
}

/// Lazy, ordered sequence of planned operations
///
/// Yields `Err` at most once, as the last item, when the walk aborts.
pub struct PlanStream {
    receiver: Receiver<Result<PlannedOperation>>,
    skipped: Arc<AtomicUsize>,
}

impl PlanStream {
    /// Traversal errors skipped so far under [`WalkErrorPolicy::Skip`]
    pub fn skipped_errors(&self) -> usize {
        self.skipped.load(Ordering::Relaxed)
    }
}

impl Iterator for PlanStream {
    type Item = Result<PlannedOperation>;

    fn next(&mut self) -> Option<Self::Item> {
        self.receiver.recv().ok()
    }
}

/// Start walking `source_root`, planning copies into `dest_root` for every
/// file accepted by `matcher`
pub fn walk(
    source_root: &Path,
    dest_root: &Path,
    matcher: Arc<dyn PathMatcher>,
    options: WalkOptions,
) -> PlanStream {
    let (sender, receiver) = bounded(PLAN_CHANNEL_CAPACITY);
    let skipped = Arc::new(AtomicUsize::new(0));

    let source_root = source_root.to_path_buf();
    let dest_root = dest_root.to_path_buf();
    let skipped_count = Arc::clone(&skipped);

    thread::spawn(move || {
        let walker = WalkDir::new(&source_root)
            .follow_links(options.follow_symlinks)
            .sort_by_file_name();

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    let path = err
                        .path()
                        .map(Path::to_path_buf)
                        .unwrap_or_else(|| source_root.clone());
                    let error = QcpError::Traversal {
                        path,
                        message: err.to_string(),
                    };

                    match options.on_error {
                        WalkErrorPolicy::Abort => {
                            let _ = sender.send(Err(error));
                            return;
                        }
                        WalkErrorPolicy::Skip => {
                            tracing::warn!("Skipping: {}", error);
                            skipped_count.fetch_add(1, Ordering::Relaxed);
                            continue;
                        }
                    }
                }
            };

            if entry.file_type().is_dir() {
                continue;
            }

            if !matcher.matches(&source_root, entry.path()) {
                continue;
            }

            let Some(op) = PlannedOperation::copy_file(&source_root, &dest_root, entry.path()) else {
                continue;
            };

            tracing::debug!("Planned {:?} -> {:?}", op.source(), op.destination());

            if sender.send(Ok(op)).is_err() {
                tracing::debug!("Plan consumer went away; stopping walk");
                return;
            }
        }
    });

    PlanStream { receiver, skipped }
}

/// Walk to completion, collecting every planned operation
///
/// Fails with the traversal error if the walk aborts.
pub fn collect_plan(
    source_root: &Path,
    dest_root: &Path,
    matcher: Arc<dyn PathMatcher>,
    options: WalkOptions,
) -> Result<Vec<PlannedOperation>> {
    walk(source_root, dest_root, matcher, options).collect()
}
