//! Planned operations and their execution
//!
//! A [`PlannedOperation`] pairs a qualifying source file with its computed
//! destination and the action that will copy it. Planning never touches the
//! destination; the action only runs when a [`JobExecutor`] is handed the
//! operation, which keeps the walker independent of how jobs are scheduled.

use crate::error::Result;
use crate::fs::copy_file;
use std::path::{Path, PathBuf};

/// The deferred action carried by a planned operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyAction {
    /// Whole-file copy followed by permission propagation
    CopyFile,
}

/// A source file selected for copying, with its destination
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedOperation {
    source: PathBuf,
    destination: PathBuf,
    action: CopyAction,
}

impl PlannedOperation {
    /// Plan a copy of `source` into `dest_root`
    ///
    /// The destination is `dest_root` joined with the path of `source`
    /// relative to `source_root`. Returns `None` when `source` is not
    /// under `source_root`.
    pub fn copy_file(source_root: &Path, dest_root: &Path, source: &Path) -> Option<Self> {
        let relative = source.strip_prefix(source_root).ok()?;
        let destination = if relative.as_os_str().is_empty() {
            dest_root.to_path_buf()
        } else {
            dest_root.join(relative)
        };

        Some(Self {
            source: source.to_path_buf(),
            destination,
            action: CopyAction::CopyFile,
        })
    }

    /// Absolute source path
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Absolute destination path
    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// Action to perform
    pub fn action(&self) -> CopyAction {
        self.action
    }

    /// Run the action with the given executor, yielding the bytes copied
    pub fn run<E: JobExecutor + ?Sized>(&self, executor: &E) -> Result<u64> {
        executor.execute(self)
    }
}

/// Executes the action of a planned operation
pub trait JobExecutor: Send + Sync + 'static {
    /// Perform the operation once, returning the bytes copied
    fn execute(&self, op: &PlannedOperation) -> Result<u64>;
}

/// Executor performing real filesystem copies
#[derive(Debug, Clone, Copy, Default)]
pub struct FileCopyExecutor;

impl JobExecutor for FileCopyExecutor {
    fn execute(&self, op: &PlannedOperation) -> Result<u64> {
        match op.action() {
            CopyAction::CopyFile => copy_file(op.source(), op.destination()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use tempfile::TempDir;

    #[test]
    fn test_destination_preserves_relative_structure() {
        let op = PlannedOperation::copy_file(
            Path::new("/home/user"),
            Path::new("/tmp/out"),
            Path::new("/home/user/Documents/a.txt"),
        )
        .unwrap();

        assert_eq!(op.source(), Path::new("/home/user/Documents/a.txt"));
        assert_eq!(op.destination(), Path::new("/tmp/out/Documents/a.txt"));
        assert_eq!(op.action(), CopyAction::CopyFile);
    }

    #[test]
    fn test_source_outside_root_is_not_planned() {
        assert!(PlannedOperation::copy_file(Path::new("/a"), Path::new("/b"), Path::new("/c/d")).is_none());
    }

    #[test]
    fn test_root_itself_maps_to_destination_root() {
        let op = PlannedOperation::copy_file(Path::new("/a/f.txt"), Path::new("/b/g.txt"), Path::new("/a/f.txt"))
            .unwrap();
        assert_eq!(op.destination(), Path::new("/b/g.txt"));
    }

    #[test]
    fn test_file_copy_executor_runs_copy() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        std::fs::write(src.path().join("f.txt"), b"hello").unwrap();

        let op = PlannedOperation::copy_file(src.path(), dst.path(), &src.path().join("f.txt")).unwrap();
        assert_eq!(op.run(&FileCopyExecutor).unwrap(), 5);
        assert_eq!(std::fs::read(dst.path().join("f.txt")).unwrap(), b"hello");
    }

    proptest! {
        #[test]
        fn prop_destination_is_root_plus_relative(parts in proptest::collection::vec("[a-zA-Z0-9_.-]{1,8}", 1..6)) {
            prop_assume!(parts.iter().all(|p| p != "." && p != ".."));
            let source_root = Path::new("/src/root");
            let dest_root = Path::new("/dst/root");
            let relative: PathBuf = parts.iter().collect();

            let op = PlannedOperation::copy_file(source_root, dest_root, &source_root.join(&relative)).unwrap();

            let expected = dest_root.join(&relative);
            prop_assert_eq!(op.destination(), expected.as_path());
            prop_assert_eq!(op.destination().strip_prefix(dest_root).unwrap(), relative.as_path());
        }
    }
}
