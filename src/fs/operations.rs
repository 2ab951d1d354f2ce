//! Single-file copy job
//!
//! Whole-file copy followed by permission propagation. Each filesystem step
//! maps to a [`CopyStep`] so a failure names what was being attempted and on
//! which path; a failure while streaming names both paths. The first failure
//! ends the job; nothing is retried or rolled back.

use crate::error::{CopyStep, IoResultExt, QcpError, Result};
use std::fs::{File, Permissions};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Buffer size for the read and write sides of a copy
pub const COPY_BUFFER_SIZE: usize = 256 * 1024;

/// Copy `source` to `dest`, creating missing parent directories and
/// applying the source permission bits to the destination
///
/// Returns the number of bytes copied. Both file handles are closed before
/// the permissions are applied and before the result is returned, on every
/// exit path.
pub fn copy_file(source: &Path, dest: &Path) -> Result<u64> {
    let (bytes_copied, permissions) = stream_copy(source, dest)?;

    std::fs::set_permissions(dest, permissions).at_step(CopyStep::SetPermissions, dest)?;

    tracing::trace!("Copied {} bytes {:?} -> {:?}", bytes_copied, source, dest);
    Ok(bytes_copied)
}

/// Open, stat, create and stream; the handles drop when this returns
fn stream_copy(source: &Path, dest: &Path) -> Result<(u64, Permissions)> {
    let src_file = File::open(source).at_step(CopyStep::Open, source)?;
    let permissions = src_file
        .metadata()
        .at_step(CopyStep::Stat, source)?
        .permissions();

    if let Some(parent) = dest.parent() {
        // Tolerates directories created concurrently by sibling jobs
        std::fs::create_dir_all(parent).at_step(CopyStep::CreateDir, parent)?;
    }

    let dst_file = File::create(dest).at_step(CopyStep::Create, dest)?;

    let mut reader = BufReader::with_capacity(COPY_BUFFER_SIZE, src_file);
    let mut writer = BufWriter::with_capacity(COPY_BUFFER_SIZE, dst_file);

    let bytes_copied =
        std::io::copy(&mut reader, &mut writer).map_err(|e| QcpError::transfer(source, dest, e))?;
    writer.flush().map_err(|e| QcpError::transfer(source, dest, e))?;

    Ok((bytes_copied, permissions))
}
