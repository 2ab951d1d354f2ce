//! Root path resolution
//!
//! Turns the user-supplied roots into absolute paths: `~` and `~/...` are
//! expanded against the home directory, everything else is joined onto the
//! current directory. The result is cleaned lexically, without touching the
//! filesystem, so a destination that does not exist yet still resolves.

use std::io;
use std::path::{Component, Path, PathBuf};

/// Resolve a user-supplied path to an absolute, lexically clean path
pub fn expand_path(raw: &str) -> io::Result<PathBuf> {
    if let Some(rest) = strip_home_prefix(raw) {
        let home = dirs::home_dir()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "home directory is unknown"))?;
        return Ok(clean_path(&home.join(rest)));
    }

    let path = Path::new(raw);
    if path.is_absolute() {
        Ok(clean_path(path))
    } else {
        Ok(clean_path(&std::env::current_dir()?.join(path)))
    }
}

/// The remainder after `~` or `~/`, if the path is home-relative
fn strip_home_prefix(raw: &str) -> Option<&str> {
    if raw == "~" {
        Some("")
    } else {
        raw.strip_prefix("~/")
    }
}

/// Drop `.` components and resolve `..` against the preceding component
pub fn clean_path(path: &Path) -> PathBuf {
    let mut cleaned = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                // `..` at the root stays at the root
                if !cleaned.pop() && !cleaned.has_root() {
                    cleaned.push(component);
                }
            }
            other => cleaned.push(other),
        }
    }
    cleaned
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absolute_path_is_cleaned() {
        assert_eq!(expand_path("/a/./b/../c").unwrap(), PathBuf::from("/a/c"));
        assert_eq!(expand_path("/a/b/").unwrap(), PathBuf::from("/a/b"));
        assert_eq!(expand_path("/..").unwrap(), PathBuf::from("/"));
    }

    #[test]
    fn test_relative_path_uses_current_dir() {
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(expand_path("sub/dir").unwrap(), clean_path(&cwd.join("sub/dir")));
        assert_eq!(expand_path(".").unwrap(), clean_path(&cwd));
    }

    #[test]
    fn test_home_expansion() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_path("~").unwrap(), clean_path(&home));
            assert_eq!(expand_path("~/Documents").unwrap(), clean_path(&home.join("Documents")));
        }
    }

    #[test]
    fn test_tilde_inside_name_is_literal() {
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(expand_path("~backup").unwrap(), clean_path(&cwd.join("~backup")));
    }
}
