//! Symbolic link primitives.
//!
//! Thin wrappers over the platform link calls that the synchronizer builds on.
//! POSIX symlink semantics are assumed; on platforms without `std::os::unix`
//! every creation attempt fails with [`Error::Io`] of kind
//! [`io::ErrorKind::Unsupported`] and the caller logs it like any other
//! per-entry failure.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Error, Result};

/// Creates a symbolic link at `link` resolving to `source`.
///
/// The parent directory chain of `link` is created first (idempotently).
/// Nothing that already exists at `link` is ever replaced.
///
/// # Errors
///
/// - [`Error::SourceNotFound`] if `source` vanished before the link was made
/// - [`Error::LinkExists`] if something appeared at `link` in the meantime
/// - [`Error::Io`] for any other OS-level failure
pub fn create_link(source: &Path, link: &Path) -> Result<()> {
    if fs::symlink_metadata(source).is_err() {
        return Err(Error::SourceNotFound(source.to_path_buf()));
    }

    if let Some(parent) = link.parent() {
        fs::create_dir_all(parent)?;
    }

    debug!("Creating symlink: {} -> {}", link.display(), source.display());

    match platform_symlink(source, link) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            Err(Error::LinkExists(link.to_path_buf()))
        }
        Err(e) => Err(Error::Io(e)),
    }
}

/// Returns `true` if `path` itself is a symbolic link (dangling or not).
pub fn is_link(path: &Path) -> bool {
    path.symlink_metadata()
        .map(|m| m.file_type().is_symlink())
        .unwrap_or(false)
}

/// Reads the immediate target of a symbolic link.
pub fn read_link(path: &Path) -> Result<PathBuf> {
    if !is_link(path) {
        return Err(Error::NotALink(path.to_path_buf()));
    }
    Ok(fs::read_link(path)?)
}

/// Removes a symbolic link without touching what it points at.
///
/// Refuses to remove anything that is not a link, so a real directory that
/// happens to share a name with a link target is never deleted.
pub fn remove_link(path: &Path) -> Result<()> {
    if !is_link(path) {
        return Err(Error::NotALink(path.to_path_buf()));
    }
    fs::remove_file(path)?;
    Ok(())
}

#[cfg(unix)]
fn platform_symlink(source: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(source, link)
}

#[cfg(not(unix))]
fn platform_symlink(source: &Path, link: &Path) -> io::Result<()> {
    let _ = (source, link);
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "symbolic links are not supported on this platform",
    ))
}
