//! Recursive share-to-project synchronization engine
//!
//! The engine walks a share subtree and the matching project subtree in
//! lock-step and decides, per entry, whether to create a directory, create a
//! symbolic link or leave the destination alone. Anything already present in
//! the project always wins: nothing is overwritten or converted.
//!
//! Per level, files are linked before subdirectories are considered. A
//! subdirectory missing from the project is linked as a whole only when it has
//! no files among its immediate children; otherwise the directory is created
//! and its entries are linked one by one, so the project can keep receiving
//! new entries under that name on later runs.
//!
//! Top-level names follow the same idea with a stricter test: a single link is
//! made only when the whole share subtree contains no files at all.

use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

use crate::config::{normalize_targets, resolve_root, SyncConfig, DEFAULT_SHARE_DIRECTORY};
use crate::error::{Error, Result};
use crate::link;

use super::outcome::{join_paths, SyncOutcome};
use super::report::{LinkReport, MissingEntry, SymlinkInfo};

/// Recursion limit guarding against directory cycles in the share
pub const MAX_DEPTH: usize = 64;

/// Directory enumeration used for share levels
pub(crate) type ReadDirFn = fn(&Path) -> io::Result<fs::ReadDir>;

/// Mirrors configured top-level directories of a share into a project tree.
///
/// Holds no state between calls apart from its roots and target names.
#[derive(Clone)]
pub struct TreeSynchronizer {
    project_root: PathBuf,
    share_directory: PathBuf,
    target_directories: Vec<String>,
    read_dir: ReadDirFn,
}

impl std::fmt::Debug for TreeSynchronizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TreeSynchronizer")
            .field("project_root", &self.project_root)
            .field("share_directory", &self.share_directory)
            .field("target_directories", &self.target_directories)
            .finish_non_exhaustive()
    }
}

impl TreeSynchronizer {
    /// Create a synchronizer with the default target set.
    ///
    /// Both roots are made absolute so created links never depend on the
    /// working directory.
    pub fn new(project_root: impl AsRef<Path>, share_directory: impl AsRef<Path>) -> Self {
        let defaults = SyncConfig::default();
        Self {
            project_root: resolve_root(project_root.as_ref()),
            share_directory: resolve_root(share_directory.as_ref()),
            target_directories: defaults.target_directories,
            read_dir: read_share_dir,
        }
    }

    /// Create a synchronizer from a loaded config
    pub fn from_config(config: &SyncConfig) -> Self {
        Self {
            project_root: resolve_root(&config.project_root),
            share_directory: resolve_root(&config.share_directory),
            target_directories: config.target_directories.clone(),
            read_dir: read_share_dir,
        }
    }

    /// Replace the target set
    pub fn with_targets<I, S>(mut self, targets: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names = normalize_targets(targets)?;
        self.target_directories = names;
        Ok(self)
    }

    /// Swap the share enumeration, e.g. to inject failures
    pub(crate) fn with_read_dir(mut self, read_dir: ReadDirFn) -> Self {
        self.read_dir = read_dir;
        self
    }

    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn share_directory(&self) -> &Path {
        &self.share_directory
    }

    pub fn target_directories(&self) -> &[String] {
        &self.target_directories
    }

    /// Run one incremental sync pass over every configured name.
    ///
    /// Never fails: a missing share is a warning and yields an empty outcome,
    /// and every per-entry failure is logged and isolated.
    pub fn create_symlinks(&self) -> SyncOutcome {
        let mut outcome = SyncOutcome::new();

        if !self.share_directory.is_dir() {
            warn!(
                "Share directory {} does not exist, skipping symlink creation",
                self.share_directory.display()
            );
            return outcome;
        }

        info!(
            "Starting incremental sync from {} to {}",
            self.share_directory.display(),
            self.project_root.display()
        );

        for name in &self.target_directories {
            outcome.merge(self.sync_target(name));
        }

        if !outcome.directories.is_empty() {
            info!(
                "Successfully created directories: {}",
                join_paths(&outcome.directories)
            );
        }
        if !outcome.links.is_empty() {
            info!(
                "Successfully created symlinks for: {}",
                join_paths(&outcome.links)
            );
        }
        if !outcome.skipped.is_empty() {
            info!("Skipped items: {}", outcome.skipped.join(", "));
        }

        outcome
    }

    fn sync_target(&self, name: &str) -> SyncOutcome {
        let source = self.share_directory.join(name);
        let dest = self.project_root.join(name);
        let existed = link::is_link(&dest) || dest.exists();

        let mut outcome = self.synchronize(&source, &dest);
        if existed && outcome.is_empty() && outcome.skipped.is_empty() {
            outcome.skipped.push(name.to_string());
        }
        outcome
    }

    /// Mirror `source` into `dest` recursively.
    ///
    /// A missing `dest` is materialized first: as one link when the source
    /// subtree holds no files at any depth, otherwise as a directory that is
    /// then filled entry by entry. An existing `dest` that is a symlink or not
    /// a directory is left alone.
    ///
    /// Errors while enumerating a level abandon that level only; whatever was
    /// created before the failure is still reported.
    pub fn synchronize(&self, source: &Path, dest: &Path) -> SyncOutcome {
        let mut outcome = SyncOutcome::new();

        if !source.is_dir() {
            debug!("Source {} does not exist in share directory", source.display());
            if let Some(name) = dest.file_name() {
                outcome.skipped.push(name.to_string_lossy().into_owned());
            }
            return outcome;
        }

        if link::is_link(dest) {
            debug!("Skipping {} (already a symlink)", dest.display());
            return outcome;
        }

        if dest.exists() {
            if dest.is_dir() {
                debug!("Target {} already exists, scanning for new entries", dest.display());
                self.sync_level(source, dest, 0, &mut outcome);
            } else {
                debug!("Skipping {} (exists and is not a directory)", dest.display());
            }
            return outcome;
        }

        let file_free = match subtree_is_file_free(source) {
            Ok(file_free) => file_free,
            Err(e) => {
                warn!(
                    "Could not fully scan {}, linking its entries individually: {}",
                    source.display(),
                    e
                );
                false
            }
        };

        if file_free {
            if self.create_symlink(source, dest) {
                outcome.links.push(self.relative(dest));
            }
        } else if self.ensure_directory(dest) {
            outcome.directories.push(self.relative(dest));
            self.sync_level(source, dest, 0, &mut outcome);
        }

        outcome
    }

    fn sync_level(&self, source: &Path, dest: &Path, depth: usize, outcome: &mut SyncOutcome) {
        if depth > MAX_DEPTH {
            warn!(
                "Not descending into {}: nesting deeper than {} levels",
                source.display(),
                MAX_DEPTH
            );
            return;
        }

        if let Err(e) = self.scan_and_link(source, dest, depth, outcome) {
            match &e {
                Error::Io(io) if io.kind() == io::ErrorKind::PermissionDenied => {
                    warn!("Permission denied scanning {}: {}", source.display(), e);
                }
                _ => error!("Error scanning {}: {}", source.display(), e),
            }
        }
    }

    fn scan_and_link(
        &self,
        source: &Path,
        dest: &Path,
        depth: usize,
        outcome: &mut SyncOutcome,
    ) -> Result<()> {
        let (files, dirs) = list_entries(self.read_dir, source)?;

        // Files first so a mixed directory still gets its files linked
        for name in files {
            let source_item = source.join(&name);
            let dest_item = dest.join(&name);

            if dest_item.exists() {
                debug!("Skipping {} (already exists)", dest_item.display());
                continue;
            }

            if self.create_symlink(&source_item, &dest_item) {
                outcome.links.push(self.relative(&dest_item));
            }
        }

        for name in dirs {
            let source_item = source.join(&name);
            let dest_item = dest.join(&name);

            if link::is_link(&dest_item) {
                debug!("Skipping {} (already a symlink)", dest_item.display());
                continue;
            }

            if dest_item.exists() {
                if dest_item.is_dir() {
                    debug!(
                        "Target {} already exists, scanning for new entries",
                        dest_item.display()
                    );
                    self.sync_level(&source_item, &dest_item, depth + 1, outcome);
                } else {
                    debug!("Skipping {} (exists and is not a directory)", dest_item.display());
                }
                continue;
            }

            match has_direct_files(self.read_dir, &source_item) {
                Ok(true) => {
                    if self.ensure_directory(&dest_item) {
                        outcome.directories.push(self.relative(&dest_item));
                        self.sync_level(&source_item, &dest_item, depth + 1, outcome);
                    }
                }
                Ok(false) => {
                    if self.create_symlink(&source_item, &dest_item) {
                        outcome.links.push(self.relative(&dest_item));
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
                    warn!("Permission denied scanning {}: {}", source_item.display(), e);
                }
                Err(e) => {
                    error!("Error scanning {}: {}", source_item.display(), e);
                }
            }
        }

        Ok(())
    }

    /// Create a symbolic link at `dest` resolving to `source`.
    ///
    /// Returns `false` instead of failing. Something appearing at `dest`
    /// between the existence check and the link call is treated exactly like
    /// an entry that was already there.
    pub fn create_symlink(&self, source: &Path, dest: &Path) -> bool {
        match link::create_link(source, dest) {
            Ok(()) => {
                info!("Created symlink: {} -> {}", dest.display(), source.display());
                true
            }
            Err(Error::LinkExists(_)) => {
                debug!("Skipping {} (appeared before it could be linked)", dest.display());
                false
            }
            Err(e) => {
                error!(
                    "Failed to create symlink {} -> {}: {}",
                    dest.display(),
                    source.display(),
                    e
                );
                false
            }
        }
    }

    fn ensure_directory(&self, dest: &Path) -> bool {
        match fs::create_dir_all(dest) {
            Ok(()) => {
                debug!("Created directory: {}", dest.display());
                true
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                debug!("Skipping {} (appeared before it could be created)", dest.display());
                false
            }
            Err(e) => {
                error!("Failed to create directory {}: {}", dest.display(), e);
                false
            }
        }
    }

    /// Unlink every configured top-level name that is currently a symlink.
    ///
    /// Real directories and files are left alone. Returns the removed names.
    pub fn remove_symlinks(&self) -> Vec<String> {
        let mut removed = Vec::new();

        for name in &self.target_directories {
            let dest = self.project_root.join(name);
            if !link::is_link(&dest) {
                continue;
            }
            match link::remove_link(&dest) {
                Ok(()) => {
                    info!("Removed symlink: {}", dest.display());
                    removed.push(name.clone());
                }
                Err(e) => error!("Failed to remove symlink {}: {}", dest.display(), e),
            }
        }

        if !removed.is_empty() {
            info!("Removed symlinks: {}", removed.join(", "));
        }
        removed
    }

    /// Configured top-level names that are currently symlinks
    pub fn list_symlinks(&self) -> Vec<String> {
        self.target_directories
            .iter()
            .filter(|name| link::is_link(&self.project_root.join(name)))
            .cloned()
            .collect()
    }

    /// Classify every configured top-level name.
    pub fn inspect(&self) -> LinkReport {
        let mut report = LinkReport {
            project_root: self.project_root.clone(),
            share_directory: self.share_directory.clone(),
            ..Default::default()
        };

        for name in &self.target_directories {
            let share_path = self.share_directory.join(name);
            let dest = self.project_root.join(name);

            if link::is_link(&dest) {
                report.symlinks.insert(
                    name.clone(),
                    SymlinkInfo {
                        source: resolve_link(&dest),
                        exists: dest.exists(),
                        target: dest,
                    },
                );
            } else if dest.exists() {
                report.existing_directories.insert(name.clone(), dest);
            } else {
                report.missing_in_share.insert(
                    name.clone(),
                    MissingEntry {
                        available_in_share: share_path.exists(),
                        share_path,
                    },
                );
            }
        }

        report
    }

    fn relative(&self, path: &Path) -> PathBuf {
        path.strip_prefix(&self.project_root)
            .unwrap_or(path)
            .to_path_buf()
    }
}

/// Build a synchronizer for the given roots and run one full pass.
///
/// `share_directory` defaults to `/share`.
pub fn setup_share_symlinks(
    project_root: impl AsRef<Path>,
    share_directory: Option<&Path>,
) -> SyncOutcome {
    let share = share_directory.unwrap_or_else(|| Path::new(DEFAULT_SHARE_DIRECTORY));
    TreeSynchronizer::new(project_root, share).create_symlinks()
}

/// Immediate children of `dir`, split into files and directories, sorted.
///
/// Type checks follow symlinks; dangling entries are neither and are dropped.
fn read_share_dir(dir: &Path) -> io::Result<fs::ReadDir> {
    fs::read_dir(dir)
}

fn list_entries(read_dir: ReadDirFn, dir: &Path) -> Result<(Vec<OsString>, Vec<OsString>)> {
    let mut files = Vec::new();
    let mut dirs = Vec::new();

    for entry in read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_file() {
            files.push(entry.file_name());
        } else if path.is_dir() {
            dirs.push(entry.file_name());
        } else {
            debug!("Ignoring {} (neither file nor directory)", path.display());
        }
    }

    files.sort();
    dirs.sort();
    Ok((files, dirs))
}

fn has_direct_files(read_dir: ReadDirFn, dir: &Path) -> io::Result<bool> {
    for entry in read_dir(dir)? {
        if entry?.path().is_file() {
            return Ok(true);
        }
    }
    Ok(false)
}

fn subtree_is_file_free(dir: &Path) -> Result<bool> {
    for entry in WalkDir::new(dir).min_depth(1).follow_links(true) {
        if entry?.file_type().is_file() {
            return Ok(false);
        }
    }
    Ok(true)
}

fn resolve_link(path: &Path) -> PathBuf {
    if let Ok(real) = path.canonicalize() {
        return real;
    }
    // Dangling: report the stored target, anchored at the link's directory
    match link::read_link(path) {
        Ok(target) if target.is_relative() => path
            .parent()
            .map(|parent| parent.join(&target))
            .unwrap_or(target),
        Ok(target) => target,
        Err(_) => path.to_path_buf(),
    }
}
