//! Per-run synchronization results

use serde::Serialize;
use std::path::PathBuf;

/// Result of a synchronization pass.
///
/// Paths are relative to the project root. Built fresh on every call and
/// never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncOutcome {
    /// Symbolic links created, in creation order
    pub links: Vec<PathBuf>,
    /// Directories created, in creation order
    pub directories: Vec<PathBuf>,
    /// Top-level names with no source counterpart or nothing new to mirror
    pub skipped: Vec<String>,
}

impl SyncOutcome {
    /// Create a new empty outcome
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` if nothing was created (skipped names are not changes)
    pub fn is_empty(&self) -> bool {
        self.links.is_empty() && self.directories.is_empty()
    }

    /// Number of links plus directories created
    pub fn total_changes(&self) -> usize {
        self.links.len() + self.directories.len()
    }

    /// Merge another outcome into this one, keeping order
    pub fn merge(&mut self, other: SyncOutcome) {
        self.links.extend(other.links);
        self.directories.extend(other.directories);
        self.skipped.extend(other.skipped);
    }
}

pub(crate) fn join_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
