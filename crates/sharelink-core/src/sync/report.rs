//! Read-only inspection of the configured top-level names

use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// A top-level destination entry that is a symbolic link
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SymlinkInfo {
    /// Location of the link inside the project
    pub target: PathBuf,
    /// Resolved real path the link points at
    pub source: PathBuf,
    /// Whether the resolved path currently exists
    pub exists: bool,
}

/// A top-level name absent from the project
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingEntry {
    /// Where the name would be found in the share
    pub share_path: PathBuf,
    /// Whether the share currently has it (a sync would mirror it)
    pub available_in_share: bool,
}

/// Classification of every configured name into exactly one bucket
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LinkReport {
    pub project_root: PathBuf,
    pub share_directory: PathBuf,
    pub symlinks: BTreeMap<String, SymlinkInfo>,
    pub existing_directories: BTreeMap<String, PathBuf>,
    pub missing_in_share: BTreeMap<String, MissingEntry>,
}

impl LinkReport {
    /// Links whose target no longer resolves
    pub fn broken_links(&self) -> impl Iterator<Item = &str> {
        self.symlinks
            .iter()
            .filter(|(_, info)| !info.exists)
            .map(|(name, _)| name.as_str())
    }

    /// Total number of names classified
    pub fn len(&self) -> usize {
        self.symlinks.len() + self.existing_directories.len() + self.missing_in_share.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Display for LinkReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Project root:    {}", self.project_root.display())?;
        writeln!(f, "Share directory: {}", self.share_directory.display())?;

        for (name, info) in &self.symlinks {
            let state = if info.exists { "ok" } else { "broken" };
            writeln!(
                f,
                "  [link]     {} -> {} ({})",
                name,
                info.source.display(),
                state
            )?;
        }
        for (name, path) in &self.existing_directories {
            writeln!(f, "  [present]  {} ({})", name, path.display())?;
        }
        for (name, missing) in &self.missing_in_share {
            let note = if missing.available_in_share {
                "available in share"
            } else {
                "not in share"
            };
            writeln!(f, "  [missing]  {} ({})", name, note)?;
        }
        Ok(())
    }
}
