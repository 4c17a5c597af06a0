//! Root path resolution and target-name validation

use std::path::{Component, Path, PathBuf};

use crate::error::{Error, Result};

/// Conventional location of the shared-storage tree
pub const DEFAULT_SHARE_DIRECTORY: &str = "/share";

/// Top-level directory names mirrored when none are configured
pub const DEFAULT_TARGET_DIRECTORIES: &[&str] =
    &["models", "custom_nodes", "input", "output", "user"];

/// Make a root path absolute.
///
/// Existing paths are canonicalized so link targets never contain `..` or
/// intermediate symlinks; missing paths are joined onto the current directory.
pub fn resolve_root(path: &Path) -> PathBuf {
    if let Ok(canonical) = path.canonicalize() {
        return canonical;
    }
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

/// Check that a target name is a single plain path component
pub fn validate_target_name(name: &str) -> Result<()> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(Error::Config(format!(
            "Invalid target directory name '{}': must be a single path component",
            name
        ))),
    }
}

/// Validate target names, dropping duplicates while keeping first-seen order
pub fn normalize_targets<I, S>(targets: I) -> Result<Vec<String>>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut names: Vec<String> = Vec::new();
    for target in targets {
        let target = target.into();
        validate_target_name(&target)?;
        if !names.contains(&target) {
            names.push(target);
        }
    }
    Ok(names)
}
