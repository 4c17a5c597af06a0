//! # sharelink-core
//!
//! Incrementally mirrors well-known subdirectories of a shared-storage tree
//! into a project directory using symbolic links instead of copies, so large
//! assets can live on persistent storage while appearing inside the
//! application's working directory.
//!
//! ## Modules
//!
//! - [`config`] - Roots, target names and config file handling
//! - [`error`] - Error types and Result alias
//! - [`link`] - Symbolic link primitives
//! - [`sync`] - The recursive synchronizer, its outcome and inspection report
//!
//! ## Example
//!
//! ```no_run
//! use sharelink_core::TreeSynchronizer;
//!
//! let sync = TreeSynchronizer::new("/srv/app", "/share");
//! let outcome = sync.create_symlinks();
//! println!(
//!     "Created {} links and {} directories",
//!     outcome.links.len(),
//!     outcome.directories.len()
//! );
//! ```

pub mod config;
pub mod error;
pub mod link;
pub mod sync;

// Error types
pub use error::{Error, Result};

// Configuration
pub use config::{SyncConfig, DEFAULT_SHARE_DIRECTORY, DEFAULT_TARGET_DIRECTORIES};

// Synchronizer
pub use sync::{
    setup_share_symlinks, LinkReport, MissingEntry, SymlinkInfo, SyncOutcome, TreeSynchronizer,
};
