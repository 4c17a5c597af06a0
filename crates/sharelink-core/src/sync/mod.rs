//! Tree synchronization between the share and the project

mod engine;
mod outcome;
mod report;

pub use engine::{setup_share_symlinks, TreeSynchronizer, MAX_DEPTH};
pub use outcome::SyncOutcome;
pub use report::{LinkReport, MissingEntry, SymlinkInfo};
