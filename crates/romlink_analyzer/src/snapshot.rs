//! Immutable per-run snapshot of the host registry
//!
//! Built on the coordinating thread, then handed wholesale to the worker.
//! Neither side mutates it afterwards, so it crosses the thread boundary
//! without locks.

use std::path::PathBuf;

use romlink_parser::ProjectIndex;

/// Everything the worker needs from the host, frozen for one run
#[derive(Debug)]
pub struct AnalysisSnapshot {
    /// Directory the project-relative paths resolve against
    pub project_root: PathBuf,
    /// Bijective path/guid maps
    pub index: ProjectIndex,
    /// Scene paths registered for the build (or the active scene fallback)
    pub scene_paths: Vec<String>,
}
