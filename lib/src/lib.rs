//! # romlink
//!
//! Facade crate bundling the romlink toolkit: build-inclusion analysis for
//! game-engine asset projects.
//!
//! - [`romlink_parser`]: asset identity, descriptor classification, and
//!   line-oriented reference extraction
//! - [`romlink_analyzer`]: the reachability engine, reverse-link index,
//!   bundle overlay, and the incremental scheduler
//! - [`romlink_events`]: the shared error taxonomy and async event hub

pub use romlink_analyzer::{
    AnalysisSnapshot, AssetRecord, BundleSpec, BundleTables, FsProjectHost, IncludeFlags,
    Inclusion, LinkAnalyzer, ProjectHost, ResultStore, RunPhase,
};
pub use romlink_events::{Error, Result};
pub use romlink_parser::{AssetUniqueId, DescriptorKind, LinkInfo, ProjectIndex};
