//! # romlink_analyzer
//!
//! Build-inclusion analysis engine for game-engine asset projects.
//!
//! Determines, for every asset in a project, whether a build would carry it
//! and why: reachable from a registered scene, pulled in through a
//! reference chain, located under a resource-lookup or streaming folder,
//! compiled as source, or required by the always-included settings. The
//! resulting graph answers point queries, reverse-link queries, and
//! grouping-tag queries while analysis runs incrementally in the
//! background.
//!
//! ## Key Features
//!
//! - **Incremental**: host-registry work runs in time-boxed slices on the
//!   coordinating thread; graph computation runs on one background worker
//! - **Cooperative control**: suspend, resume, refresh, and dispose take
//!   effect at record boundaries, never by aborting a thread
//! - **Always converges**: missing text, broken references, and unknown
//!   formats degrade to excluded or ambiguous verdicts, never errors
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use romlink_analyzer::{FsProjectHost, Inclusion, LinkAnalyzer};
//!
//! # fn main() -> romlink_analyzer::Result<()> {
//! let host = Arc::new(FsProjectHost::open("/path/to/project")?);
//! let mut analyzer = LinkAnalyzer::new(host);
//! analyzer.run_to_completion()?;
//!
//! match analyzer.is_include_from_path("Assets/Textures/rock.png") {
//!     Inclusion::Included => println!("shipped"),
//!     Inclusion::Excluded => println!("stripped"),
//!     verdict => println!("{verdict:?}"),
//! }
//! # Ok(())
//! # }
//! ```

pub mod analyzer;
pub mod control;
pub mod flags;
pub mod host;
pub mod passes;
pub mod progress;
pub mod snapshot;
pub mod store;

// Re-export key types
pub use analyzer::LinkAnalyzer;
pub use control::RunPhase;
pub use flags::{IncludeFlags, Inclusion};
pub use host::{FsProjectHost, ProjectHost};
pub use passes::bundle::{BundleSpec, BundleTables};
pub use passes::normalize::link_order;
pub use snapshot::AnalysisSnapshot;
pub use store::{AssetRecord, ResultStore};

// Re-export from dependencies
pub use romlink_events::error::Result;
pub use romlink_parser::{AssetUniqueId, DescriptorKind, ProjectIndex};
