//! # romlink_parser
//!
//! Descriptor parsing engine for game-engine asset projects.
//!
//! This crate provides the foundational parsing capabilities for asset
//! descriptor text: two-part asset identity, extension-based descriptor
//! classification, the bijective path/guid project index, and line-oriented
//! reference extraction.
//!
//! ## Architecture
//!
//! The parser follows a layered approach:
//! 1. **Identity**: two-part `(guid, file_id)` identifiers with synthetic
//!    packing-tag and bundle namespaces layered on the same type
//! 2. **Classification**: maps a project-relative path to a descriptor kind
//!    that decides which file to read and how to scan it
//! 3. **Indexing**: immutable path/guid maps snapshotted per analysis run
//! 4. **Reference extraction**: line-oriented scanning for link markers,
//!    sub-object boundaries, grouping tags, and recycled-name tables
//!
//! Missing or unreadable descriptor text is not an error; it simply yields
//! no references, which lets analysis degrade gracefully.

pub mod descriptor;
pub mod ident;
pub mod index;
pub mod kind;

pub use descriptor::{guid_in_line, parse_lines, parse_links, LinkInfo};
pub use ident::{AssetUniqueId, ASSET_BUNDLE_PREFIX, SPRITE_PACKING_TAG_PREFIX};
pub use index::ProjectIndex;
pub use kind::{classify, classify_at, DescriptorKind, ASSETS_PREFIX, STREAMING_ASSETS_PREFIX};

// Re-export from dependencies
pub use romlink_events::error::Result;
