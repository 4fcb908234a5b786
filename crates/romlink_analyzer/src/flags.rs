//! Inclusion state flags and verdicts
//!
//! A record's state is a bitset: either the single excluded bit, or any
//! combination of inclusion-reason bits. The asset-bundle bit is an overlay
//! attribute, not an inclusion reason, so it is masked out when deciding
//! whether a build ships an asset.

use bitflags::bitflags;

bitflags! {
    /// Why (or that) an identifier is carried by a build
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct IncludeFlags: u32 {
        /// Visited and confirmed excluded
        const NON_INCLUDE = 1 << 0;
        /// Carried by a named asset bundle (overlay attribute)
        const ASSET_BUNDLE = 1 << 1;
        /// Reached through a reference from an included asset
        const LINK = 1 << 2;
        /// Compiled source file
        const SCRIPTS = 1 << 3;
        /// Lives under a resource-lookup folder
        const RESOURCES = 1 << 4;
        /// Lives under the streaming-assets folder
        const STREAMING_ASSETS = 1 << 5;
        /// Scene registered in the build list
        const SCENES_IN_BUILD = 1 << 6;
        /// Referenced by the always-included shader settings
        const ALWAYS_INCLUDED_SHADERS = 1 << 7;
    }
}

/// Terminal inclusion classification of an identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Inclusion {
    /// Visited, not carried by the build
    Excluded,
    /// Carried by the build
    Included,
    /// Not analyzed (yet)
    Unknown,
    /// The file's sub-objects disagree
    Ambiguous,
}

impl IncludeFlags {
    /// Build-inclusion answer for a single record.
    ///
    /// The excluded and bundle bits are masked out; anything left means the
    /// build ships this identifier for that reason.
    pub fn build_inclusion(self) -> Inclusion {
        if self.is_empty() {
            return Inclusion::Unknown;
        }
        let reasons = self - (IncludeFlags::NON_INCLUDE | IncludeFlags::ASSET_BUNDLE);
        if reasons.is_empty() {
            Inclusion::Excluded
        } else {
            Inclusion::Included
        }
    }

    /// File-level verdict used for the per-guid map
    pub fn verdict(self) -> Inclusion {
        if self.is_empty() {
            Inclusion::Unknown
        } else if self == IncludeFlags::NON_INCLUDE {
            Inclusion::Excluded
        } else {
            Inclusion::Included
        }
    }
}
