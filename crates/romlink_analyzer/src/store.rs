//! Concurrent analysis result store
//!
//! Records are written exclusively by the worker while a run is in progress;
//! consumers read them concurrently through the query methods. Entry-level
//! locking keeps individual records consistent; the inbound-link index is
//! additionally gated behind a publish flag so a partially built transpose
//! is never observed.

use std::sync::atomic::{AtomicBool, Ordering};

use dashmap::DashMap;

use romlink_parser::AssetUniqueId;

use crate::flags::{IncludeFlags, Inclusion};

/// Analysis state of one identifier
#[derive(Debug, Clone, Default)]
pub struct AssetRecord {
    pub state: IncludeFlags,
    pub links: Vec<AssetUniqueId>,
    pub inbound_links: Option<Vec<AssetUniqueId>>,
    pub packing_tag: Option<String>,
}

/// All per-run analysis results; rebuilt from scratch on refresh
#[derive(Debug, Default)]
pub struct ResultStore {
    pub(crate) records: DashMap<AssetUniqueId, AssetRecord>,
    pub(crate) guid_verdicts: DashMap<String, Inclusion>,
    inbound_published: AtomicBool,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    /// Mark the inbound-link index complete and visible to readers
    pub(crate) fn publish_inbound(&self) {
        self.inbound_published.store(true, Ordering::Release);
    }

    pub(crate) fn inbound_published(&self) -> bool {
        self.inbound_published.load(Ordering::Acquire)
    }

    /// All identifiers visited so far, in canonical structural order
    pub fn record_ids(&self) -> Vec<AssetUniqueId> {
        let mut ids: Vec<AssetUniqueId> = self.records.iter().map(|r| r.key().clone()).collect();
        ids.sort_unstable();
        ids
    }

    /// Inclusion answer for one identifier.
    ///
    /// Primary-object queries prefer the file-level verdict so sub-object
    /// disagreement surfaces as `Ambiguous`; sub-object queries answer from
    /// the record alone.
    pub fn is_include(&self, id: &AssetUniqueId) -> Inclusion {
        if id.file_id == 0 {
            if let Some(verdict) = self.guid_verdicts.get(&id.guid) {
                return *verdict;
            }
        }
        match self.records.get(id) {
            Some(record) if !record.state.is_empty() => record.state.build_inclusion(),
            _ => Inclusion::Unknown,
        }
    }

    /// File-level verdict for a guid, if analysis reached it
    pub fn guid_verdict(&self, guid: &str) -> Inclusion {
        self.guid_verdicts
            .get(guid)
            .map(|v| *v)
            .unwrap_or(Inclusion::Unknown)
    }

    pub fn include_flags(&self, id: &AssetUniqueId) -> IncludeFlags {
        self.records
            .get(id)
            .map(|record| record.state)
            .unwrap_or_default()
    }

    /// Outbound links of an identifier; an unknown sub-object falls back to
    /// the file's primary object
    pub fn links(&self, id: &AssetUniqueId) -> Option<Vec<AssetUniqueId>> {
        match self.records.get(id) {
            Some(record) if !record.state.is_empty() => Some(record.links.clone()),
            _ if id.file_id != 0 => self.links(&id.primary()),
            _ => None,
        }
    }

    /// Inbound links; unknown until the reverse-index pass has published
    pub fn inbound_links(&self, id: &AssetUniqueId) -> Option<Vec<AssetUniqueId>> {
        if !self.inbound_published() {
            return None;
        }
        match self.records.get(id) {
            Some(record) if !record.state.is_empty() => {
                Some(record.inbound_links.clone().unwrap_or_default())
            }
            _ if id.file_id != 0 => self.inbound_links(&id.primary()),
            _ => None,
        }
    }

    /// Grouping tag carried by an identifier, with primary-object fallback
    pub fn packing_tag(&self, id: &AssetUniqueId) -> Option<String> {
        match self.records.get(id) {
            Some(record) if !record.state.is_empty() => record.packing_tag.clone(),
            _ if id.file_id != 0 => self.packing_tag(&id.primary()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn guid_a() -> String {
        "aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa".to_string()
    }

    #[test]
    fn test_unvisited_is_unknown() {
        let store = ResultStore::new();
        let id = AssetUniqueId::main(guid_a());
        assert_eq!(store.is_include(&id), Inclusion::Unknown);
        assert_eq!(store.include_flags(&id), IncludeFlags::empty());
        assert_eq!(store.links(&id), None);
    }

    #[test]
    fn test_sub_object_queries_fall_back_to_primary() {
        let store = ResultStore::new();
        let primary = AssetUniqueId::main(guid_a());
        store.records.insert(
            primary.clone(),
            AssetRecord {
                state: IncludeFlags::LINK,
                links: vec![AssetUniqueId::main("bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb")],
                inbound_links: None,
                packing_tag: Some("Atlas1".to_string()),
            },
        );

        let sub = AssetUniqueId::new(guid_a(), 42);
        assert_eq!(store.links(&sub).unwrap().len(), 1);
        assert_eq!(store.packing_tag(&sub).as_deref(), Some("Atlas1"));
    }

    #[test]
    fn test_inbound_hidden_until_published() {
        let store = ResultStore::new();
        let id = AssetUniqueId::main(guid_a());
        store.records.insert(
            id.clone(),
            AssetRecord {
                state: IncludeFlags::LINK,
                inbound_links: Some(vec![AssetUniqueId::main("bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb")]),
                ..Default::default()
            },
        );

        assert_eq!(store.inbound_links(&id), None);
        store.publish_inbound();
        assert_eq!(store.inbound_links(&id).unwrap().len(), 1);
    }

    #[test]
    fn test_primary_query_prefers_guid_verdict() {
        let store = ResultStore::new();
        let id = AssetUniqueId::main(guid_a());
        store.records.insert(
            id.clone(),
            AssetRecord {
                state: IncludeFlags::LINK,
                ..Default::default()
            },
        );
        store.guid_verdicts.insert(guid_a(), Inclusion::Ambiguous);

        assert_eq!(store.is_include(&id), Inclusion::Ambiguous);
        // sub-object answers come from the record alone
        store.records.insert(
            AssetUniqueId::new(guid_a(), 7),
            AssetRecord {
                state: IncludeFlags::NON_INCLUDE,
                ..Default::default()
            },
        );
        assert_eq!(
            store.is_include(&AssetUniqueId::new(guid_a(), 7)),
            Inclusion::Excluded
        );
    }
}
