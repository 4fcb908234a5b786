//! Asset-bundle overlay
//!
//! A second graph layer composed on top of the finished base graph: one
//! virtual record per declared bundle, bundle-to-bundle links from the
//! declared dependency lists, bundle-to-member links from the declared
//! member paths, and a flood that tags every member's transitive dependents
//! with the bundle bit without re-parsing anything.

use std::collections::VecDeque;

use ahash::AHashMap;
use log::debug;
use romlink_parser::AssetUniqueId;

use crate::control::RunControl;
use crate::flags::IncludeFlags;
use crate::passes::normalize::link_order;
use crate::passes::BUNDLE_END;
use crate::progress::ProgressTracker;
use crate::snapshot::AnalysisSnapshot;
use crate::store::{AssetRecord, ResultStore};

/// One declared bundle as reported by the host
#[derive(Debug, Clone, Default)]
pub struct BundleSpec {
    pub name: String,
    pub asset_paths: Vec<String>,
    pub dependencies: Vec<String>,
}

/// All bundle tables gathered on the coordinating thread
#[derive(Debug, Clone, Default)]
pub struct BundleTables {
    pub bundles: Vec<BundleSpec>,
}

/// Apply the bundle overlay; returns false when cancelled
pub(crate) fn run(
    store: &ResultStore,
    snapshot: &AnalysisSnapshot,
    tables: &BundleTables,
    progress: &mut ProgressTracker,
    control: &RunControl,
) -> bool {
    if tables.bundles.is_empty() {
        progress.set_range(BUNDLE_END, 0);
        return true;
    }
    progress.set_range(
        BUNDLE_END,
        tables.bundles.len() * 2 + store.record_count(),
    );
    debug!("applying overlay for {} bundles", tables.bundles.len());

    // virtual bundle nodes plus the member-guid reverse table
    let mut guid_to_bundle: AHashMap<String, AssetUniqueId> = AHashMap::new();
    for spec in &tables.bundles {
        if !control.checkpoint() {
            return false;
        }
        let bundle_id = AssetUniqueId::from_bundle(&spec.name);
        store.records.insert(
            bundle_id.clone(),
            AssetRecord {
                state: IncludeFlags::ASSET_BUNDLE,
                ..Default::default()
            },
        );
        for path in &spec.asset_paths {
            if let Some(guid) = snapshot.index.guid_for_path(path) {
                guid_to_bundle.insert(guid.to_string(), bundle_id.clone());
            }
        }
        progress.increment();
    }

    // bundle-to-bundle links and inbound links from the dependency lists
    for spec in &tables.bundles {
        if !control.checkpoint() {
            return false;
        }
        let bundle_id = AssetUniqueId::from_bundle(&spec.name);
        for dependency in &spec.dependencies {
            let dependency_id = AssetUniqueId::from_bundle(dependency);
            if let Some(mut record) = store.records.get_mut(&bundle_id) {
                record.links.push(dependency_id.clone());
            }
            if let Some(mut record) = store.records.get_mut(&dependency_id) {
                record
                    .inbound_links
                    .get_or_insert_with(Vec::new)
                    .push(bundle_id.clone());
            }
        }
        progress.increment();
    }

    // bundle-to-member wiring, then flood the bundle bit through each
    // member's existing link graph
    let keys = store.record_ids();
    for key in keys {
        if !control.checkpoint() {
            return false;
        }
        if let Some(bundle_id) = guid_to_bundle.get(&key.guid) {
            if let Some(mut record) = store.records.get_mut(bundle_id) {
                record.links.push(key.clone());
            }
            if let Some(mut record) = store.records.get_mut(&key) {
                record
                    .inbound_links
                    .get_or_insert_with(Vec::new)
                    .push(bundle_id.clone());
            }

            let mut queue = VecDeque::from([key.clone()]);
            while let Some(current) = queue.pop_front() {
                let links = match store.records.get_mut(&current) {
                    Some(mut record) if !record.state.contains(IncludeFlags::ASSET_BUNDLE) => {
                        record.state |= IncludeFlags::ASSET_BUNDLE;
                        record.links.clone()
                    }
                    _ => continue,
                };
                queue.extend(links);
            }
        }
        progress.increment();
    }

    for spec in &tables.bundles {
        let bundle_id = AssetUniqueId::from_bundle(&spec.name);
        if let Some(mut record) = store.records.get_mut(&bundle_id) {
            record.links.sort_by(|a, b| link_order(a, b, &snapshot.index));
        }
    }
    true
}
