//! Sub-object id normalization
//!
//! References to a `(guid, file_id)` pair that was never observed as an
//! actual sub-object are rewritten to the file's primary object; rewrites
//! that collapse into self-references are pruned, and every link list ends
//! up sorted in the canonical path order.

use std::cmp::Ordering;

use romlink_parser::{AssetUniqueId, ProjectIndex};

use crate::control::RunControl;
use crate::progress::ProgressTracker;
use crate::snapshot::AnalysisSnapshot;
use crate::store::ResultStore;

/// Canonical ordering of link lists: by the resolved path of the guid, then
/// by file id; unresolved and virtual guids sort last.
///
/// A pure function over the immutable index snapshot, so it is safe to call
/// from any context.
pub fn link_order(a: &AssetUniqueId, b: &AssetUniqueId, index: &ProjectIndex) -> Ordering {
    match (index.path_for_guid(&a.guid), index.path_for_guid(&b.guid)) {
        (Some(path_a), Some(path_b)) => path_a.cmp(path_b).then(a.file_id.cmp(&b.file_id)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

/// Run the normalization pass; returns false when cancelled
pub(crate) fn run(
    store: &ResultStore,
    snapshot: &AnalysisSnapshot,
    progress: &mut ProgressTracker,
    control: &RunControl,
) -> bool {
    for key in store.record_ids() {
        if !control.checkpoint() {
            return false;
        }
        let links = match store.records.get(&key) {
            Some(record) if !record.links.is_empty() => record.links.clone(),
            _ => {
                progress.increment();
                continue;
            }
        };

        let mut rewritten: Vec<AssetUniqueId> = Vec::with_capacity(links.len());
        for mut link in links {
            if link.file_id != 0 && !store.records.contains_key(&link) {
                let candidate = link.primary();
                if candidate == key {
                    continue;
                }
                if store.records.contains_key(&candidate) {
                    link = candidate;
                }
            }
            rewritten.push(link);
        }
        rewritten.sort_by(|a, b| link_order(a, b, &snapshot.index));
        rewritten.dedup();

        if let Some(mut record) = store.records.get_mut(&key) {
            record.links = rewritten;
        }
        progress.increment();
    }
    true
}
