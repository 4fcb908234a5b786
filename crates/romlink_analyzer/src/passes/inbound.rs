//! Inbound-link transpose
//!
//! For every record's outbound links, the record's own identifier is
//! appended to the target's inbound list. Virtual packing-tag nodes are
//! excluded as sources (they are aggregation points, not referrers) but
//! participate as targets. The result is published atomically by the caller
//! once the whole pass completes.

use log::trace;

use crate::control::RunControl;
use crate::passes::normalize::link_order;
use crate::progress::ProgressTracker;
use crate::snapshot::AnalysisSnapshot;
use crate::store::ResultStore;

/// Run the inbound-link pass; returns false when cancelled
pub(crate) fn run(
    store: &ResultStore,
    snapshot: &AnalysisSnapshot,
    progress: &mut ProgressTracker,
    control: &RunControl,
) -> bool {
    // snapshot the link lists first so per-entry locks are never nested
    let entries: Vec<_> = store
        .records
        .iter()
        .map(|record| (record.key().clone(), record.links.clone()))
        .collect();

    for (key, links) in &entries {
        if !control.checkpoint() {
            return false;
        }
        if key.is_packing_tag() {
            progress.increment();
            continue;
        }
        for link in links {
            let target = store
                .records
                .get_mut(link)
                .or_else(|| store.records.get_mut(&link.primary()));
            match target {
                Some(mut record) => record
                    .inbound_links
                    .get_or_insert_with(Vec::new)
                    .push(key.clone()),
                None => trace!("dangling link {link} from {key} skipped"),
            }
        }
        progress.increment();
    }

    for (key, _) in &entries {
        if !control.checkpoint() {
            return false;
        }
        if let Some(mut record) = store.records.get_mut(key) {
            if let Some(inbound) = &mut record.inbound_links {
                inbound.sort_by(|a, b| link_order(a, b, &snapshot.index));
            }
        }
        progress.increment();
    }
    true
}
