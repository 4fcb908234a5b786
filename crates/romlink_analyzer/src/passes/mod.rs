//! Worker-side analysis passes
//!
//! The passes run in a fixed order over the immutable snapshot, writing into
//! the shared record store: reachability (source classification, root flood,
//! leftover exclusion), sub-object id normalization, the inbound-link
//! transpose, and finally the optional bundle overlay. Each pass polls the
//! run control between records so suspension and cancellation take effect at
//! record granularity.

pub mod bundle;
pub mod inbound;
pub mod normalize;
pub mod reach;

use romlink_events::emit_global_sync;
use romlink_events::event::{AnalyzerEvent, Event};

use crate::control::RunControl;
use crate::progress::ProgressTracker;
use crate::snapshot::AnalysisSnapshot;
use crate::store::ResultStore;

/// Progress milestones, as fractions of the whole run
pub const MAPPING_END: f32 = 0.01;
pub const REACH_END: f32 = 0.94;
pub const NORMALIZE_END: f32 = 0.95;
pub const INBOUND_END: f32 = 1.0;
pub const BUNDLE_TABLES_END: f32 = 0.90;
pub const BUNDLE_END: f32 = 1.0;

fn pass_completed(pass: &str, store: &ResultStore) {
    emit_global_sync!(Event::Analyzer(AnalyzerEvent::PassCompleted {
        pass: pass.to_string(),
        records: store.record_count(),
    }));
}

/// Run the main graph passes; returns false when cancelled
pub(crate) fn run_graph_passes(
    snapshot: &AnalysisSnapshot,
    store: &ResultStore,
    progress: &mut ProgressTracker,
    control: &RunControl,
) -> bool {
    progress.set_range(REACH_END, snapshot.index.len());
    let mut engine = reach::ReachEngine::new(snapshot, store);
    if !engine.classify_sources(progress, control) {
        return false;
    }
    if !engine.flood_from_roots(progress, control) {
        return false;
    }
    if !engine.exclude_leftovers(progress, control) {
        return false;
    }
    pass_completed("reachability", store);

    progress.set_range(NORMALIZE_END, store.record_count());
    if !normalize::run(store, snapshot, progress, control) {
        return false;
    }
    pass_completed("normalize", store);

    progress.set_range(INBOUND_END, store.record_count() * 2);
    if !inbound::run(store, snapshot, progress, control) {
        return false;
    }
    store.publish_inbound();
    pass_completed("inbound", store);

    true
}
