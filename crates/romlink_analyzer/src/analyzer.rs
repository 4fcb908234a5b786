//! Analysis scheduler and query surface
//!
//! `LinkAnalyzer` owns the run state machine. Steps touching the host's
//! live registry execute on the coordinating thread inside `tick()` in
//! time-boxed slices; everything that only needs the frozen snapshot runs on
//! one background worker. Consumers query results at any time; partial
//! results are visible while a run is in progress.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::debug;
use romlink_events::emit_global_sync;
use romlink_events::error::{AnalyzerErrorKind, Error, Result};
use romlink_events::event::{AnalyzerEvent, Event};
use romlink_parser::{AssetUniqueId, ProjectIndex, ASSETS_PREFIX};

use crate::control::{RunControl, RunPhase};
use crate::flags::{IncludeFlags, Inclusion};
use crate::host::ProjectHost;
use crate::passes::bundle::{BundleSpec, BundleTables};
use crate::passes::{self, BUNDLE_TABLES_END, MAPPING_END};
use crate::progress::ProgressTracker;
use crate::snapshot::AnalysisSnapshot;
use crate::store::ResultStore;

/// Per-entry time budget of a coordinating-thread slice
const TICK_BUDGET: Duration = Duration::from_millis(16);

/// Coordinating-thread state while the path/guid maps are being built
struct MappingState {
    paths: Vec<String>,
    next: usize,
    index: ProjectIndex,
    scene_paths: Vec<String>,
    tracker: ProgressTracker,
}

/// Coordinating-thread state while the bundle tables are being gathered
struct BundleGather {
    names: Vec<String>,
    next: usize,
    tables: BundleTables,
    tracker: ProgressTracker,
}

/// Incremental build-inclusion analyzer
pub struct LinkAnalyzer {
    host: Arc<dyn ProjectHost>,
    store: Arc<ResultStore>,
    control: Arc<RunControl>,
    snapshot: Option<Arc<AnalysisSnapshot>>,
    mapping: Option<MappingState>,
    bundle_gather: Option<BundleGather>,
    worker: Option<JoinHandle<()>>,
    disposed: bool,
}

impl LinkAnalyzer {
    pub fn new(host: Arc<dyn ProjectHost>) -> Self {
        Self {
            host,
            store: Arc::new(ResultStore::new()),
            control: Arc::new(RunControl::new()),
            snapshot: None,
            mapping: None,
            bundle_gather: None,
            worker: None,
            disposed: false,
        }
    }

    // === Run lifecycle ===

    /// Begin analysis. A no-op when a run already started; `refresh` forces
    /// a restart.
    pub fn start(&mut self) -> Result<()> {
        if self.disposed {
            return Err(Error::analyzer(
                "start called after dispose",
                AnalyzerErrorKind::Disposed,
            ));
        }
        if self.control.phase() != RunPhase::Idle {
            return Ok(());
        }
        self.control.mark_started();
        self.control.set_phase(RunPhase::Mapping);
        Ok(())
    }

    /// Cancel any in-flight run, discard all results, and restart from zero
    pub fn refresh(&mut self) {
        if self.disposed {
            return;
        }
        self.cancel_current_run();
        self.store = Arc::new(ResultStore::new());
        self.control = Arc::new(RunControl::new());
        self.snapshot = None;
        self.mapping = None;
        self.bundle_gather = None;
        let _ = self.start();
    }

    /// Park the background worker at its next record boundary
    pub fn suspend(&mut self) {
        if self.disposed || !self.analyzing() || self.control.is_paused() {
            return;
        }
        self.control.set_paused(true);
        emit_global_sync!(Event::Analyzer(AnalyzerEvent::Suspended));
    }

    /// Resume a suspended worker from its checkpoint
    pub fn resume(&mut self) {
        if self.disposed || !self.control.is_paused() {
            return;
        }
        self.control.set_paused(false);
        emit_global_sync!(Event::Analyzer(AnalyzerEvent::Resumed));
    }

    /// Cancel and release everything; the analyzer is unusable afterwards
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.cancel_current_run();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
        self.control.set_phase(RunPhase::Idle);
        self.mapping = None;
        self.bundle_gather = None;
        self.disposed = true;
    }

    /// Whether a run is in progress
    pub fn analyzing(&self) -> bool {
        self.control.phase().is_active()
    }

    /// Monotonic progress, clamped below 1.0 while analyzing
    pub fn progress(&self) -> f32 {
        let progress = self.control.progress_value();
        if self.analyzing() {
            progress.min(1.0 - f32::EPSILON)
        } else {
            progress
        }
    }

    /// Coordinating-thread slice; the host calls this once per tick.
    ///
    /// Each entry runs at most `TICK_BUDGET` of registry work and yields.
    pub fn tick(&mut self) {
        if self.disposed || self.control.is_paused() {
            return;
        }
        match self.control.phase() {
            RunPhase::Mapping => self.tick_mapping(),
            RunPhase::BundleTables => self.tick_bundle_tables(),
            _ => {}
        }
    }

    /// Drive a run to completion by ticking; meant for hosts without their
    /// own tick loop and for tests. Do not call while suspended.
    pub fn run_to_completion(&mut self) -> Result<()> {
        self.start()?;
        while self.analyzing() {
            self.tick();
            thread::sleep(Duration::from_millis(1));
        }
        Ok(())
    }

    fn cancel_current_run(&mut self) {
        if self.control.phase().is_active() {
            emit_global_sync!(Event::Analyzer(AnalyzerEvent::Cancelled));
        }
        self.control.request_cancel();
        // the worker exits at its next checkpoint; it only holds the old
        // store and snapshot, which are never visible again
        if let Some(worker) = self.worker.take() {
            drop(worker);
        }
    }

    // === Coordinating-thread slices ===

    fn tick_mapping(&mut self) {
        let deadline = Instant::now() + TICK_BUDGET;

        if self.mapping.is_none() {
            let paths = self.host.all_asset_paths();
            let mut scene_paths = self.host.build_scene_paths();
            if scene_paths.is_empty() {
                scene_paths.extend(self.host.active_scene_path());
            }
            debug!(
                "mapping {} asset paths, {} build scenes",
                paths.len(),
                scene_paths.len()
            );
            emit_global_sync!(Event::Analyzer(AnalyzerEvent::Started {
                asset_count: paths.len(),
            }));
            let mut tracker = ProgressTracker::starting_at(self.control.progress_cell(), 0.0);
            tracker.set_range(MAPPING_END, paths.len());
            self.mapping = Some(MappingState {
                index: ProjectIndex::with_capacity(paths.len()),
                paths,
                next: 0,
                scene_paths,
                tracker,
            });
        }

        let host = self.host.clone();
        if let Some(mapping) = self.mapping.as_mut() {
            while mapping.next < mapping.paths.len() {
                let path = &mapping.paths[mapping.next];
                mapping.next += 1;
                if path.starts_with(ASSETS_PREFIX) {
                    if let Some(guid) = host.guid_for_path(path) {
                        mapping.index.insert(path.clone(), guid);
                    }
                }
                mapping.tracker.increment();
                if Instant::now() >= deadline {
                    return;
                }
            }
        }

        if let Some(MappingState {
            index,
            scene_paths,
            tracker,
            ..
        }) = self.mapping.take()
        {
            let snapshot = Arc::new(AnalysisSnapshot {
                project_root: self.host.project_root().to_path_buf(),
                index,
                scene_paths,
            });
            self.snapshot = Some(snapshot.clone());
            self.control.set_phase(RunPhase::Graph);
            self.spawn_graph_worker(snapshot, tracker);
        }
    }

    fn tick_bundle_tables(&mut self) {
        let deadline = Instant::now() + TICK_BUDGET;

        if self.bundle_gather.is_none() {
            let names = self.host.asset_bundle_names();
            if names.is_empty() {
                self.finish_run();
                return;
            }
            emit_global_sync!(Event::Analyzer(AnalyzerEvent::BundlePhaseStarted {
                bundles: names.len(),
            }));
            let mut tracker = ProgressTracker::starting_at(self.control.progress_cell(), 0.0);
            tracker.set_range(BUNDLE_TABLES_END, names.len());
            self.bundle_gather = Some(BundleGather {
                names,
                next: 0,
                tables: BundleTables::default(),
                tracker,
            });
        }

        let host = self.host.clone();
        if let Some(gather) = self.bundle_gather.as_mut() {
            while gather.next < gather.names.len() {
                let name = gather.names[gather.next].clone();
                gather.next += 1;
                gather.tables.bundles.push(BundleSpec {
                    asset_paths: host.asset_paths_in_bundle(&name),
                    dependencies: host.asset_bundle_dependencies(&name),
                    name,
                });
                gather.tracker.increment();
                if Instant::now() >= deadline {
                    return;
                }
            }
        }

        if let Some(BundleGather {
            tables, tracker, ..
        }) = self.bundle_gather.take()
        {
            self.control.set_phase(RunPhase::BundleGraph);
            self.spawn_bundle_worker(tables, tracker);
        }
    }

    // === Background workers ===

    fn spawn_graph_worker(&mut self, snapshot: Arc<AnalysisSnapshot>, mut tracker: ProgressTracker) {
        let store = self.store.clone();
        let control = self.control.clone();
        let handle = thread::Builder::new()
            .name("romlink-graph".to_string())
            .spawn(move || {
                if passes::run_graph_passes(&snapshot, &store, &mut tracker, &control) {
                    control.set_phase(RunPhase::BundleTables);
                } else {
                    debug!("graph worker cancelled");
                }
            })
            .expect("failed to spawn analysis worker thread");
        self.worker = Some(handle);
    }

    fn spawn_bundle_worker(&mut self, tables: BundleTables, mut tracker: ProgressTracker) {
        let Some(snapshot) = self.snapshot.clone() else {
            self.finish_run();
            return;
        };
        let store = self.store.clone();
        let control = self.control.clone();
        let handle = thread::Builder::new()
            .name("romlink-bundles".to_string())
            .spawn(move || {
                if passes::bundle::run(&store, &snapshot, &tables, &mut tracker, &control) {
                    control.set_phase(RunPhase::Done);
                    emit_global_sync!(Event::Analyzer(AnalyzerEvent::Finished {
                        records: store.record_count(),
                        duration_ms: control.elapsed_ms(),
                    }));
                } else {
                    debug!("bundle worker cancelled");
                }
            })
            .expect("failed to spawn bundle worker thread");
        self.worker = Some(handle);
    }

    fn finish_run(&mut self) {
        self.control.set_phase(RunPhase::Done);
        debug!(
            "analysis finished with {} records in {} ms",
            self.store.record_count(),
            self.control.elapsed_ms()
        );
        emit_global_sync!(Event::Analyzer(AnalyzerEvent::Finished {
            records: self.store.record_count(),
            duration_ms: self.control.elapsed_ms(),
        }));
    }

    // === Queries ===

    pub fn is_include(&self, id: &AssetUniqueId) -> Inclusion {
        self.store.is_include(id)
    }

    pub fn is_include_from_path(&self, path: &str) -> Inclusion {
        match self.guid_for_path(path) {
            Some(guid) => self.store.guid_verdict(&guid),
            None => Inclusion::Unknown,
        }
    }

    pub fn is_include_from_packing_tag(&self, tag: &str) -> Inclusion {
        self.store.is_include(&AssetUniqueId::from_packing_tag(tag))
    }

    pub fn include_flags(&self, id: &AssetUniqueId) -> IncludeFlags {
        self.store.include_flags(id)
    }

    pub fn include_flags_from_path(&self, path: &str) -> IncludeFlags {
        match self.guid_for_path(path) {
            Some(guid) => self.store.include_flags(&AssetUniqueId::main(guid)),
            None => IncludeFlags::empty(),
        }
    }

    pub fn links(&self, id: &AssetUniqueId) -> Option<Vec<AssetUniqueId>> {
        self.store.links(id)
    }

    pub fn links_from_path(&self, path: &str) -> Option<Vec<AssetUniqueId>> {
        self.store.links(&AssetUniqueId::main(self.guid_for_path(path)?))
    }

    pub fn inbound_links(&self, id: &AssetUniqueId) -> Option<Vec<AssetUniqueId>> {
        self.store.inbound_links(id)
    }

    pub fn inbound_links_from_path(&self, path: &str) -> Option<Vec<AssetUniqueId>> {
        self.store
            .inbound_links(&AssetUniqueId::main(self.guid_for_path(path)?))
    }

    pub fn packing_tag(&self, id: &AssetUniqueId) -> Option<String> {
        self.store.packing_tag(id)
    }

    pub fn packing_tag_from_path(&self, path: &str) -> Option<String> {
        self.store
            .packing_tag(&AssetUniqueId::main(self.guid_for_path(path)?))
    }

    /// Every identifier visited so far, in canonical structural order
    pub fn record_ids(&self) -> Vec<AssetUniqueId> {
        self.store.record_ids()
    }

    /// Direct access to the result store for advanced consumers
    pub fn store(&self) -> &ResultStore {
        &self.store
    }

    /// Resolve a project-relative path through the current run's index
    pub fn guid_for_path(&self, path: &str) -> Option<String> {
        self.snapshot
            .as_ref()?
            .index
            .guid_for_path(path)
            .map(str::to_string)
    }

    /// Resolve a guid back to its project-relative path
    pub fn path_for_guid(&self, guid: &str) -> Option<String> {
        self.snapshot
            .as_ref()?
            .index
            .path_for_guid(guid)
            .map(str::to_string)
    }
}

impl Drop for LinkAnalyzer {
    fn drop(&mut self) {
        self.dispose();
    }
}
