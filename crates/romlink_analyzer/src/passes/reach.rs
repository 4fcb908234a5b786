//! Reachability engine
//!
//! Worklist-based graph builder. Trusted roots seed a FIFO queue; dequeued
//! files are parsed on demand, every discovered sub-object gets a state, and
//! outbound references feed the queue. Inclusion is monotonic: an excluded
//! record can later be upgraded to included when new links prove it
//! reachable, never the reverse, so the flood terminates.

use std::collections::VecDeque;

use ahash::AHashMap;
use log::{debug, trace};
use romlink_events::emit_global_sync;
use romlink_events::event::{AnalyzerEvent, Event};
use romlink_parser::{
    classify_at, parse_links, AssetUniqueId, DescriptorKind, STREAMING_ASSETS_PREFIX,
};

use crate::control::RunControl;
use crate::flags::{IncludeFlags, Inclusion};
use crate::progress::ProgressTracker;
use crate::snapshot::AnalysisSnapshot;
use crate::store::{AssetRecord, ResultStore};

/// Global settings descriptor whose referenced assets ship with every build
pub const ALWAYS_INCLUDED_SETTINGS_PATH: &str = "ProjectSettings/GraphicsSettings.asset";

/// Folder segment marking editor-only source files
const EDITOR_FOLDER_SEGMENT: &str = "/Editor/";

/// Folder segment marking resource-lookup assets
const RESOURCES_FOLDER_SEGMENT: &str = "/Resources/";

pub(crate) struct ReachEngine<'a> {
    snapshot: &'a AnalysisSnapshot,
    store: &'a ResultStore,
    /// Sub-objects per guid still provisionally excluded; drives the
    /// Ambiguous-to-Included verdict upgrade
    noninclude_per_guid: AHashMap<String, usize>,
}

impl<'a> ReachEngine<'a> {
    pub fn new(snapshot: &'a AnalysisSnapshot, store: &'a ResultStore) -> Self {
        Self {
            snapshot,
            store,
            noninclude_per_guid: AHashMap::new(),
        }
    }

    /// Classify source files and streaming assets up front.
    ///
    /// Source files never carry references, so they get their terminal state
    /// immediately: scripts ship unless they live under an editor-only
    /// folder; anything under the streaming folder ships verbatim.
    pub fn classify_sources(&self, progress: &mut ProgressTracker, control: &RunControl) -> bool {
        let snapshot = self.snapshot;
        for path in snapshot.index.paths_sorted() {
            if !control.checkpoint() {
                return false;
            }
            let Some(guid) = snapshot.index.guid_for_path(path) else {
                continue;
            };
            let kind = classify_at(&snapshot.project_root, path);
            let state = if kind == DescriptorKind::Source {
                if path.starts_with(STREAMING_ASSETS_PREFIX) {
                    IncludeFlags::STREAMING_ASSETS
                } else if !path.contains(EDITOR_FOLDER_SEGMENT) {
                    IncludeFlags::SCRIPTS
                } else {
                    IncludeFlags::NON_INCLUDE
                }
            } else if path.starts_with(STREAMING_ASSETS_PREFIX) {
                IncludeFlags::STREAMING_ASSETS
            } else {
                continue;
            };

            self.store.records.insert(
                AssetUniqueId::main(guid),
                AssetRecord {
                    state,
                    ..Default::default()
                },
            );
            self.store
                .guid_verdicts
                .insert(guid.to_string(), state.verdict());
            progress.increment();
        }
        true
    }

    /// Union of build scenes, always-included settings references, and
    /// resource-lookup paths; a path matching several conditions accumulates
    /// all their reason bits
    fn trusted_roots(&self) -> AHashMap<String, IncludeFlags> {
        let snapshot = self.snapshot;
        let mut roots: AHashMap<String, IncludeFlags> = AHashMap::new();

        for scene in &snapshot.scene_paths {
            *roots.entry(scene.clone()).or_default() |= IncludeFlags::SCENES_IN_BUILD;
        }

        let settings = parse_links(
            &snapshot.project_root,
            ALWAYS_INCLUDED_SETTINGS_PATH,
            &snapshot.index,
        );
        for info in settings.values() {
            for link in &info.links {
                if let Some(path) = snapshot.index.path_for_guid(&link.guid) {
                    *roots.entry(path.to_string()).or_default() |=
                        IncludeFlags::ALWAYS_INCLUDED_SHADERS;
                }
            }
        }

        for (path, _) in snapshot.index.iter() {
            if path.contains(RESOURCES_FOLDER_SEGMENT) {
                *roots.entry(path.to_string()).or_default() |= IncludeFlags::RESOURCES;
            }
        }

        roots
    }

    /// Flood reachability from the trusted roots
    pub fn flood_from_roots(&mut self, progress: &mut ProgressTracker, control: &RunControl) -> bool {
        let roots = self.trusted_roots();
        debug!("seeding worklist with {} trusted roots", roots.len());
        emit_global_sync!(Event::Analyzer(AnalyzerEvent::RootsCollected {
            count: roots.len(),
        }));

        let mut queue: VecDeque<AssetUniqueId> = VecDeque::new();
        let mut root_paths: Vec<&String> = roots.keys().collect();
        root_paths.sort_unstable();
        for path in root_paths {
            if let Some(guid) = self.snapshot.index.guid_for_path(path) {
                queue.push_back(AssetUniqueId::main(guid));
            }
        }

        while let Some(mut id) = queue.pop_front() {
            if !control.checkpoint() {
                return false;
            }
            let snapshot = self.snapshot;
            let Some(path) = snapshot.index.path_for_guid(&id.guid) else {
                continue;
            };
            // the file was already handled but this sub-object was never
            // observed: answer for the primary object instead
            if self.store.guid_verdicts.contains_key(&id.guid)
                && !self.store.records.contains_key(&id)
            {
                id.file_id = 0;
            }

            let state = self
                .store
                .records
                .get(&id)
                .map(|record| record.state)
                .unwrap_or_default();
            if state.is_empty() {
                self.analyze_file(id, path, &roots, &mut queue);
                progress.increment();
            } else if state == IncludeFlags::NON_INCLUDE {
                self.upgrade_excluded(&id, &mut queue);
            }
        }
        true
    }

    /// Parse one file, merge every sub-object it yields, and enqueue the
    /// outbound references
    fn analyze_file(
        &mut self,
        mut id: AssetUniqueId,
        path: &str,
        roots: &AHashMap<String, IncludeFlags>,
        queue: &mut VecDeque<AssetUniqueId>,
    ) {
        let snapshot = self.snapshot;
        let link_infos = parse_links(&snapshot.project_root, path, &snapshot.index);
        if !link_infos.contains_key(&id) {
            id.file_id = 0;
        }
        let root_bits = roots.get(path).copied();
        let mut noninclude_count = 0usize;

        for (sub_id, link_info) in &link_infos {
            let new_state = if let Some(bits) = root_bits {
                bits
            } else if sub_id.file_id == id.file_id {
                // the sub-object something linked to
                IncludeFlags::LINK
            } else {
                // a sibling reached incidentally; provisionally excluded
                noninclude_count += 1;
                IncludeFlags::NON_INCLUDE
            };

            {
                let mut record = self.store.records.entry(sub_id.clone()).or_default();
                record.links = link_info.links.clone();
                record.packing_tag = link_info.packing_tag.clone();
                record.state = new_state;
            }
            if new_state == IncludeFlags::NON_INCLUDE {
                *self.noninclude_per_guid.entry(id.guid.clone()).or_insert(0) += 1;
            }

            for link in &link_info.links {
                if link.guid == id.guid {
                    // an included file pulls in its own not-yet-upgraded
                    // siblings
                    if new_state != IncludeFlags::NON_INCLUDE && link_infos.contains_key(link) {
                        queue.push_back(link.clone());
                    }
                } else if !self.store.guid_verdicts.contains_key(&link.guid) {
                    queue.push_back(link.clone());
                }
            }

            if let Some(tag) = &link_info.packing_tag {
                let tag_id = AssetUniqueId::from_packing_tag(tag);
                let mut tag_record =
                    self.store
                        .records
                        .entry(tag_id)
                        .or_insert_with(|| AssetRecord {
                            state: IncludeFlags::LINK,
                            ..Default::default()
                        });
                tag_record.links.push(id.clone());
            }
        }

        match self.store.guid_verdicts.entry(id.guid.clone()) {
            dashmap::mapref::entry::Entry::Vacant(entry) => {
                entry.insert(if noninclude_count > 0 {
                    Inclusion::Ambiguous
                } else {
                    Inclusion::Included
                });
            }
            dashmap::mapref::entry::Entry::Occupied(mut entry) => {
                if noninclude_count == 0 && *entry.get() == Inclusion::Ambiguous {
                    entry.insert(Inclusion::Included);
                }
            }
        }
    }

    /// Cycle resolution: a re-dequeued excluded record was linked after the
    /// fact; flip it to included and revisit its own still-excluded targets
    fn upgrade_excluded(&mut self, id: &AssetUniqueId, queue: &mut VecDeque<AssetUniqueId>) {
        let links = {
            let Some(mut record) = self.store.records.get_mut(id) else {
                return;
            };
            record.state = IncludeFlags::LINK;
            record.links.clone()
        };
        trace!("upgraded {id} from excluded to linked");

        for link in links {
            let target_state = self.store.records.get(&link).map(|record| record.state);
            if target_state == Some(IncludeFlags::NON_INCLUDE) {
                queue.push_back(link);
            }
        }

        if let Some(count) = self.noninclude_per_guid.get_mut(&id.guid) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                self.store
                    .guid_verdicts
                    .insert(id.guid.clone(), Inclusion::Included);
            }
        }
    }

    /// Terminal sweep: every path the flood never reached is parsed once and
    /// excluded, unless it belongs to a grouping tag that is already
    /// included, in which case it inherits the tag node's state
    pub fn exclude_leftovers(&self, progress: &mut ProgressTracker, control: &RunControl) -> bool {
        let snapshot = self.snapshot;
        for path in snapshot.index.paths_sorted() {
            if !control.checkpoint() {
                return false;
            }
            let Some(guid) = snapshot.index.guid_for_path(path) else {
                continue;
            };
            let primary = AssetUniqueId::main(guid);
            let primary_state = self
                .store
                .records
                .get(&primary)
                .map(|record| record.state)
                .unwrap_or_default();
            if !primary_state.is_empty() {
                continue;
            }

            let link_infos = parse_links(&snapshot.project_root, path, &snapshot.index);
            let total = link_infos.len();
            let mut include_count = 0usize;
            for (sub_id, link_info) in &link_infos {
                let mut state = IncludeFlags::empty();
                if let Some(tag) = &link_info.packing_tag {
                    let tag_id = AssetUniqueId::from_packing_tag(tag);
                    let mut tag_record = self.store.records.entry(tag_id).or_default();
                    tag_record.links.push(primary.clone());
                    state = tag_record.state;
                }
                if state.is_empty() {
                    state = IncludeFlags::NON_INCLUDE;
                } else {
                    include_count += 1;
                }

                let mut record = self.store.records.entry(sub_id.clone()).or_default();
                record.links = link_info.links.clone();
                record.packing_tag = link_info.packing_tag.clone();
                record.state = state;
            }

            let verdict = if include_count > 0 {
                if include_count == total {
                    Inclusion::Included
                } else {
                    Inclusion::Ambiguous
                }
            } else {
                Inclusion::Excluded
            };
            self.store
                .guid_verdicts
                .entry(guid.to_string())
                .or_insert(verdict);
            progress.increment();
        }
        true
    }
}
