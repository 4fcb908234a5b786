//! Bijective path/guid project index
//!
//! The index is built once on the coordinating thread at the start of an
//! analysis run and treated as immutable for the run's duration: the worker
//! only reads it, so it can be shared across threads without locking.

use ahash::AHashMap;

/// Immutable snapshot of the project's path/guid registry
#[derive(Debug, Default, Clone)]
pub struct ProjectIndex {
    guid_to_path: AHashMap<String, String>,
    path_to_guid: AHashMap<String, String>,
}

impl ProjectIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            guid_to_path: AHashMap::with_capacity(capacity),
            path_to_guid: AHashMap::with_capacity(capacity),
        }
    }

    /// Register a path/guid pair.
    ///
    /// The maps stay bijective: a pair whose path or guid is already
    /// registered is rejected and `false` is returned.
    pub fn insert(&mut self, path: String, guid: String) -> bool {
        if self.path_to_guid.contains_key(&path) || self.guid_to_path.contains_key(&guid) {
            log::warn!("duplicate path/guid pair ignored: {path} ({guid})");
            return false;
        }
        self.guid_to_path.insert(guid.clone(), path.clone());
        self.path_to_guid.insert(path, guid);
        true
    }

    pub fn guid_for_path(&self, path: &str) -> Option<&str> {
        self.path_to_guid.get(path).map(String::as_str)
    }

    pub fn path_for_guid(&self, guid: &str) -> Option<&str> {
        self.guid_to_path.get(guid).map(String::as_str)
    }

    pub fn contains_guid(&self, guid: &str) -> bool {
        self.guid_to_path.contains_key(guid)
    }

    pub fn contains_path(&self, path: &str) -> bool {
        self.path_to_guid.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.path_to_guid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.path_to_guid.is_empty()
    }

    /// Iterate over `(path, guid)` pairs in unspecified order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.path_to_guid
            .iter()
            .map(|(p, g)| (p.as_str(), g.as_str()))
    }

    /// All registered paths, sorted, for deterministic sweeps
    pub fn paths_sorted(&self) -> Vec<&str> {
        let mut paths: Vec<&str> = self.path_to_guid.keys().map(String::as_str).collect();
        paths.sort_unstable();
        paths
    }
}
