//! Host registry abstraction
//!
//! The analyzer never talks to the editor host directly; everything it needs
//! from the live registry (asset paths, guids, the build scene list, bundle
//! tables) comes through `ProjectHost`. All trait methods are invoked from
//! the coordinating thread only, in time-boxed slices.
//!
//! `FsProjectHost` is the on-disk implementation: it scans the project's
//! asset tree, reads guids and bundle membership from sidecar text, and
//! parses the enabled scene list from the build settings descriptor.

use std::fs;
use std::path::{Path, PathBuf};

use ahash::AHashMap;
use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;

use romlink_events::error::{ContextExt, Error, HostErrorKind, Result};
use romlink_parser::{guid_in_line, ASSETS_PREFIX};

/// Build settings descriptor holding the registered scene list
pub const BUILD_SETTINGS_PATH: &str = "ProjectSettings/EditorBuildSettings.asset";

static SCENE_ENABLED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"enabled:[ \t]*([01])").unwrap());
static SCENE_PATH_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"path:[ \t]*(.+)").unwrap());
static BUNDLE_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"assetBundleName:[ \t]*([^ \t].*)").unwrap());

/// Read access to the host's live project registry
pub trait ProjectHost: Send + Sync {
    /// Root directory the project-relative paths resolve against
    fn project_root(&self) -> &Path;

    /// Every asset path the registry knows, project-relative
    fn all_asset_paths(&self) -> Vec<String>;

    /// The stable global id of a path, if it has one
    fn guid_for_path(&self, path: &str) -> Option<String>;

    /// Paths of scenes registered (and enabled) for the build
    fn build_scene_paths(&self) -> Vec<String>;

    /// The scene currently open in the host, used when no scenes are
    /// registered for the build
    fn active_scene_path(&self) -> Option<String> {
        None
    }

    /// Names of all declared asset bundles
    fn asset_bundle_names(&self) -> Vec<String> {
        Vec::new()
    }

    /// Member asset paths of one bundle
    fn asset_paths_in_bundle(&self, _bundle: &str) -> Vec<String> {
        Vec::new()
    }

    /// Direct (non-recursive) dependencies of one bundle
    fn asset_bundle_dependencies(&self, _bundle: &str) -> Vec<String> {
        Vec::new()
    }
}

/// Filesystem-backed project host.
///
/// Scans the asset tree once at construction; the analyzer snapshots the
/// result per run, so a stale host only means a stale analysis, never a torn
/// one. Bundle dependency lists default to empty because the engine computes
/// those; hosts with that information can wrap this type and override.
#[derive(Debug)]
pub struct FsProjectHost {
    root: PathBuf,
    guids: AHashMap<String, String>,
    paths: Vec<String>,
    scenes: Vec<String>,
    bundles: AHashMap<String, Vec<String>>,
}

impl FsProjectHost {
    /// Open a project directory and scan its asset tree
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        if !root.is_dir() {
            return Err(Error::host(
                format!("project root does not exist: {}", root.display()),
                HostErrorKind::InvalidProjectRoot,
            )
            .with_file_path(root));
        }

        let mut host = Self {
            root,
            guids: AHashMap::new(),
            paths: Vec::new(),
            scenes: Vec::new(),
            bundles: AHashMap::new(),
        };
        host.scan_assets().context("scanning asset tree")?;
        host.scan_build_scenes();
        debug!(
            "scanned project at {}: {} assets, {} scenes, {} bundles",
            host.root.display(),
            host.paths.len(),
            host.scenes.len(),
            host.bundles.len()
        );
        Ok(host)
    }

    /// Walk the asset tree collecting paths, guids, and bundle membership
    fn scan_assets(&mut self) -> std::io::Result<()> {
        let assets_root = self.root.join("Assets");
        if !assets_root.is_dir() {
            warn!("no Assets directory under {}", self.root.display());
            return Ok(());
        }

        let mut stack = vec![assets_root];
        while let Some(dir) = stack.pop() {
            for entry in fs::read_dir(&dir)? {
                let entry = entry?;
                let path = entry.path();
                let name = entry.file_name();
                let name = name.to_string_lossy();
                if name.starts_with('.') || name.ends_with(".meta") {
                    continue;
                }
                if path.is_dir() {
                    stack.push(path.clone());
                }
                self.register_asset(&path);
            }
        }
        self.paths.sort_unstable();
        Ok(())
    }

    /// Record one asset path if its sidecar carries a guid
    fn register_asset(&mut self, path: &Path) {
        let Some(relative) = self.relative_path(path) else {
            return;
        };
        let meta = self.root.join(format!("{relative}.meta"));
        let Ok(text) = fs::read_to_string(&meta) else {
            debug!("asset without sidecar skipped: {relative}");
            return;
        };

        let mut guid = None;
        for line in text.lines() {
            if guid.is_none() {
                guid = guid_in_line(line);
            }
            if let Some(cap) = BUNDLE_NAME_RE.captures(line) {
                let bundle = cap[1].trim().to_string();
                if !bundle.is_empty() {
                    self.bundles
                        .entry(bundle)
                        .or_default()
                        .push(relative.clone());
                }
            }
        }

        if let Some(guid) = guid {
            self.guids.insert(relative.clone(), guid);
            self.paths.push(relative);
        } else {
            debug!("sidecar without guid skipped: {relative}");
        }
    }

    /// Project-relative path with forward slashes
    fn relative_path(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.root).ok()?;
        let mut parts = Vec::new();
        for component in relative.components() {
            parts.push(component.as_os_str().to_str()?);
        }
        Some(parts.join("/"))
    }

    /// Parse the enabled scene list out of the build settings descriptor
    fn scan_build_scenes(&mut self) {
        let settings = self.root.join(BUILD_SETTINGS_PATH);
        let Ok(text) = fs::read_to_string(&settings) else {
            debug!("no build settings at {}", settings.display());
            return;
        };

        let mut enabled = false;
        for line in text.lines() {
            if let Some(cap) = SCENE_ENABLED_RE.captures(line) {
                enabled = &cap[1] == "1";
            } else if let Some(cap) = SCENE_PATH_RE.captures(line) {
                let path = cap[1].trim();
                if enabled && path.starts_with(ASSETS_PREFIX) {
                    self.scenes.push(path.to_string());
                }
            }
        }
    }
}

impl ProjectHost for FsProjectHost {
    fn project_root(&self) -> &Path {
        &self.root
    }

    fn all_asset_paths(&self) -> Vec<String> {
        self.paths.clone()
    }

    fn guid_for_path(&self, path: &str) -> Option<String> {
        self.guids.get(path).cloned()
    }

    fn build_scene_paths(&self) -> Vec<String> {
        self.scenes.clone()
    }

    fn asset_bundle_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.bundles.keys().cloned().collect();
        names.sort_unstable();
        names
    }

    fn asset_paths_in_bundle(&self, bundle: &str) -> Vec<String> {
        self.bundles.get(bundle).cloned().unwrap_or_default()
    }
}
