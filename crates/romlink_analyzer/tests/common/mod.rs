//! On-disk fixture projects for analyzer integration tests
#![allow(dead_code)]

use std::fs;
use std::path::Path;
use std::sync::Arc;

use romlink_analyzer::{FsProjectHost, LinkAnalyzer};
use tempfile::TempDir;

pub struct FixtureProject {
    dir: TempDir,
}

impl FixtureProject {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create fixture dir");
        fs::create_dir_all(dir.path().join("Assets")).expect("create Assets");
        Self { dir }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Deterministic 32-hex guid from a small number
    pub fn guid(n: u32) -> String {
        format!("{n:032x}")
    }

    /// Write an arbitrary project-relative file
    pub fn write_file(&self, path: &str, contents: &str) {
        let full = self.root().join(path);
        fs::create_dir_all(full.parent().expect("fixture path parent")).expect("create dirs");
        fs::write(full, contents).expect("write fixture file");
    }

    /// Add an asset with its body and a guid-only sidecar
    pub fn add_asset(&self, path: &str, guid: &str, body: &str) {
        self.write_file(path, body);
        self.write_file(&format!("{path}.meta"), &format!("guid: {guid}\n"));
    }

    /// Add an asset whose sidecar carries extra descriptor lines
    pub fn add_asset_with_meta(&self, path: &str, guid: &str, body: &str, meta_extra: &str) {
        self.write_file(path, body);
        self.write_file(
            &format!("{path}.meta"),
            &format!("guid: {guid}\n{meta_extra}"),
        );
    }

    /// Register enabled build scenes
    pub fn set_build_scenes(&self, scenes: &[&str]) {
        let mut text = String::from("m_Scenes:\n");
        for scene in scenes {
            text.push_str(&format!("- enabled: 1\n  path: {scene}\n"));
        }
        self.write_file("ProjectSettings/EditorBuildSettings.asset", &text);
    }

    pub fn host(&self) -> Arc<FsProjectHost> {
        Arc::new(FsProjectHost::open(self.root()).expect("open fixture project"))
    }

    pub fn analyzer(&self) -> LinkAnalyzer {
        LinkAnalyzer::new(self.host())
    }

    /// Build an analyzer and drive it to completion
    pub fn analyzed(&self) -> LinkAnalyzer {
        let mut analyzer = self.analyzer();
        analyzer.run_to_completion().expect("analysis run");
        analyzer
    }
}

/// A descriptor line referencing another asset
pub fn reference(guid: &str, file_id: i64) -> String {
    format!("  item: {{fileID: {file_id}, guid: {guid}, type: 2}}\n")
}
