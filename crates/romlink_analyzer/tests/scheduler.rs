//! Scheduler lifecycle: incremental ticking, suspend/resume, refresh,
//! dispose, and the bundle overlay phase

mod common;

use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use common::{reference, FixtureProject};
use romlink_analyzer::{
    AssetUniqueId, FsProjectHost, IncludeFlags, Inclusion, LinkAnalyzer, ProjectHost,
};

#[test]
fn nothing_is_known_before_start() {
    let project = FixtureProject::new();
    project.add_asset("Assets/A.mat", &FixtureProject::guid(1), "m_Name: a\n");

    let analyzer = project.analyzer();
    assert!(!analyzer.analyzing());
    assert_eq!(analyzer.progress(), 0.0);
    assert_eq!(analyzer.is_include_from_path("Assets/A.mat"), Inclusion::Unknown);
    assert_eq!(analyzer.links_from_path("Assets/A.mat"), None);
}

#[test]
fn progress_reaches_one_only_when_done() {
    let project = FixtureProject::new();
    let scene_guid = FixtureProject::guid(1);
    project.add_asset("Assets/S.unity", &scene_guid, "m_Name: s\n");
    project.set_build_scenes(&["Assets/S.unity"]);

    let mut analyzer = project.analyzer();
    analyzer.start().unwrap();
    assert!(analyzer.analyzing());
    assert!(analyzer.progress() < 1.0);

    while analyzer.analyzing() {
        assert!(analyzer.progress() < 1.0);
        analyzer.tick();
        thread::sleep(Duration::from_millis(1));
    }
    assert_eq!(analyzer.progress(), 1.0);
}

#[test]
fn start_is_a_no_op_after_completion() {
    let project = FixtureProject::new();
    project.add_asset("Assets/A.mat", &FixtureProject::guid(1), "m_Name: a\n");

    let mut analyzer = project.analyzed();
    analyzer.start().unwrap();
    assert!(!analyzer.analyzing());
    assert_eq!(analyzer.progress(), 1.0);
}

#[test]
fn verdicts_never_regress_from_included() {
    let project = FixtureProject::new();
    let scene_guid = FixtureProject::guid(1);
    let prefab_guid = FixtureProject::guid(2);
    project.add_asset("Assets/S.unity", &scene_guid, &reference(&prefab_guid, 100));
    project.add_asset("Assets/P.prefab", &prefab_guid, "m_Name: p\n");
    project.set_build_scenes(&["Assets/S.unity"]);

    let mut analyzer = project.analyzer();
    analyzer.start().unwrap();

    let mut included_seen = false;
    while analyzer.analyzing() {
        let verdict = analyzer.is_include(&AssetUniqueId::main(prefab_guid.clone()));
        if included_seen {
            assert_eq!(verdict, Inclusion::Included, "verdict regressed");
        } else if verdict == Inclusion::Included {
            included_seen = true;
        }
        analyzer.tick();
    }
    assert_eq!(
        analyzer.is_include(&AssetUniqueId::main(prefab_guid)),
        Inclusion::Included
    );
}

#[test]
fn suspend_stalls_the_run_until_resume() {
    let project = FixtureProject::new();
    project.add_asset("Assets/A.mat", &FixtureProject::guid(1), "m_Name: a\n");

    let mut analyzer = project.analyzer();
    analyzer.start().unwrap();
    analyzer.suspend();

    for _ in 0..20 {
        analyzer.tick();
        thread::sleep(Duration::from_millis(1));
    }
    assert!(analyzer.analyzing());

    analyzer.resume();
    analyzer.run_to_completion().unwrap();
    assert!(!analyzer.analyzing());
    assert_eq!(analyzer.is_include_from_path("Assets/A.mat"), Inclusion::Excluded);
}

#[test]
fn dispose_rejects_further_starts() {
    let project = FixtureProject::new();
    project.add_asset("Assets/A.mat", &FixtureProject::guid(1), "m_Name: a\n");

    let mut analyzer = project.analyzer();
    analyzer.start().unwrap();
    analyzer.dispose();
    assert!(!analyzer.analyzing());

    let err = analyzer.start().unwrap_err();
    assert!(err.is_analyzer());
}

#[test]
fn refresh_restarts_from_zero() {
    let project = FixtureProject::new();
    project.add_asset("Assets/A.mat", &FixtureProject::guid(1), "m_Name: a\n");

    let mut analyzer = project.analyzed();
    assert_eq!(analyzer.is_include_from_path("Assets/A.mat"), Inclusion::Excluded);

    analyzer.refresh();
    assert!(analyzer.analyzing());
    analyzer.run_to_completion().unwrap();
    assert_eq!(analyzer.is_include_from_path("Assets/A.mat"), Inclusion::Excluded);
}

// === Bundle overlay ===

/// Filesystem host with declared bundle dependencies layered on top
struct BundleDepsHost {
    inner: FsProjectHost,
    base: String,
    dependent: String,
}

impl ProjectHost for BundleDepsHost {
    fn project_root(&self) -> &Path {
        self.inner.project_root()
    }

    fn all_asset_paths(&self) -> Vec<String> {
        self.inner.all_asset_paths()
    }

    fn guid_for_path(&self, path: &str) -> Option<String> {
        self.inner.guid_for_path(path)
    }

    fn build_scene_paths(&self) -> Vec<String> {
        self.inner.build_scene_paths()
    }

    fn asset_bundle_names(&self) -> Vec<String> {
        let mut names = self.inner.asset_bundle_names();
        names.push(self.base.clone());
        names.sort_unstable();
        names
    }

    fn asset_paths_in_bundle(&self, bundle: &str) -> Vec<String> {
        self.inner.asset_paths_in_bundle(bundle)
    }

    fn asset_bundle_dependencies(&self, bundle: &str) -> Vec<String> {
        if bundle == self.dependent {
            vec![self.base.clone()]
        } else {
            Vec::new()
        }
    }
}

#[test]
fn bundle_overlay_tags_members_and_their_dependencies() {
    let project = FixtureProject::new();
    let member_guid = FixtureProject::guid(1);
    let pulled_guid = FixtureProject::guid(2);

    project.add_asset_with_meta(
        "Assets/A.mat",
        &member_guid,
        &reference(&pulled_guid, 100),
        "assetBundleName: core\n",
    );
    project.add_asset("Assets/B.prefab", &pulled_guid, "m_Name: b\n");

    let host = Arc::new(BundleDepsHost {
        inner: FsProjectHost::open(project.root()).unwrap(),
        base: "base".to_string(),
        dependent: "core".to_string(),
    });
    let mut analyzer = LinkAnalyzer::new(host);
    analyzer.run_to_completion().unwrap();

    // neither asset is reachable from a root, but both are bundle-carried
    let member_flags = analyzer.include_flags_from_path("Assets/A.mat");
    assert!(member_flags.contains(IncludeFlags::ASSET_BUNDLE));
    assert!(member_flags.contains(IncludeFlags::NON_INCLUDE));
    assert!(analyzer
        .include_flags_from_path("Assets/B.prefab")
        .contains(IncludeFlags::ASSET_BUNDLE));

    // the bundle bit alone does not make the build ship an asset
    assert_eq!(analyzer.is_include_from_path("Assets/A.mat"), Inclusion::Excluded);

    let core_id = AssetUniqueId::from_bundle("core");
    let base_id = AssetUniqueId::from_bundle("base");
    assert_eq!(analyzer.include_flags(&core_id), IncludeFlags::ASSET_BUNDLE);

    let core_links = analyzer.links(&core_id).unwrap();
    assert!(core_links.contains(&AssetUniqueId::main(member_guid.clone())));
    assert!(core_links.contains(&base_id));
    assert!(analyzer
        .inbound_links(&base_id)
        .unwrap()
        .contains(&core_id));
    assert!(analyzer
        .inbound_links(&AssetUniqueId::main(member_guid))
        .unwrap()
        .contains(&core_id));
}

#[test]
fn bundle_free_projects_skip_the_overlay() {
    let project = FixtureProject::new();
    project.add_asset("Assets/A.mat", &FixtureProject::guid(1), "m_Name: a\n");

    let analyzer = project.analyzed();
    assert!(analyzer
        .record_ids()
        .iter()
        .all(|id| !id.is_bundle()));
}
