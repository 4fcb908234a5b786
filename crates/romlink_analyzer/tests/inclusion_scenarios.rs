//! End-to-end inclusion scenarios over on-disk fixture projects

mod common;

use common::{reference, FixtureProject};
use romlink_analyzer::{AssetUniqueId, IncludeFlags, Inclusion};

#[test]
fn simple_chain_scene_to_texture() {
    let project = FixtureProject::new();
    let scene_guid = FixtureProject::guid(1);
    let prefab_guid = FixtureProject::guid(2);
    let material_guid = FixtureProject::guid(3);
    let texture_guid = FixtureProject::guid(4);

    project.add_asset("Assets/S.unity", &scene_guid, &reference(&prefab_guid, 100));
    project.add_asset(
        "Assets/P.prefab",
        &prefab_guid,
        &reference(&material_guid, 2100000),
    );
    project.add_asset(
        "Assets/M.mat",
        &material_guid,
        &reference(&texture_guid, 2800000),
    );
    project.add_asset("Assets/T.png", &texture_guid, "binary");
    project.set_build_scenes(&["Assets/S.unity"]);

    let analyzer = project.analyzed();

    assert_eq!(
        analyzer.is_include_from_path("Assets/S.unity"),
        Inclusion::Included
    );
    assert_eq!(
        analyzer.include_flags_from_path("Assets/S.unity"),
        IncludeFlags::SCENES_IN_BUILD
    );
    for path in ["Assets/P.prefab", "Assets/M.mat", "Assets/T.png"] {
        assert_eq!(analyzer.is_include_from_path(path), Inclusion::Included, "{path}");
        assert_eq!(analyzer.include_flags_from_path(path), IncludeFlags::LINK, "{path}");
    }

    // references to unobserved sub-objects collapse onto the primary object
    assert_eq!(
        analyzer.links_from_path("Assets/S.unity").unwrap(),
        vec![AssetUniqueId::main(prefab_guid)]
    );
    assert_eq!(
        analyzer.inbound_links_from_path("Assets/T.png").unwrap(),
        vec![AssetUniqueId::main(material_guid)]
    );
    assert!(analyzer
        .inbound_links_from_path("Assets/S.unity")
        .unwrap()
        .is_empty());
}

#[test]
fn unreferenced_asset_is_excluded() {
    let project = FixtureProject::new();
    let guid = FixtureProject::guid(1);
    project.add_asset("Assets/U.mat", &guid, "m_Name: unused\n");

    let analyzer = project.analyzed();

    assert_eq!(analyzer.is_include_from_path("Assets/U.mat"), Inclusion::Excluded);
    assert_eq!(
        analyzer.include_flags_from_path("Assets/U.mat"),
        IncludeFlags::NON_INCLUDE
    );
    assert!(analyzer.links_from_path("Assets/U.mat").unwrap().is_empty());
    assert!(analyzer
        .inbound_links_from_path("Assets/U.mat")
        .unwrap()
        .is_empty());
}

#[test]
fn sibling_cycle_resolves_to_included() {
    let project = FixtureProject::new();
    let scene_guid = FixtureProject::guid(1);
    let cycle_guid = FixtureProject::guid(2);

    // two sub-objects of one file referencing each other
    let body = "\
--- !u!21 &2100000
  other: {fileID: 2100002}
--- !u!21 &2100002
  other: {fileID: 2100000}
";
    project.add_asset("Assets/C.mat", &cycle_guid, body);
    project.add_asset("Assets/S.unity", &scene_guid, &reference(&cycle_guid, 2100000));
    project.set_build_scenes(&["Assets/S.unity"]);

    let analyzer = project.analyzed();

    // the directly referenced sub-object and the one reached only through
    // the cycle both end up included
    assert_eq!(
        analyzer.is_include(&AssetUniqueId::new(cycle_guid.clone(), 2100000)),
        Inclusion::Included
    );
    assert_eq!(
        analyzer.is_include(&AssetUniqueId::new(cycle_guid.clone(), 2100002)),
        Inclusion::Included
    );
    // the empty header scope stays excluded, so the file verdict is split
    assert_eq!(
        analyzer.is_include_from_path("Assets/C.mat"),
        Inclusion::Ambiguous
    );
}

#[test]
fn sub_objects_are_tracked_as_distinct_identifiers() {
    let project = FixtureProject::new();
    let scene_guid = FixtureProject::guid(1);
    let multi_guid = FixtureProject::guid(2);

    let body = "\
--- !u!21 &2100000
  m_Name: used
--- !u!21 &2100002
  m_Name: unused
";
    project.add_asset("Assets/F.mat", &multi_guid, body);
    project.add_asset("Assets/S.unity", &scene_guid, &reference(&multi_guid, 2100000));
    project.set_build_scenes(&["Assets/S.unity"]);

    let analyzer = project.analyzed();

    assert_eq!(
        analyzer.is_include(&AssetUniqueId::new(multi_guid.clone(), 2100000)),
        Inclusion::Included
    );
    assert_eq!(
        analyzer.is_include(&AssetUniqueId::new(multi_guid.clone(), 2100002)),
        Inclusion::Excluded
    );
    assert_eq!(
        analyzer.is_include_from_path("Assets/F.mat"),
        Inclusion::Ambiguous
    );
}

#[test]
fn split_verdict_converges_once_every_sub_object_is_reached() {
    let project = FixtureProject::new();
    let scene_a = FixtureProject::guid(1);
    let scene_b = FixtureProject::guid(2);
    let multi_guid = FixtureProject::guid(3);

    let body = "\
--- !u!21 &2100000
  m_Name: only
";
    project.add_asset("Assets/F.mat", &multi_guid, body);
    project.add_asset("Assets/A.unity", &scene_a, &reference(&multi_guid, 2100000));
    // referencing a sub-object that does not exist resolves to the primary
    // object, which upgrades the provisionally excluded header scope
    project.add_asset("Assets/B.unity", &scene_b, &reference(&multi_guid, 42));
    project.set_build_scenes(&["Assets/A.unity", "Assets/B.unity"]);

    let analyzer = project.analyzed();

    assert_eq!(
        analyzer.is_include(&AssetUniqueId::new(multi_guid.clone(), 2100000)),
        Inclusion::Included
    );
    assert_eq!(
        analyzer.is_include(&AssetUniqueId::main(multi_guid)),
        Inclusion::Included
    );
    assert_eq!(
        analyzer.is_include_from_path("Assets/F.mat"),
        Inclusion::Included
    );
}

#[test]
fn packing_tag_groups_members_under_a_virtual_node() {
    let project = FixtureProject::new();
    let scene_guid = FixtureProject::guid(1);
    let reached_guid = FixtureProject::guid(2);
    let stray_guid = FixtureProject::guid(3);

    project.add_asset_with_meta(
        "Assets/X.png",
        &reached_guid,
        "binary",
        "  spritePackingTag: Atlas1\n",
    );
    project.add_asset_with_meta(
        "Assets/Y.png",
        &stray_guid,
        "binary",
        "  spritePackingTag: Atlas1\n",
    );
    project.add_asset("Assets/S.unity", &scene_guid, &reference(&reached_guid, 2800000));
    project.set_build_scenes(&["Assets/S.unity"]);

    let analyzer = project.analyzed();

    assert_eq!(
        analyzer.is_include_from_packing_tag("Atlas1"),
        Inclusion::Included
    );
    assert_eq!(
        analyzer.packing_tag_from_path("Assets/X.png").as_deref(),
        Some("Atlas1")
    );
    assert_eq!(
        analyzer.is_include_from_path("Assets/X.png"),
        Inclusion::Included
    );
    // the stray member is swept up in the leftover pass and inherits the
    // already-included tag node's state
    assert_eq!(
        analyzer.is_include_from_path("Assets/Y.png"),
        Inclusion::Included
    );
    assert_eq!(
        analyzer.include_flags_from_path("Assets/Y.png"),
        IncludeFlags::LINK
    );

    let tag_id = AssetUniqueId::from_packing_tag("Atlas1");
    let members = analyzer.links(&tag_id).unwrap();
    assert!(members.contains(&AssetUniqueId::main(reached_guid)));
    assert!(members.contains(&AssetUniqueId::main(stray_guid)));
}

#[test]
fn unreached_packing_tag_stays_unknown() {
    let project = FixtureProject::new();
    project.add_asset_with_meta(
        "Assets/X.png",
        &FixtureProject::guid(1),
        "binary",
        "  spritePackingTag: Cold\n",
    );
    project.add_asset_with_meta(
        "Assets/Y.png",
        &FixtureProject::guid(2),
        "binary",
        "  spritePackingTag: Cold\n",
    );

    let analyzer = project.analyzed();

    assert_eq!(analyzer.is_include_from_packing_tag("Cold"), Inclusion::Unknown);
    assert_eq!(analyzer.is_include_from_path("Assets/X.png"), Inclusion::Excluded);
    assert_eq!(analyzer.is_include_from_path("Assets/Y.png"), Inclusion::Excluded);
}

#[test]
fn sources_and_streaming_assets_classify_up_front() {
    let project = FixtureProject::new();
    project.add_asset("Assets/Scripts/Game.cs", &FixtureProject::guid(1), "class G {}");
    project.add_asset(
        "Assets/Scripts/Editor/Tool.cs",
        &FixtureProject::guid(2),
        "class T {}",
    );
    project.add_asset(
        "Assets/StreamingAssets/movie.mp4",
        &FixtureProject::guid(3),
        "bytes",
    );

    let analyzer = project.analyzed();

    assert_eq!(
        analyzer.include_flags_from_path("Assets/Scripts/Game.cs"),
        IncludeFlags::SCRIPTS
    );
    assert_eq!(
        analyzer.is_include_from_path("Assets/Scripts/Editor/Tool.cs"),
        Inclusion::Excluded
    );
    assert_eq!(
        analyzer.include_flags_from_path("Assets/StreamingAssets/movie.mp4"),
        IncludeFlags::STREAMING_ASSETS
    );
}

#[test]
fn resource_lookup_folder_is_a_trusted_root() {
    let project = FixtureProject::new();
    project.add_asset(
        "Assets/Resources/config.asset",
        &FixtureProject::guid(1),
        "m_Name: config\n",
    );

    let analyzer = project.analyzed();

    assert_eq!(
        analyzer.is_include_from_path("Assets/Resources/config.asset"),
        Inclusion::Included
    );
    assert_eq!(
        analyzer.include_flags_from_path("Assets/Resources/config.asset"),
        IncludeFlags::RESOURCES
    );
}

#[test]
fn always_included_settings_references_are_roots() {
    let project = FixtureProject::new();
    let shader_guid = FixtureProject::guid(1);
    project.add_asset("Assets/Shaders/glow.shader", &shader_guid, "Shader \"Glow\" {}");
    project.write_file(
        "ProjectSettings/GraphicsSettings.asset",
        &format!("  m_AlwaysIncludedShaders:\n{}", reference(&shader_guid, 4800000)),
    );

    let analyzer = project.analyzed();

    assert_eq!(
        analyzer.is_include_from_path("Assets/Shaders/glow.shader"),
        Inclusion::Included
    );
    assert_eq!(
        analyzer.include_flags_from_path("Assets/Shaders/glow.shader"),
        IncludeFlags::ALWAYS_INCLUDED_SHADERS
    );
}

#[test]
fn root_reason_bits_accumulate() {
    let project = FixtureProject::new();
    let scene_guid = FixtureProject::guid(1);
    project.add_asset("Assets/Resources/Main.unity", &scene_guid, "m_Name: main\n");
    project.set_build_scenes(&["Assets/Resources/Main.unity"]);

    let analyzer = project.analyzed();

    let flags = analyzer.include_flags_from_path("Assets/Resources/Main.unity");
    assert!(flags.contains(IncludeFlags::SCENES_IN_BUILD));
    assert!(flags.contains(IncludeFlags::RESOURCES));
}

#[test]
fn inbound_links_are_the_exact_transpose() {
    let project = FixtureProject::new();
    let scene_guid = FixtureProject::guid(1);
    let a_guid = FixtureProject::guid(2);
    let b_guid = FixtureProject::guid(3);

    let mut scene_body = reference(&a_guid, 100);
    scene_body.push_str(&reference(&b_guid, 100));
    project.add_asset("Assets/S.unity", &scene_guid, &scene_body);
    project.add_asset("Assets/A.prefab", &a_guid, &reference(&b_guid, 200));
    project.add_asset("Assets/B.prefab", &b_guid, "m_Name: b\n");
    project.set_build_scenes(&["Assets/S.unity"]);

    let analyzer = project.analyzed();

    for id in analyzer.record_ids() {
        if id.is_packing_tag() || id.is_bundle() {
            continue;
        }
        let Some(links) = analyzer.links(&id) else {
            continue;
        };
        // no self-references survive normalization
        assert!(!links.contains(&id), "self link on {id}");
        for target in &links {
            let inbound = analyzer.inbound_links(target).unwrap_or_default();
            assert!(inbound.contains(&id), "{id} -> {target} missing from transpose");
        }
        for source in analyzer.inbound_links(&id).unwrap_or_default() {
            let outbound = analyzer.links(&source).unwrap_or_default();
            assert!(outbound.contains(&id), "{source} -> {id} not mirrored");
        }
    }
}

#[test]
fn repeated_runs_reach_identical_verdicts() {
    let project = FixtureProject::new();
    let scene_guid = FixtureProject::guid(1);
    let prefab_guid = FixtureProject::guid(2);
    project.add_asset("Assets/S.unity", &scene_guid, &reference(&prefab_guid, 100));
    project.add_asset("Assets/P.prefab", &prefab_guid, "m_Name: p\n");
    project.add_asset("Assets/U.mat", &FixtureProject::guid(3), "m_Name: u\n");
    project.set_build_scenes(&["Assets/S.unity"]);

    let mut analyzer = project.analyzed();
    let paths = ["Assets/S.unity", "Assets/P.prefab", "Assets/U.mat"];
    let first: Vec<_> = paths
        .iter()
        .map(|path| (analyzer.is_include_from_path(path), analyzer.include_flags_from_path(path)))
        .collect();

    analyzer.refresh();
    while analyzer.analyzing() {
        analyzer.tick();
        std::thread::sleep(std::time::Duration::from_millis(1));
    }

    let second: Vec<_> = paths
        .iter()
        .map(|path| (analyzer.is_include_from_path(path), analyzer.include_flags_from_path(path)))
        .collect();
    assert_eq!(first, second);
}
