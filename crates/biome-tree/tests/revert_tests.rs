use biome_test_utils::{commit, commit_on, module_metadata, setup_main_with_module, tag};
use biome_tree::{Module, ModuleId, Pins, TreeError};
use biome_versions::{RevisionIndex, Version};
use pretty_assertions::assert_eq;

#[test]
fn revert_is_idempotent() {
    let (mut package, main, module) = setup_main_with_module();
    let mut versions = Vec::new();
    for (hash, value) in [("r0", "A"), ("r1", "B"), ("r2", "C")] {
        package
            .update_module_metadata(main, module, Some(module_metadata(&[value])))
            .unwrap();
        versions.push(commit_on(&mut package, main, hash));
    }
    assert_eq!(package.keyframes(), 3);

    let to = Some(versions[0].revision);
    package.revert(main, to).unwrap();
    assert_eq!(package.keyframes(), 1);
    assert_eq!(package.tree().get(main).unwrap().head(), Some(versions[0]));

    package.revert(main, to).unwrap();
    assert_eq!(package.keyframes(), 1);
    assert_eq!(package.tree().get(main).unwrap().revisions().len(), 1);

    for &gone in &versions[1..] {
        assert_eq!(package.pinned(gone).err(), Some(TreeError::UnknownVersion(gone)));
    }
    let pinned = package.pinned(versions[0]).unwrap();
    assert_eq!(pinned.metadata(module), Some(&module_metadata(&["A"])));
    assert_eq!(pinned.excavate::<Module>(module), Some(versions[0]));
}

#[test]
fn history_continues_after_revert() {
    let (mut package, main, module) = setup_main_with_module();
    package
        .update_module_metadata(main, module, Some(module_metadata(&["A"])))
        .unwrap();
    let v0 = commit_on(&mut package, main, "r0");
    package
        .update_module_metadata(main, module, Some(module_metadata(&["B"])))
        .unwrap();
    commit_on(&mut package, main, "r1");

    package.revert(main, Some(v0.revision)).unwrap();
    package
        .update_module_metadata(main, module, Some(module_metadata(&["C"])))
        .unwrap();
    let v1 = commit_on(&mut package, main, "r1'");

    assert_eq!(v1.revision, RevisionIndex::new(1));
    assert_eq!(
        package.pinned(v1).unwrap().metadata(module),
        Some(&module_metadata(&["C"]))
    );
    assert_eq!(
        package.pinned(v0).unwrap().metadata(module),
        Some(&module_metadata(&["A"]))
    );
}

#[test]
fn revert_drops_entities_registered_later() {
    let (mut package, main, _) = setup_main_with_module();
    let v0 = commit_on(&mut package, main, "r0");
    let late = package.add_module(main, ModuleId::from("Late")).unwrap();
    commit_on(&mut package, main, "r1");

    package.revert(main, Some(v0.revision)).unwrap();
    assert_eq!(package.pinned(v0).unwrap().find_module(&ModuleId::from("Late")), None);
    assert_eq!(package.add_module(main, ModuleId::from("Late")).unwrap(), late);
}

#[test]
fn revert_to_nothing_empties_the_branch() {
    let (mut package, main, module) = setup_main_with_module();
    package
        .update_module_metadata(main, module, Some(module_metadata(&["A"])))
        .unwrap();
    commit_on(&mut package, main, "r0");

    package.revert(main, None).unwrap();
    let branch = package.tree().get(main).unwrap();
    assert!(branch.revisions().is_empty());
    assert!(branch.modules().is_empty());
    assert_eq!(package.keyframes(), 0);
    assert_eq!(
        package.tree().find(&tag("main")),
        Err(TreeError::UnknownTag(tag("main")))
    );
}

#[test]
fn revert_removes_tags_past_the_boundary() {
    let (mut package, main, _) = setup_main_with_module();
    let v0 = package
        .commit(main, commit("r0").with_tag(tag("1.0.0")), Pins::new())
        .unwrap();
    package
        .commit(main, commit("r1").with_tag(tag("1.1.0")), Pins::new())
        .unwrap();

    package.revert(main, Some(v0.revision)).unwrap();
    assert_eq!(package.tree().find(&tag("1.0.0")), Ok(v0));
    assert_eq!(
        package.tree().find(&tag("1.1.0")),
        Err(TreeError::UnknownTag(tag("1.1.0")))
    );
    assert_eq!(package.tree().tags().count(), 1);
    assert_eq!(package.pinned_selector(&"1".parse().unwrap()).unwrap().version(), v0);
}

#[test]
fn eroded_slots_are_reused() {
    let (mut package, main, module) = setup_main_with_module();
    for (hash, value) in [("r0", "A"), ("r1", "B"), ("r2", "C")] {
        package
            .update_module_metadata(main, module, Some(module_metadata(&[value])))
            .unwrap();
        commit_on(&mut package, main, hash);
    }
    let slots = package.histories().module_metadata().slots();

    package.revert(main, Some(RevisionIndex::new(0))).unwrap();
    for (hash, value) in [("r1", "D"), ("r2", "E")] {
        package
            .update_module_metadata(main, module, Some(module_metadata(&[value])))
            .unwrap();
        commit_on(&mut package, main, hash);
    }

    assert_eq!(package.histories().module_metadata().slots(), slots);
    assert_eq!(package.histories().module_metadata().len(), 3);
}

#[test]
fn divergences_are_eroded_with_their_branch() {
    let (mut package, main, module) = setup_main_with_module();
    package
        .update_module_metadata(main, module, Some(module_metadata(&["A"])))
        .unwrap();
    let v0 = commit_on(&mut package, main, "r0");
    let feature = package.branch(tag("feature"), Some(v0)).unwrap();
    package
        .update_module_metadata(feature, module, Some(module_metadata(&["B"])))
        .unwrap();
    let f0 = commit_on(&mut package, feature, "f0");

    package.revert(feature, None).unwrap();
    assert_eq!(package.tree().get(feature).unwrap().modules().divergences(), 0);
    assert_eq!(package.keyframes(), 1);
    assert!(package.pinned(f0).is_err());

    let f0 = commit_on(&mut package, feature, "f0'");
    assert_eq!(
        package.pinned(f0).unwrap().metadata(module),
        Some(&module_metadata(&["A"]))
    );
}

#[test]
#[should_panic(expected = "cannot revert")]
fn revert_under_a_fork_panics() {
    let (mut package, main, _) = setup_main_with_module();
    let v0 = commit_on(&mut package, main, "r0");
    package.branch(tag("feature"), Some(v0)).unwrap();
    let _ = package.revert(main, None);
}

#[test]
fn revert_of_unknown_branch_is_an_error() {
    let (mut package, main, _) = setup_main_with_module();
    let missing = biome_versions::BranchIndex::new(main.value() + 1);
    assert_eq!(
        package.revert(missing, None),
        Err(TreeError::UnknownBranch(missing))
    );
    let uncommitted = Version::new(main, RevisionIndex::new(0));
    assert_eq!(
        package.revert(main, Some(uncommitted.revision)),
        Err(TreeError::UnknownVersion(uncommitted))
    );
}
