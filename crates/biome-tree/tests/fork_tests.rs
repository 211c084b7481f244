use biome_test_utils::{
    commit_on, create_declaration, create_symbol, module_metadata, setup_main_with_module, tag,
};
use biome_tree::{Documentation, Module, ModuleId, Symbol, Update};
use pretty_assertions::assert_eq;

#[test]
fn fork_inherits_untouched_fields() {
    let (mut package, main, module) = setup_main_with_module();
    package
        .update_module_metadata(main, module, Some(module_metadata(&["A"])))
        .unwrap();
    let v0 = commit_on(&mut package, main, "r0");

    let feature = package.branch(tag("feature"), Some(v0)).unwrap();
    let f0 = commit_on(&mut package, feature, "f0");
    package
        .update_module_metadata(main, module, Some(module_metadata(&["B"])))
        .unwrap();
    let v1 = commit_on(&mut package, main, "r1");

    let on_main = package.pinned(v0).unwrap();
    let on_feature = package.pinned(f0).unwrap();
    assert_eq!(on_feature.metadata(module), on_main.metadata(module));
    assert_eq!(on_feature.metadata(module), Some(&module_metadata(&["A"])));
    assert_eq!(
        package.pinned(v1).unwrap().metadata(module),
        Some(&module_metadata(&["B"]))
    );
}

#[test]
fn fork_and_diverge() {
    let (mut package, main, module) = setup_main_with_module();
    package
        .update_module_metadata(main, module, Some(module_metadata(&["A"])))
        .unwrap();
    commit_on(&mut package, main, "r0");
    package
        .update_module_metadata(main, module, Some(module_metadata(&["B"])))
        .unwrap();
    package
        .update_module_documentation(main, module, Documentation::comment("from main"))
        .unwrap();
    let v1 = commit_on(&mut package, main, "r1");

    let feature = package.branch(tag("feature"), Some(v1)).unwrap();
    let update = package
        .update_module_metadata(feature, module, Some(module_metadata(&["C"])))
        .unwrap();
    assert_eq!(update, Update::Diverged);
    let f0 = commit_on(&mut package, feature, "f0");

    package
        .update_module_metadata(main, module, Some(module_metadata(&["D"])))
        .unwrap();
    let v2 = commit_on(&mut package, main, "r2");
    let f1 = commit_on(&mut package, feature, "f1");

    assert_eq!(
        package.pinned(v1).unwrap().metadata(module),
        Some(&module_metadata(&["B"]))
    );
    assert_eq!(
        package.pinned(v2).unwrap().metadata(module),
        Some(&module_metadata(&["D"]))
    );
    for version in [f0, f1] {
        let pinned = package.pinned(version).unwrap();
        assert_eq!(pinned.metadata(module), Some(&module_metadata(&["C"])));
        assert_eq!(
            pinned.module_documentation(module),
            Some(&Documentation::comment("from main"))
        );
    }
    assert_eq!(package.tree().get(feature).unwrap().modules().divergences(), 1);
    assert_eq!(package.keyframes(), 5);
}

#[test]
fn equal_writes_create_nothing() {
    let (mut package, main, module) = setup_main_with_module();
    package
        .update_module_metadata(main, module, Some(module_metadata(&["A"])))
        .unwrap();
    let v0 = commit_on(&mut package, main, "r0");
    let feature = package.branch(tag("feature"), Some(v0)).unwrap();

    let before = package.keyframes();
    let local = package
        .update_module_metadata(main, module, Some(module_metadata(&["A"])))
        .unwrap();
    let inherited = package
        .update_module_metadata(feature, module, Some(module_metadata(&["A"])))
        .unwrap();

    assert_eq!(local, Update::Unchanged);
    assert_eq!(inherited, Update::Unchanged);
    assert_eq!(package.keyframes(), before);
    assert_eq!(package.tree().get(feature).unwrap().modules().divergences(), 0);
}

#[test]
fn round_trip_keeps_two_keyframes() {
    let (mut package, main, module) = setup_main_with_module();
    let mut updates = Vec::new();
    let mut versions = Vec::new();
    for (hash, value) in [("r0", "A"), ("r1", "B"), ("r2", "B")] {
        updates.push(
            package
                .update_module_metadata(main, module, Some(module_metadata(&[value])))
                .unwrap(),
        );
        versions.push(commit_on(&mut package, main, hash));
    }

    assert_eq!(updates, vec![Update::Advanced, Update::Advanced, Update::Unchanged]);
    assert_eq!(package.keyframes(), 2);
    assert_eq!(
        package.pinned(versions[0]).unwrap().metadata(module),
        Some(&module_metadata(&["A"]))
    );
    assert_eq!(
        package.pinned(versions[2]).unwrap().metadata(module),
        Some(&module_metadata(&["B"]))
    );
}

#[test]
fn extinction_and_excavation() {
    let (mut package, main, module) = setup_main_with_module();
    package
        .update_module_metadata(main, module, Some(module_metadata(&[])))
        .unwrap();
    let v0 = commit_on(&mut package, main, "r0");
    package.update_module_metadata(main, module, None).unwrap();
    let v1 = commit_on(&mut package, main, "r1");

    let feature = package.branch(tag("feature"), Some(v0)).unwrap();
    package.update_module_metadata(feature, module, None).unwrap();
    let f0 = commit_on(&mut package, feature, "f0");

    let at_v0 = package.pinned(v0).unwrap();
    assert!(at_v0.exists::<Module>(module));
    assert_eq!(at_v0.excavate::<Module>(module), Some(v0));

    let at_v1 = package.pinned(v1).unwrap();
    assert!(!at_v1.exists::<Module>(module));
    assert_eq!(at_v1.metadata(module), None);
    assert_eq!(at_v1.excavate::<Module>(module), Some(v0));

    let at_f0 = package.pinned(f0).unwrap();
    assert!(!at_f0.exists::<Module>(module));
    assert_eq!(at_f0.excavate::<Module>(module), Some(v0));
}

#[test]
fn symbols_and_lookups_through_the_trunk() {
    let (mut package, main, module) = setup_main_with_module();
    let symbols = package
        .add_symbols(
            main,
            [
                create_symbol("Core.Array", module),
                create_symbol("Core.Array.append", module),
            ],
        )
        .unwrap();
    package
        .update_declaration(main, symbols[0], create_declaration("struct Array<Element>"))
        .unwrap();
    package
        .update_top_level_symbols(main, module, symbols[..1].iter().copied().collect())
        .unwrap();
    let v0 = commit_on(&mut package, main, "r0");

    let feature = package.branch(tag("feature"), Some(v0)).unwrap();
    let again = package
        .add_symbols(feature, [create_symbol("Core.Array", module)])
        .unwrap();
    assert_eq!(again, symbols[..1].to_vec());
    package
        .update_symbol_documentation(feature, symbols[1], Documentation::comment("Appends."))
        .unwrap();
    let f0 = commit_on(&mut package, feature, "f0");

    let pinned = package.pinned(f0).unwrap();
    let found = pinned.find_symbol(&"Core.Array".into()).unwrap();
    assert_eq!(found.contemporary, symbols[0]);
    assert_eq!(found.branch, main);
    assert_eq!(pinned.find_module(&ModuleId::from("Core")).map(|p| p.contemporary), Some(module));
    assert!(pinned.module(&ModuleId::from("Missing")).is_err());
    assert_eq!(
        pinned.declaration(symbols[0]).map(|declaration| declaration.fragments.join(" ")),
        Some("struct Array<Element>".to_owned())
    );
    assert_eq!(pinned.documentation(symbols[1]), Some(&Documentation::comment("Appends.")));
    assert_eq!(package.pinned(v0).unwrap().documentation(symbols[1]), None);
    assert_eq!(pinned.top_level_symbols(module).map(|set| set.len()), Some(1));
    assert_eq!(
        pinned.element::<Symbol>(symbols[1]).map(|symbol| symbol.path.clone()),
        Some(vec!["Core".to_owned(), "Array".to_owned(), "append".to_owned()])
    );
}

#[test]
fn reverting_a_divergence_in_the_same_revision_rejoins_the_ancestor() {
    let (mut package, main, module) = setup_main_with_module();
    package
        .update_module_metadata(main, module, Some(module_metadata(&["A"])))
        .unwrap();
    let v0 = commit_on(&mut package, main, "r0");
    let feature = package.branch(tag("feature"), Some(v0)).unwrap();
    let before = package.keyframes();

    let first = package
        .update_module_metadata(feature, module, Some(module_metadata(&["C"])))
        .unwrap();
    let second = package
        .update_module_metadata(feature, module, Some(module_metadata(&["A"])))
        .unwrap();
    assert_eq!((first, second), (Update::Diverged, Update::Unchanged));
    assert_eq!(package.keyframes(), before);
    assert_eq!(package.tree().get(feature).unwrap().modules().divergences(), 0);
    let f0 = commit_on(&mut package, feature, "f0");

    // Same round trip in a later revision of the fork
    package
        .update_module_metadata(feature, module, Some(module_metadata(&["C"])))
        .unwrap();
    package
        .update_module_metadata(feature, module, Some(module_metadata(&["A"])))
        .unwrap();
    assert_eq!(package.keyframes(), before);
    assert_eq!(package.tree().get(feature).unwrap().modules().divergences(), 0);
    let f1 = commit_on(&mut package, feature, "f1");

    for version in [f0, f1] {
        let pinned = package.pinned(version).unwrap();
        assert_eq!(pinned.metadata(module), Some(&module_metadata(&["A"])));
        assert_eq!(pinned.excavate::<Module>(module), Some(version));
    }
}

#[test]
fn committed_divergences_are_kept_when_rejoining() {
    let (mut package, main, module) = setup_main_with_module();
    package
        .update_module_metadata(main, module, Some(module_metadata(&["A"])))
        .unwrap();
    let v0 = commit_on(&mut package, main, "r0");
    let feature = package.branch(tag("feature"), Some(v0)).unwrap();
    package
        .update_module_metadata(feature, module, Some(module_metadata(&["C"])))
        .unwrap();
    let f0 = commit_on(&mut package, feature, "f0");

    let update = package
        .update_module_metadata(feature, module, Some(module_metadata(&["A"])))
        .unwrap();
    let f1 = commit_on(&mut package, feature, "f1");

    assert_eq!(update, Update::Advanced);
    assert_eq!(package.tree().get(feature).unwrap().modules().divergences(), 1);
    assert_eq!(
        package.pinned(f0).unwrap().metadata(module),
        Some(&module_metadata(&["C"]))
    );
    assert_eq!(
        package.pinned(f1).unwrap().metadata(module),
        Some(&module_metadata(&["A"]))
    );
}

#[test]
fn grandchild_reads_fall_through_two_inherited_segments() {
    let (mut package, main, module) = setup_main_with_module();
    package
        .update_module_metadata(main, module, Some(module_metadata(&["A"])))
        .unwrap();
    package
        .update_module_documentation(main, module, Documentation::comment("from main"))
        .unwrap();
    let v0 = commit_on(&mut package, main, "r0");

    let child = package.branch(tag("child"), Some(v0)).unwrap();
    let c0 = commit_on(&mut package, child, "c0");
    package
        .update_module_metadata(child, module, Some(module_metadata(&["B"])))
        .unwrap();
    let c1 = commit_on(&mut package, child, "c1");

    let early = package.branch(tag("early"), Some(c0)).unwrap();
    let e0 = commit_on(&mut package, early, "e0");
    let late = package.branch(tag("late"), Some(c1)).unwrap();
    let l0 = commit_on(&mut package, late, "l0");

    package
        .update_module_metadata(main, module, Some(module_metadata(&["D"])))
        .unwrap();
    commit_on(&mut package, main, "r1");

    let at_e0 = package.pinned(e0).unwrap();
    assert_eq!(at_e0.metadata(module), Some(&module_metadata(&["A"])));
    assert_eq!(
        at_e0.module_documentation(module),
        Some(&Documentation::comment("from main"))
    );
    assert_eq!(at_e0.find_module(&ModuleId::from("Core")).map(|p| p.branch), Some(main));

    let at_l0 = package.pinned(l0).unwrap();
    assert_eq!(at_l0.metadata(module), Some(&module_metadata(&["B"])));
    assert_eq!(
        at_l0.module_documentation(module),
        Some(&Documentation::comment("from main"))
    );
    drop(at_l0);
    drop(at_e0);

    // A grandchild write diverges only on the grandchild
    assert_eq!(
        package
            .update_module_metadata(early, module, Some(module_metadata(&["E"])))
            .unwrap(),
        Update::Diverged
    );
    let e1 = commit_on(&mut package, early, "e1");
    assert_eq!(
        package.pinned(e1).unwrap().metadata(module),
        Some(&module_metadata(&["E"]))
    );
    assert_eq!(
        package.pinned(c1).unwrap().metadata(module),
        Some(&module_metadata(&["B"]))
    );
    assert_eq!(package.tree().get(child).unwrap().modules().divergences(), 1);
    assert_eq!(package.tree().get(early).unwrap().modules().divergences(), 1);
    assert_eq!(package.tree().get(late).unwrap().modules().divergences(), 0);
}

#[test]
fn excavation_ceilings_across_two_inherited_segments() {
    let (mut package, main, module) = setup_main_with_module();
    package
        .update_module_metadata(main, module, Some(module_metadata(&["A"])))
        .unwrap();
    let v0 = commit_on(&mut package, main, "r0");

    let child = package.branch(tag("child"), Some(v0)).unwrap();
    let c0 = commit_on(&mut package, child, "c0");
    package.update_module_metadata(child, module, None).unwrap();
    let c1 = commit_on(&mut package, child, "c1");

    // Forked before the child's extinction: the module is still alive
    let early = package.branch(tag("early"), Some(c0)).unwrap();
    let e0 = commit_on(&mut package, early, "e0");
    let at_e0 = package.pinned(e0).unwrap();
    assert!(at_e0.exists::<Module>(module));
    assert_eq!(at_e0.excavate::<Module>(module), Some(e0));
    drop(at_e0);

    // Forked after it: the last living version is the child's c0
    let late = package.branch(tag("late"), Some(c1)).unwrap();
    let l0 = commit_on(&mut package, late, "l0");
    let at_l0 = package.pinned(l0).unwrap();
    assert!(!at_l0.exists::<Module>(module));
    assert_eq!(at_l0.excavate::<Module>(module), Some(c0));
    drop(at_l0);

    // Extinct on the grandchild itself: its own fork point is the ceiling
    package.update_module_metadata(early, module, None).unwrap();
    let e1 = commit_on(&mut package, early, "e1");
    let at_e1 = package.pinned(e1).unwrap();
    assert!(!at_e1.exists::<Module>(module));
    assert_eq!(at_e1.excavate::<Module>(module), Some(e0));
}
