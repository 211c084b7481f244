use biome_test_utils::{commit_on, module_metadata, setup_test_package, tag};
use biome_tree::{Module, ModuleId};
use biome_versions::{RevisionIndex, Version};
use proptest::prelude::*;

/// (branch, module name, commit afterwards)
fn operations() -> impl Strategy<Value = Vec<(usize, u8, bool)>> {
    prop::collection::vec((0usize..2, 0u8..6, any::<bool>()), 1..40)
}

proptest! {
    #[test]
    fn prop_offsets_are_monotonic(ops in operations()) {
        let mut package = setup_test_package();
        let main = package.branch(tag("main"), None).unwrap();
        let root = package.add_module(main, ModuleId::from("Root")).unwrap();
        let v0 = commit_on(&mut package, main, "root");
        let feature = package.branch(tag("feature"), Some(v0)).unwrap();
        let start = package.tree().get(feature).unwrap().start();

        for (which, name, commit) in ops {
            let branch = [main, feature][which];
            let id = ModuleId::new(format!("M{name}"));
            let atom = package.add_module(branch, id).unwrap();
            if branch == feature {
                prop_assert!(atom.offset() >= start.modules);
            }
            if commit {
                commit_on(&mut package, branch, "c");
            }
        }
        prop_assert_eq!(package.add_module(feature, ModuleId::from("Root")).unwrap(), root);

        for branch in package.tree().branches() {
            let mut previous = branch.start();
            for (_, revision) in branch.revisions().iter() {
                prop_assert!(revision.ring.contains(&previous));
                previous = revision.ring;
            }
        }
        package.tree().check_invariants();
    }

    #[test]
    fn prop_revert_hides_everything_after_the_boundary(
        values in prop::collection::vec(0u8..3, 2..12),
        keep in 0usize..12,
    ) {
        let mut package = setup_test_package();
        let main = package.branch(tag("main"), None).unwrap();
        let module = package.add_module(main, ModuleId::from("Core")).unwrap();
        let mut versions = Vec::new();
        for value in &values {
            let name = value.to_string();
            package
                .update_module_metadata(main, module, Some(module_metadata(&[name.as_str()])))
                .unwrap();
            versions.push(commit_on(&mut package, main, "c"));
        }
        let keep = keep % values.len();
        let boundary = versions[keep];

        package.revert(main, Some(boundary.revision)).unwrap();
        let after_once = package.keyframes();
        package.revert(main, Some(boundary.revision)).unwrap();
        prop_assert_eq!(package.keyframes(), after_once);

        for (offset, value) in values.iter().enumerate() {
            let version = Version::new(main, RevisionIndex::new(u32::try_from(offset).unwrap()));
            if offset > keep {
                prop_assert!(package.pinned(version).is_err());
                continue;
            }
            let pinned = package.pinned(version).unwrap();
            let name = value.to_string();
            prop_assert_eq!(pinned.metadata(module), Some(&module_metadata(&[name.as_str()])));
            let excavated = pinned.excavate::<Module>(module);
            prop_assert!(excavated.is_some_and(|excavated| excavated.revision <= boundary.revision));
        }
    }
}
