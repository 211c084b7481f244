//! Testing utilities for the biome workspace
//!
//! Shared test helpers, fixtures, and value builders.

#![allow(missing_docs)]

use biome_tree::{
    Commit, Declaration, ModuleId, ModuleMetadata, Package, PackageConfig, PackageId, Pins, Symbol,
    SymbolId,
};
use biome_versions::{kind, Atom, BranchIndex, PackageIndex, Tag, Version};
use std::sync::Once;

static TRACING: Once = Once::new();

/// Route `tracing` output through the test harness; `RUST_LOG` filters it
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

pub fn tag(name: &str) -> Tag {
    name.parse().unwrap()
}

pub fn commit(hash: &str) -> Commit {
    Commit::new(hash)
}

pub fn test_config() -> PackageConfig {
    PackageConfig::new()
        .with_keyframe_capacity(8)
        .with_verify_invariants(true)
}

pub fn setup_test_package() -> Package {
    init_tracing();
    Package::new(PackageIndex::new(0), PackageId::from("swift-test"), test_config())
}

/// A package with a `main` branch and one registered module, `Core`
pub fn setup_main_with_module() -> (Package, BranchIndex, Atom<kind::Module>) {
    let mut package = setup_test_package();
    let main = package.branch(tag("main"), None).unwrap();
    let module = package.add_module(main, ModuleId::from("Core")).unwrap();
    (package, main, module)
}

pub fn commit_on(package: &mut Package, branch: BranchIndex, hash: &str) -> Version {
    package.commit(branch, commit(hash), Pins::new()).unwrap()
}

pub fn create_symbol(usr: &str, culture: Atom<kind::Module>) -> Symbol {
    let path = usr.split('.').map(str::to_owned).collect();
    Symbol::new(SymbolId::from(usr), culture, path)
}

pub fn module_metadata(dependencies: &[&str]) -> ModuleMetadata {
    ModuleMetadata::new(dependencies.iter().copied().map(ModuleId::from))
}

pub fn create_declaration(text: &str) -> Declaration {
    Declaration {
        fragments: text.split_whitespace().map(str::to_owned).collect(),
        ..Declaration::default()
    }
}
