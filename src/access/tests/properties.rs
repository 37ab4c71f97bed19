//! Property-based tests for the access policy

use modvis_access::path;
use modvis_access::{Engine, MemoryLoader, PackageSpec, Pattern, Resolver, ROOT_CONTEXT};
use proptest::prelude::*;

fn engine() -> Engine<MemoryLoader<()>> {
    let engine = Engine::new(MemoryLoader::new());
    engine
        .init([
            PackageSpec::new("app")
                .main("main")
                .public("api")
                .protected("shared")
                .external("lodash")
                .package(PackageSpec::new("widgets").public("button"))
                .package(PackageSpec::new(Pattern::regex("^feature-[a-z]+$").unwrap())),
            PackageSpec::new("lib"),
        ])
        .unwrap();
    engine
}

/// Templates that accept any location, including empty strings
fn permissive_resolver() -> Resolver {
    let resolver = Resolver::new();
    resolver
        .init([
            PackageSpec::new("app")
                .package(PackageSpec::new(Pattern::regex("^[a-z]*$").unwrap()))
                .package(PackageSpec::new(Pattern::predicate(|_| true))),
            PackageSpec::new(Pattern::predicate(|_| true)),
        ])
        .unwrap();
    resolver
}

fn relative_path() -> impl Strategy<Value = String> {
    prop::collection::vec("[a-z]{1,8}", 1..4).prop_map(|segments| segments.join("/"))
}

fn any_path() -> impl Strategy<Value = String> {
    prop_oneof![
        relative_path().prop_map(|p| format!("app/{}", p)),
        relative_path().prop_map(|p| format!("app/widgets/{}", p)),
        relative_path().prop_map(|p| format!("app/feature-x/{}", p)),
        relative_path().prop_map(|p| format!("lib/{}", p)),
        relative_path(),
    ]
}

/// Paths with leading, trailing and doubled delimiters
fn ragged_path() -> impl Strategy<Value = String> {
    let path = prop::collection::vec("[a-z]{0,4}", 1..5).prop_map(|segments| segments.join("/"));
    prop_oneof![
        path.clone(),
        path.clone().prop_map(|p| format!("app/{}", p)),
        path.clone().prop_map(|p| format!("/{}", p)),
        path.prop_map(|p| format!("{}/", p)),
    ]
}

proptest! {
    #[test]
    fn test_same_package_always_allowed(caller in any_path(), target in any_path()) {
        let engine = engine();
        let resolver = engine.resolver();

        let caller_pkg = resolver.resolve(&caller).unwrap();
        let target_pkg = resolver.resolve(&target).unwrap();

        if let (Some(c), Some(t)) = (caller_pkg, target_pkg) {
            if c.location() == t.location() {
                prop_assert!(engine.check(&caller, &target).unwrap().is_allowed());
            }
        }
    }

    #[test]
    fn test_decision_determinism(caller in any_path(), target in any_path()) {
        let engine = engine();

        let first = engine.check(&caller, &target).unwrap();
        let second = engine.check(&caller, &target).unwrap();

        prop_assert_eq!(first.access, second.access);
        prop_assert_eq!(first.caller_package, second.caller_package);
        prop_assert_eq!(first.target_package, second.target_package);
    }

    #[test]
    fn test_resolution_order_independent(paths in prop::collection::vec(any_path(), 1..8)) {
        let forward = engine();
        let backward = engine();

        let owners: Vec<Option<String>> = paths
            .iter()
            .map(|p| forward.resolver().resolve(p).unwrap().map(|pkg| pkg.location().to_string()))
            .collect();

        let mut reversed: Vec<Option<String>> = paths
            .iter()
            .rev()
            .map(|p| backward.resolver().resolve(p).unwrap().map(|pkg| pkg.location().to_string()))
            .collect();
        reversed.reverse();

        prop_assert_eq!(owners, reversed);
    }

    #[test]
    fn test_untracked_paths_open_to_root(target in relative_path()) {
        let engine = engine();
        prop_assume!(engine.resolver().resolve(&target).unwrap().is_none());

        prop_assert!(engine.check(ROOT_CONTEXT, &target).unwrap().is_allowed());
    }

    #[test]
    fn test_owner_is_ancestor_of_path(path in any_path()) {
        let engine = engine();

        if let Some(owner) = engine.resolver().resolve(&path).unwrap() {
            let prefix = format!("{}/", owner.location());
            prop_assert!(path == owner.location() || path.starts_with(&prefix));
        }
    }

    #[test]
    fn test_ragged_paths_resolve_to_canonical_owner(paths in prop::collection::vec(ragged_path(), 1..6)) {
        let resolver = permissive_resolver();

        for p in &paths {
            if let Some(owner) = resolver.resolve(p).unwrap() {
                prop_assert!(path::is_canonical(owner.location()));
                let owner_prefix = format!("{}/", owner.location());
                prop_assert!(p == owner.location() || p.starts_with(&owner_prefix));
            }
        }
        prop_assert!(resolver.package("").is_none());
    }
}
