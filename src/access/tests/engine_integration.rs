//! Engine integration tests
//!
//! Full load pipeline: call stack → access policy → resolver → base loader.
//! Module bodies perform nested loads, so every check below runs with the
//! caller context a real module graph would produce.

use modvis_access::{
    AccessError, DenialReason, Engine, MemoryLoader, Options, PackageSpec, Pattern, Result, ROOT_CONTEXT,
};

type TestEngine = Engine<MemoryLoader<String>>;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn value(text: &str) -> impl Fn(&TestEngine) -> Result<String> + Send + Sync + 'static {
    let text = text.to_string();
    move |_| Ok(text.clone())
}

fn forward(target: &'static str) -> impl Fn(&TestEngine) -> Result<String> + Send + Sync + 'static {
    move |engine| engine.load(target)
}

fn denial(result: Result<String>) -> Option<DenialReason> {
    result.err().and_then(|err| err.denial_reason())
}

// ============================================================================
// Same Package
// ============================================================================

#[test]
fn test_same_package_access() {
    init_tracing();

    let loader = MemoryLoader::new()
        .with_module("app/main", forward("app/util/strings"))
        .with_module("app/util/strings", forward("app/util/chars"))
        .with_module("app/util/chars", value("chars"));

    let engine = Engine::new(loader);
    engine.init([PackageSpec::new("app").main("main")]).unwrap();

    assert_eq!(engine.load("app").unwrap(), "chars");
    assert_eq!(engine.loader().loaded(), vec!["app/main", "app/util/strings", "app/util/chars"]);
}

// ============================================================================
// Main File Gate
// ============================================================================

#[test]
fn test_main_file_gate_from_outside() {
    init_tracing();

    let loader = MemoryLoader::new()
        .with_module("pkg/main", value("main"))
        .with_module("pkg/other.js", value("other"));

    let engine = Engine::new(loader);
    engine.init([PackageSpec::new("pkg").main("main")]).unwrap();

    let err = engine.load("pkg/other.js").unwrap_err();
    assert_eq!(err.denial_reason(), Some(DenialReason::OutsideToInternal));
    assert_eq!(
        err.to_string(),
        "Access to package internal files from outside of package is denied: \
         attempt to access \"pkg/other.js\" from \"**root**\""
    );

    assert_eq!(engine.load("pkg/main").unwrap(), "main");
    assert_eq!(engine.loader().loaded(), vec!["pkg/main"]);
}

#[test]
fn test_public_surface_from_outside() {
    init_tracing();

    let loader = MemoryLoader::new()
        .with_module("pkg/api/v1", value("v1"))
        .with_module("pkg/nested/index", value("nested"));

    let engine = Engine::new(loader);
    engine
        .init([PackageSpec::new("pkg")
            .public(Pattern::regex("^api/").unwrap())
            .package(PackageSpec::new("nested").public(Pattern::regex(".*").unwrap()))])
        .unwrap();

    assert_eq!(engine.load("pkg/api/v1").unwrap(), "v1");
    assert_eq!(denial(engine.load("pkg/nested")), Some(DenialReason::OutsideToInternal));
}

#[test]
fn test_untracked_from_outside() {
    let engine = Engine::new(MemoryLoader::new().with_module("scripts/build", value("build")));
    engine.init([PackageSpec::new("app")]).unwrap();

    assert_eq!(engine.load("scripts/build").unwrap(), "build");
}

// ============================================================================
// Package Root Rewrite
// ============================================================================

#[test]
fn test_package_root_loads_main_file() {
    init_tracing();

    let loader = MemoryLoader::new()
        .with_module("app/main", forward("app/widgets"))
        .with_module("app/widgets/index", value("widgets"));

    let engine = Engine::new(loader);
    engine
        .init([PackageSpec::new("app").main("main").package(PackageSpec::new("widgets"))])
        .unwrap();

    assert_eq!(engine.load("app").unwrap(), "widgets");
    assert_eq!(engine.loader().loaded(), vec!["app/main", "app/widgets/index"]);
}

#[test]
fn test_configured_main_name() {
    let engine = Engine::new(MemoryLoader::new().with_module("app/entry", value("entry")));
    engine.configure(Options::default().with_main("entry")).unwrap();
    engine.init([PackageSpec::new("app")]).unwrap();

    assert_eq!(engine.load("app").unwrap(), "entry");
}

// ============================================================================
// Nested Protection
// ============================================================================

fn nested_engine(loader: MemoryLoader<String>) -> TestEngine {
    let engine = Engine::new(loader);
    engine
        .init([PackageSpec::new("a")
            .protected(vec![Pattern::exact("secret"), Pattern::exact("index")])
            .package(PackageSpec::new("b").protected("secret"))])
        .unwrap();
    engine
}

#[test]
fn test_parent_cannot_reach_child_protected() {
    init_tracing();

    let loader = MemoryLoader::new()
        .with_module("a/index", forward("a/b/secret"))
        .with_module("a/b/secret", value("child secret"));
    let engine = nested_engine(loader);

    let err = engine.load("a").unwrap_err();
    assert_eq!(err.denial_reason(), Some(DenialReason::CrossPackage));
    assert_eq!(engine.loader().loaded(), vec!["a/index"]);
}

#[test]
fn test_child_reaches_parent_protected() {
    init_tracing();

    let loader = MemoryLoader::new()
        .with_module("a/index", forward("a/b"))
        .with_module("a/b/index", forward("a/secret"))
        .with_module("a/secret", value("parent secret"));
    let engine = nested_engine(loader);

    assert_eq!(engine.load("a").unwrap(), "parent secret");
}

#[test]
fn test_child_cannot_reach_parent_main() {
    init_tracing();

    // "index" is listed as protected but is the parent's main file
    let loader = MemoryLoader::new()
        .with_module("a/index", forward("a/b"))
        .with_module("a/b/index", |engine: &TestEngine| {
            let main = engine.load("a/index");
            let internal = engine.load("a/helpers");
            Ok(format!("{:?} {:?}", denial(main), denial(internal)))
        });
    let engine = nested_engine(loader);

    assert_eq!(engine.load("a").unwrap(), "Some(CrossPackage) Some(CrossPackage)");
}

#[test]
fn test_remote_protected_option() {
    init_tracing();

    let build = |options: Options| {
        let loader = MemoryLoader::new()
            .with_module("a/index", forward("a/b"))
            .with_module("a/b/index", forward("a/b/c"))
            .with_module("a/b/c/index", forward("a/shared"))
            .with_module("a/shared", value("shared"));

        let engine = Engine::new(loader);
        engine.configure(options).unwrap();
        engine
            .init([PackageSpec::new("a")
                .protected("shared")
                .package(PackageSpec::new("b").package(PackageSpec::new("c")))])
            .unwrap();
        engine
    };

    let direct_only = build(Options::default());
    assert_eq!(denial(direct_only.load("a")), Some(DenialReason::CrossPackage));

    let remote = build(Options::default().with_remote_protected(true));
    assert_eq!(remote.load("a").unwrap(), "shared");
}

// ============================================================================
// External Single Entry Point
// ============================================================================

#[test]
fn test_nested_external_rejected() {
    let engine = Engine::new(MemoryLoader::<String>::new());
    let result = engine.init([PackageSpec::new("a")
        .external("lodash")
        .package(PackageSpec::new("b").external("react"))]);

    match result {
        Err(err @ AccessError::InvalidNestedExternal { .. }) => {
            assert_eq!(
                err.to_string(),
                "Nested packages can't have own \"external\" dependencies: package \"b\" inside package \"a\""
            );
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn test_external_through_farthest_ancestor() {
    init_tracing();

    let loader = MemoryLoader::new()
        .with_module("a/index", forward("a/b"))
        .with_module("a/b/index", |engine: &TestEngine| {
            let lodash = engine.load("lodash")?;
            let react = engine.load("react");
            Ok(format!("{} {:?}", lodash, denial(react)))
        })
        .with_module("lodash", value("lodash"))
        .with_module("react", value("react"));

    let engine = Engine::new(loader);
    engine
        .init([PackageSpec::new("a").external("lodash").package(PackageSpec::new("b"))])
        .unwrap();

    assert_eq!(engine.load("a").unwrap(), "lodash Some(OutsideAccessDenied)");
}

#[test]
fn test_default_external_applies_to_top_level_only() {
    let engine = Engine::new(MemoryLoader::<String>::new());
    engine
        .configure(Options::from_json(r#"{ "package_defaults": { "external": ["lodash"] } }"#).unwrap())
        .unwrap();
    engine.init([PackageSpec::new("a").package(PackageSpec::new("b"))]).unwrap();

    assert!(engine.check("a/b/index", "lodash").unwrap().is_allowed());
    assert!(engine.resolver().package("a/b").unwrap().settings().external.is_none());
}

// ============================================================================
// Cross-Package Denial
// ============================================================================

#[test]
fn test_sibling_packages_denied() {
    init_tracing();

    let loader = MemoryLoader::new()
        .with_module("a/index", forward("c/internal"))
        .with_module("c/internal", value("internal"));

    let engine = Engine::new(loader);
    engine
        .init([PackageSpec::new("a"), PackageSpec::new("c").public("api")])
        .unwrap();

    let err = engine.load("a").unwrap_err();
    match err {
        AccessError::AccessDenied { reason, caller, target } => {
            assert_eq!(reason, DenialReason::CrossPackage);
            assert_eq!(caller, "a/index");
            assert_eq!(target, "c/internal");
        }
        other => panic!("unexpected error: {}", other),
    }
}

// ============================================================================
// Pattern Packages
// ============================================================================

#[test]
fn test_pattern_package_idempotence() {
    init_tracing();

    let loader = MemoryLoader::new()
        .with_module("feature-cart/index", value("cart"))
        .with_module("feature-cart/model", value("model"));

    let engine = Engine::new(loader);
    engine
        .init([PackageSpec::new(Pattern::regex("^feature-[a-z]+$").unwrap())])
        .unwrap();

    assert_eq!(engine.load("feature-cart/index").unwrap(), "cart");
    assert_eq!(engine.load("feature-cart/index").unwrap(), "cart");
    assert_eq!(engine.resolver().package_count(), 1);
    assert!(engine.resolver().cache_stats().hits > 0);

    assert_eq!(
        denial(engine.load("feature-cart/model")),
        Some(DenialReason::OutsideToInternal)
    );
}

#[test]
fn test_predicate_packages_nest() {
    init_tracing();

    let loader = MemoryLoader::new()
        .with_module("mod-a/index", forward("mod-a/mod-b"))
        .with_module("mod-a/mod-b/index", value("b"));

    let engine = Engine::new(loader);
    engine
        .init([PackageSpec::new("mod-a").package(PackageSpec::new(Pattern::predicate(|segment| {
            segment.starts_with("mod-")
        })))])
        .unwrap();

    assert_eq!(engine.load("mod-a").unwrap(), "b");
    assert_eq!(
        engine.resolver().parent_of("mod-a/mod-b").as_deref(),
        Some("mod-a")
    );
}

// ============================================================================
// Stack Integrity
// ============================================================================

#[test]
fn test_stack_restored_after_loader_failure() {
    init_tracing();

    let loader = MemoryLoader::new()
        .with_module("app/main", |engine: &TestEngine| {
            let failed = engine.load("app/widgets");
            assert!(matches!(failed, Err(AccessError::Loader(_))));
            assert_eq!(engine.current_context(), "app/main");

            // Only allowed if the caller is still app/main, not app/widgets/index
            engine.load("app/util")
        })
        .with_module("app/widgets/index", |_: &TestEngine| Err(anyhow::anyhow!("widgets failed to evaluate").into()))
        .with_module("app/util", value("util"));

    let engine = Engine::new(loader);
    engine
        .init([PackageSpec::new("app").main("main").package(PackageSpec::new("widgets"))])
        .unwrap();

    assert_eq!(engine.load("app").unwrap(), "util");
    assert_eq!(engine.current_context(), ROOT_CONTEXT);
    assert_eq!(engine.depth(), 0);
}

#[test]
fn test_stack_restored_after_denial() {
    init_tracing();

    let loader = MemoryLoader::new()
        .with_module("a/index", |engine: &TestEngine| {
            assert!(engine.load("c/internal").is_err());
            engine.load("a/helpers")
        })
        .with_module("a/helpers", value("helpers"));

    let engine = Engine::new(loader);
    engine.init([PackageSpec::new("a"), PackageSpec::new("c")]).unwrap();

    assert_eq!(engine.load("a").unwrap(), "helpers");
    assert_eq!(engine.depth(), 0);
}

#[test]
fn test_base_loader_error_propagates_unchanged() {
    let engine = Engine::new(MemoryLoader::<String>::new());
    engine.init([PackageSpec::new("app")]).unwrap();

    match engine.load("app") {
        Err(AccessError::ModuleNotFound(path)) => assert_eq!(path, "app/index"),
        other => panic!("unexpected result: {:?}", other),
    }
    assert_eq!(engine.current_context(), ROOT_CONTEXT);
}

// ============================================================================
// Lifecycle
// ============================================================================

#[test]
fn test_init_and_configure_once() {
    let engine = Engine::new(MemoryLoader::<String>::new());

    engine.configure(Options::default()).unwrap();
    assert!(matches!(
        engine.configure(Options::default()),
        Err(AccessError::AlreadyConfigured)
    ));

    engine.init([PackageSpec::new("app")]).unwrap();
    let err = engine.init([PackageSpec::new("lib")]).unwrap_err();
    assert_eq!(err.to_string(), "Packages list already initialized");
}
