//! Base loader collaborator
//!
//! The engine adds access control in front of a host-supplied loader and
//! delegates the actual loading to it. Loaders receive the engine so module
//! bodies can load their own dependencies through it.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::engine::Engine;
use crate::error::{AccessError, Result};

/// Host loading primitive wrapped by [`Engine`]
pub trait ModuleLoader: Sized {
    /// Loaded module value
    type Module;

    /// Loads `path`; nested loads must go through `engine`
    fn load(&self, engine: &Engine<Self>, path: &str) -> Result<Self::Module>;
}

type ModuleBody<M> = Arc<dyn Fn(&Engine<MemoryLoader<M>>) -> Result<M> + Send + Sync>;

/// In-memory loader keyed by exact path
///
/// Module bodies run on every load (there is no module cache) and may
/// perform nested loads through the engine they receive.
///
/// # Examples
///
/// ```
/// use modvis_access::{Engine, MemoryLoader, PackageSpec};
///
/// let loader = MemoryLoader::new()
///     .with_value("app/index", "app")
///     .with_module("main", |engine| engine.load("app"));
///
/// let engine = Engine::new(loader);
/// engine.init([PackageSpec::new("app")]).unwrap();
///
/// assert_eq!(engine.load("main").unwrap(), "app");
/// assert_eq!(engine.loader().loaded(), vec!["main", "app/index"]);
/// ```
pub struct MemoryLoader<M> {
    modules: HashMap<String, ModuleBody<M>>,
    /// Paths handed to the loader, in call order
    loaded: Mutex<Vec<String>>,
}

impl<M> MemoryLoader<M> {
    pub fn new() -> Self {
        Self {
            modules: HashMap::new(),
            loaded: Mutex::new(Vec::new()),
        }
    }

    /// Registers a module body at `path`
    pub fn with_module<F>(mut self, path: impl Into<String>, body: F) -> Self
    where
        F: Fn(&Engine<MemoryLoader<M>>) -> Result<M> + Send + Sync + 'static,
    {
        self.modules.insert(path.into(), Arc::new(body));
        self
    }

    /// Registers a module that evaluates to a fixed value
    pub fn with_value(self, path: impl Into<String>, value: M) -> Self
    where
        M: Clone + Send + Sync + 'static,
    {
        self.with_module(path, move |_| Ok(value.clone()))
    }

    pub fn contains(&self, path: &str) -> bool {
        self.modules.contains_key(path)
    }

    /// Paths loaded so far, in call order
    pub fn loaded(&self) -> Vec<String> {
        self.loaded.lock().clone()
    }
}

impl<M> Default for MemoryLoader<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> fmt::Debug for MemoryLoader<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut paths: Vec<&String> = self.modules.keys().collect();
        paths.sort();
        f.debug_struct("MemoryLoader").field("modules", &paths).finish()
    }
}

impl<M> ModuleLoader for MemoryLoader<M> {
    type Module = M;

    fn load(&self, engine: &Engine<Self>, path: &str) -> Result<M> {
        let body = self
            .modules
            .get(path)
            .cloned()
            .ok_or_else(|| AccessError::ModuleNotFound(path.to_string()))?;

        self.loaded.lock().push(path.to_string());
        body(engine)
    }
}
