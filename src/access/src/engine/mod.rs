//! Engine façade: access-checked module loading
//!
//! Wraps a [`ModuleLoader`] so every load is checked against the package
//! policy, with the innermost in-flight load as the caller.
//!
//! # Architecture
//!
//! ```text
//! load(path) → CallStack::current → AccessPolicy → Resolver → main-file rewrite
//!                                                                 ↓
//!                                  CallStack::enter → ModuleLoader::load → (nested loads)
//! ```

mod stack;

pub use stack::{CallStack, StackFrame, ROOT_CONTEXT};

use tracing::debug;

use crate::config::{self, Options};
use crate::error::Result;
use crate::loader::ModuleLoader;
use crate::package::PackageSpec;
use crate::policy::{AccessPolicy, Decision};
use crate::resolver::Resolver;

/// Access-checked loader
pub struct Engine<L> {
    /// Package registry
    resolver: Resolver,

    /// In-flight loads
    stack: CallStack,

    /// Wrapped base loader
    loader: L,
}

impl<L: ModuleLoader> Engine<L> {
    /// Creates an engine around `loader` with default options and no packages
    pub fn new(loader: L) -> Self {
        Self {
            resolver: Resolver::new(),
            stack: CallStack::new(),
            loader,
        }
    }

    /// Sets global options once; call before `init` so defaults apply to
    /// the initial tree
    pub fn configure(&self, options: Options) -> Result<()> {
        self.resolver.configure(options)
    }

    /// Loads the package tree once
    pub fn init<I>(&self, specs: I) -> Result<()>
    where
        I: IntoIterator<Item = PackageSpec>,
    {
        self.resolver.init(specs)
    }

    /// Loads the package tree from JSON text
    pub fn init_json(&self, json: &str) -> Result<()> {
        self.init(config::parse_packages(json)?)
    }

    /// Access decision for `caller` loading `target`, without loading
    pub fn check(&self, caller: &str, target: &str) -> Result<Decision> {
        AccessPolicy::new(&self.resolver).check(caller, target)
    }

    /// Loads `path` on behalf of the innermost in-flight load
    ///
    /// # Errors
    ///
    /// - `AccessDenied` if the policy refuses the load; the base loader is
    ///   not called
    /// - any error from the base loader, unchanged
    pub fn load(&self, path: &str) -> Result<L::Module> {
        let caller = self.stack.current();
        self.check(&caller, path)?.into_result()?;

        // A bare package location loads the package's main file
        let target = match self.resolver.resolve(path)? {
            Some(package) if package.location() == path => package.main_path().to_string(),
            _ => path.to_string(),
        };

        debug!(
            caller = %caller,
            path = %target,
            depth = self.stack.depth(),
            "Loading module"
        );

        let _frame = self.stack.enter(target.as_str());
        let result = self.loader.load(self, &target);

        debug!(path = %target, ok = result.is_ok(), "Module load finished");
        result
    }

    /// Caller context for the next load
    pub fn current_context(&self) -> String {
        self.stack.current()
    }

    /// Number of in-flight loads
    pub fn depth(&self) -> usize {
        self.stack.depth()
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }
}
