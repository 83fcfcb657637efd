//! Namespace loaders: the collaborators that turn a namespace path into macro definitions.
//!
//! A loader is asked to "load" a relative path such as `foo/bar` for an environment. Loading
//! is expected to register macros as a side effect, by calling back into
//! [`Registry::newmacro`]. The registry never holds a lock while a loader runs, so this
//! re-entrancy is safe.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::warn;

use crate::macros::Registry;
use crate::{Environment, MacroError};

/// Resolves namespace paths to macro definitions.
pub trait NamespaceLoader: Send + Sync {
    /// Loads the resource at `path` for `env`.
    ///
    /// Returns `Ok(false)` when no resource exists at that path, `Ok(true)` when one existed and
    /// was executed, and an error when it existed but could not be executed.
    fn load(&self, registry: &Registry, path: &str, env: &Environment) -> Result<bool, MacroError>;

    /// Renders the location `path` resolves to for `env`. Used in diagnostics only.
    fn expand(&self, path: &str, env: &Environment) -> String;

    /// Eagerly loads every resource under the macro namespace, for every environment the
    /// loader knows about. Returns the loaded resources.
    fn loadall(&self, registry: &Registry) -> Vec<PathBuf>;
}

/// A loader with no resources. Every autoload misses.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullLoader;

impl NamespaceLoader for NullLoader {
    fn load(&self, _registry: &Registry, _path: &str, _env: &Environment) -> Result<bool, MacroError> {
        Ok(false)
    }

    fn expand(&self, path: &str, _env: &Environment) -> String {
        path.to_string()
    }

    fn loadall(&self, _registry: &Registry) -> Vec<PathBuf> {
        Vec::new()
    }
}

/// Code run when a module is loaded. It is expected to call `newmacro`.
pub type ModuleFn = dyn Fn(&Registry, &Environment) -> Result<(), MacroError> + Send + Sync;

/// An in-memory loader for compiled-in macro sets.
///
/// Each namespace path maps to a definer closure, the Rust counterpart of a macro file.
///
/// ```rust
/// use macrodex::macros::{Macro, ModuleLoader, NewMacroOptions, Registry};
/// use macrodex::{Environment, Value};
/// let loader = ModuleLoader::new().with_module("foo/bar", |registry, env| {
///     let body = Macro::with_arity(0, |_, _| Ok(Value::from("bar")));
///     registry.newmacro("foo::bar", &NewMacroOptions::in_environment(env.clone()), body)?;
///     Ok(())
/// });
/// let registry = Registry::builder().loader(loader).build();
/// assert!(registry.lookup("foo::bar", &Environment::new("production"), true).is_some());
/// ```
#[derive(Clone)]
pub struct ModuleLoader {
    namespace: String,
    modules: BTreeMap<String, Arc<ModuleFn>>,
}

impl Default for ModuleLoader {
    fn default() -> Self {
        ModuleLoader {
            namespace: "macros".to_string(),
            modules: BTreeMap::new(),
        }
    }
}

impl ModuleLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the namespace prefix used when rendering paths.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Adds a module at `path`, replacing any previous one.
    pub fn with_module<F>(mut self, path: impl Into<String>, define: F) -> Self
    where
        F: Fn(&Registry, &Environment) -> Result<(), MacroError> + Send + Sync + 'static,
    {
        self.modules.insert(path.into(), Arc::new(define));
        self
    }

    pub fn paths(&self) -> impl Iterator<Item = &String> {
        self.modules.keys()
    }

    fn render(&self, path: &str) -> String {
        format!("{}/{}", self.namespace, path)
    }
}

impl fmt::Debug for ModuleLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleLoader")
            .field("namespace", &self.namespace)
            .field("modules", &self.modules.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl NamespaceLoader for ModuleLoader {
    fn load(&self, registry: &Registry, path: &str, env: &Environment) -> Result<bool, MacroError> {
        let Some(define) = self.modules.get(path) else {
            return Ok(false);
        };
        define(registry, env)?;
        Ok(true)
    }

    fn expand(&self, path: &str, _env: &Environment) -> String {
        self.render(path)
    }

    /// Modules carry no environment of their own; they are loaded into the root environment.
    fn loadall(&self, registry: &Registry) -> Vec<PathBuf> {
        let root = Environment::root();
        let mut loaded = Vec::new();
        for (path, define) in &self.modules {
            match define(registry, &root) {
                Ok(()) => loaded.push(PathBuf::from(self.render(path))),
                Err(e) => warn!("failed to load {:?}: {}", self.render(path), e),
            }
        }
        loaded
    }
}
