//! Environment-scoped macro registry with lazy autoloading.
//!
//! # Error Handling
//!
//! Registration fails only on malformed names. Lookup never fails: a macro that cannot be
//! found or autoloaded is simply absent, and the miss is reported through `tracing` at debug
//! level. Turning an absent macro into an error is the dispatcher's job.
//!
//! # Lookup order
//!
//! | Step | Source                       | Notes                                  |
//! |------|------------------------------|----------------------------------------|
//! | 1    | `macros(env)[name]`          | environment-local definitions win      |
//! | 2    | `macros(root)[name]`         | global fallback                        |
//! | 3    | `load(name, env)`            | only when `autoload` is requested      |
//!
//! # Thread Safety
//! `Registry` is `Send + Sync`. The environment map and every per-environment table sit behind
//! `parking_lot::RwLock`s. No guard is held while the namespace loader runs or while a macro
//! body executes, so loaders may register macros and bodies may dispatch other macros.
//!
//! # Known quirk
//! `newmacro` checks for an existing definition (and logs the overwrite) *before* it validates
//! the name, so the overwrite notice can fire for a name that is then rejected. Callers rely on
//! this ordering; keep it.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::config::Config;
use crate::environment::{EnvironmentProvider, FixedEnvironment};
use crate::macros::loader::{NamespaceLoader, NullLoader};
use crate::macros::name::validate_name;
use crate::macros::types::Macro;
use crate::{Environment, ErrorKind, MacroError, Value};

/// The macros of one environment, shared by reference.
///
/// Repeated calls to [`Registry::macros`] for the same environment return handles to the same
/// table, so mutations through one handle are visible through the others.
pub type MacroTable = Arc<RwLock<HashMap<String, Macro>>>;

/// Options accepted by [`Registry::newmacro`].
#[derive(Debug, Clone, Default)]
pub struct NewMacroOptions {
    /// Target environment; the registry's default environment when unset.
    pub environment: Option<Environment>,
}

impl NewMacroOptions {
    pub fn in_environment(env: Environment) -> Self {
        NewMacroOptions {
            environment: Some(env),
        }
    }
}

/// Macro registry keyed by environment.
///
/// # Example
/// ```rust
/// use macrodex::macros::{Macro, NewMacroOptions, Registry};
/// use macrodex::{Environment, Value};
/// let registry = Registry::new();
/// let root = NewMacroOptions::in_environment(Environment::root());
/// let m = registry
///     .newmacro("greeting", &root, Macro::with_arity(0, |_, _| Ok(Value::from("hi"))))
///     .unwrap();
/// let found = registry.lookup("greeting", &Environment::new("production"), false).unwrap();
/// assert!(found.ptr_eq(&m));
/// ```
pub struct Registry {
    tables: RwLock<HashMap<Environment, MacroTable>>,
    loader: Box<dyn NamespaceLoader>,
    environments: Box<dyn EnvironmentProvider>,
}

impl Default for Registry {
    fn default() -> Self {
        Registry::builder().build()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("environments", &self.environments())
            .finish_non_exhaustive()
    }
}

impl Registry {
    /// Creates an empty registry with no loader and no current environment.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// The host's current environment, or [`Environment::unset`] when it has none.
    pub fn default_environment(&self) -> Environment {
        self.environments.current().unwrap_or_else(Environment::unset)
    }

    /// Returns the macro table of `env`, creating it on first use.
    pub fn macros(&self, env: &Environment) -> MacroTable {
        let existing = self.tables.read().get(env).map(Arc::clone);
        if let Some(table) = existing {
            return table;
        }
        let mut tables = self.tables.write();
        Arc::clone(tables.entry(env.clone()).or_default())
    }

    /// Finds a macro by name: `env` first, then the root environment, then (when `autoload` is
    /// set) the namespace loader.
    pub fn lookup(&self, name: &str, env: &Environment, autoload: bool) -> Option<Macro> {
        let local = self.macros(env).read().get(name).cloned();
        if local.is_some() {
            return local;
        }
        let global = self.macros(&Environment::root()).read().get(name).cloned();
        if global.is_some() {
            return global;
        }
        if autoload {
            self.load(name, env)
        } else {
            None
        }
    }

    /// Defines or replaces a macro.
    ///
    /// The target environment is `options.environment`, or the default environment. Returns the
    /// stored macro.
    ///
    /// # Errors
    /// Returns an `Argument` error when `name` is not a valid macro name.
    pub fn newmacro(
        &self,
        name: &str,
        options: &NewMacroOptions,
        body: Macro,
    ) -> Result<Macro, MacroError> {
        let env = options
            .environment
            .clone()
            .unwrap_or_else(|| self.default_environment());
        if self.lookup(name, &env, false).is_some() {
            debug!("overwriting macro {}", name);
        }
        validate_name(&Value::from(name), ErrorKind::Argument)?;
        self.macros(&env).write().insert(name.to_string(), body.clone());
        Ok(body)
    }

    /// Autoloads `name` for `env` from the namespace path derived from the name
    /// (`foo::bar` becomes `foo/bar`).
    pub fn load(&self, name: &str, env: &Environment) -> Option<Macro> {
        let path = name.split("::").collect::<Vec<_>>().join("/");
        self.load_from_file(name, &path, env)
    }

    /// Loads the resource at `path` and returns `name` if the resource defined it.
    ///
    /// Misses are soft: they are logged and yield `None`. Nothing is cached, so the next lookup
    /// tries again.
    pub fn load_from_file(&self, name: &str, path: &str, env: &Environment) -> Option<Macro> {
        match self.loader.load(self, path, env) {
            Ok(true) => {
                let found = self.lookup(name, env, false);
                if found.is_none() {
                    debug!(
                        "{} loaded but it didn't define macro {}",
                        quoted(&self.loader.expand(path, env)),
                        quoted(name)
                    );
                }
                found
            }
            Ok(false) => {
                debug!("could not autoload {}", quoted(&self.loader.expand(path, env)));
                None
            }
            Err(e) => {
                warn!(
                    "failed to autoload {}: {}",
                    quoted(&self.loader.expand(path, env)),
                    e
                );
                None
            }
        }
    }

    /// Eagerly loads every macro definition the loader can find.
    pub fn loadall(&self) -> Vec<PathBuf> {
        self.loader.loadall(self)
    }

    /// Environments whose tables have been created, sorted by name.
    pub fn environments(&self) -> Vec<Environment> {
        let mut envs: Vec<Environment> = self.tables.read().keys().cloned().collect();
        envs.sort();
        envs
    }

    /// Names defined directly in `env` (without the root fallback), sorted.
    pub fn names(&self, env: &Environment) -> Vec<String> {
        let mut names: Vec<String> = self.macros(env).read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Discards every table. Handles returned earlier by [`Registry::macros`] are detached.
    pub fn reset(&self) {
        self.tables.write().clear();
    }
}

fn quoted(s: &str) -> String {
    Value::from(s).inspect()
}

/// Builder for [`Registry`].
#[derive(Default)]
pub struct RegistryBuilder {
    loader: Option<Box<dyn NamespaceLoader>>,
    environments: Option<Box<dyn EnvironmentProvider>>,
}

impl RegistryBuilder {
    pub fn loader(mut self, loader: impl NamespaceLoader + 'static) -> Self {
        self.loader = Some(Box::new(loader));
        self
    }

    pub fn environment_provider(mut self, provider: impl EnvironmentProvider + 'static) -> Self {
        self.environments = Some(Box::new(provider));
        self
    }

    /// Shorthand for a provider that always reports `env`.
    pub fn default_environment(self, env: Environment) -> Self {
        self.environment_provider(FixedEnvironment::new(env))
    }

    pub fn build(self) -> Registry {
        Registry {
            tables: RwLock::new(HashMap::new()),
            loader: self.loader.unwrap_or_else(|| Box::new(NullLoader)),
            environments: self
                .environments
                .unwrap_or_else(|| Box::new(FixedEnvironment::default())),
        }
    }
}

static GLOBAL: Lazy<Registry> = Lazy::new(|| Config::from_env().build_registry());

/// The process-wide registry, configured from the environment on first use.
///
/// See [`Config::from_env`] for the variables consulted.
pub fn global() -> &'static Registry {
    &GLOBAL
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constant(value: &'static str) -> Macro {
        Macro::with_arity(0, move |_, _| Ok(Value::from(value)))
    }

    #[test]
    fn test_macros_is_idempotent() {
        let registry = Registry::new();
        let env = Environment::new("env1");
        let first = registry.macros(&env);
        let second = registry.macros(&env);
        assert!(Arc::ptr_eq(&first, &second));
        first.write().insert("foo".to_string(), constant("foo"));
        assert!(second.read().contains_key("foo"));
    }

    #[test]
    fn test_newmacro_then_lookup_returns_same_callable() {
        let registry = Registry::builder()
            .default_environment(Environment::new("env0"))
            .build();
        let body = constant("yes its me");
        let stored = registry
            .newmacro("foo", &NewMacroOptions::default(), body.clone())
            .unwrap();
        assert!(stored.ptr_eq(&body));
        let found = registry.lookup("foo", &Environment::new("env0"), false).unwrap();
        assert!(found.ptr_eq(&body));
        assert!(registry.lookup("foo", &Environment::new("env1"), false).is_none());
    }

    #[test]
    fn test_environment_shadowing() {
        let registry = Registry::new();
        let env = Environment::new("env1");
        let global = constant("root");
        let local = constant("local");
        registry
            .newmacro("m", &NewMacroOptions::in_environment(Environment::root()), global.clone())
            .unwrap();
        assert!(registry.lookup("m", &env, false).unwrap().ptr_eq(&global));
        registry
            .newmacro("m", &NewMacroOptions::in_environment(env.clone()), local.clone())
            .unwrap();
        assert!(registry.lookup("m", &env, false).unwrap().ptr_eq(&local));
        assert!(registry
            .lookup("m", &Environment::new("env2"), false)
            .unwrap()
            .ptr_eq(&global));
    }

    #[test]
    fn test_newmacro_rejects_invalid_name() {
        let registry = Registry::new();
        let err = registry
            .newmacro("Foo", &NewMacroOptions::default(), constant("x"))
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Argument);
        assert_eq!(err.to_string(), "Invalid macro name \"Foo\"");
        assert!(registry.names(&Environment::unset()).is_empty());
    }

    #[test]
    fn test_unset_default_environment() {
        let registry = Registry::new();
        assert_eq!(registry.default_environment(), Environment::unset());
        registry
            .newmacro("foo", &NewMacroOptions::default(), constant("x"))
            .unwrap();
        assert_eq!(registry.names(&Environment::unset()), vec!["foo".to_string()]);
    }

    #[test]
    fn test_reset_discards_tables() {
        let registry = Registry::new();
        let env = Environment::new("env0");
        registry
            .newmacro("foo", &NewMacroOptions::in_environment(env.clone()), constant("x"))
            .unwrap();
        assert_eq!(registry.environments().len(), 2);
        registry.reset();
        assert!(registry.environments().is_empty());
        assert!(registry.lookup("foo", &env, false).is_none());
    }

    #[test]
    fn test_load_splits_name_into_path() {
        use crate::macros::loader::ModuleLoader;
        let loader = ModuleLoader::new().with_module("foo/bar", |registry, env| {
            registry.newmacro(
                "foo::bar",
                &NewMacroOptions::in_environment(env.clone()),
                Macro::with_arity(0, |_, _| Ok(Value::from("macro foo::bar"))),
            )?;
            Ok(())
        });
        let registry = Registry::builder().loader(loader).build();
        let env = Environment::new("env1");
        let m = registry.load("foo::bar", &env).unwrap();
        assert_eq!(
            m.call(&crate::VarScope::new(), &[]).unwrap(),
            Value::from("macro foo::bar")
        );
        assert_eq!(registry.names(&env), vec!["foo::bar".to_string()]);
    }
}
