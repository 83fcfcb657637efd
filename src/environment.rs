//! Environments partition the macro registry.
//!
//! An environment is an opaque, cheaply clonable name. The registry never creates
//! environments on its own initiative; they come from the host, either explicitly with a call or
//! through an [`EnvironmentProvider`] that answers "which environment is current?".

use std::fmt;
use std::sync::Arc;

const ROOT_NAME: &str = "*root*";

/// An isolated namespace of macros.
///
/// # Examples
///
/// ```rust
/// use macrodex::Environment;
/// let production = Environment::new("production");
/// assert_eq!(production, Environment::new("production"));
/// assert!(!production.is_root());
/// assert!(Environment::root().is_root());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Environment(Arc<str>);

impl Environment {
    pub fn new(name: impl AsRef<str>) -> Self {
        Environment(Arc::from(name.as_ref()))
    }

    /// The distinguished fallback environment consulted when a macro is missing from the
    /// requested one.
    pub fn root() -> Self {
        Environment::new(ROOT_NAME)
    }

    /// Stand-in used when the host has no current environment configured.
    pub fn unset() -> Self {
        Environment::new("")
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        &*self.0 == ROOT_NAME
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Supplies the host's notion of the current environment.
///
/// Returning `None` is legitimate: the host may have no environment configured.
pub trait EnvironmentProvider: Send + Sync {
    fn current(&self) -> Option<Environment>;
}

/// A provider that always answers with the same environment.
#[derive(Debug, Clone, Default)]
pub struct FixedEnvironment(pub Option<Environment>);

impl FixedEnvironment {
    pub fn new(env: Environment) -> Self {
        FixedEnvironment(Some(env))
    }
}

impl EnvironmentProvider for FixedEnvironment {
    fn current(&self) -> Option<Environment> {
        self.0.clone()
    }
}

impl<F> EnvironmentProvider for F
where
    F: Fn() -> Option<Environment> + Send + Sync,
{
    fn current(&self) -> Option<Environment> {
        self()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_and_unset_are_distinct() {
        assert_ne!(Environment::root(), Environment::unset());
        assert!(!Environment::unset().is_root());
        assert_eq!(Environment::root().to_string(), "*root*");
    }

    #[test]
    fn test_closure_provider() {
        let provider = || Some(Environment::new("staging"));
        assert_eq!(provider.current(), Some(Environment::new("staging")));
        assert_eq!(FixedEnvironment::default().current(), None);
    }
}
