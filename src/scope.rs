//! The execution context handed to macro bodies.

use im::HashMap;

use crate::Value;

/// Caller-scope state observable from inside a macro body.
pub trait Scope {
    /// Looks up a variable visible from the calling scope.
    fn lookup_var(&self, name: &str) -> Option<Value>;
}

/// A scope backed by a flat variable map.
///
/// A leading `::` addresses the top scope; since there is only one level here it is stripped.
///
/// ```rust
/// use macrodex::{Scope, Value, VarScope};
/// let scope = VarScope::new().with_var("osfamily", "Debian");
/// assert_eq!(scope.lookup_var("::osfamily"), Some(Value::from("Debian")));
/// assert_eq!(scope.lookup_var("missing"), None);
/// ```
#[derive(Debug, Clone, Default)]
pub struct VarScope {
    vars: HashMap<String, Value>,
}

impl VarScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_var(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set_var(name, value);
        self
    }

    pub fn set_var(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let name = name.strip_prefix("::").map(str::to_string).unwrap_or(name);
        self.vars.insert(name, value.into());
    }
}

impl Scope for VarScope {
    fn lookup_var(&self, name: &str) -> Option<Value> {
        let name = name.strip_prefix("::").unwrap_or(name);
        self.vars.get(name).cloned()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for VarScope {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut scope = VarScope::new();
        for (name, value) in iter {
            scope.set_var(name, value);
        }
        scope
    }
}
