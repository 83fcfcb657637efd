//! Declarative template macros.
//!
//! A template macro is what a definition file produces: a parameter list and a body value.
//! Calling it binds the arguments to the parameters and substitutes placeholders in every
//! string of the body:
//!
//! - `$x` or `${x}`: the argument bound to parameter `x`
//! - `${::var}` (or any `::`-qualified name): a variable looked up in the caller's scope
//!
//! A string that consists of exactly one placeholder evaluates to the bound value itself, so
//! `"$b"` returns the argument unchanged rather than its string form. Unset scope variables
//! evaluate to undef.

use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Deserializer};

use crate::macros::types::{Macro, Param, ParamKind, Signature};
use crate::{err_msg, MacroError, Scope, Value};

static PLACEHOLDER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\$(?:\{((?:::)?[a-z_][a-z0-9_]*(?:::[a-z_][a-z0-9_]*)*)\}|([a-z_][a-z0-9_]*))",
    )
    .expect("placeholder pattern is valid")
});

static PARAM_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z_][a-z0-9_]*$").expect("parameter pattern is valid"));

/// A parameter as written in a definition file.
///
/// ```yaml
/// params:
///   - x                          # required
///   - { name: y, default: 80 }   # optional
///   - { name: z, rest: true }    # variadic
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ParamSpec {
    Name(String),
    Detailed {
        name: String,
        #[serde(default, deserialize_with = "present")]
        default: Option<Value>,
        #[serde(default)]
        rest: bool,
    },
}

/// Distinguishes `default: ~` (optional, defaults to nil) from a missing `default` key.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl ParamSpec {
    pub fn name(&self) -> &str {
        match self {
            ParamSpec::Name(name) | ParamSpec::Detailed { name, .. } => name,
        }
    }
}

#[derive(Debug, Clone)]
struct TemplateParam {
    param: Param,
    default: Value,
}

/// A declarative macro: parameters plus a body value with placeholders.
#[derive(Debug, Clone)]
pub struct MacroTemplate {
    params: Vec<TemplateParam>,
    body: Value,
    doc: Option<String>,
}

impl MacroTemplate {
    /// Builds a template, checking the parameter list and the placeholders of the body.
    ///
    /// # Errors
    /// Duplicate or malformed parameter names, a rest parameter that is not last, a required
    /// parameter after an optional one, or a placeholder naming an undeclared parameter.
    pub fn new(specs: Vec<ParamSpec>, body: Value) -> Result<Self, MacroError> {
        let mut params = Vec::with_capacity(specs.len());
        let mut seen = HashSet::new();
        let mut optional_seen = false;
        for (i, spec) in specs.iter().enumerate() {
            let name = spec.name();
            if !PARAM_NAME_RE.is_match(name) {
                return Err(err_msg!(General, "Invalid parameter name {}", Value::from(name).inspect()));
            }
            if !seen.insert(name.to_string()) {
                return Err(err_msg!(General, "Duplicate parameter name '{}'", name));
            }
            let (param, default) = match spec {
                ParamSpec::Detailed { rest: true, .. } => {
                    if i + 1 != specs.len() {
                        return Err(err_msg!(
                            General,
                            "Rest parameter '{}' must be the last parameter",
                            name
                        ));
                    }
                    (Param::rest(name), Value::Nil)
                }
                ParamSpec::Detailed {
                    default: Some(default),
                    ..
                } => {
                    optional_seen = true;
                    (Param::optional(name), default.clone())
                }
                _ => {
                    if optional_seen {
                        return Err(err_msg!(
                            General,
                            "Required parameter '{}' follows an optional parameter",
                            name
                        ));
                    }
                    (Param::required(name), Value::Nil)
                }
            };
            params.push(TemplateParam { param, default });
        }

        let template = MacroTemplate {
            params,
            body,
            doc: None,
        };
        let mut referenced = Vec::new();
        collect_placeholders(&template.body, &mut referenced);
        if let Some(unknown) = referenced.iter().find(|name| !seen.contains(name.as_str())) {
            return Err(err_msg!(General, "Unknown parameter '{}' in template body", unknown));
        }
        Ok(template)
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    /// The declared parameters, in order.
    pub fn signature(&self) -> Signature {
        Signature::Params(self.params.iter().map(|p| p.param.clone()).collect())
    }

    /// Binds `args` and substitutes every placeholder of the body.
    pub fn expand(&self, scope: &dyn Scope, args: &[Value]) -> Value {
        let mut bindings: HashMap<&str, Value> = HashMap::new();
        for (i, tp) in self.params.iter().enumerate() {
            let bound = match tp.param.kind {
                ParamKind::Required => args.get(i).cloned().unwrap_or(Value::Undef),
                ParamKind::Optional => args.get(i).cloned().unwrap_or_else(|| tp.default.clone()),
                ParamKind::Rest => Value::List(args.get(i..).unwrap_or_default().to_vec()),
            };
            bindings.insert(tp.param.name.as_str(), bound);
        }
        expand_value(&self.body, &bindings, scope)
    }

    /// Wraps the template into a registrable macro.
    pub fn into_macro(self) -> Macro {
        let signature = self.signature();
        let doc = self.doc.clone();
        let m = Macro::new(signature, move |scope, args| Ok(self.expand(scope, args)));
        match doc {
            Some(doc) => m.with_doc(doc),
            None => m,
        }
    }
}

/// A placeholder names a scope variable when it is `::`-qualified anywhere.
fn is_scope_var(name: &str) -> bool {
    name.contains("::")
}

fn placeholder_name<'t>(caps: &Captures<'t>) -> &'t str {
    caps.get(1)
        .or_else(|| caps.get(2))
        .map(|m| m.as_str())
        .unwrap_or_default()
}

fn collect_placeholders(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::String(s) => {
            for caps in PLACEHOLDER_RE.captures_iter(s) {
                let name = placeholder_name(&caps);
                if !is_scope_var(name) {
                    out.push(name.to_string());
                }
            }
        }
        Value::List(items) => items.iter().for_each(|item| collect_placeholders(item, out)),
        Value::Map(map) => map.values().for_each(|item| collect_placeholders(item, out)),
        _ => {}
    }
}

fn resolve(name: &str, bindings: &HashMap<&str, Value>, scope: &dyn Scope) -> Value {
    if is_scope_var(name) {
        return scope.lookup_var(name).unwrap_or(Value::Undef);
    }
    bindings.get(name).cloned().unwrap_or(Value::Undef)
}

fn expand_value(value: &Value, bindings: &HashMap<&str, Value>, scope: &dyn Scope) -> Value {
    match value {
        Value::String(s) => {
            if let Some(caps) = PLACEHOLDER_RE.captures(s) {
                let whole = caps.get(0).map(|m| m.as_str().len()).unwrap_or_default();
                if whole == s.len() {
                    return resolve(placeholder_name(&caps), bindings, scope);
                }
            }
            let expanded = PLACEHOLDER_RE.replace_all(s, |caps: &Captures| {
                resolve(placeholder_name(caps), bindings, scope).to_string()
            });
            Value::String(expanded.into_owned())
        }
        Value::List(items) => Value::List(
            items
                .iter()
                .map(|item| expand_value(item, bindings, scope))
                .collect(),
        ),
        Value::Map(map) => Value::Map(
            map.iter()
                .map(|(k, v)| (k.clone(), expand_value(v, bindings, scope)))
                .collect(),
        ),
        other => other.clone(),
    }
}
