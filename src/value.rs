use im::OrdMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A host value: a macro argument, a macro result, or a scope variable.
///
/// Values serialize untagged, so they map one-to-one onto JSON and YAML data. `Symbol` and
/// `Undef` have no data representation of their own and are never produced by deserialization.
///
/// # Examples
///
/// ```rust
/// use macrodex::Value;
/// let s = Value::from("hello");
/// assert_eq!(s.type_name(), "String");
/// assert_eq!(s.inspect(), "\"hello\"");
/// assert!(Value::default().is_nil());
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Nil,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    List(Vec<Value>),
    Map(OrdMap<String, Value>),
    #[serde(skip_deserializing)]
    Symbol(String),
    #[serde(skip_deserializing)]
    Undef,
}

impl Value {
    /// Returns the type name of the value as a string.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "Nil",
            Value::Bool(_) => "Bool",
            Value::Integer(_) => "Integer",
            Value::Float(_) => "Float",
            Value::String(_) => "String",
            Value::List(_) => "List",
            Value::Map(_) => "Map",
            Value::Symbol(_) => "Symbol",
            Value::Undef => "Undef",
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// Returns the contained string if this is a String value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// True for nil, undef, and empty strings, lists, and maps.
    ///
    /// This is the usual "argument omitted" test inside macro bodies.
    ///
    /// ```rust
    /// use macrodex::Value;
    /// assert!(Value::Undef.is_undef_or_empty());
    /// assert!(Value::from("").is_undef_or_empty());
    /// assert!(!Value::from("x").is_undef_or_empty());
    /// assert!(!Value::Integer(0).is_undef_or_empty());
    /// ```
    pub fn is_undef_or_empty(&self) -> bool {
        match self {
            Value::Nil | Value::Undef => true,
            Value::String(s) => s.is_empty(),
            Value::List(items) => items.is_empty(),
            Value::Map(map) => map.is_empty(),
            _ => false,
        }
    }

    /// Renders the value the way the host prints values in diagnostics.
    ///
    /// Strings are quoted and escaped, symbols carry a leading colon, maps use `=>`.
    ///
    /// ```rust
    /// use macrodex::Value;
    /// assert_eq!(Value::Nil.inspect(), "nil");
    /// assert_eq!(Value::Symbol("undef".into()).inspect(), ":undef");
    /// assert_eq!(Value::List(vec![Value::Integer(1), Value::from("a")]).inspect(), "[1, \"a\"]");
    /// ```
    pub fn inspect(&self) -> String {
        let mut out = String::new();
        self.write_inspect(&mut out);
        out
    }

    fn write_inspect(&self, out: &mut String) {
        match self {
            Value::Nil => out.push_str("nil"),
            Value::Undef => out.push_str(":undef"),
            Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
            Value::Integer(i) => out.push_str(&i.to_string()),
            Value::Float(f) => out.push_str(&format_float(*f)),
            Value::String(s) => push_quoted(out, s),
            Value::Symbol(s) => {
                out.push(':');
                out.push_str(s);
            }
            Value::List(items) => {
                out.push('[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    item.write_inspect(out);
                }
                out.push(']');
            }
            Value::Map(map) => {
                out.push('{');
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    push_quoted(out, key);
                    out.push_str("=>");
                    value.write_inspect(out);
                }
                out.push('}');
            }
        }
    }
}

fn format_float(f: f64) -> String {
    if f.is_finite() && f.fract() == 0.0 {
        format!("{:.1}", f)
    } else {
        f.to_string()
    }
}

fn push_quoted(out: &mut String, s: &str) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if c.is_control() => out.push_str(&format!("\\u{{{:x}}}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
}

/// Interpolation form: strings and symbols render raw, nil and undef render empty,
/// everything else renders as in [`Value::inspect`].
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil | Value::Undef => Ok(()),
            Value::String(s) | Value::Symbol(s) => f.write_str(s),
            other => f.write_str(&other.inspect()),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}
