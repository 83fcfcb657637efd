//! Macro name validation.
//!
//! A macro name is one or more `::`-delimited segments, each a lowercase ASCII letter or
//! underscore followed by lowercase alphanumerics or underscores: `a`, `_`, `a1::b2`.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::{ErrorKind, MacroError, Value};

static MACRO_NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z_][a-z0-9_]*(?:::[a-z_][a-z0-9_]*)*$").expect("macro name pattern is valid")
});

/// Checks whether a string is a well-formed macro name.
pub fn is_valid_name(name: &str) -> bool {
    MACRO_NAME_RE.is_match(name)
}

/// Checks whether an arbitrary host value is a well-formed macro name.
///
/// Anything that is not a string is rejected.
///
/// ```rust
/// use macrodex::macros::valid_name;
/// use macrodex::Value;
/// assert!(valid_name(&Value::from("a1::b2")));
/// assert!(!valid_name(&Value::from("::asd::")));
/// assert!(!valid_name(&Value::Integer(1)));
/// ```
pub fn valid_name(name: &Value) -> bool {
    name.as_str().is_some_and(is_valid_name)
}

/// Fails with `kind` when `name` is not a valid macro name.
///
/// The message renders the offending value the way the host prints it, so strings are
/// quoted: `Invalid macro name "foo-bar"`.
pub fn validate_name(name: &Value, kind: ErrorKind) -> Result<(), MacroError> {
    if valid_name(name) {
        return Ok(());
    }
    Err(MacroError::new(
        kind,
        format!("Invalid macro name {}", name.inspect()),
    ))
}

#[cfg(test)]
mod tests {
    use im::OrdMap;

    use super::*;

    fn invalid_names() -> Vec<Value> {
        vec![
            Value::Integer(1),
            Value::Nil,
            Value::Map(OrdMap::new()),
            Value::List(vec![]),
            Value::from("9"),
            Value::from("1ad"),
            Value::from(""),
            Value::from(":"),
            Value::from("::"),
            Value::from("::9"),
            Value::from("::asd::"),
            Value::from("Foo"),
            Value::from("a::::b"),
            Value::from("foo-bar"),
            Value::Symbol("foo".into()),
        ]
    }

    fn valid_names() -> Vec<Value> {
        vec![
            Value::from("a"),
            Value::from("_"),
            Value::from("a1::b2"),
            Value::from("_::__1"),
        ]
    }

    #[test]
    fn test_valid_name_rejects_malformed() {
        for name in invalid_names() {
            assert!(!valid_name(&name), "{} should be invalid", name.inspect());
        }
    }

    #[test]
    fn test_valid_name_accepts_well_formed() {
        for name in valid_names() {
            assert!(valid_name(&name), "{} should be valid", name.inspect());
        }
    }

    #[test]
    fn test_validate_name_messages() {
        let expected = [
            "Invalid macro name 1",
            "Invalid macro name nil",
            "Invalid macro name {}",
            "Invalid macro name []",
            "Invalid macro name \"9\"",
            "Invalid macro name \"1ad\"",
            "Invalid macro name \"\"",
            "Invalid macro name \":\"",
            "Invalid macro name \"::\"",
            "Invalid macro name \"::9\"",
            "Invalid macro name \"::asd::\"",
        ];
        for (name, message) in invalid_names().iter().zip(expected) {
            let err = validate_name(name, ErrorKind::Argument).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Argument);
            assert_eq!(err.to_string(), message);
        }
        for name in valid_names() {
            assert!(validate_name(&name, ErrorKind::Argument).is_ok());
        }
    }

    #[test]
    fn test_validate_name_uses_requested_kind() {
        let err = validate_name(&Value::from("foo-bar"), ErrorKind::Parse).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
        assert_eq!(err.to_string(), "Invalid macro name \"foo-bar\"");
    }
}
