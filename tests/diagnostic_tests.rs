//! Golden master tests for diagnostic output.
//!
//! Error messages are matched by callers, so these tests pin the exact text and check that the
//! rendered `miette` report carries the code and the cause chain.

use miette::{Diagnostic, NarratableReportHandler};
use macrodex::functions::determine;
use macrodex::macros::{validate_name, Macro, NewMacroOptions, Param, Registry};
use macrodex::{Environment, ErrorKind, MacroError, Value, VarScope};

/// Test helper to capture the narrated report of an error.
fn capture_diagnostic_output(error: &MacroError) -> String {
    let mut out = String::new();
    NarratableReportHandler::new()
        .render_report(&mut out, error)
        .unwrap();
    out
}

#[test]
fn test_invalid_name_messages() {
    let cases = [
        (Value::Integer(1), "Invalid macro name 1"),
        (Value::Nil, "Invalid macro name nil"),
        (Value::List(vec![]), "Invalid macro name []"),
        (Value::from("9"), r#"Invalid macro name "9""#),
        (Value::from(""), r#"Invalid macro name """#),
        (Value::from("::asd::"), r#"Invalid macro name "::asd::""#),
    ];
    for (name, expected) in cases {
        let err = validate_name(&name, ErrorKind::Argument).unwrap_err();
        assert_eq!(err.to_string(), expected);
    }
}

#[test]
fn test_report_carries_code_and_cause() {
    let registry = Registry::new();
    registry
        .newmacro(
            "foo",
            &NewMacroOptions::in_environment(Environment::root()),
            Macro::with_params(vec![Param::required("a"), Param::required("b")], |_, _| {
                Ok(Value::Nil)
            }),
        )
        .unwrap();
    let err = determine(&registry, &VarScope::new(), &[Value::from("foo")]).unwrap_err();
    assert_eq!(
        err.code().map(|code| code.to_string()).as_deref(),
        Some("macrodex::parse")
    );

    let output = capture_diagnostic_output(&err);
    assert!(output.contains("determine(): Wrong number of arguments (1 for 2)"), "{}", output);
    assert!(output.contains("Wrong number of arguments (0 for 2)"), "{}", output);
    assert!(output.contains("macrodex::parse"), "{}", output);
}

#[test]
fn test_argument_error_code() {
    let err = validate_name(&Value::from("Foo"), ErrorKind::Argument).unwrap_err();
    let output = capture_diagnostic_output(&err);
    assert!(output.contains(r#"Invalid macro name "Foo""#), "{}", output);
    assert!(output.contains("macrodex::argument"), "{}", output);
}
