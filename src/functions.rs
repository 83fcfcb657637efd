//! Host-script entry points.
//!
//! Scripts reach macros through two functions. Both take the macro name as their first
//! argument followed by the macro arguments, and both report every failure as a host script
//! (`Parse`) error.

use crate::macros::Registry;
use crate::{MacroError, Scope, Value};

/// Calls a macro and returns its value.
///
/// `args[0]` names the macro; the rest are passed to it. Arity errors count `args` as a whole,
/// so a one-parameter macro called with no arguments reports `(1 for 2)`.
pub fn determine(registry: &Registry, scope: &dyn Scope, args: &[Value]) -> Result<Value, MacroError> {
    registry
        .call_macro_from_func(scope, "determine", args, 0, None)
        .map_err(MacroError::into_script_error)
}

/// Calls a macro for its side effects, discarding the value.
pub fn invoke(registry: &Registry, scope: &dyn Scope, args: &[Value]) -> Result<(), MacroError> {
    registry
        .call_macro_from_func(scope, "invoke", args, 0, None)
        .map(|_| ())
        .map_err(MacroError::into_script_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::macros::{Macro, NewMacroOptions};
    use crate::{err_msg, Environment, ErrorKind, VarScope};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_invoke_runs_body_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let registry = Registry::new();
        registry
            .newmacro(
                "touch",
                &NewMacroOptions::in_environment(Environment::root()),
                Macro::with_arity(-1, move |_, _| {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Ok(Value::Nil)
                }),
            )
            .unwrap();
        invoke(&registry, &VarScope::new(), &[Value::from("touch"), Value::Integer(1)]).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_body_errors_become_script_errors() {
        let registry = Registry::new();
        registry
            .newmacro(
                "fail",
                &NewMacroOptions::in_environment(Environment::root()),
                Macro::with_arity(0, |_, _| Err(err_msg!(Argument, "blah blah"))),
            )
            .unwrap();
        let err = determine(&registry, &VarScope::new(), &[Value::from("fail")]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
        assert_eq!(err.to_string(), "blah blah");
    }

    #[test]
    fn test_undefined_macro() {
        let err = invoke(&Registry::new(), &VarScope::new(), &[Value::from("nope")]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
        assert_eq!(err.to_string(), "invoke(): Undefined macro nope");
    }
}
