//! Macro dispatch: validate, look up, check arity, call.
//!
//! [`Registry::call_macro`] is the general entry point. [`Registry::call_macro_from_func`] is
//! the variant used by host functions such as `determine`, whose own argument list carries the
//! macro name in front of the macro arguments. Arity messages raised there are rewritten to
//! count the host function's arguments rather than the macro's.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::macros::arity::check_macro_arity;
use crate::macros::name::validate_name;
use crate::macros::registry::Registry;
use crate::macros::types::Macro;
use crate::{err_msg, Environment, ErrorKind, MacroError, Scope, Value};

static ARITY_MESSAGE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^Wrong number of arguments \(([0-9]+) for (minimum |maximum )?([0-9]+)\)$")
        .expect("arity message pattern is valid")
});

/// Error kinds used by [`Registry::call_macro`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallOptions {
    /// Kind for invalid names and arity mismatches. Defaults to `Argument`.
    pub a_err: Option<ErrorKind>,
    /// Kind for undefined macros. Defaults to `General`.
    pub l_err: Option<ErrorKind>,
}

impl CallOptions {
    /// Reports every failure with the same kind.
    pub fn all(kind: ErrorKind) -> Self {
        CallOptions {
            a_err: Some(kind),
            l_err: Some(kind),
        }
    }

    fn argument_kind(&self) -> ErrorKind {
        self.a_err.unwrap_or(ErrorKind::Argument)
    }

    fn lookup_kind(&self) -> ErrorKind {
        self.l_err.unwrap_or(ErrorKind::General)
    }
}

impl Registry {
    /// Looks up `name` with autoload, failing with `kind` when it stays undefined.
    pub fn get_macro(&self, name: &str, env: &Environment, kind: ErrorKind) -> Result<Macro, MacroError> {
        self.lookup(name, env, true)
            .ok_or_else(|| MacroError::new(kind, format!("Undefined macro {}", name)))
    }

    /// Calls macro `name` with `args` in `env` (the default environment when `None`).
    ///
    /// The body's result is returned verbatim, errors included.
    pub fn call_macro(
        &self,
        scope: &dyn Scope,
        name: &Value,
        args: &[Value],
        options: CallOptions,
        env: Option<&Environment>,
    ) -> Result<Value, MacroError> {
        let a_err = options.argument_kind();
        validate_name(name, a_err)?;
        let name = name.as_str().unwrap_or_default();
        let env = env.cloned().unwrap_or_else(|| self.default_environment());
        let m = self.get_macro(name, &env, options.lookup_kind())?;
        check_macro_arity(&m, args, a_err)?;
        m.call(scope, args)
    }

    /// Calls the macro named by `func_args[0]` on behalf of host function `func_name`.
    ///
    /// `n` is the number of host arguments preceding the macro name beyond the first. Parse
    /// errors come back prefixed with `func_name(): ` and with arity counts shifted by `1 + n`;
    /// the original error is kept as the source. Other errors pass through untouched.
    pub fn call_macro_from_func(
        &self,
        scope: &dyn Scope,
        func_name: &str,
        func_args: &[Value],
        n: usize,
        env: Option<&Environment>,
    ) -> Result<Value, MacroError> {
        let result = match func_args.split_first() {
            None => Err(err_msg!(Parse, "Wrong number of arguments (0) - missing macro name")),
            Some((name, args)) => {
                self.call_macro(scope, name, args, CallOptions::all(ErrorKind::Parse), env)
            }
        };
        result.map_err(|e| {
            if e.kind() != ErrorKind::Parse {
                return e;
            }
            let message = fix_error_msg(func_name, e.message(), 1 + n);
            MacroError::new(ErrorKind::Parse, message).with_source(e)
        })
    }
}

/// Prefixes `msg` with `func(): ` and, for arity messages, adds `shift` to both counts.
///
/// ```rust
/// use macrodex::macros::fix_error_msg;
/// assert_eq!(
///     fix_error_msg("somefun", "Wrong number of arguments (0 for minimum 1)", 2),
///     "somefun(): Wrong number of arguments (2 for minimum 3)"
/// );
/// assert_eq!(fix_error_msg("determine", "Undefined macro foo", 1), "determine(): Undefined macro foo");
/// ```
pub fn fix_error_msg(func: &str, msg: &str, shift: usize) -> String {
    let shifted = ARITY_MESSAGE_RE.captures(msg).and_then(|caps| {
        let given = caps[1].parse::<usize>().ok()?.checked_add(shift)?;
        let bound = caps[3].parse::<usize>().ok()?.checked_add(shift)?;
        let qualifier = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
        Some(format!(
            "Wrong number of arguments ({} for {}{})",
            given, qualifier, bound
        ))
    });
    match shifted {
        Some(fixed) => format!("{}(): {}", func, fixed),
        None => format!("{}(): {}", func, msg),
    }
}
