//! # macrodex
//!
//! An environment-scoped macro registry and dispatcher with lazy autoloading and strict arity
//! checking.
//!
//! Macros are named callables registered per environment. A lookup consults the caller's
//! environment, then the root environment, then asks a namespace loader to define the macro
//! on demand. Dispatch validates the name, checks the argument count against the declared
//! signature, and runs the body with the caller's scope.
//!
//! ```rust
//! use macrodex::functions::determine;
//! use macrodex::macros::{Macro, NewMacroOptions, Param, Registry};
//! use macrodex::{Environment, Value, VarScope};
//!
//! let registry = Registry::new();
//! let body = Macro::with_params(vec![Param::required("x")], |_, args| Ok(args[0].clone()));
//! registry
//!     .newmacro("echo", &NewMacroOptions::in_environment(Environment::root()), body)
//!     .unwrap();
//!
//! let scope = VarScope::new();
//! let args = [Value::from("echo"), Value::from("hi")];
//! assert_eq!(determine(&registry, &scope, &args).unwrap(), Value::from("hi"));
//!
//! let err = determine(&registry, &scope, &args[..1]).unwrap_err();
//! assert_eq!(err.to_string(), "determine(): Wrong number of arguments (1 for 2)");
//! ```

pub use crate::diagnostics::{BoxError, ErrorKind, MacroError};
pub use crate::environment::{Environment, EnvironmentProvider, FixedEnvironment};
pub use crate::scope::{Scope, VarScope};
pub use crate::value::Value;

pub mod cli;
pub mod config;
pub mod diagnostics;
pub mod environment;
pub mod functions;
pub mod macros;
pub mod scope;
pub mod value;
