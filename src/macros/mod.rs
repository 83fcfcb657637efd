//! # Macro Registry and Dispatch
//!
//! Named, arity-checked callables invoked from host scripts by name.
//!
//! ## Core Principles
//!
//! - **Environment-scoped**: macros live in per-environment tables; the root environment is a
//!   global fallback consulted after the caller's own environment.
//! - **Lazy**: a macro missing from both tables is autoloaded from the namespace path derived
//!   from its name (`foo::bar` is looked for at `foo/bar`).
//! - **Checked**: names are validated and argument counts are checked against bounds derived
//!   from the declared signature before a body runs.
//!
//! ## Layout
//!
//! - [`types`]: `Macro`, `Signature`, `Param`
//! - [`name`]: name validation
//! - [`arity`]: bounds inference and checking
//! - [`registry`]: per-environment tables, lookup, registration, autoload
//! - [`loader`], [`fs_loader`]: namespace loaders
//! - [`template`]: declarative macros from definition files
//! - [`dispatch`]: `call_macro` and `call_macro_from_func`
//!
//! ## Example
//!
//! ```rust
//! use macrodex::macros::{CallOptions, Macro, NewMacroOptions, Param, Registry};
//! use macrodex::{Environment, Value, VarScope};
//!
//! let registry = Registry::new();
//! let upcase = Macro::with_params(vec![Param::required("x")], |_, args| {
//!     Ok(Value::from(args[0].to_string().to_uppercase()))
//! });
//! registry
//!     .newmacro("upcase", &NewMacroOptions::in_environment(Environment::root()), upcase)
//!     .unwrap();
//! let out = registry
//!     .call_macro(&VarScope::new(), &Value::from("upcase"), &[Value::from("a")], CallOptions::default(), None)
//!     .unwrap();
//! assert_eq!(out, Value::from("A"));
//! ```

pub mod arity;
pub mod dispatch;
pub mod fs_loader;
pub mod loader;
pub mod name;
pub mod registry;
pub mod template;
pub mod types;

pub use arity::{
    check_macro_arity, macro_arities, macro_arities_by_arity, macro_arities_by_parameters,
    ArityBounds, ArityMismatch,
};
pub use dispatch::{fix_error_msg, CallOptions};
pub use fs_loader::{parse_definitions, FsLoader};
pub use loader::{ModuleFn, ModuleLoader, NamespaceLoader, NullLoader};
pub use name::{is_valid_name, valid_name, validate_name};
pub use registry::{global, MacroTable, NewMacroOptions, Registry, RegistryBuilder};
pub use template::{MacroTemplate, ParamSpec};
pub use types::{Macro, MacroFn, Param, ParamKind, Signature};
