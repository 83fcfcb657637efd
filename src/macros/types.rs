//! Core macro types.
//! This module defines the fundamental types used throughout the macro system.
//! It has no dependencies on other macro modules, making it the foundation layer.
//!
//! ## Ownership and Borrowing
//!
//! - `Macro` is a cheap handle: cloning it shares the callable through an `Arc`
//! - `Signature` owns its parameter list and is cloned with the handle
//! - Identity of a registered callable is observable with [`Macro::ptr_eq`]

use std::fmt;
use std::sync::Arc;

use crate::{MacroError, Scope, Value};

/// The callable behind a macro.
///
/// Macro bodies receive the caller's scope as their execution context and the positional
/// arguments. They may fail with any [`MacroError`]; the dispatcher returns the result verbatim.
pub type MacroFn = dyn Fn(&dyn Scope, &[Value]) -> Result<Value, MacroError> + Send + Sync;

/// How a declared parameter participates in arity checking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// Must always be supplied.
    Required,
    /// Has a default; extends the upper bound but not the lower one.
    Optional,
    /// Variadic catch-all; removes the upper bound.
    Rest,
}

/// A single declared parameter: its kind and name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub kind: ParamKind,
    pub name: String,
}

impl Param {
    pub fn required(name: impl Into<String>) -> Self {
        Param {
            kind: ParamKind::Required,
            name: name.into(),
        }
    }

    pub fn optional(name: impl Into<String>) -> Self {
        Param {
            kind: ParamKind::Optional,
            name: name.into(),
        }
    }

    pub fn rest(name: impl Into<String>) -> Self {
        Param {
            kind: ParamKind::Rest,
            name: name.into(),
        }
    }
}

/// The declared parameter shape of a macro.
///
/// Two representations exist: an explicit list of `(kind, name)` pairs, and a legacy signed
/// arity where a negative value `a` means "at least `|a| - 1` arguments, then any number".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signature {
    Params(Vec<Param>),
    Arity(i32),
}

/// A registered macro: a shared callable with a declared signature.
///
/// # Examples
///
/// ```rust
/// use macrodex::macros::{Macro, Param};
/// use macrodex::{Value, VarScope};
/// let upcase = Macro::with_params(vec![Param::required("x")], |_scope, args| {
///     Ok(Value::from(args[0].to_string().to_uppercase()))
/// });
/// let result = upcase.call(&VarScope::new(), &[Value::from("arg1")]).unwrap();
/// assert_eq!(result, Value::from("ARG1"));
/// assert!(upcase.ptr_eq(&upcase.clone()));
/// ```
#[derive(Clone)]
pub struct Macro {
    signature: Signature,
    body: Arc<MacroFn>,
    doc: Option<String>,
}

impl Macro {
    pub fn new<F>(signature: Signature, body: F) -> Self
    where
        F: Fn(&dyn Scope, &[Value]) -> Result<Value, MacroError> + Send + Sync + 'static,
    {
        Macro {
            signature,
            body: Arc::new(body),
            doc: None,
        }
    }

    /// Creates a macro from an explicit parameter list.
    pub fn with_params<F>(params: Vec<Param>, body: F) -> Self
    where
        F: Fn(&dyn Scope, &[Value]) -> Result<Value, MacroError> + Send + Sync + 'static,
    {
        Macro::new(Signature::Params(params), body)
    }

    /// Creates a macro from a legacy signed arity.
    pub fn with_arity<F>(arity: i32, body: F) -> Self
    where
        F: Fn(&dyn Scope, &[Value]) -> Result<Value, MacroError> + Send + Sync + 'static,
    {
        Macro::new(Signature::Arity(arity), body)
    }

    /// Attaches a one-line description, shown when macros are listed.
    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = Some(doc.into());
        self
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn doc(&self) -> Option<&str> {
        self.doc.as_deref()
    }

    /// Runs the body with `scope` as its execution context. No arity check happens here.
    pub fn call(&self, scope: &dyn Scope, args: &[Value]) -> Result<Value, MacroError> {
        (self.body)(scope, args)
    }

    /// True when both handles share the same callable.
    pub fn ptr_eq(&self, other: &Macro) -> bool {
        std::ptr::eq(
            Arc::as_ptr(&self.body) as *const (),
            Arc::as_ptr(&other.body) as *const (),
        )
    }
}

impl fmt::Debug for Macro {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Macro")
            .field("signature", &self.signature)
            .field("doc", &self.doc)
            .finish_non_exhaustive()
    }
}
