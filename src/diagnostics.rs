//! Error types for the macro registry and dispatcher.
//! # Overview
//!
//! This module defines the unified, `miette`-based error type for the macro registry and
//! dispatcher. Every failure produced by validation, lookup, arity checking, macro bodies,
//! configuration, or the CLI is a [`MacroError`].
//!
//! # Error kinds
//!
//! The kind of an error is caller-selectable: the dispatcher accepts the kind to raise for
//! argument problems and for lookup problems (see [`CallOptions`](crate::macros::CallOptions)).
//! This lets one core serve call sites that want host script errors as well as call sites that
//! want plain argument errors.
//!
//! - `Argument`: invalid names and arity mismatches raised by internal helpers.
//! - `General`: generic failures, the default for undefined macros.
//! - `Parse`: the host's native script error. `call_macro_from_func` only rewrites errors of
//!   this kind.
//!
//! # Messages are a compatibility surface
//!
//! `Display` renders the bare message, with no kind prefix. Consumers pattern-match on these
//! strings (the argument-count rewrite in `fix_error_msg` does), so message text must not be
//! decorated here.
//!
//! # Construction
//!
//! - **Use `err_msg!` for message-only errors.**
//!   - `err_msg!(Argument, "Invalid macro name {}", name.inspect())`
//! - **Use `MacroError::with_source` to chain a cause.** The cause stays reachable through
//!   `std::error::Error::source` so the original failure is never lost when a message is
//!   rewritten.

use miette::Diagnostic;
use thiserror::Error;

/// Boxed cause carried by every [`MacroError`] variant.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Type-safe error classification that corresponds to the [`MacroError`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed macro names and argument-count mismatches.
    Argument,
    /// Generic failures; undefined macros by default.
    General,
    /// The host's script error, raised by host-facing entry points.
    Parse,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Argument => "Argument",
            ErrorKind::General => "General",
            ErrorKind::Parse => "Parse",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Unified error type for all macrodex failure modes, supporting error chaining.
#[derive(Debug, Error, Diagnostic)]
pub enum MacroError {
    #[error("{message}")]
    #[diagnostic(code(macrodex::argument))]
    Argument {
        message: String,
        #[source]
        source: Option<BoxError>,
    },
    #[error("{message}")]
    #[diagnostic(code(macrodex::general))]
    General {
        message: String,
        #[source]
        source: Option<BoxError>,
    },
    #[error("{message}")]
    #[diagnostic(code(macrodex::parse))]
    Parse {
        message: String,
        #[source]
        source: Option<BoxError>,
    },
}

impl MacroError {
    /// Creates an error of the given kind with no cause attached.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        let message = message.into();
        match kind {
            ErrorKind::Argument => MacroError::Argument {
                message,
                source: None,
            },
            ErrorKind::General => MacroError::General {
                message,
                source: None,
            },
            ErrorKind::Parse => MacroError::Parse {
                message,
                source: None,
            },
        }
    }

    /// Attaches `cause` as the source of this error, replacing any previous one.
    pub fn with_source(mut self, cause: impl Into<BoxError>) -> Self {
        let slot = match &mut self {
            MacroError::Argument { source, .. }
            | MacroError::General { source, .. }
            | MacroError::Parse { source, .. } => source,
        };
        *slot = Some(cause.into());
        self
    }

    /// Returns the type-safe classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            MacroError::Argument { .. } => ErrorKind::Argument,
            MacroError::General { .. } => ErrorKind::General,
            MacroError::Parse { .. } => ErrorKind::Parse,
        }
    }

    /// The bare message, identical to the `Display` output.
    pub fn message(&self) -> &str {
        match self {
            MacroError::Argument { message, .. }
            | MacroError::General { message, .. }
            | MacroError::Parse { message, .. } => message,
        }
    }

    /// Re-raises this error as a host script error with the same message, keeping the
    /// original error as the cause.
    pub fn into_script_error(self) -> Self {
        if self.kind() == ErrorKind::Parse {
            return self;
        }
        let message = self.message().to_string();
        MacroError::new(ErrorKind::Parse, message).with_source(self)
    }
}

/// Constructs a [`MacroError`] of the named kind with a formatted message and no cause.
///
/// ```rust
/// use macrodex::{err_msg, ErrorKind};
/// let err = err_msg!(Argument, "Invalid macro name {}", "\"9\"");
/// assert_eq!(err.kind(), ErrorKind::Argument);
/// assert_eq!(err.to_string(), "Invalid macro name \"9\"");
/// ```
#[macro_export]
macro_rules! err_msg {
    ($kind:ident, $($arg:tt)+) => {
        $crate::MacroError::new($crate::ErrorKind::$kind, format!($($arg)+))
    };
}
