//! Arity inference and enforcement.
//!
//! Bounds are derived from a macro's declared [`Signature`] alone. Checking produces a
//! structured [`ArityMismatch`]; it is rendered to text only when the dispatcher turns it into a
//! [`MacroError`].

use std::fmt;

use crate::macros::types::{Macro, Param, ParamKind, Signature};
use crate::{ErrorKind, MacroError, Value};

/// The `(min, max)` range of acceptable argument counts. `max == None` means unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArityBounds {
    pub min: usize,
    pub max: Option<usize>,
}

/// Why an argument count was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArityMismatch {
    /// The macro takes exactly `expected` arguments.
    Exact { given: usize, expected: usize },
    /// Fewer than the required minimum.
    TooFew { given: usize, min: usize },
    /// More than the declared maximum.
    TooMany { given: usize, max: usize },
}

impl fmt::Display for ArityMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArityMismatch::Exact { given, expected } => {
                write!(f, "Wrong number of arguments ({} for {})", given, expected)
            }
            ArityMismatch::TooFew { given, min } => {
                write!(f, "Wrong number of arguments ({} for minimum {})", given, min)
            }
            ArityMismatch::TooMany { given, max } => {
                write!(f, "Wrong number of arguments ({} for maximum {})", given, max)
            }
        }
    }
}

impl ArityBounds {
    /// Checks an argument count against these bounds.
    pub fn check(&self, given: usize) -> Result<(), ArityMismatch> {
        if self.max == Some(self.min) {
            if given != self.min {
                return Err(ArityMismatch::Exact {
                    given,
                    expected: self.min,
                });
            }
            return Ok(());
        }
        if given < self.min {
            return Err(ArityMismatch::TooFew {
                given,
                min: self.min,
            });
        }
        match self.max {
            Some(max) if given > max => Err(ArityMismatch::TooMany { given, max }),
            _ => Ok(()),
        }
    }
}

/// Bounds from an explicit parameter list: required parameters set the minimum, a rest
/// parameter removes the maximum, otherwise every declared slot counts toward it.
pub fn macro_arities_by_parameters(params: &[Param]) -> ArityBounds {
    let min = params
        .iter()
        .filter(|p| p.kind == ParamKind::Required)
        .count();
    let max = if params.iter().any(|p| p.kind == ParamKind::Rest) {
        None
    } else {
        Some(params.len())
    };
    ArityBounds { min, max }
}

/// Bounds from a legacy signed arity.
pub fn macro_arities_by_arity(arity: i32) -> ArityBounds {
    if arity >= 0 {
        let n = arity as usize;
        ArityBounds {
            min: n,
            max: Some(n),
        }
    } else {
        ArityBounds {
            min: arity.unsigned_abs() as usize - 1,
            max: None,
        }
    }
}

/// Derives the arity bounds of a macro from its signature.
pub fn macro_arities(m: &Macro) -> ArityBounds {
    match m.signature() {
        Signature::Params(params) => macro_arities_by_parameters(params),
        Signature::Arity(arity) => macro_arities_by_arity(*arity),
    }
}

/// Fails with `kind` when `args` does not fit the macro's arity.
pub fn check_macro_arity(m: &Macro, args: &[Value], kind: ErrorKind) -> Result<(), MacroError> {
    macro_arities(m)
        .check(args.len())
        .map_err(|mismatch| MacroError::new(kind, mismatch.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(signature: Signature) -> Macro {
        Macro::new(signature, |_, _| Ok(Value::Nil))
    }

    #[test]
    fn test_bounds_by_parameters() {
        let params = vec![Param::required("x"), Param::optional("y")];
        assert_eq!(
            macro_arities_by_parameters(&params),
            ArityBounds { min: 1, max: Some(2) }
        );
        let params = vec![Param::required("x"), Param::optional("y"), Param::rest("z")];
        assert_eq!(
            macro_arities_by_parameters(&params),
            ArityBounds { min: 1, max: None }
        );
        assert_eq!(
            macro_arities_by_parameters(&[]),
            ArityBounds { min: 0, max: Some(0) }
        );
    }

    #[test]
    fn test_bounds_by_arity() {
        assert_eq!(macro_arities_by_arity(2), ArityBounds { min: 2, max: Some(2) });
        assert_eq!(macro_arities_by_arity(0), ArityBounds { min: 0, max: Some(0) });
        assert_eq!(macro_arities_by_arity(-1), ArityBounds { min: 0, max: None });
        assert_eq!(macro_arities_by_arity(-3), ArityBounds { min: 2, max: None });
    }

    #[test]
    fn test_exact_arity_table() {
        let m = noop(Signature::Params(vec![Param::required("x")]));
        let one = [Value::from("arg1")];
        let two = [Value::from("arg1"), Value::from("arg2")];
        assert_eq!(
            check_macro_arity(&m, &[], ErrorKind::Argument).unwrap_err().to_string(),
            "Wrong number of arguments (0 for 1)"
        );
        assert!(check_macro_arity(&m, &one, ErrorKind::Argument).is_ok());
        assert_eq!(
            check_macro_arity(&m, &two, ErrorKind::Argument).unwrap_err().to_string(),
            "Wrong number of arguments (2 for 1)"
        );
    }

    #[test]
    fn test_variadic_arity_table() {
        let m = noop(Signature::Params(vec![Param::required("x"), Param::rest("y")]));
        let err = check_macro_arity(&m, &[], ErrorKind::Parse).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
        assert_eq!(err.to_string(), "Wrong number of arguments (0 for minimum 1)");
        for n in 1..4 {
            let args = vec![Value::Nil; n];
            assert!(check_macro_arity(&m, &args, ErrorKind::Argument).is_ok());
        }
    }

    #[test]
    fn test_optional_upper_bound() {
        let bounds = ArityBounds { min: 1, max: Some(2) };
        assert_eq!(bounds.check(0), Err(ArityMismatch::TooFew { given: 0, min: 1 }));
        assert_eq!(bounds.check(2), Ok(()));
        assert_eq!(bounds.check(3), Err(ArityMismatch::TooMany { given: 3, max: 2 }));
        assert_eq!(
            ArityMismatch::TooMany { given: 3, max: 2 }.to_string(),
            "Wrong number of arguments (3 for maximum 2)"
        );
    }

    #[test]
    fn test_legacy_arity_macro() {
        let m = noop(Signature::Arity(-2));
        assert_eq!(macro_arities(&m), ArityBounds { min: 1, max: None });
        assert!(check_macro_arity(&m, &[Value::Nil, Value::Nil], ErrorKind::Argument).is_ok());
    }
}
