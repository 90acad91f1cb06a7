//! Defines [`UnifyError`], the cheap failure signal of unification, and
//! [`TermError`], the error type for term construction and heap management.
//!
//! The two are deliberately separate types: code that catches unification
//! failures to try the next clause never sees a [`TermError`], and genuine
//! programming defects (unallocated heap cells, argument indexes out of
//! range) are panics rather than values of either type.

use crate::Checkpoint;
use thiserror::Error;

/// Reason two terms could not be unified.
///
/// Unification failure is the common case during search, so this type is
/// `Copy`, carries no payload and never allocates.  Every variant is an
/// expected outcome; callers normally discard the reason and backtrack.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum UnifyError {
    #[error("atoms differ")]
    AtomMismatch,

    #[error("integers differ")]
    NumberMismatch,

    #[error("floats differ")]
    FloatMismatch,

    /// Compound terms with different name or arity.
    #[error("functor mismatch")]
    FunctorMismatch,

    /// Terms of different kinds (e.g. an atom and a compound, or an
    /// integer and a float).
    #[error("kind mismatch")]
    KindMismatch,

    #[error("distinct black boxes")]
    BlackBoxMismatch,

    /// Binding would make a variable refer to a term containing itself.
    #[error("occurs check")]
    OccursCheck,
}

/// Errors reported by term construction and heap management.
#[derive(Debug, Clone, Error)]
pub enum TermError {
    /// A variable was found where a callable term is required.
    #[error("instantiation error")]
    Instantiation,

    #[error("Type mismatch: expected {expected}, found {found}")]
    UnexpectedKind {
        expected: &'static str,
        found: &'static str,
    },

    /// The checkpoint does not belong to this heap or has been discarded.
    #[error("Invalid checkpoint {0:?}")]
    InvalidCheckpoint(Checkpoint),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unify_error_is_small_and_copy() {
        assert_eq!(core::mem::size_of::<UnifyError>(), 1);
        let e = UnifyError::OccursCheck;
        let f = e;
        assert_eq!(e, f);
    }

    #[test]
    fn messages() {
        assert_eq!(UnifyError::FunctorMismatch.to_string(), "functor mismatch");
        let err = TermError::UnexpectedKind {
            expected: "callable",
            found: "int",
        };
        assert_eq!(err.to_string(), "Type mismatch: expected callable, found int");
    }
}
