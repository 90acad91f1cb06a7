//! Unification and binding resolution.

use crate::term::Visit;
use crate::{BindingStore, Term, UnifyError, Var};

impl Term {
    /// Follows variable bindings to the first unbound variable or the first
    /// non-variable term.
    ///
    /// Every cell visited on the way that does not already point at the
    /// result is rewritten to point at it.  The rewrites go through
    /// [`BindingStore::setvar`], so a trailing store can undo them.
    pub fn dereference<H: BindingStore + ?Sized>(&self, heap: &mut H) -> Term {
        let Term::Var(start) = self else {
            return self.clone();
        };
        let mut current = *start;
        let result = loop {
            match heap.getvar(current) {
                None => break Term::Var(current),
                Some(Term::Var(next)) => current = *next,
                Some(value) => break value.clone(),
            }
        };

        let mut current = *start;
        loop {
            let next = match heap.getvar(current) {
                Some(Term::Var(next)) => *next,
                _ => break,
            };
            if result.as_var() == Some(next) {
                break;
            }
            heap.setvar(current, result.clone());
            current = next;
        }
        result
    }

    /// Returns the term with every reachable bound variable replaced by its
    /// value.  Unbound variables are left in place.  Subterms that contain
    /// no bound variable are returned as they are, without copying.
    pub fn getvalue<H: BindingStore + ?Sized>(&self, heap: &mut H) -> Term {
        self.rebuild(true, |term| match term {
            Term::Var(_) => match term.dereference(heap) {
                Term::Compound(c) => Visit::Enter(c),
                value => Visit::Leaf(value),
            },
            Term::Compound(c) => Visit::Enter(c.clone()),
            other => Visit::Leaf(other.clone()),
        })
    }

    /// Returns `true` if `var` is reachable from this term once bindings are
    /// followed.
    pub fn contains_var<H: BindingStore + ?Sized>(&self, var: Var, heap: &mut H) -> bool {
        let mut pending = vec![self.clone()];
        while let Some(term) = pending.pop() {
            match term.dereference(heap) {
                Term::Var(v) if v == var => return true,
                Term::Compound(c) => pending.extend(c.args().iter().cloned()),
                _ => {}
            }
        }
        false
    }

    /// See [`unify`].
    #[inline]
    pub fn unify<H: BindingStore + ?Sized>(
        &self,
        other: &Term,
        heap: &mut H,
        occurs_check: bool,
    ) -> Result<(), UnifyError> {
        unify(self, other, heap, occurs_check)
    }
}

/// Makes `a` and `b` structurally identical by binding variables in `heap`.
///
/// Arguments of compound terms are unified left to right and the first
/// failure aborts.  Bindings made before a failure are not rolled back;
/// take a [`Checkpoint`](crate::Checkpoint) first if they must be.
///
/// With `occurs_check` set, binding a variable to a term that contains it
/// fails with [`UnifyError::OccursCheck`]; without it, such a binding
/// creates a cyclic term.
pub fn unify<H: BindingStore + ?Sized>(
    a: &Term,
    b: &Term,
    heap: &mut H,
    occurs_check: bool,
) -> Result<(), UnifyError> {
    // Compound arguments are pushed in reverse so they pop left to right.
    let mut pending: Vec<(Term, Term)> = Vec::new();
    let mut a = a.clone();
    let mut b = b.clone();
    loop {
        unify_step(&a, &b, heap, occurs_check, &mut pending)?;
        match pending.pop() {
            Some((x, y)) => {
                a = x;
                b = y;
            }
            None => return Ok(()),
        }
    }
}

fn unify_step<H: BindingStore + ?Sized>(
    a: &Term,
    b: &Term,
    heap: &mut H,
    occurs_check: bool,
    pending: &mut Vec<(Term, Term)>,
) -> Result<(), UnifyError> {
    let a = a.dereference(heap);
    let b = b.dereference(heap);
    match (&a, &b) {
        (Term::Var(x), Term::Var(y)) if x == y => Ok(()),
        (Term::Var(x), _) => bind(*x, b.clone(), heap, occurs_check),
        (_, Term::Var(y)) => bind(*y, a.clone(), heap, occurs_check),
        (Term::Compound(x), Term::Compound(y)) => {
            if !x.same_signature(y) {
                return Err(UnifyError::FunctorMismatch);
            }
            if !x.is_same(y) {
                pending.extend(x.args().iter().cloned().zip(y.args().iter().cloned()).rev());
            }
            Ok(())
        }
        _ => basic_unify(&a, &b),
    }
}

fn bind<H: BindingStore + ?Sized>(
    var: Var,
    value: Term,
    heap: &mut H,
    occurs_check: bool,
) -> Result<(), UnifyError> {
    if occurs_check && value.contains_var(var, heap) {
        return Err(UnifyError::OccursCheck);
    }
    heap.setvar(var, value);
    Ok(())
}

/// Compares two dereferenced non-variable terms that need no recursion.
pub(crate) fn basic_unify(a: &Term, b: &Term) -> Result<(), UnifyError> {
    match (a, b) {
        (Term::Atom(x), Term::Atom(y)) if x == y => Ok(()),
        (Term::Number(x), Term::Number(y)) if x == y => Ok(()),
        (Term::Float(x), Term::Float(y)) if x == y => Ok(()),
        (Term::BlackBox(x), Term::BlackBox(y)) if x.is_same(y) => Ok(()),
        _ => Err(mismatch(a, b)),
    }
}

/// The failure reason for two terms known not to unify.
pub(crate) fn mismatch(a: &Term, b: &Term) -> UnifyError {
    match (a, b) {
        (Term::Atom(_), Term::Atom(_)) => UnifyError::AtomMismatch,
        (Term::Number(_), Term::Number(_)) => UnifyError::NumberMismatch,
        (Term::Float(_), Term::Float(_)) => UnifyError::FloatMismatch,
        (Term::Compound(_), Term::Compound(_)) => UnifyError::FunctorMismatch,
        (Term::BlackBox(_), Term::BlackBox(_)) => UnifyError::BlackBoxMismatch,
        _ => UnifyError::KindMismatch,
    }
}
