//! Clause instantiation: copying terms onto a heap, fusing the copy with
//! unification, and compacting variable indexes.

use crate::term::Visit;
use crate::unify::mismatch;
use crate::{BindingStore, Compound, Term, UnifyError, Var};
use std::collections::HashMap;

/// Source variable to copied term, for one copy operation.
///
/// Create a fresh memo per top-level call and drop it afterwards; sharing
/// one memo between independent copies would alias their variables.
#[derive(Debug, Default, Clone)]
pub struct Memo {
    map: HashMap<Var, Term>,
}

impl Memo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            map: HashMap::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn get(&self, var: Var) -> Option<&Term> {
        self.map.get(&var)
    }

    #[inline]
    pub fn insert(&mut self, var: Var, term: Term) -> Option<Term> {
        self.map.insert(var, term)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

/// Original variable index to compacted index, filled by
/// [`Term::clone_compress_vars`].
pub type VarMapping = HashMap<usize, usize>;

impl Term {
    /// Copies the term onto `heap`, giving each distinct source variable one
    /// fresh heap variable.  Source variables are taken as they are; their
    /// bindings, if any, are not consulted.
    ///
    /// Compound nodes are always rebuilt, even when they contain no
    /// variables.
    pub fn copy<H: BindingStore + ?Sized>(&self, heap: &mut H, memo: &mut Memo) -> Term {
        self.rebuild(false, |term| match term {
            Term::Var(v) => Visit::Leaf(
                memo.map
                    .entry(*v)
                    .or_insert_with(|| Term::Var(heap.newvar()))
                    .clone(),
            ),
            Term::Compound(c) => Visit::Enter(c.clone()),
            other => Visit::Leaf(other.clone()),
        })
    }

    /// Copies the term and unifies the copy with `other` in a single walk.
    ///
    /// The result is the same as `copy` followed by [`unify`](crate::unify)
    /// without occurs check, but source variables seen for the first time
    /// are aliased to the matching part of `other` instead of being
    /// allocated, and nothing is built for a functor mismatch.
    pub fn copy_and_unify<H: BindingStore + ?Sized>(
        &self,
        other: &Term,
        heap: &mut H,
        memo: &mut Memo,
    ) -> Result<Term, UnifyError> {
        // (source node, goal node, copied arguments so far)
        let mut frames: Vec<(Compound, Compound, Vec<Term>)> = Vec::new();
        let mut next = (self.clone(), other.clone());
        loop {
            let (source, target) = next;
            let mut done = match instantiate_step(&source, &target, heap, memo)? {
                Step::Done(term) => term,
                Step::Descend(x, y) => {
                    next = (x.args()[0].clone(), y.args()[0].clone());
                    let arity = x.arity();
                    frames.push((x, y, Vec::with_capacity(arity)));
                    continue;
                }
            };
            loop {
                let Some((x, y, mut args)) = frames.pop() else {
                    return Ok(done);
                };
                args.push(done);
                let i = args.len();
                if i < x.arity() {
                    next = (x.args()[i].clone(), y.args()[i].clone());
                    frames.push((x, y, args));
                    break;
                }
                done = Term::Compound(x.with_args(args.into_boxed_slice()));
            }
        }
    }

    /// Renumbers the term's variables densely, starting at `offset`, in
    /// order of first occurrence.  Variables already in `mapping` keep the
    /// index recorded there, so several terms can share one numbering.
    ///
    /// Subterms without variables, and subterms whose variables keep their
    /// index, are returned as they are.
    pub fn clone_compress_vars(&self, mapping: &mut VarMapping, offset: usize) -> Term {
        self.rebuild(true, |term| match term {
            Term::Var(v) => {
                let next = offset + mapping.len();
                let index = *mapping.entry(v.index()).or_insert(next);
                if index == v.index() {
                    Visit::Leaf(term.clone())
                } else {
                    Visit::Leaf(Term::var(index))
                }
            }
            Term::Compound(c) => Visit::Enter(c.clone()),
            other => Visit::Leaf(other.clone()),
        })
    }
}

enum Step {
    Done(Term),
    Descend(Compound, Compound),
}

fn instantiate_step<H: BindingStore + ?Sized>(
    source: &Term,
    target: &Term,
    heap: &mut H,
    memo: &mut Memo,
) -> Result<Step, UnifyError> {
    if let Term::Var(v) = source {
        return match memo.get(*v) {
            Some(seen) => {
                let seen = seen.clone();
                seen.unify(target, heap, false)?;
                Ok(Step::Done(seen))
            }
            None => {
                memo.insert(*v, target.clone());
                Ok(Step::Done(target.clone()))
            }
        };
    }

    let target = target.dereference(heap);
    match (source, &target) {
        (_, Term::Var(goal_var)) => {
            let copy = source.copy(heap, memo);
            heap.setvar(*goal_var, copy.clone());
            Ok(Step::Done(copy))
        }
        (Term::Compound(x), Term::Compound(y)) => {
            if !x.same_signature(y) {
                return Err(UnifyError::FunctorMismatch);
            }
            Ok(Step::Descend(x.clone(), y.clone()))
        }
        (Term::Atom(x), Term::Atom(y)) if x == y => Ok(Step::Done(source.clone())),
        (Term::Number(x), Term::Number(y)) if x == y => Ok(Step::Done(source.clone())),
        (Term::Float(x), Term::Float(y)) if x == y => Ok(Step::Done(source.clone())),
        (Term::BlackBox(x), Term::BlackBox(y)) if x.is_same(y) => Ok(Step::Done(source.clone())),
        _ => Err(mismatch(source, &target)),
    }
}
