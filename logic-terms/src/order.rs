//! Standard order of terms.
//!
//! Variables < atoms < numbers < compound terms < black boxes.  Within a
//! kind: variables by index, atoms by name, numbers by value (integers and
//! floats mixed), compounds by arity, then name, then arguments from left
//! to right.  Bindings are followed at every level.

use crate::{BindingStore, Term};
use std::cmp::Ordering;

/// Compares `a` and `b` in the standard order.
pub fn compare_standard_order<H: BindingStore + ?Sized>(
    a: &Term,
    b: &Term,
    heap: &mut H,
) -> Ordering {
    let mut pending: Vec<(Term, Term)> = vec![(a.clone(), b.clone())];
    while let Some((a, b)) = pending.pop() {
        let a = a.dereference(heap);
        let b = b.dereference(heap);
        let ord = compare_shallow(&a, &b);
        if ord != Ordering::Equal {
            return ord;
        }
        if let (Term::Compound(x), Term::Compound(y)) = (&a, &b) {
            if !x.is_same(y) {
                pending.extend(x.args().iter().cloned().zip(y.args().iter().cloned()).rev());
            }
        }
    }
    Ordering::Equal
}

/// Orders two dereferenced terms without looking at compound arguments.
fn compare_shallow(a: &Term, b: &Term) -> Ordering {
    let ord = a.rank().cmp(&b.rank());
    if ord != Ordering::Equal {
        return ord;
    }
    match (a, b) {
        (Term::Var(x), Term::Var(y)) => x.index().cmp(&y.index()),
        (Term::Atom(x), Term::Atom(y)) => x.name().cmp(y.name()),
        (Term::Number(x), Term::Number(y)) => x.cmp(y),
        (Term::Float(x), Term::Float(y)) => compare_floats(*x, *y),
        (Term::Number(x), Term::Float(y)) => compare_int_float(*x, *y),
        (Term::Float(x), Term::Number(y)) => compare_int_float(*y, *x).reverse(),
        (Term::Compound(x), Term::Compound(y)) => x
            .arity()
            .cmp(&y.arity())
            .then_with(|| x.name().cmp(y.name())),
        (Term::BlackBox(x), Term::BlackBox(y)) => x.addr().cmp(&y.addr()),
        _ => unreachable!("terms of equal rank have comparable kinds"),
    }
}

// Numeric order, with zeros of either sign equal.  NaN falls back to the
// IEEE total order so the result stays total.
#[inline]
fn compare_floats(x: f64, y: f64) -> Ordering {
    x.partial_cmp(&y).unwrap_or_else(|| x.total_cmp(&y))
}

/// Exact comparison of an integer with a float.  NaN sorts the way
/// [`compare_floats`] sorts it against any finite value.
fn compare_int_float(i: i64, f: f64) -> Ordering {
    // i64 covers [-2^63, 2^63)
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;
    if f.is_nan() {
        return if f.is_sign_negative() {
            Ordering::Greater
        } else {
            Ordering::Less
        };
    }
    if f >= LIMIT {
        return Ordering::Less;
    }
    if f < -LIMIT {
        return Ordering::Greater;
    }
    let whole = f.trunc();
    // in range, so the cast is exact
    match i.cmp(&(whole as i64)) {
        Ordering::Equal => 0.0_f64.partial_cmp(&(f - whole)).unwrap_or(Ordering::Equal),
        ord => ord,
    }
}

impl Term {
    /// See [`compare_standard_order`].
    #[inline]
    pub fn compare<H: BindingStore + ?Sized>(&self, other: &Term, heap: &mut H) -> Ordering {
        compare_standard_order(self, other, heap)
    }
}
