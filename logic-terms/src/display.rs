//! Defines [`TermDisplay`], a formatter for rendering [`Term`] values.
//!
//! `Display` on a bare [`Term`] shows variables as `_N`.  [`Term::display`]
//! pairs the term with a binding store so bound variables are shown by
//! their values.

use crate::{BindingStore, Rule, Term};
use std::fmt;

// Cyclic terms, built by unifying without occurs check, would otherwise
// print forever.
const MAX_DEPTH: usize = 256;

/// A wrapper that ties together a [`Term`] and the [`BindingStore`] holding
/// its variable bindings.
///
/// ### Example
/// ```rust
/// use logic_terms::{func, unify, BindingStore, Heap, Term};
/// let mut heap = Heap::new();
/// let x = Term::Var(heap.newvar());
/// let term = func!("foo"; x.clone(), "hello, world!");
/// unify(&x, &Term::int(1), &mut heap, false).unwrap();
///
/// assert_eq!(term.to_string(), "foo(_0, 'hello, world!')");
/// assert_eq!(term.display(&heap).to_string(), "foo(1, 'hello, world!')");
/// ```
///
/// Rendering only reads the store; it never compresses binding chains.
pub struct TermDisplay<'a> {
    term: &'a Term,
    heap: Option<&'a dyn BindingStore>,
}

impl Term {
    /// Return a [`TermDisplay`] that resolves bindings through `heap`.
    #[inline]
    pub fn display<'a>(&'a self, heap: &'a dyn BindingStore) -> TermDisplay<'a> {
        TermDisplay {
            term: self,
            heap: Some(heap),
        }
    }
}

impl<'a> fmt::Display for TermDisplay<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_term(f, self.term, self.heap, 0)
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_term(f, self, None, 0)
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.body() {
            None => write!(f, "{}.", self.head()),
            Some(body) => write!(f, "{} :- {}.", self.head(), body),
        }
    }
}

fn is_unquoted_atom(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_lowercase() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn is_symbol_atom(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| "+-*/\\^<>=~:.?@#&$".contains(c))
}

fn is_solo_atom(s: &str) -> bool {
    matches!(s, "!" | "[]" | ";" | "{}")
}

fn write_atom_str(f: &mut fmt::Formatter<'_>, s: &str) -> fmt::Result {
    if is_unquoted_atom(s) || is_symbol_atom(s) || is_solo_atom(s) {
        f.write_str(s)
    } else {
        let escaped = s.replace('\\', "\\\\").replace('\'', "\\'");
        write!(f, "'{}'", escaped)
    }
}

fn write_float(f: &mut fmt::Formatter<'_>, r: f64) -> fmt::Result {
    if r.fract() == 0.0 {
        write!(f, "{:.1}", r)
    } else {
        write!(f, "{}", r)
    }
}

/// Follows bindings without writing to the store.
fn resolve<'t>(term: &'t Term, heap: Option<&'t dyn BindingStore>) -> &'t Term {
    let Some(heap) = heap else {
        return term;
    };
    let mut current = term;
    while let Term::Var(v) = current {
        match heap.getvar(*v) {
            Some(value) => current = value,
            None => break,
        }
    }
    current
}

fn write_term(
    f: &mut fmt::Formatter<'_>,
    term: &Term,
    heap: Option<&dyn BindingStore>,
    depth: usize,
) -> fmt::Result {
    if depth > MAX_DEPTH {
        return f.write_str("...");
    }
    match resolve(term, heap) {
        Term::Var(v) => write!(f, "_{}", v.index()),
        Term::Atom(a) => write_atom_str(f, a.name()),
        Term::Number(i) => write!(f, "{i}"),
        Term::Float(r) => write_float(f, *r),
        Term::Compound(c) => {
            write_atom_str(f, c.name())?;
            f.write_str("(")?;
            for (i, arg) in c.args().iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write_term(f, arg, heap, depth + 1)?;
            }
            f.write_str(")")
        }
        Term::BlackBox(_) => f.write_str("<blackbox>"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{atom, func, unify, var, Heap, Var};

    #[test]
    fn atoms() {
        assert_eq!(atom!("foo").to_string(), "foo");
        assert_eq!(atom!("fooBar_1").to_string(), "fooBar_1");
        assert_eq!(atom!("Foo").to_string(), "'Foo'");
        assert_eq!(atom!("hello world").to_string(), "'hello world'");
        assert_eq!(atom!("it's").to_string(), "'it\\'s'");
        assert_eq!(atom!("").to_string(), "''");
        assert_eq!(atom!("!").to_string(), "!");
        assert_eq!(atom!("[]").to_string(), "[]");
        assert_eq!(atom!(",").to_string(), "','");
        assert_eq!(atom!(":-").to_string(), ":-");
    }

    #[test]
    fn numbers() {
        assert_eq!(Term::int(-42).to_string(), "-42");
        assert_eq!(Term::float(3.0).to_string(), "3.0");
        assert_eq!(Term::float(2.25).to_string(), "2.25");
    }

    #[test]
    fn compounds_and_vars() {
        let t = func!("f"; var!(3), func!("g"; "A", 1.5), "x");
        assert_eq!(t.to_string(), "f(_3, g('A', 1.5), x)");
        assert_eq!(Term::black_box(0u8).to_string(), "<blackbox>");
    }

    #[test]
    fn display_with_heap_resolves_chains() {
        let mut heap = Heap::new();
        let vars = heap.newvars(3);
        heap.setvar(Var::new(0), vars[1].clone());
        heap.setvar(Var::new(1), func!("h"; vars[2].clone()));
        let t = func!("f"; vars[0].clone());
        assert_eq!(t.display(&heap).to_string(), "f(h(_2))");
        // read-only: no compression happened
        assert_eq!(heap.getvar(Var::new(0)), Some(&vars[1]));
    }

    #[test]
    fn cyclic_terms_are_cut_off() {
        let mut heap = Heap::new();
        let x = Term::Var(heap.newvar());
        unify(&x, &func!("f"; x.clone()), &mut heap, false).unwrap();
        let shown = x.display(&heap).to_string();
        assert!(shown.starts_with("f(f(f("));
        assert!(shown.contains("..."));
    }

    #[test]
    fn rules() {
        let fact = Rule::fact(func!("p"; "a")).unwrap();
        assert_eq!(fact.to_string(), "p(a).");
        let rule = Rule::new(
            func!("p"; var!(5)),
            Some(func!(","; func!("q"; var!(5)), "!")),
        )
        .unwrap();
        assert_eq!(rule.to_string(), "p(_0) :- ','(q(_0), !).");
    }
}
