//! Stored clauses and their instantiation against goals.

use crate::{BindingStore, Memo, Signature, Term, TermError, UnifyError, VarMapping, VAR_HASH};

/// Name of the cut atom.
pub const CUT: &str = "!";

/// A clause `head :- body`, or a fact when there is no body.
///
/// Variables of the head and body are renumbered together into
/// `0..numvars` when the rule is built, so a rule never shares variables
/// with any heap.  Every use goes through
/// [`clone_and_unify_head`](Rule::clone_and_unify_head), which gives the
/// rule's variables fresh heap cells.
#[derive(Debug, Clone)]
pub struct Rule {
    head: Term,
    body: Option<Term>,
    numvars: usize,
    signature: Signature,
    unify_hash: Vec<i64>,
    contains_cut: bool,
}

impl Rule {
    /// Builds a rule from a callable head and an optional callable body.
    pub fn new(head: Term, body: Option<Term>) -> Result<Self, TermError> {
        let signature = callable_signature(&head)?;
        if let Some(body) = &body {
            callable_signature(body)?;
        }

        let mut mapping = VarMapping::new();
        let head = head.clone_compress_vars(&mut mapping, 0);
        let body = body.map(|body| body.clone_compress_vars(&mut mapping, 0));
        let numvars = mapping.len();
        let unify_hash = head.args().iter().map(Term::unify_hash).collect();
        let contains_cut = body.as_ref().is_some_and(contains_cut);

        log::debug!("built rule {signature} with {numvars} variables");
        Ok(Self {
            head,
            body,
            numvars,
            signature,
            unify_hash,
            contains_cut,
        })
    }

    /// Builds a fact.
    pub fn fact(head: Term) -> Result<Self, TermError> {
        Self::new(head, None)
    }

    #[inline]
    pub fn head(&self) -> &Term {
        &self.head
    }

    #[inline]
    pub fn body(&self) -> Option<&Term> {
        self.body.as_ref()
    }

    #[inline]
    pub fn is_fact(&self) -> bool {
        self.body.is_none()
    }

    /// Number of distinct variables in head and body together.
    #[inline]
    pub fn numvars(&self) -> usize {
        self.numvars
    }

    #[inline]
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Unify hash of each head argument, in order.
    #[inline]
    pub fn unify_hash(&self) -> &[i64] {
        &self.unify_hash
    }

    /// Whether the body mentions the cut atom anywhere.
    #[inline]
    pub fn contains_cut(&self) -> bool {
        self.contains_cut
    }

    /// Cheap pre-filter: `false` means the head cannot unify with `goal`,
    /// `true` means it might.
    pub fn may_unify<H: BindingStore + ?Sized>(&self, goal: &Term, heap: &mut H) -> bool {
        let goal = goal.dereference(heap);
        self.unify_hash
            .iter()
            .zip(goal.args())
            .all(|(&stored, arg)| hashes_compatible(stored, arg.dereference(heap).unify_hash()))
    }

    /// Unifies a fresh copy of the head with `goal` and returns the copied
    /// body, or `None` for a fact.  A variable goal is dereferenced first.
    ///
    /// On failure, bindings already made to the goal's variables stay in
    /// `heap`.
    ///
    /// # Panics
    /// If `goal` has a different arity from the head.
    pub fn clone_and_unify_head<H: BindingStore + ?Sized>(
        &self,
        heap: &mut H,
        goal: &Term,
    ) -> Result<Option<Term>, UnifyError> {
        let goal = goal.dereference(heap);
        let mut memo = Memo::with_capacity(self.numvars);
        let head_args = self.head.args();
        let goal_args = goal.args();
        assert_eq!(
            head_args.len(),
            goal_args.len(),
            "goal {goal:?} called against rule for {}",
            self.signature
        );
        for (arg, goal_arg) in head_args.iter().zip(goal_args) {
            if let Err(err) = arg.copy_and_unify(goal_arg, heap, &mut memo) {
                log::trace!("head of {} rejected goal: {err}", self.signature);
                return Err(err);
            }
        }
        Ok(self.body.as_ref().map(|body| body.copy(heap, &mut memo)))
    }
}

/// `true` unless both hashes are known and differ.
#[inline]
pub fn hashes_compatible(a: i64, b: i64) -> bool {
    a == VAR_HASH || b == VAR_HASH || a == b
}

fn callable_signature(term: &Term) -> Result<Signature, TermError> {
    match term {
        Term::Atom(a) => Ok(a.signature()),
        Term::Compound(c) => Ok(c.signature()),
        Term::Var(_) => Err(TermError::Instantiation),
        other => Err(TermError::UnexpectedKind {
            expected: "callable",
            found: other.kind_name(),
        }),
    }
}

fn contains_cut(body: &Term) -> bool {
    let mut pending = vec![body];
    while let Some(term) = pending.pop() {
        match term {
            Term::Atom(a) if a.name() == CUT => return true,
            Term::Compound(c) => pending.extend(c.args()),
            _ => {}
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{atom, func, var, Heap, Var};

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn shared_head_and_body_variables() {
        // f(X, Y) :- g(Y, Z)
        let rule = Rule::new(
            func!("f"; var!(4), var!(8)),
            Some(func!("g"; var!(8), var!(2))),
        )
        .unwrap();
        assert_eq!(rule.numvars(), 3);
        assert_eq!(rule.head(), &func!("f"; var!(0), var!(1)));
        assert_eq!(rule.body(), Some(&func!("g"; var!(1), var!(2))));
        assert_eq!(rule.signature().to_string(), "f/2");
        assert!(!rule.is_fact());
        assert!(!rule.contains_cut());
    }

    #[test]
    fn head_must_be_callable() {
        assert!(matches!(
            Rule::fact(var!(0)),
            Err(TermError::Instantiation)
        ));
        assert!(matches!(
            Rule::fact(Term::int(3)),
            Err(TermError::UnexpectedKind {
                expected: "callable",
                found: "int"
            })
        ));
        assert!(matches!(
            Rule::new(atom!("p"), Some(Term::float(1.0))),
            Err(TermError::UnexpectedKind { found: "float", .. })
        ));
        assert!(matches!(
            Rule::new(atom!("p"), Some(var!(0))),
            Err(TermError::Instantiation)
        ));
    }

    #[test]
    fn atom_heads() {
        let rule = Rule::fact(atom!("halt")).unwrap();
        assert!(rule.is_fact());
        assert!(rule.unify_hash().is_empty());
        assert_eq!(rule.signature().to_string(), "halt/0");
        let mut heap = Heap::new();
        assert_eq!(rule.clone_and_unify_head(&mut heap, &atom!("halt")), Ok(None));
    }

    #[test]
    fn cut_detection() {
        let direct = Rule::new(atom!("p"), Some(atom!("!"))).unwrap();
        assert!(direct.contains_cut());

        let nested = Rule::new(
            func!("p"; var!(0)),
            Some(func!(","; func!("q"; var!(0)), func!(";"; "!", "fail"))),
        )
        .unwrap();
        assert!(nested.contains_cut());

        let without = Rule::new(
            func!("p"; var!(0)),
            Some(func!(","; func!("q"; var!(0)), "true")),
        )
        .unwrap();
        assert!(!without.contains_cut());

        // a cut in the head does not count
        assert!(!Rule::fact(func!("p"; "!")).unwrap().contains_cut());
    }

    #[test]
    fn unify_hash_per_head_argument() {
        let rule = Rule::fact(func!("p"; "a", var!(3), 7)).unwrap();
        assert_eq!(
            rule.unify_hash(),
            &[atom!("a").unify_hash(), VAR_HASH, Term::int(7).unify_hash()]
        );
    }

    #[test]
    fn pre_filter() {
        let mut heap = Heap::new();
        let x = Term::Var(heap.newvar());
        let rule = Rule::fact(func!("p"; "a", var!(0))).unwrap();
        assert!(rule.may_unify(&func!("p"; "a", "b"), &mut heap));
        assert!(rule.may_unify(&func!("p"; x.clone(), "b"), &mut heap));
        assert!(!rule.may_unify(&func!("p"; "c", "b"), &mut heap));

        // bound goal variables are looked through
        heap.setvar(x.as_var().unwrap(), atom!("c"));
        assert!(!rule.may_unify(&func!("p"; x.clone(), "b"), &mut heap));

        assert!(hashes_compatible(VAR_HASH, 17));
        assert!(hashes_compatible(17, VAR_HASH));
        assert!(hashes_compatible(17, 17));
        assert!(!hashes_compatible(17, 25));
    }

    #[test]
    fn instantiate_against_goal() {
        init_logger();
        // append([], L, L).  against append([], [1], R)
        let rule = Rule::fact(func!("append"; "[]", var!(0), var!(0))).unwrap();
        let mut heap = Heap::new();
        let r = Term::Var(heap.newvar());
        let list = func!("."; 1, "[]");
        let goal = func!("append"; "[]", list.clone(), r.clone());
        assert_eq!(rule.clone_and_unify_head(&mut heap, &goal), Ok(None));
        assert_eq!(r.getvalue(&mut heap), list);
    }

    #[test]
    fn instantiate_returns_renamed_body() {
        // p(X) :- q(X, Y)   against p(a)
        let rule = Rule::new(
            func!("p"; var!(0)),
            Some(func!("q"; var!(0), var!(1))),
        )
        .unwrap();
        let mut heap = Heap::new();
        let body = rule
            .clone_and_unify_head(&mut heap, &func!("p"; "a"))
            .unwrap()
            .unwrap();
        assert_eq!(body.name(), Some("q"));
        assert_eq!(body.args()[0], atom!("a"));
        assert!(body.args()[1].is_var());
        assert_eq!(heap.len(), 1);

        // a second use gets fresh variables
        let again = rule
            .clone_and_unify_head(&mut heap, &func!("p"; "b"))
            .unwrap()
            .unwrap();
        assert_ne!(again.args()[1], body.args()[1]);
    }

    #[test]
    fn instantiate_failure() {
        let rule = Rule::fact(func!("p"; "a", "b")).unwrap();
        let mut heap = Heap::new();
        let x = Term::Var(heap.newvar());
        let cp = heap.checkpoint();
        assert_eq!(
            rule.clone_and_unify_head(&mut heap, &func!("p"; x.clone(), "c")),
            Err(UnifyError::AtomMismatch)
        );
        // earlier bindings survive until the caller undoes them
        assert_eq!(x.dereference(&mut heap), atom!("a"));
        heap.undo(cp).unwrap();
        assert!(x.dereference(&mut heap).is_var());
    }

    #[test]
    #[should_panic]
    fn arity_mismatch_panics() {
        let rule = Rule::fact(func!("p"; "a")).unwrap();
        let mut heap = Heap::new();
        let _ = rule.clone_and_unify_head(&mut heap, &func!("p"; "a", "b"));
    }

    fn long_list(len: usize, tail: Term) -> Term {
        (0..len).fold(tail, |list, i| func!("."; i as i64, list))
    }

    #[test]
    fn rule_over_long_list() {
        let rule = Rule::new(
            func!("last"; long_list(100_000, var!(7)), var!(7)),
            Some(func!("done"; long_list(100_000, var!(7)))),
        )
        .unwrap();
        assert_eq!(rule.numvars(), 1);
        assert!(!rule.contains_cut());

        let mut heap = Heap::new();
        let last = Term::Var(heap.newvar());
        let goal = func!("last"; long_list(100_000, atom!("[]")), last.clone());
        let body = rule.clone_and_unify_head(&mut heap, &goal).unwrap().unwrap();
        assert_eq!(last.getvalue(&mut heap), atom!("[]"));
        assert!(body.getvalue(&mut heap) == func!("done"; long_list(100_000, atom!("[]"))));
    }

    #[test]
    fn bound_var_goal_is_dereferenced() {
        let rule = Rule::fact(func!("p"; "a", var!(0))).unwrap();
        let mut heap = Heap::new();
        let goal = Term::Var(heap.newvar());
        let y = Term::Var(heap.newvar());
        heap.setvar(Var::new(0), func!("p"; "a", y.clone()));
        assert!(rule.may_unify(&goal, &mut heap));
        assert_eq!(rule.clone_and_unify_head(&mut heap, &goal), Ok(None));
        assert!(y.getvalue(&mut heap).is_var());
    }
}
