use logic_terms::{
    atom, compare_standard_order, func, unify, var, Atom, BindingStore, Heap, Memo, Rule, Term,
    UnifyError, VarMapping,
};
use std::cmp::Ordering;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[test]
fn equal_atoms_unify_without_writes() {
    init_logger();
    let mut heap = Heap::new();
    heap.newvars(2);
    let cp = heap.checkpoint();
    assert_eq!(unify(&atom!("foo"), &atom!("foo"), &mut heap, false), Ok(()));
    assert_eq!(heap.stats().bound, 0);
    assert_eq!(heap.trail_len(), 0);
    heap.commit(cp).unwrap();
}

#[test]
fn fresh_var_binds_to_number() {
    let mut heap = Heap::new();
    let x = Term::Var(heap.newvar());
    assert_eq!(unify(&x, &Term::int(5), &mut heap, false), Ok(()));
    assert_eq!(x.dereference(&mut heap), Term::int(5));
}

#[test]
fn compound_argument_binding() {
    let mut heap = Heap::new();
    let x = Term::Var(heap.newvar());
    let a = func!("f"; x.clone(), "a");
    let b = func!("f"; 3, "a");
    assert_eq!(unify(&a, &b, &mut heap, false), Ok(()));
    assert_eq!(x.getvalue(&mut heap), Term::int(3));
}

#[test]
fn functor_mismatch_with_equal_arity() {
    let mut heap = Heap::new();
    assert_eq!(
        unify(&func!("f"; "a"), &func!("g"; "a"), &mut heap, false),
        Err(UnifyError::FunctorMismatch)
    );
}

#[test]
fn occurs_check_is_optional() {
    let mut heap = Heap::new();
    let x = Term::Var(heap.newvar());
    let fx = func!("f"; x.clone());
    let cp = heap.checkpoint();
    assert_eq!(unify(&x, &fx, &mut heap, true), Err(UnifyError::OccursCheck));
    heap.undo(cp).unwrap();
    assert_eq!(unify(&x, &fx, &mut heap, false), Ok(()));
}

#[test]
fn repeated_head_variable() {
    init_logger();
    let rule = Rule::fact(func!("f"; var!(0), var!(0))).unwrap();
    assert_eq!(rule.numvars(), 1);

    let mut heap = Heap::new();
    let cp = heap.checkpoint();
    assert_eq!(rule.clone_and_unify_head(&mut heap, &func!("f"; 1, 1)), Ok(None));
    heap.undo(cp).unwrap();
    assert_eq!(
        rule.clone_and_unify_head(&mut heap, &func!("f"; 1, 2)),
        Err(UnifyError::NumberMismatch)
    );
}

#[test]
fn atoms_precede_numbers() {
    let mut heap = Heap::new();
    assert_eq!(
        compare_standard_order(&atom!("a"), &Term::int(1), &mut heap),
        Ordering::Less
    );
}

#[test]
fn interned_atoms_are_identical() {
    let a = Atom::new("foo");
    let b = Atom::new("foo");
    assert_eq!(a, b);
    assert!(a.is_same(&b));
}

#[test]
fn sharing_differs_between_copy_and_resolution() {
    let mut heap = Heap::new();
    let ground = func!("f"; "a", func!("g"; 1));
    let copied = ground.copy(&mut heap, &mut Memo::new());
    assert!(!copied.same(&ground));
    assert!(ground.getvalue(&mut heap).same(&ground));
    assert!(ground
        .clone_compress_vars(&mut VarMapping::new(), 0)
        .same(&ground));
}

#[test]
fn resolution_step_with_backtracking() {
    // member(X, [X|_]).
    // member(X, [_|T]) :- member(X, T).
    let clauses = [
        Rule::fact(func!("member"; var!(0), func!("."; var!(0), var!(1)))).unwrap(),
        Rule::new(
            func!("member"; var!(0), func!("."; var!(1), var!(2))),
            Some(func!("member"; var!(0), var!(2))),
        )
        .unwrap(),
    ];

    let mut heap = Heap::new();
    let x = Term::Var(heap.newvar());
    let list = func!("."; "a", func!("."; "b", "[]"));
    let goal = func!("member"; x.clone(), list);

    let cp = heap.checkpoint();
    let mut answers = Vec::new();
    for rule in &clauses {
        assert!(rule.may_unify(&goal, &mut heap));
        match rule.clone_and_unify_head(&mut heap, &goal) {
            Ok(None) => answers.push(x.getvalue(&mut heap)),
            Ok(Some(body)) => {
                // one more step: member(X, [b]) against the first clause
                let body = body.getvalue(&mut heap);
                assert_eq!(body.display(&heap).to_string(), format!("member({x}, .(b, []))"));
                let inner = heap.checkpoint();
                assert_eq!(clauses[0].clone_and_unify_head(&mut heap, &body), Ok(None));
                answers.push(x.getvalue(&mut heap));
                heap.undo(inner).unwrap();
            }
            Err(err) => panic!("unexpected failure: {err}"),
        }
        heap.undo(cp).unwrap();
    }
    assert_eq!(answers, [atom!("a"), atom!("b")]);
    assert!(x.dereference(&mut heap).is_var());
}
