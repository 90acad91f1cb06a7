//! # Logic Terms
//!
//! Term representation and unification for a Prolog-style interpreter.
//!
//! This crate provides the [`Term`] type for representing logic terms
//! (variables, atoms, integers, floats, compound terms and opaque host
//! values), a [`Heap`] holding variable bindings behind the
//! [`BindingStore`] trait, the [`unify`] algorithm, clause instantiation
//! through [`Rule::clone_and_unify_head`], and the standard order of terms
//! via [`compare_standard_order`].
//!
//! Terms are immutable and cheap to clone.  A variable is only an index;
//! its binding lives in the heap, and the heap's trail lets a search engine
//! take a [`Checkpoint`] and undo every binding made since.
//!
//! ## Example
//! ```rust
//! # use logic_terms::{func, var, unify, BindingStore, Heap, Rule, Term};
//! // append([], L, L).
//! let rule = Rule::fact(func!("append"; "[]", var!(0), var!(0))).unwrap();
//!
//! let mut heap = Heap::new();
//! let r = Term::Var(heap.newvar());
//! let goal = func!("append"; "[]", func!("."; 1, "[]"), r.clone());
//!
//! let cp = heap.checkpoint();
//! if rule.may_unify(&goal, &mut heap) {
//!     let body = rule.clone_and_unify_head(&mut heap, &goal).unwrap();
//!     assert!(body.is_none());
//! }
//! assert_eq!(r.display(&heap).to_string(), ".(1, [])");
//!
//! // backtrack
//! heap.undo(cp).unwrap();
//! assert!(r.dereference(&mut heap).is_var());
//!
//! // unification failure is an ordinary value
//! assert!(unify(&func!("f"; 1), &func!("f"; 2), &mut heap, false).is_err());
//! ```
//!
//! ## License
//!
//! Copyright (c) 2005–2025 IKH Software, Inc.
//!
//! Released under the terms of the GNU Lesser General Public License, version 3.0 or
//! (at your option) any later version (LGPL-3.0-or-later).

mod copy;
mod display;
mod error;
mod heap;
pub mod intern;
mod order;
mod rule;
mod term;
mod unify;

pub use copy::{Memo, VarMapping};
pub use display::TermDisplay;
pub use error::{TermError, UnifyError};
pub use heap::{BindingStore, Checkpoint, EpochID, Heap, HeapID, HeapOptions, HeapStats};
pub use order::compare_standard_order;
pub use rule::{hashes_compatible, Rule, CUT};
pub use term::{Atom, BlackBox, Compound, IntoTerm, Signature, Term, Var, VAR_HASH};
pub use unify::unify;
