//! Process-wide atom table.
//!
//! Atoms built through [`Atom::new`] are looked up here first, so repeated
//! uses of one name share a single allocation.  The table only grows.

use crate::term::Atom;
use indexmap::IndexMap;
use smartstring::alias::String;
use std::sync::{LazyLock, PoisonError, RwLock};

pub type AtomTable = IndexMap<String, Atom>;

static ATOMS: LazyLock<RwLock<AtomTable>> = LazyLock::new(|| RwLock::new(AtomTable::new()));

/// The lazily initialised table behind [`Atom::new`].
pub fn atom_table() -> &'static RwLock<AtomTable> {
    &ATOMS
}

pub(crate) fn intern_atom(name: &str) -> Atom {
    // The table is append-only, so a poisoned lock still holds valid data.
    if let Some(atom) = ATOMS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(name)
    {
        return atom.clone();
    }
    let mut table = ATOMS.write().unwrap_or_else(PoisonError::into_inner);
    table
        .entry(String::from(name))
        .or_insert_with(|| Atom::uninterned(name))
        .clone()
}

/// Number of distinct atoms interned so far.
pub fn interned_atoms() -> usize {
    ATOMS.read().unwrap_or_else(PoisonError::into_inner).len()
}

/// Returns the interned atom for `name` without creating it.
pub fn lookup_atom(name: &str) -> Option<Atom> {
    ATOMS
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(name)
        .cloned()
}
