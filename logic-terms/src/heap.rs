//! Defines the [`BindingStore`] contract and the [`Heap`] that implements it.
//!
//! The engine reads and writes variable bindings only through
//! [`BindingStore`].  [`Heap`] is the reference store: an index-addressed
//! vector of cells with a trail, so that bindings made after a
//! [`Checkpoint`] can be undone on backtracking.

use crate::{Term, TermError, Var};

/// Storage for variable bindings.
///
/// Indexing a variable that the store never allocated is a programming
/// defect; implementations panic rather than report it.
pub trait BindingStore {
    /// Allocates a fresh, unbound variable.  Indexes grow monotonically.
    fn newvar(&mut self) -> Var;

    /// The current binding of `var`, or `None` when unbound.
    fn getvar(&self, var: Var) -> Option<&Term>;

    /// Binds or rebinds `var`.  The engine never unbinds a variable; undoing
    /// bindings is the store's business.
    fn setvar(&mut self, var: Var, value: Term);
}

/// Tunables for a [`Heap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct HeapOptions {
    /// Initial number of variable cells.
    pub var_capacity: usize,
    /// Initial number of trail entries.
    pub trail_capacity: usize,
    /// Skip trailing writes to cells allocated after the newest checkpoint.
    pub conditional_trailing: bool,
}

impl Default for HeapOptions {
    fn default() -> Self {
        Self {
            var_capacity: 1024,
            trail_capacity: 256,
            conditional_trailing: true,
        }
    }
}

impl HeapOptions {
    pub fn with_var_capacity(mut self, var_capacity: usize) -> Self {
        self.var_capacity = var_capacity;
        self
    }

    pub fn with_trail_capacity(mut self, trail_capacity: usize) -> Self {
        self.trail_capacity = trail_capacity;
        self
    }

    pub fn with_conditional_trailing(mut self, enabled: bool) -> Self {
        self.conditional_trailing = enabled;
        self
    }
}

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeapID(pub(crate) u32); // Random Heap ID

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct EpochID(pub(crate) u32); // Random Epoch ID

/// A mark in a heap's history, returned by [`Heap::checkpoint`].
///
/// A checkpoint stays live until it is undone past, committed, or the heap
/// is cleared.  Using it afterwards, or on another heap, is an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint {
    heap_id: HeapID,
    epoch_id: EpochID,
    trail_len: usize,
    vars_len: usize,
}

impl Checkpoint {
    /// Number of variables allocated when the checkpoint was taken.
    #[inline]
    pub fn vars_len(&self) -> usize {
        self.vars_len
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeapStats {
    /// Allocated variable cells.
    pub vars: usize,
    /// Cells currently holding a binding.
    pub bound: usize,
    pub trail_len: usize,
}

#[derive(Debug, Clone)]
struct TrailEntry {
    var: Var,
    previous: Option<Term>,
}

/// The reference [`BindingStore`].
///
/// ### Checkpoints
/// Checkpoints form a stack.  [`Heap::checkpoint`] pushes a new one;
/// [`Heap::undo`] rolls every binding made since the given checkpoint back
/// to its previous value, drops the variables allocated since, and discards
/// all newer checkpoints while keeping the given one live so it can be
/// undone to again.  [`Heap::commit`] discards a checkpoint (and all newer
/// ones) and keeps the bindings.
///
/// ```
/// # use logic_terms::{unify, BindingStore, Heap, Term};
/// let mut heap = Heap::new();
/// let x = Term::Var(heap.newvar());
/// let cp = heap.checkpoint();
/// unify(&x, &Term::int(1), &mut heap, false).unwrap();
/// heap.undo(cp).unwrap();
/// assert!(x.dereference(&mut heap).is_var());
/// ```
///
/// ### Conditional trailing
/// A write to a cell allocated after the newest live checkpoint needs no
/// trail entry: undoing to that checkpoint drops the cell altogether.
/// Every other write is trailed, including the rewrites done by path
/// compression in [`Term::dereference`].
#[derive(Debug, Clone)]
pub struct Heap {
    heap_id: HeapID,
    cells: Vec<Option<Term>>,
    trail: Vec<TrailEntry>,
    checkpoints: Vec<Checkpoint>,
    conditional_trailing: bool,
}

impl Default for Heap {
    fn default() -> Self {
        Self::new()
    }
}

impl Heap {
    pub fn with_options(options: HeapOptions) -> Self {
        Self {
            heap_id: HeapID(rand::random()),
            cells: Vec::with_capacity(options.var_capacity),
            trail: Vec::with_capacity(options.trail_capacity),
            checkpoints: Vec::new(),
            conditional_trailing: options.conditional_trailing,
        }
    }

    pub fn with_capacity(var_capacity: usize, trail_capacity: usize) -> Self {
        Self::with_options(
            HeapOptions::default()
                .with_var_capacity(var_capacity)
                .with_trail_capacity(trail_capacity),
        )
    }

    /// Create a new, empty heap with default options.
    pub fn new() -> Self {
        Self::with_options(HeapOptions::default())
    }

    /// Number of allocated variables.
    #[inline]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[inline]
    pub fn trail_len(&self) -> usize {
        self.trail.len()
    }

    /// Returns stats.  Counting bound cells scans the whole heap, so this
    /// is O(n) in the number of variables.
    pub fn stats(&self) -> HeapStats {
        HeapStats {
            vars: self.cells.len(),
            bound: self.cells.iter().filter(|cell| cell.is_some()).count(),
            trail_len: self.trail.len(),
        }
    }

    /// Allocates `n` fresh variables and returns them as terms.
    pub fn newvars(&mut self, n: usize) -> Vec<Term> {
        (0..n).map(|_| Term::Var(self.newvar())).collect()
    }

    /// Records the current state and makes it the newest live checkpoint.
    pub fn checkpoint(&mut self) -> Checkpoint {
        let cp = Checkpoint {
            heap_id: self.heap_id,
            epoch_id: EpochID(rand::random()),
            trail_len: self.trail.len(),
            vars_len: self.cells.len(),
        };
        self.checkpoints.push(cp);
        cp
    }

    /// Restores every binding made since `cp` and drops the variables
    /// allocated since.  `cp` stays live; newer checkpoints are discarded.
    pub fn undo(&mut self, cp: Checkpoint) -> Result<(), TermError> {
        let depth = self.checkpoint_index(cp)?;
        let undone = self.trail.len() - cp.trail_len;
        for entry in self.trail.drain(cp.trail_len..).rev() {
            self.cells[entry.var.index()] = entry.previous;
        }
        self.cells.truncate(cp.vars_len);
        self.checkpoints.truncate(depth + 1);
        log::trace!(
            "undo to {:?}: {} trail entries, {} vars live",
            cp.epoch_id,
            undone,
            cp.vars_len
        );
        Ok(())
    }

    /// Discards `cp` and every newer checkpoint, keeping all bindings.
    pub fn commit(&mut self, cp: Checkpoint) -> Result<(), TermError> {
        let depth = self.checkpoint_index(cp)?;
        self.checkpoints.truncate(depth);
        if self.checkpoints.is_empty() {
            self.trail.clear();
        }
        Ok(())
    }

    /// Erases all variables, bindings and checkpoints.
    /// Does not shrink the allocated capacity.
    pub fn clear(&mut self) {
        self.cells.clear();
        self.trail.clear();
        self.checkpoints.clear();
    }

    /// Searches the live checkpoints and returns the position of `cp`.
    #[inline]
    fn checkpoint_index(&self, cp: Checkpoint) -> Result<usize, TermError> {
        if cp.heap_id != self.heap_id {
            return Err(TermError::InvalidCheckpoint(cp));
        }
        self.checkpoints
            .iter()
            .rposition(|live| *live == cp)
            .ok_or(TermError::InvalidCheckpoint(cp))
    }

    #[inline]
    fn needs_trail(&self, index: usize) -> bool {
        if !self.conditional_trailing {
            return !self.checkpoints.is_empty();
        }
        match self.checkpoints.last() {
            Some(newest) => index < newest.vars_len,
            None => false,
        }
    }
}

impl BindingStore for Heap {
    #[inline]
    fn newvar(&mut self) -> Var {
        let var = Var::new(self.cells.len());
        self.cells.push(None);
        var
    }

    #[inline]
    fn getvar(&self, var: Var) -> Option<&Term> {
        self.cells[var.index()].as_ref()
    }

    fn setvar(&mut self, var: Var, value: Term) {
        let index = var.index();
        assert!(
            index < self.cells.len(),
            "variable {index} was never allocated"
        );
        if self.needs_trail(index) {
            let previous = self.cells[index].take();
            self.trail.push(TrailEntry { var, previous });
        }
        self.cells[index] = Some(value);
    }
}
