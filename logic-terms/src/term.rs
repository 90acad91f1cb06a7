//! Defines the core [`Term`] type and related constructors.
//!
//! Provides the closed set of term kinds (variables, atoms, integers,
//! floats, compound terms and opaque black boxes), their signatures, the
//! unify hash used by clause pre-filtering, and basic utilities for
//! creating and inspecting terms.

use crate::intern;
use core::fmt;
use smartstring::alias::String;
use std::any::Any;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::mem;
use std::sync::Arc;

// Unify hashes carry a small kind tag in their low bits so that, for
// example, the atom `a` and the integer that happens to hash like it do
// not collide.  Variables always hash to `VAR_HASH`, which no other kind
// can produce because every other tag is non-zero.
pub(crate) const TAG_BITS: u32 = 3;
const TAG_ATOM: i64 = 2;
const TAG_NUMBER: i64 = 3;
const TAG_FLOAT: i64 = 4;
const TAG_BLACK_BOX: i64 = 5;
const TAG_COMPOUND: i64 = 6;

/// Unify hash of every variable.  Never used to reject a candidate.
pub const VAR_HASH: i64 = 0;

/// A logic variable: a stable index into a [`BindingStore`].
///
/// A `Var` carries no binding of its own; its value, if any, lives in the
/// heap.  Two `Var`s with the same index are the same logical variable, so
/// `Var::new(i)` needs no cache to hand out "the same instance".
///
/// [`BindingStore`]: crate::BindingStore
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Var(pub(crate) usize);

impl Var {
    #[inline]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Debug for Var {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Var").field(&self.0).finish()
    }
}

pub(crate) struct AtomData {
    pub(crate) name: String,
}

/// A named constant.
///
/// Atoms built with [`Atom::new`] are interned in a process-wide table, so
/// equal names normally share one allocation.  Equality is nevertheless by
/// name: an atom built with [`Atom::uninterned`] equals the interned atom of
/// the same name.
#[derive(Clone)]
pub struct Atom(pub(crate) Arc<AtomData>);

impl Atom {
    /// Returns the interned atom for `name`, creating it on first use.
    #[inline]
    pub fn new(name: impl AsRef<str>) -> Self {
        intern::intern_atom(name.as_ref())
    }

    /// Builds an atom that bypasses the intern table.
    pub fn uninterned(name: impl AsRef<str>) -> Self {
        Self(Arc::new(AtomData {
            name: String::from(name.as_ref()),
        }))
    }

    #[inline]
    pub fn name(&self) -> &str {
        self.0.name.as_str()
    }

    /// The atom's signature, `name/0`.
    #[inline]
    pub fn signature(&self) -> Signature {
        Signature {
            name: self.clone(),
            arity: 0,
        }
    }

    /// Returns `true` if both handles share one allocation.
    #[inline]
    pub fn is_same(&self, other: &Atom) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for Atom {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.is_same(other) || self.name() == other.name()
    }
}

impl Eq for Atom {}

impl Hash for Atom {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name().hash(state)
    }
}

impl fmt::Debug for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Atom").field(&self.name()).finish()
    }
}

/// Name and arity of a callable term, displayed as `name/arity`.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Signature {
    name: Atom,
    arity: usize,
}

impl Signature {
    pub fn new(name: Atom, arity: usize) -> Self {
        Self { name, arity }
    }

    #[inline]
    pub fn name(&self) -> &Atom {
        &self.name
    }

    #[inline]
    pub fn arity(&self) -> usize {
        self.arity
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name.name(), self.arity)
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Signature({self})")
    }
}

pub(crate) struct CompoundData {
    functor: Atom,
    args: Box<[Term]>,
}

// Long lists nest one node per element, so nodes are torn down from a work
// list instead of recursively.  A child is only taken apart when this was
// its last reference.
impl Drop for CompoundData {
    fn drop(&mut self) {
        if !self.args.iter().any(Term::is_compound) {
            return;
        }
        let mut pending = vec![mem::take(&mut self.args)];
        while let Some(args) = pending.pop() {
            for arg in args.into_vec() {
                if let Term::Compound(Compound(node)) = arg {
                    if let Some(mut data) = Arc::into_inner(node) {
                        pending.push(mem::take(&mut data.args));
                    }
                }
            }
        }
    }
}

/// A compound term: a functor applied to a fixed, ordered list of arguments.
///
/// Compound terms are immutable and shared behind an [`Arc`].  Operations
/// that "change" a compound build a new node with the same functor.
#[derive(Clone)]
pub struct Compound(pub(crate) Arc<CompoundData>);

impl Compound {
    /// Callers guarantee `args` is non-empty; see [`Term::compound`].
    pub(crate) fn new(functor: Atom, args: Box<[Term]>) -> Self {
        debug_assert!(!args.is_empty(), "compound term without arguments");
        Self(Arc::new(CompoundData { functor, args }))
    }

    /// A new node with this node's functor and the given arguments.
    #[inline]
    pub(crate) fn with_args(&self, args: Box<[Term]>) -> Self {
        debug_assert_eq!(args.len(), self.arity());
        Self::new(self.0.functor.clone(), args)
    }

    #[inline]
    pub fn functor(&self) -> &Atom {
        &self.0.functor
    }

    #[inline]
    pub fn name(&self) -> &str {
        self.0.functor.name()
    }

    #[inline]
    pub fn args(&self) -> &[Term] {
        &self.0.args
    }

    #[inline]
    pub fn arity(&self) -> usize {
        self.0.args.len()
    }

    #[inline]
    pub fn signature(&self) -> Signature {
        Signature {
            name: self.0.functor.clone(),
            arity: self.arity(),
        }
    }

    /// Same name and arity, without building [`Signature`] values.
    #[inline]
    pub fn same_signature(&self, other: &Compound) -> bool {
        self.arity() == other.arity() && self.0.functor == other.0.functor
    }

    #[inline]
    pub fn is_same(&self, other: &Compound) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Compound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Compound")
            .field(&self.name())
            .field(&self.args())
            .finish()
    }
}

/// What [`Term::rebuild`] does with a visited subterm.
pub(crate) enum Visit {
    /// The subterm's result.
    Leaf(Term),
    /// Rebuild this node from the results of its arguments.
    Enter(Compound),
}

struct BlackBoxData(Box<dyn Any + Send + Sync>);

/// An opaque value supplied by the host.
///
/// The engine never looks inside a black box: it unifies only with itself
/// and compares by identity.  Clones of one `BlackBox` are the same box.
#[derive(Clone)]
pub struct BlackBox(Arc<BlackBoxData>);

impl BlackBox {
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self(Arc::new(BlackBoxData(Box::new(value))))
    }

    /// Borrows the payload if it has type `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        let payload: &(dyn Any + Send + Sync) = &*self.0 .0;
        payload.downcast_ref::<T>()
    }

    #[inline]
    pub fn is_same(&self, other: &BlackBox) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Address of the shared payload; stable while any clone is alive.
    #[inline]
    pub(crate) fn addr(&self) -> usize {
        Arc::as_ptr(&self.0) as usize
    }
}

impl fmt::Debug for BlackBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BlackBox({:#x})", self.addr())
    }
}

/// A term of the logic language.
///
/// `Term` is a closed sum over the six term kinds.  Cloning is cheap: the
/// scalar kinds are stored inline and the others share their payload through
/// an [`Arc`].  Terms are immutable; variable bindings live in a separate
/// [`BindingStore`](crate::BindingStore).
#[derive(Clone)]
pub enum Term {
    Var(Var),
    Atom(Atom),
    Number(i64),
    Float(f64),
    Compound(Compound),
    BlackBox(BlackBox),
}

impl Term {
    #[inline]
    pub fn var(index: usize) -> Self {
        Self::Var(Var::new(index))
    }

    /// Construct or reuse the interned atom `name`.
    #[inline]
    pub fn atom(name: impl AsRef<str>) -> Self {
        Self::Atom(Atom::new(name))
    }

    #[inline]
    pub fn int(i: impl Into<i64>) -> Self {
        Self::Number(i.into())
    }

    #[inline]
    pub fn float(f: impl Into<f64>) -> Self {
        Self::Float(f.into())
    }

    /// Construct a new compound term.  A functor with no arguments results
    /// in an atom.
    pub fn compound(
        functor: impl AsRef<str>,
        args: impl IntoIterator<Item = impl IntoTerm>,
    ) -> Self {
        let functor = Atom::new(functor);
        let args: Box<[Term]> = args.into_iter().map(IntoTerm::into_term).collect();
        if args.is_empty() {
            Self::Atom(functor)
        } else {
            Self::Compound(Compound::new(functor, args))
        }
    }

    pub fn black_box<T: Any + Send + Sync>(value: T) -> Self {
        Self::BlackBox(BlackBox::new(value))
    }

    /// Returns a string describing the kind of this term.
    #[inline]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Var(_) => "var",
            Self::Atom(_) => "atom",
            Self::Number(_) => "int",
            Self::Float(_) => "float",
            Self::Compound(_) => "compound",
            Self::BlackBox(_) => "blackbox",
        }
    }

    /// Position of this term's kind in the standard order of terms.
    #[inline]
    pub fn rank(&self) -> u8 {
        match self {
            Self::Var(_) => 0,
            Self::Atom(_) => 1,
            Self::Number(_) | Self::Float(_) => 2,
            Self::Compound(_) => 3,
            Self::BlackBox(_) => 4,
        }
    }

    #[inline]
    pub fn is_var(&self) -> bool {
        matches!(self, Self::Var(_))
    }

    #[inline]
    pub fn is_atom(&self) -> bool {
        matches!(self, Self::Atom(_))
    }

    #[inline]
    pub fn is_int(&self) -> bool {
        matches!(self, Self::Number(_))
    }

    #[inline]
    pub fn is_float(&self) -> bool {
        matches!(self, Self::Float(_))
    }

    #[inline]
    pub fn is_compound(&self) -> bool {
        matches!(self, Self::Compound(_))
    }

    /// Atoms and compound terms.
    #[inline]
    pub fn is_callable(&self) -> bool {
        matches!(self, Self::Atom(_) | Self::Compound(_))
    }

    #[inline]
    pub fn is_black_box(&self) -> bool {
        matches!(self, Self::BlackBox(_))
    }

    #[inline]
    pub fn as_var(&self) -> Option<Var> {
        match self {
            Self::Var(v) => Some(*v),
            _ => None,
        }
    }

    /// The name of an atom or the functor name of a compound term.
    #[inline]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Atom(a) => Some(a.name()),
            Self::Compound(c) => Some(c.name()),
            _ => None,
        }
    }

    /// Arguments of a compound term; empty for every other kind.
    #[inline]
    pub fn args(&self) -> &[Term] {
        match self {
            Self::Compound(c) => c.args(),
            _ => &[],
        }
    }

    #[inline]
    pub fn arity(&self) -> usize {
        self.args().len()
    }

    /// `name/arity` of a callable term.
    pub fn signature(&self) -> Option<Signature> {
        match self {
            Self::Atom(a) => Some(a.signature()),
            Self::Compound(c) => Some(c.signature()),
            _ => None,
        }
    }

    /// The signature as the term `'/'(Name, Arity)`.
    pub fn prolog_signature(&self) -> Option<Term> {
        let sig = self.signature()?;
        let arity = i64::try_from(sig.arity()).ok()?;
        Some(Term::compound(
            "/",
            [Term::Atom(sig.name().clone()), Term::Number(arity)],
        ))
    }

    /// Identity test: same variable, same shared allocation, or the same
    /// numeric payload.  Structural equality is [`PartialEq`].
    #[inline]
    pub fn same(&self, other: &Term) -> bool {
        match (self, other) {
            (Self::Var(a), Self::Var(b)) => a == b,
            (Self::Atom(a), Self::Atom(b)) => a.is_same(b),
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a.to_bits() == b.to_bits(),
            (Self::Compound(a), Self::Compound(b)) => a.is_same(b),
            (Self::BlackBox(a), Self::BlackBox(b)) => a.is_same(b),
            _ => false,
        }
    }

    /// The highest variable index occurring in the term, ignoring bindings.
    pub fn get_max_var(&self) -> Option<usize> {
        let mut max = None;
        let mut pending = vec![self];
        while let Some(term) = pending.pop() {
            match term {
                Self::Var(v) => max = max.max(Some(v.index())),
                Self::Compound(c) => pending.extend(c.args()),
                _ => {}
            }
        }
        max
    }

    /// Rebuilds the term bottom-up with an explicit stack.  `visit` is
    /// called on the term and then on the arguments of every node it
    /// enters, left to right.
    ///
    /// With `share`, a node whose arguments all come back identical is
    /// returned as it is instead of being rebuilt.
    pub(crate) fn rebuild(&self, share: bool, mut visit: impl FnMut(&Term) -> Visit) -> Term {
        let mut frames: Vec<(Compound, Vec<Term>)> = Vec::new();
        let mut next = self.clone();
        loop {
            let mut done = match visit(&next) {
                Visit::Leaf(term) => term,
                Visit::Enter(c) => {
                    next = c.args()[0].clone();
                    let arity = c.arity();
                    frames.push((c, Vec::with_capacity(arity)));
                    continue;
                }
            };
            loop {
                let Some((c, mut args)) = frames.pop() else {
                    return done;
                };
                args.push(done);
                if args.len() < c.arity() {
                    next = c.args()[args.len()].clone();
                    frames.push((c, args));
                    break;
                }
                let unchanged = share && args.iter().zip(c.args()).all(|(a, b)| a.same(b));
                done = if unchanged {
                    Term::Compound(c)
                } else {
                    Term::Compound(c.with_args(args.into_boxed_slice()))
                };
            }
        }
    }

    /// Cheap discriminator for clause pre-filtering.
    ///
    /// Two non-variable terms with different hashes never unify; equal
    /// hashes prove nothing.  Every variable hashes to [`VAR_HASH`].
    pub fn unify_hash(&self) -> i64 {
        match self {
            Self::Var(_) => VAR_HASH,
            Self::Atom(a) => tagged(pure_hash(a.name()), TAG_ATOM),
            Self::Number(n) => tagged(*n, TAG_NUMBER),
            Self::Float(f) => {
                let (mantissa, _) = frexp(*f);
                let m = (mantissa / 2.0 * f64::from(1u32 << (32 - TAG_BITS))) as i64;
                tagged(m, TAG_FLOAT)
            }
            Self::Compound(c) => tagged(pure_hash(&(c.name(), c.arity())), TAG_COMPOUND),
            Self::BlackBox(b) => tagged(b.addr() as i64, TAG_BLACK_BOX),
        }
    }

    /// Unify hash of the `i`-th argument of a compound term.
    ///
    /// # Panics
    /// If the term is not compound or `i` is out of range.
    pub fn unify_hash_of_child(&self, i: usize) -> i64 {
        match self {
            Self::Compound(c) => c.args()[i].unify_hash(),
            other => panic!("unify_hash_of_child on {} term", other.kind_name()),
        }
    }
}

#[inline]
fn tagged(value: i64, tag: i64) -> i64 {
    value.wrapping_shl(TAG_BITS) | tag
}

/// Deterministic hash: `DefaultHasher::new` uses fixed keys.
fn pure_hash<T: Hash + ?Sized>(value: &T) -> i64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish() as i64
}

/// Splits `x` into a mantissa in `[0.5, 1)` (sign preserved) and a power
/// of two.  Zero, infinities and NaN are returned unchanged with exponent 0.
fn frexp(x: f64) -> (f64, i32) {
    if x == 0.0 || !x.is_finite() {
        return (x, 0);
    }
    let bits = x.to_bits();
    let exp = ((bits >> 52) & 0x7ff) as i32;
    if exp == 0 {
        // subnormal: scale into the normal range first
        let (m, e) = frexp(x * f64::from_bits(0x4350_0000_0000_0000)); // 2^54
        return (m, e - 54);
    }
    let mantissa = f64::from_bits((bits & !(0x7ffu64 << 52)) | (1022u64 << 52));
    (mantissa, exp - 1022)
}

/// Structural equality, ignoring bindings.  Atoms compare by name, floats
/// with `==`, black boxes by identity.
impl PartialEq for Term {
    fn eq(&self, other: &Self) -> bool {
        let mut pending: Vec<(&Term, &Term)> = Vec::new();
        let (mut a, mut b) = (self, other);
        loop {
            let equal = match (a, b) {
                (Self::Var(x), Self::Var(y)) => x == y,
                (Self::Atom(x), Self::Atom(y)) => x == y,
                (Self::Number(x), Self::Number(y)) => x == y,
                (Self::Float(x), Self::Float(y)) => x == y,
                (Self::Compound(x), Self::Compound(y)) => {
                    if x.is_same(y) {
                        true
                    } else if x.same_signature(y) {
                        pending.extend(x.args().iter().zip(y.args()).rev());
                        true
                    } else {
                        false
                    }
                }
                (Self::BlackBox(x), Self::BlackBox(y)) => x.is_same(y),
                _ => false,
            };
            if !equal {
                return false;
            }
            match pending.pop() {
                Some((x, y)) => (a, b) = (x, y),
                None => return true,
            }
        }
    }
}

impl fmt::Debug for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Var(v) => v.fmt(f),
            Self::Atom(a) => a.fmt(f),
            Self::Number(n) => f.debug_tuple("Number").field(n).finish(),
            Self::Float(r) => f.debug_tuple("Float").field(r).finish(),
            Self::Compound(c) => c.fmt(f),
            Self::BlackBox(b) => b.fmt(f),
        }
    }
}

impl From<Var> for Term {
    #[inline]
    fn from(v: Var) -> Self {
        Self::Var(v)
    }
}

impl From<Atom> for Term {
    #[inline]
    fn from(a: Atom) -> Self {
        Self::Atom(a)
    }
}

impl From<Compound> for Term {
    #[inline]
    fn from(c: Compound) -> Self {
        Self::Compound(c)
    }
}

impl From<BlackBox> for Term {
    #[inline]
    fn from(b: BlackBox) -> Self {
        Self::BlackBox(b)
    }
}

/// Conversion into a [`Term`], used by the constructors and macros.
///
/// Integers become [`Term::Number`], floats [`Term::Float`], and strings
/// interned atoms.
pub trait IntoTerm {
    fn into_term(self) -> Term;
}

macro_rules! impl_intoterm_for_integers {
    ($($t:ty),* $(,)?) => {$(
        impl IntoTerm for $t {
            #[inline]
            fn into_term(self) -> Term { Term::Number(self as i64) }
        }
    )*};
}
impl_intoterm_for_integers!(i8, i16, i32, i64, u8, u16, u32);

macro_rules! impl_intoterm_for_floats {
    ($($t:ty),* $(,)?) => {$(
        impl IntoTerm for $t {
            #[inline]
            fn into_term(self) -> Term { Term::Float(self as f64) }
        }
    )*};
}
impl_intoterm_for_floats!(f32, f64);

impl<'a> IntoTerm for &'a str {
    #[inline]
    fn into_term(self) -> Term {
        Term::atom(self)
    }
}

impl IntoTerm for std::string::String {
    #[inline]
    fn into_term(self) -> Term {
        Term::atom(self)
    }
}

impl IntoTerm for Var {
    #[inline]
    fn into_term(self) -> Term {
        Term::Var(self)
    }
}

impl IntoTerm for Atom {
    #[inline]
    fn into_term(self) -> Term {
        Term::Atom(self)
    }
}

impl IntoTerm for Term {
    #[inline]
    fn into_term(self) -> Term {
        self
    }
}

impl IntoTerm for &Term {
    #[inline]
    fn into_term(self) -> Term {
        self.clone()
    }
}

/// Convenience macros to construct compound terms, atoms and variables.
#[macro_export]
macro_rules! func {
    ($functor:expr; $($arg:expr),+ $(,)?) => {
        $crate::Term::compound($functor, [$($crate::IntoTerm::into_term($arg)),+])
    };
}

#[macro_export]
macro_rules! atom {
    ($name:expr) => {
        $crate::Term::atom($name)
    };
}

#[macro_export]
macro_rules! var {
    ($index:expr) => {
        $crate::Term::var($index)
    };
}
