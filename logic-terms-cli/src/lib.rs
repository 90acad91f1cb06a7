//! Library half of the `logic-terms` command-line tool.
//!
//! The binary wraps [`run_stress`], which generates random term pairs and
//! checks properties the unification engine must satisfy on every input:
//!
//! - unification succeeds in one direction iff it succeeds in the other;
//! - a successful unification (with occurs check) makes both sides equal;
//! - the standard order is antisymmetric;
//! - instantiating a clause head against a goal agrees with copying the
//!   head and unifying the copy, and the unify-hash pre-filter never
//!   rejects a head that matches.

mod error;
pub mod stress;

pub use error::CliError;
pub use stress::{run_stress, StressConfig, StressReport, TermGenerator};
