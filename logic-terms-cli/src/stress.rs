//! Randomized consistency checks over the unification engine.

use crate::CliError;
use logic_terms::{compare_standard_order, unify, Checkpoint, Heap, Memo, Rule, Term, UnifyError};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt;

const ATOMS: &[&str] = &["a", "b", "[]", "!"];
const FLOATS: &[f64] = &[0.0, -0.0, 1.5, -2.0];
const FUNCTORS: &[(&str, usize)] = &[("f", 1), ("f", 2), ("g", 2), (".", 2)];

/// Parameters of a stress run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StressConfig {
    pub seed: u64,
    /// Number of term pairs to generate.
    pub pairs: usize,
    /// Maximum nesting depth of generated terms.
    pub depth: usize,
    /// Number of heap variables the generated terms draw from.
    pub vars: usize,
    pub occurs_check: bool,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            pairs: 1000,
            depth: 4,
            vars: 4,
            occurs_check: false,
        }
    }
}

/// Counts gathered by [`run_stress`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StressReport {
    pub pairs: usize,
    /// Pairs that unified.
    pub unified: usize,
    /// Pairs tried as clause head and goal.
    pub instantiated: usize,
    /// Checks skipped because unifying the pair would build a cyclic term.
    pub cyclic: usize,
    pub symmetry_violations: usize,
    pub equality_violations: usize,
    pub order_violations: usize,
    pub instantiation_mismatches: usize,
    pub prefilter_rejections: usize,
}

impl StressReport {
    pub fn violations(&self) -> usize {
        self.symmetry_violations
            + self.equality_violations
            + self.order_violations
            + self.instantiation_mismatches
            + self.prefilter_rejections
    }
}

impl fmt::Display for StressReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "pairs:                    {}", self.pairs)?;
        writeln!(f, "unified:                  {}", self.unified)?;
        writeln!(f, "instantiated:             {}", self.instantiated)?;
        writeln!(f, "cyclic (skipped):         {}", self.cyclic)?;
        writeln!(f, "symmetry violations:      {}", self.symmetry_violations)?;
        writeln!(f, "equality violations:      {}", self.equality_violations)?;
        writeln!(f, "order violations:         {}", self.order_violations)?;
        writeln!(f, "instantiation mismatches: {}", self.instantiation_mismatches)?;
        write!(f, "pre-filter rejections:    {}", self.prefilter_rejections)
    }
}

/// Seeded generator of random terms over a small vocabulary, so that
/// generated pairs unify often enough to be interesting.
pub struct TermGenerator {
    rng: StdRng,
    depth: usize,
    vars: usize,
}

impl TermGenerator {
    pub fn new(seed: u64, depth: usize, vars: usize) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            depth,
            vars,
        }
    }

    pub fn term(&mut self) -> Term {
        self.term_at(self.depth)
    }

    fn term_at(&mut self, depth: usize) -> Term {
        if depth == 0 || self.rng.gen_bool(0.4) {
            return self.leaf();
        }
        let (name, arity) = FUNCTORS[self.rng.gen_range(0..FUNCTORS.len())];
        let args: Vec<Term> = (0..arity).map(|_| self.term_at(depth - 1)).collect();
        Term::compound(name, args)
    }

    fn leaf(&mut self) -> Term {
        match self.rng.gen_range(0..5) {
            0 | 1 if self.vars > 0 => Term::var(self.rng.gen_range(0..self.vars)),
            2 => Term::int(self.rng.gen_range(-2i64..3)),
            3 => Term::float(FLOATS[self.rng.gen_range(0..FLOATS.len())]),
            _ => Term::atom(ATOMS[self.rng.gen_range(0..ATOMS.len())]),
        }
    }
}

/// Generates `config.pairs` term pairs and checks each of them.
pub fn run_stress(config: &StressConfig) -> Result<StressReport, CliError> {
    let mut generator = TermGenerator::new(config.seed, config.depth, config.vars);
    let mut report = StressReport::default();
    for _ in 0..config.pairs {
        let a = generator.term();
        let b = generator.term();
        check_pair(&a, &b, config, &mut report)?;
        report.pairs += 1;
    }
    log::info!(
        "stress run with seed {}: {} pairs, {} violations",
        config.seed,
        report.pairs,
        report.violations()
    );
    Ok(report)
}

fn check_pair(
    a: &Term,
    b: &Term,
    config: &StressConfig,
    report: &mut StressReport,
) -> Result<(), CliError> {
    let mut heap = Heap::new();
    heap.newvars(config.vars);
    let cp = heap.checkpoint();

    // Without the occurs check, unifying two cyclic terms may not terminate.
    // Such pairs are recognised by the occurs check failing in either
    // direction, and skipped.
    let cyclic = !config.occurs_check && {
        let forward = unify(a, b, &mut heap, true);
        heap.undo(cp)?;
        let backward = unify(b, a, &mut heap, true);
        heap.undo(cp)?;
        forward == Err(UnifyError::OccursCheck) || backward == Err(UnifyError::OccursCheck)
    };
    if cyclic {
        report.cyclic += 1;
    } else {
        let forward = unify(a, b, &mut heap, config.occurs_check).is_ok();
        if forward && a.getvalue(&mut heap) != b.getvalue(&mut heap) {
            log::warn!("unified but unequal: {a} = {b}");
            report.equality_violations += 1;
        }
        heap.undo(cp)?;
        let backward = unify(b, a, &mut heap, config.occurs_check).is_ok();
        heap.undo(cp)?;
        if forward {
            report.unified += 1;
        }
        if forward != backward {
            log::warn!("asymmetric unification: {a} = {b}");
            report.symmetry_violations += 1;
        }
    }

    let ab = compare_standard_order(a, b, &mut heap);
    let ba = compare_standard_order(b, a, &mut heap);
    if ab != ba.reverse() {
        log::warn!("order not antisymmetric: {a} vs {b}");
        report.order_violations += 1;
    }

    if a.is_callable() && a.signature() == b.signature() {
        check_instantiation(a, b, &mut heap, cp, report)?;
    }
    Ok(())
}

/// Uses `head` as a fact and `goal` as the goal calling it.
fn check_instantiation(
    head: &Term,
    goal: &Term,
    heap: &mut Heap,
    cp: Checkpoint,
    report: &mut StressReport,
) -> Result<(), CliError> {
    let rule = Rule::fact(head.clone())?;
    let copy = rule.head().copy(heap, &mut Memo::new());
    let separate = unify(&copy, goal, heap, true);
    heap.undo(cp)?;
    if separate == Err(UnifyError::OccursCheck) {
        report.cyclic += 1;
        return Ok(());
    }
    report.instantiated += 1;

    let fused = rule.clone_and_unify_head(heap, goal).is_ok();
    heap.undo(cp)?;
    if fused != separate.is_ok() {
        log::warn!("instantiation mismatch: {rule} against {goal}");
        report.instantiation_mismatches += 1;
    }
    if fused && !rule.may_unify(goal, heap) {
        log::warn!("pre-filter rejected matching goal: {rule} against {goal}");
        report.prefilter_rejections += 1;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn depth(term: &Term) -> usize {
        match term {
            Term::Compound(c) => 1 + c.args().iter().map(depth).max().unwrap_or(0),
            _ => 0,
        }
    }

    #[test]
    fn generator_respects_depth_and_vars() {
        let mut generator = TermGenerator::new(7, 3, 2);
        for _ in 0..200 {
            let t = generator.term();
            assert!(depth(&t) <= 3, "{t}");
            assert!(t.get_max_var().map_or(true, |v| v < 2), "{t}");
        }
    }

    #[test]
    fn generator_without_vars_is_ground() {
        let mut generator = TermGenerator::new(1, 4, 0);
        assert!((0..100).all(|_| generator.term().get_max_var().is_none()));
    }

    #[test]
    fn same_seed_same_terms() {
        let mut g1 = TermGenerator::new(42, 4, 3);
        let mut g2 = TermGenerator::new(42, 4, 3);
        for _ in 0..50 {
            assert_eq!(g1.term(), g2.term());
        }
    }

    #[test]
    fn report_counts_violations() {
        let report = StressReport {
            symmetry_violations: 1,
            order_violations: 2,
            ..StressReport::default()
        };
        assert_eq!(report.violations(), 3);
        assert!(report.to_string().contains("order violations:         2"));
    }
}
