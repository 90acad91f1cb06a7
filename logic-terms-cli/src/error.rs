use logic_terms::TermError;
use thiserror::Error;

/// Errors surfaced by the `logic-terms` command-line tool.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Term(#[from] TermError),

    /// A stress run found terms for which an engine property does not hold.
    #[error("{count} property violation(s) in {pairs} term pairs")]
    PropertyViolated { count: usize, pairs: usize },
}
