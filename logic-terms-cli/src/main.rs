//! Command-line interface (CLI) for the logic-terms unification engine.
//!
//! `sizes` prints the in-memory size of the term types.  `stress` runs
//! [`run_stress`] over randomly generated terms and exits with an error
//! when any engine property is violated.
//!
//! [`run_stress`]: logic_terms_cli::run_stress

use clap::{Parser as ClapParser, Subcommand};
use logic_terms::{Atom, Compound, Term, Var};
use logic_terms_cli::{run_stress, CliError, StressConfig};
use std::mem;

#[derive(ClapParser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Command
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Prints sizes
    Sizes {},
    /// Checks engine properties on random term pairs
    Stress {
        /// Random seed
        #[arg(short, long, default_value_t = 0)]
        seed: u64,
        /// Number of term pairs
        #[arg(short, long, default_value_t = 1000)]
        pairs: usize,
        /// Maximum term depth
        #[arg(short, long, default_value_t = 4)]
        depth: usize,
        /// Number of distinct variables
        #[arg(short, long, default_value_t = 4)]
        vars: usize,
        /// Unify with occurs check
        #[arg(long)]
        occurs_check: bool,
    },
}

fn main() -> Result<(), CliError> {
    env_logger::init();

    let args = Args::parse();

    match args.command {
        Commands::Sizes {} => {
            println!("Size of Term: {}", mem::size_of::<Term>());
            println!("Size of Option<Term>: {}", mem::size_of::<Option<Term>>());
            println!("Size of Var: {}", mem::size_of::<Var>());
            println!("Size of Atom: {}", mem::size_of::<Atom>());
            println!("Size of Compound: {}", mem::size_of::<Compound>());
        }
        Commands::Stress {
            seed,
            pairs,
            depth,
            vars,
            occurs_check,
        } => {
            let config = StressConfig {
                seed,
                pairs,
                depth,
                vars,
                occurs_check,
            };
            let report = run_stress(&config)?;
            println!("{report}");
            let count = report.violations();
            if count > 0 {
                return Err(CliError::PropertyViolated {
                    count,
                    pairs: report.pairs,
                });
            }
        }
    }

    Ok(())
}
