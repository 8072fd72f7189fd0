//! Adapters for rustsat solver backends
//!
//! Provides adapters to use rustsat-compatible SAT solvers as the backend of
//! a run.

use super::SATSolver;
use crate::error::{RelmodelError, Result};

/// Adapter that wraps rustsat solvers to implement our SATSolver trait
///
/// # Example
///
/// ```
/// use relmodel::engine::{RustSatAdapter, SATSolver};
/// use rustsat_batsat::BasicSolver;
///
/// let mut solver = RustSatAdapter::new(BasicSolver::default());
/// solver.add_variables(1);
/// solver.add_clause(&[1]);
/// assert!(solver.solve().unwrap());
/// assert!(solver.value_of(1));
/// ```
pub struct RustSatAdapter<S> {
    solver: S,
    num_vars: u32,
    num_clauses: u32,
}

impl<S> RustSatAdapter<S> {
    /// Creates a new adapter wrapping the given solver
    pub fn new(solver: S) -> Self {
        Self {
            solver,
            num_vars: 0,
            num_clauses: 0,
        }
    }
}

impl<S: rustsat::solvers::Solve> SATSolver for RustSatAdapter<S> {
    fn add_variables(&mut self, num_vars: u32) {
        // RustSat creates variables as clauses mention them
        self.num_vars += num_vars;
    }

    fn add_clause(&mut self, lits: &[i32]) -> bool {
        use rustsat::types::{Clause, Lit, Var};

        let mut lits_vec: Vec<Lit> = Vec::with_capacity(lits.len());
        for &lit in lits {
            let var_idx = match lit.unsigned_abs().checked_sub(1) {
                Some(idx) if idx <= Var::MAX_IDX => idx,
                _ => {
                    log::error!(
                        "literal {} is outside the variable range (max index {})",
                        lit,
                        Var::MAX_IDX
                    );
                    return false;
                }
            };
            let var = Var::new(var_idx);
            lits_vec.push(if lit > 0 { var.pos_lit() } else { var.neg_lit() });
        }

        let clause = Clause::from(&lits_vec[..]);
        self.num_clauses += 1;
        self.solver.add_clause(clause).is_ok()
    }

    fn solve(&mut self) -> Result<bool> {
        use rustsat::solvers::SolverResult;
        match self.solver.solve() {
            Ok(SolverResult::Sat) => Ok(true),
            Ok(SolverResult::Unsat) => Ok(false),
            Ok(SolverResult::Interrupted) => Err(RelmodelError::Aborted),
            Err(e) => Err(RelmodelError::SolverFailure(e.to_string())),
        }
    }

    fn value_of(&self, var: u32) -> bool {
        use rustsat::types::{TernaryVal, Var};
        if var == 0 || var > self.num_vars {
            return false;
        }
        let v = Var::new(var - 1);
        match self.solver.solution(v) {
            Ok(assignment) => matches!(assignment.var_value(v), TernaryVal::True),
            Err(_) => false,
        }
    }

    fn num_variables(&self) -> u32 {
        self.num_vars
    }

    fn num_clauses(&self) -> u32 {
        self.num_clauses
    }
}
