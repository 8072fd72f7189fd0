//! SAT solver boundary and the quantifier-expanding evaluator

pub mod accumulator;
pub mod evaluator;
pub mod rustsat_adapter;
pub mod scope;

pub use evaluator::{Evaluator, Mode};
pub use rustsat_adapter::RustSatAdapter;

use crate::error::Result;

/// Core SAT solver trait
///
/// This trait defines the interface that all SAT solver backends must implement.
/// Variables are 1-indexed, and literals are represented as signed integers
/// (positive for true, negative for false).
pub trait SATSolver {
    /// Adds the given number of variables to the solver
    fn add_variables(&mut self, num_vars: u32);

    /// Adds a clause to the solver
    ///
    /// Returns false if the backend could not take the clause (a literal out of
    /// its variable range, or an internal failure).
    fn add_clause(&mut self, lits: &[i32]) -> bool;

    /// Solves the current formula
    ///
    /// Returns `Ok(true)` if satisfiable and `Ok(false)` if unsatisfiable.
    ///
    /// # Errors
    /// An interrupted search or an internal backend failure.
    fn solve(&mut self) -> Result<bool>;

    /// Returns the assignment of a variable in the solution
    ///
    /// Only valid after solve() returns true.
    /// Variables are 1-indexed.
    fn value_of(&self, var: u32) -> bool;

    /// Returns the number of variables in the solver
    fn num_variables(&self) -> u32;

    /// Returns the number of clauses added
    fn num_clauses(&self) -> u32;
}

/// A mock SAT solver for testing
///
/// Records clauses without solving them and answers with a fixed
/// assignment, so the replay and reification stages can be driven with
/// arbitrary (even inconsistent) models.
#[derive(Debug, Clone)]
pub struct MockSolver {
    num_vars: u32,
    clauses: Vec<Vec<i32>>,
    assignment: Vec<bool>,
    satisfiable: bool,
    accepts_clauses: bool,
}

impl MockSolver {
    /// Creates a mock solver that reports every variable false
    pub fn new() -> Self {
        Self {
            num_vars: 0,
            clauses: Vec::new(),
            assignment: Vec::new(),
            satisfiable: true,
            accepts_clauses: true,
        }
    }

    /// Creates a mock solver answering with `assignment[v - 1]` for variable `v`
    pub fn with_assignment(assignment: Vec<bool>) -> Self {
        Self {
            assignment,
            ..Self::new()
        }
    }

    /// Creates a mock solver that reports unsatisfiable
    pub fn unsatisfiable() -> Self {
        Self {
            satisfiable: false,
            ..Self::new()
        }
    }

    /// Creates a mock solver whose backend refuses every clause
    pub fn rejecting_clauses() -> Self {
        Self {
            accepts_clauses: false,
            ..Self::new()
        }
    }

    /// Returns the clauses added so far
    pub fn clauses(&self) -> &[Vec<i32>] {
        &self.clauses
    }
}

impl Default for MockSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl SATSolver for MockSolver {
    fn add_variables(&mut self, num_vars: u32) {
        self.num_vars += num_vars;
    }

    fn add_clause(&mut self, lits: &[i32]) -> bool {
        if !self.accepts_clauses {
            return false;
        }
        self.clauses.push(lits.to_vec());
        true
    }

    fn solve(&mut self) -> Result<bool> {
        Ok(self.satisfiable)
    }

    fn value_of(&self, var: u32) -> bool {
        if var == 0 || var > self.num_vars {
            return false;
        }
        self.assignment
            .get((var - 1) as usize)
            .copied()
            .unwrap_or(false)
    }

    fn num_variables(&self) -> u32 {
        self.num_vars
    }

    fn num_clauses(&self) -> u32 {
        u32::try_from(self.clauses.len()).unwrap_or(u32::MAX)
    }
}
