//! Main solver API
//!
//! The solver translates declarations to propositions, grounds and encodes
//! them as SAT clauses, solves, and reifies the assignment into a [`Model`].

use std::time::{Duration, Instant};

use rustsat_batsat::BasicSolver;

use crate::ast::Declaration;
use crate::cnf::{TermDictionary, CNF};
use crate::engine::{Evaluator, Mode, RustSatAdapter, SATSolver};
use crate::error::{RelmodelError, Result};
use crate::instance::Model;
use crate::proposition::Proposition;
use crate::translator::Translator;

/// Solver options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
    /// Re-evaluate every proposition against the reified model before
    /// returning it
    pub verify_model: bool,
    /// Upper bound on encoded clauses (None = unbounded)
    pub max_clauses: Option<usize>,
    /// Upper bound on SAT variables (None = unbounded)
    pub max_variables: Option<u32>,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            verify_model: true,
            max_clauses: None,
            max_variables: None,
        }
    }
}

/// Model finder (uses batsat by default)
pub struct Solver {
    options: Options,
}

impl Solver {
    /// Creates a new solver with the given options (uses batsat backend)
    pub fn new(options: Options) -> Self {
        Self { options }
    }

    /// Returns the options
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Finds a model of the declarations using the batsat backend
    ///
    /// # Errors
    /// Any translation, evaluation, or reification error, and
    /// [`RelmodelError::Unsatisfiable`] when no model exists.
    pub fn solve(&self, declarations: &[Declaration]) -> Result<Solution> {
        let mut sat_solver = RustSatAdapter::new(BasicSolver::default());
        self.solve_with(&mut sat_solver, declarations)
    }

    /// Finds a model of the declarations with a custom SAT solver
    pub fn solve_with<S: SATSolver>(
        &self,
        sat_solver: &mut S,
        declarations: &[Declaration],
    ) -> Result<Solution> {
        let translation_start = Instant::now();
        let propositions = Translator::new(declarations).propositions()?;
        let translation_time = translation_start.elapsed();

        let mut solution = self.solve_propositions_with(sat_solver, &propositions)?;
        solution.stats.translation_time += translation_time;
        Ok(solution)
    }

    /// Finds a model of already translated propositions
    ///
    /// Propositions are evaluated in order; facts must precede the constraints
    /// that quantify over them.
    pub fn solve_propositions_with<S: SATSolver>(
        &self,
        sat_solver: &mut S,
        propositions: &[Proposition],
    ) -> Result<Solution> {
        // Step 1: Ground every proposition and split it into clauses
        let translation_start = Instant::now();
        let mut evaluator = Evaluator::new();
        let mut clauses = Vec::new();
        for proposition in propositions {
            let ground = evaluator.evaluate(proposition, Mode::Collect)?;
            log::trace!("{} => {}", proposition, ground);
            for clause in ground.conjunctive_normal_form()?.split_conjunctive_normal_form() {
                match clause {
                    Proposition::True => {}
                    Proposition::False => {
                        log::warn!("{} is false on the declared facts", proposition);
                        return Err(RelmodelError::Unsatisfiable);
                    }
                    clause => clauses.push(clause),
                }
            }
        }
        log::debug!(
            "grounded {} propositions into {} clauses",
            propositions.len(),
            clauses.len()
        );

        // Step 2: Number the atoms and encode the clauses
        let dictionary = TermDictionary::from_clauses(&clauses);
        if let Some(max) = self.options.max_variables {
            if u32::try_from(dictionary.len()).map_or(true, |len| len > max) {
                return Err(RelmodelError::CapacityExceeded(format!(
                    "{} variables exceed the limit of {}",
                    dictionary.len(),
                    max
                )));
            }
        }
        let cnf = CNF::encode(&clauses, &dictionary)?;
        if let Some(max) = self.options.max_clauses {
            if cnf.num_clauses() > max {
                return Err(RelmodelError::CapacityExceeded(format!(
                    "{} clauses exceed the limit of {}",
                    cnf.num_clauses(),
                    max
                )));
            }
        }
        let translation_time = translation_start.elapsed();
        log::debug!(
            "encoded {} clauses over {} variables",
            cnf.num_clauses(),
            cnf.num_variables
        );

        // Step 3: Run SAT solver
        let solving_start = Instant::now();
        sat_solver.add_variables(cnf.num_variables);
        for clause in &cnf.clauses {
            if !sat_solver.add_clause(clause) {
                log::error!("solver rejected clause {:?}", clause);
                return Err(RelmodelError::SolverFailure(format!(
                    "backend rejected clause {:?}",
                    clause
                )));
            }
        }
        let is_sat = sat_solver.solve()?;
        let solving_time = solving_start.elapsed();
        log::debug!("solver answered {}", if is_sat { "SAT" } else { "UNSAT" });
        if !is_sat {
            log::warn!("no model satisfies the constraints");
            return Err(RelmodelError::Unsatisfiable);
        }

        // Step 4: Replay each solved atom and reify
        for variable in 1..=cnf.num_variables {
            let term = dictionary
                .term(variable)
                .ok_or_else(|| RelmodelError::MissingTerm(format!("variable {}", variable)))?;
            let literal = if sat_solver.value_of(variable) {
                term.clone()
            } else {
                term.negate()
            };
            log::trace!("replay {}", literal);
            evaluator.evaluate(&literal, Mode::Reify)?;
        }
        let model = evaluator.reify()?;

        if self.options.verify_model {
            Evaluator::with_model(&model).check(propositions)?;
        }

        let stats = Statistics {
            translation_time,
            solving_time,
            num_propositions: propositions.len(),
            num_variables: cnf.num_variables,
            num_clauses: u32::try_from(cnf.num_clauses()).map_err(|_| {
                RelmodelError::CapacityExceeded(format!(
                    "{} clauses exceed the solver's clause counter",
                    cnf.num_clauses()
                ))
            })?,
        };
        Ok(Solution { model, stats })
    }
}

/// A found model with the statistics of the run
#[derive(Debug, Clone)]
pub struct Solution {
    model: Model,
    stats: Statistics,
}

impl Solution {
    /// Returns the model
    pub fn model(&self) -> &Model {
        &self.model
    }

    /// Consumes the solution, returning the model
    pub fn into_model(self) -> Model {
        self.model
    }

    /// Returns the statistics
    pub fn statistics(&self) -> &Statistics {
        &self.stats
    }
}

/// Statistics collected during solving
#[derive(Debug, Clone)]
pub struct Statistics {
    translation_time: Duration,
    solving_time: Duration,
    num_propositions: usize,
    num_variables: u32,
    num_clauses: u32,
}

impl Statistics {
    /// Returns translation time in milliseconds
    pub fn translation_time(&self) -> u64 {
        self.translation_time.as_millis() as u64
    }

    /// Returns solving time in milliseconds
    pub fn solving_time(&self) -> u64 {
        self.solving_time.as_millis() as u64
    }

    /// Returns total time in milliseconds
    pub fn total_time(&self) -> u64 {
        self.translation_time() + self.solving_time()
    }

    /// Returns number of translated propositions
    pub fn num_propositions(&self) -> usize {
        self.num_propositions
    }

    /// Returns number of variables
    pub fn num_variables(&self) -> u32 {
        self.num_variables
    }

    /// Returns number of clauses
    pub fn num_clauses(&self) -> u32 {
        self.num_clauses
    }
}
