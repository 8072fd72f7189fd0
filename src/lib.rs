//! # relmodel
//!
//! A bounded finite-model finder for declarative record/relation specifications.
//!
//! Users declare record types, derived relations, literal facts and boolean
//! constraints over finite sets. The crate translates those declarations to
//! propositions, expands bounded quantifiers into ground formulas, normalizes
//! them to conjunctive normal form, solves the clauses with a SAT solver and
//! reifies the satisfying assignment back into named sets and relations.
//!
//! ## Example
//!
//! ```
//! use relmodel::ast::{Declaration, Expression, RecordRelation};
//! use relmodel::solver::{Options, Solver};
//!
//! let declarations = vec![
//!     Declaration::record("Room", vec![], vec![RecordRelation::new("teacher", "Teacher")]),
//!     Declaration::record("Teacher", vec![], vec![]),
//!     Declaration::facts(vec![
//!         Expression::symbol("Room").equals(Expression::set(vec![
//!             Expression::string("Room A"),
//!             Expression::string("Room B"),
//!         ])),
//!         Expression::symbol("Teacher").equals(Expression::set(vec![
//!             Expression::string("Gerber"),
//!             Expression::string("Damasio"),
//!         ])),
//!     ]),
//!     Declaration::constraint(Expression::forall(["t"], "Teacher",
//!         Expression::exists(["r"], "Room",
//!             Expression::variable("r").member("teacher").equals(Expression::variable("t"))))),
//! ];
//!
//! let solution = Solver::new(Options::default()).solve(&declarations)?;
//! println!("{}", solution.model());
//! assert_eq!(solution.model().names().count(), 3);
//! # Ok::<(), relmodel::RelmodelError>(())
//! ```

#![warn(missing_docs)]
#![warn(rust_2024_compatibility)]

/// Input declarations and expressions
pub mod ast;

/// Values, sets and relational operators
pub mod value;

/// Logical propositions over values and sets
pub mod proposition;

/// Conjunctive normal form and SAT term encoding
pub mod cnf;

/// Declaration to proposition translation
pub mod translator;

/// SAT solver boundary, scopes and the partial evaluator
pub mod engine;

/// Reified models
pub mod instance;

/// Main solver API
pub mod solver;

/// Error types
pub mod error {
    //! Error types for relmodel
    //!
    //! Every failure is terminal for the run that raised it.

    use thiserror::Error;

    /// Errors that can occur while translating, solving or reifying a specification
    #[derive(Error, Debug, Clone, PartialEq, Eq)]
    pub enum RelmodelError {
        /// A bound variable is not in scope
        #[error("cannot resolve variable: {0}")]
        UnresolvedVariable(String),

        /// A set name is not bound in any frame
        #[error("cannot resolve set: {0}")]
        UnresolvedSet(String),

        /// Member access names neither a relation nor a field
        #[error("unknown relation or field: {0}")]
        UnknownMember(String),

        /// The universe placeholder was reached while resolving a set
        #[error("cannot resolve the universe bound to {0}; it was never narrowed by a fact")]
        UnresolvableUniverse(String),

        /// A literal set was required
        #[error("expected a literal set with values, got: {0}")]
        ExpectedLiteral(String),

        /// An expression was used where a predicate was required
        #[error("expected a predicate, got: {0}")]
        ExpectedPredicate(String),

        /// An expression was used where a value was required
        #[error("expected a value, got: {0}")]
        ExpectedValue(String),

        /// Two curried values over different relations were compared
        #[error("cannot join {left} with {right}: they curry different relations")]
        CurryingMismatch {
            /// Left-hand relation
            left: String,
            /// Right-hand relation
            right: String,
        },

        /// A value does not have the shape an operation requires
        #[error("type mismatch: {0}")]
        TypeMismatch(String),

        /// Quantifier with an unsupported number of bound variables
        #[error("unsupported quantifier arity: {0} (expected 1 or 2 variables)")]
        UnsupportedArity(usize),

        /// CNF or clause encoding was attempted on an unexpanded quantifier
        #[error("quantifier must be expanded before normalization: {0}")]
        UnexpandedQuantifier(String),

        /// A clause contains something other than a disjunction of literals
        #[error("malformed clause: {0}")]
        MalformedClause(String),

        /// An atom is absent from the term dictionary
        #[error("term not present in dictionary: {0}")]
        MissingTerm(String),

        /// A configured capacity was exceeded
        #[error("capacity exceeded: {0}")]
        CapacityExceeded(String),

        /// The constraints admit no model
        #[error("the model is not satisfiable")]
        Unsatisfiable,

        /// The SAT backend failed internally
        #[error("SAT solver failure: {0}")]
        SolverFailure(String),

        /// Solving was interrupted before an answer was found
        #[error("solving aborted")]
        Aborted,

        /// A derived relation cannot be reconstructed from the assignment
        #[error("could not justify derived relation {relation} from model at tuple {tuple}")]
        UnjustifiedRelation {
            /// Qualified relation name
            relation: String,
            /// Offending tuple
            tuple: String,
        },

        /// A top-level binding is not a set
        #[error("expected a set bound to {name}, got: {found}")]
        ExpectedSet {
            /// Bound name
            name: String,
            /// Display form of the bound value
            found: String,
        },

        /// A proposition does not hold in the reified model
        #[error("model violates proposition: {0}")]
        ModelViolation(String),
    }

    /// Result type for relmodel operations
    pub type Result<T> = std::result::Result<T, RelmodelError>;
}

// Re-export commonly used types
pub use error::{RelmodelError, Result};
pub use instance::Model;
pub use proposition::Proposition;
pub use solver::{Options, Solution, Solver};
pub use value::{Operator, Set, Value};
