//! Propositions over values and sets
//!
//! A closed set of logical-formula variants. Translation produces them from
//! declarations, the evaluator rewrites them into ground formulas, and the
//! [`cnf`](crate::cnf) module normalizes and encodes them for the SAT solver.

use std::fmt;

use crate::value::{Operator, Set, Value};

/// A logical formula
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Proposition {
    /// Constant truth
    True,
    /// Constant falsity
    False,
    /// Negation
    Not(Box<Proposition>),
    /// Conjunction
    And(Box<Proposition>, Box<Proposition>),
    /// Disjunction
    Or(Box<Proposition>, Box<Proposition>),
    /// Implication
    Implies(Box<Proposition>, Box<Proposition>),
    /// An atomic relational fact, e.g. `x in R` or `a == b`
    Binary(Operator, Value, Value),
    /// Universal quantification of one or two variables over a set
    Forall(Vec<String>, Set, Box<Proposition>),
    /// Existential quantification of one or two variables over a set
    Exists(Vec<String>, Set, Box<Proposition>),
}

impl Proposition {
    /// Constant truth
    pub const TRUE: Proposition = Proposition::True;
    /// Constant falsity
    pub const FALSE: Proposition = Proposition::False;

    /// Creates `left and right`
    pub fn and(left: Proposition, right: Proposition) -> Self {
        Proposition::And(Box::new(left), Box::new(right))
    }

    /// Creates `left or right`
    pub fn or(left: Proposition, right: Proposition) -> Self {
        Proposition::Or(Box::new(left), Box::new(right))
    }

    /// Creates `left => right`
    pub fn implies(left: Proposition, right: Proposition) -> Self {
        Proposition::Implies(Box::new(left), Box::new(right))
    }

    /// Wraps this proposition in a negation
    pub fn not(self) -> Self {
        Proposition::Not(Box::new(self))
    }

    /// Creates an atomic proposition
    pub fn binary(op: Operator, left: Value, right: Value) -> Self {
        Proposition::Binary(op, left, right)
    }

    /// Creates `value in set`
    pub fn is_in(value: Value, set: Set) -> Self {
        Proposition::Binary(Operator::In, value, Value::SetRef(set))
    }

    /// Creates `value not in set`
    pub fn not_in(value: Value, set: Set) -> Self {
        Proposition::Binary(Operator::NotIn, value, Value::SetRef(set))
    }

    /// Creates `left == right`
    pub fn equal(left: Value, right: Value) -> Self {
        Proposition::Binary(Operator::Equal, left, right)
    }

    /// Creates `left != right`
    pub fn different(left: Value, right: Value) -> Self {
        Proposition::Binary(Operator::Different, left, right)
    }

    /// Creates a universal quantification
    pub fn forall<S: Into<String>>(
        vars: impl IntoIterator<Item = S>,
        set: Set,
        body: Proposition,
    ) -> Self {
        Proposition::Forall(vars.into_iter().map(Into::into).collect(), set, Box::new(body))
    }

    /// Creates an existential quantification
    pub fn exists<S: Into<String>>(
        vars: impl IntoIterator<Item = S>,
        set: Set,
        body: Proposition,
    ) -> Self {
        Proposition::Exists(vars.into_iter().map(Into::into).collect(), set, Box::new(body))
    }

    /// Returns the boolean value if this is a constant
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Proposition::True => Some(true),
            Proposition::False => Some(false),
            _ => None,
        }
    }

    /// Returns true if this proposition is an atom (a binary relational fact)
    pub fn is_atom(&self) -> bool {
        matches!(self, Proposition::Binary(..))
    }

    /// Returns true if this is a literal: an atom or a negated atom
    pub fn is_literal(&self) -> bool {
        match self {
            Proposition::Binary(..) => true,
            Proposition::Not(inner) => inner.is_atom(),
            _ => false,
        }
    }

    /// Returns true if a quantifier occurs anywhere in this proposition
    pub fn has_quantifier(&self) -> bool {
        match self {
            Proposition::Forall(..) | Proposition::Exists(..) => true,
            Proposition::Not(p) => p.has_quantifier(),
            Proposition::And(l, r) | Proposition::Or(l, r) | Proposition::Implies(l, r) => {
                l.has_quantifier() || r.has_quantifier()
            }
            Proposition::True | Proposition::False | Proposition::Binary(..) => false,
        }
    }

    /// Pushes one level of negation into this proposition
    ///
    /// The result is equivalent to `not self`, but is never itself a `Not`
    /// unless `self` was a doubly negated proposition.
    pub fn negate(&self) -> Proposition {
        match self {
            Proposition::True => Proposition::False,
            Proposition::False => Proposition::True,
            Proposition::Not(inner) => (**inner).clone(),
            Proposition::And(l, r) => Proposition::or(l.clone().not(), r.clone().not()),
            Proposition::Or(l, r) => Proposition::and(l.clone().not(), r.clone().not()),
            Proposition::Implies(l, r) => Proposition::and((**l).clone(), r.clone().not()),
            Proposition::Binary(op, l, r) => Proposition::Binary(op.negate(), l.clone(), r.clone()),
            Proposition::Forall(vars, set, body) => {
                Proposition::Exists(vars.clone(), set.clone(), Box::new(body.clone().not()))
            }
            Proposition::Exists(vars, set, body) => {
                Proposition::Forall(vars.clone(), set.clone(), Box::new(body.clone().not()))
            }
        }
    }

    /// Returns the positive form of an atom: `Different` becomes `Equal` and
    /// `NotIn` becomes `In`. Other propositions are returned unchanged.
    pub fn positive(&self) -> Proposition {
        match self {
            Proposition::Binary(op, l, r) => Proposition::Binary(op.positive(), l.clone(), r.clone()),
            other => other.clone(),
        }
    }
}

impl From<bool> for Proposition {
    fn from(b: bool) -> Self {
        if b {
            Proposition::True
        } else {
            Proposition::False
        }
    }
}

impl fmt::Display for Proposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Proposition::True => write!(f, "true"),
            Proposition::False => write!(f, "false"),
            Proposition::Not(p) => write!(f, "not ({})", p),
            Proposition::And(l, r) => write!(f, "({} and {})", l, r),
            Proposition::Or(l, r) => write!(f, "({} or {})", l, r),
            Proposition::Implies(l, r) => write!(f, "({} => {})", l, r),
            Proposition::Binary(op, l, r) => write!(f, "{} {} {}", l, op, r),
            Proposition::Forall(vars, set, body) => {
                write!(f, "forall {} in {}: {}", vars.join(", "), set, body)
            }
            Proposition::Exists(vars, set, body) => {
                write!(f, "exists {} in {}: {}", vars.join(", "), set, body)
            }
        }
    }
}
