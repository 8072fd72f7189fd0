//! Values, sets and relational operators
//!
//! These types form the data model shared by the translator, the evaluator and
//! the reified [`Model`](crate::instance::Model). They are plain immutable trees
//! with structural equality; the only mutable state of a run (the derived
//! relation accumulators) lives in the evaluator, keyed by relation name.

use std::fmt;

/// A value appearing in a proposition
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Value {
    /// A string atom
    Str(String),
    /// An integer atom
    Number(i64),
    /// An ordered tuple of values
    Tuple(Vec<Value>),
    /// A value that is a set, used on the left of fact equalities
    SetRef(Set),
    /// An unbound reference, resolved through the scope chain
    Variable(String),
    /// Positional projection of a tuple
    Member(Box<Value>, usize),
    /// A relation partially applied to one argument
    Curried(Set, Box<Value>),
}

impl Value {
    /// Creates a string value
    pub fn str(s: impl Into<String>) -> Self {
        Value::Str(s.into())
    }

    /// Creates a variable reference
    pub fn variable(name: impl Into<String>) -> Self {
        Value::Variable(name.into())
    }

    /// Creates a tuple value
    pub fn tuple(values: impl IntoIterator<Item = Value>) -> Self {
        Value::Tuple(values.into_iter().collect())
    }

    /// Creates a reference to the set bound to `name`
    pub fn named(name: impl Into<String>) -> Self {
        Value::SetRef(Set::named(name))
    }

    /// Creates a pair, the element type of binary relations
    pub fn pair(left: Value, right: Value) -> Self {
        Value::Tuple(vec![left, right])
    }

    /// Returns the set this value refers to, if it is a set reference
    pub fn as_set(&self) -> Option<&Set> {
        match self {
            Value::SetRef(set) => Some(set),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Str(s) => write!(f, "{:?}", s),
            Value::Number(n) => write!(f, "{}", n),
            Value::Tuple(values) => {
                write!(f, "(")?;
                write_separated(f, values)?;
                write!(f, ")")
            }
            Value::SetRef(set) => write!(f, "{}", set),
            Value::Variable(name) => write!(f, "{}", name),
            Value::Member(value, index) => write!(f, "{}.{}", value, index),
            Value::Curried(set, value) => write!(f, "{}.{}", value, set),
        }
    }
}

/// A set of values
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Set {
    /// A fully enumerated domain or relation
    Literal(Vec<Value>),
    /// Placeholder for a declared but not yet constrained set
    Universe,
    /// A reference resolved through scope
    Named(String),
    /// A derived relation declared as the cross product of two sets
    Product(Box<Set>, Box<Set>),
}

impl Set {
    /// Creates a named set reference
    pub fn named(name: impl Into<String>) -> Self {
        Set::Named(name.into())
    }

    /// Creates a literal set
    pub fn literal(values: impl IntoIterator<Item = Value>) -> Self {
        Set::Literal(values.into_iter().collect())
    }

    /// Creates the product of two sets
    pub fn product(left: Set, right: Set) -> Self {
        Set::Product(Box::new(left), Box::new(right))
    }

    /// Returns the enumerated values if this is a literal set
    pub fn values(&self) -> Option<&[Value]> {
        match self {
            Set::Literal(values) => Some(values),
            _ => None,
        }
    }

    /// Returns the name if this is a named reference
    pub fn name(&self) -> Option<&str> {
        match self {
            Set::Named(name) => Some(name),
            _ => None,
        }
    }

    /// Returns true if this is a literal set
    pub fn is_literal(&self) -> bool {
        matches!(self, Set::Literal(_))
    }
}

impl fmt::Display for Set {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Set::Literal(values) => {
                write!(f, "{{")?;
                write_separated(f, values)?;
                write!(f, "}}")
            }
            Set::Universe => write!(f, "univ"),
            Set::Named(name) => write!(f, "{}", name),
            Set::Product(left, right) => write!(f, "{} -> {}", left, right),
        }
    }
}

fn write_separated(f: &mut fmt::Formatter<'_>, values: &[Value]) -> fmt::Result {
    for (i, value) in values.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", value)?;
    }
    Ok(())
}

/// Relational operators of atomic propositions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// Structural equality (or set assignment when the left side names a set)
    Equal,
    /// Structural inequality
    Different,
    /// Membership
    In,
    /// Non-membership
    NotIn,
}

impl Operator {
    /// Returns the negated operator
    pub fn negate(self) -> Self {
        match self {
            Operator::Equal => Operator::Different,
            Operator::Different => Operator::Equal,
            Operator::In => Operator::NotIn,
            Operator::NotIn => Operator::In,
        }
    }

    /// Returns true for `Different` and `NotIn`
    pub fn is_negative(self) -> bool {
        matches!(self, Operator::Different | Operator::NotIn)
    }

    /// Returns the positive form of this operator (`Equal` or `In`)
    pub fn positive(self) -> Self {
        if self.is_negative() {
            self.negate()
        } else {
            self
        }
    }

    /// Returns the operator for an equality test, negated if `negated` is set
    pub fn equality(negated: bool) -> Self {
        if negated {
            Operator::Different
        } else {
            Operator::Equal
        }
    }

    /// Returns the operator for a membership test, negated if `negated` is set
    pub fn membership(negated: bool) -> Self {
        if negated {
            Operator::NotIn
        } else {
            Operator::In
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Operator::Equal => "==",
            Operator::Different => "!=",
            Operator::In => "in",
            Operator::NotIn => "not in",
        };
        write!(f, "{}", s)
    }
}
