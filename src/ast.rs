//! Declarations and expressions consumed by the translator
//!
//! This is the boundary with the (external) scanner and parser: a
//! specification is an ordered list of [`Declaration`]s whose predicates and
//! values are [`Expression`] trees. The builder methods mirror the surface
//! syntax so that specifications can be written directly in Rust.

use std::fmt;

/// A top-level declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Declaration {
    /// `import peg.lang.String`: qualified name segments
    Import(Vec<String>),
    /// A record type with plain fields and derived relations
    Record {
        /// Record name
        name: String,
        /// Positional fields
        fields: Vec<RecordField>,
        /// Binary relations from this record to another type
        relations: Vec<RecordRelation>,
    },
    /// Facts asserted unconditionally
    Facts(Vec<Expression>),
    /// A predicate that must hold in the model
    Constraint(Expression),
}

impl Declaration {
    /// Creates an import of a dot-separated qualified name
    pub fn import(qualified: &str) -> Self {
        Declaration::Import(qualified.split('.').map(str::to_string).collect())
    }

    /// Creates a record declaration
    pub fn record(
        name: impl Into<String>,
        fields: Vec<RecordField>,
        relations: Vec<RecordRelation>,
    ) -> Self {
        Declaration::Record {
            name: name.into(),
            fields,
            relations,
        }
    }

    /// Creates a facts block
    pub fn facts(expressions: Vec<Expression>) -> Self {
        Declaration::Facts(expressions)
    }

    /// Creates a constraint
    pub fn constraint(expression: Expression) -> Self {
        Declaration::Constraint(expression)
    }
}

/// A positional record field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordField {
    /// Whether the field is part of the record identity
    pub is_identity: bool,
    /// Field name
    pub name: String,
    /// Declared type name
    pub ty: String,
}

impl RecordField {
    /// Creates a plain field
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            is_identity: false,
            name: name.into(),
            ty: ty.into(),
        }
    }

    /// Marks the field as part of the record identity
    pub fn identity(mut self) -> Self {
        self.is_identity = true;
        self
    }
}

/// A derived relation declared on a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordRelation {
    /// Whether the relation is declared one-to-one (not enforced by the solver)
    pub is_injective: bool,
    /// Relation name
    pub name: String,
    /// Codomain type name
    pub ty: String,
}

impl RecordRelation {
    /// Creates a relation
    pub fn new(name: impl Into<String>, ty: impl Into<String>) -> Self {
        Self {
            is_injective: false,
            name: name.into(),
            ty: ty.into(),
        }
    }

    /// Marks the relation as injective
    pub fn injective(mut self) -> Self {
        self.is_injective = true;
        self
    }
}

/// An expression: either a value or a predicate
#[expect(missing_docs)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expression {
    /// Set literal `{a, b}`
    Set(Vec<Expression>),
    /// Tuple `(a, b)`
    Tuple(Vec<Expression>),
    /// Member or relation access `callee.name`
    Member {
        callee: Box<Expression>,
        name: String,
    },
    /// Call-style literal construction `Slot("Monday", (8, 30))`
    Call {
        callee: String,
        arguments: Vec<Expression>,
    },
    /// String literal
    Str(String),
    /// Integer literal
    Number(i64),
    /// Capitalized name, referring to a set
    Symbol(String),
    /// Lower-case name, referring to a bound variable
    Variable(String),
    /// `left == right`
    Equal(Box<Expression>, Box<Expression>),
    /// `left != right`
    NotEqual(Box<Expression>, Box<Expression>),
    /// `left => right`
    Implies(Box<Expression>, Box<Expression>),
    /// `left and right`
    And(Box<Expression>, Box<Expression>),
    /// `left or right`
    Or(Box<Expression>, Box<Expression>),
    /// Parenthesized expression
    Grouping(Box<Expression>),
    /// `forall x, y in Set: body`
    Forall {
        vars: Vec<String>,
        set: String,
        body: Box<Expression>,
    },
    /// `exists x, y in Set: body`
    Exists {
        vars: Vec<String>,
        set: String,
        body: Box<Expression>,
    },
}

impl Expression {
    /// String literal
    pub fn string(s: impl Into<String>) -> Self {
        Expression::Str(s.into())
    }

    /// Integer literal
    pub fn number(n: i64) -> Self {
        Expression::Number(n)
    }

    /// Set name
    pub fn symbol(name: impl Into<String>) -> Self {
        Expression::Symbol(name.into())
    }

    /// Bound variable
    pub fn variable(name: impl Into<String>) -> Self {
        Expression::Variable(name.into())
    }

    /// Set literal
    pub fn set(items: Vec<Expression>) -> Self {
        Expression::Set(items)
    }

    /// Tuple
    pub fn tuple(items: Vec<Expression>) -> Self {
        Expression::Tuple(items)
    }

    /// Call-style literal construction
    pub fn call(callee: impl Into<String>, arguments: Vec<Expression>) -> Self {
        Expression::Call {
            callee: callee.into(),
            arguments,
        }
    }

    /// Member or relation access on this expression
    pub fn member(self, name: impl Into<String>) -> Self {
        Expression::Member {
            callee: Box::new(self),
            name: name.into(),
        }
    }

    /// `self == other`
    pub fn equals(self, other: Expression) -> Self {
        Expression::Equal(Box::new(self), Box::new(other))
    }

    /// `self != other`
    pub fn differs(self, other: Expression) -> Self {
        Expression::NotEqual(Box::new(self), Box::new(other))
    }

    /// `self => other`
    pub fn implies(self, other: Expression) -> Self {
        Expression::Implies(Box::new(self), Box::new(other))
    }

    /// `self and other`
    pub fn and(self, other: Expression) -> Self {
        Expression::And(Box::new(self), Box::new(other))
    }

    /// `self or other`
    pub fn or(self, other: Expression) -> Self {
        Expression::Or(Box::new(self), Box::new(other))
    }

    /// `(self)`
    pub fn group(self) -> Self {
        Expression::Grouping(Box::new(self))
    }

    /// `forall vars in set: body`
    pub fn forall<S: Into<String>>(
        vars: impl IntoIterator<Item = S>,
        set: impl Into<String>,
        body: Expression,
    ) -> Self {
        Expression::Forall {
            vars: vars.into_iter().map(Into::into).collect(),
            set: set.into(),
            body: Box::new(body),
        }
    }

    /// `exists vars in set: body`
    pub fn exists<S: Into<String>>(
        vars: impl IntoIterator<Item = S>,
        set: impl Into<String>,
        body: Expression,
    ) -> Self {
        Expression::Exists {
            vars: vars.into_iter().map(Into::into).collect(),
            set: set.into(),
            body: Box::new(body),
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Set(items) => write!(f, "{{{}}}", join(items)),
            Expression::Tuple(items) => write!(f, "({})", join(items)),
            Expression::Member { callee, name } => write!(f, "{}.{}", callee, name),
            Expression::Call { callee, arguments } => write!(f, "{}({})", callee, join(arguments)),
            Expression::Str(s) => write!(f, "{:?}", s),
            Expression::Number(n) => write!(f, "{}", n),
            Expression::Symbol(name) | Expression::Variable(name) => write!(f, "{}", name),
            Expression::Equal(l, r) => write!(f, "{} == {}", l, r),
            Expression::NotEqual(l, r) => write!(f, "{} != {}", l, r),
            Expression::Implies(l, r) => write!(f, "{} => {}", l, r),
            Expression::And(l, r) => write!(f, "{} and {}", l, r),
            Expression::Or(l, r) => write!(f, "{} or {}", l, r),
            Expression::Grouping(e) => write!(f, "({})", e),
            Expression::Forall { vars, set, body } => {
                write!(f, "forall {} in {}: {}", vars.join(", "), set, body)
            }
            Expression::Exists { vars, set, body } => {
                write!(f, "exists {} in {}: {}", vars.join(", "), set, body)
            }
        }
    }
}

fn join(items: &[Expression]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn import_splits_qualified_name() {
        assert_eq!(
            Declaration::import("peg.lang.String"),
            Declaration::Import(vec!["peg".into(), "lang".into(), "String".into()])
        );
    }

    #[test]
    fn builders_render_surface_syntax() {
        let e = Expression::forall(
            ["t"],
            "Teacher",
            Expression::exists(
                ["r"],
                "Room",
                Expression::variable("r").member("teacher").equals(Expression::variable("t")),
            ),
        );
        assert_eq!(e.to_string(), "forall t in Teacher: exists r in Room: r.teacher == t");

        let slot = Expression::call(
            "Slot",
            vec![
                Expression::string("Monday"),
                Expression::tuple(vec![Expression::number(8), Expression::number(30)]),
            ],
        );
        assert_eq!(slot.to_string(), "Slot(\"Monday\", (8, 30))");
    }

    #[test]
    fn record_member_flags() {
        let field = RecordField::new("name", "String").identity();
        assert!(field.is_identity);
        let relation = RecordRelation::new("teacher", "Teacher").injective();
        assert!(relation.is_injective);
        assert!(!RecordRelation::new("room", "Room").is_injective);
    }
}
