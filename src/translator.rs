//! Declaration to proposition translation
//!
//! Turns an ordered list of declarations into an ordered list of propositions
//! over named sets and relations. Order is significant: it becomes solve order,
//! which fixes term-dictionary order and therefore SAT variable numbering.

pub mod environment;
pub mod schema;

pub use environment::Environment;
pub use schema::{relation_name, Schema, Type, TypedRef};

use crate::ast::{Declaration, Expression};
use crate::error::{RelmodelError, Result};
use crate::proposition::Proposition;
use crate::value::{Operator, Set, Value};

/// Prefix of variables synthesized for relational joins; not a valid source identifier
const JOIN_VARIABLE_PREFIX: &str = "%join";

/// Translator from declarations to propositions
pub struct Translator<'a> {
    declarations: &'a [Declaration],
    schema: Schema,
    imports: Vec<Vec<String>>,
    env: Environment,
    joins: usize,
}

impl<'a> Translator<'a> {
    /// Creates a translator, registering every declared record up front
    pub fn new(declarations: &'a [Declaration]) -> Self {
        Self {
            declarations,
            schema: Schema::from_declarations(declarations),
            imports: Vec::new(),
            env: Environment::empty(),
            joins: 0,
        }
    }

    /// Returns the record schemas
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Returns the qualified names imported so far, in order
    pub fn imports(&self) -> &[Vec<String>] {
        &self.imports
    }

    /// Translates all declarations to propositions
    pub fn propositions(&mut self) -> Result<Vec<Proposition>> {
        self.imports.clear();
        let mut propositions = Vec::new();
        for declaration in self.declarations {
            match declaration {
                Declaration::Import(name) => self.imports.push(name.clone()),
                Declaration::Record {
                    name, relations, ..
                } => {
                    propositions.push(Proposition::equal(
                        Value::named(name.clone()),
                        Value::SetRef(Set::Universe),
                    ));
                    for relation in relations {
                        propositions.push(Proposition::equal(
                            Value::named(relation_name(name, &relation.name)),
                            Value::SetRef(Set::product(
                                Set::named(name.clone()),
                                Set::named(relation.ty.clone()),
                            )),
                        ));
                    }
                }
                Declaration::Facts(expressions) => {
                    for expression in expressions {
                        propositions.push(self.evaluate_predicate(expression)?);
                    }
                }
                Declaration::Constraint(expression) => {
                    propositions.push(self.evaluate_predicate(expression)?);
                }
            }
        }
        log::debug!(
            "translated {} declarations into {} propositions",
            self.declarations.len(),
            propositions.len()
        );
        Ok(propositions)
    }

    /// Translates a predicate expression
    pub fn evaluate_predicate(&mut self, expression: &Expression) -> Result<Proposition> {
        match expression {
            Expression::Equal(left, right) => self.evaluate_equality(left, right, false),
            Expression::NotEqual(left, right) => self.evaluate_equality(left, right, true),
            Expression::Forall { vars, set, body } => {
                let body = self.evaluate_quantified(vars, set, body)?;
                Ok(Proposition::forall(vars.iter().cloned(), Set::named(set.clone()), body))
            }
            Expression::Exists { vars, set, body } => {
                let body = self.evaluate_quantified(vars, set, body)?;
                Ok(Proposition::exists(vars.iter().cloned(), Set::named(set.clone()), body))
            }
            Expression::Implies(left, right) => Ok(Proposition::or(
                self.evaluate_predicate(left)?.not(),
                self.evaluate_predicate(right)?,
            )),
            Expression::Grouping(inner) => self.evaluate_predicate(inner),
            Expression::And(left, right) => Ok(Proposition::and(
                self.evaluate_predicate(left)?,
                self.evaluate_predicate(right)?,
            )),
            Expression::Or(left, right) => Ok(Proposition::or(
                self.evaluate_predicate(left)?,
                self.evaluate_predicate(right)?,
            )),
            Expression::Set(_)
            | Expression::Tuple(_)
            | Expression::Member { .. }
            | Expression::Call { .. }
            | Expression::Str(_)
            | Expression::Number(_)
            | Expression::Symbol(_)
            | Expression::Variable(_) => {
                Err(RelmodelError::ExpectedPredicate(expression.to_string()))
            }
        }
    }

    /// Translates a value expression
    ///
    /// Variables are left unresolved; the evaluator binds them.
    pub fn evaluate_value(&self, expression: &Expression) -> Result<Value> {
        match expression {
            Expression::Set(items) => Ok(Value::SetRef(Set::Literal(self.evaluate_values(items)?))),
            Expression::Tuple(items) => Ok(Value::Tuple(self.evaluate_values(items)?)),
            Expression::Member { callee, name } => self.evaluate_member(callee, name),
            Expression::Call { callee, arguments } => {
                if let Some(ty) = self.schema.get(callee) {
                    if !ty.fields.is_empty() && ty.fields.len() != arguments.len() {
                        return Err(RelmodelError::TypeMismatch(format!(
                            "{} has {} fields, got {} arguments in {}",
                            callee,
                            ty.fields.len(),
                            arguments.len(),
                            expression
                        )));
                    }
                }
                Ok(Value::Tuple(self.evaluate_values(arguments)?))
            }
            Expression::Str(s) => Ok(Value::Str(s.clone())),
            Expression::Number(n) => Ok(Value::Number(*n)),
            Expression::Symbol(name) => Ok(Value::named(name.clone())),
            Expression::Variable(name) => Ok(Value::Variable(name.clone())),
            Expression::Grouping(inner) => self.evaluate_value(inner),
            Expression::Equal(..)
            | Expression::NotEqual(..)
            | Expression::Implies(..)
            | Expression::And(..)
            | Expression::Or(..)
            | Expression::Forall { .. }
            | Expression::Exists { .. } => Err(RelmodelError::ExpectedValue(expression.to_string())),
        }
    }

    fn evaluate_values(&self, items: &[Expression]) -> Result<Vec<Value>> {
        items.iter().map(|item| self.evaluate_value(item)).collect()
    }

    fn evaluate_quantified(
        &mut self,
        vars: &[String],
        set: &str,
        body: &Expression,
    ) -> Result<Proposition> {
        for var in vars {
            self.env.extend(var.as_str(), set);
        }
        let result = self.evaluate_predicate(body);
        for _ in vars {
            self.env.pop();
        }
        result
    }

    fn evaluate_equality(
        &mut self,
        left: &Expression,
        right: &Expression,
        negated: bool,
    ) -> Result<Proposition> {
        let left = self.evaluate_value(left)?;
        let right = self.evaluate_value(right)?;
        match (left, right) {
            (Value::SetRef(set), right) => match right {
                Value::SetRef(Set::Literal(_)) => Ok(Proposition::Binary(
                    Operator::equality(negated),
                    Value::SetRef(set),
                    right,
                )),
                other => Err(RelmodelError::ExpectedLiteral(other.to_string())),
            },
            (Value::Curried(left_set, left), Value::Curried(right_set, right)) => {
                self.evaluate_join(left_set, *left, right_set, *right, negated)
            }
            (Value::Curried(set, curried), other) | (other, Value::Curried(set, curried)) => {
                Ok(Proposition::Binary(
                    Operator::membership(negated),
                    Value::pair(*curried, other),
                    Value::SetRef(set),
                ))
            }
            (left, right) => Ok(Proposition::Binary(Operator::equality(negated), left, right)),
        }
    }

    /// `a.rel == b.rel` holds when some codomain element is related to both;
    /// `a.rel != b.rel` when every codomain element is related to exactly one.
    fn evaluate_join(
        &mut self,
        left_set: Set,
        left: Value,
        right_set: Set,
        right: Value,
        negated: bool,
    ) -> Result<Proposition> {
        if left_set != right_set {
            return Err(RelmodelError::CurryingMismatch {
                left: left_set.to_string(),
                right: right_set.to_string(),
            });
        }
        let codomain = left_set
            .name()
            .and_then(|relation| self.schema.relation_codomain(relation))
            .ok_or_else(|| RelmodelError::UnknownMember(left_set.to_string()))?
            .to_string();

        let common = format!("{}{}", JOIN_VARIABLE_PREFIX, self.joins);
        self.joins += 1;

        let related = |value: &Value, op: Operator| {
            Proposition::Binary(
                op,
                Value::pair(value.clone(), Value::variable(common.clone())),
                Value::SetRef(left_set.clone()),
            )
        };

        let proposition = if negated {
            Proposition::forall(
                [common.clone()],
                Set::named(codomain),
                Proposition::or(
                    Proposition::and(related(&left, Operator::In), related(&right, Operator::NotIn)),
                    Proposition::and(related(&left, Operator::NotIn), related(&right, Operator::In)),
                ),
            )
        } else {
            Proposition::exists(
                [common.clone()],
                Set::named(codomain),
                Proposition::and(related(&left, Operator::In), related(&right, Operator::In)),
            )
        };
        Ok(proposition)
    }

    fn evaluate_member(&self, callee: &Expression, name: &str) -> Result<Value> {
        let target = self.evaluate_value(callee)?;
        if let Value::Curried(relation, _) = &target {
            return Err(RelmodelError::TypeMismatch(format!(
                "cannot access {} on relation {}",
                name, relation
            )));
        }

        if let Some(ty) = self.static_type(callee).and_then(|t| self.schema.get(t)) {
            if let Some(relation) = ty.find_relation(name) {
                return Ok(Value::Curried(Set::Named(relation), Box::new(target)));
            }
            if let Some(index) = ty.find_field(name) {
                return Ok(Value::Member(Box::new(target), index));
            }
            return Err(RelmodelError::UnknownMember(format!("{}.{}", ty.name, name)));
        }

        if let Some(relation) = self.schema.find_relation_anywhere(name) {
            return Ok(Value::Curried(Set::Named(relation), Box::new(target)));
        }
        if let Some((_, index)) = self.schema.find_field_anywhere(name) {
            return Ok(Value::Member(Box::new(target), index));
        }
        Err(RelmodelError::UnknownMember(format!("{}.{}", callee, name)))
    }

    /// Record type of an expression, when it can be known before evaluation
    fn static_type(&self, expression: &Expression) -> Option<&str> {
        match expression {
            Expression::Variable(name) => self.env.lookup(name),
            Expression::Member { callee, name } => {
                let owner = self.schema.get(self.static_type(callee)?)?;
                owner
                    .fields
                    .iter()
                    .find(|f| &f.name == name)
                    .map(|f| f.ty.as_str())
            }
            Expression::Call { callee, .. } => self.schema.get(callee).map(|t| t.name.as_str()),
            Expression::Grouping(inner) => self.static_type(inner),
            _ => None,
        }
    }
}
