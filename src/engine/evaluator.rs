//! Partial evaluator and quantifier expander
//!
//! The evaluator works in one of two [`Mode`]s:
//!
//! - `Collect` grounds a proposition: quantifiers are expanded over their
//!   literal domains, equalities and literal memberships are decided, and
//!   membership in a derived relation is left as an atom for the SAT encoding.
//! - `Reify` replays solved atoms: membership in a derived relation is recorded
//!   in the relation's accumulator and counts as satisfied.
//!
//! Top-level set assignments (`Room = {..}`) are written to the global frame
//! and persist for the run. [`Evaluator::reify`] then turns the global frame
//! into a [`Model`].

use crate::error::{RelmodelError, Result};
use crate::instance::Model;
use crate::proposition::Proposition;
use crate::value::{Operator, Set, Value};

use super::accumulator::RelationAccumulators;
use super::scope::{Frame, GlobalFrame, Scope};

/// Evaluation mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Produce a ground formula over derived-relation atoms
    Collect,
    /// Project solved atoms onto the derived-relation accumulators
    Reify,
}

/// Evaluator for one run
///
/// Owns the scope and the derived-relation accumulators; neither is shared.
#[derive(Debug, Default)]
pub struct Evaluator {
    scope: Scope,
    accumulators: RelationAccumulators,
}

impl Evaluator {
    /// Creates an evaluator with an empty global frame
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an evaluator that checks propositions against a reified model
    ///
    /// The global frame is seeded from `model` and sealed, so set assignments
    /// are compared against the model instead of overwriting it.
    pub fn with_model(model: &Model) -> Self {
        let global = GlobalFrame::sealed(
            model
                .iter()
                .map(|(name, set)| (name.to_string(), Value::SetRef(set.clone()))),
        );
        Self {
            scope: Scope::with_global(global),
            accumulators: RelationAccumulators::new(),
        }
    }

    /// Returns the scope
    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// Returns the derived-relation accumulators
    pub fn accumulators(&self) -> &RelationAccumulators {
        &self.accumulators
    }

    /// Evaluates a proposition
    ///
    /// # Errors
    /// Resolution failures, non-literal quantifier domains, quantifiers over
    /// more than two variables, and failed checks against a sealed frame's
    /// bindings are all reported as errors.
    pub fn evaluate(&mut self, proposition: &Proposition, mode: Mode) -> Result<Proposition> {
        match proposition {
            Proposition::True | Proposition::False => Ok(proposition.clone()),
            Proposition::Not(inner) => self.evaluate(&inner.negate(), mode),
            Proposition::And(l, r) => {
                let l = self.evaluate(l, mode)?;
                let r = self.evaluate(r, mode)?;
                Ok(Proposition::and(l, r))
            }
            Proposition::Or(l, r) => {
                let l = self.evaluate(l, mode)?;
                let r = self.evaluate(r, mode)?;
                Ok(Proposition::or(l, r))
            }
            Proposition::Implies(l, r) => {
                let l = self.evaluate(&l.negate(), mode)?;
                let r = self.evaluate(r, mode)?;
                Ok(Proposition::or(l, r))
            }
            Proposition::Binary(op, l, r) => self.evaluate_binary(*op, l, r, mode),
            Proposition::Forall(vars, set, body) => self.expand(vars, set, body, mode, true),
            // Existential witnesses never populate relation accumulators
            Proposition::Exists(vars, set, body) => {
                self.expand(vars, set, body, Mode::Collect, false)
            }
        }
    }

    fn expand(
        &mut self,
        vars: &[String],
        set: &Set,
        body: &Proposition,
        mode: Mode,
        universal: bool,
    ) -> Result<Proposition> {
        if vars.is_empty() || vars.len() > 2 {
            return Err(RelmodelError::UnsupportedArity(vars.len()));
        }
        let domain = self.domain(set)?;

        let frames: Vec<Frame> = match vars {
            [var] => domain
                .iter()
                .map(|x| Frame::new(vec![(var.clone(), x.clone())]))
                .collect(),
            // Ordered pairs, self-pairs included
            [first, second] => domain
                .iter()
                .flat_map(|x| {
                    domain.iter().map(move |y| {
                        Frame::new(vec![(first.clone(), x.clone()), (second.clone(), y.clone())])
                    })
                })
                .collect(),
            _ => return Err(RelmodelError::UnsupportedArity(vars.len())),
        };

        let mut result = Proposition::from(universal);
        for frame in frames {
            self.scope.push(frame);
            let value = self.evaluate(body, mode);
            self.scope.pop();
            let value = value?;
            result = if universal {
                Proposition::and(result, value)
            } else {
                Proposition::or(result, value)
            };
        }
        Ok(result)
    }

    fn domain(&self, set: &Set) -> Result<Vec<Value>> {
        match self.scope.resolve_set(set)? {
            (_, Set::Literal(values)) => Ok(values.clone()),
            (_, resolved) => Err(RelmodelError::ExpectedLiteral(format!(
                "quantifier domain {} resolves to {}",
                set, resolved
            ))),
        }
    }

    fn evaluate_binary(
        &mut self,
        op: Operator,
        left: &Value,
        right: &Value,
        mode: Mode,
    ) -> Result<Proposition> {
        match (op, left) {
            (Operator::Equal, Value::SetRef(Set::Named(name))) => self.assign(name, right),
            (Operator::Different, Value::SetRef(Set::Named(name))) => {
                let named = Set::Named(name.clone());
                let bound = self.scope.literal_values(&named)?;
                let other = match right {
                    Value::SetRef(set) => self.scope.literal_values(set)?,
                    other => return Err(RelmodelError::ExpectedLiteral(other.to_string())),
                };
                Ok(Proposition::from(!same_elements(bound, other)))
            }
            (Operator::Equal | Operator::Different, _) => {
                let l = self.scope.resolve_value(left)?;
                let r = self.scope.resolve_value(right)?;
                Ok(Proposition::from((l == r) != op.is_negative()))
            }
            (Operator::In | Operator::NotIn, _) => self.evaluate_membership(op, left, right, mode),
        }
    }

    /// `Name = rhs` at top level: a write, or a check when the frame is sealed
    ///
    /// A literal already bound to `name` is never overwritten by another
    /// literal; a second literal with different elements evaluates to `False`.
    fn assign(&mut self, name: &str, right: &Value) -> Result<Proposition> {
        if !self.scope.global().is_sealed() {
            if let (Some(Value::SetRef(Set::Literal(bound))), Value::SetRef(Set::Literal(values))) =
                (self.scope.global().get(name), right)
            {
                let holds = same_elements(bound, values);
                if !holds {
                    log::warn!("{} is already {}, not {}", name, Set::Literal(bound.clone()), right);
                }
                return Ok(Proposition::from(holds));
            }
            log::trace!("{} = {}", name, right);
            self.scope
                .global_mut()
                .assign(name.to_string(), right.clone());
            return Ok(Proposition::True);
        }

        let named = Set::Named(name.to_string());
        let bound = self.scope.literal_values(&named)?;
        let holds = match right {
            Value::SetRef(Set::Universe) => true,
            Value::SetRef(Set::Literal(values)) => same_elements(bound, values),
            Value::SetRef(Set::Product(l, r)) => {
                let left = self.scope.literal_values(l)?;
                let right = self.scope.literal_values(r)?;
                bound.iter().all(|pair| match pair {
                    Value::Tuple(items) => match items.as_slice() {
                        [a, b] => left.contains(a) && right.contains(b),
                        _ => false,
                    },
                    _ => false,
                })
            }
            Value::SetRef(alias @ Set::Named(_)) => {
                same_elements(bound, self.scope.literal_values(alias)?)
            }
            other => {
                return Err(RelmodelError::ExpectedSet {
                    name: name.to_string(),
                    found: other.to_string(),
                })
            }
        };
        Ok(Proposition::from(holds))
    }

    /// Membership test; the only place a reify-mode evaluation mutates state
    fn evaluate_membership(
        &mut self,
        op: Operator,
        left: &Value,
        right: &Value,
        mode: Mode,
    ) -> Result<Proposition> {
        let Value::SetRef(set) = right else {
            return Err(RelmodelError::TypeMismatch(format!(
                "membership requires a set, found {}",
                right
            )));
        };
        let value = self.scope.resolve_value(left)?;
        let (name, resolved) = self.scope.resolve_set(set)?;

        match resolved {
            Set::Literal(values) => Ok(Proposition::from(
                values.contains(&value) != op.is_negative(),
            )),
            Set::Product(..) => {
                let relation = name
                    .ok_or_else(|| {
                        RelmodelError::TypeMismatch(format!("relation {} has no name", set))
                    })?
                    .to_string();
                match mode {
                    Mode::Reify => {
                        self.accumulators.record(&relation, op, value);
                        Ok(Proposition::True)
                    }
                    Mode::Collect => Ok(Proposition::Binary(
                        op,
                        value,
                        Value::SetRef(Set::Named(relation)),
                    )),
                }
            }
            Set::Universe | Set::Named(_) => {
                Err(RelmodelError::UnresolvableUniverse(set.to_string()))
            }
        }
    }

    /// Reconstructs every top-level set from the global frame
    ///
    /// Literal sets are copied through. A derived relation becomes the pairs
    /// of its operands' cross product, in left-major order, minus its excluded
    /// pairs; every remaining pair must have been included, and every included
    /// pair must belong to the cross product.
    ///
    /// # Errors
    /// [`RelmodelError::UnjustifiedRelation`] when the replayed model does not
    /// determine a relation, [`RelmodelError::UnresolvableUniverse`] when a
    /// record was never narrowed by a fact, and
    /// [`RelmodelError::ExpectedSet`] when a name is bound to a non-set value.
    pub fn reify(&self) -> Result<Model> {
        let mut model = Model::new();
        for (name, value) in self.scope.global().iter() {
            let Value::SetRef(set) = value else {
                return Err(RelmodelError::ExpectedSet {
                    name: name.to_string(),
                    found: value.to_string(),
                });
            };
            let reified = match set {
                Set::Product(l, r) => self.reify_relation(name, l, r)?,
                Set::Universe => {
                    return Err(RelmodelError::UnresolvableUniverse(name.to_string()))
                }
                Set::Literal(_) | Set::Named(_) => {
                    Set::Literal(self.scope.literal_values(set)?.to_vec())
                }
            };
            model.insert(name.to_string(), reified);
        }
        log::debug!("reified {} sets", model.len());
        Ok(model)
    }

    fn reify_relation(&self, name: &str, left: &Set, right: &Set) -> Result<Set> {
        let left = self.scope.literal_values(left)?;
        let right = self.scope.literal_values(right)?;
        let accumulator = self.accumulators.get(name);
        let unjustified = |pair: &Value| {
            log::warn!("could not justify {} in {}", pair, name);
            RelmodelError::UnjustifiedRelation {
                relation: name.to_string(),
                tuple: pair.to_string(),
            }
        };

        let mut pairs = Vec::new();
        for a in left {
            for b in right {
                let pair = Value::pair(a.clone(), b.clone());
                if accumulator.is_some_and(|acc| acc.excludes(&pair)) {
                    continue;
                }
                if !accumulator.is_some_and(|acc| acc.includes(&pair)) {
                    return Err(unjustified(&pair));
                }
                pairs.push(pair);
            }
        }

        if let Some(acc) = accumulator {
            if let Some(stray) = acc.including().find(|pair| !pairs.contains(pair)) {
                return Err(unjustified(stray));
            }
        }
        Ok(Set::Literal(pairs))
    }

    /// Checks propositions against the bound sets
    ///
    /// Each proposition is evaluated in collect mode and normalized; anything
    /// but `True` is a violation.
    ///
    /// # Errors
    /// [`RelmodelError::ModelViolation`] naming the first violated
    /// proposition, or any evaluation error.
    pub fn check(&mut self, propositions: &[Proposition]) -> Result<()> {
        for proposition in propositions {
            let result = self
                .evaluate(proposition, Mode::Collect)?
                .conjunctive_normal_form()?;
            if result != Proposition::True {
                log::warn!("model violates {}", proposition);
                return Err(RelmodelError::ModelViolation(proposition.to_string()));
            }
        }
        Ok(())
    }
}

/// Set equality of two literals, ignoring element order
fn same_elements(left: &[Value], right: &[Value]) -> bool {
    left.iter().all(|value| right.contains(value)) && right.iter().all(|value| left.contains(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn strings(values: &[&str]) -> Value {
        Value::SetRef(Set::literal(values.iter().map(|s| Value::str(*s))))
    }

    fn pair(a: &str, b: &str) -> Value {
        Value::pair(Value::str(a), Value::str(b))
    }

    fn room_teacher() -> Evaluator {
        let mut evaluator = Evaluator::new();
        for fact in [
            Proposition::equal(Value::named("Room"), Value::SetRef(Set::Universe)),
            Proposition::equal(
                Value::named("Room#teacher"),
                Value::SetRef(Set::product(Set::named("Room"), Set::named("Teacher"))),
            ),
            Proposition::equal(Value::named("Teacher"), Value::SetRef(Set::Universe)),
            Proposition::equal(Value::named("Room"), strings(&["A", "B"])),
            Proposition::equal(Value::named("Teacher"), strings(&["Gerber", "Damasio"])),
        ] {
            assert_eq!(evaluator.evaluate(&fact, Mode::Collect).unwrap(), Proposition::True);
        }
        evaluator
    }

    fn teaches(room: &str, teacher: &str) -> Proposition {
        Proposition::is_in(pair(room, teacher), Set::named("Room#teacher"))
    }

    #[test]
    fn forall_expands_over_each_element() {
        let mut evaluator = room_teacher();
        let p = Proposition::forall(
            ["r"],
            Set::named("Room"),
            Proposition::is_in(Value::pair(Value::variable("r"), Value::str("Gerber")), Set::named("Room#teacher")),
        );
        let ground = evaluator.evaluate(&p, Mode::Collect).unwrap();
        assert_eq!(
            ground,
            Proposition::and(
                Proposition::and(Proposition::True, teaches("A", "Gerber")),
                teaches("B", "Gerber"),
            )
        );
    }

    #[test]
    fn two_variable_quantifiers_cover_ordered_pairs_with_self_pairs() {
        let mut evaluator = room_teacher();
        evaluator
            .evaluate(
                &Proposition::equal(
                    Value::named("Room#next"),
                    Value::SetRef(Set::product(Set::named("Room"), Set::named("Room"))),
                ),
                Mode::Collect,
            )
            .unwrap();
        let next = |a: &str, b: &str| Proposition::is_in(pair(a, b), Set::named("Room#next"));
        let body = Proposition::is_in(
            Value::pair(Value::variable("x"), Value::variable("y")),
            Set::named("Room#next"),
        );

        let all = evaluator
            .evaluate(&Proposition::forall(["x", "y"], Set::named("Room"), body.clone()), Mode::Collect)
            .unwrap()
            .conjunctive_normal_form()
            .unwrap();
        assert_eq!(
            all.split_conjunctive_normal_form(),
            vec![next("A", "A"), next("A", "B"), next("B", "A"), next("B", "B")]
        );

        let any = evaluator
            .evaluate(&Proposition::exists(["x", "y"], Set::named("Room"), body), Mode::Collect)
            .unwrap()
            .conjunctive_normal_form()
            .unwrap();
        assert_eq!(any.split_conjunctive_normal_form().len(), 1);
        assert_eq!(any.terms().len(), 4);
    }

    #[test]
    fn literal_membership_and_equality_are_decided() {
        let mut evaluator = room_teacher();
        let inside = Proposition::is_in(Value::str("A"), Set::named("Room"));
        let outside = Proposition::not_in(Value::str("C"), Set::named("Room"));
        assert_eq!(evaluator.evaluate(&inside, Mode::Collect).unwrap(), Proposition::True);
        assert_eq!(evaluator.evaluate(&outside, Mode::Collect).unwrap(), Proposition::True);
        assert_eq!(
            evaluator.evaluate(&inside.clone().not(), Mode::Collect).unwrap(),
            Proposition::False
        );

        let same = Proposition::forall(
            ["r"],
            Set::named("Room"),
            Proposition::different(Value::variable("r"), Value::str("C")),
        );
        assert_eq!(
            evaluator
                .evaluate(&same, Mode::Collect)
                .unwrap()
                .conjunctive_normal_form()
                .unwrap(),
            Proposition::True
        );

        let changed = Proposition::different(Value::named("Room"), strings(&["A", "B"]));
        assert_eq!(evaluator.evaluate(&changed, Mode::Collect).unwrap(), Proposition::False);
    }

    #[test]
    fn conflicting_literal_facts_are_false() {
        let mut evaluator = room_teacher();
        let again = Proposition::equal(Value::named("Room"), strings(&["B", "A"]));
        assert_eq!(evaluator.evaluate(&again, Mode::Collect).unwrap(), Proposition::True);

        let conflict = Proposition::equal(Value::named("Room"), strings(&["C"]));
        assert_eq!(evaluator.evaluate(&conflict, Mode::Collect).unwrap(), Proposition::False);
        assert_eq!(
            evaluator.scope().lookup("Room"),
            Some(&strings(&["A", "B"]))
        );
    }

    #[test]
    fn exists_never_records_witnesses() {
        let mut evaluator = room_teacher();
        let p = Proposition::exists(
            ["r"],
            Set::named("Room"),
            Proposition::is_in(Value::pair(Value::variable("r"), Value::str("Gerber")), Set::named("Room#teacher")),
        );
        let result = evaluator.evaluate(&p, Mode::Reify).unwrap();
        assert_eq!(result.terms().len(), 2);
        assert!(evaluator.accumulators().is_empty());
    }

    #[test]
    fn reify_projects_replayed_atoms() {
        let mut evaluator = room_teacher();
        for (room, teacher, included) in [
            ("A", "Gerber", true),
            ("A", "Damasio", false),
            ("B", "Gerber", false),
            ("B", "Damasio", true),
        ] {
            let atom = teaches(room, teacher);
            let literal = if included { atom } else { atom.negate() };
            assert_eq!(evaluator.evaluate(&literal, Mode::Reify).unwrap(), Proposition::True);
        }

        let model = evaluator.reify().unwrap();
        assert_eq!(
            model.get("Room#teacher"),
            Some(&Set::Literal(vec![pair("A", "Gerber"), pair("B", "Damasio")]))
        );
        assert_eq!(model.get("Room"), Some(&Set::literal([Value::str("A"), Value::str("B")])));

        let mut checker = Evaluator::with_model(&model);
        checker
            .check(&[
                Proposition::equal(Value::named("Room"), Value::SetRef(Set::Universe)),
                Proposition::equal(
                    Value::named("Room#teacher"),
                    Value::SetRef(Set::product(Set::named("Room"), Set::named("Teacher"))),
                ),
                Proposition::forall(
                    ["r"],
                    Set::named("Room"),
                    Proposition::exists(
                        ["t"],
                        Set::named("Teacher"),
                        Proposition::is_in(
                            Value::pair(Value::variable("r"), Value::variable("t")),
                            Set::named("Room#teacher"),
                        ),
                    ),
                ),
            ])
            .unwrap();

        let violated = checker.check(&[teaches("A", "Damasio")]);
        assert!(matches!(violated, Err(RelmodelError::ModelViolation(_))));
        let rewritten = checker.check(&[Proposition::equal(Value::named("Room"), strings(&["A"]))]);
        assert!(matches!(rewritten, Err(RelmodelError::ModelViolation(_))));
    }

    #[test]
    fn reify_rejects_undetermined_pairs() {
        let mut evaluator = room_teacher();
        evaluator.evaluate(&teaches("A", "Gerber"), Mode::Reify).unwrap();
        let result = evaluator.reify();
        assert!(matches!(
            result,
            Err(RelmodelError::UnjustifiedRelation { ref relation, .. }) if relation == "Room#teacher"
        ));
    }

    #[test]
    fn reify_rejects_unnarrowed_universe() {
        let mut evaluator = Evaluator::new();
        evaluator
            .evaluate(
                &Proposition::equal(Value::named("Room"), Value::SetRef(Set::Universe)),
                Mode::Collect,
            )
            .unwrap();
        assert_eq!(
            evaluator.reify().unwrap_err(),
            RelmodelError::UnresolvableUniverse("Room".into())
        );
        let quantified = Proposition::forall(["r"], Set::named("Room"), Proposition::True);
        assert!(matches!(
            evaluator.evaluate(&quantified, Mode::Collect),
            Err(RelmodelError::UnresolvableUniverse(_))
        ));
    }

    #[test]
    fn quantifier_errors() {
        let mut evaluator = room_teacher();
        let three = Proposition::forall(["a", "b", "c"], Set::named("Room"), Proposition::True);
        assert_eq!(
            evaluator.evaluate(&three, Mode::Collect).unwrap_err(),
            RelmodelError::UnsupportedArity(3)
        );

        let over_relation =
            Proposition::forall(["p"], Set::named("Room#teacher"), Proposition::True);
        assert!(matches!(
            evaluator.evaluate(&over_relation, Mode::Collect),
            Err(RelmodelError::ExpectedLiteral(_))
        ));

        let unbound = Proposition::equal(Value::variable("nobody"), Value::str("x"));
        assert!(matches!(
            evaluator.evaluate(&unbound, Mode::Collect),
            Err(RelmodelError::UnresolvedVariable(_))
        ));
    }

    /// Every proposition variant has an evaluation rule
    #[test]
    fn every_variant_evaluates() {
        let mut evaluator = room_teacher();
        let atom = Proposition::is_in(Value::str("A"), Set::named("Room"));
        let variants = [
            Proposition::True,
            Proposition::False,
            atom.clone().not(),
            Proposition::and(atom.clone(), atom.clone()),
            Proposition::or(atom.clone(), atom.clone()),
            Proposition::implies(atom.clone(), atom.clone()),
            atom.clone(),
            Proposition::forall(["r"], Set::named("Room"), atom.clone()),
            Proposition::exists(["r"], Set::named("Room"), atom),
        ];
        for variant in &variants {
            let result = evaluator.evaluate(variant, Mode::Collect).unwrap();
            assert!(!result.has_quantifier(), "{} was not ground", variant);
        }
    }
}
