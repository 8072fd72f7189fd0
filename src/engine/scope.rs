//! Binding scope of the evaluator
//!
//! Two constructs with different write rules:
//!
//! - quantifier [`Frame`]s, pushed and popped around one expansion step and
//!   never written after they are pushed;
//! - the [`GlobalFrame`], which receives every top-level set assignment and
//!   lives for the whole run.
//!
//! Lookups search the quantifier frames innermost first, then the global frame.

use rustc_hash::FxHashMap;

use crate::error::{RelmodelError, Result};
use crate::value::{Set, Value};

/// Bindings of the variables of one quantifier expansion step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    bindings: Vec<(String, Value)>,
}

impl Frame {
    /// Creates a frame from (variable, value) bindings
    pub fn new(bindings: Vec<(String, Value)>) -> Self {
        Self { bindings }
    }

    /// Looks up a variable bound by this frame
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.bindings
            .iter()
            .find(|(var, _)| var == name)
            .map(|(_, value)| value)
    }
}

/// Top-level name assignments, kept in first-assignment order
#[derive(Debug, Clone, Default)]
pub struct GlobalFrame {
    names: Vec<String>,
    values: FxHashMap<String, Value>,
    sealed: bool,
}

impl GlobalFrame {
    /// Creates an empty, writable global frame
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a sealed frame holding `bindings`
    ///
    /// A sealed frame is read-only: set assignments evaluated against it are
    /// checked, not performed.
    pub fn sealed(bindings: impl IntoIterator<Item = (String, Value)>) -> Self {
        let mut frame = Self::new();
        for (name, value) in bindings {
            frame.assign(name, value);
        }
        frame.sealed = true;
        frame
    }

    /// Returns true if assignments are checks
    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// Binds `name`, replacing an earlier value but keeping its position
    pub fn assign(&mut self, name: String, value: Value) -> Option<Value> {
        if !self.values.contains_key(&name) {
            self.names.push(name.clone());
        }
        self.values.insert(name, value)
    }

    /// Looks up a top-level name
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Iterates bindings in first-assignment order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.names
            .iter()
            .filter_map(|name| self.values.get(name).map(|value| (name.as_str(), value)))
    }

    /// Number of bound names
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Returns true if nothing is bound
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Chain of quantifier frames above one global frame
#[derive(Debug, Clone, Default)]
pub struct Scope {
    frames: Vec<Frame>,
    global: GlobalFrame,
}

impl Scope {
    /// Creates a scope with an empty global frame
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a scope over an existing global frame
    pub fn with_global(global: GlobalFrame) -> Self {
        Self {
            frames: Vec::new(),
            global,
        }
    }

    /// Enters one quantifier expansion step
    pub fn push(&mut self, frame: Frame) {
        self.frames.push(frame);
    }

    /// Leaves the innermost expansion step
    pub fn pop(&mut self) {
        self.frames.pop();
    }

    /// Number of live quantifier frames
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Returns the global frame
    pub fn global(&self) -> &GlobalFrame {
        &self.global
    }

    /// Returns the global frame for writing
    pub fn global_mut(&mut self) -> &mut GlobalFrame {
        &mut self.global
    }

    /// Looks up a name, innermost frame first
    pub fn lookup(&self, name: &str) -> Option<&Value> {
        self.frames
            .iter()
            .rev()
            .find_map(|frame| frame.get(name))
            .or_else(|| self.global.get(name))
    }

    /// Resolves a value to a concrete value
    ///
    /// Variables are replaced by their bindings and positional projections are
    /// applied. Atoms and set references are returned unchanged.
    pub fn resolve_value(&self, value: &Value) -> Result<Value> {
        match value {
            Value::Str(_) | Value::Number(_) | Value::SetRef(_) => Ok(value.clone()),
            Value::Tuple(items) => Ok(Value::Tuple(
                items
                    .iter()
                    .map(|item| self.resolve_value(item))
                    .collect::<Result<_>>()?,
            )),
            Value::Variable(name) => self
                .lookup(name)
                .cloned()
                .ok_or_else(|| RelmodelError::UnresolvedVariable(name.clone())),
            Value::Member(inner, index) => match self.resolve_value(inner)? {
                Value::Tuple(mut items) if *index < items.len() => Ok(items.swap_remove(*index)),
                other => Err(RelmodelError::TypeMismatch(format!(
                    "cannot project field {} of {}",
                    index, other
                ))),
            },
            Value::Curried(relation, _) => Err(RelmodelError::TypeMismatch(format!(
                "relation {} is missing its second argument in {}",
                relation, value
            ))),
        }
    }

    /// Chases `Named` references down to a concrete set
    ///
    /// Returns the resolved set together with the name it is bound to (the
    /// last name followed), which is the stable key of a derived relation.
    pub fn resolve_set<'a>(&'a self, set: &'a Set) -> Result<(Option<&'a str>, &'a Set)> {
        let mut name = None;
        let mut current = set;
        // Each name can be followed at most once without a cycle
        let mut budget = self.global.len() + self.frames.len() + 1;
        loop {
            match current {
                Set::Named(next) => {
                    if budget == 0 {
                        return Err(RelmodelError::UnresolvedSet(format!(
                            "{} (cyclic definition)",
                            next
                        )));
                    }
                    budget -= 1;
                    current = match self.lookup(next) {
                        Some(Value::SetRef(bound)) => bound,
                        Some(other) => {
                            return Err(RelmodelError::ExpectedSet {
                                name: next.clone(),
                                found: other.to_string(),
                            })
                        }
                        None => return Err(RelmodelError::UnresolvedSet(next.clone())),
                    };
                    name = Some(next.as_str());
                }
                Set::Universe => {
                    return Err(RelmodelError::UnresolvableUniverse(
                        name.unwrap_or("univ").to_string(),
                    ))
                }
                Set::Literal(_) | Set::Product(..) => return Ok((name, current)),
            }
        }
    }

    /// Resolves a set that must be a literal and returns its elements
    pub fn literal_values<'a>(&'a self, set: &'a Set) -> Result<&'a [Value]> {
        match self.resolve_set(set)? {
            (_, Set::Literal(values)) => Ok(values),
            (_, resolved) => Err(RelmodelError::ExpectedLiteral(format!(
                "{} resolves to {}",
                set, resolved
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Value {
        Value::SetRef(Set::literal(values.iter().map(|s| Value::str(*s))))
    }

    #[test]
    fn global_frame_keeps_first_assignment_order() {
        let mut global = GlobalFrame::new();
        global.assign("Room".into(), Value::SetRef(Set::Universe));
        global.assign("Teacher".into(), strings(&["Gerber"]));
        let previous = global.assign("Room".into(), strings(&["A"]));

        assert_eq!(previous, Some(Value::SetRef(Set::Universe)));
        let names: Vec<&str> = global.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["Room", "Teacher"]);
        assert_eq!(global.get("Room"), Some(&strings(&["A"])));
        assert!(!global.is_sealed());
    }

    #[test]
    fn frames_shadow_the_global_frame() {
        let mut global = GlobalFrame::new();
        global.assign("x".into(), Value::str("global"));
        let mut scope = Scope::with_global(global);

        scope.push(Frame::new(vec![("x".into(), Value::str("outer"))]));
        scope.push(Frame::new(vec![("y".into(), Value::str("inner"))]));
        assert_eq!(scope.lookup("x"), Some(&Value::str("outer")));
        assert_eq!(scope.lookup("y"), Some(&Value::str("inner")));
        assert_eq!(scope.depth(), 2);

        scope.pop();
        scope.pop();
        assert_eq!(scope.lookup("x"), Some(&Value::str("global")));
        assert_eq!(scope.lookup("y"), None);
    }

    #[test]
    fn resolve_value_substitutes_and_projects() {
        let mut scope = Scope::new();
        scope.push(Frame::new(vec![(
            "s".into(),
            Value::tuple([Value::str("Monday"), Value::tuple([Value::Number(8), Value::Number(30)])]),
        )]));

        let minute = Value::Member(Box::new(Value::Member(Box::new(Value::variable("s")), 1)), 1);
        assert_eq!(scope.resolve_value(&minute).unwrap(), Value::Number(30));

        let pair = Value::pair(Value::Member(Box::new(Value::variable("s")), 0), Value::str("x"));
        assert_eq!(
            scope.resolve_value(&pair).unwrap(),
            Value::pair(Value::str("Monday"), Value::str("x"))
        );

        assert!(matches!(
            scope.resolve_value(&Value::variable("missing")),
            Err(RelmodelError::UnresolvedVariable(_))
        ));
        assert!(matches!(
            scope.resolve_value(&Value::Member(Box::new(Value::variable("s")), 2)),
            Err(RelmodelError::TypeMismatch(_))
        ));
    }

    #[test]
    fn resolve_set_reports_the_bound_name() {
        let mut global = GlobalFrame::new();
        global.assign(
            "Room#teacher".into(),
            Value::SetRef(Set::product(Set::named("Room"), Set::named("Teacher"))),
        );
        global.assign("Alias".into(), Value::named("Room#teacher"));
        global.assign("Room".into(), Value::SetRef(Set::Universe));
        let scope = Scope::with_global(global);

        let alias = Set::named("Alias");
        let (name, set) = scope.resolve_set(&alias).unwrap();
        assert_eq!(name, Some("Room#teacher"));
        assert!(matches!(set, Set::Product(..)));

        let room = Set::named("Room");
        assert_eq!(
            scope.resolve_set(&room).unwrap_err(),
            RelmodelError::UnresolvableUniverse("Room".into())
        );
        assert!(matches!(
            scope.literal_values(&alias),
            Err(RelmodelError::ExpectedLiteral(_))
        ));
        assert!(matches!(
            scope.resolve_set(&Set::named("Nowhere")),
            Err(RelmodelError::UnresolvedSet(_))
        ));
    }

    #[test]
    fn resolve_set_detects_cycles() {
        let mut global = GlobalFrame::new();
        global.assign("A".into(), Value::named("B"));
        global.assign("B".into(), Value::named("A"));
        let scope = Scope::with_global(global);
        assert!(matches!(
            scope.resolve_set(&Set::named("A")),
            Err(RelmodelError::UnresolvedSet(_))
        ));
    }
}
