//! Model: the result of a successful run
//!
//! Maps every top-level set name (records and derived relations alike) to a
//! reified literal set.

use std::collections::BTreeMap;
use std::fmt;

use crate::value::{Set, Value};

/// A found model
///
/// Names iterate in sorted order; each set keeps the element order it was
/// reified in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Model {
    sets: BTreeMap<String, Set>,
}

impl Model {
    /// Creates an empty model
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, name: String, set: Set) {
        self.sets.insert(name, set);
    }

    /// Returns the set bound to `name`
    pub fn get(&self, name: &str) -> Option<&Set> {
        self.sets.get(name)
    }

    /// Returns the elements of the set bound to `name`
    pub fn values(&self, name: &str) -> Option<&[Value]> {
        self.get(name).and_then(Set::values)
    }

    /// Returns true if `value` belongs to the set bound to `name`
    pub fn contains(&self, name: &str, value: &Value) -> bool {
        self.values(name)
            .is_some_and(|values| values.contains(value))
    }

    /// Iterates set names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.sets.keys().map(String::as_str)
    }

    /// Iterates (name, set) entries in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Set)> {
        self.sets.iter().map(|(name, set)| (name.as_str(), set))
    }

    /// Number of sets
    pub fn len(&self) -> usize {
        self.sets.len()
    }

    /// Returns true if the model has no sets
    pub fn is_empty(&self) -> bool {
        self.sets.is_empty()
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, set) in &self.sets {
            writeln!(f, "{} = {}", name, set)?;
        }
        Ok(())
    }
}
