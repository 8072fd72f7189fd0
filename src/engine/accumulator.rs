//! Derived relation accumulators
//!
//! During replay every solved membership atom over a derived relation lands
//! here as an included or excluded pair, keyed by the relation's qualified
//! name (`Room#teacher`). The value model itself stays immutable.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::value::{Operator, Value};

/// Pairs explicitly included in and excluded from one relation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Accumulator {
    including: FxHashSet<Value>,
    excluding: FxHashSet<Value>,
}

impl Accumulator {
    /// Records a pair as part of the relation
    pub fn include(&mut self, pair: Value) {
        self.including.insert(pair);
    }

    /// Records a pair as absent from the relation
    pub fn exclude(&mut self, pair: Value) {
        self.excluding.insert(pair);
    }

    /// Returns true if `pair` was included
    pub fn includes(&self, pair: &Value) -> bool {
        self.including.contains(pair)
    }

    /// Returns true if `pair` was excluded
    pub fn excludes(&self, pair: &Value) -> bool {
        self.excluding.contains(pair)
    }

    /// Iterates included pairs, in no particular order
    pub fn including(&self) -> impl Iterator<Item = &Value> {
        self.including.iter()
    }

    /// Iterates excluded pairs, in no particular order
    pub fn excluding(&self) -> impl Iterator<Item = &Value> {
        self.excluding.iter()
    }
}

/// Side table of accumulators, one per derived relation
#[derive(Debug, Clone, Default)]
pub struct RelationAccumulators {
    relations: FxHashMap<String, Accumulator>,
}

impl RelationAccumulators {
    /// Creates an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a solved membership fact `pair op relation`
    ///
    /// `In` includes the pair and `NotIn` excludes it; equality operators
    /// carry no membership information and are ignored.
    pub fn record(&mut self, relation: &str, op: Operator, pair: Value) {
        log::trace!("{} {} {}", pair, op, relation);
        let accumulator = self.relations.entry(relation.to_string()).or_default();
        match op {
            Operator::In => accumulator.include(pair),
            Operator::NotIn => accumulator.exclude(pair),
            Operator::Equal | Operator::Different => {}
        }
    }

    /// Returns the accumulator of a relation, if anything was recorded
    pub fn get(&self, relation: &str) -> Option<&Accumulator> {
        self.relations.get(relation)
    }

    /// Number of relations with recorded pairs
    pub fn len(&self) -> usize {
        self.relations.len()
    }

    /// Returns true if nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }
}
