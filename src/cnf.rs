//! Propositions to CNF translation
//!
//! Normalizes ground propositions to conjunctive normal form by pushing
//! negations inward and distributing disjunction over conjunction, splits the
//! result into clauses, and encodes clauses as signed SAT literals through a
//! [`TermDictionary`].

use rustc_hash::FxHashMap;

use crate::error::{RelmodelError, Result};
use crate::proposition::Proposition;

/// CNF representation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CNF {
    /// Number of variables
    pub num_variables: u32,
    /// CNF clauses (each clause is a vec of literals, negative = negated)
    pub clauses: Vec<Vec<i32>>,
}

impl CNF {
    /// Creates a new empty CNF
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a clause to the CNF
    pub fn add_clause(&mut self, clause: Vec<i32>) {
        for &lit in &clause {
            let var = lit.unsigned_abs();
            if var > self.num_variables {
                self.num_variables = var;
            }
        }
        self.clauses.push(clause);
    }

    /// Number of clauses
    pub fn num_clauses(&self) -> usize {
        self.clauses.len()
    }

    /// Encodes clauses against a dictionary, skipping clauses that substitute
    /// to nothing (already proven `True`)
    ///
    /// The variable count is the dictionary size, so variables that only appear
    /// in dropped clauses still receive an assignment.
    pub fn encode(clauses: &[Proposition], dictionary: &TermDictionary) -> Result<Self> {
        let mut cnf = CNF::new();
        for clause in clauses {
            let literals = clause.substitute_terms(dictionary)?;
            if !literals.is_empty() {
                cnf.add_clause(literals);
            }
        }
        let num_terms = u32::try_from(dictionary.len()).map_err(|_| {
            RelmodelError::CapacityExceeded(format!("{} atoms", dictionary.len()))
        })?;
        cnf.num_variables = cnf.num_variables.max(num_terms);
        Ok(cnf)
    }
}

impl Proposition {
    /// Normalizes this proposition to conjunctive normal form
    ///
    /// Negations are pushed down to atoms, `True`/`False` are absorbed, and
    /// disjunctions are distributed over conjunctions until no `Or` has an `And`
    /// below it. The result is `True`, `False`, or an `And`-tree of `Or`-chains
    /// of atoms.
    ///
    /// # Errors
    /// Returns [`RelmodelError::UnexpandedQuantifier`] if a `Forall` or `Exists`
    /// is reached; quantifiers are only removed by the evaluator.
    pub fn conjunctive_normal_form(&self) -> Result<Proposition> {
        match self {
            Proposition::True | Proposition::False | Proposition::Binary(..) => Ok(self.clone()),
            Proposition::Not(inner) => inner.negate().conjunctive_normal_form(),
            Proposition::Implies(l, r) => {
                let l = l.negate().conjunctive_normal_form()?;
                let r = r.conjunctive_normal_form()?;
                Ok(disjoin(l, r))
            }
            Proposition::Or(l, r) => {
                let l = l.conjunctive_normal_form()?;
                let r = r.conjunctive_normal_form()?;
                Ok(disjoin(l, r))
            }
            Proposition::And(l, r) => {
                let l = l.conjunctive_normal_form()?;
                let r = r.conjunctive_normal_form()?;
                Ok(conjoin(l, r))
            }
            Proposition::Forall(..) | Proposition::Exists(..) => {
                Err(RelmodelError::UnexpandedQuantifier(self.to_string()))
            }
        }
    }

    /// Flattens a (possibly nested) `And`-tree into its ordered conjuncts
    pub fn split_conjunctive_normal_form(&self) -> Vec<Proposition> {
        let mut result = Vec::new();
        self.extract_conjuncts(&mut result);
        result
    }

    fn extract_conjuncts(&self, result: &mut Vec<Proposition>) {
        match self {
            Proposition::And(l, r) => {
                l.extract_conjuncts(result);
                r.extract_conjuncts(result);
            }
            other => result.push(other.clone()),
        }
    }

    /// Returns the atoms of this formula, left to right, duplicates preserved
    ///
    /// Atoms are reported in their positive form, so `x not in R` and `x in R`
    /// name the same SAT variable.
    pub fn terms(&self) -> Vec<Proposition> {
        let mut result = Vec::new();
        self.collect_terms(&mut result);
        result
    }

    fn collect_terms(&self, result: &mut Vec<Proposition>) {
        match self {
            Proposition::True | Proposition::False => {}
            Proposition::Binary(..) => result.push(self.positive()),
            Proposition::Not(inner) => inner.collect_terms(result),
            Proposition::And(l, r) | Proposition::Or(l, r) | Proposition::Implies(l, r) => {
                l.collect_terms(result);
                r.collect_terms(result);
            }
            Proposition::Forall(_, _, body) | Proposition::Exists(_, _, body) => {
                body.collect_terms(result)
            }
        }
    }

    /// Maps a clause to its signed, 1-based SAT literals
    ///
    /// A positively asserted atom yields `index + 1`; an atom negated by `Not`
    /// or by a negative operator yields `-(index + 1)`. Constants contribute
    /// nothing.
    ///
    /// # Errors
    /// Returns [`RelmodelError::MissingTerm`] if an atom is absent from the
    /// dictionary, and [`RelmodelError::MalformedClause`] if the clause is not a
    /// disjunction of literals.
    pub fn substitute_terms(&self, dictionary: &TermDictionary) -> Result<Vec<i32>> {
        let mut literals = Vec::new();
        self.substitute_into(dictionary, false, &mut literals)?;
        Ok(literals)
    }

    fn substitute_into(
        &self,
        dictionary: &TermDictionary,
        negated: bool,
        literals: &mut Vec<i32>,
    ) -> Result<()> {
        match self {
            Proposition::True | Proposition::False => Ok(()),
            Proposition::Binary(op, ..) => {
                let literal = dictionary.literal_of(self)?;
                let negative = op.is_negative() != negated;
                literals.push(if negative { -literal } else { literal });
                Ok(())
            }
            Proposition::Not(inner) if inner.is_atom() => {
                inner.substitute_into(dictionary, !negated, literals)
            }
            Proposition::Or(l, r) if !negated => {
                l.substitute_into(dictionary, false, literals)?;
                r.substitute_into(dictionary, false, literals)
            }
            Proposition::Forall(..) | Proposition::Exists(..) => {
                Err(RelmodelError::UnexpandedQuantifier(self.to_string()))
            }
            _ => Err(RelmodelError::MalformedClause(self.to_string())),
        }
    }
}

/// `l or r` for CNF operands, distributing over conjunctions
fn disjoin(l: Proposition, r: Proposition) -> Proposition {
    match (l, r) {
        (Proposition::True, _) | (_, Proposition::True) => Proposition::True,
        (Proposition::False, other) | (other, Proposition::False) => other,
        // (a and b) or c <=> (a or c) and (b or c)
        (Proposition::And(a, b), c) => conjoin(disjoin(*a, c.clone()), disjoin(*b, c)),
        // c or (a and b) <=> (c or a) and (c or b)
        (c, Proposition::And(a, b)) => conjoin(disjoin(c.clone(), *a), disjoin(c, *b)),
        (l, r) => Proposition::or(l, r),
    }
}

/// `l and r` for CNF operands
fn conjoin(l: Proposition, r: Proposition) -> Proposition {
    match (l, r) {
        (Proposition::False, _) | (_, Proposition::False) => Proposition::False,
        (Proposition::True, other) | (other, Proposition::True) => other,
        (l, r) => Proposition::and(l, r),
    }
}

/// Ordered, deduplicated atoms of one run, mapped to SAT variables
///
/// The atom at position `i` is SAT variable `i + 1`. Insertion order is first
/// occurrence, which fixes the variable numbering for the run.
#[derive(Debug, Clone, Default)]
pub struct TermDictionary {
    terms: Vec<Proposition>,
    indices: FxHashMap<Proposition, usize>,
}

impl TermDictionary {
    /// Creates an empty dictionary
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the dictionary of every atom referenced by the given clauses
    pub fn from_clauses<'a>(clauses: impl IntoIterator<Item = &'a Proposition>) -> Self {
        let mut dictionary = Self::new();
        for clause in clauses {
            for term in clause.terms() {
                dictionary.insert(term);
            }
        }
        dictionary
    }

    /// Adds an atom (in positive form) and returns its 0-based index
    pub fn insert(&mut self, term: Proposition) -> usize {
        let term = term.positive();
        if let Some(&index) = self.indices.get(&term) {
            return index;
        }
        let index = self.terms.len();
        self.indices.insert(term.clone(), index);
        self.terms.push(term);
        index
    }

    /// Returns the 0-based index of an atom, regardless of its polarity
    pub fn index_of(&self, term: &Proposition) -> Option<usize> {
        match term {
            Proposition::Binary(op, ..) if op.is_negative() => {
                self.indices.get(&term.positive()).copied()
            }
            _ => self.indices.get(term).copied(),
        }
    }

    /// Returns the positive 1-based SAT variable of an atom
    ///
    /// # Errors
    /// [`RelmodelError::MissingTerm`] for an unrecorded atom, and
    /// [`RelmodelError::CapacityExceeded`] when its index does not fit a
    /// signed literal.
    pub fn literal_of(&self, term: &Proposition) -> Result<i32> {
        let index = self
            .index_of(term)
            .ok_or_else(|| RelmodelError::MissingTerm(term.to_string()))?;
        index
            .checked_add(1)
            .and_then(|variable| i32::try_from(variable).ok())
            .ok_or_else(|| {
                RelmodelError::CapacityExceeded(format!("variable index {} of {}", index, term))
            })
    }

    /// Returns the atom behind a 1-based SAT variable
    pub fn term(&self, variable: u32) -> Option<&Proposition> {
        let index = (variable as usize).checked_sub(1)?;
        self.terms.get(index)
    }

    /// Number of distinct atoms
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Returns true if no atom was recorded
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Iterates the atoms in variable order
    pub fn iter(&self) -> impl Iterator<Item = &Proposition> {
        self.terms.iter()
    }
}
