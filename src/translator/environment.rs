//! Environment for the static types of quantified variables
//!
//! `forall r in Room: ...` binds `r` to the record type `Room` for the duration
//! of the body, which lets the translator resolve `r.teacher` against the
//! `Room` schema rather than guessing among all records.

/// Stack-based environment of variable-to-type bindings
#[derive(Debug, Default)]
pub struct Environment {
    /// Stack of (variable, type name) bindings
    bindings: Vec<(String, String)>,
}

impl Environment {
    /// Creates an empty environment
    pub fn empty() -> Self {
        Self::default()
    }

    /// Pushes a new binding (for entering quantifier scope)
    pub fn extend(&mut self, var: impl Into<String>, ty: impl Into<String>) {
        self.bindings.push((var.into(), ty.into()));
    }

    /// Pops the most recent binding (for exiting quantifier scope)
    pub fn pop(&mut self) {
        self.bindings.pop();
    }

    /// Looks up the type of a variable (searches from top to bottom)
    pub fn lookup(&self, var: &str) -> Option<&str> {
        self.bindings
            .iter()
            .rev()
            .find(|(v, _)| v == var)
            .map(|(_, ty)| ty.as_str())
    }

    /// Returns the number of live bindings
    pub fn depth(&self) -> usize {
        self.bindings.len()
    }
}
