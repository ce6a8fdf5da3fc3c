//! Sparse partial assignments.
use std::collections::BTreeMap;
use std::fmt;
use std::iter::FromIterator;

use crate::var::{Fact, Var};

/// A sparse mapping from variables to required values.
///
/// Used for goals and for operator pre- and postconditions. A variable absent from the
/// mapping is unconstrained, which is a real absence and not a sentinel value. Iteration
/// is in ascending variable order, keeping determinization and supporter selection
/// deterministic.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct PartialAssignment {
    entries: BTreeMap<Var, usize>,
}

impl PartialAssignment {
    /// Creates an empty partial assignment.
    pub fn new() -> PartialAssignment {
        PartialAssignment::default()
    }

    /// Requires `var` to hold `value`, returning the previously required value if any.
    pub fn assign(&mut self, var: Var, value: usize) -> Option<usize> {
        self.entries.insert(var, value)
    }

    /// The value required for `var`, if the assignment constrains it.
    pub fn value_of(&self, var: Var) -> Option<usize> {
        self.entries.get(&var).copied()
    }

    /// Whether the assignment constrains `var`.
    pub fn contains_var(&self, var: Var) -> bool {
        self.entries.contains_key(&var)
    }

    /// Number of constrained variables.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no variable is constrained.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterator over all entries in ascending variable order.
    pub fn iter(&self) -> impl Iterator<Item = Fact> + '_ {
        self.entries.iter().map(|(&var, &value)| var.fact(value))
    }

    /// Iterator over the constrained variables in ascending order.
    pub fn vars(&self) -> impl Iterator<Item = Var> + '_ {
        self.entries.keys().copied()
    }

    /// Entries whose required value disagrees with the given complete state.
    ///
    /// The state must assign a value to every constrained variable.
    pub fn disagreements<'a>(&'a self, state: &'a [usize]) -> impl Iterator<Item = Fact> + 'a {
        self.iter()
            .filter(move |fact| state[fact.var().index()] != fact.value())
    }

    /// Whether every entry agrees with the given complete state.
    pub fn agrees_with(&self, state: &[usize]) -> bool {
        self.disagreements(state).next().is_none()
    }
}

impl FromIterator<Fact> for PartialAssignment {
    fn from_iter<I: IntoIterator<Item = Fact>>(facts: I) -> PartialAssignment {
        let mut assignment = PartialAssignment::new();
        assignment.extend(facts);
        assignment
    }
}

impl Extend<Fact> for PartialAssignment {
    fn extend<I: IntoIterator<Item = Fact>>(&mut self, facts: I) {
        for fact in facts {
            self.assign(fact.var(), fact.value());
        }
    }
}

impl fmt::Debug for PartialAssignment {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}
