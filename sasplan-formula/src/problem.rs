//! SAS+ planning problems and operators.
use std::fmt;

use thiserror::Error;

use crate::partial::PartialAssignment;
use crate::var::{Fact, Var};

/// A complete assignment of one value to every variable, indexed by variable.
pub type State = Vec<usize>;

/// Name and domain size of one state variable.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct VarInfo {
    pub name: String,
    /// Number of values in the variable's domain, at least 1.
    pub domain_size: usize,
}

/// A state-transforming operator.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Operator {
    pub name: String,
    pub cost: u64,
    /// Forward-sense preconditions, prevail conditions included.
    ///
    /// An effect variable missing from the preconditions had its precondition marked as
    /// "any value other than the new one" in the input encoding. Determinization pins
    /// such variables to each excluded value in turn.
    pub pre: PartialAssignment,
    /// The values the operator assigns. Defines every variable the operator changes.
    pub post: PartialAssignment,
}

impl Operator {
    /// Creates an operator without any conditions.
    pub fn new(name: impl Into<String>, cost: u64) -> Operator {
        Operator {
            name: name.into(),
            cost,
            pre: PartialAssignment::new(),
            post: PartialAssignment::new(),
        }
    }

    /// Precondition entries for variables the operator requires but does not change.
    pub fn prevail<'a>(&'a self) -> impl Iterator<Item = Fact> + 'a {
        self.pre
            .iter()
            .filter(move |fact| !self.post.contains_var(fact.var()))
    }

    /// Whether this operator can be the final step producing a state that satisfies
    /// `goal`.
    ///
    /// True iff the postconditions achieve at least one goal entry, no postcondition
    /// contradicts a goal entry, and no prevail condition conflicts with one. A
    /// contradicting postcondition dominates: the operator does not support the goal no
    /// matter how many other entries it achieves.
    pub fn supports(&self, goal: &PartialAssignment) -> bool {
        let mut achieves = false;
        for fact in self.post.iter() {
            match goal.value_of(fact.var()) {
                Some(required) if required == fact.value() => achieves = true,
                Some(_) => return false,
                None => {}
            }
        }
        if !achieves {
            return false;
        }
        self.prevail().all(|fact| match goal.value_of(fact.var()) {
            Some(required) => required == fact.value(),
            None => true,
        })
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Structural violations detected when building a [`Problem`].
#[derive(Debug, Error)]
pub enum InvalidProblemError {
    #[error("variable {var} has an empty domain")]
    EmptyDomain { var: Var },
    #[error("initial state assigns {found} variables while the problem has {expected}")]
    InitLength { expected: usize, found: usize },
    #[error("initial state assigns {value} to variable {var} with domain size {domain_size}")]
    InitValue {
        var: Var,
        value: usize,
        domain_size: usize,
    },
    #[error("goal references variable {var} while the problem has {var_count} variables")]
    GoalVar { var: Var, var_count: usize },
    #[error("goal requires value {value} for variable {var} with domain size {domain_size}")]
    GoalValue {
        var: Var,
        value: usize,
        domain_size: usize,
    },
    #[error(
        "operator '{operator}' references variable {var} while the problem has {var_count} \
         variables"
    )]
    OperatorVar {
        operator: String,
        var: Var,
        var_count: usize,
    },
    #[error(
        "operator '{operator}' uses value {value} for variable {var} with domain size \
         {domain_size}"
    )]
    OperatorValue {
        operator: String,
        var: Var,
        value: usize,
        domain_size: usize,
    },
}

/// An immutable SAS+ planning problem.
///
/// Holds the variable table, the complete initial state, the partial goal and the raw
/// (pre-determinization) operator set. All cross references are validated once at
/// construction; the analyses assume a valid problem and only guard indices with debug
/// assertions.
#[derive(Clone, Debug)]
pub struct Problem {
    variables: Vec<VarInfo>,
    init: State,
    goal: PartialAssignment,
    operators: Vec<Operator>,
}

impl Problem {
    /// Builds a problem, validating every invariant of the data model.
    pub fn new(
        variables: Vec<VarInfo>,
        init: State,
        goal: PartialAssignment,
        operators: Vec<Operator>,
    ) -> Result<Problem, InvalidProblemError> {
        for (index, info) in variables.iter().enumerate() {
            if info.domain_size == 0 {
                return Err(InvalidProblemError::EmptyDomain {
                    var: Var::from_index(index),
                });
            }
        }

        if init.len() != variables.len() {
            return Err(InvalidProblemError::InitLength {
                expected: variables.len(),
                found: init.len(),
            });
        }
        for (index, &value) in init.iter().enumerate() {
            let domain_size = variables[index].domain_size;
            if value >= domain_size {
                return Err(InvalidProblemError::InitValue {
                    var: Var::from_index(index),
                    value,
                    domain_size,
                });
            }
        }

        for fact in goal.iter() {
            match variables.get(fact.var().index()) {
                None => {
                    return Err(InvalidProblemError::GoalVar {
                        var: fact.var(),
                        var_count: variables.len(),
                    });
                }
                Some(info) if fact.value() >= info.domain_size => {
                    return Err(InvalidProblemError::GoalValue {
                        var: fact.var(),
                        value: fact.value(),
                        domain_size: info.domain_size,
                    });
                }
                Some(_) => {}
            }
        }

        for operator in operators.iter() {
            for fact in operator.pre.iter().chain(operator.post.iter()) {
                match variables.get(fact.var().index()) {
                    None => {
                        return Err(InvalidProblemError::OperatorVar {
                            operator: operator.name.clone(),
                            var: fact.var(),
                            var_count: variables.len(),
                        });
                    }
                    Some(info) if fact.value() >= info.domain_size => {
                        return Err(InvalidProblemError::OperatorValue {
                            operator: operator.name.clone(),
                            var: fact.var(),
                            value: fact.value(),
                            domain_size: info.domain_size,
                        });
                    }
                    Some(_) => {}
                }
            }
        }

        Ok(Problem {
            variables,
            init,
            goal,
            operators,
        })
    }

    /// Number of state variables.
    pub fn var_count(&self) -> usize {
        self.variables.len()
    }

    /// The variable table, ordered by index.
    pub fn variables(&self) -> &[VarInfo] {
        &self.variables
    }

    /// Domain size of one variable.
    pub fn domain_size(&self, var: Var) -> usize {
        self.variables[var.index()].domain_size
    }

    /// The complete initial state.
    pub fn init(&self) -> &[usize] {
        &self.init
    }

    /// The partial goal assignment as parsed. The planner regresses a private copy.
    pub fn goal(&self) -> &PartialAssignment {
        &self.goal
    }

    /// The raw operator set.
    pub fn operators(&self) -> &[Operator] {
        &self.operators
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var_table(domain_sizes: &[usize]) -> Vec<VarInfo> {
        domain_sizes
            .iter()
            .enumerate()
            .map(|(index, &domain_size)| VarInfo {
                name: format!("v{}", index),
                domain_size,
            })
            .collect()
    }

    #[test]
    fn valid_problem() {
        let mut operator = Operator::new("op", 1);
        operator.pre = partial![0 => 1];
        operator.post = partial![1 => 2];

        let problem = Problem::new(
            var_table(&[2, 3]),
            vec![0, 0],
            partial![1 => 2],
            vec![operator],
        )
        .unwrap();

        assert_eq!(problem.var_count(), 2);
        assert_eq!(problem.domain_size(Var::from_index(1)), 3);
        assert_eq!(problem.init(), &[0, 0]);
        assert_eq!(problem.operators().len(), 1);
    }

    #[test]
    fn rejects_bad_references() {
        assert!(matches!(
            Problem::new(var_table(&[2, 0]), vec![0, 0], partial![], vec![]),
            Err(InvalidProblemError::EmptyDomain { .. })
        ));

        assert!(matches!(
            Problem::new(var_table(&[2, 2]), vec![0], partial![], vec![]),
            Err(InvalidProblemError::InitLength {
                expected: 2,
                found: 1
            })
        ));

        assert!(matches!(
            Problem::new(var_table(&[2, 2]), vec![0, 2], partial![], vec![]),
            Err(InvalidProblemError::InitValue { value: 2, .. })
        ));

        assert!(matches!(
            Problem::new(var_table(&[2]), vec![0], partial![1 => 0], vec![]),
            Err(InvalidProblemError::GoalVar { .. })
        ));

        assert!(matches!(
            Problem::new(var_table(&[2]), vec![0], partial![0 => 5], vec![]),
            Err(InvalidProblemError::GoalValue { value: 5, .. })
        ));

        let mut operator = Operator::new("bad", 0);
        operator.post = partial![3 => 0];
        assert!(matches!(
            Problem::new(var_table(&[2]), vec![0], partial![], vec![operator]),
            Err(InvalidProblemError::OperatorVar { .. })
        ));

        let mut operator = Operator::new("bad", 0);
        operator.pre = partial![0 => 2];
        assert!(matches!(
            Problem::new(var_table(&[2]), vec![0], partial![], vec![operator]),
            Err(InvalidProblemError::OperatorValue { value: 2, .. })
        ));
    }

    #[test]
    fn prevail_excludes_effect_vars() {
        let mut operator = Operator::new("op", 0);
        operator.pre = partial![0 => 1, 1 => 0, 2 => 2];
        operator.post = partial![1 => 1];

        let prevail: Vec<_> = operator.prevail().collect();
        assert_eq!(prevail, facts![0 => 1, 2 => 2]);
    }

    #[test]
    fn support_requires_an_achieved_entry() {
        let mut operator = Operator::new("op", 0);
        operator.post = partial![1 => 1];

        assert!(operator.supports(&partial![1 => 1]));
        assert!(operator.supports(&partial![0 => 0, 1 => 1]));
        assert!(!operator.supports(&partial![0 => 0]));
        assert!(!operator.supports(&partial![]));

        // An operator without postconditions never supports anything.
        let noop = Operator::new("noop", 0);
        assert!(!noop.supports(&partial![0 => 0]));
    }

    #[test]
    fn contradiction_dominates_support() {
        let mut operator = Operator::new("op", 0);
        operator.post = partial![0 => 1, 1 => 1];

        assert!(operator.supports(&partial![0 => 1, 1 => 1]));
        assert!(!operator.supports(&partial![0 => 1, 1 => 0]));
    }

    #[test]
    fn conflicting_prevail_blocks_support() {
        let mut operator = Operator::new("op", 0);
        operator.pre = partial![0 => 1, 1 => 0];
        operator.post = partial![1 => 1];

        assert!(operator.supports(&partial![1 => 1]));
        assert!(operator.supports(&partial![0 => 1, 1 => 1]));
        assert!(!operator.supports(&partial![0 => 0, 1 => 1]));
    }
}
