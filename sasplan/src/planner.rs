//! Backward goal-regression search.
use std::mem::replace;

use log::info;

use sasplan_formula::{Fact, Operator, PartialAssignment, Problem};

use crate::config::PlannerConfig;
use crate::determinize::{determinize_all, VariantLimitError};
use crate::state::SearchState;

/// Greedy backward regression planner.
///
/// The planner works backward from the goal. Each step picks one operator that supports
/// the current goal frontier and replaces the frontier with a copy of it overwritten by
/// that operator's preconditions: the frontier always describes what must hold before
/// the most recently selected operator fires. The step choice is never revisited, so
/// the search is incomplete: a dead end does not prove that no plan exists, and a found
/// plan need not be optimal or minimal.
pub struct Planner<'a> {
    problem: &'a Problem,
    /// Determinized operator set; the search never consults the raw operators.
    operators: Vec<Operator>,
    goal: PartialAssignment,
    /// Replaced goal frontiers, oldest first.
    frontiers: Vec<PartialAssignment>,
    /// Selected operator indices in regression (goal to start) order.
    plan_rev: Vec<usize>,
    state: SearchState,
    steps: u64,
    max_steps: u64,
}

impl<'a> Planner<'a> {
    /// Creates a planner for a problem, determinizing its operator set.
    pub fn new(
        problem: &'a Problem,
        config: &PlannerConfig,
    ) -> Result<Planner<'a>, VariantLimitError> {
        let operators = determinize_all(problem, config.max_variants)?;
        Ok(Planner {
            problem,
            operators,
            goal: problem.goal().clone(),
            frontiers: vec![],
            plan_rev: vec![],
            state: SearchState::default(),
            steps: 0,
            max_steps: config.max_steps,
        })
    }

    /// Current search state.
    pub fn state(&self) -> SearchState {
        self.state
    }

    /// The current goal frontier.
    pub fn goal(&self) -> &PartialAssignment {
        &self.goal
    }

    /// The goal frontiers replaced by regression steps, oldest first.
    ///
    /// The frontier is replaced by value, never mutated in place, so every intermediate
    /// goal of a search stays inspectable.
    pub fn frontiers(&self) -> &[PartialAssignment] {
        &self.frontiers
    }

    /// The determinized operator set the search selects from.
    pub fn operators(&self) -> &[Operator] {
        &self.operators
    }

    /// Goal entries the initial state does not satisfy under the current frontier.
    pub fn flaws(&self) -> Vec<Fact> {
        self.goal.disagreements(self.problem.init()).collect()
    }

    /// Indices of operators supporting the current frontier, in operator order.
    pub fn supporters(&self) -> Vec<usize> {
        self.operators
            .iter()
            .enumerate()
            .filter(|(_, operator)| operator.supports(&self.goal))
            .map(|(index, _)| index)
            .collect()
    }

    /// Performs one regression step and returns the state afterwards.
    pub fn step(&mut self) -> SearchState {
        if self.state != SearchState::Searching {
            return self.state;
        }

        if self.flaws().is_empty() {
            self.state = SearchState::Satisfied;
            return self.state;
        }

        // Tie-break among supporters: smallest name, then cost, then operator index.
        let selected = self.supporters().into_iter().min_by(|&a, &b| {
            let (op_a, op_b) = (&self.operators[a], &self.operators[b]);
            (op_a.name.as_str(), op_a.cost, a).cmp(&(op_b.name.as_str(), op_b.cost, b))
        });
        let selected = match selected {
            Some(index) => index,
            None => {
                self.state = SearchState::DeadEnd;
                return self.state;
            }
        };

        // Regress: keep every entry of the old frontier, the satisfied ones included,
        // and write the selected operator's preconditions over it.
        let mut regressed = self.goal.clone();
        regressed.extend(self.operators[selected].pre.iter());
        self.frontiers.push(replace(&mut self.goal, regressed));

        self.plan_rev.push(selected);
        self.steps += 1;
        self.state
    }

    /// Runs regression steps until the search is decided or the step limit is hit.
    ///
    /// Returns the final state. `Searching` means the step limit stopped an undecided
    /// search, which is distinct from a dead end.
    pub fn search(&mut self) -> SearchState {
        // Even a zero step limit classifies an already satisfied goal.
        if self.state == SearchState::Searching && self.flaws().is_empty() {
            self.state = SearchState::Satisfied;
        }

        while self.state == SearchState::Searching && self.steps < self.max_steps {
            self.step();
        }

        match self.state {
            SearchState::Satisfied => info!(
                "Plan found with {} steps, total cost {}",
                self.plan_rev.len(),
                self.total_cost()
            ),
            SearchState::DeadEnd => info!("Dead end after {} regression steps", self.steps),
            SearchState::Searching => info!("Undecided after {} regression steps", self.steps),
        }

        self.state
    }

    /// The found plan in execution order, when the search succeeded.
    pub fn plan(&self) -> Option<Vec<&Operator>> {
        if self.state == SearchState::Satisfied {
            Some(
                self.plan_rev
                    .iter()
                    .rev()
                    .map(|&index| &self.operators[index])
                    .collect(),
            )
        } else {
            None
        }
    }

    /// Sum of the selected operators' costs.
    pub fn total_cost(&self) -> u64 {
        self.plan_rev
            .iter()
            .map(|&index| self.operators[index].cost)
            .sum()
    }
}
