//! sasplan analyzes SAS+ planning problems, finite-domain encodings as produced by the
//! Fast Downward translator. Given a problem it can derive the weighted causal-dependency
//! graph between the state variables and run a greedy backward goal-regression search
//! that either produces an operator sequence from the initial state to the goal or
//! reports a dead end.
//!
//! The regression search is incomplete by design: it never backtracks over its operator
//! choice, so a dead end does not prove that no plan exists and a found plan need not be
//! optimal.

pub mod causal;
pub mod config;
pub mod determinize;
pub mod planner;
pub mod state;

pub use sasplan_formula::{Fact, Operator, PartialAssignment, Problem, Var, VarInfo};

pub mod sas {
    //! Translator output format parser.
    pub use sasplan_sas::*;
}
