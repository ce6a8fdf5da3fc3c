//! Basic SAS+ problem data types used by the sasplan planner.

/// Shortcut for tests
#[cfg(any(test, feature = "internal-testing"))]
#[doc(hidden)]
#[macro_export]
macro_rules! fact {
    ($var:expr => $value:expr) => {
        $crate::var::Var::from_index($var).fact($value)
    };
}

/// Shortcut for tests
#[cfg(any(test, feature = "internal-testing"))]
#[doc(hidden)]
#[macro_export]
macro_rules! facts {
    ( $( $var:expr => $value:expr ),* ) => {
        [ $( $crate::fact!( $var => $value ) ),* ]
    };
    ( $( $var:expr => $value:expr ),* , ) => {
        $crate::facts![ $( $var => $value ),* ]
    };
}

/// Shortcut for tests
#[cfg(any(test, feature = "internal-testing"))]
#[doc(hidden)]
#[macro_export]
macro_rules! partial {
    ( $( $var:expr => $value:expr ),* $(,)? ) => {
        (&[ $( $crate::fact!( $var => $value ) ),* ] as &[$crate::var::Fact])
            .iter()
            .cloned()
            .collect::<$crate::partial::PartialAssignment>()
    };
}

pub mod partial;
pub mod problem;
pub mod var;


pub use partial::PartialAssignment;
pub use problem::{InvalidProblemError, Operator, Problem, State, VarInfo};
pub use var::{Fact, Var};
