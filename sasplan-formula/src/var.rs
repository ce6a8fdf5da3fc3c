//! State variables and facts.
use std::fmt;

/// The backing type used to represent variable indices.
pub type VarIdx = u32;

/// A finite-domain state variable.
///
/// A variable is represented by its 0-based positional index, the same convention the
/// translator output format uses. The domain size belongs to the owning
/// [`Problem`](crate::problem::Problem), not to the variable itself.
///
/// Creating a variable with an index larger than `Var::max_var().index()` is unsupported.
/// This might panic or be interpreted as a different variable.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct Var {
    index: VarIdx,
}

impl Var {
    /// Creates a variable from a 0-based index.
    ///
    /// The index may not represent a variable past `Var::max_var()`.
    #[inline]
    pub fn from_index(index: usize) -> Var {
        debug_assert!(index <= Var::max_var().index());
        Var {
            index: index as VarIdx,
        }
    }

    /// The 0-based index representing this variable.
    #[inline]
    pub const fn index(self) -> usize {
        self.index as usize
    }

    /// The variable with largest index that is supported.
    ///
    /// This is less than the backing integer type supports. This enables storing a variable
    /// index and additional tag bits or sentinel values in a single word.
    pub const fn max_var() -> Var {
        // Allow for sign or tag bits
        Var {
            index: VarIdx::max_value() >> 4,
        }
    }

    /// Largest number of variables supported.
    ///
    /// This is exactly `Var::max_var().index() + 1`.
    pub const fn max_count() -> usize {
        Self::max_var().index() + 1
    }

    /// Creates a fact asserting that this variable holds the given value.
    ///
    /// Shortcut for `Fact::new(var, value)`.
    #[inline]
    pub fn fact(self, value: usize) -> Fact {
        Fact::new(self, value)
    }
}

/// Uses the 0-based index of the translator output format.
impl fmt::Debug for Var {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.index())
    }
}

/// Uses the 0-based index of the translator output format.
impl fmt::Display for Var {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A single variable/value pair.
///
/// The finite-domain analogue of a literal: the fact `v=d` asserts that variable `v` holds
/// value `d`. Partial assignments, and thus goals and operator conditions, are sets of
/// facts with pairwise distinct variables.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Fact {
    var: Var,
    value: usize,
}

impl Fact {
    /// Creates a fact from a variable and a value of its domain.
    #[inline]
    pub fn new(var: Var, value: usize) -> Fact {
        Fact { var, value }
    }

    /// The fact's variable.
    #[inline]
    pub fn var(self) -> Var {
        self.var
    }

    /// The value the fact asserts.
    #[inline]
    pub fn value(self) -> usize {
        self.value
    }
}

impl fmt::Debug for Fact {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}={}", self.var, self.value)
    }
}

impl fmt::Display for Fact {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[cfg(any(test, feature = "proptest-strategies"))]
#[doc(hidden)]
pub mod strategy {
    use super::*;
    use proptest::prelude::*;

    pub fn var(index: impl Strategy<Value = usize>) -> impl Strategy<Value = Var> {
        index.prop_map(Var::from_index)
    }

    pub fn fact(
        index: impl Strategy<Value = usize>,
        value: impl Strategy<Value = usize>,
    ) -> impl Strategy<Value = Fact> {
        (var(index), value).prop_map(|(var, value)| var.fact(value))
    }
}
