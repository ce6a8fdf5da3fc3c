//! Miscellaneous search state.

/// Regression search state.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum SearchState {
    /// The current goal frontier is not yet satisfied by the initial state.
    Searching,
    /// Every goal entry equals the initial state's value for that variable.
    Satisfied,
    /// No operator supports the current goal frontier.
    ///
    /// A normal terminal outcome, not an error: it means "no plan found", which for
    /// this incomplete search does not prove that no plan exists.
    DeadEnd,
}

impl Default for SearchState {
    fn default() -> SearchState {
        SearchState::Searching
    }
}
