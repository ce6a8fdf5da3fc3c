//! Analysis configuration.

/// Configurable limits used during determinization and search.
#[derive(Clone, Debug)]
pub struct PlannerConfig {
    /// Maximum total number of determinized operator variants. (Default: 1048576)
    ///
    /// Determinization is a multiplicative expansion over the backward-ambiguous effect
    /// variables of each operator. Exceeding the limit aborts with an error instead of
    /// silently truncating the variant set.
    pub max_variants: usize,

    /// Maximum number of regression steps before the search gives up undecided.
    /// (Default: 1000000)
    ///
    /// The greedy search has no cycle detection, so the limit bounds searches that
    /// revisit equivalent goal frontiers forever.
    pub max_steps: u64,
}

impl Default for PlannerConfig {
    fn default() -> PlannerConfig {
        PlannerConfig {
            max_variants: 1 << 20,
            max_steps: 1_000_000,
        }
    }
}
