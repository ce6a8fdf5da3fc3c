//! Causal dependency graph over state variables.
use std::io;

use log::info;
use rustc_hash::FxHashMap;

use sasplan_formula::{Problem, Var};

/// Weighted directed dependency multigraph between variables.
///
/// Edges are keyed by their ordered (from, to) pair. The weight counts derivation
/// instances: every rule application across every operator increments the keyed
/// counter, so a pair derived twice carries weight 2 and is never collapsed to mere
/// presence.
#[derive(Default)]
pub struct CausalGraph {
    edges: FxHashMap<(Var, Var), u64>,
}

impl CausalGraph {
    /// Derives the dependency edges of a problem's raw operator set.
    ///
    /// Determinization only affects backward search, not the forward effect structure,
    /// so the graph is built from the raw operators. Per operator and per effect
    /// variable (the destination), three rules apply:
    ///
    /// 1. every prevail variable points at the destination,
    /// 2. every precondition variable other than the destination with a non-default
    ///    value points at the destination,
    /// 3. every other effect variable of the same operator points at the destination.
    ///
    /// A prevail entry with a non-default value is derived by both rule 1 and rule 2
    /// and contributes twice; the rules increment independently.
    pub fn build(problem: &Problem) -> CausalGraph {
        let mut graph = CausalGraph::default();

        for operator in problem.operators() {
            for dest in operator.post.vars() {
                for prevail in operator.prevail() {
                    graph.bump(prevail.var(), dest);
                }
                for pre in operator.pre.iter() {
                    if pre.var() != dest && pre.value() > 0 {
                        graph.bump(pre.var(), dest);
                    }
                }
                for joint in operator.post.vars() {
                    if joint != dest {
                        graph.bump(joint, dest);
                    }
                }
            }
        }

        info!(
            "Derived {} causal edges from {} operators",
            graph.edge_count(),
            problem.operators().len()
        );

        graph
    }

    fn bump(&mut self, from: Var, to: Var) {
        *self.edges.entry((from, to)).or_insert(0) += 1;
    }

    /// Accumulated weight of the ordered pair, 0 when no rule derived it.
    pub fn weight(&self, from: Var, to: Var) -> u64 {
        self.edges.get(&(from, to)).copied().unwrap_or(0)
    }

    /// Number of distinct ordered pairs with at least one derivation.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Iterator over all (from, to, weight) edges in unspecified order.
    pub fn edges(&self) -> impl Iterator<Item = (Var, Var, u64)> + '_ {
        self.edges
            .iter()
            .map(|(&(from, to), &weight)| (from, to, weight))
    }
}

/// Write the graph as Graphviz DOT for an external layout tool.
///
/// Nodes carry the variable name as label and the domain size; edges carry their
/// accumulated weight as an attribute, one statement per distinct pair. Output is
/// sorted by variable pair, so it is deterministic.
pub fn write_dot(
    target: &mut impl io::Write,
    problem: &Problem,
    graph: &CausalGraph,
) -> io::Result<()> {
    target.write_all(b"strict digraph {\n")?;

    for (index, info) in problem.variables().iter().enumerate() {
        target.write_all(b"  ")?;
        itoa::write(&mut *target, index)?;
        write!(target, " [label=\"{}\", size=", info.name)?;
        itoa::write(&mut *target, info.domain_size)?;
        target.write_all(b"];\n")?;
    }

    let mut edges: Vec<_> = graph.edges().collect();
    edges.sort();
    for (from, to, weight) in edges {
        target.write_all(b"  ")?;
        itoa::write(&mut *target, from.index())?;
        target.write_all(b" -> ")?;
        itoa::write(&mut *target, to.index())?;
        target.write_all(b" [weight=")?;
        itoa::write(&mut *target, weight)?;
        target.write_all(b"];\n")?;
    }

    target.write_all(b"}\n")
}
