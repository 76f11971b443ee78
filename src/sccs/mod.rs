//! Strongly connected components.
//!
//! [`tarjan`] is the primary, general-purpose algorithm: a single iterative depth-first visit
//! that works on any directed graph. [`kosaraju`] is kept as an independent oracle used by
//! tests to cross-check `tarjan`'s output on small graphs. [`symmetric`] shortcuts the
//! computation on symmetric graphs, where strongly connected components coincide with ordinary
//! connected components and a single undirected depth-first visit suffices.
//!
//! # Examples
//!
//! ```
//! use graph_kernels::sccs::tarjan;
//! use dsi_progress_logger::no_logging;
//! use webgraph::graphs::vec_graph::VecGraph;
//! use webgraph::traits::SequentialLabeling;
//!
//! let graph = VecGraph::from_arcs([(0, 1), (1, 2), (2, 0), (1, 3)]);
//! let mut scc = tarjan(&graph, no_logging![]);
//! scc.sort_by_size();
//!
//! assert_eq!(scc.compute_sizes(), vec![3, 1]);
//! assert_eq!(scc.components(), &[0, 0, 0, 1]);
//! ```

mod kosaraju;
mod symm;
mod tarjan;

use sux::bits::BitVec;
use webgraph::traits::RandomAccessGraph;

pub use kosaraju::kosaraju;
pub use symm::symmetric;
pub use tarjan::tarjan;

/// The result of a strongly-connected-components computation: a partition of the graph's nodes
/// into components, identified by an integer in `0..num_components`.
#[derive(Debug, Clone)]
pub struct Sccs {
    num_components: usize,
    components: Box<[usize]>,
}

impl Sccs {
    /// Creates a new instance from the given components and number of components.
    ///
    /// No check is performed on the structure of the arguments.
    pub fn new(num_components: usize, components: Box<[usize]>) -> Self {
        Sccs {
            num_components,
            components,
        }
    }

    /// The number of distinct components.
    pub fn num_components(&self) -> usize {
        self.num_components
    }

    /// The component index of each node.
    pub fn components(&self) -> &[usize] {
        &self.components
    }

    /// Computes the number of nodes belonging to each component.
    pub fn compute_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.num_components];
        for &component in self.components.iter() {
            sizes[component] += 1;
        }
        sizes
    }

    /// Renumbers components in order of non-increasing size, so that component `0` is always
    /// the largest.
    pub fn sort_by_size(&mut self) -> Vec<usize> {
        let sizes = self.compute_sizes();
        let mut sort_perm = (0..self.num_components).collect::<Vec<_>>();
        sort_perm.sort_unstable_by(|&a, &b| sizes[b].cmp(&sizes[a]));

        let mut inv_perm = vec![0; self.num_components];
        for (new_index, &old_index) in sort_perm.iter().enumerate() {
            inv_perm[old_index] = new_index;
        }

        for component in self.components.iter_mut() {
            *component = inv_perm[*component];
        }

        sizes.into_iter().enumerate().fold(
            vec![0; self.num_components],
            |mut acc, (old_index, size)| {
                acc[inv_perm[old_index]] = size;
                acc
            },
        )
    }

    /// Classifies each node as belonging to a bucket or not.
    ///
    /// A node is in a bucket iff it has at least one outgoing arc and every one of its
    /// out-neighbours is itself in a bucket of the same terminal (sink) component. Since a
    /// terminal component's arcs never leave it, this reduces to a per-component property:
    /// every node of a terminal component is a bucket node if the component has no node of
    /// out-degree zero, and none of its nodes are otherwise.
    pub fn compute_buckets(&self, graph: impl RandomAccessGraph) -> BitVec {
        let mut terminal = vec![true; self.num_components];
        let mut has_dangling_node = vec![false; self.num_components];

        for node in 0..graph.num_nodes() {
            let component = self.components[node];
            if graph.outdegree(node) == 0 {
                has_dangling_node[component] = true;
            }
            for succ in graph.successors(node) {
                if self.components[succ] != component {
                    terminal[component] = false;
                }
            }
        }

        let mut buckets = BitVec::new(graph.num_nodes());
        for node in 0..graph.num_nodes() {
            let component = self.components[node];
            if terminal[component] && !has_dangling_node[component] {
                buckets.set(node, true);
            }
        }
        buckets
    }

    /// Like [`sort_by_size`](Self::sort_by_size), but renumbers components in parallel using
    /// rayon, which is worthwhile only for very large component arrays.
    pub fn par_sort_by_size(&mut self) -> Vec<usize> {
        use rayon::prelude::*;

        let sizes = self.compute_sizes();
        let mut sort_perm = (0..self.num_components).collect::<Vec<_>>();
        sort_perm.sort_unstable_by(|&a, &b| sizes[b].cmp(&sizes[a]));

        let mut inv_perm = vec![0; self.num_components];
        for (new_index, &old_index) in sort_perm.iter().enumerate() {
            inv_perm[old_index] = new_index;
        }

        self.components
            .par_iter_mut()
            .for_each(|component| *component = inv_perm[*component]);

        sizes.into_iter().enumerate().fold(
            vec![0; self.num_components],
            |mut acc, (old_index, size)| {
                acc[inv_perm[old_index]] = size;
                acc
            },
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_sort_by_size() {
        let mut scc = Sccs::new(2, vec![0, 1, 0, 0].into_boxed_slice());
        let sizes = scc.sort_by_size();
        assert_eq!(sizes, vec![3, 1]);
        assert_eq!(scc.components(), &[0, 1, 0, 0]);
    }

    #[test]
    fn test_buckets_on_terminal_cycle_with_tail() {
        use webgraph::graphs::vec_graph::VecGraph;

        // 0 -> 1 -> 2 -> 1: {1, 2} is a terminal 2-cycle (a bucket), 0 is not (its component
        // has an outgoing arc to the cycle).
        let graph = VecGraph::from_arcs([(0, 1), (1, 2), (2, 1)]);
        let scc = tarjan(&graph, &mut dsi_progress_logger::no_logging![]);
        let buckets = scc.compute_buckets(&graph);

        assert!(!buckets.get(0));
        assert!(buckets.get(1));
        assert!(buckets.get(2));
    }

    #[test]
    fn test_tarjan_matches_kosaraju_on_random_graphs() {
        use crate::sccs::kosaraju;
        use rand::rngs::StdRng;
        use rand::{Rng, SeedableRng};
        use webgraph::graphs::vec_graph::VecGraph;

        let mut rng = StdRng::seed_from_u64(0x5cc_5cc);
        for trial in 0..20 {
            let num_nodes = 5 + trial % 40;
            let mut arcs = Vec::new();
            for u in 0..num_nodes {
                for v in 0..num_nodes {
                    if u != v && rng.gen_bool(0.1) {
                        arcs.push((u, v));
                    }
                }
            }
            let graph = VecGraph::from_arcs(arcs.iter().copied());
            let transpose = VecGraph::from_arcs(arcs.iter().map(|&(u, v)| (v, u)));

            let tarjan_scc = tarjan(&graph, &mut dsi_progress_logger::no_logging![]);
            let kosaraju_scc = kosaraju(&graph, &transpose, &mut dsi_progress_logger::no_logging![]);

            for u in 0..num_nodes {
                for v in 0..num_nodes {
                    let same_tarjan = tarjan_scc.components()[u] == tarjan_scc.components()[v];
                    let same_kosaraju = kosaraju_scc.components()[u] == kosaraju_scc.components()[v];
                    assert_eq!(
                        same_tarjan, same_kosaraju,
                        "trial {trial}: tarjan and kosaraju disagree on nodes {u},{v}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_buckets_exclude_dangling_terminal_component() {
        use webgraph::graphs::vec_graph::VecGraph;

        // 0 -> 1, node 1 has no outgoing arcs: its singleton component is terminal but
        // dangling, so it is not a bucket.
        let graph = VecGraph::from_arcs([(0, 1)]);
        let scc = tarjan(&graph, &mut dsi_progress_logger::no_logging![]);
        let buckets = scc.compute_buckets(&graph);

        assert!(!buckets.get(0));
        assert!(!buckets.get(1));
    }
}
