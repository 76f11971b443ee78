//! A graph paired with its own transpose, so that code needing both directions (in- and
//! out-neighbourhoods) doesn't have to derive one from the other.
//!
//! Upstream, this pairing exists in two near-identical variants; here it is a single type built
//! directly atop two independently-supplied [`RandomAccessGraph`] values. It performs no
//! graph-mutation or compression of its own: `forward`/`backward` are handed back verbatim, and
//! `symmetrize` merges their neighbourhoods on the fly rather than materializing a new graph.

use crate::error::KernelError;
use anyhow::Result;
use webgraph::traits::RandomAccessGraph;

/// A graph and its transpose, checked at construction time to agree on node and arc counts.
pub struct BidirectionalGraph<F, B> {
    forward: F,
    backward: B,
}

impl<F: RandomAccessGraph, B: RandomAccessGraph> BidirectionalGraph<F, B> {
    /// Pairs `forward` with `backward`, which must be its transpose.
    ///
    /// Only the shape is checked (same number of nodes and arcs); it is the caller's
    /// responsibility that `backward` is actually the transpose of `forward`.
    ///
    /// # Errors
    /// Returns [`KernelError::InputShape`] if the node or arc counts disagree.
    pub fn new(forward: F, backward: B) -> Result<Self> {
        if forward.num_nodes() != backward.num_nodes() {
            return Err(KernelError::InputShape(format!(
                "forward graph has {} nodes, backward graph has {}",
                forward.num_nodes(),
                backward.num_nodes()
            ))
            .into());
        }
        if forward.num_arcs() != backward.num_arcs() {
            return Err(KernelError::InputShape(format!(
                "forward graph has {} arcs, backward graph has {}",
                forward.num_arcs(),
                backward.num_arcs()
            ))
            .into());
        }
        Ok(BidirectionalGraph { forward, backward })
    }

    /// The number of nodes (shared by both directions).
    pub fn num_nodes(&self) -> usize {
        self.forward.num_nodes()
    }

    /// The underlying forward graph.
    pub fn forward(&self) -> &F {
        &self.forward
    }

    /// The underlying backward (transpose) graph.
    pub fn backward(&self) -> &B {
        &self.backward
    }

    /// The out-neighbours of `node`.
    pub fn successors(&self, node: usize) -> <F as webgraph::traits::RandomAccessLabeling>::Labels<'_> {
        self.forward.successors(node)
    }

    /// The in-neighbours of `node`.
    pub fn predecessors(&self, node: usize) -> <B as webgraph::traits::RandomAccessLabeling>::Labels<'_> {
        self.backward.successors(node)
    }

    /// The out-degree of `node`.
    pub fn outdegree(&self, node: usize) -> usize {
        self.forward.outdegree(node)
    }

    /// The in-degree of `node`.
    pub fn indegree(&self, node: usize) -> usize {
        self.backward.outdegree(node)
    }

    /// The sorted, deduplicated union of `node`'s in- and out-neighbours (excluding `node`
    /// itself), as would be seen in the undirected graph obtained by symmetrizing this pair.
    pub fn symmetrize(&self, node: usize) -> Vec<usize> {
        let mut neighbours: Vec<usize> = self
            .forward
            .successors(node)
            .into_iter()
            .chain(self.backward.successors(node))
            .filter(|&other| other != node)
            .collect();
        neighbours.sort_unstable();
        neighbours.dedup();
        neighbours
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use webgraph::graphs::vec_graph::VecGraph;

    #[test]
    fn test_predecessors_is_transpose_successors() {
        let forward = VecGraph::from_arcs([(0, 1), (1, 2)]);
        let backward = VecGraph::from_arcs([(1, 0), (2, 1)]);
        let bidi = BidirectionalGraph::new(&forward, &backward).unwrap();
        assert_eq!(bidi.predecessors(1).into_iter().collect::<Vec<_>>(), vec![0]);
        assert_eq!(bidi.predecessors(2).into_iter().collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn test_symmetrize_merges_both_directions() {
        let forward = VecGraph::from_arcs([(0, 1), (1, 2)]);
        let backward = VecGraph::from_arcs([(1, 0), (2, 1)]);
        let bidi = BidirectionalGraph::new(&forward, &backward).unwrap();
        assert_eq!(bidi.symmetrize(1), vec![0, 2]);
    }

    #[test]
    fn test_shape_mismatch_is_rejected() {
        let forward = VecGraph::from_arcs([(0, 1)]);
        let backward = VecGraph::from_arcs([(0, 1), (1, 0), (1, 2), (2, 1)]);
        assert!(BidirectionalGraph::new(&forward, &backward).is_err());
    }
}
