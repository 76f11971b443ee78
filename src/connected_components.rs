//! Connected components of an undirected (symmetric) graph.
//!
//! On a symmetric graph strongly connected components and ordinary connected components
//! coincide, so this is a thin, differently-named wrapper around [`crate::sccs::symmetric`] that
//! gives callers who only ever reason about undirected graphs a name that matches their mental
//! model.

use crate::sccs::{self, Sccs};
use dsi_progress_logger::ProgressLog;
use webgraph::traits::RandomAccessGraph;

/// Computes the connected components of a symmetric graph.
///
/// `graph` is assumed to be symmetric; passing a non-symmetric graph produces meaningless
/// results (see [`crate::sccs::symmetric`]).
pub fn connected_components(graph: impl RandomAccessGraph, pl: &mut impl ProgressLog) -> Sccs {
    sccs::symmetric(graph, pl)
}

#[cfg(test)]
mod test {
    use super::*;
    use dsi_progress_logger::no_logging;
    use webgraph::graphs::vec_graph::VecGraph;

    #[test]
    fn test_two_components() {
        let graph = VecGraph::from_arcs([(0, 1), (1, 0), (2, 3), (3, 2)]);
        let cc = connected_components(&graph, &mut no_logging![]);
        assert_eq!(cc.num_components(), 2);
    }
}
