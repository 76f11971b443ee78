use crate::sccs::Sccs;
use crate::visits::dfv::{EventPred, Sequential, SeqPred};
use dsi_progress_logger::ProgressLog;
use std::ops::ControlFlow::Continue;
use webgraph::traits::RandomAccessGraph;

/// Returns the nodes of `graph` in order of non-increasing exit time from a depth-first visit.
///
/// If `graph` is acyclic this is a topological order; otherwise it is merely a useful visit
/// order for [`kosaraju`], which is the only caller.
fn postorder(graph: &impl RandomAccessGraph, pl: &mut impl ProgressLog) -> Vec<usize> {
    let num_nodes = graph.num_nodes();
    let mut visit = SeqPred::new(graph);
    let mut order = Vec::with_capacity(num_nodes);

    let result = visit.visit(0..num_nodes, |event| {
        if let EventPred::Postvisit { node, .. } = event {
            pl.light_update();
            order.push(node);
        }
        Continue::<(), _>(())
    });
    debug_assert!(result.is_continue());

    order.reverse();
    order
}

/// Computes the strongly connected components of `graph` using Kosaraju's algorithm: a first
/// depth-first visit of `graph` establishes an exit-time order, then a second depth-first visit
/// of `transpose` (the same graph with every arc reversed), started from nodes in that order,
/// assigns one component per visit tree.
///
/// `graph` and `transpose` must describe the same graph, one the reverse of the other; this is
/// not checked.
///
/// This algorithm needs two full visits rather than [`crate::sccs::tarjan`]'s one, but is simple
/// enough to make a trustworthy independent check of `tarjan`'s output on small graphs.
pub fn kosaraju(
    graph: impl RandomAccessGraph,
    transpose: impl RandomAccessGraph,
    pl: &mut impl ProgressLog,
) -> Sccs {
    let num_nodes = graph.num_nodes();
    pl.item_name("node");
    pl.expected_updates(Some(num_nodes));
    pl.start("Computing strongly connected components with Kosaraju's algorithm...");

    let order = postorder(&graph, pl);

    let mut visit = SeqPred::new(&transpose);
    let mut number_of_components = 0;
    let mut components = vec![usize::MAX; num_nodes].into_boxed_slice();

    let result = visit.visit(order, |event| {
        match event {
            EventPred::Previsit { node, .. } => {
                pl.light_update();
                components[node] = number_of_components;
            }
            EventPred::Done { .. } => {
                number_of_components += 1;
            }
            _ => (),
        }
        Continue::<(), _>(())
    });
    debug_assert!(result.is_continue());

    pl.done();
    Sccs::new(number_of_components, components)
}

#[cfg(test)]
mod test {
    use super::*;
    use dsi_progress_logger::no_logging;
    use webgraph::graphs::vec_graph::VecGraph;

    #[test]
    fn test_mixed_graph() {
        let graph = VecGraph::from_arcs([(0, 1), (1, 2), (2, 0), (1, 3)]);
        let transposed = VecGraph::from_arcs([(1, 0), (2, 1), (0, 2), (3, 1)]);
        let mut scc = kosaraju(&graph, &transposed, &mut no_logging![]);
        scc.sort_by_size();
        assert_eq!(scc.compute_sizes(), vec![3, 1]);
        assert_eq!(scc.components(), &[0, 0, 0, 1]);
    }

    #[test]
    fn test_dag_has_singleton_components() {
        let graph = VecGraph::from_arcs([(0, 1), (1, 2), (0, 2)]);
        let transposed = VecGraph::from_arcs([(1, 0), (2, 1), (2, 0)]);
        let scc = kosaraju(&graph, &transposed, &mut no_logging![]);
        assert_eq!(scc.num_components(), 3);
    }
}
