use crate::sccs::Sccs;
use crate::visits::dfv::{EventPred, Sequential, SeqPred};
use dsi_progress_logger::ProgressLog;
use std::ops::ControlFlow::Continue;
use webgraph::traits::RandomAccessGraph;

/// Computes the strongly connected components of a symmetric graph.
///
/// On a symmetric graph every strongly connected component coincides with an ordinary
/// (undirected) connected component, so a single depth-first visit that assigns a fresh
/// component id to each visit tree suffices.
///
/// `graph` is assumed to be symmetric (for every arc `(x, y)` there is also an arc `(y, x)`);
/// this is not checked, and passing a non-symmetric graph produces meaningless results.
pub fn symmetric(graph: impl RandomAccessGraph, pl: &mut impl ProgressLog) -> Sccs {
    let num_nodes = graph.num_nodes();
    pl.item_name("node");
    pl.expected_updates(Some(num_nodes));
    pl.start("Computing strongly connected components of a symmetric graph...");

    let mut visit = SeqPred::new(&graph);
    let mut number_of_components = 0;
    let mut components = vec![usize::MAX; num_nodes].into_boxed_slice();

    let result = visit.visit(0..num_nodes, |event| {
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
    fn test_two_components() {
        let graph = VecGraph::from_arcs([
            (0, 1),
            (1, 0),
            (1, 2),
            (2, 1),
            (3, 4),
            (4, 3),
        ]);
        let mut scc = symmetric(&graph, &mut no_logging![]);
        assert_eq!(scc.num_components(), 2);
        scc.sort_by_size();
        assert_eq!(scc.compute_sizes(), vec![3, 2]);
        assert_eq!(scc.components()[0], scc.components()[1]);
        assert_eq!(scc.components()[1], scc.components()[2]);
        assert_eq!(scc.components()[3], scc.components()[4]);
        assert_ne!(scc.components()[0], scc.components()[3]);
    }

    #[test]
    fn test_isolated_node() {
        let mut graph = VecGraph::empty(3);
        graph.add_arc(0, 1);
        graph.add_arc(1, 0);
        let scc = symmetric(&graph, &mut no_logging![]);
        assert_eq!(scc.num_components(), 2);
    }
}
