use crate::sccs::Sccs;
use crate::visits::dfv::{EventPred, Sequential, SeqPred, StoppedWhenDone};
use dsi_progress_logger::ProgressLog;
use std::ops::ControlFlow::{Break, Continue};
use sux::bits::BitVec;
use webgraph::traits::RandomAccessGraph;

/// Computes the strongly connected components of `graph` using Tarjan's algorithm.
///
/// This is an iterative implementation of the classical algorithm: a single depth-first visit
/// assigns each node a (reversed) discovery timestamp and tracks, for every node still on the
/// visit path, the lowest timestamp reachable from it. A node closes a component exactly when
/// its own timestamp equals the lowest timestamp reachable from it.
///
/// The visit exits as soon as every remaining unvisited node is known to collapse into a single
/// final component, which happens whenever the visit path empties out while there is exactly
/// one component left to assign.
pub fn tarjan(graph: impl RandomAccessGraph, pl: &mut impl ProgressLog) -> Sccs {
    let num_nodes = graph.num_nodes();

    pl.item_name("node");
    pl.expected_updates(Some(num_nodes));
    pl.start("Computing strongly connected components with Tarjan's algorithm...");

    let mut visit = SeqPred::new(&graph);

    // Reversed discovery timestamps: start at num_nodes and count down, so any node that has
    // not yet been discovered always compares greater than any already-discovered node.
    let mut index = num_nodes;
    let mut number_of_components = 0;

    let mut high_link = vec![0; num_nodes].into_boxed_slice();
    let mut component = vec![usize::MAX; num_nodes].into_boxed_slice();
    let mut component_stack = Vec::new();
    // `lead` has one entry pushed per Previsit and popped per Postvisit; the top tells us
    // whether the node about to be postvisited is the lowest point of its component ("leads" a
    // component) or must be merged into its parent's component.
    let mut lead: BitVec = BitVec::with_capacity(128);
    lead.push(true);

    let mut root_low_link = 0;

    let result = visit.visit(0..num_nodes, |event| {
            match event {
                EventPred::Init { .. } => {
                    root_low_link = index;
                }
                EventPred::Previsit { node, .. } => {
                    high_link[node] = index;
                    index -= 1;
                    lead.push(true);
                }
                EventPred::Revisit {
                    node: succ, pred, ..
                } => {
                    if component[succ] == usize::MAX && high_link[succ] > high_link[pred] {
                        high_link[pred] = high_link[succ];
                        lead.set(lead.len() - 1, false);
                    }

                    if high_link[succ] == root_low_link && index == 0 {
                        // Every node left to discover collapses into this one final component.
                        for node in 0..num_nodes {
                            if component[node] == usize::MAX {
                                component[node] = number_of_components;
                            }
                        }
                        number_of_components += 1;
                        return Break(StoppedWhenDone {});
                    }
                }
                EventPred::Postvisit { node, parent, .. } => {
                    let is_lead = lead.get(lead.len() - 1);
                    lead.pop();

                    if is_lead {
                        while let Some(&top) = component_stack.last() {
                            if high_link[top] > high_link[node] {
                                break;
                            }
                            component[component_stack.pop().unwrap()] = number_of_components;
                        }
                        component[node] = number_of_components;
                        number_of_components += 1;
                        index += 1;
                    } else {
                        component_stack.push(node);
                        if high_link[parent] < high_link[node] {
                            high_link[parent] = high_link[node];
                        }
                    }
                }
                EventPred::Done { .. } => pl.light_update(),
            }
            Continue(())
        });

    if let Break(StoppedWhenDone {}) = result {
        for node in visit.stack() {
            if component[node] == usize::MAX {
                component[node] = number_of_components - 1;
            }
        }
    }

    pl.done();

    Sccs::new(number_of_components, component)
}

#[cfg(test)]
mod test {
    use super::*;
    use dsi_progress_logger::no_logging;
    use webgraph::graphs::vec_graph::VecGraph;

    #[test]
    fn test_single_cycle() {
        let graph = VecGraph::from_arcs([(0, 1), (1, 2), (2, 0)]);
        let mut scc = tarjan(&graph, &mut no_logging![]);
        assert_eq!(scc.num_components(), 1);
        assert_eq!(scc.sort_by_size(), vec![3]);
    }

    #[test]
    fn test_mixed_graph() {
        let graph = VecGraph::from_arcs([(0, 1), (1, 2), (2, 0), (1, 3)]);
        let mut scc = tarjan(&graph, &mut no_logging![]);
        scc.sort_by_size();
        assert_eq!(scc.compute_sizes(), vec![3, 1]);
        assert_eq!(scc.components(), &[0, 0, 0, 1]);
    }

    #[test]
    fn test_dag_has_singleton_components() {
        let graph = VecGraph::from_arcs([(0, 1), (1, 2), (0, 2)]);
        let scc = tarjan(&graph, &mut no_logging![]);
        assert_eq!(scc.num_components(), 3);
    }
}
