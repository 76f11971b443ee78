use graph_kernels::visits::bfv::{Args, ParallelBreadthFirstVisitFastCBBuilder, ParVisit, SeqBreadthFirstVisit, SeqVisit};
use dsi_progress_logger::no_logging;
use std::sync::atomic::{AtomicUsize, Ordering};
use webgraph::graphs::vec_graph::VecGraph;
use webgraph::traits::RandomAccessGraph;

fn correct_dists<G: RandomAccessGraph>(graph: &G, start: usize) -> Vec<usize> {
    let mut visited = vec![usize::MAX; graph.num_nodes()];
    let mut current_frontier = Vec::new();
    let mut next_frontier = Vec::new();

    for i in 0..graph.num_nodes() {
        let start_node = (i + start) % graph.num_nodes();
        if visited[start_node] != usize::MAX {
            continue;
        }
        let mut distance = 1;
        visited[start_node] = 0;
        current_frontier.push(start_node);

        while !current_frontier.is_empty() {
            for node in current_frontier {
                for succ in graph.successors(node) {
                    if visited[succ] == usize::MAX {
                        next_frontier.push(succ);
                        visited[succ] = distance;
                    }
                }
            }
            current_frontier = next_frontier;
            next_frontier = Vec::new();
            distance += 1;
        }
    }

    visited
}

fn test_graph() -> VecGraph {
    VecGraph::from_arcs([
        (0, 0),
        (1, 0),
        (1, 2),
        (2, 1),
        (2, 3),
        (2, 4),
        (2, 5),
        (3, 4),
        (4, 3),
        (5, 5),
        (5, 6),
        (5, 7),
        (5, 8),
        (6, 7),
        (8, 7),
    ])
}

#[test]
fn test_sequential_visit_matches_brute_force() {
    let graph = test_graph();
    let expected = correct_dists(&graph, 0);
    let mut visit = SeqBreadthFirstVisit::new(&graph);
    let mut actual = vec![usize::MAX; graph.num_nodes()];

    for root in 0..graph.num_nodes() {
        visit.visit_from_node(
            root,
            |args: Args| actual[args.node] = args.distance,
            |_| true,
            &mut no_logging![],
        );
        visit.reset();
    }

    assert_eq!(actual, expected);
}

#[test]
fn test_parallel_fast_cb_visit_matches_brute_force() {
    let graph = test_graph();
    let expected = correct_dists(&graph, 0);
    let dists: Vec<AtomicUsize> = (0..graph.num_nodes()).map(|_| AtomicUsize::new(usize::MAX)).collect();

    let mut visit = ParallelBreadthFirstVisitFastCBBuilder::new(&graph)
        .num_threads(2)
        .build();

    for root in 0..graph.num_nodes() {
        visit.visit_from_node(
            root,
            |args: Args| dists[args.node].store(args.distance, Ordering::Relaxed),
            |_| true,
            &mut no_logging![],
        );
        visit.reset();
    }

    let actual: Vec<usize> = dists.iter().map(|d| d.load(Ordering::Relaxed)).collect();
    assert_eq!(actual, expected);
}
