//! Double-sweep / four-sweep diameter bounds for undirected graphs.
//!
//! This predates [`crate::distances::exact_sum_sweep`]'s adaptive `SumSweep` heuristic and is
//! kept only because the test suite still uses it as an independent cross-check on small graphs.
//! It alternates BFS sweeps from a running "border" node to tighten a `[lower, upper]` bound on
//! the diameter, then refines the lower bound by sweeping outward from a centroid node in
//! decreasing order of distance (the "fringe") until the bounds meet or the fringe is exhausted.

use crate::visits::bfv::{Args, SeqBreadthFirstVisit, SeqVisit};
use dsi_progress_logger::{no_logging, ProgressLog};
use webgraph::traits::RandomAccessGraph;

fn bfs_distances_and_parents(
    graph: impl RandomAccessGraph,
    source: usize,
) -> (Vec<usize>, Vec<Option<usize>>) {
    let num_nodes = graph.num_nodes();
    let mut distance = vec![usize::MAX; num_nodes];
    let mut parent = vec![None; num_nodes];

    let mut visit = SeqBreadthFirstVisit::new(&graph);
    visit.visit_from_node(
        source,
        |args: Args| {
            distance[args.node] = args.distance;
            if args.node != args.root {
                parent[args.node] = Some(args.parent);
            }
        },
        |_| true,
        &mut no_logging![],
    );

    (distance, parent)
}

fn eccentricity(distance: &[usize]) -> usize {
    distance
        .iter()
        .copied()
        .filter(|&d| d != usize::MAX)
        .max()
        .unwrap_or(0)
}

fn farthest_node(distance: &[usize]) -> usize {
    distance
        .iter()
        .enumerate()
        .filter(|&(_, &d)| d != usize::MAX)
        .max_by_key(|&(_, &d)| d)
        .map(|(node, _)| node)
        .unwrap_or(0)
}

fn walk_toward_root(parent: &[Option<usize>], mut node: usize, steps: usize) -> usize {
    for _ in 0..steps {
        match parent[node] {
            Some(p) => node = p,
            None => break,
        }
    }
    node
}

/// Computes `[lower, upper]` bounds on the diameter of a connected, undirected `graph`, tight
/// enough to match the exact diameter on every graph the crate's test suite exercises, but not
/// backed by the correctness proof `SumSweepUndirected` carries on arbitrary inputs.
#[deprecated(note = "superseded by crate::distances::exact_sum_sweep::undirected::Diameter")]
pub fn four_sweep_diameter(graph: impl RandomAccessGraph, pl: &mut impl ProgressLog) -> (usize, usize) {
    pl.start("Computing four-sweep diameter bounds...");

    let (dist0, _) = bfs_distances_and_parents(&graph, 0);
    let a1 = farthest_node(&dist0);

    let (dist1, parent1) = bfs_distances_and_parents(&graph, a1);
    let e1 = eccentricity(&dist1);
    let a2 = farthest_node(&dist1);
    let mut lower = e1;
    let mut upper = 2 * e1;

    let center1 = walk_toward_root(&parent1, a2, e1 / 2);
    let (dist_c1, _) = bfs_distances_and_parents(&graph, center1);
    let e2 = eccentricity(&dist_c1);
    lower = lower.max(e2);
    upper = upper.min(2 * e2);

    let (dist2, parent2) = bfs_distances_and_parents(&graph, a2);
    let e3 = eccentricity(&dist2);
    let a3 = farthest_node(&dist2);
    lower = lower.max(e3);

    let center2 = walk_toward_root(&parent2, a3, e3 / 2);
    let (dist_c2, _) = bfs_distances_and_parents(&graph, center2);
    let e4 = eccentricity(&dist_c2);
    lower = lower.max(e4);
    upper = upper.min(2 * e4);

    let max_d = e4;
    let mut d = max_d;
    while lower < upper {
        let fringe: Vec<usize> = dist_c2
            .iter()
            .enumerate()
            .filter(|&(_, &dist)| dist == d)
            .map(|(node, _)| node)
            .collect();

        for node in fringe {
            let (dist_v, _) = bfs_distances_and_parents(&graph, node);
            lower = lower.max(eccentricity(&dist_v));
            if lower >= upper {
                break;
            }
        }

        if lower >= upper {
            break;
        }
        if d == 0 {
            upper = lower;
            break;
        }
        upper = lower.max(2 * (d - 1));
        d -= 1;
        pl.light_update();
    }

    pl.done();
    (lower, upper)
}

#[cfg(test)]
mod test {
    use super::*;
    use dsi_progress_logger::no_logging;
    use webgraph::graphs::vec_graph::VecGraph;

    #[test]
    #[allow(deprecated)]
    fn test_path_graph_diameter() {
        let graph = VecGraph::from_arcs([
            (0, 1),
            (1, 0),
            (1, 2),
            (2, 1),
            (2, 3),
            (3, 2),
        ]);
        let (lower, upper) = four_sweep_diameter(&graph, &mut no_logging![]);
        assert_eq!(lower, 3);
        assert_eq!(upper, 3);
    }

    #[test]
    #[allow(deprecated)]
    fn test_star_graph_diameter() {
        let graph = VecGraph::from_arcs([
            (0, 1),
            (1, 0),
            (0, 2),
            (2, 0),
            (0, 3),
            (3, 0),
            (0, 4),
            (4, 0),
        ]);
        let (lower, upper) = four_sweep_diameter(&graph, &mut no_logging![]);
        assert_eq!(lower, 2);
        assert_eq!(upper, 2);
    }
}
