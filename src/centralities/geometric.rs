//! Exact geometric centralities (closeness, Lin, harmonic, exponential) computed by one BFS per
//! source node, plus the generic [`linear_geometric_centrality`] they are all special cases of.

use crate::visits::bfv::{Args, SeqBreadthFirstVisit, SeqVisit};
use dsi_progress_logger::ProgressLog;
use webgraph::traits::RandomAccessGraph;

/// Closeness, Lin, harmonic and exponential centrality of every node of `graph`, computed
/// together since they all derive from the same per-source BFS.
///
/// Centralities reflect outbound distances; pass the transpose to obtain the "negative" variant.
#[derive(Debug, Clone)]
pub struct GeometricCentralities {
    /// `1 / (sum of distances to reachable nodes)`, or `0` if no node is reachable.
    pub closeness: Box<[f64]>,
    /// `(number of reachable nodes)^2 / (sum of distances)`, or `1` if no node is reachable.
    pub lin: Box<[f64]>,
    /// Sum of `1 / distance` over reachable nodes.
    pub harmonic: Box<[f64]>,
    /// Sum of `alpha^distance` over reachable nodes, for the `alpha` passed to
    /// [`geometric_centralities`].
    pub exponential: Box<[f64]>,
}

/// Computes [`GeometricCentralities`] for every node of `graph`, using `alpha` (0 < alpha < 1)
/// as the base of the exponential centrality.
pub fn geometric_centralities(
    graph: impl RandomAccessGraph,
    alpha: f64,
    pl: &mut impl ProgressLog,
) -> GeometricCentralities {
    debug_assert!(alpha > 0.0 && alpha < 1.0);

    let num_nodes = graph.num_nodes();
    let mut closeness = vec![0.0_f64; num_nodes];
    let mut lin = vec![1.0_f64; num_nodes];
    let mut harmonic = vec![0.0_f64; num_nodes];
    let mut exponential = vec![0.0_f64; num_nodes];

    pl.item_name("source");
    pl.expected_updates(Some(num_nodes));
    pl.start("Computing geometric centralities...");

    let mut visit = SeqBreadthFirstVisit::new(&graph);
    for s in 0..num_nodes {
        visit.reset();

        let mut sum_dist = 0.0_f64;
        let mut reachable = 0.0_f64;
        let mut harmonic_s = 0.0_f64;
        let mut exponential_s = 0.0_f64;

        visit.visit_from_node(
            s,
            |args: Args| {
                if args.node == s {
                    return;
                }
                let d = args.distance as f64;
                sum_dist += d;
                reachable += 1.0;
                harmonic_s += 1.0 / d;
                exponential_s += alpha.powf(d);
            },
            |_| true,
            &mut dsi_progress_logger::no_logging!(),
        );

        closeness[s] = if sum_dist == 0.0 { 0.0 } else { 1.0 / sum_dist };
        lin[s] = if sum_dist == 0.0 {
            1.0
        } else {
            // The reached set counted here includes `s` itself (distance 0 contributes nothing
            // to `sum_dist` but does count towards the set's size).
            let reached = reachable + 1.0;
            reached * reached / sum_dist
        };
        harmonic[s] = harmonic_s;
        exponential[s] = exponential_s;

        pl.light_update();
    }

    pl.done();

    GeometricCentralities {
        closeness: closeness.into_boxed_slice(),
        lin: lin.into_boxed_slice(),
        harmonic: harmonic.into_boxed_slice(),
        exponential: exponential.into_boxed_slice(),
    }
}

/// Computes a generic distance-coefficient centrality: for every node `s`, the sum of
/// `coefficient(distance(s, t))` over every node `t` reachable from `s`, `t != s`.
///
/// `coefficient(d) = 1.0 / d as f64` recovers harmonic centrality; `coefficient(d) =
/// alpha.powi(d)` recovers exponential centrality; `coefficient(d) = -(d as f64)` gives negative
/// peripherality.
pub fn linear_geometric_centrality(
    graph: impl RandomAccessGraph,
    coefficient: impl Fn(usize) -> f64,
    pl: &mut impl ProgressLog,
) -> Box<[f64]> {
    let num_nodes = graph.num_nodes();
    let mut result = vec![0.0_f64; num_nodes];

    pl.item_name("source");
    pl.expected_updates(Some(num_nodes));
    pl.start("Computing linear geometric centrality...");

    let mut visit = SeqBreadthFirstVisit::new(&graph);
    for s in 0..num_nodes {
        visit.reset();
        let mut acc = 0.0_f64;

        visit.visit_from_node(
            s,
            |args: Args| {
                if args.node != s {
                    acc += coefficient(args.distance);
                }
            },
            |_| true,
            &mut dsi_progress_logger::no_logging!(),
        );

        result[s] = acc;
        pl.light_update();
    }

    pl.done();
    result.into_boxed_slice()
}

#[cfg(test)]
mod test {
    use super::*;
    use dsi_progress_logger::no_logging;
    use webgraph::graphs::vec_graph::VecGraph;

    #[test]
    fn test_path_closeness_and_harmonic() {
        let graph = VecGraph::from_arcs([(0, 1), (1, 0), (1, 2), (2, 1)]);
        let c = geometric_centralities(&graph, 0.5, &mut no_logging![]);
        // node 1 reaches 0 and 2, both at distance 1: sum_dist = 2.
        assert_eq!(c.closeness[1], 0.5);
        assert_eq!(c.harmonic[1], 2.0);
        // node 1 reaches 3 nodes including itself (0, 1, 2), sum_dist = 2: lin = 9/2.
        assert_eq!(c.lin[1], 9.0 / 2.0);
    }

    #[test]
    fn test_isolated_node_has_zero_closeness() {
        let mut graph = VecGraph::empty(2);
        graph.add_arc(0, 1);
        let c = geometric_centralities(&graph, 0.5, &mut no_logging![]);
        assert_eq!(c.closeness[1], 0.0);
        assert_eq!(c.lin[1], 1.0);
    }

    #[test]
    fn test_linear_geometric_matches_harmonic() {
        let graph = VecGraph::from_arcs([(0, 1), (1, 0), (1, 2), (2, 1)]);
        let harmonic = linear_geometric_centrality(&graph, |d| 1.0 / d as f64, &mut no_logging![]);
        let c = geometric_centralities(&graph, 0.5, &mut no_logging![]);
        assert_eq!(&*harmonic, &*c.harmonic);
    }

    #[test]
    fn test_transpose_of_directed_path_matches_hand_computation() {
        // 0 -> 1 -> 2, transposed: node 2 reaches 1 at distance 1 and 0 at distance 2; node 1
        // reaches only 0 at distance 1; node 0 reaches nothing.
        let transpose = VecGraph::from_arcs([(1, 0), (2, 1)]);
        let c = geometric_centralities(&transpose, 0.5, &mut no_logging![]);
        assert_eq!(&*c.harmonic, &[0.0, 1.0, 1.5]);
        assert_eq!(&*c.closeness, &[0.0, 1.0, 1.0 / 3.0]);
        assert_eq!(&*c.lin, &[1.0, 4.0, 3.0]);
    }
}
