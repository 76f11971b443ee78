//! Exact computation of eccentricities, radius and diameter via the ExactSumSweep algorithm.
//!
//! The algorithm (Borassi, Crescenzi, Habib, Kosters, Marino, Takes, "On computing the diameter
//! of real-world undirected graphs") adaptively mixes full breadth-first sweeps with strongly-
//! connected-component pivot propagation, converging to exact answers much faster than computing
//! every eccentricity independently. [`Level`] selects how much of the result is actually needed,
//! since computing only the radius or only the diameter can stop far earlier than computing every
//! eccentricity.
//!
//! # Examples
//!
//! ```
//! use graph_kernels::distances::exact_sum_sweep::{self, Level};
//! use dsi_progress_logger::no_logging;
//! use webgraph::graphs::vec_graph::VecGraph;
//!
//! let graph = VecGraph::from_arcs([(0, 1), (1, 2), (2, 3), (3, 0)]);
//! let transpose = VecGraph::from_arcs([(1, 0), (2, 1), (3, 2), (0, 3)]);
//! let result = exact_sum_sweep::RadiusDiameter::run(&graph, &transpose, None, &mut no_logging![]);
//! assert_eq!(result.diameter, 3);
//! assert_eq!(result.radius, 2);
//! ```

mod computer;
mod level;
mod outputs;
mod outputs_symm;
mod scc_graph;

pub use level::*;
pub use outputs as directed;
pub use outputs_symm as undirected;

#[cfg(test)]
mod test {
    use super::*;
    use dsi_progress_logger::no_logging;
    use webgraph::graphs::vec_graph::VecGraph;

    fn cycle4() -> (VecGraph, VecGraph) {
        (
            VecGraph::from_arcs([(0, 1), (1, 2), (2, 3), (3, 0)]),
            VecGraph::from_arcs([(1, 0), (2, 1), (3, 2), (0, 3)]),
        )
    }

    #[test]
    fn test_radius_diameter_on_directed_cycle() {
        let (graph, transpose) = cycle4();
        let result = RadiusDiameter::run(&graph, &transpose, None, &mut no_logging![]);
        assert_eq!(result.diameter, 3);
        assert_eq!(result.radius, 3);
    }

    #[test]
    fn test_all_matches_brute_force_bfs_on_small_dag() {
        let graph = VecGraph::from_arcs([(0, 1), (0, 2), (1, 3), (2, 3)]);
        let transpose = VecGraph::from_arcs([(1, 0), (2, 0), (3, 1), (3, 2)]);
        let result = All::run(&graph, &transpose, None, &mut no_logging![]);
        assert_eq!(&*result.forward_eccentricities, &[2, 1, 1, 0]);
    }

    #[test]
    fn test_run_symm_on_path() {
        let graph = VecGraph::from_arcs([(0, 1), (1, 0), (1, 2), (2, 1), (2, 3), (3, 2)]);
        let result = All::run_symm(&graph, &mut no_logging![]);
        assert_eq!(result.diameter, 3);
        assert_eq!(result.radius, 2);
        assert_eq!(&*result.eccentricities, &[3, 2, 2, 3]);
    }

    fn brute_force_eccentricities(graph: &VecGraph) -> Vec<usize> {
        let num_nodes = graph.num_nodes();
        let mut eccentricities = vec![0usize; num_nodes];
        for s in 0..num_nodes {
            let mut distance = vec![usize::MAX; num_nodes];
            let mut queue = std::collections::VecDeque::new();
            distance[s] = 0;
            queue.push_back(s);
            while let Some(u) = queue.pop_front() {
                for v in graph.successors(u) {
                    if distance[v] == usize::MAX {
                        distance[v] = distance[u] + 1;
                        queue.push_back(v);
                    }
                }
            }
            eccentricities[s] = distance.iter().copied().filter(|&d| d != usize::MAX).max().unwrap_or(0);
        }
        eccentricities
    }

    #[test]
    fn test_all_matches_brute_force_on_random_graphs() {
        use rand::rngs::StdRng;
        use rand::{Rng, SeedableRng};

        let mut rng = StdRng::seed_from_u64(0xe55_e55);
        for trial in 0..10 {
            let num_nodes = 5 + trial % 20;
            let mut arcs = Vec::new();
            for u in 0..num_nodes {
                for v in 0..num_nodes {
                    if u != v && rng.gen_bool(0.15) {
                        arcs.push((u, v));
                    }
                }
            }
            let graph = VecGraph::from_arcs(arcs.iter().copied());
            let transpose = VecGraph::from_arcs(arcs.iter().map(|&(u, v)| (v, u)));

            let result = All::run(&graph, &transpose, None, &mut no_logging![]);
            let expected = brute_force_eccentricities(&graph);

            for node in 0..num_nodes {
                assert_eq!(
                    result.forward_eccentricities[node], expected[node],
                    "trial {trial}, node {node}: expected eccentricity {}",
                    expected[node]
                );
            }
        }
    }

    #[test]
    fn test_run_symm_on_three_node_path() {
        let graph = VecGraph::from_arcs([(0, 1), (1, 0), (1, 2), (2, 1)]);
        let result = All::run_symm(&graph, &mut no_logging![]);
        assert_eq!(result.radius, 1);
        assert_eq!(result.radial_vertex, 1);
        assert_eq!(result.diameter, 2);
        assert_eq!(&*result.eccentricities, &[2, 1, 2]);
    }

    #[test]
    fn test_diameter_only_matches_all() {
        let (graph, transpose) = cycle4();
        let all = All::run(&graph, &transpose, None, &mut no_logging![]);
        let diameter_only = Diameter::run(&graph, &transpose, None, &mut no_logging![]);
        assert_eq!(all.diameter, diameter_only.diameter);
    }

    #[test]
    fn test_run_symm_on_four_legged_spider() {
        // Node 0 is the hub; 1..=4 are the middle ring, 5..=8 the leaves, one per leg
        // (leg i: 0 - (i+1) - (i+5)). 9 nodes total.
        let graph = VecGraph::from_arcs([
            (0, 1), (1, 0),
            (0, 2), (2, 0),
            (0, 3), (3, 0),
            (0, 4), (4, 0),
            (1, 5), (5, 1),
            (2, 6), (6, 2),
            (3, 7), (7, 3),
            (4, 8), (8, 4),
        ]);
        let result = All::run_symm(&graph, &mut no_logging![]);
        assert_eq!(result.radius, 2);
        assert_eq!(result.radial_vertex, 0);
        assert_eq!(result.diameter, 4);
        for leaf in 5..=8 {
            assert_eq!(result.eccentricities[leaf], 4);
        }
        for middle in 1..=4 {
            assert_eq!(result.eccentricities[middle], 3);
        }
    }
}
