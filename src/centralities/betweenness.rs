//! Brandes' algorithm for exact betweenness centrality.
//!
//! Unlike a tree-following breadth-first visit, betweenness needs every arc that lies on a
//! shortest path, not just the one that first discovers each node, so this runs its own BFS
//! loop rather than reusing [`crate::visits::bfv`].
//!
//! Sources are independent of one another, so rather than reusing the within-visit frontier
//! parallelism of [`crate::visits::bfv`], every thread of the current `rayon` pool claims sources
//! one at a time from a shared atomic cursor and runs Brandes' algorithm on them sequentially,
//! in the same broadcast-and-claim idiom `ExactSumSweep` uses to spread pivot BFSes across
//! threads. Each thread accumulates into a private array and folds it into the shared result
//! behind a mutex only once, when it runs dry.

use crate::error::KernelError;
use anyhow::Result;
use dsi_progress_logger::ProgressLog;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use webgraph::traits::RandomAccessGraph;

/// Computes the betweenness centrality of every node of `graph`, running one Brandes BFS per
/// source node, spread across the current `rayon` thread pool.
///
/// Centralities reflect outbound paths; pass the transpose to obtain the "negative" (inbound)
/// variant described by [`crate::centralities`]'s module documentation.
///
/// # Errors
/// Returns [`KernelError::InvariantViolation`] if the number of shortest paths to some node
/// overflows a `u64`, which can only happen on graphs with an astronomical number of equal-length
/// shortest paths between some pair of nodes.
pub fn betweenness(graph: impl RandomAccessGraph + Sync, pl: &mut impl ProgressLog) -> Result<Box<[f64]>> {
    let num_nodes = graph.num_nodes();
    let shared = Mutex::new(vec![0.0_f64; num_nodes]);
    let next_source = AtomicUsize::new(0);
    let completed = AtomicUsize::new(0);
    let error: Mutex<Option<KernelError>> = Mutex::new(None);

    pl.item_name("source");
    pl.expected_updates(Some(num_nodes));
    pl.start("Computing betweenness centrality...");

    rayon::broadcast(|_| {
        let mut local = vec![0.0_f64; num_nodes];
        let mut distance = vec![-1_i64; num_nodes];
        let mut sigma = vec![0_u64; num_nodes];
        let mut delta = vec![0.0_f64; num_nodes];
        let mut queue = VecDeque::new();
        let mut order = Vec::with_capacity(num_nodes);

        loop {
            if error.lock().unwrap().is_some() {
                break;
            }
            let s = next_source.fetch_add(1, Ordering::Relaxed);
            if s >= num_nodes {
                break;
            }

            distance.iter_mut().for_each(|d| *d = -1);
            sigma.iter_mut().for_each(|v| *v = 0);
            delta.iter_mut().for_each(|v| *v = 0.0);
            queue.clear();
            order.clear();

            distance[s] = 0;
            sigma[s] = 1;
            queue.push_back(s);

            let mut overflowed = false;
            'bfs: while let Some(u) = queue.pop_front() {
                order.push(u);
                let du = distance[u];
                for t in graph.successors(u) {
                    if distance[t] < 0 {
                        distance[t] = du + 1;
                        queue.push_back(t);
                    }
                    if distance[t] == du + 1 {
                        match sigma[t].checked_add(sigma[u]) {
                            Some(sum) => sigma[t] = sum,
                            None => {
                                *error.lock().unwrap() = Some(KernelError::InvariantViolation(format!(
                                    "number of shortest paths to node {t} overflowed a 64-bit counter"
                                )));
                                overflowed = true;
                                break 'bfs;
                            }
                        }
                    }
                }
            }
            if overflowed {
                break;
            }

            for &u in order.iter().rev() {
                for t in graph.successors(u) {
                    if distance[t] == distance[u] + 1 && sigma[t] > 0 {
                        delta[u] += (sigma[u] as f64 / sigma[t] as f64) * (1.0 + delta[t]);
                    }
                }
                if u != s {
                    local[u] += delta[u];
                }
            }

            completed.fetch_add(1, Ordering::Relaxed);
        }

        let mut shared = shared.lock().unwrap();
        for (acc, value) in shared.iter_mut().zip(local.iter()) {
            *acc += value;
        }
    });

    pl.update_with_count(completed.load(Ordering::Relaxed));
    pl.done();

    if let Some(err) = error.into_inner().unwrap() {
        return Err(err.into());
    }

    Ok(shared.into_inner().unwrap().into_boxed_slice())
}

#[cfg(test)]
mod test {
    use super::*;
    use dsi_progress_logger::no_logging;
    use webgraph::graphs::vec_graph::VecGraph;

    #[test]
    fn test_path_graph_middle_node_is_most_central() {
        // 0 -> 1 -> 2, symmetrized.
        let graph = VecGraph::from_arcs([(0, 1), (1, 0), (1, 2), (2, 1)]);
        let b = betweenness(&graph, &mut no_logging![]).unwrap();
        assert_eq!(b[0], 0.0);
        assert_eq!(b[2], 0.0);
        assert!(b[1] > 0.0);
    }

    #[test]
    fn test_no_paths_through_leaves_of_star() {
        let graph = VecGraph::from_arcs([
            (0, 1),
            (1, 0),
            (0, 2),
            (2, 0),
            (0, 3),
            (3, 0),
        ]);
        let b = betweenness(&graph, &mut no_logging![]).unwrap();
        assert!(b[0] > 0.0);
        assert_eq!(b[1], 0.0);
        assert_eq!(b[2], 0.0);
        assert_eq!(b[3], 0.0);
    }

    #[test]
    fn test_lozenge_betweenness_matches_hand_computation() {
        let graph = VecGraph::from_arcs([(0, 1), (1, 0), (0, 2), (2, 0), (1, 3), (3, 1), (2, 3), (3, 2)]);
        let b = betweenness(&graph, &mut no_logging![]).unwrap();
        assert_eq!(b[0], 0.0);
        assert_eq!(b[1], 0.5);
        assert_eq!(b[2], 0.5);
        assert_eq!(b[3], 0.0);
    }

    #[test]
    fn test_directed_cycle_betweenness_is_uniform() {
        let n = 6;
        let arcs: Vec<_> = (0..n).map(|i| (i, (i + 1) % n)).collect();
        let graph = VecGraph::from_arcs(arcs);
        let b = betweenness(&graph, &mut no_logging![]).unwrap();
        let expected = ((n - 1) * (n - 2) / 2) as f64;
        for &value in b.iter() {
            assert_eq!(value, expected);
        }
    }

    /// A chain of "diamond" gadgets (two parallel length-2 branches per stage) doubles the
    /// number of shortest paths to its final hub at every stage, letting us hit a u64 overflow
    /// at a hand-verified, exact stage count instead of guessing at a construction.
    fn diamond_chain(stages: usize) -> VecGraph {
        let mut arcs = Vec::new();
        let mut hub = 0usize;
        let mut next_id = 1usize;
        for _ in 0..stages {
            let b1 = next_id;
            let b2 = next_id + 1;
            let next_hub = next_id + 2;
            arcs.push((hub, b1));
            arcs.push((hub, b2));
            arcs.push((b1, next_hub));
            arcs.push((b2, next_hub));
            hub = next_hub;
            next_id += 3;
        }
        VecGraph::from_arcs(arcs)
    }

    #[test]
    fn test_path_count_overflow_detected_at_64_doublings_not_63() {
        // sigma at the final hub is 2^stages; 2^63 fits a u64, 2^64 does not.
        assert!(betweenness(&diamond_chain(63), &mut no_logging![]).is_ok());
        assert!(betweenness(&diamond_chain(64), &mut no_logging![]).is_err());
    }
}
