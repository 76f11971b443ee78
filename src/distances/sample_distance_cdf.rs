//! Estimates the neighbourhood function of a strongly connected graph from a handful of sampled
//! breadth-first visits, with a jackknife estimate of the sampling error, instead of running one
//! visit per node like [`crate::distances::neighbourhood_function::compute_exact`].
//!
//! Each sample's visit yields `cutPoints[d]`, the number of nodes within distance `d` of the
//! sampled source; scaling by `n` (the number of nodes) turns the average over samples into an
//! unbiased estimator of the neighbourhood function, since a uniformly sampled source's expected
//! reach at distance `d` is `NF(d) / n`.
//!
//! Since `k` is typically small and each visit can span the whole graph, every sample's BFS
//! itself runs in parallel via [`crate::visits::bfv::ParallelBreadthFirstVisitFastCB`] rather
//! than sequentially: the per-distance node counts accumulate into `AtomicUsize` cells indexed by
//! distance, cheap since rounds of the frontier-swap visit are already synchronized barriers (no
//! two rounds ever touch a cell concurrently).

use crate::visits::bfv::{Args, ParVisit, ParallelBreadthFirstVisitFastCBBuilder};
use dsi_progress_logger::{no_logging, ProgressLog};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::atomic::{AtomicUsize, Ordering};
use webgraph::traits::RandomAccessGraph;

/// The result of [`sample_distance_cdf`]: a neighbourhood-function estimate together with a
/// per-distance jackknife standard error.
#[derive(Debug, Clone)]
pub struct SampleDistanceCdf {
    /// `nf_estimate[d]` estimates the number of node pairs at distance `<= d`.
    pub nf_estimate: Vec<f64>,
    /// The delete-one jackknife standard error of `nf_estimate[d]`.
    pub nf_stderr: Vec<f64>,
}

fn cut_points(graph: &(impl RandomAccessGraph + Sync), source: usize) -> (Vec<usize>, usize) {
    // A BFS can never reach farther than `num_nodes - 1` hops, so this is a safe upper bound on
    // how many distinct distances the visit below can produce.
    let num_distances = graph.num_nodes().max(1);
    let count_at_distance: Vec<AtomicUsize> = (0..num_distances).map(|_| AtomicUsize::new(0)).collect();
    count_at_distance[0].store(1, Ordering::Relaxed); // the source itself, at distance 0
    let farthest = AtomicUsize::new(source);

    // Rounds of the frontier-swap visit are synchronized barriers (the next round only starts
    // once every worker from the current one has returned), so every node discovered in the same
    // round carries the same `args.distance` and no two rounds ever touch the same cell at once.
    let mut visit = ParallelBreadthFirstVisitFastCBBuilder::new(graph).build();
    visit.visit_from_node(
        source,
        |args: Args| {
            if args.node == source {
                return;
            }
            count_at_distance[args.distance].fetch_add(1, Ordering::Relaxed);
            farthest.store(args.node, Ordering::Relaxed);
        },
        |_| true,
        &mut no_logging![],
    );

    let farthest = farthest.load(Ordering::Relaxed);
    let max_distance = count_at_distance
        .iter()
        .enumerate()
        .rev()
        .find(|(_, c)| c.load(Ordering::Relaxed) > 0)
        .map(|(d, _)| d)
        .unwrap_or(0);

    let mut cumulative = 0;
    let cut_points = count_at_distance[..=max_distance]
        .iter()
        .map(|count| {
            cumulative += count.load(Ordering::Relaxed);
            cumulative
        })
        .collect();

    (cut_points, farthest)
}

/// Estimates the neighbourhood function of `graph` (assumed strongly connected) from `k` sampled
/// breadth-first visits.
///
/// The first source is picked uniformly at random; each subsequent source is the farthest node
/// reached by the previous sample's visit, a heuristic that empirically covers the diameter
/// better than independent uniform sampling on small graphs. `seed` makes the sampling
/// reproducible.
pub fn sample_distance_cdf(
    graph: impl RandomAccessGraph + Sync,
    k: usize,
    seed: u64,
    pl: &mut impl ProgressLog,
) -> SampleDistanceCdf {
    let num_nodes = graph.num_nodes();
    let mut rng = StdRng::seed_from_u64(seed);

    pl.item_name("sample");
    pl.expected_updates(Some(k));
    pl.start("Sampling distance distribution...");

    let mut samples: Vec<Vec<f64>> = Vec::with_capacity(k);
    let mut max_len = 0;
    let mut source = rng.gen_range(0..num_nodes.max(1));

    for _ in 0..k {
        let (cut_points, farthest) = cut_points(&graph, source);
        max_len = max_len.max(cut_points.len());
        samples.push(cut_points.into_iter().map(|c| c as f64 * num_nodes as f64).collect());
        source = farthest;
        pl.light_update();
    }
    pl.done();

    for sample in samples.iter_mut() {
        let last = *sample.last().unwrap_or(&0.0);
        sample.resize(max_len, last);
    }

    let k_f = k as f64;
    let mut nf_estimate = vec![0.0; max_len];
    for sample in &samples {
        for (d, &value) in sample.iter().enumerate() {
            nf_estimate[d] += value / k_f;
        }
    }

    let mut nf_stderr = vec![0.0; max_len];
    if k > 1 {
        for d in 0..max_len {
            let total: f64 = samples.iter().map(|s| s[d]).sum();
            let mut loo_variance = 0.0;
            for sample in &samples {
                let loo_mean = (total - sample[d]) / (k_f - 1.0);
                loo_variance += (loo_mean - nf_estimate[d]).powi(2);
            }
            nf_stderr[d] = ((k_f - 1.0) / k_f * loo_variance).sqrt();
        }
    }

    SampleDistanceCdf {
        nf_estimate,
        nf_stderr,
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use dsi_progress_logger::no_logging;
    use webgraph::graphs::vec_graph::VecGraph;

    fn bidirectional_cycle(n: usize) -> VecGraph {
        let mut arcs = Vec::new();
        for i in 0..n {
            arcs.push((i, (i + 1) % n));
            arcs.push(((i + 1) % n, i));
        }
        VecGraph::from_arcs(arcs)
    }

    #[test]
    fn test_estimate_is_monotone_and_plausible_on_cycle() {
        let graph = bidirectional_cycle(20);
        let result = sample_distance_cdf(&graph, 10, 42, &mut no_logging![]);
        assert!(!result.nf_estimate.is_empty());
        for window in result.nf_estimate.windows(2) {
            assert!(window[1] >= window[0] - 1e-9);
        }
        let max_pairs = (graph.num_nodes() * graph.num_nodes()) as f64;
        assert!(*result.nf_estimate.last().unwrap() <= max_pairs + 1e-6);
    }

    #[test]
    fn test_single_sample_has_zero_stderr() {
        let graph = bidirectional_cycle(10);
        let result = sample_distance_cdf(&graph, 1, 7, &mut no_logging![]);
        assert!(result.nf_stderr.iter().all(|&e| e == 0.0));
    }

    #[test]
    fn test_cut_points_on_directed_line_matches_hand_computation() {
        // 0 -> 1 -> 2 -> 3: from node 0, one node at each of distances 1, 2 and 3.
        let graph = VecGraph::from_arcs([(0, 1), (1, 2), (2, 3)]);
        let (cut_points, farthest) = cut_points(&graph, 0);
        assert_eq!(cut_points, vec![1, 2, 3, 4]);
        assert_eq!(farthest, 3);
    }
}
