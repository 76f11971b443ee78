//! The neighbourhood function `NF(d)` (the number of pairs of nodes at distance at most `d`) and
//! the distance-distribution analytics derived from it: CDF, PMF, average distance, median
//! distance, harmonic diameter, effective diameter and the shortest-path index of dispersion
//! (spid).
//!
//! [`compute_exact`] computes `NF` exactly by running one breadth-first visit per source;
//! [`crate::distances::hyperball`] computes an approximation of the same curve without visiting
//! every node. Both produce a plain `Vec<f64>` that the derivative functions below accept.

use crate::visits::bfv::{Args, SeqBreadthFirstVisit, SeqVisit};
use dsi_progress_logger::ProgressLog;
use webgraph::traits::RandomAccessGraph;

/// Computes the exact neighbourhood function of `graph`: `NF[d]` is the number of ordered pairs
/// `(s, t)` with `distance(s, t) <= d`, `s != t` included via `NF[0] = n` (every node reaches
/// itself at distance 0).
///
/// The returned vector has one entry per distance from 0 up to the eccentricity of the graph;
/// trailing entries are omitted once the curve stops growing (every further value would repeat
/// the last one).
pub fn compute_exact(graph: impl RandomAccessGraph, pl: &mut impl ProgressLog) -> Vec<f64> {
    let num_nodes = graph.num_nodes();
    let mut count_at_distance: Vec<u64> = vec![0; 1];
    count_at_distance[0] = num_nodes as u64;

    pl.item_name("source");
    pl.expected_updates(Some(num_nodes));
    pl.start("Computing exact neighbourhood function...");

    let mut visit = SeqBreadthFirstVisit::new(&graph);
    for s in 0..num_nodes {
        visit.reset();
        visit.visit_from_node(
            s,
            |args: Args| {
                if args.node == s {
                    return;
                }
                if count_at_distance.len() <= args.distance {
                    count_at_distance.resize(args.distance + 1, 0);
                }
                count_at_distance[args.distance] += 1;
            },
            |_| true,
            &mut dsi_progress_logger::no_logging!(),
        );
        pl.light_update();
    }
    pl.done();

    let mut nf = Vec::with_capacity(count_at_distance.len());
    let mut cumulative = 0.0_f64;
    for count in count_at_distance {
        cumulative += count as f64;
        nf.push(cumulative);
    }
    nf
}

/// `CDF(NF)[d] = NF[d] / NF[last]`, the fraction of reachable pairs covered by distance `d`.
pub fn cdf(nf: &[f64]) -> Vec<f64> {
    let total = *nf.last().unwrap_or(&0.0);
    if total == 0.0 {
        return vec![0.0; nf.len()];
    }
    nf.iter().map(|&value| value / total).collect()
}

/// `PMF(NF)[d] = (NF[d] - NF[d-1]) / NF[last]` (with `NF[-1] := 0`), the fraction of reachable
/// pairs whose distance is exactly `d`.
pub fn pmf(nf: &[f64]) -> Vec<f64> {
    let total = *nf.last().unwrap_or(&0.0);
    if total == 0.0 {
        return vec![0.0; nf.len()];
    }
    let mut result = Vec::with_capacity(nf.len());
    let mut previous = 0.0;
    for &value in nf {
        result.push((value - previous) / total);
        previous = value;
    }
    result
}

/// The average distance `sum(d * PMF(NF)[d])`.
pub fn average_distance(nf: &[f64]) -> f64 {
    pmf(nf)
        .iter()
        .enumerate()
        .map(|(d, &p)| d as f64 * p)
        .sum()
}

/// The smallest `d` such that `NF[d] >= n * n / 2`, or `+inf` if the curve never reaches it.
pub fn median_distance(n: usize, nf: &[f64]) -> f64 {
    let target = (n * n) as f64 / 2.0;
    for (d, &value) in nf.iter().enumerate() {
        if value >= target {
            return d as f64;
        }
    }
    f64::INFINITY
}

/// `n * (n - 1) / sum(d > 0, (NF[d] - NF[d-1]) / d)`, the harmonic mean of the finite distances.
pub fn harmonic_diameter(n: usize, nf: &[f64]) -> f64 {
    let mut denom = 0.0_f64;
    let mut previous = if nf.is_empty() { 0.0 } else { nf[0] };
    for (d, &value) in nf.iter().enumerate().skip(1) {
        denom += (value - previous) / d as f64;
        previous = value;
    }
    if denom == 0.0 {
        return 0.0;
    }
    (n * (n - 1)) as f64 / denom
}

/// The effective diameter at `alpha` (the smallest interpolated distance covering an `alpha`
/// fraction of reachable pairs), linearly interpolating the inverse CDF between the two nearest
/// sample points.
pub fn effective_diameter(alpha: f64, nf: &[f64]) -> f64 {
    let distribution = cdf(nf);
    if distribution.is_empty() {
        return 0.0;
    }
    if distribution[0] >= alpha {
        return 0.0;
    }
    for d in 1..distribution.len() {
        if distribution[d] >= alpha {
            let (lo, hi) = (distribution[d - 1], distribution[d]);
            if hi == lo {
                return d as f64;
            }
            let fraction = (alpha - lo) / (hi - lo);
            return (d - 1) as f64 + fraction;
        }
    }
    (distribution.len() - 1) as f64
}

/// The shortest-path index of dispersion: `Var[d] / E[d]` of the distance distribution, a
/// dimensionless measure of how spread out distances are relative to their mean.
pub fn spid(nf: &[f64]) -> f64 {
    let weights = pmf(nf);
    let mean: f64 = weights
        .iter()
        .enumerate()
        .map(|(d, &p)| d as f64 * p)
        .sum();
    let second_moment: f64 = weights
        .iter()
        .enumerate()
        .map(|(d, &p)| (d as f64).powi(2) * p)
        .sum();
    let variance = second_moment - mean * mean;
    if mean == 0.0 {
        return 0.0;
    }
    variance / mean
}

#[cfg(test)]
mod test {
    use super::*;
    use dsi_progress_logger::no_logging;
    use webgraph::graphs::vec_graph::VecGraph;

    /// A complete binary in-tree: every non-root node has an arc to its parent, so breadth-first
    /// visits climb toward the root rather than fan out toward the leaves.
    fn complete_binary_in_tree(depth: usize) -> VecGraph {
        let num_nodes = (1 << (depth + 1)) - 1;
        let mut arcs = Vec::new();
        for node in 1..num_nodes {
            let parent = (node - 1) / 2;
            arcs.push((node, parent));
        }
        VecGraph::from_arcs(arcs)
    }

    #[test]
    fn test_exact_nf_on_complete_binary_tree() {
        let graph = complete_binary_in_tree(3);
        let nf = compute_exact(&graph, &mut no_logging![]);
        assert_eq!(nf, vec![15.0, 29.0, 41.0, 49.0]);
    }

    #[test]
    fn test_median_distance_on_clique() {
        let graph = VecGraph::from_arcs([(0, 1), (1, 0), (1, 2), (2, 1), (0, 2), (2, 0)]);
        let nf = compute_exact(&graph, &mut no_logging![]);
        assert_eq!(median_distance(3, &nf), 1.0);
    }

    #[test]
    fn test_effective_diameter_interpolates() {
        let nf = vec![4.0, 8.0, 10.0];
        // CDF = [0.4, 0.8, 1.0]; alpha=0.6 interpolates between d=0 (0.4) and d=1 (0.8).
        let ed = effective_diameter(0.6, &nf);
        assert!((ed - 0.5).abs() < 1e-9);
    }
}
