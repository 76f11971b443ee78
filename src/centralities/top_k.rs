//! The `k` most central nodes of a graph by harmonic, closeness or a caller-supplied linear
//! geometric centrality.
//!
//! A plain "run every source's BFS to completion, then sort and truncate" port would work but
//! wastes almost all of its time finishing BFSes whose source could never break into the current
//! top-`k`. Instead this precomputes, from the strongly-connected-component condensation, a
//! lower and upper bound on how many nodes any given source can possibly still reach
//! (`reach_l`/`reach_u`), and uses them during each BFS to bound how much centrality a source
//! could still accumulate from the nodes it hasn't discovered yet. Once that bound can no longer
//! beat the current k-th best score, the BFS aborts early instead of running to completion.

use crate::sccs::{tarjan, Sccs};
use dsi_progress_logger::ProgressLog;
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use webgraph::traits::RandomAccessGraph;

/// A node and its score in a [`top_k`] result, most central first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TopKEntry {
    pub node: usize,
    pub centrality: f64,
}

/// Wraps a [`TopKEntry`] so a [`BinaryHeap`] of them acts as a k-bounded min-heap on
/// `centrality`: the heap's "greatest" element by this reversed order is the current smallest
/// centrality kept, the one to evict once the heap grows past `k`.
struct MinByCentrality(TopKEntry);

impl PartialEq for MinByCentrality {
    fn eq(&self, other: &Self) -> bool {
        self.0.centrality == other.0.centrality
    }
}
impl Eq for MinByCentrality {}
impl PartialOrd for MinByCentrality {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for MinByCentrality {
    fn cmp(&self, other: &Self) -> Ordering {
        other.0.centrality.partial_cmp(&self.0.centrality).unwrap()
    }
}

/// A k-bounded min-heap of [`TopKEntry`], keeping the `k` entries of highest centrality seen so
/// far.
struct TopKHeap {
    k: usize,
    heap: BinaryHeap<MinByCentrality>,
}

impl TopKHeap {
    fn new(k: usize) -> Self {
        TopKHeap { k, heap: BinaryHeap::with_capacity(k) }
    }

    /// The current k-th best centrality, once the heap holds `k` entries; `None` while it is
    /// still filling up, since no bound is meaningful yet.
    fn kth(&self) -> Option<f64> {
        if self.heap.len() >= self.k && self.k > 0 {
            self.heap.peek().map(|e| e.0.centrality)
        } else {
            None
        }
    }

    fn push(&mut self, entry: TopKEntry) {
        if self.k == 0 {
            return;
        }
        self.heap.push(MinByCentrality(entry));
        if self.heap.len() > self.k {
            self.heap.pop();
        }
    }

    /// Drains the heap into a vector sorted most-central first.
    fn into_sorted_vec(self) -> Vec<TopKEntry> {
        let mut entries: Vec<TopKEntry> = self.heap.into_iter().map(|e| e.0).collect();
        entries.sort_unstable_by(|a, b| b.centrality.partial_cmp(&a.centrality).unwrap());
        entries
    }
}

/// Builds, for each strongly connected component, the distinct components reachable by a single
/// inter-component arc (the condensation's adjacency list). Mirrors the per-node/per-successor
/// scan and touched-component dedup `exact_sum_sweep::scc_graph` uses to find bridge arcs, but
/// keeps only the target component set rather than choosing a representative arc.
fn condensation_successors(graph: &impl RandomAccessGraph, scc: &Sccs) -> Vec<Vec<usize>> {
    let num_components = scc.num_components();
    let node_components = scc.components();

    let mut vertices_in_scc = vec![Vec::new(); num_components];
    for (node, &component) in node_components.iter().enumerate() {
        vertices_in_scc[component].push(node);
    }

    let mut successors = vec![Vec::new(); num_components];
    let mut touched = vec![false; num_components];
    for (c, nodes) in vertices_in_scc.iter().enumerate() {
        for &v in nodes {
            for succ in graph.successors(v) {
                let sc = node_components[succ];
                if sc != c && !touched[sc] {
                    touched[sc] = true;
                    successors[c].push(sc);
                }
            }
        }
        for &sc in &successors[c] {
            touched[sc] = false;
        }
    }
    successors
}

/// Computes, for every strongly connected component, a lower and upper bound on the number of
/// nodes reachable from any of its member nodes, by a dynamic program over the condensation DAG.
///
/// `tarjan`'s component numbering is topological (an edge from the condensation only ever goes
/// from a lower-numbered to a higher-numbered component), so processing components from the
/// highest index down guarantees every successor is already resolved. The upper bound sums
/// children's bounds uncapped by overlap between their reachable sets; this can overcount shared
/// descendants on a DAG with converging paths, but an overcounted upper bound only makes pruning
/// more conservative, never incorrect.
fn compute_reach_bounds(sizes: &[usize], successors: &[Vec<usize>], num_nodes: usize) -> (Vec<f64>, Vec<f64>) {
    let num_components = sizes.len();
    let mut reach_l = vec![0.0_f64; num_components];
    let mut reach_u = vec![0.0_f64; num_components];

    for c in (0..num_components).rev() {
        let size = sizes[c] as f64;
        let mut max_l = 0.0_f64;
        let mut sum_u = 0.0_f64;
        for &sc in &successors[c] {
            max_l = max_l.max(reach_l[sc]);
            sum_u += reach_u[sc];
        }
        reach_l[c] = size + max_l;
        reach_u[c] = (size + sum_u).min(num_nodes as f64);
    }

    (reach_l, reach_u)
}

/// Orders nodes by decreasing out-degree: high-degree sources tend to reach (and thus score)
/// more, so processing them first fills the k-bounded heap sooner, which lets later, lower-degree
/// sources start pruning against a tighter bound right away.
fn nodes_by_decreasing_outdegree(graph: &impl RandomAccessGraph) -> Vec<usize> {
    let mut order: Vec<usize> = (0..graph.num_nodes()).collect();
    order.sort_unstable_by_key(|&v| std::cmp::Reverse(graph.outdegree(v)));
    order
}

/// Runs a cut BFS from `source` accumulating `sum(coefficient(distance))` over reached nodes,
/// aborting as soon as the upper envelope of what `source` could still accumulate can no longer
/// beat `kth`. `coefficient` must be non-negative and non-increasing in distance (as harmonic's
/// `1/d` is) for the bound below to be valid.
///
/// Returns `None` if the BFS was aborted before finishing (the source provably can't make the
/// current top-k), `Some(centrality)` otherwise.
fn cut_bfs_linear(
    graph: &impl RandomAccessGraph,
    source: usize,
    coefficient: &impl Fn(usize) -> f64,
    reach_u: f64,
    kth: Option<f64>,
) -> Option<f64> {
    let num_nodes = graph.num_nodes();
    let mut visited = vec![false; num_nodes];
    visited[source] = true;

    let mut frontier = vec![source];
    let mut distance = 0_usize;
    let mut nb_vis = 1_usize;
    let mut sum_dist = 0.0_f64;

    while !frontier.is_empty() {
        let gamma: usize = frontier.iter().map(|&u| graph.outdegree(u)).sum();

        if let Some(kth) = kth {
            let remaining = (reach_u - gamma as f64 - nb_vis as f64).max(0.0);
            let upper_envelope =
                sum_dist + gamma as f64 * coefficient(distance + 1) + remaining * coefficient(distance + 2);
            if upper_envelope <= kth {
                return None;
            }
        }

        let mut next_frontier = Vec::new();
        for &u in &frontier {
            for succ in graph.successors(u) {
                if !visited[succ] {
                    visited[succ] = true;
                    nb_vis += 1;
                    sum_dist += coefficient(distance + 1);
                    next_frontier.push(succ);
                }
            }
        }
        distance += 1;
        frontier = next_frontier;
    }

    Some(sum_dist)
}

/// Runs a cut BFS from `source` for Lin centrality (`reached^2 / sum_of_distances`), aborting
/// once the best Lin value `source` could still reach can no longer beat `kth`.
///
/// Since `sum_of_distances` only grows as the BFS progresses and the final reached-set size is
/// capped by `reach_u`, `(reach_u + 1)^2 / sum_dist_so_far` is a valid upper bound on the final
/// Lin value at every point during the visit (a looser version of the spec's reach_l/reach_u
/// dual-bound formula, since it uses only the current partial sum rather than projecting it
/// forward layer by layer; see `DESIGN.md`).
fn cut_bfs_lin(graph: &impl RandomAccessGraph, source: usize, reach_u: f64, kth: Option<f64>) -> Option<f64> {
    let num_nodes = graph.num_nodes();
    let mut visited = vec![false; num_nodes];
    visited[source] = true;

    let mut frontier = vec![source];
    let mut reached = 0.0_f64;
    let mut sum_dist = 0.0_f64;
    let mut distance = 0_usize;

    while !frontier.is_empty() {
        if let Some(kth) = kth {
            if sum_dist > 0.0 {
                let upper_bound = (reach_u + 1.0).powi(2) / sum_dist;
                if upper_bound <= kth {
                    return None;
                }
            }
        }

        let mut next_frontier = Vec::new();
        for &u in &frontier {
            for succ in graph.successors(u) {
                if !visited[succ] {
                    visited[succ] = true;
                    reached += 1.0;
                    sum_dist += (distance + 1) as f64;
                    next_frontier.push(succ);
                }
            }
        }
        distance += 1;
        frontier = next_frontier;
    }

    Some(if sum_dist == 0.0 {
        1.0
    } else {
        let total_reached = reached + 1.0;
        total_reached * total_reached / sum_dist
    })
}

/// Returns the `k` nodes of `graph` with the highest `coefficient`-weighted linear geometric
/// centrality, most central first. `coefficient` must be non-negative and non-increasing in
/// distance (e.g. `1.0 / d`) for the early-abort bound to be sound.
///
/// If `graph` has fewer than `k` nodes, every node is returned.
pub fn top_k(graph: impl RandomAccessGraph, k: usize, coefficient: impl Fn(usize) -> f64, pl: &mut impl ProgressLog) -> Vec<TopKEntry> {
    if k == 0 {
        return Vec::new();
    }

    pl.item_name("source");
    pl.expected_updates(Some(graph.num_nodes()));
    pl.start("Computing top-k centrality with cut BFS...");

    let scc = tarjan(&graph, &mut dsi_progress_logger::no_logging!());
    let sizes = scc.compute_sizes();
    let successors = condensation_successors(&graph, &scc);
    let (_reach_l, reach_u) = compute_reach_bounds(&sizes, &successors, graph.num_nodes());
    let components = scc.components();

    let mut heap = TopKHeap::new(k);
    for source in nodes_by_decreasing_outdegree(&graph) {
        let kth = heap.kth();
        if let Some(centrality) = cut_bfs_linear(&graph, source, &coefficient, reach_u[components[source]], kth) {
            heap.push(TopKEntry { node: source, centrality });
        }
        pl.light_update();
    }

    pl.done();
    heap.into_sorted_vec()
}

/// [`top_k`] specialized to harmonic centrality, the common case.
pub fn top_k_harmonic(graph: impl RandomAccessGraph, k: usize, pl: &mut impl ProgressLog) -> Vec<TopKEntry> {
    top_k(graph, k, |d| 1.0 / d as f64, pl)
}

/// The `k` nodes of `graph` with the highest Lin centrality, most central first.
///
/// Lin centrality isn't expressible as a per-distance coefficient sum (it divides the *square*
/// of the reached-set size by the summed distance), so unlike [`top_k_harmonic`] this runs its
/// own cut BFS ([`cut_bfs_lin`]) instead of going through [`cut_bfs_linear`].
pub fn top_k_lin(graph: impl RandomAccessGraph, k: usize, pl: &mut impl ProgressLog) -> Vec<TopKEntry> {
    if k == 0 {
        return Vec::new();
    }

    pl.item_name("source");
    pl.expected_updates(Some(graph.num_nodes()));
    pl.start("Computing top-k Lin centrality with cut BFS...");

    let scc = tarjan(&graph, &mut dsi_progress_logger::no_logging!());
    let sizes = scc.compute_sizes();
    let successors = condensation_successors(&graph, &scc);
    let (_reach_l, reach_u) = compute_reach_bounds(&sizes, &successors, graph.num_nodes());
    let components = scc.components();

    let mut heap = TopKHeap::new(k);
    for source in nodes_by_decreasing_outdegree(&graph) {
        let kth = heap.kth();
        if let Some(centrality) = cut_bfs_lin(&graph, source, reach_u[components[source]], kth) {
            heap.push(TopKEntry { node: source, centrality });
        }
        pl.light_update();
    }

    pl.done();
    heap.into_sorted_vec()
}

#[cfg(test)]
mod test {
    use super::*;
    use dsi_progress_logger::no_logging;
    use webgraph::graphs::vec_graph::VecGraph;

    #[test]
    fn test_star_center_is_top() {
        let graph = VecGraph::from_arcs([
            (0, 1),
            (1, 0),
            (0, 2),
            (2, 0),
            (0, 3),
            (3, 0),
        ]);
        let top = top_k_harmonic(&graph, 1, &mut no_logging![]);
        assert_eq!(top[0].node, 0);
    }

    #[test]
    fn test_k_larger_than_graph_returns_everything() {
        let graph = VecGraph::from_arcs([(0, 1), (1, 0)]);
        let top = top_k_harmonic(&graph, 10, &mut no_logging![]);
        assert_eq!(top.len(), 2);
    }

    #[test]
    fn test_lin_centrality_on_clique_matches_hand_computation() {
        let n = 10;
        let mut arcs = Vec::new();
        for i in 0..n {
            for j in 0..n {
                if i != j {
                    arcs.push((i, j));
                }
            }
        }
        let graph = VecGraph::from_arcs(arcs);
        // every node reaches the other 9 at distance 1, plus itself: lin = 10^2 / 9.
        let top = top_k_lin(&graph, 30, &mut no_logging![]);
        assert_eq!(top.len(), n);
        for entry in &top {
            assert!((entry.centrality - 100.0 / 9.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_top_k_harmonic_matches_exhaustive_computation_on_random_graph() {
        use crate::centralities::geometric::geometric_centralities;
        use rand::rngs::StdRng;
        use rand::{Rng, SeedableRng};

        let mut rng = StdRng::seed_from_u64(0xc0ffee);
        let num_nodes = 60;
        let mut arcs = Vec::new();
        for u in 0..num_nodes {
            for v in 0..num_nodes {
                if u != v && rng.gen_bool(0.08) {
                    arcs.push((u, v));
                }
            }
        }
        let graph = VecGraph::from_arcs(arcs);

        let exact = geometric_centralities(&graph, 0.5, &mut no_logging![]).harmonic;
        let mut exact_entries: Vec<TopKEntry> = exact
            .iter()
            .enumerate()
            .map(|(node, &centrality)| TopKEntry { node, centrality })
            .collect();
        exact_entries.sort_unstable_by(|a, b| b.centrality.partial_cmp(&a.centrality).unwrap());
        exact_entries.truncate(5);

        let top = top_k_harmonic(&graph, 5, &mut no_logging![]);
        assert_eq!(top.len(), exact_entries.len());
        for (pruned, exhaustive) in top.iter().zip(exact_entries.iter()) {
            assert!(
                (pruned.centrality - exhaustive.centrality).abs() < 1e-9,
                "cut BFS top-k {:?} vs exhaustive {:?}",
                pruned,
                exhaustive
            );
        }
    }

    #[test]
    fn test_condensation_successors_dedup_parallel_cross_component_arcs() {
        // Two triangles 0-1-2 and 3-4-5, with two separate arcs from the first SCC into the
        // second: the condensation must still list component 1 only once as a successor of 0.
        let graph = VecGraph::from_arcs([
            (0, 1),
            (1, 2),
            (2, 0),
            (3, 4),
            (4, 5),
            (5, 3),
            (0, 3),
            (1, 4),
        ]);
        let scc = tarjan(&graph, &mut no_logging![]);
        let successors = condensation_successors(&graph, &scc);
        let c0 = scc.components()[0];
        let c3 = scc.components()[3];
        assert_eq!(successors[c0], vec![c3]);
    }
}
