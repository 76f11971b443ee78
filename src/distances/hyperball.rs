//! HyperBall: an approximate, HyperLogLog-backed computation of the neighbourhood function and
//! the derived geometric centralities (sum of distances, sum of inverse distances, discounted
//! centralities for caller-supplied discount functions), without ever materializing a distance
//! matrix.
//!
//! Every iteration re-derives each node's counter as the union of its successors' counters from
//! the previous iteration. Once few enough counters are still changing, it is wasteful to keep
//! scanning every node: if a `transpose` graph is supplied, iterations past the point where fewer
//! than a quarter of the counters changed switch to *systolic* mode, visiting only the nodes a
//! `must_be_checked` bitset (swapped with the set built by the previous iteration) marks as
//! possibly still moving. When a systolic iteration modifies very few counters it also primes
//! *pre-local* tracking, collecting the exact node ids (rather than a dense bitset) that must be
//! rechecked; the following iteration runs in *local* mode over that short checklist instead of
//! scanning the bitset. Work is additionally balanced across threads by cumulative out-degree
//! rather than by node count, so that a thread handling a few high-degree hubs does the same
//! amount of work as one handling many low-degree nodes.
//!
//! [`HyperBallBuilder::external`] trades memory for disk I/O on graphs whose two counter arrays
//! don't both fit in RAM: it backs them with [`crate::utils::MmapSlice`]'s tempfile-mapped
//! storage instead of a plain `Vec`, the same mechanism the teacher's `HyperLogLogCounterArray`
//! already exposes through [`crate::utils::TempMmapOptions`].

use crate::utils::{
    ApproximatedCounter, Counter, HyperLogLogCounterArray, HyperLogLogCounterArrayBuilder,
    TempMmapOptions,
};
use anyhow::Result;
use dsi_progress_logger::ProgressLog;
use kahan::KahanSum;
use rand::random;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use sux::bits::AtomicBitVec;
use webgraph::traits::RandomAccessGraph;

/// Default arc budget per work claim during the arc-balanced phase of an iteration.
const DEFAULT_GRANULARITY: usize = 16 * 1024;

/// Builder for [`HyperBall`].
pub struct HyperBallBuilder<'a, G: RandomAccessGraph, T: RandomAccessGraph = G> {
    graph: &'a G,
    transpose: Option<&'a T>,
    log_2_num_registers: usize,
    sum_of_distances: bool,
    sum_of_inverse_distances: bool,
    discount_functions: Vec<Box<dyn Fn(usize) -> f64 + Sync + 'a>>,
    weights: Option<&'a [usize]>,
    granularity: usize,
    external: bool,
}

impl<'a, G: RandomAccessGraph> HyperBallBuilder<'a, G, G> {
    /// Creates a new builder over `graph` with 16 registers per counter (`log2m = 4`), no
    /// transpose (so no systolic iterations) and no optional accumulator enabled.
    pub fn new(graph: &'a G) -> Self {
        HyperBallBuilder {
            graph,
            transpose: None,
            log_2_num_registers: 4,
            sum_of_distances: false,
            sum_of_inverse_distances: false,
            discount_functions: Vec::new(),
            weights: None,
            granularity: DEFAULT_GRANULARITY,
            external: false,
        }
    }
}

impl<'a, G: RandomAccessGraph, T: RandomAccessGraph> HyperBallBuilder<'a, G, T> {
    /// Sets the transposed graph used to find, once a counter stops changing, which of its
    /// predecessors must be rechecked.
    ///
    /// Without a transpose, [`HyperBall`] always runs in standard mode: every node is rescanned
    /// every iteration.
    pub fn transpose<T2: RandomAccessGraph>(self, transpose: Option<&'a T2>) -> HyperBallBuilder<'a, G, T2> {
        if let Some(t) = transpose {
            assert_eq!(
                t.num_nodes(),
                self.graph.num_nodes(),
                "transpose must have the same number of nodes as the graph"
            );
        }
        HyperBallBuilder {
            graph: self.graph,
            transpose,
            log_2_num_registers: self.log_2_num_registers,
            sum_of_distances: self.sum_of_distances,
            sum_of_inverse_distances: self.sum_of_inverse_distances,
            discount_functions: self.discount_functions,
            weights: self.weights,
            granularity: self.granularity,
            external: self.external,
        }
    }

    /// Sets log₂ of the number of registers per counter, trading memory and runtime for
    /// estimation accuracy (relative standard deviation is roughly `1.04 / sqrt(2^log_2m)`).
    pub fn log_2_num_registers(mut self, log_2_num_registers: usize) -> Self {
        self.log_2_num_registers = log_2_num_registers;
        self
    }

    /// Sets the arc budget per work claim; threads pull contiguous node ranges sized to contain
    /// roughly this many outgoing arcs rather than a fixed node count.
    pub fn granularity(mut self, granularity: usize) -> Self {
        self.granularity = granularity.max(1);
        self
    }

    /// Enables accumulation of the sum of distances from each node to every node it reaches.
    pub fn sum_of_distances(mut self, enabled: bool) -> Self {
        self.sum_of_distances = enabled;
        self
    }

    /// Enables accumulation of the sum of inverse distances (harmonic centrality) from each node.
    pub fn sum_of_inverse_distances(mut self, enabled: bool) -> Self {
        self.sum_of_inverse_distances = enabled;
        self
    }

    /// Adds a discounted centrality accumulator: `sum(f(distance))` for the given `f`.
    pub fn discount_function(mut self, f: impl Fn(usize) -> f64 + Sync + 'a) -> Self {
        self.discount_functions.push(Box::new(f));
        self
    }

    /// Sets per-node weights: node `i`'s counter is seeded with `weights[i]` distinct random
    /// elements instead of just `{i}`. A weight of `0` starts that counter empty.
    pub fn weights(mut self, weights: Option<&'a [usize]>) -> Self {
        if let Some(w) = weights {
            assert_eq!(w.len(), self.graph.num_nodes());
        }
        self.weights = weights;
        self
    }

    /// Enables external mode: the two counter arrays are backed by a tempfile-mapped region
    /// instead of a plain in-memory allocation, so the process never has to hold both of them
    /// resident in RAM at once. Meant for graphs whose counter arrays don't fit in memory.
    pub fn external(mut self, enabled: bool) -> Self {
        self.external = enabled;
        self
    }

    /// Builds the [`HyperBall`] instance, allocating its two counter arrays and accumulators.
    pub fn build(self) -> Result<HyperBall<'a, G, T>> {
        let num_nodes = self.graph.num_nodes();
        let mem_options = if self.external {
            TempMmapOptions::Default
        } else {
            TempMmapOptions::None
        };

        let mut current = HyperLogLogCounterArrayBuilder::new()
            .log_2_num_registers(self.log_2_num_registers)
            .num_elements_upper_bound(num_nodes)
            .mem_options(mem_options.clone())
            .build::<usize>(num_nodes)?;
        let result = HyperLogLogCounterArrayBuilder::new()
            .log_2_num_registers(self.log_2_num_registers)
            .num_elements_upper_bound(num_nodes)
            .mem_options(mem_options)
            .build::<usize>(num_nodes)?;

        if let Some(weights) = self.weights {
            for (node, &weight) in weights.iter().enumerate() {
                let mut counter = current.get_counter(node);
                for _ in 0..weight {
                    counter.add(random());
                }
            }
        } else {
            for node in 0..num_nodes {
                current.get_counter(node).add(node);
            }
        }

        let mut cumulative_outdegree = Vec::with_capacity(num_nodes + 1);
        let mut running = 0_usize;
        cumulative_outdegree.push(0);
        for node in 0..num_nodes {
            running += self.graph.outdegree(node);
            cumulative_outdegree.push(running);
        }

        let sum_of_distances = self.sum_of_distances.then(|| vec![0.0_f64; num_nodes]);
        let sum_of_inverse_distances = self
            .sum_of_inverse_distances
            .then(|| vec![0.0_f64; num_nodes]);
        let discounted_centralities = self
            .discount_functions
            .iter()
            .map(|_| vec![0.0_f64; num_nodes])
            .collect();

        Ok(HyperBall {
            graph: self.graph,
            transpose: self.transpose,
            current,
            result,
            cumulative_outdegree: cumulative_outdegree.into_boxed_slice(),
            num_arcs: running,
            granularity: self.granularity,
            iteration: 0,
            neighbourhood_function: Vec::new(),
            last: 0.0,
            last_modified: num_nodes,
            sum_of_distances,
            sum_of_inverse_distances,
            discount_functions: self.discount_functions,
            discounted_centralities,
            systolic: false,
            pre_local: false,
            local: false,
            must_be_checked: AtomicBitVec::new(num_nodes),
            next_must_be_checked: AtomicBitVec::new(num_nodes),
            local_checklist: Vec::new(),
            local_next_must_be_checked: Mutex::new(Vec::new()),
        })
    }
}

/// A running HyperBall approximation of the neighbourhood function, plus whichever optional
/// geometric-centrality accumulators were requested at construction.
pub struct HyperBall<'a, G: RandomAccessGraph, T: RandomAccessGraph = G> {
    graph: &'a G,
    transpose: Option<&'a T>,
    current: HyperLogLogCounterArray<usize>,
    result: HyperLogLogCounterArray<usize>,
    /// Prefix sums of out-degree: `cumulative_outdegree[i]` is the total out-degree of nodes
    /// `0..i`. Used to carve `0..num_nodes` into arc-balanced chunks without an extra crate
    /// dependency for the underlying monotone sequence.
    cumulative_outdegree: Box<[usize]>,
    num_arcs: usize,
    granularity: usize,
    iteration: usize,
    neighbourhood_function: Vec<f64>,
    /// The neighbourhood function's total after the last completed iteration; systolic iterations
    /// only compute its *change*, so they add this back in.
    last: f64,
    /// Number of counters modified by the last completed iteration.
    last_modified: usize,
    sum_of_distances: Option<Vec<f64>>,
    sum_of_inverse_distances: Option<Vec<f64>>,
    discount_functions: Vec<Box<dyn Fn(usize) -> f64 + Sync + 'a>>,
    discounted_centralities: Vec<Vec<f64>>,
    systolic: bool,
    pre_local: bool,
    local: bool,
    must_be_checked: AtomicBitVec,
    next_must_be_checked: AtomicBitVec,
    local_checklist: Vec<usize>,
    local_next_must_be_checked: Mutex<Vec<usize>>,
}

impl<'a, G: RandomAccessGraph, T: RandomAccessGraph> HyperBall<'a, G, T> {
    /// The neighbourhood function accumulated so far, one entry per completed iteration.
    pub fn neighbourhood_function(&self) -> &[f64] {
        &self.neighbourhood_function
    }

    /// The estimated sum of distances from each node, if requested at construction.
    pub fn sum_of_distances(&self) -> Option<&[f64]> {
        self.sum_of_distances.as_deref()
    }

    /// The estimated sum of inverse distances from each node, if requested at construction.
    pub fn sum_of_inverse_distances(&self) -> Option<&[f64]> {
        self.sum_of_inverse_distances.as_deref()
    }

    /// The estimated discounted centralities, in the order the discount functions were added.
    pub fn discounted_centralities(&self) -> &[Vec<f64>] {
        &self.discounted_centralities
    }

    /// Runs iterations until `upper_bound` iterations have completed, no counter changed in an
    /// iteration, or (after at least 4 iterations) the neighbourhood function grows by less than
    /// `threshold` relative to the previous iteration.
    pub fn run(&mut self, upper_bound: usize, threshold: f64, pl: &mut impl ProgressLog) -> Result<()>
    where
        G: Sync,
        T: Sync,
    {
        pl.item_name("iteration");
        pl.start("Running HyperBall...");

        let mut last = self.neighbourhood_function.last().copied().unwrap_or(0.0);
        for _ in 0..upper_bound {
            let modified_count = self.iterate()?;
            let current = *self.neighbourhood_function.last().unwrap();
            pl.info(format_args!(
                "Iteration {}: {} nodes modified, NF = {} (systolic: {}, pre_local: {}, local: {})",
                self.iteration, modified_count, current, self.systolic, self.pre_local, self.local
            ));

            if modified_count == 0 {
                break;
            }
            if self.iteration >= 4 && current / last < 1.0 + threshold {
                break;
            }
            last = current;
        }

        pl.done();
        Ok(())
    }

    /// Finds the smallest `node` such that the cumulative out-degree up to (but not including)
    /// `node` is at least `target_arcs`, clamped to `upper_limit`. Mirrors a monotone
    /// `succ`-style lookup on the cumulative out-degree sequence via binary search.
    fn skip_to(&self, target_arcs: usize, upper_limit: usize) -> usize {
        match self.cumulative_outdegree.binary_search(&target_arcs) {
            Ok(node) => node.min(upper_limit),
            Err(node) => node.min(upper_limit),
        }
    }

    /// Performs a single iteration (standard, systolic, pre-local or local, chosen from the
    /// state left by the previous iteration) and returns the number of counters that changed.
    fn iterate(&mut self) -> Result<usize>
    where
        G: Sync,
        T: Sync,
    {
        let num_nodes = self.graph.num_nodes();
        let previous_was_systolic = self.systolic;

        self.systolic =
            self.transpose.is_some() && self.iteration > 0 && self.last_modified < num_nodes / 4;
        self.local = self.pre_local;
        self.pre_local = self.systolic
            && (self.last_modified as u128) * (self.num_arcs.max(1) as u128) * 10
                < (num_nodes as u128) * (num_nodes as u128);

        if self.local {
            let mut next = self.local_next_must_be_checked.lock().unwrap();
            next.sort_unstable();
            next.dedup();
            self.local_checklist = std::mem::take(&mut *next);
        } else if self.systolic {
            self.next_must_be_checked.fill(false, Ordering::Relaxed);
            if !previous_was_systolic {
                self.must_be_checked.fill(true, Ordering::Relaxed);
            }
        }

        let num_threads = rayon::current_num_threads();
        let mut granularity = self.granularity;
        if num_threads > 1 && !self.local && self.iteration > 0 {
            granularity = ((num_nodes / num_threads).max(1) as f64).min(
                granularity as f64 * (num_nodes as f64 / (self.last_modified.max(1) as f64)),
            ) as usize;
            granularity = granularity.max(1);
        }
        let arc_granularity =
            ((self.num_arcs as f64 * granularity as f64) / num_nodes.max(1) as f64).ceil() as usize;

        let node_upper_limit = if self.local {
            self.local_checklist.len()
        } else {
            num_nodes
        };

        // Per-field accumulators are taken out of `self` for the duration of the broadcast: the
        // closure below only ever sees `&Self`, so mutation has to go through interior mutability
        // (the `Mutex`es here and the already-atomic bitsets) rather than `&mut self`.
        let distances_acc = self.sum_of_distances.take().map(Mutex::new);
        let inverse_distances_acc = self.sum_of_inverse_distances.take().map(Mutex::new);
        let discounted_acc: Vec<Mutex<Vec<f64>>> = std::mem::take(&mut self.discounted_centralities)
            .into_iter()
            .map(Mutex::new)
            .collect();

        let cursor = Mutex::new((0_usize, 0_usize));
        let local_cursor = AtomicUsize::new(0);
        let modified_total = AtomicUsize::new(0);
        let nf_delta_total = Mutex::new(KahanSum::new_with_value(0.0));
        let do_centrality =
            distances_acc.is_some() || inverse_distances_acc.is_some() || !discounted_acc.is_empty();

        let this: &Self = self;

        rayon::broadcast(|_| {
            let mut local_modified = 0_usize;
            let mut local_nf_delta = KahanSum::new_with_value(0.0);
            let mut local_distances = distances_acc.as_ref().map(|m| vec![0.0_f64; m.lock().unwrap().len()]);
            let mut local_inverse_distances =
                inverse_distances_acc.as_ref().map(|m| vec![0.0_f64; m.lock().unwrap().len()]);
            let mut local_discounted: Vec<Vec<f64>> = discounted_acc
                .iter()
                .map(|m| vec![0.0_f64; m.lock().unwrap().len()])
                .collect();

            loop {
                let (start, end) = if this.local {
                    let start = local_cursor.fetch_add(1, Ordering::Relaxed).min(node_upper_limit);
                    let end = (start + 1).min(node_upper_limit);
                    (start, end)
                } else {
                    let mut guard = cursor.lock().unwrap();
                    let (mut next_node, next_arc) = *guard;
                    if next_node >= node_upper_limit {
                        (node_upper_limit, node_upper_limit)
                    } else {
                        let start = next_node;
                        let target = next_arc + arc_granularity;
                        next_node = if target >= this.num_arcs {
                            node_upper_limit
                        } else {
                            this.skip_to(target, node_upper_limit)
                        };
                        let next_arc = this.cumulative_outdegree[next_node];
                        *guard = (next_node, next_arc);
                        (start, next_node)
                    }
                };

                if start == node_upper_limit {
                    break;
                }

                for i in start..end {
                    let node = if this.local { this.local_checklist[i] } else { i };

                    let should_scan = !this.systolic
                        || this.local
                        || this.must_be_checked.get(node, Ordering::Relaxed);
                    if !should_scan {
                        unsafe {
                            this.result.get_counter(node).set_to(&this.current.get_counter(node));
                        }
                        continue;
                    }

                    let mut counter = this.current.get_counter(node);
                    unsafe {
                        counter.cache();
                    }
                    let pre = counter.estimate_count();
                    for succ in this.graph.successors(node) {
                        if succ == node {
                            continue;
                        }
                        let neighbour = this.current.get_counter(succ);
                        unsafe {
                            counter.merge_unsafe(&neighbour);
                        }
                    }

                    let modified = counter.is_changed();
                    let post = if modified { counter.estimate_count() } else { pre };

                    if this.systolic {
                        if modified {
                            local_nf_delta += post - pre;
                        }
                    } else {
                        local_nf_delta += post;
                    }

                    if modified {
                        local_modified += 1;
                        let delta = post - pre;
                        if delta > 0.0 {
                            let layer = (this.iteration + 1) as f64;
                            if let Some(distances) = &mut local_distances {
                                distances[node] += delta * layer;
                            }
                            if let Some(distances) = &mut local_inverse_distances {
                                distances[node] += delta / layer;
                            }
                            if do_centrality {
                                for (f, centrality) in
                                    this.discount_functions.iter().zip(local_discounted.iter_mut())
                                {
                                    centrality[node] += delta * f(this.iteration + 1);
                                }
                            }
                        }

                        if this.systolic {
                            if let Some(transpose) = this.transpose {
                                if this.pre_local {
                                    let mut next = this.local_next_must_be_checked.lock().unwrap();
                                    next.push(node);
                                    for pred in transpose.successors(node) {
                                        next.push(pred);
                                    }
                                } else {
                                    for pred in transpose.successors(node) {
                                        this.next_must_be_checked.set(pred, true, Ordering::Relaxed);
                                    }
                                }
                            }
                        }
                    }

                    unsafe {
                        this.result.get_counter(node).set_to(&counter);
                    }
                }
            }

            modified_total.fetch_add(local_modified, Ordering::Relaxed);
            *nf_delta_total.lock().unwrap() += local_nf_delta.sum();
            if let Some(distances) = local_distances {
                let mut shared = distances_acc.as_ref().unwrap().lock().unwrap();
                for (acc, value) in shared.iter_mut().zip(distances.iter()) {
                    *acc += value;
                }
            }
            if let Some(distances) = local_inverse_distances {
                let mut shared = inverse_distances_acc.as_ref().unwrap().lock().unwrap();
                for (acc, value) in shared.iter_mut().zip(distances.iter()) {
                    *acc += value;
                }
            }
            for (shared, local) in discounted_acc.iter().zip(local_discounted.iter()) {
                let mut shared = shared.lock().unwrap();
                for (acc, value) in shared.iter_mut().zip(local.iter()) {
                    *acc += value;
                }
            }
        });

        let modified_count = modified_total.load(Ordering::Relaxed);
        self.last_modified = modified_count;
        self.sum_of_distances = distances_acc.map(|m| m.into_inner().unwrap());
        self.sum_of_inverse_distances = inverse_distances_acc.map(|m| m.into_inner().unwrap());
        self.discounted_centralities = discounted_acc.into_iter().map(|m| m.into_inner().unwrap()).collect();

        let total = if self.systolic {
            self.last + nf_delta_total.into_inner().unwrap().sum()
        } else {
            nf_delta_total.into_inner().unwrap().sum()
        };
        self.last = total;

        self.current.swap_with(&mut self.result);
        if self.systolic {
            std::mem::swap(&mut self.must_be_checked, &mut self.next_must_be_checked);
        }
        self.iteration += 1;

        let monotone = self
            .neighbourhood_function
            .last()
            .copied()
            .unwrap_or(0.0)
            .max(total);
        self.neighbourhood_function.push(monotone);

        Ok(modified_count)
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
    fn test_neighbourhood_function_is_monotone_and_bounded() {
        let graph = bidirectional_cycle(40);
        let mut hyperball = HyperBallBuilder::new(&graph)
            .log_2_num_registers(8)
            .build()
            .unwrap();
        hyperball.run(50, 1e-3, &mut no_logging![]).unwrap();

        let nf = hyperball.neighbourhood_function();
        assert!(!nf.is_empty());
        let max_pairs = (graph.num_nodes() * graph.num_nodes()) as f64;
        for window in nf.windows(2) {
            assert!(window[1] >= window[0] - 1e-6);
        }
        assert!(*nf.last().unwrap() <= max_pairs * 1.5);
    }

    #[test]
    fn test_effective_diameter_on_bidirectional_cycle_is_plausible() {
        use crate::distances::neighbourhood_function::effective_diameter;

        let graph = bidirectional_cycle(40);
        let mut hyperball = HyperBallBuilder::new(&graph)
            .log_2_num_registers(8)
            .build()
            .unwrap();
        hyperball.run(usize::MAX, -1.0, &mut no_logging![]).unwrap();

        let nf = hyperball.neighbourhood_function();
        let ed = effective_diameter(0.9, nf);
        assert!((16.0..=18.0).contains(&ed), "effective diameter {ed} outside [16, 18]");
    }

    #[test]
    fn test_neighbourhood_function_approximates_exact_within_tolerance() {
        use crate::distances::neighbourhood_function::compute_exact;
        use crate::utils::HyperLogLogCounterArray;

        let log2m = 6;
        let sigma = HyperLogLogCounterArray::<()>::relative_standard_deviation(log2m);

        // A handful of small topologies exercising different NF shapes: a clique, a
        // bidirectional cycle, a directed line, an out-star and a complete binary out-tree.
        let graphs: Vec<VecGraph> = vec![
            {
                let mut arcs = Vec::new();
                for i in 0..8 {
                    for j in 0..8 {
                        if i != j {
                            arcs.push((i, j));
                        }
                    }
                }
                VecGraph::from_arcs(arcs)
            },
            bidirectional_cycle(12),
            VecGraph::from_arcs((0..11).map(|i| (i, i + 1))),
            VecGraph::from_arcs((1..9).map(|i| (0, i))),
            {
                let depth = 3;
                let num_nodes = (1 << (depth + 1)) - 1;
                VecGraph::from_arcs((1..num_nodes).map(|node| (node, (node - 1) / 2)))
            },
        ];

        for graph in &graphs {
            let exact = compute_exact(graph, &mut no_logging![]);
            let mut hyperball = HyperBallBuilder::new(graph)
                .log_2_num_registers(log2m)
                .build()
                .unwrap();
            hyperball.run(usize::MAX, 0.0, &mut no_logging![]).unwrap();
            let approx = hyperball.neighbourhood_function();

            for (&hat, &truth) in approx.iter().zip(exact.iter()) {
                // A generous multiple of the nominal standard deviation: any single small-graph
                // draw can land a few sigma out without the estimator being wrong on average.
                let tolerance = (6.0 * sigma * truth).max(1.0);
                assert!(
                    (hat - truth).abs() <= tolerance,
                    "NF_hat={hat} NF_true={truth} tolerance={tolerance}"
                );
            }
        }
    }

    #[test]
    fn test_sum_of_inverse_distances_matches_harmonic_order_on_path() {
        // A directed path 0 -> 1 -> 2 -> 3: node 0 reaches the most nodes, node 2 the fewest.
        let graph = VecGraph::from_arcs([(0, 1), (1, 2), (2, 3)]);
        let mut hyperball = HyperBallBuilder::new(&graph)
            .log_2_num_registers(8)
            .sum_of_inverse_distances(true)
            .build()
            .unwrap();
        hyperball.run(10, 0.0, &mut no_logging![]).unwrap();

        let harmonic = hyperball.sum_of_inverse_distances().unwrap();
        assert!(harmonic[0] > harmonic[2]);
        assert_eq!(harmonic[3], 0.0);
    }

    /// With the transpose supplied, convergence on a cycle must flip through systolic (and,
    /// eventually, local) iterations; the neighbourhood function must come out the same as the
    /// non-systolic run above regardless.
    #[test]
    fn test_systolic_mode_with_transpose_matches_standard_mode() {
        let graph = bidirectional_cycle(40);
        let transpose = bidirectional_cycle(40); // self-transpose: the cycle is symmetric

        let mut plain = HyperBallBuilder::new(&graph).log_2_num_registers(8).build().unwrap();
        plain.run(50, 1e-3, &mut no_logging![]).unwrap();

        let mut systolic = HyperBallBuilder::new(&graph)
            .transpose(Some(&transpose))
            .log_2_num_registers(8)
            .build()
            .unwrap();
        systolic.run(50, 1e-3, &mut no_logging![]).unwrap();

        assert_eq!(plain.neighbourhood_function().len(), systolic.neighbourhood_function().len());
        for (&a, &b) in plain.neighbourhood_function().iter().zip(systolic.neighbourhood_function()) {
            assert!((a - b).abs() < 1e-6, "plain NF {a} vs systolic NF {b}");
        }
    }

    /// A granularity smaller than a single node's out-degree still has to make progress: the
    /// arc-balanced cursor must never stall on the first node of a chunk.
    #[test]
    fn test_tiny_granularity_still_converges() {
        let graph = bidirectional_cycle(20);
        let mut hyperball = HyperBallBuilder::new(&graph)
            .log_2_num_registers(6)
            .granularity(1)
            .build()
            .unwrap();
        hyperball.run(usize::MAX, 1e-3, &mut no_logging![]).unwrap();
        assert!(!hyperball.neighbourhood_function().is_empty());
    }

    /// External mode only changes where the counter bits live, not the algorithm, so it must
    /// reach the same neighbourhood function as the in-memory run.
    #[test]
    fn test_external_mode_matches_in_memory_mode() {
        let graph = bidirectional_cycle(24);
        let mut in_memory = HyperBallBuilder::new(&graph).log_2_num_registers(8).build().unwrap();
        in_memory.run(50, 1e-3, &mut no_logging![]).unwrap();

        let mut external = HyperBallBuilder::new(&graph)
            .log_2_num_registers(8)
            .external(true)
            .build()
            .unwrap();
        external.run(50, 1e-3, &mut no_logging![]).unwrap();

        assert_eq!(in_memory.neighbourhood_function().len(), external.neighbourhood_function().len());
        for (&a, &b) in in_memory.neighbourhood_function().iter().zip(external.neighbourhood_function()) {
            assert!((a - b).abs() < 1e-6, "in-memory NF {a} vs external NF {b}");
        }
    }
}
