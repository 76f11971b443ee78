//! The core ExactSumSweep engine: an adaptive mix of full BFS sweeps and strongly-connected-
//! component pivot propagation that converges on exact eccentricities far faster than computing
//! each one independently.
//!
//! This is a sequential adaptation of the algorithm: each step below corresponds to a BFS or a
//! pivot-propagation pass described in Borassi, Crescenzi and Marino, "Fast and Simple Computation
//! of Top-k Closeness Centralities" / the SumSweep papers, but runs on a single thread using
//! [`crate::visits::bfv::SeqBreadthFirstVisit`] rather than a parallel frontier.

use super::level::{Level, Missing};
use super::scc_graph::SccGraph;
use crate::sccs::{self, Sccs};
use crate::utils::math;
use crate::visits::bfv::{Args, SeqBreadthFirstVisit, SeqVisit};
use dsi_progress_logger::ProgressLog;
use nonmax::NonMaxUsize;
use sux::bits::BitVec;
use webgraph::traits::RandomAccessGraph;

pub(super) struct DirExactSumSweepComputer<'a, G1: RandomAccessGraph, G2: RandomAccessGraph, OL: Level> {
    graph: &'a G1,
    transpose: &'a G2,
    num_nodes: usize,
    radial_vertices: BitVec,
    pub diameter_low: usize,
    pub radius_high: usize,
    pub diameter_vertex: usize,
    pub radius_vertex: usize,
    iterations: usize,
    pub forward_low: Box<[usize]>,
    pub forward_high: Box<[usize]>,
    pub backward_low: Box<[usize]>,
    pub backward_high: Box<[usize]>,
    pub radius_iterations: Option<usize>,
    pub diameter_iterations: Option<usize>,
    pub forward_iter: Option<usize>,
    pub all_iter: Option<usize>,
    scc: Sccs,
    scc_graph: SccGraph,
    forward_tot: Box<[usize]>,
    backward_tot: Box<[usize]>,
    compute_radial_vertices: bool,
    _marker: std::marker::PhantomData<OL>,
}

impl<'a, G: RandomAccessGraph, OL: Level> DirExactSumSweepComputer<'a, G, G, OL> {
    /// Builds a new computer for a symmetric (undirected) graph.
    pub(super) fn new_symm(graph: &'a G, pl: &mut impl ProgressLog) -> Self {
        let scc = sccs::symmetric(graph, pl);
        let scc_graph = SccGraph::new_symm(&scc);

        Self::new_internal(graph, graph, None, scc, scc_graph, pl)
    }
}

impl<'a, G1: RandomAccessGraph, G2: RandomAccessGraph, OL: Level>
    DirExactSumSweepComputer<'a, G1, G2, OL>
{
    /// Builds a new computer for a directed graph. `transpose` must be the transpose of `graph`.
    pub(super) fn new(
        graph: &'a G1,
        transpose: &'a G2,
        radial_vertices: Option<BitVec>,
        pl: &mut impl ProgressLog,
    ) -> Self {
        assert_eq!(graph.num_nodes(), transpose.num_nodes());
        assert_eq!(graph.num_arcs(), transpose.num_arcs());

        let scc = sccs::tarjan(graph, pl);
        let scc_graph = SccGraph::new_directed(graph, transpose, &scc, pl);

        Self::new_internal(graph, transpose, radial_vertices, scc, scc_graph, pl)
    }

    fn new_internal(
        graph: &'a G1,
        transpose: &'a G2,
        radial_vertices: Option<BitVec>,
        scc: Sccs,
        scc_graph: SccGraph,
        pl: &mut impl ProgressLog,
    ) -> Self {
        let num_nodes = graph.num_nodes();
        let compute_radial_vertices = radial_vertices.is_none();
        let radial_vertices = radial_vertices.unwrap_or_else(|| BitVec::new(num_nodes));

        pl.info(format_args!("Initializing data structure"));

        Self {
            graph,
            transpose,
            num_nodes,
            forward_tot: vec![0; num_nodes].into_boxed_slice(),
            backward_tot: vec![0; num_nodes].into_boxed_slice(),
            forward_low: vec![0; num_nodes].into_boxed_slice(),
            forward_high: vec![num_nodes; num_nodes].into_boxed_slice(),
            backward_low: vec![0; num_nodes].into_boxed_slice(),
            backward_high: vec![num_nodes; num_nodes].into_boxed_slice(),
            scc_graph,
            scc,
            diameter_low: 0,
            radius_high: usize::MAX,
            radius_iterations: None,
            diameter_iterations: None,
            all_iter: None,
            forward_iter: None,
            iterations: 0,
            radial_vertices,
            radius_vertex: 0,
            diameter_vertex: 0,
            compute_radial_vertices,
            _marker: std::marker::PhantomData,
        }
    }
}

impl<G1: RandomAccessGraph, G2: RandomAccessGraph, OL: Level> DirExactSumSweepComputer<'_, G1, G2, OL> {
    #[inline(always)]
    fn incomplete_forward(&self, index: usize) -> bool {
        self.forward_low[index] != self.forward_high[index]
    }

    #[inline(always)]
    fn incomplete_backward(&self, index: usize) -> bool {
        self.backward_low[index] != self.backward_high[index]
    }

    /// Runs `iterations` steps of the SumSweep heuristic starting from `start`, alternating
    /// forward and backward BFS from the node that currently maximizes total accumulated
    /// distance among the incomplete ones.
    fn sum_sweep_heuristic(&mut self, start: usize, iterations: usize, pl: &mut impl ProgressLog) {
        self.step_sum_sweep(Some(start), true, pl);

        for i in 2..=iterations {
            if i % 2 == 0 {
                let v = math::filtered_argmax(&self.backward_tot, &self.backward_low, |i| {
                    self.incomplete_backward(i)
                });
                self.step_sum_sweep(v, false, pl);
            } else {
                let v = math::filtered_argmax(&self.forward_tot, &self.forward_low, |i| {
                    self.incomplete_forward(i)
                });
                self.step_sum_sweep(v, true, pl);
            }
        }
    }

    /// Computes diameter, radius and/or all eccentricities, running steps until nothing relevant
    /// to `OL` is left missing.
    pub fn compute(&mut self, pl: &mut impl ProgressLog) {
        if self.num_nodes == 0 {
            return;
        }

        pl.start("Computing ExactSumSweep...");

        if self.compute_radial_vertices {
            self.compute_radial_vertices(pl);
        }

        let max_outdegree_vertex = (0..self.num_nodes)
            .map(|v| (self.graph.outdegree(v), v))
            .max_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)))
            .unwrap()
            .1;

        self.sum_sweep_heuristic(max_outdegree_vertex, 6, pl);

        let mut points = [self.num_nodes as f64; 5];
        let mut missing_nodes = self.find_missing_nodes(pl);

        pl.info(format_args!(
            "Missing nodes: {} out of {}",
            missing_nodes,
            self.num_nodes * 2
        ));

        while missing_nodes > 0 {
            let step_to_perform = math::argmax(&points).expect("Could not find step to perform");

            match step_to_perform {
                0 => self.all_cc_upper_bound(pl),
                1 => {
                    let v = math::filtered_argmax(&self.forward_high, &self.forward_tot, |i| {
                        self.incomplete_forward(i)
                    });
                    self.step_sum_sweep(v, true, pl)
                }
                2 => {
                    let v = math::filtered_argmin(&self.forward_low, &self.forward_tot, |i| {
                        self.radial_vertices[i]
                    });
                    self.step_sum_sweep(v, true, pl)
                }
                3 => {
                    let v = math::filtered_argmax(&self.backward_high, &self.backward_tot, |i| {
                        self.incomplete_backward(i)
                    });
                    self.step_sum_sweep(v, false, pl)
                }
                4 => {
                    let v = math::filtered_argmax(&self.backward_tot, &self.backward_high, |i| {
                        self.incomplete_backward(i)
                    });
                    self.step_sum_sweep(v, false, pl)
                }
                _ => unreachable!(),
            }

            let old_missing_nodes = missing_nodes;
            missing_nodes = self.find_missing_nodes(pl);
            points[step_to_perform] = (old_missing_nodes - missing_nodes) as f64;

            for (i, point) in points.iter_mut().enumerate() {
                if i != step_to_perform && *point >= 0.0 {
                    *point += 2.0 / self.iterations as f64;
                }
            }

            pl.info(format_args!(
                "Missing nodes: {} out of {}",
                missing_nodes,
                self.num_nodes * 2
            ));
        }

        pl.done();
    }

    /// Picks, in each strongly connected component, the vertex with the tightest known bounds as
    /// the pivot used by [`Self::all_cc_upper_bound`].
    fn find_best_pivot(&self, pl: &mut impl ProgressLog) -> Vec<usize> {
        // `NonMaxUsize` keeps this the same width as `Vec<usize>` while still letting "no pivot
        // chosen yet" be represented as `None` instead of a reserved sentinel node id.
        let mut pivot: Vec<Option<NonMaxUsize>> = vec![None; self.scc.num_components()];
        let components = self.scc.components();
        pl.expected_updates(Some(components.len()));
        pl.item_name("node");
        pl.display_memory(false);
        pl.start("Computing best pivots...");

        for (v, &component) in components.iter().enumerate().rev() {
            let value = |i: usize| {
                self.backward_low[i]
                    + self.forward_low[i]
                    + if self.incomplete_forward(i) { 0 } else { self.num_nodes }
                    + if self.incomplete_backward(i) { 0 } else { self.num_nodes }
            };

            match pivot[component] {
                Some(p) => {
                    let p = p.get();
                    if value(v) < value(p)
                        || (value(v) == value(p)
                            && self.forward_tot[v] + self.backward_tot[v]
                                <= self.forward_tot[p] + self.backward_tot[p])
                    {
                        pivot[component] = NonMaxUsize::new(v);
                    }
                }
                None => pivot[component] = NonMaxUsize::new(v),
            }
            pl.light_update();
        }

        pl.done();

        pivot.into_iter().map(|x| x.unwrap().get()).collect()
    }

    /// Marks in [`Self::radial_vertices`] every vertex able to reach the largest strongly
    /// connected component.
    fn compute_radial_vertices(&mut self, pl: &mut impl ProgressLog) {
        if self.num_nodes == 0 {
            return;
        }

        let component = self.scc.components();
        let scc_sizes = self.scc.compute_sizes();
        let max_size_scc = math::argmax(&scc_sizes).expect("Could not find max size scc.");

        pl.info(format_args!(
            "Searching for biggest strongly connected component"
        ));

        let mut v = self.num_nodes;
        while v > 0 {
            v -= 1;
            if component[v] == max_size_scc {
                break;
            }
        }

        pl.expected_updates(None);
        pl.item_name("node");
        pl.display_memory(false);
        pl.start("Computing radial vertices...");

        let mut visit = SeqBreadthFirstVisit::new(self.transpose);
        let radial_vertices = &mut self.radial_vertices;
        visit.visit_from_node(
            v,
            |args: Args| {
                radial_vertices.set(args.node, true);
            },
            |_| true,
            pl,
        );

        pl.done();
    }

    fn step_sum_sweep(&mut self, start: Option<usize>, forward: bool, pl: &mut impl ProgressLog) {
        if let Some(start) = start {
            if forward {
                self.forward_step_sum_sweep(start, pl);
            } else {
                self.backwards_step_sum_sweep(start, pl);
            }
            self.iterations += 1;
        }
    }

    /// Runs a BFS on `transpose` from `start`, tightening forward lower bounds of every node
    /// reached (their distance to `start`), and sets `start`'s own backward eccentricity exactly.
    fn backwards_step_sum_sweep(&mut self, start: usize, pl: &mut impl ProgressLog) {
        pl.item_name("node");
        pl.display_memory(false);
        pl.expected_updates(None);
        pl.start(format!(
            "Performing backward BFS from {} to tighten forward lower bounds...",
            start
        ));

        let mut max_dist = 0;
        let mut visit = SeqBreadthFirstVisit::new(self.transpose);
        let forward_high = &self.forward_high;
        let forward_low = &mut self.forward_low;
        let forward_tot = &mut self.forward_tot;
        let radial_vertices = &self.radial_vertices;
        let mut radius_update: Option<(usize, usize)> = None;

        visit.visit_from_node(
            start,
            |args: Args| {
                max_dist = max_dist.max(args.distance);

                forward_tot[args.node] += args.distance;

                if forward_low[args.node] != forward_high[args.node]
                    && forward_low[args.node] < args.distance
                {
                    forward_low[args.node] = args.distance;

                    if args.distance == forward_high[args.node] && radial_vertices[args.node] {
                        radius_update = Some((args.distance, args.node));
                    }
                }
            },
            |_| true,
            pl,
        );

        if let Some((distance, node)) = radius_update {
            if distance < self.radius_high {
                self.radius_high = distance;
                self.radius_vertex = node;
            }
        }

        let ecc_start = max_dist;
        self.backward_low[start] = ecc_start;
        self.backward_high[start] = ecc_start;

        if self.diameter_low < ecc_start {
            self.diameter_low = ecc_start;
            self.diameter_vertex = start;
        }

        pl.done();
    }

    /// Runs a BFS on `graph` from `start`, tightening backward lower bounds of every node
    /// reached, and sets `start`'s own forward eccentricity exactly.
    fn forward_step_sum_sweep(&mut self, start: usize, pl: &mut impl ProgressLog) {
        pl.item_name("node");
        pl.display_memory(false);
        pl.expected_updates(None);
        pl.start(format!(
            "Performing forward BFS from {} to tighten backward lower bounds...",
            start
        ));

        let mut max_dist = 0;
        let mut visit = SeqBreadthFirstVisit::new(self.graph);
        let backward_high = &self.backward_high;
        let backward_low = &mut self.backward_low;
        let backward_tot = &mut self.backward_tot;

        visit.visit_from_node(
            start,
            |args: Args| {
                max_dist = max_dist.max(args.distance);

                backward_tot[args.node] += args.distance;

                if backward_low[args.node] != backward_high[args.node]
                    && backward_low[args.node] < args.distance
                {
                    backward_low[args.node] = args.distance;
                }
            },
            |_| true,
            pl,
        );

        let ecc_start = max_dist;
        self.forward_low[start] = ecc_start;
        self.forward_high[start] = ecc_start;

        if self.diameter_low < ecc_start {
            self.diameter_low = ecc_start;
            self.diameter_vertex = start;
        }
        if self.radial_vertices[start] && self.radius_high > ecc_start {
            self.radius_high = ecc_start;
            self.radius_vertex = start;
        }

        pl.done();
    }

    /// Runs a BFS from each pivot, restricted to its own strongly connected component, returning
    /// the distance of each node from its component's pivot and the eccentricity of each pivot
    /// within its own component.
    fn compute_dist_pivot(
        &self,
        pivot: &[usize],
        forward: bool,
        pl: &mut impl ProgressLog,
    ) -> (Vec<usize>, Vec<usize>) {
        pl.expected_updates(None);
        pl.display_memory(false);

        let result = if forward {
            pl.start("Computing forward dist pivots...");
            self.compute_dist_pivot_from_graph(pivot, self.graph)
        } else {
            pl.start("Computing backward dist pivots...");
            self.compute_dist_pivot_from_graph(pivot, self.transpose)
        };

        pl.done();
        result
    }

    fn compute_dist_pivot_from_graph(
        &self,
        pivot: &[usize],
        graph: &impl RandomAccessGraph,
    ) -> (Vec<usize>, Vec<usize>) {
        let components = self.scc.components();
        let mut ecc_pivot = vec![0; self.scc.num_components()];
        let mut dist_pivot = vec![0; self.num_nodes];

        for &p in pivot {
            let pivot_component = components[p];
            let mut visit = SeqBreadthFirstVisit::new(graph);
            let mut component_ecc = 0;

            visit.visit_from_node(
                p,
                |args: Args| {
                    dist_pivot[args.node] = args.distance;
                    component_ecc = component_ecc.max(args.distance);
                },
                |args: &Args| components[args.node] == pivot_component,
                &mut dsi_progress_logger::no_logging!(),
            );

            ecc_pivot[pivot_component] = component_ecc;
        }

        (dist_pivot, ecc_pivot)
    }

    /// Propagates pivot eccentricities along the strongly-connected-component DAG to refine the
    /// upper bound of every node in a single batch.
    fn all_cc_upper_bound(&mut self, pl: &mut impl ProgressLog) {
        pl.item_name("element");
        pl.display_memory(false);
        pl.expected_updates(Some(2 * self.scc.num_components() + self.num_nodes));
        pl.start("Performing the AllCCUpperBound step of the ExactSumSweep algorithm...");

        let pivot = self.find_best_pivot(pl);

        let (dist_pivot_f, mut ecc_pivot_f) = self.compute_dist_pivot(&pivot, true, pl);
        let (dist_pivot_b, mut ecc_pivot_b) = self.compute_dist_pivot(&pivot, false, pl);
        let components = self.scc.components().to_vec();

        pl.info(format_args!("Bounding forward eccentricities of pivots..."));
        for (c, &p) in pivot.iter().enumerate() {
            for connection in self.scc_graph.children(c) {
                let next_c = connection.target;
                ecc_pivot_f[c] = std::cmp::max(
                    ecc_pivot_f[c],
                    dist_pivot_f[connection.start] + 1 + dist_pivot_b[connection.end] + ecc_pivot_f[next_c],
                );

                if ecc_pivot_f[c] >= self.forward_high[p] {
                    ecc_pivot_f[c] = self.forward_high[p];
                    break;
                }
            }
            pl.light_update();
        }

        pl.info(format_args!(
            "Bounding backward eccentricities of pivots..."
        ));
        for c in (0..self.scc.num_components()).rev() {
            for connection in self.scc_graph.children(c) {
                let next_c = connection.target;
                ecc_pivot_b[next_c] = std::cmp::max(
                    ecc_pivot_b[next_c],
                    dist_pivot_f[connection.start] + 1 + dist_pivot_b[connection.end] + ecc_pivot_b[c],
                );

                if ecc_pivot_b[next_c] >= self.backward_high[pivot[next_c]] {
                    ecc_pivot_b[next_c] = self.backward_high[pivot[next_c]];
                }
            }
            pl.light_update();
        }

        pl.info(format_args!("Refining upper bounds of nodes..."));
        for node in 0..self.num_nodes {
            let mut node_forward_high = self.forward_high[node];
            let pivot_value = dist_pivot_b[node] + ecc_pivot_f[components[node]];

            if pivot_value < node_forward_high {
                self.forward_high[node] = pivot_value;
                node_forward_high = pivot_value;
            }

            if node_forward_high == self.forward_low[node]
                && self.radial_vertices[node]
                && node_forward_high < self.radius_high
            {
                self.radius_high = node_forward_high;
                self.radius_vertex = node;
            }

            self.backward_high[node] = std::cmp::min(
                self.backward_high[node],
                dist_pivot_f[node] + ecc_pivot_b[components[node]],
            );
        }

        pl.update_with_count(self.num_nodes);

        self.iterations += 3;

        pl.done();
    }

    /// Counts how many nodes are still missing an exact answer for each quantity, updating the
    /// `*_iterations` fields the first time each quantity becomes fully known.
    fn find_missing_nodes(&mut self, pl: &mut impl ProgressLog) -> usize {
        pl.item_name("node");
        pl.display_memory(false);
        pl.expected_updates(Some(self.num_nodes));
        pl.start("Computing missing nodes...");

        let mut missing = Missing::default();
        for node in 0..self.num_nodes {
            if self.incomplete_forward(node) {
                missing.all_forward += 1;
                if self.forward_high[node] > self.diameter_low {
                    missing.diameter_forward += 1;
                }
                if self.radial_vertices[node] && self.forward_low[node] < self.radius_high {
                    missing.radius += 1;
                }
            }
            if self.incomplete_backward(node) {
                missing.all_backward += 1;
                if self.backward_high[node] > self.diameter_low {
                    missing.diameter_backward += 1;
                }
            }
        }

        pl.update_with_count(self.num_nodes);

        if missing.radius == 0 && self.radius_iterations.is_none() {
            self.radius_iterations = Some(self.iterations);
        }
        if (missing.diameter_forward == 0 || missing.diameter_backward == 0)
            && self.diameter_iterations.is_none()
        {
            self.diameter_iterations = Some(self.iterations);
        }
        if missing.all_forward == 0 && self.forward_iter.is_none() {
            self.forward_iter = Some(self.iterations);
        }
        if missing.all_forward == 0 && missing.all_backward == 0 {
            self.all_iter = Some(self.iterations);
        }

        pl.done();

        OL::missing_nodes(&missing)
    }
}
