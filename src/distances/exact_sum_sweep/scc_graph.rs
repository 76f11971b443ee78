//! A condensation of the strongly-connected-components graph, used by the `AllCCUpperBound`
//! step to propagate pivot eccentricity bounds along arcs that cross component boundaries.

use crate::sccs::Sccs;
use dsi_progress_logger::ProgressLog;
use nonmax::NonMaxUsize;
use webgraph::traits::RandomAccessGraph;

/// A single arc of the condensation: a connection from its source component to
/// [`target`](Self::target), realized in the original graph by the arc `(start, end)`.
#[derive(Clone, Debug)]
pub struct SccGraphConnection {
    /// The component this connection leads to.
    pub target: usize,
    /// The start node of the connection, in the source component.
    pub start: usize,
    /// The end node of the connection, in the target component.
    pub end: usize,
}

/// For each pair of strongly connected components joined by at least one arc, one representative
/// arc, chosen to maximize the sum of the two endpoints' degrees (so that visits started at
/// either endpoint are more likely to have already explored a large portion of their component).
pub struct SccGraph {
    /// `segments_offset[c]` is the index into `data` of the first connection out of component `c`.
    segments_offset: Box<[usize]>,
    data: Box<[SccGraphConnection]>,
}

#[inline(always)]
fn arc_value<G1: RandomAccessGraph, G2: RandomAccessGraph>(
    graph: &G1,
    reversed_graph: &G2,
    start: usize,
    end: usize,
) -> usize {
    reversed_graph.outdegree(start) + graph.outdegree(end)
}

impl SccGraph {
    /// Builds an empty condensation, since on a symmetric graph strongly connected components
    /// coincide with connected components and the `AllCCUpperBound` step never needs to cross
    /// between them.
    pub fn new_symm(scc: &Sccs) -> Self {
        Self {
            segments_offset: vec![0; scc.num_components()].into_boxed_slice(),
            data: Vec::new().into_boxed_slice(),
        }
    }

    /// Builds the condensation of `graph`, whose strongly connected components are `scc` and
    /// whose transpose is `reversed_graph`.
    pub fn new_directed<G1: RandomAccessGraph, G2: RandomAccessGraph>(
        graph: &G1,
        reversed_graph: &G2,
        scc: &Sccs,
        pl: &mut impl ProgressLog,
    ) -> Self {
        pl.display_memory(false);
        pl.expected_updates(None);
        pl.start("Computing strongly connected components graph...");

        let (segments_offset, data) = Self::find_edges_through_scc(graph, reversed_graph, scc, pl);

        pl.done();

        Self {
            segments_offset: segments_offset.into_boxed_slice(),
            data: data.into_boxed_slice(),
        }
    }

    /// The connections leading out of `component`.
    ///
    /// # Panics
    /// Panics if `component` is not a valid component index.
    pub fn children(&self, component: usize) -> &[SccGraphConnection] {
        let offset = self.segments_offset[component];
        let end = self
            .segments_offset
            .get(component + 1)
            .copied()
            .unwrap_or(self.data.len());
        &self.data[offset..end]
    }

    fn find_edges_through_scc<G1: RandomAccessGraph, G2: RandomAccessGraph>(
        graph: &G1,
        reversed_graph: &G2,
        scc: &Sccs,
        pl: &mut impl ProgressLog,
    ) -> (Vec<usize>, Vec<SccGraphConnection>) {
        pl.item_name("node");
        pl.display_memory(false);
        pl.expected_updates(Some(graph.num_nodes()));
        pl.start("Selecting arcs...");

        let num_components = scc.num_components();
        let node_components = scc.components();
        let mut vertices_in_scc = vec![Vec::new(); num_components];
        for (vertex, &component) in node_components.iter().enumerate() {
            vertices_in_scc[component].push(vertex);
        }

        let mut children_of = vec![Vec::new(); num_components];

        // One candidate bridge arc per target component, kept at no extra width over `usize`
        // since `None` ("no arc touched this component yet") needs no reserved node id.
        let mut best_start: Vec<Option<NonMaxUsize>> = vec![None; num_components];
        let mut best_end: Vec<Option<NonMaxUsize>> = vec![None; num_components];
        let mut touched = Vec::new();

        for (c, component) in vertices_in_scc.into_iter().enumerate() {
            for v in component {
                for succ in graph.successors(v) {
                    let succ_component = node_components[succ];
                    if c == succ_component {
                        continue;
                    }

                    match best_start[succ_component] {
                        None => {
                            best_start[succ_component] = NonMaxUsize::new(v);
                            best_end[succ_component] = NonMaxUsize::new(succ);
                            touched.push(succ_component);
                        }
                        Some(cur_start) => {
                            let cur_end = best_end[succ_component].unwrap().get();
                            if arc_value(graph, reversed_graph, v, succ)
                                > arc_value(graph, reversed_graph, cur_start.get(), cur_end)
                            {
                                best_start[succ_component] = NonMaxUsize::new(v);
                                best_end[succ_component] = NonMaxUsize::new(succ);
                            }
                        }
                    }
                }
                pl.light_update();
            }

            for &child in touched.iter() {
                children_of[c].push(SccGraphConnection {
                    target: child,
                    start: best_start[child].unwrap().get(),
                    end: best_end[child].unwrap().get(),
                });
                best_start[child] = None;
                best_end[child] = None;
            }
            touched.clear();
        }

        pl.done();

        pl.item_name("connection");
        pl.expected_updates(Some(children_of.iter().map(|v| v.len()).sum()));
        pl.start("Creating connections...");

        let mut segments_offset = Vec::with_capacity(num_components);
        let mut data = Vec::new();

        for children in children_of {
            segments_offset.push(data.len());
            data.extend(children);
            pl.update_with_count(data.len());
        }

        pl.done();

        (segments_offset, data)
    }
}
