use crate::utils::Threads;
use crate::visits::bfv::{Args, ParVisit};
use dsi_progress_logger::ProgressLog;
use parallel_frontier::prelude::{Frontier, ParallelIterator};
use rayon::prelude::*;
use std::{borrow::Borrow, sync::atomic::Ordering};
use sux::bits::AtomicBitVec;
use webgraph::traits::RandomAccessGraph;

/// Builder for [`ParallelBreadthFirstVisitFastCB`].
pub struct ParallelBreadthFirstVisitFastCBBuilder<'a, G: RandomAccessGraph, T = Threads> {
    graph: &'a G,
    granularity: usize,
    threads: T,
}

impl<'a, G: RandomAccessGraph> ParallelBreadthFirstVisitFastCBBuilder<'a, G, Threads> {
    /// Constructs a new builder with default parameters for the specified graph.
    pub fn new(graph: &'a G) -> Self {
        Self {
            graph,
            granularity: 1,
            threads: Threads::Default,
        }
    }
}

impl<'a, G: RandomAccessGraph, T> ParallelBreadthFirstVisitFastCBBuilder<'a, G, T> {
    /// Sets the number of nodes in each chunk of the frontier explored per thread.
    ///
    /// High granularity reduces overhead but may hurt balance on graphs with skewed outdegrees.
    pub fn granularity(mut self, granularity: usize) -> Self {
        self.granularity = granularity;
        self
    }

    /// Sets the visit to use the default thread pool.
    pub fn default_threadpool(self) -> ParallelBreadthFirstVisitFastCBBuilder<'a, G> {
        ParallelBreadthFirstVisitFastCBBuilder {
            graph: self.graph,
            granularity: self.granularity,
            threads: Threads::Default,
        }
    }

    /// Sets the visit to use a dedicated pool with the given number of threads.
    pub fn num_threads(self, num_threads: usize) -> ParallelBreadthFirstVisitFastCBBuilder<'a, G> {
        ParallelBreadthFirstVisitFastCBBuilder {
            graph: self.graph,
            granularity: self.granularity,
            threads: Threads::NumThreads(num_threads),
        }
    }

    /// Sets the visit to use the provided [`rayon::ThreadPool`].
    pub fn threadpool<T2: Borrow<rayon::ThreadPool>>(
        self,
        threadpool: T2,
    ) -> ParallelBreadthFirstVisitFastCBBuilder<'a, G, T2> {
        ParallelBreadthFirstVisitFastCBBuilder {
            graph: self.graph,
            granularity: self.granularity,
            threads: threadpool,
        }
    }
}

impl<'a, G: RandomAccessGraph> ParallelBreadthFirstVisitFastCBBuilder<'a, G, Threads> {
    /// Builds the parallel visit, consuming the builder.
    pub fn build(self) -> ParallelBreadthFirstVisitFastCB<'a, G> {
        ParallelBreadthFirstVisitFastCBBuilder {
            graph: self.graph,
            granularity: self.granularity,
            threads: self.threads.build(),
        }
        .build()
    }
}

impl<'a, G: RandomAccessGraph, T: Borrow<rayon::ThreadPool>>
    ParallelBreadthFirstVisitFastCBBuilder<'a, G, T>
{
    /// Builds the parallel visit, consuming the builder.
    pub fn build(self) -> ParallelBreadthFirstVisitFastCB<'a, G, T> {
        ParallelBreadthFirstVisitFastCB {
            graph: self.graph,
            granularity: self.granularity,
            visited: AtomicBitVec::new(self.graph.num_nodes()),
            threads: self.threads,
        }
    }
}

/// A parallel breadth-first visit with low memory consumption, at the cost of a smaller
/// frontier: the callback runs during successor enumeration rather than once per frontier
/// layer, so only nodes (not node/parent pairs) need to be stored.
pub struct ParallelBreadthFirstVisitFastCB<
    'a,
    G: RandomAccessGraph,
    T: Borrow<rayon::ThreadPool> = rayon::ThreadPool,
> {
    graph: &'a G,
    granularity: usize,
    visited: AtomicBitVec,
    threads: T,
}

impl<'a, G: RandomAccessGraph + Sync, T: Borrow<rayon::ThreadPool>> ParVisit<Args>
    for ParallelBreadthFirstVisitFastCB<'a, G, T>
{
    fn visit_from_node<C: Fn(Args) + Sync, F: Fn(&Args) -> bool + Sync>(
        &mut self,
        root: usize,
        callback: C,
        filter: F,
        pl: &mut impl ProgressLog,
    ) {
        let args = Args {
            node: root,
            parent: root,
            root,
            distance: 0,
        };
        if self.visited.get(root, Ordering::Relaxed) || !filter(&args) {
            return;
        }

        let pool = self.threads.borrow();
        // We do not provide a capacity, relying on the frontier growing dynamically.
        let mut curr_frontier = Frontier::with_threads(pool, None);
        let mut next_frontier = Frontier::with_threads(pool, None);

        pool.install(|| curr_frontier.push(root));
        self.visited.set(root, true, Ordering::Relaxed);
        callback(args);

        let mut distance = 1;

        while !curr_frontier.is_empty() {
            pool.install(|| {
                curr_frontier
                    .par_iter()
                    .chunks(self.granularity)
                    .for_each(|chunk| {
                        chunk.into_iter().for_each(|&node| {
                            self.graph.successors(node).into_iter().for_each(|succ| {
                                let args = Args {
                                    node: succ,
                                    parent: node,
                                    root,
                                    distance,
                                };
                                if filter(&args) && !self.visited.swap(succ, true, Ordering::Relaxed)
                                {
                                    callback(args);
                                    next_frontier.push(succ);
                                }
                            })
                        })
                    });
            });
            pl.update_with_count(curr_frontier.len());
            distance += 1;
            std::mem::swap(&mut curr_frontier, &mut next_frontier);
            next_frontier.clear();
        }
    }

    fn visit<C: Fn(Args) + Sync, F: Fn(&Args) -> bool + Sync>(
        &mut self,
        callback: C,
        filter: F,
        pl: &mut impl ProgressLog,
    ) {
        for node in 0..self.graph.num_nodes() {
            self.visit_from_node(node, &callback, &filter, pl);
        }
    }

    fn reset(&mut self) {
        self.visited.fill(false, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use dsi_progress_logger::no_logging;
    use std::sync::atomic::AtomicUsize;
    use webgraph::graphs::vec_graph::VecGraph;

    #[test]
    fn test_visit_counts_all_nodes() {
        let graph = VecGraph::from_arcs([(0, 1), (1, 2), (2, 3), (0, 3)]);
        let mut visit = ParallelBreadthFirstVisitFastCBBuilder::new(&graph)
            .num_threads(2)
            .build();
        let visited_count = AtomicUsize::new(0);

        visit.visit_from_node(
            0,
            |_| {
                visited_count.fetch_add(1, Ordering::Relaxed);
            },
            |_| true,
            &mut no_logging![],
        );

        assert_eq!(visited_count.load(Ordering::Relaxed), graph.num_nodes());
    }
}
