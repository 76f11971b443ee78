use crate::visits::bfv::{Args, SeqVisit};
use dsi_progress_logger::ProgressLog;
use std::collections::VecDeque;
use sux::bits::BitVec;
use webgraph::traits::RandomAccessGraph;

/// A simple sequential breadth-first visit on a graph.
pub struct SeqBreadthFirstVisit<'a, G: RandomAccessGraph> {
    graph: &'a G,
    visited: BitVec,
    queue: VecDeque<(usize, usize, usize)>,
}

impl<'a, G: RandomAccessGraph> SeqBreadthFirstVisit<'a, G> {
    /// Constructs a sequential breadth-first visit for the specified graph.
    pub fn new(graph: &'a G) -> Self {
        let num_nodes = graph.num_nodes();
        Self {
            graph,
            visited: BitVec::new(num_nodes),
            queue: VecDeque::new(),
        }
    }
}

impl<'a, G: RandomAccessGraph> SeqVisit<Args> for SeqBreadthFirstVisit<'a, G> {
    fn visit_from_node<C: FnMut(Args), F: Fn(&Args) -> bool>(
        &mut self,
        root: usize,
        mut callback: C,
        filter: F,
        pl: &mut impl ProgressLog,
    ) {
        let args = Args {
            node: root,
            parent: root,
            root,
            distance: 0,
        };

        if self.visited[root] || !filter(&args) {
            return;
        }

        self.visited.set(root, true);
        callback(args);
        self.queue.push_back((root, root, 0));

        while let Some((node, _parent, distance)) = self.queue.pop_front() {
            for succ in self.graph.successors(node) {
                let args = Args {
                    node: succ,
                    parent: node,
                    root,
                    distance: distance + 1,
                };
                if !self.visited[succ] && filter(&args) {
                    self.visited.set(succ, true);
                    callback(args);
                    self.queue.push_back((succ, node, distance + 1));
                }
            }
            pl.light_update();
        }
    }

    fn visit<C: FnMut(Args), F: Fn(&Args) -> bool>(
        &mut self,
        mut callback: C,
        filter: F,
        pl: &mut impl ProgressLog,
    ) {
        pl.expected_updates(Some(self.graph.num_nodes()));
        pl.start("Visiting graph with a sequential BFV...");

        for root in 0..self.graph.num_nodes() {
            self.visit_from_node(root, &mut callback, &filter, pl);
        }

        pl.done();
    }

    fn reset(&mut self) {
        self.visited.fill(false);
        self.queue.clear();
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use dsi_progress_logger::no_logging;
    use webgraph::graphs::vec_graph::VecGraph;

    #[test]
    fn test_visit_assigns_distances() {
        let graph = VecGraph::from_arcs([(0, 1), (1, 2), (2, 3), (0, 3)]);
        let mut visit = SeqBreadthFirstVisit::new(&graph);
        let mut distances = vec![usize::MAX; graph.num_nodes()];

        visit.visit_from_node(
            0,
            |args| distances[args.node] = args.distance,
            |_| true,
            &mut no_logging![],
        );

        assert_eq!(distances, vec![0, 1, 2, 1]);
    }

    #[test]
    fn test_reset_allows_revisit() {
        let graph = VecGraph::from_arcs([(0, 1)]);
        let mut visit = SeqBreadthFirstVisit::new(&graph);
        let mut count = 0;

        visit.visit_from_node(0, |_| count += 1, |_| true, &mut no_logging![]);
        visit.reset();
        visit.visit_from_node(0, |_| count += 1, |_| true, &mut no_logging![]);

        assert_eq!(count, 4);
    }
}
