use crate::visits::dfv::{Event, EventPred, FilterArgsPred, Sequential};
use std::ops::ControlFlow::{self, Continue};
use sux::bits::BitVec;
use webgraph::traits::{RandomAccessGraph, RandomAccessLabeling};

/// A sequential depth-first visit that keeps track of predecessors but not of nodes currently
/// on the visit path.
///
/// This is an iterative implementation that does not need a large call stack: the explicit
/// [`stack`](SeqPred::stack) holds, for every node on the current visit path, an iterator over
/// its remaining successors paired with its parent.
pub struct SeqPred<'a, G: RandomAccessGraph> {
    graph: &'a G,
    stack: Vec<(<<G as RandomAccessLabeling>::Labels<'a> as IntoIterator>::IntoIter, usize)>,
    known: BitVec,
}

impl<'a, G: RandomAccessGraph> SeqPred<'a, G> {
    /// Creates a new sequential depth-first visit.
    pub fn new(graph: &'a G) -> Self {
        let num_nodes = graph.num_nodes();
        Self {
            graph,
            stack: Vec::with_capacity(16),
            known: BitVec::new(num_nodes),
        }
    }

    /// Returns an iterator over the nodes still on the visit path, except for the last one, in
    /// reverse order of visit.
    ///
    /// Useful only after an interrupted visit: in a completed visit the stack is empty, and the
    /// last node on the visit path at the time of interruption must be handled separately by the
    /// caller (it is available as the event's `node` field).
    pub fn stack(&mut self) -> impl Iterator<Item = usize> + '_ {
        std::iter::from_fn(move || {
            if self.stack.len() <= 1 {
                None
            } else {
                self.stack.pop().map(|(_, parent)| parent)
            }
        })
    }
}

impl<G: RandomAccessGraph> Sequential<EventPred> for SeqPred<'_, G> {
    fn visit_filtered_with<
        R: IntoIterator<Item = usize>,
        T,
        E,
        C: FnMut(&mut T, EventPred) -> ControlFlow<E, ()>,
        F: FnMut(&mut T, FilterArgsPred) -> bool,
    >(
        &mut self,
        roots: R,
        mut init: T,
        mut callback: C,
        mut filter: F,
    ) -> ControlFlow<E, ()> {
        for root in roots {
            if self.known[root]
                || !filter(
                    &mut init,
                    FilterArgsPred {
                        node: root,
                        pred: root,
                        root,
                        depth: 0,
                    },
                )
            {
                continue;
            }

            callback(&mut init, EventPred::Init { root })?;

            self.known.set(root, true);
            callback(
                &mut init,
                EventPred::Previsit {
                    node: root,
                    parent: root,
                    root,
                    depth: 0,
                },
            )?;

            self.stack
                .push((self.graph.successors(root).into_iter(), root));

            let mut curr = root;

            'recurse: loop {
                let depth = self.stack.len();
                let Some((iter, parent)) = self.stack.last_mut() else {
                    callback(&mut init, EventPred::Done { root })?;
                    break;
                };

                for succ in iter {
                    if self.known[succ] {
                        callback(
                            &mut init,
                            EventPred::Revisit {
                                node: succ,
                                pred: curr,
                                root,
                                depth,
                                on_stack: false,
                            },
                        )?;
                    } else if filter(
                        &mut init,
                        FilterArgsPred {
                            node: succ,
                            pred: curr,
                            root,
                            depth,
                        },
                    ) {
                        self.known.set(succ, true);
                        callback(
                            &mut init,
                            EventPred::Previsit {
                                node: succ,
                                parent: curr,
                                root,
                                depth,
                            },
                        )?;
                        self.stack
                            .push((self.graph.successors(succ).into_iter(), curr));
                        curr = succ;
                        continue 'recurse;
                    }
                }

                callback(
                    &mut init,
                    EventPred::Postvisit {
                        node: curr,
                        parent: *parent,
                        root,
                        depth: depth - 1,
                    },
                )?;

                curr = *parent;
                self.stack.pop();
            }
        }

        Continue(())
    }

    fn reset(&mut self) {
        self.stack.clear();
        self.known.fill(false);
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use webgraph::graphs::vec_graph::VecGraph;

    #[test]
    fn test_postvisit_order_is_leaves_first() {
        let graph = VecGraph::from_arcs([(0, 1), (1, 2), (1, 3), (0, 3)]);
        let mut visit = SeqPred::new(&graph);
        let mut postorder = Vec::new();

        let result = visit.visit(0..graph.num_nodes(), |event| {
            if let EventPred::Postvisit { node, .. } = event {
                postorder.push(node);
            }
            Continue::<(), _>(())
        });

        assert!(result.is_continue());
        assert_eq!(postorder, vec![2, 3, 1, 0]);
    }
}
