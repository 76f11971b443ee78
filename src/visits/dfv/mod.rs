//! Depth-first visits.
//!
//! Implementations accept a callback function with argument [`EventNoPred`], or [`EventPred`]
//! if the visit keeps track of parent nodes. The associated filter argument types are
//! [`FilterArgsNoPred`] and [`FilterArgsPred`] respectively.
//!
//! Unlike [`crate::visits::bfv`], depth-first visits here return a
//! [`ControlFlow`](std::ops::ControlFlow) so that a callback can stop the visit early (e.g. as
//! soon as [`crate::sccs::tarjan`] has closed the last strongly connected component).

mod seq;
pub use seq::*;

use std::ops::ControlFlow;
use thiserror::Error;

/// The visit was interrupted by the caller for a reason unrelated to early completion.
#[derive(Error, Debug)]
#[error("the visit was interrupted")]
pub struct Interrupted;

/// The visit produced its final result before exhausting every node; the remainder of the
/// graph is irrelevant to the computation (e.g. all remaining nodes are known to collapse into
/// a single, already-identified strongly connected component).
#[derive(Error, Debug)]
#[error("stopped when done")]
pub struct StoppedWhenDone;

/// Types usable as callback arguments for a visit.
///
/// The associated [`Event::FilterArgs`] type is what gets passed to the filter invoked before a
/// node is discovered.
pub trait Event {
    /// The type passed as input to the filter.
    type FilterArgs;
}

/// A sequential visit.
///
/// Implementations must provide [`visit_filtered_with`](Sequential::visit_filtered_with), which
/// visits the graph from a given set of roots, threading an arbitrary `init` value through the
/// callback the way [`rayon::iter::ParallelIterator::map_with`] does for parallel iterators.
pub trait Sequential<A: Event> {
    /// Visits the graph from the specified nodes with an initialization value and a filter.
    fn visit_filtered_with<
        R: IntoIterator<Item = usize>,
        T,
        E,
        C: FnMut(&mut T, A) -> ControlFlow<E, ()>,
        F: FnMut(&mut T, A::FilterArgs) -> bool,
    >(
        &mut self,
        roots: R,
        init: T,
        callback: C,
        filter: F,
    ) -> ControlFlow<E, ()>;

    /// Visits the graph from the specified nodes with a filter.
    fn visit_filtered<
        R: IntoIterator<Item = usize>,
        E,
        C: FnMut(A) -> ControlFlow<E, ()>,
        F: FnMut(A::FilterArgs) -> bool,
    >(
        &mut self,
        roots: R,
        mut callback: C,
        mut filter: F,
    ) -> ControlFlow<E, ()> {
        self.visit_filtered_with(roots, (), |(), a| callback(a), |(), a| filter(a))
    }

    /// Visits the graph from the specified nodes.
    fn visit<R: IntoIterator<Item = usize>, E, C: FnMut(A) -> ControlFlow<E, ()>>(
        &mut self,
        roots: R,
        callback: C,
    ) -> ControlFlow<E, ()> {
        self.visit_filtered(roots, callback, |_| true)
    }

    /// Resets the visit status, making it possible to reuse it.
    fn reset(&mut self);
}

/// Types of callback events generated during depth-first visits keeping track of parent nodes
/// (and, depending on the implementation, of the visit path).
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum EventPred {
    /// Sets up state at the start of the visit. Does not happen if every root is already
    /// visited or filtered out.
    Init {
        /// The root of the current visit tree.
        root: usize,
    },
    /// The node is encountered for the first time: a new tree arc is being traversed, unless
    /// every field equals the root.
    Previsit {
        /// The current node.
        node: usize,
        /// The parent of `node` in the visit tree, or `root` if `node` is the root.
        parent: usize,
        /// The root of the current visit tree.
        root: usize,
        /// Length of the visit path from `root` to `node`.
        depth: usize,
    },
    /// The node has been encountered before: a back, forward or cross arc is being traversed.
    Revisit {
        /// The current node.
        node: usize,
        /// The predecessor used to reach `node`.
        pred: usize,
        /// The root of the current visit tree.
        root: usize,
        /// Length of the visit path from `root` to `node`.
        depth: usize,
        /// Whether `node` is currently on the visit path (a back arc is being retreated from).
        /// May always be `false` if the implementation does not track the visit path.
        on_stack: bool,
    },
    /// Enumeration of `node`'s successors has completed: a tree arc is being retreated from,
    /// unless every field equals the root.
    Postvisit {
        /// The current node.
        node: usize,
        /// The parent of `node` in the visit tree, or `root` if `node` is the root.
        parent: usize,
        /// The root of the current visit tree.
        root: usize,
        /// Length of the visit path from `root` to `node`.
        depth: usize,
    },
    /// The visit of the current tree has completed. Does not happen if the tree was empty or
    /// if a callback interrupted the visit.
    Done {
        /// The root of the current visit tree.
        root: usize,
    },
}

/// Filter arguments for visits that keep track of predecessors.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct FilterArgsPred {
    /// The current node.
    pub node: usize,
    /// The parent of `node` in the visit tree, or `root` if `node` is the root.
    pub pred: usize,
    /// The root of the current visit tree.
    pub root: usize,
    /// Length of the visit path from `root` to `node`.
    pub depth: usize,
}

impl Event for EventPred {
    type FilterArgs = FilterArgsPred;
}
