//! Breadth-first visit traits and implementations.

mod par_fast_cb;
mod seq;

pub use par_fast_cb::*;
pub use seq::*;

use dsi_progress_logger::ProgressLog;

/// The argument passed to the callback and filter of a breadth-first visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Args {
    /// The node being visited.
    pub node: usize,
    /// The parent of [`node`](Self::node) in the visit tree, or [`root`](Self::root) if
    /// `node` is the root.
    pub parent: usize,
    /// The root of the current visit tree.
    pub root: usize,
    /// The distance of [`node`](Self::node) from [`root`](Self::root).
    pub distance: usize,
}

/// A sequential breadth-first visit.
///
/// Implementations must provide [`visit_from_node`](SeqVisit::visit_from_node), which visits
/// the graph starting from a given node, and [`visit`](SeqVisit::visit), which visits the whole
/// graph.
///
/// For each node the visit invokes a callback with argument [`Args`]. Before discovering a node
/// the visit invokes a filter callback with a `&Args`; if the filter returns `false` the node is
/// not discovered, though it may still be discovered later via a different arc.
pub trait SeqVisit<A> {
    /// Visits the graph from the specified node.
    fn visit_from_node<C: FnMut(A), F: Fn(&A) -> bool>(
        &mut self,
        root: usize,
        callback: C,
        filter: F,
        pl: &mut impl ProgressLog,
    );

    /// Visits the whole graph.
    fn visit<C: FnMut(A), F: Fn(&A) -> bool>(
        &mut self,
        callback: C,
        filter: F,
        pl: &mut impl ProgressLog,
    );

    /// Resets the visit status, making it possible to reuse it.
    fn reset(&mut self);
}

/// A parallel breadth-first visit, with the same event and filter semantics as [`SeqVisit`], but
/// requiring both the callback and the filter to be `Sync` so that they may be invoked
/// concurrently from multiple frontier workers.
pub trait ParVisit<A> {
    /// Visits the graph from the specified node.
    fn visit_from_node<C: Fn(A) + Sync, F: Fn(&A) -> bool + Sync>(
        &mut self,
        root: usize,
        callback: C,
        filter: F,
        pl: &mut impl ProgressLog,
    );

    /// Visits the whole graph.
    fn visit<C: Fn(A) + Sync, F: Fn(&A) -> bool + Sync>(
        &mut self,
        callback: C,
        filter: F,
        pl: &mut impl ProgressLog,
    );

    /// Resets the visit status, making it possible to reuse it.
    fn reset(&mut self);
}
