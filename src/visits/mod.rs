//! Traits and implementations of both depth-first and breadth-first visits on graphs.
//!
//! Breadth-first visits come in 2 flavours:
//! * [`Sequential`](bfv::SeqBreadthFirstVisit): a single threaded visit.
//! * [`Parallel with fast callbacks`](bfv::ParallelBreadthFirstVisitFastCB): a parallel visit
//!   where the callback is called during successor enumeration, allowing the frontier to store
//!   only nodes (not their parents). This trades off long-callback parallelism for lower memory
//!   use.
//!
//! Depth-first visits are used where a [`ControlFlow`](std::ops::ControlFlow)-driven,
//! previsit/postvisit event stream is required, most notably by [`crate::sccs::tarjan`].

pub mod bfv;
pub mod dfv;
