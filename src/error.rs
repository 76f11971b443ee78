//! Error types shared by every kernel in this crate.
//!
//! Most functions return [`anyhow::Result`] and attach context with [`anyhow::Context`] as they
//! unwind, in the same style the rest of the crate's dependency stack uses. [`KernelError`]
//! gives the handful of error conditions that a caller might want to match on (as opposed to
//! merely log or propagate) a stable shape.

use thiserror::Error;

/// Errors a kernel can report beyond the ordinary I/O failures that bubble up from the
/// underlying graph representation.
#[derive(Error, Debug)]
pub enum KernelError {
    /// The input graph does not satisfy a precondition a kernel requires, e.g. an undirected
    /// kernel was handed a non-symmetric graph, or a graph with zero nodes was passed to an
    /// operation that needs at least one.
    #[error("input graph does not satisfy the required shape: {0}")]
    InputShape(String),

    /// An internal invariant that the algorithm relies on was violated at runtime. This
    /// indicates a bug rather than bad input, but is reported as a recoverable error rather
    /// than a panic so that long-running batch jobs can skip the offending graph and continue.
    #[error("internal invariant violated: {0}")]
    InvariantViolation(String),

    /// A worker thread panicked or returned an error while a kernel was dispatching parallel
    /// work across a [`rayon::ThreadPool`].
    #[error("a worker thread failed: {0}")]
    WorkerFailure(String),

    /// An I/O error occurred while reading the graph or writing results, wrapped here only to
    /// give it a stable variant name; most I/O errors are instead propagated via
    /// [`anyhow::Context`].
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
