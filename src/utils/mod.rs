//! Utility types shared by the rest of the crate: probabilistic counters, memory-mapped
//! backing storage, thread pool configuration and small numeric helpers.

mod hyper_log_log;
mod math;
mod mmap_helper;

pub use hyper_log_log::*;
pub use math::*;
pub use mmap_helper::*;

/// Marker traits re-exported at the crate root so that `graph_kernels::traits::*` gives
/// access to everything a caller needs to implement their own backing graph or counter.
pub mod traits {
    pub use super::hyper_log_log::{ApproximatedCounter, Counter};
}

/// Fills a [`Vec`] of length `len` by calling `f` once per element.
///
/// This is a thin helper used by [`MmapSlice`](crate::utils::MmapSlice) so that RAM-backed
/// and mmap-backed construction share the same closure-based initialization logic.
pub(crate) fn closure_vec<T>(mut f: impl FnMut() -> T, len: usize) -> Vec<T> {
    let mut v = Vec::with_capacity(len);
    for _ in 0..len {
        v.push(f());
    }
    v
}

/// Specifies which [`rayon::ThreadPool`] a parallel algorithm should run on.
///
/// Builders across the crate (parallel visits, `SumSweep`, `HyperBall`, top-k centralities)
/// accept a generic `T: Borrow<rayon::ThreadPool>` parameter that defaults to `Threads`. This
/// lets a caller either lean on sensible defaults or hand in a pool they built and own, without
/// the builder needing two separate code paths.
#[derive(Clone)]
pub enum Threads {
    /// Use rayon's global thread pool.
    Default,
    /// Build a dedicated pool with the given number of threads.
    NumThreads(usize),
}

impl Threads {
    /// Resolves this configuration into an owned [`rayon::ThreadPool`].
    ///
    /// [`Threads::Default`] returns a pool with rayon's default parallelism rather than
    /// literally borrowing the global pool, so that callers always get a value they can
    /// [`Borrow`] uniformly regardless of which variant was chosen.
    pub fn build(self) -> rayon::ThreadPool {
        let builder = rayon::ThreadPoolBuilder::new();
        let builder = match self {
            Threads::Default => builder,
            Threads::NumThreads(num_threads) => builder.num_threads(num_threads),
        };
        builder
            .build()
            .expect("Cannot build a rayon thread pool with the requested configuration")
    }
}
