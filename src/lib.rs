//! Parallel and sequential graph kernels built on top of [`webgraph`]: breadth-first visits,
//! strongly/weakly connected components, exact and approximate (HyperLogLog-based) distance
//! distributions, `SumSweep`-based radius/diameter, and node centralities.

pub mod bidirectional;
pub mod centralities;
pub mod connected_components;
pub mod distances;
pub mod error;
pub mod sccs;
pub mod utils;
pub mod visits;

/// Module exposing all traits in a single level.
pub mod traits {
    use super::*;
    pub use utils::traits::*;
}

/// Use `use graph_kernels::prelude::*;` to import common utilities, modules and all traits.
pub mod prelude {
    use super::*;
    pub use bidirectional::BidirectionalGraph;
    pub use traits::*;
    pub use visits::bfv;
    pub use visits::dfv;
    #[doc(hidden)]
    pub use utils::MmapFlags;
    pub use utils::TempMmapOptions;
}
