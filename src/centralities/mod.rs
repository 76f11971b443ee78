//! Exact node centralities computed by one breadth-first visit per source: betweenness, and the
//! closeness/Lin/harmonic/exponential family of geometric centralities and their top-`k` variant.
//!
//! Every centrality in this module reflects *outbound* distances; pass a graph's transpose to a
//! function here to get the corresponding "negative" (inbound) centrality instead.

pub mod betweenness;
pub mod geometric;
pub mod top_k;

pub use betweenness::betweenness;
pub use geometric::{geometric_centralities, linear_geometric_centrality, GeometricCentralities};
pub use top_k::{top_k, top_k_harmonic, top_k_lin, TopKEntry};
