//! Exact and approximate distance-based graph measures: eccentricities, radius, diameter and
//! (approximate) neighbourhood functions.

pub mod exact_sum_sweep;
pub mod four_sweep;
pub mod hyperball;
pub mod neighbourhood_function;
pub mod sample_distance_cdf;
