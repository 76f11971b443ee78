//! Result structs returned by the directed-graph [`super::Level::run`] entry points.

/// The results produced by calling [`run`](super::Level::run) on [`All`](super::All).
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct All {
    /// The forward eccentricity of every node.
    pub forward_eccentricities: Box<[usize]>,
    /// The backward eccentricity of every node.
    pub backward_eccentricities: Box<[usize]>,
    /// The diameter.
    pub diameter: usize,
    /// The radius.
    pub radius: usize,
    /// A vertex whose forward eccentricity equals the diameter.
    pub diametral_vertex: usize,
    /// A vertex whose forward eccentricity equals the radius.
    pub radial_vertex: usize,
    /// Number of iterations before the radius was found.
    pub radius_iterations: usize,
    /// Number of iterations before the diameter was found.
    pub diameter_iterations: usize,
    /// Number of iterations before all forward eccentricities were found.
    pub forward_iterations: usize,
    /// Number of iterations before all eccentricities, forward and backward, were found.
    pub all_iterations: usize,
}

/// The results produced by calling [`run`](super::Level::run) on [`AllForward`](super::AllForward).
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct AllForward {
    /// The forward eccentricity of every node.
    pub forward_eccentricities: Box<[usize]>,
    /// The diameter.
    pub diameter: usize,
    /// The radius.
    pub radius: usize,
    /// A vertex whose forward eccentricity equals the diameter.
    pub diametral_vertex: usize,
    /// A vertex whose forward eccentricity equals the radius.
    pub radial_vertex: usize,
    /// Number of iterations before the radius was found.
    pub radius_iterations: usize,
    /// Number of iterations before the diameter was found.
    pub diameter_iterations: usize,
    /// Number of iterations before all forward eccentricities were found.
    pub forward_iterations: usize,
}

/// The results produced by calling [`run`](super::Level::run) on [`RadiusDiameter`](super::RadiusDiameter).
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct RadiusDiameter {
    /// The diameter.
    pub diameter: usize,
    /// The radius.
    pub radius: usize,
    /// A vertex whose forward eccentricity equals the diameter.
    pub diametral_vertex: usize,
    /// A vertex whose forward eccentricity equals the radius.
    pub radial_vertex: usize,
    /// Number of iterations before the radius was found.
    pub radius_iterations: usize,
    /// Number of iterations before the diameter was found.
    pub diameter_iterations: usize,
}

/// The results produced by calling [`run`](super::Level::run) on [`Diameter`](super::Diameter).
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct Diameter {
    /// The diameter.
    pub diameter: usize,
    /// A vertex whose forward eccentricity equals the diameter.
    pub diametral_vertex: usize,
    /// Number of iterations before the diameter was found.
    pub diameter_iterations: usize,
}

/// The results produced by calling [`run`](super::Level::run) on [`Radius`](super::Radius).
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct Radius {
    /// The radius.
    pub radius: usize,
    /// A vertex whose forward eccentricity equals the radius.
    pub radial_vertex: usize,
    /// Number of iterations before the radius was found.
    pub radius_iterations: usize,
}
