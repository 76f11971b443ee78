//! The five output levels of the ExactSumSweep algorithm, from the full eccentricity array down
//! to just the radius, each computing only as much as it needs to.

use super::computer::DirExactSumSweepComputer;
use super::{outputs, outputs_symm};
use dsi_progress_logger::ProgressLog;
use sux::bits::BitVec;
use webgraph::traits::RandomAccessGraph;

/// How many nodes are still missing an exact answer for each of the quantities the algorithm may
/// be asked to compute; used by [`DirExactSumSweepComputer::compute`] to decide when to stop.
#[derive(Debug, Clone, Copy, Default)]
pub struct Missing {
    pub radius: usize,
    pub diameter_forward: usize,
    pub diameter_backward: usize,
    pub all_forward: usize,
    pub all_backward: usize,
}

impl core::ops::Add for Missing {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            radius: self.radius + rhs.radius,
            diameter_forward: self.diameter_forward + rhs.diameter_forward,
            diameter_backward: self.diameter_backward + rhs.diameter_backward,
            all_forward: self.all_forward + rhs.all_forward,
            all_backward: self.all_backward + rhs.all_backward,
        }
    }
}

/// A requested output of the ExactSumSweep algorithm.
///
/// Each implementor selects which bounds the adaptive step selector must close before it may
/// stop, and assembles only the corresponding subset of fields into its output.
pub trait Level {
    /// The output of [`run`](Self::run), for directed graphs.
    type Output;
    /// The output of [`run_symm`](Self::run_symm), for symmetric (undirected) graphs.
    type OutputSymm;

    /// Runs the algorithm on a directed graph.
    ///
    /// `radial_vertices` restricts the radius search to the given subset of nodes; if `None`,
    /// the algorithm uses the nodes that can reach the largest strongly connected component.
    fn run(
        graph: impl RandomAccessGraph,
        transpose: impl RandomAccessGraph,
        radial_vertices: Option<BitVec>,
        pl: &mut impl ProgressLog,
    ) -> Self::Output;

    /// Runs the algorithm on a symmetric (undirected) graph.
    fn run_symm(graph: impl RandomAccessGraph, pl: &mut impl ProgressLog) -> Self::OutputSymm;

    /// Extracts the count of still-missing answers relevant to this level.
    fn missing_nodes(missing: &Missing) -> usize;
}

/// Computes every forward and backward eccentricity.
///
/// Equivalent to [`AllForward`] on a symmetric graph, where the two coincide.
pub struct All;

impl Level for All {
    type Output = outputs::All;
    type OutputSymm = outputs_symm::All;

    fn run(
        graph: impl RandomAccessGraph,
        transpose: impl RandomAccessGraph,
        radial_vertices: Option<BitVec>,
        pl: &mut impl ProgressLog,
    ) -> Self::Output {
        let mut computer =
            DirExactSumSweepComputer::<_, _, Self>::new(&graph, &transpose, radial_vertices, pl);
        computer.compute(pl);

        debug_assert!(computer.all_iter.is_some());
        debug_assert!(computer.forward_iter.is_some());

        outputs::All {
            forward_eccentricities: computer.forward_low,
            backward_eccentricities: computer.backward_high,
            diameter: computer.diameter_low,
            radius: computer.radius_high,
            diametral_vertex: computer.diameter_vertex,
            radial_vertex: computer.radius_vertex,
            radius_iterations: computer.radius_iterations.unwrap(),
            diameter_iterations: computer.diameter_iterations.unwrap(),
            forward_iterations: computer.forward_iter.unwrap(),
            all_iterations: computer.all_iter.unwrap(),
        }
    }

    fn run_symm(graph: impl RandomAccessGraph, pl: &mut impl ProgressLog) -> Self::OutputSymm {
        let mut computer = DirExactSumSweepComputer::<_, _, Self>::new_symm(&graph, pl);
        computer.compute(pl);

        debug_assert!(computer.forward_iter.is_some());

        outputs_symm::All {
            eccentricities: computer.forward_low,
            diameter: computer.diameter_low,
            radius: computer.radius_high,
            diametral_vertex: computer.diameter_vertex,
            radial_vertex: computer.radius_vertex,
            radius_iterations: computer.radius_iterations.unwrap(),
            diameter_iterations: computer.diameter_iterations.unwrap(),
            iterations: computer.forward_iter.unwrap(),
        }
    }

    fn missing_nodes(missing: &Missing) -> usize {
        missing.all_forward + missing.all_backward
    }
}

/// Computes every forward eccentricity, plus the radius and diameter.
pub struct AllForward;

impl Level for AllForward {
    type Output = outputs::AllForward;
    type OutputSymm = outputs_symm::All;

    fn run(
        graph: impl RandomAccessGraph,
        transpose: impl RandomAccessGraph,
        radial_vertices: Option<BitVec>,
        pl: &mut impl ProgressLog,
    ) -> Self::Output {
        let mut computer =
            DirExactSumSweepComputer::<_, _, Self>::new(&graph, &transpose, radial_vertices, pl);
        computer.compute(pl);

        debug_assert!(computer.forward_iter.is_some());

        outputs::AllForward {
            forward_eccentricities: computer.forward_low,
            diameter: computer.diameter_low,
            radius: computer.radius_high,
            diametral_vertex: computer.diameter_vertex,
            radial_vertex: computer.radius_vertex,
            radius_iterations: computer.radius_iterations.unwrap(),
            diameter_iterations: computer.diameter_iterations.unwrap(),
            forward_iterations: computer.forward_iter.unwrap(),
        }
    }

    fn run_symm(graph: impl RandomAccessGraph, pl: &mut impl ProgressLog) -> Self::OutputSymm {
        All::run_symm(graph, pl)
    }

    fn missing_nodes(missing: &Missing) -> usize {
        missing.all_forward
    }
}

/// Computes both the radius and the diameter.
pub struct RadiusDiameter;

impl Level for RadiusDiameter {
    type Output = outputs::RadiusDiameter;
    type OutputSymm = outputs_symm::RadiusDiameter;

    fn run(
        graph: impl RandomAccessGraph,
        transpose: impl RandomAccessGraph,
        radial_vertices: Option<BitVec>,
        pl: &mut impl ProgressLog,
    ) -> Self::Output {
        let mut computer =
            DirExactSumSweepComputer::<_, _, Self>::new(&graph, &transpose, radial_vertices, pl);
        computer.compute(pl);

        outputs::RadiusDiameter {
            diameter: computer.diameter_low,
            radius: computer.radius_high,
            diametral_vertex: computer.diameter_vertex,
            radial_vertex: computer.radius_vertex,
            radius_iterations: computer.radius_iterations.unwrap(),
            diameter_iterations: computer.diameter_iterations.unwrap(),
        }
    }

    fn run_symm(graph: impl RandomAccessGraph, pl: &mut impl ProgressLog) -> Self::OutputSymm {
        let mut computer = DirExactSumSweepComputer::<_, _, Self>::new_symm(&graph, pl);
        computer.compute(pl);

        outputs_symm::RadiusDiameter {
            diameter: computer.diameter_low,
            radius: computer.radius_high,
            diametral_vertex: computer.diameter_vertex,
            radial_vertex: computer.radius_vertex,
            radius_iterations: computer.radius_iterations.unwrap(),
            diameter_iterations: computer.diameter_iterations.unwrap(),
        }
    }

    fn missing_nodes(missing: &Missing) -> usize {
        missing.radius + std::cmp::min(missing.diameter_forward, missing.diameter_backward)
    }
}

/// Computes only the diameter.
pub struct Diameter;

impl Level for Diameter {
    type Output = outputs::Diameter;
    type OutputSymm = outputs_symm::Diameter;

    fn run(
        graph: impl RandomAccessGraph,
        transpose: impl RandomAccessGraph,
        radial_vertices: Option<BitVec>,
        pl: &mut impl ProgressLog,
    ) -> Self::Output {
        let mut computer =
            DirExactSumSweepComputer::<_, _, Self>::new(&graph, &transpose, radial_vertices, pl);
        computer.compute(pl);

        outputs::Diameter {
            diameter: computer.diameter_low,
            diametral_vertex: computer.diameter_vertex,
            diameter_iterations: computer.diameter_iterations.unwrap(),
        }
    }

    fn run_symm(graph: impl RandomAccessGraph, pl: &mut impl ProgressLog) -> Self::OutputSymm {
        let mut computer = DirExactSumSweepComputer::<_, _, Self>::new_symm(&graph, pl);
        computer.compute(pl);

        outputs_symm::Diameter {
            diameter: computer.diameter_low,
            diametral_vertex: computer.diameter_vertex,
            diameter_iterations: computer.diameter_iterations.unwrap(),
        }
    }

    fn missing_nodes(missing: &Missing) -> usize {
        std::cmp::min(missing.diameter_forward, missing.diameter_backward)
    }
}

/// Computes only the radius.
pub struct Radius;

impl Level for Radius {
    type Output = outputs::Radius;
    type OutputSymm = outputs_symm::Radius;

    fn run(
        graph: impl RandomAccessGraph,
        transpose: impl RandomAccessGraph,
        radial_vertices: Option<BitVec>,
        pl: &mut impl ProgressLog,
    ) -> Self::Output {
        let mut computer =
            DirExactSumSweepComputer::<_, _, Self>::new(&graph, &transpose, radial_vertices, pl);
        computer.compute(pl);

        outputs::Radius {
            radius: computer.radius_high,
            radial_vertex: computer.radius_vertex,
            radius_iterations: computer.radius_iterations.unwrap(),
        }
    }

    fn run_symm(graph: impl RandomAccessGraph, pl: &mut impl ProgressLog) -> Self::OutputSymm {
        let mut computer = DirExactSumSweepComputer::<_, _, Self>::new_symm(&graph, pl);
        computer.compute(pl);

        outputs_symm::Radius {
            radius: computer.radius_high,
            radial_vertex: computer.radius_vertex,
            radius_iterations: computer.radius_iterations.unwrap(),
        }
    }

    fn missing_nodes(missing: &Missing) -> usize {
        missing.radius
    }
}
