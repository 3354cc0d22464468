pub mod error;
pub mod geometry;
pub mod stitching;

pub use error::KernelError;
pub use geometry::bezier::{BezierControlPoints, Trim};
pub use geometry::frame::{Frame, FrameContext, FrameSeed};
pub use geometry::patch::BezierPatch;
pub use geometry::vector::Vec3;

/// Samples used by [`BezierControlPoints::length`] when no count is given.
pub const DEFAULT_LENGTH_STEPS: usize = 10;

/// Polyline segments used to map arclength trims onto curve parameters.
pub const DEFAULT_TRIM_FIDELITY: usize = 100;

/// Sampling densities for arclength estimation.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Sampling {
    /// Polyline samples per curve when estimating its length.
    pub length_steps: usize,
    /// Polyline segments per curve when converting trims to parameters.
    pub trim_fidelity: usize,
}

impl Default for Sampling {
    fn default() -> Self {
        Self {
            length_steps: DEFAULT_LENGTH_STEPS,
            trim_fidelity: DEFAULT_TRIM_FIDELITY,
        }
    }
}

impl Sampling {
    /// Coarse sampling for previews.
    pub fn draft() -> Self {
        Self {
            length_steps: 4,
            trim_fidelity: 20,
        }
    }

    /// Dense sampling for final output.
    pub fn fine() -> Self {
        Self {
            length_steps: 50,
            trim_fidelity: 1000,
        }
    }

    /// Split `fidelity` steps across joined curves at this sampling's length estimate.
    pub fn weighted_steps(&self, curves: &[BezierControlPoints], fidelity: usize) -> Vec<usize> {
        geometry::bezier::weighted_steps_with(curves, fidelity, self.length_steps)
    }
}
