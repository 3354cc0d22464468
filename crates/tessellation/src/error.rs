use keycase_kernel::KernelError;
use thiserror::Error;

use crate::mesh::{FaceIndex, PointIndex};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum MeshError {
    #[error("frame generation failed: {0}")]
    Kernel(#[from] KernelError),

    #[error("face {face} references point {index} but the mesh has {point_count} points")]
    DanglingIndex {
        face: FaceIndex,
        index: PointIndex,
        point_count: usize,
    },
}
