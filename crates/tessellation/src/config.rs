use keycase_kernel::{Sampling, Trim};
use serde::{Deserialize, Serialize};

/// Densities and tolerances for turning patches into meshes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshConfig {
    /// Steps per parametric direction of one patch.
    pub surface_fidelity: usize,
    /// Points closer than this are welded when merging surfaces.
    pub merge_threshold: f64,
    pub sampling: Sampling,
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            surface_fidelity: 10,
            merge_threshold: 0.1,
            sampling: Sampling::default(),
        }
    }
}

impl MeshConfig {
    /// Coarse meshes for quick previews.
    pub fn draft() -> Self {
        Self {
            surface_fidelity: 4,
            sampling: Sampling::draft(),
            ..Self::default()
        }
    }

    pub fn with_fidelity(mut self, surface_fidelity: usize) -> Self {
        self.surface_fidelity = surface_fidelity;
        self
    }

    /// Untrimmed tessellation at this config's fidelity.
    pub fn surface_options(&self) -> SurfaceOptions {
        SurfaceOptions {
            fidelity: self.surface_fidelity,
            sampling: self.sampling,
            ..SurfaceOptions::default()
        }
    }
}

/// Options for tessellating one patch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SurfaceOptions {
    pub fidelity: usize,
    /// Cut applied to the four row curves of the patch.
    pub rows_trim: Trim,
    /// Cut applied to the generated column curves.
    pub columns_trim: Trim,
    pub sampling: Sampling,
}

impl Default for SurfaceOptions {
    fn default() -> Self {
        Self {
            fidelity: 10,
            rows_trim: Trim::NONE,
            columns_trim: Trim::NONE,
            sampling: Sampling::default(),
        }
    }
}

impl SurfaceOptions {
    pub fn with_fidelity(fidelity: usize) -> Self {
        Self {
            fidelity,
            ..Self::default()
        }
    }
}
