//! The keyboard case design: parameters, patch layout and scene assembly.

pub mod error;
pub mod params;
pub mod patches;
pub mod scene;

pub use error::{DesignError, LoadError};
pub use params::{ArrowBlock, DerivedParameters, DesignParameters, Stagger, load_parameters, load_parameters_file};
pub use patches::{ArcPatches, arc_patches};
pub use scene::{Scene, SceneNode};

use keycase_tessellation::{ExtrusionSpan, FlatMesh, MeshConfig, generate_extruded_surface, merge_patches_by_distance};
use tracing::{debug, instrument};

/// Wall thickness of the case shell.
pub const SHELL_THICKNESS: f64 = 2.0;

/// Build the right half of the case.
///
/// Every arc patch becomes a closed shell of [`SHELL_THICKNESS`]. With
/// debugging enabled the welded arc surface is added as well.
#[instrument(skip_all, fields(fidelity = config.surface_fidelity, debug = params.enable_debug))]
pub fn generate_design(params: &DerivedParameters, config: &MeshConfig) -> Result<Scene, DesignError> {
    let mut scene = Scene::new(params.enable_debug);
    if params.enable_debug {
        debug!(?params, "parameters");
    }

    let arcs = arc_patches();
    let options = config.surface_options();
    for (name, patch) in arcs.named() {
        let shell = generate_extruded_surface(patch, ExtrusionSpan::OneWay(SHELL_THICKNESS), &options)
            .map_err(|source| DesignError::Patch { patch: name, source })?;
        debug!(patch = name, points = shell.point_count(), faces = shell.face_count(), "shell");
        scene.add_object(FlatMesh::from(&shell));
    }

    if scene.debug_enabled() {
        let surface = merge_patches_by_distance(&arcs.to_vec(), config)?;
        scene.add_debug_object(FlatMesh::from(&surface));
    }

    debug!(objects = scene.len(), "design generated");
    Ok(scene)
}
