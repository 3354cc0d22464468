use keycase_tessellation::MeshError;
use thiserror::Error;

/// Errors while reading design parameters.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LoadError {
    #[error("failed to parse parameters: {0}")]
    Parse(String),

    #[error("unknown parameters: {}", .0.join(", "))]
    UnknownKeys(Vec<String>),

    #[error("{name} = {value} is outside [{min}, {max}]")]
    OutOfRange {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("failed to read {path}: {message}")]
    Io { path: String, message: String },
}

/// Errors while building the design scene.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DesignError {
    #[error("patch {patch} failed to tessellate")]
    Patch {
        patch: &'static str,
        #[source]
        source: MeshError,
    },

    #[error(transparent)]
    Mesh(#[from] MeshError),
}
