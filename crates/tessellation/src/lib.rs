//! Turning Bezier patches into indexed triangle meshes: tessellation,
//! welding of neighbouring surfaces and extrusion into closed shells.

pub mod config;
pub mod error;
pub mod export;
pub mod extrude;
pub mod merge;
pub mod mesh;
pub mod surface;
pub mod validation;

pub use config::{MeshConfig, SurfaceOptions};
pub use error::MeshError;
pub use export::FlatMesh;
pub use extrude::{CutSide, ExtrudedPoint, ExtrusionSpan, extrude, generate_extruded_surface, offset_surface, trim_cut_box};
pub use merge::{merge_patches_by_distance, merge_surfaces_by_distance};
pub use mesh::{Face, FaceIndex, PointIndex, SurfaceMesh, SurfacePoint};
pub use surface::{TessellatedSurface, generate_surface};
pub use validation::MeshReport;
