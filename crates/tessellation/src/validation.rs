//! Edge-incidence checks for indexed meshes.
//!
//! Free edges (used by one face) mark an open boundary, non-manifold edges
//! (used by more than two faces) a broken skin. A directed edge walked twice
//! in the same direction marks neighbouring faces with opposite winding.

use std::collections::BTreeMap;

use tracing::debug;

use crate::mesh::{FaceIndex, PointIndex, SurfaceMesh};

pub type Edge = (PointIndex, PointIndex);

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshReport {
    /// Faces referencing a point past the end of the point list.
    pub dangling: Vec<(FaceIndex, PointIndex)>,
    /// Edges used by exactly one face.
    pub free_edges: Vec<Edge>,
    /// Edges used by more than two faces, with their face count.
    pub non_manifold_edges: Vec<(Edge, usize)>,
    /// Directed edges traversed by more than one face.
    pub inconsistent_edges: Vec<Edge>,
}

impl MeshReport {
    pub fn of(mesh: &SurfaceMesh) -> Self {
        let mut report = MeshReport::default();
        let mut edge_faces: BTreeMap<Edge, usize> = BTreeMap::new();
        let mut directed: BTreeMap<Edge, usize> = BTreeMap::new();

        for face in mesh.face_indices() {
            let f = mesh.face(face);
            for index in f.indices() {
                if index.0 >= mesh.point_count() {
                    report.dangling.push((face, index));
                }
            }
            for edge in f.edges() {
                *edge_faces.entry(edge).or_default() += 1;
            }
            for edge in f.directed_edges() {
                *directed.entry(edge).or_default() += 1;
            }
        }

        for (edge, count) in edge_faces {
            match count {
                1 => report.free_edges.push(edge),
                2 => {}
                n => report.non_manifold_edges.push((edge, n)),
            }
        }
        report.inconsistent_edges = directed
            .into_iter()
            .filter(|&(_, count)| count > 1)
            .map(|(edge, _)| edge)
            .collect();

        debug!(
            dangling = report.dangling.len(),
            free = report.free_edges.len(),
            non_manifold = report.non_manifold_edges.len(),
            inconsistent = report.inconsistent_edges.len(),
            "mesh report"
        );
        report
    }

    pub fn is_valid(&self) -> bool {
        self.dangling.is_empty()
    }

    /// Neighbouring faces agree on winding.
    pub fn is_consistently_oriented(&self) -> bool {
        self.inconsistent_edges.is_empty()
    }

    pub fn is_closed(&self) -> bool {
        self.is_valid()
            && self.free_edges.is_empty()
            && self.non_manifold_edges.is_empty()
            && self.is_consistently_oriented()
    }
}
