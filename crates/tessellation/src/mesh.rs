use std::fmt;

use keycase_kernel::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::MeshError;

/// Position of a point in [`SurfaceMesh::points`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PointIndex(pub usize);

/// Position of a face in [`SurfaceMesh::faces`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FaceIndex(pub usize);

impl PointIndex {
    pub fn offset(self, by: usize) -> Self {
        Self(self.0 + by)
    }
}

impl fmt::Display for PointIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for FaceIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A triangle as three point indices, counter-clockwise around its normal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Face(pub [PointIndex; 3]);

impl Face {
    pub fn new(a: usize, b: usize, c: usize) -> Self {
        Self([PointIndex(a), PointIndex(b), PointIndex(c)])
    }

    pub fn indices(&self) -> [PointIndex; 3] {
        self.0
    }

    pub fn contains(&self, index: PointIndex) -> bool {
        self.0.contains(&index)
    }

    /// Same triangle with the opposite winding.
    pub fn inverted(&self) -> Self {
        let [a, b, c] = self.0;
        Self([c, b, a])
    }

    pub fn offset(&self, by: usize) -> Self {
        Self(self.0.map(|i| i.offset(by)))
    }

    pub fn map(&self, f: impl FnMut(PointIndex) -> PointIndex) -> Self {
        Self(self.0.map(f))
    }

    /// The three edges in winding order.
    pub fn directed_edges(&self) -> [(PointIndex, PointIndex); 3] {
        let [a, b, c] = self.0;
        [(a, b), (b, c), (c, a)]
    }

    /// The three undirected edges, each with its lower index first.
    pub fn edges(&self) -> [(PointIndex, PointIndex); 3] {
        let [a, b, c] = self.0;
        [ordered(a, b), ordered(b, c), ordered(c, a)]
    }
}

fn ordered(a: PointIndex, b: PointIndex) -> (PointIndex, PointIndex) {
    if a <= b { (a, b) } else { (b, a) }
}

/// One mesh vertex.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SurfacePoint {
    pub origin: Vec3,
    /// Mean of the normals of the faces around this point. Not renormalized.
    pub normal: Vec3,
    /// Whether the point lies on the open boundary of its surface.
    pub is_edge: bool,
}

impl SurfacePoint {
    pub fn new(origin: Vec3, normal: Vec3, is_edge: bool) -> Self {
        Self { origin, normal, is_edge }
    }
}

/// An indexed triangle mesh whose faces only reference existing points.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SurfaceMesh {
    points: Vec<SurfacePoint>,
    faces: Vec<Face>,
}

impl SurfaceMesh {
    /// Assemble a mesh, rejecting faces that reference missing points.
    pub fn new(points: Vec<SurfacePoint>, faces: Vec<Face>) -> Result<Self, MeshError> {
        let mesh = Self { points, faces };
        mesh.validate()?;
        Ok(mesh)
    }

    /// Assemble a mesh whose indices are valid by construction.
    pub(crate) fn from_parts(points: Vec<SurfacePoint>, faces: Vec<Face>) -> Self {
        debug_assert!(faces.iter().flat_map(|f| f.0).all(|i| i.0 < points.len()));
        Self { points, faces }
    }

    pub fn points(&self) -> &[SurfacePoint] {
        &self.points
    }

    pub fn faces(&self) -> &[Face] {
        &self.faces
    }

    pub fn point(&self, index: PointIndex) -> &SurfacePoint {
        &self.points[index.0]
    }

    pub fn face(&self, index: FaceIndex) -> &Face {
        &self.faces[index.0]
    }

    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn face_indices(&self) -> impl Iterator<Item = FaceIndex> + '_ {
        (0..self.faces.len()).map(FaceIndex)
    }

    /// Indices of all points flagged as boundary.
    pub fn edge_points(&self) -> impl Iterator<Item = PointIndex> + '_ {
        self.points
            .iter()
            .enumerate()
            .filter(|(_, p)| p.is_edge)
            .map(|(i, _)| PointIndex(i))
    }

    pub fn face_positions(&self, index: FaceIndex) -> [Vec3; 3] {
        self.face(index).0.map(|i| self.point(i).origin)
    }

    /// Unit geometric normal `(b - a) × (c - a)` of a face.
    ///
    /// Zero-area faces give a non-finite normal.
    pub fn face_normal(&self, index: FaceIndex) -> Vec3 {
        let [a, b, c] = self.face_positions(index);
        (b - a).cross(&(c - a)).normalize()
    }

    /// The first face that references a missing point, if any.
    pub fn validate(&self) -> Result<(), MeshError> {
        for (face, f) in self.faces.iter().enumerate() {
            if let Some(&index) = f.0.iter().find(|i| i.0 >= self.points.len()) {
                return Err(MeshError::DanglingIndex {
                    face: FaceIndex(face),
                    index,
                    point_count: self.points.len(),
                });
            }
        }
        Ok(())
    }

    /// Every edge is shared by exactly two faces, which traverse it in
    /// opposite directions, and no index dangles.
    pub fn is_closed(&self) -> bool {
        crate::validation::MeshReport::of(self).is_closed()
    }

    pub fn into_parts(self) -> (Vec<SurfacePoint>, Vec<Face>) {
        (self.points, self.faces)
    }
}
