use serde::{Deserialize, Serialize};

use crate::mesh::SurfaceMesh;

/// Flat vertex and index buffers, the form handed to scene serializers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FlatMesh {
    /// Vertex positions [x, y, z, x, y, z, ...]
    pub positions: Vec<f32>,
    /// Vertex normals [nx, ny, nz, ...]
    pub normals: Vec<f32>,
    /// Triangle indices [i0, i1, i2, ...]
    pub indices: Vec<u32>,
}

impl FlatMesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn position(&self, vertex: usize) -> [f32; 3] {
        [
            self.positions[3 * vertex],
            self.positions[3 * vertex + 1],
            self.positions[3 * vertex + 2],
        ]
    }

    pub fn merge(&mut self, other: &FlatMesh) {
        let offset = self.vertex_count() as u32;
        self.positions.extend_from_slice(&other.positions);
        self.normals.extend_from_slice(&other.normals);
        self.indices.extend(other.indices.iter().map(|&idx| idx + offset));
    }

    /// Reflection across the YZ plane, with winding flipped to keep faces outward.
    pub fn mirrored_x(&self) -> FlatMesh {
        let flip_x = |values: &[f32]| -> Vec<f32> {
            values
                .chunks_exact(3)
                .flat_map(|v| [-v[0], v[1], v[2]])
                .collect()
        };
        FlatMesh {
            positions: flip_x(&self.positions),
            normals: flip_x(&self.normals),
            indices: self
                .indices
                .chunks_exact(3)
                .flat_map(|t| [t[0], t[2], t[1]])
                .collect(),
        }
    }
}

impl From<&SurfaceMesh> for FlatMesh {
    fn from(mesh: &SurfaceMesh) -> Self {
        let mut flat = FlatMesh {
            positions: Vec::with_capacity(mesh.point_count() * 3),
            normals: Vec::with_capacity(mesh.point_count() * 3),
            indices: Vec::with_capacity(mesh.face_count() * 3),
        };
        for point in mesh.points() {
            flat.positions.extend(point.origin.to_array().map(|c| c as f32));
            flat.normals.extend(point.normal.to_array().map(|c| c as f32));
        }
        for face in mesh.faces() {
            flat.indices.extend(face.indices().map(|i| i.0 as u32));
        }
        flat
    }
}
