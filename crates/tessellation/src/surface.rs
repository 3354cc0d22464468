use std::collections::HashMap;

use keycase_kernel::{BezierControlPoints, BezierPatch, Frame, FrameContext, FrameSeed, Vec3};
use tracing::{debug, instrument};

use crate::config::SurfaceOptions;
use crate::error::MeshError;
use crate::mesh::{Face, PointIndex, SurfaceMesh, SurfacePoint};

/// A tessellated patch plus the frames at the two ends of its first column.
///
/// The edge frames orient cutting boxes for trims along the surface normal.
#[derive(Debug, Clone, PartialEq)]
pub struct TessellatedSurface {
    pub mesh: SurfaceMesh,
    pub edge_frames: [Frame; 2],
}

/// Tessellate one bicubic patch into a `(fidelity + 1)²` point grid.
///
/// Row curves of the patch are sampled first; every sample index then
/// defines a column curve through the four row samples, and the column
/// samples become the mesh points. Points of the first and last column and
/// the ends of every column are flagged as boundary. Coincident points are
/// stored once.
#[instrument(skip(patch, options), fields(fidelity = options.fidelity))]
pub fn generate_surface(patch: &BezierPatch, options: &SurfaceOptions) -> Result<TessellatedSurface, MeshError> {
    let fidelity = options.fidelity.max(1);
    let sample = |curve: BezierControlPoints, trim| {
        FrameContext::generate(curve, fidelity, FrameSeed::Frenet, trim, &options.sampling)
    };

    let rows = patch
        .rows()
        .iter()
        .map(|row| sample(*row, options.rows_trim))
        .collect::<Result<Vec<_>, _>>()?;

    let columns = (0..=fidelity)
        .map(|p| -> Result<FrameContext, MeshError> {
            let origin = |r: usize| rows[r].frames()[p].origin;
            let column = sample(
                BezierControlPoints::new(origin(0), origin(1), origin(2), origin(3)),
                options.columns_trim,
            )?;
            Ok(if p == 0 || p == fidelity { column.into_boundary() } else { column })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let edge_frames = [*columns[0].first_frame(), *columns[0].last_frame()];

    let mut grid = PointGrid::default();
    let lookup: Vec<Vec<PointIndex>> = columns
        .iter()
        .map(|column| column.frames().iter().map(|f| grid.insert(f)).collect())
        .collect();

    let mut faces = Vec::with_capacity(2 * fidelity * fidelity);
    for c in 0..fidelity {
        for r in 0..fidelity {
            let v1 = lookup[c][r];
            let v2 = lookup[c][r + 1];
            let v3 = lookup[c + 1][r];
            let v4 = lookup[c + 1][r + 1];
            faces.push(Face([v1, v2, v3]));
            faces.push(Face([v3, v2, v4]));
        }
    }

    let mesh = with_vertex_normals(grid.points, faces);
    debug!(points = mesh.point_count(), faces = mesh.face_count(), "tessellated patch");
    Ok(TessellatedSurface { mesh, edge_frames })
}

/// Unique points keyed by the exact bits of their origin.
#[derive(Default)]
struct PointGrid {
    points: Vec<SurfacePoint>,
    index: HashMap<[u64; 3], PointIndex>,
}

impl PointGrid {
    fn insert(&mut self, frame: &Frame) -> PointIndex {
        let key = origin_key(frame.origin);
        if let Some(&existing) = self.index.get(&key) {
            self.points[existing.0].is_edge |= frame.is_boundary;
            return existing;
        }
        let index = PointIndex(self.points.len());
        self.points.push(SurfacePoint::new(frame.origin, Vec3::zero(), frame.is_boundary));
        self.index.insert(key, index);
        index
    }
}

fn origin_key(origin: Vec3) -> [u64; 3] {
    // -0.0 + 0.0 == +0.0, so both zeros share a key.
    origin.to_array().map(|c| (c + 0.0).to_bits())
}

/// Set every point's normal to the mean of its faces' normals.
fn with_vertex_normals(mut points: Vec<SurfacePoint>, faces: Vec<Face>) -> SurfaceMesh {
    let mut sums = vec![(Vec3::zero(), 0usize); points.len()];
    for face in &faces {
        let [a, b, c] = face.indices().map(|i| points[i.0].origin);
        let normal = (b - a).cross(&(c - a)).normalize();
        for index in face.indices() {
            let (sum, count) = &mut sums[index.0];
            *sum = *sum + normal;
            *count += 1;
        }
    }

    for (point, (sum, count)) in points.iter_mut().zip(sums) {
        if count > 0 {
            point.normal = sum * (1.0 / count as f64);
        }
    }
    SurfaceMesh::from_parts(points, faces)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use keycase_kernel::Trim;

    /// Rows run along +y and are stacked along +x, all at height `z`.
    fn flat_patch(z: f64) -> BezierPatch {
        let mut grid = [[[0.0; 3]; 4]; 4];
        for (i, row) in grid.iter_mut().enumerate() {
            for (j, p) in row.iter_mut().enumerate() {
                *p = [i as f64, j as f64, z];
            }
        }
        BezierPatch::from_array(grid)
    }

    #[test]
    fn test_grid_counts() {
        let surface = generate_surface(&flat_patch(0.0), &SurfaceOptions::with_fidelity(4)).unwrap();
        assert_eq!(surface.mesh.point_count(), 25);
        assert_eq!(surface.mesh.face_count(), 32);
        surface.mesh.validate().unwrap();
    }

    #[test]
    fn test_flat_patch_normals_point_up() {
        let surface = generate_surface(&flat_patch(0.0), &SurfaceOptions::with_fidelity(5)).unwrap();
        for point in surface.mesh.points() {
            assert_abs_diff_eq!(point.normal, Vec3::unit_z(), epsilon = 1e-9);
            assert_abs_diff_eq!(point.origin.z(), 0.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_boundary_ring() {
        let fidelity = 6;
        let surface = generate_surface(&flat_patch(0.0), &SurfaceOptions::with_fidelity(fidelity)).unwrap();
        let mesh = &surface.mesh;
        assert_eq!(mesh.edge_points().count(), 4 * fidelity);
        for index in mesh.edge_points() {
            let p = mesh.point(index).origin;
            let on_border = [p.x(), p.y()].iter().any(|c| c.abs() < 1e-9 || (c - 3.0).abs() < 1e-9);
            assert!(on_border, "{p:?} is not on the patch border");
        }
    }

    #[test]
    fn test_edge_frames_span_first_column() {
        let surface = generate_surface(&flat_patch(0.0), &SurfaceOptions::with_fidelity(4)).unwrap();
        let [start, end] = surface.edge_frames;
        assert_abs_diff_eq!(start.origin, Vec3::zero(), epsilon = 1e-12);
        assert_abs_diff_eq!(end.origin, Vec3::new(3.0, 0.0, 0.0), epsilon = 1e-12);
        assert_abs_diff_eq!(start.tangent, Vec3::unit_x(), epsilon = 1e-12);
    }

    #[test]
    fn test_coincident_points_stored_once() {
        // First row collapsed to a single point.
        let mut grid = [[[0.0; 3]; 4]; 4];
        for (i, row) in grid.iter_mut().enumerate() {
            for (j, p) in row.iter_mut().enumerate() {
                *p = if i == 0 { [0.0, 1.5, 0.0] } else { [i as f64, j as f64, 0.0] };
            }
        }
        let surface = generate_surface(&BezierPatch::from_array(grid), &SurfaceOptions::with_fidelity(3)).unwrap();
        assert_eq!(surface.mesh.point_count(), 16 - 3);
        surface.mesh.validate().unwrap();
    }

    #[test]
    fn test_trimmed_rows_shrink_surface() {
        let options = SurfaceOptions {
            fidelity: 4,
            rows_trim: Trim::new(0.5, -0.5),
            ..SurfaceOptions::default()
        };
        let surface = generate_surface(&flat_patch(0.0), &options).unwrap();
        for point in surface.mesh.points() {
            assert!(point.origin.y() > 0.5 - 1e-6 && point.origin.y() < 2.5 + 1e-6);
        }
    }

    #[test]
    fn test_trim_error_surfaces() {
        let options = SurfaceOptions {
            rows_trim: Trim::new(10.0, 0.0),
            ..SurfaceOptions::default()
        };
        let err = generate_surface(&flat_patch(0.0), &options).unwrap_err();
        assert!(matches!(err, MeshError::Kernel(_)));
    }

    #[test]
    fn test_interior_normal_is_face_mean() {
        let surface = generate_surface(&flat_patch(1.0), &SurfaceOptions::with_fidelity(2)).unwrap();
        let center = surface.mesh.point(PointIndex(4));
        assert_abs_diff_eq!(center.origin, Vec3::new(1.5, 1.5, 1.0), epsilon = 1e-12);
        assert_abs_diff_eq!(center.normal, Vec3::unit_z(), epsilon = 1e-12);
    }
}
