use std::collections::HashMap;

use keycase_kernel::{BezierPatch, Vec3};
use tracing::{debug, instrument};

use crate::config::MeshConfig;
use crate::error::MeshError;
use crate::mesh::{Face, PointIndex, SurfaceMesh, SurfacePoint};
use crate::surface::generate_surface;

/// Coarse locality bucket: the sum of the truncated coordinates.
///
/// Nearby points on either side of an integer boundary land in different
/// buckets and are never compared.
pub fn bucket_key(origin: Vec3) -> i64 {
    origin.to_array().iter().map(|c| c.trunc() as i64).sum()
}

/// Weld several meshes into one, treating points closer than `threshold` as
/// the same point.
///
/// Each incoming point is compared against the points already kept in its
/// bucket. The first one within `threshold` absorbs it: faces are remapped
/// onto the kept point and the two normals are averaged. The kept point's
/// boundary flag is left as it was. Output points appear in first-seen order.
#[instrument(skip(surfaces), fields(surfaces = surfaces.len()))]
pub fn merge_surfaces_by_distance(surfaces: &[SurfaceMesh], threshold: f64) -> SurfaceMesh {
    let mut points: Vec<SurfacePoint> = Vec::new();
    let mut faces: Vec<Face> = Vec::new();
    let mut buckets: HashMap<i64, Vec<PointIndex>> = HashMap::new();
    let mut welded = 0usize;

    for surface in surfaces {
        let remap: Vec<PointIndex> = surface
            .points()
            .iter()
            .map(|point| {
                let bucket = buckets.entry(bucket_key(point.origin)).or_default();
                let duplicate = bucket
                    .iter()
                    .copied()
                    .find(|kept| points[kept.0].origin.distance(&point.origin) < threshold);
                match duplicate {
                    Some(kept) => {
                        let existing = &mut points[kept.0];
                        existing.normal = existing.normal.average(&point.normal);
                        welded += 1;
                        kept
                    }
                    None => {
                        let index = PointIndex(points.len());
                        points.push(*point);
                        bucket.push(index);
                        index
                    }
                }
            })
            .collect();

        faces.extend(surface.faces().iter().map(|face| face.map(|i| remap[i.0])));
    }

    debug!(points = points.len(), faces = faces.len(), welded, "merged surfaces");
    SurfaceMesh::from_parts(points, faces)
}

/// Tessellate every patch at the configured fidelity and weld the results.
pub fn merge_patches_by_distance(patches: &[BezierPatch], config: &MeshConfig) -> Result<SurfaceMesh, MeshError> {
    let options = config.surface_options();
    let meshes = patches
        .iter()
        .map(|patch| generate_surface(patch, &options).map(|s| s.mesh))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(merge_surfaces_by_distance(&meshes, config.merge_threshold))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn point(x: f64, y: f64, z: f64, normal: Vec3) -> SurfacePoint {
        SurfacePoint::new(Vec3::new(x, y, z), normal, false)
    }

    #[test]
    fn test_bucket_key_truncates_toward_zero() {
        assert_eq!(bucket_key(Vec3::new(1.9, -1.9, 0.5)), 0);
        assert_eq!(bucket_key(Vec3::new(2.5, 3.5, 4.5)), 9);
    }

    #[test]
    fn test_duplicates_average_normals() {
        let a = SurfaceMesh::new(
            vec![
                point(0.2, 0.2, 0.2, Vec3::unit_x()),
                point(5.2, 0.2, 0.2, Vec3::unit_z()),
                point(0.2, 5.2, 0.2, Vec3::unit_z()),
            ],
            vec![Face::new(0, 1, 2)],
        )
        .unwrap();
        let b = SurfaceMesh::new(
            vec![
                point(7.2, 0.2, 0.2, Vec3::unit_z()),
                point(0.25, 0.2, 0.2, Vec3::unit_y()),
                point(5.2, 0.25, 0.2, Vec3::unit_z()),
            ],
            vec![Face::new(0, 1, 2)],
        )
        .unwrap();

        let merged = merge_surfaces_by_distance(&[a, b], 0.1);
        assert_eq!(merged.point_count(), 4);
        assert_eq!(merged.faces()[1], Face::new(3, 0, 1));
        assert_abs_diff_eq!(merged.points()[0].normal, Vec3::new(0.5, 0.5, 0.0), epsilon = 1e-12);
        merged.validate().unwrap();
    }

    #[test]
    fn test_points_straddling_a_bucket_boundary_stay_apart() {
        // 0.02 apart but their truncated sums differ.
        let a = SurfaceMesh::new(
            vec![
                point(0.99, 0.5, 0.5, Vec3::unit_z()),
                point(-3.0, 0.5, 0.5, Vec3::unit_z()),
                point(-3.0, 3.5, 0.5, Vec3::unit_z()),
            ],
            vec![Face::new(0, 1, 2)],
        )
        .unwrap();
        let b = SurfaceMesh::new(
            vec![
                point(1.01, 0.5, 0.5, Vec3::unit_z()),
                point(5.0, 0.5, 0.5, Vec3::unit_z()),
                point(5.0, 3.5, 0.5, Vec3::unit_z()),
            ],
            vec![Face::new(0, 1, 2)],
        )
        .unwrap();

        let merged = merge_surfaces_by_distance(&[a, b], 0.1);
        assert_eq!(merged.point_count(), 6);
    }

    #[test]
    fn test_empty_input() {
        let merged = merge_surfaces_by_distance(&[], 0.1);
        assert!(merged.is_empty());
        assert_eq!(merged.face_count(), 0);
    }
}
