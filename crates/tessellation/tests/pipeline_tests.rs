//! End-to-end checks of the patch → mesh → solid pipeline.

use approx::assert_abs_diff_eq;

use keycase_kernel::stitching::{RowJoin, horizontal_stitch};
use keycase_kernel::{BezierPatch, Vec3};
use keycase_tessellation::{
    ExtrusionSpan, MeshConfig, MeshReport, SurfaceMesh, SurfaceOptions, extrude, generate_extruded_surface,
    generate_surface, merge_patches_by_distance, merge_surfaces_by_distance,
};

/// Rows along +y stacked along +x, spanning `[0, 3]²` at height `z`.
fn flat_patch(z: f64) -> BezierPatch {
    patch_from(|i, j| [i as f64, j as f64, z])
}

/// A saddle-shaped patch over `[0, 3]²`.
fn saddle() -> BezierPatch {
    patch_from(|i, j| {
        let (x, y) = (i as f64, j as f64);
        [x, y, 0.4 * (x - 1.5).powi(2) - 0.3 * (y - 1.5).powi(2)]
    })
}

fn patch_from(f: impl Fn(usize, usize) -> [f64; 3]) -> BezierPatch {
    let mut grid = [[[0.0; 3]; 4]; 4];
    for (i, row) in grid.iter_mut().enumerate() {
        for (j, p) in row.iter_mut().enumerate() {
            *p = f(i, j);
        }
    }
    BezierPatch::from_array(grid)
}

fn tessellate(patch: &BezierPatch, fidelity: usize) -> SurfaceMesh {
    generate_surface(patch, &SurfaceOptions::with_fidelity(fidelity))
        .unwrap()
        .mesh
}

#[test]
fn merging_a_surface_with_its_offset_copy_dedupes_every_point() {
    let base = tessellate(&flat_patch(0.5), 4);
    let copy = tessellate(&flat_patch(0.51), 4);

    let merged = merge_surfaces_by_distance(&[base.clone(), copy], 0.1);

    assert_eq!(merged.point_count(), base.point_count());
    assert_eq!(merged.face_count(), 2 * base.face_count());
    merged.validate().unwrap();
}

#[test]
fn merged_points_are_farther_apart_than_threshold() {
    let merged = merge_surfaces_by_distance(&[tessellate(&saddle(), 6), tessellate(&saddle(), 6)], 0.1);
    let points = merged.points();
    for (i, a) in points.iter().enumerate() {
        for b in &points[i + 1..] {
            assert!(a.origin.distance(&b.origin) >= 0.1);
        }
    }
}

#[test]
fn stitched_neighbours_share_their_seam() {
    let left = flat_patch(0.0);
    let joins = std::array::from_fn(|i| {
        RowJoin::new(Vec3::new(i as f64, 5.0, 0.0), Vec3::new(i as f64, 6.0, 0.0))
    });
    let right = horizontal_stitch(&joins, &left);
    let config = MeshConfig::default().with_fidelity(4);

    let merged = merge_patches_by_distance(&[left, right], &config).unwrap();

    assert_eq!(merged.point_count(), 2 * 25 - 5);
    assert_eq!(merged.face_count(), 2 * 32);

    // The seam is interior, so the welded pair still extrudes into a closed shell.
    let solid = extrude(&merged, 1.0);
    assert!(solid.is_closed(), "{:?}", MeshReport::of(&solid));
}

#[test]
fn extruded_patch_is_closed() {
    let fidelity = 6;
    let surface = tessellate(&saddle(), fidelity);
    let boundary = surface.edge_points().count();
    assert_eq!(boundary, 4 * fidelity);

    let solid = extrude(&surface, 1.5);

    assert_eq!(solid.point_count(), 2 * surface.point_count());
    assert_eq!(solid.face_count(), 2 * surface.face_count() + 2 * boundary);
    let report = MeshReport::of(&solid);
    assert!(report.is_consistently_oriented(), "{:?}", report.inconsistent_edges);
    assert!(report.is_closed(), "{report:?}");
}

/// Every directed edge is matched by exactly one edge running the other way.
fn assert_edges_pair_up(mesh: &SurfaceMesh) {
    let mut directed = std::collections::HashMap::new();
    for face in mesh.faces() {
        for edge in face.directed_edges() {
            *directed.entry(edge).or_insert(0usize) += 1;
        }
    }
    for (&(a, b), &count) in &directed {
        assert_eq!(count, 1, "edge {a} -> {b} walked {count} times");
        assert_eq!(directed.get(&(b, a)), Some(&1), "edge {a} -> {b} has no opposite");
    }
}

#[test]
fn extruded_solids_are_consistently_wound() {
    assert_edges_pair_up(&extrude(&tessellate(&flat_patch(0.0), 3), 1.0));
    assert_edges_pair_up(&extrude(&tessellate(&saddle(), 5), -0.5));

    let options = SurfaceOptions::with_fidelity(4);
    let solid = generate_extruded_surface(&flat_patch(0.0), ExtrusionSpan::OneWay(2.0), &options).unwrap();
    assert_edges_pair_up(&solid);
}

#[test]
fn flat_patch_extrudes_into_two_planes() {
    let surface = tessellate(&flat_patch(0.0), 5);
    let solid = extrude(&surface, 1.0);
    let count = surface.point_count();

    for (i, point) in solid.points().iter().enumerate() {
        let expected = if i < count { 0.0 } else { 1.0 };
        assert_abs_diff_eq!(point.origin.z(), expected, epsilon = 1e-9);
    }

    // Capping faces stand vertically on the rectangular border.
    let caps = solid.face_indices().skip(2 * surface.face_count());
    for face in caps {
        assert_abs_diff_eq!(solid.face_normal(face).z(), 0.0, epsilon = 1e-9);
        for p in solid.face_positions(face) {
            let on_border = [p.x(), p.y()].iter().any(|c| c.abs() < 1e-9 || (c - 3.0).abs() < 1e-9);
            assert!(on_border, "{p:?} is inside the patch");
        }
    }
    assert!(MeshReport::of(&solid).is_consistently_oriented());
    assert!(solid.is_closed());
}

#[test]
fn extrusion_spans_around_the_surface() {
    let options = SurfaceOptions::with_fidelity(3);

    let centered = generate_extruded_surface(&flat_patch(0.0), ExtrusionSpan::OneWay(2.0), &options).unwrap();
    let (lowest, highest) = z_range(&centered);
    assert_abs_diff_eq!(lowest, -1.0, epsilon = 1e-9);
    assert_abs_diff_eq!(highest, 1.0, epsilon = 1e-9);

    let span = ExtrusionSpan::TwoWay { below: 0.5, above: 1.5 };
    let skewed = generate_extruded_surface(&flat_patch(0.0), span, &options).unwrap();
    let (lowest, highest) = z_range(&skewed);
    assert_abs_diff_eq!(lowest, -0.5, epsilon = 1e-9);
    assert_abs_diff_eq!(highest, 1.5, epsilon = 1e-9);
    assert!(skewed.is_closed());
}

#[test]
fn disconnected_boundaries_cap_only_one_loop() {
    // Unsupported input: two separate boundary loops. Only the loop reached
    // from the first boundary point is capped, so the solid stays open.
    let near = tessellate(&flat_patch(0.0), 3);
    let far = tessellate(&patch_from(|i, j| [i as f64 + 10.0, j as f64, 0.0]), 3);
    let both = merge_surfaces_by_distance(&[near.clone(), far], 0.1);

    let solid = extrude(&both, 1.0);

    let ring = near.edge_points().count();
    assert_eq!(solid.face_count(), 2 * both.face_count() + 2 * ring);
    assert!(!solid.is_closed());
}

fn z_range(mesh: &SurfaceMesh) -> (f64, f64) {
    mesh.points()
        .iter()
        .map(|p| p.origin.z())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), z| (lo.min(z), hi.max(z)))
}
