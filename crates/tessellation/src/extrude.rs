//! Thickening a surface into a closed shell.

use std::collections::{BTreeSet, HashMap};

use keycase_kernel::{BezierPatch, Frame};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::config::SurfaceOptions;
use crate::error::MeshError;
use crate::mesh::{Face, FaceIndex, PointIndex, SurfaceMesh, SurfacePoint};
use crate::surface::generate_surface;

/// Half-width of a trim cut box across the frame's normal plane.
const CUT_BOX_WIDTH: f64 = 30.0;

/// Length of a trim cut box along the frame tangent.
const CUT_BOX_DEPTH: f64 = 50.0;

/// A shell point paired with the base point it was offset from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExtrudedPoint {
    pub point: SurfacePoint,
    pub original: PointIndex,
}

/// Thickness of an extruded patch relative to the patch surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ExtrusionSpan {
    /// Total thickness, centered on the surface.
    OneWay(f64),
    /// Separate thickness below and above the surface.
    TwoWay { below: f64, above: f64 },
}

impl ExtrusionSpan {
    /// Offset of the base surface and distance from there to the shell.
    fn offsets(self) -> (f64, f64) {
        match self {
            ExtrusionSpan::OneWay(thickness) => (-thickness / 2.0, thickness),
            ExtrusionSpan::TwoWay { below, above } => (-below, below + above),
        }
    }
}

/// Which end of a surface a trim cut box removes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CutSide {
    /// Extends backwards along the tangent from the frame.
    Start,
    /// Extends forwards along the tangent from the frame.
    End,
}

/// Move a point along its unit normal.
pub fn offset_point(point: &SurfacePoint, distance: f64) -> SurfacePoint {
    SurfacePoint {
        origin: point.origin + point.normal.normalize() * distance,
        ..*point
    }
}

/// Copy of `mesh` with every point moved `distance` along its normal.
pub fn offset_surface(mesh: &SurfaceMesh, distance: f64) -> SurfaceMesh {
    let points = mesh.points().iter().map(|p| offset_point(p, distance)).collect();
    SurfaceMesh::from_parts(points, mesh.faces().to_vec())
}

/// Offset copies of every point, remembering where each came from.
pub fn shell_points(mesh: &SurfaceMesh, distance: f64) -> Vec<ExtrudedPoint> {
    mesh.points()
        .iter()
        .enumerate()
        .map(|(i, p)| ExtrudedPoint {
            point: offset_point(p, distance),
            original: PointIndex(i),
        })
        .collect()
}

/// Thicken `mesh` into a closed solid.
///
/// The offset shell gets inverted faces; the longest loop through the shell's
/// boundary points is then capped against the matching base points. Loops
/// are only recovered reliably for a single simple boundary; branching or
/// disconnected boundaries get a best-effort loop.
#[instrument(skip(mesh), fields(points = mesh.point_count(), faces = mesh.face_count()))]
pub fn extrude(mesh: &SurfaceMesh, distance: f64) -> SurfaceMesh {
    let count = mesh.point_count();
    let shell = shell_points(mesh, distance);

    let mut faces: Vec<Face> = mesh.faces().to_vec();
    faces.extend(mesh.faces().iter().map(|f| f.offset(count).inverted()));

    let originals: HashMap<PointIndex, PointIndex> = shell
        .iter()
        .enumerate()
        .map(|(i, p)| (PointIndex(count + i), p.original))
        .collect();
    let boundary: Vec<PointIndex> = shell
        .iter()
        .enumerate()
        .filter(|(_, p)| p.point.is_edge)
        .map(|(i, _)| PointIndex(count + i))
        .collect();

    let mut points: Vec<SurfacePoint> = mesh.points().to_vec();
    points.extend(shell.iter().map(|p| p.point));
    let tube = SurfaceMesh::from_parts(points, faces);

    let ring = longest_boundary_loop(&tube, &boundary);
    if ring.len() < 3 {
        warn!(boundary = boundary.len(), ring = ring.len(), "no boundary loop to cap");
        return tube;
    }

    let (points, mut faces) = tube.into_parts();
    for (i, &s1) in ring.iter().enumerate() {
        let s2 = ring[(i + 1) % ring.len()];
        let o1 = originals[&s1];
        let o2 = originals[&s2];
        faces.push(Face([s2, s1, o1]));
        faces.push(Face([s2, o1, o2]));
    }

    debug!(ring = ring.len(), faces = faces.len(), "capped extrusion");
    SurfaceMesh::from_parts(points, faces)
}

/// Order the boundary points of `mesh` into the longest simple path.
///
/// Two boundary points are linked when they share exactly one face; a pair
/// sharing two faces is the inner diagonal of a quad. The search is a
/// depth-first walk from the first boundary point, keeping the longest dead
/// end path it reaches, bounded by `n²` expansions for `n` boundary points.
/// The path runs along the winding of the face on its first edge, so caps
/// built from consecutive pairs match the orientation of the mesh.
pub fn longest_boundary_loop(mesh: &SurfaceMesh, boundary: &[PointIndex]) -> Vec<PointIndex> {
    let Some(&start) = boundary.first() else {
        return Vec::new();
    };
    let adjacency = boundary_adjacency(mesh, boundary);

    let budget = boundary.len().saturating_mul(boundary.len()).max(1);
    let mut expansions = 0usize;
    let mut longest: Vec<PointIndex> = Vec::new();
    let mut stack: Vec<Vec<PointIndex>> = vec![vec![start]];

    while let Some(path) = stack.pop() {
        expansions += 1;
        if expansions > budget {
            warn!(budget, longest = longest.len(), "boundary traversal budget exhausted");
            break;
        }

        let current = path[path.len() - 1];
        let next: Vec<PointIndex> = adjacency
            .get(&current)
            .into_iter()
            .flatten()
            .copied()
            .filter(|candidate| !path.contains(candidate))
            .collect();

        if next.is_empty() {
            if path.len() > longest.len() {
                longest = path;
            }
            continue;
        }
        // Reversed so the first neighbour is explored first.
        for candidate in next.into_iter().rev() {
            let mut extended = path.clone();
            extended.push(candidate);
            stack.push(extended);
        }
    }

    orient_along_faces(mesh, &mut longest);
    longest
}

/// Reverse `path` after its start when the face on its first edge winds the
/// other way.
fn orient_along_faces(mesh: &SurfaceMesh, path: &mut [PointIndex]) {
    let [first, second, ..] = *path else {
        return;
    };
    let against = mesh
        .faces()
        .iter()
        .any(|face| face.directed_edges().contains(&(second, first)));
    if against {
        path[1..].reverse();
    }
}

fn boundary_adjacency(mesh: &SurfaceMesh, boundary: &[PointIndex]) -> HashMap<PointIndex, BTreeSet<PointIndex>> {
    let on_boundary: BTreeSet<PointIndex> = boundary.iter().copied().collect();

    let mut faces_of: HashMap<PointIndex, Vec<FaceIndex>> = HashMap::new();
    for face in mesh.face_indices() {
        for index in mesh.face(face).indices() {
            if on_boundary.contains(&index) {
                faces_of.entry(index).or_default().push(face);
            }
        }
    }

    let shared_faces = |a: PointIndex, b: PointIndex| {
        faces_of
            .get(&a)
            .map_or(0, |faces| faces.iter().filter(|&&f| mesh.face(f).contains(b)).count())
    };

    let mut adjacency: HashMap<PointIndex, BTreeSet<PointIndex>> = HashMap::new();
    for &point in boundary {
        let neighbours = faces_of
            .get(&point)
            .into_iter()
            .flatten()
            .flat_map(|&f| mesh.face(f).indices())
            .filter(|&other| other != point && on_boundary.contains(&other))
            .filter(|&other| shared_faces(point, other) == 1)
            .collect();
        adjacency.insert(point, neighbours);
    }
    adjacency
}

/// Tessellate `patch` and thicken it by `span` into a closed solid.
pub fn generate_extruded_surface(
    patch: &BezierPatch,
    span: ExtrusionSpan,
    options: &SurfaceOptions,
) -> Result<SurfaceMesh, MeshError> {
    let surface = generate_surface(patch, options)?;
    let (down, up) = span.offsets();
    Ok(extrude(&offset_surface(&surface.mesh, down), up))
}

/// Closed box at an edge frame covering everything past it along the tangent.
///
/// An external boolean layer subtracts it to trim a surface along the
/// frame's normal plane.
pub fn trim_cut_box(frame: &Frame, side: CutSide) -> SurfaceMesh {
    let along = match side {
        CutSide::Start => -1.0,
        CutSide::End => 1.0,
    };
    let near = [
        frame.origin - frame.normal * CUT_BOX_WIDTH,
        frame.origin - frame.binormal * CUT_BOX_WIDTH,
        frame.origin + frame.normal * CUT_BOX_WIDTH,
        frame.origin + frame.binormal * CUT_BOX_WIDTH,
    ];
    let shift = frame.tangent * (along * CUT_BOX_DEPTH);
    let points: Vec<SurfacePoint> = near
        .iter()
        .chain(near.map(|p| p + shift).iter())
        .map(|&origin| SurfacePoint::new(origin, frame.tangent * along, false))
        .collect();

    let faces = [
        [0, 1, 2],
        [3, 0, 2],
        [6, 5, 4],
        [6, 4, 7],
        [1, 0, 4],
        [4, 5, 1],
        [2, 1, 6],
        [6, 1, 5],
        [4, 0, 7],
        [7, 0, 3],
        [3, 2, 7],
        [7, 2, 6],
    ]
    .map(|[a, b, c]| {
        let face = Face::new(a, b, c);
        match side {
            CutSide::Start => face,
            CutSide::End => face.inverted(),
        }
    });

    SurfaceMesh::from_parts(points, faces.to_vec())
}
