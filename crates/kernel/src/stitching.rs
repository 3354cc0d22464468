//! Deriving new patches from already finalized neighbors.
//!
//! Each operator reads its neighbors and returns a fresh patch whose shared
//! edge and adjacent handles keep tangent continuity across the seam.

use serde::{Deserialize, Serialize};

use crate::geometry::bezier::{BezierControlPoints, mirror_point_around_center};
use crate::geometry::patch::BezierPatch;
use crate::geometry::vector::Vec3;

/// New handle and end point for one row of a horizontal stitch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RowJoin {
    pub handle: Vec3,
    pub end: Vec3,
    #[serde(default = "unit_scalar")]
    pub scalar: f64,
}

impl RowJoin {
    pub fn new(handle: Vec3, end: Vec3) -> Self {
        Self { handle, end, scalar: 1.0 }
    }

    pub fn with_scalar(mut self, scalar: f64) -> Self {
        self.scalar = scalar;
        self
    }
}

/// New handles and end points for the four columns of a vertical stitch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColumnJoin {
    pub handles: [Vec3; 4],
    pub ends: [Vec3; 4],
    #[serde(default = "unit_scalars")]
    pub scalars: [f64; 4],
}

impl ColumnJoin {
    pub fn new(handles: [Vec3; 4], ends: [Vec3; 4]) -> Self {
        Self {
            handles,
            ends,
            scalars: unit_scalars(),
        }
    }

    pub fn with_scalars(mut self, scalars: [f64; 4]) -> Self {
        self.scalars = scalars;
        self
    }
}

/// Caller-supplied lower right 2×2 block of a diagonally stitched patch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CornerJoin(pub [[Vec3; 2]; 2]);

/// The three finalized neighbors around a missing corner patch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiagonalNeighbors<'a> {
    pub top: &'a BezierPatch,
    pub left: &'a BezierPatch,
    pub diagonal: &'a BezierPatch,
}

fn unit_scalar() -> f64 {
    1.0
}

fn unit_scalars() -> [f64; 4] {
    [1.0; 4]
}

/// Continue every row of `left` to the right.
pub fn horizontal_stitch(joins: &[RowJoin; 4], left: &BezierPatch) -> BezierPatch {
    let rows: [BezierControlPoints; 4] =
        std::array::from_fn(|i| left.row(i).join_by_tangent([joins[i].handle, joins[i].end], joins[i].scalar));
    BezierPatch::new(rows)
}

/// Continue every column of `top` downwards.
pub fn vertical_stitch(join: &ColumnJoin, top: &BezierPatch) -> BezierPatch {
    let columns: [BezierControlPoints; 4] = std::array::from_fn(|j| {
        top.column(j).join_by_tangent([join.handles[j], join.ends[j]], join.scalars[j])
    });
    BezierPatch::from_columns(columns)
}

/// Fill the corner patch enclosed by `top`, `left` and `diagonal`.
///
/// The first row and column come from the neighbors' shared edges, the
/// second row and column mirror the neighbors' handles through those edges,
/// and the inner handle shared by both is the mean of the two mirrors.
pub fn diagonal_stitch(corner: &CornerJoin, neighbors: DiagonalNeighbors<'_>) -> BezierPatch {
    let DiagonalNeighbors { top, left, diagonal } = neighbors;
    let mirror = |patch: &BezierPatch, (i, j): (usize, usize), (ci, cj): (usize, usize)| {
        mirror_point_around_center(patch.point(i, j), patch.point(ci, cj))
    };
    let [[c00, c01], [c10, c11]] = corner.0;

    BezierPatch::new([
        BezierControlPoints::new(diagonal.point(3, 3), top.point(3, 1), top.point(3, 2), top.point(3, 3)),
        BezierControlPoints::new(
            left.point(1, 3),
            mirror(left, (1, 2), (1, 3)).average(&mirror(top, (2, 1), (3, 1))),
            mirror(top, (2, 2), (3, 2)),
            mirror(top, (2, 3), (3, 3)),
        ),
        BezierControlPoints::new(left.point(2, 3), mirror(left, (2, 2), (2, 3)), c00, c01),
        BezierControlPoints::new(left.point(3, 3), mirror(left, (3, 2), (3, 3)), c10, c11),
    ])
}
