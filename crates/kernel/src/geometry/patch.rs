use serde::{Deserialize, Serialize};

use super::bezier::BezierControlPoints;
use super::vector::Vec3;

/// A bicubic Bezier patch: a 4×4 grid of control points stored as four rows.
///
/// Every row and every column is itself a cubic Bezier curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BezierPatch {
    rows: [BezierControlPoints; 4],
}

impl BezierPatch {
    pub fn new(rows: [BezierControlPoints; 4]) -> Self {
        Self { rows }
    }

    pub fn from_array(grid: [[[f64; 3]; 4]; 4]) -> Self {
        Self {
            rows: grid.map(BezierControlPoints::from_array),
        }
    }

    /// Build a patch whose columns are the given curves.
    pub fn from_columns(columns: [BezierControlPoints; 4]) -> Self {
        Self::new(columns).transpose()
    }

    pub fn rows(&self) -> &[BezierControlPoints; 4] {
        &self.rows
    }

    pub fn row(&self, i: usize) -> BezierControlPoints {
        self.rows[i]
    }

    pub fn column(&self, j: usize) -> BezierControlPoints {
        BezierControlPoints::new(self.rows[0][j], self.rows[1][j], self.rows[2][j], self.rows[3][j])
    }

    pub fn point(&self, i: usize, j: usize) -> Vec3 {
        self.rows[i][j]
    }

    pub fn transpose(&self) -> Self {
        Self {
            rows: [self.column(0), self.column(1), self.column(2), self.column(3)],
        }
    }

    /// The four corner points, row-major: `[0][0]`, `[0][3]`, `[3][0]`, `[3][3]`.
    pub fn corners(&self) -> [Vec3; 4] {
        [self.point(0, 0), self.point(0, 3), self.point(3, 0), self.point(3, 3)]
    }

    /// Apply `f` to every control point.
    pub fn map_points(&self, mut f: impl FnMut(Vec3) -> Vec3) -> Self {
        let rows = self.rows.map(|row| {
            let [p0, p1, p2, p3] = *row.points();
            BezierControlPoints::new(f(p0), f(p1), f(p2), f(p3))
        });
        Self { rows }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> BezierPatch {
        let mut grid = [[[0.0; 3]; 4]; 4];
        for (i, row) in grid.iter_mut().enumerate() {
            for (j, p) in row.iter_mut().enumerate() {
                *p = [i as f64, j as f64, (i * 4 + j) as f64];
            }
        }
        BezierPatch::from_array(grid)
    }

    #[test]
    fn test_column_reads_across_rows() {
        let patch = grid();
        let column = patch.column(2);
        for i in 0..4 {
            assert_eq!(column[i], patch.point(i, 2));
        }
    }

    #[test]
    fn test_transpose_twice_is_identity() {
        let patch = grid();
        assert_eq!(patch.transpose().transpose(), patch);
        assert_eq!(patch.transpose().point(1, 3), patch.point(3, 1));
    }

    #[test]
    fn test_from_columns() {
        let patch = grid();
        let columns = [patch.column(0), patch.column(1), patch.column(2), patch.column(3)];
        assert_eq!(BezierPatch::from_columns(columns), patch);
    }

    #[test]
    fn test_corners() {
        let corners = grid().corners();
        assert_eq!(corners[0], Vec3::new(0.0, 0.0, 0.0));
        assert_eq!(corners[3], Vec3::new(3.0, 3.0, 15.0));
    }
}
