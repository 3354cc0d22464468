//! The right-hand arc of the case as a grid of stitched bicubic patches.
//!
//! Patch `arc_i_j` sits in column `i` (growing outwards along +x) and row `j`
//! (growing towards the back along +y). Only `arc_0_0` is authored in full;
//! every other patch is stitched onto finalized neighbors so the seams stay
//! tangent continuous.

use keycase_kernel::stitching::{
    ColumnJoin, CornerJoin, DiagonalNeighbors, RowJoin, diagonal_stitch, horizontal_stitch, vertical_stitch,
};
use keycase_kernel::{BezierPatch, Vec3};

#[derive(Debug, Clone, PartialEq)]
pub struct ArcPatches {
    pub arc_0_0: BezierPatch,
    pub arc_1_0: BezierPatch,
    pub arc_2_0: BezierPatch,
    pub arc_3_0: BezierPatch,
    pub arc_4_0: BezierPatch,
    pub arc_0_1: BezierPatch,
    pub arc_1_1: BezierPatch,
    pub arc_0_2: BezierPatch,
}

impl ArcPatches {
    pub const COUNT: usize = 8;

    /// Patches with their names, front row first.
    pub fn named(&self) -> [(&'static str, &BezierPatch); Self::COUNT] {
        [
            ("arc_0_0", &self.arc_0_0),
            ("arc_1_0", &self.arc_1_0),
            ("arc_2_0", &self.arc_2_0),
            ("arc_3_0", &self.arc_3_0),
            ("arc_4_0", &self.arc_4_0),
            ("arc_0_1", &self.arc_0_1),
            ("arc_1_1", &self.arc_1_1),
            ("arc_0_2", &self.arc_0_2),
        ]
    }

    pub fn to_vec(&self) -> Vec<BezierPatch> {
        self.named().iter().map(|(_, patch)| **patch).collect()
    }
}

fn v(x: f64, y: f64, z: f64) -> Vec3 {
    Vec3::new(x, y, z)
}

fn row(handle: [f64; 3], end: [f64; 3]) -> RowJoin {
    RowJoin::new(Vec3::from_array(handle), Vec3::from_array(end))
}

/// Build the arc layout.
pub fn arc_patches() -> ArcPatches {
    let arc_0_0 = BezierPatch::from_array([
        [[0.0, 18.5, 21.25], [3.0, 18.5, 21.25], [5.0, 18.2, 21.0], [8.0, 18.0, 21.0]],
        [[0.0, 98.5, 21.25], [2.0, 98.5, 21.0], [20.0, 98.5, 21.0], [24.0, 98.5, 21.25]],
        [[0.0, 118.5, 22.5], [10.0, 118.5, 22.25], [24.0, 118.5, 22.25], [28.0, 114.5, 22.5]],
        [[0.0, 138.5, 22.5], [12.0, 138.0, 22.25], [25.0, 136.0, 22.25], [33.85, 134.5, 22.5]],
    ]);

    let arc_1_0 = horizontal_stitch(
        &[
            row([25.0, 15.0, 18.5], [27.0, 14.5, 18.2]),
            row([32.0, 94.5, 18.2], [46.0, 94.5, 18.2]),
            row([40.0, 114.5, 23.0], [51.0, 110.0, 18.2]).with_scalar(0.3),
            row([46.0, 132.5, 20.5], [56.85, 130.0, 18.2]).with_scalar(0.3),
        ],
        &arc_0_0,
    );
    let arc_2_0 = horizontal_stitch(
        &[
            row([50.0, 10.0, 14.0], [64.0, 7.7, 10.5]),
            row([50.0, 88.0, 10.5], [76.0, 87.7, 10.5]),
            row([60.0, 110.0, 10.5], [84.4, 113.5, 10.5]),
            row([70.0, 127.0, 15.0], [84.4, 123.5, 10.5]),
        ],
        &arc_1_0,
    );
    let arc_3_0 = horizontal_stitch(
        &[
            row([95.0, 4.0, 4.5], [100.8, 3.5, 3.8]),
            row([95.0, 84.0, 3.8], [110.0, 83.5, 3.8]),
            row([105.0, 104.0, 3.8], [117.0, 97.0, 3.8]),
            row([95.0, 121.0, 8.0], [117.0, 117.0, 3.8]),
        ],
        &arc_2_0,
    );
    let arc_4_0 = horizontal_stitch(
        &[
            row([120.0, 2.0, 0.0], [160.0, 0.0, 0.0]),
            row([120.0, 82.0, 0.0], [160.0, 80.0, 0.0]),
            row([120.0, 103.85, 0.0], [160.0, 103.85, 0.0]),
            row([140.0, 113.85, 0.0], [160.0, 113.85, 0.0]),
        ],
        &arc_3_0,
    );

    let arc_0_1 = vertical_stitch(
        &ColumnJoin::new(
            [v(0.0, 158.5, 22.5), v(15.0, 158.5, 22.5), v(35.0, 158.5, 22.5), v(40.0, 158.5, 22.5)],
            [v(0.0, 205.5, 13.5), v(15.0, 205.5, 13.5), v(35.0, 205.5, 13.5), v(50.0, 205.5, 13.5)],
        ),
        &arc_0_0,
    );

    let arc_1_1 = diagonal_stitch(
        &CornerJoin([
            [v(70.0, 155.0, 22.5), v(67.0, 155.0, 22.5)],
            [v(70.0, 204.0, 11.5), v(82.0, 202.0, 10.5)],
        ]),
        DiagonalNeighbors {
            top: &arc_1_0,
            left: &arc_0_1,
            diagonal: &arc_0_0,
        },
    );

    // Back lip: the last handle leans 60° off the table.
    let back = 228.5;
    let lip = back - 3.0 * 3f64.sqrt();
    let arc_0_2 = vertical_stitch(
        &ColumnJoin::new(
            [v(0.0, lip, 9.0), v(15.0, lip, 9.0), v(35.0, lip, 9.0), v(53.0, lip, 9.0)],
            [v(0.0, back, 0.0), v(15.0, back, 0.0), v(35.0, back, 0.0), v(56.0, back, 0.0)],
        )
        .with_scalars([0.3; 4]),
        &arc_0_1,
    );

    ArcPatches {
        arc_0_0,
        arc_1_0,
        arc_2_0,
        arc_3_0,
        arc_4_0,
        arc_0_1,
        arc_1_1,
        arc_0_2,
    }
}
