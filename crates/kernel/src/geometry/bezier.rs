use serde::{Deserialize, Serialize};
use std::ops::Index;
use tracing::trace;

use super::vector::Vec3;
use crate::error::KernelError;
use crate::{DEFAULT_LENGTH_STEPS, DEFAULT_TRIM_FIDELITY};

/// Bisection halvings before the segment search falls back to a linear scan.
const MAX_BISECTION_DEPTH: usize = 5;

/// Relative slack when deciding whether an arclength lies on the curve.
const TRIM_EPSILON: f64 = 1e-9;

/// Control points of one cubic Bezier curve.
///
/// `P0` and `P3` are the endpoints, `P1` and `P2` the tangent handles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BezierControlPoints([Vec3; 4]);

/// Arclength distances cut from a curve before sampling.
///
/// `start >= 0` is measured from the curve start, `start < 0` back from the
/// end. `stop > 0` is measured from the curve start, `stop <= 0` back from
/// the end, so [`Trim::NONE`] keeps the whole curve.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Trim {
    pub start: f64,
    pub stop: f64,
}

impl Trim {
    pub const NONE: Self = Self {
        start: 0.0,
        stop: 0.0,
    };

    pub fn new(start: f64, stop: f64) -> Self {
        Self { start, stop }
    }

    pub fn is_none(&self) -> bool {
        self.start == 0.0 && self.stop == 0.0
    }
}

/// Cumulative arclength bracket `[from, to]` of one polyline segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceSpan {
    pub from: f64,
    pub to: f64,
}

impl DistanceSpan {
    pub fn new(from: f64, to: f64) -> Self {
        Self { from, to }
    }

    fn contains(&self, distance: f64) -> bool {
        self.from <= distance && distance <= self.to
    }
}

impl BezierControlPoints {
    pub fn new(p0: Vec3, p1: Vec3, p2: Vec3, p3: Vec3) -> Self {
        Self([p0, p1, p2, p3])
    }

    pub fn from_array(points: [[f64; 3]; 4]) -> Self {
        Self(points.map(Vec3::from_array))
    }

    pub fn points(&self) -> &[Vec3; 4] {
        &self.0
    }

    pub fn start(&self) -> Vec3 {
        self.0[0]
    }

    pub fn end(&self) -> Vec3 {
        self.0[3]
    }

    /// Cubic Bernstein evaluation. `step` is not range-checked.
    pub fn evaluate(&self, step: f64) -> Vec3 {
        let [p0, p1, p2, p3] = self.0;
        let inv = 1.0 - step;
        p0 * (inv * inv * inv)
            + p1 * (3.0 * inv * inv * step)
            + p2 * (3.0 * inv * step * step)
            + p3 * (step * step * step)
    }

    /// First derivative with respect to `step`.
    pub fn derivative(&self, step: f64) -> Vec3 {
        let [p0, p1, p2, p3] = self.0;
        p0 * (-3.0 * (1.0 - step) * (1.0 - step))
            + p1 * (3.0 * (3.0 * step * step - 4.0 * step + 1.0))
            + p2 * (3.0 * (2.0 - 3.0 * step) * step)
            + p3 * (3.0 * step * step)
    }

    /// Second derivative with respect to `step`.
    pub fn second_derivative(&self, step: f64) -> Vec3 {
        let [p0, p1, p2, p3] = self.0;
        p0 * (6.0 * (1.0 - step))
            + p1 * (6.0 * (3.0 * step - 2.0))
            + p2 * (6.0 * (1.0 - 3.0 * step))
            + p3 * (6.0 * step)
    }

    /// Start a new curve at this curve's end point, tangent-continuous with it.
    ///
    /// The first handle is `P2` reflected about `P3` and scaled by `scalar`;
    /// `targets` supply the second handle and the new end point. A scalar of 1
    /// gives C1 continuity, other positive values keep only the direction.
    pub fn join_by_tangent(&self, targets: [Vec3; 2], scalar: f64) -> Self {
        let end = self.end();
        let handle = end + (self.0[2] - end) * -scalar;
        Self([end, handle, targets[0], targets[1]])
    }

    /// Polyline approximation of the arclength over `steps + 1` uniform samples.
    pub fn length(&self, steps: usize) -> f64 {
        let steps = steps.max(1);
        let mut length = 0.0;
        let mut prev = self.evaluate(0.0);
        for i in 1..=steps {
            let curr = self.evaluate(i as f64 / steps as f64);
            length += prev.distance(&curr);
            prev = curr;
        }
        length
    }

    /// Cumulative arclength brackets of a `fidelity`-segment polyline.
    pub fn cumulative_distances(&self, fidelity: usize) -> Vec<DistanceSpan> {
        let fidelity = fidelity.max(1);
        let mut spans = Vec::with_capacity(fidelity);
        let mut prev = self.evaluate(0.0);
        let mut covered = 0.0;
        for i in 1..=fidelity {
            let curr = self.evaluate(i as f64 / fidelity as f64);
            let to = covered + prev.distance(&curr);
            spans.push(DistanceSpan::new(covered, to));
            covered = to;
            prev = curr;
        }
        spans
    }

    /// Convert an arclength trim into the `[start, stop]` parameter range.
    ///
    /// Fails if the resolved start lies after the resolved stop, or if either
    /// end falls outside the curve.
    pub fn map_trim_to_parameter(&self, trim: Trim, fidelity: usize) -> Result<(f64, f64), KernelError> {
        if trim.is_none() {
            return Ok((0.0, 1.0));
        }

        let spans = self.cumulative_distances(fidelity);
        let length = spans.last().map_or(0.0, |s| s.to);
        let start = if trim.start < 0.0 { length + trim.start } else { trim.start };
        let stop = if trim.stop <= 0.0 { length + trim.stop } else { trim.stop };
        if start > stop {
            return Err(KernelError::InvalidTrim { start, stop, length });
        }

        let range = (step_for_trim(start, &spans)?, step_for_trim(stop, &spans)?);
        trace!(?trim, length, ?range, "mapped trim to parameter range");
        Ok(range)
    }

    /// [`Self::map_trim_to_parameter`] at the default fidelity.
    pub fn trim_to_parameter(&self, trim: Trim) -> Result<(f64, f64), KernelError> {
        self.map_trim_to_parameter(trim, DEFAULT_TRIM_FIDELITY)
    }
}

impl Index<usize> for BezierControlPoints {
    type Output = Vec3;
    fn index(&self, index: usize) -> &Vec3 {
        &self.0[index]
    }
}

/// Map an arclength onto the curve parameter through its cumulative distances.
///
/// The containing segment is found by bounded bisection and a linear scan of
/// the remaining window; the step is then interpolated linearly inside it and
/// scaled to the global `[0, 1]` range.
pub fn step_for_trim(trim: f64, spans: &[DistanceSpan]) -> Result<f64, KernelError> {
    let (Some(first), Some(last)) = (spans.first(), spans.last()) else {
        return Err(KernelError::EmptyDistanceTable);
    };
    let no_segment = || KernelError::NoSegmentForTrim {
        requested: trim,
        covered_from: first.from,
        covered_to: last.to,
        segments: spans.len(),
    };

    let slack = TRIM_EPSILON * last.to.abs().max(1.0);
    if !(trim >= first.from - slack && trim <= last.to + slack) {
        return Err(no_segment());
    }
    let distance = trim.clamp(first.from, last.to);

    // Invariant: spans[low].from <= distance < spans[high].from.
    let mut low = 0;
    let mut high = spans.len();
    for _ in 0..MAX_BISECTION_DEPTH {
        if high - low <= 1 {
            break;
        }
        let mid = (low + high) / 2;
        if distance < spans[mid].from {
            high = mid;
        } else {
            low = mid;
        }
    }

    let index = (low..high)
        .find(|&i| spans[i].contains(distance))
        .ok_or_else(no_segment)?;
    let span = spans[index];
    let width = span.to - span.from;
    let local = if width > 0.0 { (distance - span.from) / width } else { 0.0 };

    Ok((index as f64 + local) / spans.len() as f64)
}

/// Split a sampling budget across consecutive curves in proportion to length.
///
/// Every curve receives at least one step; shares are rounded up.
pub fn weighted_steps(curves: &[BezierControlPoints], fidelity: usize) -> Vec<usize> {
    weighted_steps_with(curves, fidelity, DEFAULT_LENGTH_STEPS)
}

/// [`weighted_steps`] with an explicit sample count for the length estimate.
pub fn weighted_steps_with(curves: &[BezierControlPoints], fidelity: usize, length_steps: usize) -> Vec<usize> {
    let lengths: Vec<f64> = curves.iter().map(|c| c.length(length_steps)).collect();
    let total: f64 = lengths.iter().sum();
    if !(total > 0.0) {
        return vec![1; curves.len()];
    }

    lengths
        .iter()
        .map(|l| ((fidelity as f64 * l / total).ceil() as usize).max(1))
        .collect()
}

/// Point reflection of `point` through `center`.
pub fn mirror_point_around_center(point: Vec3, center: Vec3) -> Vec3 {
    point.mirror_around(&center)
}
