use serde::{Deserialize, Serialize};
use tracing::debug;

use super::bezier::{BezierControlPoints, Trim};
use super::vector::Vec3;
use crate::Sampling;
use crate::error::KernelError;

/// Oriented basis attached to one sample of a curve.
///
/// `binormal` is always `tangent × normal`. Frames are only produced by
/// [`FrameContext`], each one derived from its predecessor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub origin: Vec3,
    pub tangent: Vec3,
    pub rotational_axis: Vec3,
    pub normal: Vec3,
    pub binormal: Vec3,
    pub step: f64,
    pub is_boundary: bool,
}

/// How the first frame of a sequence is oriented.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FrameSeed {
    /// Curvature-based orientation at the start of the curve.
    Frenet,
    /// Rotational axis and normal carried over from the last frame of a
    /// joined predecessor curve.
    Inherit(Frame),
}

impl Frame {
    fn assemble(origin: Vec3, tangent: Vec3, rotational_axis: Vec3, normal: Vec3, step: f64) -> Self {
        Self {
            origin,
            tangent,
            rotational_axis,
            normal,
            binormal: tangent.cross(&normal),
            step,
            is_boundary: false,
        }
    }

    /// Frenet frame at `step`.
    ///
    /// Where the second derivative is parallel to the tangent (straight
    /// stretches) the axis and normal are not finite.
    pub fn frenet(control_points: &BezierControlPoints, step: f64) -> Self {
        let tangent = control_points.derivative(step).normalize();
        let b = (tangent + control_points.second_derivative(step)).normalize();
        let rotational_axis = tangent.cross(&b).normalize();
        let normal = rotational_axis.cross(&tangent).normalize();
        Self::assemble(control_points.evaluate(step), tangent, rotational_axis, normal, step)
    }

    /// Frame at `step` of a new curve that keeps the orientation of `previous`.
    pub fn inherited(control_points: &BezierControlPoints, step: f64, previous: &Frame) -> Self {
        let tangent = control_points.derivative(step).normalize();
        Self::assemble(
            control_points.evaluate(step),
            tangent,
            previous.rotational_axis,
            previous.normal,
            step,
        )
    }

    /// Propagate this frame to `next_step` by double reflection.
    ///
    /// The first reflection runs across the plane bisecting the two origins,
    /// the second across the plane bisecting the reflected tangent and the
    /// new tangent. A reflection whose plane normal vanishes is the identity.
    pub fn next_rotation_minimizing(&self, next_step: f64, control_points: &BezierControlPoints) -> Frame {
        let origin = control_points.evaluate(next_step);
        let tangent = control_points.derivative(next_step).normalize();

        let v1 = origin - self.origin;
        let c1 = v1.dot(&v1);
        let (axis_l, tangent_l) = if c1 == 0.0 {
            (self.rotational_axis, self.tangent)
        } else {
            (reflect(self.rotational_axis, v1, c1), reflect(self.tangent, v1, c1))
        };

        let v2 = tangent - tangent_l;
        let c2 = v2.dot(&v2);
        let rotational_axis = if c2 == 0.0 { axis_l } else { reflect(axis_l, v2, c2) };
        let normal = rotational_axis.cross(&tangent);

        Self::assemble(origin, tangent, rotational_axis, normal, next_step)
    }
}

/// Reflect `v` across the plane through the origin with normal `n`, `c = n·n`.
fn reflect(v: Vec3, n: Vec3, c: f64) -> Vec3 {
    v - n * ((2.0 / c) * n.dot(&v))
}

/// The ordered frames of one curve traversal.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameContext {
    control_points: BezierControlPoints,
    frames: Vec<Frame>,
    steps: usize,
    step_size: f64,
}

impl FrameContext {
    /// Untrimmed rotation-minimizing frames seeded from a Frenet frame.
    pub fn rotation_minimizing(control_points: BezierControlPoints, steps: usize) -> Self {
        Self::build(control_points, steps, FrameSeed::Frenet, (0.0, 1.0))
    }

    /// Untrimmed frames continuing the orientation of `previous`.
    pub fn continued_from(control_points: BezierControlPoints, steps: usize, previous: &Frame) -> Self {
        Self::build(control_points, steps, FrameSeed::Inherit(*previous), (0.0, 1.0))
    }

    /// Frames over the parameter range left after cutting `trim` off the curve.
    pub fn generate(
        control_points: BezierControlPoints,
        steps: usize,
        seed: FrameSeed,
        trim: Trim,
        sampling: &Sampling,
    ) -> Result<Self, KernelError> {
        let range = control_points.map_trim_to_parameter(trim, sampling.trim_fidelity)?;
        Ok(Self::build(control_points, steps, seed, range))
    }

    fn build(control_points: BezierControlPoints, steps: usize, seed: FrameSeed, (start, stop): (f64, f64)) -> Self {
        let steps = steps.max(1);
        let span = stop - start;

        let first = match seed {
            FrameSeed::Frenet => Frame::frenet(&control_points, start),
            FrameSeed::Inherit(previous) => Frame::inherited(&control_points, start, &previous),
        };
        let mut frames = Vec::with_capacity(steps + 1);
        frames.push(first);
        for i in 1..=steps {
            let step = start + span * (i as f64 / steps as f64);
            let next = frames[i - 1].next_rotation_minimizing(step, &control_points);
            frames.push(next);
        }

        frames[0].is_boundary = true;
        frames[steps].is_boundary = true;

        Self {
            control_points,
            frames,
            steps,
            step_size: span / steps as f64,
        }
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn control_points(&self) -> &BezierControlPoints {
        &self.control_points
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn step_size(&self) -> f64 {
        self.step_size
    }

    pub fn first_frame(&self) -> &Frame {
        &self.frames[0]
    }

    pub fn last_frame(&self) -> &Frame {
        &self.frames[self.steps]
    }

    pub fn origins(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.frames.iter().map(|f| f.origin)
    }

    /// Flag every frame as lying on a surface boundary.
    pub fn into_boundary(mut self) -> Self {
        for frame in &mut self.frames {
            frame.is_boundary = true;
        }
        self
    }
}

/// Sample a chain of joined curves with one continuous frame orientation.
///
/// The budget of `fidelity` steps is split by [`Sampling::weighted_steps`];
/// every curve after the first starts from its predecessor's last frame.
pub fn continuous_frames(curves: &[BezierControlPoints], fidelity: usize, sampling: &Sampling) -> Vec<FrameContext> {
    let steps = sampling.weighted_steps(curves, fidelity);
    debug!(curves = curves.len(), ?steps, "sampling continuous curve chain");

    let mut contexts: Vec<FrameContext> = Vec::with_capacity(curves.len());
    for (curve, steps) in curves.iter().zip(steps) {
        let context = match contexts.last() {
            Some(previous) => FrameContext::continued_from(*curve, steps, previous.last_frame()),
            None => FrameContext::rotation_minimizing(*curve, steps),
        };
        contexts.push(context);
    }
    contexts
}
