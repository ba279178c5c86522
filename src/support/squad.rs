// SPDX-License-Identifier: LGPL-2.1-or-later
// Copyright © 2026 The flythru authors

// Squad through an ordered list of unit quaternions, with per-keyframe
// intermediate quaternions from
//   Dam, Koch, Lillholm, "Quaternions, interpolation and animation", 1998, p. 54
// and the hierarchical form squad(t) = slerp(slerp(q_i, q_i+1, t), slerp(a_i, a_i+1, t), 2t(1 - t)).

use nalgebra::*;

use super::quat::*;
use super::segment::Knots;
use super::tolerance::*;
use crate::error::*;

/// Which way the averaged tangent is applied to the keyframe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ControlDirection {
    #[default]
    Forward,
    /// Multiply by the inverse of the tangent exponential instead.
    Flipped,
}

/// Intermediate quaternion for keyframe `j`. Endpoints return the keyframe
/// itself.
pub fn control_point(j: usize, q: &[Vector4<f64>], direction: ControlDirection) -> Vector4<f64> {
    if j == 0 || j + 1 >= q.len() {
        return q[j];
    }
    let qi_inv = quat_inv(&q[j]);
    let to_prev = quat_log(&quat_prod(&qi_inv, &q[j - 1]));
    let to_next = quat_log(&quat_prod(&qi_inv, &q[j + 1]));
    let ang_vel = -(to_prev + to_next) / 4.0;

    let step = match direction {
        ControlDirection::Forward => quat_exp(&ang_vel),
        ControlDirection::Flipped => quat_inv(&quat_exp(&ang_vel)),
    };
    quat_normalize(&quat_prod(&q[j], &step))
}

/// Copy of `q` where every quaternion sits in the same hemisphere as its
/// predecessor, so no segment runs the long way around.
pub fn same_hemisphere(q: &[Vector4<f64>]) -> Vec<Vector4<f64>> {
    let mut out = q.to_vec();
    for j in 1..out.len() {
        if out[j - 1].dot(&out[j]) < 0.0 {
            out[j] = -out[j];
        }
    }
    out
}

fn squad(q: &[Vector4<f64>], j: usize, t: f64) -> Vector4<f64> {
    let qa = control_point(j - 1, q, ControlDirection::Forward);
    let qap1 = control_point(j, q, ControlDirection::Forward);
    let q_outer = quat_slerp(&q[j - 1], &q[j], t);
    let q_inner = quat_slerp(&qa, &qap1, t);
    quat_slerp(&q_outer, &q_inner, 2.0 * t * (1.0 - t))
}

/// Evaluates segment `j` (between `q[j - 1]` and `q[j]`) at local parameter `t`.
pub(crate) fn squad_segment(q: &[Vector4<f64>], j: usize, t: f64) -> Vector4<f64> {
    let c = q[j - 1].dot(&q[j]);
    let val = if 1.0 - c <= ANGLE_EPSILON {
        quat_lerp(&q[j - 1], &q[j], t)
    } else if 1.0 + c <= ANGLE_EPSILON {
        // No unique shortest rotation. Turn q[j] by a fixed 90° so the segment
        // has a defined plane and interpolate towards that instead.
        let qj = q[j];
        let mut perturbed = q.to_vec();
        perturbed[j] = Vector4::new(qj[3], -qj[2], qj[1], -qj[0]);
        log::debug!("antipodal keyframes at segment {j}, perturbing {:?}", qj.as_slice());
        squad(&perturbed, j, t)
    } else {
        squad(q, j, t)
    };
    quat_normalize(&val)
}

/// Squad spline over a fixed sequence of keyframe orientations.
///
/// Holds its own sign-corrected copy of the input, so it can be shared across
/// threads and evaluated at any number of parameters.
#[derive(Debug, Clone)]
pub struct QuatSpline {
    q: Vec<Vector4<f64>>,
    knots: Knots,
}

impl QuatSpline {
    pub fn make(quats: &[Vector4<f64>]) -> Result<Self> {
        if quats.is_empty() {
            return Err(FlyError::EmptySequence);
        }
        Ok(Self { q: same_hemisphere(quats), knots: Knots::new(quats.len()) })
    }

    pub fn len(&self) -> usize { self.q.len() }
    pub fn is_empty(&self) -> bool { self.q.is_empty() }

    /// Orientation at global fraction `s` in `[0, 1]`. Returns the first and
    /// last keyframes untouched at the ends.
    pub fn eval(&self, s: f64) -> Result<Vector4<f64>> {
        if !(0.0..=1.0).contains(&s) {
            return Err(FlyError::ParameterOutOfRange { t: s });
        }
        let n = self.q.len();
        if s == 0.0 || n == 1 {
            return Ok(self.q[0]);
        }
        if s == 1.0 {
            return Ok(self.q[n - 1]);
        }
        let (j, alpha) = self.knots.locate(s).ok_or(FlyError::NoActiveSegment { t: s })?;
        Ok(squad_segment(&self.q, j, alpha))
    }
}

/// One-shot evaluation of the squad spline through `quats` at `s`.
pub fn quat_spline(quats: &[Vector4<f64>], s: f64) -> Result<Vector4<f64>> {
    QuatSpline::make(quats)?.eval(s)
}
