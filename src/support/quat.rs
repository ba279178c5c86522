// SPDX-License-Identifier: LGPL-2.1-or-later
// Copyright © 2026 The flythru authors

//! Quaternion algebra on plain `Vector4<f64>` in (w, x, y, z) order.

use nalgebra::*;
use rayon::prelude::*;

use super::tolerance::*;

/// Hamilton product `p * q`.
pub fn quat_prod(p: &Vector4<f64>, q: &Vector4<f64>) -> Vector4<f64> {
    Vector4::new(p[0] * q[0] - p[1] * q[1] - p[2] * q[2] - p[3] * q[3],
                 p[0] * q[1] + p[1] * q[0] + p[2] * q[3] - p[3] * q[2],
                 p[0] * q[2] - p[1] * q[3] + p[2] * q[0] + p[3] * q[1],
                 p[0] * q[3] + p[1] * q[2] - p[2] * q[1] + p[3] * q[0])
}

pub fn quat_conj(mut q: Vector4<f64>) -> Vector4<f64> {
    *q.fixed_rows_mut::<3>(1) = *-q.fixed_rows::<3>(1);
    q
}

/// Conjugate over squared norm. Equals the conjugate for unit quaternions.
pub fn quat_inv(q: &Vector4<f64>) -> Vector4<f64> {
    quat_conj(*q) / q.norm_squared()
}

/// Divides by the euclidean norm. `q` must not be zero.
pub fn quat_normalize(q: &Vector4<f64>) -> Vector4<f64> {
    let norm = q.norm();
    debug_assert!(norm > 0.0, "normalizing a zero quaternion");
    q / norm
}

/// Natural logarithm `(ln|q|, acos(w / |q|) * v / |v|)`.
///
/// When the vector part vanishes the factor takes its limit `1 / |q|`, which
/// is only meaningful for `w > 0`. Callers keep consecutive quaternions in the
/// same hemisphere, so a purely real `q` here is always close to identity.
pub fn quat_log(q: &Vector4<f64>) -> Vector4<f64> {
    let norm = q.norm();
    let v_norm = q.fixed_rows::<3>(1).norm();
    let k = if v_norm > LOG_AXIS_EPSILON {
        (q[0] / norm).clamp(-1.0, 1.0).acos() / v_norm
    } else {
        1.0 / norm
    };
    Vector4::new(libm::log(norm), q[1] * k, q[2] * k, q[3] * k)
}

/// Exponential `e^w * (cos|v|, sin|v| / |v| * v)`.
///
/// `sin|v| / |v|` goes to 1 for a vanishing vector part, so a zero angular
/// velocity maps to identity.
pub fn quat_exp(q: &Vector4<f64>) -> Vector4<f64> {
    let theta = q.fixed_rows::<3>(1).norm();
    let k = if theta > LOG_AXIS_EPSILON { theta.sin() / theta } else { 1.0 };
    libm::exp(q[0]) * Vector4::new(theta.cos(), q[1] * k, q[2] * k, q[3] * k)
}

pub fn quat_lerp(p: &Vector4<f64>, q: &Vector4<f64>, t: f64) -> Vector4<f64> { p * (1.0 - t) + q * t }

/// Great circle between two unit quaternions, with everything that does not
/// depend on `t` computed once.
struct GreatArc {
    p: Vector4<f64>,
    q: Vector4<f64>,
    dot: f64,
    theta_0: f64,
    sin_theta_0: f64,
}

impl GreatArc {
    fn new(p: &Vector4<f64>, mut q: Vector4<f64>) -> Self {
        let mut dot = p.dot(&q);
        // q and -q are the same rotation, take the short way around
        if dot < 0.0 {
            q = -q;
            dot = -dot;
        }
        let theta_0 = dot.min(1.0).acos();
        Self { p: *p, q, dot, theta_0, sin_theta_0: theta_0.sin() }
    }

    fn at(&self, t: f64) -> Vector4<f64> {
        if t == 0.0 {
            return self.p;
        }
        if t == 1.0 {
            return self.q;
        }
        if self.dot > SLERP_LINEAR_THRESHOLD {
            return quat_normalize(&quat_lerp(&self.p, &self.q, t));
        }
        let theta = self.theta_0 * t;
        let sin_theta = theta.sin();

        let s0 = theta.cos() - self.dot * sin_theta / self.sin_theta_0;
        let s1 = sin_theta / self.sin_theta_0;
        s0 * self.p + s1 * self.q
    }
}

/// Spherical linear interpolation from `p` (t = 0) to `q` (t = 1) along the
/// shorter arc.
pub fn quat_slerp(p: &Vector4<f64>, q: &Vector4<f64>, t: f64) -> Vector4<f64> {
    GreatArc::new(p, *q).at(t)
}

/// `quat_slerp` for a batch of parameters. Element `i` of the result belongs
/// to `ts[i]` and is bit-identical to the scalar call.
pub fn quat_slerp_many(p: &Vector4<f64>, q: &Vector4<f64>, ts: &[f64]) -> Vec<Vector4<f64>> {
    let arc = GreatArc::new(p, *q);
    ts.par_iter().map(|&t| arc.at(t)).collect()
}
