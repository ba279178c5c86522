// SPDX-License-Identifier: LGPL-2.1-or-later
// Copyright © 2026 The flythru authors

//! Numeric thresholds shared by the quaternion code.
//!
//! All values are tuned for `f64`. For a single precision backend the two
//! epsilons have to grow to roughly `1e-6`, since `1 - cos(θ)` stops being
//! representable for θ below ~3e-4 rad in `f32`.

/// Dot product above which `quat_slerp` falls back to normalized lerp.
///
/// 0.9995 is an angle of ~1.8° between the quaternions (~3.6° of rotation).
/// Below that arc the lerp chord deviates from the great circle by less than
/// 1e-4 after renormalization, while `sin(θ)` in the closed form is already
/// small enough to amplify rounding error.
pub const SLERP_LINEAR_THRESHOLD: f64 = 0.9995;

/// Margin on `1 - dot` / `1 + dot` that marks two quaternions as parallel or
/// antiparallel in the squad evaluator.
///
/// About 4.5e6 ulps of 1.0 in `f64`, i.e. a relative angle of ~4.5e-5 rad.
pub const ANGLE_EPSILON: f64 = 1e-9;

/// Norm of the vector part below which `quat_log` / `quat_exp` switch to their
/// analytic limits instead of dividing by it.
pub const LOG_AXIS_EPSILON: f64 = 1e-12;

/// Allowed deviation of a caller-supplied orientation norm from 1.
///
/// Host camera APIs round components to ~4 significant digits, so e.g.
/// `(0.707, 0.707, 0, 0)` (norm 0.99985) has to pass.
pub const UNIT_NORM_TOLERANCE: f64 = 1e-3;
