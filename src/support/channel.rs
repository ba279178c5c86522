// SPDX-License-Identifier: LGPL-2.1-or-later
// Copyright © 2026 The flythru authors

use std::ops::{ Add, Mul };

use super::segment::Knots;
use crate::error::*;

/// Piecewise linear channel (distance, orbit center, ..) over the same index
/// parametrization as the quaternion spline.
pub struct Channel<'a, T> {
    values: &'a [T],
    knots: Knots,
}

impl<'a, T> Channel<'a, T> where T: Copy + Add<Output = T> + Mul<f64, Output = T> {
    pub fn new(values: &'a [T]) -> Result<Self> {
        if values.is_empty() {
            return Err(FlyError::EmptySequence);
        }
        Ok(Self { values, knots: Knots::new(values.len()) })
    }

    pub fn eval(&self, t: f64) -> Result<T> {
        if !(0.0..=1.0).contains(&t) {
            return Err(FlyError::ParameterOutOfRange { t });
        }
        let n = self.values.len();
        if t == 0.0 || n == 1 {
            return Ok(self.values[0]);
        }
        if t == 1.0 {
            return Ok(self.values[n - 1]);
        }
        match self.knots.locate(t) {
            Some((j, alpha)) => Ok(self.values[j - 1] * (1.0 - alpha) + self.values[j] * alpha),
            None => Err(FlyError::NoActiveSegment { t }),
        }
    }
}

/// Linear interpolation of `values` at the global fraction `t`.
pub fn lerp_channel<T>(values: &[T], t: f64) -> Result<T> where T: Copy + Add<Output = T> + Mul<f64, Output = T> {
    Channel::new(values)?.eval(t)
}
