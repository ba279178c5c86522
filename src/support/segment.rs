// SPDX-License-Identifier: LGPL-2.1-or-later
// Copyright © 2026 The flythru authors

use std::cmp::Ordering;
use superslice::*;

/// Local weight of interval `i` (1-based, between values `i - 1` and `i`) for
/// the global fraction `s` over `len` values.
///
/// Intervals left of `k = s * (len - 1)` get 0, the one containing `k` gets
/// its fractional position, everything to the right saturates at 1.
pub fn eval_alpha(s: f64, i: usize, len: usize) -> f64 {
    let k = s * (len as f64 - 1.0);
    let start = i as f64 - 1.0;
    let i = i as f64;
    // compare against the interval start, `k + 1` rounds away ulps of `k`
    if i < k {
        0.0
    } else if k < i && start < k {
        k - start
    } else {
        1.0
    }
}

/// `num` evenly spaced samples over `[start, end]`, both ends included.
pub fn linspace(start: f64, end: f64, num: usize) -> Vec<f64> {
    match num {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (num - 1) as f64;
            (0..num).map(|i| if i == num - 1 { end } else { start + step * i as f64 }).collect()
        }
    }
}

/// Keyframe positions `0, 1, .., len - 1` in index space.
#[derive(Debug, Clone, Default)]
pub struct Knots {
    positions: Vec<f64>,
}

impl Knots {
    pub fn new(len: usize) -> Self {
        Self { positions: (0..len).map(|i| i as f64).collect() }
    }

    pub fn len(&self) -> usize { self.positions.len() }

    /// Active interval and its `eval_alpha` weight for the global fraction `s`.
    ///
    /// Same answer as scanning `i = 1..len` for the first positive alpha: the
    /// first knot at or above `k` closes the active interval, so a `k` sitting
    /// exactly on a knot resolves to the earlier interval.
    pub fn locate(&self, s: f64) -> Option<(usize, f64)> {
        let len = self.len();
        if len < 2 {
            return None;
        }
        let k = s * (len - 1) as f64;
        let idx = self.positions.lower_bound_by(|x| x.partial_cmp(&k).unwrap_or(Ordering::Less)).max(1);
        if idx >= len {
            return None;
        }
        let alpha = eval_alpha(s, idx, len);
        (alpha > 0.0).then_some((idx, alpha))
    }
}
