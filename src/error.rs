// SPDX-License-Identifier: LGPL-2.1-or-later
// Copyright © 2026 The flythru authors

/// Errors reported at the interpolation boundary. The quaternion math itself
/// is total and never fails.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum FlyError {
    #[error("keyframe sequence is empty")]
    EmptySequence,

    #[error("subframe count must be at least 1")]
    ZeroSubframes,

    #[error("unsupported interpolation mode: {0:?} (expected \"linear\" or \"cubic\")")]
    UnsupportedMode(String),

    #[error("orientation of keyframe {index} is not a unit quaternion (norm {norm})")]
    NonUnitQuaternion { index: usize, norm: f64 },

    #[error("interpolation parameter {t} is outside [0, 1]")]
    ParameterOutOfRange { t: f64 },

    #[error("no active segment for parameter {t}")]
    NoActiveSegment { t: f64 },
}

pub type Result<T> = std::result::Result<T, FlyError>;
