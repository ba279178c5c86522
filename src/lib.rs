// SPDX-License-Identifier: LGPL-2.1-or-later
// Copyright © 2026 The flythru authors

//! Camera fly-through interpolation.
//!
//! Turns a short, ordered list of camera keyframes (orientation quaternion,
//! orbit center, distance) into a dense list of poses. Orientations follow a
//! squad spline, orbit center and distance are interpolated linearly on the
//! same parametrization so all channels pass their keyframes together.

mod error;
mod support {
    pub(crate) mod channel;
    pub(crate) mod quat;
    pub(crate) mod segment;
    pub(crate) mod squad;
    pub(crate) mod tolerance;
}

pub use error::{ FlyError, Result };
pub use support::channel::{ lerp_channel, Channel };
pub use support::quat::{ quat_conj, quat_exp, quat_inv, quat_lerp, quat_log, quat_normalize, quat_prod, quat_slerp, quat_slerp_many };
pub use support::segment::{ eval_alpha, linspace };
pub use support::squad::{ control_point, quat_spline, same_hemisphere, ControlDirection, QuatSpline };
pub use support::tolerance::*;

use nalgebra::*;
use rayon::prelude::*;
use std::fmt;
use std::str::FromStr;

/// A camera pose on the fly-through path.
#[derive(Debug, Clone, PartialEq)]
pub struct Keyframe {
    /// Unit quaternion (w, x, y, z).
    pub orientation: Vector4<f64>,
    pub orbit_center: Vector3<f64>,
    pub distance: f64,
    pub id: Option<String>,
    pub name: Option<String>,
}

impl Keyframe {
    pub fn new(orientation: Vector4<f64>, orbit_center: Vector3<f64>, distance: f64) -> Self {
        Self { orientation, orbit_center, distance, id: None, name: None }
    }
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Orders keyframes by display name. Unnamed keyframes go last and keep
/// their relative order.
pub fn sort_by_name(keyframes: &mut [Keyframe]) {
    keyframes.sort_by(|a, b| match (&a.name, &b.name) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InterpolationMode {
    /// Per-pair slerp, `subframes` frames per pair, the closing keyframe excluded.
    Linear,
    /// Squad spline over the whole sequence.
    #[default]
    Cubic,
}

impl FromStr for InterpolationMode {
    type Err = FlyError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "linear" => Ok(Self::Linear),
            "cubic" => Ok(Self::Cubic),
            _ => Err(FlyError::UnsupportedMode(s.to_string())),
        }
    }
}

impl fmt::Display for InterpolationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Linear => "linear",
            Self::Cubic => "cubic",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlySettings {
    /// Interpolated frames per keyframe.
    pub subframes: usize,
    /// Playback stops after this many frames.
    pub max_frames: Option<usize>,
    pub mode: InterpolationMode,
}

impl Default for FlySettings {
    fn default() -> Self {
        Self {
            subframes: 10,
            max_frames: Some(150),
            mode: InterpolationMode::Cubic,
        }
    }
}

fn validate(keyframes: &[Keyframe], subframes: usize) -> Result<()> {
    if keyframes.is_empty() {
        log::error!("Empty keyframe sequence!");
        return Err(FlyError::EmptySequence);
    }
    if subframes == 0 {
        log::error!("Invalid subframe count: 0");
        return Err(FlyError::ZeroSubframes);
    }
    for (index, kf) in keyframes.iter().enumerate() {
        let norm = kf.orientation.norm();
        if !norm.is_finite() || (norm - 1.0).abs() > UNIT_NORM_TOLERANCE {
            log::error!("Keyframe {index} has non-unit orientation {:?} (norm {norm})", kf.orientation.as_slice());
            return Err(FlyError::NonUnitQuaternion { index, norm });
        }
    }
    Ok(())
}

fn interpolate_linear(keyframes: &[Keyframe], subframes: usize) -> Vec<Keyframe> {
    let ts: Vec<f64> = (1..subframes).map(|i| i as f64 / subframes as f64).collect();
    let mut frames = Vec::with_capacity((keyframes.len() - 1) * subframes);
    for pair in keyframes.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        frames.push(a.clone());

        let quats = quat_slerp_many(&a.orientation, &b.orientation, &ts);
        frames.extend(ts.iter().zip(quats).map(|(&t, q)| {
            Keyframe::new(q, a.orbit_center * (1.0 - t) + b.orbit_center * t, a.distance * (1.0 - t) + b.distance * t)
        }));
    }
    frames
}

fn interpolate_cubic(keyframes: &[Keyframe], subframes: usize) -> Result<Vec<Keyframe>> {
    let quats: Vec<Vector4<f64>> = keyframes.iter().map(|k| k.orientation).collect();
    let centers: Vec<Vector3<f64>> = keyframes.iter().map(|k| k.orbit_center).collect();
    let distances: Vec<f64> = keyframes.iter().map(|k| k.distance).collect();

    let spline = QuatSpline::make(&quats)?;
    let center = Channel::new(&centers)?;
    let distance = Channel::new(&distances)?;

    linspace(0.0, 1.0, spline.len() * subframes).par_iter().map(|&s| -> Result<Keyframe> {
        let frame = Keyframe::new(spline.eval(s)?, center.eval(s)?, distance.eval(s)?);
        log::trace!("{s:.6} {:?}", frame.orientation.as_slice());
        Ok(frame)
    }).collect()
}

/// Expands `keyframes` into the frames of a fly-through.
///
/// * `Linear` gives `(n - 1) * subframes` frames, each pair starting with its
///   own keyframe.
/// * `Cubic` gives `n * subframes` frames on an evenly spaced grid over the
///   whole path, first and last frames equal to the end keyframes.
///
/// A single keyframe yields a single static frame in both modes.
pub fn interpolate_keyframes(keyframes: &[Keyframe], subframes: usize, mode: InterpolationMode) -> Result<Vec<Keyframe>> {
    validate(keyframes, subframes)?;
    if keyframes.len() == 1 {
        return Ok(vec![keyframes[0].clone()]);
    }
    let frames = match mode {
        InterpolationMode::Linear => interpolate_linear(keyframes, subframes),
        InterpolationMode::Cubic => interpolate_cubic(keyframes, subframes)?,
    };
    log::debug!("interpolated {} keyframes into {} frames ({mode})", keyframes.len(), frames.len());
    Ok(frames)
}

/// A fly-through session: keyframes, settings and an optional progress
/// callback. Applying the frames to a viewport is left to the caller.
#[derive(Default)]
pub struct FlyThrough<'a> {
    keyframes: Vec<Keyframe>,
    settings: FlySettings,
    progress_cb: Option<Box<dyn Fn(f64) -> bool + Sync + 'a>>,
}

impl<'a> FlyThrough<'a> {
    pub fn new() -> Self { Self::default() }

    /// Called with the playback fraction before every frame and with 1.0 at
    /// the end. Returning `false` stops playback.
    pub fn on_progress<F: Fn(f64) -> bool + Sync + 'a>(&mut self, cb: F) {
        self.progress_cb = Some(Box::new(cb));
    }

    pub fn set_settings(&mut self, settings: FlySettings) { self.settings = settings; }
    pub fn settings(&self) -> &FlySettings { &self.settings }

    pub fn set_keyframes(&mut self, keyframes: Vec<Keyframe>) { self.keyframes = keyframes; }
    pub fn add_keyframe(&mut self, keyframe: Keyframe) { self.keyframes.push(keyframe); }
    pub fn keyframes(&self) -> &[Keyframe] { &self.keyframes }

    pub fn sort_keyframes_by_name(&mut self) { sort_by_name(&mut self.keyframes); }

    pub fn frames(&self) -> Result<Vec<Keyframe>> {
        interpolate_keyframes(&self.keyframes, self.settings.subframes, self.settings.mode)
    }

    /// Hands the frames to `apply` in path order and returns how many were
    /// applied.
    pub fn play<F: FnMut(usize, &Keyframe)>(&self, mut apply: F) -> Result<usize> {
        let frames = self.frames()?;
        let count = self.settings.max_frames.map_or(frames.len(), |max| max.min(frames.len()));

        for (i, frame) in frames.iter().take(count).enumerate() {
            if let Some(ref cb) = self.progress_cb {
                if !cb(i as f64 / frames.len() as f64) {
                    log::debug!("fly-through cancelled at frame {i}");
                    return Ok(i);
                }
            }
            apply(i, frame);
        }
        if let Some(ref cb) = self.progress_cb {
            cb(1.0);
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::*;

    fn keyframe(angle_z: f64, x: f64, distance: f64) -> Keyframe {
        let half = angle_z * 0.5;
        Keyframe::new(Vector4::new(half.cos(), 0.0, 0.0, half.sin()), Vector3::new(x, 0.0, 0.0), distance)
    }

    #[test]
    fn mode_parses_and_displays() {
        assert_eq!("linear".parse::<InterpolationMode>(), Ok(InterpolationMode::Linear));
        assert_eq!(" Cubic ".parse::<InterpolationMode>(), Ok(InterpolationMode::Cubic));
        assert_eq!("bezier".parse::<InterpolationMode>(), Err(FlyError::UnsupportedMode("bezier".into())));
        assert_eq!(InterpolationMode::Linear.to_string(), "linear");
        assert_eq!(InterpolationMode::default(), InterpolationMode::Cubic);
    }

    #[test]
    fn linear_mode_frame_layout() {
        let kfs = vec![keyframe(0.0, 0.0, 10.0).with_name("a"), keyframe(1.0, 4.0, 20.0).with_name("b"), keyframe(2.0, 8.0, 30.0)];
        let frames = interpolate_keyframes(&kfs, 4, InterpolationMode::Linear).unwrap();
        assert_eq!(frames.len(), 8);
        assert_eq!(frames[0], kfs[0]);
        assert_eq!(frames[4], kfs[1]);
        assert!(approx_eq!(f64, frames[2].distance, 15.0, epsilon = 1e-12));
        assert!(approx_eq!(f64, frames[2].orbit_center[0], 2.0, epsilon = 1e-12));
        assert!(approx_eq!(f64, frames[2].orientation[3], 0.25f64.sin(), epsilon = 1e-12));
        assert!(frames[2].name.is_none());
        assert!(approx_eq!(f64, frames[7].distance, 27.5, epsilon = 1e-12));
    }

    #[test]
    fn cubic_mode_grid_size_and_ends() {
        let kfs = vec![keyframe(0.0, 0.0, 10.0), keyframe(0.5, 1.0, 20.0), keyframe(1.2, 3.0, 15.0), keyframe(1.5, 3.0, 5.0)];
        let frames = interpolate_keyframes(&kfs, 3, InterpolationMode::Cubic).unwrap();
        assert_eq!(frames.len(), 12);
        assert_eq!(frames[0].orientation, kfs[0].orientation);
        assert_eq!(frames[11].orientation, kfs[3].orientation);
        assert_eq!(frames[11].distance, 5.0);
        for f in &frames {
            assert!(approx_eq!(f64, f.orientation.norm(), 1.0, epsilon = 1e-6));
        }
    }

    #[test]
    fn cubic_channels_follow_the_grid() {
        // grids with samples one ulp past a knot
        for (n, subframes) in [(6, 11), (5, 73), (8, 99), (9, 81), (3, 5)] {
            let kfs: Vec<Keyframe> = (0..n).map(|i| keyframe(0.2 * i as f64, i as f64, 10.0 * i as f64)).collect();
            let frames = interpolate_keyframes(&kfs, subframes, InterpolationMode::Cubic).unwrap();
            let grid = linspace(0.0, 1.0, n * subframes);
            assert_eq!(frames.len(), grid.len());
            for (i, (f, &s)) in frames.iter().zip(&grid).enumerate() {
                let k = s * (n - 1) as f64;
                assert!(f.distance >= 10.0 * k.floor() - 1e-9 && f.distance <= 10.0 * k.ceil() + 1e-9, "{n}x{subframes} frame {i}: {}", f.distance);
                assert!(approx_eq!(f64, f.distance, 10.0 * k, epsilon = 1e-9), "{n}x{subframes} frame {i}");
                assert!(approx_eq!(f64, f.orbit_center[0], k, epsilon = 1e-9), "{n}x{subframes} frame {i}");
            }
            for pair in frames.windows(2) {
                assert!(pair[1].distance >= pair[0].distance);
            }
        }
    }

    #[test]
    fn single_keyframe_gives_static_frame() {
        let kfs = vec![keyframe(0.3, 1.0, 12.0).with_id("p1")];
        for mode in [InterpolationMode::Linear, InterpolationMode::Cubic] {
            assert_eq!(interpolate_keyframes(&kfs, 5, mode).unwrap(), kfs);
        }
    }

    #[test]
    fn rejects_invalid_input() {
        assert_eq!(interpolate_keyframes(&[], 5, InterpolationMode::Cubic), Err(FlyError::EmptySequence));

        let kfs = vec![keyframe(0.0, 0.0, 1.0), keyframe(1.0, 0.0, 1.0)];
        assert_eq!(interpolate_keyframes(&kfs, 0, InterpolationMode::Linear), Err(FlyError::ZeroSubframes));

        let mut bad = kfs.clone();
        bad[1].orientation = Vector4::new(0.0, 0.0, 0.0, 0.0);
        assert_eq!(interpolate_keyframes(&bad, 2, InterpolationMode::Cubic), Err(FlyError::NonUnitQuaternion { index: 1, norm: 0.0 }));

        bad[1].orientation = Vector4::new(1.0, 1.0, 0.0, 0.0);
        assert!(matches!(interpolate_keyframes(&bad, 2, InterpolationMode::Cubic), Err(FlyError::NonUnitQuaternion { index: 1, .. })));
    }

    #[test]
    fn sort_by_name_puts_unnamed_last() {
        let mut kfs = vec![
            keyframe(0.0, 0.0, 1.0).with_id("x"),
            keyframe(0.0, 0.0, 2.0).with_name("Frame 002"),
            keyframe(0.0, 0.0, 3.0).with_id("y"),
            keyframe(0.0, 0.0, 4.0).with_name("Frame 000"),
        ];
        sort_by_name(&mut kfs);
        let order: Vec<f64> = kfs.iter().map(|k| k.distance).collect();
        assert_eq!(order, vec![4.0, 2.0, 1.0, 3.0]);
    }

    #[test]
    fn default_settings() {
        let settings = FlySettings::default();
        assert_eq!(settings.subframes, 10);
        assert_eq!(settings.max_frames, Some(150));
        assert_eq!(settings.mode, InterpolationMode::Cubic);
    }
}
