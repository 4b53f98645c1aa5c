// Copyright © SoftOboros Technology, Inc.
// SPDX-License-Identifier: MIT
//! Module: frame-rate independent smoothing and turn envelopes

use glam::{Vec2, Vec3};
use std::f32::consts::{PI, TAU};

/// Distance under which a damped value snaps onto its target.
pub const SNAP_EPSILON: f32 = 1.0e-4;

/// Trait for values that can be linearly interpolated.
pub trait Lerp: Sized + Copy {
    /// Interpolate between `self` and `other` with factor `t`.
    fn lerp(self, other: Self, t: f32) -> Self;

    /// Largest per-component distance to `other`.
    fn distance_to(self, other: Self) -> f32;
}

impl Lerp for f32 {
    fn lerp(self, other: Self, t: f32) -> Self {
        self + (other - self) * t
    }

    fn distance_to(self, other: Self) -> f32 {
        (other - self).abs()
    }
}

impl Lerp for Vec2 {
    fn lerp(self, other: Self, t: f32) -> Self {
        Vec2::lerp(self, other, t)
    }

    fn distance_to(self, other: Self) -> f32 {
        (other - self).abs().max_element()
    }
}

impl Lerp for Vec3 {
    fn lerp(self, other: Self, t: f32) -> Self {
        Vec3::lerp(self, other, t)
    }

    fn distance_to(self, other: Self) -> f32 {
        (other - self).abs().max_element()
    }
}

/// Blend factor for exponential smoothing over `delta` seconds.
///
/// `1 - exp(-delta / tau)`; a non-positive `tau` jumps straight to the target.
pub fn smoothing_factor(tau: f32, delta: f32) -> f32 {
    if tau <= 0.0 {
        return 1.0;
    }
    1.0 - (-delta.max(0.0) / tau).exp()
}

/// Move `current` toward `target` with exponential smoothing.
pub fn damp<T: Lerp>(current: T, target: T, tau: f32, delta: f32) -> T {
    let next = current.lerp(target, smoothing_factor(tau, delta));
    if next.distance_to(target) < SNAP_EPSILON {
        target
    } else {
        next
    }
}

/// Wrap an angle into `(-PI, PI]`.
pub fn wrap_angle(angle: f32) -> f32 {
    let mut a = (angle + PI).rem_euclid(TAU) - PI;
    if a <= -PI {
        a += TAU;
    }
    a
}

/// Like [`damp`] but travels along the shortest arc.
pub fn damp_angle(current: f32, target: f32, tau: f32, delta: f32) -> f32 {
    let diff = wrap_angle(target - current);
    let next = current + diff * smoothing_factor(tau, delta);
    if wrap_angle(target - next).abs() < SNAP_EPSILON {
        target
    } else {
        next
    }
}

/// Sine-shaped turn intensity for `elapsed_ms` into a turn of `duration_ms`.
///
/// Rises from 0, peaks at half the duration and falls back to exactly 0
/// once the duration has passed. Negative elapsed time yields 0.
pub fn turning_envelope(elapsed_ms: f64, duration_ms: f64) -> f32 {
    if duration_ms <= 0.0 || elapsed_ms <= 0.0 || elapsed_ms >= duration_ms {
        return 0.0;
    }
    let progress = (elapsed_ms / duration_ms) as f32;
    (progress * PI).sin()
}
