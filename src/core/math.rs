//! Mathematical primitives for 2D registration.
//!
//! Functions for angle normalization and angular arithmetic. Everything is
//! `f64` so relative-pose round trips stay well inside 1e-9.

use std::f64::consts::{PI, TAU};

/// Normalize angle to (-π, π].
///
/// `-π` maps to `+π` so every heading has exactly one representation.
///
/// # Example
/// ```
/// use pariksha::core::math::normalize_angle;
/// use std::f64::consts::PI;
///
/// assert!((normalize_angle(3.0 * PI) - PI).abs() < 1e-12);
/// assert!((normalize_angle(-PI) - PI).abs() < 1e-12);
/// ```
#[inline]
pub fn normalize_angle(angle: f64) -> f64 {
    let mut a = angle % TAU;
    if a > PI {
        a -= TAU;
    } else if a <= -PI {
        a += TAU;
    }
    a
}

/// Shortest angular difference from angle `a` to angle `b`.
///
/// Returns the signed angle you need to add to `a` to reach `b`,
/// taking the shortest path around the circle.
///
/// # Example
/// ```
/// use pariksha::core::math::angle_diff;
/// use std::f64::consts::PI;
///
/// // Crossing the ±π boundary takes the short way
/// let diff = angle_diff(PI - 0.1, -PI + 0.1);
/// assert!((diff - 0.2).abs() < 1e-12);
/// ```
#[inline]
pub fn angle_diff(a: f64, b: f64) -> f64 {
    normalize_angle(b - a)
}
