//! Pose comparison.

use serde::Serialize;

use crate::core::math::angle_diff;
use crate::core::types::Pose2D;

/// Element-wise absolute difference `(|Δx|, |Δy|, |Δθ|)` between two poses.
///
/// `Δθ` takes the short way around the circle, so it lies in [0, π].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct PoseDelta {
    pub dx: f64,
    pub dy: f64,
    pub dtheta: f64,
}

impl PoseDelta {
    pub fn between(a: &Pose2D, b: &Pose2D) -> Self {
        Self {
            dx: (a.x - b.x).abs(),
            dy: (a.y - b.y).abs(),
            dtheta: angle_diff(b.theta, a.theta).abs(),
        }
    }

    /// Translation error in meters (Euclidean).
    #[inline]
    pub fn translation(&self) -> f64 {
        self.dx.hypot(self.dy)
    }

    /// Rotation error in radians.
    #[inline]
    pub fn rotation(&self) -> f64 {
        self.dtheta
    }
}
