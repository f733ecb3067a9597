//! Rigid transforms and the relative-pose algebra.
//!
//! A [`RigidTransform2D`] maps points from a child frame into a parent frame:
//!
//! ```text
//! p_parent = R(θ) * p_child + t
//! ```
//!
//! Poses and transforms are interchangeable: a [`Pose2D`] recorded in the
//! world frame is the transform from the robot frame to the world frame.
//! The rotation is stored as `(cos θ, sin θ)` so composition never goes
//! through an angle and back.

use serde::{Deserialize, Serialize};

use super::pose::{Point2D, Pose2D};

/// 2D rotation plus translation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RigidTransform2D {
    cos: f64,
    sin: f64,
    tx: f64,
    ty: f64,
}

impl RigidTransform2D {
    /// The transform that maps every point onto itself.
    #[inline]
    pub fn identity() -> Self {
        Self {
            cos: 1.0,
            sin: 0.0,
            tx: 0.0,
            ty: 0.0,
        }
    }

    /// Build from a rotation angle (radians) and a translation (meters).
    #[inline]
    pub fn from_parts(angle: f64, tx: f64, ty: f64) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self { cos, sin, tx, ty }
    }

    /// Build from a 3×3 homogeneous matrix (row-major).
    ///
    /// Only the rotation block's first column and the translation column are
    /// read; the rotation is re-orthonormalized through its angle.
    pub fn from_matrix(m: &[[f64; 3]; 3]) -> Self {
        Self::from_parts(m[1][0].atan2(m[0][0]), m[0][2], m[1][2])
    }

    /// 3×3 homogeneous matrix (row-major).
    pub fn to_matrix(&self) -> [[f64; 3]; 3] {
        [
            [self.cos, -self.sin, self.tx],
            [self.sin, self.cos, self.ty],
            [0.0, 0.0, 1.0],
        ]
    }

    /// Rotation angle in (-π, π].
    #[inline]
    pub fn angle(&self) -> f64 {
        crate::core::math::normalize_angle(self.sin.atan2(self.cos))
    }

    /// Translation component.
    #[inline]
    pub fn translation(&self) -> Point2D {
        Point2D::new(self.tx, self.ty)
    }

    /// Apply to a point: `R * p + t`.
    #[inline]
    pub fn apply(&self, p: &Point2D) -> Point2D {
        Point2D::new(
            self.cos * p.x - self.sin * p.y + self.tx,
            self.sin * p.x + self.cos * p.y + self.ty,
        )
    }

    /// Apply to raw coordinates.
    #[inline]
    pub fn apply_xy(&self, x: f64, y: f64) -> (f64, f64) {
        (
            self.cos * x - self.sin * y + self.tx,
            self.sin * x + self.cos * y + self.ty,
        )
    }

    /// Composition `self ∘ other`: apply `other` first, then `self`.
    ///
    /// ```text
    /// R = R_a * R_b
    /// t = R_a * t_b + t_a
    /// ```
    #[inline]
    pub fn compose(&self, other: &RigidTransform2D) -> RigidTransform2D {
        RigidTransform2D {
            cos: self.cos * other.cos - self.sin * other.sin,
            sin: self.sin * other.cos + self.cos * other.sin,
            tx: self.cos * other.tx - self.sin * other.ty + self.tx,
            ty: self.sin * other.tx + self.cos * other.ty + self.ty,
        }
    }

    /// Inverse transform.
    ///
    /// ```text
    /// R' = Rᵀ
    /// t' = -Rᵀ * t
    /// ```
    #[inline]
    pub fn inverse(&self) -> RigidTransform2D {
        RigidTransform2D {
            cos: self.cos,
            sin: -self.sin,
            tx: -(self.cos * self.tx + self.sin * self.ty),
            ty: self.sin * self.tx - self.cos * self.ty,
        }
    }
}

impl Default for RigidTransform2D {
    fn default() -> Self {
        Self::identity()
    }
}

impl From<Pose2D> for RigidTransform2D {
    fn from(pose: Pose2D) -> Self {
        transform_from_pose(&pose)
    }
}

impl From<RigidTransform2D> for Pose2D {
    fn from(transform: RigidTransform2D) -> Self {
        pose_from_transform(&transform)
    }
}

/// Extract `(x, y, θ)` from a transform, θ in (-π, π].
#[inline]
pub fn pose_from_transform(transform: &RigidTransform2D) -> Pose2D {
    Pose2D::new(transform.tx, transform.ty, transform.angle())
}

/// Build the transform whose rotation is `pose.theta` and translation `(x, y)`.
#[inline]
pub fn transform_from_pose(pose: &Pose2D) -> RigidTransform2D {
    RigidTransform2D::from_parts(pose.theta, pose.x, pose.y)
}

/// Relative motion from `a` to `b`, expressed in `a`'s frame: `T(a)⁻¹ ∘ T(b)`.
///
/// The result maps coordinates in frame `b` into frame `a`.
#[inline]
pub fn transform_between(a: &Pose2D, b: &Pose2D) -> RigidTransform2D {
    transform_from_pose(a).inverse().compose(&transform_from_pose(b))
}

/// Rotation magnitude in [0, π].
#[inline]
pub fn angle_of(transform: &RigidTransform2D) -> f64 {
    transform.sin.atan2(transform.cos).abs()
}

/// Euclidean norm of the translation.
#[inline]
pub fn displacement_of(transform: &RigidTransform2D) -> f64 {
    transform.tx.hypot(transform.ty)
}
