//! Core data types for registration evaluation.
//!
//! Geometry:
//! - [`Point2D`]: 2D point in meters
//! - [`Pose2D`]: Ground-truth pose (x, y, theta) in meters and radians
//! - [`RigidTransform2D`]: Rotation + translation with composition and inverse
//!
//! Scans:
//! - [`LaserScan`]: Raw LiDAR scan in polar coordinates
//! - [`PointCloud2D`]: Collection of 2D points in Cartesian coordinates

mod pose;
mod scan;
mod transform;

pub use pose::{Point2D, Pose2D};
pub use scan::{LaserScan, PointCloud2D};
pub use transform::{
    RigidTransform2D, angle_of, displacement_of, pose_from_transform, transform_between,
    transform_from_pose,
};
