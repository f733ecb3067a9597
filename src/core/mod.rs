//! Core foundation layer.
//!
//! This is the bottom layer of the evaluation stack with no internal
//! dependencies. All other layers depend on core.
//!
//! # Contents
//!
//! - [`types`]: Core data types (poses, rigid transforms, scans, point clouds)
//! - [`math`]: Angle normalization and angular arithmetic

pub mod math;
pub mod types;

pub use types::{angle_of, displacement_of, pose_from_transform, transform_between, transform_from_pose};
