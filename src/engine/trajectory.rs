//! Trajectory store.
//!
//! Ground-truth poses and their scans, indexed by the same id `0..N-1`.
//! Built once, read-only afterwards.

use crate::core::types::{PointCloud2D, Pose2D};
use crate::error::{EvalError, Result};

/// Time-ordered poses and scans.
#[derive(Debug, Clone)]
pub struct Trajectory {
    poses: Vec<Pose2D>,
    scans: Vec<PointCloud2D>,
}

impl Trajectory {
    /// Pair up poses and scans.
    ///
    /// Fails with [`EvalError::MissingData`] when there is nothing to pair and
    /// [`EvalError::TrajectoryMismatch`] when the counts differ.
    pub fn new(poses: Vec<Pose2D>, scans: Vec<PointCloud2D>) -> Result<Self> {
        if poses.is_empty() || scans.is_empty() {
            return Err(EvalError::MissingData(format!(
                "trajectory needs poses and scans (got {} poses, {} scans)",
                poses.len(),
                scans.len()
            )));
        }
        if poses.len() != scans.len() {
            return Err(EvalError::TrajectoryMismatch {
                poses: poses.len(),
                scans: scans.len(),
            });
        }
        Ok(Self { poses, scans })
    }

    /// Number of frames.
    #[inline]
    pub fn len(&self) -> usize {
        self.poses.len()
    }

    /// Always false for a constructed trajectory.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.poses.is_empty()
    }

    /// Ground-truth pose of frame `id`.
    #[inline]
    pub fn pose(&self, id: usize) -> Option<&Pose2D> {
        self.poses.get(id)
    }

    /// Scan of frame `id` in its sensor frame.
    #[inline]
    pub fn scan(&self, id: usize) -> Option<&PointCloud2D> {
        self.scans.get(id)
    }

    pub fn poses(&self) -> &[Pose2D] {
        &self.poses
    }

    pub fn scans(&self) -> &[PointCloud2D] {
        &self.scans
    }

    /// Iterate over `(id, pose, scan)`.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &Pose2D, &PointCloud2D)> + '_ {
        self.poses
            .iter()
            .zip(self.scans.iter())
            .enumerate()
            .map(|(id, (pose, scan))| (id, pose, scan))
    }
}
