//! Point-to-Point Iterative Closest Point (ICP) algorithm.
//!
//! Classic ICP algorithm for aligning two point clouds by iteratively:
//! 1. Finding nearest neighbor correspondences
//! 2. Computing optimal rigid transform
//! 3. Applying transform and repeating until convergence
//!
//! # Algorithm
//!
//! ```text
//! Input: Source point cloud S, Target point cloud T, Initial guess T₀
//! Output: Transform T* that aligns S to T
//!
//! 1. T* = T₀
//! 2. For each iteration:
//!    a. S' = T* · S
//!    b. Find nearest neighbor in T for each point in S'
//!    c. Compute optimal rigid ΔT aligning S' to its neighbors (closed form)
//!    d. T* = ΔT ∘ T*
//!    e. If ΔT < threshold, converged
//! 3. Return T*
//! ```

use kiddo::{KdTree, SquaredEuclidean};
use serde::Deserialize;

use super::kdtree::{build_kdtree, mse_to_score};
use super::{MatchError, ScanMatchResult, ScanMatcher, ensure_non_empty};
use crate::core::types::{
    Point2D, PointCloud2D, Pose2D, RigidTransform2D, angle_of, displacement_of,
    pose_from_transform, transform_from_pose,
};

/// Configuration for Point-to-Point ICP.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IcpConfig {
    /// Maximum number of iterations.
    pub max_iterations: u32,

    /// Convergence threshold for translation (meters).
    pub translation_epsilon: f64,

    /// Convergence threshold for rotation (radians).
    pub rotation_epsilon: f64,

    /// Maximum correspondence distance (meters).
    ///
    /// Point pairs farther than this are rejected as outliers.
    pub max_correspondence_distance: f64,

    /// Minimum number of valid correspondences required.
    ///
    /// If fewer correspondences are found, the match fails.
    pub min_correspondences: usize,

    /// Fraction of the worst correspondences dropped each iteration (0.0 to 1.0).
    pub outlier_ratio: f64,

    /// Final MSE below which an iteration-capped run still counts as converged.
    pub converged_mse: f64,
}

impl Default for IcpConfig {
    fn default() -> Self {
        Self {
            max_iterations: 50,
            translation_epsilon: 0.001,       // 1mm
            rotation_epsilon: 0.001,          // ~0.06°
            max_correspondence_distance: 0.5, // 50cm
            min_correspondences: 10,
            outlier_ratio: 0.1, // Reject worst 10%
            converged_mse: 0.01,
        }
    }
}

/// A matched pair: (source index, target index, squared distance).
type Correspondence = (usize, usize, f64);

/// Point-to-Point ICP scan matcher.
///
/// Uses a k-d tree for efficient nearest neighbor queries.
/// Suitable for small to medium initial pose errors (<20cm, <10°).
#[derive(Debug, Clone)]
pub struct PointToPointIcp {
    config: IcpConfig,
}

impl PointToPointIcp {
    /// Create a new ICP matcher with the given configuration.
    pub fn new(config: IcpConfig) -> Self {
        Self { config }
    }

    /// Get the current configuration.
    pub fn config(&self) -> &IcpConfig {
        &self.config
    }

    /// Find correspondences for already-transformed source points.
    fn find_correspondences(
        &self,
        moved: &PointCloud2D,
        target_tree: &KdTree<f64, 2>,
    ) -> Vec<Correspondence> {
        let max_dist_sq = self.config.max_correspondence_distance.powi(2);
        let mut correspondences = Vec::with_capacity(moved.len());

        for i in 0..moved.len() {
            let nearest = target_tree.nearest_one::<SquaredEuclidean>(&[moved.xs[i], moved.ys[i]]);
            if nearest.distance <= max_dist_sq {
                correspondences.push((i, nearest.item as usize, nearest.distance));
            }
        }

        if self.config.outlier_ratio > 0.0 && !correspondences.is_empty() {
            correspondences.sort_by(|a, b| a.2.total_cmp(&b.2));
            let keep_count =
                ((1.0 - self.config.outlier_ratio) * correspondences.len() as f64) as usize;
            correspondences.truncate(keep_count.max(self.config.min_correspondences));
        }

        correspondences
    }

    /// Closed-form rigid transform aligning `moved` onto `target` over the
    /// given correspondences.
    ///
    /// ```text
    /// H = Σ (s - s̄)(t - t̄)ᵀ
    /// θ = atan2(H01 - H10, H00 + H11)
    /// t = t̄ - R(θ) s̄
    /// ```
    fn compute_increment(
        moved: &PointCloud2D,
        target: &PointCloud2D,
        correspondences: &[Correspondence],
    ) -> RigidTransform2D {
        if correspondences.len() < 3 {
            return RigidTransform2D::identity();
        }

        let n = correspondences.len() as f64;
        let mut sc = Point2D::default();
        let mut tc = Point2D::default();
        for &(si, ti, _) in correspondences {
            sc.x += moved.xs[si];
            sc.y += moved.ys[si];
            tc.x += target.xs[ti];
            tc.y += target.ys[ti];
        }
        sc.x /= n;
        sc.y /= n;
        tc.x /= n;
        tc.y /= n;

        let (mut h00, mut h01, mut h10, mut h11) = (0.0, 0.0, 0.0, 0.0);
        for &(si, ti, _) in correspondences {
            let sx = moved.xs[si] - sc.x;
            let sy = moved.ys[si] - sc.y;
            let tx = target.xs[ti] - tc.x;
            let ty = target.ys[ti] - tc.y;
            h00 += sx * tx;
            h01 += sx * ty;
            h10 += sy * tx;
            h11 += sy * ty;
        }

        let dtheta = (h01 - h10).atan2(h00 + h11);
        let (sin_dt, cos_dt) = dtheta.sin_cos();
        let dx = tc.x - (sc.x * cos_dt - sc.y * sin_dt);
        let dy = tc.y - (sc.x * sin_dt + sc.y * cos_dt);

        RigidTransform2D::from_parts(dtheta, dx, dy)
    }

    /// Mean squared error of correspondences after applying `delta`.
    fn compute_mse(
        moved: &PointCloud2D,
        target: &PointCloud2D,
        correspondences: &[Correspondence],
        delta: &RigidTransform2D,
    ) -> f64 {
        if correspondences.is_empty() {
            return f64::MAX;
        }

        let sum_sq: f64 = correspondences
            .iter()
            .map(|&(si, ti, _)| {
                let (x, y) = delta.apply_xy(moved.xs[si], moved.ys[si]);
                let dx = x - target.xs[ti];
                let dy = y - target.ys[ti];
                dx * dx + dy * dy
            })
            .sum();

        sum_sq / correspondences.len() as f64
    }
}

impl ScanMatcher for PointToPointIcp {
    fn match_scans(
        &mut self,
        source: &PointCloud2D,
        target: &PointCloud2D,
        initial_guess: &Pose2D,
    ) -> Result<ScanMatchResult, MatchError> {
        ensure_non_empty(source, target)?;

        let target_tree = build_kdtree(target);

        let mut current = transform_from_pose(initial_guess);
        let mut iterations = 0u32;
        let mut last_mse = f64::MAX;

        for iter in 0..self.config.max_iterations {
            iterations = iter + 1;

            let moved = source.transform(&current);
            let correspondences = self.find_correspondences(&moved, &target_tree);

            if correspondences.len() < self.config.min_correspondences {
                return Err(MatchError::InsufficientCorrespondences {
                    found: correspondences.len(),
                    required: self.config.min_correspondences,
                });
            }

            let delta = Self::compute_increment(&moved, target, &correspondences);
            let mse = Self::compute_mse(&moved, target, &correspondences, &delta);
            current = delta.compose(&current);

            if displacement_of(&delta) < self.config.translation_epsilon
                && angle_of(&delta) < self.config.rotation_epsilon
            {
                return Ok(ScanMatchResult::success(
                    pose_from_transform(&current),
                    mse_to_score(mse),
                    iterations,
                    mse,
                ));
            }

            // Diverging: keep the last estimate and stop
            if mse > last_mse * 1.1 {
                break;
            }
            last_mse = mse;
        }

        // Max iterations reached (or diverging)
        let moved = source.transform(&current);
        let correspondences = self.find_correspondences(&moved, &target_tree);
        let final_mse = Self::compute_mse(
            &moved,
            target,
            &correspondences,
            &RigidTransform2D::identity(),
        );
        let pose = pose_from_transform(&current);
        let score = mse_to_score(final_mse);

        if final_mse < self.config.converged_mse {
            Ok(ScanMatchResult::success(pose, score, iterations, final_mse))
        } else {
            Ok(ScanMatchResult::not_converged(pose, score, iterations, final_mse))
        }
    }
}
