//! Shared nearest-neighbour utilities.
//!
//! - K-d tree building
//! - Fitness score (mean squared nearest-neighbour distance)
//! - MSE to score conversion

use std::collections::HashSet;

use kiddo::{KdTree, SquaredEuclidean};

use crate::core::types::PointCloud2D;

/// Build a k-d tree from a point cloud.
///
/// Exact duplicates are stored once, under the index of their first
/// occurrence. kiddo cannot split a leaf whose items all share one position,
/// so a bucket's worth of coincident points would otherwise abort the build.
/// Nearest-neighbour distances are unaffected.
pub fn build_kdtree(cloud: &PointCloud2D) -> KdTree<f64, 2> {
    let mut tree: KdTree<f64, 2> = KdTree::new();
    let mut seen = HashSet::with_capacity(cloud.len());
    for i in 0..cloud.len() {
        let (x, y) = (cloud.xs[i], cloud.ys[i]);
        if seen.insert((x.to_bits(), y.to_bits())) {
            tree.add(&[x, y], i as u64);
        }
    }
    tree
}

/// Mean squared distance from each aligned point to its nearest target point.
///
/// Points whose nearest neighbour is farther than `max_range` are ignored.
/// Lower is better; `0.0` is a perfect overlap. Returns `f64::MAX` when no
/// point contributes.
pub fn fitness_score(aligned: &PointCloud2D, target: &PointCloud2D, max_range: Option<f64>) -> f64 {
    if aligned.is_empty() || target.is_empty() {
        return f64::MAX;
    }

    let tree = build_kdtree(target);
    let max_dist_sq = max_range.map_or(f64::MAX, |r| r * r);

    let mut sum = 0.0;
    let mut count = 0usize;
    for (&x, &y) in aligned.xs.iter().zip(aligned.ys.iter()) {
        let nearest = tree.nearest_one::<SquaredEuclidean>(&[x, y]);
        if nearest.distance <= max_dist_sq {
            sum += nearest.distance;
            count += 1;
        }
    }

    if count == 0 { f64::MAX } else { sum / count as f64 }
}

/// Convert MSE to a 0-1 score.
///
/// Linear decay based on RMSE:
/// - Score 1.0 at RMSE = 0
/// - Score 0.5 at RMSE = 10cm
/// - Score 0.0 at RMSE ≥ 20cm
#[inline]
pub(crate) fn mse_to_score(mse: f64) -> f64 {
    (1.0 - mse.sqrt() * 5.0).clamp(0.0, 1.0)
}
