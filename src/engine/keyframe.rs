//! Keyframe pair selection.
//!
//! Walks the trajectory once, forward only, keeping a running anchor frame.
//! A frame whose ground-truth motion relative to the anchor exceeds either
//! threshold is paired with the anchor and becomes the new anchor:
//!
//! ```text
//! target = 0
//! for i in 1..N:
//!     T = transform_between(pose[target], pose[i])
//!     if angle_of(T) > min_rotation or displacement_of(T) > min_displacement:
//!         emit (source = i, target)
//!         target = i
//! ```

use serde::Deserialize;

use super::trajectory::Trajectory;
use crate::core::types::{RigidTransform2D, angle_of, displacement_of, transform_between};

/// Keyframe selection thresholds.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct KeyframeConfig {
    /// Translation (meters) that must be exceeded to emit a pair.
    pub min_displacement: f64,

    /// Rotation (radians) that must be exceeded to emit a pair.
    pub min_rotation: f64,

    /// Only walk the first `max_frames` frames of the trajectory.
    pub max_frames: Option<usize>,
}

impl Default for KeyframeConfig {
    fn default() -> Self {
        Self {
            min_displacement: 0.4, // 40cm
            min_rotation: 0.3,     // ~17 degrees
            max_frames: None,
        }
    }
}

/// A selected (source, target) pair with its ground-truth relative transform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KeyframePair {
    /// Later frame, the one being registered.
    pub source_id: usize,

    /// Anchor frame it is registered against.
    pub target_id: usize,

    /// `transform_between(pose[target_id], pose[source_id])`: maps source
    /// scan coordinates into the target scan frame.
    pub ground_truth: RigidTransform2D,
}

/// Motion-threshold keyframe selector.
#[derive(Debug, Clone, Default)]
pub struct KeyframeSelector {
    config: KeyframeConfig,
}

impl KeyframeSelector {
    pub fn new(config: KeyframeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &KeyframeConfig {
        &self.config
    }

    /// Whether a relative motion is large enough to emit a pair.
    ///
    /// Both comparisons are strict: motion exactly at a threshold does not count.
    #[inline]
    pub fn exceeds_thresholds(&self, motion: &RigidTransform2D) -> bool {
        angle_of(motion) > self.config.min_rotation
            || displacement_of(motion) > self.config.min_displacement
    }

    /// Lazily produce pairs in trajectory order.
    pub fn pairs<'a>(&'a self, trajectory: &'a Trajectory) -> KeyframePairs<'a> {
        let end = self
            .config
            .max_frames
            .map_or(trajectory.len(), |max| max.min(trajectory.len()));
        KeyframePairs {
            selector: self,
            trajectory,
            target: 0,
            next: 1,
            end,
        }
    }

    /// Collect every pair.
    pub fn select(&self, trajectory: &Trajectory) -> Vec<KeyframePair> {
        self.pairs(trajectory).collect()
    }
}

/// Iterator over selected pairs. Owns the running anchor.
#[derive(Debug)]
pub struct KeyframePairs<'a> {
    selector: &'a KeyframeSelector,
    trajectory: &'a Trajectory,
    target: usize,
    next: usize,
    end: usize,
}

impl Iterator for KeyframePairs<'_> {
    type Item = KeyframePair;

    fn next(&mut self) -> Option<Self::Item> {
        let anchor = *self.trajectory.pose(self.target)?;
        while self.next < self.end {
            let i = self.next;
            self.next += 1;

            let pose = self.trajectory.pose(i)?;
            let motion = transform_between(&anchor, pose);
            if self.selector.exceeds_thresholds(&motion) {
                let pair = KeyframePair {
                    source_id: i,
                    target_id: self.target,
                    ground_truth: motion,
                };
                log::debug!("matching {} {}", pair.source_id, pair.target_id);
                self.target = i;
                return Some(pair);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{PointCloud2D, Pose2D, pose_from_transform};
    use approx::assert_relative_eq;

    fn trajectory(poses: Vec<Pose2D>) -> Trajectory {
        let scans = vec![PointCloud2D::new(); poses.len()];
        Trajectory::new(poses, scans).unwrap()
    }

    fn ids(pairs: &[KeyframePair]) -> Vec<(usize, usize)> {
        pairs.iter().map(|p| (p.source_id, p.target_id)).collect()
    }

    #[test]
    fn test_accumulated_motion_scenario() {
        let traj = trajectory(vec![
            Pose2D::new(0.0, 0.0, 0.0),
            Pose2D::new(0.1, 0.0, 0.0),
            Pose2D::new(0.5, 0.0, 0.0),
        ]);
        let pairs = KeyframeSelector::default().select(&traj);

        assert_eq!(ids(&pairs), vec![(2, 0)]);
        let gt = pose_from_transform(&pairs[0].ground_truth);
        assert_relative_eq!(gt.x, 0.5, epsilon = 1e-12);
        assert_relative_eq!(gt.y, 0.0, epsilon = 1e-12);
        assert_relative_eq!(gt.theta, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_anchor_moves_after_emission() {
        let traj = trajectory(
            (0..10)
                .map(|i| Pose2D::new(i as f64 * 0.25, 0.0, 0.0))
                .collect(),
        );
        let pairs = KeyframeSelector::default().select(&traj);

        // 0.5 > 0.4 every second frame
        assert_eq!(ids(&pairs), vec![(2, 0), (4, 2), (6, 4), (8, 6)]);
    }

    #[test]
    fn test_rotation_only_motion() {
        let traj = trajectory(vec![
            Pose2D::new(0.0, 0.0, 0.0),
            Pose2D::new(0.0, 0.0, 0.2),
            Pose2D::new(0.0, 0.0, 0.35),
            Pose2D::new(0.0, 0.0, -2.9),
        ]);
        let pairs = KeyframeSelector::default().select(&traj);

        assert_eq!(ids(&pairs), vec![(2, 0), (3, 2)]);
        // Wraps the short way: 0.35 → -2.9 is a 3.03 rad turn
        assert_relative_eq!(
            angle_of(&pairs[1].ground_truth),
            std::f64::consts::TAU - 3.25,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_rotation_measured_in_anchor_frame() {
        // Anchor faces +y; 0.5m along world y is 0.5m forward in its frame
        let traj = trajectory(vec![
            Pose2D::new(0.0, 0.0, std::f64::consts::FRAC_PI_2),
            Pose2D::new(0.0, 0.5, std::f64::consts::FRAC_PI_2),
        ]);
        let pairs = KeyframeSelector::default().select(&traj);
        assert_eq!(pairs.len(), 1);
        let gt = pose_from_transform(&pairs[0].ground_truth);
        assert_relative_eq!(gt.x, 0.5, epsilon = 1e-12);
        assert_relative_eq!(gt.y, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_threshold_is_strict() {
        let p0 = Pose2D::new(0.0, 0.0, 0.0);
        let p1 = Pose2D::new(0.3, 0.0, 0.25);
        let motion = transform_between(&p0, &p1);
        let traj = trajectory(vec![p0, p1]);

        let at_threshold = KeyframeSelector::new(KeyframeConfig {
            min_displacement: displacement_of(&motion),
            min_rotation: angle_of(&motion),
            max_frames: None,
        });
        assert!(at_threshold.select(&traj).is_empty());

        let just_below = KeyframeSelector::new(KeyframeConfig {
            min_displacement: displacement_of(&motion),
            min_rotation: angle_of(&motion) - 1e-9,
            max_frames: None,
        });
        assert_eq!(ids(&just_below.select(&traj)), vec![(1, 0)]);
    }

    #[test]
    fn test_no_motion_emits_nothing() {
        let traj = trajectory(vec![Pose2D::new(1.0, 1.0, 0.5); 20]);
        assert!(KeyframeSelector::default().select(&traj).is_empty());

        let single = trajectory(vec![Pose2D::identity()]);
        assert!(KeyframeSelector::default().select(&single).is_empty());
    }

    #[test]
    fn test_source_ids_strictly_increasing() {
        let traj = trajectory(
            (0..200)
                .map(|i| {
                    let t = i as f64 * 0.07;
                    Pose2D::new(t.cos() * 3.0, t.sin() * 2.0, t * 0.9)
                })
                .collect(),
        );
        let pairs = KeyframeSelector::default().select(&traj);

        assert!(!pairs.is_empty());
        assert_eq!(pairs[0].target_id, 0);
        for window in pairs.windows(2) {
            assert!(window[1].source_id > window[0].source_id);
            assert_eq!(window[1].target_id, window[0].source_id);
        }
        for pair in &pairs {
            assert!(pair.target_id < pair.source_id);
        }
    }

    #[test]
    fn test_max_frames_caps_walk() {
        let traj = trajectory(
            (0..10)
                .map(|i| Pose2D::new(i as f64 * 0.25, 0.0, 0.0))
                .collect(),
        );
        let selector = KeyframeSelector::new(KeyframeConfig {
            max_frames: Some(5),
            ..KeyframeConfig::default()
        });
        assert_eq!(ids(&selector.select(&traj)), vec![(2, 0), (4, 2)]);
    }
}
