//! Generic hybrid matcher combining coarse and fine matchers.
//!
//! 1. A coarse matcher handles large initial errors
//! 2. A fine matcher refines to sub-centimeter accuracy

use serde::Deserialize;

use super::{MatchError, ScanMatchResult, ScanMatcher};
use crate::core::types::{PointCloud2D, Pose2D};

/// Configuration for the hybrid matcher.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HybridConfig {
    /// If true, always run coarse matcher first.
    /// If false, only use coarse matcher when fine matcher does not converge.
    pub always_coarse: bool,
}

impl Default for HybridConfig {
    fn default() -> Self {
        Self {
            always_coarse: true,
        }
    }
}

/// Hybrid matcher combining a coarse and fine matcher.
///
/// * `C` - Coarse matcher type (e.g. `CorrelativeMatcher`)
/// * `F` - Fine matcher type (e.g. `PointToPointIcp`)
#[derive(Debug)]
pub struct HybridMatcher<C: ScanMatcher, F: ScanMatcher> {
    coarse: C,
    fine: F,
    config: HybridConfig,
}

impl<C: ScanMatcher, F: ScanMatcher> HybridMatcher<C, F> {
    /// Create a new hybrid matcher.
    pub fn new(coarse: C, fine: F, config: HybridConfig) -> Self {
        Self {
            coarse,
            fine,
            config,
        }
    }

    /// Coarse estimate, or `None` when the coarse stage found nothing usable.
    fn coarse_guess(
        &mut self,
        source: &PointCloud2D,
        target: &PointCloud2D,
        initial_guess: &Pose2D,
    ) -> Option<Pose2D> {
        match self.coarse.match_scans(source, target, initial_guess) {
            Ok(result) if result.converged => Some(result.transform),
            Ok(_) => None,
            Err(e) => {
                log::debug!("Coarse stage failed: {}", e);
                None
            }
        }
    }
}

impl<C: ScanMatcher, F: ScanMatcher> ScanMatcher for HybridMatcher<C, F> {
    fn match_scans(
        &mut self,
        source: &PointCloud2D,
        target: &PointCloud2D,
        initial_guess: &Pose2D,
    ) -> Result<ScanMatchResult, MatchError> {
        if self.config.always_coarse {
            let guess = self
                .coarse_guess(source, target, initial_guess)
                .unwrap_or(*initial_guess);
            return self.fine.match_scans(source, target, &guess);
        }

        let fine_result = self.fine.match_scans(source, target, initial_guess);
        if matches!(fine_result, Ok(ref r) if r.converged) {
            return fine_result;
        }

        // Fine stage alone was not enough: retry from the coarse estimate
        match self.coarse_guess(source, target, initial_guess) {
            Some(guess) => self.fine.match_scans(source, target, &guess),
            None => fine_result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::matching::test_utils::create_room;
    use crate::algorithms::matching::{
        CorrelativeConfig, CorrelativeMatcher, IcpConfig, PointToPointIcp,
    };
    use crate::core::types::RigidTransform2D;
    use approx::assert_relative_eq;

    fn wide_correlative() -> CorrelativeMatcher {
        CorrelativeMatcher::new(CorrelativeConfig {
            search_window_x: 0.3,
            search_window_y: 0.3,
            search_window_theta: 0.5,
            linear_resolution: 0.03,
            angular_resolution: 0.03,
            grid_resolution: 0.05,
            min_score: 0.4,
        })
    }

    #[test]
    fn test_hybrid_matcher_large_rotation() {
        let source = create_room(100, 4.0, 3.0);
        let target = source.transform(&RigidTransform2D::from_parts(0.44, 0.0, 0.0)); // ~25°

        let mut matcher = HybridMatcher::new(
            wide_correlative(),
            PointToPointIcp::new(IcpConfig::default()),
            HybridConfig::default(),
        );

        let result = matcher.match_scans(&source, &target, &Pose2D::identity()).unwrap();

        assert!(result.converged, "Should converge for large rotation");
        assert_relative_eq!(result.transform.theta, 0.44, epsilon = 0.08);
    }

    #[test]
    fn test_hybrid_fallback_only_when_needed() {
        let source = create_room(200, 4.0, 3.0);
        let target = source.transform(&RigidTransform2D::from_parts(0.0, 0.05, 0.0));

        let mut matcher = HybridMatcher::new(
            wide_correlative(),
            PointToPointIcp::new(IcpConfig::default()),
            HybridConfig {
                always_coarse: false,
            },
        );

        let result = matcher.match_scans(&source, &target, &Pose2D::identity()).unwrap();

        assert!(result.converged);
        assert_relative_eq!(result.transform.x, 0.05, epsilon = 0.02);
    }

    #[test]
    fn test_hybrid_propagates_fine_failure() {
        let source = create_room(100, 4.0, 3.0);
        let mut matcher = HybridMatcher::new(
            wide_correlative(),
            PointToPointIcp::new(IcpConfig::default()),
            HybridConfig::default(),
        );

        assert!(matcher.match_scans(&source, &PointCloud2D::new(), &Pose2D::identity()).is_err());
    }
}
