//! Scan matching module.
//!
//! Two seams live here:
//!
//! - [`ScanMatcher`]: a stateless-looking alignment algorithm, source and
//!   target in, [`ScanMatchResult`] out.
//! - [`RegistrationEngine`]: the stateful engine contract the evaluator drives
//!   (reset, set inputs, align, query). [`MatcherEngine`] adapts any
//!   `ScanMatcher` to it.
//!
//! # Algorithms
//!
//! - [`PointToPointIcp`]: Classic Iterative Closest Point algorithm
//! - [`CorrelativeMatcher`]: Exhaustive search for handling large initial errors
//! - [`HybridMatcher`]: Coarse search followed by fine refinement
//!
//! # Example
//!
//! ```
//! use pariksha::algorithms::matching::{EngineKind, MatcherSettings, RegistrationEngine};
//! use pariksha::{PointCloud2D, RigidTransform2D};
//!
//! let mut engine = EngineKind::Icp.build(&MatcherSettings::default());
//! engine.reset();
//! engine.set_source(&PointCloud2D::new());
//! engine.set_target(&PointCloud2D::new());
//! assert!(engine.align(&RigidTransform2D::identity()).is_err());
//! ```

mod correlative;
mod engine;
mod hybrid;
mod icp;
mod kdtree;
#[cfg(test)]
pub(crate) mod test_utils;

pub use correlative::{CorrelativeConfig, CorrelativeMatcher};
pub use engine::{Alignment, EngineKind, MatcherEngine, MatcherSettings, RegistrationEngine};
pub use hybrid::{HybridConfig, HybridMatcher};
pub use icp::{IcpConfig, PointToPointIcp};
pub use kdtree::{build_kdtree, fitness_score};

use thiserror::Error;

use crate::core::types::{PointCloud2D, Pose2D};

/// Reasons a matcher produces no transform at all.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MatchError {
    #[error("{0} point cloud is empty")]
    EmptyCloud(&'static str),

    #[error("{0} point cloud was not set before align")]
    MissingInput(&'static str),

    #[error("only {found} correspondences, need {required}")]
    InsufficientCorrespondences { found: usize, required: usize },
}

/// Result of a scan matching operation.
#[derive(Debug, Clone)]
pub struct ScanMatchResult {
    /// Estimated transform from source frame to target frame.
    pub transform: Pose2D,

    /// Match quality score (0.0 = bad, 1.0 = perfect).
    pub score: f64,

    /// Whether the algorithm converged successfully.
    pub converged: bool,

    /// Number of iterations (or candidates) evaluated.
    pub iterations: u32,

    /// Mean squared error of final correspondences.
    pub mse: f64,
}

impl ScanMatchResult {
    /// Create a successful result.
    pub fn success(transform: Pose2D, score: f64, iterations: u32, mse: f64) -> Self {
        Self {
            transform,
            score,
            converged: true,
            iterations,
            mse,
        }
    }

    /// Create a result that produced a transform but did not converge.
    pub fn not_converged(transform: Pose2D, score: f64, iterations: u32, mse: f64) -> Self {
        Self {
            converged: false,
            ..Self::success(transform, score, iterations, mse)
        }
    }
}

/// Trait for scan matching algorithms.
pub trait ScanMatcher {
    /// Align source point cloud to target point cloud.
    ///
    /// # Arguments
    ///
    /// * `source` - The point cloud to be transformed
    /// * `target` - The reference point cloud
    /// * `initial_guess` - Initial transform estimate (source frame → target frame)
    ///
    /// Non-convergence is reported through [`ScanMatchResult::converged`];
    /// `Err` means no transform could be produced.
    fn match_scans(
        &mut self,
        source: &PointCloud2D,
        target: &PointCloud2D,
        initial_guess: &Pose2D,
    ) -> Result<ScanMatchResult, MatchError>;
}

/// Shared input check for matchers.
pub(crate) fn ensure_non_empty(
    source: &PointCloud2D,
    target: &PointCloud2D,
) -> Result<(), MatchError> {
    if source.is_empty() {
        return Err(MatchError::EmptyCloud("source"));
    }
    if target.is_empty() {
        return Err(MatchError::EmptyCloud("target"));
    }
    Ok(())
}
