//! Registration engine contract and the matcher adapter.
//!
//! The evaluator never talks to a [`ScanMatcher`] directly. It drives a
//! stateful [`RegistrationEngine`] through a fixed protocol:
//!
//! ```text
//! reset → set_source → set_target → align(guess) → final_transform / fitness_score
//! ```

use std::cell::OnceCell;
use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use super::kdtree::fitness_score;
use super::{
    CorrelativeConfig, CorrelativeMatcher, HybridConfig, HybridMatcher, IcpConfig, MatchError,
    PointToPointIcp, ScanMatcher,
};
use crate::core::types::{PointCloud2D, RigidTransform2D, pose_from_transform, transform_from_pose};

/// Output of a successful [`RegistrationEngine::align`] call.
#[derive(Debug, Clone)]
pub struct Alignment {
    /// Source cloud expressed in the target frame.
    pub aligned: PointCloud2D,
    /// Whether the engine reports convergence.
    pub converged: bool,
}

/// A black-box registration engine.
///
/// Implementations must not carry state from one pair into the next once
/// [`reset`](RegistrationEngine::reset) has been called.
pub trait RegistrationEngine {
    /// Unique engine identifier used in reports.
    fn name(&self) -> &str;

    /// Drop inputs and results of the previous alignment.
    fn reset(&mut self);

    /// Set the cloud to be moved.
    fn set_source(&mut self, cloud: &PointCloud2D);

    /// Set the reference cloud.
    fn set_target(&mut self, cloud: &PointCloud2D);

    /// Align source onto target starting from `initial_guess`.
    ///
    /// `Err` means no transform was produced. Non-convergence is `Ok` with
    /// `converged == false`.
    fn align(&mut self, initial_guess: &RigidTransform2D) -> Result<Alignment, MatchError>;

    /// Transform found by the last `align` (identity before any alignment).
    fn final_transform(&self) -> RigidTransform2D;

    /// Goodness of fit of the last `align`; lower is better.
    fn fitness_score(&self) -> f64;
}

/// Adapts a [`ScanMatcher`] to the [`RegistrationEngine`] protocol.
///
/// Fitness is the mean squared nearest-neighbour distance between the aligned
/// source and the target, identical for every wrapped algorithm. It is
/// computed on the first [`fitness_score`](RegistrationEngine::fitness_score)
/// call after an alignment and cached, so `align` only pays for matching.
#[derive(Debug)]
pub struct MatcherEngine<M: ScanMatcher> {
    name: String,
    matcher: M,
    fitness_max_range: Option<f64>,
    source: Option<PointCloud2D>,
    target: Option<PointCloud2D>,
    final_transform: RigidTransform2D,
    aligned: Option<PointCloud2D>,
    fitness: OnceCell<f64>,
}

impl<M: ScanMatcher> MatcherEngine<M> {
    pub fn new(name: impl Into<String>, matcher: M) -> Self {
        Self {
            name: name.into(),
            matcher,
            fitness_max_range: None,
            source: None,
            target: None,
            final_transform: RigidTransform2D::identity(),
            aligned: None,
            fitness: OnceCell::new(),
        }
    }

    /// Ignore aligned points farther than `max_range` from the target when
    /// computing fitness.
    pub fn with_fitness_max_range(mut self, max_range: Option<f64>) -> Self {
        self.fitness_max_range = max_range;
        self
    }

    fn clear_result(&mut self) {
        self.aligned = None;
        self.fitness = OnceCell::new();
    }
}

impl<M: ScanMatcher> RegistrationEngine for MatcherEngine<M> {
    fn name(&self) -> &str {
        &self.name
    }

    fn reset(&mut self) {
        self.source = None;
        self.target = None;
        self.final_transform = RigidTransform2D::identity();
        self.clear_result();
    }

    fn set_source(&mut self, cloud: &PointCloud2D) {
        self.source = Some(cloud.clone());
        self.clear_result();
    }

    fn set_target(&mut self, cloud: &PointCloud2D) {
        self.target = Some(cloud.clone());
        self.clear_result();
    }

    fn align(&mut self, initial_guess: &RigidTransform2D) -> Result<Alignment, MatchError> {
        let source = self.source.as_ref().ok_or(MatchError::MissingInput("source"))?;
        let target = self.target.as_ref().ok_or(MatchError::MissingInput("target"))?;

        let result = self
            .matcher
            .match_scans(source, target, &pose_from_transform(initial_guess))?;

        let transform = transform_from_pose(&result.transform);
        let aligned = source.transform(&transform);
        self.final_transform = transform;
        self.aligned = Some(aligned.clone());
        self.fitness = OnceCell::new();

        Ok(Alignment {
            aligned,
            converged: result.converged,
        })
    }

    fn final_transform(&self) -> RigidTransform2D {
        self.final_transform
    }

    fn fitness_score(&self) -> f64 {
        let (Some(aligned), Some(target)) = (&self.aligned, &self.target) else {
            return f64::MAX;
        };
        *self
            .fitness
            .get_or_init(|| fitness_score(aligned, target, self.fitness_max_range))
    }
}

/// Matcher settings shared by every engine built from configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MatcherSettings {
    pub icp: IcpConfig,
    pub correlative: CorrelativeConfig,
    pub hybrid: HybridConfig,
    /// Fitness ignores aligned points farther than this from the target (meters).
    pub fitness_max_range: Option<f64>,
}

/// Built-in engine variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineKind {
    /// Point-to-point ICP.
    Icp,
    /// Exhaustive correlative search.
    Correlative,
    /// Correlative search refined by ICP.
    Hybrid,
}

impl EngineKind {
    pub const ALL: [EngineKind; 3] = [EngineKind::Icp, EngineKind::Correlative, EngineKind::Hybrid];

    pub fn name(&self) -> &'static str {
        match self {
            EngineKind::Icp => "icp",
            EngineKind::Correlative => "correlative",
            EngineKind::Hybrid => "hybrid",
        }
    }

    /// Build a fresh boxed engine named after this variant.
    pub fn build(&self, settings: &MatcherSettings) -> Box<dyn RegistrationEngine> {
        let range = settings.fitness_max_range;
        match self {
            EngineKind::Icp => Box::new(
                MatcherEngine::new(self.name(), PointToPointIcp::new(settings.icp.clone()))
                    .with_fitness_max_range(range),
            ),
            EngineKind::Correlative => Box::new(
                MatcherEngine::new(
                    self.name(),
                    CorrelativeMatcher::new(settings.correlative.clone()),
                )
                .with_fitness_max_range(range),
            ),
            EngineKind::Hybrid => Box::new(
                MatcherEngine::new(
                    self.name(),
                    HybridMatcher::new(
                        CorrelativeMatcher::new(settings.correlative.clone()),
                        PointToPointIcp::new(settings.icp.clone()),
                        settings.hybrid.clone(),
                    ),
                )
                .with_fitness_max_range(range),
            ),
        }
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EngineKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "icp" => Ok(EngineKind::Icp),
            "correlative" => Ok(EngineKind::Correlative),
            "hybrid" => Ok(EngineKind::Hybrid),
            other => Err(format!(
                "unknown engine '{}' (expected one of: icp, correlative, hybrid)",
                other
            )),
        }
    }
}
