//! Pairwise evaluator.
//!
//! Drives every engine of an [`EngineSet`] over one keyframe pair and compares
//! what each recovered against the ground truth and against a reference
//! engine.
//!
//! Per pair:
//! 1. Reject the pair if either scan is empty (no engine runs)
//! 2. For each engine, in set order: reset, set inputs, time `align` alone
//! 3. Compare recovered poses with the ground truth and the reference engine

use std::fmt;
use std::str::FromStr;
use std::time::{Duration, Instant};

use serde::Deserialize;

use super::keyframe::KeyframePair;
use super::trajectory::Trajectory;
use crate::algorithms::matching::{EngineKind, MatcherSettings, RegistrationEngine};
use crate::core::types::{PointCloud2D, Pose2D, RigidTransform2D, pose_from_transform};
use crate::error::{EvalError, Result};
use crate::metrics::PoseDelta;

/// Where each engine starts its search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitialGuess {
    /// Identity transform.
    #[default]
    Identity,
    /// The pair's ground-truth relative transform.
    GroundTruth,
}

impl InitialGuess {
    fn resolve(&self, ground_truth: &RigidTransform2D) -> RigidTransform2D {
        match self {
            InitialGuess::Identity => RigidTransform2D::identity(),
            InitialGuess::GroundTruth => *ground_truth,
        }
    }
}

impl FromStr for InitialGuess {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "identity" => Ok(InitialGuess::Identity),
            "ground_truth" => Ok(InitialGuess::GroundTruth),
            other => Err(format!(
                "unknown initial guess '{}' (expected identity or ground_truth)",
                other
            )),
        }
    }
}

impl fmt::Display for InitialGuess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            InitialGuess::Identity => "identity",
            InitialGuess::GroundTruth => "ground_truth",
        })
    }
}

/// Ordered, uniquely named collection of engines.
#[derive(Default)]
pub struct EngineSet {
    engines: Vec<Box<dyn RegistrationEngine>>,
}

impl EngineSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build one engine per kind, in the given order.
    pub fn from_kinds(kinds: &[EngineKind], settings: &MatcherSettings) -> Result<Self> {
        let mut set = Self::new();
        for kind in kinds {
            set.push(kind.build(settings))?;
        }
        Ok(set)
    }

    /// Append an engine; names must be unique.
    pub fn push(&mut self, engine: Box<dyn RegistrationEngine>) -> Result<()> {
        if self.contains(engine.name()) {
            return Err(EvalError::DuplicateEngine(engine.name().to_string()));
        }
        self.engines.push(engine);
        Ok(())
    }

    /// Builder form of [`push`](Self::push).
    pub fn with(mut self, engine: Box<dyn RegistrationEngine>) -> Result<Self> {
        self.push(engine)?;
        Ok(self)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.engines.iter().any(|e| e.name() == name)
    }

    pub fn names(&self) -> Vec<String> {
        self.engines.iter().map(|e| e.name().to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.engines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.engines.is_empty()
    }

    fn iter_mut(&mut self) -> impl Iterator<Item = &mut Box<dyn RegistrationEngine>> {
        self.engines.iter_mut()
    }
}

impl fmt::Debug for EngineSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

/// What one engine produced for one pair.
#[derive(Debug, Clone)]
pub struct AlignmentResult {
    pub converged: bool,
    /// Engine-reported fitness; lower is better.
    pub fitness_score: f64,
    pub final_transform: RigidTransform2D,
    /// Duration of the `align` call only.
    pub wall_time: Duration,
}

/// Outcome of one engine on one pair.
#[derive(Debug, Clone)]
pub enum EngineOutcome {
    /// The engine produced a transform (converged or not).
    Aligned {
        result: AlignmentResult,
        /// `final_transform` as a pose.
        recovered: Pose2D,
        error_vs_ground_truth: PoseDelta,
    },
    /// The engine produced no transform.
    Failed { reason: String },
}

impl EngineOutcome {
    /// Recovered pose, if the engine produced one.
    pub fn recovered(&self) -> Option<&Pose2D> {
        match self {
            EngineOutcome::Aligned { recovered, .. } => Some(recovered),
            EngineOutcome::Failed { .. } => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EngineReport {
    pub engine: String,
    pub outcome: EngineOutcome,
}

/// Recovered-pose difference between an engine and the reference engine.
#[derive(Debug, Clone)]
pub struct EngineComparison {
    pub engine: String,
    pub reference: String,
    pub delta: PoseDelta,
}

/// Everything measured for one keyframe pair.
#[derive(Debug, Clone)]
pub struct PairReport {
    pub source_id: usize,
    pub target_id: usize,
    pub ground_truth: Pose2D,
    /// Engine the others were compared against.
    pub reference: Option<String>,
    /// One entry per engine, in engine-set order.
    pub engines: Vec<EngineReport>,
    /// One entry per non-reference engine that aligned, when the reference aligned.
    pub comparisons: Vec<EngineComparison>,
}

impl PairReport {
    pub fn engine(&self, name: &str) -> Option<&EngineReport> {
        self.engines.iter().find(|e| e.engine == name)
    }

    pub fn comparison(&self, name: &str) -> Option<&EngineComparison> {
        self.comparisons.iter().find(|c| c.engine == name)
    }

    /// Report of the reference engine, if one is set.
    pub fn reference_report(&self) -> Option<&EngineReport> {
        self.reference.as_deref().and_then(|name| self.engine(name))
    }
}

/// Runs every engine over a pair and compares the results.
#[derive(Debug)]
pub struct PairwiseEvaluator {
    engines: EngineSet,
    reference: Option<String>,
    initial_guess: InitialGuess,
}

impl PairwiseEvaluator {
    /// The first engine in the set is the reference.
    pub fn new(engines: EngineSet) -> Self {
        let reference = engines.names().into_iter().next();
        Self {
            engines,
            reference,
            initial_guess: InitialGuess::default(),
        }
    }

    /// Choose the reference engine by name.
    pub fn with_reference(mut self, name: &str) -> Result<Self> {
        if !self.engines.contains(name) {
            return Err(EvalError::UnknownEngine(name.to_string()));
        }
        self.reference = Some(name.to_string());
        Ok(self)
    }

    pub fn with_initial_guess(mut self, initial_guess: InitialGuess) -> Self {
        self.initial_guess = initial_guess;
        self
    }

    pub fn reference(&self) -> Option<&str> {
        self.reference.as_deref()
    }

    pub fn initial_guess(&self) -> InitialGuess {
        self.initial_guess
    }

    pub fn engine_names(&self) -> Vec<String> {
        self.engines.names()
    }

    /// Evaluate a selected pair from the trajectory.
    pub fn evaluate(&mut self, trajectory: &Trajectory, pair: &KeyframePair) -> Result<PairReport> {
        let (Some(source), Some(target)) = (
            trajectory.scan(pair.source_id),
            trajectory.scan(pair.target_id),
        ) else {
            return Err(EvalError::InvalidPair {
                source_id: pair.source_id,
                target_id: pair.target_id,
                reason: format!("frame id out of range (trajectory has {})", trajectory.len()),
            });
        };
        self.evaluate_scans(pair.source_id, pair.target_id, source, target, &pair.ground_truth)
    }

    /// Evaluate arbitrary scans against a known relative transform.
    ///
    /// Engine failures are recorded in the report; only an invalid pair is `Err`.
    pub fn evaluate_scans(
        &mut self,
        source_id: usize,
        target_id: usize,
        source: &PointCloud2D,
        target: &PointCloud2D,
        ground_truth: &RigidTransform2D,
    ) -> Result<PairReport> {
        let empty = match (source.is_empty(), target.is_empty()) {
            (true, true) => Some("source and target scans are empty"),
            (true, false) => Some("source scan is empty"),
            (false, true) => Some("target scan is empty"),
            (false, false) => None,
        };
        if let Some(reason) = empty {
            return Err(EvalError::InvalidPair {
                source_id,
                target_id,
                reason: reason.to_string(),
            });
        }

        let ground_truth_pose = pose_from_transform(ground_truth);
        let guess = self.initial_guess.resolve(ground_truth);

        let mut reports = Vec::with_capacity(self.engines.len());
        for engine in self.engines.iter_mut() {
            engine.reset();
            engine.set_source(source);
            engine.set_target(target);

            let start = Instant::now();
            let aligned = engine.align(&guess);
            let wall_time = start.elapsed();

            let outcome = match aligned {
                Ok(alignment) => {
                    let final_transform = engine.final_transform();
                    let recovered = pose_from_transform(&final_transform);
                    EngineOutcome::Aligned {
                        result: AlignmentResult {
                            converged: alignment.converged,
                            fitness_score: engine.fitness_score(),
                            final_transform,
                            wall_time,
                        },
                        recovered,
                        error_vs_ground_truth: PoseDelta::between(&recovered, &ground_truth_pose),
                    }
                }
                Err(cause) => {
                    let failure = EvalError::EngineFailure {
                        engine: engine.name().to_string(),
                        source_id,
                        target_id,
                        cause,
                    };
                    log::warn!("{}", failure);
                    EngineOutcome::Failed {
                        reason: failure.to_string(),
                    }
                }
            };

            reports.push(EngineReport {
                engine: engine.name().to_string(),
                outcome,
            });
        }

        let comparisons = self.compare_with_reference(&reports);

        Ok(PairReport {
            source_id,
            target_id,
            ground_truth: ground_truth_pose,
            reference: self.reference.clone(),
            engines: reports,
            comparisons,
        })
    }

    fn compare_with_reference(&self, reports: &[EngineReport]) -> Vec<EngineComparison> {
        let Some(reference) = self.reference.as_deref() else {
            return Vec::new();
        };
        let Some(reference_pose) = reports
            .iter()
            .find(|r| r.engine == reference)
            .and_then(|r| r.outcome.recovered())
        else {
            return Vec::new();
        };

        reports
            .iter()
            .filter(|r| r.engine != reference)
            .filter_map(|r| {
                r.outcome.recovered().map(|pose| EngineComparison {
                    engine: r.engine.clone(),
                    reference: reference.to_string(),
                    delta: PoseDelta::between(pose, reference_pose),
                })
            })
            .collect()
    }
}
