//! Pariksha - Pairwise evaluation of 2D laser scan registration engines
//!
//! Replays a recorded trajectory (ground-truth poses plus one laser scan per
//! pose), picks keyframe pairs by motion thresholds, aligns every pair with
//! each registration engine and reports how far each engine lands from the
//! ground truth and from a reference engine.
//!
//! # Architecture
//!
//! The crate is organized into 6 logical layers:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────┐
//! │                     main.rs                         │  ← Executable
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                  io/ + config                       │  ← Infrastructure
//! │       (dataset, reporters, svg, toml config)        │
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                    engine/                          │  ← Orchestration
//! │   (trajectory, keyframe, evaluator, pipeline)       │
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌──────────────────────────┐ ┌────────────────────────┐
//! │      algorithms/         │ │       metrics/         │  ← Algorithms
//! │  (icp, correlative,      │ │ (pose error, per-      │
//! │   hybrid, engines)       │ │  engine statistics)    │
//! └──────────────────────────┘ └────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                   sensors/                          │  ← Sensor processing
//! │              (polar → cartesian)                    │
//! └─────────────────────────────────────────────────────┘
//!                          │
//! ┌─────────────────────────────────────────────────────┐
//! │                     core/                           │  ← Foundation
//! │        (poses, rigid transforms, scans, math)       │
//! └─────────────────────────────────────────────────────┘
//! ```
//!
//! # Evaluation loop
//!
//! ```text
//! Dataset::load ──► Trajectory ──► KeyframeSelector ──► (source, target, ground truth)
//!                                                              │
//!                                    PairwiseEvaluator ◄───────┘
//!                                    │ for each engine: reset, set inputs, align (timed)
//!                                    ▼
//!                                PairReport ──► ResultReporter (log, json, csv, svg)
//! ```
//!
//! # Example
//!
//! ```
//! use pariksha::{
//!     EngineKind, EngineSet, KeyframeSelector, MatcherSettings, PairwiseEvaluator, Pipeline,
//!     Point2D, PointCloud2D, Pose2D, ResultReporter, Trajectory,
//! };
//!
//! let wall: Vec<Point2D> = (0..60)
//!     .map(|i| Point2D::new(i as f64 * 0.05, 1.0 + i as f64 * 0.0001))
//!     .chain((0..60).map(|i| Point2D::new(3.0 + i as f64 * 0.0001, i as f64 * 0.05)))
//!     .collect();
//! let scan = PointCloud2D::from_points(&wall);
//! let poses = vec![Pose2D::identity(), Pose2D::identity()];
//! let trajectory = Trajectory::new(poses, vec![scan.clone(), scan]).unwrap();
//!
//! let engines = EngineSet::from_kinds(&[EngineKind::Icp], &MatcherSettings::default()).unwrap();
//! let mut pipeline = Pipeline::new(KeyframeSelector::default(), PairwiseEvaluator::new(engines));
//! let mut reporters: Vec<Box<dyn ResultReporter>> = Vec::new();
//!
//! // No motion, no pairs
//! let summary = pipeline.run(&trajectory, &mut reporters).unwrap();
//! assert_eq!(summary.pairs_selected, 0);
//! ```

// ============================================================================
// Layer 1: Core foundation (no internal deps)
// ============================================================================
pub mod core;
pub mod error;

// ============================================================================
// Layer 2: Sensor processing (depends on core)
// ============================================================================
pub mod sensors;

// ============================================================================
// Layer 3: Algorithms and metrics (depend on core)
// ============================================================================
pub mod algorithms;
pub mod metrics;

// ============================================================================
// Layer 4: Evaluation engine (depends on core, algorithms, metrics)
// ============================================================================
pub mod engine;

// ============================================================================
// Layer 5: I/O infrastructure and configuration (depend on all layers)
// ============================================================================
pub mod config;
pub mod io;

// ============================================================================
// Convenience re-exports (flat namespace for common use)
// ============================================================================

// Core types
pub use core::math;
pub use core::types::{LaserScan, PointCloud2D};
pub use core::types::{Point2D, Pose2D, RigidTransform2D};
pub use core::{angle_of, displacement_of, pose_from_transform, transform_between, transform_from_pose};

// Errors
pub use error::{EvalError, Result};

// Sensors
pub use sensors::ScanConverter;

// Algorithms - Matching
pub use algorithms::matching::{
    Alignment, CorrelativeConfig, CorrelativeMatcher, EngineKind, HybridConfig, HybridMatcher,
    IcpConfig, MatchError, MatcherEngine, MatcherSettings, PointToPointIcp, RegistrationEngine,
    ScanMatchResult, ScanMatcher,
};

// Metrics
pub use metrics::{EngineStats, EngineSummary, PoseDelta};

// Engine - Evaluation
pub use engine::{
    AlignmentResult, EngineComparison, EngineOutcome, EngineReport, EngineSet,
    EvaluationSummary, InitialGuess, KeyframeConfig, KeyframePair, KeyframeSelector,
    PairReport, PairwiseEvaluator, Pipeline, ResultReporter, Trajectory,
};

// I/O
pub use config::EvalConfig;
pub use io::{CsvReporter, Dataset, JsonReporter, LogReporter, RunMetadata, ScanFormat, SvgReporter};
