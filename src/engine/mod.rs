//! Evaluation orchestration layer.
//!
//! # Contents
//!
//! - [`trajectory`]: Ground-truth poses paired with their scans
//! - [`keyframe`]: Motion-threshold keyframe pair selection
//! - [`evaluator`]: Multi-engine pairwise registration and comparison
//! - [`pipeline`]: Sequential run loop feeding reporters

pub mod evaluator;
pub mod keyframe;
pub mod pipeline;
pub mod trajectory;

pub use evaluator::{
    EngineComparison, EngineOutcome, EngineReport, EngineSet, InitialGuess, PairReport,
    PairwiseEvaluator, AlignmentResult,
};
pub use keyframe::{KeyframeConfig, KeyframePair, KeyframePairs, KeyframeSelector};
pub use pipeline::{EvaluationSummary, Pipeline, ResultReporter};
pub use trajectory::Trajectory;
