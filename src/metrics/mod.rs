//! Evaluation metrics.
//!
//! - [`PoseDelta`]: element-wise absolute difference between two poses
//! - [`EngineStats`]: per-engine error, convergence and timing accumulation

mod engine_stats;
mod pose_error;

pub use engine_stats::{EngineStats, EngineSummary};
pub use pose_error::PoseDelta;
