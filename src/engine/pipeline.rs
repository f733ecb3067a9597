//! Sequential evaluation run.
//!
//! Selector → evaluator → reporters, one pair at a time in trajectory order.
//! Invalid pairs are reported as skipped and the run moves on; a reporter
//! error aborts the run.

use serde::Serialize;

use super::evaluator::{EngineOutcome, PairReport, PairwiseEvaluator};
use super::keyframe::KeyframeSelector;
use super::trajectory::Trajectory;
use crate::error::{EvalError, Result};
use crate::metrics::{EngineStats, EngineSummary};

/// Consumer of evaluation results.
pub trait ResultReporter {
    /// Called once per evaluated pair, in trajectory order.
    fn report_pair(&mut self, report: &PairReport) -> Result<()>;

    /// Called for a pair rejected before any engine ran.
    fn report_skipped(&mut self, source_id: usize, target_id: usize, error: &EvalError)
    -> Result<()>;

    /// Called once after the last pair.
    fn finish(&mut self, summary: &EvaluationSummary) -> Result<()>;
}

/// Run-level totals and per-engine statistics.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationSummary {
    pub frames: usize,
    pub pairs_selected: usize,
    pub pairs_evaluated: usize,
    pub pairs_skipped: usize,
    pub reference: Option<String>,
    pub engines: Vec<EngineSummary>,
}

/// Drives a full evaluation.
#[derive(Debug)]
pub struct Pipeline {
    selector: KeyframeSelector,
    evaluator: PairwiseEvaluator,
}

impl Pipeline {
    pub fn new(selector: KeyframeSelector, evaluator: PairwiseEvaluator) -> Self {
        Self {
            selector,
            evaluator,
        }
    }

    pub fn evaluator(&self) -> &PairwiseEvaluator {
        &self.evaluator
    }

    /// Evaluate every selected pair, feeding each reporter.
    pub fn run<'r>(
        &mut self,
        trajectory: &Trajectory,
        reporters: &mut [Box<dyn ResultReporter + 'r>],
    ) -> Result<EvaluationSummary> {
        let mut stats: Vec<EngineStats> = self
            .evaluator
            .engine_names()
            .into_iter()
            .map(EngineStats::new)
            .collect();

        let mut selected = 0usize;
        let mut evaluated = 0usize;
        let mut skipped = 0usize;

        for pair in self.selector.pairs(trajectory) {
            selected += 1;
            match self.evaluator.evaluate(trajectory, &pair) {
                Ok(report) => {
                    evaluated += 1;
                    accumulate(&mut stats, &report);
                    for reporter in reporters.iter_mut() {
                        reporter.report_pair(&report)?;
                    }
                }
                Err(err @ EvalError::InvalidPair { .. }) => {
                    skipped += 1;
                    log::warn!("Skipping: {}", err);
                    for reporter in reporters.iter_mut() {
                        reporter.report_skipped(pair.source_id, pair.target_id, &err)?;
                    }
                }
                Err(err) => return Err(err),
            }
        }

        let summary = EvaluationSummary {
            frames: trajectory.len(),
            pairs_selected: selected,
            pairs_evaluated: evaluated,
            pairs_skipped: skipped,
            reference: self.evaluator.reference().map(str::to_string),
            engines: stats.iter().map(EngineStats::summary).collect(),
        };

        log::info!(
            "Evaluated {} of {} pairs ({} skipped) over {} frames",
            summary.pairs_evaluated,
            summary.pairs_selected,
            summary.pairs_skipped,
            summary.frames
        );

        for reporter in reporters.iter_mut() {
            reporter.finish(&summary)?;
        }

        Ok(summary)
    }
}

fn accumulate(stats: &mut [EngineStats], report: &PairReport) {
    for engine in &report.engines {
        let Some(entry) = stats.iter_mut().find(|s| s.engine() == engine.engine) else {
            continue;
        };
        match &engine.outcome {
            EngineOutcome::Aligned {
                result,
                error_vs_ground_truth,
                ..
            } => entry.record(
                error_vs_ground_truth,
                result.fitness_score,
                result.converged,
                result.wall_time,
            ),
            EngineOutcome::Failed { .. } => entry.record_failure(),
        }
    }
}
