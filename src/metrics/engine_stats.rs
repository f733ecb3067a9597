//! Per-engine statistics across evaluated pairs.

use std::time::Duration;

use serde::Serialize;

use super::PoseDelta;

/// Accumulates one engine's outcomes over a run.
#[derive(Debug, Clone)]
pub struct EngineStats {
    engine: String,
    /// Translation errors vs ground truth (meters), one per aligned pair
    translation_errors: Vec<f64>,
    /// Rotation errors vs ground truth (radians), one per aligned pair
    rotation_errors: Vec<f64>,
    /// Fitness scores, one per aligned pair
    fitness_scores: Vec<f64>,
    /// Wall time of each align call
    times: Vec<Duration>,
    converged_count: usize,
    failures: usize,
}

impl EngineStats {
    pub fn new(engine: impl Into<String>) -> Self {
        Self {
            engine: engine.into(),
            translation_errors: Vec::new(),
            rotation_errors: Vec::new(),
            fitness_scores: Vec::new(),
            times: Vec::new(),
            converged_count: 0,
            failures: 0,
        }
    }

    pub fn engine(&self) -> &str {
        &self.engine
    }

    /// Record an alignment that produced a transform.
    pub fn record(&mut self, error: &PoseDelta, fitness: f64, converged: bool, time: Duration) {
        self.translation_errors.push(error.translation());
        self.rotation_errors.push(error.rotation());
        self.fitness_scores.push(fitness);
        self.times.push(time);
        if converged {
            self.converged_count += 1;
        }
    }

    /// Record an engine failure.
    pub fn record_failure(&mut self) {
        self.failures += 1;
    }

    /// Pairs that produced a transform.
    pub fn aligned(&self) -> usize {
        self.translation_errors.len()
    }

    /// Pairs attempted, including failures.
    pub fn attempts(&self) -> usize {
        self.aligned() + self.failures
    }

    /// Converged alignments as a percentage of attempts.
    pub fn convergence_rate(&self) -> f64 {
        if self.attempts() == 0 {
            0.0
        } else {
            100.0 * self.converged_count as f64 / self.attempts() as f64
        }
    }

    pub fn mean_translation_error(&self) -> f64 {
        mean(&self.translation_errors)
    }

    pub fn median_translation_error(&self) -> f64 {
        median(&self.translation_errors)
    }

    pub fn mean_rotation_error(&self) -> f64 {
        mean(&self.rotation_errors)
    }

    pub fn median_rotation_error(&self) -> f64 {
        median(&self.rotation_errors)
    }

    /// Mean fitness over finite scores.
    pub fn mean_fitness(&self) -> f64 {
        let finite: Vec<f64> = self
            .fitness_scores
            .iter()
            .copied()
            .filter(|f| *f < f64::MAX)
            .collect();
        mean(&finite)
    }

    /// Average align time in milliseconds.
    pub fn avg_time_ms(&self) -> f64 {
        if self.times.is_empty() {
            return 0.0;
        }
        let total: Duration = self.times.iter().sum();
        total.as_secs_f64() * 1000.0 / self.times.len() as f64
    }

    pub fn max_time_ms(&self) -> f64 {
        self.times
            .iter()
            .max()
            .map_or(0.0, |t| t.as_secs_f64() * 1000.0)
    }

    pub fn summary(&self) -> EngineSummary {
        EngineSummary {
            engine: self.engine.clone(),
            attempts: self.attempts(),
            aligned: self.aligned(),
            converged: self.converged_count,
            failures: self.failures,
            convergence_rate: self.convergence_rate(),
            mean_translation_error: self.mean_translation_error(),
            median_translation_error: self.median_translation_error(),
            mean_rotation_error: self.mean_rotation_error(),
            median_rotation_error: self.median_rotation_error(),
            mean_fitness: self.mean_fitness(),
            avg_time_ms: self.avg_time_ms(),
            max_time_ms: self.max_time_ms(),
        }
    }
}

/// Serializable snapshot of [`EngineStats`].
///
/// Means and medians are `NaN` when the engine never aligned a pair.
#[derive(Debug, Clone, Serialize)]
pub struct EngineSummary {
    pub engine: String,
    pub attempts: usize,
    pub aligned: usize,
    pub converged: usize,
    pub failures: usize,
    pub convergence_rate: f64,
    pub mean_translation_error: f64,
    pub median_translation_error: f64,
    pub mean_rotation_error: f64,
    pub median_rotation_error: f64,
    pub mean_fitness: f64,
    pub avg_time_ms: f64,
    pub max_time_ms: f64,
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        f64::NAN
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted[sorted.len() / 2]
}
