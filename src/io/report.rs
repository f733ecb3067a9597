//! Result reporters.
//!
//! - [`LogReporter`]: per-pair lines through `log` (see [`pair_lines`]), summary table at the end
//! - [`JsonReporter`]: one pretty JSON document written on `finish`
//! - [`CsvReporter`]: one row per (pair, engine), streamed

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

pub use crate::engine::ResultReporter;
use crate::core::types::Pose2D;
use crate::engine::{EngineOutcome, EngineReport, EvaluationSummary, PairReport};
use crate::error::{EvalError, Result};
use crate::metrics::{EngineSummary, PoseDelta};

// ============================================================================
// Shared records
// ============================================================================

/// Run parameters recorded alongside the results.
#[derive(Debug, Clone, Serialize)]
pub struct RunMetadata {
    pub dataset: String,
    pub engines: Vec<String>,
    pub reference: Option<String>,
    pub initial_guess: String,
    pub min_displacement: f64,
    pub min_rotation: f64,
}

/// Flattened view of one engine's outcome on one pair.
#[derive(Debug, Clone, Serialize)]
struct EngineRecord {
    engine: String,
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    converged: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fitness_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    transform: Option<Pose2D>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_vs_ground_truth: Option<PoseDelta>,
    #[serde(skip_serializing_if = "Option::is_none")]
    delta_vs_reference: Option<PoseDelta>,
    #[serde(skip_serializing_if = "Option::is_none")]
    time_ms: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl EngineRecord {
    fn new(pair: &PairReport, report: &EngineReport) -> Self {
        let delta_vs_reference = pair.comparison(&report.engine).map(|c| c.delta);
        match &report.outcome {
            EngineOutcome::Aligned {
                result,
                recovered,
                error_vs_ground_truth,
            } => Self {
                engine: report.engine.clone(),
                status: "aligned",
                converged: Some(result.converged),
                fitness_score: Some(result.fitness_score),
                transform: Some(*recovered),
                error_vs_ground_truth: Some(*error_vs_ground_truth),
                delta_vs_reference,
                time_ms: Some(result.wall_time.as_secs_f64() * 1000.0),
                error: None,
            },
            EngineOutcome::Failed { reason } => Self {
                engine: report.engine.clone(),
                status: "failed",
                converged: None,
                fitness_score: None,
                transform: None,
                error_vs_ground_truth: None,
                delta_vs_reference: None,
                time_ms: None,
                error: Some(reason.clone()),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct PairRecord {
    source_id: usize,
    target_id: usize,
    ground_truth: Pose2D,
    engines: Vec<EngineRecord>,
}

#[derive(Debug, Clone, Serialize)]
struct SkippedRecord {
    source_id: usize,
    target_id: usize,
    reason: String,
}

fn skip_reason(error: &EvalError) -> String {
    match error {
        EvalError::InvalidPair { reason, .. } => reason.clone(),
        other => other.to_string(),
    }
}

// ============================================================================
// Log
// ============================================================================

/// Logs every pair at `info` level and a summary table on `finish`.
#[derive(Debug, Default)]
pub struct LogReporter;

impl LogReporter {
    pub fn new() -> Self {
        Self
    }
}

impl ResultReporter for LogReporter {
    fn report_pair(&mut self, report: &PairReport) -> Result<()> {
        for line in pair_lines(report) {
            log::info!("{}", line);
        }
        Ok(())
    }

    fn report_skipped(&mut self, source_id: usize, target_id: usize, error: &EvalError) -> Result<()> {
        log::info!(
            "pair {} -> {} skipped: {}",
            source_id,
            target_id,
            skip_reason(error)
        );
        Ok(())
    }

    fn finish(&mut self, summary: &EvaluationSummary) -> Result<()> {
        for line in summary_table(summary) {
            log::info!("{}", line);
        }
        Ok(())
    }
}

/// Render one pair as log lines.
///
/// ```text
/// GROUND TRUTH     pose from the trajectory
/// PROOF TRANSFORM  pose recovered by the reference engine
/// CALC TRANSFORM   pose recovered by each other engine
/// DIFF             engine vs reference
/// GT ERR           engine vs ground truth
/// ```
pub fn pair_lines(report: &PairReport) -> Vec<String> {
    let gt = &report.ground_truth;
    let mut lines = vec![
        format!("pair {} -> {}", report.source_id, report.target_id),
        format!("  GROUND TRUTH: {:.4} {:.4} {:.4}", gt.x, gt.y, gt.theta),
    ];

    let reference = report.reference_report();
    if let Some(proof) = reference {
        match &proof.outcome {
            EngineOutcome::Aligned {
                result, recovered, ..
            } => lines.push(format!(
                "  [{}] PROOF TRANSFORM: {:.4} {:.4} {:.4} calc time: {:.6}s",
                proof.engine,
                recovered.x,
                recovered.y,
                recovered.theta,
                result.wall_time.as_secs_f64()
            )),
            EngineOutcome::Failed { reason } => {
                lines.push(format!("  [{}] PROOF FAILED: {}", proof.engine, reason))
            }
        }
    }

    for engine in &report.engines {
        let is_reference = reference.is_some_and(|r| r.engine == engine.engine);
        match &engine.outcome {
            EngineOutcome::Aligned {
                result,
                recovered,
                error_vs_ground_truth: err,
            } => {
                lines.push(format!(
                    "  [{}] converged: {} score: {:.6}",
                    engine.engine, result.converged, result.fitness_score
                ));
                if !is_reference {
                    lines.push(format!(
                        "  [{}] CALC TRANSFORM: {:.4} {:.4} {:.4} calc time: {:.6}s",
                        engine.engine,
                        recovered.x,
                        recovered.y,
                        recovered.theta,
                        result.wall_time.as_secs_f64()
                    ));
                }
                if let Some(cmp) = report.comparison(&engine.engine) {
                    lines.push(format!(
                        "  [{}] DIFF: {:.4} {:.4} {:.4}",
                        engine.engine, cmp.delta.dx, cmp.delta.dy, cmp.delta.dtheta
                    ));
                }
                lines.push(format!(
                    "  [{}] GT ERR: {:.4} {:.4} {:.4}",
                    engine.engine, err.dx, err.dy, err.dtheta
                ));
            }
            EngineOutcome::Failed { reason } if !is_reference => {
                lines.push(format!("  [{}] FAILED: {}", engine.engine, reason));
            }
            EngineOutcome::Failed { .. } => {}
        }
    }
    lines
}

/// Render the per-engine summary as box-drawing table lines.
pub fn summary_table(summary: &EvaluationSummary) -> Vec<String> {
    let mut lines = vec![
        format!(
            "Pairs: {} selected, {} evaluated, {} skipped ({} frames)",
            summary.pairs_selected, summary.pairs_evaluated, summary.pairs_skipped, summary.frames
        ),
        "┌──────────────┬────────┬─────────────┬─────────────┬────────────┬──────────┐"
            .to_string(),
        "│ Engine       │ Conv%  │ Trans Error │ Rot Error   │ Fitness    │ Avg Time │"
            .to_string(),
        "│              │        │ mean / med  │ mean / med  │ mean       │          │"
            .to_string(),
        "├──────────────┼────────┼─────────────┼─────────────┼────────────┼──────────┤"
            .to_string(),
    ];
    lines.extend(summary.engines.iter().map(summary_row));
    lines.push(
        "└──────────────┴────────┴─────────────┴─────────────┴────────────┴──────────┘"
            .to_string(),
    );
    if let Some(reference) = &summary.reference {
        lines.push(format!("Reference engine: {}", reference));
    }
    lines
}

fn summary_row(engine: &EngineSummary) -> String {
    let trans_str = if engine.mean_translation_error.is_nan() {
        "N/A".to_string()
    } else {
        format!(
            "{:4.1}/{:4.1}cm",
            engine.mean_translation_error * 100.0,
            engine.median_translation_error * 100.0
        )
    };

    let rot_str = if engine.mean_rotation_error.is_nan() {
        "N/A".to_string()
    } else {
        format!(
            "{:4.1}/{:4.1}°",
            engine.mean_rotation_error.to_degrees(),
            engine.median_rotation_error.to_degrees()
        )
    };

    let fitness_str = if engine.mean_fitness.is_nan() {
        "N/A".to_string()
    } else {
        format!("{:.6}", engine.mean_fitness)
    };

    format!(
        "│ {:12} │ {:5.1}% │ {:>11} │ {:>11} │ {:>10} │ {:6.2}ms │",
        engine.engine,
        engine.convergence_rate,
        trans_str,
        rot_str,
        fitness_str,
        engine.avg_time_ms,
    )
}

// ============================================================================
// JSON
// ============================================================================

#[derive(Serialize)]
struct JsonDocument<'a> {
    metadata: &'a RunMetadata,
    summary: &'a EvaluationSummary,
    pairs: &'a [PairRecord],
    skipped: &'a [SkippedRecord],
}

/// Collects every pair and writes a single JSON document on `finish`.
#[derive(Debug)]
pub struct JsonReporter {
    path: PathBuf,
    metadata: RunMetadata,
    pairs: Vec<PairRecord>,
    skipped: Vec<SkippedRecord>,
}

impl JsonReporter {
    pub fn new(path: impl Into<PathBuf>, metadata: RunMetadata) -> Self {
        Self {
            path: path.into(),
            metadata,
            pairs: Vec::new(),
            skipped: Vec::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ResultReporter for JsonReporter {
    fn report_pair(&mut self, report: &PairReport) -> Result<()> {
        self.pairs.push(PairRecord {
            source_id: report.source_id,
            target_id: report.target_id,
            ground_truth: report.ground_truth,
            engines: report
                .engines
                .iter()
                .map(|e| EngineRecord::new(report, e))
                .collect(),
        });
        Ok(())
    }

    fn report_skipped(&mut self, source_id: usize, target_id: usize, error: &EvalError) -> Result<()> {
        self.skipped.push(SkippedRecord {
            source_id,
            target_id,
            reason: skip_reason(error),
        });
        Ok(())
    }

    fn finish(&mut self, summary: &EvaluationSummary) -> Result<()> {
        let document = JsonDocument {
            metadata: &self.metadata,
            summary,
            pairs: &self.pairs,
            skipped: &self.skipped,
        };
        let json = serde_json::to_string_pretty(&document)?;
        let mut file = File::create(&self.path)?;
        file.write_all(json.as_bytes())?;
        log::info!("JSON results written to: {}", self.path.display());
        Ok(())
    }
}

// ============================================================================
// CSV
// ============================================================================

const CSV_HEADER: &str = "source_id,target_id,engine,status,converged,fitness,x,y,theta,\
gt_x,gt_y,gt_theta,err_dx,err_dy,err_dtheta,ref_dx,ref_dy,ref_dtheta,time_ms";

/// Streams one row per (pair, engine). Skipped pairs produce no rows.
#[derive(Debug)]
pub struct CsvReporter {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl CsvReporter {
    /// Create the file and write the header.
    pub fn create(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let mut writer = BufWriter::new(File::create(&path)?);
        writeln!(writer, "{}", CSV_HEADER)?;
        Ok(Self { path, writer })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ResultReporter for CsvReporter {
    fn report_pair(&mut self, report: &PairReport) -> Result<()> {
        let gt = &report.ground_truth;
        for engine in &report.engines {
            let record = EngineRecord::new(report, engine);
            let transform = record.transform;
            let err = record.error_vs_ground_truth;
            let delta = record.delta_vs_reference;
            writeln!(
                self.writer,
                "{},{},{},{},{},{},{},{},{},{:.6},{:.6},{:.6},{},{},{},{},{},{},{}",
                report.source_id,
                report.target_id,
                record.engine,
                record.status,
                opt(record.converged),
                opt_f(record.fitness_score),
                opt_f(transform.map(|p| p.x)),
                opt_f(transform.map(|p| p.y)),
                opt_f(transform.map(|p| p.theta)),
                gt.x,
                gt.y,
                gt.theta,
                opt_f(err.map(|d| d.dx)),
                opt_f(err.map(|d| d.dy)),
                opt_f(err.map(|d| d.dtheta)),
                opt_f(delta.map(|d| d.dx)),
                opt_f(delta.map(|d| d.dy)),
                opt_f(delta.map(|d| d.dtheta)),
                opt_f(record.time_ms),
            )?;
        }
        Ok(())
    }

    fn report_skipped(&mut self, _: usize, _: usize, _: &EvalError) -> Result<()> {
        Ok(())
    }

    fn finish(&mut self, _: &EvaluationSummary) -> Result<()> {
        self.writer.flush()?;
        log::info!("CSV results written to: {}", self.path.display());
        Ok(())
    }
}

fn opt<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn opt_f(value: Option<f64>) -> String {
    value.map(|v| format!("{:.6}", v)).unwrap_or_default()
}
