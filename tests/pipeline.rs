//! End-to-end evaluation runs over synthetic trajectories.

use std::f64::consts::PI;
use std::fs;

use approx::assert_relative_eq;
use pariksha::{
    Alignment, CsvReporter, Dataset, EngineKind, EngineOutcome, EngineSet, EvalError,
    InitialGuess, JsonReporter, KeyframeConfig, KeyframeSelector, MatchError, MatcherSettings,
    PairwiseEvaluator, Pipeline, Point2D, PointCloud2D, Pose2D, RegistrationEngine,
    ResultReporter, RigidTransform2D, RunMetadata, ScanFormat, Trajectory, pose_from_transform,
    transform_from_pose,
};
use tempfile::TempDir;

// ============================================================================
// Fixtures
// ============================================================================

/// Rectangular room outline in world coordinates.
///
/// Walls carry a tiny perpendicular ramp so no coordinate value repeats.
fn room_world(n: usize, width: f64, height: f64) -> Vec<Point2D> {
    let per_wall = n / 4;
    let mut points = Vec::with_capacity(n);
    for i in 0..per_wall {
        let t = i as f64 / per_wall as f64;
        let ramp = i as f64 * 0.0001;
        points.push(Point2D::new(t * width, ramp));
        points.push(Point2D::new(width + ramp, t * height));
        points.push(Point2D::new(width - t * width, height + ramp));
        points.push(Point2D::new(ramp, height - t * height));
    }
    points
}

/// The world points as seen from a sensor at `pose`.
fn observe(world: &[Point2D], pose: &Pose2D) -> PointCloud2D {
    let to_sensor = transform_from_pose(pose).inverse();
    let points: Vec<Point2D> = world.iter().map(|p| to_sensor.apply(p)).collect();
    PointCloud2D::from_points(&points)
}

fn trajectory_in_room(poses: Vec<Pose2D>) -> Trajectory {
    let world = room_world(240, 6.0, 4.0);
    let scans = poses.iter().map(|p| observe(&world, p)).collect();
    Trajectory::new(poses, scans).unwrap()
}

fn engines(kinds: &[EngineKind]) -> EngineSet {
    EngineSet::from_kinds(kinds, &MatcherSettings::default()).unwrap()
}

/// Engine that never produces a transform.
struct BrokenEngine;

impl RegistrationEngine for BrokenEngine {
    fn name(&self) -> &str {
        "broken"
    }
    fn reset(&mut self) {}
    fn set_source(&mut self, _: &PointCloud2D) {}
    fn set_target(&mut self, _: &PointCloud2D) {}
    fn align(&mut self, _: &RigidTransform2D) -> Result<Alignment, MatchError> {
        Err(MatchError::InsufficientCorrespondences {
            found: 0,
            required: 10,
        })
    }
    fn final_transform(&self) -> RigidTransform2D {
        RigidTransform2D::identity()
    }
    fn fitness_score(&self) -> f64 {
        f64::MAX
    }
}

fn aligned_pose(outcome: &EngineOutcome) -> Pose2D {
    match outcome {
        EngineOutcome::Aligned { recovered, .. } => *recovered,
        EngineOutcome::Failed { reason } => panic!("engine failed: {reason}"),
    }
}

// ============================================================================
// Scenarios
// ============================================================================

#[test]
fn test_three_pose_scenario() {
    let trajectory = trajectory_in_room(vec![
        Pose2D::new(2.0, 1.5, 0.0),
        Pose2D::new(2.1, 1.5, 0.0),
        Pose2D::new(2.5, 1.5, 0.0),
    ]);
    let mut pipeline = Pipeline::new(
        KeyframeSelector::default(),
        PairwiseEvaluator::new(engines(&[EngineKind::Icp]))
            .with_initial_guess(InitialGuess::GroundTruth),
    );

    let pairs = KeyframeSelector::default().select(&trajectory);
    assert_eq!(pairs.len(), 1);
    assert_eq!((pairs[0].source_id, pairs[0].target_id), (2, 0));
    let gt = pose_from_transform(&pairs[0].ground_truth);
    assert_relative_eq!(gt.x, 0.5, epsilon = 1e-9);
    assert_relative_eq!(gt.y, 0.0, epsilon = 1e-9);
    assert_relative_eq!(gt.theta, 0.0, epsilon = 1e-9);

    let mut reporters: Vec<Box<dyn ResultReporter>> = Vec::new();
    let summary = pipeline.run(&trajectory, &mut reporters).unwrap();
    assert_eq!(summary.pairs_selected, 1);
    assert_eq!(summary.pairs_evaluated, 1);
    assert_eq!(summary.engines[0].converged, 1);
    assert!(summary.engines[0].mean_translation_error < 1e-6);
}

#[test]
fn test_identical_scans_recover_identity() {
    let scan = observe(&room_world(200, 4.0, 3.0), &Pose2D::new(1.5, 1.0, 0.3));
    let gt = RigidTransform2D::from_parts(0.2, 0.3, -0.1);
    let mut evaluator =
        PairwiseEvaluator::new(engines(&[EngineKind::Icp, EngineKind::Correlative]));

    let report = evaluator.evaluate_scans(1, 0, &scan, &scan, &gt).unwrap();

    assert_eq!(report.engines.len(), 2);
    for engine in &report.engines {
        let EngineOutcome::Aligned {
            result,
            recovered,
            error_vs_ground_truth,
        } = &engine.outcome
        else {
            panic!("{} failed", engine.engine);
        };
        assert!(result.converged, "{} did not converge", engine.engine);
        assert_relative_eq!(result.fitness_score, 0.0, epsilon = 1e-9);
        assert_relative_eq!(recovered.x, 0.0, epsilon = 1e-6);
        assert_relative_eq!(recovered.y, 0.0, epsilon = 1e-6);
        assert_relative_eq!(recovered.theta, 0.0, epsilon = 1e-6);
        // Error vs ground truth is the ground truth itself
        assert_relative_eq!(error_vs_ground_truth.dx, 0.3, epsilon = 1e-6);
        assert_relative_eq!(error_vs_ground_truth.dy, 0.1, epsilon = 1e-6);
        assert_relative_eq!(error_vs_ground_truth.dtheta, 0.2, epsilon = 1e-6);
    }

    let comparison = report.comparison("correlative").unwrap();
    assert_eq!(comparison.reference, "icp");
    assert_relative_eq!(comparison.delta.translation(), 0.0, epsilon = 1e-6);
}

#[test]
fn test_identical_poses_give_zero_ground_truth() {
    let pose = Pose2D::new(3.0, -1.0, PI * 0.75);
    let gt = pose_from_transform(&pariksha::transform_between(&pose, &pose));
    assert_relative_eq!(gt.x, 0.0, epsilon = 1e-12);
    assert_relative_eq!(gt.y, 0.0, epsilon = 1e-12);
    assert_relative_eq!(gt.theta, 0.0, epsilon = 1e-12);
}

#[test]
fn test_engine_order_does_not_change_results() {
    let poses: Vec<Pose2D> = (0..8)
        .map(|i| Pose2D::new(2.0 + i as f64 * 0.12, 1.5 + i as f64 * 0.03, i as f64 * 0.05))
        .collect();
    let trajectory = trajectory_in_room(poses);
    let pairs = KeyframeSelector::default().select(&trajectory);
    assert!(!pairs.is_empty());

    let mut forward = PairwiseEvaluator::new(engines(&[EngineKind::Icp, EngineKind::Correlative]));
    let mut reversed =
        PairwiseEvaluator::new(engines(&[EngineKind::Correlative, EngineKind::Icp]));

    for pair in &pairs {
        let a = forward.evaluate(&trajectory, pair).unwrap();
        let b = reversed.evaluate(&trajectory, pair).unwrap();
        for name in ["icp", "correlative"] {
            let (ea, eb) = (a.engine(name).unwrap(), b.engine(name).unwrap());
            match (&ea.outcome, &eb.outcome) {
                (
                    EngineOutcome::Aligned { result: ra, .. },
                    EngineOutcome::Aligned { result: rb, .. },
                ) => {
                    assert_eq!(ra.final_transform, rb.final_transform);
                    assert_eq!(ra.fitness_score, rb.fitness_score);
                    assert_eq!(ra.converged, rb.converged);
                }
                (EngineOutcome::Failed { .. }, EngineOutcome::Failed { .. }) => {}
                _ => panic!("{name} outcome depends on engine order"),
            }
        }
    }
}

#[test]
fn test_threshold_boundary_is_exclusive() {
    let at = trajectory_in_room(vec![Pose2D::new(2.0, 1.5, 0.0), Pose2D::new(2.4, 1.5, 0.0)]);
    let selector = KeyframeSelector::new(KeyframeConfig {
        min_displacement: 0.4,
        min_rotation: 0.3,
        max_frames: None,
    });
    // 2.4 - 2.0 is not exactly 0.4 in binary; measure the actual motion
    let motion = pariksha::displacement_of(&pariksha::transform_between(
        at.pose(0).unwrap(),
        at.pose(1).unwrap(),
    ));
    let exact = KeyframeSelector::new(KeyframeConfig {
        min_displacement: motion,
        ..selector.config().clone()
    });
    assert!(exact.select(&at).is_empty());

    let below = KeyframeSelector::new(KeyframeConfig {
        min_displacement: motion - 1e-9,
        ..selector.config().clone()
    });
    assert_eq!(below.select(&at).len(), 1);
}

#[test]
fn test_failing_engine_is_isolated() {
    let poses: Vec<Pose2D> = (0..7).map(|i| Pose2D::new(2.0 + i as f64 * 0.25, 1.5, 0.0)).collect();
    let trajectory = trajectory_in_room(poses);

    let set = engines(&[EngineKind::Icp]).with(Box::new(BrokenEngine)).unwrap();
    let mut pipeline = Pipeline::new(
        KeyframeSelector::default(),
        PairwiseEvaluator::new(set).with_initial_guess(InitialGuess::GroundTruth),
    );
    let mut reporters: Vec<Box<dyn ResultReporter>> = Vec::new();
    let summary = pipeline.run(&trajectory, &mut reporters).unwrap();

    assert_eq!(summary.pairs_selected, 3);
    assert_eq!(summary.pairs_evaluated, 3);
    let icp = summary.engines.iter().find(|e| e.engine == "icp").unwrap();
    let broken = summary.engines.iter().find(|e| e.engine == "broken").unwrap();
    assert_eq!(icp.aligned, 3);
    assert_eq!(icp.failures, 0);
    assert_eq!(broken.aligned, 0);
    assert_eq!(broken.failures, 3);
}

#[test]
fn test_broken_reference_yields_no_comparisons() {
    let trajectory = trajectory_in_room(vec![Pose2D::new(2.0, 1.5, 0.0), Pose2D::new(2.5, 1.5, 0.0)]);
    let set = EngineSet::new()
        .with(Box::new(BrokenEngine))
        .unwrap()
        .with(EngineKind::Icp.build(&MatcherSettings::default()))
        .unwrap();
    let mut evaluator = PairwiseEvaluator::new(set).with_initial_guess(InitialGuess::GroundTruth);
    assert_eq!(evaluator.reference(), Some("broken"));

    let pair = KeyframeSelector::default().select(&trajectory)[0];
    let report = evaluator.evaluate(&trajectory, &pair).unwrap();
    assert!(report.comparisons.is_empty());
    assert!(matches!(
        report.engine("broken").unwrap().outcome,
        EngineOutcome::Failed { ref reason } if reason.contains("broken")
    ));
    aligned_pose(&report.engine("icp").unwrap().outcome);
}

#[test]
fn test_empty_scan_pair_is_rejected_before_engines() {
    let mut evaluator = PairwiseEvaluator::new(engines(&[EngineKind::Icp]));
    let scan = observe(&room_world(100, 4.0, 3.0), &Pose2D::new(1.0, 1.0, 0.0));

    let err = evaluator
        .evaluate_scans(3, 1, &PointCloud2D::new(), &scan, &RigidTransform2D::identity())
        .unwrap_err();
    assert!(matches!(
        err,
        EvalError::InvalidPair {
            source_id: 3,
            target_id: 1,
            ..
        }
    ));
}

#[test]
fn test_coincident_scan_points_do_not_abort_run() {
    let poses = vec![
        Pose2D::new(2.0, 1.5, 0.0),
        Pose2D::new(2.5, 1.5, 0.0),
        Pose2D::new(3.0, 1.5, 0.0),
    ];
    let world = room_world(240, 6.0, 4.0);
    let collapsed = PointCloud2D::from_points(&vec![Point2D::new(1.0, 2.0); 40]);
    let scans = vec![observe(&world, &poses[0]), collapsed, observe(&world, &poses[2])];
    let trajectory = Trajectory::new(poses, scans).unwrap();

    let mut pipeline = Pipeline::new(
        KeyframeSelector::default(),
        PairwiseEvaluator::new(engines(&EngineKind::ALL)),
    );
    let mut reporters: Vec<Box<dyn ResultReporter>> = Vec::new();
    let summary = pipeline.run(&trajectory, &mut reporters).unwrap();

    assert_eq!(summary.pairs_selected, 2);
    assert_eq!(summary.pairs_evaluated, 2);
    for engine in &summary.engines {
        assert_eq!(engine.aligned + engine.failures, 2, "{}", engine.engine);
    }
}

// ============================================================================
// Dataset round trip
// ============================================================================

/// Ray-cast a scan of the room `[0, w] x [0, h]` from `pose`.
fn cast_ranges(pose: &Pose2D, w: f64, h: f64, angle_min: f64, increment: f64, beams: usize) -> Vec<f64> {
    (0..beams)
        .map(|i| {
            let (s, c) = (pose.theta + angle_min + i as f64 * increment).sin_cos();
            let tx = if c > 1e-12 {
                (w - pose.x) / c
            } else if c < -1e-12 {
                -pose.x / c
            } else {
                f64::INFINITY
            };
            let ty = if s > 1e-12 {
                (h - pose.y) / s
            } else if s < -1e-12 {
                -pose.y / s
            } else {
                f64::INFINITY
            };
            // Jitter keeps wall coordinates from repeating exactly
            tx.min(ty) + (i % 7) as f64 * 1e-4
        })
        .collect()
}

fn write_dataset(dir: &std::path::Path, poses: &[Pose2D], empty_frame: Option<usize>) {
    let (angle_min, increment, beams) = (-2.2, 0.0125, 353);
    let mut pose_lines = String::new();
    let mut scan_lines = String::new();
    for (i, pose) in poses.iter().enumerate() {
        pose_lines.push_str(&format!("{},{},{},{}\n", i, pose.x, pose.y, pose.theta));
        let ranges = if empty_frame == Some(i) {
            vec![100.0; beams]
        } else {
            cast_ranges(pose, 6.0, 4.0, angle_min, increment, beams)
        };
        let ranges: Vec<String> = ranges.iter().map(|r| format!("{:.5}", r)).collect();
        scan_lines.push_str(&format!(
            "{},{},{},0,{}\n",
            i,
            angle_min,
            increment,
            ranges.join(",")
        ));
    }
    fs::write(dir.join(Dataset::POSES_FILE), pose_lines).unwrap();
    fs::write(dir.join(Dataset::SCANS_FILE), scan_lines).unwrap();
}

#[test]
fn test_dataset_to_reports() {
    let data = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let poses: Vec<Pose2D> = (0..9)
        .map(|i| Pose2D::new(2.0 + i as f64 * 0.25, 1.8, i as f64 * 0.02))
        .collect();
    // Frame 4 sees nothing within range
    write_dataset(data.path(), &poses, Some(4));

    let trajectory = Dataset::load(data.path(), &ScanFormat::default()).unwrap();
    assert_eq!(trajectory.len(), 9);
    assert!(trajectory.scan(4).unwrap().is_empty());

    let json_path = out.path().join("results.json");
    let csv_path = out.path().join("results.csv");
    let metadata = RunMetadata {
        dataset: data.path().display().to_string(),
        engines: vec!["icp".to_string(), "hybrid".to_string()],
        reference: Some("icp".to_string()),
        initial_guess: "ground_truth".to_string(),
        min_displacement: 0.4,
        min_rotation: 0.3,
    };
    let mut reporters: Vec<Box<dyn ResultReporter>> = vec![
        Box::new(JsonReporter::new(&json_path, metadata)),
        Box::new(CsvReporter::create(&csv_path).unwrap()),
    ];

    let mut pipeline = Pipeline::new(
        KeyframeSelector::default(),
        PairwiseEvaluator::new(engines(&[EngineKind::Icp, EngineKind::Hybrid]))
            .with_initial_guess(InitialGuess::GroundTruth),
    );
    let summary = pipeline.run(&trajectory, &mut reporters).unwrap();

    // Pairs (2,0), (4,2), (6,4), (8,6); frame 4 is empty
    assert_eq!(summary.pairs_selected, 4);
    assert_eq!(summary.pairs_skipped, 2);
    assert_eq!(summary.pairs_evaluated, 2);
    let icp = &summary.engines[0];
    assert_eq!(icp.engine, "icp");
    assert!(icp.mean_translation_error < 0.05, "icp error {}", icp.mean_translation_error);
    assert!(icp.mean_rotation_error < 0.02);

    let json: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(json["pairs"].as_array().unwrap().len(), 2);
    assert_eq!(json["skipped"].as_array().unwrap().len(), 2);
    assert_eq!(json["pairs"][0]["source_id"], 2);
    assert_eq!(json["pairs"][0]["target_id"], 0);
    assert_eq!(json["summary"]["reference"], "icp");

    let csv = fs::read_to_string(&csv_path).unwrap();
    // Header plus one row per (pair, engine)
    assert_eq!(csv.lines().count(), 1 + 2 * 2);
    assert!(csv.lines().skip(1).all(|l| l.starts_with("2,0,") || l.starts_with("8,6,")));
}

#[test]
fn test_missing_dataset_is_fatal() {
    let dir = TempDir::new().unwrap();
    let err = Dataset::load(dir.path(), &ScanFormat::default()).unwrap_err();
    assert!(matches!(err, EvalError::MissingData(_)));
}
