//! Pariksha command line.
//!
//! Evaluates one candidate engine against a reference engine over a recorded
//! dataset folder.
//!
//! Usage:
//!   pariksha logs/run1 correlative
//!   pariksha logs/run1 hybrid --reference icp --output-json results.json
//!   pariksha logs/run1 icp --initial-guess ground_truth --svg-dir overlays/

use std::io::Write;
use std::path::PathBuf;

use clap::Parser;

use pariksha::{
    CsvReporter, Dataset, EngineKind, EngineSet, EvalConfig, EvalError, InitialGuess,
    JsonReporter, KeyframeSelector, LogReporter, PairwiseEvaluator, Pipeline, ResultReporter,
    RunMetadata, SvgReporter,
};

#[derive(Parser, Debug)]
#[command(name = "pariksha")]
#[command(about = "Compare 2D scan registration engines against ground-truth poses")]
struct Args {
    /// Folder containing data.poses and data.scans
    data_dir: PathBuf,

    /// Candidate engine (icp, correlative, hybrid)
    engine: EngineKind,

    /// TOML configuration file (defaults to ./pariksha.toml when present)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Reference engine the candidate is compared against
    #[arg(long, value_name = "ENGINE")]
    reference: Option<EngineKind>,

    /// Translation (m) that must be exceeded to select a pair
    #[arg(long, value_name = "M")]
    min_displacement: Option<f64>,

    /// Rotation (rad) that must be exceeded to select a pair
    #[arg(long, value_name = "RAD")]
    min_rotation: Option<f64>,

    /// Only use the first N frames
    #[arg(long, value_name = "N")]
    max_frames: Option<usize>,

    /// Initial guess handed to every engine (identity, ground_truth)
    #[arg(long, value_name = "GUESS")]
    initial_guess: Option<InitialGuess>,

    /// Output JSON file for results
    #[arg(long, value_name = "FILE")]
    output_json: Option<PathBuf>,

    /// Output CSV file for results
    #[arg(long, value_name = "FILE")]
    output_csv: Option<PathBuf>,

    /// Directory for per-pair SVG overlays
    #[arg(long, value_name = "DIR")]
    svg_dir: Option<PathBuf>,

    /// Suppress per-pair log output and the summary table
    #[arg(long)]
    quiet: bool,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] {} - {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> pariksha::Result<()> {
    let mut config = EvalConfig::load_or_default(args.config.as_deref())?;
    apply_overrides(&mut config, &args);

    let reference = match args.reference {
        Some(kind) => kind,
        None => config
            .evaluation
            .reference
            .parse::<EngineKind>()
            .map_err(|_| EvalError::UnknownEngine(config.evaluation.reference.clone()))?,
    };

    log::info!("pariksha starting");
    log::info!("  Dataset: {}", args.data_dir.display());
    log::info!("  Engine: {} (reference: {})", args.engine, reference);
    log::info!(
        "  Keyframes: > {} m or > {} rad",
        config.keyframe.min_displacement,
        config.keyframe.min_rotation
    );
    log::info!("  Initial guess: {}", config.evaluation.initial_guess);

    let trajectory = Dataset::load(&args.data_dir, &config.scan)?;

    // Reference first, candidate second; one engine when they coincide
    let mut kinds = vec![reference];
    if args.engine != reference {
        kinds.push(args.engine);
    }
    let engines = EngineSet::from_kinds(&kinds, &config.matcher)?;
    let evaluator = PairwiseEvaluator::new(engines)
        .with_reference(reference.name())?
        .with_initial_guess(config.evaluation.initial_guess);

    let metadata = RunMetadata {
        dataset: args.data_dir.display().to_string(),
        engines: evaluator.engine_names(),
        reference: Some(reference.name().to_string()),
        initial_guess: config.evaluation.initial_guess.to_string(),
        min_displacement: config.keyframe.min_displacement,
        min_rotation: config.keyframe.min_rotation,
    };

    let mut reporters: Vec<Box<dyn ResultReporter + '_>> = Vec::new();
    if !args.quiet {
        reporters.push(Box::new(LogReporter::new()));
    }
    if let Some(ref path) = config.output.json {
        reporters.push(Box::new(JsonReporter::new(path, metadata)));
    }
    if let Some(ref path) = config.output.csv {
        reporters.push(Box::new(CsvReporter::create(path)?));
    }
    if let Some(ref dir) = config.output.svg_dir {
        reporters.push(Box::new(SvgReporter::new(
            &trajectory,
            dir,
            args.engine.name(),
        )?));
    }

    let selector = KeyframeSelector::new(config.keyframe.clone());
    let mut pipeline = Pipeline::new(selector, evaluator);
    pipeline.run(&trajectory, &mut reporters)?;

    Ok(())
}

/// Command-line values take precedence over the configuration file.
fn apply_overrides(config: &mut EvalConfig, args: &Args) {
    if let Some(m) = args.min_displacement {
        config.keyframe.min_displacement = m;
    }
    if let Some(r) = args.min_rotation {
        config.keyframe.min_rotation = r;
    }
    if args.max_frames.is_some() {
        config.keyframe.max_frames = args.max_frames;
    }
    if let Some(guess) = args.initial_guess {
        config.evaluation.initial_guess = guess;
    }
    if args.output_json.is_some() {
        config.output.json = args.output_json.clone();
    }
    if args.output_csv.is_some() {
        config.output.csv = args.output_csv.clone();
    }
    if args.svg_dir.is_some() {
        config.output.svg_dir = args.svg_dir.clone();
    }
}
