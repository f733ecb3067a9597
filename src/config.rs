//! TOML run configuration.
//!
//! Every section and key is optional; missing values fall back to defaults.
//!
//! ```toml
//! [keyframe]
//! min_displacement = 0.4
//! min_rotation = 0.3
//!
//! [scan]
//! range_max = 30.0
//!
//! [evaluation]
//! reference = "icp"
//! initial_guess = "identity"   # or "ground_truth"
//!
//! [matcher]
//! fitness_max_range = 1.0
//!
//! [matcher.icp]
//! max_iterations = 50
//!
//! [output]
//! json = "results.json"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::algorithms::matching::MatcherSettings;
use crate::engine::{InitialGuess, KeyframeConfig};
use crate::error::{EvalError, Result};
use crate::io::ScanFormat;

/// Paths tried when no configuration file is given.
pub const DEFAULT_CONFIG_PATHS: &[&str] = &["pariksha.toml"];

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EvalConfig {
    #[serde(default)]
    pub keyframe: KeyframeConfig,
    #[serde(default)]
    pub scan: ScanFormat,
    #[serde(default)]
    pub evaluation: EvaluationSection,
    #[serde(default)]
    pub matcher: MatcherSettings,
    #[serde(default)]
    pub output: OutputSection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EvaluationSection {
    /// Engine every other engine is compared against.
    pub reference: String,
    pub initial_guess: InitialGuess,
}

impl Default for EvaluationSection {
    fn default() -> Self {
        Self {
            reference: "icp".to_string(),
            initial_guess: InitialGuess::Identity,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OutputSection {
    pub json: Option<PathBuf>,
    pub csv: Option<PathBuf>,
    /// Directory for per-pair SVG overlays.
    pub svg_dir: Option<PathBuf>,
}

impl EvalConfig {
    /// Parse a configuration document.
    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(basic_toml::from_str(contents)?)
    }

    /// Load a configuration file. Read and parse failures are errors.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .map_err(|e| EvalError::Config(format!("{}: {}", path.display(), e)))?;
        let config: Self = basic_toml::from_str(&contents)
            .map_err(|e| EvalError::Config(format!("{}: {}", path.display(), e)))?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load `path` if given, otherwise the first readable default path,
    /// otherwise built-in defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            return Self::load(path);
        }
        for candidate in DEFAULT_CONFIG_PATHS {
            let candidate = Path::new(candidate);
            if candidate.is_file() {
                return Self::load(candidate);
            }
        }
        log::debug!("No config file, using defaults");
        Ok(Self::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = EvalConfig::from_toml("").unwrap();
        assert_eq!(config.keyframe.min_displacement, 0.4);
        assert_eq!(config.keyframe.min_rotation, 0.3);
        assert_eq!(config.scan.range_max, 60.0);
        assert_eq!(config.evaluation.reference, "icp");
        assert_eq!(config.evaluation.initial_guess, InitialGuess::Identity);
        assert_eq!(config.matcher.icp.max_iterations, 50);
        assert!(config.output.json.is_none());
    }

    #[test]
    fn test_partial_sections() {
        let config = EvalConfig::from_toml(
            r#"
            [keyframe]
            min_rotation = 0.5

            [evaluation]
            reference = "correlative"
            initial_guess = "ground_truth"

            [matcher]
            fitness_max_range = 1.5

            [matcher.icp]
            max_iterations = 80

            [output]
            csv = "out.csv"
            "#,
        )
        .unwrap();

        assert_eq!(config.keyframe.min_rotation, 0.5);
        assert_eq!(config.keyframe.min_displacement, 0.4);
        assert_eq!(config.evaluation.reference, "correlative");
        assert_eq!(config.evaluation.initial_guess, InitialGuess::GroundTruth);
        assert_eq!(config.matcher.fitness_max_range, Some(1.5));
        assert_eq!(config.matcher.icp.max_iterations, 80);
        assert_eq!(config.matcher.icp.max_correspondence_distance, 0.5);
        assert_eq!(config.output.csv, Some(PathBuf::from("out.csv")));
    }

    #[test]
    fn test_invalid_value_is_config_error() {
        let err = EvalConfig::from_toml("[evaluation]\ninitial_guess = \"odometry\"\n").unwrap_err();
        assert!(matches!(err, EvalError::Config(_)));
    }

    #[test]
    fn test_load_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pariksha.toml");
        fs::write(&path, "[scan]\nrange_min = 0.1\n").unwrap();

        let config = EvalConfig::load_or_default(Some(&path)).unwrap();
        assert_eq!(config.scan.range_min, 0.1);

        let missing = EvalConfig::load(&dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(missing, EvalError::Config(ref m) if m.contains("nope.toml")));
    }
}
