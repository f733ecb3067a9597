//! Text dataset reader.
//!
//! A dataset is a folder with two comma-separated files, one record per line:
//!
//! ```text
//! data.poses   stamp,x,y,theta[,...]
//! data.scans   stamp,angle_min,angle_increment,<unused>,r0,r1,...
//! ```
//!
//! Line `i` of both files describes frame `i`. Blank lines are skipped.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::core::types::{LaserScan, Pose2D};
use crate::engine::Trajectory;
use crate::error::{EvalError, Result};
use crate::sensors::ScanConverter;

/// Scan parameters not stored in `data.scans`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScanFormat {
    /// Last beam angle (radians).
    pub angle_max: f64,
    /// Shortest usable range (meters).
    pub range_min: f64,
    /// Ranges at or beyond this are "no return" (meters).
    pub range_max: f64,
}

impl Default for ScanFormat {
    fn default() -> Self {
        Self {
            angle_max: 2.26456475258, // ~130°
            range_min: 0.023,         // 2.3cm
            range_max: 60.0,          // 60m
        }
    }
}

/// Reader for a `data.poses` + `data.scans` folder.
pub struct Dataset;

impl Dataset {
    pub const POSES_FILE: &'static str = "data.poses";
    pub const SCANS_FILE: &'static str = "data.scans";

    /// Load both files and project every scan into its sensor frame.
    pub fn load(dir: &Path, format: &ScanFormat) -> Result<Trajectory> {
        let poses = Self::read_poses(&dir.join(Self::POSES_FILE))?;
        let scans = Self::read_scans(&dir.join(Self::SCANS_FILE), format)?;

        log::info!(
            "Loaded {} poses and {} scans from {}",
            poses.len(),
            scans.len(),
            dir.display()
        );

        let clouds = scans.iter().map(ScanConverter::to_point_cloud).collect();
        Trajectory::new(poses, clouds)
    }

    /// Read ground-truth poses.
    pub fn read_poses(path: &Path) -> Result<Vec<Pose2D>> {
        let text = read_file(path)?;
        let mut poses = Vec::new();
        for (line, fields) in records(&text) {
            let parser = FieldParser::new(path, line, &fields);
            if fields.len() < 4 {
                return Err(parser.error(format!(
                    "expected stamp,x,y,theta but found {} fields",
                    fields.len()
                )));
            }
            let x = parser.number(1)?;
            let y = parser.number(2)?;
            let theta = parser.number(3)?;
            poses.push(Pose2D::new(x, y, theta));
        }
        Ok(poses)
    }

    /// Read raw laser scans.
    pub fn read_scans(path: &Path, format: &ScanFormat) -> Result<Vec<LaserScan>> {
        let text = read_file(path)?;
        let mut scans = Vec::new();
        for (line, fields) in records(&text) {
            let parser = FieldParser::new(path, line, &fields);
            if fields.len() < 4 {
                return Err(parser.error(format!(
                    "expected stamp,angle_min,angle_increment,_,ranges... but found {} fields",
                    fields.len()
                )));
            }
            let angle_min = parser.number(1)?;
            let angle_increment = parser.number(2)?;
            let ranges = (4..fields.len())
                .map(|i| parser.number(i))
                .collect::<Result<Vec<f64>>>()?;

            scans.push(LaserScan::new(
                angle_min,
                format.angle_max,
                angle_increment,
                format.range_min,
                format.range_max,
                ranges,
            ));
        }
        Ok(scans)
    }
}

fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => {
            EvalError::MissingData(format!("{} not found", path.display()))
        }
        _ => EvalError::Io(e),
    })
}

/// Non-blank lines as (1-based line number, trimmed fields).
fn records(text: &str) -> impl Iterator<Item = (usize, Vec<&str>)> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| (i + 1, line.split(',').map(str::trim).collect()))
}

struct FieldParser<'a> {
    path: &'a Path,
    line: usize,
    fields: &'a [&'a str],
}

impl<'a> FieldParser<'a> {
    fn new(path: &'a Path, line: usize, fields: &'a [&'a str]) -> Self {
        Self { path, line, fields }
    }

    fn number(&self, index: usize) -> Result<f64> {
        let field = self.fields.get(index).copied().unwrap_or_default();
        field
            .parse::<f64>()
            .map_err(|_| self.error(format!("field {}: invalid number '{}'", index, field)))
    }

    fn error(&self, message: String) -> EvalError {
        EvalError::Parse {
            file: PathBuf::from(self.path),
            line: self.line,
            message,
        }
    }
}
