//! Correlative Scan Matcher.
//!
//! Exhaustive search over a discretized pose space to find the best alignment.
//! Robust to large initial pose errors but slower and coarser than ICP.
//!
//! # Algorithm
//!
//! 1. Build a lookup table (grid) from target point cloud
//! 2. For each candidate pose (x, y, θ) in search window:
//!    a. Transform source points by candidate pose
//!    b. Score alignment by counting points near target
//! 3. Return pose with highest score (ties go to the candidate nearest the guess)

use serde::Deserialize;

use super::kdtree::mse_to_score;
use super::{MatchError, ScanMatchResult, ScanMatcher, ensure_non_empty};
use crate::core::types::{PointCloud2D, Pose2D};

/// Configuration for correlative scan matcher.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CorrelativeConfig {
    /// Search window half-width in X (meters).
    pub search_window_x: f64,

    /// Search window half-width in Y (meters).
    pub search_window_y: f64,

    /// Search window half-width in theta (radians).
    pub search_window_theta: f64,

    /// Linear search resolution (meters).
    pub linear_resolution: f64,

    /// Angular search resolution (radians).
    pub angular_resolution: f64,

    /// Grid resolution for scoring (meters).
    ///
    /// Points within about one cell of target are considered hits.
    pub grid_resolution: f64,

    /// Minimum score (fraction of points matched) to consider successful.
    pub min_score: f64,
}

impl Default for CorrelativeConfig {
    fn default() -> Self {
        Self {
            search_window_x: 0.3,     // ±30cm
            search_window_y: 0.3,     // ±30cm
            search_window_theta: 0.3, // ±17°
            linear_resolution: 0.02,  // 2cm steps
            angular_resolution: 0.02, // ~1.1° steps
            grid_resolution: 0.05,    // 5cm grid cells
            min_score: 0.5,           // At least 50% of points must match
        }
    }
}

/// Grid-based lookup table for fast scoring.
#[derive(Clone, Copy)]
struct ScoreGrid {
    width: usize,
    height: usize,
    origin_x: f64,
    origin_y: f64,
    resolution: f64,
}

impl ScoreGrid {
    /// Build a score grid from the target cloud into a reusable buffer.
    fn from_cloud_into(
        cloud: &PointCloud2D,
        resolution: f64,
        padding: f64,
        buffer: &mut Vec<bool>,
    ) -> Self {
        let Some((min, max)) = cloud.bounds() else {
            buffer.clear();
            return Self {
                width: 0,
                height: 0,
                origin_x: 0.0,
                origin_y: 0.0,
                resolution,
            };
        };

        let origin_x = min.x - padding;
        let origin_y = min.y - padding;
        let width = ((max.x + padding - origin_x) / resolution).ceil() as usize + 1;
        let height = ((max.y + padding - origin_y) / resolution).ceil() as usize + 1;
        let required_size = width * height;

        buffer.clear();
        buffer.resize(required_size, false);

        // Mark this cell and its 8 neighbours
        for i in 0..cloud.len() {
            let cx = ((cloud.xs[i] - origin_x) / resolution) as isize;
            let cy = ((cloud.ys[i] - origin_y) / resolution) as isize;
            for dx in -1..=1 {
                for dy in -1..=1 {
                    let nx = cx + dx;
                    let ny = cy + dy;
                    if nx >= 0 && ny >= 0 && (nx as usize) < width && (ny as usize) < height {
                        buffer[ny as usize * width + nx as usize] = true;
                    }
                }
            }
        }

        Self {
            width,
            height,
            origin_x,
            origin_y,
            resolution,
        }
    }

    #[inline]
    fn is_hit(&self, cells: &[bool], x: f64, y: f64) -> bool {
        let cx = ((x - self.origin_x) / self.resolution).floor();
        let cy = ((y - self.origin_y) / self.resolution).floor();
        if cx < 0.0 || cy < 0.0 {
            return false;
        }
        let (cx, cy) = (cx as usize, cy as usize);
        cx < self.width && cy < self.height && cells[cy * self.width + cx]
    }
}

/// Correlative scan matcher.
///
/// Performs exhaustive search over pose space to find best alignment.
#[derive(Debug)]
pub struct CorrelativeMatcher {
    config: CorrelativeConfig,
    /// Grid buffer reused across matches.
    grid_buffer: Vec<bool>,
    /// Rotated source buffers reused across candidate angles.
    rotated_xs: Vec<f64>,
    rotated_ys: Vec<f64>,
}

impl CorrelativeMatcher {
    /// Create a new correlative matcher with the given configuration.
    pub fn new(config: CorrelativeConfig) -> Self {
        Self {
            config,
            grid_buffer: Vec::new(),
            rotated_xs: Vec::new(),
            rotated_ys: Vec::new(),
        }
    }

    /// Get the current configuration.
    pub fn config(&self) -> &CorrelativeConfig {
        &self.config
    }

    /// Rotate source points by theta into the reusable buffers.
    fn rotate_source(&mut self, source: &PointCloud2D, theta: f64) {
        let (sin_t, cos_t) = theta.sin_cos();
        self.rotated_xs.clear();
        self.rotated_ys.clear();
        for (&x, &y) in source.xs.iter().zip(source.ys.iter()) {
            self.rotated_xs.push(x * cos_t - y * sin_t);
            self.rotated_ys.push(x * sin_t + y * cos_t);
        }
    }

    /// Fraction of rotated points that land on marked cells after translation.
    fn score(&self, grid: &ScoreGrid, cells: &[bool], tx: f64, ty: f64) -> f64 {
        if self.rotated_xs.is_empty() || cells.is_empty() {
            return 0.0;
        }
        let hits = self
            .rotated_xs
            .iter()
            .zip(self.rotated_ys.iter())
            .filter(|&(&x, &y)| grid.is_hit(cells, x + tx, y + ty))
            .count();
        hits as f64 / self.rotated_xs.len() as f64
    }
}

impl ScanMatcher for CorrelativeMatcher {
    fn match_scans(
        &mut self,
        source: &PointCloud2D,
        target: &PointCloud2D,
        initial_guess: &Pose2D,
    ) -> Result<ScanMatchResult, MatchError> {
        ensure_non_empty(source, target)?;

        let cfg = self.config.clone();

        let mut cells = std::mem::take(&mut self.grid_buffer);
        let grid = ScoreGrid::from_cloud_into(
            target,
            cfg.grid_resolution,
            cfg.search_window_x.max(cfg.search_window_y),
            &mut cells,
        );

        let x_steps = (cfg.search_window_x / cfg.linear_resolution).ceil() as i32;
        let y_steps = (cfg.search_window_y / cfg.linear_resolution).ceil() as i32;
        let t_steps = (cfg.search_window_theta / cfg.angular_resolution).ceil() as i32;
        let num_candidates = ((2 * t_steps + 1) * (2 * x_steps + 1) * (2 * y_steps + 1)) as u32;

        // Theta-first: rotate once, then score every translation
        let mut best_score = 0.0;
        let mut best_offset = i32::MAX;
        let mut best_pose = *initial_guess;

        for ti in -t_steps..=t_steps {
            let theta = initial_guess.theta + ti as f64 * cfg.angular_resolution;
            self.rotate_source(source, theta);

            for xi in -x_steps..=x_steps {
                let x = initial_guess.x + xi as f64 * cfg.linear_resolution;
                for yi in -y_steps..=y_steps {
                    let y = initial_guess.y + yi as f64 * cfg.linear_resolution;
                    let score = self.score(&grid, &cells, x, y);
                    let offset = ti.abs() + xi.abs() + yi.abs();
                    if score > best_score || (score == best_score && offset < best_offset) {
                        best_score = score;
                        best_offset = offset;
                        best_pose = Pose2D::new(x, y, theta);
                    }
                }
            }
        }

        self.grid_buffer = cells;

        let mse = (1.0 - best_score) * cfg.grid_resolution.powi(2);
        let score = mse_to_score(mse).min(best_score);
        if best_score >= cfg.min_score {
            Ok(ScanMatchResult::success(best_pose, score, num_candidates, mse))
        } else {
            Ok(ScanMatchResult::not_converged(best_pose, score, num_candidates, mse))
        }
    }
}
