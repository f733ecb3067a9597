//! LiDAR scan and point cloud types.

use serde::{Deserialize, Serialize};

use super::pose::Point2D;
use super::transform::RigidTransform2D;

/// Raw LiDAR scan in polar coordinates.
///
/// Each measurement is a range value at `angle_min + i * angle_increment`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaserScan {
    /// Start angle in radians
    pub angle_min: f64,
    /// End angle in radians
    pub angle_max: f64,
    /// Angular resolution (radians between consecutive readings)
    pub angle_increment: f64,
    /// Minimum valid range in meters
    pub range_min: f64,
    /// Maximum range in meters; readings at or beyond it are "no return"
    pub range_max: f64,
    /// Range measurements in meters
    pub ranges: Vec<f64>,
}

impl LaserScan {
    /// Create a new laser scan with the given parameters.
    pub fn new(
        angle_min: f64,
        angle_max: f64,
        angle_increment: f64,
        range_min: f64,
        range_max: f64,
        ranges: Vec<f64>,
    ) -> Self {
        Self {
            angle_min,
            angle_max,
            angle_increment,
            range_min,
            range_max,
            ranges,
        }
    }

    /// Number of range measurements.
    #[inline]
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    /// Check if scan is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Beam angle for a given index.
    #[inline]
    pub fn angle_at(&self, index: usize) -> f64 {
        self.angle_min + index as f64 * self.angle_increment
    }

    /// Check if a range value is a usable return.
    #[inline]
    pub fn is_valid_range(&self, range: f64) -> bool {
        range.is_finite() && range >= self.range_min && range < self.range_max
    }

    /// Iterate over (angle, range) tuples.
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.ranges
            .iter()
            .enumerate()
            .map(move |(i, &range)| (self.angle_at(i), range))
    }

    /// Count valid points.
    pub fn valid_count(&self) -> usize {
        self.ranges
            .iter()
            .filter(|&&r| self.is_valid_range(r))
            .count()
    }
}

/// Collection of 2D points in Cartesian coordinates.
///
/// Struct-of-Arrays layout: `xs[i], ys[i]` is point `i`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PointCloud2D {
    /// X coordinates in meters
    pub xs: Vec<f64>,
    /// Y coordinates in meters
    pub ys: Vec<f64>,
}

impl PointCloud2D {
    /// Create an empty point cloud.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty point cloud with pre-allocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            xs: Vec::with_capacity(capacity),
            ys: Vec::with_capacity(capacity),
        }
    }

    /// Build a point cloud from a slice of points.
    pub fn from_points(points: &[Point2D]) -> Self {
        let mut cloud = Self::with_capacity(points.len());
        for p in points {
            cloud.push(*p);
        }
        cloud
    }

    /// Add a point.
    #[inline]
    pub fn push(&mut self, point: Point2D) {
        self.push_xy(point.x, point.y);
    }

    /// Add a point from raw coordinates.
    #[inline]
    pub fn push_xy(&mut self, x: f64, y: f64) {
        self.xs.push(x);
        self.ys.push(y);
    }

    /// Number of points.
    #[inline]
    pub fn len(&self) -> usize {
        self.xs.len()
    }

    /// Check if empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }

    /// Point at index, if in bounds.
    #[inline]
    pub fn point_at(&self, index: usize) -> Option<Point2D> {
        Some(Point2D::new(*self.xs.get(index)?, *self.ys.get(index)?))
    }

    /// Iterate over points.
    pub fn iter(&self) -> impl Iterator<Item = Point2D> + '_ {
        self.xs
            .iter()
            .zip(self.ys.iter())
            .map(|(&x, &y)| Point2D::new(x, y))
    }

    /// Axis-aligned bounding box as `(min, max)`.
    pub fn bounds(&self) -> Option<(Point2D, Point2D)> {
        if self.is_empty() {
            return None;
        }
        let mut min = Point2D::new(f64::MAX, f64::MAX);
        let mut max = Point2D::new(f64::MIN, f64::MIN);
        for p in self.iter() {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        Some((min, max))
    }

    /// Center of mass.
    pub fn centroid(&self) -> Option<Point2D> {
        if self.is_empty() {
            return None;
        }
        let n = self.len() as f64;
        let sum_x: f64 = self.xs.iter().sum();
        let sum_y: f64 = self.ys.iter().sum();
        Some(Point2D::new(sum_x / n, sum_y / n))
    }

    /// Transform all points: `p' = R * p + t`.
    pub fn transform(&self, transform: &RigidTransform2D) -> PointCloud2D {
        let mut result = PointCloud2D::with_capacity(self.len());
        for (&x, &y) in self.xs.iter().zip(self.ys.iter()) {
            let (nx, ny) = transform.apply_xy(x, y);
            result.push_xy(nx, ny);
        }
        result
    }
}
