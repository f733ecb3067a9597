//! Shared test fixtures for scan matching.
//!
//! Walls carry a tiny perpendicular ramp so no k-d tree bucket fills up with
//! points sharing one coordinate.

use crate::core::types::{Point2D, PointCloud2D};

/// Create an L-shaped point cloud (two perpendicular walls).
///
/// Total points = 2n - 1.
pub fn create_l_shape(n: usize, length: f64) -> PointCloud2D {
    let mut cloud = PointCloud2D::with_capacity(2 * n);
    for i in 0..n {
        let x = (i as f64 / (n - 1) as f64) * length;
        cloud.push(Point2D::new(x, i as f64 * 0.0001));
    }
    for i in 1..n {
        let y = (i as f64 / (n - 1) as f64) * length;
        cloud.push(Point2D::new(i as f64 * 0.0001, y));
    }
    cloud
}

/// Create a rectangular room with `n` points spread over four walls.
pub fn create_room(n: usize, width: f64, height: f64) -> PointCloud2D {
    let mut cloud = PointCloud2D::with_capacity(n);
    let per_wall = n / 4;

    for i in 0..per_wall {
        let t = i as f64 / per_wall as f64;
        let noise = i as f64 * 0.0001;
        cloud.push(Point2D::new(t * width, noise));
        cloud.push(Point2D::new(width + noise, t * height));
        cloud.push(Point2D::new(width - t * width, height + noise));
        cloud.push(Point2D::new(noise, height - t * height));
    }
    cloud
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_l_shape() {
        assert_eq!(create_l_shape(50, 2.0).len(), 99);
    }

    #[test]
    fn test_create_room() {
        assert_eq!(create_room(100, 4.0, 3.0).len(), 100);
    }
}
