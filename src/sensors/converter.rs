//! Scan conversion from polar to Cartesian representation.

use crate::core::types::{LaserScan, PointCloud2D};

/// Scan converter for polar-Cartesian transformations.
pub struct ScanConverter;

impl ScanConverter {
    /// Project every valid ray of a laser scan into the sensor frame.
    ///
    /// ```text
    /// x = range * cos(angle)
    /// y = range * sin(angle)
    /// ```
    ///
    /// Rays outside `[range_min, range_max)` or non-finite are dropped, so the
    /// resulting cloud may be shorter than `scan.ranges` (or empty).
    pub fn to_point_cloud(scan: &LaserScan) -> PointCloud2D {
        let mut cloud = PointCloud2D::with_capacity(scan.valid_count());

        for (angle, range) in scan.iter() {
            if !scan.is_valid_range(range) {
                continue;
            }
            let (sin_a, cos_a) = angle.sin_cos();
            cloud.push_xy(range * cos_a, range * sin_a);
        }

        cloud
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::{FRAC_PI_2, PI};

    #[test]
    fn test_projection_axes() {
        let scan = LaserScan::new(0.0, PI, FRAC_PI_2, 0.1, 10.0, vec![1.0, 2.0, 3.0]);
        let cloud = ScanConverter::to_point_cloud(&scan);

        assert_eq!(cloud.len(), 3);
        assert_relative_eq!(cloud.xs[0], 1.0, epsilon = 1e-12);
        assert_relative_eq!(cloud.ys[0], 0.0, epsilon = 1e-12);
        assert_relative_eq!(cloud.xs[1], 0.0, epsilon = 1e-12);
        assert_relative_eq!(cloud.ys[1], 2.0, epsilon = 1e-12);
        assert_relative_eq!(cloud.xs[2], -3.0, epsilon = 1e-12);
        assert_relative_eq!(cloud.ys[2], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_invalid_rays_dropped() {
        let scan = LaserScan::new(
            0.0,
            0.4,
            0.1,
            0.023,
            60.0,
            vec![0.01, 1.0, 60.0, f64::NAN, 2.0],
        );
        let cloud = ScanConverter::to_point_cloud(&scan);

        assert_eq!(cloud.len(), 2);
        // Second survivor is beam 4
        assert_relative_eq!(cloud.xs[1], 2.0 * 0.4_f64.cos(), epsilon = 1e-12);
        assert_relative_eq!(cloud.ys[1], 2.0 * 0.4_f64.sin(), epsilon = 1e-12);
    }

    #[test]
    fn test_all_invalid_yields_empty_cloud() {
        let scan = LaserScan::new(0.0, 0.1, 0.1, 0.5, 5.0, vec![0.0, 100.0]);
        assert!(ScanConverter::to_point_cloud(&scan).is_empty());
    }
}
