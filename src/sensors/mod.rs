//! Sensor processing layer.
//!
//! # Contents
//!
//! - [`converter`]: Polar to Cartesian projection of laser scans

pub mod converter;

pub use converter::ScanConverter;
