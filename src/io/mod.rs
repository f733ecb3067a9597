//! Dataset ingestion and result output.
//!
//! - **Dataset**: `data.poses` / `data.scans` folder reader producing a [`Trajectory`]
//! - **Reporters**: log, JSON and CSV [`ResultReporter`] implementations
//! - **SVG export**: per-pair overlay snapshots for visual inspection
//!
//! ## Loading a Dataset
//!
//! ```rust,ignore
//! use pariksha::io::{Dataset, ScanFormat};
//! use std::path::Path;
//!
//! let trajectory = Dataset::load(Path::new("logs/run1"), &ScanFormat::default())?;
//! ```
//!
//! [`Trajectory`]: crate::engine::Trajectory
//! [`ResultReporter`]: crate::engine::ResultReporter

pub mod dataset;
pub mod report;
pub mod svg;

pub use dataset::{Dataset, ScanFormat};
pub use report::{CsvReporter, JsonReporter, LogReporter, RunMetadata};
pub use svg::{PairSvg, SvgColorScheme, SvgConfig, SvgReporter};
