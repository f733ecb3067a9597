//! SVG overlays for visual inspection of a registration.
//!
//! One drawing per pair, in the target scan frame:
//! - Target scan (red)
//! - Source scan as captured (blue)
//! - Source scan moved by the recovered transform (green)
//!
//! A good alignment shows green lying on top of red.

use std::fmt::Write;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::types::{Point2D, PointCloud2D, RigidTransform2D};
use crate::engine::{EngineOutcome, EvaluationSummary, PairReport, ResultReporter, Trajectory};
use crate::error::{EvalError, Result};

/// SVG color scheme for visualization
#[derive(Clone, Debug)]
pub struct SvgColorScheme {
    pub target: &'static str,
    pub source: &'static str,
    pub aligned: &'static str,
    /// Frame axes at the origin
    pub axes: &'static str,
}

impl Default for SvgColorScheme {
    fn default() -> Self {
        Self {
            target: "#CC2222",
            source: "#2222CC",
            aligned: "#22AA22",
            axes: "#333333",
        }
    }
}

/// Configuration for SVG rendering
#[derive(Clone, Debug)]
pub struct SvgConfig {
    /// Pixels per meter
    pub scale: f64,
    /// Point marker radius in pixels
    pub point_radius: f64,
    /// Axis glyph length in meters
    pub axis_length: f64,
    pub colors: SvgColorScheme,
    /// Padding around the drawing in pixels
    pub padding: f64,
}

impl Default for SvgConfig {
    fn default() -> Self {
        Self {
            scale: 50.0,
            point_radius: 1.5,
            axis_length: 0.5,
            colors: SvgColorScheme::default(),
            padding: 20.0,
        }
    }
}

/// Overlay of one source/target pair.
pub struct PairSvg<'a> {
    config: &'a SvgConfig,
    target: &'a PointCloud2D,
    source: &'a PointCloud2D,
    aligned: Option<PointCloud2D>,
    title: Option<String>,
}

impl<'a> PairSvg<'a> {
    pub fn new(config: &'a SvgConfig, source: &'a PointCloud2D, target: &'a PointCloud2D) -> Self {
        Self {
            config,
            target,
            source,
            aligned: None,
            title: None,
        }
    }

    /// Also draw the source moved into the target frame by `transform`.
    pub fn with_alignment(mut self, transform: &RigidTransform2D) -> Self {
        self.aligned = Some(self.source.transform(transform));
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn render(&self) -> String {
        let mut svg = String::new();
        // Writing into a String cannot fail
        let _ = self.write_svg(&mut svg);
        svg
    }

    pub fn save(&self, path: &Path) -> std::result::Result<(), std::io::Error> {
        fs::write(path, self.render())
    }

    fn write_svg(&self, svg: &mut String) -> std::fmt::Result {
        let (min, max) = self.bounds();
        let view = View {
            min,
            max,
            scale: self.config.scale,
        };
        let plot_width = (max.x - min.x) * self.config.scale;
        let plot_height = (max.y - min.y) * self.config.scale;

        let padding = self.config.padding;
        let title_height = if self.title.is_some() { 30.0 } else { 0.0 };
        let legend_height = 85.0;

        let width = plot_width + 2.0 * padding;
        let height = plot_height + 2.0 * padding + title_height + legend_height;

        writeln!(svg, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
        writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{:.0}" height="{:.0}" viewBox="0 0 {:.0} {:.0}">"#,
            width, height, width, height
        )?;
        writeln!(
            svg,
            r##"  <rect width="100%" height="100%" fill="#F8F8F8"/>"##
        )?;

        if let Some(ref title) = self.title {
            writeln!(
                svg,
                r##"  <text x="{:.0}" y="22" font-family="sans-serif" font-size="16" font-weight="bold" text-anchor="middle" fill="#333">{}</text>"##,
                width / 2.0,
                title
            )?;
        }

        writeln!(
            svg,
            r#"  <g transform="translate({:.0}, {:.0})">"#,
            padding,
            padding + title_height
        )?;

        self.write_axes(svg, &view)?;
        // Aligned last so it sits on top of the target
        self.write_cloud(svg, "source", self.source, self.config.colors.source, &view)?;
        self.write_cloud(svg, "target", self.target, self.config.colors.target, &view)?;
        if let Some(ref aligned) = self.aligned {
            self.write_cloud(svg, "aligned", aligned, self.config.colors.aligned, &view)?;
        }

        writeln!(svg, "  </g>")?;

        self.write_legend(svg, width, padding + title_height + plot_height + 10.0)?;

        writeln!(svg, "</svg>")
    }

    /// Bounds of everything drawn, origin included.
    fn bounds(&self) -> (Point2D, Point2D) {
        let mut min = Point2D::new(-self.config.axis_length, -self.config.axis_length);
        let mut max = Point2D::new(self.config.axis_length, self.config.axis_length);

        let clouds = [Some(self.source), Some(self.target), self.aligned.as_ref()];
        for (lo, hi) in clouds.into_iter().flatten().filter_map(PointCloud2D::bounds) {
            min.x = min.x.min(lo.x);
            min.y = min.y.min(lo.y);
            max.x = max.x.max(hi.x);
            max.y = max.y.max(hi.y);
        }
        (min, max)
    }

    fn write_cloud(
        &self,
        svg: &mut String,
        id: &str,
        cloud: &PointCloud2D,
        color: &str,
        view: &View,
    ) -> std::fmt::Result {
        writeln!(svg, r#"    <g id="{}" fill="{}">"#, id, color)?;
        for point in cloud.iter() {
            let (px, py) = view.to_px(&point);
            writeln!(
                svg,
                r#"      <circle cx="{:.1}" cy="{:.1}" r="{:.1}"/>"#,
                px, py, self.config.point_radius
            )?;
        }
        writeln!(svg, "    </g>")
    }

    /// Frame axes: x to the right, y up.
    fn write_axes(&self, svg: &mut String, view: &View) -> std::fmt::Result {
        let len = self.config.axis_length;
        let color = self.config.colors.axes;
        let (ox, oy) = view.to_px(&Point2D::new(0.0, 0.0));
        let (xx, xy) = view.to_px(&Point2D::new(len, 0.0));
        let (yx, yy) = view.to_px(&Point2D::new(0.0, len));

        writeln!(
            svg,
            r#"    <g id="axes" stroke="{}" stroke-width="2" font-family="sans-serif" font-size="10">"#,
            color
        )?;
        writeln!(
            svg,
            r#"      <line x1="{:.1}" y1="{:.1}" x2="{:.1}" y2="{:.1}"/>"#,
            ox, oy, xx, xy
        )?;
        writeln!(
            svg,
            r#"      <line x1="{:.1}" y1="{:.1}" x2="{:.1}" y2="{:.1}"/>"#,
            ox, oy, yx, yy
        )?;
        writeln!(
            svg,
            r#"      <text x="{:.1}" y="{:.1}" stroke="none" fill="{}">x</text>"#,
            xx + 4.0,
            xy + 4.0,
            color
        )?;
        writeln!(
            svg,
            r#"      <text x="{:.1}" y="{:.1}" stroke="none" fill="{}">y</text>"#,
            yx - 3.0,
            yy - 4.0,
            color
        )?;
        writeln!(svg, "    </g>")
    }

    fn write_legend(&self, svg: &mut String, svg_width: f64, y_offset: f64) -> std::fmt::Result {
        writeln!(
            svg,
            r#"  <g id="legend" font-family="sans-serif" font-size="12" transform="translate(0, {:.0})">"#,
            y_offset
        )?;
        writeln!(
            svg,
            r##"    <rect x="10" y="0" width="{:.0}" height="75" fill="white" stroke="#CCC" stroke-width="1" rx="4"/>"##,
            (svg_width - 20.0).max(0.0)
        )?;

        let colors = &self.config.colors;
        let entries = [
            (true, "Target", colors.target),
            (true, "Source", colors.source),
            (self.aligned.is_some(), "Aligned source", colors.aligned),
        ];

        let mut entry_y = 20.0;
        for (shown, label, color) in entries {
            if !shown {
                continue;
            }
            writeln!(
                svg,
                r#"    <circle cx="35" cy="{:.0}" r="4" fill="{}"/>"#,
                entry_y, color
            )?;
            writeln!(
                svg,
                r##"    <text x="50" y="{:.0}" fill="#333">{}</text>"##,
                entry_y + 4.0,
                label
            )?;
            entry_y += 20.0;
        }

        writeln!(svg, "  </g>")
    }
}

/// World to pixel mapping with y pointing up.
struct View {
    min: Point2D,
    max: Point2D,
    scale: f64,
}

impl View {
    fn to_px(&self, p: &Point2D) -> (f64, f64) {
        (
            (p.x - self.min.x) * self.scale,
            (self.max.y - p.y) * self.scale,
        )
    }
}

/// Writes one overlay per evaluated pair into a directory.
///
/// The aligned source uses the transform recovered by `engine`; pairs where
/// that engine failed show only the raw scans.
pub struct SvgReporter<'a> {
    trajectory: &'a Trajectory,
    dir: PathBuf,
    engine: String,
    config: SvgConfig,
    written: usize,
}

impl<'a> SvgReporter<'a> {
    /// Create the output directory if needed.
    pub fn new(
        trajectory: &'a Trajectory,
        dir: impl Into<PathBuf>,
        engine: impl Into<String>,
    ) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            trajectory,
            dir,
            engine: engine.into(),
            config: SvgConfig::default(),
            written: 0,
        })
    }

    pub fn with_config(mut self, config: SvgConfig) -> Self {
        self.config = config;
        self
    }

    /// File name used for a pair.
    pub fn file_name(source_id: usize, target_id: usize) -> String {
        format!("pair_{:05}_{:05}.svg", source_id, target_id)
    }
}

impl ResultReporter for SvgReporter<'_> {
    fn report_pair(&mut self, report: &PairReport) -> Result<()> {
        let (Some(source), Some(target)) = (
            self.trajectory.scan(report.source_id),
            self.trajectory.scan(report.target_id),
        ) else {
            return Ok(());
        };

        let mut drawing = PairSvg::new(&self.config, source, target);
        let title = match report.engine(&self.engine).map(|e| &e.outcome) {
            Some(EngineOutcome::Aligned { result, .. }) => {
                drawing = drawing.with_alignment(&result.final_transform);
                format!(
                    "{} -> {} ({}, converged: {})",
                    report.source_id, report.target_id, self.engine, result.converged
                )
            }
            _ => format!(
                "{} -> {} ({} failed)",
                report.source_id, report.target_id, self.engine
            ),
        };

        let path = self
            .dir
            .join(Self::file_name(report.source_id, report.target_id));
        drawing.with_title(title).save(&path)?;
        self.written += 1;
        Ok(())
    }

    fn report_skipped(&mut self, _: usize, _: usize, _: &EvalError) -> Result<()> {
        Ok(())
    }

    fn finish(&mut self, _: &EvaluationSummary) -> Result<()> {
        log::info!(
            "{} SVG overlays written to: {}",
            self.written,
            self.dir.display()
        );
        Ok(())
    }
}
