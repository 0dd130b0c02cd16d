//! Static Chart Renderer
//! Writes the choropleth and the ranking of the current view to PNG files.

use super::composer::{BarEntry, ChoroplethView, DashboardView};
use super::scale::{blues, format_value};
use crate::data::Indicator;
use crate::geo::GeometryAsset;
use plotters::prelude::*;
use plotters::style::FontTransform;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

const MAP_WIDTH: u32 = 1000;
const RANKING_SIZE: (u32, u32) = (1200, 750);
const OUTLINE: RGBColor = RGBColor(90, 90, 90);
const BAR_HALF_WIDTH: f64 = 0.35;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to create export directory {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Drawing failed: {0}")]
    Draw(String),
    #[error("Nothing to draw")]
    NothingToDraw,
}

fn draw_err<E: std::fmt::Display>(e: E) -> RenderError {
    RenderError::Draw(e.to_string())
}

/// File names of the two exported charts for an indicator.
pub fn export_paths(dir: &Path, indicator: Indicator) -> (PathBuf, PathBuf) {
    (
        dir.join(format!("carte_{}.png", indicator)),
        dir.join(format!("classement_{}.png", indicator)),
    )
}

pub struct StaticChartRenderer;

impl StaticChartRenderer {
    /// Render the map and the ranking into `dir`. Returns the files written.
    ///
    /// The map is skipped when no table region matched the geometry.
    pub fn export(
        view: &DashboardView,
        geometry: &GeometryAsset,
        dir: &Path,
    ) -> Result<Vec<PathBuf>, RenderError> {
        fs::create_dir_all(dir).map_err(|source| RenderError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let (map_path, ranking_path) = export_paths(dir, view.indicator);
        let mut written = Vec::with_capacity(2);

        match Self::render_map(&map_path, &view.map, geometry) {
            Ok(()) => written.push(map_path),
            Err(RenderError::NothingToDraw) => {
                log::warn!("No region matched the geometry, map export skipped")
            }
            Err(e) => return Err(e),
        }

        Self::render_ranking(&ranking_path, &view.ranking, view.indicator)?;
        written.push(ranking_path);

        for path in &written {
            log::info!("Exported {}", path.display());
        }
        Ok(written)
    }

    fn render_map(
        path: &Path,
        view: &ChoroplethView,
        geometry: &GeometryAsset,
    ) -> Result<(), RenderError> {
        let Some(bounds) = view.bounds else {
            return Err(RenderError::NothingToDraw);
        };

        let root = BitMapBackend::new(path, map_size(bounds.width(), bounds.height()))
            .into_drawing_area();
        root.fill(&WHITE).map_err(draw_err)?;

        let mut chart = ChartBuilder::on(&root)
            .margin(20)
            .caption(
                format!("{} ({}) par région", view.indicator.label(), view.indicator),
                ("sans-serif", 28),
            )
            .build_cartesian_2d(bounds.min[0]..bounds.max[0], bounds.min[1]..bounds.max[1])
            .map_err(draw_err)?;

        for region in &view.regions {
            let Some(shape) = geometry.shape(&region.record.region) else {
                continue;
            };
            let [r, g, b] = blues(region.color_t);
            let fill = RGBColor(r, g, b);

            for polygon in &shape.polygons {
                let points: Vec<(f64, f64)> = polygon.ring.iter().map(|p| (p[0], p[1])).collect();
                chart
                    .draw_series(std::iter::once(Polygon::new(points.clone(), fill.filled())))
                    .map_err(draw_err)?;
                chart
                    .draw_series(std::iter::once(PathElement::new(
                        points,
                        OUTLINE.stroke_width(1),
                    )))
                    .map_err(draw_err)?;
            }
        }

        root.present().map_err(draw_err)?;
        Ok(())
    }

    fn render_ranking(
        path: &Path,
        entries: &[BarEntry],
        indicator: Indicator,
    ) -> Result<(), RenderError> {
        if entries.is_empty() {
            return Err(RenderError::NothingToDraw);
        }
        let n = entries.len();
        let (lo, hi) = value_axis(entries);

        let root = BitMapBackend::new(path, RANKING_SIZE).into_drawing_area();
        root.fill(&WHITE).map_err(draw_err)?;

        let mut chart = ChartBuilder::on(&root)
            .margin(20)
            .caption(
                format!("Classement des régions par {}", indicator),
                ("sans-serif", 28),
            )
            .x_label_area_size(170)
            .y_label_area_size(100)
            .build_cartesian_2d(-0.5f64..(n as f64 - 0.5), lo..hi)
            .map_err(draw_err)?;

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(n)
            .x_label_formatter(&|x: &f64| bar_label(entries, *x))
            .x_label_style(
                ("sans-serif", 14)
                    .into_font()
                    .transform(FontTransform::Rotate90),
            )
            .y_label_formatter(&|y: &f64| format_value(*y))
            .y_desc(indicator.column())
            .draw()
            .map_err(draw_err)?;

        chart
            .draw_series(entries.iter().enumerate().map(|(i, entry)| {
                let [r, g, b] = blues(entry.color_t);
                let x = i as f64;
                Rectangle::new(
                    [(x - BAR_HALF_WIDTH, 0.0), (x + BAR_HALF_WIDTH, entry.value)],
                    RGBColor(r, g, b).filled(),
                )
            }))
            .map_err(draw_err)?;

        root.present().map_err(draw_err)?;
        Ok(())
    }
}

/// Keeps the map's aspect ratio at a fixed width.
fn map_size(width: f64, height: f64) -> (u32, u32) {
    let ratio = if width > 0.0 { height / width } else { 1.0 };
    let h = (MAP_WIDTH as f64 * ratio).clamp(400.0, 1400.0) as u32;
    (MAP_WIDTH, h + 60)
}

/// Value axis always includes zero, padded by 10%.
fn value_axis(entries: &[BarEntry]) -> (f64, f64) {
    let lo = entries.iter().map(|e| e.value).fold(0.0, f64::min);
    let hi = entries.iter().map(|e| e.value).fold(0.0, f64::max);
    let pad = if hi > lo { (hi - lo) * 0.1 } else { 1.0 };
    (if lo < 0.0 { lo - pad } else { 0.0 }, hi + pad)
}

fn bar_label(entries: &[BarEntry], x: f64) -> String {
    let idx = x.round();
    if (x - idx).abs() > 1e-6 || idx < 0.0 {
        return String::new();
    }
    entries
        .get(idx as usize)
        .map(|e| e.region.clone())
        .unwrap_or_default()
}
