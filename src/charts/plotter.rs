//! Chart Plotter Module
//! Draws the dashboard views with egui painters and egui_plot.

use super::composer::{BarEntry, ChoroplethView, PieSlice};
use super::scale::{blues, format_currency, format_percent, format_value, palette_color};
use crate::data::{Indicator, RegionalRecord, Totals, REGION_COLUMN};
use crate::geo::{GeometryAsset, ScreenFit};
use egui::{Align2, Color32, FontId, Mesh, Pos2, Rect, RichText, Sense, Shape, Stroke};
use egui_plot::{Bar, BarChart, GridMark, Plot};
use std::f64::consts::{PI, TAU};

/// Region outline
const OUTLINE_COLOR: Color32 = Color32::from_rgb(90, 90, 90);
const HOVER_OUTLINE: Color32 = Color32::from_rgb(255, 193, 7);
const COLORBAR_WIDTH: f32 = 16.0;
const COLORBAR_MARGIN: f32 = 70.0;
const PIE_HOLE: f64 = 0.4;
/// Smallest slice that gets an inside label, in percent.
const PIE_LABEL_MIN_PERCENT: f64 = 3.0;
const BAR_LABEL_CHARS: usize = 12;

pub fn rgb(c: [u8; 3]) -> Color32 {
    Color32::from_rgb(c[0], c[1], c[2])
}

/// Draws dashboard charts.
pub struct ChartPlotter;

impl ChartPlotter {
    /// Four national totals side by side.
    pub fn draw_metrics(ui: &mut egui::Ui, totals: &Totals, currency: &str) {
        ui.columns(Indicator::ALL.len(), |columns| {
            for (col, indicator) in columns.iter_mut().zip(Indicator::ALL) {
                egui::Frame::none()
                    .fill(col.visuals().widgets.noninteractive.bg_fill)
                    .rounding(5.0)
                    .inner_margin(8.0)
                    .show(col, |ui| {
                        ui.set_width(ui.available_width());
                        ui.label(
                            RichText::new(indicator.metric_caption())
                                .size(13.0)
                                .color(Color32::GRAY),
                        );
                        ui.label(
                            RichText::new(format_currency(totals.get(indicator), currency))
                                .size(22.0)
                                .strong(),
                        );
                    });
            }
        });
    }

    /// Choropleth of the selected indicator with hover details.
    pub fn draw_choropleth(
        ui: &mut egui::Ui,
        view: &ChoroplethView,
        geometry: &GeometryAsset,
        height: f32,
    ) {
        let (rect, response) =
            ui.allocate_exact_size(egui::vec2(ui.available_width(), height), Sense::hover());
        let painter = ui.painter_at(rect);

        let Some(bounds) = view.bounds else {
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                "Aucune région du tableau ne correspond à la carte",
                FontId::proportional(16.0),
                ui.visuals().weak_text_color(),
            );
            return;
        };

        let map_rect = Rect::from_min_max(
            rect.min,
            egui::pos2(rect.max.x - COLORBAR_MARGIN, rect.max.y),
        );
        let fit = ScreenFit::new(
            bounds,
            [map_rect.min.x as f64, map_rect.min.y as f64],
            [map_rect.width() as f64, map_rect.height() as f64],
        );
        let to_pos = |p: [f64; 2]| {
            let s = fit.to_screen(p);
            Pos2::new(s[0] as f32, s[1] as f32)
        };

        let hovered = response.hover_pos().and_then(|pos| {
            let p = fit.from_screen([pos.x as f64, pos.y as f64]);
            view.regions
                .iter()
                .find(|r| geometry.shape(&r.record.region).is_some_and(|s| s.contains(p)))
        });

        for region in &view.regions {
            let Some(shape) = geometry.shape(&region.record.region) else {
                continue;
            };
            let fill = rgb(blues(region.color_t));
            let is_hovered = hovered.is_some_and(|h| h.record.region == region.record.region);

            for polygon in &shape.polygons {
                let mut mesh = Mesh::default();
                for &p in &polygon.ring {
                    mesh.colored_vertex(to_pos(p), fill);
                }
                for t in &polygon.triangles {
                    mesh.add_triangle(t[0] as u32, t[1] as u32, t[2] as u32);
                }
                painter.add(Shape::mesh(mesh));

                let outline: Vec<Pos2> = polygon.ring.iter().map(|&p| to_pos(p)).collect();
                let stroke = if is_hovered {
                    Stroke::new(2.5, HOVER_OUTLINE)
                } else {
                    Stroke::new(0.8, OUTLINE_COLOR)
                };
                painter.add(Shape::closed_line(outline, stroke));
            }
        }

        Self::draw_colorbar(
            &painter,
            Rect::from_min_max(
                egui::pos2(rect.max.x - COLORBAR_MARGIN + 12.0, rect.min.y + 20.0),
                egui::pos2(
                    rect.max.x - COLORBAR_MARGIN + 12.0 + COLORBAR_WIDTH,
                    rect.max.y - 20.0,
                ),
            ),
            view.indicator,
            view.value_range,
            ui.visuals().text_color(),
        );

        if let Some(region) = hovered {
            response.on_hover_ui_at_pointer(|ui| {
                ui.label(RichText::new(&region.record.region).strong());
                Self::indicator_grid(ui, "map_hover", &region.record);
            });
        }
    }

    fn draw_colorbar(
        painter: &egui::Painter,
        bar: Rect,
        indicator: Indicator,
        (min, max): (f64, f64),
        text_color: Color32,
    ) {
        const STEPS: usize = 24;
        let mut mesh = Mesh::default();
        for i in 0..=STEPS {
            let t = i as f32 / STEPS as f32;
            let y = bar.max.y - t * bar.height();
            let color = rgb(blues(t as f64));
            mesh.colored_vertex(egui::pos2(bar.min.x, y), color);
            mesh.colored_vertex(egui::pos2(bar.max.x, y), color);
            if i > 0 {
                let base = (2 * i) as u32;
                mesh.add_triangle(base - 2, base - 1, base);
                mesh.add_triangle(base - 1, base + 1, base);
            }
        }
        painter.add(Shape::mesh(mesh));

        let font = FontId::proportional(11.0);
        painter.text(
            egui::pos2(bar.center().x, bar.min.y - 4.0),
            Align2::CENTER_BOTTOM,
            indicator.column(),
            font.clone(),
            text_color,
        );
        painter.text(
            egui::pos2(bar.max.x + 4.0, bar.min.y),
            Align2::LEFT_CENTER,
            format_currency(max, ""),
            font.clone(),
            text_color,
        );
        painter.text(
            egui::pos2(bar.max.x + 4.0, bar.max.y),
            Align2::LEFT_CENTER,
            format_currency(min, ""),
            font,
            text_color,
        );
    }

    /// Donut chart of each region's share, with a legend on the right.
    pub fn draw_pie(ui: &mut egui::Ui, slices: &[PieSlice], title: &str, height: f32) {
        ui.label(RichText::new(title).size(15.0).strong());
        ui.add_space(6.0);

        ui.horizontal(|ui| {
            let (rect, response) =
                ui.allocate_exact_size(egui::vec2(height, height), Sense::hover());
            let painter = ui.painter_at(rect);
            let center = rect.center();
            let r_out = (height / 2.0 - 4.0) as f64;
            let r_in = r_out * PIE_HOLE;

            let spans = pie_spans(slices);
            for (i, (slice, &(start, end))) in slices.iter().zip(&spans).enumerate() {
                if end <= start {
                    continue;
                }
                let color = rgb(palette_color(i));
                painter.add(Shape::mesh(annulus_sector(center, r_in, r_out, start, end, color)));

                if slice.percent >= PIE_LABEL_MIN_PERCENT {
                    let mid = (start + end) / 2.0;
                    let r = (r_in + r_out) / 2.0;
                    painter.text(
                        polar(center, r, mid),
                        Align2::CENTER_CENTER,
                        format!("{}\n{}", slice.region, format_percent(slice.percent)),
                        FontId::proportional(10.0),
                        Color32::WHITE,
                    );
                }
            }

            if let Some(pos) = response.hover_pos() {
                let d = pos - center;
                let r = d.length() as f64;
                if r >= r_in && r <= r_out {
                    if let Some(slice) = slice_at(&spans, angle_from_top(d.x as f64, d.y as f64))
                        .and_then(|i| slices.get(i))
                    {
                        response.on_hover_ui_at_pointer(|ui| {
                            ui.label(RichText::new(&slice.region).strong());
                            ui.label(format!(
                                "{} ({})",
                                format_value(slice.value),
                                format_percent(slice.percent)
                            ));
                        });
                    }
                }
            }

            ui.add_space(16.0);
            ui.vertical(|ui| {
                for (i, slice) in slices.iter().enumerate() {
                    ui.horizontal(|ui| {
                        let (rect, _) =
                            ui.allocate_exact_size(egui::vec2(14.0, 14.0), Sense::hover());
                        ui.painter().rect_filled(rect, 3.0, rgb(palette_color(i)));
                        ui.label(RichText::new(&slice.region).size(12.0));
                    });
                }
            });
        });
    }

    /// Regions ranked by the selected indicator, bars colored by value.
    pub fn draw_ranking(ui: &mut egui::Ui, entries: &[BarEntry], indicator: Indicator, height: f32) {
        let labels: Vec<String> = entries
            .iter()
            .map(|e| short_label(&e.region, BAR_LABEL_CHARS))
            .collect();
        let count = entries.len();

        let bars: Vec<Bar> = entries
            .iter()
            .enumerate()
            .map(|(i, e)| {
                Bar::new(i as f64, e.value)
                    .width(0.7)
                    .fill(rgb(blues(e.color_t)))
                    .stroke(Stroke::new(0.5, OUTLINE_COLOR))
                    .name(&e.region)
            })
            .collect();

        let chart = BarChart::new(bars).element_formatter(Box::new(|bar: &Bar, _chart: &BarChart| {
            format!("{}\n{}", bar.name, format_value(bar.value))
        }));

        Plot::new(format!("ranking_{}", indicator))
            .height(height)
            .allow_zoom(false)
            .allow_drag(false)
            .allow_scroll(false)
            .show_x(false)
            .y_axis_label(indicator.column())
            .x_grid_spacer(move |_input| {
                (0..count)
                    .map(|i| GridMark {
                        value: i as f64,
                        step_size: 1.0,
                    })
                    .collect()
            })
            .x_axis_formatter(move |mark, _range| {
                let idx = mark.value.round();
                if idx >= 0.0 && (idx as usize) < labels.len() && (mark.value - idx).abs() < 1e-6 {
                    labels[idx as usize].clone()
                } else {
                    String::new()
                }
            })
            .show(ui, |plot_ui| {
                plot_ui.bar_chart(chart);
            });
    }

    /// The selected region's row, verbatim.
    pub fn draw_detail_table(ui: &mut egui::Ui, record: &RegionalRecord) {
        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                egui::Grid::new("region_detail")
                    .striped(true)
                    .min_col_width(55.0)
                    .spacing([8.0, 4.0])
                    .show(ui, |ui| {
                        ui.label(RichText::new(REGION_COLUMN).strong().size(12.0));
                        for indicator in Indicator::ALL {
                            ui.label(RichText::new(indicator.column()).strong().size(12.0));
                        }
                        ui.end_row();

                        ui.label(RichText::new(&record.region).size(12.0));
                        for indicator in Indicator::ALL {
                            ui.label(RichText::new(record.value(indicator).to_string()).size(12.0));
                        }
                        ui.end_row();
                    });
            });
    }

    fn indicator_grid(ui: &mut egui::Ui, id: &str, record: &RegionalRecord) {
        egui::Grid::new(id).spacing([12.0, 2.0]).show(ui, |ui| {
            for indicator in Indicator::ALL {
                ui.label(indicator.column());
                ui.label(format_value(record.value(indicator)));
                ui.end_row();
            }
        });
    }
}

/// Start and end angle of each slice, clockwise from 12 o'clock, in radians.
///
/// Slices with a non-positive share get an empty span.
pub fn pie_spans(slices: &[PieSlice]) -> Vec<(f64, f64)> {
    let mut start = 0.0;
    slices
        .iter()
        .map(|slice| {
            let sweep = (slice.percent.max(0.0) / 100.0) * TAU;
            let span = (start, start + sweep);
            start += sweep;
            span
        })
        .collect()
}

/// Clockwise angle from 12 o'clock of a screen offset (y pointing down).
pub fn angle_from_top(dx: f64, dy: f64) -> f64 {
    let a = dx.atan2(-dy);
    if a < 0.0 {
        a + TAU
    } else {
        a
    }
}

pub fn slice_at(spans: &[(f64, f64)], angle: f64) -> Option<usize> {
    spans
        .iter()
        .position(|&(start, end)| angle >= start && angle < end)
}

fn polar(center: Pos2, r: f64, angle: f64) -> Pos2 {
    // angle 0 points up, growing clockwise
    let a = angle - PI / 2.0;
    egui::pos2(
        center.x + (r * a.cos()) as f32,
        center.y + (r * a.sin()) as f32,
    )
}

fn annulus_sector(center: Pos2, r_in: f64, r_out: f64, start: f64, end: f64, color: Color32) -> Mesh {
    let steps = (((end - start) / 0.04).ceil() as usize).max(1);
    let mut mesh = Mesh::default();
    for k in 0..=steps {
        let a = start + (end - start) * k as f64 / steps as f64;
        mesh.colored_vertex(polar(center, r_in, a), color);
        mesh.colored_vertex(polar(center, r_out, a), color);
        if k > 0 {
            let base = (2 * k) as u32;
            mesh.add_triangle(base - 2, base - 1, base);
            mesh.add_triangle(base - 1, base + 1, base);
        }
    }
    mesh
}

fn short_label(name: &str, max_chars: usize) -> String {
    if name.chars().count() <= max_chars {
        name.to_string()
    } else {
        let cut: String = name.chars().take(max_chars.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::sample_table;
    use crate::data::IndicatorProcessor;

    fn slice(region: &str, percent: f64) -> PieSlice {
        PieSlice {
            region: region.to_string(),
            value: percent,
            percent,
        }
    }

    #[test]
    fn spans_cover_the_full_turn() {
        let slices = vec![slice("a", 50.0), slice("b", 25.0), slice("c", 25.0)];
        let spans = pie_spans(&slices);
        assert_eq!(spans[0], (0.0, PI));
        assert!((spans[2].1 - TAU).abs() < 1e-12);
    }

    #[test]
    fn angles_start_at_twelve_and_go_clockwise() {
        assert_eq!(angle_from_top(0.0, -1.0), 0.0);
        assert!((angle_from_top(1.0, 0.0) - PI / 2.0).abs() < 1e-12);
        assert!((angle_from_top(0.0, 1.0) - PI).abs() < 1e-12);
        assert!((angle_from_top(-1.0, 0.0) - 3.0 * PI / 2.0).abs() < 1e-12);
    }

    #[test]
    fn hover_angle_finds_slice() {
        let slices = vec![slice("a", 50.0), slice("b", 25.0), slice("c", 25.0)];
        let spans = pie_spans(&slices);
        // right side belongs to the first half
        assert_eq!(slice_at(&spans, angle_from_top(1.0, 0.0)), Some(0));
        // lower left quarter
        assert_eq!(slice_at(&spans, angle_from_top(-1.0, 1.0)), Some(1));
        // upper left quarter
        assert_eq!(slice_at(&spans, angle_from_top(-1.0, -1.0)), Some(2));
    }

    #[test]
    fn mixed_sign_values_fill_exactly_one_turn() {
        // RA: 7, -2, 3
        let slices: Vec<PieSlice> = IndicatorProcessor::shares(&sample_table(), Indicator::RA)
            .unwrap()
            .into_iter()
            .map(|share| PieSlice {
                region: share.region,
                value: share.value,
                percent: share.percent,
            })
            .collect();
        let spans = pie_spans(&slices);

        assert!((spans.last().unwrap().1 - TAU).abs() < 1e-9);
        assert!((spans[0].1 - 0.7 * TAU).abs() < 1e-9);
        // the negative region has an empty span and is never hovered
        assert_eq!(spans[2].0, spans[2].1);
        assert_eq!(slice_at(&spans, TAU - 1e-6), Some(1));
    }

    #[test]
    fn long_labels_are_shortened() {
        assert_eq!(short_label("Oriental", 12), "Oriental");
        assert_eq!(short_label("Rabat-Salé-Kénitra", 12), "Rabat-Salé-…");
    }
}
