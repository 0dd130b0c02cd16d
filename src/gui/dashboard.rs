//! Dashboard Widget
//! Central scrollable panel: totals, map, pie, region detail and ranking.

use crate::charts::{ChartPlotter, DashboardView};
use crate::geo::GeometryAsset;
use egui::{Color32, RichText, ScrollArea};

const MAP_HEIGHT: f32 = 550.0;
const PIE_SIZE: f32 = 380.0;
const RANKING_HEIGHT: f32 = 400.0;
const SECTION_SPACING: f32 = 15.0;

pub struct Dashboard;

impl Dashboard {
    /// Shows `message` alone when there is no view to draw.
    pub fn show(
        ui: &mut egui::Ui,
        view: Option<&DashboardView>,
        geometry: &GeometryAsset,
        currency: &str,
        message: &str,
    ) {
        let Some(view) = view else {
            ui.centered_and_justified(|ui| {
                ui.label(RichText::new(message).size(20.0).color(Color32::GRAY));
            });
            return;
        };

        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui| {
                ui.heading(
                    RichText::new("Cartographie interactive des 12 régions du Maroc").size(24.0),
                );
                ui.add_space(SECTION_SPACING);

                ui.label(RichText::new("Totaux nationaux").size(18.0).strong());
                ui.add_space(6.0);
                ChartPlotter::draw_metrics(ui, &view.totals, currency);
                ui.add_space(SECTION_SPACING);

                ui.label(
                    RichText::new(format!(
                        "Carte des régions : {} ({})",
                        view.indicator.label(),
                        view.indicator
                    ))
                    .size(18.0)
                    .strong(),
                );
                ChartPlotter::draw_choropleth(ui, &view.map, geometry, MAP_HEIGHT);
                if !view.map.unmatched.is_empty() {
                    ui.label(
                        RichText::new(format!(
                            "Régions absentes de la carte : {}",
                            view.map.unmatched.join(", ")
                        ))
                        .size(11.0)
                        .color(Color32::GRAY),
                    );
                }
                ui.add_space(SECTION_SPACING);

                ChartPlotter::draw_pie(ui, &view.pie, &view.pie_title, PIE_SIZE);
                ui.add_space(SECTION_SPACING);
                ui.separator();
                ui.add_space(SECTION_SPACING);

                let total_width = ui.available_width();
                ui.horizontal_top(|ui| {
                    ui.allocate_ui(egui::vec2(total_width / 3.0, RANKING_HEIGHT), |ui| {
                        ui.vertical(|ui| {
                            let title = match &view.detail_region {
                                Some(region) => format!("Détail : {}", region),
                                None => "Détail".to_string(),
                            };
                            ui.label(RichText::new(title).size(16.0).strong());
                            ui.add_space(6.0);
                            match &view.detail {
                                Some(record) => ChartPlotter::draw_detail_table(ui, record),
                                None => {
                                    ui.label(
                                        RichText::new("Aucune ligne pour cette région")
                                            .color(Color32::GRAY),
                                    );
                                }
                            }
                        });
                    });

                    ui.vertical(|ui| {
                        ui.label(
                            RichText::new(format!("Classement des régions par {}", view.indicator))
                                .size(16.0)
                                .strong(),
                        );
                        ChartPlotter::draw_ranking(ui, &view.ranking, view.indicator, RANKING_HEIGHT);
                    });
                });
            });
    }
}
