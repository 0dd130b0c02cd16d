//! Control Panel Widget
//! Left side panel with the data source, selectors and export.

use super::Selection;
use crate::data::Indicator;
use egui::{Color32, ComboBox, RichText};

/// Severity of the status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Success,
    Error,
}

impl StatusLevel {
    fn color(self) -> Color32 {
        match self {
            StatusLevel::Info => Color32::GRAY,
            StatusLevel::Success => Color32::from_rgb(40, 167, 69),
            StatusLevel::Error => Color32::from_rgb(220, 53, 69),
        }
    }
}

/// Left side control panel.
pub struct ControlPanel {
    /// Name of the file or service the table came from.
    pub source_label: Option<String>,
    pub regions: Vec<String>,
    pub status: String,
    pub level: StatusLevel,
}

impl Default for ControlPanel {
    fn default() -> Self {
        Self {
            source_label: None,
            regions: Vec::new(),
            status: "Prêt".to_string(),
            level: StatusLevel::Info,
        }
    }
}

impl ControlPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_status(&mut self, level: StatusLevel, status: impl Into<String>) {
        self.level = level;
        self.status = status.into();
    }

    /// Draw the control panel
    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        selection: &mut Selection,
        is_loading: bool,
    ) -> ControlPanelAction {
        let mut action = ControlPanelAction::None;
        let has_table = !self.regions.is_empty();

        ui.vertical_centered(|ui| {
            ui.add_space(5.0);
            ui.label(
                RichText::new("🗺 Carto Maroc")
                    .size(22.0)
                    .color(Color32::from_rgb(100, 149, 237)),
            );
            ui.label(
                RichText::new("Indicateurs régionaux 2024")
                    .size(11.0)
                    .color(Color32::GRAY),
            );
        });
        ui.add_space(10.0);
        ui.separator();
        ui.add_space(5.0);

        // ===== Data Source =====
        ui.label(RichText::new("📁 Source des données").size(14.0).strong());
        ui.add_space(5.0);

        egui::Frame::none()
            .fill(ui.visuals().widgets.noninteractive.bg_fill)
            .rounding(5.0)
            .inner_margin(8.0)
            .show(ui, |ui| {
                let source_text = self
                    .source_label
                    .clone()
                    .unwrap_or_else(|| "Aucune donnée".to_string());
                ui.label(RichText::new(source_text).size(12.0).color(
                    if self.source_label.is_some() {
                        ui.visuals().text_color()
                    } else {
                        Color32::GRAY
                    },
                ));

                ui.add_space(5.0);
                ui.add_enabled_ui(!is_loading, |ui| {
                    ui.horizontal(|ui| {
                        if ui.button("📂 Importer (.xlsx)").clicked() {
                            action = ControlPanelAction::BrowseFile;
                        }
                        if ui.button("🔄 Google Sheets").clicked() {
                            action = ControlPanelAction::ReloadFallback;
                        }
                    });
                });
            });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Selection =====
        ui.label(RichText::new("🔧 Affichage").size(14.0).strong());
        ui.add_space(8.0);

        let label_width = 110.0;
        let combo_width = 170.0;

        ui.add_enabled_ui(has_table, |ui| {
            ui.horizontal(|ui| {
                ui.add_sized([label_width, 20.0], egui::Label::new("Indicateur :"));
                ComboBox::from_id_salt("indicator")
                    .width(combo_width)
                    .selected_text(format!(
                        "{} - {}",
                        selection.indicator,
                        selection.indicator.label()
                    ))
                    .show_ui(ui, |ui| {
                        for indicator in Indicator::ALL {
                            ui.selectable_value(
                                &mut selection.indicator,
                                indicator,
                                format!("{} - {}", indicator, indicator.label()),
                            );
                        }
                    });
            });

            ui.add_space(5.0);

            ui.horizontal(|ui| {
                ui.add_sized([label_width, 20.0], egui::Label::new("Région :"));
                ComboBox::from_id_salt("region")
                    .width(combo_width)
                    .selected_text(selection.region.clone().unwrap_or_default())
                    .show_ui(ui, |ui| {
                        for region in &self.regions {
                            if ui
                                .selectable_label(selection.region.as_ref() == Some(region), region)
                                .clicked()
                            {
                                selection.region = Some(region.clone());
                            }
                        }
                    });
            });
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Export =====
        ui.vertical_centered(|ui| {
            ui.add_enabled_ui(has_table && !is_loading, |ui| {
                let button = egui::Button::new(RichText::new("🖼 Exporter en PNG").size(14.0))
                    .min_size(egui::vec2(180.0, 30.0));
                if ui.add(button).clicked() {
                    action = ControlPanelAction::ExportPng;
                }
            });
        });

        ui.add_space(15.0);
        ui.separator();
        ui.add_space(10.0);

        // ===== Status =====
        ui.label(RichText::new("📊 Statut").size(14.0).strong());
        ui.add_space(5.0);

        if is_loading {
            ui.horizontal(|ui| {
                ui.spinner();
                ui.label(RichText::new("Chargement…").size(11.0).color(Color32::GRAY));
            });
        }
        ui.label(RichText::new(&self.status).size(11.0).color(self.level.color()));

        action
    }
}

/// Actions triggered by control panel
#[derive(Debug, Clone, PartialEq)]
pub enum ControlPanelAction {
    None,
    BrowseFile,
    ReloadFallback,
    ExportPng,
}
