//! Carto Maroc Main Application
//! Main window with the control panel and the dashboard.

use crate::charts::{StaticChartRenderer, ViewComposer};
use crate::config::AppConfig;
use crate::data::{DataLoader, DataSource, LoadOutcome, RegionTable};
use crate::geo::GeometryAsset;
use crate::gui::{ControlPanel, ControlPanelAction, Dashboard, Selection, StatusLevel};
use egui::SidePanel;
use std::sync::mpsc::{channel, Receiver, TryRecvError};
use std::sync::Arc;
use std::thread;

/// Loading result from background thread
enum LoadResult {
    Progress(String),
    Finished(LoadOutcome),
}

/// Main application window.
pub struct CartoApp {
    config: AppConfig,
    geometry: Arc<GeometryAsset>,
    table: Option<RegionTable>,
    selection: Selection,
    control_panel: ControlPanel,

    // Async loading
    load_rx: Option<Receiver<LoadResult>>,
    is_loading: bool,
}

impl CartoApp {
    /// Starts fetching the fallback sheet right away.
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        config: AppConfig,
        geometry: Arc<GeometryAsset>,
    ) -> Self {
        let mut app = Self {
            config,
            geometry,
            table: None,
            selection: Selection::default(),
            control_panel: ControlPanel::new(),
            load_rx: None,
            is_loading: false,
        };
        let url = app.config.fallback_url();
        app.start_load(DataSource::Fallback(url));
        app
    }

    /// Load `source` in a background thread. Ignored while a load is running.
    fn start_load(&mut self, source: DataSource) {
        if self.is_loading {
            return;
        }

        let (tx, rx) = channel();
        self.load_rx = Some(rx);
        self.is_loading = true;
        self.control_panel
            .set_status(StatusLevel::Info, format!("Chargement : {}", source));

        let timeout = self.config.fetch_timeout();
        thread::spawn(move || {
            let _ = tx.send(LoadResult::Progress(format!("Lecture de {}…", source)));

            let outcome = match DataLoader::new(timeout) {
                Ok(loader) => loader.load(source),
                Err(reason) => LoadOutcome::SourceUnavailable { source, reason },
            };
            let _ = tx.send(LoadResult::Finished(outcome));
        });
    }

    fn handle_browse_file(&mut self) {
        if self.is_loading {
            return;
        }

        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Classeur Excel", &["xlsx"])
            .add_filter("CSV", &["csv"])
            .pick_file()
        {
            self.start_load(DataSource::Upload(path));
        }
    }

    /// Check for loading results
    fn check_load_results(&mut self) {
        let Some(rx) = self.load_rx.take() else {
            return;
        };

        loop {
            match rx.try_recv() {
                Ok(LoadResult::Progress(status)) => {
                    self.control_panel.set_status(StatusLevel::Info, status);
                }
                Ok(LoadResult::Finished(outcome)) => {
                    self.apply_outcome(outcome);
                    self.is_loading = false;
                    return;
                }
                Err(TryRecvError::Empty) => {
                    self.load_rx = Some(rx);
                    return;
                }
                Err(TryRecvError::Disconnected) => {
                    log::error!("Loader thread ended without a result");
                    self.control_panel
                        .set_status(StatusLevel::Error, "Le chargement a été interrompu.");
                    self.is_loading = false;
                    return;
                }
            }
        }
    }

    fn apply_outcome(&mut self, outcome: LoadOutcome) {
        let (level, status) = outcome_status(&outcome);
        self.control_panel.set_status(level, status);

        match outcome {
            LoadOutcome::Loaded { table, source } => {
                let regions = table.regions();
                self.selection.reconcile(&regions);
                self.control_panel.regions = regions;
                self.control_panel.source_label = Some(source_label(&source));
                self.table = Some(table);
            }
            LoadOutcome::SourceUnavailable { .. } => {
                self.table = None;
                self.selection.reconcile(&[]);
                self.control_panel.regions.clear();
                self.control_panel.source_label = None;
            }
        }
    }

    /// Render the current map and ranking to PNG, then open the folder.
    fn handle_export_png(&mut self) {
        let Some(table) = &self.table else {
            self.control_panel
                .set_status(StatusLevel::Error, "Aucune donnée à exporter.");
            return;
        };

        let result = ViewComposer::compose(table, &self.geometry, &self.selection)
            .map_err(|e| e.to_string())
            .and_then(|view| {
                StaticChartRenderer::export(&view, &self.geometry, &self.config.export_dir)
                    .map_err(|e| e.to_string())
            });

        match result {
            Ok(paths) => {
                self.control_panel.set_status(
                    StatusLevel::Success,
                    format!(
                        "{} image(s) exportée(s) dans {}",
                        paths.len(),
                        self.config.export_dir.display()
                    ),
                );
                if let Err(e) = open::that(&self.config.export_dir) {
                    log::warn!(
                        "Could not open {}: {}",
                        self.config.export_dir.display(),
                        e
                    );
                }
            }
            Err(e) => {
                log::error!("Export failed: {}", e);
                self.control_panel
                    .set_status(StatusLevel::Error, format!("Échec de l'export : {}", e));
            }
        }
    }
}

/// Status line shown after a load attempt.
fn outcome_status(outcome: &LoadOutcome) -> (StatusLevel, String) {
    match outcome {
        LoadOutcome::Loaded {
            source: DataSource::Upload(_),
            ..
        } => (StatusLevel::Success, "Fichier importé avec succès.".to_string()),
        LoadOutcome::Loaded {
            source: DataSource::Fallback(_),
            ..
        } => (
            StatusLevel::Success,
            "Données chargées automatiquement depuis Google Sheets.".to_string(),
        ),
        LoadOutcome::SourceUnavailable {
            source: DataSource::Fallback(_),
            reason,
        } if reason.is_network() => (
            StatusLevel::Error,
            format!("Merci d'importer un fichier. (Google Sheets injoignable : {})", reason),
        ),
        LoadOutcome::SourceUnavailable {
            source: DataSource::Fallback(_),
            reason,
        } => (
            StatusLevel::Error,
            format!("Merci d'importer un fichier. ({})", reason),
        ),
        LoadOutcome::SourceUnavailable {
            source: DataSource::Upload(_),
            reason,
        } => (StatusLevel::Error, format!("Fichier invalide : {}", reason)),
    }
}

fn source_label(source: &DataSource) -> String {
    match source {
        DataSource::Upload(path) => path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string()),
        DataSource::Fallback(_) => "Google Sheets".to_string(),
    }
}

impl eframe::App for CartoApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.check_load_results();

        if self.is_loading {
            ctx.request_repaint();
        }

        // Left panel - Control Panel
        SidePanel::left("control_panel")
            .min_width(300.0)
            .max_width(350.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    let before = self.selection.clone();
                    let action = self
                        .control_panel
                        .show(ui, &mut self.selection, self.is_loading);
                    if self.selection != before {
                        log::debug!("Selection changed: {:?}", self.selection);
                    }

                    match action {
                        ControlPanelAction::BrowseFile => self.handle_browse_file(),
                        ControlPanelAction::ReloadFallback => {
                            let url = self.config.fallback_url();
                            self.start_load(DataSource::Fallback(url));
                        }
                        ControlPanelAction::ExportPng => self.handle_export_png(),
                        ControlPanelAction::None => {}
                    }
                });
            });

        // Central panel - Dashboard
        let view = match &self.table {
            Some(table) => match ViewComposer::compose(table, &self.geometry, &self.selection) {
                Ok(view) => Some(view),
                Err(e) => {
                    let status = format!("Erreur de calcul : {}", e);
                    if self.control_panel.status != status {
                        log::error!("{}", status);
                        self.control_panel.set_status(StatusLevel::Error, status);
                    }
                    None
                }
            },
            None => None,
        };

        let message = if self.is_loading {
            "Chargement des données…"
        } else {
            self.control_panel.status.as_str()
        };

        egui::CentralPanel::default().show(ctx, |ui| {
            Dashboard::show(
                ui,
                view.as_ref(),
                &self.geometry,
                &self.config.currency_suffix,
                message,
            );
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fixtures::sample_table;
    use crate::data::LoaderError;
    use std::path::PathBuf;

    #[test]
    fn upload_success_message() {
        let outcome = LoadOutcome::Loaded {
            table: sample_table(),
            source: DataSource::Upload(PathBuf::from("/tmp/indicateurs.xlsx")),
        };
        assert_eq!(
            outcome_status(&outcome),
            (StatusLevel::Success, "Fichier importé avec succès.".to_string())
        );
    }

    #[test]
    fn fallback_messages() {
        let loaded = LoadOutcome::Loaded {
            table: sample_table(),
            source: DataSource::Fallback("https://example.org".to_string()),
        };
        assert_eq!(
            outcome_status(&loaded).1,
            "Données chargées automatiquement depuis Google Sheets."
        );

        let failed = LoadOutcome::SourceUnavailable {
            source: DataSource::Fallback("https://example.org".to_string()),
            reason: LoaderError::HttpStatus { status: 404 },
        };
        let (level, status) = outcome_status(&failed);
        assert_eq!(level, StatusLevel::Error);
        assert!(status.starts_with("Merci d'importer un fichier."));
        assert!(status.contains("404"));
    }

    #[test]
    fn upload_label_is_the_file_name() {
        let source = DataSource::Upload(PathBuf::from("/data/indicateurs_2024.xlsx"));
        assert_eq!(source_label(&source), "indicateurs_2024.xlsx");
        assert_eq!(
            source_label(&DataSource::Fallback(String::new())),
            "Google Sheets"
        );
    }
}
