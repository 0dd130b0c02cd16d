//! Carto Maroc - Interactive map & charts of regional economic indicators
//!
//! Shows CA, VA, LA and RA for the 12 regions of Morocco as a choropleth,
//! a share pie, a ranking and a per-region detail table.

mod charts;
mod config;
mod data;
mod geo;
mod gui;

use anyhow::{anyhow, Context};
use config::{AppConfig, CONFIG_FILE};
use eframe::egui;
use geo::GeometryAsset;
use gui::CartoApp;
use std::path::Path;
use std::sync::Arc;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Starting Carto Maroc {}", env!("CARGO_PKG_VERSION"));

    let config = AppConfig::load_or_default(Path::new(CONFIG_FILE))
        .with_context(|| format!("Invalid configuration in {}", CONFIG_FILE))?;

    let geometry = GeometryAsset::load(&config.geometry_path).with_context(|| {
        format!(
            "Cannot load region boundaries from {}",
            config.geometry_path.display()
        )
    });
    let geometry = match geometry {
        Ok(geometry) => Arc::new(geometry),
        Err(e) => {
            log::error!("{:#}", e);
            return Err(e);
        }
    };

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([1100.0, 700.0])
            .with_title("Cartographie Maroc 2024"),
        ..Default::default()
    };

    eframe::run_native(
        "Cartographie Maroc 2024",
        options,
        Box::new(move |cc| Ok(Box::new(CartoApp::new(cc, config, geometry)))),
    )
    .map_err(|e| anyhow!("{e}"))
}
