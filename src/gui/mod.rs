//! GUI module - User interface components

mod app;
mod control_panel;
mod dashboard;

pub use app::CartoApp;
pub use control_panel::{ControlPanel, ControlPanelAction, StatusLevel};
pub use dashboard::Dashboard;
pub use crate::charts::Selection;
