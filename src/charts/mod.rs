//! Charts module - view composition and chart rendering

mod composer;
mod plotter;
mod renderer;
mod scale;
mod selection;

pub use composer::{DashboardView, ViewComposer};
pub use plotter::ChartPlotter;
pub use renderer::StaticChartRenderer;
pub use selection::Selection;
