//! Charts module - Chart description and rendering

mod plotter;
mod renderer;

pub use plotter::{ChartData, ChartKind, ChartPlotter, PALETTE, PRIMARY_COLOR};
pub use renderer::{ChartError, StaticChartRenderer};
