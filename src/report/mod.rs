//! Report module - executive insights and downloadable summaries

mod deck;
mod insights;

pub use deck::{ChartImage, DeckExporter, ReportError, DECK_FILE_NAME};
pub use insights::{ExecutiveInsights, InsightSection, INSIGHTS_FILE_NAME};
