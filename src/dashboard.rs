//! One recomputation of the whole pipeline for a filter state.

use crate::charts::{ChartData, ChartPlotter, StaticChartRenderer};
use crate::data::{DashboardFilter, Dataset};
use crate::nlp::{ComplaintExtractor, ComplaintPhrase};
use crate::report::{ChartImage, DeckExporter, ExecutiveInsights, ReportError};
use crate::stats::{Aggregator, DashboardSummary};
use serde::Serialize;
use tracing::{debug, warn};

pub const DASHBOARD_TITLE: &str = "Quick Commerce Delivery Intelligence";

const DECK_CHART_SIZE: (u32, u32) = (800, 600);

/// Aggregates, complaint phrases and insights for one filter state.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub filter: DashboardFilter,
    pub summary: DashboardSummary,
    pub complaints: Vec<ComplaintPhrase>,
    pub insights: ExecutiveInsights,
}

impl DashboardView {
    pub fn compute(dataset: &Dataset, filter: DashboardFilter, top_phrases: usize) -> Self {
        let subset = dataset.filtered(&filter);
        debug!(
            filter = %filter.describe(),
            matched = subset.len(),
            total = dataset.len(),
            "recomputing dashboard"
        );

        let summary = Aggregator::summarize(&subset);
        let complaints = ComplaintExtractor::new(top_phrases).extract(&subset);
        let insights = ExecutiveInsights::from_summary(&summary, &complaints);

        Self {
            filter,
            summary,
            complaints,
            insights,
        }
    }

    pub fn charts(&self) -> Vec<ChartData> {
        ChartPlotter::dashboard_charts(&self.summary)
    }

    pub fn insights_text(&self) -> String {
        self.insights.to_text(&self.filter, &self.summary)
    }

    /// Build the `.pptx` summary. Charts that cannot be drawn are left out.
    pub fn deck(&self) -> Result<Vec<u8>, ReportError> {
        let (width, height) = DECK_CHART_SIZE;
        let images: Vec<ChartImage> = self
            .charts()
            .iter()
            .filter(|chart| !chart.is_empty())
            .filter_map(|chart| match StaticChartRenderer::render_png(chart, width, height) {
                Ok(png) => Some(ChartImage {
                    title: chart.title.clone(),
                    png,
                }),
                Err(err) => {
                    warn!(chart = chart.id, error = %err, "chart left out of deck");
                    None
                }
            })
            .collect();

        DeckExporter::build(DASHBOARD_TITLE, &self.filter.describe(), &self.insights, &images)
    }
}
