//! Chart Plotter Module
//! Turns a dashboard summary into renderer-neutral chart descriptions.

use crate::stats::DashboardSummary;
use plotters::style::RGBColor;
use serde::Serialize;

pub const PRIMARY_COLOR: RGBColor = RGBColor(52, 152, 219); // Blue

pub const PALETTE: [RGBColor; 6] = [
    RGBColor(231, 76, 60),  // Red
    RGBColor(46, 204, 113), // Green
    RGBColor(155, 89, 182), // Purple
    RGBColor(243, 156, 18), // Orange
    RGBColor(26, 188, 156), // Teal
    RGBColor(96, 125, 139), // Blue Grey
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Bar,
    Histogram,
    Line,
}

/// One chart: a title, axis descriptions and labelled points in x order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub id: &'static str,
    pub title: String,
    pub kind: ChartKind,
    pub x_desc: String,
    pub y_desc: String,
    pub points: Vec<(String, f64)>,
}

impl ChartData {
    fn new(
        id: &'static str,
        title: &str,
        kind: ChartKind,
        axes: (&str, &str),
        points: Vec<(String, f64)>,
    ) -> Self {
        Self {
            id,
            title: title.to_string(),
            kind,
            x_desc: axes.0.to_string(),
            y_desc: axes.1.to_string(),
            points,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn max_value(&self) -> f64 {
        self.points.iter().map(|(_, v)| *v).fold(0.0, f64::max)
    }

    /// Fill color: the fixed primary for single-series charts, palette by index otherwise.
    pub fn color(&self, index: usize) -> RGBColor {
        match self.kind {
            ChartKind::Bar if self.points.len() > 1 => PALETTE[index % PALETTE.len()],
            _ => PRIMARY_COLOR,
        }
    }
}

pub struct ChartPlotter;

impl ChartPlotter {
    /// The fixed chart set of the dashboard, in display order.
    pub fn dashboard_charts(summary: &DashboardSummary) -> Vec<ChartData> {
        let labeled = |values: &[crate::stats::LabeledValue]| -> Vec<(String, f64)> {
            values.iter().map(|v| (v.label.clone(), v.value)).collect()
        };

        vec![
            ChartData::new(
                "sla_status",
                "SLA Breach Distribution",
                ChartKind::Bar,
                ("SLA Status", "Orders"),
                labeled(&summary.sla_status),
            ),
            ChartData::new(
                "rating_by_platform",
                "Avg Rating by Platform",
                ChartKind::Bar,
                ("Platform", "Rating"),
                labeled(&summary.rating_by_platform),
            ),
            ChartData::new(
                "breach_rate_by_platform",
                "SLA Breach Rate by Platform",
                ChartKind::Bar,
                ("Platform", "Breach rate"),
                summary
                    .breach_rate_by_platform
                    .iter()
                    .map(|g| (g.group.clone(), g.rate))
                    .collect(),
            ),
            ChartData::new(
                "delivery_histogram",
                "Delivery Time Distribution",
                ChartKind::Histogram,
                ("Delivery time (min)", "Orders"),
                summary
                    .delivery_histogram
                    .iter()
                    .map(|b| (b.label(), b.count as f64))
                    .collect(),
            ),
            ChartData::new(
                "rating_by_delay",
                "Rating vs Delivery Delay",
                ChartKind::Bar,
                ("Delivery delay", "Rating"),
                labeled(&summary.rating_by_delay),
            ),
            ChartData::new(
                "rating_by_refund",
                "Rating vs Refund",
                ChartKind::Bar,
                ("Refund", "Rating"),
                labeled(&summary.rating_by_refund),
            ),
            ChartData::new(
                "evening_stress",
                "Evening Delivery Stress",
                ChartKind::Bar,
                ("Platform", "Avg delivery time (min)"),
                labeled(&summary.evening_stress),
            ),
            ChartData::new(
                "hourly_orders",
                "Orders by Hour of Day",
                ChartKind::Line,
                ("Hour", "Orders"),
                summary
                    .hourly_orders
                    .iter()
                    .map(|h| (h.hour.to_string(), h.orders as f64))
                    .collect(),
            ),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::testing::order;
    use crate::stats::Aggregator;

    #[test]
    fn empty_summary_gives_empty_charts() {
        let charts = ChartPlotter::dashboard_charts(&DashboardSummary::default());
        assert_eq!(charts.len(), 8);
        assert!(charts.iter().all(ChartData::is_empty));
    }

    #[test]
    fn charts_follow_summary_values() {
        let records = vec![
            order("Blinkit", "Dairy", Some(20.0), Some(4.0)),
            order("Zepto", "Dairy", Some(35.0), Some(2.0)),
        ];
        let refs: Vec<_> = records.iter().collect();
        let charts = ChartPlotter::dashboard_charts(&Aggregator::summarize(&refs));

        let sla = charts.iter().find(|c| c.id == "sla_status").expect("sla chart");
        assert_eq!(
            sla.points,
            vec![("Within SLA".to_string(), 1.0), ("Breached".to_string(), 1.0)]
        );
        let hourly = charts.iter().find(|c| c.id == "hourly_orders").expect("hourly chart");
        assert_eq!(hourly.kind, ChartKind::Line);
        assert_eq!(hourly.points.len(), 24);
        assert_eq!(hourly.max_value(), 2.0);
    }
}
