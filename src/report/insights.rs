//! Executive insights: the narrative panel and the downloadable text summary.

use crate::data::DashboardFilter;
use crate::nlp::ComplaintPhrase;
use crate::stats::{DashboardSummary, RatingImpact};
use serde::Serialize;

pub const INSIGHTS_FILE_NAME: &str = "quick_commerce_insights.txt";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsightSection {
    pub heading: String,
    pub bullets: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecutiveInsights {
    pub sections: Vec<InsightSection>,
}

impl ExecutiveInsights {
    pub fn from_summary(summary: &DashboardSummary, phrases: &[ComplaintPhrase]) -> Self {
        let kpis = &summary.kpis;
        if kpis.total_orders == 0 {
            return Self {
                sections: vec![InsightSection {
                    heading: "Operational Performance".to_string(),
                    bullets: vec!["No orders match the current selection.".to_string()],
                }],
            };
        }

        let mut operational = vec![format!(
            "{:.1}% of orders breach the 30-minute SLA (average delivery {:.1} min, p95 {:.1} min).",
            kpis.sla_breach_rate * 100.0,
            kpis.avg_delivery_minutes,
            summary.delivery_profile.p95,
        )];
        operational.push(match summary.evening_stress.first() {
            Some(top) => format!(
                "Evening hours (6-11 PM) show the highest delivery stress on {} ({:.1} min average); evening breach rate {:.1}% vs {:.1}% otherwise.",
                top.label,
                top.value,
                summary.evening.evening_breach_rate * 100.0,
                summary.evening.other_breach_rate * 100.0,
            ),
            None => "No evening orders in the current selection.".to_string(),
        });
        if summary.synthetic_timestamp_orders > 0 {
            operational.push(format!(
                "Hour-of-day figures use synthetic timestamps for {} orders and carry no historical validity.",
                summary.synthetic_timestamp_orders
            ));
        }

        let mut experience = vec![
            Self::impact_sentence("Delivery delays", summary.delay_impact.as_ref()),
            Self::impact_sentence("Refund requests", summary.refund_impact.as_ref()),
        ];
        if let (Some(delay), Some(refund)) = (&summary.delay_impact, &summary.refund_impact) {
            if refund.difference < delay.difference {
                experience.push(
                    "Refunds are a stronger dissatisfaction signal than delays.".to_string(),
                );
            } else if delay.difference < refund.difference {
                experience.push(
                    "Delays are a stronger dissatisfaction signal than refunds.".to_string(),
                );
            }
        }

        let complaints = if phrases.is_empty() {
            vec!["No recurring complaint phrases among low-rated orders.".to_string()]
        } else {
            let top: Vec<String> = phrases
                .iter()
                .take(3)
                .map(|p| format!("\"{}\" ({})", p.phrase, p.count))
                .collect();
            vec![format!(
                "Most frequent complaint phrases in low-rated reviews: {}.",
                top.join(", ")
            )]
        };

        Self {
            sections: vec![
                InsightSection {
                    heading: "Operational Performance".to_string(),
                    bullets: operational,
                },
                InsightSection {
                    heading: "Customer Experience Drivers".to_string(),
                    bullets: experience,
                },
                InsightSection {
                    heading: "Complaint Root Causes".to_string(),
                    bullets: complaints,
                },
            ],
        }
    }

    fn impact_sentence(subject: &str, impact: Option<&RatingImpact>) -> String {
        let Some(impact) = impact else {
            return format!("{subject}: not enough rated orders to compare.");
        };
        let significance = match impact.p_value {
            Some(p) if impact.significant => format!(" (significant, p = {p:.3})"),
            Some(p) => format!(" (not significant, p = {p:.3})"),
            None => String::new(),
        };
        if impact.difference < 0.0 {
            format!(
                "{subject} reduce average ratings by {:.2} stars{significance}.",
                -impact.difference
            )
        } else {
            format!(
                "{subject} do not lower average ratings ({:+.2} stars){significance}.",
                impact.difference
            )
        }
    }

    /// Plain-text export of the insights.
    pub fn to_text(&self, filter: &DashboardFilter, summary: &DashboardSummary) -> String {
        let kpis = &summary.kpis;
        let mut text = String::from("Quick Commerce Delivery Intelligence - Key Insights\n");
        text.push_str(&format!("Selection: {}\n\n", filter.describe()));
        text.push_str(&format!("Total orders: {}\n", kpis.total_orders));
        text.push_str(&format!(
            "SLA breach rate: {:.2}%\n",
            kpis.sla_breach_rate * 100.0
        ));
        text.push_str(&format!(
            "Average delivery time: {:.1} min\n",
            kpis.avg_delivery_minutes
        ));
        text.push_str(&format!("Average rating: {:.2}\n", kpis.avg_rating));
        text.push_str(&format!("Refund rate: {:.2}%\n", kpis.refund_rate * 100.0));

        for section in &self.sections {
            text.push_str(&format!("\n{}\n", section.heading));
            for bullet in &section.bullets {
                text.push_str(&format!("- {bullet}\n"));
            }
        }
        text
    }
}
