//! Server-rendered HTML for the dashboard page.

use crate::charts::{ChartData, StaticChartRenderer};
use crate::dashboard::{DashboardView, DASHBOARD_TITLE};
use crate::data::Selection;
use crate::web::app::DashboardOptions;
use std::fmt::Write;
use tracing::warn;

const CHART_SIZE: (u32, u32) = (460, 320);

const STYLE: &str = r#"
body { font-family: sans-serif; margin: 0; background: #f4f6f8; color: #2c3e50; }
header { background: #2c3e50; color: #fff; padding: 16px 24px; }
main { padding: 16px 24px; }
form.filters { display: flex; gap: 16px; align-items: end; margin-bottom: 16px; }
.kpis { display: grid; grid-template-columns: repeat(5, 1fr); gap: 12px; }
.kpi { background: #fff; border-radius: 6px; padding: 12px; }
.kpi .value { font-size: 1.6em; font-weight: bold; }
.charts { display: grid; grid-template-columns: repeat(auto-fill, minmax(470px, 1fr)); gap: 12px; margin-top: 16px; }
.chart { background: #fff; border-radius: 6px; padding: 8px; min-height: 120px; }
.chart.empty { color: #7f8c8d; }
table { border-collapse: collapse; background: #fff; }
td, th { border: 1px solid #ddd; padding: 4px 10px; text-align: left; }
.note { color: #7f8c8d; font-size: 0.9em; }
"#;

/// Full dashboard page for one view.
pub fn render_dashboard(view: &DashboardView, options: &DashboardOptions) -> String {
    let mut html = String::new();
    let _ = write!(
        html,
        "<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\"><title>{title}</title><style>{STYLE}</style></head><body><header><h1>{title}</h1></header><main>",
        title = escape_html(DASHBOARD_TITLE)
    );

    html.push_str(&filter_form(view, options));
    html.push_str(&kpi_cards(view));

    html.push_str("<section class=\"charts\">");
    for chart in view.charts() {
        html.push_str(&chart_panel(&chart));
    }
    html.push_str("</section>");

    html.push_str(&complaint_table(view));
    html.push_str(&insights_panel(view));
    html.push_str(&downloads(view));

    if view.summary.synthetic_timestamp_orders > 0 {
        let _ = write!(
            html,
            "<p class=\"note\">Order times for {} orders are synthetic (generated from row order) and have no historical validity.</p>",
            view.summary.synthetic_timestamp_orders
        );
    }

    html.push_str("</main></body></html>");
    html
}

fn filter_form(view: &DashboardView, options: &DashboardOptions) -> String {
    format!(
        "<form class=\"filters\" method=\"get\" action=\"/\">{}{}<button type=\"submit\">Apply</button></form>",
        select("platform", "Platform", &options.platforms, &view.filter.platform),
        select("category", "Product Category", &options.categories, &view.filter.category),
    )
}

fn select(name: &str, label: &str, values: &[String], current: &Selection) -> String {
    let mut html = format!("<label>{label}<br><select name=\"{name}\"><option value=\"all\">All</option>");
    for value in values {
        let selected = if current.value() == Some(value.as_str()) {
            " selected"
        } else {
            ""
        };
        let escaped = escape_html(value);
        let _ = write!(html, "<option value=\"{escaped}\"{selected}>{escaped}</option>");
    }
    html.push_str("</select></label>");
    html
}

fn kpi_cards(view: &DashboardView) -> String {
    let kpis = &view.summary.kpis;
    let cards = [
        ("Total Orders", kpis.total_orders.to_string()),
        ("SLA Breach %", format!("{:.1}%", kpis.sla_breach_rate * 100.0)),
        ("Avg Delivery Time", format!("{:.1} min", kpis.avg_delivery_minutes)),
        ("Avg Rating", format!("{:.2}", kpis.avg_rating)),
        ("Refund Rate", format!("{:.1}%", kpis.refund_rate * 100.0)),
    ];

    let mut html = String::from("<section class=\"kpis\">");
    for (label, value) in cards {
        let _ = write!(
            html,
            "<div class=\"kpi\"><div class=\"label\">{label}</div><div class=\"value\">{value}</div></div>"
        );
    }
    html.push_str("</section>");
    html
}

fn chart_panel(chart: &ChartData) -> String {
    let title = escape_html(&chart.title);
    if chart.is_empty() {
        return format!(
            "<div class=\"chart empty\" id=\"{}\"><h3>{title}</h3><p>No data for the selected filters.</p></div>",
            chart.id
        );
    }

    let (width, height) = CHART_SIZE;
    match StaticChartRenderer::render_svg(chart, width, height) {
        Ok(svg) => format!("<div class=\"chart\" id=\"{}\">{svg}</div>", chart.id),
        Err(err) => {
            warn!(chart = chart.id, error = %err, "chart rendering failed");
            format!(
                "<div class=\"chart empty\" id=\"{}\"><h3>{title}</h3><p>Chart unavailable.</p></div>",
                chart.id
            )
        }
    }
}

fn complaint_table(view: &DashboardView) -> String {
    let mut html = String::from("<section><h2>Complaint Phrases (ratings 2 and below)</h2>");
    if view.complaints.is_empty() {
        html.push_str("<p class=\"note\">No complaint phrases for the selected filters.</p>");
    } else {
        html.push_str("<table><tr><th>Complaint Phrase</th><th>Frequency</th></tr>");
        for phrase in &view.complaints {
            let _ = write!(
                html,
                "<tr><td>{}</td><td>{}</td></tr>",
                escape_html(&phrase.phrase),
                phrase.count
            );
        }
        html.push_str("</table>");
    }
    html.push_str("</section>");
    html
}

fn insights_panel(view: &DashboardView) -> String {
    let mut html = String::from("<section><h2>Executive Insights</h2>");
    for section in &view.insights.sections {
        let _ = write!(html, "<h3>{}</h3><ul>", escape_html(&section.heading));
        for bullet in &section.bullets {
            let _ = write!(html, "<li>{}</li>", escape_html(bullet));
        }
        html.push_str("</ul>");
    }
    html.push_str("</section>");
    html
}

/// Download buttons; the current filter travels as hidden form fields.
fn downloads(view: &DashboardView) -> String {
    let hidden = format!(
        "<input type=\"hidden\" name=\"platform\" value=\"{}\"><input type=\"hidden\" name=\"category\" value=\"{}\">",
        escape_html(view.filter.platform.value().unwrap_or("all")),
        escape_html(view.filter.category.value().unwrap_or("all")),
    );
    format!(
        "<section><h2>Download Insights</h2>\
         <form method=\"get\" action=\"/download/insights.txt\">{hidden}<button type=\"submit\">Executive insights (.txt)</button></form>\
         <form method=\"get\" action=\"/download/report.pptx\">{hidden}<button type=\"submit\">Summary deck (.pptx)</button></form>\
         </section>"
    )
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{DashboardFilter, Dataset, RawOrder};

    fn view_for(platform: Option<&str>) -> (DashboardView, DashboardOptions) {
        let rows = vec![
            RawOrder {
                platform: Some("Blinkit".into()),
                product_category: Some("Fruits & Vegetables".into()),
                delivery_time: Some("35".into()),
                rating: Some("1".into()),
                feedback: Some("Rotten tomatoes, <b>again</b>".into()),
                ..Default::default()
            },
            RawOrder {
                platform: Some("Zepto".into()),
                product_category: Some("Dairy".into()),
                delivery_time: Some("20".into()),
                rating: Some("5".into()),
                ..Default::default()
            },
        ];
        let dataset = Dataset::from_raw(&rows);
        let options = DashboardOptions {
            platforms: dataset.platforms(),
            categories: dataset.categories(),
        };
        let view = DashboardView::compute(&dataset, DashboardFilter::from_query(platform, None), 10);
        (view, options)
    }

    #[test]
    fn page_shows_kpis_phrases_and_escaped_labels() {
        let (view, options) = view_for(None);
        let html = render_dashboard(&view, &options);
        assert!(html.contains("<div class=\"value\">2</div>"));
        assert!(html.contains("50.0%"));
        assert!(html.contains("Fruits &amp; Vegetables"));
        assert!(html.contains("<td>rotten tomatoes</td>"));
        assert!(!html.contains("<b>again</b>"));
        assert!(html.contains("synthetic"));
    }

    #[test]
    fn selected_platform_is_marked_and_forwarded_to_downloads() {
        let (view, options) = view_for(Some("Zepto"));
        let html = render_dashboard(&view, &options);
        assert!(html.contains("<option value=\"Zepto\" selected>Zepto</option>"));
        assert!(html.contains("<input type=\"hidden\" name=\"platform\" value=\"Zepto\">"));
    }

    #[test]
    fn unmatched_filter_renders_empty_panels() {
        let (view, options) = view_for(Some("Instamart"));
        let html = render_dashboard(&view, &options);
        assert!(html.contains("<div class=\"value\">0</div>"));
        assert!(html.contains("No data for the selected filters."));
        assert!(html.contains("No complaint phrases"));
        assert!(html.contains("No orders match the current selection."));
    }
}
