//! Command-line / environment configuration. Every option has a default.

use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(
    name = "delivery-insights",
    version,
    about = "Quick-commerce delivery analytics dashboard"
)]
pub struct DashboardConfig {
    /// CSV dataset to load at startup
    #[arg(
        long,
        env = "DELIVERY_INSIGHTS_DATA",
        default_value = "Ecommerce_Delivery_Analytics_New.csv"
    )]
    pub data: PathBuf,

    /// Address the dashboard listens on
    #[arg(long, env = "DELIVERY_INSIGHTS_BIND", default_value = "127.0.0.1:8501")]
    pub bind: String,

    /// Number of complaint phrases to show
    #[arg(long, env = "DELIVERY_INSIGHTS_TOP_PHRASES", default_value_t = crate::nlp::DEFAULT_TOP_N)]
    pub top_phrases: usize,

    /// Emit logs as JSON lines
    #[arg(long, env = "DELIVERY_INSIGHTS_LOG_JSON", default_value_t = false)]
    pub log_json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runs_without_flags() {
        let config = DashboardConfig::try_parse_from(["delivery-insights"]).expect("defaults");
        assert_eq!(config.bind, "127.0.0.1:8501");
        assert_eq!(config.top_phrases, 10);
        assert!(!config.log_json);
    }

    #[test]
    fn flags_override_defaults() {
        let config = DashboardConfig::try_parse_from([
            "delivery-insights",
            "--data",
            "orders.csv",
            "--top-phrases",
            "5",
            "--log-json",
        ])
        .expect("flags");
        assert_eq!(config.data, PathBuf::from("orders.csv"));
        assert_eq!(config.top_phrases, 5);
        assert!(config.log_json);
    }
}
