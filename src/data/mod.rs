//! Data module - CSV loading, feature engineering and filtering

mod dataset;
mod features;
mod filter;
mod loader;

pub use dataset::{Dataset, LoadReport};
pub use features::{
    FeatureEngine, OrderRecord, EVENING_HOURS, SLA_THRESHOLD_MINUTES, SYNTHETIC_STEP_MINUTES,
    UNKNOWN_LABEL,
};
pub use filter::{DashboardFilter, Selection};
pub use loader::{columns, normalize_header, DataLoader, LoaderError, RawOrder};

#[cfg(test)]
pub(crate) mod testing {
    use super::{FeatureEngine, OrderRecord, RawOrder};

    /// Build an enriched record the way the loader would.
    pub fn order(
        platform: &str,
        category: &str,
        minutes: Option<f64>,
        rating: Option<f64>,
    ) -> OrderRecord {
        let raw = RawOrder {
            platform: Some(platform.to_string()),
            product_category: Some(category.to_string()),
            delivery_time: minutes.map(|m| m.to_string()),
            rating: rating.map(|r| r.to_string()),
            ..Default::default()
        };
        FeatureEngine::enrich(&raw, 0)
    }
}
