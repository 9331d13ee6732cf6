//! The loaded, read-only dataset handle.

use crate::data::features::{FeatureEngine, OrderRecord};
use crate::data::filter::DashboardFilter;
use crate::data::loader::{DataLoader, LoaderError, RawOrder};
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{info, warn};

/// Counts of cells that were defaulted while typing the dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub rows: usize,
    pub missing_delivery_time: usize,
    pub missing_rating: usize,
    pub missing_feedback: usize,
    pub synthetic_timestamps: usize,
}

impl LoadReport {
    fn from_records(records: &[OrderRecord]) -> Self {
        let mut report = LoadReport {
            rows: records.len(),
            ..Default::default()
        };
        for r in records {
            report.missing_delivery_time += usize::from(r.delivery_time_minutes.is_none());
            report.missing_rating += usize::from(r.rating.is_none());
            report.missing_feedback += usize::from(r.feedback.is_none());
            report.synthetic_timestamps += usize::from(r.timestamp_synthetic);
        }
        report
    }
}

/// Enriched orders, loaded once and never mutated.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<OrderRecord>,
    report: LoadReport,
}

impl Dataset {
    /// Read and enrich the CSV at `path`. File-level problems are fatal.
    pub fn load(path: &Path) -> Result<Self, LoaderError> {
        let rows = DataLoader::load_csv(path)?;
        let dataset = Self::from_raw(&rows);
        let report = dataset.report();

        info!(
            rows = report.rows,
            platforms = dataset.platforms().len(),
            categories = dataset.categories().len(),
            "dataset ready"
        );
        if report.missing_delivery_time > 0 || report.missing_rating > 0 {
            warn!(
                missing_delivery_time = report.missing_delivery_time,
                missing_rating = report.missing_rating,
                "rows with unparsable numeric cells kept with defaults"
            );
        }
        if report.synthetic_timestamps > 0 {
            warn!(
                synthetic = report.synthetic_timestamps,
                "order timestamps synthesized; hour-of-day views have no historical validity"
            );
        }

        Ok(dataset)
    }

    pub fn from_raw(rows: &[RawOrder]) -> Self {
        let records: Vec<OrderRecord> = rows
            .iter()
            .enumerate()
            .map(|(i, raw)| FeatureEngine::enrich(raw, i))
            .collect();
        Self::from_records(records)
    }

    pub fn from_records(records: Vec<OrderRecord>) -> Self {
        let report = LoadReport::from_records(&records);
        Self { records, report }
    }

    pub fn records(&self) -> &[OrderRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn report(&self) -> &LoadReport {
        &self.report
    }

    pub fn filtered(&self, filter: &DashboardFilter) -> Vec<&OrderRecord> {
        filter.apply(&self.records)
    }

    /// Distinct platforms, sorted.
    pub fn platforms(&self) -> Vec<String> {
        Self::distinct(self.records.iter().map(|r| r.platform.as_str()))
    }

    /// Distinct product categories, sorted.
    pub fn categories(&self) -> Vec<String> {
        Self::distinct(self.records.iter().map(|r| r.product_category.as_str()))
    }

    fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
        values
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect()
    }
}
