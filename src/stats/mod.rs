//! Stats module - aggregation and significance testing

mod aggregator;
mod calculator;

pub use aggregator::{
    Aggregator, DashboardSummary, EveningComparison, GroupRate, HistogramBucket, HourCount, Kpis,
    LabeledValue, RatingImpact, HISTOGRAM_BINS,
};
pub use calculator::{GroupStats, StatsCalculator, TTestResult, SIGNIFICANCE_THRESHOLD};
