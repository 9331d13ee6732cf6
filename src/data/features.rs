//! Feature Engine
//! Types raw rows and derives SLA, timestamp and evening-stress features.
//!
//! Row-level problems never fail: unparsable cells fall back to the defaults
//! documented on [`OrderRecord`].
//!
//! Synthetic timestamps (used when the source order time is missing or
//! malformed) are generated from the row position. They have no historical
//! validity and only exist so hour-of-day views have something to bin.

use crate::data::loader::RawOrder;
use chrono::{Duration, NaiveDate, NaiveDateTime, Timelike};
use serde::Serialize;
use std::ops::RangeInclusive;

/// Delivery time above this many minutes breaches the SLA.
pub const SLA_THRESHOLD_MINUTES: f64 = 30.0;

/// Hours of day (inclusive) counted as the evening rush.
pub const EVENING_HOURS: RangeInclusive<u32> = 18..=23;

/// Spacing between consecutive synthetic order timestamps.
pub const SYNTHETIC_STEP_MINUTES: i64 = 20;

/// Label used when platform or category is missing.
pub const UNKNOWN_LABEL: &str = "Unknown";

const TIMESTAMP_FORMATS: [&str; 5] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%d-%m-%Y %H:%M",
    "%d/%m/%Y %H:%M",
    "%Y-%m-%dT%H:%M:%S",
];

/// A fully typed, enriched order.
///
/// Defaults: missing ids become `ROW-<n>` / empty, missing platform and
/// category become `Unknown`, unparsable numbers become `None`, flags become
/// `false`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderRecord {
    pub order_id: String,
    pub customer_id: String,
    pub platform: String,
    pub product_category: String,
    pub delivery_time_minutes: Option<f64>,
    pub rating: Option<f64>,
    pub order_value: Option<f64>,
    pub feedback: Option<String>,
    pub delivery_delay: bool,
    pub refund_requested: bool,
    pub order_time: NaiveDateTime,
    pub timestamp_synthetic: bool,
    pub hour: u32,
    pub sla_breach: bool,
    pub evening: bool,
}

impl OrderRecord {
    /// Rated 2 stars or lower. Unrated orders are never low-rated.
    pub fn is_low_rating(&self) -> bool {
        self.rating.is_some_and(|r| r <= 2.0)
    }
}

/// Derives typed records from raw rows.
pub struct FeatureEngine;

impl FeatureEngine {
    /// Enrich one raw row. `row_index` feeds the synthetic timestamp.
    pub fn enrich(raw: &RawOrder, row_index: usize) -> OrderRecord {
        let delivery_time_minutes = Self::parse_number(raw.delivery_time.as_deref());
        let (order_time, timestamp_synthetic) =
            match Self::parse_timestamp(raw.order_datetime.as_deref()) {
                Some(ts) => (ts, false),
                None => (Self::synthetic_timestamp(row_index), true),
            };
        let hour = order_time.hour();

        OrderRecord {
            order_id: raw
                .order_id
                .clone()
                .unwrap_or_else(|| format!("ROW-{}", row_index + 1)),
            customer_id: raw.customer_id.clone().unwrap_or_default(),
            platform: Self::label(raw.platform.as_deref()),
            product_category: Self::label(raw.product_category.as_deref()),
            delivery_time_minutes,
            rating: Self::parse_rating(raw.rating.as_deref()),
            order_value: Self::parse_number(raw.order_value.as_deref()),
            feedback: raw
                .feedback
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            delivery_delay: Self::parse_flag(raw.delivery_delay.as_deref()),
            refund_requested: Self::parse_flag(raw.refund_requested.as_deref()),
            order_time,
            timestamp_synthetic,
            hour,
            sla_breach: Self::is_sla_breach(delivery_time_minutes),
            evening: Self::is_evening(hour),
        }
    }

    /// True iff the delivery took strictly longer than the SLA threshold.
    pub fn is_sla_breach(delivery_time_minutes: Option<f64>) -> bool {
        delivery_time_minutes.is_some_and(|m| m > SLA_THRESHOLD_MINUTES)
    }

    pub fn is_evening(hour: u32) -> bool {
        EVENING_HOURS.contains(&hour)
    }

    /// Dirty yes/no text to bool. Anything unrecognized is `false`.
    pub fn parse_flag(value: Option<&str>) -> bool {
        matches!(
            value.map(|v| v.trim().to_lowercase()).as_deref(),
            Some("yes" | "y" | "true" | "1")
        )
    }

    /// Finite number or `None`.
    pub fn parse_number(value: Option<&str>) -> Option<f64> {
        value
            .and_then(|v| v.trim().parse::<f64>().ok())
            .filter(|v| v.is_finite())
    }

    /// Rating on the 1–5 scale; out-of-range values are dropped.
    pub fn parse_rating(value: Option<&str>) -> Option<f64> {
        Self::parse_number(value).filter(|r| (1.0..=5.0).contains(r))
    }

    pub fn parse_timestamp(value: Option<&str>) -> Option<NaiveDateTime> {
        let value = value?.trim();
        TIMESTAMP_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
    }

    /// 2024-01-01 00:00 plus `row_index` × 20 minutes.
    pub fn synthetic_timestamp(row_index: usize) -> NaiveDateTime {
        let epoch = NaiveDate::from_ymd_opt(2024, 1, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .unwrap_or_default();
        epoch + Duration::minutes(row_index as i64 * SYNTHETIC_STEP_MINUTES)
    }

    fn label(value: Option<&str>) -> String {
        value
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(UNKNOWN_LABEL)
            .to_string()
    }
}
