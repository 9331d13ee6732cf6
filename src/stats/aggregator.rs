//! Aggregator
//! Grouped counts and means over a (filtered) set of orders.

use crate::data::OrderRecord;
use crate::stats::calculator::{GroupStats, StatsCalculator};
use serde::Serialize;
use std::collections::BTreeMap;

/// Bucket count of the delivery-time histogram.
pub const HISTOGRAM_BINS: usize = 20;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Kpis {
    pub total_orders: usize,
    pub sla_breach_rate: f64,
    pub avg_delivery_minutes: f64,
    pub avg_rating: f64,
    pub refund_rate: f64,
    pub delay_rate: f64,
}

/// A single bar: category label and its value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabeledValue {
    pub label: String,
    pub value: f64,
}

impl LabeledValue {
    fn new(label: impl Into<String>, value: f64) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupRate {
    pub group: String,
    pub orders: usize,
    pub breaches: usize,
    pub rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBucket {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

impl HistogramBucket {
    pub fn label(&self) -> String {
        format!("{:.0}-{:.0}", self.lower, self.upper)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourCount {
    pub hour: u32,
    pub orders: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EveningComparison {
    pub evening_orders: usize,
    pub evening_breach_rate: f64,
    pub other_orders: usize,
    pub other_breach_rate: f64,
}

/// Mean rating of flagged orders minus mean rating of the rest.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingImpact {
    pub flagged_mean: f64,
    pub unflagged_mean: f64,
    pub difference: f64,
    pub p_value: Option<f64>,
    pub significant: bool,
}

/// Everything the dashboard shows for one filter state.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub kpis: Kpis,
    pub delivery_profile: GroupStats,
    pub sla_status: Vec<LabeledValue>,
    pub breach_rate_by_platform: Vec<GroupRate>,
    pub rating_by_platform: Vec<LabeledValue>,
    pub delivery_histogram: Vec<HistogramBucket>,
    pub hourly_orders: Vec<HourCount>,
    pub rating_by_delay: Vec<LabeledValue>,
    pub rating_by_refund: Vec<LabeledValue>,
    pub evening: EveningComparison,
    pub evening_stress: Vec<LabeledValue>,
    pub delay_impact: Option<RatingImpact>,
    pub refund_impact: Option<RatingImpact>,
    pub synthetic_timestamp_orders: usize,
}

pub struct Aggregator;

impl Aggregator {
    pub fn summarize(records: &[&OrderRecord]) -> DashboardSummary {
        let delivery_times: Vec<f64> = records
            .iter()
            .filter_map(|r| r.delivery_time_minutes)
            .collect();

        DashboardSummary {
            kpis: Self::kpis(records),
            delivery_profile: StatsCalculator::compute_descriptive_stats(&delivery_times),
            sla_status: Self::sla_status(records),
            breach_rate_by_platform: Self::breach_rate_by_platform(records),
            rating_by_platform: Self::rating_by_platform(records),
            delivery_histogram: Self::histogram(&delivery_times, HISTOGRAM_BINS),
            hourly_orders: Self::hourly_orders(records),
            rating_by_delay: Self::rating_by_flag(
                records,
                |r| r.delivery_delay,
                ("No Delay", "Delayed"),
            ),
            rating_by_refund: Self::rating_by_flag(
                records,
                |r| r.refund_requested,
                ("No Refund", "Refund Requested"),
            ),
            evening: Self::evening_comparison(records),
            evening_stress: Self::evening_stress(records),
            delay_impact: Self::rating_impact(records, |r| r.delivery_delay),
            refund_impact: Self::rating_impact(records, |r| r.refund_requested),
            synthetic_timestamp_orders: records.iter().filter(|r| r.timestamp_synthetic).count(),
        }
    }

    pub fn kpis(records: &[&OrderRecord]) -> Kpis {
        let total = records.len();
        let count = |pred: fn(&OrderRecord) -> bool| records.iter().filter(|r| pred(r)).count();

        Kpis {
            total_orders: total,
            sla_breach_rate: Self::breach_rate(records),
            avg_delivery_minutes: Self::mean_of(records.iter().filter_map(|r| r.delivery_time_minutes)),
            avg_rating: Self::mean_of(records.iter().filter_map(|r| r.rating)),
            refund_rate: StatsCalculator::rate(count(|r| r.refund_requested), total),
            delay_rate: StatsCalculator::rate(count(|r| r.delivery_delay), total),
        }
    }

    /// Breaches over all rows; 0 when there are no rows.
    pub fn breach_rate(records: &[&OrderRecord]) -> f64 {
        let breaches = records.iter().filter(|r| r.sla_breach).count();
        StatsCalculator::rate(breaches, records.len())
    }

    pub fn sla_status(records: &[&OrderRecord]) -> Vec<LabeledValue> {
        let breaches = records.iter().filter(|r| r.sla_breach).count();
        let on_time = records.len() - breaches;
        [("Within SLA", on_time), ("Breached", breaches)]
            .into_iter()
            .filter(|(_, n)| *n > 0)
            .map(|(label, n)| LabeledValue::new(label, n as f64))
            .collect()
    }

    pub fn breach_rate_by_platform(records: &[&OrderRecord]) -> Vec<GroupRate> {
        let mut groups: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
        for r in records {
            let entry = groups.entry(r.platform.as_str()).or_default();
            entry.0 += 1;
            entry.1 += usize::from(r.sla_breach);
        }
        groups
            .into_iter()
            .map(|(group, (orders, breaches))| GroupRate {
                group: group.to_string(),
                orders,
                breaches,
                rate: StatsCalculator::rate(breaches, orders),
            })
            .collect()
    }

    pub fn rating_by_platform(records: &[&OrderRecord]) -> Vec<LabeledValue> {
        Self::mean_by_group(records.iter().filter_map(|r| Some((r.platform.as_str(), r.rating?))))
            .into_iter()
            .map(|(label, mean)| LabeledValue::new(label, mean))
            .collect()
    }

    /// Equal-width buckets between min and max. A single distinct value
    /// yields one bucket; the maximum lands in the last bucket.
    pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBucket> {
        if values.is_empty() || bins == 0 {
            return Vec::new();
        }
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        if max - min < f64::EPSILON {
            return vec![HistogramBucket {
                lower: min,
                upper: max,
                count: values.len(),
            }];
        }

        let width = (max - min) / bins as f64;
        let mut counts = vec![0usize; bins];
        for v in values {
            let idx = (((v - min) / width).floor() as usize).min(bins - 1);
            counts[idx] += 1;
        }

        counts
            .into_iter()
            .enumerate()
            .map(|(i, count)| HistogramBucket {
                lower: min + i as f64 * width,
                upper: min + (i + 1) as f64 * width,
                count,
            })
            .collect()
    }

    /// Orders per hour of day; empty when there are no orders.
    pub fn hourly_orders(records: &[&OrderRecord]) -> Vec<HourCount> {
        if records.is_empty() {
            return Vec::new();
        }
        let mut counts = [0usize; 24];
        for r in records {
            counts[(r.hour as usize).min(23)] += 1;
        }
        counts
            .iter()
            .enumerate()
            .map(|(hour, &orders)| HourCount {
                hour: hour as u32,
                orders,
            })
            .collect()
    }

    /// Mean rating for `false` then `true`; groups without ratings are left out.
    pub fn rating_by_flag(
        records: &[&OrderRecord],
        flag: fn(&OrderRecord) -> bool,
        labels: (&str, &str),
    ) -> Vec<LabeledValue> {
        let (flagged, unflagged) = Self::ratings_split(records, flag);
        [(labels.0, unflagged), (labels.1, flagged)]
            .into_iter()
            .filter_map(|(label, ratings)| {
                StatsCalculator::mean(&ratings).map(|m| LabeledValue::new(label, m))
            })
            .collect()
    }

    pub fn evening_comparison(records: &[&OrderRecord]) -> EveningComparison {
        let (evening, other): (Vec<&OrderRecord>, Vec<&OrderRecord>) =
            records.iter().copied().partition(|r| r.evening);
        EveningComparison {
            evening_orders: evening.len(),
            evening_breach_rate: Self::breach_rate(&evening),
            other_orders: other.len(),
            other_breach_rate: Self::breach_rate(&other),
        }
    }

    /// Average evening delivery time per platform, slowest first.
    pub fn evening_stress(records: &[&OrderRecord]) -> Vec<LabeledValue> {
        let mut stress: Vec<LabeledValue> = Self::mean_by_group(
            records
                .iter()
                .filter(|r| r.evening)
                .filter_map(|r| Some((r.platform.as_str(), r.delivery_time_minutes?))),
        )
        .into_iter()
        .map(|(label, mean)| LabeledValue::new(label, mean))
        .collect();

        stress.sort_by(|a, b| {
            b.value
                .partial_cmp(&a.value)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.label.cmp(&b.label))
        });
        stress
    }

    pub fn rating_impact(
        records: &[&OrderRecord],
        flag: fn(&OrderRecord) -> bool,
    ) -> Option<RatingImpact> {
        let (flagged, unflagged) = Self::ratings_split(records, flag);
        let flagged_mean = StatsCalculator::mean(&flagged)?;
        let unflagged_mean = StatsCalculator::mean(&unflagged)?;
        let test = StatsCalculator::welch_ttest(&flagged, &unflagged);

        Some(RatingImpact {
            flagged_mean,
            unflagged_mean,
            difference: flagged_mean - unflagged_mean,
            p_value: test.map(|t| t.p_value),
            significant: test.is_some_and(|t| t.is_significant),
        })
    }

    fn ratings_split(
        records: &[&OrderRecord],
        flag: fn(&OrderRecord) -> bool,
    ) -> (Vec<f64>, Vec<f64>) {
        let mut flagged = Vec::new();
        let mut unflagged = Vec::new();
        for r in records {
            if let Some(rating) = r.rating {
                if flag(r) {
                    flagged.push(rating);
                } else {
                    unflagged.push(rating);
                }
            }
        }
        (flagged, unflagged)
    }

    fn mean_by_group<'a>(pairs: impl Iterator<Item = (&'a str, f64)>) -> BTreeMap<&'a str, f64> {
        let mut sums: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
        for (group, value) in pairs {
            let entry = sums.entry(group).or_default();
            entry.0 += value;
            entry.1 += 1;
        }
        sums.into_iter()
            .map(|(group, (sum, n))| (group, sum / n as f64))
            .collect()
    }

    fn mean_of(values: impl Iterator<Item = f64>) -> f64 {
        let values: Vec<f64> = values.collect();
        StatsCalculator::mean(&values).unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::testing::order;
    use crate::data::FeatureEngine;

    fn refs(records: &[OrderRecord]) -> Vec<&OrderRecord> {
        records.iter().collect()
    }

    #[test]
    fn breach_rate_counts_strictly_late_orders() {
        let records = vec![
            order("Blinkit", "Dairy", Some(20.0), Some(4.0)),
            order("Blinkit", "Dairy", Some(35.0), Some(2.0)),
            order("Zepto", "Dairy", Some(31.0), Some(3.0)),
        ];
        let rate = Aggregator::breach_rate(&refs(&records));
        assert!((rate - 2.0 / 3.0).abs() < 1e-9);
        assert!((rate - 0.667).abs() < 1e-3);
    }

    #[test]
    fn empty_subset_yields_zero_kpis_and_empty_charts() {
        let summary = Aggregator::summarize(&[]);
        assert_eq!(summary.kpis, Kpis::default());
        assert!(summary.sla_status.is_empty());
        assert!(summary.breach_rate_by_platform.is_empty());
        assert!(summary.rating_by_platform.is_empty());
        assert!(summary.delivery_histogram.is_empty());
        assert!(summary.hourly_orders.is_empty());
        assert!(summary.rating_by_delay.is_empty());
        assert!(summary.evening_stress.is_empty());
        assert_eq!(summary.delay_impact, None);
        assert_eq!(summary.evening, EveningComparison::default());
    }

    #[test]
    fn kpis_skip_missing_values_in_means() {
        let mut late = order("Zepto", "Snacks", Some(40.0), None);
        late.refund_requested = true;
        let records = vec![order("Zepto", "Snacks", Some(20.0), Some(4.0)), late];
        let kpis = Aggregator::kpis(&refs(&records));
        assert_eq!(kpis.total_orders, 2);
        assert!((kpis.avg_delivery_minutes - 30.0).abs() < 1e-9);
        assert!((kpis.avg_rating - 4.0).abs() < 1e-9);
        assert!((kpis.refund_rate - 0.5).abs() < 1e-9);
        assert!((kpis.sla_breach_rate - 0.5).abs() < 1e-9);
    }

    #[test]
    fn platform_breach_rates_are_per_group() {
        let records = vec![
            order("Zepto", "Dairy", Some(45.0), Some(2.0)),
            order("Blinkit", "Dairy", Some(10.0), Some(5.0)),
            order("Zepto", "Dairy", Some(12.0), Some(4.0)),
        ];
        let rates = Aggregator::breach_rate_by_platform(&refs(&records));
        assert_eq!(rates.len(), 2);
        assert_eq!(rates[0].group, "Blinkit");
        assert_eq!(rates[0].rate, 0.0);
        assert_eq!(rates[1].group, "Zepto");
        assert_eq!((rates[1].orders, rates[1].breaches), (2, 1));
        assert!((rates[1].rate - 0.5).abs() < 1e-9);
    }

    #[test]
    fn histogram_places_max_in_last_bucket() {
        let buckets = Aggregator::histogram(&[10.0, 20.0, 30.0, 50.0], 4);
        assert_eq!(buckets.len(), 4);
        assert_eq!(buckets.iter().map(|b| b.count).collect::<Vec<_>>(), vec![1, 1, 1, 1]);
        assert_eq!(buckets[0].lower, 10.0);
        assert_eq!(buckets[3].upper, 50.0);
        assert_eq!(buckets[0].label(), "10-20");
    }

    #[test]
    fn histogram_of_constant_values_is_single_bucket() {
        let buckets = Aggregator::histogram(&[25.0, 25.0], HISTOGRAM_BINS);
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].count, 2);
    }

    #[test]
    fn rating_by_delay_orders_no_delay_first() {
        let mut delayed = order("Zepto", "Dairy", Some(40.0), Some(1.0));
        delayed.delivery_delay = true;
        let records = vec![delayed, order("Zepto", "Dairy", Some(15.0), Some(5.0))];
        let bars = Aggregator::rating_by_flag(&refs(&records), |r| r.delivery_delay, ("No Delay", "Delayed"));
        assert_eq!(bars[0], LabeledValue::new("No Delay", 5.0));
        assert_eq!(bars[1], LabeledValue::new("Delayed", 1.0));

        let impact = Aggregator::rating_impact(&refs(&records), |r| r.delivery_delay).expect("impact");
        assert!((impact.difference + 4.0).abs() < 1e-9);
        assert_eq!(impact.p_value, None);
        assert!(!impact.significant);
    }

    #[test]
    fn evening_views_use_derived_hour() {
        let mut records = Vec::new();
        for (i, (platform, minutes)) in [("Blinkit", 40.0), ("Zepto", 20.0), ("Zepto", 35.0)]
            .into_iter()
            .enumerate()
        {
            let mut r = order(platform, "Dairy", Some(minutes), Some(3.0));
            // rows 54.. land at 18:00 and later
            r.order_time = FeatureEngine::synthetic_timestamp(54 + i);
            r.hour = 18 + i as u32;
            r.evening = true;
            records.push(r);
        }
        records.push(order("Blinkit", "Dairy", Some(10.0), Some(5.0)));

        let comparison = Aggregator::evening_comparison(&refs(&records));
        assert_eq!(comparison.evening_orders, 3);
        assert_eq!(comparison.other_orders, 1);
        assert!((comparison.evening_breach_rate - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(comparison.other_breach_rate, 0.0);

        let stress = Aggregator::evening_stress(&refs(&records));
        assert_eq!(stress[0], LabeledValue::new("Blinkit", 40.0));
        assert_eq!(stress[1], LabeledValue::new("Zepto", 27.5));
    }

    #[test]
    fn hourly_orders_cover_the_whole_day() {
        let records = vec![order("Zepto", "Dairy", Some(15.0), Some(5.0))];
        let hours = Aggregator::hourly_orders(&refs(&records));
        assert_eq!(hours.len(), 24);
        assert_eq!(hours[0].orders, 1);
        assert_eq!(hours.iter().map(|h| h.orders).sum::<usize>(), 1);
    }
}
