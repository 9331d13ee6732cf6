//! Statistics Calculator Module
//! Descriptive statistics and Welch's t-test for rating comparisons.

use serde::Serialize;
use statrs::distribution::{ContinuousCDF, StudentsT};

/// Significance threshold for t-test
pub const SIGNIFICANCE_THRESHOLD: f64 = 0.05;

/// Descriptive statistics for one sample.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupStats {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    pub std: f64,
    pub p95: f64,
    pub p05: f64,
}

impl Default for GroupStats {
    fn default() -> Self {
        Self {
            count: 0,
            mean: 0.0,
            median: 0.0,
            std: 0.0,
            p95: 0.0,
            p05: 0.0,
        }
    }
}

/// Outcome of comparing two samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TTestResult {
    pub p_value: f64,
    pub is_significant: bool,
}

pub struct StatsCalculator;

impl StatsCalculator {
    /// Compute descriptive statistics. An empty sample yields all zeros.
    pub fn compute_descriptive_stats(values: &[f64]) -> GroupStats {
        let n = values.len();
        if n == 0 {
            return GroupStats::default();
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let mean = Self::mean(values).unwrap_or(0.0);
        let median = if n % 2 == 0 {
            (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
        } else {
            sorted[n / 2]
        };

        let variance = if n > 1 {
            values.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (n - 1) as f64
        } else {
            0.0
        };

        GroupStats {
            count: n,
            mean,
            median,
            std: variance.sqrt(),
            p95: Self::percentile(&sorted, 95.0),
            p05: Self::percentile(&sorted, 5.0),
        }
    }

    pub fn mean(values: &[f64]) -> Option<f64> {
        if values.is_empty() {
            None
        } else {
            Some(values.iter().sum::<f64>() / values.len() as f64)
        }
    }

    /// `numerator / denominator`, or 0 for an empty denominator.
    pub fn rate(numerator: usize, denominator: usize) -> f64 {
        if denominator == 0 {
            0.0
        } else {
            numerator as f64 / denominator as f64
        }
    }

    /// Linear interpolation percentile (NumPy compatible).
    fn percentile(sorted_values: &[f64], p: f64) -> f64 {
        let n = sorted_values.len();
        if n == 0 {
            return 0.0;
        }
        if n == 1 {
            return sorted_values[0];
        }

        let rank = (p / 100.0) * (n - 1) as f64;
        let lower = rank.floor() as usize;
        let upper = (rank.ceil() as usize).min(n - 1);
        let frac = rank - lower as f64;

        if lower == upper {
            sorted_values[lower]
        } else {
            sorted_values[lower] * (1.0 - frac) + sorted_values[upper] * frac
        }
    }

    /// Welch's t-test (independent samples, unequal variance).
    ///
    /// `None` when either side has fewer than two observations.
    pub fn welch_ttest(sample_a: &[f64], sample_b: &[f64]) -> Option<TTestResult> {
        let n1 = sample_a.len() as f64;
        let n2 = sample_b.len() as f64;

        if n1 < 2.0 || n2 < 2.0 {
            return None;
        }

        let mean1 = sample_a.iter().sum::<f64>() / n1;
        let mean2 = sample_b.iter().sum::<f64>() / n2;

        let var1 = sample_a.iter().map(|x| (x - mean1).powi(2)).sum::<f64>() / (n1 - 1.0);
        let var2 = sample_b.iter().map(|x| (x - mean2).powi(2)).sum::<f64>() / (n2 - 1.0);

        let se = (var1 / n1 + var2 / n2).sqrt();
        if se == 0.0 {
            let identical = (mean1 - mean2).abs() < f64::EPSILON;
            return Some(TTestResult {
                p_value: if identical { 1.0 } else { 0.0 },
                is_significant: !identical,
            });
        }

        let t = (mean1 - mean2) / se;

        // Welch-Satterthwaite degrees of freedom
        let df_num = (var1 / n1 + var2 / n2).powi(2);
        let df_denom = (var1 / n1).powi(2) / (n1 - 1.0) + (var2 / n2).powi(2) / (n2 - 1.0);
        let df = df_num / df_denom;

        let dist = StudentsT::new(0.0, 1.0, df).ok()?;
        let p_value = 2.0 * (1.0 - dist.cdf(t.abs()));
        Some(TTestResult {
            p_value,
            is_significant: p_value <= SIGNIFICANCE_THRESHOLD,
        })
    }
}
