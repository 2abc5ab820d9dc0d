use chrono::{Months, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::stats::{compound_annual_rate, mean, percentile, years_between};
use crate::types::*;

/// Five-number summary plus mean.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxPlotStats {
    pub min: Decimal,
    pub q1: Decimal,
    pub median: Decimal,
    pub q3: Decimal,
    pub max: Decimal,
    pub mean: Decimal,
    pub count: usize,
}

/// Rolling annualized returns over one holding horizon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HorizonDistribution {
    pub horizon_years: u32,
    /// `None` when fewer windows than the distribution gate fit the series
    pub fund: Option<BoxPlotStats>,
    pub benchmarks: BTreeMap<BenchmarkId, Option<BoxPlotStats>>,
}

/// Quartiles by linear interpolation between order statistics.
pub fn box_plot(values: &[Decimal]) -> Option<BoxPlotStats> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort();
    Some(BoxPlotStats {
        min: sorted[0],
        q1: percentile(&sorted, Decimal::new(25, 2))?,
        median: percentile(&sorted, Decimal::new(50, 2))?,
        q3: percentile(&sorted, Decimal::new(75, 2))?,
        max: sorted[sorted.len() - 1],
        mean: mean(&sorted),
        count: sorted.len(),
    })
}

/// Annualized return (percentage) of every holding period of `horizon_years`
/// starting at every `stride`-th date. The exit is the first date on or after
/// the horizon's anniversary; periods running past the series end, or whose
/// growth leaves the Decimal range, are dropped.
pub fn rolling_annualized_returns(
    dates: &[NaiveDate],
    values: &[Decimal],
    horizon_years: u32,
    stride: usize,
) -> Vec<Percent> {
    let n = dates.len().min(values.len());
    let dates = &dates[..n];
    (0..n)
        .step_by(stride.max(1))
        .filter(|i| values[*i] > Decimal::ZERO)
        .filter_map(|i| {
            let months = horizon_years.checked_mul(12)?;
            let target = dates[i].checked_add_months(Months::new(months))?;
            let j = dates.partition_point(|d| *d < target);
            if j >= n || values[j] <= Decimal::ZERO {
                return None;
            }
            let years = years_between(dates[i], dates[j]);
            compound_annual_rate(values[i], values[j], years).to_percent().value()
        })
        .collect()
}

fn gated_box_plot(samples: &[Decimal], min_samples: usize) -> Option<BoxPlotStats> {
    if samples.len() < min_samples {
        None
    } else {
        box_plot(samples)
    }
}

/// Distribution of rolling annualized returns per horizon for the fund and
/// every benchmark. Benchmarks are given as their own `(dates, levels)`.
pub fn return_distributions(
    fund_dates: &[NaiveDate],
    fund_values: &[Decimal],
    benchmarks: &BTreeMap<BenchmarkId, (Vec<NaiveDate>, Vec<Decimal>)>,
    horizons: &[u32],
    stride: usize,
    min_samples: usize,
) -> Vec<HorizonDistribution> {
    horizons
        .iter()
        .map(|&h| {
            let fund = rolling_annualized_returns(fund_dates, fund_values, h, stride);
            HorizonDistribution {
                horizon_years: h,
                fund: gated_box_plot(&fund, min_samples),
                benchmarks: benchmarks
                    .iter()
                    .map(|(id, (dates, levels))| {
                        let samples = rolling_annualized_returns(dates, levels, h, stride);
                        (id.clone(), gated_box_plot(&samples, min_samples))
                    })
                    .collect(),
            }
        })
        .collect()
}
