//! Shared descriptive statistics over decimal series.
//!
//! These are the building blocks every analytics module reuses: simple
//! returns, sample moments, percentiles and elapsed-time helpers. All of
//! them are total functions; degenerate inputs produce zero or `None`
//! rather than panicking on a zero divisor.

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;
use std::cmp::Ordering;

use crate::config::{AnalyticsConfig, AnnualizationBasis};
use crate::types::*;

/// Average calendar year length used for elapsed-time annualisation.
pub const DAYS_PER_YEAR: Decimal = dec!(365.25);

pub fn sqrt_decimal(val: Decimal) -> Decimal {
    if val <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    val.sqrt().unwrap_or(Decimal::ZERO)
}

pub fn mean(data: &[Decimal]) -> Decimal {
    if data.is_empty() {
        return Decimal::ZERO;
    }
    let sum: Decimal = data.iter().sum();
    sum / Decimal::from(data.len() as i64)
}

/// Sample variance (n-1 denominator)
pub fn sample_variance(data: &[Decimal], mean: Decimal) -> Decimal {
    let n = data.len();
    if n < 2 {
        return Decimal::ZERO;
    }
    let sum_sq: Decimal = data.iter().map(|x| (x - mean) * (x - mean)).sum();
    sum_sq / Decimal::from((n - 1) as i64)
}

pub fn sample_std_dev(data: &[Decimal]) -> Decimal {
    sqrt_decimal(sample_variance(data, mean(data)))
}

/// Sample covariance over the common prefix of both series (n-1).
pub fn covariance(x: &[Decimal], y: &[Decimal]) -> Decimal {
    let n = x.len().min(y.len());
    if n < 2 {
        return Decimal::ZERO;
    }
    let (x, y) = (&x[..n], &y[..n]);
    let (x_mean, y_mean) = (mean(x), mean(y));
    let sum: Decimal = x
        .iter()
        .zip(y.iter())
        .map(|(xi, yi)| (xi - x_mean) * (yi - y_mean))
        .sum();
    sum / Decimal::from((n - 1) as i64)
}

/// Period-over-period simple returns, index-aligned with `values[1..]`.
///
/// A return is `None` when the previous value is not positive, which covers
/// benchmark gaps before the first valid level.
pub fn simple_returns(values: &[Decimal]) -> Vec<Option<Rate>> {
    values
        .windows(2)
        .map(|w| {
            if w[0] <= Decimal::ZERO || w[1] <= Decimal::ZERO {
                None
            } else {
                (w[1] - w[0]).checked_div(w[0])
            }
        })
        .collect()
}

/// Defined daily returns only.
pub fn daily_returns(values: &[Decimal]) -> Vec<Rate> {
    simple_returns(values).into_iter().flatten().collect()
}

/// Returns of two index-aligned series, keeping only days where both are
/// defined. The longer series is truncated to the shorter.
pub fn paired_returns(a: &[Decimal], b: &[Decimal]) -> (Vec<Rate>, Vec<Rate>) {
    simple_returns(a)
        .into_iter()
        .zip(simple_returns(b))
        .filter_map(|pair| match pair {
            (Some(x), Some(y)) => Some((x, y)),
            _ => None,
        })
        .unzip()
}

/// Percentile of an ascending-sorted slice using linear interpolation
/// between order statistics. `q` is in [0, 1].
pub fn percentile(sorted: &[Decimal], q: Decimal) -> Option<Decimal> {
    if sorted.is_empty() || q < Decimal::ZERO || q > Decimal::ONE {
        return None;
    }
    let pos = q * Decimal::from((sorted.len() - 1) as i64);
    let lo = pos.floor();
    let lo_idx = lo.to_usize()?;
    let hi_idx = pos.ceil().to_usize()?.min(sorted.len() - 1);
    let frac = pos - lo;
    Some(sorted[lo_idx] + (sorted[hi_idx] - sorted[lo_idx]) * frac)
}

pub fn days_between(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days()
}

/// Calendar years between two dates (days / 365.25).
pub fn years_between(start: NaiveDate, end: NaiveDate) -> Years {
    Decimal::from(days_between(start, end)) / DAYS_PER_YEAR
}

/// Elapsed years for a series spanning `start..=end` with `observations`
/// values, under the configured annualisation basis.
pub fn elapsed_years(
    start: NaiveDate,
    end: NaiveDate,
    observations: usize,
    config: &AnalyticsConfig,
) -> Years {
    match config.annualization {
        AnnualizationBasis::CalendarDays => years_between(start, end),
        AnnualizationBasis::TradingDays => {
            let periods = observations.saturating_sub(1);
            Decimal::from(periods as i64) / config.periods_per_year()
        }
    }
}

/// Compound growth rate as a fraction: (end/start)^(1/years) - 1.
///
/// `Value(0)` when the interval is not positive and `Undefined` when either
/// value is not positive. A steep move over a short interval can push the
/// power past the Decimal range; a gain is then `Unbounded` and a loss
/// saturates at -100%.
pub fn compound_annual_rate(start: Decimal, end: Decimal, years: Years) -> Metric {
    if years <= Decimal::ZERO {
        return Metric::Value(Decimal::ZERO);
    }
    if start <= Decimal::ZERO || end <= Decimal::ZERO {
        return Metric::Undefined;
    }
    let growth = match end.checked_div(start) {
        Some(g) => g,
        None => return Metric::Unbounded,
    };
    match Decimal::ONE.checked_div(years).and_then(|p| growth.checked_powd(p)) {
        Some(g) => Metric::Value(g - Decimal::ONE),
        None => match growth.cmp(&Decimal::ONE) {
            Ordering::Less => Metric::Value(Decimal::NEGATIVE_ONE),
            Ordering::Equal => Metric::Value(Decimal::ZERO),
            Ordering::Greater => Metric::Unbounded,
        },
    }
}

pub fn to_percent(rate: Rate) -> Percent {
    rate * dec!(100)
}

/// Index of the first positive value, if any.
pub fn first_positive(values: &[Decimal]) -> Option<usize> {
    values.iter().position(|v| *v > Decimal::ZERO)
}
