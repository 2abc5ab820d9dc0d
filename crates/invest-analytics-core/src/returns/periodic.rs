use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::stats::compound_annual_rate;
use crate::types::*;

/// A trailing-window return sampled at one date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollingReturn {
    pub date: NaiveDate,
    pub window: usize,
    pub return_pct: Percent,
}

/// `(b - a) / a × 100`. `None` when `a` is not positive or the ratio leaves
/// the Decimal range.
pub fn point_return(a: Decimal, b: Decimal) -> Option<Percent> {
    if a <= Decimal::ZERO {
        return None;
    }
    (b - a).checked_div(a)?.checked_mul(Decimal::ONE_HUNDRED)
}

/// `((end / start)^(1 / years) - 1) × 100`. `Value(0)` when `years <= 0`,
/// `Unbounded` when a short steep move compounds past the Decimal range.
pub fn annualized_return(start: Decimal, end: Decimal, years: Years) -> Metric {
    compound_annual_rate(start, end, years).to_percent()
}

/// Return over a trailing window of `window` index steps, sampled every
/// `stride` indices starting at the first full window.
///
/// Samples whose window start is not positive are skipped.
pub fn rolling_returns(
    dates: &[NaiveDate],
    values: &[Decimal],
    window: usize,
    stride: usize,
) -> Vec<RollingReturn> {
    let n = dates.len().min(values.len());
    if window == 0 || n <= window {
        return Vec::new();
    }
    (window..n)
        .step_by(stride.max(1))
        .filter_map(|i| {
            point_return(values[i - window], values[i]).map(|return_pct| RollingReturn {
                date: dates[i],
                window,
                return_pct,
            })
        })
        .collect()
}
