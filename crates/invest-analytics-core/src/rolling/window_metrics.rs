use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::AnalyticsConfig;
use crate::correlation::pearson;
use crate::returns::point_return;
use crate::risk::{annualized_volatility, sharpe_ratio};
use crate::series::PreparedSeries;
use crate::stats::{mean, simple_returns};
use crate::types::*;

/// Trailing statistics for one window length at one date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowMetrics {
    pub days: usize,
    pub return_pct: Option<Percent>,
    /// Annualised volatility of the daily returns in the window, percentage
    pub volatility: Option<Percent>,
    pub sharpe: Option<Decimal>,
    pub correlations: BTreeMap<BenchmarkId, Option<Decimal>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollingMetricsPoint {
    pub date: NaiveDate,
    pub windows: Vec<WindowMetrics>,
}

/// Daily returns of `returns[from..to]` that are defined.
fn defined(returns: &[Option<Rate>], from: usize, to: usize) -> Vec<Rate> {
    returns[from..to].iter().flatten().copied().collect()
}

fn window_correlation(fund: &[Option<Rate>], bench: &[Option<Rate>], from: usize, to: usize) -> Option<Decimal> {
    let (x, y): (Vec<Rate>, Vec<Rate>) = fund[from..to]
        .iter()
        .zip(bench[from..to].iter())
        .filter_map(|pair| match pair {
            (Some(a), Some(b)) => Some((*a, *b)),
            _ => None,
        })
        .unzip();
    if x.len() < 2 {
        None
    } else {
        Some(pearson(&x, &y))
    }
}

/// Trailing return, volatility, Sharpe and benchmark correlations for every
/// configured window, sampled every `rolling_stride` points. A window that is
/// not yet full at a date reports `None` for each of its statistics.
pub fn rolling_metrics(prepared: &PreparedSeries, cfg: &AnalyticsConfig) -> Vec<RollingMetricsPoint> {
    let n = prepared.len();
    let periods = cfg.periods_per_year();
    let fund_returns = simple_returns(&prepared.unit_values);
    let bench_returns: BTreeMap<&BenchmarkId, Vec<Option<Rate>>> = prepared
        .benchmarks
        .iter()
        .map(|(id, levels)| (id, simple_returns(levels)))
        .collect();

    (1..n)
        .step_by(cfg.rolling_stride.max(1))
        .map(|i| {
            let windows = cfg
                .rolling_windows
                .iter()
                .map(|&days| {
                    if i < days {
                        return WindowMetrics {
                            days,
                            return_pct: None,
                            volatility: None,
                            sharpe: None,
                            correlations: bench_returns.keys().map(|id| ((*id).clone(), None)).collect(),
                        };
                    }
                    let from = i - days;
                    let window = defined(&fund_returns, from, i);
                    let (volatility, sharpe) = if window.len() < 2 {
                        (None, None)
                    } else {
                        let vol = annualized_volatility(&window, periods);
                        let annual = mean(&window)
                            .checked_mul(periods)
                            .map_or(Metric::Unbounded, Metric::Value);
                        (
                            Metric::Value(vol).to_percent().value(),
                            sharpe_ratio(annual, vol, cfg.risk_free_rate).value(),
                        )
                    };
                    WindowMetrics {
                        days,
                        return_pct: point_return(prepared.unit_values[from], prepared.unit_values[i]),
                        volatility,
                        sharpe,
                        correlations: bench_returns
                            .iter()
                            .map(|(id, br)| ((*id).clone(), window_correlation(&fund_returns, br, from, i)))
                            .collect(),
                    }
                })
                .collect();
            RollingMetricsPoint {
                date: prepared.dates[i],
                windows,
            }
        })
        .collect()
}
