//! Volatility, risk-adjusted ratios, beta/alpha and drawdown analysis.

pub mod drawdown;
pub mod ratios;

use chrono::NaiveDate;
use log::{debug, warn};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;

use crate::config::AnalyticsConfig;
use crate::correlation::pearson;
use crate::series::{AnalysisInput, PreparedSeries};
use crate::stats::{
    compound_annual_rate, daily_returns, elapsed_years, first_positive, paired_returns, to_percent,
};
use crate::types::*;
use crate::AnalyticsResult;

pub use drawdown::{
    analyze_drawdowns, max_drawdown, underwater_series, DrawdownAnalysis, DrawdownPeriod,
    UnderwaterPoint,
};
pub use ratios::{
    alpha, annualized_volatility, beta, calmar_ratio, downside_deviation, information_ratio,
    sharpe_ratio, sortino_ratio, tracking_error,
};

/// Stand-alone risk profile of one value series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesRisk {
    /// Defined daily returns
    pub observations: usize,
    /// `Unbounded` when a steep short history compounds past the Decimal range
    pub annualized_return: Metric,
    /// Annualised volatility, percentage
    pub volatility: Metric,
    pub sharpe_ratio: Metric,
    pub sortino_ratio: Metric,
    pub max_drawdown: Percent,
    pub calmar_ratio: Metric,
}

/// Fund metrics relative to one benchmark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkRisk {
    pub standalone: SeriesRisk,
    /// Days on which both the fund and the benchmark have a defined return
    pub paired_observations: usize,
    pub beta: Metric,
    /// Annualised CAPM alpha, percentage
    pub alpha: Metric,
    pub information_ratio: Metric,
    /// Annualised tracking error, percentage
    pub tracking_error: Metric,
    pub correlation: Metric,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskMetrics {
    #[serde(flatten)]
    pub fund: SeriesRisk,
    pub benchmarks: BTreeMap<BenchmarkId, BenchmarkRisk>,
}

/// Risk profile of `values` observed on `dates`. Leading non-positive values
/// (a benchmark before its first level) are skipped.
pub fn series_risk(dates: &[NaiveDate], values: &[Decimal], cfg: &AnalyticsConfig) -> SeriesRisk {
    let start = match first_positive(values) {
        Some(i) => i,
        None => return empty_series_risk(cfg),
    };
    let (dates, values) = (&dates[start..], &values[start..]);
    let returns = daily_returns(values);
    let n = returns.len();
    let gate = cfg.min_samples.ratios;
    let periods = cfg.periods_per_year();

    let annual_return = annual_rate(dates, values, cfg);
    let vol = annualized_volatility(&returns, periods);
    let dd = max_drawdown(values);
    if n >= gate && vol.is_zero() {
        debug!("zero volatility over {} returns; Sharpe reported as 0", n);
    }

    SeriesRisk {
        observations: n,
        annualized_return: annual_return.to_percent(),
        volatility: Metric::gated(n, gate, || Metric::Value(vol).to_percent()),
        sharpe_ratio: Metric::gated(n, gate, || sharpe_ratio(annual_return, vol, cfg.risk_free_rate)),
        sortino_ratio: Metric::gated(n, gate, || {
            sortino_ratio(&returns, annual_return, cfg.risk_free_rate, periods)
        }),
        max_drawdown: to_percent(dd),
        calmar_ratio: Metric::gated(n, gate, || calmar_ratio(annual_return, dd)),
    }
}

fn empty_series_risk(cfg: &AnalyticsConfig) -> SeriesRisk {
    let insufficient = Metric::InsufficientData {
        required: cfg.min_samples.ratios,
        available: 0,
    };
    SeriesRisk {
        observations: 0,
        annualized_return: Metric::Undefined,
        volatility: insufficient,
        sharpe_ratio: insufficient,
        sortino_ratio: insufficient,
        max_drawdown: Decimal::ZERO,
        calmar_ratio: insufficient,
    }
}

/// Compound annual growth of a positive series under the configured basis.
fn annual_rate(dates: &[NaiveDate], values: &[Decimal], cfg: &AnalyticsConfig) -> Metric {
    match (dates.first(), dates.last(), values.first(), values.last()) {
        (Some(d0), Some(d1), Some(v0), Some(v1)) => {
            let years = elapsed_years(*d0, *d1, values.len(), cfg);
            compound_annual_rate(*v0, *v1, years)
        }
        _ => Metric::Undefined,
    }
}

/// Fund-versus-benchmark metrics for one aligned benchmark.
pub fn benchmark_risk(
    prepared: &PreparedSeries,
    levels: &[Decimal],
    cfg: &AnalyticsConfig,
) -> BenchmarkRisk {
    let standalone = series_risk(&prepared.dates, levels, cfg);
    let (fund, bench) = paired_returns(&prepared.unit_values, levels);
    let m = fund.len();
    let gate = cfg.min_samples.ratios;
    let periods = cfg.periods_per_year();
    let rf = cfg.risk_free_rate;

    let fund_annual = annual_rate(&prepared.dates, &prepared.unit_values, cfg);
    let bench_annual = match first_positive(levels) {
        Some(i) => annual_rate(&prepared.dates[i..], &levels[i..], cfg),
        None => Metric::Undefined,
    };
    let b = beta(&fund, &bench);

    BenchmarkRisk {
        standalone,
        paired_observations: m,
        beta: Metric::gated(m, gate, || Metric::Value(b)),
        alpha: Metric::gated(m, gate, || alpha(fund_annual, bench_annual, b, rf).to_percent()),
        information_ratio: Metric::gated(m, gate, || {
            Metric::Value(information_ratio(&fund, &bench, periods))
        }),
        tracking_error: Metric::gated(m, gate, || {
            Metric::Value(tracking_error(&fund, &bench, periods)).to_percent()
        }),
        correlation: Metric::gated(m, cfg.min_samples.correlation, || {
            Metric::Value(pearson(&fund, &bench))
        }),
    }
}

pub fn risk_metrics(prepared: &PreparedSeries, cfg: &AnalyticsConfig) -> RiskMetrics {
    let fund = series_risk(&prepared.dates, &prepared.unit_values, cfg);
    if fund.observations < cfg.min_samples.ratios {
        warn!(
            "only {} daily returns (need {}); ratios reported as insufficient data",
            fund.observations, cfg.min_samples.ratios
        );
    }
    let benchmarks = prepared
        .benchmarks
        .iter()
        .map(|(id, levels)| (id.clone(), benchmark_risk(prepared, levels, cfg)))
        .collect();
    RiskMetrics { fund, benchmarks }
}

/// Volatility, Sharpe, Sortino, Calmar and max drawdown for the fund, plus
/// beta, alpha, information ratio and tracking error against each benchmark.
pub fn calculate_risk_metrics(input: &AnalysisInput) -> AnalyticsResult<ComputationOutput<RiskMetrics>> {
    let start = Instant::now();
    let (prepared, mut warnings) = input.prepare()?;
    let cfg = &input.config;
    debug!("calculating risk metrics over {} points", prepared.len());

    let output = risk_metrics(&prepared, cfg);
    if output.fund.observations < cfg.min_samples.ratios {
        warnings.push(format!(
            "Only {} daily returns; at least {} required for volatility and ratios",
            output.fund.observations, cfg.min_samples.ratios
        ));
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Risk-Adjusted Returns (Volatility, Sharpe, Sortino, Calmar, Information Ratio, CAPM Alpha/Beta)",
        &serde_json::json!({
            "observations": prepared.len(),
            "risk_free_rate": cfg.risk_free_rate.to_string(),
            "trading_days_per_year": cfg.trading_days_per_year,
            "annualization": cfg.annualization,
            "min_observations": cfg.min_samples.ratios,
            "sortino_no_downside": "undefined",
            "calmar_no_drawdown": "unbounded",
        }),
        warnings,
        elapsed,
        output,
    ))
}

/// Drawdown analysis of the fund's unit values.
pub fn calculate_drawdowns(input: &AnalysisInput) -> AnalyticsResult<ComputationOutput<DrawdownAnalysis>> {
    let start = Instant::now();
    let (prepared, warnings) = input.prepare()?;
    let cfg = &input.config;

    let output = analyze_drawdowns(&prepared.dates, &prepared.unit_values, cfg.drawdown_threshold);
    debug!(
        "{} drawdown periods above {} threshold",
        output.periods.len(),
        cfg.drawdown_threshold
    );

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Maximum drawdown from running peak with recovery tracking",
        &serde_json::json!({
            "observations": prepared.len(),
            "period_threshold": cfg.drawdown_threshold.to_string(),
        }),
        warnings,
        elapsed,
        output,
    ))
}
