//! One-shot dashboard payload combining every analysis.

use chrono::NaiveDate;
use log::{debug, info};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;

use crate::behavioral::{
    classify_cash_flow_timing, missing_best_days, return_distributions, worst_entry_points,
    EntryPointAnalysis, HorizonDistribution, MissingBestDays, TimingAnalysis,
};
use crate::correlation::{correlation_report, CorrelationReport};
use crate::returns::{
    annual_returns, cumulative_returns, monthly_heatmap, performance_summary, AnnualReturn,
    CumulativePoint, HeatmapRow, PerformanceSummary,
};
use crate::risk::{analyze_drawdowns, risk_metrics, underwater_series, DrawdownAnalysis, RiskMetrics, UnderwaterPoint};
use crate::rolling::{rolling_metrics, RollingMetricsPoint};
use crate::series::{unzip_levels, AnalysisInput, UnitValuePoint};
use crate::types::*;
use crate::AnalyticsResult;

/// Analyses run against each benchmark's own history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkBehaviour {
    pub timing: TimingAnalysis,
    pub missing_best_days: Option<MissingBestDays>,
    pub worst_entry_points: Vec<EntryPointAnalysis>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioReport {
    pub unit_values: Vec<UnitValuePoint>,
    pub summary: Option<PerformanceSummary>,
    pub annual_returns: Vec<AnnualReturn>,
    pub heatmap: Vec<HeatmapRow>,
    pub cumulative: Vec<CumulativePoint>,
    pub risk: RiskMetrics,
    pub drawdowns: DrawdownAnalysis,
    pub underwater: Vec<UnderwaterPoint>,
    pub correlation: CorrelationReport,
    pub rolling: Vec<RollingMetricsPoint>,
    pub distributions: Vec<HorizonDistribution>,
    pub fund_missing_best_days: Option<MissingBestDays>,
    pub benchmarks: BTreeMap<BenchmarkId, BenchmarkBehaviour>,
}

/// Run every analysis over one input.
///
/// Normalization failures abort the report. Per-series failures of the
/// best-days simulation become warnings and a `None` entry.
pub fn analyze_portfolio(input: &AnalysisInput) -> AnalyticsResult<ComputationOutput<PortfolioReport>> {
    let start = Instant::now();
    let (prepared, mut warnings) = input.prepare()?;
    let cfg = &input.config;
    info!(
        "building portfolio report: {} points, {} benchmarks",
        prepared.len(),
        prepared.benchmarks.len()
    );

    let histories: BTreeMap<BenchmarkId, (Vec<NaiveDate>, Vec<Decimal>)> = input
        .benchmarks
        .iter()
        .map(|(id, s)| (id.clone(), unzip_levels(&s.forward_filled())))
        .collect();

    let mut best_days = |label: &str, dates: &[NaiveDate], values: &[Decimal]| {
        match missing_best_days(dates, values, cfg.initial_capital, &cfg.best_days_exclusions) {
            Ok(r) => Some(r),
            Err(e) => {
                warnings.push(format!("Missing-best-days for {}: {}", label, e));
                None
            }
        }
    };

    let fund_missing_best_days = best_days("fund", &prepared.dates, &prepared.unit_values);
    let benchmarks: BTreeMap<BenchmarkId, BenchmarkBehaviour> = input
        .benchmarks
        .iter()
        .map(|(id, series)| {
            let (dates, levels) = &histories[id];
            let behaviour = BenchmarkBehaviour {
                timing: classify_cash_flow_timing(
                    &prepared.points,
                    &series.forward_filled(),
                    cfg.contrarian_threshold,
                    cfg.trend_lookback_days,
                ),
                missing_best_days: best_days(id.as_str(), dates, levels),
                worst_entry_points: worst_entry_points(dates, levels),
            };
            (id.clone(), behaviour)
        })
        .collect();

    let risk = risk_metrics(&prepared, cfg);
    if risk.fund.observations < cfg.min_samples.ratios {
        warnings.push(format!(
            "Only {} daily returns; at least {} required for volatility and ratios",
            risk.fund.observations, cfg.min_samples.ratios
        ));
    }

    let output = PortfolioReport {
        summary: performance_summary(&prepared, cfg),
        annual_returns: annual_returns(&prepared.dates, &prepared.unit_values, &prepared.benchmarks),
        heatmap: monthly_heatmap(&prepared.dates, &prepared.unit_values),
        cumulative: cumulative_returns(&prepared),
        risk,
        drawdowns: analyze_drawdowns(&prepared.dates, &prepared.unit_values, cfg.drawdown_threshold),
        underwater: underwater_series(&prepared.dates, &prepared.unit_values),
        correlation: correlation_report(&prepared, cfg),
        rolling: rolling_metrics(&prepared, cfg),
        distributions: return_distributions(
            &prepared.dates,
            &prepared.unit_values,
            &histories,
            &cfg.distribution_horizons,
            cfg.distribution_stride,
            cfg.min_samples.distribution,
        ),
        fund_missing_best_days,
        benchmarks,
        unit_values: prepared.points.clone(),
    };
    debug!("portfolio report assembled");

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Portfolio analytics report (unit values, returns, risk, correlation, behaviour)",
        &serde_json::json!({
            "observations": prepared.len(),
            "benchmarks": prepared.benchmarks.keys().collect::<Vec<_>>(),
            "config": cfg,
        }),
        warnings,
        elapsed,
        output,
    ))
}
