//! Investor-behaviour and return-distribution analyzers.
//!
//! Benchmarks are analysed on their own forward-filled history rather than
//! on the fund's observation dates, so daily statistics such as the best
//! days use every available index level.

pub mod best_days;
pub mod distribution;
pub mod entry_point;
pub mod timing;

use chrono::NaiveDate;
use log::{debug, warn};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::time::Instant;

use crate::error::AnalyticsError;
use crate::series::{unzip_levels, AnalysisInput};
use crate::types::*;
use crate::AnalyticsResult;

pub use best_days::{missing_best_days, BestDaysScenario, DailyMove, MissingBestDays};
pub use distribution::{
    box_plot, return_distributions, rolling_annualized_returns, BoxPlotStats, HorizonDistribution,
};
pub use entry_point::{worst_entry_points, EntryPointAnalysis};
pub use timing::{classify_cash_flow_timing, ActionKind, CashFlowAction, TimingAnalysis, TimingClass};

/// Forward-filled `(dates, levels)` of one benchmark in the input.
pub fn benchmark_history(
    input: &AnalysisInput,
    id: &BenchmarkId,
) -> AnalyticsResult<(Vec<NaiveDate>, Vec<Decimal>)> {
    let series = input
        .benchmarks
        .get(id)
        .ok_or_else(|| AnalyticsError::InvalidInput {
            field: "benchmark".into(),
            reason: format!("no series named '{}' in the input", id),
        })?;
    Ok(unzip_levels(&series.forward_filled()))
}

/// The fund's unit values, or a benchmark's own history when one is named.
fn selected_history(
    input: &AnalysisInput,
    benchmark: Option<&BenchmarkId>,
) -> AnalyticsResult<(Vec<NaiveDate>, Vec<Decimal>, String)> {
    match benchmark {
        Some(id) => {
            let (dates, levels) = benchmark_history(input, id)?;
            Ok((dates, levels, id.to_string()))
        }
        None => {
            let (prepared, _) = input.prepare()?;
            Ok((prepared.dates, prepared.unit_values, "fund".into()))
        }
    }
}

/// Contrarian versus trend-following classification of the fund's cash
/// flows against one benchmark's trailing trend.
pub fn calculate_cash_flow_timing(
    input: &AnalysisInput,
    benchmark: &BenchmarkId,
) -> AnalyticsResult<ComputationOutput<TimingAnalysis>> {
    let start = Instant::now();
    let (prepared, mut warnings) = input.prepare()?;
    let cfg = &input.config;
    let filled = input
        .benchmarks
        .get(benchmark)
        .map(|s| s.forward_filled())
        .ok_or_else(|| AnalyticsError::InvalidInput {
            field: "benchmark".into(),
            reason: format!("no series named '{}' in the input", benchmark),
        })?;

    let output = classify_cash_flow_timing(
        &prepared.points,
        &filled,
        cfg.contrarian_threshold,
        cfg.trend_lookback_days,
    );
    debug!(
        "{} material cash flows classified, {} skipped",
        output.actions.len(),
        output.skipped
    );
    if output.skipped > 0 {
        warn!("{} cash flows predate {} history", output.skipped, benchmark);
        warnings.push(format!(
            "{} cash flows skipped: no {} level at one end of the {}-day lookback",
            output.skipped, benchmark, cfg.trend_lookback_days
        ));
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Cash-flow timing vs trailing benchmark trend (contrarian / trend-following)",
        &serde_json::json!({
            "benchmark": benchmark,
            "materiality_threshold": cfg.contrarian_threshold.to_string(),
            "lookback_days": cfg.trend_lookback_days,
        }),
        warnings,
        elapsed,
        output,
    ))
}

/// Box-plot statistics of rolling annualized returns over each configured
/// holding horizon, for the fund and every benchmark.
pub fn calculate_return_distributions(
    input: &AnalysisInput,
) -> AnalyticsResult<ComputationOutput<Vec<HorizonDistribution>>> {
    let start = Instant::now();
    let (prepared, mut warnings) = input.prepare()?;
    let cfg = &input.config;

    let benchmarks: BTreeMap<BenchmarkId, (Vec<NaiveDate>, Vec<Decimal>)> = input
        .benchmarks
        .iter()
        .map(|(id, s)| (id.clone(), unzip_levels(&s.forward_filled())))
        .collect();

    let output = return_distributions(
        &prepared.dates,
        &prepared.unit_values,
        &benchmarks,
        &cfg.distribution_horizons,
        cfg.distribution_stride,
        cfg.min_samples.distribution,
    );
    for h in output.iter().filter(|h| h.fund.is_none()) {
        warnings.push(format!(
            "Fund history too short for a {}-year return distribution",
            h.horizon_years
        ));
    }
    debug!("return distributions for horizons {:?}", cfg.distribution_horizons);

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Rolling annualized return distribution (quartiles by linear interpolation)",
        &serde_json::json!({
            "horizons_years": cfg.distribution_horizons,
            "stride": cfg.distribution_stride,
            "min_samples": cfg.min_samples.distribution,
        }),
        warnings,
        elapsed,
        output,
    ))
}

/// Cost of missing the best days, for the fund or a named benchmark.
pub fn calculate_missing_best_days(
    input: &AnalysisInput,
    benchmark: Option<&BenchmarkId>,
) -> AnalyticsResult<ComputationOutput<MissingBestDays>> {
    let start = Instant::now();
    input.config.validate()?;
    let cfg = &input.config;
    let (dates, values, label) = selected_history(input, benchmark)?;
    debug!("missing-best-days on {} over {} points", label, dates.len());

    let output = missing_best_days(&dates, &values, cfg.initial_capital, &cfg.best_days_exclusions)?;
    let mut warnings = Vec::new();
    let dropped = cfg.best_days_exclusions.len() - output.scenarios.len();
    if dropped > 0 {
        warnings.push(format!(
            "{} exclusion counts dropped: {} has only {} return days",
            dropped, label, output.return_days
        ));
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Buy-and-hold vs missing the N best return days",
        &serde_json::json!({
            "series": label,
            "initial_capital": cfg.initial_capital.to_string(),
            "exclusions": cfg.best_days_exclusions,
        }),
        warnings,
        elapsed,
        output,
    ))
}

/// Intra-year peaks and their recovery, for the fund or a named benchmark.
pub fn calculate_worst_entry_points(
    input: &AnalysisInput,
    benchmark: Option<&BenchmarkId>,
) -> AnalyticsResult<ComputationOutput<Vec<EntryPointAnalysis>>> {
    let start = Instant::now();
    input.config.validate()?;
    let (dates, values, label) = selected_history(input, benchmark)?;
    let output = worst_entry_points(&dates, &values);
    debug!("{} yearly entry points for {}", output.len(), label);

    let mut warnings = Vec::new();
    if output.is_empty() {
        warnings.push(format!("{} has no positive levels", label));
    }

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Worst entry point per calendar year (intra-year peak to recovery)",
        &serde_json::json!({ "series": label }),
        warnings,
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::{BenchmarkSeries, ContributionEvent};
    use rust_decimal_macros::dec;

    #[test]
    fn test_unknown_benchmark_is_invalid_input() {
        let input = AnalysisInput {
            events: vec![ContributionEvent {
                date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
                principal: dec!(1000),
                market_value: dec!(1000),
            }],
            ..Default::default()
        };
        let err = calculate_cash_flow_timing(&input, &BenchmarkId::Nasdaq).unwrap_err();
        assert!(matches!(err, AnalyticsError::InvalidInput { .. }));
    }

    #[test]
    fn test_benchmark_history_is_forward_filled() {
        let d = |day| NaiveDate::from_ymd_opt(2020, 1, day).unwrap();
        let mut benchmarks = BTreeMap::new();
        benchmarks.insert(
            BenchmarkId::Sha,
            BenchmarkSeries::new(vec![
                crate::series::BenchmarkPoint { date: d(1), level: Some(dec!(3000)) },
                crate::series::BenchmarkPoint { date: d(2), level: None },
            ]),
        );
        let input = AnalysisInput {
            benchmarks,
            ..Default::default()
        };
        let (dates, levels) = benchmark_history(&input, &BenchmarkId::Sha).unwrap();
        assert_eq!(dates, vec![d(1), d(2)]);
        assert_eq!(levels, vec![dec!(3000), dec!(3000)]);
    }
}
