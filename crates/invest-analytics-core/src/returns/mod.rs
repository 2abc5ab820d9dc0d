//! Point, annualized, rolling and calendar-bucketed returns.

pub mod calendar;
pub mod cumulative;
pub mod periodic;

use log::debug;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::series::AnalysisInput;
use crate::types::*;
use crate::AnalyticsResult;

pub use calendar::{
    annual_returns, calendar_returns, monthly_heatmap, AnnualReturn, CalendarPeriod,
    HeatmapRow, PeriodReturn,
};
pub use cumulative::{cumulative_returns, performance_summary, CumulativePoint, PerformanceSummary};
pub use periodic::{annualized_return, point_return, rolling_returns, RollingReturn};

/// Return analysis of the fund against its benchmarks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReturnsReport {
    pub summary: Option<PerformanceSummary>,
    pub annual: Vec<AnnualReturn>,
    pub period: CalendarPeriod,
    pub calendar: Vec<PeriodReturn>,
    pub heatmap: Vec<HeatmapRow>,
    /// Fund rolling returns for each configured window
    pub rolling: Vec<RollingReturn>,
    pub cumulative: Vec<CumulativePoint>,
}

/// Compute every return view for the input at the requested calendar
/// granularity.
pub fn calculate_returns(
    input: &AnalysisInput,
    period: CalendarPeriod,
) -> AnalyticsResult<ComputationOutput<ReturnsReport>> {
    let start = Instant::now();
    let (prepared, warnings) = input.prepare()?;
    let cfg = &input.config;
    debug!("calculating {:?} returns over {} points", period, prepared.len());

    let rolling = cfg
        .rolling_windows
        .iter()
        .flat_map(|w| {
            rolling_returns(&prepared.dates, &prepared.unit_values, *w, cfg.rolling_stride)
        })
        .collect();

    let output = ReturnsReport {
        summary: performance_summary(&prepared, cfg),
        annual: annual_returns(&prepared.dates, &prepared.unit_values, &prepared.benchmarks),
        period,
        calendar: calendar_returns(&prepared.dates, &prepared.unit_values, period),
        heatmap: monthly_heatmap(&prepared.dates, &prepared.unit_values),
        rolling,
        cumulative: cumulative_returns(&prepared),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Unit-value returns (point, annualized, rolling, calendar buckets)",
        &serde_json::json!({
            "observations": prepared.len(),
            "annualization": cfg.annualization,
            "rolling_windows": cfg.rolling_windows,
            "rolling_stride": cfg.rolling_stride,
        }),
        warnings,
        elapsed,
        output,
    ))
}
