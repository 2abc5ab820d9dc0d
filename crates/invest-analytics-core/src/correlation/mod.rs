//! Pearson correlation between fund and benchmark daily returns.

pub mod pearson;

use log::debug;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Instant;

use crate::config::AnalyticsConfig;
use crate::series::{AnalysisInput, PreparedSeries};
use crate::stats::paired_returns;
use crate::types::*;
use crate::AnalyticsResult;

pub use pearson::{pearson, return_correlation, rolling_correlation, RollingCorrelation};

/// Label used for the fund's row and column in the correlation matrix.
pub const FUND_LABEL: &str = "fund";

/// Pairwise return correlations between the fund and every benchmark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix {
    pub labels: Vec<String>,
    pub matrix: Vec<Vec<Decimal>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelationReport {
    /// Whole-series correlation of the fund against each benchmark
    pub whole_series: BTreeMap<BenchmarkId, Metric>,
    /// Rolling correlation per benchmark, keyed by window length
    pub rolling: BTreeMap<BenchmarkId, BTreeMap<usize, Vec<RollingCorrelation>>>,
    pub matrix: CorrelationMatrix,
}

/// Correlation matrix of daily returns with the fund first, then benchmarks
/// in key order. Each cell uses only the dates where both sides are defined.
/// A series without return variance correlates 0 with everything, itself
/// included.
pub fn correlation_matrix(prepared: &PreparedSeries) -> CorrelationMatrix {
    let mut labels = vec![FUND_LABEL.to_string()];
    let mut series: Vec<&[Decimal]> = vec![prepared.unit_values.as_slice()];
    for (id, levels) in &prepared.benchmarks {
        labels.push(id.to_string());
        series.push(levels.as_slice());
    }

    let matrix = series
        .iter()
        .enumerate()
        .map(|(i, a)| {
            series
                .iter()
                .enumerate()
                .map(|(j, b)| {
                    let (x, y) = paired_returns(a, b);
                    let r = pearson(&x, &y);
                    if i == j && !r.is_zero() {
                        return Decimal::ONE;
                    }
                    r
                })
                .collect()
        })
        .collect();

    CorrelationMatrix { labels, matrix }
}

pub fn correlation_report(prepared: &PreparedSeries, cfg: &AnalyticsConfig) -> CorrelationReport {
    let whole_series = prepared
        .benchmarks
        .iter()
        .map(|(id, levels)| {
            (
                id.clone(),
                return_correlation(&prepared.unit_values, levels, cfg.min_samples.correlation),
            )
        })
        .collect();

    let rolling = prepared
        .benchmarks
        .iter()
        .map(|(id, levels)| {
            let by_window = cfg
                .rolling_windows
                .iter()
                .map(|w| {
                    (
                        *w,
                        rolling_correlation(
                            &prepared.dates,
                            &prepared.unit_values,
                            levels,
                            *w,
                            cfg.rolling_stride,
                        ),
                    )
                })
                .collect();
            (id.clone(), by_window)
        })
        .collect();

    CorrelationReport {
        whole_series,
        rolling,
        matrix: correlation_matrix(prepared),
    }
}

/// Correlation of the fund's daily returns with every benchmark, whole-series
/// and rolling, plus the full correlation matrix.
pub fn calculate_correlations(
    input: &AnalysisInput,
) -> AnalyticsResult<ComputationOutput<CorrelationReport>> {
    let start = Instant::now();
    let (prepared, warnings) = input.prepare()?;
    debug!(
        "correlating {} points against {} benchmarks",
        prepared.len(),
        prepared.benchmarks.len()
    );
    let output = correlation_report(&prepared, &input.config);

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Pearson correlation of daily returns (whole series and trailing windows)",
        &serde_json::json!({
            "observations": prepared.len(),
            "rolling_windows": input.config.rolling_windows,
            "min_pairs": input.config.min_samples.correlation,
        }),
        warnings,
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::{BenchmarkSeries, ContributionEvent};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn prepared_with(benchmark: impl Fn(Decimal) -> Decimal) -> PreparedSeries {
        let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        let values = [dec!(100), dec!(102), dec!(101), dec!(105), dec!(103)];
        let events: Vec<ContributionEvent> = values
            .iter()
            .enumerate()
            .map(|(i, v)| ContributionEvent {
                date: start + chrono::Duration::days(i as i64),
                principal: dec!(100),
                market_value: *v,
            })
            .collect();
        let mut benchmarks = BTreeMap::new();
        benchmarks.insert(
            BenchmarkId::Csi300,
            BenchmarkSeries::from_levels(events.iter().map(|e| (e.date, benchmark(e.market_value)))),
        );
        let input = AnalysisInput {
            events,
            benchmarks,
            ..Default::default()
        };
        input.prepare().unwrap().0
    }

    #[test]
    fn test_flat_benchmark_has_zero_diagonal() {
        let m = correlation_matrix(&prepared_with(|_| dec!(3000)));
        assert_eq!(m.matrix[0][0], Decimal::ONE);
        assert_eq!(m.matrix[1][1], Decimal::ZERO);
        assert_eq!(m.matrix[0][1], Decimal::ZERO);
    }

    #[test]
    fn test_matrix_shape_and_diagonal() {
        let m = correlation_matrix(&prepared_with(|v| v * dec!(30)));
        assert_eq!(m.labels, vec!["fund".to_string(), "csi300".to_string()]);
        assert_eq!(m.matrix[0][0], Decimal::ONE);
        assert!((m.matrix[0][1] - Decimal::ONE).abs() < dec!(0.0000001));
        assert_eq!(m.matrix[0][1], m.matrix[1][0]);
    }
}
