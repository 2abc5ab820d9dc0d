use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::periodic::{annualized_return, point_return};
use crate::config::AnalyticsConfig;
use crate::series::PreparedSeries;
use crate::stats::{elapsed_years, first_positive};
use crate::types::*;

/// Growth since inception for the fund and every benchmark on one date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CumulativePoint {
    pub date: NaiveDate,
    pub fund: Percent,
    /// `None` until the benchmark has its first valid level.
    pub benchmarks: BTreeMap<BenchmarkId, Option<Percent>>,
}

/// Headline numbers for the whole series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformanceSummary {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub observations: usize,
    pub elapsed_years: Years,
    pub start_unit_value: Decimal,
    pub end_unit_value: Decimal,
    /// Unit-value return since inception
    pub total_return: Percent,
    /// `Unbounded` for a steep move over a few days
    pub annualized_return: Metric,
    pub principal: Money,
    pub market_value: Money,
    /// Market value minus principal
    pub profit: Money,
    /// Profit over principal; `None` when principal is not positive.
    pub return_on_principal: Option<Percent>,
}

/// Rebase a series to its first positive value, in percent.
pub fn rebased(values: &[Decimal]) -> Vec<Option<Percent>> {
    match first_positive(values) {
        Some(idx) => {
            let base = values[idx];
            values
                .iter()
                .enumerate()
                .map(|(i, v)| {
                    if i < idx || *v <= Decimal::ZERO {
                        None
                    } else {
                        point_return(base, *v)
                    }
                })
                .collect()
        }
        None => vec![None; values.len()],
    }
}

pub fn cumulative_returns(prepared: &PreparedSeries) -> Vec<CumulativePoint> {
    let fund = rebased(&prepared.unit_values);
    let benches: BTreeMap<&BenchmarkId, Vec<Option<Percent>>> = prepared
        .benchmarks
        .iter()
        .map(|(id, levels)| (id, rebased(levels)))
        .collect();

    prepared
        .dates
        .iter()
        .enumerate()
        .map(|(i, date)| CumulativePoint {
            date: *date,
            fund: fund[i].unwrap_or(Decimal::ZERO),
            benchmarks: benches
                .iter()
                .map(|(id, series)| ((*id).clone(), series.get(i).copied().flatten()))
                .collect(),
        })
        .collect()
}

/// Summarise the prepared series. `None` for an empty series.
pub fn performance_summary(
    prepared: &PreparedSeries,
    config: &AnalyticsConfig,
) -> Option<PerformanceSummary> {
    let first = prepared.points.first()?;
    let last = prepared.points.last()?;
    let years = elapsed_years(first.date, last.date, prepared.len(), config);
    let profit = last.market_value - last.principal;

    Some(PerformanceSummary {
        start_date: first.date,
        end_date: last.date,
        observations: prepared.len(),
        elapsed_years: years,
        start_unit_value: first.unit_value,
        end_unit_value: last.unit_value,
        total_return: point_return(first.unit_value, last.unit_value).unwrap_or(Decimal::ZERO),
        annualized_return: annualized_return(first.unit_value, last.unit_value, years),
        principal: last.principal,
        market_value: last.market_value,
        profit,
        return_on_principal: point_return(last.principal, last.market_value),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_rebased_skips_leading_gaps() {
        let r = rebased(&[dec!(0), dec!(50), dec!(55), dec!(45)]);
        assert_eq!(r, vec![None, Some(dec!(0)), Some(dec!(10)), Some(dec!(-10))]);
    }

    #[test]
    fn test_rebased_all_missing() {
        assert_eq!(rebased(&[dec!(0), dec!(0)]), vec![None, None]);
    }
}
