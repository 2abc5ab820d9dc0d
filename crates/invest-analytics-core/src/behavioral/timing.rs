//! Cash-flow timing relative to the market trend.
//!
//! Every material change in principal is a deliberate action by the
//! investor. Comparing its direction with the benchmark's trailing trend
//! tells whether the investor bought weakness and sold strength
//! (contrarian) or chased the move (trend following).

use chrono::{Duration, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::returns::point_return;
use crate::series::{level_on_or_before, FilledLevel, UnitValuePoint};
use crate::types::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Contribution,
    Withdrawal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimingClass {
    /// Flow direction opposite to the trailing market trend
    Contrarian,
    /// Flow in the direction of the trend, or into a flat market
    TrendFollowing,
}

/// One classified change in principal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashFlowAction {
    pub date: NaiveDate,
    pub kind: ActionKind,
    /// Absolute principal change
    pub amount: Money,
    /// Benchmark return over the lookback ending on the action date
    pub trend_pct: Percent,
    pub classification: TimingClass,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingAnalysis {
    pub actions: Vec<CashFlowAction>,
    pub contrarian_count: usize,
    pub trend_following_count: usize,
    /// Material flows with no benchmark level at one end of the lookback
    pub skipped: usize,
    /// Contrarian actions over classified actions
    pub contrarian_ratio: Metric,
}

fn classify(flow: Decimal, trend: Decimal) -> TimingClass {
    let opposite = (flow > Decimal::ZERO && trend < Decimal::ZERO)
        || (flow < Decimal::ZERO && trend > Decimal::ZERO);
    if opposite {
        TimingClass::Contrarian
    } else {
        TimingClass::TrendFollowing
    }
}

/// Classify every principal change larger than `threshold` against the
/// benchmark's trend over the preceding `lookback_days` calendar days.
pub fn classify_cash_flow_timing(
    points: &[UnitValuePoint],
    benchmark: &[FilledLevel],
    threshold: Money,
    lookback_days: i64,
) -> TimingAnalysis {
    let mut actions = Vec::new();
    let mut skipped = 0usize;

    for pair in points.windows(2) {
        let flow = pair[1].principal - pair[0].principal;
        if flow.abs() <= threshold {
            continue;
        }
        let date = pair[1].date;
        let now = level_on_or_before(benchmark, date);
        // a lookback reaching past the calendar has no level
        let then = Duration::try_days(lookback_days)
            .and_then(|d| date.checked_sub_signed(d))
            .map_or(Decimal::ZERO, |start| level_on_or_before(benchmark, start));
        let trend_pct = match point_return(then, now) {
            Some(t) if now > Decimal::ZERO => t,
            _ => {
                skipped += 1;
                continue;
            }
        };
        actions.push(CashFlowAction {
            date,
            kind: if flow > Decimal::ZERO {
                ActionKind::Contribution
            } else {
                ActionKind::Withdrawal
            },
            amount: flow.abs(),
            trend_pct,
            classification: classify(flow, trend_pct),
        });
    }

    let contrarian_count = actions
        .iter()
        .filter(|a| a.classification == TimingClass::Contrarian)
        .count();
    let total = actions.len();
    let contrarian_ratio = if total == 0 {
        Metric::InsufficientData {
            required: 1,
            available: 0,
        }
    } else {
        Metric::Value(Decimal::from(contrarian_count as i64) / Decimal::from(total as i64))
    };

    TimingAnalysis {
        contrarian_count,
        trend_following_count: total - contrarian_count,
        skipped,
        contrarian_ratio,
        actions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::BenchmarkSeries;
    use rust_decimal_macros::dec;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn point(date: NaiveDate, principal: Decimal) -> UnitValuePoint {
        UnitValuePoint {
            date,
            units: principal,
            unit_value: Decimal::ONE,
            principal,
            market_value: principal,
        }
    }

    fn falling_then_rising() -> Vec<FilledLevel> {
        BenchmarkSeries::from_levels(vec![
            (d(2021, 1, 1), dec!(100)),
            (d(2021, 2, 1), dec!(90)),
            (d(2021, 3, 1), dec!(110)),
        ])
        .forward_filled()
    }

    #[test]
    fn test_buying_a_falling_market_is_contrarian() {
        let points = vec![point(d(2021, 1, 1), dec!(1000)), point(d(2021, 2, 1), dec!(1500))];
        let t = classify_cash_flow_timing(&points, &falling_then_rising(), dec!(100), 30);
        assert_eq!(t.actions.len(), 1);
        assert_eq!(t.actions[0].kind, ActionKind::Contribution);
        assert_eq!(t.actions[0].classification, TimingClass::Contrarian);
        assert_eq!(t.actions[0].trend_pct, dec!(-10));
        assert_eq!(t.contrarian_ratio, Metric::Value(dec!(1)));
    }

    #[test]
    fn test_selling_a_falling_market_follows_trend() {
        let points = vec![point(d(2021, 1, 1), dec!(1000)), point(d(2021, 2, 1), dec!(600))];
        let t = classify_cash_flow_timing(&points, &falling_then_rising(), dec!(100), 30);
        assert_eq!(t.actions[0].kind, ActionKind::Withdrawal);
        assert_eq!(t.actions[0].amount, dec!(400));
        assert_eq!(t.actions[0].classification, TimingClass::TrendFollowing);
        assert_eq!(t.trend_following_count, 1);
        assert_eq!(t.contrarian_ratio, Metric::Value(dec!(0)));
    }

    #[test]
    fn test_immaterial_flows_ignored() {
        let points = vec![point(d(2021, 1, 1), dec!(1000)), point(d(2021, 2, 1), dec!(1050))];
        let t = classify_cash_flow_timing(&points, &falling_then_rising(), dec!(100), 30);
        assert!(t.actions.is_empty());
        assert_eq!(t.skipped, 0);
        assert!(matches!(t.contrarian_ratio, Metric::InsufficientData { .. }));
    }

    #[test]
    fn test_flow_before_benchmark_history_is_skipped() {
        let points = vec![point(d(2020, 12, 1), dec!(1000)), point(d(2021, 1, 15), dec!(2000))];
        // Lookback start 2020-12-16 predates the first benchmark level.
        let t = classify_cash_flow_timing(&points, &falling_then_rising(), dec!(100), 30);
        assert!(t.actions.is_empty());
        assert_eq!(t.skipped, 1);
    }

    #[test]
    fn test_lookback_past_calendar_range_is_skipped() {
        let points = vec![point(d(2021, 1, 1), dec!(1000)), point(d(2021, 2, 1), dec!(1500))];
        for lookback in [i64::MAX, 400_000_000] {
            let t = classify_cash_flow_timing(&points, &falling_then_rising(), dec!(100), lookback);
            assert!(t.actions.is_empty());
            assert_eq!(t.skipped, 1);
        }
    }
}
