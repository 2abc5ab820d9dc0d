use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::AnalyticsError;
use crate::stats::{compound_annual_rate, to_percent, years_between};
use crate::types::*;
use crate::AnalyticsResult;

/// Outcome of buy-and-hold with the `excluded_days` best days removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BestDaysScenario {
    pub excluded_days: usize,
    pub terminal_value: Money,
    pub total_return: Percent,
    /// `Unbounded` for a history of a few days with a large gain
    pub annualized_return: Metric,
    /// Terminal value given up relative to staying invested
    pub shortfall: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyMove {
    pub date: NaiveDate,
    pub return_pct: Percent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissingBestDays {
    pub initial_capital: Money,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub return_days: usize,
    pub buy_and_hold: BestDaysScenario,
    pub scenarios: Vec<BestDaysScenario>,
    /// Best days in descending order, as many as the largest exclusion
    pub best_days: Vec<DailyMove>,
}

/// Terminal value of `capital` invested over the whole series versus the same
/// investment sitting in cash on each of the top-N return days.
///
/// Exclusion counts not smaller than the number of return days are dropped.
pub fn missing_best_days(
    dates: &[NaiveDate],
    values: &[Decimal],
    capital: Money,
    exclusions: &[usize],
) -> AnalyticsResult<MissingBestDays> {
    if capital <= Decimal::ZERO {
        return Err(AnalyticsError::InvalidInput {
            field: "initial_capital".into(),
            reason: "must be positive".into(),
        });
    }

    // (index of the day's closing value, return)
    let n = dates.len().min(values.len());
    let daily: Vec<(usize, Rate)> = (1..n)
        .filter(|i| values[i - 1] > Decimal::ZERO && values[*i] > Decimal::ZERO)
        .map(|i| (i, (values[i] - values[i - 1]) / values[i - 1]))
        .collect();
    let (first, last) = match (daily.first(), daily.last()) {
        (Some(f), Some(l)) => (f.0 - 1, l.0),
        _ => {
            return Err(AnalyticsError::InsufficientData(
                "missing-best-days needs at least two positive consecutive values".into(),
            ))
        }
    };
    let years = years_between(dates[first], dates[last]);

    let mut ranked = daily.clone();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

    let scenario = |excluded_days: usize, hold_terminal: Option<Money>| {
        let skip: BTreeSet<usize> = ranked.iter().take(excluded_days).map(|(i, _)| *i).collect();
        let terminal_value = daily
            .iter()
            .filter(|(i, _)| !skip.contains(i))
            .fold(capital, |acc, (_, r)| acc * (Decimal::ONE + r));
        BestDaysScenario {
            excluded_days,
            terminal_value,
            total_return: to_percent((terminal_value - capital) / capital),
            annualized_return: compound_annual_rate(capital, terminal_value, years).to_percent(),
            shortfall: hold_terminal.map(|h| h - terminal_value).unwrap_or(Decimal::ZERO),
        }
    };

    let buy_and_hold = scenario(0, None);
    let scenarios: Vec<BestDaysScenario> = exclusions
        .iter()
        .filter(|n| **n > 0 && **n < daily.len())
        .map(|n| scenario(*n, Some(buy_and_hold.terminal_value)))
        .collect();

    let top = scenarios.iter().map(|s| s.excluded_days).max().unwrap_or(0);
    let best_days = ranked
        .iter()
        .take(top)
        .map(|(i, r)| DailyMove {
            date: dates[*i],
            return_pct: to_percent(*r),
        })
        .collect();

    Ok(MissingBestDays {
        initial_capital: capital,
        start_date: dates[first],
        end_date: dates[last],
        return_days: daily.len(),
        buy_and_hold,
        scenarios,
        best_days,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn dates(n: usize) -> Vec<NaiveDate> {
        let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        (0..n)
            .map(|i| start + chrono::Duration::days(i as i64))
            .collect()
    }

    #[test]
    fn test_excluding_best_day() {
        // Returns: +10%, -5%, +20%, +1%
        let values = vec![dec!(100), dec!(110), dec!(104.5), dec!(125.4), dec!(126.654)];
        let r = missing_best_days(&dates(5), &values, dec!(1000), &[1, 2]).unwrap();
        assert_eq!(r.return_days, 4);
        assert_eq!(r.buy_and_hold.terminal_value, dec!(1266.54));
        assert_eq!(r.buy_and_hold.shortfall, Decimal::ZERO);

        // Without the +20% day: 1000 * 1.1 * 0.95 * 1.01
        let one = &r.scenarios[0];
        assert_eq!(one.excluded_days, 1);
        assert_eq!(one.terminal_value, dec!(1055.45));
        assert_eq!(one.shortfall, dec!(1266.54) - dec!(1055.45));

        assert_eq!(r.best_days.len(), 2);
        assert_eq!(r.best_days[0].date, dates(5)[3]);
        assert_eq!(r.best_days[1].date, dates(5)[1]);
    }

    #[test]
    fn test_oversized_exclusions_dropped() {
        let values = vec![dec!(100), dec!(101), dec!(102)];
        let r = missing_best_days(&dates(3), &values, dec!(1000), &[5, 10]).unwrap();
        assert!(r.scenarios.is_empty());
        assert!(r.best_days.is_empty());
    }

    #[test]
    fn test_one_day_gain_annualizes_to_unbounded() {
        let values = vec![dec!(1000), dec!(1250)];
        let r = missing_best_days(&dates(2), &values, dec!(1000), &[]).unwrap();
        assert_eq!(r.buy_and_hold.terminal_value, dec!(1250));
        assert_eq!(r.buy_and_hold.total_return, dec!(25));
        assert_eq!(r.buy_and_hold.annualized_return, Metric::Unbounded);
    }

    #[test]
    fn test_needs_two_values() {
        let err = missing_best_days(&dates(1), &[dec!(100)], dec!(1000), &[5]);
        assert!(matches!(err, Err(AnalyticsError::InsufficientData(_))));
    }
}
