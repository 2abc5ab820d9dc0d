use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::returns::point_return;
use crate::stats::days_between;
use crate::types::*;

/// Buying at the worst moment of a calendar year: the intra-year peak.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryPointAnalysis {
    pub year: i32,
    pub peak_date: NaiveDate,
    pub peak_level: Decimal,
    /// First later date at or above the peak level
    pub recovery_date: Option<NaiveDate>,
    pub recovery_days: Option<i64>,
    /// Return from the peak to the latest level
    pub return_since_peak: Option<Percent>,
}

/// For every calendar year, the peak level, how long it took to get back to
/// it, and what an investor who bought at the peak holds today.
pub fn worst_entry_points(dates: &[NaiveDate], values: &[Decimal]) -> Vec<EntryPointAnalysis> {
    let n = dates.len().min(values.len());
    let latest = values[..n].iter().rev().find(|v| **v > Decimal::ZERO).copied();

    let mut out = Vec::new();
    let mut i = 0;
    while i < n {
        let year = dates[i].year();
        let end = i + dates[i..n].iter().take_while(|d| d.year() == year).count();

        // First occurrence of the year's maximum positive level.
        let peak = (i..end)
            .filter(|k| values[*k] > Decimal::ZERO)
            .fold(None::<usize>, |best, k| match best {
                Some(b) if values[b] >= values[k] => Some(b),
                _ => Some(k),
            });

        if let Some(p) = peak {
            let recovery = (p + 1..n).find(|k| values[*k] >= values[p]);
            out.push(EntryPointAnalysis {
                year,
                peak_date: dates[p],
                peak_level: values[p],
                recovery_date: recovery.map(|k| dates[k]),
                recovery_days: recovery.map(|k| days_between(dates[p], dates[k])),
                return_since_peak: latest.and_then(|l| point_return(values[p], l)),
            });
        }
        i = end;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_peak_and_recovery_across_years() {
        let dates = vec![
            d(2020, 1, 2),
            d(2020, 6, 1),
            d(2020, 12, 31),
            d(2021, 3, 1),
            d(2021, 9, 1),
        ];
        let values = vec![dec!(100), dec!(120), dec!(90), dec!(110), dec!(125)];
        let e = worst_entry_points(&dates, &values);
        assert_eq!(e.len(), 2);

        assert_eq!(e[0].year, 2020);
        assert_eq!(e[0].peak_level, dec!(120));
        assert_eq!(e[0].recovery_date, Some(d(2021, 9, 1)));
        assert_eq!(e[0].recovery_days, Some(days_between(d(2020, 6, 1), d(2021, 9, 1))));

        // 2021 peaks on its last observation, so there is nothing to recover.
        assert_eq!(e[1].peak_date, d(2021, 9, 1));
        assert_eq!(e[1].recovery_date, None);
        assert_eq!(e[1].return_since_peak, Some(dec!(0)));
    }

    #[test]
    fn test_unrecovered_peak_reports_loss() {
        let dates = vec![d(2022, 1, 3), d(2022, 2, 1), d(2022, 3, 1)];
        let values = vec![dec!(200), dec!(150), dec!(160)];
        let e = worst_entry_points(&dates, &values);
        assert_eq!(e[0].peak_date, d(2022, 1, 3));
        assert_eq!(e[0].recovery_days, None);
        assert_eq!(e[0].return_since_peak, Some(dec!(-20)));
    }

    #[test]
    fn test_years_without_levels_skipped() {
        let dates = vec![d(2019, 5, 1), d(2020, 5, 1)];
        let values = vec![dec!(0), dec!(50)];
        let e = worst_entry_points(&dates, &values);
        assert_eq!(e.len(), 1);
        assert_eq!(e[0].year, 2020);
    }
}
