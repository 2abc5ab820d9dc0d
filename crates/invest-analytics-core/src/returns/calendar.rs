use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::periodic::point_return;
use crate::types::*;

/// Calendar bucket granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalendarPeriod {
    Monthly,
    Quarterly,
    Yearly,
}

impl CalendarPeriod {
    /// Sub-period index within the year: month 1-12, quarter 1-4, or 0.
    fn sub_period(&self, date: NaiveDate) -> u32 {
        match self {
            CalendarPeriod::Monthly => date.month(),
            CalendarPeriod::Quarterly => (date.month() - 1) / 3 + 1,
            CalendarPeriod::Yearly => 0,
        }
    }

    fn label(&self, year: i32, sub: u32) -> String {
        match self {
            CalendarPeriod::Monthly => format!("{year}-{sub:02}"),
            CalendarPeriod::Quarterly => format!("{year}-Q{sub}"),
            CalendarPeriod::Yearly => year.to_string(),
        }
    }
}

/// Return over one calendar bucket, first to last observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodReturn {
    pub label: String,
    pub year: i32,
    /// Month (1-12), quarter (1-4), or 0 for yearly buckets.
    pub period: u32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub observations: usize,
    /// `None` when the bucket has fewer than two observations.
    pub return_pct: Option<Percent>,
}

/// Per-year fund and benchmark returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnualReturn {
    pub year: i32,
    pub fund_return: Option<Percent>,
    pub benchmark_returns: BTreeMap<BenchmarkId, Option<Percent>>,
}

/// Monthly returns pivoted by year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapRow {
    pub year: i32,
    pub months: [Option<Percent>; 12],
    pub year_return: Option<Percent>,
}

/// Group `(dates, values)` into calendar buckets and compute each bucket's
/// first-to-last return. Dates must be ascending.
pub fn calendar_returns(
    dates: &[NaiveDate],
    values: &[Decimal],
    period: CalendarPeriod,
) -> Vec<PeriodReturn> {
    let n = dates.len().min(values.len());
    let mut out: Vec<PeriodReturn> = Vec::new();
    let mut bucket_start = 0usize;

    for i in 0..n {
        let key = (dates[i].year(), period.sub_period(dates[i]));
        let closes_bucket = i + 1 == n
            || (dates[i + 1].year(), period.sub_period(dates[i + 1])) != key;
        if !closes_bucket {
            continue;
        }
        let observations = i - bucket_start + 1;
        let return_pct = if observations < 2 {
            None
        } else {
            point_return(values[bucket_start], values[i])
        };
        out.push(PeriodReturn {
            label: period.label(key.0, key.1),
            year: key.0,
            period: key.1,
            start_date: dates[bucket_start],
            end_date: dates[i],
            observations,
            return_pct,
        });
        bucket_start = i + 1;
    }
    out
}

/// Fund and benchmark returns for each calendar year of the fund series.
///
/// The fund uses the first and last unit value within the year. A benchmark
/// is anchored on the last valid level of the nearest earlier year that has
/// one, walking backward across years without data; only when no earlier
/// level exists does the first valid level inside the year serve as anchor.
pub fn annual_returns(
    dates: &[NaiveDate],
    unit_values: &[Decimal],
    benchmarks: &BTreeMap<BenchmarkId, Vec<Decimal>>,
) -> Vec<AnnualReturn> {
    let fund = calendar_returns(dates, unit_values, CalendarPeriod::Yearly);

    let per_benchmark: BTreeMap<&BenchmarkId, BTreeMap<i32, Option<Percent>>> = benchmarks
        .iter()
        .map(|(id, levels)| (id, benchmark_year_returns(dates, levels)))
        .collect();

    fund.into_iter()
        .map(|bucket| {
            let benchmark_returns = per_benchmark
                .iter()
                .map(|(id, years)| {
                    (
                        (*id).clone(),
                        years.get(&bucket.year).copied().flatten(),
                    )
                })
                .collect();
            AnnualReturn {
                year: bucket.year,
                fund_return: bucket.return_pct,
                benchmark_returns,
            }
        })
        .collect()
}

fn benchmark_year_returns(dates: &[NaiveDate], levels: &[Decimal]) -> BTreeMap<i32, Option<Percent>> {
    // (first valid, last valid) per year, keyed ascending.
    let mut valid: BTreeMap<i32, (Decimal, Decimal)> = BTreeMap::new();
    for (date, level) in dates.iter().zip(levels.iter()) {
        if *level <= Decimal::ZERO {
            continue;
        }
        valid
            .entry(date.year())
            .and_modify(|(_, last)| *last = *level)
            .or_insert((*level, *level));
    }

    let mut years: Vec<i32> = dates.iter().map(|d| d.year()).collect();
    years.dedup();

    years
        .into_iter()
        .map(|year| {
            let ret = valid.get(&year).and_then(|(first, last)| {
                match valid.range(..year).next_back() {
                    Some((_, (_, prior_close))) => point_return(*prior_close, *last),
                    None if first != last => point_return(*first, *last),
                    None => None,
                }
            });
            (year, ret)
        })
        .collect()
}

/// Pivot monthly returns into one row per year, with the yearly return.
pub fn monthly_heatmap(dates: &[NaiveDate], values: &[Decimal]) -> Vec<HeatmapRow> {
    let yearly: BTreeMap<i32, Option<Percent>> =
        calendar_returns(dates, values, CalendarPeriod::Yearly)
            .into_iter()
            .map(|p| (p.year, p.return_pct))
            .collect();

    let mut rows: BTreeMap<i32, [Option<Percent>; 12]> = BTreeMap::new();
    for p in calendar_returns(dates, values, CalendarPeriod::Monthly) {
        let months = rows.entry(p.year).or_insert([None; 12]);
        months[(p.period - 1) as usize] = p.return_pct;
    }

    rows.into_iter()
        .map(|(year, months)| HeatmapRow {
            year,
            months,
            year_return: yearly.get(&year).copied().flatten(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_monthly_buckets() {
        let dates = vec![d(2020, 1, 2), d(2020, 1, 31), d(2020, 2, 3), d(2020, 3, 2), d(2020, 3, 31)];
        let values = vec![dec!(1), dec!(1.1), dec!(1.2), dec!(1.0), dec!(0.9)];
        let r = calendar_returns(&dates, &values, CalendarPeriod::Monthly);
        assert_eq!(r.len(), 3);
        assert_eq!(r[0].label, "2020-01");
        assert_eq!(r[0].return_pct, Some(dec!(10)));
        // Single observation in February
        assert_eq!(r[1].observations, 1);
        assert_eq!(r[1].return_pct, None);
        assert_eq!(r[2].return_pct, Some(dec!(-10)));
    }

    #[test]
    fn test_quarterly_labels() {
        let dates = vec![d(2021, 2, 1), d(2021, 3, 1), d(2021, 4, 1), d(2021, 6, 30)];
        let values = vec![dec!(1), dec!(2), dec!(2), dec!(3)];
        let r = calendar_returns(&dates, &values, CalendarPeriod::Quarterly);
        assert_eq!(r.len(), 2);
        assert_eq!(r[0].label, "2021-Q1");
        assert_eq!(r[1].label, "2021-Q2");
        assert_eq!(r[1].return_pct, Some(dec!(50)));
    }

    #[test]
    fn test_annual_benchmark_walks_back_over_empty_year() {
        let dates = vec![
            d(2019, 6, 1),
            d(2019, 12, 31),
            d(2020, 6, 1),
            d(2021, 1, 4),
            d(2021, 12, 31),
        ];
        let fund = vec![dec!(1), dec!(1.1), dec!(1.2), dec!(1.2), dec!(1.32)];
        // No valid level at all during 2020
        let levels = vec![dec!(100), dec!(110), dec!(0), dec!(0), dec!(121)];
        let mut benchmarks = BTreeMap::new();
        benchmarks.insert(BenchmarkId::Sp500, levels);

        let r = annual_returns(&dates, &fund, &benchmarks);
        assert_eq!(r.len(), 3);
        assert_eq!(r[0].benchmark_returns[&BenchmarkId::Sp500], Some(dec!(10)));
        assert_eq!(r[1].benchmark_returns[&BenchmarkId::Sp500], None);
        // 2021 anchors on the 2019 close (110)
        assert_eq!(r[2].benchmark_returns[&BenchmarkId::Sp500], Some(dec!(10)));
        assert_eq!(r[1].fund_return, None);
        assert_eq!(r[2].fund_return, Some(dec!(10)));
    }

    #[test]
    fn test_heatmap_rows() {
        let dates = vec![d(2020, 1, 1), d(2020, 1, 31), d(2020, 12, 1), d(2020, 12, 31)];
        let values = vec![dec!(1), dec!(1.05), dec!(1.1), dec!(1.21)];
        let rows = monthly_heatmap(&dates, &values);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].months[0], Some(dec!(5)));
        assert_eq!(rows[0].months[1], None);
        assert_eq!(rows[0].months[11], Some(dec!(10)));
        assert_eq!(rows[0].year_return, Some(dec!(21)));
    }
}
