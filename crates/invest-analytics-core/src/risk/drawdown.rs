use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::stats::{days_between, to_percent};
use crate::types::*;

/// One peak-to-recovery drawdown episode.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawdownPeriod {
    pub peak_date: NaiveDate,
    pub peak_value: Decimal,
    pub trough_date: NaiveDate,
    pub trough_value: Decimal,
    /// Depth from peak to trough, positive percentage
    pub drawdown: Percent,
    /// First date back at or above the peak
    pub recovery_date: Option<NaiveDate>,
    /// Calendar days from trough to recovery; `None` while unrecovered
    pub recovery_days: Option<i64>,
    /// Calendar days from peak to recovery, or to the last date if unrecovered
    pub duration_days: i64,
}

/// Maximum drawdown of a series plus every episode above the threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawdownAnalysis {
    pub max_drawdown: Percent,
    /// The deepest episode; `None` for a non-decreasing series
    pub worst: Option<DrawdownPeriod>,
    pub periods: Vec<DrawdownPeriod>,
    /// Drawdown at the last observation, positive percentage
    pub current_drawdown: Percent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnderwaterPoint {
    pub date: NaiveDate,
    pub drawdown: Percent,
}

/// Maximum drawdown as a fraction. Non-positive values are ignored.
pub fn max_drawdown(values: &[Decimal]) -> Rate {
    let mut peak = Decimal::ZERO;
    let mut max_dd = Decimal::ZERO;
    for v in values.iter().filter(|v| **v > Decimal::ZERO) {
        if *v > peak {
            peak = *v;
        }
        let dd = (peak - v) / peak;
        if dd > max_dd {
            max_dd = dd;
        }
    }
    max_dd
}

/// Every drawdown episode, regardless of depth, in chronological order.
fn episodes(dates: &[NaiveDate], values: &[Decimal]) -> Vec<DrawdownPeriod> {
    let n = dates.len().min(values.len());
    let mut out = Vec::new();
    let mut peak_idx: Option<usize> = None;
    let mut trough_idx = 0usize;
    let mut in_drawdown = false;

    for i in 0..n {
        let v = values[i];
        if v <= Decimal::ZERO {
            continue;
        }
        let p = match peak_idx {
            Some(p) => p,
            None => {
                peak_idx = Some(i);
                continue;
            }
        };

        if v >= values[p] {
            if in_drawdown {
                out.push(period(dates, values, p, trough_idx, Some(i)));
                in_drawdown = false;
            }
            peak_idx = Some(i);
        } else if !in_drawdown {
            in_drawdown = true;
            trough_idx = i;
        } else if v < values[trough_idx] {
            trough_idx = i;
        }
    }

    if let (true, Some(p)) = (in_drawdown, peak_idx) {
        out.push(period(dates, values, p, trough_idx, None));
    }
    out
}

fn period(
    dates: &[NaiveDate],
    values: &[Decimal],
    peak: usize,
    trough: usize,
    recovery: Option<usize>,
) -> DrawdownPeriod {
    let end = recovery.map(|r| dates[r]).unwrap_or(dates[dates.len() - 1]);
    DrawdownPeriod {
        peak_date: dates[peak],
        peak_value: values[peak],
        trough_date: dates[trough],
        trough_value: values[trough],
        drawdown: to_percent((values[peak] - values[trough]) / values[peak]),
        recovery_date: recovery.map(|r| dates[r]),
        recovery_days: recovery.map(|r| days_between(dates[trough], dates[r])),
        duration_days: days_between(dates[peak], end),
    }
}

/// Maximum drawdown with peak/trough/recovery tracking, and the episodes
/// deeper than `threshold` (a fraction, e.g. 0.05).
pub fn analyze_drawdowns(
    dates: &[NaiveDate],
    values: &[Decimal],
    threshold: Rate,
) -> DrawdownAnalysis {
    let all = episodes(dates, values);
    let worst = all
        .iter()
        .fold(None::<&DrawdownPeriod>, |best, p| match best {
            Some(b) if b.drawdown >= p.drawdown => Some(b),
            _ => Some(p),
        })
        .cloned();
    let threshold_pct = to_percent(threshold);
    let current_drawdown = underwater_series(dates, values)
        .last()
        .map(|u| u.drawdown)
        .unwrap_or(Decimal::ZERO);

    DrawdownAnalysis {
        max_drawdown: worst.as_ref().map(|w| w.drawdown).unwrap_or(Decimal::ZERO),
        worst,
        periods: all
            .into_iter()
            .filter(|p| p.drawdown > threshold_pct)
            .collect(),
        current_drawdown,
    }
}

/// Drawdown from the running peak at every date (positive percentage).
/// Dates before the first positive value report zero.
pub fn underwater_series(dates: &[NaiveDate], values: &[Decimal]) -> Vec<UnderwaterPoint> {
    let mut peak = Decimal::ZERO;
    dates
        .iter()
        .zip(values.iter())
        .map(|(date, v)| {
            if *v > peak {
                peak = *v;
            }
            let drawdown = if peak.is_zero() || *v <= Decimal::ZERO {
                Decimal::ZERO
            } else {
                to_percent((peak - v) / peak)
            };
            UnderwaterPoint {
                date: *date,
                drawdown,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn dates(n: usize) -> Vec<NaiveDate> {
        let start = NaiveDate::from_ymd_opt(2022, 1, 1).unwrap();
        (0..n)
            .map(|i| start + chrono::Duration::days(i as i64))
            .collect()
    }

    #[test]
    fn test_max_drawdown_fraction() {
        let values = vec![dec!(100), dec!(110), dec!(88), dec!(92.4), dec!(83.16)];
        let dd = max_drawdown(&values);
        // (110 - 83.16) / 110
        assert_eq!(dd, (dec!(110) - dec!(83.16)) / dec!(110));
    }

    #[test]
    fn test_recovered_and_open_episodes() {
        let values = vec![
            dec!(100),
            dec!(90),
            dec!(80),
            dec!(100),
            dec!(105),
            dec!(103),
            dec!(94.5),
        ];
        let a = analyze_drawdowns(&dates(7), &values, dec!(0.05));
        assert_eq!(a.periods.len(), 2);

        let first = &a.periods[0];
        assert_eq!(first.drawdown, dec!(20));
        assert_eq!(first.trough_date, dates(7)[2]);
        assert_eq!(first.recovery_date, Some(dates(7)[3]));
        assert_eq!(first.recovery_days, Some(1));
        assert_eq!(first.duration_days, 3);

        let open = &a.periods[1];
        assert_eq!(open.peak_value, dec!(105));
        assert_eq!(open.drawdown, dec!(10));
        assert_eq!(open.recovery_date, None);
        assert_eq!(open.recovery_days, None);

        assert_eq!(a.max_drawdown, dec!(20));
        assert_eq!(a.worst.as_ref().unwrap().peak_date, dates(7)[0]);
        assert_eq!(a.current_drawdown, dec!(10));
    }

    #[test]
    fn test_shallow_episode_below_threshold_not_listed() {
        let values = vec![dec!(100), dec!(98), dec!(101)];
        let a = analyze_drawdowns(&dates(3), &values, dec!(0.05));
        assert!(a.periods.is_empty());
        assert_eq!(a.max_drawdown, dec!(2));
    }

    #[test]
    fn test_leading_zeros_ignored() {
        let values = vec![dec!(0), dec!(0), dec!(100), dec!(90)];
        assert_eq!(max_drawdown(&values), dec!(0.1));
        let u = underwater_series(&dates(4), &values);
        assert_eq!(u[0].drawdown, Decimal::ZERO);
        assert_eq!(u[3].drawdown, dec!(10));
    }
}
