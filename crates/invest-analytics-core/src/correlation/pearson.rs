use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::stats::{covariance, mean, paired_returns, sample_variance, simple_returns, sqrt_decimal};
use crate::types::*;

/// Trailing-window correlation sampled at one date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollingCorrelation {
    pub date: NaiveDate,
    pub window: usize,
    pub correlation: Decimal,
    /// Paired returns inside the window
    pub observations: usize,
}

/// Pearson correlation over the common prefix of `x` and `y`.
///
/// Zero when either side has no variance or fewer than two pairs; the
/// result is clamped to [-1, 1] to absorb rounding.
pub fn pearson(x: &[Decimal], y: &[Decimal]) -> Decimal {
    let n = x.len().min(y.len());
    if n < 2 {
        return Decimal::ZERO;
    }
    let (x, y) = (&x[..n], &y[..n]);
    let var_x = sample_variance(x, mean(x));
    let var_y = sample_variance(y, mean(y));
    if var_x.is_zero() || var_y.is_zero() {
        return Decimal::ZERO;
    }
    // var_x * var_y can overflow Decimal; take the roots first.
    let denom = sqrt_decimal(var_x) * sqrt_decimal(var_y);
    if denom.is_zero() {
        return Decimal::ZERO;
    }
    (covariance(x, y) / denom).clamp(-Decimal::ONE, Decimal::ONE)
}

/// Whole-series correlation of daily returns, gated on paired observations.
pub fn return_correlation(fund: &[Decimal], benchmark: &[Decimal], min_pairs: usize) -> Metric {
    let (p, b) = paired_returns(fund, benchmark);
    Metric::gated(p.len(), min_pairs, || Metric::Value(pearson(&p, &b)))
}

/// Correlation of daily returns over a trailing window of `window` returns
/// ending at each index, sampled every `stride` indices. Only data up to and
/// including the sample date is used.
pub fn rolling_correlation(
    dates: &[NaiveDate],
    fund: &[Decimal],
    benchmark: &[Decimal],
    window: usize,
    stride: usize,
) -> Vec<RollingCorrelation> {
    let n = dates.len().min(fund.len()).min(benchmark.len());
    if window < 2 || n <= window {
        return Vec::new();
    }
    let fr = simple_returns(&fund[..n]);
    let br = simple_returns(&benchmark[..n]);

    // Return k covers values k..=k+1, so the window ending at value index i
    // spans returns i-window..i.
    (window..n)
        .step_by(stride.max(1))
        .filter_map(|i| {
            let (x, y): (Vec<Decimal>, Vec<Decimal>) = fr[i - window..i]
                .iter()
                .zip(br[i - window..i].iter())
                .filter_map(|pair| match pair {
                    (Some(a), Some(b)) => Some((*a, *b)),
                    _ => None,
                })
                .unzip();
            if x.len() < 2 {
                return None;
            }
            Some(RollingCorrelation {
                date: dates[i],
                window,
                correlation: pearson(&x, &y),
                observations: x.len(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn dates(n: usize) -> Vec<NaiveDate> {
        let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        (0..n)
            .map(|i| start + chrono::Duration::days(i as i64))
            .collect()
    }

    #[test]
    fn test_perfect_negative() {
        let x = vec![dec!(1), dec!(2), dec!(3), dec!(4)];
        let y = vec![dec!(8), dec!(6), dec!(4), dec!(2)];
        let c = pearson(&x, &y);
        assert!((c + dec!(1)).abs() < dec!(0.0000001), "got {}", c);
    }

    #[test]
    fn test_constant_side_is_zero() {
        let x = vec![dec!(1), dec!(2), dec!(3)];
        let y = vec![dec!(5), dec!(5), dec!(5)];
        assert_eq!(pearson(&x, &y), Decimal::ZERO);
    }

    #[test]
    fn test_truncates_to_shorter() {
        let x = vec![dec!(1), dec!(2), dec!(3), dec!(100)];
        let y = vec![dec!(2), dec!(4), dec!(6)];
        let c = pearson(&x, &y);
        assert!((c - dec!(1)).abs() < dec!(0.0000001));
    }

    #[test]
    fn test_return_correlation_gate() {
        let fund = vec![dec!(1), dec!(1.1), dec!(1.05)];
        assert!(matches!(
            return_correlation(&fund, &fund, 10),
            Metric::InsufficientData { available: 2, .. }
        ));
    }

    #[test]
    fn test_rolling_correlation_no_lookahead() {
        // Identical moves for the first 6 values, then divergence.
        let fund = vec![
            dec!(100), dec!(101), dec!(99), dec!(102), dec!(100), dec!(103), dec!(110), dec!(120),
        ];
        let mut bench = fund.clone();
        bench[6] = dec!(90);
        bench[7] = dec!(80);
        let r = rolling_correlation(&dates(8), &fund, &bench, 4, 1);
        // Window ending at index 5 uses values 1..=5 only
        let at5 = r.iter().find(|c| c.date == dates(8)[5]).unwrap();
        assert!((at5.correlation - dec!(1)).abs() < dec!(0.0000001));
        assert_eq!(at5.observations, 4);
        let at7 = r.iter().find(|c| c.date == dates(8)[7]).unwrap();
        assert!(at7.correlation < dec!(1));
    }
}
