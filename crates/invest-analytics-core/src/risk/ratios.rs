use rust_decimal::Decimal;

use crate::stats::{covariance, mean, sample_std_dev, sample_variance, sqrt_decimal};
use crate::types::*;

/// Annualised sample standard deviation of periodic returns (fraction).
pub fn annualized_volatility(returns: &[Rate], periods_per_year: Decimal) -> Rate {
    sample_std_dev(returns) * sqrt_decimal(periods_per_year)
}

/// `Rp - Rf`, with an out-of-range annual return passed through.
fn excess_return(annual_return: Metric, risk_free_rate: Rate) -> Metric {
    match annual_return {
        Metric::Value(r) => r
            .checked_sub(risk_free_rate)
            .map(Metric::Value)
            .unwrap_or(Metric::Unbounded),
        other => other,
    }
}

/// Sharpe = (Rp - Rf) / σp, all annualised. Zero when volatility is zero.
pub fn sharpe_ratio(annual_return: Metric, annual_volatility: Rate, risk_free_rate: Rate) -> Metric {
    if annual_volatility.is_zero() {
        Metric::Value(Decimal::ZERO)
    } else {
        excess_return(annual_return, risk_free_rate).checked_div(annual_volatility)
    }
}

/// Root-mean-square shortfall of the returns below `threshold`, computed
/// over the downside observations only. `None` when there are none.
pub fn downside_deviation(returns: &[Rate], threshold: Rate) -> Option<Rate> {
    let shortfalls: Vec<Decimal> = returns
        .iter()
        .filter(|r| **r < threshold)
        .map(|r| (r - threshold) * (r - threshold))
        .collect();
    if shortfalls.is_empty() {
        return None;
    }
    Some(sqrt_decimal(mean(&shortfalls)))
}

/// Sortino = (Rp - Rf) / annualised downside deviation below the daily
/// risk-free threshold. `Undefined` with no downside observations.
pub fn sortino_ratio(
    returns: &[Rate],
    annual_return: Metric,
    risk_free_rate: Rate,
    periods_per_year: Decimal,
) -> Metric {
    let threshold = risk_free_rate / periods_per_year;
    match downside_deviation(returns, threshold) {
        None => Metric::Undefined,
        Some(dd) => {
            let annual_dd = dd * sqrt_decimal(periods_per_year);
            if annual_dd.is_zero() {
                Metric::Undefined
            } else {
                excess_return(annual_return, risk_free_rate).checked_div(annual_dd)
            }
        }
    }
}

/// Beta = Cov(Rp, Rb) / Var(Rb). Zero when the benchmark does not move.
pub fn beta(portfolio: &[Rate], benchmark: &[Rate]) -> Decimal {
    let n = portfolio.len().min(benchmark.len());
    let bench = &benchmark[..n];
    let var = sample_variance(bench, mean(bench));
    if var.is_zero() {
        Decimal::ZERO
    } else {
        covariance(&portfolio[..n], bench) / var
    }
}

/// CAPM alpha: Rp - [Rf + β (Rb - Rf)], all annualised fractions.
///
/// An unbounded fund return against a finite benchmark is `Unbounded`;
/// any other non-numeric input leaves alpha `Undefined`.
pub fn alpha(
    annual_portfolio_return: Metric,
    annual_benchmark_return: Metric,
    beta: Decimal,
    risk_free_rate: Rate,
) -> Metric {
    match (annual_portfolio_return, annual_benchmark_return) {
        (Metric::Value(rp), Metric::Value(rb)) => rb
            .checked_sub(risk_free_rate)
            .and_then(|premium| premium.checked_mul(beta))
            .and_then(|p| p.checked_add(risk_free_rate))
            .and_then(|expected| rp.checked_sub(expected))
            .map(Metric::Value)
            .unwrap_or(Metric::Undefined),
        (Metric::Unbounded, Metric::Value(_)) => Metric::Unbounded,
        _ => Metric::Undefined,
    }
}

/// Calmar = annualised return / max drawdown. `Unbounded` with no drawdown.
pub fn calmar_ratio(annual_return: Metric, max_drawdown: Rate) -> Metric {
    if max_drawdown.is_zero() {
        Metric::Unbounded
    } else {
        annual_return.checked_div(max_drawdown.abs())
    }
}

/// Annualised standard deviation of the excess returns.
pub fn tracking_error(portfolio: &[Rate], benchmark: &[Rate], periods_per_year: Decimal) -> Rate {
    annualized_volatility(&excess_returns(portfolio, benchmark), periods_per_year)
}

fn excess_returns(portfolio: &[Rate], benchmark: &[Rate]) -> Vec<Rate> {
    portfolio
        .iter()
        .zip(benchmark.iter())
        .map(|(p, b)| p - b)
        .collect()
}

/// IR = (mean(excess) × periods) / (σ(excess) × √periods). Zero when the
/// tracking error is zero.
pub fn information_ratio(portfolio: &[Rate], benchmark: &[Rate], periods_per_year: Decimal) -> Decimal {
    let excess = excess_returns(portfolio, benchmark);
    let te = annualized_volatility(&excess, periods_per_year);
    if te.is_zero() {
        Decimal::ZERO
    } else {
        mean(&excess) * periods_per_year / te
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_returns() -> Vec<Decimal> {
        vec![
            dec!(0.05),
            dec!(-0.02),
            dec!(0.03),
            dec!(0.01),
            dec!(-0.01),
            dec!(0.04),
            dec!(0.02),
            dec!(-0.03),
            dec!(0.06),
            dec!(0.01),
            dec!(-0.02),
            dec!(0.03),
        ]
    }

    #[test]
    fn test_flat_series_volatility_and_sharpe_zero() {
        let flat = vec![Decimal::ZERO; 40];
        let vol = annualized_volatility(&flat, dec!(252));
        assert_eq!(vol, Decimal::ZERO);
        assert_eq!(sharpe_ratio(Metric::Value(dec!(0.1)), vol, dec!(0.03)), Metric::Value(Decimal::ZERO));
    }

    #[test]
    fn test_sharpe_direction() {
        let high = sharpe_ratio(Metric::Value(dec!(0.20)), dec!(0.1), dec!(0.03)).value().unwrap();
        let low = sharpe_ratio(Metric::Value(dec!(0.05)), dec!(0.1), dec!(0.03)).value().unwrap();
        assert!(high > low);
    }

    #[test]
    fn test_unbounded_return_stays_unbounded_through_ratios() {
        assert_eq!(sharpe_ratio(Metric::Unbounded, dec!(0.4), dec!(0.03)), Metric::Unbounded);
        assert_eq!(calmar_ratio(Metric::Unbounded, dec!(0.1)), Metric::Unbounded);
        assert_eq!(
            alpha(Metric::Unbounded, Metric::Value(dec!(0.08)), dec!(1), dec!(0.03)),
            Metric::Unbounded
        );
        assert_eq!(
            alpha(Metric::Value(dec!(0.08)), Metric::Undefined, dec!(1), dec!(0.03)),
            Metric::Undefined
        );
    }

    #[test]
    fn test_sharpe_quotient_past_decimal_range_is_unbounded() {
        let huge = Metric::Value(Decimal::MAX / dec!(2));
        assert_eq!(sharpe_ratio(huge, dec!(0.001), dec!(0.03)), Metric::Unbounded);
    }

    #[test]
    fn test_sortino_no_downside_is_undefined() {
        let returns = vec![dec!(0.05), dec!(0.05), dec!(0.05)];
        assert_eq!(
            sortino_ratio(&returns, Metric::Value(dec!(0.5)), dec!(0), dec!(12)),
            Metric::Undefined
        );
    }

    #[test]
    fn test_sortino_with_downside() {
        let s = sortino_ratio(&sample_returns(), Metric::Value(dec!(0.17)), dec!(0.02), dec!(12));
        assert!(s.value().unwrap() > Decimal::ZERO);
    }

    #[test]
    fn test_beta_of_self_is_one() {
        let r = sample_returns();
        assert_eq!(beta(&r, &r), dec!(1));
    }

    #[test]
    fn test_beta_against_flat_benchmark() {
        let flat = vec![Decimal::ZERO; 12];
        assert_eq!(beta(&sample_returns(), &flat), Decimal::ZERO);
    }

    #[test]
    fn test_alpha_capm() {
        // Rp 12%, Rb 10%, beta 1, rf 3% => alpha 2%
        assert_eq!(
            alpha(Metric::Value(dec!(0.12)), Metric::Value(dec!(0.10)), dec!(1), dec!(0.03)),
            Metric::Value(dec!(0.02))
        );
    }

    #[test]
    fn test_calmar_unbounded_without_drawdown() {
        assert_eq!(calmar_ratio(Metric::Value(dec!(0.1)), Decimal::ZERO), Metric::Unbounded);
        assert_eq!(calmar_ratio(Metric::Value(dec!(0.1)), dec!(0.2)), Metric::Value(dec!(0.5)));
    }

    #[test]
    fn test_information_ratio_identical_series() {
        let r = sample_returns();
        assert_eq!(information_ratio(&r, &r, dec!(12)), Decimal::ZERO);
        assert_eq!(tracking_error(&r, &r, dec!(12)), Decimal::ZERO);
    }
}
