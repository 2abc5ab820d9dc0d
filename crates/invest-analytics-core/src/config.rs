use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::AnalyticsError;
use crate::types::*;
use crate::AnalyticsResult;

/// How elapsed time is converted to years when annualising.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnualizationBasis {
    /// Calendar days between the first and last date over 365.25.
    #[default]
    CalendarDays,
    /// Number of return observations over the trading-day constant.
    TradingDays,
}

/// Minimum sample sizes below which a statistic is reported as insufficient.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SampleGates {
    /// Daily returns required for volatility and every ratio.
    pub ratios: usize,
    /// Paired daily returns required for a whole-series correlation.
    pub correlation: usize,
    /// Rolling-horizon samples required for a box plot.
    pub distribution: usize,
}

impl Default for SampleGates {
    fn default() -> Self {
        Self {
            ratios: 30,
            correlation: 10,
            distribution: 2,
        }
    }
}

/// Tunables consumed by the analytics engine. Every field has a default so
/// partial JSON/YAML documents deserialize.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    /// Annual risk-free rate
    pub risk_free_rate: Rate,
    pub trading_days_per_year: u32,
    pub annualization: AnnualizationBasis,
    /// Short-term rolling windows, in observations
    pub rolling_windows: Vec<usize>,
    pub rolling_stride: usize,
    /// Long-horizon distribution windows, in years
    pub distribution_horizons: Vec<u32>,
    pub distribution_stride: usize,
    /// Benchmark trend lookback for cash-flow timing, in calendar days
    pub trend_lookback_days: i64,
    /// Smallest principal change treated as a deliberate cash flow
    pub contrarian_threshold: Money,
    /// Drawdown depth (fraction) above which an episode is listed
    pub drawdown_threshold: Rate,
    pub best_days_exclusions: Vec<usize>,
    pub initial_capital: Money,
    pub min_samples: SampleGates,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            risk_free_rate: dec!(0.03),
            trading_days_per_year: 252,
            annualization: AnnualizationBasis::CalendarDays,
            rolling_windows: vec![30, 60, 90],
            rolling_stride: 1,
            distribution_horizons: vec![1, 3, 5, 8],
            distribution_stride: 20,
            trend_lookback_days: 30,
            contrarian_threshold: dec!(100),
            drawdown_threshold: dec!(0.05),
            best_days_exclusions: vec![5, 10, 20, 30, 40],
            initial_capital: dec!(10000),
            min_samples: SampleGates::default(),
        }
    }
}

impl AnalyticsConfig {
    /// Number of return periods in a year, as a Decimal.
    pub fn periods_per_year(&self) -> Decimal {
        Decimal::from(self.trading_days_per_year)
    }

    /// Risk-free rate per trading day.
    pub fn daily_risk_free_rate(&self) -> Rate {
        self.risk_free_rate / self.periods_per_year()
    }

    pub fn validate(&self) -> AnalyticsResult<()> {
        if self.trading_days_per_year == 0 {
            return Err(invalid("trading_days_per_year", "must be positive"));
        }
        if self.risk_free_rate <= dec!(-1) {
            return Err(invalid("risk_free_rate", "must be greater than -100%"));
        }
        if self.rolling_windows.iter().any(|w| *w < 2) {
            return Err(invalid("rolling_windows", "every window needs at least 2 observations"));
        }
        if self.rolling_stride == 0 || self.distribution_stride == 0 {
            return Err(invalid("stride", "rolling and distribution strides must be at least 1"));
        }
        if self.distribution_horizons.iter().any(|h| *h == 0) {
            return Err(invalid("distribution_horizons", "horizons must be at least one year"));
        }
        if self.trend_lookback_days <= 0 || self.trend_lookback_days > MAX_TREND_LOOKBACK_DAYS {
            return Err(invalid("trend_lookback_days", "must be between 1 and 36500"));
        }
        if self.contrarian_threshold < Decimal::ZERO {
            return Err(invalid("contrarian_threshold", "must not be negative"));
        }
        if self.drawdown_threshold < Decimal::ZERO || self.drawdown_threshold >= Decimal::ONE {
            return Err(invalid("drawdown_threshold", "must be in [0, 1)"));
        }
        if self.initial_capital <= Decimal::ZERO {
            return Err(invalid("initial_capital", "must be positive"));
        }
        Ok(())
    }
}

/// One hundred years of calendar days.
pub const MAX_TREND_LOOKBACK_DAYS: i64 = 36_500;

fn invalid(field: &str, reason: &str) -> AnalyticsError {
    AnalyticsError::InvalidInput {
        field: field.into(),
        reason: reason.into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        let cfg = AnalyticsConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.periods_per_year(), dec!(252));
        assert_eq!(cfg.rolling_windows, vec![30, 60, 90]);
    }

    #[test]
    fn test_partial_document_uses_defaults() {
        let cfg: AnalyticsConfig =
            serde_json::from_str(r#"{"risk_free_rate": "0.02", "min_samples": {"ratios": 5}}"#)
                .unwrap();
        assert_eq!(cfg.risk_free_rate, dec!(0.02));
        assert_eq!(cfg.min_samples.ratios, 5);
        assert_eq!(cfg.min_samples.correlation, 10);
        assert_eq!(cfg.trading_days_per_year, 252);
    }

    #[test]
    fn test_rejects_bad_threshold() {
        let cfg = AnalyticsConfig {
            drawdown_threshold: dec!(1.5),
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_stride() {
        let cfg = AnalyticsConfig {
            distribution_stride: 0,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_rejects_out_of_range_lookback() {
        for days in [0, MAX_TREND_LOOKBACK_DAYS + 1, i64::MAX] {
            let cfg = AnalyticsConfig {
                trend_lookback_days: days,
                ..Default::default()
            };
            assert!(cfg.validate().is_err(), "lookback {days}");
        }
        let cfg = AnalyticsConfig {
            trend_lookback_days: MAX_TREND_LOOKBACK_DAYS,
            ..Default::default()
        };
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_window() {
        let cfg = AnalyticsConfig {
            rolling_windows: vec![0, 30],
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }
}
