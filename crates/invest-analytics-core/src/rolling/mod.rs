//! Short-horizon rolling statistics (30/60/90 observations by default).

pub mod window_metrics;

use log::debug;
use std::time::Instant;

use crate::series::AnalysisInput;
use crate::types::*;
use crate::AnalyticsResult;

pub use window_metrics::{rolling_metrics, RollingMetricsPoint, WindowMetrics};

pub fn calculate_rolling_metrics(
    input: &AnalysisInput,
) -> AnalyticsResult<ComputationOutput<Vec<RollingMetricsPoint>>> {
    let start = Instant::now();
    let (prepared, mut warnings) = input.prepare()?;
    let cfg = &input.config;
    debug!(
        "rolling metrics over {} points, windows {:?}",
        prepared.len(),
        cfg.rolling_windows
    );

    if let Some(longest) = cfg.rolling_windows.iter().max() {
        if prepared.len() <= *longest {
            warnings.push(format!(
                "Series has {} points; the {}-point window is never filled",
                prepared.len(),
                longest
            ));
        }
    }
    let output = rolling_metrics(&prepared, cfg);

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Trailing-window return, volatility, Sharpe and correlation",
        &serde_json::json!({
            "windows": cfg.rolling_windows,
            "stride": cfg.rolling_stride,
            "risk_free_rate": cfg.risk_free_rate.to_string(),
            "trading_days_per_year": cfg.trading_days_per_year,
        }),
        warnings,
        elapsed,
        output,
    ))
}
