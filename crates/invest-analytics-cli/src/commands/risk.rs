use clap::Args;
use serde_json::Value;

use invest_analytics_core::{correlation, risk, rolling};

use super::{load_input, GlobalOpts, InputArgs};

/// Arguments for risk metrics, drawdowns, correlation and rolling metrics
#[derive(Args)]
pub struct RiskArgs {
    #[command(flatten)]
    pub source: InputArgs,
}

pub fn run_risk(args: RiskArgs, opts: &GlobalOpts) -> Result<Value, Box<dyn std::error::Error>> {
    let input = load_input(&args.source, opts)?;
    let result = risk::calculate_risk_metrics(&input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_drawdown(args: RiskArgs, opts: &GlobalOpts) -> Result<Value, Box<dyn std::error::Error>> {
    let input = load_input(&args.source, opts)?;
    let result = risk::calculate_drawdowns(&input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_correlation(args: RiskArgs, opts: &GlobalOpts) -> Result<Value, Box<dyn std::error::Error>> {
    let input = load_input(&args.source, opts)?;
    let result = correlation::calculate_correlations(&input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_rolling(args: RiskArgs, opts: &GlobalOpts) -> Result<Value, Box<dyn std::error::Error>> {
    let input = load_input(&args.source, opts)?;
    let result = rolling::calculate_rolling_metrics(&input)?;
    Ok(serde_json::to_value(result)?)
}
