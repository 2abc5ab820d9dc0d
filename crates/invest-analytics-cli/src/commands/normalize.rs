use clap::Args;
use serde_json::Value;

use invest_analytics_core::normalize;

use super::{load_input, GlobalOpts, InputArgs};

/// Arguments for unit-value normalization
#[derive(Args)]
pub struct NormalizeArgs {
    #[command(flatten)]
    pub source: InputArgs,
}

pub fn run_normalize(args: NormalizeArgs, opts: &GlobalOpts) -> Result<Value, Box<dyn std::error::Error>> {
    let input = load_input(&args.source, opts)?;
    let result = normalize::calculate_unit_values(&input)?;
    Ok(serde_json::to_value(result)?)
}
