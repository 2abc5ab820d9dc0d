use clap::Args;
use serde_json::Value;

use invest_analytics_core::report;

use super::{load_input, GlobalOpts, InputArgs};

/// Arguments for the full portfolio report
#[derive(Args)]
pub struct ReportArgs {
    #[command(flatten)]
    pub source: InputArgs,
}

pub fn run_report(args: ReportArgs, opts: &GlobalOpts) -> Result<Value, Box<dyn std::error::Error>> {
    let input = load_input(&args.source, opts)?;
    let result = report::analyze_portfolio(&input)?;
    Ok(serde_json::to_value(result)?)
}
