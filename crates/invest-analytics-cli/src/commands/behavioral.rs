use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use invest_analytics_core::behavioral;
use invest_analytics_core::BenchmarkId;

use super::{load_input, GlobalOpts, InputArgs};

/// Arguments for cash-flow timing classification
#[derive(Args)]
pub struct TimingArgs {
    #[command(flatten)]
    pub source: InputArgs,

    /// Benchmark whose trend the cash flows are compared against
    #[arg(long)]
    pub benchmark: String,

    /// Smallest principal change treated as a deliberate cash flow
    #[arg(long)]
    pub threshold: Option<Decimal>,
}

/// Arguments for rolling-return distributions
#[derive(Args)]
pub struct DistributionArgs {
    #[command(flatten)]
    pub source: InputArgs,

    /// Comma-separated holding horizons in years (e.g. "1,3,5,8")
    #[arg(long, value_delimiter = ',')]
    pub horizons: Option<Vec<u32>>,
}

/// Arguments for the missing-best-days simulation
#[derive(Args)]
pub struct BestDaysArgs {
    #[command(flatten)]
    pub source: InputArgs,

    /// Run on a benchmark's history instead of the fund
    #[arg(long)]
    pub benchmark: Option<String>,

    /// Starting capital
    #[arg(long)]
    pub capital: Option<Decimal>,
}

/// Arguments for worst-entry-point analysis
#[derive(Args)]
pub struct EntryPointArgs {
    #[command(flatten)]
    pub source: InputArgs,

    /// Run on a benchmark's history instead of the fund
    #[arg(long)]
    pub benchmark: Option<String>,
}

pub fn run_timing(args: TimingArgs, opts: &GlobalOpts) -> Result<Value, Box<dyn std::error::Error>> {
    let mut input = load_input(&args.source, opts)?;
    if let Some(threshold) = args.threshold {
        input.config.contrarian_threshold = threshold;
    }
    let id = BenchmarkId::from(args.benchmark);
    let result = behavioral::calculate_cash_flow_timing(&input, &id)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_distribution(
    args: DistributionArgs,
    opts: &GlobalOpts,
) -> Result<Value, Box<dyn std::error::Error>> {
    let mut input = load_input(&args.source, opts)?;
    if let Some(horizons) = args.horizons {
        input.config.distribution_horizons = horizons;
    }
    let result = behavioral::calculate_return_distributions(&input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_best_days(args: BestDaysArgs, opts: &GlobalOpts) -> Result<Value, Box<dyn std::error::Error>> {
    let mut input = load_input(&args.source, opts)?;
    if let Some(capital) = args.capital {
        input.config.initial_capital = capital;
    }
    let id = args.benchmark.map(BenchmarkId::from);
    let result = behavioral::calculate_missing_best_days(&input, id.as_ref())?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_entry_points(
    args: EntryPointArgs,
    opts: &GlobalOpts,
) -> Result<Value, Box<dyn std::error::Error>> {
    let input = load_input(&args.source, opts)?;
    let id = args.benchmark.map(BenchmarkId::from);
    let result = behavioral::calculate_worst_entry_points(&input, id.as_ref())?;
    Ok(serde_json::to_value(result)?)
}
