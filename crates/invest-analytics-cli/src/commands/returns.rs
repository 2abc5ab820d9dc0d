use clap::{Args, ValueEnum};
use serde_json::Value;

use invest_analytics_core::returns::{self, CalendarPeriod};

use super::{load_input, GlobalOpts, InputArgs};

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum PeriodArg {
    Monthly,
    Quarterly,
    Yearly,
}

impl From<PeriodArg> for CalendarPeriod {
    fn from(p: PeriodArg) -> Self {
        match p {
            PeriodArg::Monthly => CalendarPeriod::Monthly,
            PeriodArg::Quarterly => CalendarPeriod::Quarterly,
            PeriodArg::Yearly => CalendarPeriod::Yearly,
        }
    }
}

/// Arguments for return analysis
#[derive(Args)]
pub struct ReturnsArgs {
    #[command(flatten)]
    pub source: InputArgs,

    /// Calendar bucket for period returns
    #[arg(long, value_enum, default_value = "monthly")]
    pub period: PeriodArg,
}

pub fn run_returns(args: ReturnsArgs, opts: &GlobalOpts) -> Result<Value, Box<dyn std::error::Error>> {
    let input = load_input(&args.source, opts)?;
    let result = returns::calculate_returns(&input, args.period.into())?;
    Ok(serde_json::to_value(result)?)
}
