pub mod behavioral;
pub mod normalize;
pub mod report;
pub mod returns;
pub mod risk;

use clap::Args;
use invest_analytics_core::series::AnalysisInput;
use log::debug;
use rust_decimal::Decimal;

use crate::input;
use crate::input::file::HistoryFormat;

/// Where the portfolio history comes from
#[derive(Args)]
pub struct InputArgs {
    /// Path to a JSON analysis input or a CSV history
    /// (date,principal,market_value,<benchmark>...)
    #[arg(long)]
    pub input: Option<String>,
}

/// Options shared by every analysis command
pub struct GlobalOpts {
    pub config: Option<String>,
    pub risk_free_rate: Option<Decimal>,
}

/// Load the analysis input from `--input` or piped stdin, then apply the
/// config file and command-line overrides.
pub fn load_input(
    args: &InputArgs,
    opts: &GlobalOpts,
) -> Result<AnalysisInput, Box<dyn std::error::Error>> {
    let (format, text) = match args.input {
        Some(ref path) => (HistoryFormat::of(path), input::file::read_history(path)?),
        None => input::stdin::read_stdin()?
            .ok_or("--input <file.json|file.csv> or piped stdin required")?,
    };
    let mut analysis = match format {
        HistoryFormat::Json => AnalysisInput::from_json(&text)?,
        HistoryFormat::Csv => input::csv_history::parse_history(&text)?,
    };

    if let Some(ref path) = opts.config {
        analysis.config = input::file::read_config(path)?;
        debug!("loaded config overrides from {}", path);
    }
    if let Some(rate) = opts.risk_free_rate {
        analysis.config.risk_free_rate = rate;
    }
    Ok(analysis)
}
