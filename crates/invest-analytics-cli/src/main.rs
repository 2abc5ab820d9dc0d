mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use rust_decimal::Decimal;
use std::process;

use commands::behavioral::{BestDaysArgs, DistributionArgs, EntryPointArgs, TimingArgs};
use commands::normalize::NormalizeArgs;
use commands::report::ReportArgs;
use commands::returns::ReturnsArgs;
use commands::risk::RiskArgs;
use commands::GlobalOpts;

/// Portfolio performance, risk and behavioral analytics
#[derive(Parser)]
#[command(
    name = "iva",
    version,
    about = "Portfolio performance, risk and behavioral analytics",
    long_about = "A CLI for analysing a personal portfolio history with decimal precision. \
                  Normalizes contributions and withdrawals into a unit-value series, then \
                  computes returns, risk ratios, drawdowns, benchmark correlation and \
                  cash-flow timing diagnostics."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// YAML or JSON file with analytics configuration
    #[arg(long, global = true)]
    config: Option<String>,

    /// Annual risk-free rate (e.g. 0.03), overrides the config file
    #[arg(long, global = true)]
    risk_free_rate: Option<Decimal>,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert contribution events into a unit-value series
    Normalize(NormalizeArgs),
    /// Point, annualized, rolling and calendar returns
    Returns(ReturnsArgs),
    /// Volatility, Sharpe, Sortino, Calmar, beta, alpha, information ratio
    Risk(RiskArgs),
    /// Maximum drawdown and drawdown episodes with recovery
    Drawdown(RiskArgs),
    /// Correlation with each benchmark, whole-series and rolling
    Correlation(RiskArgs),
    /// 30/60/90-point rolling return, volatility, Sharpe and correlation
    Rolling(RiskArgs),
    /// Contrarian vs trend-following classification of cash flows
    Timing(TimingArgs),
    /// Box-plot statistics of rolling multi-year annualized returns
    Distribution(DistributionArgs),
    /// Buy-and-hold vs missing the best days
    BestDays(BestDaysArgs),
    /// Worst entry point per calendar year and its recovery
    EntryPoints(EntryPointArgs),
    /// Every analysis in one payload
    Report(ReportArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp_secs()
        .init();

    let cli = Cli::parse();
    let opts = GlobalOpts {
        config: cli.config,
        risk_free_rate: cli.risk_free_rate,
    };

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Normalize(args) => commands::normalize::run_normalize(args, &opts),
        Commands::Returns(args) => commands::returns::run_returns(args, &opts),
        Commands::Risk(args) => commands::risk::run_risk(args, &opts),
        Commands::Drawdown(args) => commands::risk::run_drawdown(args, &opts),
        Commands::Correlation(args) => commands::risk::run_correlation(args, &opts),
        Commands::Rolling(args) => commands::risk::run_rolling(args, &opts),
        Commands::Timing(args) => commands::behavioral::run_timing(args, &opts),
        Commands::Distribution(args) => commands::behavioral::run_distribution(args, &opts),
        Commands::BestDays(args) => commands::behavioral::run_best_days(args, &opts),
        Commands::EntryPoints(args) => commands::behavioral::run_entry_points(args, &opts),
        Commands::Report(args) => commands::report::run_report(args, &opts),
        Commands::Version => {
            println!("iva {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
