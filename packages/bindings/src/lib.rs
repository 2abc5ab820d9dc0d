use napi::Result as NapiResult;
use napi_derive::napi;
use serde::Serialize;

use invest_analytics_core::series::AnalysisInput;
use invest_analytics_core::BenchmarkId;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

fn parse_input(input_json: &str) -> NapiResult<AnalysisInput> {
    AnalysisInput::from_json(input_json).map_err(to_napi_error)
}

fn to_json<T: Serialize>(output: &T) -> NapiResult<String> {
    serde_json::to_string(output).map_err(to_napi_error)
}

fn parse_period(raw: Option<String>) -> NapiResult<invest_analytics_core::returns::CalendarPeriod> {
    let name = raw.unwrap_or_else(|| "yearly".into());
    serde_json::from_value(serde_json::Value::String(name.to_lowercase())).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Unit values
// ---------------------------------------------------------------------------

#[napi]
pub fn unit_values(input_json: String) -> NapiResult<String> {
    let input = parse_input(&input_json)?;
    let output =
        invest_analytics_core::normalize::calculate_unit_values(&input).map_err(to_napi_error)?;
    to_json(&output)
}

// ---------------------------------------------------------------------------
// Returns
// ---------------------------------------------------------------------------

/// `period` is one of `monthly`, `quarterly` or `yearly` (the default).
#[napi]
pub fn returns(input_json: String, period: Option<String>) -> NapiResult<String> {
    let input = parse_input(&input_json)?;
    let period = parse_period(period)?;
    let output = invest_analytics_core::returns::calculate_returns(&input, period)
        .map_err(to_napi_error)?;
    to_json(&output)
}

// ---------------------------------------------------------------------------
// Risk, correlation and rolling windows
// ---------------------------------------------------------------------------

#[napi]
pub fn risk_metrics(input_json: String) -> NapiResult<String> {
    let input = parse_input(&input_json)?;
    let output =
        invest_analytics_core::risk::calculate_risk_metrics(&input).map_err(to_napi_error)?;
    to_json(&output)
}

#[napi]
pub fn drawdowns(input_json: String) -> NapiResult<String> {
    let input = parse_input(&input_json)?;
    let output = invest_analytics_core::risk::calculate_drawdowns(&input).map_err(to_napi_error)?;
    to_json(&output)
}

#[napi]
pub fn correlations(input_json: String) -> NapiResult<String> {
    let input = parse_input(&input_json)?;
    let output = invest_analytics_core::correlation::calculate_correlations(&input)
        .map_err(to_napi_error)?;
    to_json(&output)
}

#[napi]
pub fn rolling_metrics(input_json: String) -> NapiResult<String> {
    let input = parse_input(&input_json)?;
    let output = invest_analytics_core::rolling::calculate_rolling_metrics(&input)
        .map_err(to_napi_error)?;
    to_json(&output)
}

// ---------------------------------------------------------------------------
// Behavioral
// ---------------------------------------------------------------------------

#[napi]
pub fn cash_flow_timing(input_json: String, benchmark: String) -> NapiResult<String> {
    let input = parse_input(&input_json)?;
    let id = BenchmarkId::from(benchmark);
    let output = invest_analytics_core::behavioral::calculate_cash_flow_timing(&input, &id)
        .map_err(to_napi_error)?;
    to_json(&output)
}

#[napi]
pub fn return_distributions(input_json: String) -> NapiResult<String> {
    let input = parse_input(&input_json)?;
    let output = invest_analytics_core::behavioral::calculate_return_distributions(&input)
        .map_err(to_napi_error)?;
    to_json(&output)
}

/// Runs on the fund unless a benchmark name is given.
#[napi]
pub fn missing_best_days(input_json: String, benchmark: Option<String>) -> NapiResult<String> {
    let input = parse_input(&input_json)?;
    let id = benchmark.map(BenchmarkId::from);
    let output =
        invest_analytics_core::behavioral::calculate_missing_best_days(&input, id.as_ref())
            .map_err(to_napi_error)?;
    to_json(&output)
}

#[napi]
pub fn worst_entry_points(input_json: String, benchmark: Option<String>) -> NapiResult<String> {
    let input = parse_input(&input_json)?;
    let id = benchmark.map(BenchmarkId::from);
    let output =
        invest_analytics_core::behavioral::calculate_worst_entry_points(&input, id.as_ref())
            .map_err(to_napi_error)?;
    to_json(&output)
}

// ---------------------------------------------------------------------------
// Full report
// ---------------------------------------------------------------------------

#[napi]
pub fn portfolio_report(input_json: String) -> NapiResult<String> {
    let input = parse_input(&input_json)?;
    let output =
        invest_analytics_core::report::analyze_portfolio(&input).map_err(to_napi_error)?;
    to_json(&output)
}
