//! CSV portfolio histories.
//!
//! Layout: `date,principal,market_value,<benchmark>...`. Rows with empty
//! principal and market value carry benchmark levels only; empty benchmark
//! cells are gaps to be forward-filled.

use invest_analytics_core::series::{
    AnalysisInput, BenchmarkPoint, BenchmarkSeries, ContributionEvent,
};
use invest_analytics_core::BenchmarkId;
use log::debug;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

const FIXED_COLUMNS: [&str; 3] = ["date", "principal", "market_value"];

fn parse_amount(cell: &str, column: &str, line: usize) -> Result<Option<Decimal>, String> {
    let cell = cell.trim().replace(',', "");
    if cell.is_empty() {
        return Ok(None);
    }
    cell.parse::<Decimal>()
        .map(Some)
        .map_err(|e| format!("Line {}: invalid {} '{}': {}", line, column, cell, e))
}

/// Parse a CSV history into an analysis input with default config.
pub fn parse_history(text: &str) -> Result<AnalysisInput, Box<dyn std::error::Error>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.to_ascii_lowercase())
        .collect();
    for (i, expected) in FIXED_COLUMNS.iter().enumerate() {
        if headers.get(i).map(String::as_str) != Some(*expected) {
            return Err(format!(
                "CSV header must start with {}; found {:?}",
                FIXED_COLUMNS.join(","),
                headers
            )
            .into());
        }
    }
    let benchmark_ids: Vec<BenchmarkId> = headers[FIXED_COLUMNS.len()..]
        .iter()
        .map(|h| BenchmarkId::from(h.clone()))
        .collect();

    let mut events = Vec::new();
    let mut benchmark_points: Vec<Vec<BenchmarkPoint>> = vec![Vec::new(); benchmark_ids.len()];

    for (row, record) in reader.records().enumerate() {
        let record = record?;
        let line = row + 2;
        let date = super::dates::parse_date(record.get(0).unwrap_or_default())
            .map_err(|e| format!("Line {}: {}", line, e))?;

        let principal = parse_amount(record.get(1).unwrap_or_default(), "principal", line)?;
        let market_value = parse_amount(record.get(2).unwrap_or_default(), "market_value", line)?;
        match (principal, market_value) {
            (Some(principal), Some(market_value)) => events.push(ContributionEvent {
                date,
                principal,
                market_value,
            }),
            (None, None) => {}
            _ => {
                return Err(format!(
                    "Line {}: principal and market_value must both be set or both empty",
                    line
                )
                .into())
            }
        }

        for (k, points) in benchmark_points.iter_mut().enumerate() {
            let column = FIXED_COLUMNS.len() + k;
            let level = parse_amount(
                record.get(column).unwrap_or_default(),
                headers[column].as_str(),
                line,
            )?;
            points.push(BenchmarkPoint { date, level });
        }
    }

    debug!(
        "parsed CSV history: {} events, {} benchmark columns",
        events.len(),
        benchmark_ids.len()
    );

    let benchmarks: BTreeMap<BenchmarkId, BenchmarkSeries> = benchmark_ids
        .into_iter()
        .zip(benchmark_points)
        .map(|(id, points)| (id, BenchmarkSeries::new(points)))
        .collect();

    Ok(AnalysisInput {
        events,
        benchmarks,
        ..Default::default()
    })
}
