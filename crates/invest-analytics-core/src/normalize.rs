//! Unit-value normalization.
//!
//! Contributions and withdrawals are modelled as buying or selling units at
//! the previous unit value, so the unit value moves only with market
//! performance. This is the mutual-fund NAV-per-share construction.

use log::debug;
use rust_decimal::Decimal;
use std::time::Instant;

use crate::error::AnalyticsError;
use crate::series::{AnalysisInput, ContributionEvent, UnitValuePoint};
use crate::types::*;
use crate::AnalyticsResult;

/// Convert contribution events into a cash-flow-adjusted unit-value series.
///
/// Events are sorted by date before processing. The first event seeds
/// `units = principal`; every later principal change adjusts units by
/// `Δprincipal / previous unit value`.
pub fn normalize(events: &[ContributionEvent]) -> AnalyticsResult<Vec<UnitValuePoint>> {
    if events.is_empty() {
        return Err(AnalyticsError::InvalidInput {
            field: "events".into(),
            reason: "At least one contribution event is required".into(),
        });
    }

    let mut sorted: Vec<&ContributionEvent> = events.iter().collect();
    sorted.sort_by_key(|e| e.date);

    if let Some(w) = sorted.windows(2).find(|w| w[0].date == w[1].date) {
        return Err(AnalyticsError::InvalidInput {
            field: "events".into(),
            reason: format!("Duplicate event date {}", w[1].date),
        });
    }
    if let Some(e) = sorted.iter().find(|e| e.market_value <= Decimal::ZERO) {
        return Err(AnalyticsError::InvalidEvent {
            date: e.date,
            field: "market_value".into(),
            value: e.market_value,
            reason: "market value must be positive".into(),
        });
    }

    let first = sorted[0];
    if first.principal <= Decimal::ZERO {
        return Err(AnalyticsError::InvalidEvent {
            date: first.date,
            field: "principal".into(),
            value: first.principal,
            reason: "first principal must be positive".into(),
        });
    }

    let mut units = first.principal;
    let mut unit_value = unit_value_of(first, units)?;
    let mut out = Vec::with_capacity(sorted.len());
    out.push(UnitValuePoint {
        date: first.date,
        units,
        unit_value,
        principal: first.principal,
        market_value: first.market_value,
    });

    for pair in sorted.windows(2) {
        let (prev, event) = (pair[0], pair[1]);
        let flow = event.principal - prev.principal;
        if !flow.is_zero() {
            units = flow
                .checked_div(unit_value)
                .and_then(|bought| units.checked_add(bought))
                .ok_or_else(|| AnalyticsError::InvalidEvent {
                    date: event.date,
                    field: "units".into(),
                    value: flow,
                    reason: "cash flow at the prior unit value is out of range".into(),
                })?;
            if units <= Decimal::ZERO {
                return Err(AnalyticsError::InvalidEvent {
                    date: event.date,
                    field: "units".into(),
                    value: units,
                    reason: "withdrawal exceeds available units".into(),
                });
            }
        }
        unit_value = unit_value_of(event, units)?;
        out.push(UnitValuePoint {
            date: event.date,
            units,
            unit_value,
            principal: event.principal,
            market_value: event.market_value,
        });
    }

    debug!("normalized {} events into unit values", out.len());
    Ok(out)
}

fn unit_value_of(event: &ContributionEvent, units: Decimal) -> AnalyticsResult<Decimal> {
    event
        .market_value
        .checked_div(units)
        .ok_or_else(|| AnalyticsError::InvalidEvent {
            date: event.date,
            field: "unit_value".into(),
            value: event.market_value,
            reason: format!("market value over {} units is out of range", units),
        })
}

/// Normalize the input's events and wrap the series in the standard envelope.
pub fn calculate_unit_values(
    input: &AnalysisInput,
) -> AnalyticsResult<ComputationOutput<Vec<UnitValuePoint>>> {
    let start = Instant::now();
    let points = normalize(&input.events)?;
    let flows = points
        .windows(2)
        .filter(|w| w[0].principal != w[1].principal)
        .count();

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Unit-value normalization (cash flows buy/sell units at prior unit value)",
        &serde_json::json!({
            "events": input.events.len(),
            "cash_flow_events": flows,
            "seed": "units_0 = principal_0",
        }),
        Vec::new(),
        elapsed,
        points,
    ))
}
