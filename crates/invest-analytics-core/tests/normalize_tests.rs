use chrono::NaiveDate;
use invest_analytics_core::error::AnalyticsError;
use invest_analytics_core::normalize::{calculate_unit_values, normalize};
use invest_analytics_core::returns::point_return;
use invest_analytics_core::series::{AnalysisInput, ContributionEvent};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn ev(date: &str, principal: Decimal, market_value: Decimal) -> ContributionEvent {
    ContributionEvent {
        date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        principal,
        market_value,
    }
}

fn close(a: Decimal, b: Decimal) -> bool {
    (a - b).abs() < dec!(0.000000001)
}

// ---------------------------------------------------------------------------
// Worked scenarios
// ---------------------------------------------------------------------------

#[test]
fn test_scenario_growth_without_cash_flow() {
    let events = vec![
        ev("2020-01-01", dec!(1000), dec!(1000)),
        ev("2020-02-01", dec!(1000), dec!(1100)),
    ];
    let pts = normalize(&events).unwrap();
    assert_eq!(pts[0].unit_value, dec!(1.0));
    assert_eq!(pts[1].unit_value, dec!(1.1));
    assert_eq!(pts[1].units, pts[0].units);
    assert_eq!(point_return(pts[0].unit_value, pts[1].unit_value), Some(dec!(10)));
}

#[test]
fn test_scenario_contribution_buys_units_at_prior_price() {
    let events = vec![
        ev("2020-01-01", dec!(1000), dec!(1000)),
        ev("2020-02-01", dec!(1000), dec!(1100)),
        ev("2020-03-01", dec!(1500), dec!(1650)),
    ];
    let pts = normalize(&events).unwrap();
    let added = pts[2].units - pts[1].units;
    assert!(close(added, dec!(500) / dec!(1.1)), "units added {}", added);
    assert!(close(pts[2].units, dec!(1454.545454545)), "units {}", pts[2].units);
    // 1650 / (16000 / 11)
    assert!(close(pts[2].unit_value, dec!(1.134375)), "unit value {}", pts[2].unit_value);
    // Market gain 0, so performance is unchanged by the deposit
    assert!(pts[2].unit_value > pts[1].unit_value);
}

#[test]
fn test_scenario_over_withdrawal_names_the_date() {
    let events = vec![
        ev("2020-01-01", dec!(1000), dec!(1000)),
        ev("2020-02-01", dec!(1000), dec!(500)),
        ev("2020-03-01", dec!(-100), dec!(10)),
    ];
    match normalize(&events) {
        Err(AnalyticsError::InvalidEvent { date, field, value, .. }) => {
            assert_eq!(date, NaiveDate::from_ymd_opt(2020, 3, 1).unwrap());
            assert_eq!(field, "units");
            // 1000 - 1100 / 0.5 = -1200
            assert_eq!(value, dec!(-1200));
        }
        other => panic!("expected InvalidEvent, got {:?}", other),
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

#[test]
fn test_empty_events_rejected() {
    assert!(matches!(normalize(&[]), Err(AnalyticsError::InvalidInput { .. })));
}

#[test]
fn test_non_positive_first_principal_rejected() {
    let err = normalize(&[ev("2020-01-01", dec!(0), dec!(100))]).unwrap_err();
    assert!(matches!(err, AnalyticsError::InvalidEvent { ref field, .. } if field == "principal"));
}

#[test]
fn test_non_positive_market_value_rejected_anywhere() {
    let events = vec![
        ev("2020-01-01", dec!(1000), dec!(1000)),
        ev("2020-01-02", dec!(1000), dec!(0)),
    ];
    let err = normalize(&events).unwrap_err();
    assert!(matches!(err, AnalyticsError::InvalidEvent { ref field, .. } if field == "market_value"));
}

#[test]
fn test_duplicate_dates_rejected() {
    let events = vec![
        ev("2020-01-01", dec!(1000), dec!(1000)),
        ev("2020-01-01", dec!(1000), dec!(1010)),
    ];
    assert!(normalize(&events).is_err());
}

#[test]
fn test_unsorted_events_sorted_before_processing() {
    let events = vec![
        ev("2020-02-01", dec!(1000), dec!(1100)),
        ev("2020-01-01", dec!(1000), dec!(1000)),
    ];
    let pts = normalize(&events).unwrap();
    assert_eq!(pts[0].date, NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
    assert_eq!(pts[1].unit_value, dec!(1.1));
}

// ---------------------------------------------------------------------------
// Cash-flow neutrality and envelope
// ---------------------------------------------------------------------------

#[test]
fn test_constant_principal_keeps_units() {
    let events = vec![
        ev("2021-01-01", dec!(2000), dec!(2000)),
        ev("2021-01-02", dec!(2500), dec!(2600)),
        ev("2021-01-03", dec!(2500), dec!(2400)),
    ];
    let pts = normalize(&events).unwrap();
    assert_eq!(pts[2].units, pts[1].units);
    assert_eq!(pts[2].unit_value, dec!(2400) / pts[1].units);
}

#[test]
fn test_serialized_units_rounded_to_four_places() {
    let events = vec![
        ev("2020-01-01", dec!(1000), dec!(1000)),
        ev("2020-02-01", dec!(1000), dec!(1100)),
        ev("2020-03-01", dec!(1500), dec!(1650)),
    ];
    let input = AnalysisInput {
        events,
        ..Default::default()
    };
    let out = calculate_unit_values(&input).unwrap();
    let json = serde_json::to_value(&out.result).unwrap();
    assert_eq!(json[2]["unit_value"], serde_json::json!("1.1344"));
    assert_eq!(json[2]["units"], serde_json::json!("1454.5455"));
    assert_eq!(out.assumptions["cash_flow_events"], serde_json::json!(1));
}
