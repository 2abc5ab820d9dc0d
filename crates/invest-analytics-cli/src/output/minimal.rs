use serde_json::Value;

use super::scalar;

/// Headline figure of each analysis, as a JSON pointer into `result`.
const HEADLINES: &[&str] = &[
    "/sharpe_ratio",
    "/summary/annualized_return",
    "/annualized_return",
    "/max_drawdown",
    "/contrarian_ratio",
    "/buy_and_hold/terminal_value",
    "/risk/sharpe_ratio",
];

/// Print just the key answer value from the output.
///
/// Series results print their last point; objects print the first
/// headline field present, then fall back to their first field.
pub fn print_minimal(value: &Value) {
    let result = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);

    match result {
        Value::Array(items) => match items.last() {
            Some(last) => println!("{}", scalar(last)),
            None => println!("(empty)"),
        },
        Value::Object(map) => {
            if let Some(hit) = HEADLINES
                .iter()
                .filter_map(|p| result.pointer(p))
                .find(|v| !v.is_null())
            {
                println!("{}", scalar(hit));
            } else if let Some((key, val)) = map.iter().next() {
                println!("{}: {}", key, scalar(val));
            }
        }
        other => println!("{}", scalar(other)),
    }
}
