use serde_json::Value;
use tabled::{builder::Builder, Table};

use super::{field_rows, flatten_row, scalar, series_headers};

/// Format output as a table using the tabled crate.
///
/// Object results become a field/value table; series results become one
/// row per point with nested fields flattened into columns.
pub fn print_table(value: &Value) {
    let envelope = value.as_object();
    match envelope.and_then(|m| m.get("result")).unwrap_or(value) {
        Value::Object(map) => print_pairs(&field_rows(map)),
        Value::Array(rows) => print_series(rows),
        other => println!("{}", scalar(other)),
    }

    let Some(env) = envelope else { return };
    if let Some(Value::Array(warnings)) = env.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings.iter().filter_map(Value::as_str) {
                println!("  - {}", w);
            }
        }
    }
    if let Some(Value::String(meth)) = env.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn print_pairs(rows: &[(String, String)]) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    for (k, v) in rows {
        builder.push_record([k.as_str(), v.as_str()]);
    }
    println!("{}", Table::from(builder));
}

fn print_series(items: &[Value]) {
    if items.is_empty() {
        println!("(empty)");
        return;
    }
    let rows: Vec<Vec<(String, String)>> = items.iter().map(flatten_row).collect();
    let headers = series_headers(&rows);

    let mut builder = Builder::default();
    builder.push_record(headers.iter().map(String::as_str));
    for row in &rows {
        builder.push_record(headers.iter().map(|h| {
            row.iter()
                .find(|(k, _)| k == h)
                .map(|(_, v)| v.clone())
                .unwrap_or_default()
        }));
    }
    println!("{}", Table::from(builder));
}
