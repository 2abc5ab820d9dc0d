pub mod csv_out;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::{Map, Value};

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => match serde_json::to_string_pretty(value) {
            Ok(s) => println!("{}", s),
            Err(e) => eprintln!("JSON serialization error: {}", e),
        },
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// Render a serialized `Metric` (`{"status": ..., "value": ...}`) as a
/// single cell. Returns `None` for any other value.
pub fn format_metric(value: &Value) -> Option<String> {
    let map = value.as_object()?;
    let status = map.get("status")?.as_str()?;
    match status {
        "value" => map.get("value").map(scalar),
        "insufficient_data" => {
            let inner = map.get("value")?;
            Some(format!(
                "n/a ({}/{} obs)",
                inner.get("available")?,
                inner.get("required")?
            ))
        }
        other => Some(other.to_string()),
    }
}

/// One cell of text for a leaf value.
pub fn scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => format_metric(value).unwrap_or_else(|| serde_json::to_string(value).unwrap_or_default()),
    }
}

/// Flatten nested objects into dotted column names so that series points
/// such as `{"date": .., "windows": [{"days": 30, ..}]}` fit one row.
/// Metrics stay a single column.
pub fn flatten_row(value: &Value) -> Vec<(String, String)> {
    let mut out = Vec::new();
    flatten_into("", value, &mut out);
    out
}

fn flatten_into(prefix: &str, value: &Value, out: &mut Vec<(String, String)>) {
    let join = |key: &str| {
        if prefix.is_empty() {
            key.to_string()
        } else {
            format!("{}.{}", prefix, key)
        }
    };
    match value {
        Value::Object(map) if format_metric(value).is_none() => {
            for (k, v) in map {
                flatten_into(&join(k), v, out);
            }
        }
        Value::Array(items) if items.iter().any(|v| v.is_object()) => {
            for (i, v) in items.iter().enumerate() {
                flatten_into(&join(&i.to_string()), v, out);
            }
        }
        Value::Array(items) => {
            let cells: Vec<String> = items.iter().map(scalar).collect();
            out.push((prefix.to_string(), cells.join(", ")));
        }
        _ => out.push((prefix.to_string(), scalar(value))),
    }
}

/// Column order of a series: the first row's columns, followed by any new
/// ones later rows add.
pub fn series_headers(rows: &[Vec<(String, String)>]) -> Vec<String> {
    let mut headers: Vec<String> = Vec::new();
    for row in rows {
        for (k, _) in row {
            if !headers.contains(k) {
                headers.push(k.clone());
            }
        }
    }
    headers
}

/// Top-level fields of an object result, nested values rendered inline.
pub fn field_rows(map: &Map<String, Value>) -> Vec<(String, String)> {
    map.iter().map(|(k, v)| (k.clone(), scalar(v))).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_format_metric_variants() {
        assert_eq!(
            format_metric(&json!({"status": "value", "value": "1.25"})),
            Some("1.25".to_string())
        );
        assert_eq!(format_metric(&json!({"status": "unbounded"})), Some("unbounded".to_string()));
        assert_eq!(
            format_metric(&json!({"status": "insufficient_data", "value": {"required": 30, "available": 9}})),
            Some("n/a (9/30 obs)".to_string())
        );
        assert_eq!(format_metric(&json!({"beta": 1})), None);
    }

    #[test]
    fn test_flatten_rolling_point() {
        let row = flatten_row(&json!({
            "date": "2021-03-01",
            "windows": [{"days": 30, "sharpe": null, "volatility": {"status": "undefined"}}]
        }));
        assert_eq!(
            row,
            vec![
                ("date".to_string(), "2021-03-01".to_string()),
                ("windows.0.days".to_string(), "30".to_string()),
                ("windows.0.sharpe".to_string(), String::new()),
                ("windows.0.volatility".to_string(), "undefined".to_string()),
            ]
        );
    }

    #[test]
    fn test_series_headers_union_in_order() {
        let rows = vec![
            vec![("a".to_string(), "1".to_string())],
            vec![("a".to_string(), "2".to_string()), ("b".to_string(), "3".to_string())],
        ];
        assert_eq!(series_headers(&rows), vec!["a".to_string(), "b".to_string()]);
    }
}
