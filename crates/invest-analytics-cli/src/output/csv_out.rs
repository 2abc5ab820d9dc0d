use serde_json::Value;
use std::io;

use super::{field_rows, flatten_row, scalar, series_headers};

/// Write output as CSV to stdout.
///
/// Series results (unit values, cumulative returns, rolling windows) are
/// written one row per point so they load straight into a spreadsheet.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    let result = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);
    let outcome = match result {
        Value::Object(map) => write_pairs(&mut wtr, &field_rows(map)),
        Value::Array(items) => write_series(&mut wtr, items),
        other => wtr.write_record([scalar(other)]),
    };
    if let Err(e) = outcome.and_then(|_| wtr.flush().map_err(csv::Error::from)) {
        eprintln!("CSV write error: {}", e);
    }
}

fn write_pairs<W: io::Write>(wtr: &mut csv::Writer<W>, rows: &[(String, String)]) -> csv::Result<()> {
    wtr.write_record(["field", "value"])?;
    for (k, v) in rows {
        wtr.write_record([k, v])?;
    }
    Ok(())
}

fn write_series<W: io::Write>(wtr: &mut csv::Writer<W>, items: &[Value]) -> csv::Result<()> {
    let rows: Vec<Vec<(String, String)>> = items.iter().map(flatten_row).collect();
    let headers = series_headers(&rows);
    if headers.is_empty() {
        return Ok(());
    }
    wtr.write_record(&headers)?;
    for row in &rows {
        let record: Vec<&str> = headers
            .iter()
            .map(|h| {
                row.iter()
                    .find(|(k, _)| k == h)
                    .map(|(_, v)| v.as_str())
                    .unwrap_or("")
            })
            .collect();
        wtr.write_record(&record)?;
    }
    Ok(())
}
