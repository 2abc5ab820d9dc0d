use std::io::{self, Read};

use super::file::HistoryFormat;

/// Piped history text and its detected layout. `None` when stdin is a
/// terminal or carries nothing but whitespace.
pub fn read_stdin() -> Result<Option<(HistoryFormat, String)>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }
    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;
    Ok(sniff(&buffer))
}

fn sniff(raw: &str) -> Option<(HistoryFormat, String)> {
    let text = raw.trim_start_matches('\u{feff}').trim();
    if text.is_empty() {
        return None;
    }
    let format = if text.starts_with('{') {
        HistoryFormat::Json
    } else {
        HistoryFormat::Csv
    };
    Some((format, text.to_string()))
}
