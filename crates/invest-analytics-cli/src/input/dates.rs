use chrono::NaiveDate;

/// Accepted textual date layouts, tried in order.
const FORMATS: [&str; 3] = ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y"];

/// Parse `YYYY-MM-DD`, `DD/MM/YYYY` or `DD-MM-YYYY`.
pub fn parse_date(text: &str) -> Result<NaiveDate, String> {
    let text = text.trim();
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .ok_or_else(|| {
            format!(
                "Unrecognised date '{}'. Use YYYY-MM-DD, DD/MM/YYYY or DD-MM-YYYY",
                text
            )
        })
}
