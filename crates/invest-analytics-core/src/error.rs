use chrono::NaiveDate;
use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// A config field or argument outside its domain.
    #[error("Invalid input: {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    /// An event sequence that cannot be normalized. Carries the offending
    /// date and the computed quantity that broke the invariant.
    #[error("Invalid event on {date}: {field} = {value} ({reason})")]
    InvalidEvent {
        date: NaiveDate,
        field: String,
        value: Decimal,
        reason: String,
    },

    /// Nothing to compute on. Short but non-empty samples are reported
    /// through `Metric::InsufficientData` instead.
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Malformed analysis input: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for AnalyticsError {
    fn from(e: serde_json::Error) -> Self {
        AnalyticsError::SerializationError(e.to_string())
    }
}
