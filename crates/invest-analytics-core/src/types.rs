use rust_decimal::Decimal;
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates expressed as decimals (0.05 = 5%). Used for every internal calculation.
pub type Rate = Decimal;

/// Reported percentages (5 = 5%). Only ever produced at the output boundary.
pub type Percent = Decimal;

/// Year fractions or counts
pub type Years = Decimal;

/// Benchmark index identifier.
///
/// Serialized as a plain string so it can key JSON objects and name CSV
/// columns. Unknown names round-trip through `Other`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BenchmarkId {
    /// Shanghai composite
    Sha,
    /// Shenzhen component
    Szse,
    Csi300,
    Sp500,
    Nasdaq,
    Other(String),
}

impl BenchmarkId {
    pub fn as_str(&self) -> &str {
        match self {
            BenchmarkId::Sha => "sha",
            BenchmarkId::Szse => "szse",
            BenchmarkId::Csi300 => "csi300",
            BenchmarkId::Sp500 => "sp500",
            BenchmarkId::Nasdaq => "nasdaq",
            BenchmarkId::Other(name) => name.as_str(),
        }
    }
}

impl From<String> for BenchmarkId {
    fn from(raw: String) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "sha" | "sse" | "shanghai" => BenchmarkId::Sha,
            "szse" | "sz" | "shenzhen" => BenchmarkId::Szse,
            "csi300" | "hs300" => BenchmarkId::Csi300,
            "sp500" | "spx" => BenchmarkId::Sp500,
            "nasdaq" | "ndx" => BenchmarkId::Nasdaq,
            _ => BenchmarkId::Other(raw.trim().to_string()),
        }
    }
}

impl From<&str> for BenchmarkId {
    fn from(raw: &str) -> Self {
        BenchmarkId::from(raw.to_string())
    }
}

impl From<BenchmarkId> for String {
    fn from(id: BenchmarkId) -> Self {
        id.as_str().to_string()
    }
}

impl fmt::Display for BenchmarkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A ratio or statistic that may not have a numeric answer.
///
/// Degenerate and under-sampled cases are values rather than errors so a
/// report can carry a Sharpe ratio next to an unavailable beta.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum Metric {
    Value(Decimal),
    /// Positive return over a zero denominator (e.g. Calmar with no drawdown).
    Unbounded,
    /// No observations to build the denominator from (e.g. Sortino with no
    /// downside days).
    Undefined,
    InsufficientData { required: usize, available: usize },
}

impl Metric {
    /// Evaluate `f` only when `available` meets the `required` sample gate.
    pub fn gated(available: usize, required: usize, f: impl FnOnce() -> Metric) -> Metric {
        if available < required {
            Metric::InsufficientData {
                required,
                available,
            }
        } else {
            f()
        }
    }

    pub fn value(&self) -> Option<Decimal> {
        match self {
            Metric::Value(v) => Some(*v),
            _ => None,
        }
    }

    pub fn is_value(&self) -> bool {
        matches!(self, Metric::Value(_))
    }

    /// Fraction to percentage. A product past the Decimal range is
    /// `Unbounded`.
    pub fn to_percent(self) -> Metric {
        match self {
            Metric::Value(v) => v
                .checked_mul(Decimal::ONE_HUNDRED)
                .map(Metric::Value)
                .unwrap_or(Metric::Unbounded),
            other => other,
        }
    }

    /// `self / denominator`, carrying sentinels through. Zero or a quotient
    /// past the Decimal range gives `Unbounded`.
    pub fn checked_div(self, denominator: Decimal) -> Metric {
        match self {
            Metric::Value(v) => v
                .checked_div(denominator)
                .map(Metric::Value)
                .unwrap_or(Metric::Unbounded),
            other => other,
        }
    }

    pub fn map(self, f: impl FnOnce(Decimal) -> Decimal) -> Metric {
        match self {
            Metric::Value(v) => Metric::Value(f(v)),
            other => other,
        }
    }
}

impl From<Decimal> for Metric {
    fn from(v: Decimal) -> Self {
        Metric::Value(v)
    }
}

/// Serialize a full-precision quantity rounded to 4 decimal places.
pub(crate) fn serialize_dp4<S: Serializer>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error> {
    Serialize::serialize(&value.round_dp(4), serializer)
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_benchmark_id_aliases() {
        assert_eq!(BenchmarkId::from("HS300"), BenchmarkId::Csi300);
        assert_eq!(BenchmarkId::from(" spx "), BenchmarkId::Sp500);
        assert_eq!(
            BenchmarkId::from("msci_world"),
            BenchmarkId::Other("msci_world".into())
        );
    }

    #[test]
    fn test_benchmark_id_serializes_as_string() {
        let json = serde_json::to_string(&BenchmarkId::Csi300).unwrap();
        assert_eq!(json, "\"csi300\"");
        let back: BenchmarkId = serde_json::from_str("\"sha\"").unwrap();
        assert_eq!(back, BenchmarkId::Sha);
    }

    #[test]
    fn test_metric_gate() {
        let m = Metric::gated(10, 30, || Metric::Value(dec!(1)));
        assert_eq!(
            m,
            Metric::InsufficientData {
                required: 30,
                available: 10
            }
        );
        let m = Metric::gated(30, 30, || Metric::Value(dec!(1)));
        assert_eq!(m.value(), Some(dec!(1)));
    }

    #[test]
    fn test_metric_percent_saturates_to_unbounded() {
        assert_eq!(Metric::Value(dec!(0.125)).to_percent(), Metric::Value(dec!(12.5)));
        assert_eq!(Metric::Value(Decimal::MAX / dec!(10)).to_percent(), Metric::Unbounded);
        assert_eq!(Metric::Undefined.to_percent(), Metric::Undefined);
    }

    #[test]
    fn test_serialized_dp4_rounds_only_the_output() {
        #[derive(Serialize)]
        struct Point {
            #[serde(serialize_with = "serialize_dp4")]
            unit_value: Decimal,
        }
        let json = serde_json::to_value(Point { unit_value: dec!(1.134412) }).unwrap();
        assert_eq!(json["unit_value"], "1.1344");
    }

    #[test]
    fn test_metric_map_preserves_sentinels() {
        assert_eq!(Metric::Unbounded.map(|v| v * dec!(2)), Metric::Unbounded);
        assert_eq!(
            Metric::Value(dec!(2)).map(|v| v * dec!(2)),
            Metric::Value(dec!(4))
        );
    }
}
