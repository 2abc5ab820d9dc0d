//! Input and intermediate time-series records.
//!
//! A portfolio history arrives as contribution events plus a map of benchmark
//! series keyed by [`BenchmarkId`]. Benchmarks are sparse: levels are
//! forward-filled and then aligned onto the dates of the unit-value series.

use chrono::NaiveDate;
use log::{debug, warn};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::config::AnalyticsConfig;
use crate::normalize::normalize;
use crate::types::*;
use crate::AnalyticsResult;

/// A user-entered valuation: cumulative principal and total market value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContributionEvent {
    pub date: NaiveDate,
    pub principal: Money,
    pub market_value: Money,
}

/// One point of the cash-flow-adjusted unit-value series.
///
/// `units` and `unit_value` keep full precision; only their serialized form
/// is rounded to 4 decimal places.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitValuePoint {
    pub date: NaiveDate,
    #[serde(serialize_with = "serialize_dp4")]
    pub units: Decimal,
    #[serde(serialize_with = "serialize_dp4")]
    pub unit_value: Decimal,
    pub principal: Money,
    pub market_value: Money,
}

/// A raw benchmark observation. `None` or non-positive levels are gaps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkPoint {
    pub date: NaiveDate,
    #[serde(default)]
    pub level: Option<Decimal>,
}

/// A benchmark level after forward-filling. Zero until the first valid level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilledLevel {
    pub date: NaiveDate,
    pub level: Decimal,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BenchmarkSeries {
    pub points: Vec<BenchmarkPoint>,
}

impl BenchmarkSeries {
    pub fn new(points: Vec<BenchmarkPoint>) -> Self {
        Self { points }
    }

    /// Build from dense `(date, level)` pairs.
    pub fn from_levels(levels: impl IntoIterator<Item = (NaiveDate, Decimal)>) -> Self {
        Self {
            points: levels
                .into_iter()
                .map(|(date, level)| BenchmarkPoint {
                    date,
                    level: Some(level),
                })
                .collect(),
        }
    }

    pub fn forward_filled(&self) -> Vec<FilledLevel> {
        forward_fill(&self.points)
    }

    /// Forward-filled level on each of `dates` (which must be ascending).
    pub fn align_to(&self, dates: &[NaiveDate]) -> Vec<Decimal> {
        let filled = self.forward_filled();
        dates
            .iter()
            .map(|d| level_on_or_before(&filled, *d))
            .collect()
    }

    pub fn has_valid_level(&self) -> bool {
        self.points
            .iter()
            .any(|p| matches!(p.level, Some(l) if l > Decimal::ZERO))
    }
}

/// Forward-fill benchmark gaps with the last positive level.
///
/// Implemented as a fold whose accumulator is the filled series itself: the
/// last-known-good level is always the tail of what has been produced so far.
pub fn forward_fill(points: &[BenchmarkPoint]) -> Vec<FilledLevel> {
    let mut sorted: Vec<&BenchmarkPoint> = points.iter().collect();
    sorted.sort_by_key(|p| p.date);

    sorted
        .into_iter()
        .fold(Vec::with_capacity(points.len()), |mut filled, p| {
            let last = filled
                .last()
                .map(|f: &FilledLevel| f.level)
                .unwrap_or(Decimal::ZERO);
            let level = match p.level {
                Some(l) if l > Decimal::ZERO => l,
                _ => last,
            };
            filled.push(FilledLevel {
                date: p.date,
                level,
            });
            filled
        })
}

/// Level of the latest filled point dated on or before `date`; zero if none.
pub fn level_on_or_before(filled: &[FilledLevel], date: NaiveDate) -> Decimal {
    let idx = filled.partition_point(|f| f.date <= date);
    if idx == 0 {
        Decimal::ZERO
    } else {
        filled[idx - 1].level
    }
}

/// Split a filled series into parallel date and level vectors.
pub fn unzip_levels(filled: &[FilledLevel]) -> (Vec<NaiveDate>, Vec<Decimal>) {
    filled.iter().map(|f| (f.date, f.level)).unzip()
}

/// Standard input for every portfolio-level analysis.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisInput {
    pub events: Vec<ContributionEvent>,
    #[serde(default)]
    pub benchmarks: BTreeMap<BenchmarkId, BenchmarkSeries>,
    #[serde(default)]
    pub config: AnalyticsConfig,
}

/// Normalized unit values with every benchmark aligned onto the same dates.
#[derive(Debug, Clone)]
pub struct PreparedSeries {
    pub points: Vec<UnitValuePoint>,
    pub dates: Vec<NaiveDate>,
    pub unit_values: Vec<Decimal>,
    pub benchmarks: BTreeMap<BenchmarkId, Vec<Decimal>>,
}

impl PreparedSeries {
    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn start_date(&self) -> Option<NaiveDate> {
        self.dates.first().copied()
    }

    pub fn end_date(&self) -> Option<NaiveDate> {
        self.dates.last().copied()
    }
}

impl AnalysisInput {
    /// Parse an input document. Missing `benchmarks` and `config` take
    /// their defaults.
    pub fn from_json(text: &str) -> AnalyticsResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Validate the config, normalize the events and align the benchmarks.
    ///
    /// Returns the prepared series together with warnings for benchmarks that
    /// never carry a valid level.
    pub fn prepare(&self) -> AnalyticsResult<(PreparedSeries, Vec<String>)> {
        self.config.validate()?;
        let points = normalize(&self.events)?;
        let dates: Vec<NaiveDate> = points.iter().map(|p| p.date).collect();
        let unit_values: Vec<Decimal> = points.iter().map(|p| p.unit_value).collect();

        let mut warnings = Vec::new();
        let benchmarks: BTreeMap<BenchmarkId, Vec<Decimal>> = self
            .benchmarks
            .iter()
            .map(|(id, series)| {
                if !series.has_valid_level() {
                    warn!("benchmark {} has no valid levels", id);
                    warnings.push(format!(
                        "Benchmark '{}' has no positive levels; its metrics are unavailable",
                        id
                    ));
                }
                (id.clone(), series.align_to(&dates))
            })
            .collect();

        debug!(
            "prepared {} unit-value points against {} benchmarks",
            dates.len(),
            benchmarks.len()
        );

        Ok((
            PreparedSeries {
                points,
                dates,
                unit_values,
                benchmarks,
            },
            warnings,
        ))
    }
}
