//! Stats API payload parser
//!
//! Decodes the analytics JSON (`environments[].dimensions[].metrics[].values[]`)
//! into `Observation`s for the accumulator.

use crate::types::{Observation, Result, TallyError};
use chrono::{DateTime, Duration, NaiveDate};
use serde::Deserialize;

/// Stats payload structure (zero-copy dimension names)
#[derive(Deserialize)]
struct StatsPayload<'a> {
    #[serde(borrow, default)]
    environments: Vec<EnvironmentStats<'a>>,
}

#[derive(Deserialize)]
struct EnvironmentStats<'a> {
    /// Absent when the environment recorded no traffic
    #[serde(borrow, default)]
    dimensions: Option<Vec<Dimension<'a>>>,
}

#[derive(Deserialize)]
struct Dimension<'a> {
    /// API proxy name
    name: &'a str,
    #[serde(borrow, default)]
    metrics: Vec<Metric<'a>>,
}

#[derive(Deserialize)]
struct Metric<'a> {
    #[serde(borrow, default)]
    values: Vec<MetricPoint<'a>>,
}

#[derive(Deserialize)]
struct MetricPoint<'a> {
    /// Epoch milliseconds
    timestamp: f64,
    #[serde(borrow)]
    value: MetricValue<'a>,
}

/// The API emits counts as JSON numbers or numeric strings
#[derive(Deserialize)]
#[serde(untagged)]
enum MetricValue<'a> {
    Number(f64),
    Text(&'a str),
}

impl MetricValue<'_> {
    fn as_f64(&self) -> Option<f64> {
        match self {
            MetricValue::Number(n) => Some(*n),
            MetricValue::Text(s) => s.trim().parse().ok(),
        }
    }
}

/// Parse a raw stats response body into observations.
///
/// Timestamps are shifted forward one calendar day before column mapping:
/// the endpoint stamps each datapoint with the end of the prior day. Records
/// with an unusable timestamp or value are skipped with a warning; a missing
/// `dimensions` array means no traffic and yields an empty stream.
pub fn parse_traffic_payload(payload: &mut [u8], verbose: bool) -> Result<Vec<Observation>> {
    let parsed: StatsPayload = simd_json::from_slice(payload)
        .map_err(|e| TallyError::Parse(format!("bad stats payload: {}", e)))?;

    let mut observations = Vec::new();
    for environment in &parsed.environments {
        let Some(dimensions) = &environment.dimensions else {
            continue;
        };
        for dimension in dimensions {
            for metric in &dimension.metrics {
                for point in &metric.values {
                    let Some(date) = observation_date(point.timestamp) else {
                        eprintln!(
                            "[traffictally] Warning: unusable timestamp {} for {}, skipping",
                            point.timestamp, dimension.name
                        );
                        continue;
                    };
                    let Some(value) = point.value.as_f64() else {
                        eprintln!(
                            "[traffictally] Warning: unusable metric value for {}, skipping",
                            dimension.name
                        );
                        continue;
                    };
                    if verbose {
                        println!("{:<28} {:>10} {}", dimension.name, date, value);
                    }
                    observations.push(Observation::new(dimension.name, date, value));
                }
            }
        }
    }
    Ok(observations)
}

/// The datapoint's calendar date: epoch-ms timestamp, shifted one day forward.
fn observation_date(timestamp_ms: f64) -> Option<NaiveDate> {
    if !timestamp_ms.is_finite() {
        return None;
    }
    let stamped = DateTime::from_timestamp_millis(timestamp_ms as i64)?;
    Some(stamped.date_naive() + Duration::days(1))
}
