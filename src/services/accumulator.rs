//! Observation accumulator
//!
//! Folds sparse (entity, date, value) observations into dense per-entity
//! rows sized to a `CalendarInterval`'s period count.

use crate::interval::CalendarInterval;
use crate::services::summarizer;
use crate::types::{Observation, Row};
use std::collections::HashMap;

/// Accumulates one environment's observation stream into per-entity rows.
///
/// Cell policy is last write wins: a later observation mapping to the same
/// (entity, column) overwrites the earlier value, no summation. The first
/// sighting of an entity lazily allocates a zero row. Out-of-range dates are
/// not validated here — `column_index` clamps them to the first or last
/// period.
pub struct ObservationAccumulator<'a> {
    interval: &'a CalendarInterval,
    rows: HashMap<String, Vec<f64>>,
}

impl<'a> ObservationAccumulator<'a> {
    pub fn new(interval: &'a CalendarInterval) -> Self {
        Self {
            interval,
            rows: HashMap::new(),
        }
    }

    /// Apply a single observation.
    pub fn insert(&mut self, observation: &Observation) {
        let interval = self.interval;
        let row = self
            .rows
            .entry(observation.entity.clone())
            .or_insert_with(|| interval.zero_row());
        let col = interval.column_index(observation.date);
        row[col] = observation.value;
    }

    /// Fold a whole stream in iteration order.
    pub fn fold(&mut self, observations: &[Observation]) {
        for observation in observations {
            self.insert(observation);
        }
    }

    /// Drain into finished rows tagged with (organization, environment),
    /// sorted by entity key, totals computed.
    pub fn into_rows(self, organization: &str, environment: &str) -> Vec<Row> {
        let mut keys: Vec<String> = self.rows.keys().cloned().collect();
        keys.sort();

        let mut rows = Vec::with_capacity(keys.len());
        let mut table = self.rows;
        for key in keys {
            if let Some(periods) = table.remove(&key) {
                let total = summarizer::total(&periods);
                rows.push(Row {
                    key,
                    organization: organization.to_string(),
                    environment: environment.to_string(),
                    periods,
                    total,
                });
            }
        }
        rows
    }
}
