//! Table assembler
//!
//! Pure orchestration: per-environment observation streams in, the detail
//! table and the environment rollup table out. No I/O, no retries, no
//! caching — retrieval happens upstream, emission downstream.

use crate::interval::CalendarInterval;
use crate::services::accumulator::ObservationAccumulator;
use crate::services::rollup::rollup_environments;
use crate::types::{Observation, ReportTables, Result, Row, Table, TableKind};

/// One environment's observation stream, in retrieval order.
#[derive(Debug, Clone)]
pub struct EnvironmentObservations {
    pub environment: String,
    pub observations: Vec<Observation>,
}

/// Builds the two report tables for one organization over one interval.
pub struct TableAssembler<'a> {
    interval: &'a CalendarInterval,
}

impl<'a> TableAssembler<'a> {
    pub fn new(interval: &'a CalendarInterval) -> Self {
        Self { interval }
    }

    /// Accumulate every environment's stream (one accumulator per
    /// environment, in the given order), total the rows, sort the detail
    /// table by entity key, and roll the detail rows up per environment.
    ///
    /// The stream order is load-bearing: rollup rows appear in the order
    /// their (organization, environment) pair is first sighted.
    pub fn assemble(
        &self,
        organization: &str,
        streams: &[EnvironmentObservations],
    ) -> Result<ReportTables> {
        let heads = self.interval.period_headers();

        let mut detail_rows: Vec<Row> = Vec::new();
        for stream in streams {
            let mut accumulator = ObservationAccumulator::new(self.interval);
            accumulator.fold(&stream.observations);
            detail_rows.extend(accumulator.into_rows(organization, &stream.environment));
        }

        let rollup_rows = rollup_environments(&detail_rows)?;

        let detail = Table {
            kind: TableKind::Detail,
            header: table_header(&["apiname", "org", "env"], &heads),
            rows: detail_rows,
        };
        let rollup = Table {
            kind: TableKind::Rollup,
            header: table_header(&["org", "env"], &heads),
            rows: rollup_rows,
        };

        Ok(ReportTables { detail, rollup })
    }
}

fn table_header(label_columns: &[&str], heads: &[String]) -> Vec<String> {
    let mut header: Vec<String> = label_columns.iter().map(|s| s.to_string()).collect();
    header.extend(heads.iter().cloned());
    header.push("Total".to_string());
    header
}
