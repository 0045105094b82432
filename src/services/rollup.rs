//! Environment rollup
//!
//! Merges detail rows sharing an (organization, environment) pair into one
//! row per environment by positional summation.

use crate::types::{Result, Row, TallyError};

/// Roll detail rows up to one row per distinct (organization, environment).
///
/// Rows are visited in input order. The first row seen for a pair seeds the
/// rollup row by copying its columns verbatim; every later row for the pair
/// adds its columns position-wise. Totals accumulate the same way, which
/// matches re-summing the summed columns. Output order is first-sighting
/// order of each pair. A row whose period vector disagrees in length with
/// its pair's seed fails fast with `ShapeMismatch`.
pub fn rollup_environments(rows: &[Row]) -> Result<Vec<Row>> {
    let mut lines: Vec<Row> = Vec::new();

    for row in rows {
        let existing = lines
            .iter_mut()
            .find(|l| l.organization == row.organization && l.environment == row.environment);

        match existing {
            Some(line) => {
                if line.periods.len() != row.periods.len() {
                    return Err(TallyError::ShapeMismatch {
                        expected: line.periods.len(),
                        actual: row.periods.len(),
                    });
                }
                for (acc, v) in line.periods.iter_mut().zip(&row.periods) {
                    *acc += v;
                }
                line.total += row.total;
            }
            None => lines.push(Row {
                key: row.environment.clone(),
                organization: row.organization.clone(),
                environment: row.environment.clone(),
                periods: row.periods.clone(),
                total: row.total,
            }),
        }
    }

    Ok(lines)
}
