//! Report data model: observations in, tables out

use chrono::NaiveDate;

/// One raw datapoint extracted from an analytics payload
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    /// API proxy name
    pub entity: String,
    /// Calendar date the traffic was recorded for
    pub date: NaiveDate,
    /// Message count reported for that date
    pub value: f64,
}

impl Observation {
    pub fn new(entity: impl Into<String>, date: NaiveDate, value: f64) -> Self {
        Self {
            entity: entity.into(),
            date,
            value,
        }
    }
}

/// One report row: an entity (detail table) or an environment (rollup table)
/// with its per-period values and trailing total.
///
/// `total` is derived from `periods`; it is recomputed after accumulation and
/// never mutated directly afterward.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    /// Entity name (detail) or environment name (rollup)
    pub key: String,
    pub organization: String,
    pub environment: String,
    /// One value per period, in interval order
    pub periods: Vec<f64>,
    pub total: f64,
}

impl Row {
    /// Render this row's fields for emission, shaped for `kind`.
    pub fn fields(&self, kind: TableKind) -> Vec<String> {
        let mut out = match kind {
            TableKind::Detail => vec![
                self.key.clone(),
                self.organization.clone(),
                self.environment.clone(),
            ],
            TableKind::Rollup => vec![self.organization.clone(), self.environment.clone()],
        };
        out.extend(self.periods.iter().map(|v| format_value(*v)));
        out.push(format_value(self.total));
        out
    }
}

/// Which leading label columns a table's rows carry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    /// apiname, org, env, periods..., Total
    Detail,
    /// org, env, periods..., Total
    Rollup,
}

/// A finished table: one header label row plus data rows
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub kind: TableKind,
    pub header: Vec<String>,
    pub rows: Vec<Row>,
}

/// The two tables produced by one assembly pass
#[derive(Debug, Clone, PartialEq)]
pub struct ReportTables {
    pub detail: Table,
    pub rollup: Table,
}

/// Whole counts print without a decimal point; fractional values keep it.
fn format_value(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{}", v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_row() -> Row {
        Row {
            key: "orders-v1".into(),
            organization: "acme".into(),
            environment: "prod".into(),
            periods: vec![10.0, 20.5, 0.0],
            total: 30.5,
        }
    }

    #[test]
    fn test_detail_fields_include_entity() {
        let fields = sample_row().fields(TableKind::Detail);
        assert_eq!(
            fields,
            vec!["orders-v1", "acme", "prod", "10", "20.5", "0", "30.5"]
        );
    }

    #[test]
    fn test_rollup_fields_drop_entity() {
        let fields = sample_row().fields(TableKind::Rollup);
        assert_eq!(fields, vec!["acme", "prod", "10", "20.5", "0", "30.5"]);
    }

    #[test]
    fn test_format_value_whole_numbers() {
        assert_eq!(format_value(15000.0), "15000");
        assert_eq!(format_value(0.0), "0");
    }

    #[test]
    fn test_format_value_fractional() {
        assert_eq!(format_value(0.25), "0.25");
    }
}
