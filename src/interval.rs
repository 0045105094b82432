//! Calendar interval partitioning
//!
//! A `CalendarInterval` is a closed date range plus a granularity. It yields
//! the period column heads, zero rows, month segments, and the date-to-column
//! mapping the accumulator indexes observations with.

use crate::types::{Result, TallyError};
use chrono::{Datelike, Duration, Months, NaiveDate};

/// Period unit, fixed per interval
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    Daily,
    Monthly,
}

impl Granularity {
    /// `timeUnit` value for the stats API query
    pub fn time_unit(&self) -> &'static str {
        match self {
            Granularity::Daily => "day",
            Granularity::Monthly => "month",
        }
    }

    /// Compact numeric date format accepted by `from_compact`
    fn compact_format(&self) -> &'static str {
        match self {
            Granularity::Daily => "%Y%m%d",
            Granularity::Monthly => "%Y%m",
        }
    }

    /// Per-period column head format
    fn head_format(&self) -> &'static str {
        match self {
            Granularity::Daily => "%b %d",
            Granularity::Monthly => "%Y-%b",
        }
    }

    /// Format used for the whole-interval label
    fn label_format(&self) -> &'static str {
        match self {
            Granularity::Daily => "%Y%m%d",
            Granularity::Monthly => "%Y%b",
        }
    }
}

/// A closed date range partitioned into day- or month-aligned periods.
///
/// Periods start at `start` and advance by one unit until `end` is passed;
/// the final period may be partial but still gets a column. Month increments
/// use chrono's calendar month-add (day-of-month clamps on shorter months),
/// not fixed 30-day arithmetic. Immutable once constructed; derived sequences
/// are recomputed on each call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CalendarInterval {
    start: NaiveDate,
    end: NaiveDate,
    granularity: Granularity,
}

impl CalendarInterval {
    /// Build from explicit date boundaries. Fails if `start > end`.
    pub fn new(start: NaiveDate, end: NaiveDate, granularity: Granularity) -> Result<Self> {
        if start > end {
            return Err(TallyError::Parse(format!(
                "interval start {} is after end {}",
                start, end
            )));
        }
        Ok(Self {
            start,
            end,
            granularity,
        })
    }

    /// Build from compact numeric strings (`YYYYMMDD` daily, `YYYYMM`
    /// monthly). The start snaps to the first day of its month; a missing
    /// end defaults to the last day of the start's month.
    pub fn from_compact(start: &str, end: Option<&str>, granularity: Granularity) -> Result<Self> {
        let parsed_start = parse_compact(start, granularity)?;
        let start = first_of_month(parsed_start);
        let end = match end {
            Some(s) => parse_compact(s, granularity)?,
            None => end_of_month(start),
        };
        Self::new(start, end, granularity)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    fn advance(&self, t: NaiveDate) -> NaiveDate {
        match self.granularity {
            Granularity::Daily => t + Duration::days(1),
            Granularity::Monthly => t + Months::new(1),
        }
    }

    /// Visit each period start with its ordinal index, in order.
    fn walk<F: FnMut(NaiveDate, usize)>(&self, mut f: F) {
        let mut t = self.start;
        let mut ix = 0;
        while t <= self.end {
            f(t, ix);
            t = self.advance(t);
            ix += 1;
        }
    }

    /// One column head per period: `"Mar 06"` daily, `"2023-Jan"` monthly.
    pub fn period_headers(&self) -> Vec<String> {
        let format = self.granularity.head_format();
        let mut heads = Vec::new();
        self.walk(|t, _| heads.push(t.format(format).to_string()));
        heads
    }

    /// A fresh all-zero row sized to the period count.
    pub fn zero_row(&self) -> Vec<f64> {
        let mut row = Vec::new();
        self.walk(|_, _| row.push(0.0));
        row
    }

    /// Number of periods in the interval.
    pub fn period_count(&self) -> usize {
        let mut count = 0;
        self.walk(|_, _| count += 1);
        count
    }

    /// Each period start paired with the last day of its calendar month.
    /// Callers use the pair for duration checks (inclusive day counts land
    /// in 28..=31 for whole-month segments).
    pub fn segments(&self) -> Vec<(NaiveDate, NaiveDate)> {
        let mut segments = Vec::new();
        self.walk(|t, _| segments.push((t, end_of_month(t))));
        segments
    }

    /// Column for a date: the last period whose start is `<= date`. Dates
    /// before the first period map to column 0, dates past the last period
    /// start stay in the final column. Monotonic non-decreasing in `date`.
    pub fn column_index(&self, date: NaiveDate) -> usize {
        let mut col = 0;
        self.walk(|t, ix| {
            if date >= t {
                col = ix;
            }
        });
        col
    }

    /// Single compact label for the whole interval, e.g. `2023Jan-2023Oct`.
    /// Used for filenames, not per-period columns.
    pub fn period_label(&self) -> String {
        let format = self.granularity.label_format();
        format!(
            "{}-{}",
            self.start.format(format),
            self.end.format(format)
        )
    }

    /// Whole days between start and end.
    pub fn duration_in_days(&self) -> i64 {
        (self.end - self.start).num_days()
    }
}

fn parse_compact(s: &str, granularity: Granularity) -> Result<NaiveDate> {
    let parsed = match granularity {
        Granularity::Daily => NaiveDate::parse_from_str(s, granularity.compact_format()),
        // YYYYMM carries no day; pin it to the 1st for parsing
        Granularity::Monthly if s.len() == 6 => {
            NaiveDate::parse_from_str(&format!("{}01", s), "%Y%m%d")
        }
        Granularity::Monthly => {
            return Err(TallyError::Parse(format!(
                "bad compact month '{}': expected YYYYMM",
                s
            )))
        }
    };
    parsed.map_err(|e| TallyError::Parse(format!("bad compact date '{}': {}", s, e)))
}

fn first_of_month(d: NaiveDate) -> NaiveDate {
    d.with_day(1).unwrap_or(d)
}

fn end_of_month(d: NaiveDate) -> NaiveDate {
    first_of_month(d) + Months::new(1) - Duration::days(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// The reference interval from the monthly report: Jan 1 through Oct 23.
    fn reference_interval() -> CalendarInterval {
        CalendarInterval::new(date(2023, 1, 1), date(2023, 10, 23), Granularity::Monthly).unwrap()
    }

    #[test]
    fn test_monthly_period_heads() {
        let heads = reference_interval().period_headers();
        assert_eq!(heads.len(), 10);
        assert_eq!(heads[0], "2023-Jan");
        assert_eq!(heads[9], "2023-Oct");
    }

    #[test]
    fn test_duration_in_days() {
        assert_eq!(reference_interval().duration_in_days(), 295);
    }

    #[test]
    fn test_column_for_date() {
        let interval = reference_interval();
        assert_eq!(interval.column_index(date(2023, 8, 14)), 7);
    }

    #[test]
    fn test_column_index_monotonic() {
        let interval = reference_interval();
        let mut last = 0;
        let mut d = date(2022, 12, 15);
        while d <= date(2023, 11, 15) {
            let col = interval.column_index(d);
            assert!(col >= last, "column regressed at {}", d);
            last = col;
            d = d + Duration::days(7);
        }
    }

    #[test]
    fn test_column_index_clamps_at_boundaries() {
        let interval = reference_interval();
        // Before every period start: column 0 by policy, not an error
        assert_eq!(interval.column_index(date(2022, 6, 1)), 0);
        // The final period absorbs everything after it
        assert_eq!(interval.column_index(date(2024, 3, 1)), 9);
    }

    #[test]
    fn test_segments_cover_whole_months() {
        let segments = reference_interval().segments();
        assert_eq!(segments.len(), 10);
        for (start, end) in segments {
            let days = (end - start).num_days() + 1;
            assert!(
                (28..=31).contains(&days),
                "segment {}..{} spans {} days",
                start,
                end,
                days
            );
        }
    }

    #[test]
    fn test_derived_sequences_agree_on_length() {
        for interval in [
            reference_interval(),
            CalendarInterval::new(date(2023, 3, 1), date(2023, 3, 10), Granularity::Daily).unwrap(),
            CalendarInterval::new(date(2024, 2, 1), date(2024, 2, 29), Granularity::Daily).unwrap(),
        ] {
            let n = interval.period_count();
            assert_eq!(interval.period_headers().len(), n);
            assert_eq!(interval.segments().len(), n);
            assert_eq!(interval.zero_row().len(), n);
        }
    }

    #[test]
    fn test_daily_heads_format() {
        let interval =
            CalendarInterval::new(date(2023, 3, 1), date(2023, 3, 10), Granularity::Daily).unwrap();
        let heads = interval.period_headers();
        assert_eq!(heads.len(), 10);
        assert_eq!(heads[0], "Mar 01");
        assert_eq!(heads[5], "Mar 06");
    }

    #[test]
    fn test_partial_final_period_still_gets_a_column() {
        // Oct 23 falls mid-month; October still appears
        let heads = reference_interval().period_headers();
        assert_eq!(heads.last().map(String::as_str), Some("2023-Oct"));
    }

    #[test]
    fn test_monthly_month_add_clamps_short_months() {
        // Jan 31 + 1 month lands on Feb 29 (leap), not a 30-day offset
        let interval =
            CalendarInterval::new(date(2024, 1, 31), date(2024, 3, 31), Granularity::Monthly)
                .unwrap();
        let segments = interval.segments();
        assert_eq!(segments[1].0, date(2024, 2, 29));
    }

    #[test]
    fn test_from_compact_monthly_defaults_to_one_month() {
        let interval = CalendarInterval::from_compact("202301", None, Granularity::Monthly).unwrap();
        assert_eq!(interval.start(), date(2023, 1, 1));
        assert_eq!(interval.end(), date(2023, 1, 31));
        assert_eq!(interval.period_count(), 1);
    }

    #[test]
    fn test_from_compact_daily_snaps_start_to_month() {
        let interval =
            CalendarInterval::from_compact("20230315", Some("20230402"), Granularity::Daily)
                .unwrap();
        assert_eq!(interval.start(), date(2023, 3, 1));
        assert_eq!(interval.end(), date(2023, 4, 2));
    }

    #[test]
    fn test_from_compact_explicit_end() {
        let interval =
            CalendarInterval::from_compact("202301", Some("202310"), Granularity::Monthly).unwrap();
        assert_eq!(interval.period_count(), 10);
    }

    #[test]
    fn test_period_label() {
        assert_eq!(reference_interval().period_label(), "2023Jan-2023Oct");
    }

    #[test]
    fn test_period_label_daily() {
        let interval =
            CalendarInterval::new(date(2023, 3, 1), date(2023, 3, 10), Granularity::Daily).unwrap();
        assert_eq!(interval.period_label(), "20230301-20230310");
    }

    #[test]
    fn test_malformed_compact_string_is_parse_error() {
        let err = CalendarInterval::from_compact("2023", None, Granularity::Monthly).unwrap_err();
        assert!(matches!(err, TallyError::Parse(_)));

        let err =
            CalendarInterval::from_compact("2023xx15", None, Granularity::Daily).unwrap_err();
        assert!(matches!(err, TallyError::Parse(_)));
    }

    #[test]
    fn test_reversed_range_is_parse_error() {
        let err = CalendarInterval::new(date(2023, 10, 1), date(2023, 1, 1), Granularity::Monthly)
            .unwrap_err();
        assert!(matches!(err, TallyError::Parse(_)));
    }

    #[test]
    fn test_time_unit() {
        assert_eq!(Granularity::Daily.time_unit(), "day");
        assert_eq!(Granularity::Monthly.time_unit(), "month");
    }
}
