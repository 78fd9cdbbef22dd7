use std::collections::HashMap;

use chrono::NaiveDate;
use tracing::{debug, instrument, warn};

use crate::{
    storage::entities::IntervalRecord,
    utils::time::{days_inclusive, utc_midnight_millis},
};

use super::Query;

/// How the covered day range of a series is picked from the matching records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RangeMode {
    /// Earliest to latest matching calendar day.
    #[default]
    Calendar,
    /// Day of the first matching record to day of the last matching record, in input order.
    /// Unsorted input can produce an inverted range, which yields an empty series.
    ScanOrder,
}

/// Per day minutes from `start` onwards, one entry per calendar day.
#[derive(Debug, Clone, PartialEq)]
pub struct DailySeries {
    start: NaiveDate,
    minutes: Vec<f64>,
}

impl DailySeries {
    pub fn new(start: NaiveDate, minutes: Vec<f64>) -> Self {
        Self { start, minutes }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last covered day. `None` when the series is empty.
    pub fn end(&self) -> Option<NaiveDate> {
        self.days().last().map(|(day, _)| day)
    }

    pub fn minutes(&self) -> &[f64] {
        &self.minutes
    }

    pub fn start_epoch_millis_utc(&self) -> i64 {
        utc_midnight_millis(self.start)
    }

    pub fn days(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.start.iter_days().zip(self.minutes.iter().copied())
    }

    pub fn total_minutes(&self) -> f64 {
        self.minutes.iter().sum()
    }

    pub fn active_days(&self) -> usize {
        self.minutes.iter().filter(|v| **v > 0.).count()
    }

    /// Busiest day. Ties resolve to the earliest day.
    pub fn peak(&self) -> Option<(NaiveDate, f64)> {
        self.days().fold(None, |best, (day, minutes)| match best {
            Some((_, best_minutes)) if best_minutes >= minutes => best,
            _ => Some((day, minutes)),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum AggregateOutcome {
    /// Query was empty or matched nothing usable.
    NoData { skipped: usize },
    Series { series: DailySeries, skipped: usize },
}

impl AggregateOutcome {
    /// Matching records that were left out because they were malformed.
    pub fn skipped(&self) -> usize {
        match self {
            AggregateOutcome::NoData { skipped } | AggregateOutcome::Series { skipped, .. } => {
                *skipped
            }
        }
    }

    pub fn series(&self) -> Option<&DailySeries> {
        match self {
            AggregateOutcome::NoData { .. } => None,
            AggregateOutcome::Series { series, .. } => Some(series),
        }
    }
}

/// Sums time spent in windows matching `query` per calendar day and fills the gaps between the
/// covered days with zeros. Values are minutes and are not rounded.
#[instrument(skip(records), fields(records = records.len()))]
pub fn aggregate(query: &Query, records: &[IntervalRecord], mode: RangeMode) -> AggregateOutcome {
    if query.is_empty() {
        debug!("Empty query, skipping the scan");
        return AggregateOutcome::NoData { skipped: 0 };
    }

    let mut matches = HashMap::<NaiveDate, f64>::new();
    let mut range: Option<(NaiveDate, NaiveDate)> = None;
    let mut skipped = 0usize;

    for record in records.iter().filter(|v| query.matches(&v.window_title)) {
        let (day, delta) = match record
            .day()
            .and_then(|day| Ok((day, record.duration_seconds()?)))
        {
            Ok(v) => v,
            Err(e) => {
                warn!("Skipping record {:?}: {e}", record.window_title);
                skipped += 1;
                continue;
            }
        };

        *matches.entry(day).or_default() += delta;

        range = Some(match (range, mode) {
            (None, _) => (day, day),
            (Some((first, _)), RangeMode::ScanOrder) => (first, day),
            (Some((low, high)), RangeMode::Calendar) => (low.min(day), high.max(day)),
        });
    }

    let Some((start, end)) = range else {
        debug!("No matching records, {skipped} skipped");
        return AggregateOutcome::NoData { skipped };
    };

    let minutes = days_inclusive(start, end)
        .map(|day| matches.get(&day).copied().unwrap_or(0.) / 60.)
        .collect::<Vec<_>>();

    debug!("Aggregated {} days starting {start}", minutes.len());
    AggregateOutcome::Series {
        series: DailySeries::new(start, minutes),
        skipped,
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use crate::{
        search::Query,
        storage::entities::IntervalRecord,
        utils::logging::TEST_LOGGING,
    };

    use super::{aggregate, AggregateOutcome, DailySeries, RangeMode};

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 1, d).unwrap()
    }

    fn record(title: &str, date: &str, start: f64, end: f64) -> IntervalRecord {
        IntervalRecord::new(title, date, start, end)
    }

    fn series(outcome: &AggregateOutcome) -> &DailySeries {
        outcome.series().expect("expected a series")
    }

    #[test]
    fn single_match_is_one_day() {
        *TEST_LOGGING;
        let records = vec![record("Terminal", "2023-01-01", 0., 60.)];
        let outcome = aggregate(&Query::parse("term"), &records, RangeMode::default());

        assert_eq!(
            outcome,
            AggregateOutcome::Series {
                series: DailySeries::new(day(1), vec![1.]),
                skipped: 0,
            }
        );
    }

    #[test]
    fn no_match_is_no_data() {
        let records = vec![record("Terminal", "2023-01-01", 0., 60.)];
        let outcome = aggregate(&Query::parse("xyz"), &records, RangeMode::default());
        assert_eq!(outcome, AggregateOutcome::NoData { skipped: 0 });
    }

    #[test]
    fn blank_query_is_no_data() {
        let records = vec![record("Terminal", "2023-01-01", 0., 60.)];
        for query in ["", "   ", "\t\n"] {
            let outcome = aggregate(&Query::parse(query), &records, RangeMode::default());
            assert_eq!(outcome, AggregateOutcome::NoData { skipped: 0 });
        }
    }

    #[test]
    fn gaps_are_filled_with_zero() {
        let records = vec![
            record("Terminal", "2023-01-01", 0., 30.),
            record("Terminal", "2023-01-03", 100., 190.),
        ];
        let outcome = aggregate(&Query::parse("term"), &records, RangeMode::default());
        let series = series(&outcome);

        assert_eq!(series.start(), day(1));
        assert_eq!(series.end(), Some(day(3)));
        assert_eq!(series.minutes(), [0.5, 0., 1.5]);
    }

    #[test]
    fn same_day_durations_are_summed() {
        let records = vec![
            record("Terminal", "2023-01-02", 0., 60.),
            record("Firefox", "2023-01-02", 60., 600.),
            record("terminal - ssh", "2023-01-02 18:00:00", 1000., 1120.),
        ];
        let outcome = aggregate(&Query::parse("TERM"), &records, RangeMode::default());
        assert_eq!(series(&outcome).minutes(), [3.]);
    }

    #[test]
    fn record_matching_several_tokens_counts_once() {
        let records = vec![record("vim in terminal", "2023-01-01", 0., 60.)];
        let outcome = aggregate(&Query::parse("vim terminal"), &records, RangeMode::default());
        assert_eq!(series(&outcome).minutes(), [1.]);
    }

    #[test]
    fn minutes_are_not_rounded() {
        let records = vec![record("Terminal", "2023-01-01", 0., 45.)];
        let outcome = aggregate(&Query::parse("term"), &records, RangeMode::default());
        assert_eq!(series(&outcome).minutes(), [0.75]);
    }

    #[test]
    fn length_matches_day_span_and_total_is_conserved() {
        let records = vec![
            record("Editor", "2023-01-05", 0., 120.),
            record("Editor", "2023-01-02", 0., 30.),
            record("Browser", "2023-01-03", 0., 999.),
            record("editor", "2023-01-09", 0., 90.),
            record("EDITOR", "2023-01-05", 0., 60.),
        ];
        let outcome = aggregate(&Query::parse("editor"), &records, RangeMode::Calendar);
        let series = series(&outcome);

        assert_eq!(series.start(), day(2));
        assert_eq!(series.minutes().len(), 8);
        assert_eq!(series.total_minutes() * 60., 120. + 30. + 90. + 60.);
        assert_eq!(series.active_days(), 3);
        assert_eq!(series.peak(), Some((day(5), 3.)));
    }

    #[test]
    fn scan_order_uses_first_and_last_match() {
        let records = vec![
            record("Terminal", "2023-01-02", 0., 60.),
            record("Terminal", "2023-01-01", 0., 60.),
            record("Terminal", "2023-01-04", 0., 120.),
        ];
        let outcome = aggregate(&Query::parse("term"), &records, RangeMode::ScanOrder);
        let series = series(&outcome);

        // 2023-01-01 falls outside the scan order range and is dropped.
        assert_eq!(series.start(), day(2));
        assert_eq!(series.minutes(), [1., 0., 2.]);
    }

    #[test]
    fn scan_order_inverted_range_is_empty() {
        let records = vec![
            record("Terminal", "2023-01-03", 0., 60.),
            record("Terminal", "2023-01-01", 0., 60.),
        ];
        let outcome = aggregate(&Query::parse("term"), &records, RangeMode::ScanOrder);
        let series = series(&outcome);
        assert_eq!(series.start(), day(3));
        assert!(series.minutes().is_empty());
        assert_eq!(series.end(), None);

        let outcome = aggregate(&Query::parse("term"), &records, RangeMode::Calendar);
        assert_eq!(outcome.series().unwrap().minutes(), [1., 0., 1.]);
    }

    #[test]
    fn malformed_records_are_skipped_and_counted() {
        let records = vec![
            record("Terminal", "not a date", 0., 60.),
            record("Terminal", "2023-01-01", 60., 0.),
            record("Terminal", "2023-01-01", 0., 60.),
            record("Browser", "also not a date", 0., 60.),
        ];
        let outcome = aggregate(&Query::parse("term"), &records, RangeMode::default());
        assert_eq!(outcome.skipped(), 2);
        assert_eq!(series(&outcome).minutes(), [1.]);

        let outcome = aggregate(&Query::parse("term"), &records[..2], RangeMode::default());
        assert_eq!(outcome, AggregateOutcome::NoData { skipped: 2 });
    }

    #[test]
    fn aggregation_is_repeatable() {
        let records = vec![
            record("Terminal", "2023-01-01", 0., 61.),
            record("Terminal", "2023-01-04", 0., 7.),
        ];
        let query = Query::parse("term");
        let first = aggregate(&query, &records, RangeMode::ScanOrder);
        let second = aggregate(&query, &records, RangeMode::ScanOrder);
        assert_eq!(first, second);
        assert_eq!(records[0], record("Terminal", "2023-01-01", 0., 61.));
    }
}
