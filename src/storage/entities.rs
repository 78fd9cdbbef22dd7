use std::sync::Arc;

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::utils::time::date_to_record_name;

/// One logged span of a focused window. `date` is kept as the raw string it was logged with and
/// only turned into a calendar day when a search needs it.
#[derive(PartialEq, Debug, Serialize, Deserialize, Clone)]
pub struct IntervalRecord {
    pub window_title: Arc<str>,
    pub date: Arc<str>,
    /// Epoch seconds. Fractional values are allowed.
    pub start_time: f64,
    pub end_time: f64,
}

/// Reasons a record is left out of aggregation.
#[derive(Debug, Error, PartialEq)]
pub enum MalformedRecord {
    #[error("can't parse {0:?} into a calendar day")]
    UnparseableDate(Arc<str>),
    #[error("interval ends before it starts ({start} > {end})")]
    NegativeDuration { start: f64, end: f64 },
    #[error("interval has a non finite timestamp")]
    NonFinite,
}

impl IntervalRecord {
    pub fn new(
        window_title: impl Into<Arc<str>>,
        date: impl Into<Arc<str>>,
        start_time: f64,
        end_time: f64,
    ) -> Self {
        Self {
            window_title: window_title.into(),
            date: date.into(),
            start_time,
            end_time,
        }
    }

    /// Calendar day of the record, independent of time of day.
    pub fn day(&self) -> Result<NaiveDate, MalformedRecord> {
        parse_record_date(&self.date).ok_or_else(|| MalformedRecord::UnparseableDate(self.date.clone()))
    }

    /// Time spent in the window in seconds.
    pub fn duration_seconds(&self) -> Result<f64, MalformedRecord> {
        if !self.start_time.is_finite() || !self.end_time.is_finite() {
            return Err(MalformedRecord::NonFinite);
        }
        if self.end_time < self.start_time {
            return Err(MalformedRecord::NegativeDuration {
                start: self.start_time,
                end: self.end_time,
            });
        }
        Ok(self.end_time - self.start_time)
    }
}

/// Row shape written by the old chart exporter: `[exe_name, window_title, start, end]`.
#[derive(Debug, Deserialize)]
pub struct ExportedRow(pub Arc<str>, pub Arc<str>, pub f64, pub f64);

impl From<ExportedRow> for IntervalRecord {
    fn from(ExportedRow(_exe_name, window_title, start_time, end_time): ExportedRow) -> Self {
        // Exported rows carry no date, the local day of the start time is used instead.
        let date = local_day_of(start_time)
            .map(date_to_record_name)
            .unwrap_or_default();
        IntervalRecord {
            window_title,
            date: date.into(),
            start_time,
            end_time,
        }
    }
}

/// Either of the record shapes accepted by the loader. Exported rows go first since a struct
/// would also accept a plain array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RecordRow {
    Exported(ExportedRow),
    Record(IntervalRecord),
}

impl From<RecordRow> for IntervalRecord {
    fn from(value: RecordRow) -> Self {
        match value {
            RecordRow::Record(record) => record,
            RecordRow::Exported(row) => row.into(),
        }
    }
}

pub(crate) fn local_day_of(epoch_seconds: f64) -> Option<NaiveDate> {
    if !epoch_seconds.is_finite() {
        return None;
    }
    let millis = (epoch_seconds * 1000.).round() as i64;
    Local
        .timestamp_millis_opt(millis)
        .single()
        .map(|v| v.date_naive())
}

/// Accepts `2023-01-01`, `2023-01-01 13:45:00` and RFC 3339 timestamps.
pub fn parse_record_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(date_time) = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S") {
        return Some(date_time.date());
    }
    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|v| v.date_naive())
}
