//! Day logs written by the window tracker itself, `2023-01-01 windows.csv`. They hold events
//! rather than intervals:
//!   - `window_info,<exe>,<title>,<start>` focus moved to a window at `start`.
//!   - `idle_time,<start>,<end>` there was no input between `start` and `end`.
//!
//! A window keeps focus until the next window event, minus idle time.

use std::{path::Path, sync::Arc};

use anyhow::{anyhow, bail, Result};
use chrono::NaiveDate;
use csv::StringRecord;
use tracing::{debug, warn};

use crate::utils::time::date_to_record_name;

use super::entities::{local_day_of, IntervalRecord};

pub const LOG_SUFFIX: &str = "windows.csv";

#[derive(Debug, Clone, PartialEq)]
pub enum LogEvent {
    Focus { window_title: Arc<str>, at: f64 },
    Idle { start: f64, end: f64 },
}

impl LogEvent {
    fn at(&self) -> f64 {
        match self {
            LogEvent::Focus { at, .. } => *at,
            LogEvent::Idle { start, .. } => *start,
        }
    }
}

/// Name of the tracker log for `date`.
pub fn log_name(date: NaiveDate) -> String {
    format!("{} {LOG_SUFFIX}", date_to_record_name(date))
}

pub fn is_tracker_log(path: &Path) -> bool {
    path.file_name()
        .and_then(|v| v.to_str())
        .is_some_and(|v| v.ends_with(LOG_SUFFIX))
}

/// Reads the events of a single log. Rows that can't be understood are skipped.
pub fn parse_log(content: &str, path: &Path) -> Vec<LogEvent> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    reader
        .records()
        .filter_map(|row| {
            match row.map_err(anyhow::Error::from).and_then(|row| parse_event(&row)) {
                Ok(event) => Some(event),
                Err(e) => {
                    warn!("During parsing in path {path:?} found illegal log row: {e}");
                    None
                }
            }
        })
        .collect()
}

fn parse_event(row: &StringRecord) -> Result<LogEvent> {
    match row.get(0).map(str::trim) {
        Some("window_info") => {
            let title = row.get(2).ok_or_else(|| anyhow!("window row has no title"))?;
            Ok(LogEvent::Focus {
                window_title: clean_title(title).into(),
                at: parse_time(row.get(3))?,
            })
        }
        Some("idle_time") => {
            let start = parse_time(row.get(1))?;
            let end = parse_time(row.get(2))?;
            if end < start {
                bail!("idle time ends before it starts ({start} > {end})");
            }
            Ok(LogEvent::Idle { start, end })
        }
        Some(kind) => bail!("unknown row kind {kind:?}"),
        None => bail!("empty row"),
    }
}

fn parse_time(value: Option<&str>) -> Result<f64> {
    let value = value.ok_or_else(|| anyhow!("row is missing a timestamp"))?;
    let time = value.trim().parse::<f64>()?;
    if !time.is_finite() {
        bail!("timestamp {value:?} isn't finite");
    }
    Ok(time)
}

/// Titles come out of a fixed size buffer and may carry trailing NULs and padding.
fn clean_title(title: &str) -> &str {
    title.trim_end_matches(|c: char| c == '\0' || c.is_whitespace())
}

/// Turns events into intervals. The window focused last has no end yet and is left out.
pub fn intervals_from_log(mut events: Vec<LogEvent>) -> Vec<IntervalRecord> {
    events.sort_by(|a, b| a.at().total_cmp(&b.at()));

    let mut intervals = vec![];
    let mut current: Option<(Arc<str>, f64)> = None;
    for event in events {
        match event {
            LogEvent::Focus { window_title, at } => {
                if let Some((title, since)) = current.take() {
                    push_interval(&mut intervals, title, since, at);
                }
                current = Some((window_title, at));
            }
            LogEvent::Idle { start, end } => {
                if let Some((title, since)) = current.take() {
                    push_interval(&mut intervals, title.clone(), since, start);
                    // Focus doesn't change while idle, the window picks up again afterwards.
                    current = Some((title, since.max(end)));
                }
            }
        }
    }
    if let Some((title, _)) = current {
        debug!("Leaving out {title:?}, it's still focused");
    }
    intervals
}

fn push_interval(intervals: &mut Vec<IntervalRecord>, title: Arc<str>, since: f64, until: f64) {
    if until <= since {
        return;
    }
    let date = local_day_of(since)
        .map(date_to_record_name)
        .unwrap_or_default();
    intervals.push(IntervalRecord {
        window_title: title,
        date: date.into(),
        start_time: since,
        end_time: until,
    });
}
