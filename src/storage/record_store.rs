use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};

use anyhow::Result;
use chrono::NaiveDate;
use fs4::tokio::AsyncFileExt;
use futures::{stream, StreamExt, TryStreamExt};
use tokio::{fs::File, io::AsyncReadExt};
use tracing::{debug, instrument, warn};

use crate::utils::time::{date_to_record_name, days_inclusive};

use super::{
    entities::{IntervalRecord, RecordRow},
    tracker_log::{intervals_from_log, is_tracker_log, log_name, parse_log, LogEvent},
};

/// What a single day contributes: ready made records and raw tracker events. Events are only
/// turned into intervals once every day is read, since the last window of a day ends on the next.
#[derive(Default)]
struct DayContents {
    records: Vec<IntervalRecord>,
    events: Vec<LogEvent>,
}

impl DayContents {
    fn into_records(days: impl IntoIterator<Item = DayContents>) -> Vec<IntervalRecord> {
        let mut records = vec![];
        let mut events = vec![];
        for day in days {
            records.extend(day.records);
            events.extend(day.events);
        }
        records.extend(intervals_from_log(events));
        records
    }
}

/// Reads day files out of the records directory. A day can have a JSON lines file named after
/// it (`2023-01-01`) and a tracker log (`2023-01-01 windows.csv`).
pub struct RecordStore {
    record_dir: PathBuf,
}

impl RecordStore {
    pub fn new(record_dir: PathBuf) -> Result<Self, std::io::Error> {
        std::fs::create_dir_all(&record_dir)?;

        Ok(Self { record_dir })
    }

    /// Records for a single day. A missing day file means there was no activity.
    pub async fn load_day(&self, date: NaiveDate) -> Result<Vec<IntervalRecord>> {
        Ok(DayContents::into_records([self.read_day(date).await?]))
    }

    async fn read_day(&self, date: NaiveDate) -> Result<DayContents> {
        let records_path = self.record_dir.join(date_to_record_name(date));
        let records = match read_optional(&records_path).await? {
            Some(content) => parse_records(&content, &records_path),
            None => vec![],
        };
        let log_path = self.record_dir.join(log_name(date));
        let events = match read_optional(&log_path).await? {
            Some(content) => parse_log(&content, &log_path),
            None => vec![],
        };
        Ok(DayContents { records, events })
    }

    /// Records from `start` to `end` inclusive, in day order.
    #[instrument(skip(self))]
    pub async fn load_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<IntervalRecord>> {
        let days = stream::iter(days_inclusive(start, end))
            .map(|day| self.read_day(day))
            .buffered(4)
            .try_collect::<Vec<_>>()
            .await?;
        Ok(DayContents::into_records(days))
    }

    /// Every record in the directory. Records from JSON files come first, ordered by file name,
    /// followed by intervals from all tracker logs ordered by time.
    #[instrument(skip(self))]
    pub async fn load_all(&self) -> Result<Vec<IntervalRecord>> {
        let mut entries = tokio::fs::read_dir(&self.record_dir).await?;
        let mut paths = vec![];
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_file() {
                paths.push(entry.path());
            }
        }
        paths.sort();

        let mut all = DayContents::default();
        for path in paths {
            if is_tracker_log(&path) {
                all.events.extend(parse_log(&read_locked(&path).await?, &path));
            } else if path.extension().is_some_and(|v| v == "csv") {
                debug!("Ignoring {path:?}, not a tracker log");
            } else {
                all.records.extend(parse_records(&read_locked(&path).await?, &path));
            }
        }
        Ok(DayContents::into_records([all]))
    }
}

/// Reads records from a single file. Tracker logs are recognized by name; anything else is
/// either JSON lines or a single JSON array, where rows can be record objects or
/// `[exe_name, window_title, start, end]` arrays.
pub async fn load_file(path: &Path) -> Result<Vec<IntervalRecord>> {
    let content = read_locked(path).await?;
    if is_tracker_log(path) {
        Ok(intervals_from_log(parse_log(&content, path)))
    } else {
        Ok(parse_records(&content, path))
    }
}

async fn read_locked(path: &Path) -> Result<String> {
    debug!("Extracting {path:?}");
    let mut file = File::open(path).await?;
    file.lock_shared()?;
    let mut content = String::new();
    let read = file.read_to_string(&mut content).await;
    file.unlock_async().await?;
    read?;
    Ok(content)
}

/// Like [read_locked], but a missing file is `None`.
async fn read_optional(path: &Path) -> Result<Option<String>> {
    match read_locked(path).await {
        Ok(content) => Ok(Some(content)),
        Err(e) => match e.downcast_ref::<std::io::Error>() {
            Some(io) if io.kind() == ErrorKind::NotFound => Ok(None),
            _ => Err(e),
        },
    }
}

fn parse_records(content: &str, path: &Path) -> Vec<IntervalRecord> {
    if content.trim_start().starts_with('[') {
        if let Ok(rows) = serde_json::from_str::<Vec<serde_json::Value>>(content) {
            return rows
                .into_iter()
                .filter_map(|row| parse_row(serde_json::from_value(row.clone()), &row, path))
                .collect();
        }
    }

    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| parse_row(serde_json::from_str(line), line, path))
        .collect()
}

fn parse_row(
    parsed: serde_json::Result<RecordRow>,
    raw: impl std::fmt::Display,
    path: &Path,
) -> Option<IntervalRecord> {
    match parsed {
        Ok(row) => Some(row.into()),
        Err(e) => {
            // ignore illegal values. Might happen when the tracker was shut down mid write
            warn!("During parsing in path {path:?} found illegal json string {raw}:  {e}");
            None
        }
    }
}
