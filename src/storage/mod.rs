//!  Records are read through [record_store::RecordStore].
//!   - There is a directory with all the records.
//!   - Each file holds records for a single day and is named after it (`2023-01-01`).
//!   - Every line of a file is one JSON encoded [entities::IntervalRecord].
//!   - Tracker logs (`2023-01-01 windows.csv`) can sit next to them, see [tracker_log].

pub mod entities;
pub mod record_store;
pub mod tracker_log;
