//! Search a log of focused windows by title and see how much time matching windows took each
//! day. Records are aggregated into a dense per day series and drawn either in the terminal or
//! as a JSON series for a charting library.
//!

pub mod chart;
pub mod cli;
pub mod search;
pub mod storage;
pub mod utils;
