//! Chart output for search results. Everything that displays a [ChartData] implements
//! [ChartRenderer]; the search code doesn't care how the chart ends up on screen.

pub mod json;
pub mod terminal;

use anyhow::Result;
use chrono::NaiveDate;

use crate::search::aggregate::DailySeries;

pub const DAY_MILLIS: i64 = 24 * 3600 * 1000;

/// One point per day starting at UTC midnight of `start_day`.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartData {
    pub start_day: NaiveDate,
    pub start_epoch_millis_utc: i64,
    pub point_interval_millis: i64,
    /// Minutes per day.
    pub values: Vec<f64>,
}

impl From<&DailySeries> for ChartData {
    fn from(series: &DailySeries) -> Self {
        Self {
            start_day: series.start(),
            start_epoch_millis_utc: series.start_epoch_millis_utc(),
            point_interval_millis: DAY_MILLIS,
            values: series.minutes().to_vec(),
        }
    }
}

/// Sink for search results. Calling `render` again replaces whatever was shown before.
#[cfg_attr(test, mockall::automock)]
pub trait ChartRenderer {
    fn render(&mut self, chart: &ChartData) -> Result<()>;
}

impl<T: ChartRenderer + ?Sized> ChartRenderer for Box<T> {
    fn render(&mut self, chart: &ChartData) -> Result<()> {
        (**self).render(chart)
    }
}
