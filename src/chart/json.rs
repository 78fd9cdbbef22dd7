use std::io::Write;

use anyhow::Result;
use serde::Serialize;

use super::{ChartData, ChartRenderer};

/// Area series in the shape charting libraries take directly: a start point, a fixed interval
/// and the values.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SeriesDocument<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    name: &'static str,
    point_start: i64,
    point_interval: i64,
    data: &'a [f64],
}

/// Writes each chart as a single JSON line.
pub struct JsonChart<W: Write> {
    out: W,
}

impl<W: Write> JsonChart<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ChartRenderer for JsonChart<W> {
    fn render(&mut self, chart: &ChartData) -> Result<()> {
        let document = SeriesDocument {
            kind: "area",
            name: "Minutes",
            point_start: chart.start_epoch_millis_utc,
            point_interval: chart.point_interval_millis,
            data: &chart.values,
        };
        serde_json::to_writer(&mut self.out, &document)?;
        writeln!(self.out)?;
        self.out.flush()?;
        Ok(())
    }
}
