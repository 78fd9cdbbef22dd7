use std::io::Write;

use ansi_term::{Colour, Style};
use anyhow::Result;

use crate::utils::time::{format_duration, minutes_to_duration};

use super::{ChartData, ChartRenderer};

const DEFAULT_BAR_WIDTH: usize = 40;

/// Draws a horizontal bar per day, scaled to the busiest day.
pub struct TerminalChart<W: Write> {
    out: W,
    bar_width: usize,
    colored: bool,
}

impl<W: Write> TerminalChart<W> {
    pub fn new(out: W, colored: bool) -> Self {
        Self {
            out,
            bar_width: DEFAULT_BAR_WIDTH,
            colored,
        }
    }

    pub fn with_bar_width(self, bar_width: usize) -> Self {
        Self { bar_width, ..self }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn paint(&self, style: Style, text: &str) -> String {
        if self.colored {
            style.paint(text).to_string()
        } else {
            text.to_string()
        }
    }

    fn bar_len(&self, value: f64, max: f64) -> usize {
        if max <= 0. {
            return 0;
        }
        (value / max * self.bar_width as f64).round() as usize
    }
}

impl<W: Write> ChartRenderer for TerminalChart<W> {
    fn render(&mut self, chart: &ChartData) -> Result<()> {
        let max = chart.values.iter().copied().fold(0., f64::max);
        let total = chart.values.iter().sum::<f64>();

        let header = self.paint(Style::new().bold(), "Time spent in selected windows");
        writeln!(self.out)?;
        writeln!(self.out, "{header}")?;

        for (day, minutes) in chart.start_day.iter_days().zip(chart.values.iter().copied()) {
            let bar = "█".repeat(self.bar_len(minutes, max));
            let bar = format!("{bar:<width$}", width = self.bar_width);
            let bar = self.paint(Colour::Cyan.normal(), &bar);
            writeln!(
                self.out,
                "{}  {bar}  {}",
                day.format("%Y-%m-%d"),
                format_duration(minutes_to_duration(minutes))
            )?;
        }

        let footer = format!(
            "{} days, total {}",
            chart.values.len(),
            format_duration(minutes_to_duration(total))
        );
        writeln!(self.out, "{}", self.paint(Style::new().dimmed(), &footer))?;
        self.out.flush()?;
        Ok(())
    }
}
