use std::{
    io::{self, IsTerminal, Write},
    path::{Path, PathBuf},
};

use anyhow::Result;
use chrono::{DateTime, Duration, Local, NaiveDate};
use chrono_english::parse_date_string;
use clap::{CommandFactory, ValueEnum};
use tracing::info;

use crate::{
    chart::{json::JsonChart, terminal::TerminalChart, ChartRenderer},
    search::{aggregate::AggregateOutcome, Query},
    storage::{
        entities::IntervalRecord,
        record_store::{load_file, RecordStore},
    },
};

use super::Args;

/// How far back to look when only `--end` is given.
const DEFAULT_LOOKBACK_DAYS: i64 = 30;

/// Order of day and month in numeric dates such as `03/04/2025`.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum DateOrder {
    #[value(name = "dmy", alias = "uk")]
    DayFirst,
    #[value(name = "mdy", alias = "us")]
    MonthFirst,
}

impl DateOrder {
    fn dialect(self) -> chrono_english::Dialect {
        match self {
            DateOrder::DayFirst => chrono_english::Dialect::Uk,
            DateOrder::MonthFirst => chrono_english::Dialect::Us,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    Terminal,
    Json,
}

/// Flags shared by every command that loads records and renders charts.
#[derive(Debug, Clone, clap::Args)]
pub struct DataArgs {
    #[arg(
        long = "start",
        short,
        help = "First day to load. Examples are \"yesterday\", \"2 weeks ago\", \"15/03/2025\""
    )]
    start_date: Option<String>,
    #[arg(
        long = "end",
        short,
        help = "Last day to load. Examples are \"today\", \"yesterday\", \"15/03/2025\""
    )]
    end_date: Option<String>,
    #[arg(
        long,
        value_enum,
        default_value = "dmy",
        help = "How numeric --start and --end dates are read: day/month/year or month/day/year"
    )]
    date_order: DateOrder,
    #[arg(
        long,
        short,
        help = "Read records from this file instead of the records directory. JSON lines, a JSON array or a `windows.csv` tracker log"
    )]
    file: Option<PathBuf>,
    #[arg(
        long,
        help = "Chart from the first to the last matching record in file order instead of earliest to latest day"
    )]
    pub scan_order: bool,
    #[arg(long, value_enum, default_value = "terminal", help = "How the chart is printed")]
    pub format: OutputFormat,
}

/// Loads the records a search runs over, either from `--file` or from the day files in
/// `<app_dir>/records`.
pub async fn load_dataset(args: &DataArgs, app_dir: &Path) -> Result<Vec<IntervalRecord>> {
    let records = match &args.file {
        Some(file) => load_file(file).await?,
        None => {
            let store = RecordStore::new(app_dir.join("records"))?;
            let range = parse_day_range(
                args.start_date.as_deref(),
                args.end_date.as_deref(),
                args.date_order,
                Local::now(),
            )?;
            match range {
                Some((start, end)) => store.load_between(start, end).await?,
                None => store.load_all().await?,
            }
        }
    };
    info!("Loaded {} records", records.len());
    Ok(records)
}

/// Turns `--start` and `--end` into an inclusive day range. `None` means everything.
pub fn parse_day_range(
    start_date: Option<&str>,
    end_date: Option<&str>,
    date_order: DateOrder,
    now: DateTime<Local>,
) -> Result<Option<(NaiveDate, NaiveDate)>> {
    if start_date.is_none() && end_date.is_none() {
        return Ok(None);
    }
    let dialect = date_order.dialect();
    let parse = |value: &str, name: &str| -> Result<NaiveDate> {
        match parse_date_string(value, now, dialect) {
            Ok(v) => Ok(v.with_timezone(&Local).date_naive()),
            Err(e) => Err(Args::command()
                .error(
                    clap::error::ErrorKind::ValueValidation,
                    format!("Failed to validate {name} date {e}"),
                )
                .into()),
        }
    };

    let end = match end_date {
        Some(v) => parse(v, "end")?,
        None => now.date_naive(),
    };
    let start = match start_date {
        Some(v) => parse(v, "start")?,
        None => end - Duration::days(DEFAULT_LOOKBACK_DAYS),
    };
    if start > end {
        return Err(Args::command()
            .error(
                clap::error::ErrorKind::ValueValidation,
                format!("Start {start} comes after end {end}"),
            )
            .into());
    }
    Ok(Some((start, end)))
}

pub fn make_renderer(format: OutputFormat) -> Box<dyn ChartRenderer> {
    match format {
        OutputFormat::Terminal => {
            let colored = io::stdout().is_terminal();
            Box::new(TerminalChart::new(io::stdout(), colored))
        }
        OutputFormat::Json => Box::new(JsonChart::new(io::stdout())),
    }
}

/// Prints what the chart doesn't show: the empty state and skipped records.
pub fn report_outcome(
    outcome: &AggregateOutcome,
    query: &Query,
    out: &mut impl Write,
) -> io::Result<()> {
    if outcome.series().is_none() {
        writeln!(out, "No matching activity for \"{query}\"")?;
    }
    match outcome.skipped() {
        0 => Ok(()),
        1 => writeln!(out, "Skipped 1 malformed record"),
        n => writeln!(out, "Skipped {n} malformed records"),
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use chrono::{Local, NaiveDate, TimeZone};

    use crate::search::{
        aggregate::{AggregateOutcome, DailySeries},
        Query,
    };

    use clap::{Parser, ValueEnum};

    use super::{parse_day_range, report_outcome, DataArgs, DateOrder, OutputFormat};

    #[derive(Parser)]
    struct DataOnly {
        #[command(flatten)]
        data: DataArgs,
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn data_flags_default_and_accept_aliases() -> Result<()> {
        let parsed = DataOnly::try_parse_from(["watchme"])?;
        assert_eq!(parsed.data.date_order, DateOrder::DayFirst);
        assert_eq!(parsed.data.format, OutputFormat::Terminal);
        assert!(!parsed.data.scan_order);

        let parsed = DataOnly::try_parse_from(["watchme", "--date-order", "us", "--format", "json"])?;
        assert_eq!(parsed.data.date_order, DateOrder::MonthFirst);
        assert_eq!(parsed.data.format, OutputFormat::Json);

        assert_eq!(DateOrder::from_str("uk", true), Ok(DateOrder::DayFirst));
        assert_eq!(DateOrder::from_str("MDY", true), Ok(DateOrder::MonthFirst));
        assert!(DateOrder::from_str("iso", true).is_err());
        Ok(())
    }

    #[test]
    fn no_bounds_means_everything() -> Result<()> {
        let now = Local.with_ymd_and_hms(2025, 3, 20, 12, 0, 0).unwrap();
        assert_eq!(parse_day_range(None, None, DateOrder::DayFirst, now)?, None);
        Ok(())
    }

    #[test]
    fn parses_bounds_with_dialect() -> Result<()> {
        let now = Local.with_ymd_and_hms(2025, 3, 20, 12, 0, 0).unwrap();
        let range = parse_day_range(Some("15/03/2025"), Some("yesterday"), DateOrder::DayFirst, now)?;
        assert_eq!(range, Some((date(2025, 3, 15), date(2025, 3, 19))));

        let range = parse_day_range(Some("03/15/2025"), None, DateOrder::MonthFirst, now)?;
        assert_eq!(range, Some((date(2025, 3, 15), date(2025, 3, 20))));
        Ok(())
    }

    #[test]
    fn missing_start_looks_back() -> Result<()> {
        let now = Local.with_ymd_and_hms(2025, 3, 20, 12, 0, 0).unwrap();
        let range = parse_day_range(None, Some("20/03/2025"), DateOrder::DayFirst, now)?;
        assert_eq!(range, Some((date(2025, 2, 18), date(2025, 3, 20))));
        Ok(())
    }

    #[test]
    fn rejects_inverted_and_unparseable_bounds() {
        let now = Local.with_ymd_and_hms(2025, 3, 20, 12, 0, 0).unwrap();
        assert!(parse_day_range(Some("20/03/2025"), Some("15/03/2025"), DateOrder::DayFirst, now).is_err());
        assert!(parse_day_range(Some("not a date at all"), None, DateOrder::DayFirst, now).is_err());
    }

    #[test]
    fn reports_empty_state_and_skipped() -> Result<()> {
        let mut out = Vec::new();
        report_outcome(
            &AggregateOutcome::NoData { skipped: 2 },
            &Query::parse("Xyz"),
            &mut out,
        )?;
        assert_eq!(
            String::from_utf8(out)?,
            "No matching activity for \"xyz\"\nSkipped 2 malformed records\n"
        );

        let mut out = Vec::new();
        let outcome = AggregateOutcome::Series {
            series: DailySeries::new(date(2023, 1, 1), vec![1.]),
            skipped: 0,
        };
        report_outcome(&outcome, &Query::parse("term"), &mut out)?;
        assert!(out.is_empty());
        Ok(())
    }
}
