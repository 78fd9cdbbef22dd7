use std::path::Path;

use anyhow::Result;
use clap::Parser;

use crate::search::{aggregate::RangeMode, run_search, Query};

use super::dataset::{load_dataset, make_renderer, report_outcome, DataArgs};

#[derive(Debug, Parser)]
pub struct SearchCommand {
    #[arg(
        required = true,
        num_args = 1..,
        help = "Words to look for in window titles. A window matches if its title contains any of them"
    )]
    query: Vec<String>,
    #[command(flatten)]
    data: DataArgs,
}

/// Command to process `search` command. Loads the records once, runs a single search and prints
/// the chart.
pub async fn process_search_command(
    SearchCommand { query, data }: SearchCommand,
    app_dir: &Path,
) -> Result<()> {
    let records = load_dataset(&data, app_dir).await?;
    let query = Query::parse(&query.join(" "));
    let mut renderer = make_renderer(data.format);

    let outcome = run_search(&query, &records, range_mode(&data), &mut renderer)?;
    report_outcome(&outcome, &query, &mut std::io::stdout())?;
    Ok(())
}

pub fn range_mode(data: &DataArgs) -> RangeMode {
    if data.scan_order {
        RangeMode::ScanOrder
    } else {
        RangeMode::Calendar
    }
}
