use std::{io::Write, path::Path};

use anyhow::Result;
use clap::Parser;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::debug;

use crate::{
    chart::ChartRenderer,
    search::{aggregate::RangeMode, run_search, Query},
    storage::entities::IntervalRecord,
};

use super::{
    dataset::{load_dataset, make_renderer, report_outcome, DataArgs},
    search::range_mode,
};

const QUIT_COMMAND: &str = ":q";

#[derive(Debug, Parser)]
pub struct InteractiveCommand {
    #[command(flatten)]
    data: DataArgs,
}

pub async fn process_interactive_command(
    InteractiveCommand { data }: InteractiveCommand,
    app_dir: &Path,
) -> Result<()> {
    let records = load_dataset(&data, app_dir).await?;
    let mut renderer = make_renderer(data.format);
    let mut stdout = std::io::stdout();

    writeln!(
        stdout,
        "Loaded {} records. Type words to search for and press Enter, {QUIT_COMMAND} to quit.",
        records.len()
    )?;

    prompt_loop(
        BufReader::new(tokio::io::stdin()),
        &records,
        range_mode(&data),
        &mut renderer,
        &mut stdout,
    )
    .await?;
    Ok(())
}

/// Every line read from `input` is a query. Runs until the quit command or the end of input and
/// returns how many searches were run.
pub async fn prompt_loop(
    input: impl AsyncBufRead + Unpin,
    records: &[IntervalRecord],
    mode: RangeMode,
    renderer: &mut dyn ChartRenderer,
    out: &mut impl Write,
) -> Result<usize> {
    let mut lines = input.lines();
    let mut searches = 0;
    loop {
        write!(out, "> ")?;
        out.flush()?;

        let Some(line) = lines.next_line().await? else {
            writeln!(out)?;
            break;
        };
        let line = line.trim();
        if line == QUIT_COMMAND {
            break;
        }
        if line.is_empty() {
            continue;
        }

        let query = Query::parse(line);
        debug!("Running search for {query}");
        let outcome = run_search(&query, records, mode, renderer)?;
        report_outcome(&outcome, &query, out)?;
        searches += 1;
    }
    Ok(searches)
}
