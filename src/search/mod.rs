//! Searching interval records by window title.
//!
//! [Query] decides which records match, [aggregate::aggregate] turns the matches into a dense per
//! day series, and [run_search] wires the result into a [ChartRenderer].

pub mod aggregate;

use std::fmt::Display;

use anyhow::Result;
use tracing::{debug, instrument};

use crate::{chart::ChartRenderer, storage::entities::IntervalRecord};

use self::aggregate::{aggregate, AggregateOutcome, RangeMode};

/// Lowercased whitespace separated tokens. A title matches when it contains any of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    tokens: Vec<String>,
}

impl Query {
    pub fn parse(raw: &str) -> Self {
        Self {
            tokens: raw.split_whitespace().map(str::to_lowercase).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Case insensitive substring match. The title itself isn't tokenized.
    pub fn matches(&self, window_title: &str) -> bool {
        let title = window_title.to_lowercase();
        self.tokens.iter().any(|token| title.contains(token.as_str()))
    }
}

impl Display for Query {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tokens.join(" "))
    }
}

/// Runs a single search over `records` and hands the series to `renderer`. The renderer is only
/// invoked when something matched.
#[instrument(skip(records, renderer))]
pub fn run_search(
    query: &Query,
    records: &[IntervalRecord],
    mode: RangeMode,
    renderer: &mut dyn ChartRenderer,
) -> Result<AggregateOutcome> {
    let outcome = aggregate(query, records, mode);
    if let AggregateOutcome::Series { series, .. } = &outcome {
        renderer.render(&series.into())?;
    } else {
        debug!("Nothing to render for {query}");
    }
    Ok(outcome)
}
