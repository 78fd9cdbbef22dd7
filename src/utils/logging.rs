use std::{path::Path, sync::LazyLock};

use anyhow::Result;
use tracing::{level_filters::LevelFilter, Subscriber};
use tracing_appender::rolling::Rotation;
use tracing_subscriber::{
    fmt::{writer::MakeWriterExt, MakeWriter},
    EnvFilter,
};

pub const CLI_PREFIX: &str = "cli";

/// Level used when neither `--log` nor `RUST_LOG` say otherwise. Searches are interactive, so
/// only problems with the data are worth showing.
const DEFAULT_LEVEL: &str = "warn";

/// Logs go to a daily rotated file under `<application_data_path>/logs`, and to stderr when
/// `show_std` is set. Stdout is left to the chart output.
pub fn enable_logging(
    prefix: &str,
    application_data_path: &Path,
    log_level: Option<LevelFilter>,
    show_std: bool,
) -> Result<()> {
    let appender = tracing_appender::rolling::Builder::new()
        .rotation(Rotation::DAILY)
        .max_log_files(5)
        .filename_prefix(prefix)
        .build(application_data_path.join("logs"))?;

    let stderr = std::io::stderr.with_filter(move |_| show_std);

    let level = log_level
        .map(|v| v.to_string())
        .unwrap_or_else(|| std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_LEVEL.into()));

    tracing::subscriber::set_global_default(subscriber(&level, stderr.and(appender)))?;
    Ok(())
}

/// Subscriber limited to this crate's events at `level`.
pub fn subscriber<W>(level: &str, writer: W) -> impl Subscriber + Send + Sync
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(format!(
            "{}={level}",
            env!("CARGO_PKG_NAME").replace("-", "_"),
        )))
        .with_ansi(false)
        .with_writer(writer)
        .finish()
}

pub static TEST_LOGGING: LazyLock<()> = LazyLock::new(|| {
    tracing_subscriber::fmt()
        .with_max_level(LevelFilter::TRACE)
        .with_test_writer()
        .pretty()
        .init()
});
